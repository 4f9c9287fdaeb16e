//! an executable drawing charts from kernelization experiments
//! example usage:
//! kernelplot boxplots --dir "Results/GuoNiedermeierPruferRandomSmall" --algo "Guo and Niedermeier"
//! kernelplot boxplots --dir "Results/BousquetPruferThroughKnownSolutionSmall" --algo "Bousquet" --known-solution --buckets "2,4,6,8,10"
//! kernelplot boxplots --dir "Results/BousquetPruferRandomSmall" --algo "Bousquet" --operations --outdir plots
//! kernelplot histograms --dir "LengthDistribution" --trees "Caterpillar,Prufer" --nodes "128,256"
//!
//!  boxplots reads all csv files of a folder, histograms reads files `<Tree><Nodes>nodes.txt`.
//!  Charts are written as png and pdf in outdir (default current directory, created if missing).

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use std::path::PathBuf;

use kernelstats::prelude::*;

// decode a comma separated list of integers
fn parse_u32_list(arg: &str) -> Result<Vec<u32>, anyhow::Error> {
    arg.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| anyhow!("could not parse {:?} as integer in list {:?}", s, arg))
        })
        .collect()
}

fn get_outdir(matches: &ArgMatches) -> PathBuf {
    match matches.value_of("outdir") {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from("."),
    }
}

fn parse_boxplots(matches: &ArgMatches) -> Result<PlotParams, anyhow::Error> {
    log::debug!("in parse_boxplots");
    let folder = match matches.value_of("dir") {
        Some(dir) => PathBuf::from(dir),
        _ => {
            return Err(anyhow!("boxplots needs a csv folder"));
        }
    };
    let algorithm = match matches.value_of("algo") {
        Some(algo) => algo.to_string(),
        _ => {
            return Err(anyhow!("boxplots needs an algorithm name"));
        }
    };
    let buckets = if matches.is_present("known") {
        match matches.value_of("buckets") {
            Some(list) => Some(parse_u32_list(list)?),
            None => Some(DEFAULT_BUCKETS.to_vec()),
        }
    } else {
        None
    };
    let operations = matches.is_present("operations");
    Ok(PlotParams::new(folder, algorithm, buckets, operations, get_outdir(matches)))
} // end of parse_boxplots

fn parse_histograms(matches: &ArgMatches) -> Result<HistogramParams, anyhow::Error> {
    log::debug!("in parse_histograms");
    let dir = match matches.value_of("dir") {
        Some(dir) => PathBuf::from(dir),
        _ => {
            return Err(anyhow!("histograms needs an input directory"));
        }
    };
    let trees = match matches.value_of("trees") {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => DEFAULT_TREES.iter().map(|s| s.to_string()).collect(),
    };
    let nodes = match matches.value_of("nodes") {
        Some(list) => parse_u32_list(list)?,
        None => DEFAULT_NODES.to_vec(),
    };
    Ok(HistogramParams::new(dir, trees, nodes, get_outdir(matches)))
} // end of parse_histograms

fn outdir_arg() -> Arg<'static> {
    Arg::new("outdir")
        .long("outdir")
        .takes_value(true)
        .required(false)
        .help("directory where charts are written, created if missing, default current directory")
}

pub fn main() {
    //
    let _ = env_logger::builder().try_init();
    log::info!("logger initialized");
    //
    let matches = Command::new("kernelplot")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("boxplots")
                .arg_required_else_help(true)
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .takes_value(true)
                        .required(true)
                        .help("folder of csv result files"),
                )
                .arg(
                    Arg::new("algo")
                        .long("algo")
                        .takes_value(true)
                        .required(true)
                        .help("\"Guo and Niedermeier\" or \"Bousquet\""),
                )
                .arg(
                    Arg::new("known")
                        .long("known-solution")
                        .help("experiments generated through a known solution, grouped by solution size bucket"),
                )
                .arg(
                    Arg::new("buckets")
                        .long("buckets")
                        .takes_value(true)
                        .required(false)
                        .help("ascending comma separated solution sizes, default 2,4,6,8,10"),
                )
                .arg(
                    Arg::new("operations")
                        .long("operations")
                        .help("also draw data structure operation counts per reduction rule"),
                )
                .arg(outdir_arg()),
        )
        .subcommand(
            Command::new("histograms")
                .arg_required_else_help(true)
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .takes_value(true)
                        .required(true)
                        .help("directory of path length files"),
                )
                .arg(
                    Arg::new("trees")
                        .long("trees")
                        .takes_value(true)
                        .required(false)
                        .help("comma separated tree shapes, default Caterpillar,Prufer,Degree3Tree"),
                )
                .arg(
                    Arg::new("nodes")
                        .long("nodes")
                        .takes_value(true)
                        .required(false)
                        .help("comma separated node counts"),
                )
                .arg(outdir_arg()),
        )
        .get_matches();
    //
    let res = match matches.subcommand() {
        Some(("boxplots", sub_m)) => {
            log::debug!("got boxplots mode");
            parse_boxplots(sub_m).and_then(|params| make_plots(&params))
        }
        Some(("histograms", sub_m)) => {
            log::debug!("got histograms mode");
            parse_histograms(sub_m).and_then(|params| make_histograms(&params))
        }
        _ => Err(anyhow!("expected subcommand boxplots or histograms")),
    }; // end match subcommand
    //
    match res {
        Ok(written) => {
            log::info!("{} charts written", written.len());
            for name in &written {
                println!("{}", name);
            }
        }
        Err(e) => {
            log::error!("error : {:?}", e);
            eprintln!("kernelplot failed : {:#}", e);
            std::process::exit(1);
        }
    }
} // end of main
