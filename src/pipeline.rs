//! The two pipelines : box plots from a folder of csv result files, bar charts from path length files.

use anyhow::anyhow;

use std::path::{Path, PathBuf};

use crate::aggregate::{Aggregation, RuleMetric};
use crate::experiment::Algorithm;
use crate::io::csv::{read_csv_folder, ReadParams};
use crate::io::lengths::read_length_file;
use crate::plot::boxplot::draw_grouped_boxplot;
use crate::plot::histogram::draw_histogram;
use crate::plot::table::{kernel_parameter_table, kernel_size_table, rule_table, LongTable};
use crate::plot::Metric;

/// default known solution buckets
pub const DEFAULT_BUCKETS: [u32; 5] = [2, 4, 6, 8, 10];

/// tree shapes for which path length files are generated
pub const DEFAULT_TREES: [&str; 3] = ["Caterpillar", "Prufer", "Degree3Tree"];

/// node counts for which path length files are generated
pub const DEFAULT_NODES: [u32; 17] = [
    128, 256, 384, 512, 640, 768, 896, 1024, 2048, 3072, 4096, 5120, 6144, 7168, 8192, 9216, 10240,
];

/// Parameters of the box plot pipeline
#[derive(Clone, Debug)]
pub struct PlotParams {
    folder: PathBuf,
    algorithm: String,
    /// Some(buckets) in known solution mode
    buckets: Option<Vec<u32>>,
    /// draw operations charts
    operations: bool,
    outdir: PathBuf,
}

impl PlotParams {
    pub fn new(folder: PathBuf, algorithm: String, buckets: Option<Vec<u32>>, operations: bool, outdir: PathBuf) -> Self {
        PlotParams {
            folder,
            algorithm,
            buckets,
            operations,
            outdir,
        }
    }

    pub fn get_folder(&self) -> &Path {
        &self.folder
    }

    pub fn get_algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn get_buckets(&self) -> Option<&[u32]> {
        self.buckets.as_deref()
    }

    pub fn with_operations(&self) -> bool {
        self.operations
    }

    pub fn get_outdir(&self) -> &Path {
        &self.outdir
    }
} // end of impl PlotParams

/// Parameters of the histogram pipeline
#[derive(Clone, Debug)]
pub struct HistogramParams {
    dir: PathBuf,
    trees: Vec<String>,
    nodes: Vec<u32>,
    outdir: PathBuf,
}

impl HistogramParams {
    pub fn new(dir: PathBuf, trees: Vec<String>, nodes: Vec<u32>, outdir: PathBuf) -> Self {
        HistogramParams { dir, trees, nodes, outdir }
    }

    pub fn get_dir(&self) -> &Path {
        &self.dir
    }

    pub fn get_trees(&self) -> &[String] {
        &self.trees
    }

    pub fn get_nodes(&self) -> &[u32] {
        &self.nodes
    }

    pub fn get_outdir(&self) -> &Path {
        &self.outdir
    }
} // end of impl HistogramParams

//==================================================================================================

/// Checks buckets are strictly ascending and non empty.
pub fn check_buckets(buckets: &[u32]) -> anyhow::Result<()> {
    if buckets.is_empty() {
        return Err(anyhow!("known solution mode needs at least one bucket"));
    }
    if buckets.windows(2).any(|w| w[0] >= w[1]) {
        log::error!("buckets not ascending : {:?}", buckets);
        return Err(anyhow!("known solution buckets must be strictly ascending, got {:?}", buckets));
    }
    Ok(())
}

/// The metrics charted for each node count (and bucket)
pub fn metrics(operations: bool) -> Vec<Metric> {
    let mut metrics = vec![
        Metric::KernelSize,
        Metric::KernelParameter,
        Metric::Rule(RuleMetric::Ticks),
        Metric::Rule(RuleMetric::ApplicabilityTicks),
        Metric::Rule(RuleMetric::ModifyingTicks),
    ];
    if operations {
        metrics.push(Metric::Rule(RuleMetric::Operations));
    }
    metrics
}

/// builds the long table of metric
pub fn metric_table(agg: &Aggregation, metric: Metric, nodes: u32, bucket: Option<usize>) -> anyhow::Result<LongTable> {
    match metric {
        Metric::KernelSize => kernel_size_table(agg, nodes, bucket),
        Metric::KernelParameter => kernel_parameter_table(agg, nodes, bucket),
        Metric::Rule(rule_metric) => rule_table(agg, nodes, bucket, rule_metric),
    }
}

/// One box plot, ready to draw
#[derive(Clone, Debug)]
pub struct ChartPlan {
    pub metric: Metric,
    pub table: LongTable,
    pub caption: String,
    /// output base name
    pub base: String,
}

/// Builds tables and titles of every chart of an aggregation, one set of charts per (node count, bucket)
/// pair some file registered a title for. Nothing is drawn : a missing key or title fails before any output.
pub fn plan_charts(agg: &Aggregation, operations: bool) -> anyhow::Result<Vec<ChartPlan>> {
    let mut plans = Vec::<ChartPlan>::new();
    for (nodes, bucket) in agg.get_title_keys() {
        let title = agg.get_title(nodes, bucket)?;
        for metric in metrics(operations) {
            let table = metric_table(agg, metric, nodes, bucket)?;
            let caption = format!(
                "{}{}",
                metric.caption_prefix(),
                title.with_experiments(table.get_nb_experiments())
            );
            let base = format!("{}{}", metric.file_prefix(), title.short_title);
            plans.push(ChartPlan { metric, table, caption, base });
        }
    }
    log::debug!("plan_charts : {} charts", plans.len());
    Ok(plans)
} // end of plan_charts

/// Draws all charts of an aggregation in outdir, created if needed. Returns the base names of the charts written.
pub fn draw_aggregation(agg: &Aggregation, operations: bool, outdir: &Path) -> anyhow::Result<Vec<String>> {
    let plans = plan_charts(agg, operations)?;
    create_outdir(outdir)?;
    let mut written = Vec::<String>::with_capacity(plans.len());
    for plan in plans {
        let metric = plan.metric;
        draw_grouped_boxplot(&plan.table, &plan.caption, metric.y_desc(), metric.figure_size(), outdir, &plan.base)?;
        written.push(plan.base);
    }
    Ok(written)
} // end of draw_aggregation

fn create_outdir(outdir: &Path) -> anyhow::Result<()> {
    if let Err(e) = std::fs::create_dir_all(outdir) {
        log::error!("cannot create output directory {:?} : {}", outdir, e);
        return Err(anyhow!("cannot create output directory {} : {}", outdir.display(), e));
    }
    Ok(())
}

/// Reads the csv files of a folder and draws box plots per node count (and known solution bucket).
pub fn make_plots(params: &PlotParams) -> anyhow::Result<Vec<String>> {
    log::info!("make_plots : {:?}", params);
    let algorithm = if params.with_operations() {
        Algorithm::known_from_name(params.get_algorithm())?
    } else {
        Algorithm::from_name(params.get_algorithm())
    };
    if let Some(buckets) = params.get_buckets() {
        check_buckets(buckets)?;
    }
    let read_params = ReadParams::new(
        algorithm,
        params.get_buckets().map(|b| b.to_vec()),
        params.with_operations(),
    );
    let agg = read_csv_folder(params.get_folder(), &read_params)?;
    if agg.nb_keys() == 0 {
        log::error!("no experiment found in {:?}", params.get_folder());
        return Err(anyhow!("no experiment data found in folder {}", params.get_folder().display()));
    }
    log::info!(
        "read {} configurations, nodes : {:?}, dps : {:?}, {} reduction rules",
        agg.nb_keys(),
        agg.get_nodes(),
        agg.get_dps(),
        agg.get_rule_names().len()
    );
    let written = draw_aggregation(&agg, params.with_operations(), params.get_outdir())?;
    log::info!("make_plots : {} charts written", written.len());
    Ok(written)
} // end of make_plots

/// input file, title and output name of the histogram of a tree shape and node count
pub fn histogram_names(tree: &str, nodes: u32) -> (String, String, String) {
    let filename = format!("{}{}nodes.txt", tree, nodes);
    let title = format!(
        "Histogram with all path lengths in all generated {}s with {} nodes.",
        tree, nodes
    );
    let output_name = format!("histogram{}{}Nodes", tree, nodes);
    (filename, title, output_name)
}

/// Draws one histogram per (tree shape, node count). Returns the output names written.
pub fn make_histograms(params: &HistogramParams) -> anyhow::Result<Vec<String>> {
    log::info!("make_histograms : {:?}", params);
    // all files are read before the first chart is drawn
    let mut histograms = Vec::new();
    for tree in params.get_trees() {
        for nodes in params.get_nodes() {
            let (filename, title, output_name) = histogram_names(tree, *nodes);
            let occurrences = read_length_file(&params.get_dir().join(&filename))?;
            histograms.push((title, occurrences, output_name));
        }
    }
    create_outdir(params.get_outdir())?;
    let mut written = Vec::<String>::with_capacity(histograms.len());
    for (title, occurrences, output_name) in histograms {
        draw_histogram(&title, &occurrences, params.get_outdir(), &output_name)?;
        written.push(output_name);
    }
    Ok(written)
} // end of make_histograms

//==================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const HEADER: &str = "Nodes,DemandPairs,TreeType,DPType,Algorithm,Seed,Optimal K,K used,OptK,Solvable,Remaining nodes,Remaining DPs,Remaining K,\
RR1Name,RR1TreeOps,RR1DPOps,RR1DPEdgeKeyOps,RR1DPEdgeValueOps,RR1TicksApplicability,RR1TicksModifying";

    fn write_results(dir: &Path, name: &str, nodes: u32, k: u32) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for (dps, remaining_dps) in [(10, 2), (10, 0), (20, 3)] {
            writeln!(
                file,
                "{},{},Caterpillar,Random,GuoNiedermeierKernelisation,1,{},{},{},True,{},{},1,IdleEdge,1,2,3,4,{},{}",
                nodes,
                dps,
                k,
                k,
                k,
                nodes / 4,
                remaining_dps,
                10 * k,
                k
            )
            .unwrap();
        }
    }

    fn assert_chart_files(outdir: &Path, base: &str) {
        for ext in ["png", "pdf"] {
            let path = outdir.join(format!("{}.{}", base, ext));
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            assert!(size > 0, "missing or empty {:?}", path);
        }
        let pdf = std::fs::read(outdir.join(format!("{}.pdf", base))).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }

    #[test]
    fn histogram_file_names() {
        log_init_test();
        let (filename, title, output) = histogram_names("Caterpillar", 128);
        assert_eq!(filename, "Caterpillar128nodes.txt");
        assert_eq!(title, "Histogram with all path lengths in all generated Caterpillars with 128 nodes.");
        assert_eq!(output, "histogramCaterpillar128Nodes");
    }

    #[test]
    fn bucket_checks() {
        log_init_test();
        assert!(check_buckets(&DEFAULT_BUCKETS).is_ok());
        assert!(check_buckets(&[]).is_err());
        assert!(check_buckets(&[2, 2, 4]).is_err());
        assert!(check_buckets(&[4, 2]).is_err());
    }

    #[test]
    fn operations_need_known_algorithm() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        let params = PlotParams::new(dir.path().to_path_buf(), "Chen".into(), None, true, dir.path().to_path_buf());
        let err = make_plots(&params).unwrap_err();
        assert!(err.to_string().contains("unknown algorithm"));
    }

    #[test]
    fn empty_folder_is_an_error() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        let params = PlotParams::new(dir.path().to_path_buf(), "Bousquet".into(), None, false, dir.path().to_path_buf());
        assert!(make_plots(&params).is_err());
    }

    #[test]
    fn missing_histogram_file() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        let params = HistogramParams::new(dir.path().to_path_buf(), vec!["Prufer".into()], vec![128], dir.path().to_path_buf());
        assert!(make_histograms(&params).is_err());
    }

    #[test]
    fn bucketed_charts_follow_registered_titles() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        write_results(dir.path(), "a128k3.csv", 128, 3);
        write_results(dir.path(), "b128k7.csv", 128, 7);
        write_results(dir.path(), "c256k3.csv", 256, 3);
        let read_params = ReadParams::new(Algorithm::from_name("Guo and Niedermeier"), Some(DEFAULT_BUCKETS.to_vec()), false);
        let agg = read_csv_folder(dir.path(), &read_params).unwrap();
        // no file for 256 nodes with k in bucket 8
        let plans = plan_charts(&agg, false).unwrap();
        assert_eq!(plans.len(), 3 * metrics(false).len());
        let bases: Vec<&str> = plans
            .iter()
            .filter(|p| p.metric == Metric::KernelSize)
            .map(|p| p.base.as_str())
            .collect();
        assert_eq!(
            bases,
            vec![
                "remainingNodesDPsGuoNiedermeierCaterpillar128nodesRandomDPs(k=4)",
                "remainingNodesDPsGuoNiedermeierCaterpillar128nodesRandomDPs(k=8)",
                "remainingNodesDPsGuoNiedermeierCaterpillar256nodesRandomDPs(k=4)",
            ]
        );
        let k8 = &plans[metrics(false).len()];
        assert_eq!(k8.table.cell_values(10, 0), vec![32, 0]);
        assert!(k8.caption.ends_with("Average over 2 experiments."));
    }

    #[test]
    fn make_plots_writes_png_and_pdf() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        write_results(dir.path(), "a128k3.csv", 128, 3);
        write_results(dir.path(), "b128k7.csv", 128, 7);
        write_results(dir.path(), "c256k3.csv", 256, 3);
        // output directory does not exist yet
        let outdir = dir.path().join("plots").join("bucketed");
        let params = PlotParams::new(
            dir.path().to_path_buf(),
            "Guo and Niedermeier".into(),
            Some(DEFAULT_BUCKETS.to_vec()),
            false,
            outdir.clone(),
        );
        let written = make_plots(&params).unwrap();
        assert_eq!(written.len(), 3 * metrics(false).len());
        assert!(written.iter().all(|base| !base.contains("256nodesRandomDPs(k=8)")));
        assert_chart_files(&outdir, "remainingNodesDPsGuoNiedermeierCaterpillar128nodesRandomDPs(k=8)");
        assert_chart_files(&outdir, "ticksGuoNiedermeierCaterpillar256nodesRandomDPs(k=4)");
        assert_chart_files(&outdir, "modifyingOperationsGuoNiedermeierCaterpillar128nodesRandomDPs(k=4)");
    }

    #[test]
    fn make_plots_whole_series() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        write_results(dir.path(), "a128.csv", 128, 3);
        write_results(dir.path(), "b128.csv", 128, 7);
        let outdir = dir.path().join("plots");
        let params = PlotParams::new(dir.path().to_path_buf(), "Bousquet".into(), None, true, outdir.clone());
        let written = make_plots(&params).unwrap();
        assert_eq!(written.len(), metrics(true).len());
        assert_eq!(written.last().unwrap(), "operationsBousquetCaterpillar128nodesRandomDPs");
        assert_chart_files(&outdir, "remainingKBousquetCaterpillar128nodesRandomDPs");
        assert_chart_files(&outdir, "operationsBousquetCaterpillar128nodesRandomDPs");
        let read_params = ReadParams::new(Algorithm::from_name("Bousquet"), None, true);
        let agg = read_csv_folder(dir.path(), &read_params).unwrap();
        let plans = plan_charts(&agg, true).unwrap();
        let operations = plans.last().unwrap();
        assert_eq!(operations.table.cell_values(10, 0), vec![10, 10, 10, 10]);
        assert!(operations.caption.ends_with("Average over 4 experiments."));
    }

    #[test]
    fn make_histograms_writes_png_and_pdf() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Caterpillar128nodes.txt"), "128 0\n256 5\n384 0\n").unwrap();
        std::fs::write(dir.path().join("Caterpillar256nodes.txt"), "1 4\n3 2\n").unwrap();
        let outdir = dir.path().join("histograms");
        let params = HistogramParams::new(dir.path().to_path_buf(), vec!["Caterpillar".into()], vec![128, 256], outdir.clone());
        let written = make_histograms(&params).unwrap();
        assert_eq!(written, vec!["histogramCaterpillar128Nodes", "histogramCaterpillar256Nodes"]);
        assert_chart_files(&outdir, "histogramCaterpillar128Nodes");
        assert_chart_files(&outdir, "histogramCaterpillar256Nodes");
    }

    #[test]
    fn missing_histogram_file_writes_nothing() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Prufer128nodes.txt"), "3 1\n").unwrap();
        let outdir = dir.path().join("histograms");
        let params = HistogramParams::new(dir.path().to_path_buf(), vec!["Prufer".into()], vec![128, 256], outdir.clone());
        assert!(make_histograms(&params).is_err());
        assert!(!outdir.exists());
    }

    #[test]
    fn metric_list() {
        assert_eq!(metrics(false).len(), 5);
        assert_eq!(metrics(true).last(), Some(&Metric::Rule(RuleMetric::Operations)));
    }
} // end of mod tests
