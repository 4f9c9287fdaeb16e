//! Read a folder of csv experiment result files into an [Aggregation].
//!
//! The header of each file gives the position of the reduction rule column groups :
//! `RR<i>Name`, `RR<i>TreeOps`, `RR<i>DPOps`, `RR<i>DPEdgeKeyOps`, `RR<i>DPEdgeValueOps`,
//! `RR<i>TicksApplicability`, `RR<i>TicksModifying`, ... for i = 1, 2, ... until a name is missing.
//! Fixed columns are found at fixed positions (see the `*_FIELD` constants).

use anyhow::anyhow;

use std::fs::OpenOptions;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use glob::{glob, Pattern};

use crate::aggregate::{Aggregation, ExperimentRow, RuleCounts};
use crate::experiment::{snap_bucket, Algorithm, ExperimentKey, PlotTitle};

pub const NODES_FIELD: usize = 0;
pub const DPS_FIELD: usize = 1;
pub const TREE_METHOD_FIELD: usize = 2;
pub const DP_METHOD_FIELD: usize = 3;
pub const ORIGINAL_K_FIELD: usize = 8;
pub const SOLVABLE_FIELD: usize = 9;
pub const REMAINING_NODES_FIELD: usize = 10;
pub const REMAINING_DPS_FIELD: usize = 11;
pub const REMAINING_K_FIELD: usize = 12;

/// Column indexes of one reduction rule group
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RuleColumns {
    pub name: usize,
    pub applicability: usize,
    /// always applicability + 1
    pub modifying: usize,
    /// tree, dp, edge key, edge value operation counters, just before applicability
    pub operations: Option<[usize; 4]>,
}

/// Scans the header for reduction rule groups.
/// Stops at the first i for which `RR<i>Name` or `RR<i>TicksApplicability` is absent.
pub fn discover_rule_columns(header: &StringRecord, with_operations: bool) -> anyhow::Result<Vec<RuleColumns>> {
    let position = |name: &str| header.iter().position(|h| h == name);
    let mut groups = Vec::<RuleColumns>::new();
    let mut i = 1;
    loop {
        let name = match position(format!("RR{}Name", i).as_str()) {
            Some(idx) => idx,
            None => break,
        };
        let applicability = match position(format!("RR{}TicksApplicability", i).as_str()) {
            Some(idx) => idx,
            None => break,
        };
        let operations = if with_operations {
            if applicability < 4 {
                log::error!("RR{}TicksApplicability at column {}, no room for operation counters", i, applicability);
                return Err(anyhow!(
                    "header has RR{}TicksApplicability at column {}, operation counters cannot precede it",
                    i,
                    applicability
                ));
            }
            Some([applicability - 4, applicability - 3, applicability - 2, applicability - 1])
        } else {
            None
        };
        groups.push(RuleColumns {
            name,
            applicability,
            modifying: applicability + 1,
            operations,
        });
        i += 1;
    }
    log::debug!("discovered {} reduction rule column groups : {:?}", groups.len(), groups);
    Ok(groups)
} // end of discover_rule_columns

//==================================================================================================

/// What to read and how.
#[derive(Clone, Debug)]
pub struct ReadParams {
    algorithm: Algorithm,
    /// ascending solution size buckets if in known solution mode
    buckets: Option<Vec<u32>>,
    /// do we read the operation counters
    with_operations: bool,
}

impl ReadParams {
    pub fn new(algorithm: Algorithm, buckets: Option<Vec<u32>>, with_operations: bool) -> Self {
        ReadParams {
            algorithm,
            buckets,
            with_operations,
        }
    }

    pub fn get_algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    pub fn get_buckets(&self) -> Option<&[u32]> {
        self.buckets.as_deref()
    }

    pub fn through_known_solution(&self) -> bool {
        self.buckets.is_some()
    }

    pub fn with_operations(&self) -> bool {
        self.with_operations
    }
} // end of impl ReadParams

fn get_field<'a>(record: &'a StringRecord, idx: usize, line: u64) -> anyhow::Result<&'a str> {
    record
        .get(idx)
        .ok_or_else(|| anyhow!("line {} has {} fields, no field at index {}", line, record.len(), idx))
}

fn parse_field<T: FromStr>(record: &StringRecord, idx: usize, line: u64) -> anyhow::Result<T> {
    let field = get_field(record, idx, line)?;
    field
        .trim()
        .parse::<T>()
        .map_err(|_| anyhow!("line {} : cannot decode field {} value {:?} as integer", line, idx, field))
}

/// Reads one csv file into agg. Returns the number of data rows read.
pub fn read_csv_file(filepath: &Path, params: &ReadParams, agg: &mut Aggregation) -> anyhow::Result<usize> {
    log::info!("reading csv file : {:?}", filepath);
    let origin = filepath.display().to_string();
    let fileres = OpenOptions::new().read(true).open(filepath);
    if fileres.is_err() {
        log::error!("read_csv_file could not open file {:?}", filepath.as_os_str());
        return Err(anyhow!("read_csv_file could not open file {}", origin));
    }
    let file = fileres?;
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(false).from_reader(BufReader::new(file));
    //
    let header = rdr.headers()?.clone();
    let columns = discover_rule_columns(&header, params.with_operations())?;
    //
    let mut nb_record = 0usize;
    let mut bucket: Option<usize> = None;
    for result in rdr.records() {
        let record = result?;
        // header is line 1
        let line = record.position().map(|p| p.line()).unwrap_or(nb_record as u64 + 2);
        let solvable = get_field(&record, SOLVABLE_FIELD, line)?;
        if solvable.to_lowercase() != "true" {
            log::error!("file {} line {} : instance not solvable, field value {}", origin, line, solvable);
            return Err(anyhow!(
                "There is an instance that was marked as not solvable! In the \"solvable\" field it has value {}",
                solvable
            ));
        }
        let nodes: u32 = parse_field(&record, NODES_FIELD, line)?;
        let dps: u32 = parse_field(&record, DPS_FIELD, line)?;
        let original_k: u32 = parse_field(&record, ORIGINAL_K_FIELD, line)?;
        if nb_record == 0 {
            let names = columns
                .iter()
                .map(|c| get_field(&record, c.name, line).map(|s| s.to_string()))
                .collect::<anyhow::Result<Vec<String>>>()?;
            agg.register_rule_names(names, &origin)?;
            let solution_size = match params.get_buckets() {
                Some(buckets) => {
                    let idx = snap_bucket(buckets, original_k)?;
                    bucket = Some(idx);
                    Some(buckets[idx])
                }
                None => None,
            };
            let title = PlotTitle::new(
                params.get_algorithm(),
                get_field(&record, NODES_FIELD, line)?,
                get_field(&record, TREE_METHOD_FIELD, line)?,
                get_field(&record, DP_METHOD_FIELD, line)?,
                solution_size,
            );
            log::debug!("file {} short title {}", origin, title.short_title);
            agg.register_title(nodes, bucket, title);
        }
        //
        let mut rules = Vec::<RuleCounts>::with_capacity(columns.len());
        for c in &columns {
            let operations = match c.operations {
                Some(ops) => {
                    let mut sum = 0u64;
                    for idx in ops {
                        let count = parse_field::<u64>(&record, idx, line)?;
                        sum = sum.checked_add(count).ok_or_else(|| {
                            log::error!("file {} line {} : operation counters overflow", origin, line);
                            anyhow!("line {} : operation counters of column {} overflow", line, idx)
                        })?;
                    }
                    Some(sum)
                }
                None => None,
            };
            rules.push(RuleCounts {
                applicability: parse_field(&record, c.applicability, line)?,
                modifying: parse_field(&record, c.modifying, line)?,
                operations,
            });
        }
        let row = ExperimentRow {
            key: ExperimentKey::new(nodes, dps),
            original_k: original_k as u64,
            remaining_nodes: parse_field(&record, REMAINING_NODES_FIELD, line)?,
            remaining_dps: parse_field(&record, REMAINING_DPS_FIELD, line)?,
            remaining_k: parse_field(&record, REMAINING_K_FIELD, line)?,
            rules,
        };
        agg.push(row, bucket)?;
        nb_record += 1;
    } // end for records
    log::info!("file {} : {} experiments", origin, nb_record);
    Ok(nb_record)
} // end of read_csv_file

/// returns paths of files with a .csv extension in folder, sorted by name
pub fn list_csv_files(folder: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        log::error!("cannot list folder {:?}", folder);
        return Err(anyhow!("{} is not a folder", folder.display()));
    }
    let pattern = format!("{}/*.csv", Pattern::escape(&folder.display().to_string()));
    log::debug!("listing {}", pattern);
    let mut files = Vec::<PathBuf>::new();
    for entry in glob(&pattern)? {
        let path = entry?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
} // end of list_csv_files

/// Reads all csv files of folder, in file name order.
pub fn read_csv_folder(folder: &Path, params: &ReadParams) -> anyhow::Result<Aggregation> {
    let files = list_csv_files(folder)?;
    log::info!("folder {:?} : {} csv files", folder, files.len());
    let mut agg = Aggregation::new();
    for file in &files {
        read_csv_file(file, params, &mut agg)?;
    }
    Ok(agg)
} // end of read_csv_folder

//==================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::aggregate::RuleMetric;

    use std::io::Write;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const HEADER: &str = "Nodes,DemandPairs,TreeType,DPType,Algorithm,Seed,Optimal K,K used,OptK,Solvable,Remaining nodes,Remaining DPs,Remaining K,\
RR1Name,RR1TreeOps,RR1DPOps,RR1DPEdgeKeyOps,RR1DPEdgeValueOps,RR1TicksApplicability,RR1TicksModifying,\
RR2Name,RR2TreeOps,RR2DPOps,RR2DPEdgeKeyOps,RR2DPEdgeValueOps,RR2TicksApplicability,RR2TicksModifying";

    fn data_line(nodes: u32, dps: u32, k: u32, solvable: &str, rem_nodes: u32, rem_dps: u32) -> String {
        format!(
            "{},{},Prufer,Random,GuoNiedermeierKernelisation,1,{},{},{},{},{},{},1,IdleEdge,1,2,3,4,100,5,UnitPath,10,20,30,40,200,7",
            nodes, dps, k, k, k, solvable, rem_nodes, rem_dps
        )
    }

    fn write_file(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for l in lines {
            writeln!(file, "{}", l).unwrap();
        }
        path
    }

    fn header_record(s: &str) -> StringRecord {
        StringRecord::from(s.split(',').collect::<Vec<&str>>())
    }

    #[test]
    fn discover_groups() {
        log_init_test();
        let groups = discover_rule_columns(&header_record(HEADER), true).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, 13);
        assert_eq!(groups[0].applicability, 18);
        assert_eq!(groups[0].modifying, 19);
        assert_eq!(groups[0].operations, Some([14, 15, 16, 17]));
        assert_eq!(groups[1].name, 20);
        assert!(discover_rule_columns(&header_record(HEADER), false).unwrap()[1].operations.is_none());
    }

    #[test]
    fn discovery_stops_at_first_missing_name() {
        log_init_test();
        // RR2Name absent, RR3 present : scanning stops at 2
        let header = header_record("a,b,c,d,e,RR1Name,RR1TicksApplicability,RR1TicksModifying,RR3Name,RR3TicksApplicability,RR3TicksModifying");
        let groups = discover_rule_columns(&header, false).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, 5);
        // no room for counters before applicability
        let short = header_record("RR1Name,RR1TicksApplicability,RR1TicksModifying");
        assert!(discover_rule_columns(&short, true).is_err());
        assert_eq!(discover_rule_columns(&short, false).unwrap().len(), 1);
    }

    #[test]
    fn read_folder_counts_rows() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "b.csv", &[data_line(128, 10, 3, "true", 9, 0), data_line(128, 10, 3, "TRUE", 9, 2)]);
        write_file(dir.path(), "a.csv", &[data_line(128, 20, 3, "True", 5, 1)]);
        std::fs::write(dir.path().join("notes.txt"), "not,a,result\n").unwrap();
        let params = ReadParams::new(Algorithm::from_name("Guo and Niedermeier"), None, true);
        let agg = read_csv_folder(dir.path(), &params).unwrap();
        assert_eq!(agg.get_rule_names(), &["IdleEdge".to_string(), "UnitPath".to_string()]);
        assert_eq!(agg.get_nodes(), vec![128]);
        assert_eq!(agg.get_dps(), vec![10, 20]);
        let series = agg.get_series(&ExperimentKey::new(128, 10)).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.get_remaining_dps(), &[0, 2]);
        let rule = series.get_rule(0).unwrap();
        assert_eq!(rule.get(RuleMetric::Ticks, 0), Some(105));
        assert_eq!(rule.get(RuleMetric::Operations, 0), Some(10));
        assert_eq!(series.get_rule(1).unwrap().get(RuleMetric::Operations, 1), Some(100));
        let title = agg.get_title(128, None).unwrap();
        assert_eq!(title.short_title, "GuoNiedermeierPrufer128nodesRandomDPs");
    }

    #[test]
    fn list_only_csv_files_sorted() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "c.csv", &[]);
        write_file(dir.path(), "a.csv", &[]);
        std::fs::write(dir.path().join("b.txt"), "x\n").unwrap();
        std::fs::create_dir(dir.path().join("d.csv")).unwrap();
        let files = list_csv_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.csv", "c.csv"]);
        assert!(list_csv_files(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn operation_overflow_aborts() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        let line = data_line(128, 10, 3, "true", 9, 0).replacen(",1,2,3,4,", &format!(",{},2,3,4,", u64::MAX), 1);
        write_file(dir.path(), "a.csv", &[line]);
        let params = ReadParams::new(Algorithm::from_name("Bousquet"), None, true);
        let err = read_csv_folder(dir.path(), &params).unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn not_solvable_aborts() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.csv", &[data_line(128, 10, 3, "true", 9, 0), data_line(128, 10, 3, "False", 9, 0)]);
        let params = ReadParams::new(Algorithm::from_name("Bousquet"), None, false);
        let err = read_csv_folder(dir.path(), &params).unwrap_err();
        assert!(err.to_string().contains("value False"));
    }

    #[test]
    fn non_integer_field_aborts() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.csv", &[data_line(128, 10, 3, "true", 9, 0).replacen("128", "many", 1)]);
        let params = ReadParams::new(Algorithm::from_name("Bousquet"), None, false);
        assert!(read_csv_folder(dir.path(), &params).is_err());
    }

    #[test]
    fn known_solution_tags_buckets() {
        log_init_test();
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "k3.csv", &[data_line(128, 10, 3, "true", 9, 1), data_line(128, 10, 2, "true", 8, 1)]);
        write_file(dir.path(), "k7.csv", &[data_line(128, 10, 7, "true", 7, 1)]);
        let params = ReadParams::new(Algorithm::from_name("Guo and Niedermeier"), Some(vec![2, 4, 6, 8, 10]), false);
        let agg = read_csv_folder(dir.path(), &params).unwrap();
        assert_eq!(agg.get_buckets(), vec![1, 3]);
        let series = agg.get_series(&ExperimentKey::new(128, 10)).unwrap();
        // second row of k3.csv has k = 2 but belongs to the file bucket
        assert_eq!(series.get_buckets(), &[Some(1), Some(1), Some(3)]);
        assert_eq!(agg.get_title(128, Some(1)).unwrap().short_title, "GuoNiedermeierPrufer128nodesRandomDPs(k=4)");
        assert_eq!(agg.get_title(128, Some(3)).unwrap().short_title, "GuoNiedermeierPrufer128nodesRandomDPs(k=8)");
    }
} // end of mod tests
