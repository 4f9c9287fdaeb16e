//! Aggregation of experiment rows by (nodes, demand pairs) configuration.
//!
//! Each valid data row of a csv file appends one entry to every series of its key.
//! In known solution mode each entry is tagged with the bucket index of the file it comes from,
//! so that bucketed charts select their values by tag and do not depend on reading order.

use anyhow::anyhow;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::experiment::{ExperimentKey, PlotTitle};

/// Counters of one reduction rule for one experiment
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleCounts {
    /// ticks spent checking applicability
    pub applicability: u64,
    /// ticks spent modifying the instance
    pub modifying: u64,
    /// sum of tree, demand pair, edge key and edge value operation counters, if the columns were read
    pub operations: Option<u64>,
}

/// What we retain of a csv data row
#[derive(Clone, Debug)]
pub struct ExperimentRow {
    pub key: ExperimentKey,
    pub original_k: u64,
    pub remaining_nodes: u64,
    pub remaining_dps: u64,
    pub remaining_k: u64,
    /// one entry per reduction rule, in registry order
    pub rules: Vec<RuleCounts>,
}

/// The per reduction rule measures that can be charted
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RuleMetric {
    /// applicability + modifying ticks
    Ticks,
    ApplicabilityTicks,
    ModifyingTicks,
    /// tree + dp + key + value operation counters
    Operations,
}

/// series of one reduction rule for one key
#[derive(Clone, Debug, Default)]
pub struct RuleSeries {
    /// applicability + modifying
    ticks: Vec<u64>,
    applicability: Vec<u64>,
    modifying: Vec<u64>,
    operations: Vec<u64>,
}

impl RuleSeries {
    fn push(&mut self, counts: &RuleCounts, ticks: u64) {
        self.ticks.push(ticks);
        self.applicability.push(counts.applicability);
        self.modifying.push(counts.modifying);
        if let Some(ops) = counts.operations {
            self.operations.push(ops);
        }
    }

    /// value of metric for experiment at rank idx
    pub fn get(&self, metric: RuleMetric, idx: usize) -> Option<u64> {
        match metric {
            RuleMetric::Ticks => self.ticks.get(idx).copied(),
            RuleMetric::ApplicabilityTicks => self.applicability.get(idx).copied(),
            RuleMetric::ModifyingTicks => self.modifying.get(idx).copied(),
            RuleMetric::Operations => self.operations.get(idx).copied(),
        }
    }

    /// true if operation counters were collected
    pub fn has_operations(&self) -> bool {
        !self.operations.is_empty()
    }
} // end of impl RuleSeries

/// All series collected for one (nodes, dps) key. All vectors have the same length.
#[derive(Clone, Debug, Default)]
pub struct KeySeries {
    remaining_nodes: Vec<u64>,
    remaining_dps: Vec<u64>,
    remaining_k: Vec<u64>,
    original_k: Vec<u64>,
    /// bucket index of each entry in known solution mode
    buckets: Vec<Option<usize>>,
    rules: Vec<RuleSeries>,
}

impl KeySeries {
    fn new(nb_rules: usize) -> Self {
        KeySeries {
            rules: vec![RuleSeries::default(); nb_rules],
            ..Default::default()
        }
    }

    fn push(&mut self, row: &ExperimentRow, ticks: &[u64], bucket: Option<usize>) {
        self.remaining_nodes.push(row.remaining_nodes);
        self.remaining_dps.push(row.remaining_dps);
        self.remaining_k.push(row.remaining_k);
        self.original_k.push(row.original_k);
        self.buckets.push(bucket);
        for ((series, counts), t) in self.rules.iter_mut().zip(row.rules.iter()).zip(ticks.iter()) {
            series.push(counts, *t);
        }
    }

    /// number of experiments collected
    pub fn len(&self) -> usize {
        self.remaining_nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining_nodes.is_empty()
    }

    /// ranks of experiments belonging to bucket. None selects everything.
    pub fn ranks(&self, bucket: Option<usize>) -> Vec<usize> {
        match bucket {
            None => (0..self.len()).collect(),
            Some(b) => self
                .buckets
                .iter()
                .enumerate()
                .filter(|(_, tag)| **tag == Some(b))
                .map(|(i, _)| i)
                .collect(),
        }
    }

    pub fn get_remaining_nodes(&self) -> &[u64] {
        &self.remaining_nodes
    }

    pub fn get_remaining_dps(&self) -> &[u64] {
        &self.remaining_dps
    }

    pub fn get_remaining_k(&self) -> &[u64] {
        &self.remaining_k
    }

    pub fn get_original_k(&self) -> &[u64] {
        &self.original_k
    }

    pub fn get_buckets(&self) -> &[Option<usize>] {
        &self.buckets
    }

    /// series of rule of rank rule (0 based)
    pub fn get_rule(&self, rule: usize) -> Option<&RuleSeries> {
        self.rules.get(rule)
    }
} // end of impl KeySeries

//==================================================================================================

/// Everything read from a folder of csv files.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// distinct node counts observed
    nodes: BTreeSet<u32>,
    /// distinct demand pair counts observed
    dps: BTreeSet<u32>,
    /// distinct bucket indexes observed in known solution mode
    buckets: BTreeSet<usize>,
    series: HashMap<ExperimentKey, KeySeries>,
    /// reduction rule names, set by first file
    rule_names: Option<Vec<String>>,
    /// chart titles by node count and bucket, first file wins
    titles: BTreeMap<(u32, Option<usize>), PlotTitle>,
}

impl Aggregation {
    pub fn new() -> Self {
        Aggregation::default()
    }

    /// Registers the reduction rule names discovered in a file.
    /// The first call sets the registry, later calls must give exactly the same names.
    pub fn register_rule_names(&mut self, names: Vec<String>, origin: &str) -> anyhow::Result<()> {
        match &self.rule_names {
            None => {
                log::debug!("reduction rules from {} : {:?}", origin, names);
                self.rule_names = Some(names);
                Ok(())
            }
            Some(known) => {
                if *known != names {
                    log::error!("file {} has reduction rules {:?}, expected {:?}", origin, names, known);
                    return Err(anyhow!(
                        "file {} has reduction rules {:?} but previous files had {:?}",
                        origin,
                        names,
                        known
                    ));
                }
                Ok(())
            }
        }
    } // end of register_rule_names

    /// reduction rule names, empty if nothing registered yet
    pub fn get_rule_names(&self) -> &[String] {
        match &self.rule_names {
            Some(names) => names,
            None => &[],
        }
    }

    /// Appends a row to the series of its key. The row must carry one counter set per registered rule.
    pub fn push(&mut self, row: ExperimentRow, bucket: Option<usize>) -> anyhow::Result<()> {
        let nb_rules = self.get_rule_names().len();
        if row.rules.len() != nb_rules {
            return Err(anyhow!(
                "row for key {} has {} reduction rules, registry has {}",
                row.key,
                row.rules.len(),
                nb_rules
            ));
        }
        // sums are checked before anything is stored
        let ticks = row
            .rules
            .iter()
            .enumerate()
            .map(|(i, c)| {
                c.applicability.checked_add(c.modifying).ok_or_else(|| {
                    log::error!("tick sum overflow for rule {} at key {}", i + 1, row.key);
                    anyhow!(
                        "ticks of reduction rule {} at key {} overflow : {} + {}",
                        i + 1,
                        row.key,
                        c.applicability,
                        c.modifying
                    )
                })
            })
            .collect::<anyhow::Result<Vec<u64>>>()?;
        self.nodes.insert(row.key.nodes);
        self.dps.insert(row.key.dps);
        if let Some(b) = bucket {
            self.buckets.insert(b);
        }
        self.series
            .entry(row.key)
            .or_insert_with(|| KeySeries::new(nb_rules))
            .push(&row, &ticks, bucket);
        Ok(())
    } // end of push

    /// Registers the title for a node count (and bucket). Keeps the first one given.
    pub fn register_title(&mut self, nodes: u32, bucket: Option<usize>, title: PlotTitle) {
        self.titles.entry((nodes, bucket)).or_insert(title);
    }

    pub fn get_title(&self, nodes: u32, bucket: Option<usize>) -> anyhow::Result<&PlotTitle> {
        self.titles.get(&(nodes, bucket)).ok_or_else(|| {
            log::error!("no title for {} nodes, bucket {:?}", nodes, bucket);
            anyhow!("no title registered for {} nodes and bucket {:?}", nodes, bucket)
        })
    }

    /// (node count, bucket) pairs having a title, sorted
    pub fn get_title_keys(&self) -> Vec<(u32, Option<usize>)> {
        self.titles.keys().copied().collect()
    }

    /// series of a key, error if key was never populated
    pub fn get_series(&self, key: &ExperimentKey) -> anyhow::Result<&KeySeries> {
        self.series.get(key).ok_or_else(|| {
            log::error!("no data for key {}", key);
            anyhow!("no experiment data for key {}", key)
        })
    }

    /// sorted distinct node counts
    pub fn get_nodes(&self) -> Vec<u32> {
        self.nodes.iter().copied().collect()
    }

    /// sorted distinct demand pair counts
    pub fn get_dps(&self) -> Vec<u32> {
        self.dps.iter().copied().collect()
    }

    /// sorted distinct bucket indexes
    pub fn get_buckets(&self) -> Vec<usize> {
        self.buckets.iter().copied().collect()
    }

    /// number of keys populated
    pub fn nb_keys(&self) -> usize {
        self.series.len()
    }
} // end of impl Aggregation

//==================================================================================================

// end of mod tests
