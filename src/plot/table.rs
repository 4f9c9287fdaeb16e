//! Long format tables : one row per (demand pair count, series label, value).
//!
//! This is the shape a grouped box plot consumes : x category is the number of demand pairs
//! of the original instance, hue is the series label.

use anyhow::anyhow;

use indexmap::IndexMap;

use crate::aggregate::{Aggregation, KeySeries, RuleMetric};
use crate::experiment::ExperimentKey;

pub const REMAINING_NODES_LABEL: &str = "Remaining nodes";
pub const REMAINING_DPS_LABEL: &str = "Remaining demand pairs";
pub const ORIGINAL_K_LABEL: &str = "Original k";
pub const REMAINING_K_LABEL: &str = "Remaining k";

/// one retained experiment value
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LongRow {
    /// number of demand pairs
    pub category: u32,
    /// rank of label in table labels
    pub label: usize,
    pub value: u64,
}

#[derive(Clone, Debug, Default)]
pub struct LongTable {
    /// x categories in ascending order
    categories: Vec<u32>,
    /// series labels in insertion order
    labels: IndexMap<String, usize>,
    rows: Vec<LongRow>,
    /// largest number of experiments found in a category
    nb_experiments: usize,
}

impl LongTable {
    pub fn new(categories: Vec<u32>) -> Self {
        LongTable {
            categories,
            ..Default::default()
        }
    }

    /// returns rank of label, inserting it if new
    pub fn add_label(&mut self, label: &str) -> usize {
        let next = self.labels.len();
        *self.labels.entry(label.to_string()).or_insert(next)
    }

    pub fn push(&mut self, category: u32, label: usize, value: u64) {
        self.rows.push(LongRow { category, label, value });
    }

    fn update_nb_experiments(&mut self, nb: usize) {
        self.nb_experiments = self.nb_experiments.max(nb);
    }

    pub fn get_categories(&self) -> &[u32] {
        &self.categories
    }

    /// labels in insertion order
    pub fn get_labels(&self) -> Vec<&str> {
        self.labels.keys().map(|s| s.as_str()).collect()
    }

    pub fn get_rows(&self) -> &[LongRow] {
        &self.rows
    }

    pub fn get_nb_experiments(&self) -> usize {
        self.nb_experiments
    }

    /// values of a (category, label) cell, in row order
    pub fn cell_values(&self, category: u32, label: usize) -> Vec<u64> {
        self.rows
            .iter()
            .filter(|r| r.category == category && r.label == label)
            .map(|r| r.value)
            .collect()
    }

    pub fn max_value(&self) -> u64 {
        self.rows.iter().map(|r| r.value).max().unwrap_or(0)
    }
} // end of impl LongTable

//==================================================================================================

// collect series and selected ranks for each dps, fails on first missing key
fn selected_series<'a>(
    agg: &'a Aggregation,
    nodes: u32,
    bucket: Option<usize>,
) -> anyhow::Result<Vec<(u32, &'a KeySeries, Vec<usize>)>> {
    let mut selected = Vec::new();
    for dps in agg.get_dps() {
        let series = agg.get_series(&ExperimentKey::new(nodes, dps))?;
        let ranks = series.ranks(bucket);
        selected.push((dps, series, ranks));
    }
    Ok(selected)
}

/// Remaining nodes and remaining demand pairs per demand pair count.
/// When no demand pair remains the kernel is fully reduced and its node count is drawn as 0.
pub fn kernel_size_table(agg: &Aggregation, nodes: u32, bucket: Option<usize>) -> anyhow::Result<LongTable> {
    let mut table = LongTable::new(agg.get_dps());
    let nodes_label = table.add_label(REMAINING_NODES_LABEL);
    let dps_label = table.add_label(REMAINING_DPS_LABEL);
    for (dps, series, ranks) in selected_series(agg, nodes, bucket)? {
        for r in &ranks {
            let remaining_dps = series.get_remaining_dps()[*r];
            let remaining_nodes = if remaining_dps == 0 { 0 } else { series.get_remaining_nodes()[*r] };
            table.push(dps, nodes_label, remaining_nodes);
            table.push(dps, dps_label, remaining_dps);
        }
        table.update_nb_experiments(ranks.len());
    }
    Ok(table)
} // end of kernel_size_table

/// Original and remaining solution size per demand pair count.
pub fn kernel_parameter_table(agg: &Aggregation, nodes: u32, bucket: Option<usize>) -> anyhow::Result<LongTable> {
    let mut table = LongTable::new(agg.get_dps());
    let original_label = table.add_label(ORIGINAL_K_LABEL);
    let remaining_label = table.add_label(REMAINING_K_LABEL);
    for (dps, series, ranks) in selected_series(agg, nodes, bucket)? {
        for r in &ranks {
            table.push(dps, original_label, series.get_original_k()[*r]);
            table.push(dps, remaining_label, series.get_remaining_k()[*r]);
        }
        table.update_nb_experiments(ranks.len());
    }
    Ok(table)
} // end of kernel_parameter_table

/// label of a reduction rule in charts, rank is 0 based
pub fn rule_label(rank: usize, name: &str) -> String {
    format!("Reduction rule {} ({})", rank + 1, name)
}

/// One series per reduction rule.
pub fn rule_table(agg: &Aggregation, nodes: u32, bucket: Option<usize>, metric: RuleMetric) -> anyhow::Result<LongTable> {
    let mut table = LongTable::new(agg.get_dps());
    let labels: Vec<usize> = agg
        .get_rule_names()
        .iter()
        .enumerate()
        .map(|(i, name)| table.add_label(&rule_label(i, name)))
        .collect();
    for (dps, series, ranks) in selected_series(agg, nodes, bucket)? {
        for (i, label) in labels.iter().enumerate() {
            let rule = series
                .get_rule(i)
                .ok_or_else(|| anyhow!("no reduction rule {} for {} nodes, {} dps", i + 1, nodes, dps))?;
            if metric == RuleMetric::Operations && !ranks.is_empty() && !rule.has_operations() {
                log::error!("operation counters of rule {} were not read, {} nodes, {} dps", i + 1, nodes, dps);
                return Err(anyhow!(
                    "no operation counters for reduction rule {} at {} nodes, {} dps, operations must be read with the csv files",
                    i + 1,
                    nodes,
                    dps
                ));
            }
            for r in &ranks {
                let value = rule.get(metric, *r).ok_or_else(|| {
                    log::error!("no {:?} value for rule {}, {} nodes, {} dps", metric, i + 1, nodes, dps);
                    anyhow!("no {:?} value for reduction rule {} at {} nodes, {} dps", metric, i + 1, nodes, dps)
                })?;
                table.push(dps, *label, value);
            }
        }
        table.update_nb_experiments(ranks.len());
    }
    Ok(table)
} // end of rule_table

//==================================================================================================

// end of mod tests
