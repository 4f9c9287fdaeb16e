//! Experiment identification : algorithm names, aggregation keys, chart titles.
//!
//! A csv result file holds the experiments run for one configuration (tree generation method,
//! node count, demand pair generation method, number of demand pairs). Titles are built from the first
//! data row of a file.

use anyhow::anyhow;

use std::fmt;

/// The kernelization algorithms whose results we know how to read.
/// Each variant keeps the name as given by the user, it is the name written in chart titles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Guo and Niedermeier kernelization
    GuoNiedermeier(String),
    /// Bousquet et al. kernelization
    Bousquet(String),
    /// any other name
    Other(String),
}

impl Algorithm {
    /// decode an algorithm name as given by the user. Never fails, unknown names give [Algorithm::Other].
    pub fn from_name(name: &str) -> Self {
        let given = name.trim().to_string();
        match given.as_str() {
            "Guo and Niedermeier" | "GuoNiedermeier" => Algorithm::GuoNiedermeier(given),
            "Bousquet" | "Bousquet et al." | "Bousquet et al" => Algorithm::Bousquet(given),
            _ => Algorithm::Other(given),
        }
    }

    /// same as from_name but rejects names we do not know.
    pub fn known_from_name(name: &str) -> anyhow::Result<Self> {
        let algorithm = Algorithm::from_name(name);
        if !algorithm.is_known() {
            log::error!("unknown algorithm name : {:?}", algorithm.display_name());
            return Err(anyhow!(
                "unknown algorithm {:?}, expecting \"Guo and Niedermeier\" or \"Bousquet\"",
                algorithm.display_name()
            ));
        }
        Ok(algorithm)
    }

    /// is it one of the algorithms we know
    pub fn is_known(&self) -> bool {
        !matches!(self, Algorithm::Other(_))
    }

    /// name used in chart titles, as given by the user
    pub fn display_name(&self) -> &str {
        match self {
            Algorithm::GuoNiedermeier(given) | Algorithm::Bousquet(given) | Algorithm::Other(given) => given.as_str(),
        }
    }

    /// name used in output file names
    pub fn short_tag(&self) -> &str {
        match self {
            Algorithm::GuoNiedermeier(_) => "GuoNiedermeier",
            Algorithm::Bousquet(_) => "Bousquet",
            Algorithm::Other(given) => given.as_str(),
        }
    }
} // end of impl Algorithm

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

//==================================================================================================

/// One experiment configuration : (number of nodes, number of demand pairs) of the original instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExperimentKey {
    pub nodes: u32,
    pub dps: u32,
}

impl ExperimentKey {
    pub fn new(nodes: u32, dps: u32) -> Self {
        ExperimentKey { nodes, dps }
    }
}

impl fmt::Display for ExperimentKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({} nodes, {} dps)", self.nodes, self.dps)
    }
}

//==================================================================================================

/// Returns the index in `buckets` of the first bucket value greater or equal to k.
/// `buckets` must be sorted in ascending order.
pub fn snap_bucket(buckets: &[u32], k: u32) -> anyhow::Result<usize> {
    match buckets.iter().position(|b| *b >= k) {
        Some(idx) => Ok(idx),
        None => {
            log::error!("solution size {} is larger than all buckets {:?}", k, buckets);
            Err(anyhow!("solution size {} is larger than every known solution bucket {:?}", k, buckets))
        }
    }
} // end of snap_bucket

/// Returns the first bucket value greater or equal to k
pub fn snap_solution_size(buckets: &[u32], k: u32) -> anyhow::Result<u32> {
    let idx = snap_bucket(buckets, k)?;
    Ok(buckets[idx])
}

/// Descriptive and file-name titles of a chart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlotTitle {
    /// descriptive text completing "... for a "
    pub title: String,
    /// file system safe identifier used as output base name
    pub short_title: String,
}

impl PlotTitle {
    /// Builds titles from the fields of the first data row of a file.
    /// If `solution_size` is given (known solution mode) it is appended to both titles.
    pub fn new(algorithm: &Algorithm, nodes: &str, tree_method: &str, dp_method: &str, solution_size: Option<u32>) -> Self {
        let mut title = format!(
            "tree with {} nodes generated with the {} method, demand pairs generated using the {} method, and the {} algorithm.",
            nodes, tree_method, dp_method, algorithm
        );
        let mut short_title = format!("{}{}{}nodes{}DPs", algorithm.short_tag(), tree_method, nodes, dp_method);
        if let Some(k) = solution_size {
            title.push_str(&format!(" The optimal solution size is at most {}.", k));
            short_title.push_str(&format!("(k={})", k));
        }
        PlotTitle { title, short_title }
    } // end of new

    /// title with the number of experiments the chart summarizes
    pub fn with_experiments(&self, nb_experiments: usize) -> String {
        format!("{} Average over {} experiments.", self.title, nb_experiments)
    }
} // end of impl PlotTitle

//==================================================================================================

// end of mod tests
