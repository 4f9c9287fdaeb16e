//! To ease access to most frequently items
//!

pub use crate::aggregate::{Aggregation, KeySeries, RuleMetric};
pub use crate::experiment::*;
pub use crate::io::{csv::*, lengths::*};
pub use crate::pipeline::*;
pub use crate::plot::Metric;
