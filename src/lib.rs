//! lib target
//!
//! Aggregation and charts of kernelization experiments for multicut in trees
//! (Guo and Niedermeier, Bousquet et al. kernels) :
//! - box plots of kernel size, reduction rule ticks and operations, from folders of csv result files
//! - bar charts of path length histograms of generated trees

pub mod experiment;

pub mod aggregate;

pub mod io;

pub mod plot;

pub mod pipeline;

pub mod prelude;
