//! Reading experiment results : csv result files and path length histograms.

pub mod csv;

pub mod lengths;
