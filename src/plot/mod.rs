//! Chart rendering with plotters.
//!
//! Each chart is written as a png raster image and as a pdf vector document, in an output
//! directory and with base name `<metric prefix><short title>`. The pdf is converted from the
//! svg rendering of the chart, which is kept next to it.

use anyhow::anyhow;

use std::path::{Path, PathBuf};

use crate::aggregate::RuleMetric;

pub mod boxplot;
pub mod histogram;
pub mod table;

pub const DPS_AXIS_DESC: &str = "Number of demand pairs in the original instance";

/// The measures drawn as grouped box plots
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Metric {
    /// remaining nodes and demand pairs
    KernelSize,
    /// original and remaining solution size
    KernelParameter,
    /// one series per reduction rule
    Rule(RuleMetric),
}

impl Metric {
    /// prefix of output file names
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Metric::KernelSize => "remainingNodesDPs",
            Metric::KernelParameter => "remainingK",
            Metric::Rule(RuleMetric::Ticks) => "ticks",
            Metric::Rule(RuleMetric::ApplicabilityTicks) => "applicabilityOperations",
            Metric::Rule(RuleMetric::ModifyingTicks) => "modifyingOperations",
            Metric::Rule(RuleMetric::Operations) => "operations",
        }
    }

    /// beginning of chart caption, completed by the experiment title
    pub fn caption_prefix(&self) -> &'static str {
        match self {
            Metric::KernelSize => "Remaining number of nodes and demand pairs in the kernel for a ",
            Metric::KernelParameter => "Original and remaining solution size of the kernel for a ",
            Metric::Rule(RuleMetric::Ticks) => "Number of ticks per reduction rule for a ",
            Metric::Rule(RuleMetric::ApplicabilityTicks) => {
                "Number of operations per reduction rule checking applicability for a "
            }
            Metric::Rule(RuleMetric::ModifyingTicks) => "Number of operations per reduction rule to modify the instance for a ",
            Metric::Rule(RuleMetric::Operations) => "Number of data structure operations per reduction rule for a ",
        }
    }

    pub fn y_desc(&self) -> &'static str {
        match self {
            Metric::KernelSize => "Number of nodes and demand pairs in the kernel",
            Metric::KernelParameter => "Solution size",
            Metric::Rule(RuleMetric::Ticks) => "Number of ticks",
            Metric::Rule(_) => "Number of operations",
        }
    }

    /// image size in pixels. Rule charts have many series and get more room.
    pub fn figure_size(&self) -> (u32, u32) {
        match self {
            Metric::KernelSize | Metric::KernelParameter => (1000, 600),
            Metric::Rule(_) => (2200, 1000),
        }
    }
} // end of impl Metric

/// The files written for one chart
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartFiles {
    pub png: PathBuf,
    pub svg: PathBuf,
    pub pdf: PathBuf,
}

impl ChartFiles {
    /// paths of base name in outdir
    pub fn new(outdir: &Path, base: &str) -> Self {
        ChartFiles {
            png: outdir.join(format!("{}.png", base)),
            svg: outdir.join(format!("{}.svg", base)),
            pdf: outdir.join(format!("{}.pdf", base)),
        }
    }

    /// Writes the svg document and its pdf conversion.
    pub fn write_vector(&self, svg: &str) -> anyhow::Result<()> {
        std::fs::write(&self.svg, svg)?;
        let pdf = svg_to_pdf(svg)?;
        std::fs::write(&self.pdf, pdf)?;
        log::debug!("written {:?} and {:?}", self.svg, self.pdf);
        Ok(())
    }
} // end of impl ChartFiles

/// Converts a svg document to a one page pdf. Text is laid out with the system fonts.
pub fn svg_to_pdf(svg: &str) -> anyhow::Result<Vec<u8>> {
    let mut options = svg2pdf::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = match svg2pdf::usvg::Tree::from_str(svg, &options) {
        Ok(tree) => tree,
        Err(e) => {
            log::error!("cannot parse svg chart : {:?}", e);
            return Err(anyhow!("cannot parse svg chart : {}", e));
        }
    };
    let pdf = svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), svg2pdf::PageOptions::default());
    pdf.map_err(|e| {
        log::error!("pdf conversion failed : {:?}", e);
        anyhow!("pdf conversion failed : {:?}", e)
    })
} // end of svg_to_pdf

/// Splits a long title in lines of at most `max_chars` characters, breaking at spaces.
/// A single word longer than max_chars gets a line of its own.
pub fn wrap_title(title: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::<String>::new();
    let mut current = String::new();
    for word in title.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
} // end of wrap_title

//==================================================================================================

// end of mod tests
