//! Bar chart of path length occurrences.

use plotters::coord::Shift;
use plotters::prelude::*;

use std::path::Path;

use super::{wrap_title, ChartFiles};
use crate::io::lengths::LengthOccurrences;

const FIGURE_SIZE: (u32, u32) = (1000, 600);

/// (length, occurrences) pairs to draw : zero counts dropped, ascending length.
pub fn nonzero_bars(occurrences: &LengthOccurrences) -> Vec<(u32, u64)> {
    occurrences
        .iter()
        .filter(|(_, count)| **count != 0)
        .map(|(length, count)| (*length, *count))
        .collect()
}

fn draw_on<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, bars: &[(u32, u64)], title: &str) -> anyhow::Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let lines = wrap_title(title, 100);
    let (upper, lower) = root.split_vertically(10 + 22 * lines.len() as i32);
    let style = TextStyle::from(("sans-serif", 18).into_font());
    for (i, line) in lines.iter().enumerate() {
        upper.draw_text(line, &style, (10, 5 + 22 * i as i32))?;
    }
    //
    let x_min = bars.first().map(|b| b.0 as f64).unwrap_or(0.) - 1.;
    let x_max = bars.last().map(|b| b.0 as f64).unwrap_or(0.) + 1.;
    let y_max = bars.iter().map(|b| b.1).max().unwrap_or(0) as f64 * 1.1;
    let mut chart = ChartBuilder::on(&lower)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, 0f64..y_max.max(1.))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .x_desc("Length of the paths")
        .y_desc("Number of occurrences of each path length")
        .draw()?;
    chart.draw_series(bars.iter().map(|(length, count)| {
        let x = *length as f64;
        Rectangle::new([(x - 0.4, 0.), (x + 0.4, *count as f64)], BLUE.mix(0.7).filled())
    }))?;
    root.present()?;
    Ok(())
} // end of draw_on

/// Draws one bar per non zero length, writes `<output_name>.png`, `<output_name>.pdf`
/// and `<output_name>.svg` in outdir.
pub fn draw_histogram(title: &str, occurrences: &LengthOccurrences, outdir: &Path, output_name: &str) -> anyhow::Result<()> {
    let bars = nonzero_bars(occurrences);
    log::debug!("histogram {} : {} bars", output_name, bars.len());
    let files = ChartFiles::new(outdir, output_name);
    draw_on(BitMapBackend::new(&files.png, FIGURE_SIZE).into_drawing_area(), &bars, title)?;
    let mut svg = String::new();
    draw_on(SVGBackend::with_string(&mut svg, FIGURE_SIZE).into_drawing_area(), &bars, title)?;
    files.write_vector(&svg)?;
    log::info!("written {:?} and {:?}", files.png, files.pdf);
    Ok(())
} // end of draw_histogram

//==================================================================================================

// end of mod tests
