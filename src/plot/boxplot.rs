//! Grouped box and whisker charts.
//!
//! x axis : demand pair count categories, one group of boxes per category,
//! one box per series label inside a group (hue), y axis : the metric.

use plotters::coord::Shift;
use plotters::prelude::*;

use std::path::Path;

use super::table::LongTable;
use super::{wrap_title, ChartFiles, DPS_AXIS_DESC};

// pixels per caption line
const CAPTION_LINE_HEIGHT: i32 = 22;
const CAPTION_FONT_SIZE: u32 = 18;

/// Geometry of boxes within a category group
#[derive(Clone, Debug, PartialEq)]
pub struct GroupLayout {
    /// box width in pixels
    pub box_width: u32,
    /// pixel offset of each series from the category center
    pub offsets: Vec<f64>,
}

/// Spreads `nb_series` boxes over 80% of a category slot of `slot_px` pixels, centered.
pub fn group_layout(slot_px: u32, nb_series: usize) -> GroupLayout {
    if nb_series == 0 {
        return GroupLayout { box_width: 0, offsets: Vec::new() };
    }
    let step = (slot_px as f64 * 0.8) / nb_series as f64;
    let box_width = ((step * 0.8).floor() as u32).max(1);
    let center = (nb_series as f64 - 1.) / 2.;
    let offsets = (0..nb_series).map(|i| (i as f64 - center) * step).collect();
    GroupLayout { box_width, offsets }
} // end of group_layout

fn draw_on<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, table: &LongTable, caption: &str, y_desc: &str) -> anyhow::Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (width, _) = root.dim_in_pixel();
    // a caption character is roughly half the font size wide
    let max_chars = ((width as usize) * 2 / CAPTION_FONT_SIZE as usize).max(20);
    let lines = wrap_title(caption, max_chars);
    let (upper, lower) = root.split_vertically(10 + CAPTION_LINE_HEIGHT * lines.len() as i32);
    let caption_style = TextStyle::from(("sans-serif", CAPTION_FONT_SIZE).into_font());
    for (i, line) in lines.iter().enumerate() {
        upper.draw_text(line, &caption_style, (10, 5 + CAPTION_LINE_HEIGHT * i as i32))?;
    }
    //
    let categories = table.get_categories();
    let labels = table.get_labels();
    let nb_cat = categories.len() as u32;
    let y_max = (table.max_value() as f32 * 1.1).max(1.);
    let mut chart = ChartBuilder::on(&lower)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d((0u32..nb_cat).into_segmented(), 0f32..y_max)?;
    //
    let x_formatter = |v: &SegmentValue<u32>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            categories.get(*i as usize).map(|c| c.to_string()).unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };
    let y_formatter = |y: &f32| format!("{:.0}", y);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(categories.len() + 1)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .x_desc(DPS_AXIS_DESC)
        .y_desc(y_desc)
        .draw()?;
    //
    let plot_width = chart.plotting_area().dim_in_pixel().0;
    let layout = group_layout(plot_width / nb_cat.max(1), labels.len());
    for (l, label) in labels.iter().enumerate() {
        let color = Palette99::pick(l).to_rgba();
        let mut boxes = Vec::new();
        for (c, category) in categories.iter().enumerate() {
            let values = table.cell_values(*category, l);
            if values.is_empty() {
                continue;
            }
            let values: Vec<f64> = values.iter().map(|v| *v as f64).collect();
            let quartiles = Quartiles::new(&values);
            boxes.push(
                Boxplot::new_vertical(SegmentValue::CenterOf(c as u32), &quartiles)
                    .width(layout.box_width)
                    .whisker_width(0.5)
                    .style(color)
                    .offset(layout.offsets[l]),
            );
        }
        chart
            .draw_series(boxes)?
            .label(*label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
} // end of draw_on

/// Draws the grouped box plot of table, writes `<base>.png` and `<base>.pdf` (and the `<base>.svg`
/// the pdf is converted from) in outdir.
pub fn draw_grouped_boxplot(
    table: &LongTable,
    caption: &str,
    y_desc: &str,
    size: (u32, u32),
    outdir: &Path,
    base: &str,
) -> anyhow::Result<()> {
    let files = ChartFiles::new(outdir, base);
    log::info!("drawing box plot {:?}", files.png);
    draw_on(BitMapBackend::new(&files.png, size).into_drawing_area(), table, caption, y_desc)?;
    let mut svg = String::new();
    draw_on(SVGBackend::with_string(&mut svg, size).into_drawing_area(), table, caption, y_desc)?;
    log::info!("drawing box plot {:?}", files.pdf);
    files.write_vector(&svg)?;
    Ok(())
} // end of draw_grouped_boxplot

//==================================================================================================

// end of mod tests
