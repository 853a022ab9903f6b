//! Depth-section rendering of vote maps.
//!
//! Draws the region-filtered vote map as a scatter plot of horizontal
//! distance against depth, colored by vote count, with a vote colorbar and
//! dashed reference depth lines. Rendering goes through an explicitly
//! acquired drawing area that is presented and dropped before returning.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::RenderConfig;
use crate::core::transforms::lon_to_km;
use crate::core::writers::ensure_parent_dirs;
use crate::processors::filtering::RegionView;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Outer margin in pixels.
const MARGIN: u32 = 20;

/// Height reserved for the title.
const CAPTION_HEIGHT: u32 = 50;

/// Space for x axis ticks and description.
const X_LABEL_AREA: u32 = 60;

/// Space for y axis ticks and description.
const Y_LABEL_AREA: u32 = 80;

/// Width of the colorbar panel on the right.
const LEGEND_WIDTH: u32 = 200;

/// Plot area height bounds in pixels.
const MIN_PLOT_HEIGHT: f64 = 200.0;
const MAX_PLOT_HEIGHT: f64 = 4000.0;

/// Smallest plot area width in pixels.
const MIN_PLOT_WIDTH: u32 = 200;

/// Reference line colors, cycled in order.
const REFERENCE_COLORS: &[RGBColor] = &[BLUE, RED, BLACK];

/// One plotted row: horizontal distance (km), depth (km), votes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionPoint {
    pub distance_km: f64,
    pub depth_km: f64,
    pub votes: u32,
}

/// Pixel size and data ranges chosen so one km spans the same number of
/// pixels on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLayout {
    pub x_range: (f64, f64),
    pub depth_range: (f64, f64),
    pub width: u32,
    pub height: u32,
    pub plot_width: f64,
    pub plot_height: f64,
}

/// Convert a region view into plottable rows.
///
/// Rows at or below `config.max_depth_km` are dropped. Zero-vote rows are
/// kept here and only skipped when drawing.
pub fn section_points(view: &RegionView<'_>, config: &RenderConfig) -> Vec<SectionPoint> {
    view.iter()
        .filter(|&(_, depth, _)| depth < config.max_depth_km)
        .map(|(lon, depth, votes)| SectionPoint {
            distance_km: lon_to_km(lon, config.display_latitude),
            depth_km: depth,
            votes,
        })
        .collect()
}

/// Color for a vote count on a viridis scale from 1 to `num_datasets`.
///
/// Returns `None` for zero votes, which are drawn fully transparent.
pub fn vote_color(votes: u32, num_datasets: usize) -> Option<RGBColor> {
    if votes == 0 {
        return None;
    }

    let t = if num_datasets <= 1 {
        0.0
    } else {
        ((votes as f64 - 1.0) / (num_datasets as f64 - 1.0)).clamp(0.0, 1.0)
    };

    Some(ViridisRGB.get_color(t))
}

/// Compute the bounds (min/max) of distance and depth, padded by 5%.
///
/// Reference depths are included so their lines are always visible.
fn compute_bounds(points: &[SectionPoint], reference_depths: &[f64]) -> ((f64, f64), (f64, f64)) {
    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;

    for p in points {
        x_min = x_min.min(p.distance_km);
        x_max = x_max.max(p.distance_km);
        y_min = y_min.min(p.depth_km);
        y_max = y_max.max(p.depth_km);
    }
    for &d in reference_depths {
        y_min = y_min.min(d);
        y_max = y_max.max(d);
    }

    if x_min > x_max {
        x_min = -1000.0;
        x_max = 1000.0;
    }
    if y_min > y_max {
        y_min = 0.0;
        y_max = 1000.0;
    }

    if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let x_pad = (x_max - x_min) * 0.05;
    let y_pad = (y_max - y_min) * 0.05;

    ((x_min - x_pad, x_max + x_pad), (y_min - y_pad, y_max + y_pad))
}

fn expand_centered(range: (f64, f64), span: f64) -> (f64, f64) {
    let mid = (range.0 + range.1) / 2.0;
    (mid - span / 2.0, mid + span / 2.0)
}

/// Choose the image size for an equal-aspect plot of the given ranges.
///
/// The plot area width follows from `width`; the height follows from the
/// data aspect ratio. When that height falls outside the allowed bounds the
/// shorter axis range is widened instead of distorting the scale.
pub fn equal_aspect_layout(x_range: (f64, f64), depth_range: (f64, f64), width: u32) -> PlotLayout {
    let plot_width = width
        .saturating_sub(LEGEND_WIDTH + Y_LABEL_AREA + 2 * MARGIN)
        .max(MIN_PLOT_WIDTH) as f64;

    let mut x_range = x_range;
    let mut depth_range = depth_range;
    let x_span = x_range.1 - x_range.0;
    let y_span = depth_range.1 - depth_range.0;

    let mut scale = plot_width / x_span;
    let mut plot_height = y_span * scale;

    if plot_height > MAX_PLOT_HEIGHT {
        scale = MAX_PLOT_HEIGHT / y_span;
        plot_height = MAX_PLOT_HEIGHT;
        x_range = expand_centered(x_range, plot_width / scale);
    } else if plot_height < MIN_PLOT_HEIGHT {
        plot_height = MIN_PLOT_HEIGHT;
        depth_range = expand_centered(depth_range, plot_height / scale);
    }

    let total_width = plot_width as u32 + LEGEND_WIDTH + Y_LABEL_AREA + 2 * MARGIN;
    let total_height = plot_height.round() as u32 + CAPTION_HEIGHT + X_LABEL_AREA + 2 * MARGIN;

    PlotLayout {
        x_range,
        depth_range,
        width: total_width,
        height: total_height,
        plot_width,
        plot_height,
    }
}

/// Evenly spaced dash segments covering `[start, end]`.
fn dash_segments(start: f64, end: f64) -> Vec<(f64, f64)> {
    let dash = (end - start) / 100.0;
    let gap = dash * 0.6;
    let mut segments = Vec::new();
    let mut a = start;
    while a < end {
        segments.push((a, (a + dash).min(end)));
        a += dash + gap;
    }
    segments
}

fn plot_err<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::PlottingError(e.to_string())
}

/// Draw the depth section onto an acquired drawing area.
///
/// Depth increases downward: the chart's y coordinate is negated depth, and
/// tick labels show the positive depth.
pub fn draw_depth_section<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[SectionPoint],
    layout: &PlotLayout,
    num_datasets: usize,
    config: &RenderConfig,
) -> Result<()> {
    let [r, g, b] = config.background;
    root.fill(&RGBColor(r, g, b)).map_err(plot_err)?;

    let (plot_area, legend_area) = root.split_horizontally(layout.width - LEGEND_WIDTH);

    let (x_min, x_max) = layout.x_range;
    let (d_min, d_max) = layout.depth_range;

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(MARGIN)
        .caption(
            format!(
                "Vote Map: Distance vs. Depth (Latitude = {}°)",
                config.display_latitude
            ),
            ("sans-serif", 28).into_font(),
        )
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_min..x_max, -d_max..-d_min)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Distance from 0° longitude (km)")
        .y_desc("Depth (km)")
        .y_label_formatter(&|v| format!("{:.0}", -*v + 0.0))
        .draw()
        .map_err(plot_err)?;

    let size = config.point_size;
    chart
        .draw_series(points.iter().filter_map(|p| {
            vote_color(p.votes, num_datasets)
                .map(|color| Circle::new((p.distance_km, -p.depth_km), size, color.filled()))
        }))
        .map_err(plot_err)?;

    for (i, &depth) in config.reference_depths_km.iter().enumerate() {
        let color = REFERENCE_COLORS[i % REFERENCE_COLORS.len()];
        let y = -depth;
        chart
            .draw_series(
                dash_segments(x_min, x_max)
                    .into_iter()
                    .map(move |(a, b)| PathElement::new(vec![(a, y), (b, y)], color.stroke_width(1))),
            )
            .map_err(plot_err)?
            .label(format!("{} km", depth))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(1)));
    }

    if !config.reference_depths_km.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_err)?;
    }

    draw_colorbar(&legend_area, num_datasets)
}

/// Draw a discrete viridis colorbar for vote counts 1..=num_datasets.
fn draw_colorbar<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, num_datasets: usize) -> Result<()> {
    let top = num_datasets.max(1) as f64;

    let mut bar = ChartBuilder::on(area)
        .margin(MARGIN)
        .margin_top(MARGIN + CAPTION_HEIGHT)
        .margin_bottom(MARGIN + X_LABEL_AREA)
        .caption("Number of votes", ("sans-serif", 18).into_font())
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, 0.5..top + 0.5)
        .map_err(plot_err)?;

    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_labels(num_datasets.clamp(1, 10))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()
        .map_err(plot_err)?;

    bar.draw_series((1..=num_datasets.max(1) as u32).filter_map(|k| {
        vote_color(k, num_datasets).map(|color| {
            let k = k as f64;
            Rectangle::new([(0.0, k - 0.5), (1.0, k + 0.5)], color.filled())
        })
    }))
    .map_err(plot_err)?;

    Ok(())
}

/// Render a region view as a depth-section PNG.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image (parent directories are created)
/// * `view` - Longitude-filtered vote map rows
/// * `num_datasets` - Dataset count, the top of the color scale
/// * `config` - Display latitude, depth cutoff, reference lines and sizing
///
/// # Errors
///
/// Returns `Io` if the destination directory cannot be created and
/// `PlottingError` if drawing or encoding the image fails.
pub fn render_depth_section(
    output_path: &Path,
    view: &RegionView<'_>,
    num_datasets: usize,
    config: &RenderConfig,
) -> Result<()> {
    ensure_parent_dirs(output_path)?;

    let points = section_points(view, config);
    let (x_range, depth_range) = compute_bounds(&points, &config.reference_depths_km);
    let layout = equal_aspect_layout(x_range, depth_range, config.width);

    log::debug!(
        "rendering {} rows ({} with votes) at {}x{}",
        points.len(),
        points.iter().filter(|p| p.votes > 0).count(),
        layout.width,
        layout.height
    );

    {
        let root = BitMapBackend::new(output_path, (layout.width, layout.height)).into_drawing_area();
        draw_depth_section(&root, &points, &layout, num_datasets, config)?;
        root.present().map_err(plot_err)?;
    }

    log::info!("2D vote map saved as {}", output_path.display());
    Ok(())
}
