// SVG chart renderer built on plotters
use crate::application::errors::RenderError;
use crate::application::renderer::ChartRenderer;
use crate::domain::chart::{PaneKind, PlotOptions};
use crate::domain::document::Element;
use crate::domain::series::{data_range, value_extent, RenderPoint, RenderSeries, TimeRange};
use crate::domain::units::{format_tick, AxisScale, DEFAULT_TICK_DECIMALS};
use plotters::prelude::*;

/// Default series colours, in series order.
const PALETTE: [RGBColor; 5] = [
    RGBColor(237, 194, 64),
    RGBColor(175, 216, 248),
    RGBColor(203, 75, 75),
    RGBColor(77, 167, 77),
    RGBColor(148, 64, 237),
];

const SELECTION_COLOR: RGBColor = RGBColor(232, 207, 172);
const DAY_MS: f64 = 86_400_000.0;
const LEGEND_PADDING: i32 = 6;
const LEGEND_ROW: i32 = 18;

#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn draw_error(error: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(error.to_string())
}

/// Parse `#rrggbb`.
pub fn parse_hex_color(value: &str) -> Option<RGBColor> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

fn series_color(series: &RenderSeries) -> RGBColor {
    series
        .options
        .color
        .as_deref()
        .and_then(parse_hex_color)
        .unwrap_or(PALETTE[series.id % PALETTE.len()])
}

fn pane_size(pane: &Element, kind: PaneKind) -> (u32, u32) {
    if pane.width == 0 || pane.height == 0 {
        kind.default_size()
    } else {
        (pane.width, pane.height)
    }
}

/// Keep plotters away from empty ranges.
fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        return (lo, hi);
    }
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.05 };
    (lo - pad, hi + pad)
}

fn x_bounds(series: &[RenderSeries], options: &PlotOptions) -> (f64, f64) {
    let data = data_range(series);
    let lo = options.xaxis.min.or(data.map(|r| r.from)).unwrap_or(0.0);
    let hi = options.xaxis.max.or(data.map(|r| r.to)).unwrap_or(lo);
    widen(lo, hi)
}

fn y_bounds(series: &[RenderSeries], options: &PlotOptions, window: TimeRange) -> (f64, f64) {
    let extent = value_extent(series, Some(window));
    let mut lo = options.yaxis.min.or(extent.map(|e| e.0)).unwrap_or(0.0);
    let mut hi = options.yaxis.max.or(extent.map(|e| e.1)).unwrap_or(lo);
    if options.bars.show || series.iter().any(RenderSeries::is_bars) {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if options.yaxis.max.is_none() {
        if let Some(margin) = options.yaxis.autoscale_margin {
            hi += (hi - lo) * margin;
        }
    }
    widen(lo, hi)
}

fn time_label(time_ms: f64, span_ms: f64) -> String {
    let Some(time) = chrono::DateTime::from_timestamp_millis(time_ms as i64) else {
        return String::new();
    };
    let format = if span_ms > 2.0 * DAY_MS {
        "%m-%d %H:%M"
    } else if span_ms > 60_000.0 {
        "%H:%M"
    } else {
        "%H:%M:%S"
    };
    time.format(format).to_string()
}

/// Runs of consecutive non-null points inside `window`.
pub fn line_segments(data: &[RenderPoint], window: TimeRange) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for point in data.iter().filter(|p| window.contains(p.time_ms)) {
        match point.value.filter(|v| v.is_finite()) {
            Some(value) => current.push((point.time_ms, value)),
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

impl ChartRenderer for SvgRenderer {
    fn draw_plot(
        &self,
        pane: &Element,
        series: &[RenderSeries],
        options: &PlotOptions,
    ) -> Result<String, RenderError> {
        let (width, height) = pane_size(pane, PaneKind::Plot);
        let (x_lo, x_hi) = x_bounds(series, options);
        let window = TimeRange::new(x_lo, x_hi);
        let (y_lo, y_hi) = y_bounds(series, options, window);

        let x_scale = AxisScale::new(x_lo.abs().max(x_hi.abs()), options.xaxis.tick_decimals);
        let y_scale = AxisScale::new(y_lo.abs().max(y_hi.abs()), options.yaxis.tick_decimals);
        let x_fmt = |v: &f64| match &options.xaxis.units {
            Some(units) => format_tick(*v, &x_scale, units),
            None => time_label(*v, x_hi - x_lo),
        };
        let y_fmt = |v: &f64| match &options.yaxis.units {
            Some(units) => format_tick(*v, &y_scale, units),
            None => format!(
                "{:.*}",
                options.yaxis.tick_decimals.unwrap_or(DEFAULT_TICK_DECIMALS),
                v
            ),
        };

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;

            let mut chart = ChartBuilder::on(&root)
                .margin(8)
                .x_label_area_size(if height > 150 { 30 } else { 20 })
                .y_label_area_size(if options.yaxis.show_ticks { 60 } else { 0 })
                .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
                .map_err(draw_error)?;

            {
                let mut mesh = chart.configure_mesh();
                mesh.x_labels(6)
                    .x_label_formatter(&x_fmt)
                    .y_label_formatter(&y_fmt);
                if !options.yaxis.show_ticks {
                    mesh.y_labels(0);
                }
                mesh.draw().map_err(draw_error)?;
            }

            if let Some(selection) = options.selection {
                let band = Rectangle::new(
                    [(selection.from.max(x_lo), y_lo), (selection.to.min(x_hi), y_hi)],
                    SELECTION_COLOR.mix(0.6).filled(),
                );
                chart.draw_series(std::iter::once(band)).map_err(draw_error)?;
            }

            let bar_width = options.bars.bar_width.unwrap_or((x_hi - x_lo) / 100.0);
            let base = if y_lo > 0.0 {
                y_lo
            } else if y_hi < 0.0 {
                y_hi
            } else {
                0.0
            };
            for s in series {
                let color = series_color(s);

                if s.options.bars.unwrap_or(options.bars.show) {
                    let half = bar_width / 2.0;
                    let bars = s
                        .data
                        .iter()
                        .filter(|p| window.contains(p.time_ms))
                        .filter_map(|p| p.value.map(|v| (p.time_ms, v)))
                        .map(|(t, v)| {
                            Rectangle::new([(t - half, base), (t + half, v)], color.filled())
                        });
                    chart.draw_series(bars).map_err(draw_error)?;
                }

                if s.options.lines.unwrap_or(options.lines.show) {
                    let line_width = s.options.line_width.unwrap_or(options.lines.line_width);
                    for segment in line_segments(&s.data, window) {
                        if options.shadow_size > 0 {
                            chart
                                .draw_series(LineSeries::new(
                                    segment.clone(),
                                    BLACK.mix(0.1).stroke_width(line_width + options.shadow_size),
                                ))
                                .map_err(draw_error)?;
                        }
                        chart
                            .draw_series(LineSeries::new(segment, color.stroke_width(line_width)))
                            .map_err(draw_error)?;
                    }
                }
            }

            root.present().map_err(draw_error)?;
        }

        Ok(svg)
    }

    fn draw_legend(&self, pane: &Element, series: &[RenderSeries]) -> Result<String, RenderError> {
        let (width, height) = pane_size(pane, PaneKind::Legend);

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;

            for (row, s) in series.iter().enumerate() {
                let y = LEGEND_PADDING + row as i32 * LEGEND_ROW;
                root.draw(&Rectangle::new(
                    [(LEGEND_PADDING, y), (LEGEND_PADDING + 14, y + 10)],
                    series_color(s).filled(),
                ))
                .map_err(draw_error)?;
                root.draw(&Text::new(
                    s.label.clone(),
                    (LEGEND_PADDING + 22, y),
                    ("sans-serif", 12).into_font(),
                ))
                .map_err(draw_error)?;
            }

            root.present().map_err(draw_error)?;
        }

        Ok(svg)
    }
}
