//! Share Chart
//!
//! Draws a single-series percentage-over-time line chart onto any
//! [`Surface`]. Points are spaced by ordinal position, not calendar
//! distance; the y axis always starts at zero.

mod surface;

pub use surface::{Baseline, DisplayList, DrawOp, Point, Surface, TextAlign};

use crate::format::month_label;
use crate::model::SeriesPoint;
use crate::state::MonthKey;

/// Message drawn instead of axes when there is nothing to plot.
pub const NO_SERIES: &str = "No series data found for this tag.";

const PAD_LEFT: f64 = 48.0;
const PAD_RIGHT: f64 = 18.0;
const PAD_TOP: f64 = 14.0;
const PAD_BOTTOM: f64 = 34.0;

const DOT_RADIUS: f64 = 2.5;
const HIGHLIGHT_RADIUS: f64 = 4.0;
const TICK_LENGTH: f64 = 4.0;
const MIN_Y_MAX: f64 = 0.01;
const MAX_X_LABELS: usize = 6;

/// Top of the y scale: 10% headroom over the largest share, never zero.
pub fn y_max(points: &[SeriesPoint]) -> f64 {
    let top = points
        .iter()
        .map(|p| p.video_share)
        .filter(|y| y.is_finite())
        .fold(0.0_f64, f64::max)
        * 1.1;
    if top > 0.0 {
        top
    } else {
        MIN_Y_MAX
    }
}

/// Every how many points an x label is drawn.
pub fn label_stride(n: usize) -> usize {
    (n / MAX_X_LABELS).max(1)
}

/// Tick label, percentage to one decimal place.
pub fn tick_label(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

/// Plot rectangle and value-to-position mapping for one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plot {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub y_max: f64,
    pub n: usize,
}

impl Plot {
    pub fn new(width: f64, height: f64, points: &[SeriesPoint]) -> Self {
        Self {
            left: PAD_LEFT,
            top: PAD_TOP,
            width: width - PAD_LEFT - PAD_RIGHT,
            height: height - PAD_TOP - PAD_BOTTOM,
            y_max: y_max(points),
            n: points.len(),
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn x_for(&self, i: usize) -> f64 {
        if self.n <= 1 {
            self.left + self.width / 2.0
        } else {
            self.left + (i as f64 * self.width) / (self.n - 1) as f64
        }
    }

    pub fn y_for(&self, y: f64) -> f64 {
        self.top + (1.0 - y / self.y_max) * self.height
    }
}

/// Chart geometry and pixel density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartRenderer {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 220.0,
            pixel_ratio: 1.0,
        }
    }
}

impl ChartRenderer {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
        }
    }

    /// Draw onto a fresh recording surface.
    pub fn render(&self, points: &[SeriesPoint], highlight: Option<&MonthKey>) -> DisplayList {
        let mut list = DisplayList::new();
        self.draw(&mut list, points, highlight);
        list
    }

    /// Clear `surface` and draw the series. Safe to call repeatedly.
    pub fn draw(&self, surface: &mut dyn Surface, points: &[SeriesPoint], highlight: Option<&MonthKey>) {
        surface.configure(self.width, self.height, self.pixel_ratio);
        surface.set_transform(self.pixel_ratio);
        surface.clear_rect(0.0, 0.0, self.width, self.height);

        if points.is_empty() {
            surface.fill_text(NO_SERIES, (10.0, 20.0), TextAlign::Start, Baseline::Alphabetic);
            return;
        }

        let plot = Plot::new(self.width, self.height, points);

        surface.stroke_line((plot.left, plot.top), (plot.left, plot.bottom()));
        surface.stroke_line((plot.left, plot.bottom()), (plot.right(), plot.bottom()));

        for tick in [0.0, plot.y_max / 2.0, plot.y_max] {
            let y = plot.y_for(tick);
            surface.stroke_line((plot.left - TICK_LENGTH, y), (plot.left, y));
            surface.fill_text(&tick_label(tick), (plot.left - 6.0, y), TextAlign::Right, Baseline::Middle);
        }

        let positions: Vec<Point> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (plot.x_for(i), plot.y_for(p.video_share)))
            .collect();
        surface.stroke_polyline(&positions);

        let selected = highlight.and_then(|key| points.iter().position(|p| &p.month == key));
        for (i, at) in positions.iter().enumerate() {
            let highlighted = Some(i) == selected;
            let radius = if highlighted { HIGHLIGHT_RADIUS } else { DOT_RADIUS };
            surface.fill_circle(*at, radius, highlighted);
        }

        let stride = label_stride(points.len());
        let last = points.len() - 1;
        for (i, p) in points.iter().enumerate() {
            if i % stride != 0 && i != last {
                continue;
            }
            surface.fill_text(
                month_label(p.month.as_str()),
                (plot.x_for(i), plot.bottom() + 8.0),
                TextAlign::Center,
                Baseline::Top,
            );
        }
    }
}
