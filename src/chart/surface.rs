//! Drawing surfaces.
//!
//! [`Surface`] is the small subset of a 2D canvas context the chart needs.
//! [`DisplayList`] implements it by recording operations in display units,
//! which the terminal front-end replays and tests inspect.

/// Horizontal anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    Center,
    Right,
}

/// Vertical anchor of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    Alphabetic,
    Middle,
    Top,
}

pub type Point = (f64, f64);

/// A 2D drawing target addressed in display units once a transform is set.
pub trait Surface {
    /// Size the backing buffer to `floor(width * ratio) x floor(height * ratio)`.
    fn configure(&mut self, width: f64, height: f64, pixel_ratio: f64);

    /// Uniform display-to-physical scale applied to every later call.
    fn set_transform(&mut self, scale: f64);

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn stroke_line(&mut self, from: Point, to: Point);

    fn stroke_polyline(&mut self, points: &[Point]);

    fn fill_circle(&mut self, center: Point, radius: f64, highlighted: bool);

    fn fill_text(&mut self, text: &str, at: Point, align: TextAlign, baseline: Baseline);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line { from: Point, to: Point },
    Polyline(Vec<Point>),
    Dot { center: Point, radius: f64, highlighted: bool },
    Text { text: String, at: Point, align: TextAlign, baseline: Baseline },
}

impl DrawOp {
    fn anchor(&self) -> Point {
        match self {
            DrawOp::Line { from, .. } => *from,
            DrawOp::Polyline(points) => points.first().copied().unwrap_or((0.0, 0.0)),
            DrawOp::Dot { center, .. } => *center,
            DrawOp::Text { at, .. } => *at,
        }
    }
}

/// Recording surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    width: f64,
    height: f64,
    backing: (u32, u32),
    scale: f64,
    ops: Vec<DrawOp>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            ..Self::default()
        }
    }

    /// Size in display units.
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Size of the physical pixel buffer.
    pub fn backing_size(&self) -> (u32, u32) {
        self.backing
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Whether any straight stroke (axis or tick) was drawn.
    pub fn has_axes(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, DrawOp::Line { .. }))
    }

    pub fn dots(&self) -> impl Iterator<Item = (Point, f64, bool)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Dot { center, radius, highlighted } => Some((*center, *radius, *highlighted)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn polyline(&self) -> Option<&[Point]> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Polyline(points) => Some(points.as_slice()),
            _ => None,
        })
    }
}

impl Surface for DisplayList {
    fn configure(&mut self, width: f64, height: f64, pixel_ratio: f64) {
        self.width = width;
        self.height = height;
        self.backing = (
            (width * pixel_ratio).floor().max(0.0) as u32,
            (height * pixel_ratio).floor().max(0.0) as u32,
        );
    }

    fn set_transform(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if x <= 0.0 && y <= 0.0 && x + width >= self.width && y + height >= self.height {
            self.ops.clear();
            return;
        }
        self.ops.retain(|op| {
            let (px, py) = op.anchor();
            !(px >= x && px <= x + width && py >= y && py <= y + height)
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point) {
        self.ops.push(DrawOp::Line { from, to });
    }

    fn stroke_polyline(&mut self, points: &[Point]) {
        if !points.is_empty() {
            self.ops.push(DrawOp::Polyline(points.to_vec()));
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f64, highlighted: bool) {
        self.ops.push(DrawOp::Dot { center, radius, highlighted });
    }

    fn fill_text(&mut self, text: &str, at: Point, align: TextAlign, baseline: Baseline) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            at,
            align,
            baseline,
        });
    }
}
