//! Replays a recorded chart onto a ratatui canvas.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Line as TextLine,
    widgets::canvas::{Canvas, Circle, Context, Line},
};

use crate::chart::{DisplayList, DrawOp, Point, TextAlign};

/// Canvas y grows upward; display units grow downward.
fn flip(height: f64, (x, y): Point) -> Point {
    (x, height - y)
}

/// Left edge of a text run of `len` cells anchored at `x`.
fn text_start(x: f64, len: usize, align: TextAlign, cell_width: f64) -> f64 {
    let span = len as f64 * cell_width;
    match align {
        TextAlign::Start => x,
        TextAlign::Center => x - span / 2.0,
        TextAlign::Right => x - span,
    }
}

fn paint(ctx: &mut Context, list: &DisplayList, cell_width: f64) {
    let (_, height) = list.size();
    for op in list.ops() {
        match op {
            DrawOp::Line { from, to } => {
                let (x1, y1) = flip(height, *from);
                let (x2, y2) = flip(height, *to);
                ctx.draw(&Line { x1, y1, x2, y2, color: Color::DarkGray });
            }
            DrawOp::Polyline(points) => {
                for pair in points.windows(2) {
                    let (x1, y1) = flip(height, pair[0]);
                    let (x2, y2) = flip(height, pair[1]);
                    ctx.draw(&Line { x1, y1, x2, y2, color: Color::Cyan });
                }
            }
            DrawOp::Dot { center, radius, highlighted } => {
                let (x, y) = flip(height, *center);
                let color = if *highlighted { Color::Yellow } else { Color::Cyan };
                ctx.draw(&Circle { x, y, radius: *radius, color });
            }
            DrawOp::Text { text, at, align, .. } => {
                let (x, y) = flip(height, *at);
                let x = text_start(x, text.chars().count(), *align, cell_width).max(0.0);
                ctx.print(x, y, TextLine::styled(text.clone(), Style::default().fg(Color::Gray)));
            }
        }
    }
}

/// Canvas widget sized to `area` that draws `list`.
pub(super) fn chart(list: &DisplayList, area: Rect) -> Canvas<'_, impl Fn(&mut Context) + '_> {
    let (width, height) = list.size();
    let cell_width = if area.width > 0 { width / f64::from(area.width) } else { 0.0 };
    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, width.max(1.0)])
        .y_bounds([0.0, height.max(1.0)])
        .paint(move |ctx| paint(ctx, list, cell_width))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_inverts_vertical_axis() {
        assert_eq!(flip(220.0, (10.0, 20.0)), (10.0, 200.0));
        assert_eq!(flip(220.0, (0.0, 220.0)), (0.0, 0.0));
    }

    #[test]
    fn test_text_start_by_alignment() {
        assert_eq!(text_start(100.0, 4, TextAlign::Start, 2.0), 100.0);
        assert_eq!(text_start(100.0, 4, TextAlign::Center, 2.0), 96.0);
        assert_eq!(text_start(100.0, 4, TextAlign::Right, 2.0), 92.0);
    }
}
