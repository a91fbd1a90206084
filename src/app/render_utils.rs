use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::epaint::QuadraticBezierShape;
use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2, vec2};
use health_graph::{EdgeCurve, Rgb, Segment};

pub(super) const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
pub(super) const EMPTY_PIE_COLOR: Color32 = Color32::from_rgb(58, 64, 74);

pub(super) fn rgb_color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| ((a as f32 * (1.0 - amount)) + (b as f32 * amount)) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0) as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(22, 25, 31));

    let step = (64.0 * zoom.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(62, 70, 82, 60));

    let mut x = origin.x.rem_euclid(step) + rect.left();
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step) + rect.top();
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Boundary points of the arc from `start` to `end` (radians, clockwise on
/// screen), one point every few degrees.
fn arc_points(center: Pos2, radius: f32, start: f32, end: f32) -> Vec<Pos2> {
    let steps = (((end - start) / 0.08).ceil() as usize).max(1);
    (0..=steps)
        .map(|step| {
            let angle = start + (end - start) * (step as f32 / steps as f32);
            center + vec2(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// Fills a pie chart starting at twelve o'clock. Wedges past the full
/// circle are cut off; an unfilled remainder shows the empty color.
pub(super) fn draw_pie(painter: &Painter, center: Pos2, radius: f32, segments: &[Segment], tint: f32) {
    painter.circle_filled(center, radius, dim_color(EMPTY_PIE_COLOR, tint));

    let mut start = -FRAC_PI_2;
    let limit = start + TAU;
    for segment in segments {
        if start >= limit {
            break;
        }
        let end = (start + segment.proportion as f32 * TAU).min(limit);
        if end - start <= f32::EPSILON {
            continue;
        }

        let color = dim_color(rgb_color(segment.color), tint);
        // convex_polygon needs convex input, so wedges go out in quarter turns.
        let mut chunk_start = start;
        while chunk_start < end {
            let chunk_end = (chunk_start + FRAC_PI_2).min(end);
            let mut points = vec![center];
            points.extend(arc_points(center, radius, chunk_start, chunk_end));
            painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
            chunk_start = chunk_end;
        }
        start = end;
    }
}

fn draw_arrow_head(painter: &Painter, tip: Pos2, direction: Vec2, size: f32, color: Color32) {
    let back = tip - direction * size;
    let side = direction.rot90() * (size * 0.5);
    painter.add(Shape::convex_polygon(
        vec![tip, back + side, back - side],
        color,
        Stroke::NONE,
    ));
}

/// Draws one edge between two node circles, stopping at their rims.
#[allow(clippy::too_many_arguments)]
pub(super) fn draw_edge(
    painter: &Painter,
    start: Pos2,
    start_radius: f32,
    end: Pos2,
    end_radius: f32,
    curve: EdgeCurve,
    width: f32,
    color: Color32,
    arrow: bool,
) {
    let delta = end - start;
    let length = delta.length();
    if length <= start_radius + end_radius {
        return;
    }
    let direction = delta / length;
    let arrow_size = (width * 3.0).clamp(6.0, 16.0);
    let stroke = Stroke::new(width, color);

    match curve {
        EdgeCurve::Straight => {
            let from = start + direction * start_radius;
            let tip = end - direction * end_radius;
            let line_end = if arrow { tip - direction * arrow_size * 0.8 } else { tip };
            painter.line_segment([from, line_end], stroke);
            if arrow {
                draw_arrow_head(painter, tip, direction, arrow_size, color);
            }
        }
        EdgeCurve::Bezier => {
            let control = start + delta * 0.5 + direction.rot90() * (length * 0.18);
            let out = (control - start).normalized();
            let back = (end - control).normalized();
            let from = start + out * start_radius;
            let tip = end - back * end_radius;
            let line_end = if arrow { tip - back * arrow_size * 0.8 } else { tip };
            painter.add(QuadraticBezierShape::from_points_stroke(
                [from, control, line_end],
                false,
                Color32::TRANSPARENT,
                stroke,
            ));
            if arrow {
                draw_arrow_head(painter, tip, back, arrow_size, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_and_screen_round_trip() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
        let pan = vec2(30.0, -12.0);
        let world = vec2(-120.0, 44.0);
        let screen = world_to_screen(rect, pan, 1.6, world);
        let back = screen_to_world(rect, pan, 1.6, screen);
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn arc_points_span_the_requested_angle() {
        let points = arc_points(Pos2::ZERO, 10.0, 0.0, FRAC_PI_2);
        let first = points.first().unwrap();
        let last = points.last().unwrap();
        assert!((first.x - 10.0).abs() < 1e-3 && first.y.abs() < 1e-3);
        assert!(last.x.abs() < 1e-3 && (last.y - 10.0).abs() < 1e-3);
    }

    #[test]
    fn blend_moves_toward_overlay() {
        let mixed = blend_color(Color32::BLACK, Color32::WHITE, 0.5);
        assert!((120..=135).contains(&mixed.r()));
        assert_eq!(blend_color(Color32::BLACK, Color32::WHITE, 2.0), Color32::WHITE);
    }
}
