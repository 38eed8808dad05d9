use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};
use orbit_graph::Transform;

pub(super) const SURFACE_COLOR: Color32 = Color32::from_rgb(24, 28, 36);
pub(super) const CARD_BORDER_COLOR: Color32 = Color32::from_rgb(58, 66, 80);
pub(super) const TEXT_COLOR: Color32 = Color32::from_gray(236);
pub(super) const MUTED_TEXT_COLOR: Color32 = Color32::from_gray(150);
pub(super) const RECEIVED_COLOR: Color32 = Color32::from_rgb(0x63, 0x66, 0xf1);
pub(super) const SELECTION_COLOR: Color32 = Color32::from_rgb(245, 206, 93);

/// Scales the alpha of `color` by `opacity`.
pub(super) fn fade(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: Transform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * transform.scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + transform.translate;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
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

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(padding);
    rect.intersects(bounds)
}
