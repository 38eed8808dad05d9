use eframe::egui::{self, Align2, FontId, Sense, Stroke, Ui, vec2};
use orbit_graph::engine::NodePrimitive;
use orbit_graph::{EnergyState, Viewport};

use super::super::ViewModel;
use super::super::render_utils::{
    CARD_BORDER_COLOR, MUTED_TEXT_COLOR, RECEIVED_COLOR, SELECTION_COLOR, SURFACE_COLOR,
    TEXT_COLOR, circle_visible, draw_background, edge_visible, fade,
};

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if let Some(report) = self
            .simulation
            .set_viewport(Viewport::new(rect.width(), rect.height()))
        {
            self.last_report = report;
        }

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pointer(ui, rect, &response);

        let moving = self.simulation.tick();
        if moving
            || self.simulation.energy_state() == EnergyState::Perturbed
            || self.simulation.is_gesture_active()
        {
            ui.ctx().request_repaint();
        }

        draw_background(&painter, rect, self.simulation.transform());

        if self.simulation.bodies().is_empty() {
            let message = if self.simulation.has_pending() {
                "Measuring graph area..."
            } else {
                "The payload has no nodes."
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(14.0),
                MUTED_TEXT_COLOR,
            );
            return;
        }

        let offset = rect.min.to_vec2();
        let frame = self.simulation.frame();
        let scale = frame.transform.scale;

        for edge in &frame.edges {
            let start = edge.from + offset;
            let end = edge.to + offset;
            if !edge_visible(rect, start, end, edge.width) {
                continue;
            }
            painter.line_segment(
                [start, end],
                Stroke::new(edge.width, fade(edge.visual.color, edge.visual.opacity)),
            );
        }

        let mut hovered = false;
        let pointer = ui.input(|input| input.pointer.hover_pos());
        for node in &frame.nodes {
            let center = node.center + offset;
            let card_rect = node.visual.card.rect(center, scale);
            if !circle_visible(rect, center, node.radius) && !rect.intersects(card_rect) {
                continue;
            }
            if pointer.is_some_and(|pointer| {
                center.distance(pointer) <= node.radius || card_rect.contains(pointer)
            }) {
                hovered = true;
            }
            draw_node(&painter, node, center, scale);
        }

        if hovered {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
    }
}

fn draw_node(painter: &egui::Painter, node: &NodePrimitive<'_>, center: egui::Pos2, scale: f32) {
    let visual = node.visual;
    let opacity = visual.opacity;

    painter.circle_filled(center, node.radius, fade(SURFACE_COLOR, opacity));
    painter.circle_stroke(
        center,
        node.radius,
        Stroke::new(visual.ring_width * scale, fade(visual.ring_color, opacity)),
    );
    if visual.selected {
        painter.circle_stroke(
            center,
            node.radius + 5.0 * scale,
            Stroke::new(1.6 * scale, fade(SELECTION_COLOR, 0.8)),
        );
    }

    let card = &visual.card;
    let card_rect = card.rect(center, scale);
    painter.rect_filled(card_rect, 8.0 * scale, fade(SURFACE_COLOR, opacity * 0.92));
    painter.rect_stroke(
        card_rect,
        8.0 * scale,
        Stroke::new(1.0, fade(CARD_BORDER_COLOR, opacity)),
        egui::StrokeKind::Inside,
    );

    if card.has_stats() {
        let row = card.stats_anchor(center, scale);
        let both = card.sent.is_some() && card.received.is_some();
        if let Some(sent) = card.sent {
            let x = if both { -20.0 } else { -8.0 };
            draw_stat(painter, row + vec2(x, 0.0) * scale, "OUT", sent, TEXT_COLOR, opacity, scale);
        }
        if let Some(received) = card.received {
            let x = if both { 12.0 } else { -8.0 };
            draw_stat(
                painter,
                row + vec2(x, 0.0) * scale,
                "IN",
                received,
                RECEIVED_COLOR,
                opacity,
                scale,
            );
        }
    }

    painter.text(
        card.name_anchor(center, scale),
        Align2::CENTER_BOTTOM,
        visual.name.as_str(),
        FontId::proportional(11.0 * scale),
        fade(TEXT_COLOR, opacity),
    );
}

fn draw_stat(
    painter: &egui::Painter,
    at: egui::Pos2,
    label: &str,
    value: u32,
    color: egui::Color32,
    opacity: f32,
    scale: f32,
) {
    let label_rect = painter.text(
        at,
        Align2::LEFT_BOTTOM,
        label,
        FontId::proportional(7.0 * scale),
        fade(MUTED_TEXT_COLOR, opacity),
    );
    painter.text(
        label_rect.right_bottom() + vec2(3.0 * scale, 0.0),
        Align2::LEFT_BOTTOM,
        value.to_string(),
        FontId::proportional(11.0 * scale),
        fade(color, opacity),
    );
}
