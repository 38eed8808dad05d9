use eframe::egui::{self, Pos2, Rect, Ui};
use orbit_graph::Click;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.simulation.zoom_at(local(rect, pointer), zoom_factor);
    }

    /// Forwards primary-button input to the simulation's gesture recognizer.
    pub(in crate::app) fn handle_graph_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        let (pressed, released, pointer) = ui.input(|input| {
            (
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.pointer.interact_pos(),
            )
        });
        let Some(pointer) = pointer else {
            // The pointer left the window mid-gesture; its release will not arrive.
            if self.simulation.is_gesture_active() {
                self.simulation.pointer_cancel();
            }
            return;
        };
        let at = local(rect, pointer);

        if pressed && response.hovered() {
            self.simulation.pointer_down(at);
            return;
        }
        if !self.simulation.is_gesture_active() {
            return;
        }
        if !released {
            self.simulation.pointer_move(at);
            return;
        }

        match self.simulation.pointer_up(at) {
            Some(Click::Node(node)) => self.simulation.select(Some(&node.id)),
            Some(Click::Edge(_)) => self.simulation.select(None),
            Some(Click::Background) => {
                self.simulation.select(None);
                self.inspected.borrow_mut().take();
            }
            None => {}
        }
    }
}

fn local(rect: Rect, pointer: Pos2) -> Pos2 {
    (pointer - rect.min).to_pos2()
}
