use eframe::egui::{self, Key, KeyboardShortcut, Modifiers, Pos2, Rect, Ui};
use health_graph::ViewEvent;

use super::super::ViewModel;
use super::super::render_utils::{circle_visible, screen_to_world};

const UNDO: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);
const REDO: KeyboardShortcut =
    KeyboardShortcut::new(Modifiers::COMMAND.plus(Modifiers::SHIFT), Key::Z);
const REDO_ALT: KeyboardShortcut = KeyboardShortcut::new(Modifiers::COMMAND, Key::Y);

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
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 5.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    /// Primary drag on a node moves it; any other drag pans the view.
    pub(in crate::app) fn handle_graph_drag(
        &mut self,
        response: &egui::Response,
        grabbed: Option<usize>,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            self.dragged_node = grabbed;
        }
        if response.drag_stopped() {
            self.dragged_node = None;
        }

        let delta = response.drag_delta();
        if delta == egui::Vec2::ZERO {
            return;
        }

        match self.dragged_node {
            Some(index) if response.dragged_by(egui::PointerButton::Primary) => {
                self.canvas.move_node(index, delta / self.zoom);
            }
            _ => self.pan += delta,
        }
    }

    /// Keyboard shortcuts become the same events the buttons send.
    pub(in crate::app) fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        let (redo, undo, escape) = ctx.input_mut(|input| {
            let redo = input.consume_shortcut(&REDO) || input.consume_shortcut(&REDO_ALT);
            let undo = input.consume_shortcut(&UNDO);
            let escape = input.consume_key(Modifiers::NONE, Key::Escape);
            (redo, undo, escape)
        });

        if undo {
            self.canvas.push_event(ViewEvent::Undo);
        }
        if redo {
            self.canvas.push_event(ViewEvent::Redo);
        }
        if escape {
            self.canvas.push_event(ViewEvent::BackgroundClicked);
        }
    }

    pub(in crate::app) fn visible_indices(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Vec<usize> {
        (0..screen_positions.len())
            .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index]))
            .collect()
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
