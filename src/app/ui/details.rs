use eframe::egui::{self, RichText, Ui};
use health_graph::{GraphError, Rgb};
use tracing::warn;

use crate::util::{short_name, symptom_lines};

use super::super::ViewModel;
use super::super::render_utils::rgb_color;

/// What a click in the details panel asked for. Applied after the panel is
/// drawn so the session is not borrowed while iterating its nodes.
enum DetailAction {
    Select(String),
    Deselect(String),
    Collapse(String),
    Expand(String),
    CollapseRecursively(String),
    ExpandRecursively(String),
}

fn swatch(rgb: Rgb) -> RichText {
    RichText::new("■").color(rgb_color(rgb))
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let selected = self.session.selected_ids().iter().cloned().collect::<Vec<_>>();
        if selected.is_empty() {
            ui.label("Click a node to select it.");
            return;
        }

        let mut actions = Vec::new();
        egui::ScrollArea::vertical()
            .id_salt("selection_details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for id in &selected {
                    self.draw_node_details(ui, id, &mut actions);
                    ui.separator();
                }
            });

        for action in actions {
            self.apply_detail_action(action);
        }
    }

    fn draw_node_details(&self, ui: &mut Ui, id: &str, actions: &mut Vec<DetailAction>) {
        let model = self.session.model();
        let Ok(node) = model.get_node(id) else {
            ui.label(format!("{id} is no longer in the graph."));
            return;
        };
        let palette = &self.session.config().health;

        ui.horizontal(|ui| {
            ui.label(RichText::new(&node.name).strong());
            if ui.small_button("✕").on_hover_text("Deselect").clicked() {
                actions.push(DetailAction::Deselect(id.to_owned()));
            }
        });
        if node.name != node.id {
            ui.small(node.id.as_str());
        }

        ui.add_space(4.0);
        if node.health.is_empty() {
            ui.label("No health values.");
        }
        for (category, value) in &node.health {
            ui.horizontal(|ui| {
                match palette.color_of(category) {
                    Some(color) => ui.label(swatch(color)),
                    None => ui.label("·"),
                };
                ui.label(format!("{category}: {value} / {}", palette.max_scale));
            });
        }

        let lines = symptom_lines(&node.symptoms);
        if !lines.is_empty() {
            ui.add_space(4.0);
            ui.label(RichText::new("Symptoms").strong());
            for line in lines {
                ui.label(format!("- {line}"));
            }
        }

        if let Some(parent) = model.parent(id) {
            ui.horizontal(|ui| {
                ui.label("Parent:");
                if ui.link(short_name(parent)).on_hover_text(parent).clicked() {
                    actions.push(DetailAction::Select(parent.to_owned()));
                }
            });
        }

        let children = model.children(id);
        if !children.is_empty() {
            ui.label(format!("Children ({}):", children.len()));
            ui.horizontal_wrapped(|ui| {
                for child in children {
                    if ui.link(short_name(child)).on_hover_text(child.as_str()).clicked() {
                        actions.push(DetailAction::Select(child.clone()));
                    }
                }
            });

            let hierarchy = self.session.hierarchy();
            let collapsed = hierarchy.is_collapsed(id);
            if collapsed {
                ui.small(format!(
                    "Collapsed, hiding {} nodes",
                    hierarchy.hidden_descendants(model, id)
                ));
            }
            ui.horizontal(|ui| {
                if collapsed {
                    if ui.button("Expand").clicked() {
                        actions.push(DetailAction::Expand(id.to_owned()));
                    }
                } else if ui.button("Collapse").clicked() {
                    actions.push(DetailAction::Collapse(id.to_owned()));
                }
                if ui.button("Collapse subtree").clicked() {
                    actions.push(DetailAction::CollapseRecursively(id.to_owned()));
                }
                if ui.button("Expand subtree").clicked() {
                    actions.push(DetailAction::ExpandRecursively(id.to_owned()));
                }
            });
        }

        if let Ok(edges) = model.edges_incident(id) {
            ui.small(format!("{} connected edges", edges.len()));
        }
    }

    fn apply_detail_action(&mut self, action: DetailAction) {
        let result: Result<(), GraphError> = match action {
            DetailAction::Select(id) => {
                self.session.select(&id);
                Ok(())
            }
            DetailAction::Deselect(id) => {
                self.session.deselect(&id);
                Ok(())
            }
            DetailAction::Collapse(id) => self.session.collapse(&id),
            DetailAction::Expand(id) => self.session.expand(&id),
            DetailAction::CollapseRecursively(id) => self.session.collapse_recursively(&id),
            DetailAction::ExpandRecursively(id) => self.session.expand_recursively(&id),
        };
        if let Err(error) = result {
            warn!(%error, "details panel action refused");
        }
    }
}
