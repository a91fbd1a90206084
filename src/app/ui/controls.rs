use eframe::egui::{self, RichText, Ui};
use health_graph::{DetailDisclosure, EdgeCurve, LayoutAlgorithm, SelectionMode, ViewEvent};

use super::super::ViewModel;

const SEARCH_RESULT_ROWS: usize = 12;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        self.draw_search(ui);
        ui.separator();
        self.draw_view_settings(ui);
        ui.separator();
        self.draw_layout_settings(ui);
        ui.separator();
        self.draw_hierarchy_controls(ui);
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search (name or id)")
            .on_hover_text("Fuzzy-highlight matching nodes; other nodes are dimmed.");
        ui.text_edit_singleline(&mut self.search);

        let Some(matches) = self.search_matches() else {
            return;
        };
        if matches.is_empty() {
            ui.small("No visible node matches.");
            return;
        }

        let mut hits = matches
            .iter()
            .filter_map(|&index| self.canvas.nodes().get(index))
            .map(|node| (node.id.clone(), node.style.label.clone()))
            .collect::<Vec<_>>();
        hits.sort();

        ui.small(format!("{} matches", hits.len()));
        for (id, label) in hits.iter().take(SEARCH_RESULT_ROWS) {
            if ui.link(label.as_str()).on_hover_text(id.as_str()).clicked() {
                self.session.select(id);
            }
        }
        if hits.len() > SEARCH_RESULT_ROWS {
            ui.small(format!("... {} more", hits.len() - SEARCH_RESULT_ROWS));
        }
    }

    fn draw_view_settings(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Selection").strong());
        let mut mode = self.session.config().selection_mode;
        ui.horizontal(|ui| {
            for option in [SelectionMode::Single, SelectionMode::Additive] {
                ui.selectable_value(&mut mode, option, option.label());
            }
        })
        .response
        .on_hover_text("Single: a click replaces the selection. Additive: a click toggles.");
        if mode != self.session.config().selection_mode {
            self.session.set_selection_mode(mode);
        }

        let mut always = self.session.config().detail_disclosure == DetailDisclosure::Always;
        if ui
            .checkbox(&mut always, "Show symptoms on every node")
            .on_hover_text("Otherwise symptoms appear only next to selected nodes.")
            .changed()
        {
            self.session.set_detail_disclosure(if always {
                DetailDisclosure::Always
            } else {
                DetailDisclosure::OnSelectOnly
            });
        }

        let mut curve = self.session.config().edge_curve;
        ui.horizontal(|ui| {
            ui.label("Edges");
            ui.selectable_value(&mut curve, EdgeCurve::Straight, "straight");
            ui.selectable_value(&mut curve, EdgeCurve::Bezier, "bezier");
        });
        self.session.set_edge_curve(curve);

        let selected = self.session.selected_ids().len();
        ui.horizontal(|ui| {
            ui.label(format!("{selected} selected"));
            if ui
                .add_enabled(selected > 0, egui::Button::new("Clear selection"))
                .clicked()
            {
                self.canvas.push_event(ViewEvent::BackgroundClicked);
            }
        });
    }

    fn draw_layout_settings(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Layout").strong());
        let mut layout = self.session.config().layout.clone();

        ui.horizontal(|ui| {
            for algorithm in [LayoutAlgorithm::Breadthfirst, LayoutAlgorithm::ForceDirected] {
                ui.selectable_value(&mut layout.algorithm, algorithm, algorithm.label());
            }
        });
        ui.add(egui::Slider::new(&mut layout.padding, 0.0..=120.0).text("Padding"));
        ui.add_enabled(
            layout.algorithm == LayoutAlgorithm::ForceDirected,
            egui::Slider::new(&mut layout.iterations, 20..=1000).text("Iterations"),
        );

        let rerun = ui
            .button("Re-run layout")
            .on_hover_text("Place every visible node again, discarding manual moves.")
            .clicked();
        if rerun || layout != self.session.config().layout {
            self.session.set_layout(layout);
        }
    }

    fn draw_hierarchy_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Hierarchy").strong());
        ui.horizontal(|ui| {
            if ui.button("Collapse all").clicked() {
                self.canvas.push_event(ViewEvent::CollapseAll);
            }
            if ui.button("Expand all").clicked() {
                self.canvas.push_event(ViewEvent::ExpandAll);
            }
        });

        let log = self.session.hierarchy().undo_log();
        let undo_hint = log
            .peek_undo()
            .map(|transaction| format!("Undo {}", transaction.operation))
            .unwrap_or_else(|| "Nothing to undo".to_owned());
        let redo_hint = log
            .peek_redo()
            .map(|transaction| format!("Redo {}", transaction.operation))
            .unwrap_or_else(|| "Nothing to redo".to_owned());
        let (can_undo, can_redo, depth) = (log.can_undo(), log.can_redo(), log.undo_depth());

        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_undo, egui::Button::new("Undo"))
                .on_hover_text(undo_hint)
                .clicked()
            {
                self.canvas.push_event(ViewEvent::Undo);
            }
            if ui
                .add_enabled(can_redo, egui::Button::new("Redo"))
                .on_hover_text(redo_hint)
                .clicked()
            {
                self.canvas.push_event(ViewEvent::Redo);
            }
            ui.small(format!("history: {depth}"));
        });
        ui.small("Double-click a group to collapse or expand it.");
    }
}
