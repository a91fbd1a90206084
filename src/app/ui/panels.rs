use eframe::egui::{self, Align, Context, Layout, Vec2};
use health_graph::Session;
use tracing::debug;

use super::super::ViewModel;
use super::super::canvas::CanvasAdapter;

impl ViewModel {
    pub(in crate::app) fn new(session: Session) -> Self {
        Self {
            session,
            canvas: CanvasAdapter::default(),
            search: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            dragged_node: None,
            search_match_cache: None,
            visible_node_count: 0,
            visible_edge_count: 0,
        }
    }

    /// Applies queued input and hands owed work to the canvas. Runs before
    /// anything is drawn so the frame shows the current state.
    pub(in crate::app) fn sync(&mut self) {
        let handled = self.session.pump(&mut self.canvas);
        if self.session.flush(&mut self.canvas) || handled > 0 {
            debug!(events = handled, "session synced");
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        input_name: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.handle_shortcuts(ctx);
        self.sync();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("health-graph");
                    ui.separator();
                    ui.label(format!("input: {input_name}"));
                    ui.label(format!("nodes: {}", self.session.model().node_count()));
                    ui.label(format!("edges: {}", self.session.model().edge_count()));
                    ui.label(format!(
                        "collapsed: {}",
                        self.session.hierarchy().collapsed_ids().len()
                    ));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload input"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("layout: {}", self.canvas.layout().algorithm.label()));
                        ui.label(format!(
                            "in view: {} nodes, {} edges",
                            self.visible_node_count, self.visible_edge_count
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });

        if !self.session.pending().is_empty() || self.canvas.has_events() {
            ctx.request_repaint();
        }
    }
}
