use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use health_graph::model::load_model;
use health_graph::{GraphModel, Session, ViewConfig};
use tracing::{error, info};

mod canvas;
mod graph;
mod layout;
mod render_utils;
mod ui;

use canvas::CanvasAdapter;

type LoadResult = Result<GraphModel, String>;

pub struct HealthGraphApp {
    input: PathBuf,
    config: ViewConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    session: Session,
    canvas: CanvasAdapter,
    search: String,
    pan: Vec2,
    zoom: f32,
    dragged_node: Option<usize>,
    search_match_cache: Option<SearchMatchCache>,
    visible_node_count: usize,
    visible_edge_count: usize,
}

struct SearchMatchCache {
    query: String,
    revision: u64,
    matches: Arc<HashSet<usize>>,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl HealthGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, input: PathBuf, config: ViewConfig) -> Self {
        let state = Self::start_load(input.clone());
        Self {
            input,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(input: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_model(&input).map_err(|error| format!("{error:#}"));
            match &result {
                Ok(model) => info!(
                    nodes = model.node_count(),
                    edges = model.edge_count(),
                    "graph loaded"
                ),
                Err(message) => error!(%message, "graph load failed"),
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(input: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(input),
        }
    }

    fn ready(&self, model: GraphModel) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(Session::new(
            model,
            self.config.clone(),
        ))))
    }
}

impl eframe::App for HealthGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(model)) => transition = Some(Ok(model)),
                    Ok(Err(message)) => transition = Some(Err(message)),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading health graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(message) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the health graph");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.input.clone());
                    return;
                }
            }
            AppState::Ready(view) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                view.show(
                    ctx,
                    &display_name(&self.input),
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.input.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(model) => self.ready(model),
                Err(message) => AppState::Error(message),
            };
        }
    }
}
