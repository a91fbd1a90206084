mod app;
mod util;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use health_graph::{DetailDisclosure, LayoutAlgorithm, SelectionMode, ViewConfig};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SelectionArg {
    Single,
    Additive,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutArg {
    Breadthfirst,
    ForceDirected,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file with the graph nodes and edges
    input: PathBuf,

    /// JSON view config; unset fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    selection_mode: Option<SelectionArg>,

    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Show symptom text for every node instead of only selected ones
    #[arg(long)]
    always_show_details: bool,
}

impl Args {
    fn view_config(&self) -> Result<ViewConfig> {
        let mut config = match &self.config {
            Some(path) => ViewConfig::load(path)?,
            None => ViewConfig::default(),
        };

        if let Some(mode) = self.selection_mode {
            config.selection_mode = match mode {
                SelectionArg::Single => SelectionMode::Single,
                SelectionArg::Additive => SelectionMode::Additive,
            };
        }
        if let Some(layout) = self.layout {
            config.layout.algorithm = match layout {
                LayoutArg::Breadthfirst => LayoutAlgorithm::Breadthfirst,
                LayoutArg::ForceDirected => LayoutAlgorithm::ForceDirected,
            };
        }
        if self.always_show_details {
            config.detail_disclosure = DetailDisclosure::Always;
        }

        Ok(config)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let args = Args::parse();
    let config = args.view_config()?;
    tracing::info!(input = %args.input.display(), "starting viewer");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "health-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::HealthGraphApp::new(
                cc,
                args.input.clone(),
                config.clone(),
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
