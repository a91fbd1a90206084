//! Per-session view options.
//!
//! Every option is plain data with a default, so a config file only needs to
//! name what it changes.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::health::HealthPalette;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Selecting a node deselects every other node.
    #[default]
    Single,
    /// Selections accumulate.
    Additive,
}

impl SelectionMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Additive => "additive",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCurve {
    Straight,
    #[default]
    Bezier,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailDisclosure {
    /// Symptom text is shown only next to selected nodes.
    #[default]
    OnSelectOnly,
    /// Symptom text is shown for every node.
    Always,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAlgorithm {
    #[default]
    Breadthfirst,
    ForceDirected,
}

impl LayoutAlgorithm {
    pub fn label(self) -> &'static str {
        match self {
            Self::Breadthfirst => "breadthfirst",
            Self::ForceDirected => "force-directed",
        }
    }
}

/// Layout parameters. The core never reads these; they are handed to the
/// render adapter as is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub algorithm: LayoutAlgorithm,
    pub padding: f32,
    pub iterations: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            algorithm: LayoutAlgorithm::Breadthfirst,
            padding: 10.0,
            iterations: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub width: f32,
    pub opacity: f32,
    /// Opacity of edges touching a selected node.
    pub selected_opacity: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            width: 4.0,
            opacity: 0.5,
            selected_opacity: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub selection_mode: SelectionMode,
    pub edge_curve: EdgeCurve,
    pub detail_disclosure: DetailDisclosure,
    pub health: HealthPalette,
    pub layout: LayoutConfig,
    pub edge: EdgeConfig,
}

impl ViewConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid view config JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read view config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Rgb;

    #[test]
    fn empty_object_yields_defaults() {
        let config = ViewConfig::from_json("{}").unwrap();
        assert_eq!(config, ViewConfig::default());
        assert_eq!(config.selection_mode, SelectionMode::Single);
        assert_eq!(config.edge_curve, EdgeCurve::Bezier);
        assert_eq!(config.detail_disclosure, DetailDisclosure::OnSelectOnly);
        assert_eq!(config.health.max_scale, 10.0);
        assert_eq!(config.layout.algorithm, LayoutAlgorithm::Breadthfirst);
    }

    #[test]
    fn partial_overrides() {
        let config = ViewConfig::from_json(
            r##"{
                "selection_mode": "additive",
                "detail_disclosure": "always",
                "edge_curve": "straight",
                "health": {"categories": [{"name": "ok", "color": "#00FF00"}]},
                "layout": {"algorithm": "force_directed"}
            }"##,
        )
        .unwrap();

        assert_eq!(config.selection_mode, SelectionMode::Additive);
        assert_eq!(config.detail_disclosure, DetailDisclosure::Always);
        assert_eq!(config.edge_curve, EdgeCurve::Straight);
        assert_eq!(config.health.max_scale, 10.0);
        assert_eq!(config.health.color_of("ok"), Some(Rgb::new(0, 255, 0)));
        assert_eq!(config.layout.algorithm, LayoutAlgorithm::ForceDirected);
        assert_eq!(config.layout.padding, 10.0);
    }

    #[test]
    fn rejects_unknown_enum_values() {
        assert!(ViewConfig::from_json(r#"{"selection_mode": "multi"}"#).is_err());
    }
}
