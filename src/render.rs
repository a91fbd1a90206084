//! The seam between the session and whatever draws the graph.

use std::collections::BTreeSet;

use crate::config::{EdgeCurve, LayoutConfig};
use crate::health::Segment;

pub use crate::hierarchy::{VisibleEdge, VisibleGraph};

/// Everything a renderer needs to draw one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
    pub label: String,
    pub segments: Vec<Segment>,
    /// Selection highlight.
    pub selected: bool,
    /// Symptom text to show next to the node; empty when not disclosed.
    pub detail: String,
    pub compound: bool,
    pub collapsed: bool,
    /// Descendants folded into this node while it is collapsed.
    pub hidden_descendants: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
    pub curve: EdgeCurve,
    pub width: f32,
    pub opacity: f32,
    pub arrow: bool,
    /// An endpoint is selected.
    pub highlighted: bool,
    /// The drawn endpoints differ from the model endpoints.
    pub redirected: bool,
    pub weight: Option<f64>,
}

/// Style lookup handed to the adapter during a render pass.
pub trait StyleSource {
    fn node_style(&self, id: &str) -> Option<NodeStyle>;
    fn edge_style(&self, id: &str) -> Option<EdgeStyle>;
}

/// User input reported by the adapter, handled by the session in arrival
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewEvent {
    NodeClicked(String),
    NodeDoubleClicked(String),
    BackgroundClicked,
    Undo,
    Redo,
    CollapseAll,
    ExpandAll,
}

/// A graph-drawing engine driven by a `Session`.
pub trait RenderAdapter {
    /// Layout settings pass straight through; the session never reads them.
    fn set_layout(&mut self, layout: &LayoutConfig);

    /// Redraws the whole visible graph. Called on the first pass and after
    /// any change to which nodes or edges are visible.
    fn render(&mut self, graph: &VisibleGraph, styles: &dyn StyleSource);

    /// Restyles only `nodes` and the edges touching them.
    fn refresh(&mut self, nodes: &BTreeSet<String>, styles: &dyn StyleSource);

    /// Input gathered since the last call, oldest first.
    fn take_events(&mut self) -> Vec<ViewEvent>;
}
