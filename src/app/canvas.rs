use std::collections::{BTreeSet, HashMap};

use eframe::egui::Vec2;
use health_graph::{
    EdgeStyle, LayoutConfig, NodeStyle, RenderAdapter, StyleSource, ViewEvent, VisibleGraph,
};
use tracing::{debug, trace};

use super::layout;

const LEAF_RADIUS: f32 = 24.0;

pub(super) struct DrawNode {
    pub(super) id: String,
    pub(super) world_pos: Vec2,
    pub(super) radius: f32,
    pub(super) style: NodeStyle,
}

pub(super) struct DrawEdge {
    pub(super) id: String,
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) style: EdgeStyle,
}

/// Retained draw list fed by the session. Positions outlive the nodes that
/// own them, so a node hidden by a collapse comes back where it was.
#[derive(Default)]
pub(super) struct CanvasAdapter {
    layout: LayoutConfig,
    nodes: Vec<DrawNode>,
    edges: Vec<DrawEdge>,
    index_by_id: HashMap<String, usize>,
    positions: HashMap<String, Vec2>,
    events: Vec<ViewEvent>,
    relayout: bool,
    revision: u64,
}

fn node_radius(style: &NodeStyle) -> f32 {
    if style.collapsed {
        LEAF_RADIUS + 6.0 + (style.hidden_descendants.min(24) as f32 * 0.75)
    } else if style.compound {
        LEAF_RADIUS + 4.0
    } else {
        LEAF_RADIUS
    }
}

impl CanvasAdapter {
    pub(super) fn nodes(&self) -> &[DrawNode] {
        &self.nodes
    }

    pub(super) fn edges(&self) -> &[DrawEdge] {
        &self.edges
    }

    pub(super) fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Bumped on every full render; caches keyed on the node list use it.
    pub(super) fn revision(&self) -> u64 {
        self.revision
    }

    pub(super) fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub(super) fn push_event(&mut self, event: ViewEvent) {
        trace!(?event, "queued view event");
        self.events.push(event);
    }

    pub(super) fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Places every drawn node again from scratch.
    pub(super) fn run_layout(&mut self) {
        let ids = self
            .nodes
            .iter()
            .map(|node| node.id.clone())
            .collect::<Vec<_>>();
        let links = self
            .edges
            .iter()
            .map(|edge| (edge.source, edge.target))
            .collect::<Vec<_>>();
        let radii = self.nodes.iter().map(|node| node.radius).collect::<Vec<_>>();

        let placed = layout::place(&self.layout, &ids, &links, &radii);
        for (node, position) in self.nodes.iter_mut().zip(placed) {
            node.world_pos = position;
            self.positions.insert(node.id.clone(), position);
        }
        self.relayout = false;
        debug!(
            algorithm = self.layout.algorithm.label(),
            nodes = self.nodes.len(),
            "layout applied"
        );
    }

    /// Moves a node by hand; the spot sticks across re-renders.
    pub(super) fn move_node(&mut self, index: usize, delta: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.world_pos += delta;
            self.positions.insert(node.id.clone(), node.world_pos);
        }
    }

    /// New nodes go next to a drawn neighbor, or near the origin when they
    /// have none.
    fn place_unpositioned(&mut self, unplaced: &[usize]) {
        for &index in unplaced {
            let id = self.nodes[index].id.clone();
            let anchor = self
                .edges
                .iter()
                .filter_map(|edge| {
                    if edge.source == index {
                        Some(edge.target)
                    } else if edge.target == index {
                        Some(edge.source)
                    } else {
                        None
                    }
                })
                .find(|neighbor| !unplaced.contains(neighbor))
                .map(|neighbor| self.nodes[neighbor].world_pos)
                .unwrap_or(Vec2::ZERO);
            let position = layout::near(anchor, &id, LEAF_RADIUS * 3.0);
            self.nodes[index].world_pos = position;
            self.positions.insert(id, position);
        }
    }
}

impl RenderAdapter for CanvasAdapter {
    fn set_layout(&mut self, layout: &LayoutConfig) {
        self.layout = layout.clone();
        if self.nodes.is_empty() {
            self.relayout = true;
        } else {
            self.run_layout();
        }
    }

    fn render(&mut self, graph: &VisibleGraph, styles: &dyn StyleSource) {
        self.nodes.clear();
        self.edges.clear();
        self.index_by_id.clear();

        let mut unplaced = Vec::new();
        for id in &graph.nodes {
            let Some(style) = styles.node_style(id) else {
                continue;
            };
            let index = self.nodes.len();
            let world_pos = match self.positions.get(id) {
                Some(position) => *position,
                None => {
                    unplaced.push(index);
                    Vec2::ZERO
                }
            };
            self.nodes.push(DrawNode {
                id: id.clone(),
                world_pos,
                radius: node_radius(&style),
                style,
            });
            self.index_by_id.insert(id.clone(), index);
        }

        for edge in &graph.edges {
            let (Some(source), Some(target)) =
                (self.index_of(&edge.source), self.index_of(&edge.target))
            else {
                continue;
            };
            let Some(style) = styles.edge_style(&edge.id) else {
                continue;
            };
            self.edges.push(DrawEdge {
                id: edge.id.clone(),
                source,
                target,
                style,
            });
        }

        if self.relayout || self.positions.len() == unplaced.len() {
            self.run_layout();
        } else {
            self.place_unpositioned(&unplaced);
        }

        self.revision = self.revision.wrapping_add(1);
        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            revision = self.revision,
            "canvas rendered"
        );
    }

    fn refresh(&mut self, nodes: &BTreeSet<String>, styles: &dyn StyleSource) {
        let mut touched = vec![false; self.nodes.len()];
        for id in nodes {
            let Some(index) = self.index_of(id) else {
                continue;
            };
            if let Some(style) = styles.node_style(id) {
                let node = &mut self.nodes[index];
                node.radius = node_radius(&style);
                node.style = style;
            }
            touched[index] = true;
        }

        for edge in &mut self.edges {
            if !touched[edge.source] && !touched[edge.target] {
                continue;
            }
            if let Some(style) = styles.edge_style(&edge.id) {
                edge.style = style;
            }
        }
        trace!(nodes = nodes.len(), "canvas refreshed");
    }

    fn take_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }
}
