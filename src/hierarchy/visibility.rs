use std::collections::{BTreeSet, HashMap};

use crate::model::GraphModel;

/// An edge as displayed. When an endpoint is hidden inside a collapsed
/// compound node, the displayed endpoint is that compound node instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleEdge {
    /// Id of the underlying model edge.
    pub id: String,
    pub source: String,
    pub target: String,
    pub redirected: bool,
}

/// The subset of the graph a renderer should draw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleGraph {
    /// Visible node ids in model order.
    pub nodes: Vec<String>,
    pub edges: Vec<VisibleEdge>,
}

impl VisibleGraph {
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node == id)
    }

    pub fn edge(&self, id: &str) -> Option<&VisibleEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn node_set(&self) -> BTreeSet<&str> {
        self.nodes.iter().map(String::as_str).collect()
    }

    pub fn edge_ids(&self) -> BTreeSet<&str> {
        self.edges.iter().map(|edge| edge.id.as_str()).collect()
    }
}

/// The node that stands in for `id` on screen: its outermost collapsed
/// ancestor, or `id` itself when no ancestor is collapsed.
pub(super) fn representative(model: &GraphModel, collapsed: &BTreeSet<String>, id: &str) -> String {
    model
        .ancestors(id)
        .into_iter()
        .rev()
        .find(|ancestor| collapsed.contains(ancestor))
        .unwrap_or_else(|| id.to_owned())
}

pub(super) fn derive(model: &GraphModel, collapsed: &BTreeSet<String>) -> VisibleGraph {
    let stand_ins = model
        .nodes()
        .map(|node| {
            (
                node.id.as_str(),
                representative(model, collapsed, node.id.as_str()),
            )
        })
        .collect::<HashMap<_, _>>();

    let nodes = model
        .nodes()
        .filter(|node| stand_ins.get(node.id.as_str()) == Some(&node.id))
        .map(|node| node.id.clone())
        .collect::<Vec<_>>();

    let mut edges = Vec::new();
    for edge in model.edges() {
        let (Some(source), Some(target)) = (
            stand_ins.get(edge.source.as_str()),
            stand_ins.get(edge.target.as_str()),
        ) else {
            continue;
        };

        let redirected = *source != edge.source || *target != edge.target;
        if redirected && source == target {
            continue;
        }

        edges.push(VisibleEdge {
            id: edge.id.clone(),
            source: source.clone(),
            target: target.clone(),
            redirected,
        });
    }

    VisibleGraph { nodes, edges }
}
