use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::error::{GraphError, Result};

use super::node::{Edge, Node};

/// What `GraphModel::remove_node` took out of the graph.
#[derive(Clone, Debug)]
pub struct RemovedNode {
    pub node: Node,
    /// Incident edges dropped along with the node.
    pub edges: Vec<Edge>,
    /// Former children, now attached to the removed node's parent.
    pub promoted: Vec<String>,
}

/// Authoritative node/edge store with the parent/child hierarchy.
///
/// Nodes and edges live in separate id namespaces. Iteration follows
/// insertion order. Every mutation either applies fully or returns an error
/// with the model unchanged.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
    nodes: HashMap<String, Node>,
    node_order: Vec<String>,
    edges: HashMap<String, Edge>,
    edge_order: Vec<String>,
    children: HashMap<String, Vec<String>>,
    incident: HashMap<String, Vec<String>>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a model from a complete element set.
    ///
    /// Parents may appear after their children in `nodes`. The whole set is
    /// validated before anything is returned.
    pub fn load(
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Result<Self> {
        let mut model = Self::default();

        for node in nodes {
            if model.nodes.contains_key(&node.id) {
                return Err(GraphError::DuplicateId(node.id));
            }
            model.node_order.push(node.id.clone());
            model.nodes.insert(node.id.clone(), node);
        }

        for id in &model.node_order {
            let Some(parent) = model.nodes.get(id).and_then(|node| node.parent.as_ref()) else {
                continue;
            };
            if !model.nodes.contains_key(parent) {
                return Err(GraphError::DanglingParent {
                    node: id.clone(),
                    parent: parent.clone(),
                });
            }
            model
                .children
                .entry(parent.clone())
                .or_default()
                .push(id.clone());
        }

        model.check_parent_chains()?;

        for edge in edges {
            model.insert_edge(edge)?;
        }
        debug_assert!(model.validate().is_ok());

        debug!(
            nodes = model.node_count(),
            edges = model.edge_count(),
            "graph model loaded"
        );
        Ok(model)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get_node(&self, id: &str) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| GraphError::NotFound(id.to_owned()))
    }

    pub fn get_edge(&self, id: &str) -> Result<&Edge> {
        self.edges
            .get(id)
            .ok_or_else(|| GraphError::NotFound(id.to_owned()))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edge_order.iter().filter_map(|id| self.edges.get(id))
    }

    /// Edges with `id` as source or target, in insertion order.
    pub fn edges_incident(&self, id: &str) -> Result<Vec<&Edge>> {
        if !self.nodes.contains_key(id) {
            return Err(GraphError::NotFound(id.to_owned()));
        }

        Ok(self
            .incident
            .get(id)
            .map(|edge_ids| {
                edge_ids
                    .iter()
                    .filter_map(|edge_id| self.edges.get(edge_id))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Distinct nodes joined to `id` by any edge, excluding `id` itself.
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut neighbors = Vec::new();
        for edge_id in self.incident.get(id).into_iter().flatten() {
            let Some(other) = self.edges.get(edge_id).and_then(|edge| edge.other_end(id)) else {
                continue;
            };
            if other != id && seen.insert(other) {
                neighbors.push(other);
            }
        }
        neighbors
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).and_then(|node| node.parent.as_deref())
    }

    pub fn children(&self, id: &str) -> &[String] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// A node is compound while it owns at least one child.
    pub fn is_compound(&self, id: &str) -> bool {
        !self.children(id).is_empty()
    }

    pub fn compound_ids(&self) -> Vec<String> {
        self.node_order
            .iter()
            .filter(|id| self.is_compound(id))
            .cloned()
            .collect()
    }

    /// Every descendant of `id`, parents before their children.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut queue = VecDeque::from_iter(self.children(id).iter().cloned());
        while let Some(next) = queue.pop_front() {
            queue.extend(self.children(&next).iter().cloned());
            out.push(next);
        }
        out
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(parent) = cursor {
            if out.iter().any(|seen| seen == parent) {
                break;
            }
            out.push(parent.to_owned());
            cursor = self.parent(parent);
        }
        out
    }

    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        let mut cursor = self.parent(id);
        let mut steps = 0usize;
        while let Some(parent) = cursor {
            if parent == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            cursor = self.parent(parent);
        }
        false
    }

    pub fn add_node(&mut self, node: Node) -> Result<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateId(node.id));
        }
        if let Some(parent) = &node.parent
            && !self.nodes.contains_key(parent)
        {
            return Err(GraphError::DanglingParent {
                node: node.id,
                parent: parent.clone(),
            });
        }

        if let Some(parent) = &node.parent {
            self.children
                .entry(parent.clone())
                .or_default()
                .push(node.id.clone());
        }
        self.node_order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);

        debug_assert!(self.validate().is_ok());
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        self.insert_edge(edge)?;
        debug_assert!(self.validate().is_ok());
        Ok(())
    }

    /// Checks endpoints and indexes `edge` without revalidating the model.
    fn insert_edge(&mut self, edge: Edge) -> Result<()> {
        if self.edges.contains_key(&edge.id) {
            return Err(GraphError::DuplicateId(edge.id));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::DanglingEndpoint {
                    edge: edge.id.clone(),
                    endpoint: endpoint.clone(),
                });
            }
        }

        self.incident
            .entry(edge.source.clone())
            .or_default()
            .push(edge.id.clone());
        if edge.target != edge.source {
            self.incident
                .entry(edge.target.clone())
                .or_default()
                .push(edge.id.clone());
        }
        self.edge_order.push(edge.id.clone());
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<Edge> {
        let edge = self
            .edges
            .remove(id)
            .ok_or_else(|| GraphError::NotFound(id.to_owned()))?;

        self.edge_order.retain(|edge_id| edge_id != id);
        for endpoint in [&edge.source, &edge.target] {
            if let Some(list) = self.incident.get_mut(endpoint) {
                list.retain(|edge_id| edge_id != id);
                if list.is_empty() {
                    self.incident.remove(endpoint);
                }
            }
        }

        debug_assert!(self.validate().is_ok());
        Ok(edge)
    }

    /// Removes a node, its incident edges, and promotes its children to its
    /// own parent (or to the top level when it had none).
    pub fn remove_node(&mut self, id: &str) -> Result<RemovedNode> {
        if !self.nodes.contains_key(id) {
            return Err(GraphError::NotFound(id.to_owned()));
        }

        let incident = self.incident.get(id).cloned().unwrap_or_default();
        let mut edges = Vec::with_capacity(incident.len());
        for edge_id in incident {
            edges.push(self.remove_edge(&edge_id)?);
        }

        let Some(node) = self.nodes.remove(id) else {
            return Err(GraphError::NotFound(id.to_owned()));
        };
        self.node_order.retain(|node_id| node_id != id);

        let promoted = self.children.remove(id).unwrap_or_default();
        for child in &promoted {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.parent = node.parent.clone();
            }
        }

        if let Some(parent) = &node.parent
            && let Some(siblings) = self.children.get_mut(parent)
        {
            if let Some(position) = siblings.iter().position(|sibling| sibling == id) {
                siblings.splice(position..=position, promoted.iter().cloned());
            }
            if siblings.is_empty() {
                self.children.remove(parent);
            }
        }

        debug!(
            node = id,
            dropped_edges = edges.len(),
            promoted = promoted.len(),
            "node removed"
        );
        debug_assert!(self.validate().is_ok());
        Ok(RemovedNode {
            node,
            edges,
            promoted,
        })
    }

    /// Moves `id` under `parent`, or to the top level with `None`.
    pub fn set_parent(&mut self, id: &str, parent: Option<&str>) -> Result<()> {
        if !self.nodes.contains_key(id) {
            return Err(GraphError::NotFound(id.to_owned()));
        }
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) {
                return Err(GraphError::DanglingParent {
                    node: id.to_owned(),
                    parent: parent.to_owned(),
                });
            }
            if parent == id || self.is_ancestor(id, parent) {
                return Err(GraphError::Cycle(id.to_owned()));
            }
        }

        let previous = self.parent(id).map(str::to_owned);
        if previous.as_deref() == parent {
            return Ok(());
        }

        if let Some(previous) = &previous
            && let Some(siblings) = self.children.get_mut(previous)
        {
            siblings.retain(|sibling| sibling != id);
            if siblings.is_empty() {
                self.children.remove(previous);
            }
        }
        if let Some(parent) = parent {
            self.children
                .entry(parent.to_owned())
                .or_default()
                .push(id.to_owned());
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = parent.map(str::to_owned);
        }

        debug_assert!(self.validate().is_ok());
        Ok(())
    }

    /// Full invariant check: resolvable parents, acyclic parent chains,
    /// resolvable edge endpoints.
    pub fn validate(&self) -> Result<()> {
        for id in &self.node_order {
            if let Some(parent) = self.parent(id)
                && !self.nodes.contains_key(parent)
            {
                return Err(GraphError::DanglingParent {
                    node: id.clone(),
                    parent: parent.to_owned(),
                });
            }
        }

        self.check_parent_chains()?;

        for edge in self.edges() {
            for endpoint in [&edge.source, &edge.target] {
                if !self.nodes.contains_key(endpoint) {
                    return Err(GraphError::DanglingEndpoint {
                        edge: edge.id.clone(),
                        endpoint: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    fn check_parent_chains(&self) -> Result<()> {
        let mut acyclic: HashSet<&str> = HashSet::new();

        for start in &self.node_order {
            let mut chain: Vec<&str> = Vec::new();
            let mut on_chain: HashSet<&str> = HashSet::new();
            let mut cursor = Some(start.as_str());

            while let Some(id) = cursor {
                if acyclic.contains(id) {
                    break;
                }
                if !on_chain.insert(id) {
                    return Err(GraphError::Cycle(start.clone()));
                }
                chain.push(id);
                cursor = self.parent(id);
            }

            acyclic.extend(chain);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphModel {
        GraphModel::load(
            [
                Node::new("A").with_health("red", 3.0).with_health("green", 7.0),
                Node::new("B").with_parent("A"),
                Node::new("C").with_parent("B"),
                Node::new("D"),
            ],
            [
                Edge::new("ab", "A", "B"),
                Edge::new("bc", "B", "C"),
                Edge::new("cd", "C", "D"),
            ],
        )
        .expect("sample graph is valid")
    }

    #[test]
    fn load_accepts_parents_declared_after_children() {
        let model = GraphModel::load(
            [Node::new("child").with_parent("group"), Node::new("group")],
            [],
        )
        .expect("forward parent reference resolves");
        assert_eq!(model.children("group"), ["child".to_owned()]);
        assert!(model.is_compound("group"));
    }

    #[test]
    fn load_rejects_parent_cycles() {
        let error = GraphModel::load(
            [Node::new("x").with_parent("y"), Node::new("y").with_parent("x")],
            [],
        )
        .unwrap_err();
        assert!(matches!(error, GraphError::Cycle(_)));

        let error = GraphModel::load([Node::new("self").with_parent("self")], []).unwrap_err();
        assert_eq!(error, GraphError::Cycle("self".into()));
    }

    #[test]
    fn load_rejects_dangling_references() {
        let error = GraphModel::load([Node::new("a").with_parent("ghost")], []).unwrap_err();
        assert!(matches!(error, GraphError::DanglingParent { .. }));

        let error =
            GraphModel::load([Node::new("a")], [Edge::new("e", "a", "ghost")]).unwrap_err();
        assert_eq!(
            error,
            GraphError::DanglingEndpoint {
                edge: "e".into(),
                endpoint: "ghost".into()
            }
        );
    }

    #[test]
    fn load_indexes_a_dense_edge_set() {
        let nodes = (0..40).map(|index| Node::new(format!("n{index}")));
        let edges = (0..40).flat_map(|source| {
            (0..40).map(move |target| {
                Edge::new(format!("{source}-{target}"), format!("n{source}"), format!("n{target}"))
            })
        });
        let model = GraphModel::load(nodes, edges).unwrap();

        assert_eq!(model.edge_count(), 1600);
        assert_eq!(model.edges().next().unwrap().id, "0-0");
        // 39 outgoing, 39 incoming and one self loop
        assert_eq!(model.edges_incident("n7").unwrap().len(), 79);
        assert!(model.validate().is_ok());

        let error = GraphModel::load(
            [Node::new("a")],
            [Edge::new("e", "a", "a"), Edge::new("e", "a", "a")],
        )
        .unwrap_err();
        assert_eq!(error, GraphError::DuplicateId("e".into()));
    }

    #[test]
    fn add_node_refuses_duplicates_and_leaves_model_intact() {
        let mut model = sample();
        let error = model.add_node(Node::new("A").with_name("other")).unwrap_err();
        assert_eq!(error, GraphError::DuplicateId("A".into()));
        assert_eq!(model.get_node("A").unwrap().name, "A");
        assert_eq!(model.node_count(), 4);
    }

    #[test]
    fn add_edge_refuses_missing_endpoint() {
        let mut model = sample();
        let error = model.add_edge(Edge::new("ax", "A", "X")).unwrap_err();
        assert!(matches!(error, GraphError::DanglingEndpoint { .. }));
        assert_eq!(model.edge_count(), 3);
    }

    #[test]
    fn remove_node_promotes_children_and_drops_edges() {
        let mut model = sample();
        let removed = model.remove_node("B").unwrap();

        assert_eq!(removed.promoted, vec!["C".to_owned()]);
        assert_eq!(removed.edges.len(), 2);
        assert_eq!(model.parent("C"), Some("A"));
        assert_eq!(model.children("A"), ["C".to_owned()]);
        assert_eq!(model.get_node("B"), Err(GraphError::NotFound("B".into())));
        assert!(model.edges().all(|edge| !edge.touches("B")));
        assert_eq!(model.edges_incident("C").unwrap().len(), 1);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn remove_top_level_node_moves_children_to_top_level() {
        let mut model = sample();
        model.remove_node("A").unwrap();
        assert_eq!(model.parent("B"), None);
        assert!(model.is_compound("B"));
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let mut model = sample();
        assert_eq!(
            model.set_parent("A", Some("C")),
            Err(GraphError::Cycle("A".into()))
        );
        assert_eq!(model.parent("A"), None);

        model.set_parent("D", Some("B")).unwrap();
        assert_eq!(model.children("B"), ["C".to_owned(), "D".to_owned()]);
        model.set_parent("D", None).unwrap();
        assert_eq!(model.children("B"), ["C".to_owned()]);
    }

    #[test]
    fn hierarchy_queries() {
        let model = sample();
        assert_eq!(model.descendants("A"), vec!["B".to_owned(), "C".to_owned()]);
        assert_eq!(model.ancestors("C"), vec!["B".to_owned(), "A".to_owned()]);
        assert!(model.is_ancestor("A", "C"));
        assert!(!model.is_ancestor("C", "A"));
        assert_eq!(model.compound_ids(), vec!["A".to_owned(), "B".to_owned()]);
        assert_eq!(model.neighbors("B"), vec!["A", "C"]);
    }

    #[test]
    fn self_loop_is_indexed_once() {
        let mut model = sample();
        model.add_edge(Edge::new("dd", "D", "D")).unwrap();
        assert_eq!(model.edges_incident("D").unwrap().len(), 2);
        model.remove_node("D").unwrap();
        assert_eq!(model.edge_count(), 2);
    }
}
