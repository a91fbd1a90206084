//! The session object: one model, its selection and hierarchy state, and the
//! bookkeeping that tells a renderer what to redraw.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::config::{DetailDisclosure, EdgeCurve, LayoutConfig, SelectionMode, ViewConfig};
use crate::error::Result;
use crate::health::compute_segments;
use crate::hierarchy::{HierarchyController, Transaction, VisibleGraph};
use crate::model::{Edge, GraphModel, Node, RemovedNode};
use crate::render::{EdgeStyle, NodeStyle, RenderAdapter, StyleSource, ViewEvent};
use crate::selection::SelectionController;

/// Work owed to the renderer since the last flush.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingRender {
    /// Nodes whose style or presence changed.
    pub nodes: BTreeSet<String>,
    /// The visible node/edge set may have changed.
    pub structure_changed: bool,
}

impl PendingRender {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && !self.structure_changed
    }
}

pub struct Session {
    model: GraphModel,
    config: ViewConfig,
    selection: SelectionController,
    hierarchy: HierarchyController,
    pending: PendingRender,
    layout_dirty: bool,
}

impl Session {
    pub fn new(model: GraphModel, config: ViewConfig) -> Self {
        Self {
            selection: SelectionController::new(config.selection_mode),
            hierarchy: HierarchyController::new(),
            pending: PendingRender {
                nodes: BTreeSet::new(),
                structure_changed: true,
            },
            layout_dirty: true,
            model,
            config,
        }
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn hierarchy(&self) -> &HierarchyController {
        &self.hierarchy
    }

    pub fn pending(&self) -> &PendingRender {
        &self.pending
    }

    pub fn selected_ids(&self) -> &BTreeSet<String> {
        self.selection.selected_ids()
    }

    pub fn set_selection_mode(&mut self, mode: SelectionMode) {
        self.config.selection_mode = mode;
        self.selection.set_mode(mode);
    }

    pub fn set_detail_disclosure(&mut self, disclosure: DetailDisclosure) {
        if self.config.detail_disclosure == disclosure {
            return;
        }
        self.config.detail_disclosure = disclosure;
        let with_symptoms = self
            .model
            .nodes()
            .filter(|node| node.has_symptoms())
            .map(|node| node.id.clone())
            .collect::<Vec<_>>();
        self.pending.nodes.extend(with_symptoms);
    }

    /// Edge styles change everywhere, so the next flush is a full render.
    pub fn set_edge_curve(&mut self, curve: EdgeCurve) {
        if self.config.edge_curve == curve {
            return;
        }
        self.config.edge_curve = curve;
        self.pending.structure_changed = true;
    }

    pub fn set_layout(&mut self, layout: LayoutConfig) {
        self.config.layout = layout;
        self.layout_dirty = true;
    }

    pub fn select(&mut self, id: &str) {
        let changed = self.selection.select(&self.model, id);
        self.pending.nodes.extend(changed);
    }

    pub fn deselect(&mut self, id: &str) {
        let changed = self.selection.deselect(id);
        self.pending.nodes.extend(changed);
    }

    pub fn toggle_selection(&mut self, id: &str) {
        let changed = self.selection.toggle(&self.model, id);
        self.pending.nodes.extend(changed);
    }

    pub fn clear_selection(&mut self) {
        let changed = self.selection.clear();
        self.pending.nodes.extend(changed);
    }

    /// Whether the symptom detail of `id` is shown under the current
    /// disclosure setting. Unknown ids are never shown.
    pub fn is_detail_visible(&self, id: &str) -> bool {
        match self.config.detail_disclosure {
            DetailDisclosure::Always => self.model.contains_node(id),
            DetailDisclosure::OnSelectOnly => self.selection.is_detail_visible(id),
        }
    }

    pub fn collapse(&mut self, id: &str) -> Result<()> {
        let transaction = self.hierarchy.collapse(&self.model, id)?;
        self.mark_transaction(&transaction);
        Ok(())
    }

    pub fn expand(&mut self, id: &str) -> Result<()> {
        let transaction = self.hierarchy.expand(&self.model, id)?;
        self.mark_transaction(&transaction);
        Ok(())
    }

    pub fn collapse_recursively(&mut self, id: &str) -> Result<()> {
        let transaction = self.hierarchy.collapse_recursively(&self.model, id)?;
        self.mark_transaction(&transaction);
        Ok(())
    }

    pub fn expand_recursively(&mut self, id: &str) -> Result<()> {
        let transaction = self.hierarchy.expand_recursively(&self.model, id)?;
        self.mark_transaction(&transaction);
        Ok(())
    }

    pub fn toggle_collapse(&mut self, id: &str) -> Result<()> {
        let transaction = self.hierarchy.toggle(&self.model, id)?;
        self.mark_transaction(&transaction);
        Ok(())
    }

    pub fn collapse_all(&mut self) {
        let transaction = self.hierarchy.collapse_all(&self.model);
        self.mark_transaction(&transaction);
    }

    pub fn expand_all(&mut self) {
        let transaction = self.hierarchy.expand_all(&self.model);
        self.mark_transaction(&transaction);
    }

    /// Returns false when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.hierarchy.undo() {
            Some(transaction) => {
                self.mark_transaction(&transaction);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.hierarchy.redo() {
            Some(transaction) => {
                self.mark_transaction(&transaction);
                true
            }
            None => false,
        }
    }

    pub fn add_node(&mut self, node: Node) -> Result<()> {
        let id = node.id.clone();
        self.model.add_node(node)?;
        self.mark_structure([id]);
        Ok(())
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        let endpoints = [edge.source.clone(), edge.target.clone()];
        self.model.add_edge(edge)?;
        self.mark_structure(endpoints);
        Ok(())
    }

    /// Removes a node from the model and from all view state.
    pub fn remove_node(&mut self, id: &str) -> Result<RemovedNode> {
        let removed = self.model.remove_node(id)?;
        self.selection.deselect(id);
        self.hierarchy.forget(id);
        let released = self.hierarchy.release_leaves(&self.model);

        let mut touched = vec![id.to_owned()];
        touched.extend(released);
        touched.extend(removed.promoted.iter().cloned());
        for edge in &removed.edges {
            touched.push(edge.source.clone());
            touched.push(edge.target.clone());
        }
        self.mark_structure(touched);
        Ok(removed)
    }

    /// Nodes and edges after collapsing and edge redirection.
    pub fn get_visible_graph(&self) -> VisibleGraph {
        self.hierarchy.visible_graph(&self.model)
    }

    /// Style for `id`, derived from its health values and the current view
    /// state.
    pub fn get_node_style(&self, id: &str) -> Result<NodeStyle> {
        let node = self.model.get_node(id)?;
        let disclosed = self.is_detail_visible(id);

        Ok(NodeStyle {
            label: node.name.clone(),
            segments: compute_segments(node, &self.config.health),
            selected: self.selection.is_selected(id),
            detail: if disclosed {
                node.symptoms.clone()
            } else {
                String::new()
            },
            compound: self.model.is_compound(id),
            collapsed: self.hierarchy.is_collapsed(id),
            hidden_descendants: self.hierarchy.hidden_descendants(&self.model, id),
        })
    }

    /// Style for the model edge `id` as currently displayed.
    pub fn get_edge_style(&self, id: &str) -> Result<EdgeStyle> {
        let edge = self.model.get_edge(id)?;
        let source = self.hierarchy.representative(&self.model, &edge.source);
        let target = self.hierarchy.representative(&self.model, &edge.target);
        let highlighted =
            self.selection.is_selected(&source) || self.selection.is_selected(&target);
        let edge_config = &self.config.edge;

        Ok(EdgeStyle {
            curve: self.config.edge_curve,
            width: edge_config.width,
            opacity: if highlighted {
                edge_config.selected_opacity
            } else {
                edge_config.opacity
            },
            arrow: true,
            highlighted,
            redirected: source != edge.source || target != edge.target,
            weight: edge.weight,
        })
    }

    /// Applies one user event.
    ///
    /// A click selects in single mode and toggles in additive mode. A double
    /// click toggles the collapse state of compound nodes.
    pub fn handle_event(&mut self, event: ViewEvent) -> Result<()> {
        debug!(?event, "view event");
        match event {
            ViewEvent::NodeClicked(id) => match self.selection.mode() {
                SelectionMode::Single => self.select(&id),
                SelectionMode::Additive => self.toggle_selection(&id),
            },
            ViewEvent::NodeDoubleClicked(id) => self.toggle_collapse(&id)?,
            ViewEvent::BackgroundClicked => self.clear_selection(),
            ViewEvent::Undo => {
                self.undo();
            }
            ViewEvent::Redo => {
                self.redo();
            }
            ViewEvent::CollapseAll => self.collapse_all(),
            ViewEvent::ExpandAll => self.expand_all(),
        }
        Ok(())
    }

    /// Sends owed work to `adapter`. Returns whether anything was sent.
    pub fn flush<A: RenderAdapter + ?Sized>(&mut self, adapter: &mut A) -> bool {
        let mut sent = false;
        if self.layout_dirty {
            adapter.set_layout(&self.config.layout);
            self.layout_dirty = false;
            sent = true;
        }

        let pending = std::mem::take(&mut self.pending);
        if pending.structure_changed {
            let graph = self.get_visible_graph();
            adapter.render(&graph, &*self);
            return true;
        }

        let nodes = pending
            .nodes
            .into_iter()
            .filter(|id| self.model.contains_node(id))
            .collect::<BTreeSet<_>>();
        if nodes.is_empty() {
            return sent;
        }
        adapter.refresh(&nodes, &*self);
        true
    }

    /// Handles every queued adapter event in arrival order, flushing after
    /// each one. Refused events are logged and skipped.
    pub fn pump<A: RenderAdapter + ?Sized>(&mut self, adapter: &mut A) -> usize {
        let events = adapter.take_events();
        let count = events.len();
        for event in events {
            if let Err(error) = self.handle_event(event.clone()) {
                warn!(?event, %error, "view event refused");
            }
            self.flush(adapter);
        }
        count
    }

    fn mark_transaction(&mut self, transaction: &Transaction) {
        if transaction.is_empty() {
            return;
        }
        let affected = HierarchyController::affected_ids(&self.model, transaction);
        self.mark_structure(affected);
    }

    fn mark_structure(&mut self, ids: impl IntoIterator<Item = String>) {
        self.pending.nodes.extend(ids);
        self.pending.structure_changed = true;
    }
}

impl StyleSource for Session {
    fn node_style(&self, id: &str) -> Option<NodeStyle> {
        self.get_node_style(id).ok()
    }

    fn edge_style(&self, id: &str) -> Option<EdgeStyle> {
        self.get_edge_style(id).ok()
    }
}

impl From<GraphModel> for Session {
    fn from(model: GraphModel) -> Self {
        Self::new(model, ViewConfig::default())
    }
}
