//! Expand/collapse state of compound nodes, with undo.
//!
//! Collapsing only changes what is displayed. The model keeps every node and
//! edge; hidden descendants and their edges are folded into the collapsed
//! node when the visible graph is derived.

mod undo;
mod visibility;

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{GraphError, Result};
use crate::model::GraphModel;

pub use undo::{NodeState, Operation, StateChange, Transaction, UndoLog};
pub use visibility::{VisibleEdge, VisibleGraph};

#[derive(Clone, Debug, Default)]
pub struct HierarchyController {
    collapsed: BTreeSet<String>,
    log: UndoLog,
}

impl HierarchyController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: &str) -> NodeState {
        if self.collapsed.contains(id) {
            NodeState::Collapsed
        } else {
            NodeState::Expanded
        }
    }

    pub fn is_collapsed(&self, id: &str) -> bool {
        self.collapsed.contains(id)
    }

    pub fn collapsed_ids(&self) -> &BTreeSet<String> {
        &self.collapsed
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.log
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    /// True when some ancestor of `id` is collapsed.
    pub fn is_hidden(&self, model: &GraphModel, id: &str) -> bool {
        model
            .ancestors(id)
            .iter()
            .any(|ancestor| self.collapsed.contains(ancestor))
    }

    /// The node drawn in place of `id`.
    pub fn representative(&self, model: &GraphModel, id: &str) -> String {
        visibility::representative(model, &self.collapsed, id)
    }

    /// Number of descendants folded into `id`, zero unless it is collapsed.
    pub fn hidden_descendants(&self, model: &GraphModel, id: &str) -> usize {
        if self.is_collapsed(id) {
            model.descendants(id).len()
        } else {
            0
        }
    }

    pub fn visible_graph(&self, model: &GraphModel) -> VisibleGraph {
        visibility::derive(model, &self.collapsed)
    }

    pub fn collapse(&mut self, model: &GraphModel, id: &str) -> Result<Transaction> {
        ensure_exists(model, id)?;
        let targets = compound_only(model, [id.to_owned()]);
        Ok(self.commit(Operation::Collapse, targets, NodeState::Collapsed))
    }

    /// Reveals the immediate children of `id`. Children that are collapsed
    /// compound nodes stay collapsed.
    pub fn expand(&mut self, model: &GraphModel, id: &str) -> Result<Transaction> {
        ensure_exists(model, id)?;
        let targets = compound_only(model, [id.to_owned()]);
        Ok(self.commit(Operation::Expand, targets, NodeState::Expanded))
    }

    /// Collapses every compound descendant of `id`, deepest first, then `id`.
    pub fn collapse_recursively(&mut self, model: &GraphModel, id: &str) -> Result<Transaction> {
        ensure_exists(model, id)?;
        if !model.is_compound(id) {
            return Ok(self.commit(Operation::CollapseRecursively, Vec::new(), NodeState::Collapsed));
        }

        let mut targets = compound_only(model, model.descendants(id));
        targets.reverse();
        targets.push(id.to_owned());
        Ok(self.commit(Operation::CollapseRecursively, targets, NodeState::Collapsed))
    }

    /// Expands `id` and every compound descendant, outermost first.
    pub fn expand_recursively(&mut self, model: &GraphModel, id: &str) -> Result<Transaction> {
        ensure_exists(model, id)?;
        if !model.is_compound(id) {
            return Ok(self.commit(Operation::ExpandRecursively, Vec::new(), NodeState::Expanded));
        }

        let mut targets = vec![id.to_owned()];
        targets.extend(compound_only(model, model.descendants(id)));
        Ok(self.commit(Operation::ExpandRecursively, targets, NodeState::Expanded))
    }

    /// Collapses every compound node as a single undo step.
    pub fn collapse_all(&mut self, model: &GraphModel) -> Transaction {
        let mut targets = compound_by_depth(model);
        targets.reverse();
        self.commit(Operation::CollapseAll, targets, NodeState::Collapsed)
    }

    /// Expands every compound node as a single undo step.
    pub fn expand_all(&mut self, model: &GraphModel) -> Transaction {
        let targets = compound_by_depth(model);
        self.commit(Operation::ExpandAll, targets, NodeState::Expanded)
    }

    /// Collapses `id` when expanded, expands it when collapsed.
    pub fn toggle(&mut self, model: &GraphModel, id: &str) -> Result<Transaction> {
        match self.state(id) {
            NodeState::Collapsed => self.expand(model, id),
            NodeState::Expanded => self.collapse(model, id),
        }
    }

    /// Reverts the most recent transaction. Returns the transaction that was
    /// reverted, or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Transaction> {
        let transaction = self.log.take_undo()?;
        for change in transaction.inverse_changes() {
            self.set_state(&change.id, change.to);
        }
        debug!(operation = %transaction.operation, "undo");
        Some(transaction)
    }

    pub fn redo(&mut self) -> Option<Transaction> {
        let transaction = self.log.take_redo()?;
        for change in &transaction.changes {
            self.set_state(&change.id, change.to);
        }
        debug!(operation = %transaction.operation, "redo");
        Some(transaction)
    }

    /// Drops all trace of `id`, used when the node leaves the model.
    pub fn forget(&mut self, id: &str) {
        self.collapsed.remove(id);
        self.log.forget(id);
    }

    /// Forgets collapsed ids that no longer have children, returning them.
    /// A node that lost its last child has nothing left to fold.
    pub fn release_leaves(&mut self, model: &GraphModel) -> Vec<String> {
        let leaves = self
            .collapsed
            .iter()
            .filter(|id| !model.is_compound(id))
            .cloned()
            .collect::<Vec<_>>();
        for id in &leaves {
            self.forget(id);
        }
        leaves
    }

    /// Ids whose on-screen presence may change when `transaction` is applied
    /// or reverted: the toggled nodes and all their descendants.
    pub fn affected_ids(model: &GraphModel, transaction: &Transaction) -> BTreeSet<String> {
        let mut affected = BTreeSet::new();
        for change in &transaction.changes {
            affected.insert(change.id.clone());
            affected.extend(model.descendants(&change.id));
        }
        affected
    }

    fn set_state(&mut self, id: &str, state: NodeState) {
        match state {
            NodeState::Collapsed => self.collapsed.insert(id.to_owned()),
            NodeState::Expanded => self.collapsed.remove(id),
        };
    }

    fn commit(
        &mut self,
        operation: Operation,
        targets: Vec<String>,
        state: NodeState,
    ) -> Transaction {
        let mut changes = Vec::new();
        for id in targets {
            let from = self.state(&id);
            if from == state {
                continue;
            }
            self.set_state(&id, state);
            changes.push(StateChange {
                id,
                from,
                to: state,
            });
        }

        let transaction = Transaction {
            operation,
            changes,
        };
        if !transaction.is_empty() {
            debug!(
                operation = %operation,
                changed = transaction.changes.len(),
                "hierarchy transaction"
            );
            self.log.record(transaction.clone());
        }
        transaction
    }
}

fn ensure_exists(model: &GraphModel, id: &str) -> Result<()> {
    if model.contains_node(id) {
        Ok(())
    } else {
        Err(GraphError::NotFound(id.to_owned()))
    }
}

/// Leaf nodes have no collapse state; operations on them are no-ops.
fn compound_only(model: &GraphModel, ids: impl IntoIterator<Item = String>) -> Vec<String> {
    ids.into_iter().filter(|id| model.is_compound(id)).collect()
}

/// All compound nodes, shallowest first.
fn compound_by_depth(model: &GraphModel) -> Vec<String> {
    let mut compounds = model
        .compound_ids()
        .into_iter()
        .map(|id| (model.ancestors(&id).len(), id))
        .collect::<Vec<_>>();
    compounds.sort_by_key(|(depth, _)| *depth);
    compounds.into_iter().map(|(_, id)| id).collect()
}
