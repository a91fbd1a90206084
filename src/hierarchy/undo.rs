use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeState {
    #[default]
    Expanded,
    Collapsed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Collapse,
    Expand,
    CollapseRecursively,
    ExpandRecursively,
    CollapseAll,
    ExpandAll,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Collapse => "collapse",
            Self::Expand => "expand",
            Self::CollapseRecursively => "collapse recursively",
            Self::ExpandRecursively => "expand recursively",
            Self::CollapseAll => "collapse all",
            Self::ExpandAll => "expand all",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateChange {
    pub id: String,
    pub from: NodeState,
    pub to: NodeState,
}

/// The changes made by one user-level operation, in application order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub operation: Operation,
    pub changes: Vec<StateChange>,
}

impl Transaction {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes that undo this transaction, in the order they must be applied.
    pub fn inverse_changes(&self) -> impl Iterator<Item = StateChange> + '_ {
        self.changes.iter().rev().map(|change| StateChange {
            id: change.id.clone(),
            from: change.to,
            to: change.from,
        })
    }
}

/// Undo and redo stacks. Unbounded; lives as long as the session.
#[derive(Clone, Debug, Default)]
pub struct UndoLog {
    undo: Vec<Transaction>,
    redo: Vec<Transaction>,
}

impl UndoLog {
    /// Records a fresh transaction. Any redo history is discarded.
    pub fn record(&mut self, transaction: Transaction) {
        if transaction.is_empty() {
            return;
        }
        self.redo.clear();
        self.undo.push(transaction);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn peek_undo(&self) -> Option<&Transaction> {
        self.undo.last()
    }

    pub fn peek_redo(&self) -> Option<&Transaction> {
        self.redo.last()
    }

    pub(super) fn take_undo(&mut self) -> Option<Transaction> {
        let transaction = self.undo.pop()?;
        self.redo.push(transaction.clone());
        Some(transaction)
    }

    pub(super) fn take_redo(&mut self) -> Option<Transaction> {
        let transaction = self.redo.pop()?;
        self.undo.push(transaction.clone());
        Some(transaction)
    }

    /// Strips every change that mentions `id`; transactions left empty go.
    pub fn forget(&mut self, id: &str) {
        for stack in [&mut self.undo, &mut self.redo] {
            for transaction in stack.iter_mut() {
                transaction.changes.retain(|change| change.id != id);
            }
            stack.retain(|transaction| !transaction.is_empty());
        }
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(id: &str, from: NodeState, to: NodeState) -> StateChange {
        StateChange {
            id: id.to_owned(),
            from,
            to,
        }
    }

    #[test]
    fn inverse_reverses_order_and_direction() {
        let transaction = Transaction {
            operation: Operation::CollapseAll,
            changes: vec![
                change("leafward", NodeState::Expanded, NodeState::Collapsed),
                change("root", NodeState::Expanded, NodeState::Collapsed),
            ],
        };
        let inverse = transaction.inverse_changes().collect::<Vec<_>>();
        assert_eq!(
            inverse,
            vec![
                change("root", NodeState::Collapsed, NodeState::Expanded),
                change("leafward", NodeState::Collapsed, NodeState::Expanded),
            ]
        );
    }

    #[test]
    fn recording_clears_redo_and_skips_empty() {
        let mut log = UndoLog::default();
        log.record(Transaction {
            operation: Operation::Collapse,
            changes: vec![change("a", NodeState::Expanded, NodeState::Collapsed)],
        });
        log.record(Transaction {
            operation: Operation::Expand,
            changes: Vec::new(),
        });
        assert_eq!(log.undo_depth(), 1);

        assert!(log.take_undo().is_some());
        assert!(log.can_redo());
        log.record(Transaction {
            operation: Operation::Collapse,
            changes: vec![change("b", NodeState::Expanded, NodeState::Collapsed)],
        });
        assert!(!log.can_redo());
    }

    #[test]
    fn forget_prunes_history() {
        let mut log = UndoLog::default();
        log.record(Transaction {
            operation: Operation::CollapseAll,
            changes: vec![
                change("a", NodeState::Expanded, NodeState::Collapsed),
                change("b", NodeState::Expanded, NodeState::Collapsed),
            ],
        });
        log.record(Transaction {
            operation: Operation::Expand,
            changes: vec![change("a", NodeState::Collapsed, NodeState::Expanded)],
        });

        log.forget("a");
        assert_eq!(log.undo_depth(), 1);
        assert_eq!(log.peek_undo().map(|t| t.changes.len()), Some(1));
    }
}
