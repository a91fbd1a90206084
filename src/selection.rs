//! Which nodes the user has picked, and therefore which show their symptoms.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::SelectionMode;
use crate::model::GraphModel;

#[derive(Clone, Debug, Default)]
pub struct SelectionController {
    mode: SelectionMode,
    selected: BTreeSet<String>,
}

impl SelectionController {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: BTreeSet::new(),
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switching to single mode keeps the selection as it is; the next
    /// `select` narrows it.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    pub fn selected_ids(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Symptom text is disclosed exactly for selected nodes.
    pub fn is_detail_visible(&self, id: &str) -> bool {
        self.is_selected(id)
    }

    /// Selects `id`, clearing other selections in single mode.
    ///
    /// Returns the ids whose selection state changed. Unknown ids are ignored,
    /// since click events can trail model updates.
    pub fn select(&mut self, model: &GraphModel, id: &str) -> BTreeSet<String> {
        let mut changed = BTreeSet::new();
        if !model.contains_node(id) {
            debug!(node = id, "ignoring selection of unknown node");
            return changed;
        }

        if self.mode == SelectionMode::Single {
            let others = self
                .selected
                .iter()
                .filter(|selected| selected.as_str() != id)
                .cloned()
                .collect::<Vec<_>>();
            for other in others {
                self.selected.remove(&other);
                changed.insert(other);
            }
        }

        if self.selected.insert(id.to_owned()) {
            changed.insert(id.to_owned());
        }
        changed
    }

    pub fn deselect(&mut self, id: &str) -> BTreeSet<String> {
        let mut changed = BTreeSet::new();
        if self.selected.remove(id) {
            changed.insert(id.to_owned());
        }
        changed
    }

    pub fn toggle(&mut self, model: &GraphModel, id: &str) -> BTreeSet<String> {
        if self.is_selected(id) {
            self.deselect(id)
        } else {
            self.select(model, id)
        }
    }

    pub fn clear(&mut self) -> BTreeSet<String> {
        std::mem::take(&mut self.selected)
    }

    /// Drops ids that no longer exist in `model`.
    pub fn retain_known(&mut self, model: &GraphModel) -> BTreeSet<String> {
        let stale = self
            .selected
            .iter()
            .filter(|id| !model.contains_node(id))
            .cloned()
            .collect::<BTreeSet<_>>();
        for id in &stale {
            self.selected.remove(id);
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;

    fn model() -> GraphModel {
        GraphModel::load([Node::new("A"), Node::new("B"), Node::new("C")], []).unwrap()
    }

    fn ids(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn single_mode_replaces_selection() {
        let model = model();
        let mut selection = SelectionController::new(SelectionMode::Single);
        assert_eq!(selection.select(&model, "A"), ids(&["A"]));
        assert_eq!(selection.select(&model, "B"), ids(&["A", "B"]));
        assert_eq!(selection.selected_ids(), &ids(&["B"]));
    }

    #[test]
    fn additive_mode_accumulates() {
        let model = model();
        let mut selection = SelectionController::new(SelectionMode::Additive);
        selection.select(&model, "A");
        assert_eq!(selection.select(&model, "B"), ids(&["B"]));
        assert_eq!(selection.selected_ids(), &ids(&["A", "B"]));
    }

    #[test]
    fn reselecting_is_quiet() {
        let model = model();
        let mut selection = SelectionController::new(SelectionMode::Single);
        selection.select(&model, "A");
        assert!(selection.select(&model, "A").is_empty());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let model = model();
        let mut selection = SelectionController::new(SelectionMode::Single);
        selection.select(&model, "A");
        assert!(selection.select(&model, "ghost").is_empty());
        assert!(selection.deselect("ghost").is_empty());
        assert_eq!(selection.selected_ids(), &ids(&["A"]));
    }

    #[test]
    fn detail_follows_selection() {
        let model = model();
        let mut selection = SelectionController::new(SelectionMode::Additive);
        selection.select(&model, "C");
        assert!(selection.is_detail_visible("C"));
        assert!(!selection.is_detail_visible("A"));
        selection.toggle(&model, "C");
        assert!(!selection.is_detail_visible("C"));
        selection.toggle(&model, "A");
        assert!(selection.is_detail_visible("A"));
        assert_eq!(selection.clear(), ids(&["A"]));
        assert!(selection.selected_ids().is_empty());
    }

    #[test]
    fn retain_known_drops_removed_nodes() {
        let mut model = model();
        let mut selection = SelectionController::new(SelectionMode::Additive);
        selection.select(&model, "A");
        selection.select(&model, "B");
        model.remove_node("A").unwrap();
        assert_eq!(selection.retain_known(&model), ids(&["A"]));
        assert_eq!(selection.selected_ids(), &ids(&["B"]));
    }
}
