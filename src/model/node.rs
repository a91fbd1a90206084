use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A component in the health graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    /// Category name to value in `[0, max_scale]`. Category order for display
    /// comes from the palette, not from this map.
    #[serde(default)]
    pub health: BTreeMap<String, f64>,
    /// Diagnostic text, empty when nothing is wrong.
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub parent: Option<String>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            health: BTreeMap::new(),
            symptoms: String::new(),
            parent: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_health(mut self, category: impl Into<String>, value: f64) -> Self {
        self.health.insert(category.into(), value);
        self
    }

    pub fn with_symptoms(mut self, symptoms: impl Into<String>) -> Self {
        self.symptoms = symptoms.into();
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn health_value(&self, category: &str) -> Option<f64> {
        self.health.get(category).copied()
    }

    pub fn has_symptoms(&self) -> bool {
        !self.symptoms.trim().is_empty()
    }
}

/// A directed link between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Only used for styling and ordering, never for structure.
    #[serde(default)]
    pub weight: Option<f64>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// The endpoint across from `node_id`, if the edge touches it.
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.source == node_id {
            Some(self.target.as_str())
        } else if self.target == node_id {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}
