use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::graph::GraphModel;
use super::node::{Edge, Node};

const RESERVED_NODE_KEYS: [&str; 5] = ["id", "name", "symptoms", "parent", "depth"];

/// Pre-built nodes and edges, not yet validated.
#[derive(Clone, Debug, Default)]
pub struct GraphInput {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphInput {
    pub fn into_model(self) -> crate::error::Result<GraphModel> {
        GraphModel::load(self.nodes, self.edges)
    }
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    symptoms: Option<String>,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    health: Option<BTreeMap<String, f64>>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    #[serde(default)]
    id: Option<String>,
    source: String,
    target: String,
    #[serde(default)]
    weight: Option<f64>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let health = raw.health.unwrap_or_else(|| {
            raw.extra
                .iter()
                .filter(|(key, _)| !RESERVED_NODE_KEYS.contains(&key.as_str()))
                .filter_map(|(key, value)| value.as_f64().map(|number| (key.clone(), number)))
                .collect()
        });

        Node {
            name: raw
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| raw.id.clone()),
            id: raw.id,
            health,
            symptoms: raw.symptoms.unwrap_or_default(),
            parent: raw.parent.filter(|parent| !parent.is_empty()),
        }
    }
}

impl From<RawEdge> for Edge {
    fn from(raw: RawEdge) -> Self {
        Edge {
            id: raw
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("{}{}", raw.source, raw.target)),
            source: raw.source,
            target: raw.target,
            weight: raw.weight,
        }
    }
}

/// Unwraps `{"data": {...}}` element envelopes; plain objects pass through.
fn element_payload(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|object| object.get("data"))
        .filter(|data| data.is_object())
        .unwrap_or(value)
}

fn element_group(value: &Value) -> Option<&str> {
    value.get("group").and_then(Value::as_str)
}

fn parse_node(value: &Value) -> Result<Node> {
    let raw = RawNode::deserialize(element_payload(value)).context("invalid node element")?;
    Ok(raw.into())
}

fn parse_edge(value: &Value) -> Result<Edge> {
    let raw = RawEdge::deserialize(element_payload(value)).context("invalid edge element")?;
    Ok(raw.into())
}

fn parse_list<T>(
    value: Option<&Value>,
    what: &str,
    parse: fn(&Value) -> Result<T>,
) -> Result<Vec<T>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let items = value
        .as_array()
        .ok_or_else(|| anyhow!("`{what}` must be an array"))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse(item).with_context(|| format!("{what}[{index}]")))
        .collect()
}

/// Parses a JSON element set.
///
/// Accepts `{"nodes": [...], "edges": [...]}`, the same wrapped in an
/// `"elements"` key, or a flat array of elements tagged with `"group"`.
/// Elements may be plain objects or `{"data": {...}}` envelopes.
pub fn parse_elements(raw: &str) -> Result<GraphInput> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in graph input")?;

    if let Some(items) = parsed.as_array() {
        let mut input = GraphInput::default();
        for (index, item) in items.iter().enumerate() {
            let is_edge = match element_group(item) {
                Some("edges") => true,
                Some("nodes") => false,
                _ => element_payload(item).get("source").is_some(),
            };
            if is_edge {
                input
                    .edges
                    .push(parse_edge(item).with_context(|| format!("elements[{index}]"))?);
            } else {
                input
                    .nodes
                    .push(parse_node(item).with_context(|| format!("elements[{index}]"))?);
            }
        }
        return Ok(input);
    }

    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("graph input must be a JSON object or array"))?;
    let object = object
        .get("elements")
        .and_then(Value::as_object)
        .unwrap_or(object);

    Ok(GraphInput {
        nodes: parse_list(object.get("nodes"), "nodes", parse_node)?,
        edges: parse_list(object.get("edges"), "edges", parse_edge)?,
    })
}

pub fn read_elements(path: &Path) -> Result<GraphInput> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph input {}", path.display()))?;
    parse_elements(&raw).with_context(|| format!("failed to parse graph input {}", path.display()))
}

/// Reads, parses and validates a graph input file.
pub fn load_model(path: &Path) -> Result<GraphModel> {
    let input = read_elements(path)?;
    input
        .into_model()
        .with_context(|| format!("graph input {} violates model invariants", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wrapped_elements_with_flat_health_keys() {
        let raw = r#"{
            "nodes": [
                {"data": {"id": "bm/cpu", "name": "cpu", "red": 3, "green": 7, "grey": 0,
                          "symptoms": "", "parent": "", "depth": 1},
                 "classes": "l1", "group": "nodes"},
                {"data": {"id": "bm/cpu/0", "name": "0", "red": 6, "green": 4,
                          "symptoms": "<br>high load (2)", "parent": "bm/cpu"}}
            ],
            "edges": [
                {"data": {"id": "e1", "weight": 1, "source": "bm/cpu", "target": "bm/cpu/0"},
                 "group": "edges"}
            ]
        }"#;

        let input = parse_elements(raw).unwrap();
        assert_eq!(input.nodes.len(), 2);
        let cpu = &input.nodes[0];
        assert_eq!(cpu.parent, None);
        assert_eq!(cpu.health_value("red"), Some(3.0));
        assert_eq!(cpu.health_value("grey"), Some(0.0));
        assert_eq!(cpu.health_value("depth"), None);
        assert_eq!(input.nodes[1].parent.as_deref(), Some("bm/cpu"));
        assert_eq!(input.edges[0].weight, Some(1.0));

        let model = input.into_model().unwrap();
        assert!(model.is_compound("bm/cpu"));
    }

    #[test]
    fn parses_plain_objects_and_defaults() {
        let raw = r#"{"elements": {
            "nodes": [{"id": "a", "health": {"red": 1}}, {"id": "b"}],
            "edges": [{"source": "a", "target": "b"}]
        }}"#;

        let input = parse_elements(raw).unwrap();
        assert_eq!(input.nodes[0].name, "a");
        assert_eq!(input.nodes[0].health_value("red"), Some(1.0));
        assert!(input.nodes[1].health.is_empty());
        assert_eq!(input.edges[0].id, "ab");
    }

    #[test]
    fn parses_flat_element_array() {
        let raw = r#"[
            {"group": "nodes", "data": {"id": "a"}},
            {"data": {"id": "b"}},
            {"data": {"id": "ab", "source": "a", "target": "b"}}
        ]"#;

        let input = parse_elements(raw).unwrap();
        assert_eq!(input.nodes.len(), 2);
        assert_eq!(input.edges.len(), 1);
    }

    #[test]
    fn reports_element_position_on_bad_input() {
        let error = parse_elements(r#"{"nodes": [{"id": "a"}, {"name": "no id"}]}"#).unwrap_err();
        assert!(format!("{error:#}").contains("nodes[1]"));

        assert!(parse_elements("42").is_err());
        assert!(parse_elements(r#"{"nodes": {}}"#).is_err());
    }
}
