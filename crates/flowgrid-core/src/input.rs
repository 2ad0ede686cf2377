//! Input boundary: turns backend node/edge records into canonical
//! [`WorkflowNode`]s and [`WorkflowEdge`]s.
//!
//! Backends disagree on field names (`instance_id` vs `id` vs `nodeId`,
//! `source` vs `from`, ...) and on the response envelope wrapping the lists.
//! All of that is absorbed here so the layout code only ever sees one shape.

use crate::{WorkflowEdge, WorkflowGraph, WorkflowNode};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

const INSTANCE_ID_KEYS: &[&str] = &["instance_id", "instanceId"];
const GENERIC_ID_KEYS: &[&str] = &["id"];
const ALTERNATE_ID_KEYS: &[&str] = &["node_id", "nodeId"];
const NAME_KEYS: &[&str] = &["name", "label", "title"];
const TYPE_KEYS: &[&str] = &["type", "node_type", "nodeType"];
const CREATED_AT_KEYS: &[&str] = &["created_at", "createdAt"];
const STARTED_AT_KEYS: &[&str] = &["started_at", "startedAt"];

const SOURCE_KEYS: &[&str] = &["source", "from", "source_id", "sourceId"];
const TARGET_KEYS: &[&str] = &["target", "to", "target_id", "targetId"];

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("Node has no id (checked instance_id, id, node_id)")]
    MissingNodeId,

    #[error("Edge {edge} has no {endpoint}")]
    MissingEndpoint {
        edge: String,
        endpoint: &'static str,
    },

    #[error("Response contains no node list")]
    MissingNodes,

    #[error("'{0}' is not a list")]
    NotAList(&'static str),
}

// =============================================================================
// Raw records
// =============================================================================

/// A node exactly as the backend described it. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct RawNode {
    pub instance_id: Option<String>,
    pub id: Option<String>,
    pub node_id: Option<String>,
    pub name: Option<String>,
    pub node_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
}

impl TryFrom<Value> for RawNode {
    type Error = InputError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let map = as_object(&value)?;
        Ok(Self {
            instance_id: id_field(map, INSTANCE_ID_KEYS),
            id: id_field(map, GENERIC_ID_KEYS),
            node_id: id_field(map, ALTERNATE_ID_KEYS),
            name: text_field(map, NAME_KEYS),
            node_type: text_field(map, TYPE_KEYS),
            created_at: timestamp_field(map, CREATED_AT_KEYS),
            started_at: timestamp_field(map, STARTED_AT_KEYS),
        })
    }
}

impl TryFrom<RawNode> for WorkflowNode {
    type Error = InputError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let RawNode {
            instance_id,
            id,
            node_id,
            name,
            node_type,
            created_at,
            started_at,
        } = raw;

        let mut present = [instance_id, id, node_id].into_iter().flatten();
        let canonical = present.next().ok_or(InputError::MissingNodeId)?;

        let mut aliases: Vec<String> = Vec::new();
        for alias in present {
            if alias != canonical && !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }

        Ok(WorkflowNode {
            name: name.unwrap_or_else(|| canonical.clone()),
            kind: node_type.as_deref().map(crate::NodeKind::parse).unwrap_or_default(),
            id: canonical,
            aliases,
            created_at,
            started_at,
        })
    }
}

/// An edge exactly as the backend described it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct RawEdge {
    pub id: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub label: Option<String>,
}

impl TryFrom<Value> for RawEdge {
    type Error = InputError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let map = as_object(&value)?;
        Ok(Self {
            id: id_field(map, &["id"]),
            source: id_field(map, SOURCE_KEYS),
            target: id_field(map, TARGET_KEYS),
            label: text_field(map, &["label"]),
        })
    }
}

impl TryFrom<RawEdge> for WorkflowEdge {
    type Error = InputError;

    fn try_from(raw: RawEdge) -> Result<Self, Self::Error> {
        let label = raw.id.clone().unwrap_or_else(|| "(unnamed)".to_string());
        let source = raw.source.ok_or_else(|| InputError::MissingEndpoint {
            edge: label.clone(),
            endpoint: "source",
        })?;
        let target = raw.target.ok_or(InputError::MissingEndpoint {
            edge: label,
            endpoint: "target",
        })?;
        Ok(WorkflowEdge {
            id: raw.id,
            source,
            target,
            label: raw.label,
        })
    }
}

// =============================================================================
// Lenient list parsing
// =============================================================================

/// Parse raw node values, skipping malformed entries with warnings.
///
/// Nodes without any id field, and nodes repeating a canonical id already
/// seen, are skipped. Warnings are labelled with the array index.
pub fn parse_nodes(raw: &[Value]) -> (Vec<WorkflowNode>, Vec<String>) {
    let mut nodes: Vec<WorkflowNode> = Vec::new();
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    for (i, val) in raw.iter().enumerate() {
        let parsed = RawNode::try_from(val.clone()).and_then(WorkflowNode::try_from);
        match parsed {
            Ok(node) if !seen.insert(node.id.clone()) => {
                warnings.push(format!("Node #{} skipped: duplicate id '{}'", i, node.id));
            }
            Ok(node) => nodes.push(node),
            Err(e) => warnings.push(format!("Node #{} skipped: {}", i, e)),
        }
    }

    if !warnings.is_empty() {
        debug!(skipped = warnings.len(), "dropped malformed node records");
    }
    (nodes, warnings)
}

/// Parse raw edge values, skipping malformed entries with warnings.
///
/// Endpoints are not checked against any node set here; that is the
/// layout validator's job.
pub fn parse_edges(raw: &[Value]) -> (Vec<WorkflowEdge>, Vec<String>) {
    let mut edges = Vec::new();
    let mut warnings = Vec::new();

    for (i, val) in raw.iter().enumerate() {
        match RawEdge::try_from(val.clone()).and_then(WorkflowEdge::try_from) {
            Ok(edge) => edges.push(edge),
            Err(e) => warnings.push(format!("Edge #{} skipped: {}", i, e)),
        }
    }

    if !warnings.is_empty() {
        debug!(skipped = warnings.len(), "dropped malformed edge records");
    }
    (edges, warnings)
}

// =============================================================================
// Response envelopes
// =============================================================================

/// A graph recovered from a backend response, with everything that was
/// skipped along the way.
#[derive(Debug, Clone, Default)]
pub struct ParsedWorkflow {
    pub graph: WorkflowGraph,
    pub warnings: Vec<String>,
}

impl WorkflowGraph {
    /// Build a graph from any of the response envelopes the backend returns:
    ///
    /// - `{ "nodes": [...], "edges": [...] }`
    /// - `{ "data": { "nodes": [...], "edges": [...] } }`
    /// - `{ "workflow": { "nodes": [...], "edges": [...] } }`
    /// - `{ "data": { "workflow": { "nodes": [...], "edges": [...] } } }`
    ///
    /// A missing edge list means "no edges".
    pub fn from_response(value: &Value) -> Result<ParsedWorkflow, InputError> {
        let root = as_object(value)?;
        let payload = locate_payload(root).ok_or(InputError::MissingNodes)?;

        let raw_nodes = payload
            .get("nodes")
            .and_then(Value::as_array)
            .ok_or(InputError::NotAList("nodes"))?;
        let raw_edges = match payload.get("edges") {
            None | Some(Value::Null) => &[][..],
            Some(Value::Array(edges)) => edges.as_slice(),
            Some(_) => return Err(InputError::NotAList("edges")),
        };

        let (nodes, mut warnings) = parse_nodes(raw_nodes);
        let (edges, edge_warnings) = parse_edges(raw_edges);
        warnings.extend(edge_warnings);

        Ok(ParsedWorkflow {
            graph: WorkflowGraph { nodes, edges },
            warnings,
        })
    }
}

fn locate_payload(root: &Map<String, Value>) -> Option<&Map<String, Value>> {
    let data = root.get("data").and_then(Value::as_object);
    let candidates = [
        Some(root),
        data,
        root.get("workflow").and_then(Value::as_object),
        data.and_then(|d| d.get("workflow")).and_then(Value::as_object),
    ];
    candidates
        .into_iter()
        .flatten()
        .find(|map| map.contains_key("nodes"))
}

// =============================================================================
// Field helpers
// =============================================================================

fn as_object(value: &Value) -> Result<&Map<String, Value>, InputError> {
    value.as_object().ok_or(InputError::NotAnObject(kind_name(value)))
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// First non-empty id under any of `keys`. Numeric ids are stringified.
fn id_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(number_id(n)),
        _ => None,
    })
}

/// `1` and `1.0` name the same node, so whole floats print as integers.
fn number_id(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| map.get(*key)?.as_str().map(String::from))
}

fn timestamp_field(map: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().find_map(|key| parse_timestamp(map.get(*key)?))
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 strings, naive date-times (taken as UTC), plain dates,
/// and integer epoch milliseconds. Anything else is treated as absent.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
