use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label carried by edges that were fabricated rather than read from the backend.
pub const SYNTHETIC_EDGE_LABEL: &str = "auto-generated";

/// A workflow and its connections, already reduced to canonical records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}

impl WorkflowGraph {
    pub fn new(nodes: Vec<WorkflowNode>, edges: Vec<WorkflowEdge>) -> Self {
        Self { nodes, edges }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Canonical id. Every other component refers to the node by this value.
    pub id: String,
    /// Secondary ids the backend also used for this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            aliases: vec![],
            name: name.into(),
            kind,
            created_at: None,
            started_at: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// Canonical id followed by every alias.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// The single timestamp used for attribute ordering: creation time,
    /// falling back to start time.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.started_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl WorkflowEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Whether this edge was fabricated to stand in for missing connections.
    pub fn is_synthetic(&self) -> bool {
        self.label.as_deref() == Some(SYNTHETIC_EDGE_LABEL)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// Node kinds
// =============================================================================

/// The role a node plays in the workflow. Backends send this as a free-form
/// string; anything unrecognised is kept verbatim in [`NodeKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Start,
    Process,
    Processor,
    Human,
    Ai,
    Decision,
    End,
    Other(String),
}

impl NodeKind {
    /// Parse a backend type string, case-insensitively.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "start" => NodeKind::Start,
            "process" => NodeKind::Process,
            "processor" => NodeKind::Processor,
            "human" => NodeKind::Human,
            "ai" => NodeKind::Ai,
            "decision" => NodeKind::Decision,
            "end" => NodeKind::End,
            _ => NodeKind::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Process => "process",
            NodeKind::Processor => "processor",
            NodeKind::Human => "human",
            NodeKind::Ai => "ai",
            NodeKind::Decision => "decision",
            NodeKind::End => "end",
            NodeKind::Other(raw) => raw,
        }
    }

    /// Ordering rank used when nodes must be sequenced without edges.
    ///
    /// Process, processor, human and AI steps share a rank, and unrecognised
    /// kinds fall into that same rank.
    pub fn rank(&self) -> u8 {
        match self {
            NodeKind::Start => 0,
            NodeKind::Process
            | NodeKind::Processor
            | NodeKind::Human
            | NodeKind::Ai
            | NodeKind::Other(_) => 1,
            NodeKind::Decision => 2,
            NodeKind::End => 3,
        }
    }
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Other(String::new())
    }
}

impl From<String> for NodeKind {
    fn from(raw: String) -> Self {
        NodeKind::parse(&raw)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
