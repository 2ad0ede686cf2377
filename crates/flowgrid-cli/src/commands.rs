use anyhow::{Context, Result};
use flowgrid_core::{Position, WorkflowEdge, WorkflowGraph};
use flowgrid_layout::{LayoutConfig, LayoutEvent, LayoutObserver, layout_workflow};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// What the binary prints: the layout plus everything skipped on the way.
#[derive(Debug, Serialize)]
pub struct LayoutReport {
    pub positions: BTreeMap<String, Position>,
    pub levels: Vec<Vec<String>>,
    pub edges: Vec<WorkflowEdge>,
    pub synthesized: bool,
    pub warnings: Vec<String>,
}

/// Turns layout diagnostics into report warnings.
#[derive(Default)]
struct WarningCollector(Vec<String>);

impl LayoutObserver for WarningCollector {
    fn on_event(&mut self, event: LayoutEvent) {
        match event {
            LayoutEvent::EdgeDropped {
                edge_id,
                source,
                target,
                reason,
            } => self.0.push(format!(
                "Edge {} ({}->{}) skipped: {:?}",
                edge_id.as_deref().unwrap_or("(unnamed)"),
                source,
                target,
                reason
            )),
            LayoutEvent::NodeOrphaned { node_id, .. } => self
                .0
                .push(format!("Node '{}' unreachable, placed last", node_id)),
            LayoutEvent::EdgesSynthesized { .. } | LayoutEvent::FallbackRowLayout { .. } => {}
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<LayoutConfig> {
    match path {
        Some(path) => LayoutConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(LayoutConfig::default()),
    }
}

/// Read the workflow document from `path`, or stdin for `None` / `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

pub fn layout_document(json: &str, config: &LayoutConfig) -> Result<LayoutReport> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("Failed to parse workflow JSON")?;
    let parsed = WorkflowGraph::from_response(&value).context("Unrecognised workflow document")?;

    let mut collector = WarningCollector::default();
    let layout = layout_workflow(&parsed.graph, config, &mut collector);

    let mut warnings = parsed.warnings;
    warnings.extend(collector.0);

    info!(
        nodes = layout.positions.len(),
        edges = layout.edges.len(),
        warnings = warnings.len(),
        "laid out workflow"
    );

    Ok(LayoutReport {
        positions: layout.positions,
        levels: layout.levels,
        edges: layout.edges,
        synthesized: layout.synthesized,
        warnings,
    })
}

pub fn render(report: &LayoutReport, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    };
    out.context("Failed to serialize layout")
}
