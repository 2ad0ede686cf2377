//! Dependency-based layout for workflow graphs.
//!
//! The pipeline is pure and synchronous:
//!
//! 1. [`validate_and_fix_edges`] rewrites edge endpoints to canonical node ids
//!    and drops edges that point at unknown nodes.
//! 2. [`generate_missing_connections`] fabricates a linear chain when no
//!    valid edge survives.
//! 3. [`compute_levels`] partitions nodes into topological levels.
//! 4. [`assign_positions`] turns levels into canvas coordinates.
//!
//! [`layout_workflow`] runs all four steps. Explicit edges always decide the
//! ordering; node kinds and timestamps are only consulted when there are no
//! edges to go on.

mod config;
mod edges;
mod events;
mod levels;
mod positions;
mod synthesize;


pub use config::{ConfigError, LayoutConfig};
pub use edges::validate_and_fix_edges;
pub use events::{DropReason, LayoutEvent, LayoutObserver, NoopObserver};
pub use levels::compute_levels;
pub use positions::{assign_positions, row_positions};
pub use synthesize::generate_missing_connections;

use events::emit;
use flowgrid_core::{Position, WorkflowEdge, WorkflowGraph, WorkflowNode};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Everything produced by one run of the layout pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowLayout {
    /// One position per node, keyed by canonical id.
    pub positions: BTreeMap<String, Position>,
    /// Level partition used for placement. Empty when the row fallback ran.
    pub levels: Vec<Vec<String>>,
    /// The edges the layout was computed from: validated, or synthetic.
    pub edges: Vec<WorkflowEdge>,
    /// Whether `edges` were fabricated because none were usable.
    pub synthesized: bool,
}

/// Position nodes from an edge list that has already been validated.
///
/// With edges, nodes are leveled and placed column by column. Without any,
/// there is nothing to level on, so nodes are placed in a single row ordered
/// by timestamp, then kind, then name.
pub fn calculate_dependency_based_layout(
    nodes: &[WorkflowNode],
    edges: &[WorkflowEdge],
    config: &LayoutConfig,
    observer: &mut dyn LayoutObserver,
) -> BTreeMap<String, Position> {
    arrange(nodes, edges, config, observer).0
}

/// Run the full pipeline over a workflow: validate its edges, synthesize a
/// chain if none survive, then lay it out.
pub fn layout_workflow(
    graph: &WorkflowGraph,
    config: &LayoutConfig,
    observer: &mut dyn LayoutObserver,
) -> WorkflowLayout {
    let mut edges = validate_and_fix_edges(&graph.nodes, &graph.edges, observer);
    let mut synthesized = false;

    if edges.is_empty() {
        edges = generate_missing_connections(&graph.nodes);
        if !edges.is_empty() {
            synthesized = true;
            emit(
                observer,
                LayoutEvent::EdgesSynthesized { count: edges.len() },
            );
        }
    }

    let (positions, levels) = arrange(&graph.nodes, &edges, config, observer);
    debug!(
        nodes = positions.len(),
        levels = levels.len(),
        synthesized,
        "computed workflow layout"
    );

    WorkflowLayout {
        positions,
        levels,
        edges,
        synthesized,
    }
}

fn arrange(
    nodes: &[WorkflowNode],
    edges: &[WorkflowEdge],
    config: &LayoutConfig,
    observer: &mut dyn LayoutObserver,
) -> (BTreeMap<String, Position>, Vec<Vec<String>>) {
    if edges.is_empty() {
        let mut ordered = levels::first_by_id(nodes);
        emit(
            observer,
            LayoutEvent::FallbackRowLayout {
                node_count: ordered.len(),
            },
        );
        ordered.sort_by(|a, b| synthesize::row_order(a, b));
        let positions = row_positions(ordered.iter().map(|n| n.id.as_str()), config);
        return (positions, vec![]);
    }

    let levels = compute_levels(nodes, edges, observer);
    (assign_positions(&levels, config), levels)
}
