//! Diagnostics emitted while repairing edges and leveling nodes.
//!
//! Callers that care about what was dropped or orphaned pass a
//! [`LayoutObserver`]; every event is also written to the tracing log.

use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DropReason {
    UnknownSource,
    UnknownTarget,
    UnknownEndpoints,
}

impl DropReason {
    pub(crate) fn from_lookup(source_known: bool, target_known: bool) -> Option<Self> {
        match (source_known, target_known) {
            (true, true) => None,
            (false, true) => Some(DropReason::UnknownSource),
            (true, false) => Some(DropReason::UnknownTarget),
            (false, false) => Some(DropReason::UnknownEndpoints),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayoutEvent {
    /// An edge referenced a node that is not in the workflow.
    EdgeDropped {
        edge_id: Option<String>,
        source: String,
        target: String,
        reason: DropReason,
    },
    /// No usable edges existed, so a linear chain was fabricated.
    EdgesSynthesized { count: usize },
    /// A node never became free of dependencies (cycle, or downstream of one)
    /// and was placed in the trailing level.
    NodeOrphaned {
        node_id: String,
        waiting_on: Vec<String>,
    },
    /// No edges were available at all; nodes were laid out in a single row.
    FallbackRowLayout { node_count: usize },
}

pub trait LayoutObserver {
    fn on_event(&mut self, event: LayoutEvent);
}

/// Collects every event, in emission order.
impl LayoutObserver for Vec<LayoutEvent> {
    fn on_event(&mut self, event: LayoutEvent) {
        self.push(event);
    }
}

/// Any closure taking an event can observe a layout run.
impl<F: FnMut(LayoutEvent)> LayoutObserver for F {
    fn on_event(&mut self, event: LayoutEvent) {
        self(event)
    }
}

/// Discards events. They still reach the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LayoutObserver for NoopObserver {
    fn on_event(&mut self, _event: LayoutEvent) {}
}

pub(crate) fn emit(observer: &mut dyn LayoutObserver, event: LayoutEvent) {
    match &event {
        LayoutEvent::EdgeDropped {
            edge_id,
            source,
            target,
            reason,
        } => warn!(
            edge = edge_id.as_deref().unwrap_or("-"),
            source = %source,
            target = %target,
            ?reason,
            "skipping edge with unknown endpoint"
        ),
        LayoutEvent::EdgesSynthesized { count } => {
            info!(count, "no valid edges, generated a linear chain")
        }
        LayoutEvent::NodeOrphaned {
            node_id,
            waiting_on,
        } => warn!(
            node = %node_id,
            ?waiting_on,
            "node unreachable by leveling, moved to trailing level"
        ),
        LayoutEvent::FallbackRowLayout { node_count } => {
            debug!(node_count, "no edges, using attribute-ordered row layout")
        }
    }
    observer.on_event(event);
}
