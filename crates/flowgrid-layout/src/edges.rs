use crate::events::{DropReason, LayoutEvent, LayoutObserver, emit};
use flowgrid_core::{WorkflowEdge, WorkflowNode};
use std::collections::{HashMap, HashSet};

/// Map every id a node exposes to that node's canonical id.
///
/// Canonical ids take precedence: if one node's alias collides with another
/// node's canonical id, the canonical owner wins. Between aliases, the first
/// node listed wins.
fn canonical_id_map(nodes: &[WorkflowNode]) -> HashMap<&str, &str> {
    let mut map: HashMap<&str, &str> = HashMap::new();
    for node in nodes {
        for alias in &node.aliases {
            map.entry(alias.as_str()).or_insert(node.id.as_str());
        }
    }
    for node in nodes {
        map.insert(node.id.as_str(), node.id.as_str());
    }
    map
}

/// Rewrite edge endpoints to canonical node ids and drop edges that do not
/// connect two known nodes.
///
/// Input order is preserved. Edges without an id get `"<source>-<target>"`.
/// Logically identical edges are kept as-is, not deduplicated. Dropped edges
/// are reported to `observer` as [`LayoutEvent::EdgeDropped`].
pub fn validate_and_fix_edges(
    nodes: &[WorkflowNode],
    edges: &[WorkflowEdge],
    observer: &mut dyn LayoutObserver,
) -> Vec<WorkflowEdge> {
    let id_map = canonical_id_map(nodes);
    let known: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let resolve = |raw: &str| -> String {
        id_map.get(raw).copied().unwrap_or(raw).to_string()
    };

    let mut valid = Vec::with_capacity(edges.len());
    for edge in edges {
        let source = resolve(&edge.source);
        let target = resolve(&edge.target);

        let source_known = known.contains(source.as_str());
        let target_known = known.contains(target.as_str());
        if let Some(reason) = DropReason::from_lookup(source_known, target_known) {
            emit(
                observer,
                LayoutEvent::EdgeDropped {
                    edge_id: edge.id.clone(),
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    reason,
                },
            );
            continue;
        }

        let id = edge
            .id
            .clone()
            .unwrap_or_else(|| format!("{}-{}", source, target));
        valid.push(WorkflowEdge {
            id: Some(id),
            source,
            target,
            label: edge.label.clone(),
        });
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_core::NodeKind;

    fn node(id: &str) -> WorkflowNode {
        WorkflowNode::new(id, id.to_uppercase(), NodeKind::Process)
    }

    #[test]
    fn resolves_aliases_to_canonical_ids() {
        let nodes = vec![
            node("inst-a").with_alias("1"),
            node("inst-b").with_alias("2").with_alias("node-b"),
        ];
        let edges = vec![WorkflowEdge::new("1", "node-b")];
        let mut events: Vec<LayoutEvent> = Vec::new();

        let valid = validate_and_fix_edges(&nodes, &edges, &mut events);

        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].source, "inst-a");
        assert_eq!(valid[0].target, "inst-b");
        assert_eq!(valid[0].id.as_deref(), Some("inst-a-inst-b"));
        assert!(events.is_empty());
    }

    #[test]
    fn keeps_existing_id_and_label() {
        let nodes = vec![node("a"), node("b")];
        let edges = vec![WorkflowEdge::new("a", "b").with_id("e-7").with_label("on success")];

        let valid = validate_and_fix_edges(&nodes, &edges, &mut Vec::<LayoutEvent>::new());

        assert_eq!(valid[0].id.as_deref(), Some("e-7"));
        assert_eq!(valid[0].label.as_deref(), Some("on success"));
    }

    #[test]
    fn drops_unknown_endpoints_with_reason() {
        let nodes = vec![node("a"), node("b")];
        let edges = vec![
            WorkflowEdge::new("a", "ghost"),
            WorkflowEdge::new("ghost", "b").with_id("e2"),
            WorkflowEdge::new("x", "y"),
            WorkflowEdge::new("a", "b"),
        ];
        let mut events: Vec<LayoutEvent> = Vec::new();

        let valid = validate_and_fix_edges(&nodes, &edges, &mut events);

        assert_eq!(valid, vec![WorkflowEdge::new("a", "b").with_id("a-b")]);
        let reasons: Vec<DropReason> = events
            .iter()
            .map(|e| match e {
                LayoutEvent::EdgeDropped { reason, .. } => *reason,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                DropReason::UnknownTarget,
                DropReason::UnknownSource,
                DropReason::UnknownEndpoints,
            ]
        );
        assert!(matches!(
            &events[1],
            LayoutEvent::EdgeDropped { edge_id: Some(id), .. } if id == "e2"
        ));
    }

    #[test]
    fn canonical_id_beats_colliding_alias() {
        // "b" is an alias of node a, but also node b's canonical id.
        let nodes = vec![node("a").with_alias("b"), node("b")];
        let edges = vec![WorkflowEdge::new("a", "b")];

        let valid = validate_and_fix_edges(&nodes, &edges, &mut Vec::<LayoutEvent>::new());

        assert_eq!(valid[0].target, "b");
    }

    #[test]
    fn preserves_order_and_duplicates() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let edges = vec![
            WorkflowEdge::new("b", "c"),
            WorkflowEdge::new("a", "b"),
            WorkflowEdge::new("b", "c"),
        ];

        let valid = validate_and_fix_edges(&nodes, &edges, &mut Vec::<LayoutEvent>::new());

        let pairs: Vec<(&str, &str)> = valid
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(pairs, vec![("b", "c"), ("a", "b"), ("b", "c")]);
    }
}
