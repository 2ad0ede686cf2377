use crate::levels::first_by_id;
use chrono::{DateTime, Utc};
use flowgrid_core::{SYNTHETIC_EDGE_LABEL, WorkflowEdge, WorkflowNode};
use std::cmp::Ordering;

/// Fabricate a single linear chain through `nodes` for workflows that have
/// no usable edges.
///
/// Nodes are ordered by kind rank, then creation time, then start time, then
/// case-insensitive name. Only the first node per id takes part, so `n`
/// distinct nodes give exactly `n - 1` edges and fewer than two give none.
/// Every edge carries [`SYNTHETIC_EDGE_LABEL`].
pub fn generate_missing_connections(nodes: &[WorkflowNode]) -> Vec<WorkflowEdge> {
    let mut ordered = first_by_id(nodes);
    if ordered.len() <= 1 {
        return vec![];
    }

    ordered.sort_by(|a, b| chain_order(a, b));

    ordered
        .windows(2)
        .map(|pair| {
            let (source, target) = (&pair[0].id, &pair[1].id);
            WorkflowEdge::new(source.clone(), target.clone())
                .with_id(format!("generated-{}-{}", source, target))
                .with_label(SYNTHETIC_EDGE_LABEL)
        })
        .collect()
}

/// Ordering for synthesized chains: kind first, then timestamps, then name.
pub(crate) fn chain_order(a: &WorkflowNode, b: &WorkflowNode) -> Ordering {
    a.kind
        .rank()
        .cmp(&b.kind.rank())
        .then_with(|| cmp_timestamps(a.created_at, b.created_at))
        .then_with(|| cmp_timestamps(a.started_at, b.started_at))
        .then_with(|| cmp_names(&a.name, &b.name))
}

/// Ordering for the edgeless row layout: timestamp first, then kind, then name.
pub(crate) fn row_order(a: &WorkflowNode, b: &WorkflowNode) -> Ordering {
    cmp_timestamps(a.timestamp(), b.timestamp())
        .then_with(|| a.kind.rank().cmp(&b.kind.rank()))
        .then_with(|| cmp_names(&a.name, &b.name))
}

/// Earlier first; nodes without a timestamp sort after those with one.
fn cmp_timestamps(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_core::NodeKind;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn chain(edges: &[WorkflowEdge]) -> Vec<(&str, &str)> {
        edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect()
    }

    #[test]
    fn zero_or_one_node_gives_no_edges() {
        assert!(generate_missing_connections(&[]).is_empty());
        let one = vec![WorkflowNode::new("a", "A", NodeKind::Start)];
        assert!(generate_missing_connections(&one).is_empty());
    }

    #[test]
    fn repeated_id_joins_the_chain_once() {
        let nodes = vec![
            WorkflowNode::new("a", "A", NodeKind::Start),
            WorkflowNode::new("b", "B", NodeKind::Process),
            WorkflowNode::new("a", "A again", NodeKind::End),
        ];

        let edges = generate_missing_connections(&nodes);

        assert_eq!(chain(&edges), vec![("a", "b")]);
    }

    #[test]
    fn only_repeats_of_one_id_give_no_edges() {
        let nodes = vec![
            WorkflowNode::new("a", "A", NodeKind::Start),
            WorkflowNode::new("a", "A", NodeKind::End),
        ];
        assert!(generate_missing_connections(&nodes).is_empty());
    }

    #[test]
    fn orders_by_kind_rank() {
        let nodes = vec![
            WorkflowNode::new("end", "End", NodeKind::End),
            WorkflowNode::new("check", "Check", NodeKind::Decision),
            WorkflowNode::new("work", "Work", NodeKind::Human),
            WorkflowNode::new("start", "Start", NodeKind::Start),
        ];

        let edges = generate_missing_connections(&nodes);

        assert_eq!(
            chain(&edges),
            vec![("start", "work"), ("work", "check"), ("check", "end")]
        );
        assert!(edges.iter().all(WorkflowEdge::is_synthetic));
        assert_eq!(edges[0].id.as_deref(), Some("generated-start-work"));
    }

    #[test]
    fn unrecognised_kind_ranks_with_process() {
        let nodes = vec![
            WorkflowNode::new("d", "D", NodeKind::Decision),
            WorkflowNode::new("w", "W", NodeKind::parse("webhook")),
            WorkflowNode::new("s", "S", NodeKind::Start),
        ];

        let edges = generate_missing_connections(&nodes);

        assert_eq!(chain(&edges), vec![("s", "w"), ("w", "d")]);
    }

    #[test]
    fn ties_broken_by_created_then_started_then_name() {
        let nodes = vec![
            WorkflowNode::new("late", "a", NodeKind::Process).with_created_at(at(2_000)),
            WorkflowNode::new("undated", "a", NodeKind::Process),
            WorkflowNode::new("early", "z", NodeKind::Process).with_created_at(at(1_000)),
            WorkflowNode::new("beta", "Beta", NodeKind::Ai)
                .with_created_at(at(2_000))
                .with_started_at(at(10)),
            WorkflowNode::new("alpha", "alpha", NodeKind::Ai).with_created_at(at(2_000)),
        ];

        let edges = generate_missing_connections(&nodes);

        // "beta" has a start time and "late"/"alpha" do not; between those
        // two, "a" < "alpha" by name.
        assert_eq!(
            chain(&edges),
            vec![
                ("early", "beta"),
                ("beta", "late"),
                ("late", "alpha"),
                ("alpha", "undated"),
            ]
        );
    }

    #[test]
    fn name_tiebreak_is_case_insensitive() {
        let nodes = vec![
            WorkflowNode::new("2", "bravo", NodeKind::Process),
            WorkflowNode::new("1", "Alpha", NodeKind::Process),
            WorkflowNode::new("3", "CHARLIE", NodeKind::Process),
        ];

        let edges = generate_missing_connections(&nodes);

        assert_eq!(chain(&edges), vec![("1", "2"), ("2", "3")]);
    }

    #[test]
    fn row_order_prefers_timestamp_over_kind() {
        let end = WorkflowNode::new("end", "End", NodeKind::End).with_started_at(at(1));
        let start = WorkflowNode::new("start", "Start", NodeKind::Start).with_created_at(at(5));
        assert_eq!(row_order(&end, &start), Ordering::Less);
        assert_eq!(chain_order(&end, &start), Ordering::Greater);
    }
}
