use crate::events::{LayoutEvent, LayoutObserver, emit};
use flowgrid_core::{WorkflowEdge, WorkflowNode};
use std::collections::{HashMap, HashSet};

/// Dependency structure built purely from edges. Node kinds and list order
/// play no part once connections exist.
#[derive(Debug, Clone)]
struct DependencyGraph<'a> {
    /// Unique nodes, in input order.
    nodes: Vec<&'a WorkflowNode>,
    /// node index -> indices of nodes it feeds into, in edge order.
    dependents: Vec<Vec<usize>>,
    /// node index -> indices of nodes it waits on.
    dependencies: Vec<Vec<usize>>,
}

impl<'a> DependencyGraph<'a> {
    fn new(nodes: &'a [WorkflowNode], edges: &[WorkflowEdge]) -> Self {
        let unique = first_by_id(nodes);
        let index: HashMap<&str, usize> = unique
            .iter()
            .enumerate()
            .map(|(i, &node)| (node.id.as_str(), i))
            .collect();

        let mut dependents = vec![Vec::new(); unique.len()];
        let mut dependencies = vec![Vec::new(); unique.len()];
        for edge in edges {
            let (Some(&from), Some(&to)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                continue;
            };
            dependents[from].push(to);
            dependencies[to].push(from);
        }

        Self {
            nodes: unique,
            dependents,
            dependencies,
        }
    }

    fn in_degrees(&self) -> Vec<usize> {
        self.dependencies.iter().map(Vec::len).collect()
    }

    fn id(&self, index: usize) -> String {
        self.nodes[index].id.clone()
    }
}

/// The first node for each canonical id, in input order. Later repeats are
/// ignored everywhere in the layout.
pub(crate) fn first_by_id(nodes: &[WorkflowNode]) -> Vec<&WorkflowNode> {
    let mut seen = HashSet::new();
    nodes
        .iter()
        .filter(|node| seen.insert(node.id.as_str()))
        .collect()
}

/// Partition nodes into topological levels with a layered Kahn's algorithm.
///
/// Level 0 holds every node with no incoming edge. Each later level holds the
/// nodes whose last outstanding dependency was resolved in the previous
/// level, so a node sits one level past its deepest predecessor. Frontier
/// order follows input order for level 0 and edge order after that.
///
/// Nodes that never become free (caught in a cycle, or downstream of one)
/// are gathered into one trailing level in input order and reported as
/// [`LayoutEvent::NodeOrphaned`]. Every node therefore lands in exactly one
/// level. Edges whose endpoints are not node ids are ignored.
pub fn compute_levels(
    nodes: &[WorkflowNode],
    edges: &[WorkflowEdge],
    observer: &mut dyn LayoutObserver,
) -> Vec<Vec<String>> {
    let graph = DependencyGraph::new(nodes, edges);
    let mut in_degree = graph.in_degrees();
    let mut placed = vec![false; graph.nodes.len()];
    let mut levels: Vec<Vec<String>> = Vec::new();

    let mut frontier: Vec<usize> = (0..graph.nodes.len())
        .filter(|&i| in_degree[i] == 0)
        .collect();

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &current in &frontier {
            placed[current] = true;
            for &dependent in &graph.dependents[current] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    next.push(dependent);
                }
            }
        }
        levels.push(frontier.iter().map(|&i| graph.id(i)).collect());
        frontier = next;
    }

    let trailing: Vec<usize> = (0..graph.nodes.len()).filter(|&i| !placed[i]).collect();
    if !trailing.is_empty() {
        for &i in &trailing {
            let waiting_on = graph.dependencies[i]
                .iter()
                .filter(|&&dep| !placed[dep])
                .map(|&dep| graph.id(dep))
                .collect();
            emit(
                observer,
                LayoutEvent::NodeOrphaned {
                    node_id: graph.id(i),
                    waiting_on,
                },
            );
        }
        levels.push(trailing.into_iter().map(|i| graph.id(i)).collect());
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgrid_core::NodeKind;

    fn nodes(ids: &[&str]) -> Vec<WorkflowNode> {
        ids.iter()
            .map(|id| WorkflowNode::new(*id, *id, NodeKind::Process))
            .collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<WorkflowEdge> {
        pairs
            .iter()
            .map(|(s, t)| WorkflowEdge::new(*s, *t))
            .collect()
    }

    fn levels(ids: &[&str], pairs: &[(&str, &str)]) -> Vec<Vec<String>> {
        compute_levels(&nodes(ids), &edges(pairs), &mut Vec::<LayoutEvent>::new())
    }

    #[test]
    fn no_edges_puts_everything_on_level_zero() {
        assert_eq!(levels(&["a", "b", "c"], &[]), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn empty_input_gives_no_levels() {
        assert!(levels(&[], &[]).is_empty());
    }

    #[test]
    fn uses_longest_path_depth() {
        // a -> b -> c and a -> c: c must wait for b.
        let result = levels(&["a", "b", "c"], &[("a", "c"), ("a", "b"), ("b", "c")]);
        assert_eq!(result, vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn frontier_follows_edge_order() {
        let result = levels(&["root", "x", "y"], &[("root", "y"), ("root", "x")]);
        assert_eq!(result, vec![vec!["root"], vec!["y", "x"]]);
    }

    #[test]
    fn cycle_goes_to_trailing_level() {
        let mut events: Vec<LayoutEvent> = Vec::new();
        let result = compute_levels(
            &nodes(&["a", "b", "c", "d"]),
            &edges(&[("a", "b"), ("b", "c"), ("c", "b"), ("c", "d")]),
            &mut events,
        );

        assert_eq!(result, vec![vec!["a"], vec!["b", "c", "d"]]);
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            LayoutEvent::NodeOrphaned {
                node_id: "b".to_string(),
                waiting_on: vec!["c".to_string()],
            }
        );
        assert_eq!(
            events[2],
            LayoutEvent::NodeOrphaned {
                node_id: "d".to_string(),
                waiting_on: vec!["c".to_string()],
            }
        );
    }

    #[test]
    fn full_cycle_has_only_trailing_level() {
        let result = levels(&["a", "b"], &[("a", "b"), ("b", "a")]);
        assert_eq!(result, vec![vec!["a", "b"]]);
    }

    #[test]
    fn self_loop_is_orphaned() {
        let result = levels(&["a", "loop"], &[("loop", "loop")]);
        assert_eq!(result, vec![vec!["a"], vec!["loop"]]);
    }

    #[test]
    fn duplicate_edges_resolve_together() {
        let result = levels(&["a", "b"], &[("a", "b"), ("a", "b")]);
        assert_eq!(result, vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn unknown_endpoints_are_ignored() {
        let result = levels(&["a", "b"], &[("ghost", "b"), ("a", "b")]);
        assert_eq!(result, vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn repeated_node_id_counted_once() {
        let mut input = nodes(&["a", "b"]);
        input.push(WorkflowNode::new("a", "again", NodeKind::End));
        let result = compute_levels(&input, &edges(&[("a", "b")]), &mut Vec::<LayoutEvent>::new());
        assert_eq!(result, vec![vec!["a"], vec!["b"]]);
    }
}
