use std::collections::{HashMap, HashSet, VecDeque};

use weft_core::types::Edge;

/// Compute a deterministic execution order with Kahn's algorithm.
///
/// Edges whose endpoints are not both in `node_ids` have no ordering
/// effect. Among several ready nodes the one submitted first runs first
/// (FIFO over input order), a committed contract, since it decides which
/// linear chain a branching graph collapses into. A result shorter than
/// `node_ids` means the remainder sits on a cycle.
pub fn execution_order(node_ids: &[String], edges: &[Edge]) -> Vec<String> {
    let known: HashSet<&str> = node_ids.iter().map(|s| s.as_str()).collect();

    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> =
        node_ids.iter().map(|id| (id.as_str(), 0)).collect();

    for edge in edges {
        let (from, to) = (edge.from.as_str(), edge.to.as_str());
        if !known.contains(from) || !known.contains(to) {
            continue;
        }
        adjacency.entry(from).or_default().push(to);
        if let Some(d) = in_degree.get_mut(to) {
            *d += 1;
        }
    }

    let mut queue: VecDeque<&str> = node_ids
        .iter()
        .map(|s| s.as_str())
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();

    let mut order = Vec::with_capacity(node_ids.len());
    while let Some(id) = queue.pop_front() {
        order.push(id.to_string());
        if let Some(successors) = adjacency.get(id) {
            for next in successors {
                if let Some(d) = in_degree.get_mut(next) {
                    *d -= 1;
                    if *d == 0 {
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_linear_chain() {
        let order = execution_order(
            &ids(&["a", "b", "c"]),
            &[Edge::new("a", "b"), Edge::new("b", "c")],
        );
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_edges_respected_regardless_of_input_order() {
        let order = execution_order(
            &ids(&["c", "b", "a"]),
            &[Edge::new("a", "b"), Edge::new("b", "c")],
        );
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_branching_ties_break_by_input_order() {
        // d depends on both branches; b and c are both ready after a.
        let order = execution_order(
            &ids(&["a", "b", "c", "d"]),
            &[
                Edge::new("a", "b"),
                Edge::new("a", "c"),
                Edge::new("b", "d"),
                Edge::new("c", "d"),
            ],
        );
        assert_eq!(order, vec!["a", "b", "c", "d"]);

        // Swapping the submission order of b and c swaps the tie-break.
        let order = execution_order(
            &ids(&["a", "c", "b", "d"]),
            &[
                Edge::new("a", "b"),
                Edge::new("a", "c"),
                Edge::new("b", "d"),
                Edge::new("c", "d"),
            ],
        );
        assert_eq!(order, vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_is_permutation_with_edges_forward() {
        let node_ids = ids(&["n1", "n2", "n3", "n4", "n5"]);
        let edges = vec![
            Edge::new("n3", "n1"),
            Edge::new("n1", "n5"),
            Edge::new("n3", "n5"),
            Edge::new("n2", "n4"),
        ];
        let order = execution_order(&node_ids, &edges);

        assert_eq!(order.len(), node_ids.len());
        for id in &node_ids {
            assert!(order.contains(id));
        }
        let pos = |id: &str| order.iter().position(|x| x == id).unwrap();
        for edge in &edges {
            assert!(pos(&edge.from) < pos(&edge.to));
        }
    }

    #[test]
    fn test_deterministic_across_calls() {
        let node_ids = ids(&["x", "y", "z", "w"]);
        let edges = vec![Edge::new("x", "z"), Edge::new("y", "w")];
        let first = execution_order(&node_ids, &edges);
        for _ in 0..10 {
            assert_eq!(execution_order(&node_ids, &edges), first);
        }
    }

    #[test]
    fn test_cycle_yields_short_result() {
        let order = execution_order(
            &ids(&["a", "b", "c"]),
            &[Edge::new("a", "b"), Edge::new("b", "a")],
        );
        // c is unaffected by the cycle; a and b never become ready.
        assert_eq!(order, vec!["c"]);
        assert!(order.len() < 3);
    }

    #[test]
    fn test_full_cycle_yields_empty() {
        let order = execution_order(&ids(&["a", "b"]), &[Edge::new("a", "b"), Edge::new("b", "a")]);
        assert!(order.is_empty());
    }

    #[test]
    fn test_unknown_edge_endpoints_ignored() {
        let order = execution_order(
            &ids(&["a", "b"]),
            &[
                Edge::new("a", "z"),
                Edge::new("z", "b"),
                Edge::new("a", "b"),
            ],
        );
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_no_edges_preserves_input_order() {
        let order = execution_order(&ids(&["c", "a", "b"]), &[]);
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(execution_order(&[], &[]).is_empty());
    }
}
