use std::collections::{HashSet, VecDeque};

const CHAIN_NODE_LIMIT: usize = 400;

/// Breadth-first walk over `adjacency` from `start`, stopping after
/// `max_depth` hops when given.
///
/// Edges are recorded as `(source, target)` in graph direction, so a walk
/// over the incoming lists still stores prerequisite → dependent pairs.
pub(super) fn collect_reachable(
    adjacency: &[Vec<usize>],
    start: usize,
    forward: bool,
    max_depth: Option<usize>,
    nodes: &mut HashSet<usize>,
    edges: &mut HashSet<(usize, usize)>,
) {
    let mut queue = VecDeque::from([(start, 0usize)]);
    let mut visited = HashSet::from([start]);

    while let Some((index, depth)) = queue.pop_front() {
        if max_depth.is_some_and(|limit| depth >= limit) {
            continue;
        }

        let Some(neighbors) = adjacency.get(index) else {
            continue;
        };

        for &next in neighbors {
            nodes.insert(next);
            edges.insert(if forward { (index, next) } else { (next, index) });

            if nodes.len() >= CHAIN_NODE_LIMIT {
                return;
            }
            if visited.insert(next) {
                queue.push_back((next, depth + 1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0 -> 1 -> 2 -> 3, 4 -> 2
    fn incoming() -> Vec<Vec<usize>> {
        vec![vec![], vec![0], vec![1, 4], vec![2], vec![]]
    }

    fn outgoing() -> Vec<Vec<usize>> {
        vec![vec![1], vec![2], vec![3], vec![], vec![2]]
    }

    #[test]
    fn backward_walk_collects_all_ancestors() {
        let mut nodes = HashSet::new();
        let mut edges = HashSet::new();
        collect_reachable(&incoming(), 3, false, None, &mut nodes, &mut edges);

        assert_eq!(nodes, HashSet::from([0, 1, 2, 4]));
        assert!(edges.contains(&(2, 3)));
        assert!(edges.contains(&(4, 2)));
        assert!(edges.contains(&(0, 1)));
    }

    #[test]
    fn depth_limit_keeps_direct_neighbors_only() {
        let mut nodes = HashSet::new();
        let mut edges = HashSet::new();
        collect_reachable(&outgoing(), 1, true, Some(1), &mut nodes, &mut edges);

        assert_eq!(nodes, HashSet::from([2]));
        assert_eq!(edges, HashSet::from([(1, 2)]));
    }
}
