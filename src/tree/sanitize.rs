use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::model::SkillTree;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub duplicate_levels: usize,
    pub dangling_edges: usize,
    pub self_loops: usize,
    pub duplicate_edges: usize,
    pub cycle_edges: usize,
}

impl SanitizeReport {
    pub fn dropped_edges(&self) -> usize {
        self.dangling_edges + self.self_loops + self.duplicate_edges + self.cycle_edges
    }

    pub fn is_clean(&self) -> bool {
        self.duplicate_levels == 0 && self.dropped_edges() == 0
    }
}

fn reaches(adjacency: &HashMap<&str, Vec<&str>>, start: &str, goal: &str) -> bool {
    let mut stack = vec![start];
    let mut visited = HashSet::from([start]);

    while let Some(current) = stack.pop() {
        if current == goal {
            return true;
        }
        for &next in adjacency.get(current).into_iter().flatten() {
            if visited.insert(next) {
                stack.push(next);
            }
        }
    }

    false
}

impl SkillTree {
    /// Reduces the tree to a DAG the layout can rely on.
    ///
    /// Edges are considered in server order; an edge that would close a cycle
    /// with the edges accepted before it is dropped.
    pub fn sanitize(mut self) -> (Self, SanitizeReport) {
        let mut report = SanitizeReport::default();

        let mut seen_levels = HashSet::new();
        self.levels.retain(|level| {
            if seen_levels.insert(level.id.clone()) {
                true
            } else {
                warn!(level_id = %level.id, "dropping duplicate level");
                report.duplicate_levels += 1;
                false
            }
        });

        let mut accepted = Vec::with_capacity(self.edges.len());
        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut pairs = HashSet::new();

        for edge in &self.edges {
            if !seen_levels.contains(&edge.from) || !seen_levels.contains(&edge.to) {
                warn!(
                    edge_id = %edge.id,
                    from = %edge.from,
                    to = %edge.to,
                    "dropping edge with unknown endpoint"
                );
                report.dangling_edges += 1;
                continue;
            }
            if edge.from == edge.to {
                warn!(edge_id = %edge.id, level_id = %edge.from, "dropping self-referencing edge");
                report.self_loops += 1;
                continue;
            }
            if !pairs.insert((edge.from.as_str(), edge.to.as_str())) {
                report.duplicate_edges += 1;
                continue;
            }
            if reaches(&adjacency, &edge.to, &edge.from) {
                warn!(
                    edge_id = %edge.id,
                    from = %edge.from,
                    to = %edge.to,
                    "dropping edge that closes a prerequisite cycle"
                );
                report.cycle_edges += 1;
                continue;
            }

            adjacency
                .entry(edge.from.as_str())
                .or_default()
                .push(edge.to.as_str());
            accepted.push(edge.clone());
        }

        self.edges = accepted;
        (self, report)
    }

    /// Whether adding `from -> to` would introduce a cycle or a self loop.
    pub fn would_create_cycle(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }

        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            adjacency
                .entry(edge.from.as_str())
                .or_default()
                .push(edge.to.as_str());
        }

        reaches(&adjacency, to, from)
    }
}

#[cfg(test)]
mod tests {
    use super::super::model::fixtures::{abc_tree, edge, level};
    use super::*;

    #[test]
    fn clean_tree_passes_through() {
        let (tree, report) = abc_tree().sanitize();
        assert!(report.is_clean());
        assert_eq!(tree, abc_tree());
    }

    #[test]
    fn drops_dangling_self_and_duplicate_edges() {
        let mut tree = abc_tree();
        tree.edges.push(edge("A", "missing"));
        tree.edges.push(edge("B", "B"));
        tree.edges.push(edge("A", "B"));

        let (tree, report) = tree.sanitize();

        assert_eq!(report.dangling_edges, 1);
        assert_eq!(report.self_loops, 1);
        assert_eq!(report.duplicate_edges, 1);
        assert_eq!(tree.edges.len(), 2);
    }

    #[test]
    fn drops_the_edge_that_closes_a_cycle() {
        let mut tree = abc_tree();
        tree.edges.push(edge("C", "A"));

        let (tree, report) = tree.sanitize();

        assert_eq!(report.cycle_edges, 1);
        assert!(!tree.has_edge("C", "A"));
        assert!(tree.has_edge("A", "B"));
        assert!(tree.has_edge("B", "C"));
    }

    #[test]
    fn duplicate_levels_keep_first_occurrence() {
        let mut tree = abc_tree();
        tree.levels.push(level("A", 0.0, false));

        let (tree, report) = tree.sanitize();

        assert_eq!(report.duplicate_levels, 1);
        assert_eq!(tree.level_count(), 3);
        assert_eq!(tree.levels[0].completion_percentage, 100.0);
    }

    #[test]
    fn cycle_check_for_new_prerequisites() {
        let tree = abc_tree();
        assert!(tree.would_create_cycle("C", "A"));
        assert!(tree.would_create_cycle("B", "B"));
        assert!(!tree.would_create_cycle("A", "C"));
    }
}
