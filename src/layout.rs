//! Layered (Sugiyama style) layout for prerequisite trees.
//!
//! Roots sit on the bottom rank and dependents stack upward. Edges spanning
//! several ranks are routed through virtual nodes while ordering and placing,
//! and the final coordinates of the real nodes are centered on the origin.

use std::collections::VecDeque;

use eframe::egui::{Vec2, vec2};

#[derive(Clone, Copy, Debug)]
pub struct LayoutConfig {
    pub node_size: f32,
    pub node_sep: f32,
    pub rank_sep: f32,
    pub order_sweeps: usize,
    pub refine_passes: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_size: 96.0,
            node_sep: 40.0,
            rank_sep: 72.0,
            order_sweeps: 8,
            refine_passes: 12,
        }
    }
}

struct Adjacency {
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

fn adjacency(node_count: usize, edges: &[(usize, usize)]) -> Adjacency {
    let mut successors = vec![Vec::new(); node_count];
    let mut predecessors = vec![Vec::new(); node_count];

    for &(from, to) in edges {
        if from >= node_count || to >= node_count || from == to {
            continue;
        }
        if successors[from].contains(&to) {
            continue;
        }
        successors[from].push(to);
        predecessors[to].push(from);
    }

    Adjacency {
        successors,
        predecessors,
    }
}

/// Longest-path ranks from the sources, with every source then pulled up to
/// sit one rank below its lowest dependent. Nodes stuck on a cycle get one
/// rank above their highest ranked predecessor.
pub(crate) fn assign_ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let graph = adjacency(node_count, edges);
    let mut indegree = graph
        .predecessors
        .iter()
        .map(Vec::len)
        .collect::<Vec<_>>();
    let mut rank = vec![0usize; node_count];
    let mut placed = vec![false; node_count];
    let mut queue = (0..node_count)
        .filter(|&node| indegree[node] == 0)
        .collect::<VecDeque<_>>();

    while let Some(node) = queue.pop_front() {
        placed[node] = true;
        for &next in &graph.successors[node] {
            rank[next] = rank[next].max(rank[node] + 1);
            indegree[next] -= 1;
            if indegree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    for node in 0..node_count {
        if placed[node] {
            continue;
        }
        rank[node] = graph.predecessors[node]
            .iter()
            .filter(|&&pred| placed[pred])
            .map(|&pred| rank[pred] + 1)
            .max()
            .unwrap_or(0);
        placed[node] = true;
    }

    for node in 0..node_count {
        if !graph.predecessors[node].is_empty() || graph.successors[node].is_empty() {
            continue;
        }
        if let Some(lowest) = graph.successors[node].iter().map(|&next| rank[next]).min() {
            rank[node] = lowest.saturating_sub(1);
        }
    }

    rank
}

/// Working graph with virtual nodes: every edge spans exactly one rank.
struct LayeredGraph {
    rank: Vec<usize>,
    is_real: Vec<bool>,
    up: Vec<Vec<usize>>,
    down: Vec<Vec<usize>>,
    layers: Vec<Vec<usize>>,
}

impl LayeredGraph {
    fn build(node_count: usize, edges: &[(usize, usize)], ranks: &[usize]) -> Self {
        let mut rank = ranks.to_vec();
        let mut is_real = vec![true; node_count];
        let mut up = vec![Vec::new(); node_count];
        let mut down = vec![Vec::new(); node_count];

        let graph = adjacency(node_count, edges);
        for (from, successors) in graph.successors.iter().enumerate() {
            for &to in successors {
                let (low, high) = if rank[from] <= rank[to] {
                    (from, to)
                } else {
                    (to, from)
                };
                if rank[low] == rank[high] {
                    continue;
                }

                let mut previous = low;
                for virtual_rank in (rank[low] + 1)..rank[high] {
                    let virtual_node = rank.len();
                    rank.push(virtual_rank);
                    is_real.push(false);
                    up.push(Vec::new());
                    down.push(vec![previous]);
                    up[previous].push(virtual_node);
                    previous = virtual_node;
                }
                up[previous].push(high);
                down[high].push(previous);
            }
        }

        let max_rank = rank.iter().copied().max().unwrap_or(0);
        let mut layers = vec![Vec::new(); max_rank + 1];
        for (item, &item_rank) in rank.iter().enumerate() {
            layers[item_rank].push(item);
        }

        Self {
            rank,
            is_real,
            up,
            down,
            layers,
        }
    }

    fn item_count(&self) -> usize {
        self.rank.len()
    }

    fn positions_in_layers(layers: &[Vec<usize>], item_count: usize) -> Vec<usize> {
        let mut position = vec![0usize; item_count];
        for layer in layers {
            for (index, &item) in layer.iter().enumerate() {
                position[item] = index;
            }
        }
        position
    }

    fn crossings(&self, layers: &[Vec<usize>]) -> usize {
        let position = Self::positions_in_layers(layers, self.item_count());
        let mut total = 0usize;

        for layer in layers {
            let segments = layer
                .iter()
                .flat_map(|&item| self.up[item].iter().map(move |&next| (item, next)))
                .collect::<Vec<_>>();

            for (index, &(a, b)) in segments.iter().enumerate() {
                for &(c, d) in &segments[index + 1..] {
                    let lower = position[a] as isize - position[c] as isize;
                    let upper = position[b] as isize - position[d] as isize;
                    if lower * upper < 0 {
                        total += 1;
                    }
                }
            }
        }

        total
    }

    fn reorder_layer(layer: &mut [usize], neighbors: &[Vec<usize>], position: &[usize]) {
        let mut keyed = layer
            .iter()
            .map(|&item| {
                let adjacent = &neighbors[item];
                let barycenter = if adjacent.is_empty() {
                    position[item] as f32
                } else {
                    adjacent.iter().map(|&other| position[other] as f32).sum::<f32>()
                        / adjacent.len() as f32
                };
                (barycenter, position[item], item)
            })
            .collect::<Vec<_>>();

        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (slot, (_, _, item)) in layer.iter_mut().zip(keyed) {
            *slot = item;
        }
    }

    fn minimize_crossings(&mut self, sweeps: usize) {
        let mut best = self.layers.clone();
        let mut best_crossings = self.crossings(&best);
        let mut current = self.layers.clone();

        for sweep in 0..sweeps {
            if best_crossings == 0 {
                break;
            }

            let downward = sweep % 2 == 0;
            let rank_count = current.len();
            let ranks = if downward {
                (1..rank_count).collect::<Vec<_>>()
            } else {
                (0..rank_count.saturating_sub(1)).rev().collect::<Vec<_>>()
            };

            for rank in ranks {
                let position = Self::positions_in_layers(&current, self.item_count());
                let neighbors = if downward { &self.down } else { &self.up };
                Self::reorder_layer(&mut current[rank], neighbors, &position);
            }

            let crossings = self.crossings(&current);
            if crossings < best_crossings {
                best_crossings = crossings;
                best = current.clone();
            }
        }

        self.layers = best;
    }

    fn width(&self, item: usize, config: &LayoutConfig) -> f32 {
        if self.is_real[item] {
            config.node_size
        } else {
            0.0
        }
    }

    fn min_gap(&self, left: usize, right: usize, config: &LayoutConfig) -> f32 {
        (self.width(left, config) + self.width(right, config)) * 0.5 + config.node_sep
    }

    /// Moves a layer toward `desired` while keeping order and separation.
    ///
    /// A left-to-right and a right-to-left resolution each satisfy the gaps,
    /// so their average does too and stays balanced around the targets.
    fn settle_layer(&self, layer: &[usize], desired: &[f32], x: &mut [f32], config: &LayoutConfig) {
        let count = layer.len();
        if count == 0 {
            return;
        }

        let mut from_left = desired.to_vec();
        for index in 1..count {
            let gap = self.min_gap(layer[index - 1], layer[index], config);
            from_left[index] = from_left[index].max(from_left[index - 1] + gap);
        }

        let mut from_right = desired.to_vec();
        for index in (0..count - 1).rev() {
            let gap = self.min_gap(layer[index], layer[index + 1], config);
            from_right[index] = from_right[index].min(from_right[index + 1] - gap);
        }

        for (index, &item) in layer.iter().enumerate() {
            x[item] = (from_left[index] + from_right[index]) * 0.5;
        }
    }

    fn assign_x(&self, config: &LayoutConfig) -> Vec<f32> {
        let mut x = vec![0.0f32; self.item_count()];

        for layer in &self.layers {
            let mut cursor = 0.0f32;
            for (index, &item) in layer.iter().enumerate() {
                if index > 0 {
                    cursor += self.min_gap(layer[index - 1], item, config);
                }
                x[item] = cursor;
            }
            let shift = cursor * 0.5;
            for &item in layer {
                x[item] -= shift;
            }
        }

        for pass in 0..config.refine_passes {
            let upward = pass % 2 == 0;
            let rank_count = self.layers.len();
            let ranks = if upward {
                (1..rank_count).collect::<Vec<_>>()
            } else {
                (0..rank_count.saturating_sub(1)).rev().collect::<Vec<_>>()
            };
            let neighbors = if upward { &self.down } else { &self.up };

            for rank in ranks {
                let layer = &self.layers[rank];
                let desired = layer
                    .iter()
                    .map(|&item| {
                        let adjacent = &neighbors[item];
                        if adjacent.is_empty() {
                            x[item]
                        } else {
                            let total = adjacent.iter().map(|&other| x[other]).sum::<f32>();
                            total / adjacent.len() as f32
                        }
                    })
                    .collect::<Vec<_>>();
                self.settle_layer(layer, &desired, &mut x, config);
            }
        }

        x
    }
}

pub fn layered_layout(
    node_count: usize,
    edges: &[(usize, usize)],
    config: &LayoutConfig,
) -> Vec<Vec2> {
    if node_count == 0 {
        return Vec::new();
    }

    let ranks = assign_ranks(node_count, edges);
    let mut graph = LayeredGraph::build(node_count, edges, &ranks);
    graph.minimize_crossings(config.order_sweeps);
    let x = graph.assign_x(config);

    let rank_step = config.node_size + config.rank_sep;
    let mut positions = (0..node_count)
        .map(|node| vec2(x[node], -(graph.rank[node] as f32) * rank_step))
        .collect::<Vec<_>>();

    center_on_origin(&mut positions);
    positions
}

/// Translates positions so their bounding box is centered at the origin.
pub fn center_on_origin(positions: &mut [Vec2]) {
    let Some(first) = positions.first().copied() else {
        return;
    };

    let (min, max) = positions
        .iter()
        .fold((first, first), |(min, max), &point| (min.min(point), max.max(point)));
    let center = (min + max) * 0.5;

    for position in positions.iter_mut() {
        *position -= center;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-3;

    fn assert_centered(positions: &[Vec2]) {
        let min = positions.iter().copied().fold(Vec2::splat(f32::MAX), Vec2::min);
        let max = positions.iter().copied().fold(Vec2::splat(f32::MIN), Vec2::max);
        assert!((min.x + max.x).abs() < TOLERANCE, "x span {min:?}..{max:?}");
        assert!((min.y + max.y).abs() < TOLERANCE, "y span {min:?}..{max:?}");
    }

    fn assert_rank_separation(positions: &[Vec2], config: &LayoutConfig) {
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                if (a.y - b.y).abs() < TOLERANCE {
                    assert!(
                        (a.x - b.x).abs() + TOLERANCE >= config.node_size + config.node_sep,
                        "nodes overlap: {a:?} {b:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn empty_and_single_node() {
        let config = LayoutConfig::default();
        assert!(layered_layout(0, &[], &config).is_empty());
        assert_eq!(layered_layout(1, &[], &config), vec![Vec2::ZERO]);
    }

    #[test]
    fn chain_flows_bottom_to_top() {
        let config = LayoutConfig::default();
        let positions = layered_layout(3, &[(0, 1), (1, 2)], &config);

        assert!(positions[0].y > positions[1].y);
        assert!(positions[1].y > positions[2].y);
        assert!((positions[0].x - positions[2].x).abs() < TOLERANCE);
        assert_centered(&positions);
    }

    #[test]
    fn centering_holds_for_assorted_graphs() {
        let config = LayoutConfig::default();
        let graphs: Vec<(usize, Vec<(usize, usize)>)> = vec![
            (4, vec![(0, 1), (0, 2), (1, 3), (2, 3)]),
            (6, vec![(0, 1), (2, 3), (3, 4)]),
            (7, vec![(0, 1), (0, 2), (0, 3), (1, 4), (2, 5), (3, 6), (0, 6)]),
            (5, vec![]),
        ];

        for (count, edges) in graphs {
            let positions = layered_layout(count, &edges, &config);
            assert_eq!(positions.len(), count);
            assert_centered(&positions);
            assert_rank_separation(&positions, &config);
        }
    }

    #[test]
    fn isolated_nodes_share_rank_zero() {
        let ranks = assign_ranks(4, &[(0, 1)]);
        assert_eq!(ranks, vec![0, 1, 0, 0]);
    }

    #[test]
    fn sources_are_pulled_up_under_their_dependent() {
        // 0 -> 1 -> 2 and 3 -> 2: node 3 rests right below node 2
        let ranks = assign_ranks(4, &[(0, 1), (1, 2), (3, 2)]);
        assert_eq!(ranks, vec![0, 1, 2, 1]);
    }

    #[test]
    fn ordering_removes_avoidable_crossings() {
        let config = LayoutConfig::default();
        let positions = layered_layout(4, &[(0, 3), (1, 2)], &config);

        let roots_ordered = positions[0].x < positions[1].x;
        let children_ordered = positions[3].x < positions[2].x;
        assert_eq!(roots_ordered, children_ordered);
    }

    #[test]
    fn parent_is_centered_over_its_children() {
        let config = LayoutConfig::default();
        let positions = layered_layout(3, &[(0, 1), (0, 2)], &config);

        let midpoint = (positions[1].x + positions[2].x) * 0.5;
        assert!((positions[0].x - midpoint).abs() < 1.0);
    }

    #[test]
    fn cyclic_input_still_produces_positions() {
        let config = LayoutConfig::default();
        let positions = layered_layout(3, &[(0, 1), (1, 2), (2, 0)], &config);
        assert_eq!(positions.len(), 3);
        assert!(positions.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn out_of_range_and_self_edges_are_ignored() {
        let config = LayoutConfig::default();
        let positions = layered_layout(2, &[(0, 0), (0, 9), (0, 1)], &config);
        assert_eq!(positions.len(), 2);
        assert!(positions[0].y > positions[1].y);
    }
}
