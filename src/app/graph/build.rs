use std::collections::HashMap;

use tracing::debug;

use crate::layout::{LayoutConfig, layered_layout};
use crate::tree::{SkillTree, frontier_index};

use super::super::{RenderEdge, RenderGraph, RenderNode, ViewModel, ViewScratch};

pub(in crate::app) fn build_render_graph(tree: &SkillTree, config: &LayoutConfig) -> RenderGraph {
    let index_by_id = tree
        .levels
        .iter()
        .enumerate()
        .map(|(index, level)| (level.id.clone(), index))
        .collect::<HashMap<_, _>>();

    let edges = tree
        .edges
        .iter()
        .filter_map(|edge| {
            let source = *index_by_id.get(&edge.from)?;
            let target = *index_by_id.get(&edge.to)?;
            Some(RenderEdge {
                source,
                target,
            })
        })
        .collect::<Vec<_>>();

    let pairs = edges
        .iter()
        .map(|edge| (edge.source, edge.target))
        .collect::<Vec<_>>();
    let positions = layered_layout(tree.levels.len(), &pairs, config);

    let nodes = tree
        .levels
        .iter()
        .zip(positions)
        .enumerate()
        .map(|(level_index, (level, world_pos))| RenderNode {
            id: level.id.clone(),
            level_index,
            world_pos,
        })
        .collect::<Vec<_>>();

    let mut outgoing = vec![Vec::new(); nodes.len()];
    let mut incoming = vec![Vec::new(); nodes.len()];
    for &(source, target) in &pairs {
        outgoing[source].push(target);
        incoming[target].push(source);
    }

    RenderGraph {
        nodes,
        edges,
        index_by_id,
        outgoing,
        incoming,
        frontier_index: frontier_index(&tree.levels),
        view_scratch: ViewScratch {
            screen_positions: Vec::new(),
            screen_radii: Vec::new(),
            visible_indices: Vec::new(),
            visible_mask: Vec::new(),
        },
    }
}

impl ViewModel {
    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        self.render_graph_revision = self.render_graph_revision.wrapping_add(1);
        self.search_match_cache = None;

        let cache = build_render_graph(&self.tree, &LayoutConfig::default());
        debug!(
            nodes = cache.nodes.len(),
            edges = cache.edges.len(),
            revision = self.render_graph_revision,
            "laid out skill tree"
        );

        self.graph_cache = Some(cache);
        self.graph_dirty = false;
    }

    pub(in crate::app) fn mark_graph_dirty(&mut self) {
        self.graph_dirty = true;
    }

    /// Swaps in a freshly fetched tree while keeping pending work, the open
    /// draft and any alert.
    pub(in crate::app) fn replace_tree(&mut self, tree: SkillTree) {
        self.tree = tree;
        self.hover.dismiss();
        self.reload_error = None;
        if let Some(id) = self.selected.as_deref()
            && self.tree.level(id).is_none()
        {
            self.selected = None;
            self.editor = None;
        }
        self.camera.reset();
        self.mark_graph_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::fixtures::{abc_tree, edge, level};

    #[test]
    fn abc_tree_is_laid_out_bottom_up() {
        let cache = build_render_graph(&abc_tree(), &LayoutConfig::default());
        assert_eq!(cache.nodes.len(), 3);
        assert_eq!(cache.edges.len(), 2);

        let a = cache.nodes[cache.index_by_id["A"]].world_pos;
        let c = cache.nodes[cache.index_by_id["C"]].world_pos;
        assert!(a.y > c.y, "prerequisites sit below what they unlock");
        assert_eq!(cache.frontier_index, Some(cache.index_by_id["B"]));
    }

    #[test]
    fn adjacency_follows_edges() {
        let cache = build_render_graph(&abc_tree(), &LayoutConfig::default());
        let b = cache.index_by_id["B"];
        assert_eq!(cache.incoming[b], vec![cache.index_by_id["A"]]);
        assert_eq!(cache.outgoing[b], vec![cache.index_by_id["C"]]);
    }

    #[test]
    fn edges_to_unknown_levels_are_skipped() {
        let tree = SkillTree {
            levels: vec![level("A", 0.0, true)],
            edges: vec![edge("A", "ghost")],
        };
        let cache = build_render_graph(&tree, &LayoutConfig::default());
        assert!(cache.edges.is_empty());
        assert_eq!(cache.nodes.len(), 1);
    }

    #[test]
    fn empty_tree_builds_empty_graph() {
        let cache = build_render_graph(&SkillTree::default(), &LayoutConfig::default());
        assert!(cache.nodes.is_empty());
        assert_eq!(cache.frontier_index, None);
    }
}
