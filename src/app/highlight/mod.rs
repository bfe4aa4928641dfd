use std::collections::HashSet;

mod collect;

use self::collect::collect_reachable;
use super::{HighlightState, RenderGraph};

/// Everything that must be mastered before `focus_id`, plus the levels it
/// unlocks directly.
pub(super) fn build_highlight_state(cache: &RenderGraph, focus_id: &str) -> Option<HighlightState> {
    let &focus = cache.index_by_id.get(focus_id)?;

    let mut chain_nodes = HashSet::from([focus]);
    let mut chain_edges = HashSet::new();
    collect_reachable(
        &cache.incoming,
        focus,
        false,
        None,
        &mut chain_nodes,
        &mut chain_edges,
    );

    let mut unlock_nodes = HashSet::new();
    let mut unlock_edges = HashSet::new();
    collect_reachable(
        &cache.outgoing,
        focus,
        true,
        Some(1),
        &mut unlock_nodes,
        &mut unlock_edges,
    );

    Some(HighlightState {
        chain_nodes,
        chain_edges,
        unlock_nodes,
        unlock_edges,
    })
}

impl HighlightState {
    pub(super) fn contains_node(&self, index: usize) -> bool {
        self.chain_nodes.contains(&index) || self.unlock_nodes.contains(&index)
    }

    pub(super) fn contains_edge(&self, source: usize, target: usize) -> bool {
        let edge = (source, target);
        self.chain_edges.contains(&edge) || self.unlock_edges.contains(&edge)
    }
}
