mod frontier;
mod model;
mod sanitize;
mod status;

pub use frontier::frontier_index;
pub use model::{
    Edge, Lesson, Level, LevelDraft, LevelLifecycle, LevelMetadata, SkillTree, TreeChange,
    next_lesson,
};
pub use status::{EdgeState, EdgeStatus, Endpoint, NodeStatus, edge_state, level_status};

#[cfg(test)]
pub(crate) use model::fixtures;
