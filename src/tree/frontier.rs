use super::model::Level;

/// Index of the learner's recommended next level.
///
/// First unlocked level that is not complete; otherwise the last unlocked
/// level; otherwise the first level. `None` only for an empty slice.
pub fn frontier_index(levels: &[Level]) -> Option<usize> {
    levels
        .iter()
        .position(|level| level.is_unlocked && !level.is_complete())
        .or_else(|| levels.iter().rposition(|level| level.is_unlocked))
        .or_else(|| (!levels.is_empty()).then_some(0))
}
