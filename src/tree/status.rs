use super::model::{COMPLETE_PERCENTAGE, Level};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    Locked,
    Available,
    Mastered,
    Boss,
    BossLocked,
}

impl NodeStatus {
    pub const ALL: [Self; 5] = [
        Self::Locked,
        Self::Available,
        Self::Mastered,
        Self::Boss,
        Self::BossLocked,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Locked => "Locked",
            Self::Available => "Available",
            Self::Mastered => "Mastered",
            Self::Boss => "Boss",
            Self::BossLocked => "Boss (locked)",
        }
    }

    pub fn is_clickable_for_learner(self) -> bool {
        !matches!(self, Self::Locked | Self::BossLocked)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeStatus {
    Locked,
    Available,
    Mastered,
}

impl EdgeStatus {
    pub const ALL: [Self; 3] = [Self::Locked, Self::Available, Self::Mastered];

    pub fn label(self) -> &'static str {
        match self {
            Self::Locked => "Locked path",
            Self::Available => "Open path",
            Self::Mastered => "Earned path",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeState {
    pub status: EdgeStatus,
    /// 0..=100; values strictly inside the range mark a path in progress.
    pub progress: f32,
}

/// Completion and unlock data of one edge endpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Endpoint {
    pub completion: f32,
    pub is_unlocked: bool,
}

impl Endpoint {
    pub fn of(level: &Level) -> Self {
        Self {
            completion: level.completion_percentage,
            is_unlocked: level.is_unlocked,
        }
    }

    fn is_complete(self) -> bool {
        self.completion >= COMPLETE_PERCENTAGE
    }
}

pub fn is_boss_title(title: &str) -> bool {
    let lowered = title.to_lowercase();
    lowered.contains("boss") || lowered.contains("combo")
}

pub fn node_status(
    title: &str,
    completion: f32,
    is_unlocked: bool,
    editor_mode: bool,
) -> NodeStatus {
    let boss = is_boss_title(title);

    if editor_mode {
        return if boss {
            NodeStatus::Boss
        } else {
            NodeStatus::Available
        };
    }

    if boss {
        if is_unlocked {
            NodeStatus::Boss
        } else {
            NodeStatus::BossLocked
        }
    } else if completion >= COMPLETE_PERCENTAGE {
        NodeStatus::Mastered
    } else if is_unlocked {
        NodeStatus::Available
    } else {
        NodeStatus::Locked
    }
}

pub fn level_status(level: &Level, editor_mode: bool) -> NodeStatus {
    node_status(
        &level.title,
        level.completion_percentage,
        level.is_unlocked,
        editor_mode,
    )
}

pub fn edge_state(source: Endpoint, target: Endpoint, editor_mode: bool) -> EdgeState {
    if editor_mode {
        return EdgeState {
            status: EdgeStatus::Mastered,
            progress: COMPLETE_PERCENTAGE,
        };
    }

    if source.is_complete() && target.is_complete() {
        EdgeState {
            status: EdgeStatus::Mastered,
            progress: COMPLETE_PERCENTAGE,
        }
    } else if source.is_complete() && target.is_unlocked {
        EdgeState {
            status: EdgeStatus::Available,
            progress: target.completion.clamp(0.0, COMPLETE_PERCENTAGE),
        }
    } else {
        EdgeState {
            status: EdgeStatus::Locked,
            progress: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::frontier::frontier_index;
    use super::super::model::fixtures::abc_tree;
    use super::*;

    fn endpoint(completion: f32, is_unlocked: bool) -> Endpoint {
        Endpoint {
            completion,
            is_unlocked,
        }
    }

    #[test]
    fn node_status_is_total_over_inputs() {
        for title in ["Intro", "Boss Fight", "Combo Drill", ""] {
            for completion in [0.0, 50.0, 100.0] {
                for unlocked in [true, false] {
                    for editor in [true, false] {
                        let status = node_status(title, completion, unlocked, editor);
                        assert!(NodeStatus::ALL.contains(&status));
                    }
                }
            }
        }
    }

    #[test]
    fn editor_mode_never_reports_locked_nodes() {
        for completion in [0.0, 50.0, 100.0] {
            for unlocked in [true, false] {
                assert_eq!(
                    node_status("Variables", completion, unlocked, true),
                    NodeStatus::Available
                );
                assert_eq!(
                    node_status("BOSS: recursion", completion, unlocked, true),
                    NodeStatus::Boss
                );
            }
        }
    }

    #[test]
    fn learner_node_status_rules() {
        assert_eq!(node_status("Final boss", 0.0, false, false), NodeStatus::BossLocked);
        assert_eq!(node_status("Final boss", 100.0, true, false), NodeStatus::Boss);
        assert_eq!(node_status("Loops", 100.0, false, false), NodeStatus::Mastered);
        assert_eq!(node_status("Loops", 10.0, true, false), NodeStatus::Available);
        assert_eq!(node_status("Loops", 10.0, false, false), NodeStatus::Locked);
    }

    #[test]
    fn edge_status_is_monotone_in_completion() {
        for target_completion in [0.0, 50.0, 100.0] {
            for target_unlocked in [true, false] {
                let target = endpoint(target_completion, target_unlocked);

                for source_unlocked in [true, false] {
                    let complete_source = endpoint(100.0, source_unlocked);
                    if target_completion >= 100.0 {
                        assert_eq!(
                            edge_state(complete_source, target, false).status,
                            EdgeStatus::Mastered
                        );
                    }

                    for source_completion in [0.0, 50.0] {
                        let state =
                            edge_state(endpoint(source_completion, source_unlocked), target, false);
                        assert_eq!(state.status, EdgeStatus::Locked);
                        assert_eq!(state.progress, 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn available_edge_carries_target_progress() {
        let state = edge_state(endpoint(100.0, true), endpoint(40.0, true), false);
        assert_eq!(state.status, EdgeStatus::Available);
        assert_eq!(state.progress, 40.0);

        let editor = edge_state(endpoint(0.0, false), endpoint(0.0, false), true);
        assert_eq!(editor.status, EdgeStatus::Mastered);
        assert_eq!(editor.progress, 100.0);
    }

    #[test]
    fn abc_scenario_learner_and_editor() {
        let tree = abc_tree();
        let a = &tree.levels[0];
        let b = &tree.levels[1];
        let c = &tree.levels[2];

        assert_eq!(frontier_index(&tree.levels), Some(1));
        assert_eq!(
            edge_state(Endpoint::of(a), Endpoint::of(b), false).status,
            EdgeStatus::Available
        );
        assert_eq!(
            edge_state(Endpoint::of(b), Endpoint::of(c), false).status,
            EdgeStatus::Locked
        );
        assert_eq!(level_status(a, false), NodeStatus::Mastered);
        assert_eq!(level_status(c, false), NodeStatus::Locked);

        assert_eq!(level_status(c, true), NodeStatus::Available);
        assert_eq!(
            edge_state(Endpoint::of(b), Endpoint::of(c), true).status,
            EdgeStatus::Mastered
        );
    }

    #[test]
    fn boss_naming_is_case_insensitive() {
        assert!(is_boss_title("THE BOSS"));
        assert!(is_boss_title("Combo challenge"));
        assert!(!is_boss_title("Closures"));
    }
}
