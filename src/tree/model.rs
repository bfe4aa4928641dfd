use serde::{Deserialize, Serialize};

pub const COMPLETE_PERCENTAGE: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelLifecycle {
    Active,
    ComingSoon,
    Locked,
}

impl LevelLifecycle {
    pub const ALL: [Self; 3] = [Self::Active, Self::ComingSoon, Self::Locked];

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::ComingSoon => "Coming soon",
            Self::Locked => "Locked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "active" => Some(Self::Active),
            "coming_soon" | "comingsoon" => Some(Self::ComingSoon),
            "locked" => Some(Self::Locked),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelMetadata {
    pub outcome: Option<String>,
    pub duration_minutes: Option<u32>,
    pub total_xp: Option<u32>,
    pub status: Option<LevelLifecycle>,
}

/// One node of the skill tree.
///
/// `is_unlocked` is computed by the server and is independent of
/// `completion_percentage`: a fully completed level counts as mastered even
/// when the flag says otherwise.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub lesson_count: u32,
    pub completion_percentage: f32,
    pub is_unlocked: bool,
    pub thumbnail_url: Option<String>,
    pub preview_video_url: Option<String>,
    pub metadata: Option<LevelMetadata>,
    pub position: Option<i32>,
}

impl Level {
    pub fn is_complete(&self) -> bool {
        self.completion_percentage >= COMPLETE_PERCENTAGE
    }

    pub fn outcome(&self) -> Option<&str> {
        self.metadata.as_ref()?.outcome.as_deref()
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        self.metadata.as_ref()?.duration_minutes
    }

    pub fn total_xp(&self) -> Option<u32> {
        self.metadata.as_ref()?.total_xp
    }

    pub fn lifecycle(&self) -> Option<LevelLifecycle> {
        self.metadata.as_ref()?.status
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub position: i32,
    pub is_completed: bool,
}

/// Picks the lesson a learner should land on when opening a level: the first
/// incomplete lesson in course order, or the first lesson when all are done.
pub fn next_lesson(lessons: &[Lesson]) -> Option<&Lesson> {
    let mut ordered = lessons.iter().collect::<Vec<_>>();
    ordered.sort_by_key(|lesson| lesson.position);

    ordered
        .iter()
        .find(|lesson| !lesson.is_completed)
        .or_else(|| ordered.first())
        .copied()
}

/// Editable subset of a level sent to the backend on create and update.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_xp: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LevelLifecycle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

impl LevelDraft {
    pub fn from_level(level: &Level) -> Self {
        Self {
            title: level.title.clone(),
            outcome: level.outcome().map(str::to_owned),
            duration_minutes: level.duration_minutes(),
            total_xp: level.total_xp(),
            status: level.lifecycle(),
            position: level.position,
        }
    }
}

/// A confirmed server-side change, applied to the local tree only after the
/// request that produced it succeeded.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeChange {
    EdgeCreated(Edge),
    EdgeDeleted(String),
    LevelCreated(Level),
    LevelUpdated(Level),
    LevelDeleted(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkillTree {
    pub levels: Vec<Level>,
    pub edges: Vec<Edge>,
}

impl SkillTree {
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, id: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.id == id)
    }

    pub fn prerequisites_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.to == id)
    }

    pub fn dependents_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.from == id)
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges
            .iter()
            .any(|edge| edge.from == from && edge.to == to)
    }

    pub fn apply_change(&mut self, change: TreeChange) {
        match change {
            TreeChange::EdgeCreated(edge) => {
                if !self.edges.iter().any(|existing| existing.id == edge.id) {
                    self.edges.push(edge);
                }
            }
            TreeChange::EdgeDeleted(edge_id) => {
                self.edges.retain(|edge| edge.id != edge_id);
            }
            TreeChange::LevelCreated(level) | TreeChange::LevelUpdated(level) => {
                if let Some(existing) = self.levels.iter_mut().find(|item| item.id == level.id) {
                    *existing = level;
                } else {
                    self.levels.push(level);
                }
            }
            TreeChange::LevelDeleted(level_id) => {
                self.levels.retain(|level| level.id != level_id);
                self.edges
                    .retain(|edge| edge.from != level_id && edge.to != level_id);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::{Edge, Level, SkillTree};

    pub(crate) fn level(id: &str, completion: f32, unlocked: bool) -> Level {
        Level {
            id: id.to_owned(),
            title: format!("Level {id}"),
            description: None,
            lesson_count: 3,
            completion_percentage: completion,
            is_unlocked: unlocked,
            thumbnail_url: None,
            preview_video_url: None,
            metadata: None,
            position: None,
        }
    }

    pub(crate) fn edge(from: &str, to: &str) -> Edge {
        Edge {
            id: format!("{from}->{to}"),
            from: from.to_owned(),
            to: to.to_owned(),
        }
    }

    pub(crate) fn abc_tree() -> SkillTree {
        SkillTree {
            levels: vec![
                level("A", 100.0, true),
                level("B", 40.0, true),
                level("C", 0.0, false),
            ],
            edges: vec![edge("A", "B"), edge("B", "C")],
        }
    }
}
