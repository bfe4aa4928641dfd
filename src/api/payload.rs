use serde::Deserialize;
use tracing::warn;

use crate::tree::{Edge, Lesson, Level, LevelLifecycle, LevelMetadata, SkillTree};

use super::error::ApiError;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawMetadata {
    #[serde(default)]
    outcome: Option<String>,
    #[serde(default, alias = "duration")]
    duration_minutes: Option<u32>,
    #[serde(default, alias = "xp")]
    total_xp: Option<u32>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawLevel {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "lessonsCount")]
    lesson_count: u32,
    #[serde(default, alias = "completion", alias = "progress")]
    completion_percentage: f32,
    #[serde(default, alias = "unlocked")]
    is_unlocked: bool,
    #[serde(default, alias = "thumbnail")]
    thumbnail_url: Option<String>,
    #[serde(default, alias = "previewVideo")]
    preview_video_url: Option<String>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
    #[serde(default, alias = "order")]
    position: Option<i32>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawEdge {
    #[serde(default)]
    id: Option<String>,
    #[serde(alias = "source", alias = "fromLevelId")]
    from: String,
    #[serde(alias = "target", alias = "toLevelId")]
    to: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(super) struct RawSkillTree {
    #[serde(default)]
    levels: Vec<RawLevel>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RawLesson {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default, alias = "order")]
    position: i32,
    #[serde(default, alias = "completed")]
    is_completed: bool,
}

fn non_empty(value: String, what: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::InvalidPayload(format!("{what} has an empty id")))
    } else {
        Ok(trimmed.to_owned())
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

impl RawMetadata {
    fn into_model(self, level_id: &str) -> LevelMetadata {
        let status = self.status.as_deref().and_then(|raw| {
            let parsed = LevelLifecycle::parse(raw);
            if parsed.is_none() {
                warn!(%level_id, status = raw, "ignoring unknown level status");
            }
            parsed
        });

        LevelMetadata {
            outcome: blank_to_none(self.outcome),
            duration_minutes: self.duration_minutes,
            total_xp: self.total_xp,
            status,
        }
    }
}

impl RawLevel {
    pub(super) fn into_model(self) -> Result<Level, ApiError> {
        let id = non_empty(self.id, "level")?;
        let completion_percentage = if self.completion_percentage.is_finite() {
            self.completion_percentage.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let metadata = self.metadata.map(|raw| raw.into_model(&id));

        Ok(Level {
            title: self.title.trim().to_owned(),
            description: blank_to_none(self.description),
            lesson_count: self.lesson_count,
            completion_percentage,
            is_unlocked: self.is_unlocked,
            thumbnail_url: blank_to_none(self.thumbnail_url),
            preview_video_url: blank_to_none(self.preview_video_url),
            metadata,
            position: self.position,
            id,
        })
    }
}

impl RawEdge {
    pub(super) fn into_model(self) -> Result<Edge, ApiError> {
        let from = non_empty(self.from, "edge source")?;
        let to = non_empty(self.to, "edge target")?;
        let id = blank_to_none(self.id).unwrap_or_else(|| format!("{from}->{to}"));
        Ok(Edge { id, from, to })
    }
}

impl RawSkillTree {
    pub(super) fn into_model(self) -> Result<SkillTree, ApiError> {
        let levels = self
            .levels
            .into_iter()
            .map(RawLevel::into_model)
            .collect::<Result<Vec<_>, _>>()?;
        let edges = self
            .edges
            .into_iter()
            .map(RawEdge::into_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SkillTree { levels, edges })
    }
}

impl RawLesson {
    pub(super) fn into_model(self) -> Result<Lesson, ApiError> {
        Ok(Lesson {
            id: non_empty(self.id, "lesson")?,
            title: self.title.trim().to_owned(),
            position: self.position,
            is_completed: self.is_completed,
        })
    }
}

pub(super) fn lessons_into_model(raw: Vec<RawLesson>) -> Result<Vec<Lesson>, ApiError> {
    let mut lessons = raw
        .into_iter()
        .map(RawLesson::into_model)
        .collect::<Result<Vec<_>, _>>()?;
    lessons.sort_by_key(|lesson| lesson.position);
    Ok(lessons)
}
