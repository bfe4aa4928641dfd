use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::tree::{Edge, Lesson, Level, LevelDraft, SkillTree};

use super::SkillTreeBackend;
use super::error::ApiError;
use super::payload::{RawLesson, RawSkillTree, lessons_into_model};

#[derive(Debug, Deserialize)]
struct RawFixture {
    #[serde(flatten)]
    tree: RawSkillTree,
    #[serde(default)]
    lessons: HashMap<String, Vec<RawLesson>>,
}

/// Read-only source backed by a JSON export of a skill tree, optionally with
/// a `lessons` map keyed by level id. The file is re-read on every fetch so
/// reloading picks up edits.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_fixture(&self) -> Result<RawFixture, ApiError> {
        debug!(path = %self.path.display(), "reading skill tree file");
        let raw = fs::read_to_string(&self.path).map_err(|source| ApiError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ApiError::Decode {
            origin: self.path.display().to_string(),
            source,
        })
    }
}

impl SkillTreeBackend for FileBackend {
    fn fetch_skill_tree(&self, _course_id: &str) -> Result<SkillTree, ApiError> {
        self.read_fixture()?.tree.into_model()
    }

    fn fetch_lessons(&self, level_id: &str) -> Result<Vec<Lesson>, ApiError> {
        let mut fixture = self.read_fixture()?;
        lessons_into_model(fixture.lessons.remove(level_id).unwrap_or_default())
    }

    fn create_edge(&self, _course_id: &str, _from: &str, _to: &str) -> Result<Edge, ApiError> {
        Err(ApiError::ReadOnly)
    }

    fn delete_edge(&self, _edge_id: &str) -> Result<(), ApiError> {
        Err(ApiError::ReadOnly)
    }

    fn create_level(&self, _course_id: &str, _draft: &LevelDraft) -> Result<Level, ApiError> {
        Err(ApiError::ReadOnly)
    }

    fn update_level(&self, _level_id: &str, _draft: &LevelDraft) -> Result<Level, ApiError> {
        Err(ApiError::ReadOnly)
    }

    fn delete_level(&self, _level_id: &str) -> Result<(), ApiError> {
        Err(ApiError::ReadOnly)
    }
}
