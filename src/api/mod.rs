mod client;
mod error;
mod file;
mod payload;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::GraphSource;
use crate::tree::{Edge, Lesson, Level, LevelDraft, SkillTree};

pub use client::HttpBackend;
pub use error::ApiError;
pub use file::FileBackend;

/// Operations the skill tree needs from the course backend.
pub trait SkillTreeBackend: Send + Sync {
    fn fetch_skill_tree(&self, course_id: &str) -> Result<SkillTree, ApiError>;
    fn fetch_lessons(&self, level_id: &str) -> Result<Vec<Lesson>, ApiError>;
    fn create_edge(&self, course_id: &str, from: &str, to: &str) -> Result<Edge, ApiError>;
    fn delete_edge(&self, edge_id: &str) -> Result<(), ApiError>;
    fn create_level(&self, course_id: &str, draft: &LevelDraft) -> Result<Level, ApiError>;
    fn update_level(&self, level_id: &str, draft: &LevelDraft) -> Result<Level, ApiError>;
    fn delete_level(&self, level_id: &str) -> Result<(), ApiError>;
}

pub fn connect(source: &GraphSource) -> Result<Arc<dyn SkillTreeBackend>> {
    match source {
        GraphSource::Http {
            base_url,
            token,
            timeout,
        } => {
            let backend = HttpBackend::new(base_url, token.clone(), *timeout)
                .with_context(|| format!("failed to build HTTP client for {base_url}"))?;
            Ok(Arc::new(backend))
        }
        GraphSource::File(path) => {
            let backend = FileBackend::new(path.clone());
            info!(path = %backend.path().display(), "using offline skill tree file");
            Ok(Arc::new(backend))
        }
    }
}

/// Fetches a course's skill tree and reduces it to a DAG.
pub fn load_skill_tree(backend: &dyn SkillTreeBackend, course_id: &str) -> Result<SkillTree> {
    let tree = backend
        .fetch_skill_tree(course_id)
        .with_context(|| format!("failed to load skill tree for course {course_id}"))?;

    let (tree, report) = tree.sanitize();
    if !report.is_clean() {
        warn!(
            %course_id,
            dropped_edges = report.dropped_edges(),
            duplicate_levels = report.duplicate_levels,
            "skill tree needed cleanup"
        );
    }
    info!(
        %course_id,
        levels = tree.level_count(),
        edges = tree.edges.len(),
        "skill tree loaded"
    );

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_sanitizes_cycles_from_the_source() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(
            br#"{
                "levels": [{"id": "a"}, {"id": "b"}],
                "edges": [{"from": "a", "to": "b"}, {"from": "b", "to": "a"}]
            }"#,
        )
        .expect("write fixture");

        let backend = FileBackend::new(file.path());
        let tree = load_skill_tree(&backend, "course").expect("tree loads");

        assert_eq!(tree.edges.len(), 1);
        assert!(tree.has_edge("a", "b"));
    }

    #[test]
    fn load_failure_names_the_course() {
        let backend = FileBackend::new("/missing/tree.json");
        let error = load_skill_tree(&backend, "rust-101").expect_err("missing file");
        assert!(format!("{error:#}").contains("rust-101"));
    }
}
