use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tracing::{error, info, warn};

use crate::api::{ApiError, SkillTreeBackend};
use crate::config::AppConfig;
use crate::task::{BackgroundTask, TaskPoll};
use crate::tree::{Lesson, Level, LevelDraft, LevelLifecycle, SkillTree, TreeChange, next_lesson};

use super::{CanvasEvent, LessonRequest, ViewModel};

const POLL_INTERVAL: Duration = Duration::from_millis(80);

/// A change the editor asked the backend to make.
#[derive(Clone, Debug, PartialEq)]
pub(super) enum MutationRequest {
    CreateEdge { from: String, to: String },
    DeleteEdge { edge_id: String },
    CreateLevel(LevelDraft),
    UpdateLevel { level_id: String, draft: LevelDraft },
    DeleteLevel { level_id: String },
}

impl MutationRequest {
    pub(super) fn describe(&self) -> String {
        match self {
            Self::CreateEdge { .. } => "Adding prerequisite".to_owned(),
            Self::DeleteEdge { .. } => "Removing prerequisite".to_owned(),
            Self::CreateLevel(draft) => format!("Creating \"{}\"", draft.title),
            Self::UpdateLevel { draft, .. } => format!("Saving \"{}\"", draft.title),
            Self::DeleteLevel { .. } => "Deleting module".to_owned(),
        }
    }

    /// Performs the request and returns the change to apply locally.
    pub(super) fn run(
        self,
        backend: &dyn SkillTreeBackend,
        course_id: &str,
    ) -> Result<TreeChange, ApiError> {
        match self {
            Self::CreateEdge { from, to } => backend
                .create_edge(course_id, &from, &to)
                .map(TreeChange::EdgeCreated),
            Self::DeleteEdge { edge_id } => backend
                .delete_edge(&edge_id)
                .map(|()| TreeChange::EdgeDeleted(edge_id)),
            Self::CreateLevel(draft) => backend
                .create_level(course_id, &draft)
                .map(TreeChange::LevelCreated),
            Self::UpdateLevel { level_id, draft } => backend
                .update_level(&level_id, &draft)
                .map(TreeChange::LevelUpdated),
            Self::DeleteLevel { level_id } => backend
                .delete_level(&level_id)
                .map(|()| TreeChange::LevelDeleted(level_id)),
        }
    }
}

pub(super) struct PendingMutation {
    pub(super) description: String,
    task: BackgroundTask<Result<TreeChange, ApiError>>,
}

/// Text-field state of the editor sidebar. `level_id` is `None` while
/// composing a new module.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct EditorDraft {
    pub(super) level_id: Option<String>,
    pub(super) title: String,
    pub(super) outcome: String,
    pub(super) duration_minutes: String,
    pub(super) total_xp: String,
    pub(super) lifecycle: LevelLifecycle,
    pub(super) position: String,
    pub(super) new_prerequisite: Option<String>,
    pub(super) confirm_delete: bool,
}

fn optional_text(value: &Option<impl ToString>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn parse_optional<T: std::str::FromStr>(value: &str, field: &str) -> Result<Option<T>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| format!("{field} must be a whole number"))
}

impl EditorDraft {
    pub(super) fn for_level(level: &Level) -> Self {
        Self {
            level_id: Some(level.id.clone()),
            title: level.title.clone(),
            outcome: level.outcome().unwrap_or_default().to_owned(),
            duration_minutes: optional_text(&level.duration_minutes()),
            total_xp: optional_text(&level.total_xp()),
            lifecycle: level.lifecycle().unwrap_or(LevelLifecycle::Active),
            position: optional_text(&level.position),
            new_prerequisite: None,
            confirm_delete: false,
        }
    }

    pub(super) fn blank(next_position: i32) -> Self {
        Self {
            level_id: None,
            title: String::new(),
            outcome: String::new(),
            duration_minutes: String::new(),
            total_xp: String::new(),
            lifecycle: LevelLifecycle::Active,
            position: next_position.to_string(),
            new_prerequisite: None,
            confirm_delete: false,
        }
    }

    pub(super) fn to_draft(&self) -> Result<LevelDraft, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("A module needs a title".to_owned());
        }

        let outcome = self.outcome.trim();
        Ok(LevelDraft {
            title: title.to_owned(),
            outcome: (!outcome.is_empty()).then(|| outcome.to_owned()),
            duration_minutes: parse_optional(&self.duration_minutes, "Duration")?,
            total_xp: parse_optional(&self.total_xp, "XP")?,
            status: Some(self.lifecycle),
            position: parse_optional(&self.position, "Position")?,
        })
    }
}

/// Checks a new `from` → `to` prerequisite against the local tree before it
/// is sent.
pub(super) fn validate_prerequisite(tree: &SkillTree, from: &str, to: &str) -> Result<(), String> {
    if from == to {
        return Err("A module cannot be its own prerequisite".to_owned());
    }
    if tree.level(from).is_none() || tree.level(to).is_none() {
        return Err("That module no longer exists".to_owned());
    }
    if tree.has_edge(from, to) {
        return Err("That prerequisite already exists".to_owned());
    }
    if tree.would_create_cycle(from, to) {
        return Err("That prerequisite would create a loop in the tree".to_owned());
    }
    Ok(())
}

/// Where opening a level leads once its lessons are known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum LessonOutcome {
    Navigate(String),
    Announce(String),
}

pub(super) fn lesson_outcome(config: &AppConfig, lessons: &[Lesson]) -> LessonOutcome {
    let Some(lesson) = next_lesson(lessons) else {
        return LessonOutcome::Announce("This level has no lessons yet".to_owned());
    };

    match config.lesson_url(&lesson.id) {
        Some(url) => LessonOutcome::Navigate(url),
        None => LessonOutcome::Announce(format!("Next lesson: {}", lesson.title)),
    }
}

impl ViewModel {
    pub(super) fn handle_event(&mut self, event: CanvasEvent) {
        match event {
            CanvasEvent::OpenLevel(level_id) => {
                self.selected = Some(level_id.clone());
                self.request_lessons(level_id);
            }
            CanvasEvent::EditLevel(level_id) => {
                self.editor = self.tree.level(&level_id).map(EditorDraft::for_level);
                self.selected = Some(level_id);
            }
            CanvasEvent::ClearSelection => {
                self.selected = None;
                self.editor = None;
            }
        }
    }

    fn request_lessons(&mut self, level_id: String) {
        let backend = Arc::clone(&self.backend);
        let task_level = level_id.clone();
        info!(%level_id, "fetching lessons");
        // Replacing an in-flight request drops and cancels it.
        self.lesson_request = Some(LessonRequest {
            level_id,
            task: BackgroundTask::spawn("fetch-lessons", move || {
                backend.fetch_lessons(&task_level)
            }),
        });
    }

    pub(super) fn poll_lessons(&mut self, ctx: &egui::Context) {
        let Some(request) = self.lesson_request.as_mut() else {
            return;
        };

        let lessons = match request.task.poll() {
            TaskPoll::Pending => {
                ctx.request_repaint_after(POLL_INTERVAL);
                return;
            }
            TaskPoll::Ready(result) => result,
            TaskPoll::Gone => Err(ApiError::InvalidPayload(
                "lesson request was interrupted".to_owned(),
            )),
        };
        let level_id = request.level_id.clone();
        self.lesson_request = None;

        match lessons {
            Ok(lessons) => match lesson_outcome(&self.config, &lessons) {
                LessonOutcome::Navigate(url) => {
                    info!(%level_id, %url, "opening lesson");
                    ctx.open_url(egui::OpenUrl::new_tab(url));
                }
                LessonOutcome::Announce(message) => self.status_message = Some(message),
            },
            Err(error) => {
                warn!(%level_id, "could not load lessons: {error}");
                self.status_message =
                    Some(format!("Could not load lessons: {}", error.user_message()));
            }
        }
    }

    pub(super) fn lessons_loading(&self) -> bool {
        self.lesson_request.is_some()
    }

    pub(super) fn submit_mutation(&mut self, request: MutationRequest) {
        if let Some(pending) = &self.pending_mutation {
            self.status_message = Some(format!("Wait for \"{}\" to finish", pending.description));
            return;
        }

        let description = request.describe();
        info!(change = %description, "sending change");
        let backend = Arc::clone(&self.backend);
        let course_id = self.config.course_id.clone();
        self.pending_mutation = Some(PendingMutation {
            description,
            task: BackgroundTask::spawn("mutate-skill-tree", move || {
                request.run(backend.as_ref(), &course_id)
            }),
        });
    }

    pub(super) fn poll_mutation(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.pending_mutation.as_mut() else {
            return;
        };

        let result = match pending.task.poll() {
            TaskPoll::Pending => {
                ctx.request_repaint_after(POLL_INTERVAL);
                return;
            }
            TaskPoll::Ready(result) => result,
            TaskPoll::Gone => Err(ApiError::InvalidPayload(
                "the change was interrupted before the server answered".to_owned(),
            )),
        };
        self.pending_mutation = None;
        self.finish_mutation(result);
    }

    /// Applies a confirmed change, or raises the alert and leaves the tree
    /// untouched.
    pub(super) fn finish_mutation(&mut self, result: Result<TreeChange, ApiError>) {
        let change = match result {
            Ok(change) => change,
            Err(error) => {
                error!("skill tree change failed: {error}");
                self.alert = Some(error.user_message());
                return;
            }
        };

        match &change {
            TreeChange::LevelCreated(level) => {
                self.selected = Some(level.id.clone());
                self.editor = Some(EditorDraft::for_level(level));
            }
            TreeChange::LevelUpdated(level) => {
                if let Some(editor) = self.editor.as_mut()
                    && editor.level_id.as_deref() == Some(level.id.as_str())
                {
                    let pending_prerequisite = editor.new_prerequisite.take();
                    *editor = EditorDraft::for_level(level);
                    editor.new_prerequisite = pending_prerequisite;
                }
            }
            TreeChange::LevelDeleted(level_id) => {
                if self.selected.as_deref() == Some(level_id.as_str()) {
                    self.selected = None;
                    self.editor = None;
                }
            }
            TreeChange::EdgeCreated(_) | TreeChange::EdgeDeleted(_) => {}
        }

        self.tree.apply_change(change);
        self.hover.dismiss();
        self.mark_graph_dirty();
        self.status_message = Some("Saved".to_owned());
    }

    pub(super) fn next_position(&self) -> i32 {
        self.tree
            .levels
            .iter()
            .filter_map(|level| level.position)
            .max()
            .map_or(self.tree.levels.len() as i32, |position| position + 1)
    }
}
