use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, Context, Pos2, Vec2};
use tracing::{error, info, warn};

use crate::api::{ApiError, SkillTreeBackend, load_skill_tree};
use crate::config::AppConfig;
use crate::task::{BackgroundTask, TaskPoll};
use crate::tree::{Lesson, SkillTree};

mod actions;
mod camera;
mod graph;
mod highlight;
mod render;
mod render_utils;
mod tooltip;
mod ui;

use actions::{EditorDraft, PendingMutation};
use camera::CameraState;
use tooltip::HoverState;

type LoadResult = Result<SkillTree, String>;

pub struct SkillTreeApp {
    config: Arc<AppConfig>,
    backend: Arc<dyn SkillTreeBackend>,
    state: AppState,
    reload_task: Option<BackgroundTask<LoadResult>>,
}

enum AppState {
    Loading { task: BackgroundTask<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

/// What the canvas reports back to its host after a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
enum CanvasEvent {
    OpenLevel(String),
    EditLevel(String),
    ClearSelection,
}

struct ViewModel {
    config: Arc<AppConfig>,
    backend: Arc<dyn SkillTreeBackend>,
    tree: SkillTree,
    search: String,
    selected: Option<String>,
    pan: Vec2,
    zoom: f32,
    camera: CameraState,
    hover: HoverState,
    show_legend: bool,
    graph_dirty: bool,
    render_graph_revision: u64,
    graph_cache: Option<RenderGraph>,
    search_match_cache: Option<SearchMatchCache>,
    lesson_request: Option<LessonRequest>,
    pending_mutation: Option<PendingMutation>,
    editor: Option<EditorDraft>,
    alert: Option<String>,
    status_message: Option<String>,
    reload_error: Option<String>,
}

struct LessonRequest {
    level_id: String,
    task: BackgroundTask<Result<Vec<Lesson>, ApiError>>,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

struct RenderGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    index_by_id: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    frontier_index: Option<usize>,
    view_scratch: ViewScratch,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
    visible_mask: Vec<bool>,
}

struct RenderNode {
    id: String,
    level_index: usize,
    world_pos: Vec2,
}

struct RenderEdge {
    source: usize,
    target: usize,
}

struct HighlightState {
    chain_nodes: HashSet<usize>,
    chain_edges: HashSet<(usize, usize)>,
    unlock_nodes: HashSet<usize>,
    unlock_edges: HashSet<(usize, usize)>,
}

impl ViewModel {
    fn new(tree: SkillTree, config: Arc<AppConfig>, backend: Arc<dyn SkillTreeBackend>) -> Self {
        Self {
            config,
            backend,
            tree,
            search: String::new(),
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            camera: CameraState::default(),
            hover: HoverState::default(),
            show_legend: true,
            graph_dirty: true,
            render_graph_revision: 0,
            graph_cache: None,
            search_match_cache: None,
            lesson_request: None,
            pending_mutation: None,
            editor: None,
            alert: None,
            status_message: None,
            reload_error: None,
        }
    }
}

impl SkillTreeApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        backend: Arc<dyn SkillTreeBackend>,
    ) -> Self {
        let config = Arc::new(config);
        let task = Self::spawn_load(Arc::clone(&backend), &config);
        Self {
            config,
            backend,
            state: AppState::Loading { task },
            reload_task: None,
        }
    }

    fn spawn_load(
        backend: Arc<dyn SkillTreeBackend>,
        config: &AppConfig,
    ) -> BackgroundTask<LoadResult> {
        let course_id = config.course_id.clone();
        BackgroundTask::spawn("load-skill-tree", move || {
            load_skill_tree(backend.as_ref(), &course_id).map_err(|error| {
                error!(%course_id, "{error:#}");
                format!("{error:#}")
            })
        })
    }

    fn ready_state(&self, tree: SkillTree) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            tree,
            Arc::clone(&self.config),
            Arc::clone(&self.backend),
        )))
    }
}

impl eframe::App for SkillTreeApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut loaded_tree = None;

        match &mut self.state {
            AppState::Loading { task } => {
                match task.poll() {
                    TaskPoll::Pending => {}
                    TaskPoll::Ready(Ok(tree)) => loaded_tree = Some(tree),
                    TaskPoll::Ready(Err(error)) => transition = Some(AppState::Error(error)),
                    TaskPoll::Gone => {
                        warn!(task = task.label(), "worker disconnected");
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading skill tree...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint_after(Duration::from_millis(100));
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the skill tree");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        info!("retrying skill tree load");
                        transition = Some(AppState::Loading {
                            task: Self::spawn_load(Arc::clone(&self.backend), &self.config),
                        });
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_task.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_task.is_none() {
                    info!("reloading skill tree");
                    self.reload_task =
                        Some(Self::spawn_load(Arc::clone(&self.backend), &self.config));
                }

                if let Some(task) = self.reload_task.as_mut() {
                    match task.poll() {
                        TaskPoll::Pending => {
                            ctx.request_repaint_after(Duration::from_millis(100));
                        }
                        TaskPoll::Ready(Ok(tree)) => {
                            info!(levels = tree.level_count(), "skill tree reloaded");
                            model.replace_tree(tree);
                            self.reload_task = None;
                        }
                        TaskPoll::Ready(Err(error)) => {
                            model.reload_error = Some(error);
                            self.reload_task = None;
                        }
                        TaskPoll::Gone => {
                            warn!(task = task.label(), "worker disconnected");
                            model.reload_error =
                                Some("Background load worker disconnected".to_owned());
                            self.reload_task = None;
                        }
                    }
                }
            }
        }

        if let Some(tree) = loaded_tree {
            transition = Some(self.ready_state(tree));
        }

        if let Some(next_state) = transition {
            self.reload_task = None;
            self.state = next_state;
        }
    }
}
