use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, Align2, Color32, FontId, Id, Order, Rect, Sense, Ui, Vec2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::tree::{Endpoint, NodeStatus, edge_state, level_status};
use crate::util::truncate_title;

use super::super::camera::{FOCUS_OFFSET, FOCUS_ZOOM, focus_pan};
use super::super::highlight::build_highlight_state;
use super::super::render::{EdgeEmphasis, NodeEmphasis, node_screen_radius, paint_edge, paint_node};
use super::super::render_utils::{draw_background, edge_visible, world_to_screen};
use super::super::tooltip::{HoveredLevel, TOOLTIP_WIDTH, place_tooltip, tooltip_contents};
use super::super::{CanvasEvent, RenderGraph, SearchMatchCache, ViewModel};
use super::interaction::{click_event, escape_event};

const BASE_NODE_RADIUS: f32 = 34.0;
const LABEL_ZOOM: f32 = 0.7;
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

pub(in crate::app) fn fuzzy_match_score(
    matcher: &SkimMatcherV2,
    text: &str,
    query: &str,
) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl ViewModel {
    fn update_screen_space(
        rect: Rect,
        pan: Vec2,
        zoom: f32,
        statuses: &[NodeStatus],
        cache: &mut RenderGraph,
    ) {
        let scratch = &mut cache.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();

        for (render_node, status) in cache.nodes.iter().zip(statuses) {
            scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, render_node.world_pos));
            scratch
                .screen_radii
                .push(node_screen_radius(*status, (BASE_NODE_RADIUS * zoom).clamp(5.0, 90.0)));
        }

        Self::visible_indices_into(
            rect,
            &scratch.screen_positions,
            &scratch.screen_radii,
            &mut scratch.visible_indices,
        );
        scratch.visible_mask.clear();
        scratch.visible_mask.resize(cache.nodes.len(), false);
        for &index in &scratch.visible_indices {
            if let Some(entry) = scratch.visible_mask.get_mut(index) {
                *entry = true;
            }
        }
    }

    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let cache = self.graph_cache.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = cache
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                self.tree.levels.get(node.level_index).is_some_and(|level| {
                    fuzzy_match_score(&matcher, &level.title, search_query).is_some()
                })
            })
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            graph_revision: self.render_graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    /// Paints the canvas for this frame and reports what the user asked for.
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) -> Option<CanvasEvent> {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.handle_graph_navigation(ui, rect, &response) {
            self.camera.mark_user_moved();
        }
        draw_background(&painter, rect, self.pan, self.zoom);

        let search_matches = self.cached_search_matches();
        let editor_mode = self.config.editor_mode;
        let now = ui.input(|input| input.time);
        let time = now as f32;

        let cache = self.graph_cache.as_mut()?;
        if cache.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                if editor_mode {
                    "No modules yet. Create one from the editor panel."
                } else {
                    "This course has no levels yet."
                },
                FontId::proportional(15.0),
                Color32::from_gray(170),
            );
            return None;
        }

        if let Some(frontier) = cache.frontier_index
            && self.camera.focus_due(now)
        {
            self.zoom = FOCUS_ZOOM;
            self.pan = focus_pan(cache.nodes[frontier].world_pos, FOCUS_ZOOM, FOCUS_OFFSET);
        }
        if !self.camera.is_positioned() {
            ui.ctx().request_repaint_after(FRAME_INTERVAL);
        }

        let statuses = self
            .tree
            .levels
            .iter()
            .map(|level| level_status(level, editor_mode))
            .collect::<Vec<_>>();
        Self::update_screen_space(rect, self.pan, self.zoom, &statuses, cache);
        let scratch = &cache.view_scratch;

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = if response.hovered() {
            Self::hovered_index(
                pointer,
                &scratch.visible_indices,
                &scratch.screen_positions,
                &scratch.screen_radii,
            )
        } else {
            None
        };

        match hovered {
            Some(index) => {
                ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
                let level = &self.tree.levels[cache.nodes[index].level_index];
                let radius = scratch.screen_radii[index];
                self.hover.enter(
                    HoveredLevel::capture(level, statuses[index]),
                    Rect::from_center_size(
                        scratch.screen_positions[index],
                        Vec2::splat(radius * 2.0),
                    ),
                );
            }
            None => self.hover.leave(now),
        }

        let focus_id = self
            .hover
            .hovered_id()
            .or(self.selected.as_deref())
            .map(str::to_owned);
        let highlight = focus_id
            .as_deref()
            .and_then(|id| build_highlight_state(cache, id));
        let search_active = search_matches.as_ref().is_some_and(|matches| !matches.is_empty());
        let is_match = |index: usize| {
            search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index))
        };

        let scratch = &cache.view_scratch;
        for edge in &cache.edges {
            let start = scratch.screen_positions[edge.source];
            let end = scratch.screen_positions[edge.target];
            if !scratch.visible_mask[edge.source]
                && !scratch.visible_mask[edge.target]
                && !edge_visible(rect, start, end, 4.0)
            {
                continue;
            }

            let source = &self.tree.levels[cache.nodes[edge.source].level_index];
            let target = &self.tree.levels[cache.nodes[edge.target].level_index];
            let state = edge_state(Endpoint::of(source), Endpoint::of(target), editor_mode);

            let highlighted = highlight
                .as_ref()
                .is_some_and(|chain| chain.contains_edge(edge.source, edge.target));
            let dimmed = !highlighted
                && (highlight.is_some()
                    || (search_active && !is_match(edge.source) && !is_match(edge.target)));

            paint_edge(
                &painter,
                start,
                end,
                scratch.screen_radii[edge.source],
                scratch.screen_radii[edge.target],
                state,
                time,
                self.zoom,
                EdgeEmphasis { highlighted, dimmed },
            );
        }

        for &index in &scratch.visible_indices {
            let render_node = &cache.nodes[index];
            let level = &self.tree.levels[render_node.level_index];
            let position = scratch.screen_positions[index];
            let radius = scratch.screen_radii[index];

            let is_hovered = hovered == Some(index);
            let is_selected = self.selected.as_deref() == Some(render_node.id.as_str());
            let highlighted = highlight
                .as_ref()
                .is_some_and(|chain| chain.contains_node(index));
            let search_match = is_match(index);
            let dimmed = !highlighted
                && !is_selected
                && (highlight.is_some() || (search_active && !search_match));

            paint_node(
                &painter,
                position,
                radius / node_screen_radius(statuses[index], 1.0),
                statuses[index],
                level.completion_percentage,
                time,
                NodeEmphasis {
                    hovered: is_hovered,
                    selected: is_selected,
                    highlighted: highlighted && !is_selected,
                    search_match,
                    dimmed,
                    frontier: cache.frontier_index == Some(index) && !editor_mode,
                },
            );

            if is_hovered || is_selected || search_match || self.zoom >= LABEL_ZOOM {
                painter.text(
                    position + vec2(0.0, radius * 1.35 + 6.0),
                    Align2::CENTER_TOP,
                    truncate_title(&level.title, 24),
                    FontId::proportional((12.0 * self.zoom.sqrt()).clamp(10.0, 15.0)),
                    if dimmed {
                        Color32::from_gray(110)
                    } else {
                        Color32::from_gray(232)
                    },
                );
            }
        }

        let mut event = None;
        if response.clicked_by(egui::PointerButton::Primary) {
            let hit = hovered.map(|index| (cache.nodes[index].id.as_str(), statuses[index]));
            event = click_event(editor_mode, hit);
        }

        let escape = ui.input(|input| input.key_pressed(egui::Key::Escape));
        if let Some(cleared) =
            escape_event(escape, response.hovered(), ui.ctx().wants_keyboard_input())
        {
            self.hover.dismiss();
            event = Some(cleared);
        }

        self.show_tooltip(ui.ctx(), rect, now);
        ui.ctx().request_repaint_after(FRAME_INTERVAL);

        event
    }

    fn show_tooltip(&mut self, ctx: &egui::Context, viewport: Rect, now: f64) {
        let Some((level, anchor)) = self.hover.current() else {
            return;
        };

        let origin = place_tooltip(anchor, self.hover.tooltip_size(), viewport);
        let editor_mode = self.config.editor_mode;
        let area = egui::Area::new(Id::new("level-tooltip"))
            .order(Order::Tooltip)
            .fixed_pos(origin)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(TOOLTIP_WIDTH - 16.0);
                    tooltip_contents(ui, level, editor_mode);
                });
            });

        self.hover.remember_size(area.response.rect.size());
        if area.response.contains_pointer() {
            self.hover.hold();
        }
        if self.hover.tick(now) {
            ctx.request_repaint_after(FRAME_INTERVAL);
        }
    }
}
