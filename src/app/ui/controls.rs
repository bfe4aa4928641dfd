use eframe::egui::{self, RichText, Ui, Vec2};
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::tree::{Level, level_status};
use crate::util::{format_percentage, truncate_title};

use super::super::camera::{focus_pan, zoom_centered};
use super::super::graph::fuzzy_match_score;
use super::super::render::node_style;
use super::super::{CanvasEvent, ViewModel};

const ZOOM_STEP: f32 = 1.2;

/// Indices of `levels` matching `query`, best match first. An empty query
/// keeps every level in course order.
pub(in crate::app) fn filter_levels(levels: &[Level], query: &str) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        let mut indices = (0..levels.len()).collect::<Vec<_>>();
        indices.sort_by_key(|&index| (levels[index].position.unwrap_or(i32::MAX), index));
        return indices;
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = levels
        .iter()
        .enumerate()
        .filter_map(|(index, level)| {
            fuzzy_match_score(&matcher, &level.title, query).map(|score| (score, index))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, index)| index).collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Explore");
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            ui.label("Search");
            let search = ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("level title")
                    .desired_width(170.0),
            );
            if search.changed() {
                self.search_match_cache = None;
            }
            if !self.search.is_empty() && ui.small_button("Clear").clicked() {
                self.search.clear();
                self.search_match_cache = None;
            }
        });

        ui.horizontal(|ui| {
            ui.label(format!("Zoom {:.0}%", self.zoom * 100.0));
            if ui.button("-").clicked() {
                (self.pan, self.zoom) = zoom_centered(self.pan, self.zoom, 1.0 / ZOOM_STEP);
                self.camera.mark_user_moved();
            }
            if ui.button("+").clicked() {
                (self.pan, self.zoom) = zoom_centered(self.pan, self.zoom, ZOOM_STEP);
                self.camera.mark_user_moved();
            }
            ui.checkbox(&mut self.show_legend, "Legend");
        });

        ui.small(if self.config.editor_mode {
            "Drag or scroll to move around, pinch to zoom. Click a module to edit it."
        } else {
            "Drag to move around, scroll to zoom. Click an unlocked level to continue."
        });

        ui.separator();

        let matches = filter_levels(&self.tree.levels, &self.search);
        ui.label(RichText::new(format!("Levels ({})", matches.len())).strong());

        let editor_mode = self.config.editor_mode;
        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("level_list_scroll")
            .auto_shrink([false, false])
            .show_rows(ui, 22.0, matches.len(), |ui, row_range| {
                for &index in &matches[row_range] {
                    let level = &self.tree.levels[index];
                    let status = level_status(level, editor_mode);
                    let selected = self.selected.as_deref() == Some(level.id.as_str());

                    ui.horizontal(|ui| {
                        ui.label(RichText::new("●").color(node_style(status).rim));
                        let label = format!(
                            "{}  {}",
                            truncate_title(&level.title, 30),
                            format_percentage(level.completion_percentage)
                        );
                        if ui
                            .selectable_label(selected, label)
                            .on_hover_text(status.label())
                            .clicked()
                        {
                            clicked = Some(level.id.clone());
                        }
                    });
                }
            });

        if let Some(level_id) = clicked {
            self.focus_level(&level_id);
            if editor_mode {
                self.handle_event(CanvasEvent::EditLevel(level_id));
            } else {
                self.selected = Some(level_id);
            }
        }
    }

    /// Moves the camera so `level_id` sits at the canvas center.
    pub(in crate::app) fn focus_level(&mut self, level_id: &str) {
        let Some(cache) = &self.graph_cache else {
            return;
        };
        let Some(&index) = cache.index_by_id.get(level_id) else {
            return;
        };
        self.pan = focus_pan(cache.nodes[index].world_pos, self.zoom, Vec2::ZERO);
        self.camera.mark_user_moved();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::fixtures::level;

    fn titled(id: &str, title: &str, position: Option<i32>) -> Level {
        let mut level = level(id, 0.0, true);
        level.title = title.to_owned();
        level.position = position;
        level
    }

    fn levels() -> Vec<Level> {
        vec![
            titled("a", "Open chords", Some(2)),
            titled("b", "Strumming patterns", Some(1)),
            titled("c", "Barre chords", None),
        ]
    }

    #[test]
    fn empty_query_lists_levels_in_course_order() {
        assert_eq!(filter_levels(&levels(), "  "), vec![1, 0, 2]);
    }

    #[test]
    fn query_filters_fuzzily_and_ignores_case() {
        let matches = filter_levels(&levels(), "CHORDS");
        assert_eq!(matches.len(), 2);
        assert!(matches.contains(&0) && matches.contains(&2));
        assert!(filter_levels(&levels(), "xylophone").is_empty());
    }
}
