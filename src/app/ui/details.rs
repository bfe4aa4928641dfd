use eframe::egui::{self, RichText, Ui};

use crate::tree::{LevelLifecycle, level_status};
use crate::util::{format_duration, format_percentage};

use super::super::{CanvasEvent, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Level Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label(
                "Hover a level to preview it. Click an unlocked level to jump to your next lesson.",
            );
            return;
        };

        let Some(level) = self.tree.level(&selected_id) else {
            ui.label("The selected level is no longer part of this course.");
            return;
        };

        let status = level_status(level, false);
        ui.label(RichText::new(&level.title).strong().size(16.0));
        ui.horizontal(|ui| {
            ui.label(status.label());
            if let Some(lifecycle) = level.lifecycle()
                && lifecycle != LevelLifecycle::Active
            {
                ui.label(RichText::new(lifecycle.label()).italics());
            }
        });

        if let Some(description) = &level.description {
            ui.add_space(4.0);
            ui.label(description);
        }
        if let Some(outcome) = level.outcome() {
            ui.label(format!("Outcome: {outcome}"));
        }

        ui.add_space(6.0);
        ui.add(
            egui::ProgressBar::new(level.completion_percentage / 100.0)
                .text(format_percentage(level.completion_percentage)),
        );
        ui.label(format!("Lessons: {}", level.lesson_count));
        if let Some(minutes) = level.duration_minutes() {
            ui.label(format!("Duration: {}", format_duration(minutes)));
        }
        if let Some(xp) = level.total_xp() {
            ui.label(format!("XP: {xp}"));
        }

        if level.preview_video_url.is_some() || level.thumbnail_url.is_some() {
            ui.horizontal(|ui| {
                if let Some(url) = &level.preview_video_url {
                    ui.hyperlink_to("Watch preview", url);
                }
                if let Some(url) = &level.thumbnail_url {
                    ui.hyperlink_to("Cover image", url);
                }
            });
        }

        ui.add_space(8.0);
        let can_open = status.is_clickable_for_learner();
        let loading = self.lessons_loading();
        let mut open = false;
        ui.horizontal(|ui| {
            let label = if level.is_complete() { "Review" } else { "Continue learning" };
            open = ui
                .add_enabled(can_open && !loading, egui::Button::new(label))
                .on_disabled_hover_text("Complete the prerequisites first")
                .clicked();
            if loading {
                ui.spinner();
            }
        });

        let prerequisites = self
            .tree
            .prerequisites_of(&selected_id)
            .map(|edge| edge.from.clone())
            .collect::<Vec<_>>();
        let unlocks = self
            .tree
            .dependents_of(&selected_id)
            .map(|edge| edge.to.clone())
            .collect::<Vec<_>>();

        let mut jump_to = None;
        for (heading, ids, empty) in [
            ("Requires", &prerequisites, "No prerequisites. Start anytime."),
            ("Unlocks", &unlocks, "Nothing depends on this level yet."),
        ] {
            ui.separator();
            ui.label(RichText::new(heading).strong());
            if ids.is_empty() {
                ui.label(empty);
            }
            for id in ids {
                let Some(other) = self.tree.level(id) else {
                    continue;
                };
                let text = format!(
                    "{}  ({})",
                    other.title,
                    level_status(other, false).label().to_lowercase()
                );
                if ui.link(text).clicked() {
                    jump_to = Some(id.clone());
                }
            }
        }

        if open {
            self.handle_event(CanvasEvent::OpenLevel(selected_id));
        } else if let Some(id) = jump_to {
            self.focus_level(&id);
            self.selected = Some(id);
        }
    }
}
