use eframe::egui::{self, Color32, RichText, Ui};

use crate::tree::LevelLifecycle;
use crate::util::truncate_title;

use super::super::actions::{EditorDraft, MutationRequest, validate_prerequisite};
use super::super::ViewModel;

enum EditorAction {
    Save,
    Delete,
    AddPrerequisite(String),
    RemovePrerequisite(String),
    Close,
}

impl ViewModel {
    pub(in crate::app) fn draw_editor(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Module Editor");
            if ui.button("New module").clicked() {
                self.selected = None;
                self.editor = Some(EditorDraft::blank(self.next_position()));
            }
        });
        ui.add_space(6.0);

        let Some(mut draft) = self.editor.take() else {
            ui.label("Click a module on the canvas to edit it, or create a new one.");
            return;
        };

        let busy = self.pending_mutation.is_some();
        let mut action = None;

        egui::Grid::new("module_fields")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Title");
                ui.text_edit_singleline(&mut draft.title);
                ui.end_row();

                ui.label("Outcome");
                ui.add(egui::TextEdit::multiline(&mut draft.outcome).desired_rows(2));
                ui.end_row();

                ui.label("Duration (min)");
                ui.text_edit_singleline(&mut draft.duration_minutes);
                ui.end_row();

                ui.label("XP");
                ui.text_edit_singleline(&mut draft.total_xp);
                ui.end_row();

                ui.label("Status");
                egui::ComboBox::from_id_salt("module_status")
                    .selected_text(draft.lifecycle.label())
                    .show_ui(ui, |ui| {
                        for lifecycle in LevelLifecycle::ALL {
                            ui.selectable_value(&mut draft.lifecycle, lifecycle, lifecycle.label());
                        }
                    });
                ui.end_row();

                ui.label("Position");
                ui.text_edit_singleline(&mut draft.position);
                ui.end_row();
            });

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            let label = if draft.level_id.is_some() { "Save" } else { "Create" };
            if ui.add_enabled(!busy, egui::Button::new(label)).clicked() {
                action = Some(EditorAction::Save);
            }
            if ui.button("Close").clicked() {
                action = Some(EditorAction::Close);
            }
        });

        if let Some(level_id) = draft.level_id.clone() {
            ui.separator();
            ui.label(RichText::new("Prerequisites").strong());

            let prerequisites = self.tree.prerequisites_of(&level_id).cloned().collect::<Vec<_>>();
            if prerequisites.is_empty() {
                ui.label("None. This module is a starting point.");
            }
            for edge in &prerequisites {
                ui.horizontal(|ui| {
                    let title = self
                        .tree
                        .level(&edge.from)
                        .map_or(edge.from.as_str(), |level| level.title.as_str());
                    ui.label(truncate_title(title, 30));
                    if ui.add_enabled(!busy, egui::Button::new("Remove")).clicked() {
                        action = Some(EditorAction::RemovePrerequisite(edge.id.clone()));
                    }
                });
            }

            ui.horizontal(|ui| {
                let chosen = draft
                    .new_prerequisite
                    .as_deref()
                    .and_then(|id| self.tree.level(id))
                    .map_or("Choose a module", |level| level.title.as_str());
                egui::ComboBox::from_id_salt("new_prerequisite")
                    .selected_text(truncate_title(chosen, 24))
                    .show_ui(ui, |ui| {
                        for candidate in &self.tree.levels {
                            if candidate.id == level_id
                                || self.tree.has_edge(&candidate.id, &level_id)
                            {
                                continue;
                            }
                            ui.selectable_value(
                                &mut draft.new_prerequisite,
                                Some(candidate.id.clone()),
                                truncate_title(&candidate.title, 30),
                            );
                        }
                    });

                let can_add = !busy && draft.new_prerequisite.is_some();
                if ui.add_enabled(can_add, egui::Button::new("Add")).clicked()
                    && let Some(from) = draft.new_prerequisite.clone()
                {
                    action = Some(EditorAction::AddPrerequisite(from));
                }
            });

            let unlocks = self
                .tree
                .dependents_of(&level_id)
                .filter_map(|edge| self.tree.level(&edge.to))
                .map(|level| level.title.clone())
                .collect::<Vec<_>>();
            if !unlocks.is_empty() {
                ui.label(format!("Unlocks: {}", unlocks.join(", ")));
            }

            ui.separator();
            if draft.confirm_delete {
                ui.label(
                    RichText::new("Delete this module and all of its links?")
                        .color(Color32::from_rgb(236, 84, 122)),
                );
                ui.horizontal(|ui| {
                    if ui.add_enabled(!busy, egui::Button::new("Delete")).clicked() {
                        action = Some(EditorAction::Delete);
                    }
                    if ui.button("Cancel").clicked() {
                        draft.confirm_delete = false;
                    }
                });
            } else if ui.add_enabled(!busy, egui::Button::new("Delete module")).clicked() {
                draft.confirm_delete = true;
            }
        }

        let level_id = draft.level_id.clone();
        let request = match action {
            None => None,
            Some(EditorAction::Close) => {
                self.selected = None;
                return;
            }
            Some(EditorAction::Save) => match draft.to_draft() {
                Ok(level) => Some(match &level_id {
                    Some(level_id) => MutationRequest::UpdateLevel {
                        level_id: level_id.clone(),
                        draft: level,
                    },
                    None => MutationRequest::CreateLevel(level),
                }),
                Err(message) => {
                    self.status_message = Some(message);
                    None
                }
            },
            Some(EditorAction::Delete) => {
                draft.confirm_delete = false;
                level_id.map(|level_id| MutationRequest::DeleteLevel { level_id })
            }
            Some(EditorAction::RemovePrerequisite(edge_id)) => {
                Some(MutationRequest::DeleteEdge { edge_id })
            }
            Some(EditorAction::AddPrerequisite(from)) => level_id.and_then(|to| {
                match validate_prerequisite(&self.tree, &from, &to) {
                    Ok(()) => {
                        draft.new_prerequisite = None;
                        Some(MutationRequest::CreateEdge { from, to })
                    }
                    Err(message) => {
                        self.status_message = Some(message);
                        None
                    }
                }
            }),
        };

        self.editor = Some(draft);
        if let Some(request) = request {
            self.submit_mutation(request);
        }
    }
}
