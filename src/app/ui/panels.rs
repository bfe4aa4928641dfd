use eframe::egui::{
    self, Align, Align2, Color32, Context, Id, Layout, RichText, Sense, Ui, pos2, vec2,
};

use crate::tree::{EdgeState, EdgeStatus, NodeStatus, level_status};

use super::super::render::{EdgeEmphasis, NodeEmphasis, paint_edge, paint_node};
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        self.poll_lessons(ctx);
        self.poll_mutation(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui, reload_requested, is_reloading));

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| {
                if self.config.editor_mode {
                    self.draw_editor(ui);
                } else {
                    self.draw_details(ui);
                }
            });

        let canvas = egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
        if let Some(event) = canvas.inner {
            self.handle_event(event);
        }

        if self.show_legend {
            let time = ctx.input(|input| input.time) as f32;
            egui::Area::new(Id::new("legend"))
                .order(egui::Order::Foreground)
                .pivot(Align2::LEFT_BOTTOM)
                .fixed_pos(canvas.response.rect.left_bottom() + vec2(12.0, -12.0))
                .show(ctx, |ui| {
                    egui::Frame::popup(ui.style()).show(ui, |ui| self.draw_legend(ui, time));
                });
        }

        self.draw_alert(ctx);
    }

    fn draw_top_bar(&mut self, ui: &mut Ui, reload_requested: &mut bool, is_reloading: bool) {
        let editor_mode = self.config.editor_mode;
        let mastered = self
            .tree
            .levels
            .iter()
            .filter(|level| level_status(level, false) == NodeStatus::Mastered)
            .count();

        ui.horizontal(|ui| {
            ui.heading("Skill Constellation");
            ui.separator();
            ui.label(format!("course: {}", self.config.course_id));
            ui.label(format!("levels: {}", self.tree.level_count()));
            ui.label(format!("links: {}", self.tree.edges.len()));
            if !editor_mode {
                ui.label(format!("mastered: {mastered}/{}", self.tree.level_count()));
            }

            let can_reload = !is_reloading && self.pending_mutation.is_none();
            let reload_button = ui
                .add_enabled(can_reload, egui::Button::new("Reload"))
                .on_hover_text(self.config.source_label())
                .on_disabled_hover_text("Wait for the current save to finish");
            if reload_button.clicked() {
                *reload_requested = true;
                self.reload_error = None;
            }
            if is_reloading {
                ui.spinner();
            }
            if ui.button("Recenter").clicked() {
                self.camera.reset();
            }

            if let Some(pending) = &self.pending_mutation {
                ui.spinner();
                ui.label(format!("{}...", pending.description));
            } else if self.lessons_loading() {
                ui.spinner();
                ui.label("Opening lesson...");
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(
                    RichText::new(if editor_mode { "Editor mode" } else { "Learner mode" })
                        .color(Color32::from_rgb(245, 206, 93)),
                );

                if let Some(error) = self.reload_error.clone() {
                    if ui.small_button("x").clicked() {
                        self.reload_error = None;
                    }
                    ui.label(
                        RichText::new(format!("Reload failed: {error}"))
                            .color(Color32::from_rgb(236, 84, 122)),
                    );
                } else if let Some(message) = self.status_message.clone() {
                    if ui.small_button("x").clicked() {
                        self.status_message = None;
                    }
                    ui.label(message);
                }
            });
        });
    }

    fn draw_legend(&self, ui: &mut Ui, time: f32) {
        ui.label(RichText::new("Legend").strong());

        let statuses: &[NodeStatus] = if self.config.editor_mode {
            &[NodeStatus::Available, NodeStatus::Boss]
        } else {
            &NodeStatus::ALL
        };
        for &status in statuses {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(vec2(28.0, 24.0), Sense::hover());
                paint_node(
                    ui.painter(),
                    rect.center(),
                    8.0,
                    status,
                    0.0,
                    time,
                    NodeEmphasis::default(),
                );
                ui.label(status.label());
            });
        }

        ui.add_space(4.0);
        for status in EdgeStatus::ALL {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(vec2(28.0, 16.0), Sense::hover());
                paint_edge(
                    ui.painter(),
                    pos2(rect.left(), rect.center().y),
                    pos2(rect.right(), rect.center().y),
                    0.0,
                    0.0,
                    EdgeState { status, progress: 0.0 },
                    time,
                    1.0,
                    EdgeEmphasis::default(),
                );
                ui.label(status.label());
            });
        }
    }

    fn draw_alert(&mut self, ctx: &Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };

        let modal = egui::Modal::new(Id::new("change-failed")).show(ctx, |ui| {
            ui.set_width(320.0);
            ui.heading("The change was not saved");
            ui.add_space(6.0);
            ui.label(message);
            ui.add_space(10.0);
            ui.button("OK").clicked()
        });

        if modal.inner || modal.should_close() {
            self.alert = None;
        }
    }
}
