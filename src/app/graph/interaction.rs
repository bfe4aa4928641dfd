use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use crate::tree::NodeStatus;

use super::super::camera::zoom_about;
use super::super::render_utils::circle_visible;
use super::super::{CanvasEvent, ViewModel};

/// Pan and zoom produced by one frame of wheel and pinch input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct WheelMotion {
    pub(in crate::app) pan: Vec2,
    pub(in crate::app) zoom_factor: f32,
}

/// Learners zoom with the wheel. Editors scroll around the tree and keep
/// pinch (or ctrl + wheel) for zooming.
pub(in crate::app) fn wheel_motion(editor_mode: bool, scroll: Vec2, pinch: f32) -> WheelMotion {
    let pinching = (pinch - 1.0).abs() > f32::EPSILON;

    if editor_mode {
        return WheelMotion {
            pan: scroll,
            zoom_factor: pinch,
        };
    }

    let zoom_factor = if pinching {
        pinch
    } else if scroll.y.abs() > f32::EPSILON {
        (1.0 + (scroll.y * 0.0018)).clamp(0.85, 1.15)
    } else {
        1.0
    };

    WheelMotion {
        pan: Vec2::ZERO,
        zoom_factor,
    }
}

/// What a primary click means for the node under the pointer, if any.
pub(in crate::app) fn click_event(
    editor_mode: bool,
    hit: Option<(&str, NodeStatus)>,
) -> Option<CanvasEvent> {
    let Some((id, status)) = hit else {
        return Some(CanvasEvent::ClearSelection);
    };

    if editor_mode {
        Some(CanvasEvent::EditLevel(id.to_owned()))
    } else if status.is_clickable_for_learner() {
        Some(CanvasEvent::OpenLevel(id.to_owned()))
    } else {
        None
    }
}

/// Escape clears the selection only while the canvas owns the pointer and no
/// text field is taking keys.
pub(in crate::app) fn escape_event(
    pressed: bool,
    canvas_hovered: bool,
    keyboard_busy: bool,
) -> Option<CanvasEvent> {
    (pressed && canvas_hovered && !keyboard_busy).then_some(CanvasEvent::ClearSelection)
}

impl ViewModel {
    /// Applies drag, wheel and pinch input. Returns true when the view moved.
    pub(in crate::app) fn handle_graph_navigation(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) -> bool {
        let mut moved = false;

        if response.dragged() {
            let delta = response.drag_delta();
            if delta != Vec2::ZERO {
                self.pan += delta;
                moved = true;
            }
        }

        if !response.hovered() {
            return moved;
        }

        let (scroll, raw_scroll, pinch, pointer) = ui.input(|input| {
            (
                input.smooth_scroll_delta,
                input.raw_scroll_delta,
                input.zoom_delta(),
                input.pointer.hover_pos(),
            )
        });
        let scroll = if self.config.editor_mode { scroll } else { raw_scroll };
        let motion = wheel_motion(self.config.editor_mode, scroll, pinch);

        if motion.pan != Vec2::ZERO {
            self.pan += motion.pan;
            moved = true;
        }

        if (motion.zoom_factor - 1.0).abs() > f32::EPSILON {
            let pointer = pointer.unwrap_or_else(|| rect.center());
            let (pan, zoom) = zoom_about(rect, self.pan, self.zoom, pointer, motion.zoom_factor);
            self.pan = pan;
            self.zoom = zoom;
            moved = true;
        }

        moved
    }

    pub(in crate::app) fn visible_indices_into(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        visible_indices: &mut Vec<usize>,
    ) {
        visible_indices.clear();
        visible_indices.extend((0..screen_positions.len()).filter(|&index| {
            circle_visible(rect, screen_positions[index], screen_radii[index])
        }));
    }

    pub(in crate::app) fn hovered_index(
        pointer: Option<Pos2>,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<usize> {
        let pointer = pointer?;
        visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = screen_positions[index].distance(pointer);
                (distance <= screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn escape_needs_a_hovered_canvas_and_free_keyboard() {
        assert_eq!(escape_event(true, true, false), Some(CanvasEvent::ClearSelection));
        assert_eq!(escape_event(true, false, false), None);
        assert_eq!(escape_event(true, true, true), None);
        assert_eq!(escape_event(false, true, false), None);
    }

    #[test]
    fn learner_scroll_zooms_without_panning() {
        let motion = wheel_motion(false, vec2(0.0, 50.0), 1.0);
        assert_eq!(motion.pan, Vec2::ZERO);
        assert!(motion.zoom_factor > 1.0);

        let motion = wheel_motion(false, vec2(0.0, -5000.0), 1.0);
        assert_eq!(motion.zoom_factor, 0.85);
    }

    #[test]
    fn editor_scroll_pans_and_only_pinch_zooms() {
        let motion = wheel_motion(true, vec2(12.0, -30.0), 1.0);
        assert_eq!(motion.pan, vec2(12.0, -30.0));
        assert_eq!(motion.zoom_factor, 1.0);

        let motion = wheel_motion(true, Vec2::ZERO, 1.2);
        assert_eq!(motion.zoom_factor, 1.2);
    }

    #[test]
    fn learner_pinch_takes_precedence() {
        let motion = wheel_motion(false, vec2(0.0, 80.0), 0.9);
        assert_eq!(motion.zoom_factor, 0.9);
    }

    #[test]
    fn editor_clicks_edit_every_node() {
        for status in NodeStatus::ALL {
            assert_eq!(
                click_event(true, Some(("n1", status))),
                Some(CanvasEvent::EditLevel("n1".to_owned()))
            );
        }
    }

    #[test]
    fn learner_clicks_open_only_reachable_levels() {
        assert_eq!(
            click_event(false, Some(("n1", NodeStatus::Available))),
            Some(CanvasEvent::OpenLevel("n1".to_owned()))
        );
        assert_eq!(
            click_event(false, Some(("n1", NodeStatus::Mastered))),
            Some(CanvasEvent::OpenLevel("n1".to_owned()))
        );
        assert_eq!(click_event(false, Some(("n1", NodeStatus::Locked))), None);
        assert_eq!(click_event(false, Some(("n1", NodeStatus::BossLocked))), None);
    }

    #[test]
    fn clicking_empty_space_clears_selection() {
        assert_eq!(click_event(false, None), Some(CanvasEvent::ClearSelection));
        assert_eq!(click_event(true, None), Some(CanvasEvent::ClearSelection));
    }

    #[test]
    fn hover_picks_the_closest_node_under_pointer() {
        let positions = [pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(100.0, 100.0)];
        let radii = [12.0, 12.0, 12.0];
        let visible = [0, 1, 2];

        assert_eq!(
            ViewModel::hovered_index(Some(pos2(7.0, 0.0)), &visible, &positions, &radii),
            Some(1)
        );
        assert_eq!(
            ViewModel::hovered_index(Some(pos2(50.0, 50.0)), &visible, &positions, &radii),
            None
        );
        assert_eq!(ViewModel::hovered_index(None, &visible, &positions, &radii), None);
        assert_eq!(
            ViewModel::hovered_index(Some(pos2(7.0, 0.0)), &[0], &positions, &radii),
            Some(0)
        );
    }
}
