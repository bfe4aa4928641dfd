use eframe::egui::{Pos2, Rect, Vec2, vec2};

use super::render_utils::screen_to_world;

pub(super) const FOCUS_ZOOM: f32 = 1.1;
/// Screen offset of the focused node from the canvas center, leaving room for
/// the legend in the lower left corner.
pub(super) const FOCUS_OFFSET: Vec2 = vec2(48.0, -36.0);
pub(super) const SETTLE_DELAY_SECS: f64 = 0.12;
pub(super) const MIN_ZOOM: f32 = 0.2;
pub(super) const MAX_ZOOM: f32 = 3.0;

/// Tracks the one automatic centering per graph load.
#[derive(Clone, Debug, Default)]
pub(super) struct CameraState {
    positioned: bool,
    settle_started_at: Option<f64>,
}

impl CameraState {
    pub(super) fn is_positioned(&self) -> bool {
        self.positioned
    }

    /// Forget the previous centering so the next frame focuses again.
    pub(super) fn reset(&mut self) {
        self.positioned = false;
        self.settle_started_at = None;
    }

    /// Returns true exactly once, on the first frame after the settle delay.
    pub(super) fn focus_due(&mut self, now: f64) -> bool {
        if self.positioned {
            return false;
        }

        let started = *self.settle_started_at.get_or_insert(now);
        if now - started < SETTLE_DELAY_SECS {
            return false;
        }

        self.positioned = true;
        true
    }

    /// Any user pan or zoom counts as positioning; centering must not fight it.
    pub(super) fn mark_user_moved(&mut self) {
        self.positioned = true;
    }
}

pub(super) fn focus_pan(world: Vec2, zoom: f32, offset: Vec2) -> Vec2 {
    offset - world * zoom
}

/// Zooms by `factor` keeping the world point under `pointer` fixed on screen.
pub(super) fn zoom_about(
    rect: Rect,
    pan: Vec2,
    zoom: f32,
    pointer: Pos2,
    factor: f32,
) -> (Vec2, f32) {
    let world_before = screen_to_world(rect, pan, zoom, pointer);
    let next_zoom = (zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    let next_pan = pointer - rect.center() - (world_before * next_zoom);
    (next_pan, next_zoom)
}

/// Zooms by `factor` around the canvas center.
pub(super) fn zoom_centered(pan: Vec2, zoom: f32, factor: f32) -> (Vec2, f32) {
    let next_zoom = (zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    (pan * (next_zoom / zoom), next_zoom)
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::super::render_utils::world_to_screen;
    use super::*;

    #[test]
    fn focus_fires_once_after_settling() {
        let mut camera = CameraState::default();
        assert!(!camera.focus_due(10.0));
        assert!(!camera.focus_due(10.05));
        assert!(camera.focus_due(10.2));
        assert!(!camera.focus_due(11.0));
        assert!(camera.is_positioned());

        camera.reset();
        assert!(!camera.focus_due(20.0));
        assert!(camera.focus_due(20.5));
    }

    #[test]
    fn user_motion_suppresses_auto_focus() {
        let mut camera = CameraState::default();
        camera.mark_user_moved();
        assert!(!camera.focus_due(0.0));
        assert!(!camera.focus_due(5.0));
    }

    #[test]
    fn focused_node_lands_at_center_plus_offset() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let world = vec2(-120.0, 340.0);
        let pan = focus_pan(world, FOCUS_ZOOM, FOCUS_OFFSET);

        let screen = world_to_screen(rect, pan, FOCUS_ZOOM, world);
        let expected = rect.center() + FOCUS_OFFSET;
        assert!((screen - expected).length() < 1e-3);
    }

    #[test]
    fn zoom_keeps_point_under_pointer() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let pointer = pos2(610.0, 120.0);
        let pan = vec2(30.0, -15.0);
        let world = screen_to_world(rect, pan, 1.0, pointer);

        let (next_pan, next_zoom) = zoom_about(rect, pan, 1.0, pointer, 1.25);
        assert_eq!(next_zoom, 1.25);
        let screen = world_to_screen(rect, next_pan, next_zoom, world);
        assert!((screen - pointer).length() < 1e-3);
    }

    #[test]
    fn centered_zoom_keeps_canvas_center_fixed() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0));
        let pan = vec2(-140.0, 60.0);
        let world = screen_to_world(rect, pan, 0.8, rect.center());

        let (next_pan, next_zoom) = zoom_centered(pan, 0.8, 1.5);
        let screen = world_to_screen(rect, next_pan, next_zoom, world);
        assert!((screen - rect.center()).length() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0));
        let (_, zoom) = zoom_about(rect, Vec2::ZERO, 2.9, rect.center(), 4.0);
        assert_eq!(zoom, MAX_ZOOM);
        let (_, zoom) = zoom_about(rect, Vec2::ZERO, 0.25, rect.center(), 0.1);
        assert_eq!(zoom, MIN_ZOOM);
    }
}
