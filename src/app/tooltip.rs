use eframe::egui::{self, Color32, Pos2, Rect, RichText, Ui, Vec2, pos2, vec2};

use crate::tree::{Level, LevelLifecycle, NodeStatus};
use crate::util::{format_duration, format_percentage};

pub(super) const HIDE_DELAY_SECS: f64 = 0.18;
pub(super) const TOOLTIP_GAP: f32 = 12.0;
pub(super) const TOOLTIP_WIDTH: f32 = 260.0;
const INITIAL_TOOLTIP_HEIGHT: f32 = 140.0;

/// Display copy of the hovered level, detached from the tree so a reload
/// underneath never invalidates it.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct HoveredLevel {
    pub(super) id: String,
    pub(super) title: String,
    pub(super) description: Option<String>,
    pub(super) status: NodeStatus,
    pub(super) completion: f32,
    pub(super) lesson_count: u32,
    pub(super) outcome: Option<String>,
    pub(super) duration_minutes: Option<u32>,
    pub(super) total_xp: Option<u32>,
    pub(super) lifecycle: Option<LevelLifecycle>,
}

impl HoveredLevel {
    pub(super) fn capture(level: &Level, status: NodeStatus) -> Self {
        Self {
            id: level.id.clone(),
            title: level.title.clone(),
            description: level.description.clone(),
            status,
            completion: level.completion_percentage,
            lesson_count: level.lesson_count,
            outcome: level.outcome().map(str::to_owned),
            duration_minutes: level.duration_minutes(),
            total_xp: level.total_xp(),
            lifecycle: level.lifecycle(),
        }
    }
}

#[derive(Clone, Debug)]
pub(super) struct HoverState {
    current: Option<(HoveredLevel, Rect)>,
    hide_at: Option<f64>,
    tooltip_size: Vec2,
}

impl Default for HoverState {
    fn default() -> Self {
        Self {
            current: None,
            hide_at: None,
            tooltip_size: vec2(TOOLTIP_WIDTH, INITIAL_TOOLTIP_HEIGHT),
        }
    }
}

impl HoverState {
    pub(super) fn current(&self) -> Option<(&HoveredLevel, Rect)> {
        self.current.as_ref().map(|(level, anchor)| (level, *anchor))
    }

    pub(super) fn hovered_id(&self) -> Option<&str> {
        self.current.as_ref().map(|(level, _)| level.id.as_str())
    }

    pub(super) fn tooltip_size(&self) -> Vec2 {
        self.tooltip_size
    }

    pub(super) fn remember_size(&mut self, size: Vec2) {
        if size.x > 0.0 && size.y > 0.0 {
            self.tooltip_size = size;
        }
    }

    /// Pointer entered a node: cancel any pending hide and show it.
    pub(super) fn enter(&mut self, level: HoveredLevel, anchor: Rect) {
        self.hide_at = None;
        self.current = Some((level, anchor));
    }

    /// Pointer left the node; hide later so it can travel onto the tooltip.
    pub(super) fn leave(&mut self, now: f64) {
        if self.current.is_some() && self.hide_at.is_none() {
            self.hide_at = Some(now + HIDE_DELAY_SECS);
        }
    }

    /// Pointer rests on the tooltip itself.
    pub(super) fn hold(&mut self) {
        self.hide_at = None;
    }

    pub(super) fn dismiss(&mut self) {
        self.current = None;
        self.hide_at = None;
    }

    /// Applies a due hide. Returns true while a hide is still scheduled.
    pub(super) fn tick(&mut self, now: f64) -> bool {
        match self.hide_at {
            Some(deadline) if now >= deadline => {
                self.dismiss();
                false
            }
            Some(_) => true,
            None => false,
        }
    }
}

/// Top-left corner for a tooltip of `size` next to `anchor`, kept inside
/// `viewport`.
///
/// Prefers the right side of the node, top aligned; flips left when the right
/// edge would overflow and lifts above the node when the bottom would.
pub(super) fn place_tooltip(anchor: Rect, size: Vec2, viewport: Rect) -> Pos2 {
    let mut x = anchor.right() + TOOLTIP_GAP;
    let mut y = anchor.top();

    if x + size.x > viewport.right() {
        x = anchor.left() - TOOLTIP_GAP - size.x;
    }
    if y + size.y > viewport.bottom() {
        y = anchor.top() - TOOLTIP_GAP - size.y;
    }

    let max_x = (viewport.right() - size.x).max(viewport.left());
    let max_y = (viewport.bottom() - size.y).max(viewport.top());
    pos2(x.clamp(viewport.left(), max_x), y.clamp(viewport.top(), max_y))
}

pub(super) fn tooltip_contents(ui: &mut Ui, level: &HoveredLevel, editor_mode: bool) {
    ui.label(RichText::new(&level.title).strong().size(15.0));
    ui.horizontal(|ui| {
        ui.label(RichText::new(level.status.label()).color(Color32::from_gray(190)));
        if let Some(lifecycle) = level.lifecycle
            && lifecycle != LevelLifecycle::Active
        {
            ui.label(RichText::new(lifecycle.label()).italics());
        }
    });

    if let Some(description) = &level.description {
        ui.add_space(2.0);
        ui.label(description);
    }
    if let Some(outcome) = &level.outcome {
        ui.label(format!("You will: {outcome}"));
    }

    ui.add_space(4.0);
    ui.add(
        egui::ProgressBar::new(level.completion / 100.0)
            .desired_width(ui.available_width())
            .text(format_percentage(level.completion)),
    );

    ui.horizontal_wrapped(|ui| {
        ui.label(format!("{} lessons", level.lesson_count));
        if let Some(minutes) = level.duration_minutes {
            ui.label(format!("· {}", format_duration(minutes)));
        }
        if let Some(xp) = level.total_xp {
            ui.label(format!("· {xp} XP"));
        }
    });

    ui.add_space(4.0);
    let hint = if editor_mode {
        "Click to edit this module"
    } else if level.status.is_clickable_for_learner() {
        "Click to continue learning"
    } else {
        "Complete the prerequisites to unlock"
    };
    ui.label(RichText::new(hint).small().color(Color32::from_gray(150)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::fixtures::level;

    fn viewport() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(1024.0, 768.0))
    }

    fn anchor_at(x: f32, y: f32) -> Rect {
        Rect::from_center_size(pos2(x, y), vec2(60.0, 60.0))
    }

    fn hovered(id: &str) -> HoveredLevel {
        HoveredLevel::capture(&level(id, 20.0, true), NodeStatus::Available)
    }

    #[test]
    fn default_placement_is_right_of_node() {
        let size = vec2(TOOLTIP_WIDTH, 120.0);
        let anchor = anchor_at(300.0, 200.0);
        let origin = place_tooltip(anchor, size, viewport());
        assert_eq!(origin, pos2(anchor.right() + TOOLTIP_GAP, anchor.top()));
    }

    #[test]
    fn flips_left_near_right_edge() {
        let size = vec2(TOOLTIP_WIDTH, 120.0);
        let anchor = anchor_at(980.0, 200.0);
        let origin = place_tooltip(anchor, size, viewport());
        assert_eq!(origin.x, anchor.left() - TOOLTIP_GAP - size.x);
    }

    #[test]
    fn lifts_above_near_bottom_edge() {
        let size = vec2(TOOLTIP_WIDTH, 120.0);
        let anchor = anchor_at(300.0, 740.0);
        let origin = place_tooltip(anchor, size, viewport());
        assert_eq!(origin.y, anchor.top() - TOOLTIP_GAP - size.y);
    }

    #[test]
    fn tooltip_always_fits_the_viewport() {
        let view = viewport();
        let size = vec2(TOOLTIP_WIDTH, 180.0);
        let mut y = -80.0;
        while y <= 860.0 {
            let mut x = -80.0;
            while x <= 1100.0 {
                let origin = place_tooltip(anchor_at(x, y), size, view);
                let placed = Rect::from_min_size(origin, size);
                assert!(placed.left() >= 0.0 && placed.top() >= 0.0, "{placed:?}");
                assert!(placed.right() <= 1024.0 && placed.bottom() <= 768.0, "{placed:?}");
                x += 37.0;
            }
            y += 29.0;
        }
    }

    #[test]
    fn oversized_tooltip_pins_to_top_left() {
        let origin = place_tooltip(anchor_at(50.0, 50.0), vec2(2000.0, 2000.0), viewport());
        assert_eq!(origin, pos2(0.0, 0.0));
    }

    #[test]
    fn hide_is_debounced_and_cancelled_by_reentry() {
        let mut hover = HoverState::default();
        hover.enter(hovered("a"), anchor_at(10.0, 10.0));

        hover.leave(1.0);
        assert!(hover.tick(1.1));
        assert_eq!(hover.hovered_id(), Some("a"));

        hover.enter(hovered("b"), anchor_at(20.0, 20.0));
        assert!(!hover.tick(5.0));
        assert_eq!(hover.hovered_id(), Some("b"));

        hover.leave(6.0);
        assert!(!hover.tick(6.0 + HIDE_DELAY_SECS));
        assert!(hover.current().is_none());
    }

    #[test]
    fn resting_on_tooltip_keeps_it_open() {
        let mut hover = HoverState::default();
        hover.enter(hovered("a"), anchor_at(10.0, 10.0));
        hover.leave(1.0);
        hover.hold();
        assert!(!hover.tick(3.0));
        assert_eq!(hover.hovered_id(), Some("a"));

        hover.dismiss();
        assert!(hover.current().is_none());
    }
}
