use std::f32::consts::TAU;

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Shape, Stroke};

use crate::tree::{EdgeState, EdgeStatus};
use crate::util::format_percentage;

use super::super::render_utils::{arc_points, dim_color, with_alpha};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct EdgeStyle {
    pub(in crate::app) color: Color32,
    pub(in crate::app) width: f32,
    pub(in crate::app) glow_width: f32,
    pub(in crate::app) glow_alpha: f32,
    /// Dash and gap length in points; `None` draws a solid line.
    pub(in crate::app) dash: Option<(f32, f32)>,
    pub(in crate::app) particle_count: u8,
    /// Fraction of the edge length a particle travels per second.
    pub(in crate::app) flow_speed: f32,
}

pub(in crate::app) fn edge_style(status: EdgeStatus) -> EdgeStyle {
    match status {
        EdgeStatus::Locked => EdgeStyle {
            color: Color32::from_rgb(70, 78, 96),
            width: 1.4,
            glow_width: 0.0,
            glow_alpha: 0.0,
            dash: Some((6.0, 6.0)),
            particle_count: 0,
            flow_speed: 0.0,
        },
        EdgeStatus::Available => EdgeStyle {
            color: Color32::from_rgb(86, 204, 242),
            width: 2.2,
            glow_width: 6.0,
            glow_alpha: 0.22,
            dash: None,
            particle_count: 2,
            flow_speed: 0.35,
        },
        EdgeStatus::Mastered => EdgeStyle {
            color: Color32::from_rgb(246, 196, 83),
            width: 3.0,
            glow_width: 9.0,
            glow_alpha: 0.32,
            dash: None,
            particle_count: 3,
            flow_speed: 0.22,
        },
    }
}

/// A badge shows only while the path is partly walked.
pub(in crate::app) fn shows_progress_badge(progress: f32) -> bool {
    progress > 0.0 && progress < 100.0
}

#[derive(Clone, Copy, Debug, Default)]
pub(in crate::app) struct EdgeEmphasis {
    pub(in crate::app) highlighted: bool,
    pub(in crate::app) dimmed: bool,
}

/// Pulls the segment ends back to the node rims.
fn trim_segment(
    start: Pos2,
    end: Pos2,
    start_radius: f32,
    end_radius: f32,
) -> Option<(Pos2, Pos2)> {
    let delta = end - start;
    let length = delta.length();
    if length <= start_radius + end_radius + 1.0 {
        return None;
    }
    let direction = delta / length;
    Some((start + direction * start_radius, end - direction * end_radius))
}

#[allow(clippy::too_many_arguments)]
pub(in crate::app) fn paint_edge(
    painter: &Painter,
    start: Pos2,
    end: Pos2,
    start_radius: f32,
    end_radius: f32,
    state: EdgeState,
    time: f32,
    zoom: f32,
    emphasis: EdgeEmphasis,
) {
    let Some((start, end)) = trim_segment(start, end, start_radius, end_radius) else {
        return;
    };

    let style = edge_style(state.status);
    let scale = zoom.sqrt().clamp(0.6, 1.6);
    let color = if emphasis.highlighted {
        Color32::from_rgb(241, 146, 94)
    } else if emphasis.dimmed {
        dim_color(style.color, 0.4)
    } else {
        style.color
    };
    let width = style.width * scale * if emphasis.highlighted { 1.4 } else { 1.0 };

    if style.glow_width > 0.0 && !emphasis.dimmed {
        painter.line_segment(
            [start, end],
            Stroke::new(style.glow_width * scale, with_alpha(color, style.glow_alpha)),
        );
    }

    let stroke = Stroke::new(width, color);
    match style.dash {
        Some((dash, gap)) => {
            painter.extend(Shape::dashed_line(&[start, end], stroke, dash * scale, gap * scale));
        }
        None => {
            painter.line_segment([start, end], stroke);
        }
    }

    if !emphasis.dimmed {
        for particle in 0..style.particle_count {
            let phase = particle as f32 / style.particle_count as f32;
            let t = (time * style.flow_speed + phase).rem_euclid(1.0);
            let fade = (t * TAU / 2.0).sin();
            painter.circle_filled(
                start + (end - start) * t,
                (width * 0.9).max(1.5),
                with_alpha(Color32::WHITE, 0.75 * fade),
            );
        }
    }

    if shows_progress_badge(state.progress) {
        paint_progress_badge(painter, start + (end - start) * 0.5, state.progress, scale);
    }
}

fn paint_progress_badge(painter: &Painter, center: Pos2, progress: f32, scale: f32) {
    let radius = 13.0 * scale;
    painter.circle_filled(center, radius, Color32::from_rgb(14, 20, 34));
    painter.circle_stroke(
        center,
        radius,
        Stroke::new(1.5, with_alpha(Color32::from_rgb(86, 204, 242), 0.35)),
    );
    painter.line(
        arc_points(center, radius, -TAU / 4.0, TAU * progress / 100.0),
        Stroke::new(2.5, Color32::from_rgb(86, 204, 242)),
    );
    painter.text(
        center,
        Align2::CENTER_CENTER,
        format_percentage(progress.round()),
        FontId::proportional(8.5 * scale),
        Color32::from_gray(235),
    );
}
