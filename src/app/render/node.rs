use std::f32::consts::TAU;

use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Shape, Stroke, vec2};

use crate::tree::NodeStatus;

use super::super::render_utils::{arc_points, blend_color, dim_color, with_alpha};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct NodeStyle {
    pub(in crate::app) fill: Color32,
    pub(in crate::app) rim: Color32,
    pub(in crate::app) glow: Color32,
    pub(in crate::app) glow_layers: u8,
    pub(in crate::app) glow_alpha: f32,
    /// Radians per second of the dashed outer ring; zero keeps it still.
    pub(in crate::app) ring_speed: f32,
    pub(in crate::app) ring_dashes: u8,
    pub(in crate::app) particle_count: u8,
    pub(in crate::app) pulse: f32,
    pub(in crate::app) radius_scale: f32,
    pub(in crate::app) hexagon: bool,
    pub(in crate::app) glyph: &'static str,
}

pub(in crate::app) fn node_style(status: NodeStatus) -> NodeStyle {
    match status {
        NodeStatus::Locked => NodeStyle {
            fill: Color32::from_rgb(34, 39, 52),
            rim: Color32::from_rgb(70, 78, 96),
            glow: Color32::from_rgb(70, 78, 96),
            glow_layers: 0,
            glow_alpha: 0.0,
            ring_speed: 0.0,
            ring_dashes: 0,
            particle_count: 0,
            pulse: 0.0,
            radius_scale: 0.9,
            hexagon: false,
            glyph: "🔒",
        },
        NodeStatus::Available => NodeStyle {
            fill: Color32::from_rgb(18, 52, 74),
            rim: Color32::from_rgb(86, 204, 242),
            glow: Color32::from_rgb(86, 204, 242),
            glow_layers: 2,
            glow_alpha: 0.35,
            ring_speed: 0.6,
            ring_dashes: 6,
            particle_count: 2,
            pulse: 0.04,
            radius_scale: 1.0,
            hexagon: false,
            glyph: "▶",
        },
        NodeStatus::Mastered => NodeStyle {
            fill: Color32::from_rgb(92, 66, 18),
            rim: Color32::from_rgb(246, 196, 83),
            glow: Color32::from_rgb(255, 214, 120),
            glow_layers: 3,
            glow_alpha: 0.5,
            ring_speed: 0.25,
            ring_dashes: 10,
            particle_count: 4,
            pulse: 0.02,
            radius_scale: 1.0,
            hexagon: false,
            glyph: "★",
        },
        NodeStatus::Boss => NodeStyle {
            fill: Color32::from_rgb(86, 20, 44),
            rim: Color32::from_rgb(236, 84, 122),
            glow: Color32::from_rgb(255, 96, 140),
            glow_layers: 4,
            glow_alpha: 0.6,
            ring_speed: 1.2,
            ring_dashes: 8,
            particle_count: 6,
            pulse: 0.06,
            radius_scale: 1.22,
            hexagon: true,
            glyph: "♛",
        },
        NodeStatus::BossLocked => NodeStyle {
            fill: Color32::from_rgb(44, 24, 34),
            rim: Color32::from_rgb(112, 54, 72),
            glow: Color32::from_rgb(112, 54, 72),
            glow_layers: 1,
            glow_alpha: 0.18,
            ring_speed: 0.15,
            ring_dashes: 4,
            particle_count: 0,
            pulse: 0.0,
            radius_scale: 1.22,
            hexagon: true,
            glyph: "🔒",
        },
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub(in crate::app) struct NodeEmphasis {
    pub(in crate::app) hovered: bool,
    pub(in crate::app) selected: bool,
    pub(in crate::app) highlighted: bool,
    pub(in crate::app) search_match: bool,
    pub(in crate::app) dimmed: bool,
    pub(in crate::app) frontier: bool,
}

fn hexagon_points(center: Pos2, radius: f32, rotation: f32) -> Vec<Pos2> {
    (0..6)
        .map(|corner| {
            let angle = rotation + corner as f32 * TAU / 6.0;
            center + vec2(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

/// Radius a node of `status` actually occupies on screen.
pub(in crate::app) fn node_screen_radius(status: NodeStatus, base_radius: f32) -> f32 {
    base_radius * node_style(status).radius_scale
}

pub(in crate::app) fn paint_node(
    painter: &Painter,
    center: Pos2,
    base_radius: f32,
    status: NodeStatus,
    completion: f32,
    time: f32,
    emphasis: NodeEmphasis,
) {
    let style = node_style(status);
    let pulse = 1.0 + style.pulse * (time * 2.4).sin();
    let radius = base_radius * style.radius_scale * pulse;

    let shade = |color: Color32| {
        if emphasis.dimmed {
            dim_color(color, 0.45)
        } else {
            color
        }
    };
    let rim = if emphasis.search_match {
        blend_color(style.rim, Color32::from_rgb(103, 196, 255), 0.6)
    } else {
        style.rim
    };

    for layer in 0..style.glow_layers {
        let t = layer as f32 / style.glow_layers as f32;
        let glow_alpha = style.glow_alpha * (1.0 - t) * 0.45;
        painter.circle_filled(
            center,
            radius * (1.18 + 0.24 * layer as f32),
            shade(with_alpha(style.glow, glow_alpha)),
        );
    }

    if emphasis.frontier {
        let beacon = (time * 1.6).rem_euclid(1.0);
        painter.circle_stroke(
            center,
            radius * (1.3 + beacon * 0.9),
            Stroke::new(2.0, with_alpha(style.rim, 0.6 * (1.0 - beacon))),
        );
    }

    let body_stroke = Stroke::new(if emphasis.hovered { 3.0 } else { 2.0 }, shade(rim));
    if style.hexagon {
        painter.add(Shape::convex_polygon(
            hexagon_points(center, radius, time * style.ring_speed * 0.2),
            shade(style.fill),
            body_stroke,
        ));
    } else {
        painter.circle_filled(center, radius, shade(style.fill));
        painter.circle_stroke(center, radius, body_stroke);
    }

    if style.ring_dashes > 0 {
        let dash_step = TAU / style.ring_dashes as f32;
        let rotation = time * style.ring_speed;
        for dash in 0..style.ring_dashes {
            let start = rotation + dash as f32 * dash_step;
            painter.line(
                arc_points(center, radius * 1.2, start, dash_step * 0.5),
                Stroke::new(1.6, shade(with_alpha(rim, 0.8))),
            );
        }
    }

    if completion > 0.0 && completion < 100.0 && status.is_clickable_for_learner() {
        painter.line(
            arc_points(center, radius * 0.8, -TAU / 4.0, TAU * completion / 100.0),
            Stroke::new(3.0, shade(Color32::from_rgb(246, 196, 83))),
        );
    }

    for particle in 0..style.particle_count {
        let phase = particle as f32 / style.particle_count as f32;
        let angle = time * (0.8 + style.ring_speed * 0.6) + phase * TAU;
        let wobble = 1.45 + 0.08 * (time * 3.0 + phase * TAU).sin();
        painter.circle_filled(
            center + vec2(angle.cos(), angle.sin()) * radius * wobble,
            (radius * 0.06).clamp(1.2, 3.0),
            shade(with_alpha(style.glow, 0.85)),
        );
    }

    if emphasis.selected || emphasis.highlighted {
        let color = if emphasis.selected {
            Color32::from_rgb(245, 206, 93)
        } else {
            Color32::from_rgb(241, 146, 94)
        };
        painter.circle_stroke(center, radius * 1.55, Stroke::new(1.8, with_alpha(color, 0.85)));
    }

    painter.text(
        center,
        Align2::CENTER_CENTER,
        style.glyph,
        FontId::proportional((radius * 0.7).clamp(8.0, 30.0)),
        shade(with_alpha(rim, 0.95)),
    );
}
