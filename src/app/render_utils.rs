use std::f32::consts::TAU;

use eframe::egui::{Color32, Painter, Pos2, Rect, Vec2, pos2, vec2};

use crate::util::stable_pair;

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (alpha.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

const STAR_COUNT: usize = 140;
const STAR_TILE: f32 = 900.0;

/// Deep-space backdrop with a parallax star field that drifts with the pan.
pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(11, 14, 26));

    let parallax = pan * 0.35;
    let scale = zoom.clamp(0.6, 1.6).sqrt();

    for star in 0..STAR_COUNT {
        let (jx, jy) = stable_pair(&format!("star-{star}"));
        let local = vec2(
            (jx * 0.5 + 0.5) * STAR_TILE + parallax.x,
            (jy * 0.5 + 0.5) * STAR_TILE + parallax.y,
        );
        let wrapped = vec2(local.x.rem_euclid(STAR_TILE), local.y.rem_euclid(STAR_TILE));

        let brightness = 60.0 + (jx * jy).abs() * 150.0;
        let radius = (0.6 + (jx + jy).abs() * 0.5) * scale;
        let color = Color32::from_rgba_unmultiplied(200, 214, 255, brightness as u8);

        let mut x = rect.left() + wrapped.x;
        while x - STAR_TILE < rect.right() {
            let mut y = rect.top() + wrapped.y;
            while y - STAR_TILE < rect.bottom() {
                let point = pos2(x, y);
                if rect.contains(point) {
                    painter.circle_filled(point, radius, color);
                }
                y += STAR_TILE;
            }
            x += STAR_TILE;
        }
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let top_left = rect.left_top();
    let top_right = rect.right_top();
    let bottom_left = rect.left_bottom();
    let bottom_right = rect.right_bottom();

    segments_intersect(start, end, top_left, top_right)
        || segments_intersect(start, end, top_right, bottom_right)
        || segments_intersect(start, end, bottom_right, bottom_left)
        || segments_intersect(start, end, bottom_left, top_left)
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Points along a circular arc, `sweep` radians from `start_angle`.
pub(super) fn arc_points(center: Pos2, radius: f32, start_angle: f32, sweep: f32) -> Vec<Pos2> {
    let segments = ((sweep.abs() / TAU) * 48.0).ceil().max(2.0) as usize;
    (0..=segments)
        .map(|step| {
            let angle = start_angle + sweep * (step as f32 / segments as f32);
            center + vec2(angle.cos(), angle.sin()) * radius
        })
        .collect()
}
