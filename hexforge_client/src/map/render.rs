// Copyright 2025 Justin Hu
//
// This file is part of Hexforge.
//
// Hexforge is free software: you can redistribute it and/or modify it under
// the terms of the GNU Affero General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Hexforge is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with Hexforge. If not, see <https://www.gnu.org/licenses/>.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Painting a laid-out scene onto a canvas

use std::f64::consts::PI;

use hexforge_common::{Hex, entity::EntityKind};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::map::{
    geometry::{hex_corners, hex_to_pixel},
    interaction::Selection,
    layout::{DoorMarker, RoomLayout, SceneLayout, Token, VesselMarker},
    reachability::ReachableSet,
    viewport::Viewport,
};

/// Below this zoom level the grid is too dense to be worth drawing
const GRID_MIN_ZOOM: i32 = -20;
/// Below this zoom level labels are unreadable
const LABEL_MIN_ZOOM: i32 = -10;

/// Everything drawn in one frame
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Rooms, doors, and tokens
    pub scene: &'a SceneLayout,
    /// Highlighted as legal destinations
    pub reachable: &'a ReachableSet,
    /// Selected entity and its plotted path
    pub selection: Option<&'a Selection>,
    /// Hex major radius, in world pixels
    pub radius: f64,
}

fn kind_colour(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Player => "#80e0ff",
        EntityKind::Enemy => "#ff8080",
        EntityKind::Npc => "#ffff80",
    }
}

/// Clear the canvas and draw the frame through the viewport
pub fn draw_scene(
    ctx: &CanvasRenderingContext2d,
    frame: &Frame,
    viewport: &Viewport,
    width: f64,
    height: f64,
) -> Result<(), JsValue> {
    ctx.save();
    ctx.clear_rect(0.0, 0.0, width, height);

    // Apply transformations: translate to center, apply offsets, then zoom
    ctx.translate(width / 2.0, height / 2.0)?;
    ctx.scale(viewport.zoom(), viewport.zoom())?;
    ctx.translate(viewport.x_offset, viewport.y_offset)?;

    let radius = frame.radius;
    let visible = |hex: Hex| viewport.maybe_visible(hex, width, height, radius);

    for room in &frame.scene.rooms {
        draw_room(ctx, room, viewport.zoom_level >= GRID_MIN_ZOOM, radius, &visible)?;
    }

    ctx.save();
    ctx.set_fill_style_str("rgba(170, 255, 170, 0.5)");
    for hex in frame.reachable.iter().filter(|&hex| visible(hex)) {
        trace_hex(ctx, hex, radius);
        ctx.fill();
    }
    ctx.restore();

    if let Some(selection) = frame.selection {
        draw_path(ctx, selection, radius);
    }

    for door in &frame.scene.doors {
        if visible(door.hex) {
            draw_door(ctx, door, radius);
        }
    }
    for vessel in &frame.scene.vessels {
        if visible(vessel.hex) {
            draw_vessel(ctx, vessel, radius, viewport.zoom_level >= LABEL_MIN_ZOOM)?;
        }
    }
    let selected = frame.selection.map(|selection| &selection.entity_id);
    for token in &frame.scene.tokens {
        if visible(token.hex) {
            draw_token(
                ctx,
                token,
                selected == Some(&token.entity_id),
                viewport.zoom_level >= LABEL_MIN_ZOOM,
            )?;
        }
    }

    ctx.restore();
    Ok(())
}

fn trace_hex(ctx: &CanvasRenderingContext2d, hex: Hex, radius: f64) {
    ctx.begin_path();
    for (i, corner) in hex_corners(hex, radius).into_iter().enumerate() {
        if i == 0 {
            ctx.move_to(corner.x, corner.y);
        } else {
            ctx.line_to(corner.x, corner.y);
        }
    }
    ctx.close_path();
}

fn draw_room(
    ctx: &CanvasRenderingContext2d,
    room: &RoomLayout,
    grid: bool,
    radius: f64,
    visible: &impl Fn(Hex) -> bool,
) -> Result<(), JsValue> {
    ctx.save();
    if !room.current {
        ctx.set_global_alpha(0.4);
    }

    let bounds = room.bounds;
    ctx.set_fill_style_str("#f4efe4");
    ctx.fill_rect(bounds.min.x, bounds.min.y, bounds.width(), bounds.height());
    ctx.set_stroke_style_str("#000000");
    ctx.set_line_width(3.0);
    ctx.stroke_rect(bounds.min.x, bounds.min.y, bounds.width(), bounds.height());

    if grid {
        ctx.set_stroke_style_str("#666666");
        ctx.set_line_width(1.0);
        for &hex in room.hexes.iter().filter(|&&hex| visible(hex)) {
            trace_hex(ctx, hex, radius);
            ctx.stroke();
        }
    }

    if !room.name.is_empty() {
        ctx.set_font("14px \"Science Gothic\"");
        ctx.set_fill_style_str("#000000");
        ctx.set_text_align("left");
        ctx.set_text_baseline("top");
        ctx.fill_text(&room.name, bounds.min.x + 4.0, bounds.min.y + 4.0)?;
    }

    ctx.restore();
    Ok(())
}

/// Arrows from the origin along each plotted step
fn draw_path(ctx: &CanvasRenderingContext2d, selection: &Selection, radius: f64) {
    let steps = std::iter::once(selection.origin).chain(selection.path.iter().copied());
    let mut previous = None;
    for (index, hex) in steps.enumerate() {
        if let Some(from) = previous {
            draw_arrow(
                ctx,
                &ArrowOptions {
                    from,
                    to: hex,
                    stem_width: radius * 0.1,
                    filled_head: index == selection.path.len(),
                    colour: "#2060c0",
                },
                radius,
            );
        }
        previous = Some(hex);
    }
}

/// Options for drawing an arrow
struct ArrowOptions {
    /// Always starts at the center of this hex
    from: Hex,
    /// Always ends at the center of this hex
    to: Hex,
    /// How to draw the stem of the arrow
    stem_width: f64,
    /// A filled triangle, or an open V
    filled_head: bool,
    /// Colour of all parts of the arrow
    colour: &'static str,
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, options: &ArrowOptions, radius: f64) {
    let from_center = hex_to_pixel(options.from, radius);
    let to_center = hex_to_pixel(options.to, radius);

    let dx = to_center.x - from_center.x;
    let dy = to_center.y - from_center.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return;
    }

    let norm_dx = dx / length;
    let norm_dy = dy / length;

    let head_length = radius * 0.3;
    let head_width = radius * 0.3;
    let head_base_x = to_center.x - norm_dx * head_length;
    let head_base_y = to_center.y - norm_dy * head_length;

    // perpendicular to the stem
    let perp_x = -norm_dy;
    let perp_y = norm_dx;

    ctx.save();
    ctx.set_stroke_style_str(options.colour);
    ctx.set_fill_style_str(options.colour);
    ctx.set_line_width(options.stem_width);

    ctx.begin_path();
    ctx.move_to(from_center.x, from_center.y);
    if options.filled_head {
        ctx.line_to(head_base_x, head_base_y);
    } else {
        ctx.line_to(to_center.x, to_center.y);
    }
    ctx.stroke();

    ctx.begin_path();
    ctx.move_to(
        head_base_x + perp_x * head_width,
        head_base_y + perp_y * head_width,
    );
    ctx.line_to(to_center.x, to_center.y);
    ctx.line_to(
        head_base_x - perp_x * head_width,
        head_base_y - perp_y * head_width,
    );
    if options.filled_head {
        ctx.close_path();
        ctx.fill();
    } else {
        ctx.stroke();
    }

    ctx.restore();
}

/// Open doors are an outline, shut ones are solid
fn draw_door(ctx: &CanvasRenderingContext2d, door: &DoorMarker, radius: f64) {
    let size = radius * 0.6;
    let (x, y) = (door.center.x - size / 2.0, door.center.y - size / 2.0);

    ctx.save();
    ctx.set_stroke_style_str("#6b4226");
    ctx.set_fill_style_str("#6b4226");
    ctx.set_line_width(3.0);
    if door.open {
        ctx.stroke_rect(x, y, size, size);
    } else {
        ctx.fill_rect(x, y, size, size);
    }
    ctx.restore();
}

fn draw_vessel(
    ctx: &CanvasRenderingContext2d,
    vessel: &VesselMarker,
    radius: f64,
    label: bool,
) -> Result<(), JsValue> {
    let size = radius * 0.4;

    ctx.save();
    ctx.set_fill_style_str("#d4a017");
    ctx.set_stroke_style_str("#000000");
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.move_to(vessel.center.x, vessel.center.y - size);
    ctx.line_to(vessel.center.x + size, vessel.center.y);
    ctx.line_to(vessel.center.x, vessel.center.y + size);
    ctx.line_to(vessel.center.x - size, vessel.center.y);
    ctx.close_path();
    ctx.fill();
    ctx.stroke();

    if label && !vessel.name.is_empty() {
        ctx.set_font("10px \"Science Gothic\"");
        ctx.set_fill_style_str("#000000");
        ctx.set_text_align("center");
        ctx.set_text_baseline("top");
        ctx.fill_text(&vessel.name, vessel.center.x, vessel.center.y + size + 2.0)?;
    }
    ctx.restore();
    Ok(())
}

fn draw_token(
    ctx: &CanvasRenderingContext2d,
    token: &Token,
    selected: bool,
    label: bool,
) -> Result<(), JsValue> {
    let center = token.center;

    ctx.save();
    ctx.begin_path();
    ctx.arc(center.x, center.y, token.radius, 0.0, 2.0 * PI)?;
    ctx.set_fill_style_str(if token.alive {
        kind_colour(token.kind)
    } else {
        "#999999"
    });
    ctx.fill();
    ctx.set_stroke_style_str("#000000");
    ctx.set_line_width(if selected { 4.0 } else { 1.0 });
    ctx.stroke();

    if let Some(health) = token.health {
        let bar_width = token.radius * 2.0;
        let bar_height = (token.radius * 0.2).max(2.0);
        let x = center.x - token.radius;
        let y = center.y + token.radius + 2.0;
        ctx.set_fill_style_str("#400000");
        ctx.fill_rect(x, y, bar_width, bar_height);
        ctx.set_fill_style_str(if health > 0.5 {
            "#40c040"
        } else if health > 0.25 {
            "#e0c040"
        } else {
            "#e04040"
        });
        ctx.fill_rect(x, y, bar_width * health, bar_height);
    }

    if label && !token.name.is_empty() {
        ctx.set_font("12px \"Science Gothic\"");
        ctx.set_fill_style_str("#000000");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let initial = token.name.chars().next().map(String::from).unwrap_or_default();
        ctx.fill_text(&initial, center.x, center.y)?;
    }

    ctx.restore();
    Ok(())
}
