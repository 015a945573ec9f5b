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

//! Panning and zooming the map, and mapping screen points back to hexes

use hexforge_common::{CartesianVec2, Hex};

use crate::{MapConfig, map::geometry};

/// How the map is currently framed on the canvas
///
/// World coordinates are pixels at zoom level 0 with the origin hex centred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Horizontal pan, in world pixels
    pub x_offset: f64,
    /// Vertical pan, in world pixels
    pub y_offset: f64,
    /// Each level zooms by 10%
    pub zoom_level: i32,
    min_zoom: i32,
    max_zoom: i32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&MapConfig::default())
    }
}

impl Viewport {
    /// Centred on the origin, unzoomed
    pub fn new(config: &MapConfig) -> Self {
        Self {
            x_offset: 0.0,
            y_offset: 0.0,
            zoom_level: 0,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }

    /// Scale factor from world to screen pixels
    pub fn zoom(&self) -> f64 {
        1.1_f64.powi(self.zoom_level)
    }

    /// World point under a screen point, for a canvas of the given size
    pub fn screen_to_world(&self, screen: CartesianVec2, width: f64, height: f64) -> CartesianVec2 {
        CartesianVec2 {
            x: (screen.x - width / 2.0) / self.zoom() - self.x_offset,
            y: (screen.y - height / 2.0) / self.zoom() - self.y_offset,
        }
    }

    /// Screen point for a world point, for a canvas of the given size
    pub fn world_to_screen(&self, world: CartesianVec2, width: f64, height: f64) -> CartesianVec2 {
        CartesianVec2 {
            x: (world.x + self.x_offset) * self.zoom() + width / 2.0,
            y: (world.y + self.y_offset) * self.zoom() + height / 2.0,
        }
    }

    /// Hex under a screen point
    pub fn screen_to_hex(&self, screen: CartesianVec2, width: f64, height: f64, radius: f64) -> Hex {
        geometry::pixel_to_hex(self.screen_to_world(screen, width, height), radius)
    }

    /// Is this hex possibly visible?
    ///
    /// false means that it is never visible
    /// true means that it might be visible, or it might be just out of view
    pub fn maybe_visible(&self, hex: Hex, width: f64, height: f64, radius: f64) -> bool {
        let screen = self.world_to_screen(geometry::hex_to_pixel(hex, radius), width, height);
        let margin = radius * self.zoom();

        screen.x >= -margin
            && screen.x <= width + margin
            && screen.y >= -margin
            && screen.y <= height + margin
    }

    /// Drag the map by a screen-space delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x_offset += dx / self.zoom();
        self.y_offset += dy / self.zoom();
    }

    /// Zoom one level in or out, keeping the world point under the cursor fixed
    pub fn zoom_at(&mut self, zoom_in: bool, screen: CartesianVec2, width: f64, height: f64) {
        let before = self.screen_to_world(screen, width, height);
        self.zoom_level = if zoom_in {
            i32::min(self.zoom_level + 1, self.max_zoom)
        } else {
            i32::max(self.zoom_level - 1, self.min_zoom)
        };
        let after = self.screen_to_world(screen, width, height);
        self.x_offset += after.x - before.x;
        self.y_offset += after.y - before.y;
    }
}
