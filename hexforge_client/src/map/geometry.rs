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

//! Conversions between hexes and pixels

use std::f64::consts::PI;

use hexforge_common::{CartesianVec2, Hex};

/// Centre of a hex, in pixels
pub fn hex_to_pixel(hex: Hex, radius: f64) -> CartesianVec2 {
    hex.cartesian() * radius
}

/// Hex containing a pixel
pub fn pixel_to_hex(point: CartesianVec2, radius: f64) -> Hex {
    (point * radius.recip()).to_axial()
}

/// Corners of a flat-topped hex, starting from the rightmost and going clockwise (y down)
pub fn hex_corners(hex: Hex, radius: f64) -> [CartesianVec2; 6] {
    let center = hex_to_pixel(hex, radius);
    std::array::from_fn(|i| {
        let angle = PI / 3.0 * i as f64;
        center
            + CartesianVec2 {
                x: radius * angle.cos(),
                y: radius * angle.sin(),
            }
    })
}

/// Axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner
    pub min: CartesianVec2,
    /// Bottom-right corner
    pub max: CartesianVec2,
}

impl Rect {
    /// Tightest rectangle around some points; None if there are none
    pub fn enclosing(points: impl IntoIterator<Item = CartesianVec2>) -> Option<Self> {
        points.into_iter().fold(None, |rect, point| {
            Some(match rect {
                None => Rect {
                    min: point,
                    max: point,
                },
                Some(Rect { min, max }) => Rect {
                    min: CartesianVec2 {
                        x: min.x.min(point.x),
                        y: min.y.min(point.y),
                    },
                    max: CartesianVec2 {
                        x: max.x.max(point.x),
                        y: max.y.max(point.y),
                    },
                },
            })
        })
    }

    /// Grow every side outwards
    pub fn padded(&self, horizontal: f64, vertical: f64) -> Self {
        let pad = CartesianVec2 {
            x: horizontal,
            y: vertical,
        };
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Is the point inside, edges included?
    ///
    /// Tolerates floating point error of a fraction of a pixel
    pub fn contains(&self, point: CartesianVec2) -> bool {
        const EPSILON: f64 = 1e-6;
        point.x >= self.min.x - EPSILON
            && point.x <= self.max.x + EPSILON
            && point.y >= self.min.y - EPSILON
            && point.y <= self.max.y + EPSILON
    }

    /// Horizontal extent
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Vertical extent
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: CartesianVec2, b: CartesianVec2) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn projection_matches_flat_top_formula() {
        let radius = 30.0;
        let point = hex_to_pixel(Hex::new(2, -1), radius);
        assert!(close(
            point,
            CartesianVec2 {
                x: radius * 1.5 * 2.0,
                y: radius * (3.0_f64.sqrt() / 2.0 * 2.0 - 3.0_f64.sqrt()),
            }
        ));
        assert!(close(hex_to_pixel(Hex::zero(), radius), CartesianVec2::default()));
    }

    #[test]
    fn pixels_inside_a_hex_hit_it() {
        let radius = 30.0;
        for hex in Hex::zero().spiral(3) {
            let center = hex_to_pixel(hex, radius);
            assert_eq!(pixel_to_hex(center, radius), hex);
            // inner radius is sqrt(3)/2 * R, so anything within 0.8 R of the centre on the y axis is inside
            let near_edge = center
                + CartesianVec2 {
                    x: 0.0,
                    y: 0.8 * radius,
                };
            assert_eq!(pixel_to_hex(near_edge, radius), hex);
        }
    }

    #[test]
    fn corners_sit_on_the_radius() {
        let radius = 30.0;
        let hex = Hex::new(1, 1);
        let center = hex_to_pixel(hex, radius);
        for corner in hex_corners(hex, radius) {
            let offset = corner - center;
            assert!(((offset.x * offset.x + offset.y * offset.y).sqrt() - radius).abs() < 1e-9);
        }
        assert!(close(
            hex_corners(hex, radius)[0],
            center + CartesianVec2 { x: radius, y: 0.0 }
        ));
    }

    #[test]
    fn rect_encloses_and_pads() {
        let rect = Rect::enclosing([
            CartesianVec2 { x: 1.0, y: 5.0 },
            CartesianVec2 { x: -2.0, y: 3.0 },
        ])
        .unwrap();
        assert_eq!(rect.width(), 3.0);
        assert_eq!(rect.height(), 2.0);
        let padded = rect.padded(1.0, 2.0);
        assert!(padded.contains(CartesianVec2 { x: -3.0, y: 7.0 }));
        assert!(!padded.contains(CartesianVec2 { x: -3.1, y: 7.0 }));
        assert!(Rect::enclosing(Vec::<CartesianVec2>::new()).is_none());
    }
}
