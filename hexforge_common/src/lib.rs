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

//! Game state snapshot and wire types for Hexforge battle maps
//!
//! Should be platform agnostic (wasm32 vs x86_64)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::{
    collections::HashSet,
    fmt::{self, Display, Formatter},
    ops::{Add, AddAssign, Mul, Sub, SubAssign},
    str::FromStr,
};

use entity::{Entity, EntityId, EntityRef, Player, Vessel};
use location::Location;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod entity;
pub mod location;
pub mod message;
pub mod patch;

/// The authoritative game state, as broadcast by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// The phase the game is in
    #[serde(default)]
    pub phase: Phase,
    /// Who acts in what order; only meaningful in combat
    #[serde(default)]
    pub turn_order: Vec<EntityId>,
    /// Whose turn it is
    #[serde(default)]
    pub active_entity_id: Option<EntityId>,
    /// Where the party currently is
    #[serde(default)]
    pub location: Option<Location>,
    /// Places the party has already been; rendered for continuity
    #[serde(default)]
    pub discovered_locations: Vec<Location>,
    /// Player characters
    #[serde(default)]
    pub party: Vec<Player>,
    /// Hostile creatures
    #[serde(default)]
    pub enemies: Vec<Entity>,
    /// Non-player characters; never hostile, always in the way
    #[serde(default)]
    pub npcs: Vec<Entity>,
    /// Loot containers
    #[serde(default)]
    pub vessels: Vec<Vessel>,
}

impl GameState {
    /// Every entity, party first, then enemies, then npcs
    pub fn entities(&self) -> impl Iterator<Item = EntityRef<'_>> {
        self.party
            .iter()
            .map(EntityRef::Player)
            .chain(self.enemies.iter().map(EntityRef::Enemy))
            .chain(self.npcs.iter().map(EntityRef::Npc))
    }

    /// Look up any entity by id
    pub fn entity(&self, id: &EntityId) -> Option<EntityRef<'_>> {
        self.entities().find(|entity| entity.id() == id)
    }

    /// Look up a party member by id
    pub fn party_member(&self, id: &EntityId) -> Option<&Player> {
        self.party.iter().find(|player| &player.entity.id == id)
    }

    /// The current location followed by every discovered location
    ///
    /// A discovered location that is also the current one is only yielded once
    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        let current = self.location.as_ref();
        current.into_iter().chain(
            self.discovered_locations
                .iter()
                .filter(move |location| current.is_none_or(|current| !current.same_place(location))),
        )
    }

    /// Every hex that can be stood on, across all rendered locations
    pub fn walkable_hexes(&self) -> HashSet<Hex> {
        self.locations()
            .flat_map(|location| location.hexes.iter().copied())
            .collect()
    }

    /// Is this entity the one whose turn it is?
    pub fn is_active(&self, id: &EntityId) -> bool {
        self.active_entity_id.as_ref() == Some(id)
    }
}

/// The phase of play; determines who may move
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Free movement for the whole party
    #[default]
    Exploration,
    /// Initiative order; only the active entity moves
    Combat,
}

/// Errors from constructing hex coordinates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    /// q + r + s was not zero
    #[error("cube coordinate ({q}, {r}, {s}) does not sum to zero")]
    InvalidCube {
        /// q component
        q: i32,
        /// r component
        r: i32,
        /// s component
        s: i32,
    },
    /// Too far from the origin to do arithmetic on safely
    #[error("hex ({q}, {r}) is out of range")]
    OutOfRange {
        /// q component
        q: i32,
        /// r component
        r: i32,
    },
    /// A hex key string was not of the form "q,r"
    #[error("malformed hex key '{0}'")]
    BadKey(String),
}

/// A hex-grid axial coordinate
///
/// Flat-topped hexes
///
/// +q = down-right, +r = down; s is derived so that q + r + s = 0
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "WireHex", into = "WireHex")]
pub struct Hex {
    q: i32,
    r: i32,
}

/// Hex as sent over the wire; `s` is redundant and optional
#[derive(Serialize, Deserialize)]
struct WireHex {
    q: i32,
    r: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    s: Option<i32>,
}

impl TryFrom<WireHex> for Hex {
    type Error = HexError;

    fn try_from(value: WireHex) -> Result<Self, Self::Error> {
        let in_range = |c: i32| c.unsigned_abs() <= Hex::MAX_COORDINATE as u32;
        if !(in_range(value.q) && in_range(value.r)) {
            return Err(HexError::OutOfRange {
                q: value.q,
                r: value.r,
            });
        }
        match value.s {
            Some(s) => Hex::from_cube(value.q, value.r, s),
            None => Ok(Hex::new(value.q, value.r)),
        }
    }
}
impl From<Hex> for WireHex {
    fn from(value: Hex) -> Self {
        Self {
            q: value.q,
            r: value.r,
            s: Some(value.s()),
        }
    }
}

impl Add for Hex {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            q: self.q + rhs.q,
            r: self.r + rhs.r,
        }
    }
}
impl AddAssign for Hex {
    fn add_assign(&mut self, rhs: Self) {
        self.q += rhs.q;
        self.r += rhs.r;
    }
}
impl Sub for Hex {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            q: self.q - rhs.q,
            r: self.r - rhs.r,
        }
    }
}
impl SubAssign for Hex {
    fn sub_assign(&mut self, rhs: Self) {
        self.q -= rhs.q;
        self.r -= rhs.r;
    }
}
impl Hex {
    /// Create a hex from axial coordinates
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Largest |q| or |r| accepted off the wire
    ///
    /// Leaves headroom so distances and neighbour steps can't overflow
    pub const MAX_COORDINATE: i32 = 1 << 24;

    /// Create a hex from cube coordinates, checking that they sum to zero
    pub fn from_cube(q: i32, r: i32, s: i32) -> Result<Self, HexError> {
        if q.checked_add(r).and_then(|sum| sum.checked_add(s)) == Some(0) {
            Ok(Self { q, r })
        } else {
            Err(HexError::InvalidCube { q, r, s })
        }
    }

    /// Create the zero vector
    pub const fn zero() -> Self {
        Self { q: 0, r: 0 }
    }

    /// The q component
    pub fn q(&self) -> i32 {
        self.q
    }
    /// The r component
    pub fn r(&self) -> i32 {
        self.r
    }
    /// The derived s component
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Create the unit vector going up
    pub fn unit_up() -> Self {
        Self { q: 0, r: -1 }
    }
    /// Create the unit vector going up and right
    pub fn unit_up_right() -> Self {
        Self { q: 1, r: -1 }
    }
    /// Create the unit vector going down and right
    pub fn unit_down_right() -> Self {
        Self { q: 1, r: 0 }
    }
    /// Create the unit vector going down
    pub fn unit_down() -> Self {
        Self { q: 0, r: 1 }
    }
    /// Create the unit vector going down and left
    pub fn unit_down_left() -> Self {
        Self { q: -1, r: 1 }
    }
    /// Create the unit vector going up and left
    pub fn unit_up_left() -> Self {
        Self { q: -1, r: 0 }
    }

    /// Get the neighbours of this position
    ///
    /// Cube offsets, in order: (+1,0,-1) (+1,-1,0) (0,-1,+1) (-1,0,+1) (-1,+1,0) (0,+1,-1)
    pub fn neighbours(&self) -> [Self; 6] {
        [
            *self + Self::unit_down_right(),
            *self + Self::unit_up_right(),
            *self + Self::unit_up(),
            *self + Self::unit_up_left(),
            *self + Self::unit_down_left(),
            *self + Self::unit_down(),
        ]
    }

    /// Get the length of this vector, in cells
    ///
    /// Note: not the cartesian length
    pub fn norm(&self) -> i32 {
        self.q.abs().max(self.r.abs()).max(self.s().abs())
    }

    /// Number of single-hex steps between two hexes
    pub fn distance(&self, other: Hex) -> i32 {
        (*self - other).norm()
    }

    /// Is this hex exactly one step away from the other?
    pub fn is_adjacent(&self, other: Hex) -> bool {
        self.distance(other) == 1
    }

    /// Convert this vector to cartesian, for a hex of unit major radius
    pub fn cartesian(&self) -> CartesianVec2 {
        let x = 1.5 * self.q as f64;
        let y = 3.0_f64.sqrt() / 2.0 * self.q as f64 + 3.0_f64.sqrt() * self.r as f64;
        CartesianVec2 { x, y }
    }

    /// Construct a vector from fractional q and r
    pub fn round(q: f64, r: f64) -> Self {
        let s = -q - r;

        let mut q_int = q.round_ties_even() as i32;
        let mut r_int = r.round_ties_even() as i32;
        let s_int = s.round_ties_even() as i32;

        let dq = (q - q_int as f64).abs();
        let dr = (r - r_int as f64).abs();
        let ds = (s - s_int as f64).abs();

        if dq > dr && dq > ds {
            q_int = -r_int - s_int;
        } else if dr > ds {
            r_int = -q_int - s_int;
        }
        // s is derived
        Self { q: q_int, r: r_int }
    }

    /// Construct a vector from cartesian coordinates, for a hex of unit major radius
    pub fn from_cartesian(x: f64, y: f64) -> Self {
        let q = x * 2.0 / 3.0;
        let r = -x / 3.0 + y * 3.0_f64.sqrt() / 3.0;
        Self::round(q, r)
    }

    /// Every hex at most `radius` steps from this one
    pub fn spiral(&self, radius: i32) -> impl Iterator<Item = Hex> + '_ {
        (-radius..=radius).flat_map(move |q| {
            (i32::max(-radius, -q - radius)..=i32::min(radius, -q + radius))
                .map(move |r| *self + Hex::new(q, r))
        })
    }

    /// The "q,r" key used on the wire for hex sets
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl Display for Hex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

impl FromStr for Hex {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad_key = || HexError::BadKey(s.to_owned());
        let (q, r) = s.split_once(',').ok_or_else(bad_key)?;
        let q = q.trim().parse().map_err(|_| bad_key())?;
        let r = r.trim().parse().map_err(|_| bad_key())?;
        Ok(Hex::new(q, r))
    }
}

/// A cartesian vector, in pixels (or in hex radii before scaling)
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct CartesianVec2 {
    /// Rightwards
    pub x: f64,
    /// Downwards
    pub y: f64,
}

impl Add for CartesianVec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}
impl Sub for CartesianVec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
impl Mul<f64> for CartesianVec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}
impl CartesianVec2 {
    /// Nearest hex to this point, for a hex of unit major radius
    pub fn to_axial(&self) -> Hex {
        Hex::from_cartesian(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(q: i32, r: i32, s: i32) -> Hex {
        Hex::from_cube(q, r, s).unwrap()
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_diagonal() {
        let origin = Hex::zero();
        for a in origin.spiral(4) {
            assert_eq!(a.distance(a), 0);
            for b in origin.spiral(4) {
                assert_eq!(a.distance(b), b.distance(a));
            }
        }
        assert_eq!(origin.distance(cube(2, -1, -1)), 2);
    }

    #[test]
    fn origin_has_six_unit_neighbours() {
        let neighbours = Hex::zero().neighbours();
        let distinct = neighbours.iter().collect::<HashSet<_>>();
        assert_eq!(distinct.len(), 6);
        for neighbour in neighbours {
            assert_eq!(neighbour.q() + neighbour.r() + neighbour.s(), 0);
            assert_eq!(Hex::zero().distance(neighbour), 1);
        }
        assert_eq!(neighbours[0], cube(1, 0, -1));
        assert_eq!(neighbours[5], cube(0, 1, -1));
    }

    #[test]
    fn from_cube_rejects_nonzero_sum() {
        assert_eq!(
            Hex::from_cube(1, 1, 1),
            Err(HexError::InvalidCube { q: 1, r: 1, s: 1 })
        );
    }

    #[test]
    fn cartesian_round_trips_through_rounding() {
        for hex in Hex::zero().spiral(5) {
            let point = hex.cartesian();
            assert_eq!(point.to_axial(), hex);
            // a point just inside the hex still resolves to it
            let nudged = point + CartesianVec2 { x: 0.3, y: -0.2 };
            assert_eq!(nudged.to_axial(), hex);
        }
    }

    #[test]
    fn spiral_counts_match_closed_form() {
        for radius in 0..8 {
            assert_eq!(
                Hex::zero().spiral(radius).count() as i32,
                1 + 3 * radius * (radius + 1)
            );
        }
    }

    #[test]
    fn keys_parse_back() {
        let hex = cube(-3, 5, -2);
        assert_eq!(hex.key(), "-3,5");
        assert_eq!("-3,5".parse::<Hex>(), Ok(hex));
        assert!("3;5".parse::<Hex>().is_err());
    }

    #[test]
    fn wire_form_checks_invariant() {
        let hex: Hex = serde_json::from_str(r#"{"q":2,"r":-1,"s":-1}"#).unwrap();
        assert_eq!(hex, Hex::new(2, -1));
        let derived: Hex = serde_json::from_str(r#"{"q":2,"r":-1}"#).unwrap();
        assert_eq!(derived, hex);
        assert!(serde_json::from_str::<Hex>(r#"{"q":2,"r":-1,"s":0}"#).is_err());
        assert!(serde_json::from_str::<Hex>(r#"{"q":2147483647,"r":1,"s":0}"#).is_err());
        assert!(serde_json::from_str::<Hex>(r#"{"q":2147483647,"r":1}"#).is_err());
        assert!(
            serde_json::from_str::<Hex>(r#"{"q":2147483647,"r":-2147483647,"s":0}"#).is_err()
        );
        assert_eq!(
            Hex::from_cube(i32::MIN, -1, 1),
            Err(HexError::InvalidCube {
                q: i32::MIN,
                r: -1,
                s: 1
            })
        );
        assert_eq!(
            serde_json::to_value(hex).unwrap(),
            serde_json::json!({"q": 2, "r": -1, "s": -1})
        );
    }
}
