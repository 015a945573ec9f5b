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

//! Where everything goes on the map: room outlines, doors, and tokens

use std::{
    collections::{HashMap, HashSet},
    f64::consts::PI,
};

use hexforge_common::{
    CartesianVec2, GameState, Hex,
    entity::{EntityId, EntityKind},
    location::Location,
};

use crate::map::geometry::{Rect, hex_to_pixel};

/// Pixel rectangle drawn around a location
///
/// Encloses the centres of its walkable hexes (less any door hexes, which sit
/// on the boundary between rooms) and its party spawn points, padded so whole
/// hexes fit inside. None if the location has no hexes at all.
pub fn room_bounds(location: &Location, radius: f64) -> Option<Rect> {
    let doors = location.door_positions();
    let mut interior = location
        .hexes
        .iter()
        .filter(|hex| !doors.contains(hex))
        .peekable();
    let hexes: Vec<Hex> = if interior.peek().is_some() {
        interior.copied().collect()
    } else {
        location.hexes.clone()
    };

    let points = hexes
        .iter()
        .chain(location.party_spawn.values())
        .map(|&hex| hex_to_pixel(hex, radius));
    Rect::enclosing(points).map(|rect| rect.padded(1.5 * radius, 3.0_f64.sqrt() * radius))
}

/// A door, drawn once however many rooms list it
#[derive(Debug, Clone, PartialEq)]
pub struct DoorMarker {
    /// Door hex
    pub hex: Hex,
    /// Pixel centre
    pub center: CartesianVec2,
    /// Drawn open or shut
    pub open: bool,
    /// Display name
    pub name: Option<String>,
}

/// Every positioned door across the given locations, deduplicated
///
/// Doors are the same if they share an id; doors without one are the same if
/// they share a hex. The first occurrence wins.
pub fn collect_doors<'a>(
    locations: impl IntoIterator<Item = &'a Location>,
    radius: f64,
) -> Vec<DoorMarker> {
    #[derive(PartialEq, Eq, Hash)]
    enum DoorKey<'d> {
        Id(&'d str),
        Position(Hex),
    }

    let mut seen = HashSet::new();
    let mut doors = Vec::new();
    for door in locations.into_iter().flat_map(Location::doors) {
        let Some(hex) = door.position else {
            continue;
        };
        let key = match door.id.as_deref() {
            Some(id) if !id.is_empty() => DoorKey::Id(id),
            _ => DoorKey::Position(hex),
        };
        if !seen.insert(key) {
            continue;
        }
        doors.push(DoorMarker {
            hex,
            center: hex_to_pixel(hex, radius),
            open: door.is_open(),
            name: door.name.clone(),
        });
    }
    doors
}

/// Offsets from a hex centre for `count` tokens sharing it
///
/// One sits in the middle; two side by side; three on a triangle; more put
/// the first in the middle and the rest in a ring
pub fn occupancy_offsets(count: usize, radius: f64) -> Vec<CartesianVec2> {
    let on_circle = |ring: f64, angle: f64| CartesianVec2 {
        x: ring * angle.cos(),
        y: ring * angle.sin(),
    };
    match count {
        0 => Vec::new(),
        1 => vec![CartesianVec2::default()],
        2 => vec![
            CartesianVec2 {
                x: -0.3 * radius,
                y: 0.0,
            },
            CartesianVec2 {
                x: 0.3 * radius,
                y: 0.0,
            },
        ],
        3 => [-90.0_f64, 30.0, 150.0]
            .into_iter()
            .map(|degrees| on_circle(0.35 * radius, degrees.to_radians()))
            .collect(),
        _ => {
            let ring = count - 1;
            std::iter::once(CartesianVec2::default())
                .chain((0..ring).map(|i| {
                    on_circle(
                        0.45 * radius,
                        -PI / 2.0 + 2.0 * PI * i as f64 / ring as f64,
                    )
                }))
                .collect()
        }
    }
}

/// Token radius when sharing a hex with `count - 1` others
pub fn token_radius(count: usize, radius: f64) -> f64 {
    match count {
        0 | 1 => 0.6 * radius,
        2 | 3 => 0.35 * radius,
        _ => 0.25 * radius,
    }
}

/// An entity as drawn
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Who this is
    pub entity_id: EntityId,
    /// Which collection it came from; picks the colour
    pub kind: EntityKind,
    /// Label
    pub name: String,
    /// Hex it is drawn in; mid-animation this may differ from the game state
    pub hex: Hex,
    /// Pixel centre, offset if the hex is shared
    pub center: CartesianVec2,
    /// Drawn size
    pub radius: f64,
    /// Health bar fill, if both hit point values are known
    pub health: Option<f64>,
    /// Drawn greyed out if not
    pub alive: bool,
}

/// A loot container as drawn
#[derive(Debug, Clone, PartialEq)]
pub struct VesselMarker {
    /// Identity
    pub id: String,
    /// Label
    pub name: String,
    /// Hex it lies in
    pub hex: Hex,
    /// Pixel centre
    pub center: CartesianVec2,
}

/// A location as drawn
#[derive(Debug, Clone, PartialEq)]
pub struct RoomLayout {
    /// Label
    pub name: String,
    /// Outline
    pub bounds: Rect,
    /// Walkable hexes
    pub hexes: Vec<Hex>,
    /// Where the party is; other rooms are dimmed
    pub current: bool,
}

/// Everything on the map for one frame, in pixel space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneLayout {
    /// Current room first, then discovered rooms
    pub rooms: Vec<RoomLayout>,
    /// Every door, once
    pub doors: Vec<DoorMarker>,
    /// Loot containers on the map
    pub vessels: Vec<VesselMarker>,
    /// Entities on the map, party then enemies then npcs
    pub tokens: Vec<Token>,
}

impl SceneLayout {
    /// Lay out a game state
    ///
    /// `overrides` gives drawn positions for entities mid-animation
    pub fn build(state: &GameState, radius: f64, overrides: &HashMap<EntityId, Hex>) -> Self {
        let rooms = state
            .locations()
            .enumerate()
            .filter_map(|(index, location)| {
                Some(RoomLayout {
                    name: location.name.clone(),
                    bounds: room_bounds(location, radius)?,
                    hexes: location.hexes.clone(),
                    current: index == 0 && state.location.is_some(),
                })
            })
            .collect();

        let doors = collect_doors(state.locations(), radius);

        let vessels = state
            .vessels
            .iter()
            .filter_map(|vessel| {
                let hex = vessel.position?;
                Some(VesselMarker {
                    id: vessel.id.clone(),
                    name: vessel.name.clone(),
                    hex,
                    center: hex_to_pixel(hex, radius),
                })
            })
            .collect();

        let placed = state
            .entities()
            .filter_map(|entity| {
                let hex = overrides
                    .get(entity.id())
                    .copied()
                    .or(entity.entity().position)?;
                Some((entity, hex))
            })
            .collect::<Vec<_>>();
        let mut occupancy = HashMap::<Hex, usize>::new();
        for (_, hex) in &placed {
            *occupancy.entry(*hex).or_default() += 1;
        }
        let mut slots = HashMap::<Hex, usize>::new();
        let tokens = placed
            .into_iter()
            .map(|(entity, hex)| {
                let count = occupancy[&hex];
                let slot = slots.entry(hex).or_default();
                let offset = occupancy_offsets(count, radius)[*slot];
                *slot += 1;
                let data = entity.entity();
                Token {
                    entity_id: data.id.clone(),
                    kind: entity.kind(),
                    name: data.name.clone(),
                    hex,
                    center: hex_to_pixel(hex, radius) + offset,
                    radius: token_radius(count, radius),
                    health: data.health_fraction(),
                    alive: data.is_alive(),
                }
            })
            .collect();

        Self {
            rooms,
            doors,
            vessels,
            tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const RADIUS: f64 = 30.0;

    fn location(value: serde_json::Value) -> Location {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn bounds_contain_every_hex_and_spawn() {
        let room = location(json!({
            "id": "crypt",
            "name": "Crypt",
            "hexes": [{"q": 0, "r": 0}, {"q": 1, "r": 0}, {"q": 2, "r": -1}, {"q": -1, "r": 2}],
            "party_spawn": {"0": {"q": -3, "r": 1}}
        }));
        let bounds = room_bounds(&room, RADIUS).unwrap();
        for hex in room.hexes.iter().chain(room.party_spawn.values()) {
            assert!(bounds.contains(hex_to_pixel(*hex, RADIUS)), "{hex}");
        }
    }

    #[test]
    fn bounds_skip_doors_unless_nothing_else_is_left() {
        let room = location(json!({
            "name": "Corridor",
            "hexes": [{"q": 0, "r": 0}, {"q": 5, "r": 0}],
            "interactables": [{"type": "door", "position": {"q": 5, "r": 0}}]
        }));
        let bounds = room_bounds(&room, RADIUS).unwrap();
        assert!((bounds.width() - 3.0 * RADIUS).abs() < 1e-9);
        assert!((bounds.height() - 2.0 * 3.0_f64.sqrt() * RADIUS).abs() < 1e-9);

        let doorway = location(json!({
            "name": "Doorway",
            "hexes": [{"q": 5, "r": 0}],
            "interactables": [{"type": "door", "position": {"q": 5, "r": 0}}]
        }));
        let bounds = room_bounds(&doorway, RADIUS).unwrap();
        assert!(bounds.contains(hex_to_pixel(Hex::new(5, 0), RADIUS)));

        assert_eq!(room_bounds(&location(json!({"name": "Void"})), RADIUS), None);
    }

    #[test]
    fn shared_doors_are_drawn_once() {
        let west = location(json!({
            "id": "west",
            "hexes": [{"q": 0, "r": 0}],
            "interactables": [
                {"id": "d1", "type": "door", "state": "open", "position": {"q": 1, "r": 0}},
                {"type": "door", "position": {"q": 0, "r": 1}},
                {"type": "chest", "position": {"q": 0, "r": 0}}
            ]
        }));
        let east = location(json!({
            "id": "east",
            "hexes": [{"q": 2, "r": 0}],
            "interactables": [
                {"id": "d1", "type": "door", "state": "closed", "position": {"q": 1, "r": 0}},
                {"type": "door", "position": {"q": 0, "r": 1}},
                {"id": "d2", "type": "door"}
            ]
        }));
        let doors = collect_doors([&west, &east], RADIUS);
        assert_eq!(doors.len(), 2);
        assert!(doors[0].open);
        assert_eq!(doors[0].hex, Hex::new(1, 0));
        assert_eq!(doors[1].hex, Hex::new(0, 1));
    }

    #[test]
    fn offsets_by_count() {
        assert!(occupancy_offsets(0, RADIUS).is_empty());
        assert_eq!(occupancy_offsets(1, RADIUS), vec![CartesianVec2::default()]);

        let pair = occupancy_offsets(2, RADIUS);
        assert_eq!(pair[0].x, -pair[1].x);
        assert_eq!(pair[0].y, 0.0);

        let triangle = occupancy_offsets(3, RADIUS);
        assert!((triangle[0].x).abs() < 1e-9);
        assert!(triangle[0].y < 0.0);
        assert!((triangle[1].x + triangle[2].x).abs() < 1e-9);

        for count in 4..=8 {
            let offsets = occupancy_offsets(count, RADIUS);
            assert_eq!(offsets.len(), count);
            assert_eq!(offsets[0], CartesianVec2::default());
            for offset in &offsets[1..] {
                let distance = (offset.x * offset.x + offset.y * offset.y).sqrt();
                assert!((distance - 0.45 * RADIUS).abs() < 1e-9);
                // stays inside the hex
                assert!(distance < RADIUS);
            }
        }
    }

    #[test]
    fn scene_stacks_shared_hexes_and_follows_overrides() {
        let state: GameState = serde_json::from_value(json!({
            "location": {
                "id": "hall",
                "name": "Hall",
                "hexes": [{"q": 0, "r": 0}, {"q": 1, "r": 0}]
            },
            "discovered_locations": [
                {"id": "hall", "name": "Hall", "hexes": [{"q": 0, "r": 0}]},
                {"id": "cellar", "name": "Cellar", "hexes": [{"q": 5, "r": 5}]}
            ],
            "party": [
                {"id": "aria", "name": "Aria", "position": {"q": 0, "r": 0}, "hp_current": 5, "hp_max": 10},
                {"id": "bram", "name": "Bram", "position": {"q": 0, "r": 0}}
            ],
            "enemies": [{"id": "gob", "name": "Goblin", "position": {"q": 1, "r": 0}}],
            "npcs": [{"id": "ghost", "name": "Ghost"}],
            "vessels": [
                {"id": "urn", "name": "Urn", "position": {"q": 1, "r": 0}},
                {"id": "bag", "name": "Bag"}
            ]
        }))
        .unwrap();

        let scene = SceneLayout::build(&state, RADIUS, &HashMap::new());
        assert_eq!(scene.rooms.len(), 2);
        assert!(scene.rooms[0].current);
        assert!(!scene.rooms[1].current);
        assert_eq!(scene.vessels.len(), 1);
        assert_eq!(scene.tokens.len(), 3);
        assert_eq!(scene.tokens[0].health, Some(0.5));
        assert_eq!(scene.tokens[1].health, None);
        assert!(scene.tokens[0].center.x < scene.tokens[1].center.x);
        assert_eq!(scene.tokens[2].center, hex_to_pixel(Hex::new(1, 0), RADIUS));

        let overrides = HashMap::from([(EntityId::from("bram"), Hex::new(1, 0))]);
        let scene = SceneLayout::build(&state, RADIUS, &overrides);
        assert_eq!(scene.tokens[0].center, hex_to_pixel(Hex::zero(), RADIUS));
        assert_eq!(scene.tokens[1].hex, Hex::new(1, 0));
    }
}
