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

//! Creatures on the battle map and the loot lying around it

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, IntoStaticStr};

use crate::Hex;

/// Feet of movement per hex
pub const FEET_PER_HEX: u32 = 5;

/// Refers to an entity; assigned by the server
#[repr(transparent)]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// View the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields shared by every kind of entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Identity
    pub id: EntityId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Where it stands; absent if not on the map
    #[serde(default)]
    pub position: Option<Hex>,
    /// Current hit points; absent means no health bar
    #[serde(default)]
    pub hp_current: Option<i32>,
    /// Maximum hit points
    #[serde(default)]
    pub hp_max: Option<i32>,
    /// Feet per turn
    #[serde(default)]
    pub speed: Option<u32>,
    /// Armour class
    #[serde(default)]
    pub ac: Option<i32>,
}

impl Entity {
    /// How many hexes this entity may move in a turn
    pub fn movement_budget(&self) -> Option<u32> {
        self.speed.map(|speed| speed / FEET_PER_HEX)
    }

    /// Entities without tracked hit points are always alive
    pub fn is_alive(&self) -> bool {
        self.hp_current.is_none_or(|hp| hp > 0)
    }

    /// Fraction of health remaining, if both hit point values are known
    ///
    /// Clamped to [0, 1]
    pub fn health_fraction(&self) -> Option<f64> {
        match (self.hp_current, self.hp_max) {
            (Some(current), Some(max)) if max > 0 => {
                Some((current as f64 / max as f64).clamp(0.0, 1.0))
            }
            _ => None,
        }
    }
}

/// A player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Common entity data
    #[serde(flatten)]
    pub entity: Entity,
    /// Controlled by the game master AI rather than a human
    #[serde(default)]
    pub is_ai: bool,
    /// Initiative roll, once combat has started
    #[serde(default)]
    pub initiative: Option<i32>,
}

/// Which collection an entity comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    /// Member of the party
    Player,
    /// Hostile
    Enemy,
    /// Neutral
    Npc,
}

/// A borrowed entity of any kind
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    /// Member of the party
    Player(&'a Player),
    /// Hostile
    Enemy(&'a Entity),
    /// Neutral
    Npc(&'a Entity),
}

impl<'a> EntityRef<'a> {
    /// The common entity data
    pub fn entity(&self) -> &'a Entity {
        match self {
            EntityRef::Player(player) => &player.entity,
            EntityRef::Enemy(entity) | EntityRef::Npc(entity) => entity,
        }
    }

    /// The entity's id
    pub fn id(&self) -> &'a EntityId {
        &self.entity().id
    }

    /// Which collection this came from
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Player(_) => EntityKind::Player,
            EntityRef::Enemy(_) => EntityKind::Enemy,
            EntityRef::Npc(_) => EntityKind::Npc,
        }
    }

    /// Does this entity stop movement through its hex?
    ///
    /// Living enemies and every npc block; party members and corpses don't
    pub fn blocks_movement(&self) -> bool {
        match self {
            EntityRef::Player(_) => false,
            EntityRef::Enemy(entity) => entity.is_alive(),
            EntityRef::Npc(_) => true,
        }
    }
}

/// A loot container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    /// Identity
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Where it lies; absent if carried off-map
    #[serde(default)]
    pub position: Option<Hex>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(hp_current: Option<i32>, hp_max: Option<i32>, speed: Option<u32>) -> Entity {
        Entity {
            id: "goblin-1".into(),
            name: "Goblin".to_owned(),
            position: Some(Hex::zero()),
            hp_current,
            hp_max,
            speed,
            ac: Some(13),
        }
    }

    #[test]
    fn budget_rounds_down() {
        assert_eq!(entity(None, None, Some(30)).movement_budget(), Some(6));
        assert_eq!(entity(None, None, Some(34)).movement_budget(), Some(6));
        assert_eq!(entity(None, None, Some(4)).movement_budget(), Some(0));
        assert_eq!(entity(None, None, None).movement_budget(), None);
    }

    #[test]
    fn untracked_health_is_alive() {
        assert!(entity(None, None, None).is_alive());
        assert!(entity(Some(1), Some(7), None).is_alive());
        assert!(!entity(Some(0), Some(7), None).is_alive());
        assert!(!entity(Some(-3), Some(7), None).is_alive());
    }

    #[test]
    fn health_bar_needs_both_values() {
        assert_eq!(entity(Some(3), None, None).health_fraction(), None);
        assert_eq!(entity(Some(3), Some(0), None).health_fraction(), None);
        assert_eq!(entity(Some(3), Some(12), None).health_fraction(), Some(0.25));
        assert_eq!(entity(Some(-5), Some(12), None).health_fraction(), Some(0.0));
    }

    #[test]
    fn corpses_and_allies_do_not_block() {
        let dead = entity(Some(0), Some(7), None);
        let alive = entity(Some(7), Some(7), None);
        assert!(!EntityRef::Enemy(&dead).blocks_movement());
        assert!(EntityRef::Enemy(&alive).blocks_movement());
        assert!(EntityRef::Npc(&dead).blocks_movement());
        let player = Player {
            entity: alive,
            is_ai: false,
            initiative: None,
        };
        assert!(!EntityRef::Player(&player).blocks_movement());
    }

    #[test]
    fn player_fields_flatten() {
        let player: Player = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "name": "Aria",
            "position": {"q": 1, "r": 0, "s": -1},
            "speed": 30,
            "is_ai": true,
            "initiative": 14
        }))
        .unwrap();
        assert_eq!(player.entity.id.as_str(), "p1");
        assert_eq!(player.entity.position, Some(Hex::new(1, 0)));
        assert!(player.is_ai);
        assert_eq!(player.initiative, Some(14));
    }
}
