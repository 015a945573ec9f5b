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

//! Scenes the party moves through

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::Hex;

/// A named scene on the battle map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Identity; may be blank for ad-hoc scenes
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Hexes that can be stood on
    #[serde(default)]
    pub hexes: Vec<Hex>,
    /// Doors, chests, levers and the like
    #[serde(default)]
    pub interactables: Vec<Interactable>,
    /// Where each party slot appears on arrival
    #[serde(default)]
    pub party_spawn: BTreeMap<String, Hex>,
}

impl Location {
    /// Do these two describe the same place?
    ///
    /// Compares ids, or names if either id is blank
    pub fn same_place(&self, other: &Location) -> bool {
        if self.id.is_empty() || other.id.is_empty() {
            self.name == other.name
        } else {
            self.id == other.id
        }
    }

    /// Every door in this location
    pub fn doors(&self) -> impl Iterator<Item = &Interactable> {
        self.interactables
            .iter()
            .filter(|interactable| interactable.kind == InteractableKind::Door)
    }

    /// Hexes occupied by a door
    pub fn door_positions(&self) -> HashSet<Hex> {
        self.doors()
            .filter_map(|door| door.position)
            .collect()
    }
}

/// Something in a location the party can interact with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interactable {
    /// Identity; doors shared between rooms share this
    #[serde(default)]
    pub id: Option<String>,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// What sort of thing this is
    #[serde(rename = "type")]
    pub kind: InteractableKind,
    /// Open, closed, locked, ...
    #[serde(default)]
    pub state: InteractableState,
    /// Where it is, if it occupies a hex
    #[serde(default)]
    pub position: Option<Hex>,
}

impl Interactable {
    /// Should this be drawn open?
    pub fn is_open(&self) -> bool {
        self.state == InteractableState::Open
    }
}

/// Kinds of interactable the map draws differently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractableKind {
    /// Connects two locations
    Door,
    /// Anything the map doesn't draw specially
    #[serde(other)]
    Other,
}

/// States an interactable can be in
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractableState {
    /// Passable
    Open,
    /// Shut but not locked
    #[default]
    Closed,
    /// Shut and locked
    Locked,
    /// Anything else the server reports
    #[serde(other)]
    Other,
}
