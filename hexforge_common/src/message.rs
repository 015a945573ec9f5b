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

//! Messages exchanged with the game server about the battle map

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::IntoStaticStr;

use crate::{Hex, entity::EntityId, patch::PatchOperation};

/// Something the server tells every client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServerEvent {
    /// A complete game state; replaces whatever the client had
    ///
    /// Kept as raw JSON so that later patches apply against exactly what the server sent
    StateReplace(Value),
    /// Changes against the last state
    StatePatch(Vec<PatchOperation>),
    /// An entity moved; play it back step by step
    MoveAnimation {
        /// Who moved
        entity_id: EntityId,
        /// Hexes passed through, ending at the destination
        path: Vec<Hex>,
    },
    /// A move this client requested was refused
    MoveRejected {
        /// Who was meant to move
        entity_id: EntityId,
        /// Why, if the server says
        #[serde(default)]
        reason: Option<String>,
    },
}

/// Something a client asks the server to do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "command", content = "data", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClientCommand {
    /// Move an entity along a path
    MoveEntity(MoveEntity),
}

/// Payload of [`ClientCommand::MoveEntity`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveEntity {
    /// Who moves
    pub entity_id: EntityId,
    /// Destination q
    pub q: i32,
    /// Destination r
    pub r: i32,
    /// Destination s
    pub s: i32,
    /// Hexes to pass through, ending at the destination
    pub path: Vec<Hex>,
}

impl MoveEntity {
    /// Build a move to the end of a non-empty path
    ///
    /// Returns None if the path is empty
    pub fn along(entity_id: EntityId, path: Vec<Hex>) -> Option<Self> {
        let destination = *path.last()?;
        Some(Self {
            entity_id,
            q: destination.q(),
            r: destination.r(),
            s: destination.s(),
            path,
        })
    }

    /// Where the entity ends up
    pub fn destination(&self) -> Hex {
        Hex::new(self.q, self.r)
    }
}
