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

//! Which hexes a party member can move to this turn

use std::collections::{HashSet, VecDeque};

use hexforge_common::{
    GameState, Hex,
    entity::{EntityId, EntityKind, FEET_PER_HEX},
};

/// The map as seen by one moving entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Terrain {
    /// Hexes that can be stood on
    pub walkable: HashSet<Hex>,
    /// Hexes that can't be entered: living enemies and any npc
    pub blocked: HashSet<Hex>,
    /// Hexes with a living party member; passable but not a place to stop
    pub allies: HashSet<Hex>,
}

impl Terrain {
    /// Build the terrain around the given mover; the mover doesn't get in its own way
    pub fn for_mover(state: &GameState, mover: &EntityId) -> Self {
        let mut terrain = Self {
            walkable: state.walkable_hexes(),
            ..Self::default()
        };
        for entity in state.entities() {
            if entity.id() == mover {
                continue;
            }
            let Some(position) = entity.entity().position else {
                continue;
            };
            if entity.blocks_movement() {
                terrain.blocked.insert(position);
            } else if entity.kind() == EntityKind::Player && entity.entity().is_alive() {
                terrain.allies.insert(position);
            }
        }
        terrain
    }

    /// Can a moving entity step into this hex?
    pub fn can_enter(&self, hex: Hex) -> bool {
        self.walkable.contains(&hex) && !self.blocked.contains(&hex)
    }
}

/// Everything the solver needs about one entity's move
#[derive(Debug, Clone, Copy)]
pub struct MoveQuery<'a> {
    /// Where the entity stands now
    pub position: Option<Hex>,
    /// Feet per turn
    pub speed: Option<u32>,
    /// Hexes already plotted, in order
    pub path: &'a [Hex],
    /// What's in the way
    pub terrain: &'a Terrain,
}

/// Hexes the selected entity could move to, or click back to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachableSet(HashSet<Hex>);

impl ReachableSet {
    /// Is this hex a legal click target?
    pub fn contains(&self, hex: Hex) -> bool {
        self.0.contains(&hex)
    }

    /// How many hexes are reachable
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Nothing reachable, e.g. nobody selected
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every reachable hex, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = Hex> + '_ {
        self.0.iter().copied()
    }

    /// The "q,r" wire keys of every reachable hex
    pub fn keys(&self) -> HashSet<String> {
        self.0.iter().map(Hex::key).collect()
    }
}

/// Breadth-first search outwards from the tip of the plotted path
///
/// All steps cost the same, so search depth is path cost and BFS finds every
/// hex within the remaining budget. The entity's own hex and the plotted path
/// are included so the path can be clicked back along, except for hexes
/// held by an ally, which can be passed through but never ended on.
pub fn reachable(query: &MoveQuery) -> ReachableSet {
    let (Some(position), Some(speed)) = (query.position, query.speed) else {
        return ReachableSet::default();
    };
    let budget = (speed / FEET_PER_HEX) as usize;
    let remaining = budget.saturating_sub(query.path.len());
    let start = query.path.last().copied().unwrap_or(position);

    let mut seen = query.path.iter().copied().collect::<HashSet<_>>();
    seen.insert(start);
    let mut frontier = VecDeque::from([(start, 0)]);
    let mut found = HashSet::new();

    while let Some((hex, steps)) = frontier.pop_front() {
        if steps >= remaining {
            continue;
        }
        for next in hex.neighbours() {
            if seen.contains(&next) || !query.terrain.can_enter(next) {
                continue;
            }
            seen.insert(next);
            found.insert(next);
            frontier.push_back((next, steps + 1));
        }
    }

    found.extend(query.path.iter().copied());
    // allies can be walked through, not stopped on
    found.retain(|hex| !query.terrain.allies.contains(hex));
    found.insert(position);
    ReachableSet(found)
}

/// Reachable set for a party member with the given plotted path
///
/// Anyone not in the party gets nothing
pub fn reachable_for(state: &GameState, entity_id: &EntityId, path: &[Hex]) -> ReachableSet {
    let Some(player) = state.party_member(entity_id) else {
        return ReachableSet::default();
    };
    let terrain = Terrain::for_mover(state, entity_id);
    reachable(&MoveQuery {
        position: player.entity.position,
        speed: player.entity.speed,
        path,
        terrain: &terrain,
    })
}
