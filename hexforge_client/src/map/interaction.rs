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

//! Selecting a party member, plotting its path and committing the move
//!
//! Everything here is advisory: the server decides whether a move is legal.
//! Inputs that don't make sense in the current state are ignored.

use hexforge_common::{
    GameState, Hex, Phase,
    entity::EntityId,
    message::{ClientCommand, MoveEntity},
};

use crate::map::reachability::{ReachableSet, Terrain};

/// A party member picked out for moving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Who is selected
    pub entity_id: EntityId,
    /// Where it stood when selected; the path starts next to this
    pub origin: Hex,
    /// Hexes plotted so far, origin excluded
    pub path: Vec<Hex>,
    last_hover: Option<Hex>,
}

impl Selection {
    fn new(entity_id: EntityId, origin: Hex) -> Self {
        Self {
            entity_id,
            origin,
            path: Vec::new(),
            last_hover: None,
        }
    }

    /// The end of the plotted path, or the origin if nothing is plotted
    pub fn tip(&self) -> Hex {
        self.path.last().copied().unwrap_or(self.origin)
    }
}

/// A move sent to the server and not yet confirmed
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMove {
    /// What was sent
    pub command: MoveEntity,
    /// The selection as it was before the commit; restored on rejection
    pub previous: Selection,
}

/// Where the player is in the select, plot, commit cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    /// Nothing selected
    #[default]
    Idle,
    /// A party member is selected and a path may be plotted
    Selected(Selection),
    /// A move has been sent; input behaves as in idle
    Committed(PendingMove),
}

/// May the local player pick this entity up and move it?
///
/// Living, human-controlled party members only; in combat it must also be
/// their turn
pub fn is_selectable(state: &GameState, entity_id: &EntityId) -> bool {
    let Some(player) = state.party_member(entity_id) else {
        return false;
    };
    player.entity.is_alive()
        && !player.is_ai
        && (state.phase != Phase::Combat || state.is_active(entity_id))
}

impl Interaction {
    /// The current selection, if any
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            Interaction::Selected(selection) => Some(selection),
            _ => None,
        }
    }

    /// Id of the selected entity
    pub fn selected(&self) -> Option<&EntityId> {
        self.selection().map(|selection| &selection.entity_id)
    }

    /// The plotted path; empty if nothing is selected
    pub fn path(&self) -> &[Hex] {
        self.selection()
            .map(|selection| selection.path.as_slice())
            .unwrap_or_default()
    }

    /// The move awaiting confirmation, if any
    pub fn pending(&self) -> Option<&PendingMove> {
        match self {
            Interaction::Committed(pending) => Some(pending),
            _ => None,
        }
    }

    /// A party token was clicked
    ///
    /// Selects it with an empty path, or deselects it if it was already
    /// selected. Ineligible entities are ignored.
    pub fn click_entity(&mut self, state: &GameState, entity_id: &EntityId) {
        if self.selected() == Some(entity_id) {
            *self = Interaction::Idle;
            return;
        }
        if !is_selectable(state, entity_id) {
            return;
        }
        let Some(origin) = state
            .party_member(entity_id)
            .and_then(|player| player.entity.position)
        else {
            return;
        };
        *self = Interaction::Selected(Selection::new(entity_id.clone(), origin));
    }

    /// The pointer moved onto a hex
    ///
    /// Grows or shrinks the plotted path:
    /// - the origin clears it
    /// - a hex already on it cuts it back to just before that hex
    /// - a free hex next to the tip is appended, budget allowing
    ///
    /// Hovering the same hex twice in a row changes nothing.
    pub fn hover(&mut self, state: &GameState, hex: Hex) {
        let Interaction::Selected(selection) = self else {
            return;
        };
        if selection.last_hover == Some(hex) {
            return;
        }
        selection.last_hover = Some(hex);

        if hex == selection.origin {
            selection.path.clear();
        } else if let Some(index) = selection.path.iter().position(|&step| step == hex) {
            selection.path.truncate(index);
        } else if selection.tip().is_adjacent(hex) {
            let Some(budget) = state
                .party_member(&selection.entity_id)
                .and_then(|player| player.entity.movement_budget())
            else {
                return;
            };
            if selection.path.len() >= budget as usize {
                return;
            }
            if Terrain::for_mover(state, &selection.entity_id).can_enter(hex) {
                selection.path.push(hex);
            }
        }
    }

    /// A hex was clicked
    ///
    /// If it's reachable, commits the move and returns the command to send:
    /// the whole path when the tip was clicked, otherwise a single step
    /// straight to the clicked hex
    pub fn click_hex(&mut self, hex: Hex, reachable: &ReachableSet) -> Option<ClientCommand> {
        let Interaction::Selected(selection) = self else {
            return None;
        };
        if hex == selection.origin || !reachable.contains(hex) {
            return None;
        }
        let path = if selection.path.last() == Some(&hex) {
            selection.path.clone()
        } else {
            vec![hex]
        };
        let command = MoveEntity::along(selection.entity_id.clone(), path)?;
        let previous = selection.clone();
        *self = Interaction::Committed(PendingMove {
            command: command.clone(),
            previous,
        });
        Some(ClientCommand::MoveEntity(command))
    }

    /// The server refused a move
    ///
    /// Puts the selection back as it was if the refusal is for the pending
    /// move; anything else is ignored
    pub fn reject(&mut self, entity_id: &EntityId) -> bool {
        let Interaction::Committed(pending) = self else {
            return false;
        };
        if &pending.command.entity_id != entity_id {
            return false;
        }
        let mut restored = pending.previous.clone();
        restored.last_hover = None;
        *self = Interaction::Selected(restored);
        true
    }

    /// The server started playing back a move for this entity
    ///
    /// Treated as acceptance of a pending move
    pub fn confirm(&mut self, entity_id: &EntityId) {
        if self
            .pending()
            .is_some_and(|pending| &pending.command.entity_id == entity_id)
        {
            *self = Interaction::Idle;
        }
    }

    /// Bring the state machine in line with a new game state
    pub fn reconcile(&mut self, state: &GameState) {
        match self {
            Interaction::Idle => {}
            Interaction::Selected(selection) => {
                if !is_selectable(state, &selection.entity_id) {
                    *self = Interaction::Idle;
                    return;
                }
                let position = state
                    .party_member(&selection.entity_id)
                    .and_then(|player| player.entity.position);
                match position {
                    None => *self = Interaction::Idle,
                    Some(position) if position != selection.origin => {
                        *selection = Selection::new(selection.entity_id.clone(), position);
                    }
                    Some(_) => {}
                }
            }
            Interaction::Committed(pending) => {
                let position = state
                    .entity(&pending.command.entity_id)
                    .and_then(|entity| entity.entity().position);
                // any move settles it, wherever the server put the entity
                match position {
                    Some(position) if position == pending.previous.origin => {}
                    _ => *self = Interaction::Idle,
                }
            }
        }
    }
}
