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

//! The battle map: game state in, commands and frames out

use std::collections::HashMap;

use hexforge_common::{
    CartesianVec2, GameState, Hex,
    entity::EntityId,
    message::ServerEvent,
};
use tracing::{debug, error, trace, warn};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::{
    MapConfig,
    session::{self, CommandSink, Session, SessionError},
};

pub mod animation;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod reachability;
pub mod render;
pub mod viewport;

use animation::Animations;
use interaction::{Interaction, is_selectable};
use layout::SceneLayout;
use reachability::ReachableSet;
use render::Frame;
use viewport::Viewport;

/// Interactive battle map
///
/// Single-threaded; the app feeds in server messages, pointer events, and
/// animation frame timestamps (milliseconds) in the order they happen
#[derive(Debug)]
pub struct BattleMap<S> {
    session: Session<S>,
    config: MapConfig,
    viewport: Viewport,
    interaction: Interaction,
    animations: Animations,
    reachable: ReachableSet,
}

impl<S: CommandSink> BattleMap<S> {
    /// A map with no state yet, sending commands to the session's sink
    pub fn new(session: Session<S>, config: MapConfig) -> Self {
        Self {
            session,
            viewport: Viewport::new(&config),
            animations: Animations::new(config.step_interval_ms),
            config,
            interaction: Interaction::Idle,
            reachable: ReachableSet::default(),
        }
    }

    /// Decode and handle a text frame from the server
    ///
    /// Undecodable frames are logged and dropped
    pub fn handle_message(&mut self, text: &str, now: f64) {
        match session::decode(text) {
            Ok(event) => self.handle_event(event, now),
            Err(err) => warn!("dropping server message: {err}"),
        }
    }

    /// Handle a server event
    pub fn handle_event(&mut self, event: ServerEvent, now: f64) {
        trace!(event = <&str>::from(&event), "received server event");
        match event {
            ServerEvent::StateReplace(raw) => {
                if let Err(err) = self.session.store_mut().replace(raw) {
                    error!("keeping previous game state: {err}");
                    return;
                }
            }
            ServerEvent::StatePatch(operations) => {
                match self.session.store_mut().patch(&operations) {
                    Ok(()) => {}
                    Err(SessionError::MissingBase) => {
                        warn!("dropping patch with no base state");
                        return;
                    }
                    Err(err) => {
                        warn!("dropping patch: {err}");
                        return;
                    }
                }
            }
            ServerEvent::MoveAnimation { entity_id, path } => {
                let Some(from) = self.visual_position(&entity_id, now) else {
                    debug!(%entity_id, "ignoring animation for entity not on the map");
                    return;
                };
                self.animations.start(entity_id.clone(), from, path, now);
                self.interaction.confirm(&entity_id);
            }
            ServerEvent::MoveRejected { entity_id, reason } => {
                if self.interaction.reject(&entity_id) {
                    debug!(%entity_id, reason = reason.as_deref().unwrap_or(""), "move rejected");
                }
            }
        }
        if let Some(state) = self.session.game_state() {
            self.interaction.reconcile(state);
        }
        self.recompute_reachable();
    }

    /// Recalculate the highlighted hexes from the selection and current state
    pub fn recompute_reachable(&mut self) {
        self.reachable = match (self.session.game_state(), self.interaction.selection()) {
            (Some(state), Some(selection)) => {
                reachability::reachable_for(state, &selection.entity_id, &selection.path)
            }
            _ => ReachableSet::default(),
        };
    }

    /// The pointer is over a hex
    pub fn hover(&mut self, hex: Hex) {
        let Some(state) = self.session.game_state() else {
            return;
        };
        let before = self.interaction.path().len();
        self.interaction.hover(state, hex);
        if self.interaction.path().len() != before {
            self.recompute_reachable();
        }
    }

    /// A hex was clicked
    ///
    /// Clicking a selectable party token selects it; clicking a reachable hex
    /// while something is selected sends the move
    pub fn click(&mut self, hex: Hex) {
        let Some(state) = self.session.game_state() else {
            return;
        };
        let clicked_entity = state
            .party
            .iter()
            .map(|player| &player.entity)
            .filter(|entity| entity.position == Some(hex))
            .map(|entity| &entity.id)
            .find(|id| self.interaction.selected() == Some(*id) || is_selectable(state, id))
            .cloned();

        if let Some(entity_id) = clicked_entity {
            self.interaction.click_entity(state, &entity_id);
        } else if let Some(command) = self.interaction.click_hex(hex, &self.reachable) {
            self.session.send(command);
        }
        self.recompute_reachable();
    }

    /// The pointer moved to a point on a canvas of the given size
    pub fn hover_at(&mut self, screen: CartesianVec2, width: f64, height: f64) {
        let hex = self.screen_to_hex(screen, width, height);
        self.hover(hex);
    }

    /// The canvas was clicked at a point
    pub fn click_at(&mut self, screen: CartesianVec2, width: f64, height: f64) {
        let hex = self.screen_to_hex(screen, width, height);
        self.click(hex);
    }

    fn screen_to_hex(&self, screen: CartesianVec2, width: f64, height: f64) -> Hex {
        self.viewport
            .screen_to_hex(screen, width, height, self.config.hex_radius)
    }

    /// Advance animations; call once per animation frame
    ///
    /// Returns true while something is still moving
    pub fn tick(&mut self, now: f64) -> bool {
        for entity_id in self.animations.tick(now) {
            trace!(%entity_id, "animation finished");
        }
        self.animations.is_animating()
    }

    /// Where an entity is drawn right now
    pub fn visual_position(&self, entity_id: &EntityId, now: f64) -> Option<Hex> {
        self.animations.position_at(entity_id, now).or_else(|| {
            self.session
                .game_state()?
                .entity(entity_id)?
                .entity()
                .position
        })
    }

    /// Lay out the scene as it should appear at `now`
    pub fn layout(&self, now: f64) -> SceneLayout {
        match self.session.game_state() {
            Some(state) => SceneLayout::build(
                state,
                self.config.hex_radius,
                &self.animations.positions_at(now),
            ),
            None => SceneLayout::default(),
        }
    }

    /// Draw the map onto a canvas
    pub fn draw(
        &self,
        ctx: &CanvasRenderingContext2d,
        width: f64,
        height: f64,
        now: f64,
    ) -> Result<(), JsValue> {
        let scene = self.layout(now);
        let frame = Frame {
            scene: &scene,
            reachable: &self.reachable,
            selection: self.interaction.selection(),
            radius: self.config.hex_radius,
        };
        render::draw_scene(ctx, &frame, &self.viewport, width, height)
    }

    /// The current game state, if any has arrived
    pub fn game_state(&self) -> Option<&GameState> {
        self.session.game_state()
    }

    /// The session, e.g. to inspect the command sink
    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Selection state
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Hexes the selected entity can move to
    pub fn reachable(&self) -> &ReachableSet {
        &self.reachable
    }

    /// Plotted path of the selected entity
    pub fn path(&self) -> &[Hex] {
        self.interaction.path()
    }

    /// Pan and zoom
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Pan and zoom, for drag and wheel handlers
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Drawn positions of every animated entity
    pub fn animated_positions(&self, now: f64) -> HashMap<EntityId, Hex> {
        self.animations.positions_at(now)
    }
}

#[cfg(test)]
mod tests {
    use hexforge_common::message::ClientCommand;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Default)]
    struct Recorder(Vec<ClientCommand>);

    impl CommandSink for Recorder {
        fn send(&mut self, command: ClientCommand) {
            self.0.push(command);
        }
    }

    fn map() -> BattleMap<Recorder> {
        let mut map = BattleMap::new(Session::new(Recorder::default()), MapConfig::default());
        map.handle_event(
            ServerEvent::StateReplace(json!({
                "phase": "exploration",
                "location": {"id": "hall", "name": "Hall", "hexes": Hex::zero().spiral(3).collect::<Vec<_>>()},
                "party": [
                    {"id": "aria", "name": "Aria", "position": {"q": 0, "r": 0}, "speed": 30},
                    {"id": "bram", "name": "Bram", "position": {"q": 2, "r": 0}, "speed": 30}
                ]
            })),
            0.0,
        );
        map
    }

    #[test]
    fn selecting_computes_reachable() {
        let mut map = map();
        assert!(map.reachable().is_empty());
        map.click(Hex::zero());
        assert_eq!(map.interaction().selected(), Some(&"aria".into()));
        // bram's hex can't be ended on
        assert!(!map.reachable().contains(Hex::new(2, 0)));
        assert_eq!(map.reachable().len(), 36);
    }

    #[test]
    fn clicking_another_party_member_switches_selection() {
        let mut map = map();
        map.click(Hex::zero());
        map.click(Hex::new(2, 0));
        assert_eq!(map.interaction().selected(), Some(&"bram".into()));
        map.click(Hex::new(2, 0));
        assert_eq!(map.interaction(), &Interaction::Idle);
        assert!(map.reachable().is_empty());
    }

    #[test]
    fn clicking_a_reachable_hex_sends_a_move() {
        let mut map = map();
        map.click(Hex::zero());
        map.hover(Hex::new(0, 1));
        map.click(Hex::new(0, 1));
        assert_eq!(map.session().sink().0.len(), 1);
        assert!(map.interaction().pending().is_some());
        assert!(map.reachable().is_empty());
    }

    #[test]
    fn animation_plays_from_the_drawn_position() {
        let mut map = map();
        map.handle_event(
            ServerEvent::MoveAnimation {
                entity_id: "aria".into(),
                path: vec![Hex::new(1, 0), Hex::new(1, 1)],
            },
            1000.0,
        );
        assert_eq!(map.visual_position(&"aria".into(), 1000.0), Some(Hex::zero()));
        assert_eq!(map.visual_position(&"aria".into(), 1300.0), Some(Hex::new(1, 0)));
        assert!(map.tick(1650.0));
        assert!(!map.tick(1900.0));
        assert_eq!(map.visual_position(&"aria".into(), 1900.0), Some(Hex::zero()));
    }

    #[test]
    fn screen_clicks_hit_hexes() {
        let mut map = map();
        map.click_at(CartesianVec2 { x: 400.0, y: 300.0 }, 800.0, 600.0);
        assert_eq!(map.interaction().selected(), Some(&"aria".into()));
        map.hover_at(CartesianVec2 { x: 445.0, y: 326.0 }, 800.0, 600.0);
        assert_eq!(map.path(), &[Hex::new(1, 0)]);
    }
}
