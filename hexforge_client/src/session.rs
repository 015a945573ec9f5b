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

//! The client's copy of the game state, and the way back to the server

use hexforge_common::{
    GameState,
    message::{ClientCommand, ServerEvent},
    patch::{self, PatchError, PatchOperation},
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace};

/// Where outbound commands go
///
/// The app implements this over its socket; tests record into a vector
pub trait CommandSink {
    /// Send a command; fire and forget
    fn send(&mut self, command: ClientCommand);
}

impl<F: FnMut(ClientCommand)> CommandSink for F {
    fn send(&mut self, command: ClientCommand) {
        self(command)
    }
}

/// Reasons a server message couldn't be taken in
#[derive(Error, Debug)]
pub enum SessionError {
    /// Message wasn't a known event
    #[error("couldn't decode server message: {0}")]
    Decode(#[source] serde_json::Error),
    /// A patch came in before any full state
    #[error("patch arrived before any full state")]
    MissingBase,
    /// Patch operations didn't fit the current state
    #[error("couldn't apply patch: {0}")]
    BadPatch(#[from] PatchError),
    /// The resulting state doesn't match the schema
    #[error("state doesn't match the schema: {0}")]
    BadState(#[source] serde_json::Error),
}

/// Last known good game state
///
/// Keeps the raw JSON the server sent, so patches apply against exactly the
/// server's document, alongside the parsed form the map reads from
#[derive(Debug, Default)]
pub struct SessionStore {
    raw: Option<Value>,
    state: Option<GameState>,
    version: u64,
}

impl SessionStore {
    /// An empty store; nothing to draw until the first full state
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state, if any has arrived
    pub fn game_state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Bumped every time the state changes
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the state wholesale
    ///
    /// Keeps the old state if the new one doesn't parse
    pub fn replace(&mut self, raw: Value) -> Result<(), SessionError> {
        let state = GameState::deserialize(&raw).map_err(SessionError::BadState)?;
        self.commit(raw, state);
        Ok(())
    }

    /// Apply a patch to the current state
    ///
    /// Either the whole patch applies and the result is a valid state, or
    /// nothing changes
    pub fn patch(&mut self, operations: &[PatchOperation]) -> Result<(), SessionError> {
        let Some(raw) = &self.raw else {
            return Err(SessionError::MissingBase);
        };
        let mut candidate = raw.clone();
        patch::apply(&mut candidate, operations)?;
        let state = GameState::deserialize(&candidate).map_err(SessionError::BadState)?;
        self.commit(candidate, state);
        Ok(())
    }

    fn commit(&mut self, raw: Value, state: GameState) {
        self.raw = Some(raw);
        self.state = Some(state);
        self.version += 1;
        debug!(version = self.version, "game state updated");
    }
}

/// Everything the battle map needs from the wider app: the state it reads
/// and the channel it writes commands to
#[derive(Debug)]
pub struct Session<S> {
    store: SessionStore,
    sink: S,
}

impl<S: CommandSink> Session<S> {
    /// Start a session with no state yet
    pub fn new(sink: S) -> Self {
        Self {
            store: SessionStore::new(),
            sink,
        }
    }

    /// The state store
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The state store, for applying server updates
    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    /// The current state, if any has arrived
    pub fn game_state(&self) -> Option<&GameState> {
        self.store.game_state()
    }

    /// Hand a command to the app for sending
    pub fn send(&mut self, command: ClientCommand) {
        debug!(command = <&str>::from(&command), "sending command");
        self.sink.send(command);
    }

    /// The command sink, e.g. to inspect what was sent
    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Parse a text frame from the server
pub fn decode(text: &str) -> Result<ServerEvent, SessionError> {
    let event: ServerEvent = serde_json::from_str(text).map_err(SessionError::Decode)?;
    trace!(event = <&str>::from(&event), "decoded server event");
    Ok(event)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn state() -> Value {
        json!({
            "phase": "exploration",
            "party": [{"id": "p1", "name": "Aria", "position": {"q": 0, "r": 0, "s": 0}, "speed": 30}],
            "enemies": [],
            "npcs": []
        })
    }

    fn ops(value: Value) -> Vec<PatchOperation> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn patch_without_base_is_dropped() {
        let mut store = SessionStore::new();
        let result = store.patch(&ops(json!([
            {"op": "replace", "path": "/phase", "value": "combat"}
        ])));
        assert!(matches!(result, Err(SessionError::MissingBase)));
        assert!(store.game_state().is_none());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn patch_updates_typed_state() {
        let mut store = SessionStore::new();
        store.replace(state()).unwrap();
        store
            .patch(&ops(json!([
                {"op": "replace", "path": "/party/0/position", "value": {"q": 1, "r": -1, "s": 0}},
                {"op": "replace", "path": "/phase", "value": "combat"}
            ])))
            .unwrap();
        let game_state = store.game_state().unwrap();
        assert_eq!(game_state.phase, hexforge_common::Phase::Combat);
        assert_eq!(
            game_state.party[0].entity.position,
            Some(hexforge_common::Hex::new(1, -1))
        );
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn schema_breaking_patch_is_rejected() {
        let mut store = SessionStore::new();
        store.replace(state()).unwrap();
        let before = store.game_state().cloned();

        // applies as JSON, but s no longer matches q and r
        let result = store.patch(&ops(json!([
            {"op": "replace", "path": "/party/0/position/s", "value": 4}
        ])));
        assert!(matches!(result, Err(SessionError::BadState(_))));
        assert_eq!(store.game_state().cloned(), before);

        // cube sum would overflow
        let result = store.patch(&ops(json!([
            {"op": "replace", "path": "/party/0/position", "value": {"q": 2147483647, "r": 1, "s": 0}}
        ])));
        assert!(matches!(result, Err(SessionError::BadState(_))));
        assert_eq!(store.game_state().cloned(), before);

        // wrong type
        let result = store.patch(&ops(json!([
            {"op": "replace", "path": "/party/0/speed", "value": "fast"}
        ])));
        assert!(matches!(result, Err(SessionError::BadState(_))));

        // path doesn't exist
        let result = store.patch(&ops(json!([
            {"op": "replace", "path": "/party/4/speed", "value": 5}
        ])));
        assert!(matches!(result, Err(SessionError::BadPatch(_))));

        assert_eq!(store.game_state().cloned(), before);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn unparseable_replacement_keeps_old_state() {
        let mut store = SessionStore::new();
        store.replace(state()).unwrap();
        assert!(store.replace(json!({"party": "nobody"})).is_err());
        assert_eq!(store.game_state().unwrap().party.len(), 1);
    }

    #[test]
    fn commands_reach_the_sink() {
        let mut sent = Vec::new();
        let mut session = Session::new(|command: ClientCommand| sent.push(command));
        session.send(ClientCommand::MoveEntity(
            hexforge_common::message::MoveEntity::along(
                "p1".into(),
                vec![hexforge_common::Hex::new(1, 0)],
            )
            .unwrap(),
        ));
        drop(session);
        assert_eq!(sent.len(), 1);
    }

    #[test]
    fn decodes_frames() {
        assert!(matches!(
            decode(r#"{"event": "state_replace", "data": {}}"#),
            Ok(ServerEvent::StateReplace(_))
        ));
        assert!(matches!(
            decode(r#"{"event": "teleport", "data": {}}"#),
            Err(SessionError::Decode(_))
        ));
    }
}
