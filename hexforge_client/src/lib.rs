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

//! Battle map client for Hexforge
//!
//! Turns the server's game state into a drawable hex map and turns hovers and
//! clicks on that map into movement commands. The surrounding app owns the
//! socket and the canvas; it feeds server messages and pointer events in, and
//! asks for frames to be drawn.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod map;
pub mod session;

pub use config::MapConfig;
pub use map::BattleMap;
pub use session::{CommandSink, Session, SessionError, SessionStore};
