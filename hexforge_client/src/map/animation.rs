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

//! Step-by-step playback of moves the server reports

use std::collections::HashMap;

use hexforge_common::{Hex, entity::EntityId};

/// One entity's move being played back
#[derive(Debug, Clone, PartialEq)]
struct Playback {
    from: Hex,
    path: Vec<Hex>,
    started_at: f64,
}

impl Playback {
    /// Steps elapsed since the start; zero before the start
    fn step(&self, now: f64, interval: f64) -> usize {
        ((now - self.started_at) / interval).floor().max(0.0) as usize
    }

    fn position(&self, now: f64, interval: f64) -> Option<Hex> {
        match self.step(now, interval) {
            0 => Some(self.from),
            step => self.path.get(step - 1).copied(),
        }
    }
}

/// Moves currently being played back, keyed by entity
///
/// Times are milliseconds on any monotonic clock, e.g. `performance.now()`
#[derive(Debug, Clone, PartialEq)]
pub struct Animations {
    interval: f64,
    playing: HashMap<EntityId, Playback>,
}

impl Animations {
    /// No animations; each step lasts `step_interval_ms`
    pub fn new(step_interval_ms: u32) -> Self {
        Self {
            interval: f64::from(step_interval_ms.max(1)),
            playing: HashMap::new(),
        }
    }

    /// Begin playing a move, replacing any playback already running for the entity
    ///
    /// `from` should be where the entity is drawn right now. Empty paths are ignored.
    pub fn start(&mut self, entity_id: EntityId, from: Hex, path: Vec<Hex>, now: f64) {
        if path.is_empty() {
            return;
        }
        self.playing.insert(
            entity_id,
            Playback {
                from,
                path,
                started_at: now,
            },
        );
    }

    /// Where the entity should be drawn, if it is being animated
    pub fn position_at(&self, entity_id: &EntityId, now: f64) -> Option<Hex> {
        self.playing
            .get(entity_id)
            .and_then(|playback| playback.position(now, self.interval))
    }

    /// Drawn positions of every animated entity
    pub fn positions_at(&self, now: f64) -> HashMap<EntityId, Hex> {
        self.playing
            .iter()
            .filter_map(|(id, playback)| {
                playback
                    .position(now, self.interval)
                    .map(|hex| (id.clone(), hex))
            })
            .collect()
    }

    /// Drop finished playbacks; returns who finished
    ///
    /// Finished entities fall back to their position in the game state
    pub fn tick(&mut self, now: f64) -> Vec<EntityId> {
        let interval = self.interval;
        let finished = self
            .playing
            .iter()
            .filter(|(_, playback)| playback.position(now, interval).is_none())
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        for id in &finished {
            self.playing.remove(id);
        }
        finished
    }

    /// Is anything still moving?
    pub fn is_animating(&self) -> bool {
        !self.playing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> Vec<Hex> {
        vec![Hex::new(1, 0), Hex::new(2, 0), Hex::new(3, 0)]
    }

    #[test]
    fn steps_through_the_path() {
        let mut animations = Animations::new(300);
        let id = EntityId::from("aria");
        animations.start(id.clone(), Hex::zero(), path(), 1000.0);

        assert_eq!(animations.position_at(&id, 1000.0), Some(Hex::zero()));
        assert_eq!(animations.position_at(&id, 1299.0), Some(Hex::zero()));
        assert_eq!(animations.position_at(&id, 1300.0), Some(Hex::new(1, 0)));
        assert_eq!(animations.position_at(&id, 1650.0), Some(Hex::new(2, 0)));
        assert_eq!(animations.position_at(&id, 1900.0), Some(Hex::new(3, 0)));
        assert_eq!(animations.position_at(&id, 2200.0), None);
    }

    #[test]
    fn finished_playbacks_are_dropped() {
        let mut animations = Animations::new(300);
        let id = EntityId::from("aria");
        animations.start(id.clone(), Hex::zero(), path(), 0.0);

        assert!(animations.tick(1000.0).is_empty());
        assert!(animations.is_animating());
        assert_eq!(animations.tick(1200.0), vec![id]);
        assert!(!animations.is_animating());
    }

    #[test]
    fn new_move_supersedes_the_old_one() {
        let mut animations = Animations::new(300);
        let id = EntityId::from("aria");
        animations.start(id.clone(), Hex::zero(), path(), 0.0);

        let current = animations.position_at(&id, 700.0).unwrap();
        assert_eq!(current, Hex::new(2, 0));
        animations.start(id.clone(), current, vec![Hex::new(2, 1)], 700.0);

        assert_eq!(animations.position_at(&id, 700.0), Some(Hex::new(2, 0)));
        assert_eq!(animations.position_at(&id, 1000.0), Some(Hex::new(2, 1)));
        assert_eq!(animations.tick(1300.0), vec![id]);
    }

    #[test]
    fn entities_animate_independently() {
        let mut animations = Animations::new(100);
        animations.start("a".into(), Hex::zero(), vec![Hex::new(1, 0)], 0.0);
        animations.start("b".into(), Hex::new(5, 0), vec![Hex::new(5, 1)], 50.0);

        let positions = animations.positions_at(150.0);
        assert_eq!(positions[&EntityId::from("a")], Hex::new(1, 0));
        assert_eq!(positions[&EntityId::from("b")], Hex::new(5, 1));

        assert_eq!(animations.tick(200.0), vec![EntityId::from("a")]);
        assert!(animations.position_at(&"b".into(), 200.0).is_some());
    }

    #[test]
    fn empty_paths_are_ignored() {
        let mut animations = Animations::new(300);
        animations.start("a".into(), Hex::zero(), Vec::new(), 0.0);
        assert!(!animations.is_animating());
    }
}
