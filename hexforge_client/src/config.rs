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

//! Tunables for the battle map

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Battle map settings; every field has a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Major (centre to corner) radius of a hex, in pixels
    ///
    /// All other geometry is expressed as multiples of this
    pub hex_radius: f64,
    /// How long each step of a move animation lasts
    pub step_interval_ms: u32,
    /// Furthest zoomed-out level
    pub min_zoom: i32,
    /// Furthest zoomed-in level
    pub max_zoom: i32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            hex_radius: 30.0,
            step_interval_ms: 300,
            min_zoom: -40,
            max_zoom: 10,
        }
    }
}

/// Problems with a map config
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Not valid JSON, or wrong field types
    #[error("couldn't parse map config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Radius must be a positive finite number
    #[error("hex radius must be positive, got {0}")]
    BadRadius(f64),
    /// Animations need time to play
    #[error("step interval must be non-zero")]
    ZeroInterval,
    /// Zoom bounds are inverted
    #[error("min zoom {min} is above max zoom {max}")]
    BadZoom {
        /// Configured minimum
        min: i32,
        /// Configured maximum
        max: i32,
    },
}

impl MapConfig {
    /// Parse and validate a JSON config; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config makes sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hex_radius.is_finite() && self.hex_radius > 0.0) {
            return Err(ConfigError::BadRadius(self.hex_radius));
        }
        if self.step_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::BadZoom {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let config = MapConfig::from_json(r#"{"hex_radius": 40}"#).unwrap();
        assert_eq!(config.hex_radius, 40.0);
        assert_eq!(config.step_interval_ms, 300);
        assert_eq!(MapConfig::from_json("{}").unwrap(), MapConfig::default());
    }

    #[test]
    fn rejects_nonsense() {
        assert!(matches!(
            MapConfig::from_json(r#"{"hex_radius": 0}"#),
            Err(ConfigError::BadRadius(_))
        ));
        assert!(matches!(
            MapConfig::from_json(r#"{"step_interval_ms": 0}"#),
            Err(ConfigError::ZeroInterval)
        ));
        assert!(matches!(
            MapConfig::from_json(r#"{"min_zoom": 5, "max_zoom": 1}"#),
            Err(ConfigError::BadZoom { min: 5, max: 1 })
        ));
        assert!(matches!(
            MapConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
