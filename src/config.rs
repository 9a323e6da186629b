/// Tunables and level-derived world bounds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{Position, WorldBounds};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration value `{field}`: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    #[error("invalid level dimensions: width and height must be present and non-zero")]
    InvalidLevelDimensions,
    #[error("invalid tile dimensions: tilewidth and tileheight must be present and non-zero")]
    InvalidTileDimensions,
    #[error("level is too large: {tiles} tiles of {tile_px} px does not fit in i32 pixels")]
    DimensionsTooLarge { tiles: u32, tile_px: u32 },
}

// ── Simulation tunables ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Player speed in pixels per second.
    pub player_speed: f64,
    pub max_health: u32,
    pub knockback_px: i32,
    pub player_start: (i32, i32),

    pub enemy_speed: f32,
    pub enemy_patrol_speed: f32,
    pub enemy_detection_radius: f32,
    /// Chasing stops beyond `detection_radius * chase_exit_factor`.
    pub enemy_chase_exit_factor: f32,
    pub enemy_damage_distance: f32,
    pub enemy_patrol_min_ms: f64,
    pub enemy_patrol_max_ms: f64,

    pub enemy_spawn_interval_ms: f64,
    pub enemy_spawn_min_radius: f64,
    pub enemy_spawn_max_radius: f64,

    pub pickup_spawn_interval_ms: f64,
    pub pickup_spawn_min_radius: f64,
    pub pickup_spawn_max_radius: f64,
    pub max_health_pickups: usize,

    /// Axis-aligned reach for pickups and explosions.
    pub interaction_reach_px: i32,
    pub bomb_fuse_ms: f64,

    /// Fixed RNG seed; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player_speed: 128.0,
            max_health: 3,
            knockback_px: 16,
            player_start: (100, 100),

            enemy_speed: 128.0,
            enemy_patrol_speed: 64.0,
            enemy_detection_radius: 200.0,
            enemy_chase_exit_factor: 1.5,
            enemy_damage_distance: 16.0,
            enemy_patrol_min_ms: 1000.0,
            enemy_patrol_max_ms: 4000.0,

            enemy_spawn_interval_ms: 5000.0,
            enemy_spawn_min_radius: 0.0,
            enemy_spawn_max_radius: 300.0,

            pickup_spawn_interval_ms: 8000.0,
            pickup_spawn_min_radius: 100.0,
            pickup_spawn_max_radius: 300.0,
            max_health_pickups: 5,

            interaction_reach_px: 32,
            bomb_fuse_ms: 2100.0,

            seed: None,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn player_start(&self) -> Position {
        Position::from(self.player_start)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            Err(ConfigError::InvalidValue { field, reason })
        }

        if self.max_health == 0 {
            return invalid("max_health", "must be at least 1");
        }
        if self.enemy_spawn_interval_ms <= 0.0 {
            return invalid("enemy_spawn_interval_ms", "must be positive");
        }
        if self.pickup_spawn_interval_ms <= 0.0 {
            return invalid("pickup_spawn_interval_ms", "must be positive");
        }
        if self.enemy_spawn_min_radius > self.enemy_spawn_max_radius {
            return invalid("enemy_spawn_min_radius", "exceeds enemy_spawn_max_radius");
        }
        if self.pickup_spawn_min_radius > self.pickup_spawn_max_radius {
            return invalid("pickup_spawn_min_radius", "exceeds pickup_spawn_max_radius");
        }
        if self.enemy_patrol_min_ms <= 0.0 || self.enemy_patrol_min_ms > self.enemy_patrol_max_ms {
            return invalid("enemy_patrol_min_ms", "must be positive and not exceed enemy_patrol_max_ms");
        }
        if self.enemy_chase_exit_factor < 1.0 {
            return invalid("enemy_chase_exit_factor", "must be at least 1.0");
        }
        Ok(())
    }
}

// ── Level header ──────────────────────────────────────────────────────────────

/// The subset of a Tiled `.tmj` map the core needs: its size.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LevelDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(rename = "tilewidth")]
    pub tile_width: Option<u32>,
    #[serde(rename = "tileheight")]
    pub tile_height: Option<u32>,
}

impl LevelDimensions {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn world_bounds(&self) -> Result<WorldBounds, ConfigError> {
        let (width, height) = match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(ConfigError::InvalidLevelDimensions),
        };
        let (tile_width, tile_height) = match (self.tile_width, self.tile_height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(ConfigError::InvalidTileDimensions),
        };
        Ok(WorldBounds::new(
            0,
            0,
            pixel_extent(width, tile_width)?,
            pixel_extent(height, tile_height)?,
        ))
    }
}

fn pixel_extent(tiles: u32, tile_px: u32) -> Result<i32, ConfigError> {
    tiles
        .checked_mul(tile_px)
        .and_then(|px| i32::try_from(px).ok())
        .ok_or(ConfigError::DimensionsTooLarge { tiles, tile_px })
}
