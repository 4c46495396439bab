// Data-driven world configuration.
//
// All generation and search constants live in `WorldConfig`, loaded from
// JSON at startup and never mutated afterwards. The generator never uses
// magic numbers for anything a designer might want to tune; it reads them
// from here. Two worlds with the same seed only match if their configs
// match too, so saves are always paired with the config that produced them.
//
// River parameters are grouped in `RiverParams`. Named presets
// (`RiverParams::meandering()`, `::braided()`, `::sparse()`) produce
// different river styles by tuning the same parameter set.
//
// See also: `river_gen.rs` which reads `RiverParams` during carving,
// `chunk_manager.rs` which owns the config, `pathfinding.rs` for the
// default search depth.

use crate::error::{WorldError, WorldResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// River parameters
// ---------------------------------------------------------------------------

/// Controls how river cursors are seeded, widened, forked, and turned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiverParams {
    /// Narrowest river, in tiles. The stamp radius is `width / 2`.
    pub min_width: u32,
    /// Widest river, in tiles.
    pub max_width: u32,
    /// Chance per segment (after the second) that a cursor spawns a
    /// perpendicular tributary.
    pub fork_probability: f64,
    /// Chance per segment (after the second) that a cursor turns 45°.
    pub turn_probability: f64,
    /// Chance that two strands merge. Carried in saves and config files but
    /// not consumed by the carving walk.
    pub converge_probability: f64,
    /// Steps a cursor advances before fork/turn rolls are made.
    pub segment_length: u32,
    /// Maximum random jitter per axis per step, in tiles.
    pub meander: f64,
    /// Fewest river sources seeded into a chunk with no inbound crossings.
    pub min_sources: u32,
    /// Most river sources seeded into a chunk with no inbound crossings.
    pub max_sources: u32,
}

impl RiverParams {
    /// Default style: a few medium rivers that wander and occasionally fork.
    pub fn meandering() -> Self {
        Self {
            min_width: 1,
            max_width: 3,
            fork_probability: 0.08,
            turn_probability: 0.15,
            converge_probability: 0.05,
            segment_length: 6,
            meander: 0.35,
            min_sources: 1,
            max_sources: 3,
        }
    }

    /// Many narrow channels that fork often.
    pub fn braided() -> Self {
        Self {
            min_width: 1,
            max_width: 2,
            fork_probability: 0.25,
            turn_probability: 0.2,
            converge_probability: 0.1,
            segment_length: 4,
            meander: 0.45,
            min_sources: 2,
            max_sources: 4,
        }
    }

    /// A single wide, mostly straight river.
    pub fn sparse() -> Self {
        Self {
            min_width: 3,
            max_width: 5,
            fork_probability: 0.02,
            turn_probability: 0.05,
            converge_probability: 0.0,
            segment_length: 10,
            meander: 0.15,
            min_sources: 1,
            max_sources: 1,
        }
    }
}

impl Default for RiverParams {
    fn default() -> Self {
        Self::meandering()
    }
}

// ---------------------------------------------------------------------------
// Pathfinding parameters
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathfindingParams {
    /// Path cost at which `ChunkManager::find_path` stops expanding a node.
    pub max_distance: u32,
}

impl Default for PathfindingParams {
    fn default() -> Self {
        Self {
            max_distance: crate::pathfinding::DEFAULT_MAX_DISTANCE,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level world config
// ---------------------------------------------------------------------------

/// Top-level world configuration. Loaded from JSON, never mutated at runtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Side length of every chunk, in tiles. Constant across a world.
    pub chunk_size: u32,
    pub rivers: RiverParams,
    #[serde(default)]
    pub pathfinding: PathfindingParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 32,
            rivers: RiverParams::default(),
            pathfinding: PathfindingParams::default(),
        }
    }
}

impl WorldConfig {
    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> WorldResult<Self> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a config file.
    pub fn load(path: &Path) -> WorldResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check that every value is in a range the generator can use.
    pub fn validate(&self) -> WorldResult<()> {
        let r = &self.rivers;
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size must be positive"));
        }
        if self.chunk_size > i32::MAX as u32 / 10 {
            return Err(invalid("chunk_size is too large"));
        }
        if r.min_width > r.max_width {
            return Err(invalid(format!(
                "min_width {} exceeds max_width {}",
                r.min_width, r.max_width
            )));
        }
        if r.min_sources > r.max_sources {
            return Err(invalid(format!(
                "min_sources {} exceeds max_sources {}",
                r.min_sources, r.max_sources
            )));
        }
        for (name, p) in [
            ("fork_probability", r.fork_probability),
            ("turn_probability", r.turn_probability),
            ("converge_probability", r.converge_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(format!("{name} {p} is outside [0, 1]")));
            }
        }
        if !(r.meander >= 0.0 && r.meander.is_finite()) {
            return Err(invalid(format!("meander {} must be finite and >= 0", r.meander)));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> WorldError {
    WorldError::InvalidConfig(msg.into())
}
