use serde::{Deserialize, Serialize};

use crate::entities::Formation;
use crate::error::SimError;
use crate::path::CONTROL_MARGIN;

/// Each spare life is drawn as a marker along the bottom edge.
pub const MAX_STARTING_LIVES: u32 = 10;

/// Session settings, fixed for the lifetime of a [`crate::game::Game`].
///
/// The binary reads them from `galaga.json` when present; every field is
/// optional there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Playfield width in world units
    pub width: i32,
    /// Playfield height in world units
    pub height: i32,
    /// RNG seed. Zero lets the front-end pick one.
    pub seed: u64,
    pub starting_lives: u32,
    /// Ticks between the fighter dying and the next life being used
    pub death_timeout_ticks: u32,
    /// Side of an enemy and of the fighter
    pub enemy_size: i32,
    /// Gap between formation slots
    pub enemy_spacing: i32,
    /// Distance kept from the playfield edges
    pub margin: i32,
    /// Formation step per move; the fighter moves four of these per tick
    pub nudge: i32,
    pub projectile_speed: i32,
    /// Minimum ticks between fighter shots
    pub fighter_fire_cooldown: u64,
    /// How far below the fighter a dive aims
    pub dive_offset: i32,
    /// One dispatch in this many launches a capture beam. Zero disables it.
    pub capture_beam_odds: u32,
    /// Real-time length of one tick
    pub tick_millis: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 600,
            seed: 0,
            starting_lives: 3,
            death_timeout_ticks: 200,
            enemy_size: 24,
            enemy_spacing: 12,
            margin: 20,
            nudge: 1,
            projectile_speed: 8,
            fighter_fire_cooldown: 16,
            dive_offset: 100,
            capture_beam_odds: 4,
            tick_millis: 23,
        }
    }
}

impl GameConfig {
    /// Reads a (possibly partial) JSON document over the defaults.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        positive("enemy_size", self.enemy_size)?;
        positive("nudge", self.nudge)?;
        positive("projectile_speed", self.projectile_speed)?;
        if self.tick_millis == 0 {
            return Err(SimError::InvalidConfig {
                field: "tick_millis",
                reason: "must be positive, got 0".to_string(),
            });
        }
        if self.starting_lives > MAX_STARTING_LIVES {
            return Err(SimError::InvalidConfig {
                field: "starting_lives",
                reason: format!(
                    "at most {MAX_STARTING_LIVES}, got {}",
                    self.starting_lives
                ),
            });
        }
        if self.enemy_spacing < 0 {
            return Err(SimError::InvalidConfig {
                field: "enemy_spacing",
                reason: "must not be negative".to_string(),
            });
        }
        if self.margin < 0 {
            return Err(SimError::InvalidConfig {
                field: "margin",
                reason: "must not be negative".to_string(),
            });
        }

        let required_width = 2 * self.margin + self.enemy_size;
        if Formation::columns_for(self.width, self.margin, self.enemy_size, self.enemy_spacing) == 0 {
            return Err(SimError::PlayfieldTooNarrow {
                width: self.width,
                required: required_width,
            });
        }
        let required_height = CONTROL_MARGIN + 2 * self.margin + self.enemy_size;
        if self.height <= required_height {
            return Err(SimError::PlayfieldTooShort {
                height: self.height,
                required: required_height,
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: i32) -> Result<(), SimError> {
    if value > 0 {
        Ok(())
    } else {
        Err(SimError::InvalidConfig {
            field,
            reason: format!("must be positive, got {value}"),
        })
    }
}
