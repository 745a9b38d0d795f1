//! Game configuration.
//!
//! Every variant of the mini-game is one of these: tile size, speeds,
//! thresholds and quiz policies are data instead of per-game code. Any field
//! may be omitted from JSON; missing fields take the defaults below.

use serde::{Deserialize, Serialize};

use crate::answer::AnswerMode;
use crate::error::ConfigError;
use crate::npc::{NpcSpec, default_roster};
use crate::world::{MapSource, tile_count};

/// When a nearby NPC starts talking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Player must press an interact key while in range.
    #[default]
    Interact,
    /// Walking into range is enough.
    Proximity,
}

/// What a wrong answer does to the NPC.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrongAnswerPolicy {
    /// Same question may be tried again.
    #[default]
    Retry,
    /// NPC stops asking.
    Forfeit,
    /// NPC asks a new random question next time.
    Regenerate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub tile_size: f64,
    pub map_width: usize,
    pub map_height: usize,
    pub player_speed: f64,
    pub player_radius: f64,
    pub interact_radius: f64,
    pub trigger: TriggerMode,
    pub answer_input: AnswerMode,
    pub wrong_answer: WrongAnswerPolicy,
    /// Answer box capacity; omitted means the answer mode's own default.
    pub max_input_len: Option<usize>,
    pub feedback_seconds: f64,
    pub max_frame_dt: f64,
    pub reward: u32,
    pub stage_id: String,
    pub fallback_stage_id: String,
    pub seed: Option<u64>,
    pub map: MapSource,
    pub npcs: Vec<NpcSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            viewport_width: 720,
            viewport_height: 480,
            tile_size: 32.0,
            map_width: 40,
            map_height: 30,
            player_speed: 2.5,
            player_radius: 0.25,
            interact_radius: 1.1,
            trigger: TriggerMode::Interact,
            answer_input: AnswerMode::Digits,
            wrong_answer: WrongAnswerPolicy::Retry,
            max_input_len: None,
            feedback_seconds: 2.0,
            max_frame_dt: 1.0 / 30.0,
            reward: 10,
            stage_id: "game-of-the-day-stage".to_string(),
            fallback_stage_id: "tens-and-trails-stage".to_string(),
            seed: None,
            map: MapSource::default(),
            npcs: default_roster(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Viewport size in world units.
    pub fn view_size(&self) -> crate::geom::Vec2 {
        crate::geom::Vec2::new(
            f64::from(self.viewport_width) / self.tile_size,
            f64::from(self.viewport_height) / self.tile_size,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tile_size", self.tile_size)?;
        positive("viewport_width", f64::from(self.viewport_width))?;
        positive("viewport_height", f64::from(self.viewport_height))?;
        positive("player_speed", self.player_speed)?;
        positive("interact_radius", self.interact_radius)?;
        positive("max_frame_dt", self.max_frame_dt)?;
        if let Some(len) = self.max_input_len {
            positive("max_input_len", len as f64)?;
        }
        if !(self.feedback_seconds >= 0.0) {
            return Err(ConfigError::Negative { field: "feedback_seconds", value: self.feedback_seconds });
        }
        if !(self.player_radius >= 0.0) {
            return Err(ConfigError::Negative { field: "player_radius", value: self.player_radius });
        }
        // Fixed layouts carry their own size.
        if !matches!(self.map, MapSource::Layout { .. }) && (self.map_width == 0 || self.map_height == 0) {
            return Err(ConfigError::EmptyMap { width: self.map_width, height: self.map_height });
        }
        if !matches!(self.map, MapSource::Layout { .. }) && tile_count(self.map_width, self.map_height).is_err() {
            return Err(ConfigError::MapTooLarge { width: self.map_width, height: self.map_height });
        }
        if self.npcs.is_empty() {
            return Err(ConfigError::NoNpcs);
        }
        Ok(())
    }
}

// Written as `!(v > 0.0)` so NaN fails too.
fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value > 0.0) {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}
