//! Per-variant tuning
//!
//! Defaults come from [`crate::consts`]. Configs can be loaded from JSON
//! (missing fields keep their defaults) and must pass `validate()` before an
//! engine accepts them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Must convert to a non-zero `Duration`
fn interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    match Duration::try_from_secs_f32(value) {
        Ok(d) if !d.is_zero() => Ok(()),
        _ => Err(ConfigError::Interval { field, value }),
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn ordered(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { field, min, max })
    }
}

fn fits(field: &'static str, value: f32, limit: f32) -> Result<(), ConfigError> {
    if value <= limit {
        Ok(())
    } else {
        Err(ConfigError::TooWide {
            field,
            value,
            limit,
        })
    }
}

/// Jump platformer tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    pub field_width: f32,
    pub field_height: f32,
    /// Fixed timestep in seconds
    pub tick_interval: f32,
    pub gravity: f32,
    pub jump_force: f32,
    pub move_speed: f32,
    pub player_radius: f32,
    pub damping: f32,
    pub pickup_radius: f32,
    pub coin_value: u64,
    pub max_coins: usize,
    pub platform_height: f32,
    pub platform_min_width: f32,
    pub platform_max_width: f32,
    pub min_gap: f32,
    pub max_gap: f32,
    pub spawn_threshold: f32,
    pub edge_margin: f32,
    pub fall_margin: f32,
    pub despawn_margin: f32,
    pub target_score: u64,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            tick_interval: SIM_DT,
            gravity: GRAVITY,
            jump_force: JUMP_FORCE,
            move_speed: MOVE_SPEED,
            player_radius: PLAYER_RADIUS,
            damping: HORIZONTAL_DAMPING,
            pickup_radius: COIN_PICKUP_RADIUS,
            coin_value: COIN_VALUE,
            max_coins: MAX_COINS,
            platform_height: PLATFORM_HEIGHT,
            platform_min_width: PLATFORM_MIN_WIDTH,
            platform_max_width: PLATFORM_MAX_WIDTH,
            min_gap: PLATFORM_MIN_GAP,
            max_gap: PLATFORM_MAX_GAP,
            spawn_threshold: SPAWN_THRESHOLD,
            edge_margin: SPAWN_EDGE_MARGIN,
            fall_margin: FALL_MARGIN,
            despawn_margin: DESPAWN_MARGIN,
            target_score: TARGET_SCORE,
        }
    }
}

impl JumpConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;
        positive("tick_interval", self.tick_interval)?;
        interval("tick_interval", self.tick_interval)?;
        non_negative("gravity", self.gravity)?;
        non_negative("jump_force", self.jump_force)?;
        non_negative("move_speed", self.move_speed)?;
        positive("player_radius", self.player_radius)?;
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ConfigError::Damping(self.damping));
        }
        positive("pickup_radius", self.pickup_radius)?;
        positive("platform_height", self.platform_height)?;
        positive("platform_min_width", self.platform_min_width)?;
        ordered("platform_width", self.platform_min_width, self.platform_max_width)?;
        positive("min_gap", self.min_gap)?;
        ordered("gap", self.min_gap, self.max_gap)?;
        non_negative("spawn_threshold", self.spawn_threshold)?;
        non_negative("edge_margin", self.edge_margin)?;
        fits("edge_margin", self.edge_margin * 2.0, self.field_width)?;
        fits("player_radius", self.player_radius * 2.0, self.field_width)?;
        non_negative("fall_margin", self.fall_margin)?;
        non_negative("despawn_margin", self.despawn_margin)?;
        if self.target_score == 0 {
            return Err(ConfigError::Zero {
                field: "target_score",
            });
        }
        Ok(())
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f32(self.tick_interval)
    }
}

/// Egg catcher tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchConfig {
    pub field_width: f32,
    pub field_height: f32,
    /// Fixed timestep in seconds
    pub tick_interval: f32,
    /// Seconds between spawns
    pub spawn_interval: f32,
    /// Seconds between held-direction steps
    pub hold_interval: f32,
    pub basket_width: f32,
    pub basket_height: f32,
    pub basket_bottom_offset: f32,
    pub pickup_margin_width: f32,
    pub pickup_margin_height: f32,
    pub item_width: f32,
    pub item_height: f32,
    pub fall_speed: f32,
    pub points_per_catch: u64,
    pub target_eggs: u32,
    pub lives: u8,
    pub move_step: f32,
    pub hold_step: f32,
}

impl Default for CatchConfig {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            tick_interval: SIM_DT,
            spawn_interval: SPAWN_INTERVAL,
            hold_interval: HOLD_INTERVAL,
            basket_width: BASKET_WIDTH,
            basket_height: BASKET_HEIGHT,
            basket_bottom_offset: BASKET_BOTTOM_OFFSET,
            pickup_margin_width: PICKUP_MARGIN_WIDTH,
            pickup_margin_height: PICKUP_MARGIN_HEIGHT,
            item_width: EGG_WIDTH,
            item_height: EGG_HEIGHT,
            fall_speed: FALL_SPEED,
            points_per_catch: POINTS_PER_CATCH,
            target_eggs: TARGET_EGGS,
            lives: STARTING_LIVES,
            move_step: BASKET_MOVE_STEP,
            hold_step: BASKET_HOLD_STEP,
        }
    }
}

impl CatchConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;
        positive("tick_interval", self.tick_interval)?;
        interval("tick_interval", self.tick_interval)?;
        positive("spawn_interval", self.spawn_interval)?;
        interval("spawn_interval", self.spawn_interval)?;
        positive("hold_interval", self.hold_interval)?;
        interval("hold_interval", self.hold_interval)?;
        positive("basket_width", self.basket_width)?;
        positive("basket_height", self.basket_height)?;
        fits("basket_width", self.basket_width, self.field_width)?;
        non_negative("basket_bottom_offset", self.basket_bottom_offset)?;
        fits(
            "basket_bottom_offset",
            self.basket_bottom_offset,
            self.field_height,
        )?;
        non_negative("pickup_margin_width", self.pickup_margin_width)?;
        non_negative("pickup_margin_height", self.pickup_margin_height)?;
        positive("item_width", self.item_width)?;
        positive("item_height", self.item_height)?;
        fits("item_width", self.item_width, self.field_width)?;
        positive("fall_speed", self.fall_speed)?;
        non_negative("move_step", self.move_step)?;
        non_negative("hold_step", self.hold_step)?;
        if self.target_eggs == 0 {
            return Err(ConfigError::Zero {
                field: "target_eggs",
            });
        }
        if self.lives == 0 {
            return Err(ConfigError::Zero { field: "lives" });
        }
        Ok(())
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f32(self.tick_interval)
    }

    pub fn spawn_duration(&self) -> Duration {
        Duration::from_secs_f32(self.spawn_interval)
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::from_secs_f32(self.hold_interval)
    }
}
