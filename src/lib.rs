//! Eggventure - simulation core for two arcade minigames
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `session`: Session lifecycle, timers and observers
//! - `scheduler`: Injectable clock and single-threaded timer wheel
//! - `config`: Validated per-variant tuning
//! - `settings`: Key-value settings collaborator (skin, currency, scores)

pub mod config;
pub mod error;
pub mod highscores;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod sim;

pub use config::{CatchConfig, JumpConfig};
pub use error::ConfigError;
pub use highscores::HighScores;
pub use scheduler::{Clock, Scheduler, VirtualClock};
pub use session::{Session, SessionObserver, SubscriptionId};
pub use settings::{MemoryStore, Settings, SettingsStore, SharedStore};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the display refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum timer fires per pump to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play field (portrait phone, points)
    pub const FIELD_WIDTH: f32 = 390.0;
    pub const FIELD_HEIGHT: f32 = 844.0;

    // --- Jump platformer ---
    pub const GRAVITY: f32 = 800.0;
    pub const JUMP_FORCE: f32 = 400.0;
    pub const MOVE_SPEED: f32 = 200.0;
    pub const PLAYER_RADIUS: f32 = 20.0;
    /// Horizontal velocity multiplier applied every tick
    pub const HORIZONTAL_DAMPING: f32 = 0.9;
    pub const COIN_PICKUP_RADIUS: f32 = 30.0;
    pub const COIN_SIZE: f32 = 30.0;
    pub const COIN_VALUE: u64 = 10;
    pub const MAX_COINS: usize = 5;
    pub const PLATFORM_HEIGHT: f32 = 20.0;
    pub const PLATFORM_MIN_WIDTH: f32 = 80.0;
    pub const PLATFORM_MAX_WIDTH: f32 = 120.0;
    pub const PLATFORM_MIN_GAP: f32 = 150.0;
    pub const PLATFORM_MAX_GAP: f32 = 250.0;
    /// Keep generating while the topmost platform is this close to the view top
    pub const SPAWN_THRESHOLD: f32 = 200.0;
    /// Margin kept free of spawns along the side walls
    pub const SPAWN_EDGE_MARGIN: f32 = 50.0;
    /// How far below the view the player may fall before the run ends
    pub const FALL_MARGIN: f32 = 100.0;
    /// How far below the view entities survive before removal
    pub const DESPAWN_MARGIN: f32 = 200.0;
    pub const TARGET_SCORE: u64 = 1000;
    pub const INITIAL_PLATFORMS: usize = 5;
    pub const INITIAL_COINS: usize = 3;
    pub const INITIAL_PLATFORM_SPACING: f32 = 150.0;
    /// Height of the starting platform above the field bottom
    pub const START_HEIGHT: f32 = 150.0;

    // --- Egg catcher ---
    pub const BASKET_WIDTH: f32 = 100.0;
    pub const BASKET_HEIGHT: f32 = 60.0;
    /// Distance from the field bottom to the basket center
    pub const BASKET_BOTTOM_OFFSET: f32 = 120.0;
    /// Forgiveness zone added around the visual basket
    pub const PICKUP_MARGIN_WIDTH: f32 = 40.0;
    pub const PICKUP_MARGIN_HEIGHT: f32 = 20.0;
    pub const EGG_WIDTH: f32 = 40.0;
    pub const EGG_HEIGHT: f32 = 50.0;
    pub const FALL_SPEED: f32 = 200.0;
    pub const POINTS_PER_CATCH: u64 = 10;
    pub const TARGET_EGGS: u32 = 10;
    pub const STARTING_LIVES: u8 = 3;
    pub const BASKET_MOVE_STEP: f32 = 50.0;
    pub const BASKET_HOLD_STEP: f32 = 5.0;
    /// Seconds between egg spawns
    pub const SPAWN_INTERVAL: f32 = 1.5;
    /// Seconds between held-direction basket steps
    pub const HOLD_INTERVAL: f32 = 1.0 / 60.0;

    /// Cosmetic skin used when the settings store has none
    pub const DEFAULT_SKIN: &str = "hero";
}

/// Horizontal direction for movement commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// Unit sign along the x axis
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }
}

/// Clamp a center coordinate so an object of `half_extent` stays inside `[0, limit]`
#[inline]
pub fn clamp_to_field(center: f32, half_extent: f32, limit: f32) -> f32 {
    center.clamp(half_extent, limit - half_extent)
}
