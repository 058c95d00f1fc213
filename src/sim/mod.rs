//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (creation order)
//! - No rendering, timer or platform dependencies

pub mod catch;
pub mod collision;
pub mod geom;
pub mod jump;
pub mod state;

use std::time::Duration;

pub use catch::CatchGame;
pub use collision::{Landing, coin_in_reach, item_in_pickup, player_platform_landing};
pub use geom::{Rect, Size2, distance};
pub use jump::JumpGame;
pub use state::{
    Basket, CatchState, Coin, FallingItem, GameEvent, GamePhase, JumpState, Platform, Player,
};

/// One minigame variant as seen by the session controller
///
/// Handlers are gated on `GamePhase::Playing` by the implementation, so the
/// session can fire timers unconditionally.
pub trait Simulation {
    /// Reset counters, clear entities, run initial generation, enter Playing
    fn reset(&mut self);

    fn phase(&self) -> GamePhase;

    /// Change phase, recording a `PhaseChanged` event when it differs
    fn set_phase(&mut self, phase: GamePhase);

    fn score(&self) -> u64;

    /// Physics ticks processed since the last reset
    fn elapsed_ticks(&self) -> u64;

    /// Remaining lives, for variants that have them
    fn lives(&self) -> Option<u8> {
        None
    }

    /// Fixed physics timestep
    fn tick_interval(&self) -> Duration;

    /// Period of the spawn timer, if the variant spawns on a timer
    fn spawn_interval(&self) -> Option<Duration> {
        None
    }

    /// Period of the held-direction movement timer, if any
    fn hold_interval(&self) -> Option<Duration> {
        None
    }

    /// Advance physics by `dt` seconds
    fn step(&mut self, dt: f32);

    fn spawn(&mut self) {}

    fn hold_step(&mut self) {}

    /// Whether a direction is currently held
    fn holding(&self) -> bool {
        false
    }

    /// Cosmetic skin for spawned entities
    fn set_skin(&mut self, _skin: &str) {}

    /// Take the events produced since the last call
    fn drain_events(&mut self) -> Vec<GameEvent>;

    /// Settings key of this variant's leaderboard
    fn leaderboard_key(&self) -> &'static str;
}
