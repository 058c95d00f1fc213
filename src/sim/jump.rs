//! Jump platformer engine
//!
//! World y points up. The camera (`camera_y`, the bottom edge of the view)
//! follows the player upward and never scrolls back down.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Simulation;
use super::collision::{coin_in_reach, player_platform_landing};
use super::geom::Size2;
use super::state::{Coin, GameEvent, GamePhase, JumpState, Platform, Player};
use crate::config::JumpConfig;
use crate::consts::*;
use crate::error::ConfigError;
use crate::{Direction, clamp_to_field};

/// Jump platformer: config, seeded RNG and live state
#[derive(Debug, Clone)]
pub struct JumpGame {
    config: JumpConfig,
    seed: u64,
    rng: Pcg32,
    pub state: JumpState,
}

impl JumpGame {
    pub fn new(config: JumpConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut game = Self {
            state: JumpState::new(Player::new(Vec2::ZERO, config.player_radius)),
            rng: Pcg32::seed_from_u64(seed),
            config,
            seed,
        };
        game.reset();
        Ok(game)
    }

    pub fn config(&self) -> &JumpConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Seed used by the next `reset()`
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Start horizontal movement; damping bleeds it off over the next ticks
    pub fn move_toward(&mut self, direction: Direction) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.state.player.velocity.x = direction.sign() * self.config.move_speed;
        true
    }

    /// Give the player upward velocity (allowed mid-air)
    pub fn jump(&mut self) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.state.player.velocity.y = self.config.jump_force;
        true
    }

    /// Top edge of the visible window
    pub fn visible_top(&self) -> f32 {
        self.state.camera_y + self.config.field_height
    }

    fn random_x(&mut self) -> f32 {
        let margin = self.config.edge_margin;
        self.rng.random_range(margin..=self.config.field_width - margin)
    }

    fn spawn_platform(&mut self, y: f32) {
        let x = self.random_x();
        let width = self
            .rng
            .random_range(self.config.platform_min_width..=self.config.platform_max_width);
        let id = self.state.next_entity_id();
        self.state.platforms.push(Platform {
            id,
            position: Vec2::new(x, y),
            size: Size2::new(width, self.config.platform_height),
            active: true,
        });
    }

    fn spawn_coin(&mut self, y: f32) {
        let x = self.random_x();
        let id = self.state.next_entity_id();
        self.state
            .coins
            .push(Coin::new(id, Vec2::new(x, y), self.config.coin_value));
    }

    /// Starting platform under the player plus a short ladder above it
    fn generate_initial_level(&mut self) {
        let start_y = START_HEIGHT;
        let player_x = self.config.field_width / 2.0;

        let id = self.state.next_entity_id();
        self.state.platforms.push(Platform {
            id,
            position: Vec2::new(player_x, start_y),
            size: Size2::new(self.config.platform_max_width, self.config.platform_height),
            active: true,
        });
        let surface = start_y + self.config.platform_height / 2.0;
        self.state.player.position = Vec2::new(player_x, surface + self.config.player_radius);

        for i in 1..INITIAL_PLATFORMS {
            self.spawn_platform(start_y + i as f32 * INITIAL_PLATFORM_SPACING);
        }
        for i in 1..=INITIAL_COINS {
            self.spawn_coin(start_y + i as f32 * INITIAL_PLATFORM_SPACING + 50.0);
        }

        log::debug!(
            "Initial level: {} platforms, {} coins",
            self.state.platforms.len(),
            self.state.coins.len()
        );
    }

    /// Cull what scrolled away, then extend the level upward
    fn generate(&mut self) {
        let view_bottom = self.state.camera_y;
        let despawn_line = view_bottom - self.config.despawn_margin;

        for platform in &mut self.state.platforms {
            if platform.top() < view_bottom {
                platform.active = false;
            }
        }
        self.state
            .platforms
            .retain(|p| p.active || p.top() >= despawn_line);
        self.state
            .coins
            .retain(|c| !c.collected && c.position.y >= despawn_line);

        let top_y = self.state.newest_platform().map(|p| p.position.y);
        let needs_platform = match top_y {
            Some(y) => y < self.visible_top() + self.config.spawn_threshold,
            None => true,
        };
        if needs_platform {
            let base = top_y.unwrap_or(self.state.player.position.y);
            let gap = self
                .rng
                .random_range(self.config.min_gap..=self.config.max_gap);
            self.spawn_platform(base + gap);
        }

        if self.state.live_coins() < self.config.max_coins {
            let base = self
                .state
                .newest_platform()
                .map(|p| p.position.y)
                .unwrap_or(self.state.player.position.y + self.config.field_height / 2.0);
            let offset = self.rng.random_range(50.0..=150.0);
            self.spawn_coin(base + offset);
        }
    }
}

impl Simulation for JumpGame {
    fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.state = JumpState::new(Player::new(Vec2::ZERO, self.config.player_radius));
        self.generate_initial_level();
    }

    fn phase(&self) -> GamePhase {
        self.state.phase
    }

    fn set_phase(&mut self, phase: GamePhase) {
        self.state.set_phase(phase);
    }

    fn score(&self) -> u64 {
        self.state.score
    }

    fn elapsed_ticks(&self) -> u64 {
        self.state.time_ticks
    }

    fn tick_interval(&self) -> Duration {
        self.config.tick_duration()
    }

    fn step(&mut self, dt: f32) {
        tick(self, dt);
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    fn leaderboard_key(&self) -> &'static str {
        "leaderboard.jump"
    }
}

/// Advance the platformer by one fixed timestep
pub fn tick(game: &mut JumpGame, dt: f32) {
    if game.state.phase != GamePhase::Playing {
        return;
    }
    game.state.time_ticks += 1;

    let cfg = game.config.clone();
    let state = &mut game.state;
    let prev_bottom = state.player.bottom();

    // Gravity, then integration
    state.player.velocity.y -= cfg.gravity * dt;
    let vel = state.player.velocity;
    state.player.position += vel * dt;

    // Walls stop, they do not bounce
    let clamped = clamp_to_field(
        state.player.position.x,
        cfg.player_radius,
        cfg.field_width,
    );
    if clamped != state.player.position.x {
        state.player.position.x = clamped;
        state.player.velocity.x = 0.0;
    }

    // First platform in creation order wins
    let landing = state.platforms.iter().find_map(|platform| {
        player_platform_landing(&state.player, prev_bottom, platform).map(|l| (platform.id, l))
    });
    if let Some((platform_id, landing)) = landing {
        state.player.position.y = landing.rest_y;
        state.player.velocity.y = 0.0;
        state.events.push(GameEvent::Landed { platform_id });
    }

    state.camera_y = state
        .camera_y
        .max(state.player.position.y - cfg.field_height / 2.0);

    // Coins are independent of each other
    let player_pos = state.player.position;
    let mut gained = 0;
    for coin in &mut state.coins {
        if coin_in_reach(player_pos, coin, cfg.pickup_radius) {
            coin.collected = true;
            gained += coin.value;
            state.events.push(GameEvent::CoinCollected {
                coin_id: coin.id,
                value: coin.value,
            });
        }
    }
    if gained > 0 {
        state.score += gained;
        state.events.push(GameEvent::ScoreChanged { score: state.score });
    }

    game.generate();

    // Reaching the target wins even on the tick the player falls out
    let state = &mut game.state;
    if state.score >= cfg.target_score {
        log::info!("Target score {} reached", cfg.target_score);
        state.set_phase(GamePhase::Victory);
    } else if state.player.position.y < state.camera_y - cfg.fall_margin {
        log::info!("Player fell out of view at score {}", state.score);
        state.set_phase(GamePhase::GameOver);
    }

    state.player.velocity.x *= cfg.damping;
}
