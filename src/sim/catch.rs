//! Egg catcher engine
//!
//! Field y points down: eggs appear at the top edge and fall toward the
//! basket near the bottom. Spawning and held-direction movement run on their
//! own timers, separate from the physics tick.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::Simulation;
use super::collision::item_in_pickup;
use super::geom::Size2;
use super::state::{Basket, CatchState, FallingItem, GameEvent, GamePhase};
use crate::config::CatchConfig;
use crate::consts::DEFAULT_SKIN;
use crate::error::ConfigError;
use crate::{Direction, clamp_to_field};

/// Egg catcher: config, seeded RNG and live state
#[derive(Debug, Clone)]
pub struct CatchGame {
    config: CatchConfig,
    seed: u64,
    rng: Pcg32,
    skin: String,
    pub state: CatchState,
}

impl CatchGame {
    pub fn new(config: CatchConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let basket = Self::initial_basket(&config);
        Ok(Self {
            state: CatchState::new(basket, config.lives, DEFAULT_SKIN.to_string()),
            rng: Pcg32::seed_from_u64(seed),
            skin: DEFAULT_SKIN.to_string(),
            config,
            seed,
        })
    }

    fn initial_basket(config: &CatchConfig) -> Basket {
        Basket {
            x: config.field_width / 2.0,
            y: config.field_height - config.basket_bottom_offset,
            size: Size2::new(config.basket_width, config.basket_height),
        }
    }

    pub fn config(&self) -> &CatchConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Seed used by the next `reset()`
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Cosmetic skin stamped on eggs spawned after the next reset
    pub fn skin(&self) -> &str {
        &self.skin
    }

    fn clamp_basket(&mut self) {
        let half = self.state.basket.half_width();
        self.state.basket.x = clamp_to_field(self.state.basket.x, half, self.config.field_width);
    }

    fn shift_basket(&mut self, dx: f32) {
        self.state.basket.x += dx;
        self.clamp_basket();
    }

    /// Instant step of `move_step` in `direction`
    pub fn move_basket(&mut self, direction: Direction) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.shift_basket(direction.sign() * self.config.move_step);
        true
    }

    /// Begin continuous movement; the hold-move timer applies it
    pub fn press(&mut self, direction: Direction) -> bool {
        if self.state.phase != GamePhase::Playing {
            return false;
        }
        self.state.held = Some(direction);
        true
    }

    /// Release a held direction. Releasing a key that is not held is a no-op.
    pub fn release(&mut self, direction: Direction) -> bool {
        if self.state.held == Some(direction) {
            self.state.held = None;
            return true;
        }
        false
    }

    /// Drop a new egg at a random x along the top edge
    pub fn spawn_item(&mut self) -> Option<u32> {
        if self.state.phase != GamePhase::Playing {
            return None;
        }
        let half = self.config.item_width / 2.0;
        let x = self
            .rng
            .random_range(half..=self.config.field_width - half);
        let id = self.state.next_entity_id();
        self.state.items.push(FallingItem {
            id,
            position: Vec2::new(x, 0.0),
            size: Size2::new(self.config.item_width, self.config.item_height),
            item_kind: self.state.item_kind.clone(),
            caught: false,
        });
        self.state.events.push(GameEvent::ItemSpawned { item_id: id });
        log::debug!("Spawned egg {} at x={:.1}", id, x);
        Some(id)
    }
}

impl Simulation for CatchGame {
    fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        let basket = Self::initial_basket(&self.config);
        self.state = CatchState::new(basket, self.config.lives, self.skin.clone());
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

    fn lives(&self) -> Option<u8> {
        Some(self.state.lives)
    }

    fn tick_interval(&self) -> Duration {
        self.config.tick_duration()
    }

    fn spawn_interval(&self) -> Option<Duration> {
        Some(self.config.spawn_duration())
    }

    fn hold_interval(&self) -> Option<Duration> {
        Some(self.config.hold_duration())
    }

    fn step(&mut self, dt: f32) {
        tick(self, dt);
    }

    fn spawn(&mut self) {
        self.spawn_item();
    }

    fn hold_step(&mut self) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        if let Some(direction) = self.state.held {
            self.shift_basket(direction.sign() * self.config.hold_step);
        }
    }

    fn holding(&self) -> bool {
        self.state.held.is_some()
    }

    fn set_skin(&mut self, skin: &str) {
        self.skin = skin.to_string();
        self.state.item_kind = self.skin.clone();
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    fn leaderboard_key(&self) -> &'static str {
        "leaderboard.catch"
    }
}

/// Advance the catcher by one fixed timestep
pub fn tick(game: &mut CatchGame, dt: f32) {
    if game.state.phase != GamePhase::Playing {
        return;
    }
    let cfg = &game.config;
    let state = &mut game.state;
    state.time_ticks += 1;

    let pickup = state
        .basket
        .pickup_rect(cfg.pickup_margin_width, cfg.pickup_margin_height);
    let score_before = state.score;

    // Reverse order so removal never skips an entry
    for i in (0..state.items.len()).rev() {
        if item_in_pickup(&state.items[i], &pickup) {
            let mut item = state.items.remove(i);
            item.caught = true;
            state.score += cfg.points_per_catch;
            state.eggs_caught += 1;
            state.events.push(GameEvent::ItemCaught {
                item_id: item.id,
                points: cfg.points_per_catch,
            });
            continue;
        }

        let item = &mut state.items[i];
        item.position.y += cfg.fall_speed * dt;
        if item.top() > cfg.field_height {
            let id = item.id;
            state.items.remove(i);
            state.lives = state.lives.saturating_sub(1);
            state.events.push(GameEvent::ItemMissed {
                item_id: id,
                lives: state.lives,
            });
        }
    }

    if state.score != score_before {
        state.events.push(GameEvent::ScoreChanged { score: state.score });
    }

    if state.eggs_caught >= cfg.target_eggs {
        log::info!("Caught {} eggs, victory", state.eggs_caught);
        state.set_phase(GamePhase::Victory);
    } else if state.lives == 0 {
        log::info!("Out of lives at score {}", state.score);
        state.set_phase(GamePhase::GameOver);
    }
}
