//! Game state and core simulation types
//!
//! Passive data only. The engines in `jump` and `catch` are the only code
//! that mutates these during a session.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Rect, Size2};
use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Ticks are dropped until resumed
    Paused,
    /// Run lost
    GameOver,
    /// Run won
    Victory,
}

impl GamePhase {
    /// GameOver and Victory end the session until an explicit restart
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }
}

/// Something that happened during a tick, delivered to session observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    ScoreChanged { score: u64 },
    Landed { platform_id: u32 },
    CoinCollected { coin_id: u32, value: u64 },
    ItemSpawned { item_id: u32 },
    ItemCaught { item_id: u32, points: u64 },
    ItemMissed { item_id: u32, lives: u8 },
}

/// A platform the jumping player can land on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub position: Vec2,
    pub size: Size2,
    /// Cleared once the platform scrolls below the view
    pub active: bool,
}

impl Platform {
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }

    /// y of the landing surface (world y points up)
    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y + self.size.height / 2.0
    }
}

/// A collectible coin floating above the platforms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub position: Vec2,
    pub size: Size2,
    pub collected: bool,
    pub value: u64,
}

impl Coin {
    pub fn new(id: u32, position: Vec2, value: u64) -> Self {
        Self {
            id,
            position,
            size: Size2::new(COIN_SIZE, COIN_SIZE),
            collected: false,
            value,
        }
    }
}

/// The jumping player (a ball of `radius`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

impl Player {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius,
        }
    }

    /// Bounding box of the ball
    pub fn rect(&self) -> Rect {
        Rect::from_center(
            self.position,
            Size2::new(self.radius * 2.0, self.radius * 2.0),
        )
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.position.y - self.radius
    }
}

/// An egg falling toward the basket (field y points down)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingItem {
    pub id: u32,
    pub position: Vec2,
    pub size: Size2,
    /// Cosmetic skin identifier chosen in settings
    pub item_kind: String,
    pub caught: bool,
}

impl FallingItem {
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y - self.size.height / 2.0
    }
}

/// The catcher's basket; only `x` moves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    pub x: f32,
    pub y: f32,
    pub size: Size2,
}

impl Basket {
    pub fn rect(&self) -> Rect {
        Rect::from_center(Vec2::new(self.x, self.y), self.size)
    }

    /// Collision zone, larger than the visual basket
    pub fn pickup_rect(&self, margin_width: f32, margin_height: f32) -> Rect {
        self.rect().expanded(margin_width, margin_height)
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.size.width / 2.0
    }
}

/// Complete jump platformer state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JumpState {
    pub phase: GamePhase,
    pub score: u64,
    pub player: Player,
    /// Insertion order; landing ties resolve to the earliest
    pub platforms: Vec<Platform>,
    pub coins: Vec<Coin>,
    /// Bottom edge of the visible window in world units; only rises
    pub camera_y: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl JumpState {
    pub fn new(player: Player) -> Self {
        Self {
            phase: GamePhase::Playing,
            score: 0,
            player,
            platforms: Vec::new(),
            coins: Vec::new(),
            camera_y: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Most recently created platform (the topmost one)
    pub fn newest_platform(&self) -> Option<&Platform> {
        self.platforms.last()
    }

    /// Coins still waiting to be picked up
    pub fn live_coins(&self) -> usize {
        self.coins.iter().filter(|c| !c.collected).count()
    }

    pub fn set_phase(&mut self, to: GamePhase) {
        if self.phase != to {
            let from = self.phase;
            self.phase = to;
            self.events.push(GameEvent::PhaseChanged { from, to });
        }
    }
}

/// Complete egg catcher state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchState {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub eggs_caught: u32,
    pub basket: Basket,
    pub items: Vec<FallingItem>,
    /// Direction currently held for continuous movement
    pub held: Option<crate::Direction>,
    /// Skin stamped onto newly spawned items
    pub item_kind: String,
    /// Simulation tick counter
    pub time_ticks: u64,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl CatchState {
    pub fn new(basket: Basket, lives: u8, item_kind: String) -> Self {
        Self {
            phase: GamePhase::Playing,
            score: 0,
            lives,
            eggs_caught: 0,
            basket,
            items: Vec::new(),
            held: None,
            item_kind,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn set_phase(&mut self, to: GamePhase) {
        if self.phase != to {
            let from = self.phase;
            self.phase = to;
            self.events.push(GameEvent::PhaseChanged { from, to });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(GamePhase::GameOver.is_terminal());
        assert!(GamePhase::Victory.is_terminal());
        assert!(!GamePhase::Playing.is_terminal());
        assert!(!GamePhase::Paused.is_terminal());
    }

    #[test]
    fn test_set_phase_emits_once() {
        let mut state = JumpState::new(Player::new(Vec2::ZERO, PLAYER_RADIUS));
        state.set_phase(GamePhase::Paused);
        state.set_phase(GamePhase::Paused);
        assert_eq!(
            state.events,
            vec![GameEvent::PhaseChanged {
                from: GamePhase::Playing,
                to: GamePhase::Paused
            }]
        );
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut state = CatchState::new(
            Basket {
                x: 0.0,
                y: 0.0,
                size: Size2::new(BASKET_WIDTH, BASKET_HEIGHT),
            },
            STARTING_LIVES,
            DEFAULT_SKIN.to_string(),
        );
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }
}
