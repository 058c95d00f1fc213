//! Game session controller
//!
//! Owns one simulation, the timers that drive it, and the observers that
//! watch it. All calls happen on one thread: timers are fired from `pump()`,
//! which the host calls once per frame.

use glam::Vec2;
use serde::Serialize;

use crate::consts::MAX_SUBSTEPS;
use crate::highscores::HighScores;
use crate::scheduler::{Clock, Scheduler, TimerId, TimerKind};
use crate::settings::{self, SharedStore};
use crate::sim::{
    Basket, CatchGame, Coin, FallingItem, GameEvent, GamePhase, JumpGame, Platform, Simulation,
};
use crate::Direction;

/// Receives every event a session produces, in order
pub trait SessionObserver {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> SessionObserver for F {
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// Handle returned by [`Session::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Lifecycle owner for one simulation
pub struct Session<S: Simulation, C: Clock> {
    sim: S,
    clock: C,
    scheduler: Scheduler,
    hold_timer: Option<TimerId>,
    store: Option<SharedStore>,
    observers: Vec<(SubscriptionId, Box<dyn SessionObserver>)>,
    next_subscription: u64,
    running: bool,
}

impl<S: Simulation, C: Clock> Session<S, C> {
    pub fn new(sim: S, clock: C) -> Self {
        Self {
            sim,
            clock,
            scheduler: Scheduler::new(),
            hold_timer: None,
            store: None,
            observers: Vec::new(),
            next_subscription: 0,
            running: false,
        }
    }

    /// Attach the settings store used for skin, currency and scores
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn subscribe<O: SessionObserver + 'static>(&mut self, observer: O) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Reset the simulation and begin ticking
    ///
    /// A running session is stopped first, so repeated starts never stack
    /// timers.
    pub fn start(&mut self) {
        if self.running {
            self.stop();
        }

        if let Some(store) = &self.store {
            let skin = settings::selected_skin(&*store.borrow());
            self.sim.set_skin(&skin);
        }

        let previous = self.sim.phase();
        self.sim.reset();
        if previous != GamePhase::Playing {
            self.notify(GameEvent::PhaseChanged {
                from: previous,
                to: GamePhase::Playing,
            });
        }

        let now = self.clock.now();
        self.scheduler
            .schedule_repeating(TimerKind::Tick, self.sim.tick_interval(), now);
        if let Some(interval) = self.sim.spawn_interval() {
            self.scheduler
                .schedule_repeating(TimerKind::Spawn, interval, now);
        }
        self.running = true;
        log::info!("Session started");
    }

    /// Cancel every timer. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if !self.running && self.scheduler.is_empty() {
            return;
        }
        self.scheduler.cancel_all();
        self.hold_timer = None;
        self.running = false;
        log::info!("Session stopped");
    }

    pub fn restart(&mut self) {
        self.stop();
        self.start();
    }

    /// Toggle between Playing and Paused; no effect in other phases
    pub fn pause(&mut self) -> bool {
        let target = match self.sim.phase() {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            _ => return false,
        };
        self.sim.set_phase(target);
        self.flush_events();
        true
    }

    /// Leave Paused; no effect in other phases
    pub fn resume(&mut self) -> bool {
        if self.sim.phase() != GamePhase::Paused {
            return false;
        }
        self.sim.set_phase(GamePhase::Playing);
        self.flush_events();
        true
    }

    /// Fire due timers, returning how many fired
    ///
    /// At most `MAX_SUBSTEPS` fire per call; older backlog is dropped rather
    /// than replayed.
    pub fn pump(&mut self) -> u32 {
        if !self.running {
            return 0;
        }
        let now = self.clock.now();
        let mut fired = 0;
        while fired < MAX_SUBSTEPS && self.running {
            let Some(kind) = self.scheduler.pop_due(now) else {
                break;
            };
            self.dispatch(kind);
            fired += 1;
        }
        let skipped = self.scheduler.skip_backlog(now);
        if skipped > 0 {
            log::debug!("Dropped {} overdue timer fires", skipped);
        }
        fired
    }

    fn dispatch(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Tick => {
                let dt = self.sim.tick_interval().as_secs_f32();
                self.sim.step(dt);
            }
            TimerKind::Spawn => self.sim.spawn(),
            TimerKind::HoldMove => self.sim.hold_step(),
        }
        self.flush_events();

        if self.running && self.sim.phase().is_terminal() {
            self.finish_run();
        }
    }

    /// Credit the ledger and forward events to observers
    fn flush_events(&mut self) {
        for event in self.sim.drain_events() {
            if let (GameEvent::ItemCaught { points, .. }, Some(store)) = (&event, &self.store) {
                settings::credit_coins(&mut *store.borrow_mut(), *points);
            }
            self.notify(event);
        }
    }

    fn notify(&mut self, event: GameEvent) {
        for (_, observer) in &mut self.observers {
            observer.on_event(&event);
        }
    }

    /// Stop timers and record the result of a finished run
    fn finish_run(&mut self) {
        let phase = self.sim.phase();
        let score = self.sim.score();
        let ticks = self.sim.elapsed_ticks();
        log::info!("Run ended in {:?} with score {} after {} ticks", phase, score, ticks);
        self.stop();

        if let Some(store) = &self.store {
            let mut store = store.borrow_mut();
            if settings::record_best_score(&mut *store, score) {
                log::info!("New best score: {}", score);
            }
            let key = self.sim.leaderboard_key();
            let mut board = HighScores::load(&*store, key);
            if let Some(rank) = board.add_score(score, phase == GamePhase::Victory, ticks) {
                log::info!("Leaderboard rank {}", rank);
                board.save(&mut *store, key);
            }
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.sim.phase()
    }

    pub fn score(&self) -> u64 {
        self.sim.score()
    }

    pub fn lives(&self) -> Option<u8> {
        self.sim.lives()
    }

    /// Whether timers are live (between start and stop/terminal)
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of live timers
    pub fn active_timers(&self) -> usize {
        self.scheduler.len()
    }

    /// Read-only access for renderers
    pub fn simulation(&self) -> &S {
        &self.sim
    }

    #[cfg(test)]
    pub(crate) fn simulation_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    /// Commands only apply to a running, unpaused session
    fn accepting_input(&self) -> bool {
        self.running && self.sim.phase() == GamePhase::Playing
    }
}

/// Per-frame view of the platformer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JumpSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub player_position: Vec2,
    pub player_radius: f32,
    pub camera_y: f32,
    pub platforms: Vec<Platform>,
    pub coins: Vec<Coin>,
}

impl<C: Clock> Session<JumpGame, C> {
    pub fn submit_move(&mut self, direction: Direction) -> bool {
        self.accepting_input() && self.sim.move_toward(direction)
    }

    pub fn move_left(&mut self) -> bool {
        self.submit_move(Direction::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.submit_move(Direction::Right)
    }

    pub fn jump(&mut self) -> bool {
        self.accepting_input() && self.sim.jump()
    }

    pub fn snapshot(&self) -> JumpSnapshot {
        let state = &self.sim.state;
        JumpSnapshot {
            phase: state.phase,
            score: state.score,
            player_position: state.player.position,
            player_radius: state.player.radius,
            camera_y: state.camera_y,
            platforms: state.platforms.clone(),
            coins: state.coins.clone(),
        }
    }
}

/// Per-frame view of the catcher
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub eggs_caught: u32,
    pub basket: Basket,
    pub items: Vec<FallingItem>,
}

impl<C: Clock> Session<CatchGame, C> {
    /// Instant basket step
    pub fn submit_move(&mut self, direction: Direction) -> bool {
        self.accepting_input() && self.sim.move_basket(direction)
    }

    pub fn move_left(&mut self) -> bool {
        self.submit_move(Direction::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.submit_move(Direction::Right)
    }

    pub fn start_move_left(&mut self) -> bool {
        self.start_move(Direction::Left)
    }

    pub fn stop_move_left(&mut self) -> bool {
        self.stop_move(Direction::Left)
    }

    pub fn start_move_right(&mut self) -> bool {
        self.start_move(Direction::Right)
    }

    pub fn stop_move_right(&mut self) -> bool {
        self.stop_move(Direction::Right)
    }

    fn start_move(&mut self, direction: Direction) -> bool {
        if !self.accepting_input() || !self.sim.press(direction) {
            return false;
        }
        if self.hold_timer.is_none() {
            let Some(interval) = self.sim.hold_interval() else {
                return true;
            };
            let now = self.clock.now();
            self.hold_timer =
                Some(self.scheduler.schedule_repeating(TimerKind::HoldMove, interval, now));
        }
        true
    }

    fn stop_move(&mut self, direction: Direction) -> bool {
        let released = self.sim.release(direction);
        if !self.sim.holding() {
            if let Some(id) = self.hold_timer.take() {
                self.scheduler.cancel(id);
            }
        }
        released
    }

    pub fn snapshot(&self) -> CatchSnapshot {
        let state = &self.sim.state;
        CatchSnapshot {
            phase: state.phase,
            score: state.score,
            lives: state.lives,
            eggs_caught: state.eggs_caught,
            basket: state.basket.clone(),
            items: state.items.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::config::{CatchConfig, JumpConfig};
    use crate::consts::*;
    use crate::scheduler::VirtualClock;
    use crate::settings::{MemoryStore, STARTING_COINS, keys};
    use crate::sim::Size2;

    const FRAME: Duration = Duration::from_millis(16);

    fn catch_session(config: CatchConfig) -> (Session<CatchGame, VirtualClock>, VirtualClock) {
        let clock = VirtualClock::new();
        let game = CatchGame::new(config, 77).expect("valid config");
        (Session::new(game, clock.clone()), clock)
    }

    fn jump_session() -> (Session<JumpGame, VirtualClock>, VirtualClock) {
        let clock = VirtualClock::new();
        let game = JumpGame::new(JumpConfig::default(), 77).expect("valid config");
        (Session::new(game, clock.clone()), clock)
    }

    /// Advance the clock frame by frame until `done` or `limit` frames pass
    fn run_frames<S: Simulation>(
        session: &mut Session<S, VirtualClock>,
        clock: &VirtualClock,
        limit: usize,
        done: impl Fn(&Session<S, VirtualClock>) -> bool,
    ) {
        for _ in 0..limit {
            if done(session) {
                return;
            }
            clock.advance(FRAME);
            session.pump();
        }
    }

    /// Basket spans the whole field, so every egg is caught
    fn wide_basket() -> CatchConfig {
        CatchConfig {
            basket_width: FIELD_WIDTH,
            ..Default::default()
        }
    }

    fn push_missed_egg(session: &mut Session<CatchGame, VirtualClock>) {
        let state = &mut session.simulation_mut().state;
        let id = state.next_entity_id();
        let x = if state.basket.x > FIELD_WIDTH / 2.0 {
            EGG_WIDTH
        } else {
            FIELD_WIDTH - EGG_WIDTH
        };
        state.items.push(FallingItem {
            id,
            position: Vec2::new(x, FIELD_HEIGHT + EGG_HEIGHT / 2.0 - 1.0),
            size: Size2::new(EGG_WIDTH, EGG_HEIGHT),
            item_kind: DEFAULT_SKIN.into(),
            caught: false,
        });
    }

    #[test]
    fn test_start_schedules_timers() {
        let (mut session, _) = catch_session(CatchConfig::default());
        assert!(!session.is_running());
        session.start();
        assert!(session.is_running());
        assert_eq!(session.active_timers(), 2);

        let (mut jump, _) = jump_session();
        jump.start();
        assert_eq!(jump.active_timers(), 1);
    }

    #[test]
    fn test_repeated_start_does_not_stack_timers() {
        let (mut session, _) = catch_session(CatchConfig::default());
        session.start();
        session.start();
        session.restart();
        assert_eq!(session.active_timers(), 2);
    }

    #[test]
    fn test_stop_cancels_every_timer() {
        let (mut session, clock) = catch_session(CatchConfig::default());
        session.start();
        assert!(session.start_move_left());
        assert_eq!(session.active_timers(), 3);

        session.stop();
        assert_eq!(session.active_timers(), 0);
        assert!(!session.is_running());
        session.stop();

        let before = session.snapshot();
        clock.advance(Duration::from_secs(5));
        assert_eq!(session.pump(), 0);
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_release_cancels_hold_timer() {
        let (mut session, clock) = catch_session(CatchConfig::default());
        session.start();
        session.start_move_right();
        assert_eq!(session.active_timers(), 3);

        let x0 = session.snapshot().basket.x;
        clock.advance(FRAME * 2);
        session.pump();
        assert!(session.snapshot().basket.x > x0);

        assert!(session.stop_move_right());
        assert_eq!(session.active_timers(), 2);
        let x1 = session.snapshot().basket.x;
        clock.advance(FRAME * 2);
        session.pump();
        assert_eq!(session.snapshot().basket.x, x1);
    }

    #[test]
    fn test_pause_twice_returns_to_playing() {
        let (mut session, _) = catch_session(CatchConfig::default());
        session.start();
        assert!(session.pause());
        assert_eq!(session.phase(), GamePhase::Paused);
        assert!(session.pause());
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_resume_only_from_paused() {
        let (mut session, _) = catch_session(CatchConfig::default());
        session.start();
        assert!(!session.resume());
        session.pause();
        assert!(session.resume());
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_paused_ticks_are_dropped() {
        let (mut session, clock) = catch_session(CatchConfig::default());
        session.start();
        // Let the first egg appear and fall a little
        run_frames(&mut session, &clock, 200, |s| {
            s.simulation().state.items.len() == 1
        });
        clock.advance(FRAME);
        session.pump();

        session.pause();
        let frozen = session.snapshot();
        for _ in 0..300 {
            clock.advance(FRAME);
            session.pump();
        }
        assert_eq!(session.snapshot(), frozen);

        // No catch-up on resume: one frame moves one tick's worth
        session.resume();
        clock.advance(FRAME);
        session.pump();
        let dy = session.snapshot().items[0].position.y - frozen.items[0].position.y;
        assert!(dy <= FALL_SPEED * SIM_DT * 2.0);
    }

    #[test]
    fn test_commands_ignored_while_paused() {
        let (mut session, _) = catch_session(CatchConfig::default());
        session.start();
        session.pause();
        let x = session.snapshot().basket.x;
        assert!(!session.move_left());
        assert!(!session.start_move_right());
        assert_eq!(session.snapshot().basket.x, x);
        assert_eq!(session.active_timers(), 2);
    }

    #[test]
    fn test_commands_ignored_before_start() {
        let (mut session, _) = jump_session();
        assert!(!session.jump());
        assert!(!session.move_right());
    }

    #[test]
    fn test_ten_catches_is_victory() {
        let store = MemoryStore::shared();
        let (session, clock) = catch_session(wide_basket());
        let mut session = session.with_store(store.clone());
        session.start();

        run_frames(&mut session, &clock, 4000, |s| s.phase().is_terminal());

        assert_eq!(session.phase(), GamePhase::Victory);
        assert_eq!(session.score(), 100);
        assert_eq!(session.lives(), Some(3));
        assert!(!session.is_running());
        assert_eq!(session.active_timers(), 0);

        // Every catch credited the ledger
        let store = store.borrow();
        assert_eq!(settings::coin_balance(&*store), STARTING_COINS + 100);
        assert_eq!(settings::read::<u64>(&*store, keys::PLAYER_SCORE), Some(100));
        let board = HighScores::load(&*store, "leaderboard.catch");
        assert_eq!(board.top_score(), Some(100));
        assert!(board.entries[0].won);
    }

    #[test]
    fn test_three_misses_is_game_over() {
        let (mut session, clock) = catch_session(CatchConfig::default());
        session.start();
        for _ in 0..3 {
            push_missed_egg(&mut session);
            clock.advance(FRAME * 2);
            session.pump();
        }
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(session.lives(), Some(0));
        assert_eq!(session.active_timers(), 0);
    }

    #[test]
    fn test_terminal_ignores_pause_and_input() {
        let (mut session, clock) = catch_session(CatchConfig::default());
        session.start();
        session.simulation_mut().state.lives = 1;
        push_missed_egg(&mut session);
        clock.advance(FRAME * 2);
        session.pump();
        assert_eq!(session.phase(), GamePhase::GameOver);

        assert!(!session.pause());
        assert!(!session.move_right());
        assert_eq!(session.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_restart_resets_everything() {
        let (mut session, clock) = catch_session(wide_basket());
        session.start();
        run_frames(&mut session, &clock, 4000, |s| s.simulation().state.eggs_caught >= 3);
        push_missed_egg(&mut session);
        clock.advance(FRAME * 2);
        session.pump();
        assert!(session.score() > 0);

        session.restart();
        let snap = session.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.lives, 3);
        assert_eq!(snap.eggs_caught, 0);
        assert!(snap.items.is_empty());
        assert_eq!(session.active_timers(), 2);
    }

    #[test]
    fn test_restart_after_game_over() {
        let (mut session, clock) = catch_session(CatchConfig::default());
        session.start();
        for _ in 0..3 {
            push_missed_egg(&mut session);
            clock.advance(FRAME * 2);
            session.pump();
        }
        assert_eq!(session.phase(), GamePhase::GameOver);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(move |e: &GameEvent| sink.borrow_mut().push(e.clone()));

        session.restart();
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.lives(), Some(3));
        assert!(seen.borrow().contains(&GameEvent::PhaseChanged {
            from: GamePhase::GameOver,
            to: GamePhase::Playing
        }));
    }

    #[test]
    fn test_observers_receive_events() {
        let (mut session, clock) = catch_session(wide_basket());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = session.subscribe(move |e: &GameEvent| sink.borrow_mut().push(e.clone()));
        session.start();

        run_frames(&mut session, &clock, 4000, |s| s.simulation().state.eggs_caught >= 1);
        {
            let events = seen.borrow();
            assert!(events.iter().any(|e| matches!(e, GameEvent::ItemSpawned { .. })));
            assert!(events.iter().any(|e| matches!(e, GameEvent::ItemCaught { .. })));
            assert!(events.contains(&GameEvent::ScoreChanged { score: 10 }));
        }

        assert!(session.unsubscribe(id));
        let count = seen.borrow().len();
        session.pause();
        assert_eq!(seen.borrow().len(), count);
    }

    #[test]
    fn test_skin_read_from_store() {
        let store = MemoryStore::shared();
        settings::write(&mut *store.borrow_mut(), keys::SELECTED_SKIN, "ball2");
        let (session, clock) = catch_session(CatchConfig::default());
        let mut session = session.with_store(store);
        session.start();
        run_frames(&mut session, &clock, 200, |s| !s.simulation().state.items.is_empty());
        assert_eq!(session.snapshot().items[0].item_kind, "ball2");
    }

    #[test]
    fn test_jump_session_moves_player() {
        let (mut session, clock) = jump_session();
        session.start();
        let y0 = session.snapshot().player_position.y;
        assert!(session.jump());
        for _ in 0..10 {
            clock.advance(FRAME);
            session.pump();
        }
        assert!(session.snapshot().player_position.y > y0);
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_jump_session_restart_resets() {
        let (mut session, clock) = jump_session();
        session.start();
        let initial = session.snapshot();
        session.move_right();
        session.jump();
        for _ in 0..30 {
            clock.advance(FRAME);
            session.pump();
        }
        session.restart();
        assert_eq!(session.snapshot(), initial);
    }

    #[test]
    fn test_pump_caps_substeps() {
        let (mut session, clock) = jump_session();
        session.start();
        clock.advance(Duration::from_secs(10));
        assert_eq!(session.pump(), MAX_SUBSTEPS);
        assert_eq!(session.simulation().state.time_ticks, MAX_SUBSTEPS as u64);
        // Backlog was dropped, not queued
        assert_eq!(session.pump(), 0);
    }
}
