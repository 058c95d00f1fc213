//! Eggventure headless runner
//!
//! Plays one run of a minigame on a virtual clock with a simple autopilot and
//! logs the outcome. Usage: `eggventure [catch|jump] [seed] [config.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::time::Duration;

    use eggventure::scheduler::VirtualClock;
    use eggventure::session::Session;
    use eggventure::settings::{self, MemoryStore};
    use eggventure::sim::{CatchGame, GameEvent, JumpGame, Simulation};
    use eggventure::{CatchConfig, HighScores, JumpConfig};

    /// Host frame length
    const FRAME: Duration = Duration::from_millis(16);

    /// Give up after ten virtual minutes
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    pub fn run() -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args().skip(1);
        let variant = args.next().unwrap_or_else(|| "catch".to_string());
        let seed = match args.next() {
            Some(s) => s.parse::<u64>()?,
            None => 42,
        };
        let config = args.next().map(std::fs::read_to_string).transpose()?;

        log::info!("Eggventure ({}) starting with seed {}", variant, seed);
        match variant.as_str() {
            "catch" => {
                let config = match config {
                    Some(json) => CatchConfig::from_json(&json)?,
                    None => CatchConfig::default(),
                };
                play_catch(CatchGame::new(config, seed)?)
            }
            "jump" => {
                let config = match config {
                    Some(json) => JumpConfig::from_json(&json)?,
                    None => JumpConfig::default(),
                };
                play_jump(JumpGame::new(config, seed)?)
            }
            other => Err(format!("unknown minigame '{}', expected catch or jump", other).into()),
        }
    }

    /// Follow the lowest egg with the held-move keys
    fn play_catch(game: CatchGame) -> Result<(), Box<dyn Error>> {
        let store = MemoryStore::shared();
        let clock = VirtualClock::new();
        let mut session = Session::new(game, clock.clone()).with_store(store.clone());
        session.subscribe(|event: &GameEvent| log::debug!("{:?}", event));
        session.start();

        for _ in 0..MAX_FRAMES {
            if !session.is_running() {
                break;
            }
            let snap = session.snapshot();
            let target = snap
                .items
                .iter()
                .max_by(|a, b| a.position.y.total_cmp(&b.position.y))
                .map(|item| item.position.x);

            session.stop_move_left();
            session.stop_move_right();
            if let Some(x) = target {
                let dx = x - snap.basket.x;
                if dx < -snap.basket.size.width / 4.0 {
                    session.start_move_left();
                } else if dx > snap.basket.size.width / 4.0 {
                    session.start_move_right();
                }
            }

            clock.advance(FRAME);
            session.pump();
        }

        report(&session, &*store.borrow(), "leaderboard.catch");
        Ok(())
    }

    /// Steer under the next platform above and jump on the way down
    fn play_jump(game: JumpGame) -> Result<(), Box<dyn Error>> {
        let store = MemoryStore::shared();
        let clock = VirtualClock::new();
        let mut session = Session::new(game, clock.clone()).with_store(store.clone());
        session.start();

        for _ in 0..MAX_FRAMES {
            if !session.is_running() {
                break;
            }
            let state = &session.simulation().state;
            let player = state.player.position;
            let falling = state.player.velocity.y < 0.0;
            let target = state
                .platforms
                .iter()
                .filter(|p| p.active && p.top() > player.y)
                .min_by(|a, b| a.position.y.total_cmp(&b.position.y))
                .map(|p| p.position.x);

            if let Some(x) = target {
                if x < player.x - 10.0 {
                    session.move_left();
                } else if x > player.x + 10.0 {
                    session.move_right();
                }
            }
            if falling {
                session.jump();
            }

            clock.advance(FRAME);
            session.pump();
        }

        report(&session, &*store.borrow(), "leaderboard.jump");
        Ok(())
    }

    fn report<S: Simulation>(
        session: &Session<S, VirtualClock>,
        store: &dyn settings::SettingsStore,
        board_key: &str,
    ) {
        log::info!(
            "Finished in {:?}: score {}, lives {:?}",
            session.phase(),
            session.score(),
            session.lives()
        );
        log::info!("Coin balance: {}", settings::coin_balance(store));
        if let Some(best) = HighScores::load(store, board_key).top_score() {
            log::info!("Best on {}: {}", board_key, best);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web hosts drive `Session` directly through the library
}
