//! Player settings and the key-value store behind them
//!
//! The simulation only touches three keys: the chosen skin, the coin
//! balance and the best score. Everything else is here for the menus.
//! Values are stored JSON-encoded, one key per setting.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SKIN;

/// Storage keys
pub mod keys {
    pub const PLAYER_NAME: &str = "playerName";
    pub const SELECTED_SKIN: &str = "selectedBall";
    pub const TOTAL_COINS: &str = "totalCoins";
    pub const SOUND_ENABLED: &str = "soundEnabled";
    pub const MUSIC_ENABLED: &str = "musicEnabled";
    pub const NOTIFICATIONS_ENABLED: &str = "notificationsEnabled";
    pub const UNLOCKED_LEVELS: &str = "unlockedLevels";
    pub const PLAYER_SCORE: &str = "playerScore";
}

/// Coin balance a new player starts with
pub const STARTING_COINS: u64 = 1000;

/// Untyped key-value storage, no transactional guarantees
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// Store shared between the session and the menus on one thread
pub type SharedStore = Rc<RefCell<dyn SettingsStore>>;

/// In-process store (tests, native builds)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in a [`SharedStore`]
    pub fn shared() -> SharedStore {
        Rc::new(RefCell::new(Self::new()))
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl SettingsStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage().and_then(|s| s.get_item(key).ok().flatten())
    }

    fn set(&mut self, key: &str, value: String) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(key, &value).is_err() {
                log::warn!("LocalStorage rejected write to {}", key);
            }
        }
    }
}

/// Read and decode a value; undecodable values are treated as missing
pub fn read<T: DeserializeOwned>(store: &dyn SettingsStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable setting {}: {}", key, e);
            None
        }
    }
}

/// Encode and write a value
pub fn write<T: Serialize + ?Sized>(store: &mut dyn SettingsStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => store.set(key, json),
        Err(e) => log::warn!("Failed to encode setting {}: {}", key, e),
    }
}

/// Coin balance; a missing or zero balance reads as the starting grant
pub fn coin_balance(store: &dyn SettingsStore) -> u64 {
    match read::<u64>(store, keys::TOTAL_COINS) {
        Some(0) | None => STARTING_COINS,
        Some(coins) => coins,
    }
}

/// Add `amount` to the coin balance, returning the new balance
pub fn credit_coins(store: &mut dyn SettingsStore, amount: u64) -> u64 {
    let balance = coin_balance(store).saturating_add(amount);
    write(store, keys::TOTAL_COINS, &balance);
    balance
}

/// Skin identifier chosen in the shop
pub fn selected_skin(store: &dyn SettingsStore) -> String {
    read(store, keys::SELECTED_SKIN).unwrap_or_else(|| DEFAULT_SKIN.to_string())
}

/// Raise the stored best score; returns true when `score` is a new best
pub fn record_best_score(store: &mut dyn SettingsStore, score: u64) -> bool {
    let best = read::<u64>(store, keys::PLAYER_SCORE).unwrap_or(0);
    if score > best {
        write(store, keys::PLAYER_SCORE, &score);
        true
    } else {
        false
    }
}

/// Typed view over every stored setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub player_name: String,
    pub selected_skin: String,
    pub total_coins: u64,

    // === Audio ===
    pub sound_enabled: bool,
    pub music_enabled: bool,

    pub notifications_enabled: bool,

    // === Progress ===
    pub unlocked_levels: BTreeSet<u32>,
    /// Best score across runs
    pub player_score: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            selected_skin: DEFAULT_SKIN.to_string(),
            total_coins: STARTING_COINS,
            sound_enabled: true,
            music_enabled: true,
            notifications_enabled: true,
            unlocked_levels: BTreeSet::from([1]),
            player_score: 0,
        }
    }
}

impl Settings {
    /// Load every setting, falling back to defaults per key
    pub fn load(store: &dyn SettingsStore) -> Self {
        let defaults = Self::default();
        Self {
            player_name: read(store, keys::PLAYER_NAME).unwrap_or(defaults.player_name),
            selected_skin: selected_skin(store),
            total_coins: coin_balance(store),
            sound_enabled: read(store, keys::SOUND_ENABLED).unwrap_or(defaults.sound_enabled),
            music_enabled: read(store, keys::MUSIC_ENABLED).unwrap_or(defaults.music_enabled),
            notifications_enabled: read(store, keys::NOTIFICATIONS_ENABLED)
                .unwrap_or(defaults.notifications_enabled),
            unlocked_levels: read(store, keys::UNLOCKED_LEVELS)
                .unwrap_or(defaults.unlocked_levels),
            player_score: read(store, keys::PLAYER_SCORE).unwrap_or(defaults.player_score),
        }
    }

    /// Write every setting
    pub fn save(&self, store: &mut dyn SettingsStore) {
        write(store, keys::PLAYER_NAME, &self.player_name);
        write(store, keys::SELECTED_SKIN, &self.selected_skin);
        write(store, keys::TOTAL_COINS, &self.total_coins);
        write(store, keys::SOUND_ENABLED, &self.sound_enabled);
        write(store, keys::MUSIC_ENABLED, &self.music_enabled);
        write(store, keys::NOTIFICATIONS_ENABLED, &self.notifications_enabled);
        write(store, keys::UNLOCKED_LEVELS, &self.unlocked_levels);
        write(store, keys::PLAYER_SCORE, &self.player_score);
        log::info!("Settings saved");
    }

    pub fn unlock_level(&mut self, level: u32) {
        self.unlocked_levels.insert(level);
    }

    pub fn is_level_unlocked(&self, level: u32) -> bool {
        self.unlocked_levels.contains(&level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_store() {
        let store = MemoryStore::new();
        let settings = Settings::load(&store);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.total_coins, STARTING_COINS);
        assert!(settings.is_level_unlocked(1));
    }

    #[test]
    fn test_save_load_keeps_values() {
        let mut store = MemoryStore::new();
        let mut settings = Settings::default();
        settings.player_name = "Hen".into();
        settings.selected_skin = "ball4".into();
        settings.total_coins = 42;
        settings.music_enabled = false;
        settings.unlock_level(3);
        settings.save(&mut store);

        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_credit_coins() {
        let mut store = MemoryStore::new();
        assert_eq!(credit_coins(&mut store, 10), STARTING_COINS + 10);
        assert_eq!(credit_coins(&mut store, 5), STARTING_COINS + 15);
        assert_eq!(coin_balance(&store), STARTING_COINS + 15);
    }

    #[test]
    fn test_zero_balance_reads_as_grant() {
        let mut store = MemoryStore::new();
        write(&mut store, keys::TOTAL_COINS, &0u64);
        assert_eq!(coin_balance(&store), STARTING_COINS);
    }

    #[test]
    fn test_garbage_value_falls_back() {
        let mut store = MemoryStore::new();
        store.set(keys::SELECTED_SKIN, "{not json".into());
        assert_eq!(selected_skin(&store), DEFAULT_SKIN);
    }

    #[test]
    fn test_best_score_only_rises() {
        let mut store = MemoryStore::new();
        assert!(record_best_score(&mut store, 50));
        assert!(!record_best_score(&mut store, 30));
        assert!(record_best_score(&mut store, 80));
        assert_eq!(read::<u64>(&store, keys::PLAYER_SCORE), Some(80));
    }
}
