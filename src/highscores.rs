//! Local leaderboard
//!
//! Persisted through the settings store, one list per minigame, top 10.

use serde::{Deserialize, Serialize};

use crate::settings::{self, SettingsStore};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Whether the run ended in Victory
    pub won: bool,
    /// Simulation ticks the run lasted
    pub ticks: u64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Whether `score` would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        self.potential_rank(score).is_some()
    }

    /// 1-based rank `score` would take; ties rank below existing entries
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if score == 0 {
            return None;
        }
        let index = self.entries.partition_point(|e| e.score >= score);
        (index < MAX_HIGH_SCORES).then_some(index + 1)
    }

    /// Add a score (if it qualifies), returning the rank achieved
    pub fn add_score(&mut self, score: u64, won: bool, ticks: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.entries
            .insert(rank - 1, HighScoreEntry { score, won, ticks });
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn load(store: &dyn SettingsStore, key: &str) -> Self {
        let scores = settings::read::<HighScores>(store, key).unwrap_or_default();
        log::debug!("Loaded {} high scores from {}", scores.entries.len(), key);
        scores
    }

    pub fn save(&self, store: &mut dyn SettingsStore, key: &str) {
        settings::write(store, key, self);
        log::info!("High scores saved ({} entries)", self.entries.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;

    #[test]
    fn test_zero_never_qualifies() {
        assert!(!HighScores::new().qualifies(0));
    }

    #[test]
    fn test_sorted_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(50, false, 10), Some(1));
        assert_eq!(scores.add_score(100, true, 20), Some(1));
        assert_eq!(scores.add_score(70, false, 30), Some(2));
        let values: Vec<u64> = scores.entries.iter().map(|e| e.score).collect();
        assert_eq!(values, vec![100, 70, 50]);
        assert_eq!(scores.top_score(), Some(100));
    }

    #[test]
    fn test_ties_rank_below_existing() {
        let mut scores = HighScores::new();
        scores.add_score(80, false, 1);
        assert_eq!(scores.potential_rank(80), Some(2));
        assert_eq!(scores.add_score(80, true, 2), Some(2));
        assert!(!scores.entries[0].won);
    }

    #[test]
    fn test_capped_at_max() {
        let mut scores = HighScores::new();
        for s in 1..=MAX_HIGH_SCORES as u64 + 5 {
            scores.add_score(s * 10, false, 0);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(10));
        assert_eq!(scores.add_score(10, false, 0), None);
    }

    #[test]
    fn test_persisted_through_store() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        scores.add_score(90, true, 600);
        scores.save(&mut store, "leaderboard.catch");

        let loaded = HighScores::load(&store, "leaderboard.catch");
        assert_eq!(loaded.entries, scores.entries);
        assert!(HighScores::load(&store, "leaderboard.jump").is_empty());
    }
}
