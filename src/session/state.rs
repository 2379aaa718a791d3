//! Session state
//!
//! Everything that must survive a page reload lives here, including the RNG
//! so a resumed game keeps drawing from the same stream.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GRID_SIZE, POINTS_PER_LETTER};
use crate::history::LevelRecord;
use crate::lang::{Language, Mode};
use crate::puzzle::{CellPos, ChapterPlaylist, Grid};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionPhase {
    /// No playable level (new session, or level start gave up)
    #[default]
    Idle,
    /// Words left to find
    LevelActive,
    /// All words found, waiting for the player to advance
    LevelComplete,
}

/// Complete game session (serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub level: u32,
    pub score: i64,
    pub language: Language,
    pub mode: Mode,
    pub phase: SessionPhase,
    /// The level's target words
    pub words: Vec<String>,
    /// Found words in the order they were found
    pub found_words: Vec<String>,
    pub grid: Grid,
    pub word_locations: BTreeMap<String, CellPos>,
    /// Record of the level in progress
    pub record: Option<LevelRecord>,
    #[serde(default)]
    pub playlist: ChapterPlaylist,
    /// Grid size fixed at level start
    pub grid_size: usize,
    /// Preference changed since the level started
    #[serde(default)]
    pub grid_size_changed: bool,
    #[serde(default)]
    pub clock_running: bool,
}

impl Session {
    pub fn new(language: Language, mode: Mode, score: i64, seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level: 1,
            score,
            language,
            mode,
            phase: SessionPhase::Idle,
            words: Vec::new(),
            found_words: Vec::new(),
            grid: Grid::default(),
            word_locations: BTreeMap::new(),
            record: None,
            playlist: ChapterPlaylist::default(),
            grid_size: DEFAULT_GRID_SIZE,
            grid_size_changed: false,
            clock_running: false,
        }
    }

    pub fn is_target(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    pub fn is_found(&self, word: &str) -> bool {
        self.found_words.iter().any(|w| w == word)
    }

    /// All target words found
    pub fn is_complete(&self) -> bool {
        !self.words.is_empty() && self.found_words.len() == self.words.len()
    }

    /// Seconds on the level clock
    pub fn elapsed_seconds(&self) -> u32 {
        self.record.as_ref().map_or(0, |r| r.elapsed_seconds)
    }

    /// Record a found word; returns the points awarded, or `None` when the
    /// word is not a target or was already found
    pub(crate) fn mark_found(&mut self, word: &str) -> Option<i64> {
        if !self.is_target(word) || self.is_found(word) {
            return None;
        }
        let points = POINTS_PER_LETTER * word.chars().count() as i64;
        self.found_words.push(word.to_string());
        self.score += points;
        if let Some(record) = self.record.as_mut() {
            record.points_earned += points;
            record.words_found = self.found_words.len();
        }
        Some(points)
    }

    /// Drop the current level's puzzle
    pub(crate) fn clear_level(&mut self) {
        self.words.clear();
        self.found_words.clear();
        self.grid = Grid::default();
        self.word_locations.clear();
        self.record = None;
        self.clock_running = false;
    }

    /// Structural checks for a session loaded from storage
    pub fn is_consistent(&self) -> bool {
        if self.level == 0 {
            return false;
        }
        if self.phase == SessionPhase::Idle {
            return true;
        }
        let unique_found = self
            .found_words
            .iter()
            .enumerate()
            .all(|(i, w)| self.is_target(w) && !self.found_words[..i].contains(w));
        self.record.is_some()
            && self.grid.size() == self.grid_size
            && self.word_locations.len() == self.words.len()
            && unique_found
            && (self.phase == SessionPhase::LevelComplete) == self.is_complete()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_words() -> Session {
        let mut s = Session::new(Language::English, Mode::Standard, 0, 1);
        s.words = vec!["CAT".into(), "HORSE".into()];
        s.record = Some(LevelRecord::new(1, Mode::Standard.label(Language::English), 0.0));
        s
    }

    #[test]
    fn test_mark_found_scores_by_letters() {
        let mut s = session_with_words();
        assert_eq!(s.mark_found("CAT"), Some(30));
        assert_eq!(s.score, 30);
        assert_eq!(s.record.as_ref().unwrap().words_found, 1);
    }

    #[test]
    fn test_mark_found_is_idempotent() {
        let mut s = session_with_words();
        s.mark_found("CAT");
        assert_eq!(s.mark_found("CAT"), None);
        assert_eq!(s.mark_found("DOG"), None);
        assert_eq!(s.score, 30);
        assert_eq!(s.found_words, ["CAT"]);
    }

    #[test]
    fn test_complete_when_all_found() {
        let mut s = session_with_words();
        assert!(!s.is_complete());
        s.mark_found("HORSE");
        s.mark_found("CAT");
        assert!(s.is_complete());
    }

    #[test]
    fn test_new_session_is_idle_and_consistent() {
        let s = Session::new(Language::Romanian, Mode::Scripture, 0, 9);
        assert_eq!(s.phase, SessionPhase::Idle);
        assert_eq!(s.level, 1);
        assert!(s.is_consistent());
    }

    #[test]
    fn test_rng_state_survives_serde() {
        use rand::Rng;

        let mut s = Session::new(Language::English, Mode::Standard, 0, 77);
        let _: u32 = s.rng.random();
        let json = serde_json::to_string(&s).unwrap();
        let mut back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.rng.random::<u64>(), s.rng.random::<u64>());
    }
}
