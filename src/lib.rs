//! Verse Search - a word-search puzzle game
//!
//! Core modules:
//! - `puzzle`: Grid generation, direction geometry and word selection
//! - `session`: Level state machine (score, hints, skips, mode/language switches)
//! - `content`: Verse corpus and dictionaries, plus offline import tools
//! - `persistence`: Session blob and level history in a key-value store
//! - `platform`: Browser/native platform abstraction (time, storage)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod content;
pub mod history;
pub mod lang;
pub mod persistence;
pub mod platform;
pub mod puzzle;
pub mod session;
pub mod settings;

pub use history::{History, LevelRecord};
pub use lang::{Language, Mode};
pub use session::{Game, GameEvent, Session, SessionPhase};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Target words per level
    pub const WORDS_PER_LEVEL: usize = 10;
    /// Words forced into each direction class per placement attempt
    pub const WORDS_PER_CLASS: usize = 2;
    /// Full placement attempts before generation gives up
    pub const MAX_GENERATION_ATTEMPTS: u32 = 50;
    /// Random (row, col, direction) tries per word within one attempt
    pub const MAX_PLACEMENT_TRIES: u32 = 100;
    /// Level-start retries (insufficient words or failed generation)
    pub const MAX_LEVEL_START_ATTEMPTS: u32 = 25;

    /// Points per letter of a found word
    pub const POINTS_PER_LETTER: i64 = 10;
    /// Cost of revealing a word's start cell
    pub const HINT_COST: i64 = 75;
    /// Cost of skipping an unfinished level
    pub const SKIP_COST: i64 = 100;

    /// Grid size used when no preference is stored
    pub const DEFAULT_GRID_SIZE: usize = 13;
    pub const MIN_GRID_SIZE: usize = 5;
    pub const MAX_GRID_SIZE: usize = 20;

    /// Shortest verse word eligible for a scripture puzzle
    pub const MIN_SCRIPTURE_WORD_LEN: usize = 4;

    /// How long a hinted start cell stays highlighted (ms)
    pub const HINT_HIGHLIGHT_MS: i32 = 1500;
    /// Delay before level generation so the loader can paint (ms)
    pub const LEVEL_START_DELAY_MS: i32 = 50;
}
