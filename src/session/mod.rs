//! Session state machine
//!
//! `Session` is the persisted state; `Game` owns it together with the
//! content, settings and store, and exposes the player actions. Front ends
//! render from `Game::snapshot` and drain `Game::take_events` for cues.

pub mod game;
pub mod state;

pub use game::{ActionError, FoundWord, Game, LevelStartError, PrimaryAction, Resumed, Reveal, Snapshot, WordEntry};
pub use state::{Session, SessionPhase};

use crate::puzzle::CellPos;

/// Something the front end should react to (sound, message, highlight)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    LevelStarted { level: u32, grid_size: usize },
    WordFound { word: String, points: i64 },
    /// A multi-cell selection that matched nothing
    SelectionRejected { length: usize },
    LevelComplete { level: u32, points_earned: i64 },
    HintUsed { word: String, cell: CellPos },
    /// Informational message (retries, mode fallback)
    Notice(String),
}
