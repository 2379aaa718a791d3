//! Game controller
//!
//! Owns the session and applies player actions to it. Every mutating
//! action persists the session before returning.

use rand::Rng;
use thiserror::Error;

use super::GameEvent;
use super::state::{Session, SessionPhase};
use crate::consts::{HINT_COST, MAX_LEVEL_START_ATTEMPTS, SKIP_COST};
use crate::content::Content;
use crate::history::{History, LevelRecord};
use crate::lang::{Language, Mode};
use crate::persistence;
use crate::platform::{KeyValueStore, now_ms};
use crate::puzzle::words::{fold_cedilla, select_scripture, select_standard};
use crate::puzzle::{CellPos, Grid, SelectionError, generate};
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelStartError {
    #[error("no playable level found after {attempts} attempts")]
    ContentExhausted { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("not enough points: {needed} needed, {available} available")]
    InsufficientScore { needed: i64, available: i64 },
    #[error("'{0}' was already found")]
    AlreadyFound(String),
    #[error("'{0}' is not in this puzzle")]
    UnknownWord(String),
    #[error("selection is not a straight line")]
    NotStraight,
    #[error("{0} is not available right now")]
    NotAvailable(&'static str),
    #[error(transparent)]
    LevelStart(#[from] LevelStartError),
}

/// What the main button does in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    NextLevel,
    /// Rebuild the level at the new grid size (also retries an idle session)
    Regenerate,
    Skip { cost: i64 },
}

impl PrimaryAction {
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::NextLevel => "Next Level",
            PrimaryAction::Regenerate => "New Puzzle (new size)",
            PrimaryAction::Skip { .. } => "New Puzzle / Skip",
        }
    }
}

/// Extra text shown when a word is found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reveal {
    Verse {
        word: String,
        reference: String,
        text: String,
    },
    Definition {
        word: String,
        definition: String,
    },
    Nothing,
}

impl Reveal {
    /// Verse text split around the first occurrence of the word
    /// (case-insensitive): `(before, word, after)`
    pub fn highlighted(&self) -> Option<(String, String, String)> {
        let Reveal::Verse { word, text, .. } = self else {
            return None;
        };
        let chars: Vec<char> = text.chars().collect();
        let target: Vec<char> = word.chars().collect();
        let n = target.len();
        let fold = |c: char| fold_cedilla(c.to_uppercase().next().unwrap_or(c));
        let start = (0..=chars.len().checked_sub(n)?)
            .find(|&i| chars[i..i + n].iter().zip(&target).all(|(&a, &b)| fold(a) == b))?;
        Some((
            chars[..start].iter().collect(),
            chars[start..start + n].iter().collect(),
            chars[start + n..].iter().collect(),
        ))
    }
}

/// Result of an accepted selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundWord {
    pub word: String,
    pub points: i64,
    pub reveal: Reveal,
    pub level_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub found: bool,
    /// Cells covered by the word once found
    pub cells: Vec<CellPos>,
}

/// Observable state for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub grid: Grid,
    /// Alphabetical
    pub words: Vec<WordEntry>,
    pub score: i64,
    pub level: u32,
    pub elapsed_seconds: u32,
    pub hints_used: u32,
    pub phase: SessionPhase,
    pub primary_action: PrimaryAction,
    pub language: Language,
    pub mode: Mode,
    /// Size of the grid on screen
    pub grid_size: usize,
    /// Size the next level will use
    pub pending_grid_size: usize,
    pub muted: bool,
}

/// How `Game::resume` got to a playable state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resumed {
    Continued,
    Completed,
    NewGame,
}

pub struct Game<S: KeyValueStore> {
    content: Content,
    store: S,
    settings: Settings,
    session: Session,
    events: Vec<GameEvent>,
}

impl<S: KeyValueStore> Game<S> {
    /// Create an idle game; call `resume` or `start_new_game` next
    pub fn new(content: Content, store: S, seed: u64) -> Self {
        let settings = Settings::load(&store);
        Self {
            content,
            store,
            settings,
            session: Session::new(Language::default(), Mode::default(), 0, seed),
            events: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Restore the saved session, or start a default game
    pub fn resume(&mut self) -> Result<Resumed, LevelStartError> {
        match persistence::load_session(&mut self.store) {
            Some(session) if session.is_consistent() => {
                self.session = session;
                match self.session.phase {
                    SessionPhase::LevelComplete => {
                        self.session.clock_running = false;
                        Ok(Resumed::Completed)
                    }
                    SessionPhase::LevelActive => {
                        self.session.clock_running = true;
                        log::info!("Resuming level {}", self.session.level);
                        Ok(Resumed::Continued)
                    }
                    SessionPhase::Idle => {
                        self.start_level()?;
                        Ok(Resumed::Continued)
                    }
                }
            }
            saved => {
                if saved.is_some() {
                    log::warn!("Saved session is inconsistent, starting fresh");
                    persistence::clear_session(&mut self.store);
                }
                self.start_new_game(Language::default(), Mode::default(), 0)?;
                Ok(Resumed::NewGame)
            }
        }
    }

    pub fn start_new_game(
        &mut self,
        language: Language,
        mode: Mode,
        score: i64,
    ) -> Result<(), LevelStartError> {
        self.begin(language, mode, score, 1)
    }

    /// Fresh session (new playlist) at a given level
    fn begin(
        &mut self,
        language: Language,
        mode: Mode,
        score: i64,
        level: u32,
    ) -> Result<(), LevelStartError> {
        let seed = self.session.rng.random::<u64>();
        self.session = Session::new(language, mode, score, seed);
        self.session.level = level;
        log::info!(
            "New game: {} at level {} (score {})",
            mode.label(language),
            level,
            score
        );
        self.start_level()
    }

    /// Pick words and build the grid for the current level.
    ///
    /// Too few words moves on to the next level; a failed layout picks a
    /// new word set. Both share one attempt budget.
    fn start_level(&mut self) -> Result<(), LevelStartError> {
        let s = &mut self.session;
        s.clear_level();
        s.phase = SessionPhase::Idle;
        s.grid_size = self.settings.grid_size;
        s.grid_size_changed = false;

        for attempt in 1..=MAX_LEVEL_START_ATTEMPTS {
            let selection = match s.mode {
                Mode::Standard => match self.content.dictionary(s.language) {
                    Some(dict) => select_standard(dict, s.grid_size, &mut s.rng),
                    None => Err(SelectionError::InsufficientWords {
                        found: 0,
                        needed: crate::consts::WORDS_PER_LEVEL,
                    }),
                },
                Mode::Scripture => select_scripture(
                    self.content.corpus.bible(s.language),
                    &mut s.playlist,
                    s.level,
                    s.language,
                    s.grid_size,
                    &mut s.rng,
                ),
            };

            let set = match selection {
                Ok(set) => set,
                Err(SelectionError::InsufficientWords { found, .. }) => {
                    log::warn!(
                        "Level {} has only {} usable words (attempt {}), trying the next level",
                        s.level,
                        found,
                        attempt
                    );
                    self.events.push(GameEvent::Notice(
                        "Not enough unique words for this level. Trying another level.".into(),
                    ));
                    s.level = s.level.saturating_add(1);
                    continue;
                }
                Err(e @ SelectionError::NoScripture { .. }) => {
                    log::warn!("{}, switching to Standard mode", e);
                    self.events.push(GameEvent::Notice(format!(
                        "Scripture is not available for {}. Switching to Standard mode.",
                        s.language.as_str()
                    )));
                    s.mode = Mode::Standard;
                    s.playlist.clear();
                    continue;
                }
            };

            match generate(&set.words, s.grid_size, s.language.alphabet(), &mut s.rng) {
                Ok(puzzle) => {
                    let mut record = LevelRecord::new(s.level, s.mode.label(s.language), now_ms());
                    record.verse_map = set.provenance;
                    s.words = set.words;
                    s.grid = puzzle.grid;
                    s.word_locations = puzzle.locations;
                    s.record = Some(record);
                    s.phase = SessionPhase::LevelActive;
                    s.clock_running = true;
                    log::info!(
                        "Level {} ready: {}x{} {}",
                        s.level,
                        s.grid_size,
                        s.grid_size,
                        s.mode.label(s.language)
                    );
                    self.events.push(GameEvent::LevelStarted {
                        level: s.level,
                        grid_size: s.grid_size,
                    });
                    persistence::save_session(&mut self.store, &self.session);
                    return Ok(());
                }
                Err(e) => {
                    log::warn!("Puzzle generation failed ({}), picking new words", e);
                    self.events.push(GameEvent::Notice(
                        "The puzzle generator failed. Trying a new puzzle for this level.".into(),
                    ));
                }
            }
        }

        log::error!(
            "Giving up after {} level start attempts",
            MAX_LEVEL_START_ATTEMPTS
        );
        persistence::save_session(&mut self.store, &self.session);
        Err(LevelStartError::ContentExhausted {
            attempts: MAX_LEVEL_START_ATTEMPTS,
        })
    }

    fn require_active(&self, action: &'static str) -> Result<(), ActionError> {
        if self.session.phase == SessionPhase::LevelActive {
            Ok(())
        } else {
            Err(ActionError::NotAvailable(action))
        }
    }

    /// Submit a dragged selection of cells
    pub fn submit_selection(&mut self, cells: &[CellPos]) -> Result<FoundWord, ActionError> {
        self.require_active("selection")?;
        let forward = match self.session.grid.is_straight_run(cells) {
            true => self.session.grid.read(cells),
            false => None,
        };
        let Some(forward) = forward else {
            self.reject(cells.len());
            return Err(ActionError::NotStraight);
        };
        self.submit_candidate(forward, cells.len())
    }

    /// Submit a typed word (matched forward or backward)
    pub fn submit_word(&mut self, candidate: &str) -> Result<FoundWord, ActionError> {
        self.require_active("selection")?;
        let word: String = candidate
            .trim()
            .chars()
            .flat_map(char::to_uppercase)
            .map(fold_cedilla)
            .collect();
        let len = word.chars().count();
        self.submit_candidate(word, len)
    }

    fn submit_candidate(&mut self, forward: String, len: usize) -> Result<FoundWord, ActionError> {
        let backward: String = forward.chars().rev().collect();
        for candidate in [&forward, &backward] {
            if let Some(points) = self.session.mark_found(candidate) {
                return Ok(self.word_found(candidate.clone(), points));
            }
        }

        self.reject(len);
        if self.session.is_target(&forward) {
            Err(ActionError::AlreadyFound(forward))
        } else if self.session.is_target(&backward) {
            Err(ActionError::AlreadyFound(backward))
        } else {
            Err(ActionError::UnknownWord(forward))
        }
    }

    fn reject(&mut self, len: usize) {
        if len > 1 {
            self.events.push(GameEvent::SelectionRejected { length: len });
        }
    }

    fn word_found(&mut self, word: String, points: i64) -> FoundWord {
        log::debug!("Found {} (+{})", word, points);
        self.events.push(GameEvent::WordFound {
            word: word.clone(),
            points,
        });
        let reveal = self.reveal(&word);

        let level_complete = self.session.is_complete();
        if level_complete {
            self.complete_level();
        }
        persistence::save_session(&mut self.store, &self.session);

        FoundWord {
            word,
            points,
            reveal,
            level_complete,
        }
    }

    fn complete_level(&mut self) {
        let s = &mut self.session;
        s.phase = SessionPhase::LevelComplete;
        s.clock_running = false;
        let Some(record) = s.record.as_mut() else {
            return;
        };
        record.completed = true;
        let (level, points_earned) = (record.level, record.points_earned);
        persistence::append_history(&mut self.store, record.clone());
        log::info!("Level {} complete ({} points)", level, points_earned);
        self.events.push(GameEvent::LevelComplete {
            level,
            points_earned,
        });
    }

    fn reveal(&self, word: &str) -> Reveal {
        let s = &self.session;
        match s.mode {
            Mode::Scripture => {
                let provenance = s.record.as_ref().and_then(|r| r.verse_map.get(word));
                let text = provenance.and_then(|p| {
                    self.content
                        .corpus
                        .bible(s.language)?
                        .verse_text(&p.book, &p.chapter, &p.verse)
                });
                match (provenance, text) {
                    (Some(p), Some(text)) => Reveal::Verse {
                        word: word.to_string(),
                        reference: p.reference(),
                        text: text.to_string(),
                    },
                    _ => Reveal::Nothing,
                }
            }
            Mode::Standard => self
                .content
                .dictionary(s.language)
                .and_then(|d| d.definition(word))
                .map_or(Reveal::Nothing, |definition| Reveal::Definition {
                    word: word.to_string(),
                    definition: definition.to_string(),
                }),
        }
    }

    /// Buy the start cell of an unfound word
    pub fn request_hint(&mut self, word: &str) -> Result<CellPos, ActionError> {
        self.require_active("hint")?;
        let s = &mut self.session;
        if !s.is_target(word) {
            return Err(ActionError::UnknownWord(word.to_string()));
        }
        if s.is_found(word) {
            return Err(ActionError::AlreadyFound(word.to_string()));
        }
        if s.score < HINT_COST {
            return Err(ActionError::InsufficientScore {
                needed: HINT_COST,
                available: s.score,
            });
        }
        let cell = s
            .word_locations
            .get(word)
            .copied()
            .ok_or_else(|| ActionError::UnknownWord(word.to_string()))?;

        s.score -= HINT_COST;
        if let Some(record) = s.record.as_mut() {
            record.points_earned -= HINT_COST;
            record.hints_used += 1;
        }
        log::debug!("Hint for {} at {:?}", word, cell);
        self.events.push(GameEvent::HintUsed {
            word: word.to_string(),
            cell,
        });
        persistence::save_session(&mut self.store, &self.session);
        Ok(cell)
    }

    pub fn primary_action(&self) -> PrimaryAction {
        match self.session.phase {
            SessionPhase::LevelComplete => PrimaryAction::NextLevel,
            SessionPhase::Idle => PrimaryAction::Regenerate,
            SessionPhase::LevelActive if self.session.grid_size_changed => {
                PrimaryAction::Regenerate
            }
            SessionPhase::LevelActive => PrimaryAction::Skip { cost: SKIP_COST },
        }
    }

    /// Give up on the level for `SKIP_COST` points (after confirmation)
    pub fn skip(&mut self) -> Result<(), ActionError> {
        self.require_active("skip")?;
        if self.session.grid_size_changed {
            return Err(ActionError::NotAvailable("skip"));
        }
        if self.session.score < SKIP_COST {
            return Err(ActionError::InsufficientScore {
                needed: SKIP_COST,
                available: self.session.score,
            });
        }
        self.append_incomplete_record();
        self.session.score -= SKIP_COST;
        self.session.level = self.session.level.saturating_add(1);
        log::info!("Skipped to level {}", self.session.level);
        self.start_level()?;
        Ok(())
    }

    /// Rebuild the level at the new grid size (after confirmation)
    pub fn regenerate(&mut self) -> Result<(), ActionError> {
        match self.session.phase {
            SessionPhase::LevelActive if self.session.grid_size_changed => {
                self.append_incomplete_record();
            }
            SessionPhase::Idle => {}
            _ => return Err(ActionError::NotAvailable("regenerate")),
        }
        self.start_level()?;
        Ok(())
    }

    /// Move on from a completed level
    pub fn advance(&mut self) -> Result<(), ActionError> {
        if self.session.phase != SessionPhase::LevelComplete {
            return Err(ActionError::NotAvailable("next level"));
        }
        self.session.level = self.session.level.saturating_add(1);
        self.start_level()?;
        Ok(())
    }

    pub fn switch_mode(&mut self, mode: Mode) -> Result<(), ActionError> {
        if mode == self.session.mode {
            return Ok(());
        }
        self.carry_into(self.session.language, mode)
    }

    pub fn switch_language(&mut self, language: Language) -> Result<(), ActionError> {
        if language == self.session.language {
            return Ok(());
        }
        self.carry_into(language, self.session.mode)
    }

    /// New game keeping score and level
    fn carry_into(&mut self, language: Language, mode: Mode) -> Result<(), ActionError> {
        let mut level = self.session.level;
        match self.session.phase {
            SessionPhase::LevelActive => self.append_incomplete_record(),
            SessionPhase::LevelComplete => level = level.saturating_add(1),
            SessionPhase::Idle => {}
        }
        self.begin(language, mode, self.session.score, level)?;
        Ok(())
    }

    fn append_incomplete_record(&mut self) {
        if let Some(record) = self.session.record.take() {
            if !record.completed {
                persistence::append_history(&mut self.store, record);
            }
        }
    }

    /// Set the preferred grid size; applies from the next level start
    pub fn change_grid_size(&mut self, n: usize) -> usize {
        let n = self.settings.set_grid_size(n, &mut self.store);
        self.session.grid_size_changed =
            self.session.phase != SessionPhase::Idle && n != self.session.grid_size;
        persistence::save_session(&mut self.store, &self.session);
        n
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.set_muted(muted, &mut self.store);
    }

    /// One second of play; returns the new elapsed time while the clock runs
    pub fn tick_clock(&mut self) -> Option<u32> {
        let s = &mut self.session;
        if s.phase != SessionPhase::LevelActive || !s.clock_running {
            return None;
        }
        let record = s.record.as_mut()?;
        record.elapsed_seconds += 1;
        Some(record.elapsed_seconds)
    }

    pub fn history(&self) -> History {
        persistence::load_history(&self.store)
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        let s = &self.session;
        let mut words: Vec<WordEntry> = s
            .words
            .iter()
            .map(|w| {
                let found = s.is_found(w);
                let cells = if found { self.word_cells(w) } else { Vec::new() };
                WordEntry {
                    word: w.clone(),
                    found,
                    cells,
                }
            })
            .collect();
        words.sort_by(|a, b| a.word.cmp(&b.word));

        Snapshot {
            grid: s.grid.clone(),
            words,
            score: s.score,
            level: s.level,
            elapsed_seconds: s.elapsed_seconds(),
            hints_used: s.record.as_ref().map_or(0, |r| r.hints_used),
            phase: s.phase,
            primary_action: self.primary_action(),
            language: s.language,
            mode: s.mode,
            grid_size: s.grid_size,
            pending_grid_size: self.settings.grid_size,
            muted: self.settings.muted,
        }
    }

    /// Cells a placed word covers
    fn word_cells(&self, word: &str) -> Vec<CellPos> {
        let grid = &self.session.grid;
        let Some(&start) = self.session.word_locations.get(word) else {
            return Vec::new();
        };
        let Some(dir) = grid.reads_at(word, start) else {
            return Vec::new();
        };
        (0..word.chars().count())
            .filter_map(|i| start.offset(dir, i, grid.size()))
            .collect()
    }
}
