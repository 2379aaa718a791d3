//! Word placement with per-attempt backtracking
//!
//! Words are placed longest-first into an empty grid. Each attempt forces
//! two words into each direction class (horizontal, vertical, diagonal) and
//! lets the rest use any direction. A word that cannot be placed within its
//! random tries aborts the attempt; a fresh attempt starts from an empty grid.

use std::collections::{BTreeMap, HashSet, VecDeque};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::direction::{Direction, DirectionClass};
use super::grid::{CellPos, Grid};
use crate::consts::{MAX_GENERATION_ATTEMPTS, MAX_PLACEMENT_TRIES, WORDS_PER_CLASS};

/// A generated puzzle: the filled grid and where each word starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Puzzle {
    pub grid: Grid,
    pub locations: BTreeMap<String, CellPos>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("word '{word}' has {len} letters but the grid is {size}x{size}")]
    WordTooLong { word: String, len: usize, size: usize },
    #[error("invalid generator input: {0}")]
    InvalidInput(String),
    #[error("no layout found after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

type Cells = Vec<Vec<Option<char>>>;

/// Place `words` into a `size`×`size` grid and fill the gaps from `alphabet`.
///
/// Exhaustion is definitive for this word set: callers should pick new
/// words rather than call again with the same ones.
pub fn generate<R: Rng + ?Sized>(
    words: &[String],
    size: usize,
    alphabet: &[char],
    rng: &mut R,
) -> Result<Puzzle, GenerationError> {
    validate(words, size, alphabet)?;

    let mut ordered: Vec<(&str, Vec<char>)> =
        words.iter().map(|w| (w.as_str(), w.chars().collect())).collect();
    // Longest first; stable so equal lengths keep input order
    ordered.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        if let Some((cells, locations)) = try_attempt(&ordered, size, rng) {
            log::debug!("Placed {} words on attempt {}", words.len(), attempt);
            let grid = fill(cells, alphabet, rng);
            return Ok(Puzzle { grid, locations });
        }
    }

    log::warn!(
        "Puzzle generation failed after {} attempts ({}x{} grid)",
        MAX_GENERATION_ATTEMPTS,
        size,
        size
    );
    Err(GenerationError::Exhausted {
        attempts: MAX_GENERATION_ATTEMPTS,
    })
}

fn validate(words: &[String], size: usize, alphabet: &[char]) -> Result<(), GenerationError> {
    if size == 0 {
        return Err(GenerationError::InvalidInput("grid size is zero".into()));
    }
    if alphabet.is_empty() {
        return Err(GenerationError::InvalidInput("alphabet is empty".into()));
    }
    let mut seen = HashSet::new();
    for word in words {
        let len = word.chars().count();
        if len == 0 {
            return Err(GenerationError::InvalidInput("empty word".into()));
        }
        if len > size {
            return Err(GenerationError::WordTooLong {
                word: word.clone(),
                len,
                size,
            });
        }
        if !seen.insert(word.as_str()) {
            return Err(GenerationError::InvalidInput(format!("duplicate word '{word}'")));
        }
    }
    Ok(())
}

/// One full pass over an empty grid
fn try_attempt<R: Rng + ?Sized>(
    ordered: &[(&str, Vec<char>)],
    size: usize,
    rng: &mut R,
) -> Option<(Cells, BTreeMap<String, CellPos>)> {
    let mut cells: Cells = vec![vec![None; size]; size];
    let mut locations = BTreeMap::new();
    let mut queue: VecDeque<&(&str, Vec<char>)> = ordered.iter().collect();

    for class in DirectionClass::FORCED_ORDER {
        for _ in 0..WORDS_PER_CLASS {
            let Some((word, letters)) = queue.pop_front() else {
                break;
            };
            let start = place_word(&mut cells, letters, class.directions(), rng)?;
            locations.insert(word.to_string(), start);
        }
    }

    while let Some((word, letters)) = queue.pop_front() {
        let start = place_word(&mut cells, letters, &Direction::ALL, rng)?;
        locations.insert(word.to_string(), start);
    }

    Some((cells, locations))
}

/// Try random starts and directions from `directions` until the word fits
fn place_word<R: Rng + ?Sized>(
    cells: &mut Cells,
    letters: &[char],
    directions: &[Direction],
    rng: &mut R,
) -> Option<CellPos> {
    let size = cells.len();
    let mut shuffled = directions.to_vec();
    shuffled.shuffle(rng);

    for i in 0..MAX_PLACEMENT_TRIES as usize {
        let dir = shuffled[i % shuffled.len()];
        let start = CellPos::new(rng.random_range(0..size), rng.random_range(0..size));
        if let Some(path) = fit(cells, letters, start, dir) {
            for (pos, &ch) in path.iter().zip(letters) {
                cells[pos.row][pos.col] = Some(ch);
            }
            return Some(start);
        }
    }
    None
}

/// Cells the word would occupy, if every one is free or already holds the
/// same letter
fn fit(cells: &Cells, letters: &[char], start: CellPos, dir: Direction) -> Option<Vec<CellPos>> {
    let size = cells.len();
    letters
        .iter()
        .enumerate()
        .map(|(i, &ch)| {
            let pos = start.offset(dir, i, size)?;
            match cells[pos.row][pos.col] {
                None => Some(pos),
                Some(existing) if existing == ch => Some(pos),
                Some(_) => None,
            }
        })
        .collect()
}

fn fill<R: Rng + ?Sized>(cells: Cells, alphabet: &[char], rng: &mut R) -> Grid {
    let rows = cells
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| cell.unwrap_or_else(|| alphabet[rng.random_range(0..alphabet.len())]))
                .collect()
        })
        .collect();
    Grid::from_rows(rows).unwrap_or_default()
}
