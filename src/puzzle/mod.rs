//! Puzzle building blocks: geometry, grid generation and word selection

pub mod direction;
pub mod generator;
pub mod grid;
pub mod words;

pub use direction::{Direction, DirectionClass};
pub use generator::{GenerationError, Puzzle, generate};
pub use grid::{CellPos, Grid};
pub use words::{ChapterPlaylist, ChapterRef, Provenance, SelectionError, WordSet};
