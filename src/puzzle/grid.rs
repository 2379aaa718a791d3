//! Letter grid and straight-line selection geometry

use std::fmt;

use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// A cell coordinate (row-major, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step `n` cells in a direction, staying inside a `size`×`size` grid
    pub fn offset(&self, dir: Direction, n: usize, size: usize) -> Option<CellPos> {
        let (dr, dc) = dir.delta();
        let row = self.row as isize + dr * n as isize;
        let col = self.col as isize + dc * n as isize;
        let in_bounds = (0..size as isize).contains(&row) && (0..size as isize).contains(&col);
        in_bounds.then(|| CellPos::new(row as usize, col as usize))
    }
}

/// Square puzzle grid, fixed size for the lifetime of a level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Grid {
    rows: Vec<Vec<char>>,
}

impl Grid {
    /// Build from rows; `None` unless the rows form a square
    pub fn from_rows(rows: Vec<Vec<char>>) -> Option<Self> {
        let size = rows.len();
        rows.iter().all(|r| r.len() == size).then_some(Self { rows })
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    pub fn get(&self, pos: CellPos) -> Option<char> {
        self.rows.get(pos.row)?.get(pos.col).copied()
    }

    /// Cells on the straight line from `start` to `end`, both inclusive.
    ///
    /// Returns `None` when the two cells do not share a row, a column or a
    /// 45° diagonal, or when either lies outside the grid.
    pub fn line(&self, start: CellPos, end: CellPos) -> Option<Vec<CellPos>> {
        self.get(start)?;
        self.get(end)?;
        let d_row = end.row as isize - start.row as isize;
        let d_col = end.col as isize - start.col as isize;
        if d_row == 0 && d_col == 0 {
            return Some(vec![start]);
        }
        let dir = Direction::from_delta(d_row, d_col)?;
        let steps = d_row.abs().max(d_col.abs()) as usize;
        (0..=steps)
            .map(|i| start.offset(dir, i, self.size()))
            .collect()
    }

    /// Letters under a run of cells, in order
    pub fn read(&self, cells: &[CellPos]) -> Option<String> {
        cells.iter().map(|&c| self.get(c)).collect()
    }

    /// Whether `cells` form one straight, gap-free run
    pub fn is_straight_run(&self, cells: &[CellPos]) -> bool {
        match (cells.first(), cells.last()) {
            (Some(&first), Some(&last)) => self.line(first, last).as_deref() == Some(cells),
            _ => false,
        }
    }

    /// Direction in which `word` reads forward starting at `start`, if any
    pub fn reads_at(&self, word: &str, start: CellPos) -> Option<Direction> {
        let letters: Vec<char> = word.chars().collect();
        Direction::ALL.into_iter().find(|&dir| {
            letters.iter().enumerate().all(|(i, &ch)| {
                start
                    .offset(dir, i, self.size())
                    .and_then(|p| self.get(p))
                    == Some(ch)
            })
        })
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    ")?;
        for col in 0..self.size() {
            write!(f, "{:>3}", col)?;
        }
        writeln!(f)?;
        for (r, row) in self.rows.iter().enumerate() {
            write!(f, "{:>3} ", r)?;
            for ch in row {
                write!(f, "{:>3}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
