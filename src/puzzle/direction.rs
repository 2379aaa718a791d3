//! The eight reading directions and their classes

use serde::{Deserialize, Serialize};

/// Unit step on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East,
    West,
    North,
    South,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

/// Direction classes used for placement quotas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionClass {
    Horizontal,
    Vertical,
    Diagonal,
}

impl DirectionClass {
    /// Forced classes in placement order
    pub const FORCED_ORDER: [DirectionClass; 3] = [
        DirectionClass::Horizontal,
        DirectionClass::Vertical,
        DirectionClass::Diagonal,
    ];

    pub fn directions(&self) -> &'static [Direction] {
        match self {
            DirectionClass::Horizontal => &[Direction::East, Direction::West],
            DirectionClass::Vertical => &[Direction::South, Direction::North],
            DirectionClass::Diagonal => &[
                Direction::SouthEast,
                Direction::NorthWest,
                Direction::NorthEast,
                Direction::SouthWest,
            ],
        }
    }
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
        Direction::SouthEast,
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::SouthWest,
    ];

    /// (row delta, col delta); rows grow downward
    #[inline]
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
        }
    }

    pub fn class(&self) -> DirectionClass {
        match self {
            Direction::East | Direction::West => DirectionClass::Horizontal,
            Direction::North | Direction::South => DirectionClass::Vertical,
            _ => DirectionClass::Diagonal,
        }
    }

    /// Direction of a straight (row, column or 45°) offset of any length
    pub fn from_delta(d_row: isize, d_col: isize) -> Option<Self> {
        let straight = d_row == 0 || d_col == 0 || d_row.abs() == d_col.abs();
        if !straight {
            return None;
        }
        let step = (d_row.signum(), d_col.signum());
        Direction::ALL.into_iter().find(|d| d.delta() == step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_partition_all_directions() {
        let mut count = 0;
        for class in DirectionClass::FORCED_ORDER {
            for dir in class.directions() {
                assert_eq!(dir.class(), class);
                count += 1;
            }
        }
        assert_eq!(count, Direction::ALL.len());
    }

    #[test]
    fn test_deltas_are_unit_steps() {
        for dir in Direction::ALL {
            let (dr, dc) = dir.delta();
            assert!(dr.abs() <= 1 && dc.abs() <= 1);
            assert!(dr != 0 || dc != 0);
            assert_eq!(Direction::from_delta(dr, dc), Some(dir));
        }
    }

    #[test]
    fn test_from_delta_normalizes_length() {
        assert_eq!(Direction::from_delta(0, 5), Some(Direction::East));
        assert_eq!(Direction::from_delta(-3, -3), Some(Direction::NorthWest));
        assert_eq!(Direction::from_delta(0, 0), None);
        assert_eq!(Direction::from_delta(2, 1), None);
    }
}
