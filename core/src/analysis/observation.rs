use core::fmt;
use core::ops::Index;
use core::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Textual clue snapshot: clue counts, unknown cells and exploded mines.
///
/// Deductions (flags, known-safe cells, suggestions) are not part of a clue
/// grid, so estimators working on it only ever see what the board revealed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueGrid {
    cells: Array2<ClueCell>,
}

impl ClueGrid {
    pub fn size(&self) -> Coord2 {
        array_size(&self.cells)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coord2, ClueCell)> + '_ {
        iter_coords(self.size()).map(|coords| (coords, self[coords]))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    pub fn unknown_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&cell| cell == ClueCell::Unknown)
            .count()
    }
}

impl Index<Coord2> for ClueGrid {
    type Output = ClueCell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl From<&VisibleGrid> for ClueGrid {
    fn from(grid: &VisibleGrid) -> Self {
        let mut cells = Array2::default(grid.size().to_nd_index());
        for (coords, cell) in grid.iter() {
            cells[coords.to_nd_index()] = ClueCell::from(cell);
        }
        Self { cells }
    }
}

impl fmt::Display for ClueGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rows(f, self.size(), |coords| self[coords].glyph())
    }
}

impl FromStr for ClueGrid {
    type Err = ParseError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        parse_rows(s, ClueCell::from_glyph).map(|cells| Self { cells })
    }
}
