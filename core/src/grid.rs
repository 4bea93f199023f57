use core::fmt;
use core::ops::{Index, IndexMut};
use core::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Player-visible board, one [`VisibleCell`] per coordinate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleGrid {
    cells: Array2<VisibleCell>,
}

impl VisibleGrid {
    /// Fully unrevealed board. Zero-sized boards are rejected.
    pub fn new(size: Coord2) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidDimensions);
        }
        Ok(Self {
            cells: Array2::default(size.to_nd_index()),
        })
    }

    pub(crate) fn from_cells(cells: Array2<VisibleCell>) -> Self {
        Self { cells }
    }

    pub fn size(&self) -> Coord2 {
        array_size(&self.cells)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        let size = self.size();
        coords.0 < size.0 && coords.1 < size.1
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<VisibleCell> {
        self.contains(coords).then(|| self[coords])
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    pub fn neighbors_of(&self, coords: Coord2) -> Vec<Coord2> {
        self.iter_neighbors(coords).collect()
    }

    pub fn iter_neighbor_cells(&self, coords: Coord2) -> impl Iterator<Item = VisibleCell> + '_ {
        self.iter_neighbors(coords).map(|pos| self[pos])
    }

    /// All cells with their coordinates, column-major.
    pub fn iter(&self) -> impl Iterator<Item = (Coord2, VisibleCell)> + '_ {
        iter_coords(self.size()).map(|coords| (coords, self[coords]))
    }

    pub fn coords_where(&self, predicate: impl Fn(VisibleCell) -> bool) -> Vec<Coord2> {
        self.iter()
            .filter(|&(_, cell)| predicate(cell))
            .map(|(coords, _)| coords)
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(VisibleCell) -> bool) -> usize {
        self.cells.iter().filter(|&&cell| predicate(cell)).count()
    }
}

impl Index<Coord2> for VisibleGrid {
    type Output = VisibleCell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for VisibleGrid {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[coords.to_nd_index()]
    }
}

impl fmt::Display for VisibleGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rows(f, self.size(), |coords| self[coords].glyph())
    }
}

impl FromStr for VisibleGrid {
    type Err = ParseError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        parse_rows(s, VisibleCell::from_glyph).map(Self::from_cells)
    }
}

/// Writes one line per board row, each cell rendered by `glyph`.
pub(crate) fn write_rows(
    f: &mut fmt::Formatter<'_>,
    (x_end, y_end): Coord2,
    glyph: impl Fn(Coord2) -> char,
) -> fmt::Result {
    for y in 0..y_end {
        for x in 0..x_end {
            write!(f, "{}", glyph((x, y)))?;
        }
        writeln!(f)?;
    }
    Ok(())
}

/// Parses one board row per line. Blank lines are skipped, rows are trimmed.
pub(crate) fn parse_rows<T: Clone + Default>(
    text: &str,
    cell: impl Fn(char) -> Option<T>,
) -> core::result::Result<Array2<T>, ParseError> {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|row| !row.is_empty())
        .collect();

    let Some(first) = rows.first() else {
        return Err(ParseError::Empty);
    };
    let width = first.chars().count();
    let height = rows.len();
    if width > usize::from(Coord::MAX) || height > usize::from(Coord::MAX) {
        return Err(ParseError::TooLarge { width, height });
    }

    let mut cells = Array2::default([width, height]);
    for (row, line) in rows.iter().enumerate() {
        let found = line.chars().count();
        if found != width {
            return Err(ParseError::RaggedRow {
                row,
                expected: width,
                found,
            });
        }
        for (col, ch) in line.chars().enumerate() {
            cells[[col, row]] = cell(ch).ok_or(ParseError::UnexpectedChar {
                found: ch,
                row,
                col,
            })?;
        }
    }

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_as_columns_and_rows() {
        let grid: VisibleGrid = "#1\n2X\n".parse().unwrap();

        assert_eq!(grid.size(), (2, 2));
        assert_eq!(grid[(0, 0)], VisibleCell::Unrevealed);
        assert_eq!(grid[(1, 0)], VisibleCell::Revealed(1));
        assert_eq!(grid[(0, 1)], VisibleCell::Revealed(2));
        assert_eq!(grid[(1, 1)], VisibleCell::Exploded);
    }

    #[test]
    fn display_matches_parsed_text() {
        let text = "#1F\n.?X\n";
        let grid: VisibleGrid = text.parse().unwrap();

        assert_eq!(grid.to_string(), text);
    }

    #[test]
    fn ignores_indentation_and_blank_lines() {
        let grid: VisibleGrid = "\n   ##\n   01\n\n".parse().unwrap();
        assert_eq!(grid.size(), (2, 2));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = "###\n##\n".parse::<VisibleGrid>().unwrap_err();
        assert_eq!(
            err,
            ParseError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn rejects_unknown_glyph() {
        let err = "#9#".parse::<VisibleGrid>().unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedChar {
                found: '9',
                row: 0,
                col: 1
            }
        );
    }

    #[test]
    fn rejects_empty_text() {
        assert_eq!("\n \n".parse::<VisibleGrid>(), Err(ParseError::Empty));
    }

    #[test]
    fn new_rejects_zero_size() {
        assert_eq!(VisibleGrid::new((0, 3)), Err(GameError::InvalidDimensions));
    }

    #[test]
    fn get_is_none_out_of_bounds() {
        let grid = VisibleGrid::new((2, 2)).unwrap();
        assert_eq!(grid.get((2, 0)), None);
        assert_eq!(grid.validate_coords((0, 2)), Err(GameError::InvalidCoords));
    }
}
