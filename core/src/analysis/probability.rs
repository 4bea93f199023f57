use core::fmt;
use core::ops::Index;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Mine probability per cell; `None` where no probability applies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityMap {
    values: Array2<Option<f64>>,
}

impl ProbabilityMap {
    pub(crate) fn from_values(values: Array2<Option<f64>>) -> Self {
        Self { values }
    }

    pub fn size(&self) -> Coord2 {
        array_size(&self.values)
    }

    /// Cells that carry a probability.
    pub fn iter(&self) -> impl Iterator<Item = (Coord2, f64)> + '_ {
        iter_coords(self.size()).filter_map(|coords| self[coords].map(|p| (coords, p)))
    }

    pub fn min(&self) -> Option<f64> {
        self.iter().map(|(_, p)| p).reduce(f64::min)
    }
}

impl Index<Coord2> for ProbabilityMap {
    type Output = Option<f64>;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.values[coords.to_nd_index()]
    }
}

/// Two-decimal table, one line per row, `-` where no probability applies.
impl fmt::Display for ProbabilityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x_end, y_end) = self.size();
        for y in 0..y_end {
            for x in 0..x_end {
                if x > 0 {
                    write!(f, " ")?;
                }
                match self[(x, y)] {
                    Some(p) => write!(f, "{p:.2}")?,
                    None => write!(f, "{:>4}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Closed-form mine probabilities from revealed clues.
///
/// Each clue contributes `(clue - flagged neighbours) / undetermined neighbours`
/// to its undetermined neighbours. A cell is safe if any of its clues says 0,
/// a mine if any says 1, and otherwise the clues are combined as independent
/// events with `1 - prod(1 - p)`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ProbabilityEngine {
    config: AnalysisConfig,
}

impl ProbabilityEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> AnalysisConfig {
        self.config
    }

    /// Probabilities for every `Unrevealed`/`Suggested` cell of `grid`.
    pub fn probabilities(&self, grid: &VisibleGrid) -> ProbabilityMap {
        let local = local_estimates(grid);
        let size = grid.size();

        let mut values = Array2::from_elem(size.to_nd_index(), None);
        for (coords, cell) in grid.iter() {
            if cell.is_undetermined() {
                values[coords.to_nd_index()] = Some(self.combine(&local, grid, coords));
            }
        }
        ProbabilityMap::from_values(values)
    }

    /// Probability for a single cell, `None` if the cell is not undetermined.
    pub fn probability_at(&self, grid: &VisibleGrid, coords: Coord2) -> Result<Option<f64>> {
        let coords = grid.validate_coords(coords)?;
        if !grid[coords].is_undetermined() {
            return Ok(None);
        }

        let estimates: SmallVec<[f64; 8]> = grid
            .iter_neighbors(coords)
            .filter_map(|pos| local_estimate(grid, pos))
            .collect();
        Ok(Some(combine_estimates(
            &estimates,
            self.config.assumed_mine_density,
        )))
    }

    fn combine(&self, local: &Array2<Option<f64>>, grid: &VisibleGrid, coords: Coord2) -> f64 {
        let estimates: SmallVec<[f64; 8]> = grid
            .iter_neighbors(coords)
            .filter_map(|pos| local[pos.to_nd_index()])
            .collect();
        combine_estimates(&estimates, self.config.assumed_mine_density)
    }
}

/// Local estimate of every revealed cell, `None` for other cells and for clues
/// without undetermined neighbours.
pub fn local_estimates(grid: &VisibleGrid) -> Array2<Option<f64>> {
    let mut local = Array2::from_elem(grid.size().to_nd_index(), None);
    for (coords, _) in grid.iter() {
        local[coords.to_nd_index()] = local_estimate(grid, coords);
    }
    local
}

/// Share of a clue's remaining mines over its undetermined neighbours.
pub fn local_estimate(grid: &VisibleGrid, coords: Coord2) -> Option<f64> {
    let clue = grid[coords].clue()?;

    let mut flagged = 0u8;
    let mut undetermined = 0u8;
    for cell in grid.iter_neighbor_cells(coords) {
        match cell {
            VisibleCell::Flagged => flagged += 1,
            cell if cell.is_undetermined() => undetermined += 1,
            _ => {}
        }
    }

    if undetermined == 0 {
        return None;
    }

    let remaining = f64::from(clue) - f64::from(flagged);
    Some((remaining / f64::from(undetermined)).clamp(0.0, 1.0))
}

fn combine_estimates(estimates: &[f64], prior: f64) -> f64 {
    if estimates.is_empty() {
        return prior;
    }
    if estimates.contains(&0.0) {
        return 0.0;
    }
    if estimates.contains(&1.0) {
        return 1.0;
    }
    1.0 - estimates.iter().map(|p| 1.0 - p).product::<f64>()
}
