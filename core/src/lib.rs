//! Minesweeper board model with clue-driven mine inference.
//!
//! [`MineLayout`] holds the hidden ground truth, [`PlayEngine`] produces a new
//! board snapshot for every click, and the [`analysis`] module derives mine
//! probabilities and next-move suggestions from the visible grid alone.

use core::ops::Index;

use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use analysis::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use types::*;

pub mod analysis;
mod cell;
mod engine;
mod error;
mod generator;
mod grid;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    /// Probability of each cell independently holding a mine.
    pub density: f64,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, density: f64) -> Self {
        Self { size, density }
    }

    pub fn new(width: Coord, height: Coord, density: f64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GameError::InvalidDimensions);
        }
        validate_density(density)?;
        Ok(Self::new_unchecked((width, height), density))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

/// Accepts densities within `[0, 1]`, rejecting NaN.
pub(crate) fn validate_density(density: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&density) {
        Ok(density)
    } else {
        Err(GameError::InvalidDensity)
    }
}

/// Ground-truth mine placement. Never changes once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    /// Places a mine on every cell independently with probability `config.density`.
    ///
    /// Densities outside `[0, 1]` saturate to the nearest bound, NaN places no mines.
    pub fn generate<R: Rng>(config: GameConfig, rng: &mut R) -> Self {
        let density = if config.density.is_nan() {
            log::warn!("mine density is NaN, generating an empty minefield");
            0.0
        } else {
            config.density.clamp(0.0, 1.0)
        };
        let mine_mask =
            Array2::from_shape_simple_fn(config.size.to_nd_index(), || rng.random_bool(density));
        Self::from_mine_mask(mine_mask)
    }

    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidDimensions);
        }

        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(mine_mask))
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        array_size(&self.mine_mask)
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.iter_neighbors(coords).filter(|&pos| self[pos]).count() as u8
    }

    pub fn neighbors_of(&self, coords: Coord2) -> Vec<Coord2> {
        self.iter_neighbors(coords).collect()
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.mine_mask.iter_neighbors(coords)
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

/// Game status as reported to collaborators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}
