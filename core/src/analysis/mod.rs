//! Mine inference over the player-visible board.

use serde::{Deserialize, Serialize};

use crate::*;

pub use monte_carlo::*;
pub use observation::*;
pub use planner::*;
pub use probability::*;

mod monte_carlo;
mod observation;
mod planner;
mod probability;

/// Mine density assumed for cells no clue says anything about.
pub const DEFAULT_ASSUMED_MINE_DENSITY: f64 = 0.1;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub assumed_mine_density: f64,
}

impl AnalysisConfig {
    pub fn new(assumed_mine_density: f64) -> Result<Self> {
        Ok(Self {
            assumed_mine_density: validate_density(assumed_mine_density)?,
        })
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            assumed_mine_density: DEFAULT_ASSUMED_MINE_DENSITY,
        }
    }
}
