use std::sync::atomic::{AtomicBool, Ordering};

use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    /// Probability of an unknown cell holding a mine in each sampled layout.
    pub assumed_density: f64,
    /// Number of sampled layouts.
    pub iterations: u64,
}

impl MonteCarloConfig {
    pub fn new(assumed_density: f64, iterations: u64) -> Result<Self> {
        Ok(Self {
            assumed_density: validate_density(assumed_density)?,
            iterations,
        })
    }
}

/// Sampled mine probabilities.
///
/// Clue cells carry no probability, exploded cells are certain mines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineEstimate {
    pub probabilities: ProbabilityMap,
    pub accepted: u64,
    pub trials: u64,
}

impl MineEstimate {
    pub fn acceptance_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.accepted as f64 / self.trials as f64
        }
    }
}

/// Estimates mine probabilities by rejection sampling on a single thread.
pub fn estimate<R: Rng>(
    grid: &ClueGrid,
    config: MonteCarloConfig,
    rng: &mut R,
) -> Result<MineEstimate> {
    validate_density(config.assumed_density)?;
    let sampler = Sampler::new(grid);
    let tally = sampler.run(config.assumed_density, config.iterations, rng, None);
    sampler.finish(grid, tally)
}

/// Estimates mine probabilities with trials sharded over the rayon pool.
///
/// Shard `i` samples with its own generator seeded from `seed + i`, so the
/// result only depends on `seed` and `shards`. Setting `cancel` stops issuing
/// trials; whatever was accepted so far is still reported.
pub fn estimate_parallel(
    grid: &ClueGrid,
    config: MonteCarloConfig,
    seed: u64,
    shards: usize,
    cancel: &AtomicBool,
) -> Result<MineEstimate> {
    validate_density(config.assumed_density)?;
    let sampler = Sampler::new(grid);
    let shards = shards.max(1) as u64;
    let per_shard = config.iterations / shards;
    let remainder = config.iterations % shards;

    let tally = (0..shards)
        .into_par_iter()
        .map(|shard| {
            let trials = per_shard + u64::from(shard < remainder);
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(shard));
            sampler.run(config.assumed_density, trials, &mut rng, Some(cancel))
        })
        .reduce(|| Tally::empty(sampler.unknown.len()), Tally::merge);

    sampler.finish(grid, tally)
}

/// A clue restated over the indices of its unknown neighbours.
#[derive(Clone, Debug)]
struct ClueConstraint {
    /// Mines the unknown neighbours must hold, after subtracting known mines.
    remaining: i16,
    unknown_neighbors: SmallVec<[u32; 8]>,
}

#[derive(Clone, Debug)]
struct Sampler {
    unknown: Vec<Coord2>,
    constraints: Vec<ClueConstraint>,
}

impl Sampler {
    fn new(grid: &ClueGrid) -> Self {
        let mut unknown = Vec::new();
        let mut unknown_ids = Array2::from_elem(grid.size().to_nd_index(), None);
        for (coords, cell) in grid.iter() {
            if cell == ClueCell::Unknown {
                unknown_ids[coords.to_nd_index()] = Some(unknown.len() as u32);
                unknown.push(coords);
            }
        }

        let mut constraints = Vec::new();
        for (coords, cell) in grid.iter() {
            let ClueCell::Clue(clue) = cell else {
                continue;
            };

            let mut remaining = i16::from(clue);
            let mut unknown_neighbors = SmallVec::new();
            for pos in grid.iter_neighbors(coords) {
                match grid[pos] {
                    ClueCell::Mine => remaining -= 1,
                    ClueCell::Unknown => {
                        unknown_neighbors.extend(unknown_ids[pos.to_nd_index()]);
                    }
                    ClueCell::Clue(_) => {}
                }
            }

            constraints.push(ClueConstraint {
                remaining,
                unknown_neighbors,
            });
        }

        Self {
            unknown,
            constraints,
        }
    }

    fn accepts(&self, sample: &[bool]) -> bool {
        self.constraints.iter().all(|constraint| {
            let mines = constraint
                .unknown_neighbors
                .iter()
                .filter(|&&id| sample[id as usize])
                .count() as i16;
            mines == constraint.remaining
        })
    }

    fn run<R: Rng>(
        &self,
        density: f64,
        trials: u64,
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> Tally {
        let mut tally = Tally::empty(self.unknown.len());
        let mut sample = vec![false; self.unknown.len()];

        for _ in 0..trials {
            if cancel.is_some_and(|cancel| cancel.load(Ordering::Relaxed)) {
                log::debug!("sampling cancelled after {} trials", tally.trials);
                break;
            }

            tally.trials += 1;
            for is_mine in sample.iter_mut() {
                *is_mine = rng.random_bool(density);
            }
            if !self.accepts(&sample) {
                continue;
            }

            tally.accepted += 1;
            for (hits, &is_mine) in tally.mine_hits.iter_mut().zip(&sample) {
                *hits += u64::from(is_mine);
            }
        }

        tally
    }

    fn finish(&self, grid: &ClueGrid, tally: Tally) -> Result<MineEstimate> {
        log::debug!(
            "accepted {} of {} sampled layouts",
            tally.accepted,
            tally.trials
        );
        if tally.accepted == 0 {
            return Err(GameError::NoAcceptedSamples);
        }

        let mut values = Array2::from_elem(grid.size().to_nd_index(), None);
        for (coords, cell) in grid.iter() {
            if cell == ClueCell::Mine {
                values[coords.to_nd_index()] = Some(1.0);
            }
        }
        for (&coords, &hits) in self.unknown.iter().zip(&tally.mine_hits) {
            values[coords.to_nd_index()] = Some(hits as f64 / tally.accepted as f64);
        }

        Ok(MineEstimate {
            probabilities: ProbabilityMap::from_values(values),
            accepted: tally.accepted,
            trials: tally.trials,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Tally {
    mine_hits: Vec<u64>,
    accepted: u64,
    trials: u64,
}

impl Tally {
    fn empty(unknown: usize) -> Self {
        Self {
            mine_hits: vec![0; unknown],
            accepted: 0,
            trials: 0,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (hits, other_hits) in self.mine_hits.iter_mut().zip(other.mine_hits) {
            *hits += other_hits;
        }
        self.accepted += other.accepted;
        self.trials += other.trials;
        self
    }
}
