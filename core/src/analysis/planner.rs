use rand::Rng;

use crate::*;

/// Probabilities closer than this to the minimum are treated as ties.
const SUGGESTION_TOLERANCE: f64 = 1e-9;

/// Annotated copy of a visible grid produced by [`SuggestionPlanner::plan`].
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    grid: VisibleGrid,
    probabilities: ProbabilityMap,
    passes: usize,
}

impl Plan {
    /// Grid with `KnownSafe`, `Flagged` and `Suggested` annotations applied.
    pub fn grid(&self) -> &VisibleGrid {
        &self.grid
    }

    /// Probabilities of the cells left undetermined, `None` on every promoted cell.
    pub fn probabilities(&self) -> &ProbabilityMap {
        &self.probabilities
    }

    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn suggested(&self) -> Vec<Coord2> {
        self.grid.coords_where(|cell| cell == VisibleCell::Suggested)
    }

    pub fn known_safe(&self) -> Vec<Coord2> {
        self.grid.coords_where(|cell| cell == VisibleCell::KnownSafe)
    }

    pub fn flagged(&self) -> Vec<Coord2> {
        self.grid.coords_where(|cell| cell == VisibleCell::Flagged)
    }

    /// Picks uniformly among known-safe cells, falling back to the suggested ones.
    pub fn next_move<R: Rng>(&self, rng: &mut R) -> Option<Coord2> {
        let mut candidates = self.known_safe();
        if candidates.is_empty() {
            candidates = self.suggested();
        }
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.random_range(0..candidates.len())])
    }
}

/// Iterates [`ProbabilityEngine`] to a fixpoint, then marks the least risky cells.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SuggestionPlanner {
    engine: ProbabilityEngine,
}

impl SuggestionPlanner {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            engine: ProbabilityEngine::new(config),
        }
    }

    pub fn plan(&self, grid: &VisibleGrid) -> Plan {
        let mut grid = grid.clone();
        for coords in grid.coords_where(|cell| cell == VisibleCell::Suggested) {
            grid[coords] = VisibleCell::Unrevealed;
        }

        // every pass but the last promotes a cell, so this bounds the loop
        let max_passes = usize::from(grid.size().0) * usize::from(grid.size().1);
        let mut passes = 0;

        let probabilities = loop {
            passes += 1;
            let probabilities = self.engine.probabilities(&grid);
            let promoted = promote_certain_cells(&mut grid, &probabilities);
            log::trace!("planner pass {passes} promoted {promoted} cells");

            if promoted == 0 {
                break probabilities;
            }
            if grid.count(VisibleCell::is_undetermined) == 0 {
                break self.engine.probabilities(&grid);
            }
        };
        debug_assert!(passes <= max_passes);

        let suggested = mark_least_risky(&mut grid, &probabilities);
        log::debug!(
            "planner reached fixpoint after {passes} passes, {suggested} cells suggested"
        );

        Plan {
            grid,
            probabilities,
            passes,
        }
    }
}

fn promote_certain_cells(grid: &mut VisibleGrid, probabilities: &ProbabilityMap) -> usize {
    let mut promoted = 0;
    for (coords, p) in probabilities.iter() {
        let certain = if p == 0.0 {
            VisibleCell::KnownSafe
        } else if p == 1.0 {
            VisibleCell::Flagged
        } else {
            continue;
        };
        grid[coords] = certain;
        promoted += 1;
    }
    promoted
}

fn mark_least_risky(grid: &mut VisibleGrid, probabilities: &ProbabilityMap) -> usize {
    let candidates: Vec<(Coord2, f64)> = probabilities
        .iter()
        .filter(|&(coords, _)| grid[coords].is_undetermined())
        .collect();
    let Some(lowest) = candidates.iter().map(|&(_, p)| p).reduce(f64::min) else {
        return 0;
    };

    let mut suggested = 0;
    for (coords, p) in candidates {
        if p - lowest <= SUGGESTION_TOLERANCE {
            grid[coords] = VisibleCell::Suggested;
            suggested += 1;
        }
    }
    suggested
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::testing::arb_visible_grid;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn plan(text: &str) -> Plan {
        SuggestionPlanner::default().plan(&text.parse().unwrap())
    }

    #[test]
    fn zero_clue_neighbors_become_known_safe_in_one_pass() {
        let plan = plan("###\n#0#\n###");

        assert_eq!(plan.known_safe().len(), 8);
        assert_eq!(plan.passes(), 1);
        assert!(plan.suggested().is_empty());
    }

    #[test]
    fn lone_unknown_next_to_one_is_flagged() {
        let plan = plan("1#");

        assert_eq!(plan.flagged(), vec![(1, 0)]);
        assert_eq!(plan.grid().to_string(), "1F\n");
    }

    #[test]
    fn promoted_cells_carry_no_probability() {
        let flagged = plan("1#");
        let safe = plan("###\n#0#\n###");

        assert_eq!(flagged.probabilities()[(1, 0)], None);
        assert_eq!(flagged.probabilities().min(), None);
        assert!(safe.probabilities().iter().next().is_none());
    }

    #[test]
    fn promotions_feed_the_next_pass() {
        let plan = plan("#1#0");

        assert_eq!(plan.grid().to_string(), "F1.0\n");
        assert_eq!(plan.passes(), 2);
    }

    #[test]
    fn lowest_probability_cells_are_suggested() {
        // the far column only sees the prior, the cells next to the 1 share a mine
        let plan = plan("##1\n###\n###\n###");

        let suggested = plan.suggested();
        assert!(!suggested.is_empty());
        assert!(suggested.iter().all(|&(x, y)| y >= 2 || x == 0));
        let lowest = plan.probabilities().min().unwrap();
        assert!((lowest - DEFAULT_ASSUMED_MINE_DENSITY).abs() < 1e-12);
    }

    #[test]
    fn stale_suggestions_are_reset() {
        let plan = plan("1??\n???");

        for coords in plan.suggested() {
            let p = plan.probabilities()[coords].unwrap();
            assert!((p - plan.probabilities().min().unwrap()).abs() <= SUGGESTION_TOLERANCE);
        }
        assert_eq!(plan.grid()[(2, 0)], VisibleCell::Suggested);
        assert_eq!(plan.grid()[(1, 0)], VisibleCell::Unrevealed);
    }

    #[test]
    fn input_grid_is_not_modified() {
        let grid: VisibleGrid = "1#".parse().unwrap();

        let plan = SuggestionPlanner::default().plan(&grid);

        assert_eq!(grid[(1, 0)], VisibleCell::Unrevealed);
        assert_eq!(plan.grid()[(1, 0)], VisibleCell::Flagged);
    }

    #[test]
    fn next_move_prefers_known_safe_cells() {
        let mut rng = SmallRng::seed_from_u64(3);
        let plan = plan("0##\n###");

        let next = plan.next_move(&mut rng).unwrap();

        assert_eq!(plan.grid()[next], VisibleCell::KnownSafe);
    }

    #[test]
    fn next_move_is_none_without_candidates() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(plan("1F").next_move(&mut rng), None);
    }

    #[test]
    fn deductions_on_a_real_game_match_the_layout() {
        let layout = MineLayout::from_mine_coords(
            (5, 5),
            &[(0, 4), (4, 0), (4, 4), (2, 4)],
        )
        .unwrap();
        let engine = PlayEngine::new(layout.clone()).click((0, 0)).unwrap();

        let plan = SuggestionPlanner::default().plan(engine.visible());

        for coords in plan.flagged() {
            assert!(layout.contains_mine(coords), "{coords:?} flagged but safe");
        }
        for coords in plan.known_safe() {
            assert!(!layout.contains_mine(coords), "{coords:?} marked safe but mined");
        }
        assert!(!plan.flagged().is_empty());
    }

    proptest! {
        #[test]
        fn fixpoint_is_reached_within_board_area(grid in arb_visible_grid(10)) {
            let plan = SuggestionPlanner::default().plan(&grid);
            let (width, height) = grid.size();

            prop_assert!(plan.passes() >= 1);
            prop_assert!(plan.passes() <= usize::from(width) * usize::from(height));
        }

        #[test]
        fn planner_only_annotates_undetermined_cells(grid in arb_visible_grid(10)) {
            let plan = SuggestionPlanner::default().plan(&grid);

            for (coords, before) in grid.iter() {
                let after = plan.grid()[coords];
                if !before.is_undetermined() {
                    prop_assert_eq!(after, before);
                } else {
                    prop_assert!(matches!(
                        after,
                        VisibleCell::Unrevealed
                            | VisibleCell::Suggested
                            | VisibleCell::KnownSafe
                            | VisibleCell::Flagged
                    ));
                }
            }
        }

        #[test]
        fn probabilities_cover_exactly_the_undetermined_cells(grid in arb_visible_grid(10)) {
            let plan = SuggestionPlanner::default().plan(&grid);

            for (coords, cell) in plan.grid().iter() {
                prop_assert_eq!(
                    plan.probabilities()[coords].is_some(),
                    cell.is_undetermined()
                );
            }
        }

        #[test]
        fn no_certain_cell_is_left_undetermined(grid in arb_visible_grid(10)) {
            let plan = SuggestionPlanner::default().plan(&grid);
            let recomputed = ProbabilityEngine::default().probabilities(plan.grid());

            for (_, p) in recomputed.iter() {
                prop_assert!(p > 0.0 && p < 1.0);
            }
        }

        #[test]
        fn deductions_are_sound_on_played_boards(
            width in 2u8..14,
            height in 2u8..14,
            density in 0.05f64..0.25,
            seed: u64,
        ) {
            let config = GameConfig::new(width, height, density).unwrap();
            let mut rng = SmallRng::seed_from_u64(seed);
            let layout = MineLayout::generate(config, &mut rng);
            let planner = SuggestionPlanner::default();

            let mut engine = PlayEngine::new(layout.clone());
            for _ in 0..8 {
                let plan = planner.plan(engine.visible());
                for coords in plan.flagged() {
                    prop_assert!(layout.contains_mine(coords));
                }
                for coords in plan.known_safe() {
                    prop_assert!(!layout.contains_mine(coords));
                }
                let Some(next) = plan.next_move(&mut rng) else { break };
                engine = engine.click(next).unwrap();
                if engine.is_finished() {
                    break;
                }
            }
        }
    }
}
