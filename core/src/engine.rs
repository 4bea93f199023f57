use std::collections::VecDeque;
use std::sync::Arc;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    #[default]
    Ready,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    pub const fn status(self) -> GameStatus {
        match self {
            Self::Ready | Self::Active => GameStatus::Playing,
            Self::Won => GameStatus::Won,
            Self::Lost => GameStatus::Lost,
        }
    }
}

/// Immutable board snapshot.
///
/// Every move returns a new snapshot, so earlier ones stay valid for replay and
/// inspection. The mine layout is shared between all snapshots of a game. The
/// board is never annotated: `KnownSafe` and `Suggested` only appear on grids
/// produced by the planner.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayEngine {
    mine_layout: Arc<MineLayout>,
    board: VisibleGrid,
    revealed_count: CellCount,
    state: EngineState,
    triggered_mine: Option<Coord2>,
}

impl PlayEngine {
    pub fn new(mine_layout: MineLayout) -> Self {
        let size = mine_layout.size();
        Self {
            board: VisibleGrid::from_cells(ndarray::Array2::default(size.to_nd_index())),
            mine_layout: Arc::new(mine_layout),
            revealed_count: 0,
            state: EngineState::default(),
            triggered_mine: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status()
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.mine_layout.size()
    }

    pub fn layout(&self) -> &MineLayout {
        &self.mine_layout
    }

    pub fn visible(&self) -> &VisibleGrid {
        &self.board
    }

    pub fn cell_at(&self, coords: Coord2) -> VisibleCell {
        self.board[coords]
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    /// Opens `coords`, expanding through zero-count cells.
    ///
    /// Clicking an opened cell, or any cell after the game ended, returns an
    /// identical snapshot.
    pub fn click(&self, coords: Coord2) -> Result<Self> {
        let coords = self.mine_layout.validate_coords(coords)?;

        if self.state.is_finished() || self.board[coords].is_opened() {
            log::trace!("click at {:?} has no effect", coords);
            return Ok(self.clone());
        }

        let mut next = self.clone();
        next.reveal_from(coords);
        Ok(next)
    }

    /// Flags an unopened cell, or clears an existing flag.
    pub fn toggle_flag(&self, coords: Coord2) -> Result<Self> {
        use VisibleCell::*;

        let coords = self.mine_layout.validate_coords(coords)?;
        if self.state.is_finished() {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        next.board[coords] = match self.board[coords] {
            Unrevealed | KnownSafe | Suggested => Flagged,
            Flagged => Unrevealed,
            opened @ (Revealed(_) | Exploded) => opened,
        };
        Ok(next)
    }

    fn reveal_from(&mut self, coords: Coord2) {
        if self.mine_layout[coords] {
            log::debug!("mine hit at {:?}", coords);
            self.board[coords] = VisibleCell::Exploded;
            self.triggered_mine = Some(coords);
            self.state = EngineState::Lost;
            return;
        }

        let mut visited = HashSet::new();
        visited.insert(coords);
        let mut frontier = VecDeque::from([coords]);

        while let Some(visit_coords) = frontier.pop_front() {
            let adjacent_mines = self.mine_layout.adjacent_mine_count(visit_coords);
            self.board[visit_coords] = VisibleCell::Revealed(adjacent_mines);
            self.revealed_count += 1;

            if adjacent_mines != 0 {
                continue;
            }

            for pos in self.mine_layout.iter_neighbors(visit_coords) {
                if self.board[pos].is_expandable() && visited.insert(pos) {
                    frontier.push_back(pos);
                }
            }
        }

        log::trace!(
            "click at {:?} opened {} cells",
            coords,
            visited.len()
        );

        self.state = if self.revealed_count == self.mine_layout.safe_cell_count() {
            EngineState::Won
        } else {
            EngineState::Active
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn layout(size: Coord2, mines: &[Coord2]) -> MineLayout {
        MineLayout::from_mine_coords(size, mines).unwrap()
    }

    #[test]
    fn click_hits_mine_and_sets_triggered_cell() {
        let engine = PlayEngine::new(layout((2, 2), &[(0, 0)]));

        let next = engine.click((0, 0)).unwrap();

        assert_eq!(next.state(), EngineState::Lost);
        assert_eq!(next.status(), GameStatus::Lost);
        assert_eq!(next.triggered_mine(), Some((0, 0)));
        assert_eq!(next.cell_at((0, 0)), VisibleCell::Exploded);
        assert_eq!(next.cell_at((1, 1)), VisibleCell::Unrevealed);
    }

    #[test]
    fn corner_click_on_empty_board_reveals_everything() {
        let engine = PlayEngine::new(layout((3, 3), &[]));

        let next = engine.click((0, 0)).unwrap();

        assert_eq!(next.revealed_count(), 9);
        assert!(next.visible().iter().all(|(_, cell)| cell == VisibleCell::Revealed(0)));
        assert_eq!(next.state(), EngineState::Won);
    }

    #[test]
    fn flood_fill_stops_at_numbered_border() {
        let engine = PlayEngine::new(layout((3, 3), &[(2, 2)]));

        let next = engine.click((0, 0)).unwrap();

        assert_eq!(next.cell_at((0, 0)), VisibleCell::Revealed(0));
        assert_eq!(next.cell_at((1, 1)), VisibleCell::Revealed(1));
        assert_eq!(next.cell_at((2, 2)), VisibleCell::Unrevealed);
        assert_eq!(next.state(), EngineState::Won);
    }

    #[test]
    fn numbered_click_does_not_expand() {
        let engine = PlayEngine::new(layout((3, 1), &[(2, 0)]));

        let next = engine.click((1, 0)).unwrap();

        assert_eq!(next.cell_at((1, 0)), VisibleCell::Revealed(1));
        assert_eq!(next.cell_at((0, 0)), VisibleCell::Unrevealed);
        assert_eq!(next.state(), EngineState::Active);
    }

    #[test]
    fn flood_fill_skips_flagged_cells() {
        let engine = PlayEngine::new(layout((4, 1), &[]));
        let flagged = engine.toggle_flag((2, 0)).unwrap();

        let next = flagged.click((0, 0)).unwrap();

        assert_eq!(next.cell_at((1, 0)), VisibleCell::Revealed(0));
        assert_eq!(next.cell_at((2, 0)), VisibleCell::Flagged);
        assert_eq!(next.cell_at((3, 0)), VisibleCell::Unrevealed);
    }

    #[test]
    fn click_leaves_previous_snapshot_untouched() {
        let engine = PlayEngine::new(layout((3, 3), &[(2, 2)]));

        let next = engine.click((0, 0)).unwrap();

        assert_eq!(engine.revealed_count(), 0);
        assert!(engine.visible().iter().all(|(_, cell)| cell == VisibleCell::Unrevealed));
        assert_ne!(engine, next);
    }

    #[test]
    fn repeated_click_is_a_no_op() {
        let engine = PlayEngine::new(layout((3, 1), &[(2, 0)]));

        let once = engine.click((1, 0)).unwrap();
        let twice = once.click((1, 0)).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn click_out_of_bounds_is_rejected() {
        let engine = PlayEngine::new(layout((2, 2), &[]));

        assert_eq!(engine.click((2, 0)), Err(GameError::InvalidCoords));
        assert_eq!(engine.toggle_flag((0, 5)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn finished_game_ignores_clicks() {
        let engine = PlayEngine::new(layout((2, 1), &[(0, 0)]));
        let lost = engine.click((0, 0)).unwrap();

        let after = lost.click((1, 0)).unwrap();

        assert_eq!(after, lost);
    }

    #[test]
    fn winning_board_transitions_to_won_state() {
        let engine = PlayEngine::new(layout((2, 1), &[(0, 0)]));

        let next = engine.click((1, 0)).unwrap();

        assert_eq!(next.state(), EngineState::Won);
        assert!(next.is_finished());
    }

    #[test]
    fn toggle_flag_round_trips_and_ignores_opened() {
        let engine = PlayEngine::new(layout((3, 1), &[(2, 0)]));

        let flagged = engine.toggle_flag((2, 0)).unwrap();
        assert_eq!(flagged.cell_at((2, 0)), VisibleCell::Flagged);
        let cleared = flagged.toggle_flag((2, 0)).unwrap();
        assert_eq!(cleared.cell_at((2, 0)), VisibleCell::Unrevealed);

        let opened = cleared.click((1, 0)).unwrap();
        let unchanged = opened.toggle_flag((1, 0)).unwrap();
        assert_eq!(unchanged.cell_at((1, 0)), VisibleCell::Revealed(1));
    }

    fn random_layout(width: Coord, height: Coord, density: f64, seed: u64) -> MineLayout {
        let config = GameConfig::new(width, height, density).unwrap();
        MineLayout::generate(config, &mut SmallRng::seed_from_u64(seed))
    }

    proptest! {
        #[test]
        fn zero_region_is_revealed_from_any_of_its_cells(
            width in 1u8..16,
            height in 1u8..16,
            density in 0.0f64..0.3,
            seed: u64,
        ) {
            let layout = random_layout(width, height, density, seed);
            let engine = PlayEngine::new(layout.clone());
            let Some(start) = iter_coords(layout.size())
                .find(|&pos| !layout[pos] && layout.adjacent_mine_count(pos) == 0)
            else {
                return Ok(());
            };

            let reference = engine.click(start).unwrap();
            let region = reference.visible().coords_where(|cell| cell == VisibleCell::Revealed(0));

            for pos in region {
                let other = engine.click(pos).unwrap();
                prop_assert_eq!(other.visible(), reference.visible());
            }
        }

        #[test]
        fn reveal_is_the_zero_region_plus_its_border(
            width in 1u8..16,
            height in 1u8..16,
            density in 0.0f64..0.3,
            seed: u64,
            x in 0u8..16,
            y in 0u8..16,
        ) {
            let layout = random_layout(width, height, density, seed);
            let target = (x % width, y % height);
            prop_assume!(!layout[target]);

            let next = PlayEngine::new(layout).click(target).unwrap();
            let grid = next.visible();

            for (pos, cell) in grid.iter() {
                if cell == VisibleCell::Revealed(0) {
                    prop_assert!(grid.iter_neighbor_cells(pos).all(|n| n.is_opened()));
                }
                if cell.is_opened() && pos != target {
                    prop_assert!(grid
                        .iter_neighbor_cells(pos)
                        .any(|n| n == VisibleCell::Revealed(0)));
                }
            }
        }

        #[test]
        fn board_never_holds_annotations(
            width in 1u8..12,
            height in 1u8..12,
            density in 0.0f64..0.4,
            seed: u64,
            moves in prop::collection::vec((0u8..12, 0u8..12, any::<bool>()), 1..20),
        ) {
            let mut engine = PlayEngine::new(random_layout(width, height, density, seed));

            for (x, y, flag) in moves {
                let target = (x % width, y % height);
                engine = if flag {
                    engine.toggle_flag(target).unwrap()
                } else {
                    engine.click(target).unwrap()
                };
                prop_assert!(engine.visible().iter().all(|(_, cell)| !matches!(
                    cell,
                    VisibleCell::KnownSafe | VisibleCell::Suggested
                )));
            }
        }

        #[test]
        fn click_is_idempotent(
            width in 1u8..12,
            height in 1u8..12,
            density in 0.0f64..0.5,
            seed: u64,
            x in 0u8..12,
            y in 0u8..12,
        ) {
            let engine = PlayEngine::new(random_layout(width, height, density, seed));
            let target = (x % width, y % height);

            let once = engine.click(target).unwrap();
            let twice = once.click(target).unwrap();

            prop_assert_eq!(once, twice);
        }
    }
}
