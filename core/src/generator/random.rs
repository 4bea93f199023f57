use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

/// Purely random generation: every cell is a mine with the configured density, reproducible from `seed`.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let layout = MineLayout::generate(config, &mut rng);

        if layout.safe_cell_count() == 0 {
            log::warn!(
                "Generated minefield is full, {} mines on {} cells",
                layout.mine_count(),
                layout.total_cells()
            );
        }
        log::debug!(
            "Generated {}x{} minefield with {} mines (density {}, seed {})",
            config.size.0,
            config.size.1,
            layout.mine_count(),
            config.density,
            self.seed
        );
        layout
    }
}
