use anyhow::Context;
use clap::Args;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use sweephint_core::{
    AnalysisConfig, CellCount, Coord, DEFAULT_ASSUMED_MINE_DENSITY, GameConfig, GameStatus,
    LayoutGenerator, PlayEngine, RandomLayoutGenerator, SuggestionPlanner,
};

#[derive(Args, Debug)]
pub struct AutoplayArgs {
    /// Board width
    #[arg(long, default_value_t = 9)]
    pub width: Coord,

    /// Board height
    #[arg(long, default_value_t = 9)]
    pub height: Coord,

    /// Chance of each cell holding a mine
    #[arg(long, default_value_t = 0.12)]
    pub density: f64,

    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of games to play
    #[arg(short, long, default_value_t = 1)]
    pub games: u32,

    /// Mine probability assumed for cells no clue touches
    #[arg(long, default_value_t = DEFAULT_ASSUMED_MINE_DENSITY)]
    pub prior: f64,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameReport {
    pub seed: u64,
    pub status: GameStatus,
    pub moves: u32,
    pub revealed: CellCount,
    pub safe_cells: CellCount,
    pub mines: CellCount,
}

#[derive(Clone, Debug, Serialize)]
pub struct AutoplayReport {
    pub config: GameConfig,
    pub won: u32,
    pub lost: u32,
    pub games: Vec<GameReport>,
}

pub fn run(args: AutoplayArgs) -> anyhow::Result<()> {
    let config = GameConfig::new(args.width, args.height, args.density)
        .context("Invalid board configuration")?;
    let analysis = AnalysisConfig::new(args.prior).context("Invalid --prior")?;
    let seed = crate::resolve_seed(args.seed);

    let report = autoplay(config, analysis, seed, args.games)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (index, game) in report.games.iter().enumerate() {
            println!(
                "game {index}: {:?} after {} moves, {}/{} safe cells revealed (seed {})",
                game.status, game.moves, game.revealed, game.safe_cells, game.seed
            );
        }
        println!("won {} of {} games", report.won, report.games.len());
    }
    Ok(())
}

/// Game `i` uses layout seed `seed + i`; moves are drawn from a generator seeded
/// with the same value.
pub fn autoplay(
    config: GameConfig,
    analysis: AnalysisConfig,
    seed: u64,
    games: u32,
) -> anyhow::Result<AutoplayReport> {
    let planner = SuggestionPlanner::new(analysis);
    let mut report = AutoplayReport {
        config,
        won: 0,
        lost: 0,
        games: Vec::new(),
    };

    for index in 0..games {
        let game_seed = seed.wrapping_add(u64::from(index));
        let game = play_one(&planner, config, game_seed)
            .with_context(|| format!("Game {index} failed"))?;
        match game.status {
            GameStatus::Won => report.won += 1,
            GameStatus::Lost => report.lost += 1,
            GameStatus::Playing => {}
        }
        report.games.push(game);
    }

    Ok(report)
}

fn play_one(
    planner: &SuggestionPlanner,
    config: GameConfig,
    seed: u64,
) -> anyhow::Result<GameReport> {
    let layout = RandomLayoutGenerator::new(seed).generate(config);
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut engine = PlayEngine::new(layout);
    let mut moves = 0;

    // nothing to reveal, counted as won without a move
    if engine.layout().safe_cell_count() == 0 {
        return Ok(report(&engine, GameStatus::Won, seed, moves));
    }

    while !engine.is_finished() {
        let plan = planner.plan(engine.visible());
        let Some(next) = plan.next_move(&mut rng) else {
            break;
        };
        log::info!("move {moves}: open {next:?}");
        engine = engine.click(next)?;
        moves += 1;
    }

    log::debug!(
        "game with seed {seed} ended {:?} after {moves} moves",
        engine.status()
    );
    Ok(report(&engine, engine.status(), seed, moves))
}

fn report(engine: &PlayEngine, status: GameStatus, seed: u64, moves: u32) -> GameReport {
    GameReport {
        seed,
        status,
        moves,
        revealed: engine.revealed_count(),
        safe_cells: engine.layout().safe_cell_count(),
        mines: engine.layout().mine_count(),
    }
}
