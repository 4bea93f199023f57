use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::{fs, io, thread};

use anyhow::Context;
use clap::Args;
use sweephint_core::{ClueGrid, MineEstimate, MonteCarloConfig, estimate_parallel};

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Clue grid to read, stdin when omitted
    pub file: Option<PathBuf>,

    /// Chance of an unknown cell holding a mine in sampled layouts
    #[arg(long, default_value_t = 0.2)]
    pub density: f64,

    /// Number of sampled layouts
    #[arg(short = 'n', long, default_value_t = 100_000)]
    pub iterations: u64,

    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Number of independently seeded shards, defaults to the available cores
    #[arg(long)]
    pub shards: Option<usize>,
}

pub fn run(args: EstimateArgs) -> anyhow::Result<()> {
    let text = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Could not read stdin")?;
            text
        }
    };

    let config =
        MonteCarloConfig::new(args.density, args.iterations).context("Invalid --density")?;
    let seed = crate::resolve_seed(args.seed);
    let shards = args
        .shards
        .unwrap_or_else(|| thread::available_parallelism().map_or(1, usize::from));

    let estimate = estimate_text(&text, config, seed, shards)?;
    log::info!(
        "accepted {} of {} layouts ({:.2}%)",
        estimate.accepted,
        estimate.trials,
        estimate.acceptance_rate() * 100.0
    );
    print!("{}", estimate.probabilities);
    Ok(())
}

fn estimate_text(
    text: &str,
    config: MonteCarloConfig,
    seed: u64,
    shards: usize,
) -> anyhow::Result<MineEstimate> {
    let grid: ClueGrid = text.parse().context("Invalid clue grid")?;
    log::debug!(
        "estimating {} unknown cells with {shards} shards",
        grid.unknown_count()
    );

    let cancel = AtomicBool::new(false);
    let estimate = estimate_parallel(&grid, config, seed, shards, &cancel)?;
    Ok(estimate)
}
