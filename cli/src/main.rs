use clap::{Parser, Subcommand};

mod autoplay;
mod estimate;
mod serve;

/// Minesweeper move suggestions and mine probability estimates.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play generated games with the suggestion planner
    Autoplay(autoplay::AutoplayArgs),
    /// Monte Carlo mine probabilities for a textual clue grid
    Estimate(estimate::EstimateArgs),
    /// Answer the remote-play protocol on stdin/stdout
    Serve(serve::ServeArgs),
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .parse_default_env()
        .init();

    match args.command {
        Command::Autoplay(args) => autoplay::run(args),
        Command::Estimate(args) => estimate::run(args),
        Command::Serve(args) => serve::run(args),
    }
}

/// Seed given on the command line, or a random one that gets logged so the run
/// can be repeated.
fn resolve_seed(seed: Option<u64>) -> u64 {
    let seed = seed.unwrap_or_else(rand::random);
    log::info!("seed: {seed}");
    seed
}
