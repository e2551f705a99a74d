//! Self-play CLI: push random games through the room manager.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- --games 1000 --seed 7

use clap::Parser;

use sixstones_server::selfplay::run_selfplay;

#[derive(Parser)]
#[command(name = "selfplay", about = "Run random-vs-random six-in-a-row games")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    games: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Print progress every N games (0 = off)
    #[arg(long, default_value = "0")]
    progress_every: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let every = cli.progress_every;

    let progress = move |done: usize, total: usize| {
        if every > 0 && done % every == 0 {
            eprintln!("  game {}/{}", done, total);
        }
    };

    let result = run_selfplay(cli.games, cli.seed, Some(&progress))?;
    println!("\n{}", result.summary());
    Ok(())
}
