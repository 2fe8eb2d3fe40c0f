//! Generate a simple scatter map: a bordered box with random blocks.

use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use map_generator::error::MapError;
use map_generator::mapfile;
use map_generator::random_blocks::{self, RandomBlocksParams};

#[derive(Parser, Debug)]
#[command(name = "random_blocks")]
#[command(about = "Generate a map with uniformly scattered blocks")]
struct Args {
    /// Output map file
    #[arg(short, long, default_value = "newmap.map")]
    output: PathBuf,

    /// Width and height of the grid
    #[arg(long, default_value = "50")]
    size: usize,

    /// Probability that an interior cell becomes a block
    #[arg(long, default_value = "0.05")]
    density: f64,

    /// Random seed (uses a random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), MapError> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    println!("Generating {}x{} scatter map with seed: {}", args.size, args.size, seed);

    let params = RandomBlocksParams {
        size: args.size,
        density: args.density,
    };
    let (grid, layers) = random_blocks::generate(&params, &mut rng)?;
    mapfile::save_map(&args.output, &grid, &layers)?;
    println!("Saved map to {}", args.output.display());
    Ok(())
}
