use std::fs;
use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use map_generator::direction::DirectionSequence;
use map_generator::error::MapError;
use map_generator::generator::{self, GenerationParams};
use map_generator::mapfile;

#[derive(Parser, Debug)]
#[command(name = "map_generator")]
#[command(about = "Generate tunnel maps and save them in the map container format")]
struct Args {
    /// Output map file
    #[arg(short, long, default_value = "newmap.map")]
    output: PathBuf,

    /// Random seed (uses a random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file with generation parameters (overrides the individual flags)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Base map size (width and height)
    #[arg(long, default_value = "300")]
    basesize: usize,

    /// Block length (maximum tunnel size)
    #[arg(long, default_value = "20")]
    blocklen: i32,

    /// Minimum wall thickness per side
    #[arg(long, default_value = "1")]
    min_wall_thickness: i32,

    /// Maximum wall thickness per side
    #[arg(long, default_value = "5")]
    max_wall_thickness: i32,

    /// Probability of a wall thickness drift per cell
    #[arg(long, default_value = "0.15")]
    wall_thickness_change_probability: f64,

    /// Obstacle grow length (must be below blocklen * sqrt(0.5) - 2)
    #[arg(long, default_value = "11")]
    obstacle_growlen: i32,

    /// Number of obstacle stubs grown per segment
    #[arg(long, default_value = "5")]
    obstacle_size: u32,

    /// Probability of switching the obstacle side after a segment
    #[arg(long, default_value = "0.8")]
    obstacle_side_switch_probability: f64,

    /// Probability of an obstacle walk turning per step
    #[arg(long, default_value = "0.4")]
    obstacle_direction_change_probability: f64,

    /// Probability that a segment's obstacles get freeze rings
    #[arg(long, default_value = "0.8")]
    obstacle_freeze_probability: f64,

    /// Tile code for corridor walls
    #[arg(long, default_value = "1")]
    block_wall: u8,

    /// Tile code for corner fans
    #[arg(long, default_value = "1")]
    block_corner: u8,

    /// Tile code for obstacles
    #[arg(long, default_value = "1")]
    block_obstacle: u8,

    /// Tile code for freeze buffers
    #[arg(long, default_value = "9")]
    block_freeze: u8,

    /// Directions to build along (comma separated, 0:left 1:up 2:right 3:down)
    #[arg(
        long,
        default_value = "2,2,2,3,3,3,2,1,1,1,2,2,3,3,3,2,1,1,1,2,2,2,2"
    )]
    directions: DirectionSequence,
}

impl Args {
    fn generation_params(&self) -> Result<GenerationParams, MapError> {
        if let Some(path) = &self.params {
            let text = fs::read_to_string(path)?;
            return serde_json::from_str(&text).map_err(|err| {
                MapError::InvalidParameter(format!("bad params file {}: {}", path.display(), err))
            });
        }
        Ok(GenerationParams {
            basesize: self.basesize,
            blocklen: self.blocklen,
            min_wall_thickness: self.min_wall_thickness,
            max_wall_thickness: self.max_wall_thickness,
            wall_thickness_change_probability: self.wall_thickness_change_probability,
            obstacle_growlen: self.obstacle_growlen,
            obstacle_size: self.obstacle_size,
            obstacle_side_switch_probability: self.obstacle_side_switch_probability,
            obstacle_direction_change_probability: self.obstacle_direction_change_probability,
            obstacle_freeze_probability: self.obstacle_freeze_probability,
            block_wall: self.block_wall,
            block_corner: self.block_corner,
            block_obstacle: self.block_obstacle,
            block_freeze: self.block_freeze,
        })
    }
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

    let params = args.generation_params()?;
    println!("Generating map with seed: {}", seed);
    println!(
        "Map size: {}x{}, block length: {}",
        params.basesize, params.basesize, params.blocklen
    );

    let (grid, layers) = generator::generate(&args.directions, &params, &mut rng)?;
    println!(
        "Generated {} wall cells and {} freeze cells",
        grid.count(params.block_wall),
        grid.count(params.block_freeze)
    );

    mapfile::save_map(&args.output, &grid, &layers)?;
    println!("Saved map to {}", args.output.display());
    Ok(())
}
