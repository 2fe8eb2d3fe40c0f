//! Extract embedded raster images from a map container into PNG files.

use std::path::PathBuf;

use clap::Parser;

use map_generator::error::MapError;
use map_generator::{images, mapfile};

#[derive(Parser, Debug)]
#[command(name = "save_images")]
#[command(about = "Save every embedded image of a map container as PNG")]
struct Args {
    /// Map file to read
    map: PathBuf,
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
    let (items, data) = mapfile::load_map(&args.map)?;
    let written = images::save_images(&args.map, &items, &data)?;
    for path in &written {
        println!("saved {}", path.display());
    }
    if written.is_empty() {
        println!("no embedded images found");
    }
    Ok(())
}
