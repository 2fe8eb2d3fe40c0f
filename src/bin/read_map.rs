//! Inspect a map container: header fields, items and data block summaries.

use std::fs;
use std::path::PathBuf;

use clap::Parser;

use map_generator::container;
use map_generator::error::MapError;

/// Human-readable names of the known item types, indexed by type id.
const TYPE_NAMES: [&str; 7] = [
    "version",
    "info",
    "image",
    "envelopes",
    "group",
    "layer",
    "envpoint",
];

#[derive(Parser, Debug)]
#[command(name = "read_map")]
#[command(about = "Print the structure of a map container file")]
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
    let bytes = fs::read(&args.map)?;
    let header = container::parse_header(&bytes)?;
    println!(
        "header: version = {}, size = {}, swaplen = {}, item types = {}, items = {}, data blocks = {}, item area = {}, data area = {}",
        header.version,
        header.size,
        header.swaplen,
        header.num_item_types,
        header.num_items,
        header.num_data,
        header.item_area_size,
        header.data_area_size
    );

    let (items, data) = container::decode(&bytes)?;

    println!("item types:");
    for (type_id, name) in TYPE_NAMES.iter().enumerate() {
        let count = items
            .iter()
            .filter(|item| item.type_id == type_id as u16)
            .count();
        if count > 0 {
            println!("{:4} {}", count, name);
        }
    }

    println!("items:");
    for item in &items {
        println!("{:3} {}: {:?}", item.id, item.type_id, item.payload);
    }

    println!("data ({} blocks):", data.len());
    for block in &data {
        let preview = &block[..block.len().min(16)];
        println!("{:8} bytes - {:?} ...", block.len(), preview);
    }
    Ok(())
}
