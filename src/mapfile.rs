//! Map-level container assembly and file I/O.
//!
//! Builds the fixed item list and data blocks for a game grid plus its named
//! visual layers, and wraps the low-level codec with single-shot file reads
//! and writes.

use std::fs;
use std::path::Path;

use log::info;

use crate::container::{self, Item};
use crate::error::Result;
use crate::tilemap::TileGrid;

/// Item type ids of the container format.
pub const ITEM_TYPE_VERSION: u16 = 0;
pub const ITEM_TYPE_INFO: u16 = 1;
pub const ITEM_TYPE_IMAGE: u16 = 2;
pub const ITEM_TYPE_GROUP: u16 = 4;
pub const ITEM_TYPE_LAYER: u16 = 5;
pub const ITEM_TYPE_ENVPOINT: u16 = 6;

/// Layer type field inside a layer item: tiles.
const LAYER_TYPE_TILES: u32 = 2;
/// "no reference" marker used throughout the format.
const NONE: u32 = 0xffff_ffff;

/// The group/game-layer name "Game" in the format's packed string encoding.
const NAME_GAME: [u32; 3] = [3_353_472_485, 0x8080_8080, 0x8080_8000];
/// An empty packed name.
const NAME_EMPTY: [u32; 3] = [0x8080_8080, 0x8080_8080, 0x8080_8000];

/// Build the item list and data blocks for a map.
///
/// Fixed layout with N layers: one version item, one info item, one image
/// item per layer, one group item, the game layer item, one tile-layer item
/// per layer, and a terminating empty envpoint item. Data blocks are the
/// layer name strings, the game grid payload, then each layer payload.
pub fn build_map(grid: &TileGrid, layers: &[(String, TileGrid)]) -> (Vec<Item>, Vec<Vec<u8>>) {
    let n = layers.len() as u32;
    let width = grid.width as u32;
    let height = grid.height as u32;

    let mut items = vec![
        Item::new(0, ITEM_TYPE_VERSION, vec![1]),
        Item::new(0, ITEM_TYPE_INFO, vec![1, NONE, NONE, NONE, NONE, NONE]),
    ];

    // image descriptors: version, width, height, external, name, data
    for i in 0..n {
        items.push(Item::new(
            i as u16,
            ITEM_TYPE_IMAGE,
            vec![1, 1024, 1024, 1, i, NONE],
        ));
    }

    // one group holding the game layer and all tile layers
    let mut group = vec![3, 0, 0, 100, 100, 0, 1 + n, 0, 0, 0, 0, 0];
    group.extend_from_slice(&NAME_GAME);
    items.push(Item::new(0, ITEM_TYPE_GROUP, group));

    // game layer: flags = 1 marks it as the gameplay layer; its payload is
    // the data block right after the layer names
    let mut game_layer = vec![
        0,
        LAYER_TYPE_TILES,
        0,
        3,
        width,
        height,
        1,
        255,
        255,
        255,
        255,
        NONE,
        0,
        NONE,
        n,
    ];
    game_layer.extend_from_slice(&NAME_GAME);
    game_layer.extend_from_slice(&[NONE; 5]);
    items.push(Item::new(0, ITEM_TYPE_LAYER, game_layer));

    // visual tile layers reference image i-1 and data block n+i
    for (i, (_, layer)) in layers.iter().enumerate() {
        let i = i as u32 + 1;
        let mut tile_layer = vec![
            0,
            LAYER_TYPE_TILES,
            0,
            3,
            layer.width as u32,
            layer.height as u32,
            0,
            255,
            255,
            255,
            255,
            NONE,
            0,
            i - 1,
            n + i,
        ];
        tile_layer.extend_from_slice(&NAME_EMPTY);
        tile_layer.extend_from_slice(&[NONE; 5]);
        items.push(Item::new(i as u16, ITEM_TYPE_LAYER, tile_layer));
    }

    items.push(Item::new(0, ITEM_TYPE_ENVPOINT, vec![]));

    let mut data = Vec::with_capacity(2 * layers.len() + 1);
    for (name, _) in layers {
        let mut bytes = name.as_bytes().to_vec();
        bytes.push(0);
        data.push(bytes);
    }
    data.push(grid.to_map_bytes());
    for (_, layer) in layers {
        data.push(layer.to_map_bytes());
    }

    (items, data)
}

/// Encode a grid plus layers into container bytes.
pub fn encode_map(grid: &TileGrid, layers: &[(String, TileGrid)]) -> Result<Vec<u8>> {
    let (items, data) = build_map(grid, layers);
    container::encode(&items, &data)
}

/// Encode a map and write it to disk in one shot.
pub fn save_map(path: &Path, grid: &TileGrid, layers: &[(String, TileGrid)]) -> Result<()> {
    let bytes = encode_map(grid, layers)?;
    fs::write(path, &bytes)?;
    info!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Read a container file and decode it.
pub fn load_map(path: &Path) -> Result<(Vec<Item>, Vec<Vec<u8>>)> {
    let bytes = fs::read(path)?;
    container::decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::parse_header;
    use crate::tilemap::Tilemap;

    #[test]
    fn test_zero_layer_container_counts() {
        let grid: TileGrid = Tilemap::new(50, 50);
        let (items, data) = build_map(&grid, &[]);
        // version, info, group, game layer, terminator
        assert_eq!(items.len(), 5);
        assert_eq!(data.len(), 1);

        let bytes = encode_map(&grid, &[]).unwrap();
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.num_items, 5);
        assert_eq!(header.num_data, 1);
        // distinct types: version, info, group, layer, envpoint
        assert_eq!(header.num_item_types, 5);
    }

    #[test]
    fn test_map_roundtrip_recovers_payloads() {
        let mut grid: TileGrid = Tilemap::new(40, 30);
        grid.set(3, 7, 1);
        grid.set(20, 20, 192);
        let mut deco: TileGrid = Tilemap::new(40, 30);
        deco.set(3, 7, 64);
        let layers = vec![("desert_main".to_string(), deco.clone())];

        let bytes = encode_map(&grid, &layers).unwrap();
        let (items, data) = container::decode(&bytes).unwrap();

        // name block, game block, layer block
        assert_eq!(data.len(), 3);
        assert_eq!(data[0], b"desert_main\0");
        assert_eq!(data[1], grid.to_map_bytes());
        assert_eq!(data[1].len(), 40 * 30 * 4);
        assert_eq!(data[2], deco.to_map_bytes());

        // the game layer item records the grid shape
        let game_layer = items
            .iter()
            .find(|item| item.type_id == ITEM_TYPE_LAYER && item.payload[6] == 1)
            .unwrap();
        assert_eq!(game_layer.payload[4], 40);
        assert_eq!(game_layer.payload[5], 30);
        // and references the game data block
        assert_eq!(game_layer.payload[14], 1);
    }

    #[test]
    fn test_generated_map_roundtrip() {
        use crate::direction::DirectionSequence;
        use crate::generator::{self, GenerationParams};
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let params = GenerationParams {
            basesize: 120,
            ..GenerationParams::default()
        };
        let directions = DirectionSequence::new(vec![2, 2, 3, 3, 2, 1, 2]).unwrap();
        let (grid, layers) = generator::generate(&directions, &params, &mut rng).unwrap();

        let bytes = encode_map(&grid, &layers).unwrap();
        let (_, data) = container::decode(&bytes).unwrap();
        assert_eq!(data.len(), 2 * layers.len() + 1);
        assert_eq!(data[layers.len()], grid.to_map_bytes());
        for (i, (_, layer)) in layers.iter().enumerate() {
            assert_eq!(data[layers.len() + 1 + i], layer.to_map_bytes());
            assert_eq!(
                data[layers.len() + 1 + i].len(),
                layer.width * layer.height * 4
            );
        }
    }

    #[test]
    fn test_layer_items_reference_images_and_blocks() {
        let grid: TileGrid = Tilemap::new(10, 10);
        let layers = vec![
            ("generic_unhookable".to_string(), Tilemap::new(10, 10)),
            ("desert_main".to_string(), Tilemap::new(10, 10)),
        ];
        let (items, data) = build_map(&grid, &layers);
        // 5 fixed items + image and tile-layer item per layer
        assert_eq!(items.len(), 5 + 2 * layers.len());
        assert_eq!(data.len(), 1 + 2 * layers.len());

        let images: Vec<&Item> = items
            .iter()
            .filter(|item| item.type_id == ITEM_TYPE_IMAGE)
            .collect();
        assert_eq!(images.len(), 2);
        for (i, image) in images.iter().enumerate() {
            // name block index
            assert_eq!(image.payload[4], i as u32);
        }

        let tile_layers: Vec<&Item> = items
            .iter()
            .filter(|item| item.type_id == ITEM_TYPE_LAYER && item.payload[6] == 0)
            .collect();
        assert_eq!(tile_layers.len(), 2);
        for (i, layer) in tile_layers.iter().enumerate() {
            assert_eq!(layer.payload[13], i as u32); // image reference
            assert_eq!(layer.payload[14], (layers.len() + 1 + i) as u32); // data block
        }
    }
}
