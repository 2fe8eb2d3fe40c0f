//! Uniform-random scatter map: a bordered box with randomly placed blocks.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::tilemap::{TileGrid, Tilemap, TILE_SPAWN, TILE_WALL};

/// Margin between the border walls and the scattered blocks.
const SCATTER_MARGIN: usize = 5;
/// Decorative tile for scattered blocks in the visual layer.
const DECO_BLOCK: u8 = 16;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomBlocksParams {
    /// Width and height of the (square) grid.
    pub size: usize,
    /// Probability that an interior cell becomes a block.
    pub density: f64,
}

impl Default for RandomBlocksParams {
    fn default() -> Self {
        Self {
            size: 50,
            density: 0.05,
        }
    }
}

/// Generate a bordered grid with uniformly scattered blocks, a spawn near the
/// bottom edge and one `grass_main` visual layer.
pub fn generate(
    params: &RandomBlocksParams,
    rng: &mut ChaCha8Rng,
) -> Result<(TileGrid, Vec<(String, TileGrid)>)> {
    if params.size < 2 * SCATTER_MARGIN + 2 {
        return Err(MapError::InvalidParameter(format!(
            "size {} leaves no interior for scattering",
            params.size
        )));
    }
    if !(0.0..=1.0).contains(&params.density) {
        return Err(MapError::InvalidParameter(format!(
            "density must lie in [0, 1], got {}",
            params.density
        )));
    }

    let size = params.size;
    let mut grid: TileGrid = Tilemap::new(size, size);
    let mut tiles: TileGrid = Tilemap::new(size, size);

    for i in 0..size {
        for (x, y) in [(i, 0), (i, size - 1), (0, i), (size - 1, i)] {
            grid.set(x, y, TILE_WALL);
            tiles.set(x, y, 1);
        }
    }

    for y in SCATTER_MARGIN..size - SCATTER_MARGIN {
        for x in SCATTER_MARGIN..size - SCATTER_MARGIN {
            if rng.gen::<f64>() < params.density {
                grid.set(x, y, TILE_WALL);
                tiles.set(x, y, DECO_BLOCK);
            }
        }
    }

    grid.set(size / 2 - 1, size - 2, TILE_SPAWN);

    Ok((grid, vec![("grass_main".to_string(), tiles)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_border_and_spawn() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (grid, layers) = generate(&RandomBlocksParams::default(), &mut rng).unwrap();
        assert_eq!(grid.width, 50);
        for i in 0..50 {
            assert_eq!(*grid.get(i, 0), TILE_WALL);
            assert_eq!(*grid.get(i, 49), TILE_WALL);
            assert_eq!(*grid.get(0, i), TILE_WALL);
            assert_eq!(*grid.get(49, i), TILE_WALL);
        }
        assert_eq!(grid.count(TILE_SPAWN), 1);
        assert_eq!(*grid.get(24, 48), TILE_SPAWN);
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].0, "grass_main");
    }

    #[test]
    fn test_density_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let params = RandomBlocksParams {
            size: 30,
            density: 0.0,
        };
        let (grid, _) = generate(&params, &mut rng).unwrap();
        // border + spawn only
        assert_eq!(grid.count(TILE_WALL), 4 * 30 - 4);

        let params = RandomBlocksParams {
            size: 30,
            density: 1.0,
        };
        let (grid, _) = generate(&params, &mut rng).unwrap();
        let interior = (30 - 2 * SCATTER_MARGIN) * (30 - 2 * SCATTER_MARGIN);
        assert_eq!(grid.count(TILE_WALL), 4 * 30 - 4 + interior);
    }

    #[test]
    fn test_too_small_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let params = RandomBlocksParams {
            size: 10,
            density: 0.5,
        };
        assert!(generate(&params, &mut rng).is_err());
    }
}
