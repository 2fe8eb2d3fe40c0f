//! A rectangular 2D tilemap grid.

/// A 2D tilemap grid, row-major, fully initialized at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

/// The gameplay grid: one unsigned 8-bit tile code per cell.
pub type TileGrid = Tilemap<u8>;

/// Canonical tile codes of the game layer.
pub const TILE_EMPTY: u8 = 0;
pub const TILE_WALL: u8 = 1;
pub const TILE_UNHOOKABLE: u8 = 3;
pub const TILE_FREEZE: u8 = 9;
pub const TILE_START: u8 = 33;
pub const TILE_FINISH: u8 = 34;
pub const TILE_SPAWN: u8 = 192;

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Iterate over all cells as `(x, y, &value)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (i % self.width, i / self.width, v))
    }
}

impl Tilemap<u8> {
    /// Serialize to the container's tile payload: 4 little-endian bytes per
    /// cell (`[code, 0, 0, 0]`), rows outer. Length is always
    /// `width * height * 4`.
    pub fn to_map_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height * 4);
        for &code in &self.data {
            out.extend_from_slice(&[code, 0, 0, 0]);
        }
        out
    }

    /// Count cells holding a given code.
    pub fn count(&self, code: u8) -> usize {
        self.data.iter().filter(|&&c| c == code).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_roundtrip_get_set() {
        let mut grid: TileGrid = Tilemap::new(4, 3);
        grid.set(3, 2, TILE_WALL);
        assert_eq!(*grid.get(3, 2), TILE_WALL);
        assert_eq!(*grid.get(0, 0), TILE_EMPTY);
        assert_eq!(grid.count(TILE_WALL), 1);
    }

    #[test]
    fn test_map_bytes_layout() {
        let mut grid: TileGrid = Tilemap::new(3, 2);
        grid.set(1, 0, 9);
        grid.set(2, 1, 34);
        let bytes = grid.to_map_bytes();
        assert_eq!(bytes.len(), 3 * 2 * 4);
        // cell (1, 0) is the second cell of the first row
        assert_eq!(&bytes[4..8], &[9, 0, 0, 0]);
        // cell (2, 1) is the last cell
        assert_eq!(&bytes[20..24], &[34, 0, 0, 0]);
    }

    #[test]
    fn test_iter_covers_all_cells() {
        let grid: Tilemap<u8> = Tilemap::new_with(5, 4, 7);
        let mut seen = 0;
        for (x, y, &v) in grid.iter() {
            assert!(x < 5 && y < 4);
            assert_eq!(v, 7);
            seen += 1;
        }
        assert_eq!(seen, 20);
    }
}
