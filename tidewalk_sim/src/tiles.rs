// Dense square tile grid for one chunk.
//
// Tiles are stored as a flat `Vec<TileType>` in row-major order, indexed by
// `x + y * size`, which is also the order the RLE codec walks them.
// Out-of-bounds reads return `Grass`; out-of-bounds writes are no-ops, so
// the river stamp can run off the edge of a chunk without special cases.
//
// A grid is only written while its chunk is being generated (or decoded
// from a save). Once a `Chunk` owns it, nothing mutates it again.
//
// See also: `river_gen.rs` which carves water into a fresh grid, `codec.rs`
// for the persistence format.

use crate::types::TileType;

/// Dense 2D tile grid, `size` × `size`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileGrid {
    /// Flat storage: index = x + y * size.
    tiles: Vec<TileType>,
    size: u32,
}

impl TileGrid {
    /// Create a new grid filled with `Grass`.
    pub fn new(size: u32) -> Self {
        let total = (size as usize) * (size as usize);
        Self {
            tiles: vec![TileType::Grass; total],
            size,
        }
    }

    /// Wrap already-decoded row-major tiles.
    ///
    /// Returns `None` if `tiles.len()` is not `size * size`.
    pub fn from_tiles(size: u32, tiles: Vec<TileType>) -> Option<Self> {
        (tiles.len() == (size as usize) * (size as usize)).then_some(Self { tiles, size })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Check whether a local coordinate is within bounds.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.size && (y as u32) < self.size
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| x as usize + y as usize * self.size as usize)
    }

    /// Read a tile. Returns `Grass` for out-of-bounds coordinates.
    pub fn get(&self, x: i32, y: i32) -> TileType {
        self.index(x, y)
            .map(|i| self.tiles[i])
            .unwrap_or(TileType::Grass)
    }

    /// Write a tile. No-op for out-of-bounds coordinates.
    pub fn set(&mut self, x: i32, y: i32, tile: TileType) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    /// Set every in-bounds tile of the square `[cx-r, cx+r] × [cy-r, cy+r]`.
    pub fn fill_square(&mut self, cx: i32, cy: i32, radius: i32, tile: TileType) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                self.set(cx + dx, cy + dy, tile);
            }
        }
    }

    /// Row-major view of all tiles.
    pub fn tiles(&self) -> &[TileType] {
        &self.tiles
    }

    /// Number of tiles of the given type.
    pub fn count(&self, tile: TileType) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }
}
