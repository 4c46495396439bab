// Test-only helpers for world generation integration tests.
//
// Thin conveniences over the real `ChunkManager` (from
// `tidewalk_sim::chunk_manager`): a walkability predicate that treats grass
// as walkable and water or ungenerated chunks as blocked, an ASCII dump of a
// chunk for assertion messages, and a one-call expansion through every edge
// of a chunk. Generation, persistence, and pathfinding all go through the
// same code paths the `worldgen` binary uses.
//
// See also: `tests/full_pipeline.rs` for the integration test scenarios.

use tidewalk_sim::chunk_manager::ChunkManager;
use tidewalk_sim::config::WorldConfig;
use tidewalk_sim::tiles::TileGrid;
use tidewalk_sim::types::{ChunkCoord, Edge, TileCoord, TileType};

/// Small chunks keep the end-to-end tests fast in debug builds.
pub const TEST_CHUNK_SIZE: u32 = 16;

/// Default config with `TEST_CHUNK_SIZE` chunks.
pub fn test_config() -> WorldConfig {
    WorldConfig {
        chunk_size: TEST_CHUNK_SIZE,
        ..WorldConfig::default()
    }
}

/// Walkability predicate for `find_path`: grass is walkable, water and
/// tiles in chunks that were never generated are not.
pub fn walkable_on_land(manager: &ChunkManager) -> impl Fn(TileCoord) -> bool + '_ {
    move |tile| manager.is_walkable(tile)
}

/// Render a grid one row per line, `.` for grass and `~` for water.
pub fn ascii_map(grid: &TileGrid) -> String {
    let size = grid.size() as i32;
    let mut out = String::with_capacity((grid.size() as usize + 1) * grid.size() as usize);
    for y in 0..size {
        for x in 0..size {
            out.push(match grid.get(x, y) {
                TileType::Grass => '.',
                TileType::Water => '~',
            });
        }
        out.push('\n');
    }
    out
}

/// Expand chunk `(cx, cy)` through all four edges. Returns the neighbors
/// that did not exist before the call.
pub fn expand_all_edges(manager: &mut ChunkManager, cx: i32, cy: i32) -> Vec<ChunkCoord> {
    let source = ChunkCoord::new(cx, cy);
    let mut created = Vec::new();
    for edge in Edge::ALL {
        let target = source
            .neighbor(edge)
            .expect("test chunks sit well inside the lattice");
        let existed = manager.contains(target);
        manager
            .expand_chunk(cx, cy, edge)
            .expect("source chunk must exist before expanding");
        if !existed {
            created.push(target);
        }
    }
    created
}

/// Every world-space tile of a generated chunk with the given type.
pub fn tiles_of_type(manager: &ChunkManager, coord: ChunkCoord, tile: TileType) -> Vec<TileCoord> {
    let size = manager.config().chunk_size as i32;
    let (Some(origin), Some(chunk)) = (
        coord.origin_tile(manager.config().chunk_size),
        manager.get_chunk(coord),
    ) else {
        return Vec::new();
    };
    let mut found = Vec::new();
    for y in 0..size {
        for x in 0..size {
            if chunk.tiles.get(x, y) == tile {
                found.push(TileCoord::new(origin.x + x, origin.y + y));
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_map_marks_water() {
        let mut grid = TileGrid::new(3);
        grid.set(1, 0, TileType::Water);
        grid.set(2, 2, TileType::Water);
        assert_eq!(ascii_map(&grid), ".~.\n...\n..~\n");
    }

    #[test]
    fn ungenerated_tiles_are_not_walkable() {
        let mut manager = ChunkManager::new(5, test_config());
        manager.generate_chunk(0, 0, None);
        let walkable = walkable_on_land(&manager);
        assert!(!walkable(TileCoord::new(-1, 0)));
        let grass = tiles_of_type(&manager, ChunkCoord::new(0, 0), TileType::Grass);
        assert!(grass.iter().all(|&t| walkable(t)));
    }
}
