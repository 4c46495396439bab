// Sparse collection of generated chunks.
//
// `ChunkManager` owns the `WorldGenerator` for one seed and a `BTreeMap` of
// every chunk generated so far. Chunks are append-only: the first request
// for a coordinate generates and stores it, every later request returns the
// stored chunk untouched, even if different inbound crossings are offered.
//
// Expansion is how rivers cross seams. `expand_chunk(cx, cy, edge)` takes
// the crossings recorded on the source chunk's `edge` and hands them to the
// neighbor across that edge as inbound crossings on the opposite side, e.g.
// expanding north passes the source's north crossings as the new chunk's
// south inbound crossings.
//
// Persistence stores the seed plus each chunk's RLE tile string and edge
// crossings. Loading never re-runs generation: the generator is rebuilt
// from the stored seed only to decode tiles, so a world loads exactly as it
// was saved even if the carving code has changed since.
//
// See also: `river_gen.rs` for the generator, `codec.rs` for the tile
// string format, `pathfinding.rs` for the search behind `find_path()`.

use crate::config::WorldConfig;
use crate::error::{WorldError, WorldResult};
use crate::pathfinding;
use crate::river_gen::{Chunk, WorldGenerator};
use crate::types::{ChunkCoord, Edge, EdgeBoundaries, TileCoord, TileType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{debug, info};

/// Tile-space rectangle covering every generated chunk. `max_*` are exclusive.
///
/// Held in `i64`: any `i32` chunk coordinate times any chunk size fits, even
/// where the tiles themselves lie outside `TileCoord`'s range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl WorldBounds {
    pub fn width(&self) -> u64 {
        self.max_x.abs_diff(self.min_x)
    }

    pub fn height(&self) -> u64 {
        self.max_y.abs_diff(self.min_y)
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        (self.min_x..self.max_x).contains(&i64::from(tile.x))
            && (self.min_y..self.max_y).contains(&i64::from(tile.y))
    }
}

/// Persisted form of a whole world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub seed: i32,
    pub chunks: Vec<SavedChunk>,
}

/// Persisted form of one chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedChunk {
    pub x: i32,
    pub y: i32,
    /// Row-major RLE tile string, see `codec.rs`.
    pub tiles: String,
    pub edge_boundaries: EdgeBoundaries,
}

/// Owns every generated chunk of one world.
#[derive(Clone, Debug)]
pub struct ChunkManager {
    generator: WorldGenerator,
    chunks: BTreeMap<ChunkCoord, Chunk>,
}

impl ChunkManager {
    /// An empty world. The seed is fixed for the lifetime of the manager.
    pub fn new(seed: i32, config: WorldConfig) -> Self {
        Self {
            generator: WorldGenerator::new(seed, config),
            chunks: BTreeMap::new(),
        }
    }

    pub fn seed(&self) -> i32 {
        self.generator.seed()
    }

    pub fn config(&self) -> &WorldConfig {
        self.generator.config()
    }

    /// Return the chunk at `(cx, cy)`, generating it first if needed.
    ///
    /// `incoming` is only consulted when the chunk does not exist yet.
    pub fn generate_chunk(
        &mut self,
        cx: i32,
        cy: i32,
        incoming: Option<&EdgeBoundaries>,
    ) -> &Chunk {
        let coord = ChunkCoord::new(cx, cy);
        let generator = &self.generator;
        self.chunks
            .entry(coord)
            .or_insert_with(|| generator.generate_chunk(coord, incoming))
    }

    /// Generate the neighbor across `edge` of chunk `(cx, cy)`, seeding its
    /// rivers from the source's crossings on that edge.
    ///
    /// Returns the existing neighbor unchanged if it was already generated.
    pub fn expand_chunk(&mut self, cx: i32, cy: i32, edge: Edge) -> WorldResult<&Chunk> {
        let source = ChunkCoord::new(cx, cy);
        let crossings = self
            .chunks
            .get(&source)
            .ok_or(WorldError::UnknownSourceChunk { coord: source })?
            .edge_boundaries
            .get(edge)
            .to_vec();
        let target = source
            .neighbor(edge)
            .ok_or(WorldError::ChunkOutOfRange {
                coord: source,
                edge,
            })?;
        debug!(
            source = %source,
            target = %target,
            %edge,
            crossings = crossings.len(),
            "expanding chunk"
        );
        let incoming = EdgeBoundaries::on_edge(edge.opposite(), crossings);
        Ok(self.generate_chunk(target.x, target.y, Some(&incoming)))
    }

    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Every generated chunk. Order is deterministic but carries no meaning.
    pub fn get_all_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Terrain at a world-space tile, or `None` if its chunk was never
    /// generated.
    pub fn tile_at(&self, tile: TileCoord) -> Option<TileType> {
        let (coord, lx, ly) = tile.to_chunk_local(self.config().chunk_size);
        self.chunks
            .get(&coord)
            .map(|chunk| chunk.tiles.get(lx as i32, ly as i32))
    }

    /// Whether a unit can stand on `tile`: generated grass.
    pub fn is_walkable(&self, tile: TileCoord) -> bool {
        self.tile_at(tile) == Some(TileType::Grass)
    }

    /// Shortest land path from `start` to `goal`, searching no deeper than
    /// the configured `pathfinding.max_distance`.
    ///
    /// `is_blocked` lets the caller rule out extra tiles (occupied by
    /// entities, say) on top of water and ungenerated chunks.
    pub fn find_path<F>(
        &self,
        start: TileCoord,
        goal: TileCoord,
        is_blocked: F,
    ) -> Option<Vec<TileCoord>>
    where
        F: Fn(TileCoord) -> bool,
    {
        pathfinding::find_path_bounded(
            start,
            goal,
            |tile| self.is_walkable(tile) && !is_blocked(tile),
            self.config().pathfinding.max_distance,
        )
    }

    /// Tile-space rectangle spanning all generated chunks, or `None` for an
    /// empty world.
    pub fn get_world_bounds(&self) -> Option<WorldBounds> {
        let size = i64::from(self.config().chunk_size);
        let mut coords = self.chunks.keys();
        let first = coords.next()?;
        let (mut min_cx, mut min_cy, mut max_cx, mut max_cy) = (first.x, first.y, first.x, first.y);
        for c in coords {
            min_cx = min_cx.min(c.x);
            min_cy = min_cy.min(c.y);
            max_cx = max_cx.max(c.x);
            max_cy = max_cy.max(c.y);
        }
        Some(WorldBounds {
            min_x: i64::from(min_cx).saturating_mul(size),
            min_y: i64::from(min_cy).saturating_mul(size),
            max_x: (i64::from(max_cx) + 1).saturating_mul(size),
            max_y: (i64::from(max_cy) + 1).saturating_mul(size),
        })
    }

    /// Snapshot the world for persistence.
    pub fn serialize(&self) -> SaveData {
        let chunks: Vec<SavedChunk> = self
            .chunks
            .values()
            .map(|chunk| SavedChunk {
                x: chunk.coord.x,
                y: chunk.coord.y,
                tiles: self.generator.compress_tiles(&chunk.tiles),
                edge_boundaries: chunk.edge_boundaries.clone(),
            })
            .collect();
        info!(seed = self.seed(), chunks = chunks.len(), "serialized world");
        SaveData {
            seed: self.seed(),
            chunks,
        }
    }

    /// Restore a world from a snapshot. Tiles are decoded verbatim; nothing
    /// is regenerated.
    pub fn deserialize(save: &SaveData, config: WorldConfig) -> WorldResult<Self> {
        let mut manager = Self::new(save.seed, config);
        for saved in &save.chunks {
            let coord = ChunkCoord::new(saved.x, saved.y);
            let tiles = manager
                .generator
                .decompress_tiles(&saved.tiles)
                .map_err(|source| WorldError::CorruptSaveData { coord, source })?;
            match manager.chunks.entry(coord) {
                Entry::Occupied(_) => return Err(WorldError::DuplicateChunk { coord }),
                Entry::Vacant(slot) => {
                    slot.insert(Chunk {
                        coord,
                        tiles,
                        edge_boundaries: saved.edge_boundaries.clone(),
                    });
                }
            }
        }
        info!(
            seed = save.seed,
            chunks = manager.chunk_count(),
            "loaded world"
        );
        Ok(manager)
    }

    /// Serialize the world to a JSON string.
    pub fn to_json(&self) -> WorldResult<String> {
        Ok(serde_json::to_string(&self.serialize())?)
    }

    /// Load a world from a JSON string produced by `to_json`.
    pub fn from_json(json: &str, config: WorldConfig) -> WorldResult<Self> {
        let save: SaveData = serde_json::from_str(json)?;
        Self::deserialize(&save, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::compress_tiles;
    use crate::error::CodecError;
    use crate::tiles::TileGrid;
    use crate::types::BoundaryCrossing;

    fn test_config() -> WorldConfig {
        WorldConfig {
            chunk_size: 16,
            ..WorldConfig::default()
        }
    }

    /// First seed whose origin chunk has a crossing on `edge`.
    fn manager_with_crossing_on(edge: Edge) -> ChunkManager {
        for seed in 0..500 {
            let mut manager = ChunkManager::new(seed, test_config());
            if !manager.generate_chunk(0, 0, None).edge_boundaries.get(edge).is_empty() {
                return manager;
            }
        }
        panic!("no seed in 0..500 produced a crossing on {edge}");
    }

    #[test]
    fn generate_chunk_is_idempotent() {
        let mut manager = ChunkManager::new(42, test_config());
        let first = manager.generate_chunk(0, 0, None).clone();
        let incoming = EdgeBoundaries::on_edge(
            Edge::West,
            vec![BoundaryCrossing {
                position: 1,
                width: 5,
                direction: None,
            }],
        );
        // Different inbound data is ignored once the chunk exists.
        let second = manager.generate_chunk(0, 0, Some(&incoming)).clone();
        assert_eq!(first, second);
        assert_eq!(manager.chunk_count(), 1);
    }

    #[test]
    fn same_seed_same_world() {
        let mut a = ChunkManager::new(42, test_config());
        let mut b = ChunkManager::new(42, test_config());
        assert_eq!(a.generate_chunk(2, -3, None), b.generate_chunk(2, -3, None));
    }

    #[test]
    fn expand_unknown_source_is_an_error() {
        let mut manager = ChunkManager::new(42, test_config());
        let err = manager.expand_chunk(4, 4, Edge::East).unwrap_err();
        assert!(matches!(
            err,
            WorldError::UnknownSourceChunk { coord } if coord == ChunkCoord::new(4, 4)
        ));
        assert_eq!(manager.chunk_count(), 0);
    }

    #[test]
    fn expand_north_passes_north_crossings_as_south_inbound() {
        let mut manager = manager_with_crossing_on(Edge::North);
        let north = manager.get_chunk(ChunkCoord::new(0, 0)).unwrap().edge_boundaries.north.clone();
        let expanded = manager.expand_chunk(0, 0, Edge::North).unwrap().clone();
        assert_eq!(expanded.coord, ChunkCoord::new(0, -1));

        let expected = manager.generator.generate_chunk(
            ChunkCoord::new(0, -1),
            Some(&EdgeBoundaries::on_edge(Edge::South, north.clone())),
        );
        assert_eq!(expanded, expected);
        for crossing in &north {
            assert_eq!(
                expanded.tiles.get(crossing.position, 15),
                TileType::Water,
                "seam tile at x = {}",
                crossing.position
            );
        }
    }

    #[test]
    fn expand_existing_neighbor_returns_it_unchanged() {
        let mut manager = ChunkManager::new(42, test_config());
        manager.generate_chunk(0, 0, None);
        let neighbor = manager.generate_chunk(1, 0, None).clone();
        let expanded = manager.expand_chunk(0, 0, Edge::East).unwrap().clone();
        assert_eq!(neighbor, expanded);
        assert_eq!(manager.chunk_count(), 2);
    }

    #[test]
    fn world_bounds_cover_all_chunks() {
        let mut manager = ChunkManager::new(1, test_config());
        assert_eq!(manager.get_world_bounds(), None);
        manager.generate_chunk(0, 0, None);
        manager.generate_chunk(-2, 1, None);
        let bounds = manager.get_world_bounds().unwrap();
        assert_eq!(
            bounds,
            WorldBounds {
                min_x: -32,
                min_y: 0,
                max_x: 16,
                max_y: 32,
            }
        );
        assert_eq!(bounds.width(), 48);
        assert_eq!(bounds.height(), 32);
        assert!(bounds.contains(TileCoord::new(-32, 31)));
        assert!(!bounds.contains(TileCoord::new(16, 0)));
    }

    #[test]
    fn world_bounds_of_distant_chunks() {
        let mut manager = ChunkManager::new(1, WorldConfig::default());
        manager.generate_chunk(100_000_000, 0, None);
        let bounds = manager.get_world_bounds().unwrap();
        assert_eq!(bounds.min_x, 3_200_000_000);
        assert_eq!(bounds.max_x, 3_200_000_032);
        assert_eq!(bounds.width(), 32);

        manager.generate_chunk(i32::MIN, i32::MAX, None);
        let bounds = manager.get_world_bounds().unwrap();
        assert_eq!(bounds.min_x, i64::from(i32::MIN) * 32);
        assert_eq!(bounds.max_y, (i64::from(i32::MAX) + 1) * 32);
        assert!(!bounds.contains(TileCoord::new(i32::MAX, i32::MIN)));
    }

    #[test]
    fn expanding_off_the_lattice_is_an_error() {
        let mut manager = ChunkManager::new(42, test_config());
        manager.generate_chunk(i32::MAX, 0, None);
        let err = manager.expand_chunk(i32::MAX, 0, Edge::East).unwrap_err();
        assert!(matches!(
            err,
            WorldError::ChunkOutOfRange { coord, edge: Edge::East }
                if coord == ChunkCoord::new(i32::MAX, 0)
        ));
        assert_eq!(manager.chunk_count(), 1);
        // The other direction is still open.
        let west = manager.expand_chunk(i32::MAX, 0, Edge::West).unwrap();
        assert_eq!(west.coord, ChunkCoord::new(i32::MAX - 1, 0));
    }

    /// One 16x16 chunk at the origin: grass with a water wall at x = 3 that
    /// leaves a gap on the bottom row.
    fn walled_world(max_distance: u32) -> ChunkManager {
        let mut grid = TileGrid::new(16);
        for y in 0..15 {
            grid.set(3, y, TileType::Water);
        }
        let save = SaveData {
            seed: 0,
            chunks: vec![SavedChunk {
                x: 0,
                y: 0,
                tiles: compress_tiles(&grid),
                edge_boundaries: EdgeBoundaries::default(),
            }],
        };
        let mut config = test_config();
        config.pathfinding.max_distance = max_distance;
        ChunkManager::deserialize(&save, config).unwrap()
    }

    #[test]
    fn find_path_walks_around_water() {
        let manager = walled_world(100);
        assert!(!manager.is_walkable(TileCoord::new(3, 0)));
        assert!(!manager.is_walkable(TileCoord::new(-1, 0)));
        let path = manager
            .find_path(TileCoord::new(0, 0), TileCoord::new(6, 0), |_| false)
            .unwrap();
        // Down to the gap on row 15 and back up: 15 + 6 + 15 steps.
        assert_eq!(path.len(), 37);
        assert!(path.iter().all(|&t| manager.is_walkable(t)));
    }

    #[test]
    fn find_path_honors_configured_depth() {
        let start = TileCoord::new(0, 0);
        let goal = TileCoord::new(6, 0);
        assert_eq!(walled_world(35).find_path(start, goal, |_| false), None);
        assert!(walled_world(36).find_path(start, goal, |_| false).is_some());
    }

    #[test]
    fn find_path_respects_extra_blockers() {
        let manager = walled_world(100);
        let gap = TileCoord::new(3, 15);
        let path = manager.find_path(TileCoord::new(0, 0), TileCoord::new(6, 0), |t| t == gap);
        assert_eq!(path, None);
    }

    #[test]
    fn tile_at_maps_world_to_chunk_space() {
        let mut manager = ChunkManager::new(9, test_config());
        let chunk = manager.generate_chunk(-1, 0, None).clone();
        for ly in 0..16 {
            for lx in 0..16 {
                let world = TileCoord::new(-16 + lx, ly);
                assert_eq!(manager.tile_at(world), Some(chunk.tiles.get(lx, ly)));
            }
        }
        assert_eq!(manager.tile_at(TileCoord::new(0, 0)), None);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let mut manager = ChunkManager::new(77, test_config());
        manager.generate_chunk(0, 0, None);
        for edge in Edge::ALL {
            manager.expand_chunk(0, 0, edge).unwrap();
        }
        let json = manager.to_json().unwrap();
        let restored = ChunkManager::from_json(&json, test_config()).unwrap();
        assert_eq!(restored.seed(), 77);
        assert_eq!(restored.chunk_count(), 5);
        for chunk in manager.get_all_chunks() {
            assert_eq!(restored.get_chunk(chunk.coord), Some(chunk));
        }
    }

    #[test]
    fn persisted_layout_field_names() {
        let mut manager = ChunkManager::new(3, test_config());
        manager.generate_chunk(0, 0, None);
        let value = serde_json::to_value(manager.serialize()).unwrap();
        assert_eq!(value["seed"], 3);
        let chunk = &value["chunks"][0];
        assert_eq!(chunk["x"], 0);
        assert_eq!(chunk["y"], 0);
        assert!(chunk["tiles"].is_string());
        for edge in ["north", "south", "east", "west"] {
            assert!(chunk["edgeBoundaries"][edge].is_array(), "{edge}");
        }
    }

    #[test]
    fn corrupt_tiles_are_reported_with_their_chunk() {
        let save = SaveData {
            seed: 1,
            chunks: vec![SavedChunk {
                x: 2,
                y: -1,
                tiles: "g10".into(),
                edge_boundaries: EdgeBoundaries::default(),
            }],
        };
        let err = ChunkManager::deserialize(&save, test_config()).unwrap_err();
        match err {
            WorldError::CorruptSaveData { coord, source } => {
                assert_eq!(coord, ChunkCoord::new(2, -1));
                assert_eq!(
                    source,
                    CodecError::TileCountMismatch {
                        expected: 256,
                        actual: 10
                    }
                );
            }
            other => panic!("expected CorruptSaveData, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_chunks_are_rejected() {
        let saved = SavedChunk {
            x: 0,
            y: 0,
            tiles: "g256".into(),
            edge_boundaries: EdgeBoundaries::default(),
        };
        let save = SaveData {
            seed: 1,
            chunks: vec![saved.clone(), saved],
        };
        assert!(matches!(
            ChunkManager::deserialize(&save, test_config()),
            Err(WorldError::DuplicateChunk { .. })
        ));
    }

    #[test]
    fn loaded_chunks_are_not_regenerated() {
        // A hand-written all-water chunk survives loading verbatim even
        // though the generator would never produce it.
        let save = SaveData {
            seed: 42,
            chunks: vec![SavedChunk {
                x: 0,
                y: 0,
                tiles: "w256".into(),
                edge_boundaries: EdgeBoundaries::default(),
            }],
        };
        let mut manager = ChunkManager::deserialize(&save, test_config()).unwrap();
        let chunk = manager.generate_chunk(0, 0, None);
        assert_eq!(chunk.tiles.count(TileType::Water), 256);
    }
}
