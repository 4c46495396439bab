// Procedural river carving for one chunk.
//
// Every chunk starts as solid grass. River "cursors" walk across it,
// stamping a square of water at each step, and either leave through an edge
// (which records an outbound `BoundaryCrossing`) or keep going for another
// segment, possibly forking a perpendicular tributary or turning 45°.
//
// Cursors come from one of two places:
// - Inbound crossings supplied by the chunk manager when a neighbor is
//   expanded. Each crossing becomes a cursor on the matching edge with the
//   width and direction the river had when it left the neighbor, which is
//   what keeps rivers continuous across chunk seams.
// - Otherwise (the origin chunk) a few sources on random edges, flowing
//   inward.
//
// Cursors are processed from a FIFO work-list. The loop stops when the list
// empties or after `chunk_size * 10` iterations, whichever comes first, so
// generation time is bounded no matter how often cursors fork.
//
// See also: `chunk_manager.rs` which owns generated chunks and builds the
// inbound crossings, `codec.rs` for the tile string format exposed through
// `WorldGenerator`, `config.rs` for `RiverParams`.
//
// **Critical constraint: determinism.** All randomness comes from a
// `WorldRng` seeded with `chunk_seed(base_seed, coord)`. The order of draws
// in this file is part of the save format: changing it changes every world.

use crate::codec;
use crate::config::WorldConfig;
use crate::error::CodecError;
use crate::prng::WorldRng;
use crate::tiles::TileGrid;
use crate::types::{BoundaryCrossing, ChunkCoord, Edge, EdgeBoundaries, FlowDir, TileType};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Per-axis multipliers in the chunk seed formula.
const SEED_X_FACTOR: i32 = 31;
const SEED_Y_FACTOR: i32 = 37;

/// Origin-chunk sources are placed at least this far from the corners.
const SOURCE_EDGE_MARGIN: i32 = 5;

/// Iteration cap per tile of chunk side length.
const ITERATIONS_PER_TILE: usize = 10;

/// Cursors fork only after completing this many segments.
const MIN_SEGMENTS_BEFORE_BRANCH: u32 = 2;

/// Deterministic seed for one chunk.
///
/// Linear in the coordinate, so chunks along some lattice directions get
/// correlated seeds. Kept as-is: changing it would regenerate every world.
pub fn chunk_seed(base_seed: i32, coord: ChunkCoord) -> i32 {
    base_seed
        .wrapping_add(coord.x.wrapping_mul(SEED_X_FACTOR))
        .wrapping_add(coord.y.wrapping_mul(SEED_Y_FACTOR))
}

/// One generated chunk. The tile grid never changes after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub tiles: TileGrid,
    /// Crossings where this chunk's rivers leave through each edge.
    pub edge_boundaries: EdgeBoundaries,
}

/// A growing river strand. Generation-time only, never persisted.
#[derive(Clone, Debug)]
struct Cursor {
    x: f64,
    y: f64,
    width: u32,
    direction: FlowDir,
    segments: u32,
}

impl Cursor {
    fn at_edge(edge: Edge, position: i32, size: u32, width: u32, direction: FlowDir) -> Self {
        let (x, y) = edge.tile_at(position, size);
        Self {
            x: f64::from(x),
            y: f64::from(y),
            width,
            direction,
            segments: 0,
        }
    }

    fn tile(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// Bookkeeping from one carving run, used for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CarveStats {
    seeded: usize,
    iterations: usize,
    abandoned: usize,
}

/// Generates chunks for one world seed, and encodes/decodes their tiles.
#[derive(Clone, Debug)]
pub struct WorldGenerator {
    seed: i32,
    config: WorldConfig,
}

impl WorldGenerator {
    pub fn new(seed: i32, config: WorldConfig) -> Self {
        Self { seed, config }
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Synthesize the chunk at `coord`.
    ///
    /// With `incoming` set, rivers are seeded only from its crossings (an
    /// empty set yields a river-free chunk). With `None`, sources are rolled
    /// from the config. Never fails.
    pub fn generate_chunk(&self, coord: ChunkCoord, incoming: Option<&EdgeBoundaries>) -> Chunk {
        self.carve(coord, incoming).0
    }

    /// Encode a tile grid for persistence.
    pub fn compress_tiles(&self, tiles: &TileGrid) -> String {
        codec::compress_tiles(tiles)
    }

    /// Decode a persisted tile string at this world's chunk size.
    pub fn decompress_tiles(&self, encoded: &str) -> Result<TileGrid, CodecError> {
        codec::decompress_tiles(encoded, self.config.chunk_size)
    }

    fn carve(&self, coord: ChunkCoord, incoming: Option<&EdgeBoundaries>) -> (Chunk, CarveStats) {
        let size = self.config.chunk_size;
        let seed = chunk_seed(self.seed, coord);
        let mut rng = WorldRng::new(seed);
        let mut tiles = TileGrid::new(size);
        let mut outbound = EdgeBoundaries::default();
        let mut stats = CarveStats::default();

        if size == 0 {
            let chunk = Chunk {
                coord,
                tiles,
                edge_boundaries: outbound,
            };
            return (chunk, stats);
        }

        let mut queue: VecDeque<Cursor> = match incoming {
            Some(boundaries) => inbound_cursors(boundaries, size),
            None => self.source_cursors(&mut rng),
        };
        stats.seeded = queue.len();

        let max_iterations = size as usize * ITERATIONS_PER_TILE;
        while stats.iterations < max_iterations {
            let Some(mut cursor) = queue.pop_front() else {
                break;
            };
            stats.iterations += 1;

            self.carve_segment(&mut cursor, &mut tiles, &mut rng);
            cursor.segments += 1;

            if record_exits(&cursor, size, &mut outbound) {
                continue;
            }

            if cursor.segments >= MIN_SEGMENTS_BEFORE_BRANCH {
                if let Some(fork) = self.roll_fork(&cursor, &mut rng) {
                    queue.push_back(fork);
                }
                self.roll_turn(&mut cursor, &mut rng);
            }
            queue.push_back(cursor);
        }

        stats.abandoned = queue.len();
        if stats.abandoned > 0 {
            debug!(
                chunk = %coord,
                abandoned = stats.abandoned,
                "iteration cap reached, dropping unfinished rivers"
            );
        }
        debug!(
            chunk = %coord,
            seed,
            sources = stats.seeded,
            iterations = stats.iterations,
            water = tiles.count(TileType::Water),
            outbound = outbound.total(),
            "generated chunk"
        );

        let chunk = Chunk {
            coord,
            tiles,
            edge_boundaries: outbound,
        };
        (chunk, stats)
    }

    /// Sources for a chunk with no inbound crossings.
    fn source_cursors(&self, rng: &mut WorldRng) -> VecDeque<Cursor> {
        let rivers = &self.config.rivers;
        let size = self.config.chunk_size;
        let last = size as i32 - 1;
        let low = SOURCE_EDGE_MARGIN.min(last);
        let high = (size as i32 - SOURCE_EDGE_MARGIN).max(low);

        let count = rng.next_int(rivers.min_sources as i32, rivers.max_sources as i32);
        (0..count)
            .map(|_| {
                let edge = rng.choice(&Edge::ALL).copied().unwrap_or(Edge::West);
                let position = rng.next_int(low, high);
                let width = self.roll_width(rng);
                Cursor::at_edge(edge, position, size, width, edge.inward_normal())
            })
            .collect()
    }

    /// Advance `segment_length` steps, stamping water before each move.
    /// Stops early once the cursor leaves the grid.
    fn carve_segment(&self, cursor: &mut Cursor, tiles: &mut TileGrid, rng: &mut WorldRng) {
        let meander = self.config.rivers.meander;
        let radius = (cursor.width / 2) as i32;
        for _ in 0..self.config.rivers.segment_length {
            let (tx, ty) = cursor.tile();
            tiles.fill_square(tx, ty, radius, TileType::Water);

            cursor.x += f64::from(cursor.direction.dx) + rng.next_float(-meander, meander);
            cursor.y += f64::from(cursor.direction.dy) + rng.next_float(-meander, meander);

            let (tx, ty) = cursor.tile();
            if !tiles.in_bounds(tx, ty) {
                break;
            }
        }
    }

    fn roll_fork(&self, parent: &Cursor, rng: &mut WorldRng) -> Option<Cursor> {
        if !rng.next_bool(self.config.rivers.fork_probability) {
            return None;
        }
        let width = self.roll_width(rng);
        let angle = if rng.next_bool(0.5) { 90.0 } else { -90.0 };
        let Some(direction) = parent.direction.rotated(angle) else {
            trace!(direction = %parent.direction, angle, "fork direction degenerated");
            return None;
        };
        Some(Cursor {
            x: parent.x,
            y: parent.y,
            width,
            direction,
            segments: 0,
        })
    }

    fn roll_turn(&self, cursor: &mut Cursor, rng: &mut WorldRng) {
        if !rng.next_bool(self.config.rivers.turn_probability) {
            return;
        }
        let angle = if rng.next_bool(0.5) { 45.0 } else { -45.0 };
        match cursor.direction.rotated(angle) {
            Some(direction) => cursor.direction = direction,
            None => trace!(direction = %cursor.direction, angle, "turn direction degenerated"),
        }
    }

    fn roll_width(&self, rng: &mut WorldRng) -> u32 {
        let rivers = &self.config.rivers;
        rng.next_int(rivers.min_width as i32, rivers.max_width as i32)
            .max(0) as u32
    }
}

/// One cursor per inbound crossing, edges in `Edge::ALL` order.
fn inbound_cursors(boundaries: &EdgeBoundaries, size: u32) -> VecDeque<Cursor> {
    Edge::ALL
        .iter()
        .flat_map(|&edge| {
            boundaries.get(edge).iter().map(move |crossing| {
                let direction = crossing.direction.unwrap_or_else(|| edge.inward_normal());
                Cursor::at_edge(edge, crossing.position, size, crossing.width, direction)
            })
        })
        .collect()
}

/// If the cursor has left the grid, record a crossing on every edge it
/// passed (two at a corner) and return `true`.
fn record_exits(cursor: &Cursor, size: u32, outbound: &mut EdgeBoundaries) -> bool {
    let (tx, ty) = cursor.tile();
    let last = size as i32 - 1;
    let crossing = |position: i32| BoundaryCrossing {
        position: position.clamp(0, last),
        width: cursor.width,
        direction: Some(cursor.direction),
    };

    let x_edge = if tx < 0 {
        Some(Edge::West)
    } else if tx > last {
        Some(Edge::East)
    } else {
        None
    };
    let y_edge = if ty < 0 {
        Some(Edge::North)
    } else if ty > last {
        Some(Edge::South)
    } else {
        None
    };

    if let Some(edge) = x_edge {
        outbound.get_mut(edge).push(crossing(ty));
    }
    if let Some(edge) = y_edge {
        outbound.get_mut(edge).push(crossing(tx));
    }
    x_edge.is_some() || y_edge.is_some()
}
