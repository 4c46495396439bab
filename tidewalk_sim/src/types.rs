// Core types shared across the world generator, chunk manager, and
// pathfinding.
//
// Defines world-space tile coordinates (`TileCoord`), chunk addresses
// (`ChunkCoord`), chunk edges, flow direction vectors, the closed tile-type
// registry, and the boundary-crossing records that stitch rivers across
// chunk seams. All persisted types derive `Serialize` and `Deserialize`.
//
// Coordinate system: x grows east, y grows south. The north edge of a chunk
// is its row `y = 0`; expanding north moves to chunk `(cx, cy - 1)`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position in world tile space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance between two coordinates, saturating at `u32::MAX`.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }

    /// The orthogonal neighbors, in the order left, right, up, down.
    ///
    /// Neighbors that would fall outside the `i32` range are skipped, so a
    /// tile on the edge of tile space has fewer than four.
    pub fn neighbors(self) -> impl Iterator<Item = TileCoord> {
        let Self { x, y } = self;
        [
            x.checked_sub(1).map(|x| TileCoord::new(x, y)),
            x.checked_add(1).map(|x| TileCoord::new(x, y)),
            y.checked_sub(1).map(|y| TileCoord::new(x, y)),
            y.checked_add(1).map(|y| TileCoord::new(x, y)),
        ]
        .into_iter()
        .flatten()
    }

    /// The chunk containing this tile and the tile's offset inside it.
    ///
    /// Uses Euclidean division so negative coordinates land in negative
    /// chunks with a non-negative local offset.
    pub fn to_chunk_local(self, chunk_size: u32) -> (ChunkCoord, u32, u32) {
        let size = chunk_size as i32;
        let chunk = ChunkCoord::new(self.x.div_euclid(size), self.y.div_euclid(size));
        (
            chunk,
            self.x.rem_euclid(size) as u32,
            self.y.rem_euclid(size) as u32,
        )
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Address of one chunk in the unbounded chunk lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The chunk across `edge`, or `None` past the end of the `i32` lattice.
    pub fn neighbor(self, edge: Edge) -> Option<Self> {
        let (dx, dy) = edge.neighbor_offset();
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// World-space coordinate of this chunk's top-left tile, or `None` if
    /// the chunk lies beyond the range of tile coordinates.
    pub fn origin_tile(self, chunk_size: u32) -> Option<TileCoord> {
        let size = i32::try_from(chunk_size).ok()?;
        Some(TileCoord::new(
            self.x.checked_mul(size)?,
            self.y.checked_mul(size)?,
        ))
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Edges and flow directions
// ---------------------------------------------------------------------------

/// One of the four sides of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    North,
    South,
    East,
    West,
}

impl Edge {
    /// All edges, in the order inbound crossings are consumed.
    pub const ALL: [Edge; 4] = [Edge::North, Edge::South, Edge::East, Edge::West];

    pub fn opposite(self) -> Edge {
        match self {
            Edge::North => Edge::South,
            Edge::South => Edge::North,
            Edge::East => Edge::West,
            Edge::West => Edge::East,
        }
    }

    /// Chunk-lattice step to the neighbor across this edge.
    pub fn neighbor_offset(self) -> (i32, i32) {
        match self {
            Edge::North => (0, -1),
            Edge::South => (0, 1),
            Edge::East => (1, 0),
            Edge::West => (-1, 0),
        }
    }

    /// Direction pointing from this edge into the chunk.
    pub fn inward_normal(self) -> FlowDir {
        match self {
            Edge::North => FlowDir::new(0, 1),
            Edge::South => FlowDir::new(0, -1),
            Edge::East => FlowDir::new(-1, 0),
            Edge::West => FlowDir::new(1, 0),
        }
    }

    /// Local tile at `position` along this edge of a `size`-wide chunk.
    pub fn tile_at(self, position: i32, size: u32) -> (i32, i32) {
        let last = size as i32 - 1;
        match self {
            Edge::North => (position, 0),
            Edge::South => (position, last),
            Edge::East => (last, position),
            Edge::West => (0, position),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Edge::North => "north",
            Edge::South => "south",
            Edge::East => "east",
            Edge::West => "west",
        };
        f.write_str(name)
    }
}

/// Integer direction vector a river cursor moves along each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDir {
    pub dx: i32,
    pub dy: i32,
}

impl FlowDir {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Rotate by `degrees` and round each component to the nearest integer.
    ///
    /// Returns `None` when the rounded vector collapses to `(0, 0)`; callers
    /// skip the fork or turn in that case. The eight unit compass vectors
    /// stay within the compass set under ±45° and ±90°.
    pub fn rotated(self, degrees: f64) -> Option<FlowDir> {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let x = f64::from(self.dx);
        let y = f64::from(self.dy);
        let rotated = FlowDir::new(
            (x * cos - y * sin).round() as i32,
            (x * sin + y * cos).round() as i32,
        );
        (!rotated.is_zero()).then_some(rotated)
    }
}

impl fmt::Display for FlowDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}>", self.dx, self.dy)
    }
}

// ---------------------------------------------------------------------------
// Tile registry
// ---------------------------------------------------------------------------

/// Terrain kind of a single tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Grass,
    Water,
}

impl TileType {
    /// Single-character persistence code.
    pub fn code(self) -> char {
        match self {
            TileType::Grass => 'g',
            TileType::Water => 'w',
        }
    }

    /// Parse a persistence code. Returns `None` for unregistered codes.
    pub fn from_code(code: char) -> Option<TileType> {
        match code {
            'g' => Some(TileType::Grass),
            'w' => Some(TileType::Water),
            _ => None,
        }
    }

    pub fn is_water(self) -> bool {
        self == TileType::Water
    }
}

// ---------------------------------------------------------------------------
// Boundary crossings
// ---------------------------------------------------------------------------

/// Where, how wide, and which way a river leaves (or enters) a chunk edge.
///
/// `position` runs along the edge: the x coordinate for north/south edges,
/// the y coordinate for east/west edges. A missing `direction` means the
/// inward normal of whichever edge consumes the crossing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryCrossing {
    pub position: i32,
    pub width: u32,
    #[serde(default)]
    pub direction: Option<FlowDir>,
}

/// Crossings recorded on each of a chunk's four edges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeBoundaries {
    #[serde(default)]
    pub north: Vec<BoundaryCrossing>,
    #[serde(default)]
    pub south: Vec<BoundaryCrossing>,
    #[serde(default)]
    pub east: Vec<BoundaryCrossing>,
    #[serde(default)]
    pub west: Vec<BoundaryCrossing>,
}

impl EdgeBoundaries {
    /// Boundaries carrying `crossings` on `edge` and nothing elsewhere.
    pub fn on_edge(edge: Edge, crossings: Vec<BoundaryCrossing>) -> Self {
        let mut boundaries = Self::default();
        *boundaries.get_mut(edge) = crossings;
        boundaries
    }

    pub fn get(&self, edge: Edge) -> &[BoundaryCrossing] {
        match edge {
            Edge::North => &self.north,
            Edge::South => &self.south,
            Edge::East => &self.east,
            Edge::West => &self.west,
        }
    }

    pub fn get_mut(&mut self, edge: Edge) -> &mut Vec<BoundaryCrossing> {
        match edge {
            Edge::North => &mut self.north,
            Edge::South => &mut self.south,
            Edge::East => &mut self.east,
            Edge::West => &mut self.west,
        }
    }

    /// Total number of crossings across all edges.
    pub fn total(&self) -> usize {
        Edge::ALL.iter().map(|&e| self.get(e).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
