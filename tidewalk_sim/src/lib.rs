// tidewalk_sim: pure Rust world library.
//
// This crate contains the terrain side of Tidewalk: chunked river
// generation, the chunk store and its save format, and grid pathfinding
// for anything that walks on the result. It has no rendering or UI
// dependencies and can be tested and run headless.
//
// Module overview:
// - `types.rs`:         TileCoord, ChunkCoord, Edge, FlowDir, TileType, boundary crossings.
// - `tiles.rs`:         Dense square tile grid for one chunk.
// - `river_gen.rs`:     WorldGenerator, stochastic river carving per chunk, chunk seeds.
// - `codec.rs`:         Run-length codec for tile grids.
// - `chunk_manager.rs`: ChunkManager, idempotent generation, seam expansion, save/load.
// - `pathfinding.rs`:   A* over a caller-supplied walkability predicate.
// - `config.rs`:        WorldConfig + RiverParams, all tunable generation constants.
// - `error.rs`:         WorldError / CodecError.
// - `prng`:             Re-exported from `tidewalk_prng`, the seeded LCG.
//
// The `worldgen` binary (`main.rs`) drives this library from the command
// line for inspecting seeds and producing saves.
//
// **Critical constraint: determinism.** A world is a pure function of
// `(seed, config, order of expansions)`. All randomness comes from the
// seeded LCG in `tidewalk_prng`. No `HashMap`, no system time, no OS
// entropy. Use `BTreeMap` for keyed collections.

pub mod chunk_manager;
pub mod codec;
pub mod config;
pub mod error;
pub mod pathfinding;
pub use tidewalk_prng as prng;
pub mod river_gen;
pub mod tiles;
pub mod types;
