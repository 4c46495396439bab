// Tidewalk world generator: CLI entry point.
//
// Generates the origin chunk for a seed, then follows its rivers outward:
// each ring expands every edge of the previous ring that carries a river
// crossing. Prints an ASCII map and a summary, and optionally writes the
// world as a JSON save.
//
// Usage:
//   cargo run -p tidewalk_sim --bin worldgen -- [save.json] [--seed N]
//     [--radius N] [--config path]
//
// Map legend: `.` grass, `~` water, blank for chunks never generated.
// Set RUST_LOG=debug to see per-chunk generation events.

use std::path::Path;
use std::process::exit;
use tidewalk_sim::chunk_manager::ChunkManager;
use tidewalk_sim::config::WorldConfig;
use tidewalk_sim::error::WorldResult;
use tidewalk_sim::types::{ChunkCoord, Edge, TileCoord, TileType};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let save_path = args
        .get(1)
        .filter(|s| !s.starts_with("--"))
        .map(|s| s.as_str());
    let seed: i32 = parse_flag(&args, "--seed").unwrap_or(42);
    let radius: u32 = parse_flag(&args, "--radius").unwrap_or(1);
    let config_path: Option<String> = parse_flag(&args, "--config");

    if let Err(e) = run(seed, radius, config_path.as_deref(), save_path) {
        eprintln!("worldgen: {e}");
        exit(1);
    }
}

fn run(
    seed: i32,
    radius: u32,
    config_path: Option<&str>,
    save_path: Option<&str>,
) -> WorldResult<()> {
    let config = match config_path {
        Some(path) => WorldConfig::load(Path::new(path))?,
        None => WorldConfig::default(),
    };

    println!("=== Tidewalk World Generator ===");
    println!("Seed: {seed}");
    println!("Chunk size: {}", config.chunk_size);
    println!("Radius: {radius}");
    println!();

    let mut manager = ChunkManager::new(seed, config);
    manager.generate_chunk(0, 0, None);
    follow_rivers(&mut manager, radius)?;

    print_map(&manager);
    println!();
    print_summary(&manager);

    if let Some(path) = save_path {
        std::fs::write(path, manager.to_json()?)?;
        println!("Wrote {path}");
    }
    Ok(())
}

/// Expand ring by ring from the origin, only through edges that a river
/// actually crosses.
fn follow_rivers(manager: &mut ChunkManager, radius: u32) -> WorldResult<()> {
    let mut frontier = vec![ChunkCoord::new(0, 0)];
    for _ in 0..radius {
        let mut next = Vec::new();
        for coord in frontier {
            for edge in Edge::ALL {
                let Some(target) = coord.neighbor(edge) else {
                    continue;
                };
                let crosses = manager
                    .get_chunk(coord)
                    .is_some_and(|c| !c.edge_boundaries.get(edge).is_empty());
                if crosses && !manager.contains(target) {
                    manager.expand_chunk(coord.x, coord.y, edge)?;
                    next.push(target);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }
    Ok(())
}

fn print_map(manager: &ChunkManager) {
    let Some(bounds) = manager.get_world_bounds() else {
        return;
    };
    let (Ok(min_x), Ok(max_x), Ok(min_y), Ok(max_y)) = (
        i32::try_from(bounds.min_x),
        i32::try_from(bounds.max_x),
        i32::try_from(bounds.min_y),
        i32::try_from(bounds.max_y),
    ) else {
        println!("(world extends past the tile coordinate range, map skipped)");
        return;
    };
    for y in min_y..max_y {
        let row: String = (min_x..max_x)
            .map(|x| match manager.tile_at(TileCoord::new(x, y)) {
                Some(TileType::Grass) => '.',
                Some(TileType::Water) => '~',
                None => ' ',
            })
            .collect();
        println!("{}", row.trim_end());
    }
}

fn print_summary(manager: &ChunkManager) {
    let water: usize = manager
        .get_all_chunks()
        .map(|c| c.tiles.count(TileType::Water))
        .sum();
    let crossings: usize = manager
        .get_all_chunks()
        .map(|c| c.edge_boundaries.total())
        .sum();
    let size = manager.config().chunk_size as usize;
    let total = manager.chunk_count() * size * size;

    println!("Chunks: {}", manager.chunk_count());
    if total > 0 {
        println!(
            "Water: {} / {} tiles ({:.1}%)",
            water,
            total,
            100.0 * water as f64 / total as f64
        );
    }
    println!("Edge crossings: {crossings}");
    if let Some(b) = manager.get_world_bounds() {
        println!(
            "Bounds: x {}..{}, y {}..{} ({}x{} tiles)",
            b.min_x,
            b.max_x,
            b.min_y,
            b.max_y,
            b.width(),
            b.height()
        );
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
