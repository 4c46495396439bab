// Run-length codec for chunk tile grids.
//
// A grid is written row-major as `<code><count>` tokens with no separators,
// e.g. `g12w3g49` for an 8x8 grid. Each code is one character from the tile
// registry (`TileType::code`); counts are decimal and sum to `size * size`.
// Adjacent equal tiles always merge into one run, even across row breaks.
//
// Decoding is strict: an unregistered code, a code without a count, or
// counts that do not sum to exactly `size * size` are reported as
// `CodecError` rather than producing a partial grid.
//
// See also: `chunk_manager.rs` which stores this string in saves,
// `river_gen.rs` whose `WorldGenerator` exposes the codec as methods.

use crate::error::CodecError;
use crate::tiles::TileGrid;
use crate::types::TileType;
use std::fmt::Write;

/// Encode a grid as a row-major RLE string.
pub fn compress_tiles(grid: &TileGrid) -> String {
    let mut out = String::new();
    let mut runs = grid.tiles().iter().copied();
    let Some(mut current) = runs.next() else {
        return out;
    };
    let mut count: usize = 1;
    for tile in runs {
        if tile == current {
            count += 1;
        } else {
            push_run(&mut out, current, count);
            current = tile;
            count = 1;
        }
    }
    push_run(&mut out, current, count);
    out
}

fn push_run(out: &mut String, tile: TileType, count: usize) {
    out.push(tile.code());
    // Writing to a String cannot fail.
    let _ = write!(out, "{count}");
}

/// Decode an RLE string into a `size` × `size` grid.
pub fn decompress_tiles(encoded: &str, size: u32) -> Result<TileGrid, CodecError> {
    let expected = (size as usize) * (size as usize);
    let mut tiles = Vec::with_capacity(expected);
    let bytes = encoded.as_bytes();
    let mut offset = 0;

    while offset < bytes.len() {
        let token_start = offset;
        let code = encoded[offset..]
            .chars()
            .next()
            .ok_or(CodecError::MalformedRun { offset })?;
        let tile = TileType::from_code(code).ok_or(CodecError::UnknownTileCode {
            code,
            offset: token_start,
        })?;
        offset += code.len_utf8();

        let digits_start = offset;
        while offset < bytes.len() && bytes[offset].is_ascii_digit() {
            offset += 1;
        }
        let count: usize = encoded[digits_start..offset]
            .parse()
            .map_err(|_| CodecError::MalformedRun {
                offset: token_start,
            })?;

        let actual = tiles.len().saturating_add(count);
        if actual > expected {
            return Err(CodecError::TileCountMismatch { expected, actual });
        }
        tiles.resize(actual, tile);
    }

    let actual = tiles.len();
    TileGrid::from_tiles(size, tiles).ok_or(CodecError::TileCountMismatch { expected, actual })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn striped_grid() -> TileGrid {
        let mut grid = TileGrid::new(4);
        for x in 0..4 {
            grid.set(x, 1, TileType::Water);
        }
        grid.set(3, 3, TileType::Water);
        grid
    }

    #[test]
    fn compress_known_grid() {
        // Row 0 grass, row 1 water, rows 2-3 grass except the last tile.
        assert_eq!(compress_tiles(&striped_grid()), "g4w4g7w1");
    }

    #[test]
    fn compress_uniform_grid_is_one_run() {
        assert_eq!(compress_tiles(&TileGrid::new(10)), "g100");
    }

    #[test]
    fn compress_empty_grid_is_empty() {
        assert_eq!(compress_tiles(&TileGrid::new(0)), "");
    }

    #[test]
    fn roundtrip_preserves_tiles() {
        let grid = striped_grid();
        let decoded = decompress_tiles(&compress_tiles(&grid), 4).unwrap();
        assert_eq!(decoded, grid);
    }

    #[test]
    fn multi_digit_counts() {
        let grid = decompress_tiles("w12g88", 10).unwrap();
        assert_eq!(grid.count(TileType::Water), 12);
        assert_eq!(grid.get(1, 1), TileType::Water);
        assert_eq!(grid.get(2, 1), TileType::Grass);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert_eq!(
            decompress_tiles("g4x4", 2),
            Err(CodecError::UnknownTileCode {
                code: 'x',
                offset: 2
            })
        );
    }

    #[test]
    fn missing_count_is_rejected() {
        assert_eq!(
            decompress_tiles("g2w", 2),
            Err(CodecError::MalformedRun { offset: 2 })
        );
        assert_eq!(
            decompress_tiles("4g", 2),
            Err(CodecError::UnknownTileCode {
                code: '4',
                offset: 0
            })
        );
    }

    #[test]
    fn short_counts_are_rejected() {
        assert_eq!(
            decompress_tiles("g3", 2),
            Err(CodecError::TileCountMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn long_counts_are_rejected_before_allocating() {
        assert_eq!(
            decompress_tiles("g4w999999999", 2),
            Err(CodecError::TileCountMismatch {
                expected: 4,
                actual: 1_000_000_003
            })
        );
    }

    #[test]
    fn huge_run_counts_cannot_wrap_the_total() {
        let encoded = format!("w2g{}g3", usize::MAX);
        assert_eq!(
            decompress_tiles(&encoded, 2),
            Err(CodecError::TileCountMismatch {
                expected: 4,
                actual: usize::MAX
            })
        );
        // A count too large for usize at all is not a number.
        assert_eq!(
            decompress_tiles("g99999999999999999999999", 2),
            Err(CodecError::MalformedRun { offset: 0 })
        );
    }

    #[test]
    fn non_ascii_code_is_rejected() {
        assert!(matches!(
            decompress_tiles("g2é2", 2),
            Err(CodecError::UnknownTileCode { code: 'é', .. })
        ));
    }
}
