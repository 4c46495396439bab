// Deterministic, portable pseudo-random number generator.
//
// Implements a 32-bit linear congruential generator with the Numerical
// Recipes constants (`state = state * 1664525 + 1013904223 mod 2^32`). Each
// draw is the new state divided by 2^32, giving an `f64` in [0, 1). The
// recurrence is integer-only and the division is exact, so the stream is
// identical on every platform.
//
// This crate is the single PRNG used across Tidewalk: `tidewalk_sim` seeds
// one `WorldRng` per chunk from the world seed and the chunk coordinate.
// Saves store only the world seed and the compressed tiles, never any RNG
// trace, so the sequence for a given seed must never change.
//
// **Critical constraint: determinism.** Every method on `WorldRng` must
// produce identical output given the same prior state, regardless of
// platform, compiler version, or optimization level. Do not add stdlib
// randomness, OS entropy, or floating-point math to the recurrence itself.

use serde::{Deserialize, Serialize};

/// LCG multiplier (Numerical Recipes).
const MULTIPLIER: u32 = 1_664_525;
/// LCG increment (Numerical Recipes).
const INCREMENT: u32 = 1_013_904_223;
/// 2^32 as a float, the divisor that maps a state into [0, 1).
const STATE_SPAN: f64 = 4_294_967_296.0;

/// Seeded LCG: the world generator's sole source of randomness.
///
/// Two generators built from the same seed produce the same draws forever.
/// `reset()` rewinds to the original seed without reallocating.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldRng {
    seed: i32,
    state: u32,
}

impl WorldRng {
    /// Create a new generator from a 32-bit seed.
    ///
    /// Negative seeds are reinterpreted as their two's-complement `u32`.
    pub fn new(seed: i32) -> Self {
        Self {
            seed,
            state: seed as u32,
        }
    }

    /// The seed this generator was constructed with.
    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// Rewind to the original seed.
    pub fn reset(&mut self) {
        self.state = self.seed as u32;
    }

    /// Advance the recurrence and return the raw 32-bit state.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT);
        self.state
    }

    /// Generate a uniform `f64` in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / STATE_SPAN
    }

    /// Generate a uniform integer in `[min, max]` (inclusive on both ends).
    ///
    /// Computed as `floor(draw * (max - min + 1)) + min` in 64-bit space so
    /// the full `i32` range cannot overflow. A reversed range (`min > max`)
    /// still consumes one draw and returns `min`.
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        let draw = self.next_f64();
        if max < min {
            return min;
        }
        let span = i64::from(max) - i64::from(min) + 1;
        let offset = (draw * span as f64).floor() as i64;
        // draw < 1.0 keeps offset < span, so the sum always fits in i32.
        (i64::from(min) + offset) as i32
    }

    /// Generate a uniform `f64` in `[min, max)`.
    pub fn next_float(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Return `true` with probability `p`.
    ///
    /// `p <= 0.0` always returns false, `p >= 1.0` always returns true.
    pub fn next_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick a uniformly random element of `items`.
    ///
    /// Returns `None` for an empty slice without consuming a draw.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = (self.next_f64() * items.len() as f64).floor() as usize;
        items.get(index.min(items.len() - 1))
    }
}
