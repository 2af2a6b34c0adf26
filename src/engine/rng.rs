//! Mulberry32 pseudo-random stream.
//!
//! All arithmetic is on `u32` with wrapping semantics so the sequence matches
//! every other Mulberry32 implementation bit for bit.

use super::seed::Seed;

const INCREMENT: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Advance `state` once. Returns the raw 32-bit output and the new state.
pub fn next(state: u32) -> (u32, u32) {
    let state = state.wrapping_add(INCREMENT);
    let mut t = (state ^ (state >> 15)).wrapping_mul(state | 1);
    t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61)) ^ t;
    (t ^ (t >> 14), state)
}

/// Stateful wrapper around [`next`]. Each game session owns its own instance.
#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
    draws: usize,
}

impl Mulberry32 {
    pub fn new(seed: Seed) -> Self {
        // Reinterpret the signed seed's bits, matching `seed | 0` in 32-bit land
        Self {
            state: seed.value() as u32,
            draws: 0,
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let (value, state) = next(self.state);
        self.state = state;
        self.draws += 1;
        value
    }

    /// Next value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Number of values drawn so far
    pub fn draws(&self) -> usize {
        self.draws
    }
}

/// `floor(next * (max - min + 1)) + min`, inclusive on both ends.
pub fn random_int(min: i32, max: i32, rng: &mut Mulberry32) -> i32 {
    let span = i64::from(max) - i64::from(min) + 1;
    let offset = (rng.next_f64() * span as f64).floor() as i64;
    (i64::from(min) + offset) as i32
}

/// Uniform index into a collection of `len` items (`len` must be non-zero).
pub fn random_index(len: usize, rng: &mut Mulberry32) -> usize {
    (rng.next_f64() * len as f64).floor() as usize
}

/// In-place Fisher–Yates walk from the back, one draw per position > 0.
pub fn shuffle<T>(items: &mut [T], rng: &mut Mulberry32) {
    for i in (1..items.len()).rev() {
        let j = random_index(i + 1, rng);
        items.swap(i, j);
    }
}
