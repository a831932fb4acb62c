//! Conversions between the 32-bit sequence numbers carried on the wire and the
//! 64-bit absolute positions used internally.
//!
//! ```text
//!  absolute:   0     1     2    ...   2^32   2^32+1  ...
//!             SYN  byte0 byte1  ...
//!  wrapped:   isn  isn+1 isn+2  ...   isn    isn+1   ...
//! ```
//!
//! Every wrapped value names infinitely many absolute positions, `2^32`
//! apart. [`unwrap`] picks the one closest to a recent absolute position
//! (the checkpoint).

use std::{
    fmt::{self, Display},
    ops::{Add, Sub},
};

/// One full cycle of the 32-bit sequence space.
const CYCLE: u64 = 1 << 32;
/// Half a cycle, the largest distance [`unwrap`] ever has to bridge.
const HALF_CYCLE: u64 = CYCLE >> 1;

/// A sequence number as carried in a segment header. Arithmetic wraps at
/// `2^32`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrappingU32(u32);

impl WrappingU32 {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw 32-bit value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Converts the absolute sequence number `n` into its wire form under
    /// `isn`.
    pub fn wrap(n: u64, isn: WrappingU32) -> Self {
        isn + n as u32
    }

    /// Converts this wire sequence number into the absolute sequence number
    /// closest to `checkpoint` under `isn`.
    pub fn unwrap(self, isn: WrappingU32, checkpoint: u64) -> u64 {
        // Position of `self` within a single cycle
        let offset = (self - isn) as u64;
        if checkpoint <= offset {
            // Any earlier candidate would be negative
            return offset;
        }

        let distance = checkpoint - offset;
        let mut cycles = distance >> 32;
        // Round to the nearest cycle. A remainder of exactly half a cycle is a
        // tie between the candidates below and above the checkpoint, and the
        // lower one wins.
        if distance & (CYCLE - 1) > HALF_CYCLE {
            cycles += 1;
        }
        match cycles
            .checked_mul(CYCLE)
            .and_then(|base| base.checked_add(offset))
        {
            Some(absolute) => absolute,
            // The upper candidate does not fit in 64 bits
            None => (cycles - 1) * CYCLE + offset,
        }
    }
}

/// Free-function form of [`WrappingU32::wrap`].
pub fn wrap(n: u64, isn: WrappingU32) -> WrappingU32 {
    WrappingU32::wrap(n, isn)
}

/// Free-function form of [`WrappingU32::unwrap`].
pub fn unwrap(n: WrappingU32, isn: WrappingU32, checkpoint: u64) -> u64 {
    n.unwrap(isn, checkpoint)
}

impl Add<u32> for WrappingU32 {
    type Output = Self;

    fn add(self, rhs: u32) -> Self::Output {
        Self(self.0.wrapping_add(rhs))
    }
}

/// The forward distance from `rhs` to `self`, modulo `2^32`.
impl Sub for WrappingU32 {
    type Output = u32;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0.wrapping_sub(rhs.0)
    }
}

impl From<u32> for WrappingU32 {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<WrappingU32> for u32 {
    fn from(seq: WrappingU32) -> Self {
        seq.0
    }
}

impl Display for WrappingU32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
