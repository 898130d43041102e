//! One-byte two's-complement checksum.
//!
//! `compute` returns the byte that makes the covered bytes sum to zero
//! mod 256. All wraparound is explicit.

use std::ops::Range;

/// Two's-complement checksum of `buf[start..end]`.
pub fn compute(buf: &[u8], start: usize, end: usize) -> u8 {
    let low = (sum(&buf[start..end]) % 256) as u8;
    (!low).wrapping_add(1)
}

/// True if `buf[start..end]` plus `stored` sums to zero mod 256.
pub fn verify(buf: &[u8], start: usize, end: usize, stored: u8) -> bool {
    (sum(&buf[start..end]) + u64::from(stored)) % 256 == 0
}

/// [`compute`] over a range.
pub fn compute_range(buf: &[u8], range: Range<usize>) -> u8 {
    compute(buf, range.start, range.end)
}

fn sum(bytes: &[u8]) -> u64 {
    bytes.iter().map(|&b| u64::from(b)).sum()
}
