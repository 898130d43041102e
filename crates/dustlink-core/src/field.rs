//! Little-endian field writers.
//!
//! Each writer stores `value` at `buf[offset..]`, least-significant byte
//! first, independent of host byte order. Bounds are the caller's
//! responsibility.
//!
//! # Panics
//!
//! All writers panic if the field does not fit in `buf` at `offset`.

pub fn write_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Writes the IEEE-754 bit pattern of `value`.
pub fn write_f32(buf: &mut [u8], offset: usize, value: f32) {
    write_u32(buf, offset, value.to_bits());
}
