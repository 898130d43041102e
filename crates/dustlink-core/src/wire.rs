//! Dustlink wire format: the 16-byte telemetry frame.
//!
//! These constants ARE the receiver contract. Every offset and marker is
//! fixed by the embedded firmware that consumes the frames; changing any of
//! them is a breaking change.
//!
//! ```text
//! offset  size  field           encoding
//!   0      1    start marker    0xAA
//!   1      1    length          16
//!   2      1    sensor id       raw byte
//!   3      4    epoch time      u32 LE
//!   7      4    PM2.5           f32 LE (IEEE-754 bits)
//!  11      2    AQI             u16 LE
//!  13      1    pollution code  ASCII letter
//!  14      1    checksum        two's complement of bytes 1..14
//!  15      1    stop marker     0xFF
//! ```
//!
//! [`PacketFrame`] is a zerocopy view of the same layout with explicit
//! little-endian field types, used for decoding. Nothing here uses unsafe.

use std::ops::Range;

use static_assertions::{assert_eq_size, const_assert_eq};
use zerocopy::byteorder::{LittleEndian, F32, U16, U32};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned};

use crate::checksum;
use crate::pollution::PollutionCategory;

// ── Constants ─────────────────────────────────────────────────────────────────

pub const START_MARKER: u8 = 0xAA;
pub const STOP_MARKER: u8 = 0xFF;

/// Total frame size, also the value of the length byte.
pub const PACKET_LEN: usize = 16;

pub const OFFSET_START: usize = 0;
pub const OFFSET_LENGTH: usize = 1;
pub const OFFSET_SENSOR_ID: usize = 2;
pub const OFFSET_EPOCH: usize = 3;
pub const OFFSET_PM25: usize = 7;
pub const OFFSET_AQI: usize = 11;
pub const OFFSET_POLLUTION: usize = 13;
pub const OFFSET_CHECKSUM: usize = 14;
pub const OFFSET_STOP: usize = 15;

/// Bytes covered by the checksum: length byte through pollution code.
pub const CHECKSUM_RANGE: Range<usize> = OFFSET_LENGTH..OFFSET_CHECKSUM;

const_assert_eq!(OFFSET_STOP + 1, PACKET_LEN);
const_assert_eq!(PACKET_LEN, 16);

// ── Frame layout ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, AsBytes, FromBytes, FromZeroes, Unaligned)]
#[repr(C)]
pub struct PacketFrame {
    pub start: u8,
    pub length: u8,
    pub sensor_id: u8,
    pub epoch: U32<LittleEndian>,
    pub pm25: F32<LittleEndian>,
    pub aqi: U16<LittleEndian>,
    pub pollution_code: u8,
    pub checksum: u8,
    pub stop: u8,
}

// Compile-time size guard. If this fails, the wire format has silently changed.
assert_eq_size!(PacketFrame, [u8; PACKET_LEN]);

// ── Packet ────────────────────────────────────────────────────────────────────

/// A complete, valid frame. Only produced by [`PacketBuilder`] or by
/// [`Packet::parse`], so markers, length and checksum always hold.
///
/// [`PacketBuilder`]: crate::builder::PacketBuilder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Packet([u8; PACKET_LEN]);

impl Packet {
    /// Wrap bytes the builder has fully assembled.
    pub(crate) fn from_assembled(bytes: [u8; PACKET_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; PACKET_LEN] {
        self.0
    }

    pub fn frame(&self) -> PacketFrame {
        zerocopy::transmute!(self.0)
    }

    /// Validate raw bytes as a frame.
    pub fn parse(bytes: &[u8]) -> Result<Self, WireError> {
        let raw: [u8; PACKET_LEN] = bytes
            .try_into()
            .map_err(|_| WireError::WrongLength(bytes.len()))?;
        let frame: PacketFrame = zerocopy::transmute!(raw);

        if frame.start != START_MARKER {
            return Err(WireError::BadStartMarker(frame.start));
        }
        if usize::from(frame.length) != PACKET_LEN {
            return Err(WireError::BadLengthField(frame.length));
        }
        if frame.stop != STOP_MARKER {
            return Err(WireError::BadStopMarker(frame.stop));
        }
        if !checksum::verify(&raw, CHECKSUM_RANGE.start, CHECKSUM_RANGE.end, frame.checksum) {
            return Err(WireError::ChecksumMismatch {
                stored: frame.checksum,
                expected: checksum::compute_range(&raw, CHECKSUM_RANGE),
            });
        }
        if PollutionCategory::from_code(frame.pollution_code).is_none() {
            return Err(WireError::UnknownPollutionCode(frame.pollution_code));
        }

        Ok(Self(raw))
    }

    pub fn decode(&self) -> DecodedPacket {
        let frame = self.frame();
        DecodedPacket {
            sensor_id: frame.sensor_id,
            epoch: frame.epoch.get(),
            pm25: frame.pm25.get(),
            aqi: frame.aqi.get(),
            pollution: PollutionCategory::from_code(frame.pollution_code)
                .unwrap_or(PollutionCategory::Unknown),
        }
    }
}

impl TryFrom<&[u8]> for Packet {
    type Error = WireError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::parse(bytes)
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Field values carried by a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedPacket {
    pub sensor_id: u8,
    pub epoch: u32,
    pub pm25: f32,
    pub aqi: u16,
    pub pollution: PollutionCategory,
}

impl DecodedPacket {
    /// True if the AQI field equals the AQI of the pollution category.
    /// Always false for `Unknown`.
    pub fn is_consistent(&self) -> bool {
        self.pollution.aqi() == Some(self.aqi)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("frame is {0} bytes, expected {}", PACKET_LEN)]
    WrongLength(usize),

    #[error("bad start marker: 0x{0:02x}")]
    BadStartMarker(u8),

    #[error("bad length field: {0}")]
    BadLengthField(u8),

    #[error("bad stop marker: 0x{0:02x}")]
    BadStopMarker(u8),

    #[error("checksum mismatch: stored 0x{stored:02x}, expected 0x{expected:02x}")]
    ChecksumMismatch { stored: u8, expected: u8 },

    #[error("unknown pollution code: 0x{0:02x}")]
    UnknownPollutionCode(u8),

    #[error("invalid hex byte: {0:?}")]
    InvalidHex(String),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
