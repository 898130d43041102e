//! dustlink-core: air-quality telemetry packet codec.
//!
//! Turns validated telemetry rows into fixed 16-byte frames for an embedded
//! receiver, renders them as hex text, and decodes them back for
//! verification. The `dust-convert` binary is a thin shell over this crate.

pub mod builder;
pub mod checksum;
pub mod config;
pub mod convert;
pub mod emit;
pub mod field;
pub mod pollution;
pub mod record;
pub mod scan;
pub mod time;
pub mod verify;
pub mod wire;

pub use builder::PacketBuilder;
pub use convert::{ConvertSummary, Converter, StreamError, MAX_RECORDS};
pub use pollution::PollutionCategory;
pub use record::{RecordSource, TelemetryRecord};
pub use time::{TimestampCodec, TimestampMode};
pub use wire::{DecodedPacket, Packet, WireError};
