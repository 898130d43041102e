//! Packet builder: one [`TelemetryRecord`] in, one complete 16-byte frame out.

use chrono::{Local, TimeZone};

use crate::checksum;
use crate::field::{write_f32, write_u16, write_u32};
use crate::record::TelemetryRecord;
use crate::time::{ParseError, TimestampCodec};
use crate::wire::{
    Packet, CHECKSUM_RANGE, OFFSET_AQI, OFFSET_CHECKSUM, OFFSET_EPOCH, OFFSET_LENGTH,
    OFFSET_PM25, OFFSET_POLLUTION, OFFSET_SENSOR_ID, OFFSET_START, OFFSET_STOP, PACKET_LEN,
    START_MARKER, STOP_MARKER,
};

#[derive(Debug, Clone)]
pub struct PacketBuilder<Tz: TimeZone = Local> {
    timestamps: TimestampCodec<Tz>,
}

impl PacketBuilder<Local> {
    /// Builder that reads timestamps in the host's local time zone.
    pub fn new() -> Self {
        Self::with_codec(TimestampCodec::local())
    }
}

impl Default for PacketBuilder<Local> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tz: TimeZone> PacketBuilder<Tz> {
    pub fn with_codec(timestamps: TimestampCodec<Tz>) -> Self {
        Self { timestamps }
    }

    /// Build a frame, encoding the timestamp leniently. Total.
    pub fn build(&self, record: &TelemetryRecord) -> Packet {
        assemble(record, self.timestamps.encode(&record.timestamp))
    }

    /// Build a frame, failing instead if the timestamp does not strictly parse.
    pub fn build_strict(&self, record: &TelemetryRecord) -> Result<Packet, ParseError> {
        let epoch = self.timestamps.encode_strict(&record.timestamp)?;
        Ok(assemble(record, epoch))
    }
}

fn assemble(record: &TelemetryRecord, epoch: u32) -> Packet {
    let mut buf = [0u8; PACKET_LEN];
    buf[OFFSET_START] = START_MARKER;
    buf[OFFSET_LENGTH] = PACKET_LEN as u8;
    buf[OFFSET_SENSOR_ID] = record.sensor_id;
    write_u32(&mut buf, OFFSET_EPOCH, epoch);
    write_f32(&mut buf, OFFSET_PM25, record.pm25);
    write_u16(&mut buf, OFFSET_AQI, record.aqi);
    buf[OFFSET_POLLUTION] = record.pollution.code();
    buf[OFFSET_CHECKSUM] = checksum::compute_range(&buf, CHECKSUM_RANGE);
    buf[OFFSET_STOP] = STOP_MARKER;
    Packet::from_assembled(buf)
}
