//! CSV → hex packet conversion.
//!
//! Strictly sequential: each accepted record is built, emitted, and dropped
//! before the next row is read. Processing stops when input runs out or
//! after [`MAX_RECORDS`] packets, whichever comes first.

use std::io::{self, BufRead, Write};

use chrono::{Local, TimeZone};
use tracing::{debug, info, warn};

use crate::builder::PacketBuilder;
use crate::emit;
use crate::record::RecordSource;
use crate::time::{TimestampCodec, TimestampMode};

/// Hard cap on packets per run. Larger inputs must be split by the caller.
pub const MAX_RECORDS: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Packets written.
    pub packets: usize,
    /// Rows dropped: unparseable rows, plus strict-mode timestamp rejections.
    pub skipped: usize,
    /// True if the cap stopped processing with acceptable rows remaining.
    pub truncated: bool,
}

/// I/O failure on either side of a conversion or verification run.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write output: {0}")]
    Write(#[source] io::Error),
}

pub struct Converter<Tz: TimeZone = Local> {
    builder: PacketBuilder<Tz>,
    mode: TimestampMode,
}

impl Converter<Local> {
    /// Converter reading timestamps in the host's local time zone.
    pub fn new(mode: TimestampMode) -> Self {
        Self::with_codec(TimestampCodec::local(), mode)
    }
}

impl<Tz: TimeZone> Converter<Tz> {
    pub fn with_codec(timestamps: TimestampCodec<Tz>, mode: TimestampMode) -> Self {
        Self {
            builder: PacketBuilder::with_codec(timestamps),
            mode,
        }
    }

    /// Convert every acceptable row of `input` into one hex line on `output`.
    /// The output is flushed before returning.
    pub fn run<R: BufRead, W: Write>(
        &self,
        input: R,
        mut output: W,
    ) -> Result<ConvertSummary, StreamError> {
        let mut source = RecordSource::new(input);
        let mut summary = ConvertSummary::default();
        let mut rejected = 0;

        info!(mode = ?self.mode, "conversion started");

        while summary.packets < MAX_RECORDS {
            let Some(record) = source.next() else {
                break;
            };
            let record = record.map_err(StreamError::Read)?;

            let packet = match self.mode {
                TimestampMode::Lenient => self.builder.build(&record),
                TimestampMode::Strict => match self.builder.build_strict(&record) {
                    Ok(packet) => packet,
                    Err(e) => {
                        rejected += 1;
                        debug!(line = source.line_no(), error = %e, "rejecting row");
                        continue;
                    }
                },
            };

            emit::write_line(&mut output, &packet).map_err(StreamError::Write)?;
            summary.packets += 1;
        }

        summary.skipped = source.skipped() + rejected;
        if summary.packets == MAX_RECORDS {
            summary.truncated = self.has_acceptable_row(&mut source)?;
            if summary.truncated {
                warn!(cap = MAX_RECORDS, "record cap reached, remaining input dropped");
            }
        }

        output.flush().map_err(StreamError::Write)?;

        info!(
            packets = summary.packets,
            skipped = summary.skipped,
            truncated = summary.truncated,
            "conversion finished"
        );
        Ok(summary)
    }

    /// Looks at the single data row after the cap. Nothing further is read.
    fn has_acceptable_row<R: BufRead>(
        &self,
        source: &mut RecordSource<R>,
    ) -> Result<bool, StreamError> {
        match source.peek_row().map_err(StreamError::Read)? {
            Some(Ok(record)) => Ok(self.mode == TimestampMode::Lenient
                || self.builder.build_strict(&record).is_ok()),
            _ => Ok(false),
        }
    }
}
