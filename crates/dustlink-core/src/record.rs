//! Telemetry records and the CSV record source.
//!
//! Input is the hourly AQI table: a header line, then rows of
//! `id,time,value,aqi,pollution`. Rows that do not scan are dropped and
//! counted; they never reach the packet builder.

use std::io::{self, BufRead};

use tracing::debug;

use crate::pollution::PollutionCategory;
use crate::scan::Scanner;

/// Widest timestamp and category field the row scanner accepts.
pub const MAX_TEXT_FIELD: usize = 19;

/// Fields in a CSV row.
pub const ROW_FIELDS: usize = 5;

/// One validated hourly reading.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    /// Low byte of the row's id.
    pub sensor_id: u8,
    /// `YYYY:MM:DD hh:mm:ss`, local wall-clock time. Not validated here.
    pub timestamp: String,
    /// PM2.5 concentration, µg/m³.
    pub pm25: f32,
    pub aqi: u16,
    pub pollution: PollutionCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("only {0} of {} fields parsed", ROW_FIELDS)]
    FieldCount(usize),

    #[error("sensor id {0} is not positive")]
    NonPositiveId(i64),
}

impl TelemetryRecord {
    /// Parse one data row.
    ///
    /// Field rules: integer id, up to 19 non-comma characters of
    /// timestamp, float PM2.5, integer AQI, then up to 19 non-blank
    /// characters of category. Anything after the category is ignored.
    ///
    /// Ids wider than a byte and AQI values outside u16 are kept and
    /// truncated to the wire width, so id 256 becomes 0 and AQI -1 becomes
    /// 65535.
    pub fn parse_row(line: &str) -> Result<Self, RowError> {
        let (id, timestamp, pm25, aqi, label) = scan_row(line).map_err(RowError::FieldCount)?;

        if id <= 0 {
            return Err(RowError::NonPositiveId(id));
        }
        if u8::try_from(id).is_err() {
            debug!(id, "sensor id truncated to one byte");
        }
        if u16::try_from(aqi).is_err() {
            debug!(aqi, "AQI truncated to u16");
        }

        Ok(Self {
            sensor_id: id as u8,
            timestamp: timestamp.to_string(),
            pm25,
            aqi: aqi as u16,
            pollution: PollutionCategory::from_label(label),
        })
    }
}

/// Scan the five row fields. On failure, returns how many fields matched.
fn scan_row(line: &str) -> Result<(i64, &str, f32, i64, &str), usize> {
    let mut s = Scanner::new(line);
    let id = s.int().ok_or(0usize)?;
    let timestamp = after_comma(&mut s, |s| s.until(',', MAX_TEXT_FIELD)).ok_or(1usize)?;
    let pm25 = after_comma(&mut s, Scanner::float).ok_or(2usize)?;
    let aqi = after_comma(&mut s, Scanner::int).ok_or(3usize)?;
    let label = after_comma(&mut s, |s| s.word(MAX_TEXT_FIELD)).ok_or(4usize)?;
    Ok((id, timestamp, pm25, aqi, label))
}

fn after_comma<'a, T>(
    s: &mut Scanner<'a>,
    field: impl FnOnce(&mut Scanner<'a>) -> Option<T>,
) -> Option<T> {
    if s.literal(',') {
        field(s)
    } else {
        None
    }
}

// ── Source ────────────────────────────────────────────────────────────────────

/// Reads records from a CSV stream, discarding the header line and
/// skipping rows that fail [`TelemetryRecord::parse_row`].
///
/// Yields `Err` only for I/O failures. Bytes that are not UTF-8 are
/// replaced rather than treated as errors.
pub struct RecordSource<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
    skipped: usize,
}

impl<R: BufRead> RecordSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Rows dropped so far, excluding the header and blank lines.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// 1-based number of the last line read.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Parse the next data row without counting a failure as skipped.
    /// Reads at most up to the next non-blank line.
    pub fn peek_row(&mut self) -> io::Result<Option<Result<TelemetryRecord, RowError>>> {
        Ok(self.next_data_line()?.map(|row| TelemetryRecord::parse_row(&row)))
    }

    /// Next line that is neither the header nor blank, line ending stripped.
    fn next_data_line(&mut self) -> io::Result<Option<String>> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if self.line_no == 1 {
                continue;
            }
            let line = String::from_utf8_lossy(&self.buf);
            let row = line.trim_end_matches(['\n', '\r']);
            if !row.trim().is_empty() {
                return Ok(Some(row.to_string()));
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordSource<R> {
    type Item = io::Result<TelemetryRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.next_data_line() {
                Ok(Some(row)) => row,
                Ok(None) => return None,
                Err(e) => return Some(Err(e)),
            };
            match TelemetryRecord::parse_row(&row) {
                Ok(record) => {
                    if record.pollution == PollutionCategory::Unknown {
                        debug!(line = self.line_no, row = row.as_str(), "unrecognised pollution category");
                    }
                    return Some(Ok(record));
                }
                Err(e) => {
                    self.skipped += 1;
                    debug!(line = self.line_no, row = row.as_str(), error = %e, "skipping row");
                }
            }
        }
    }
}
