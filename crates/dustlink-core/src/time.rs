//! Timestamp codec: `YYYY:MM:DD hh:mm:ss` wall-clock strings to 32-bit epoch.
//!
//! The string carries no zone; it is read as wall-clock time in a
//! [`TimeZone`] (the host's local zone by default). Out-of-range fields
//! normalise into neighbouring units, so month 13 is January of the next
//! year and day 0 is the last day of the previous month.
//!
//! Two parsing modes:
//!   lenient: fields that fail to scan stay zero and the result is still an
//!            epoch, possibly a wrong one. Known deficiency, kept for
//!            compatibility with existing data files.
//!   strict:  fewer than six scanned fields, or a time outside the u32
//!            epoch range, is a [`ParseError`].

use std::str::FromStr;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Offset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::scan::Scanner;

/// Number of numeric fields in a timestamp.
pub const FIELD_COUNT: usize = 6;

/// Separator expected after each field, in order. The last field has none.
const SEPARATORS: [char; FIELD_COUNT - 1] = [':', ':', ' ', ':', ':'];

/// Returned by lenient encoding when the fields cannot be placed on the
/// calendar at all. Same bit pattern as a -1 epoch.
pub const UNREPRESENTABLE_EPOCH: u32 = u32::MAX;

// ── Mode ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampMode {
    #[default]
    Lenient,
    Strict,
}

impl FromStr for TimestampMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown timestamp mode: {other}")),
        }
    }
}

// ── Fields ────────────────────────────────────────────────────────────────────

/// Raw calendar fields as scanned, before normalisation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarFields {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl CalendarFields {
    /// Scan fields left to right, stopping at the first mismatch.
    /// Returns the fields and how many were matched; unmatched fields are 0.
    pub fn scan(input: &str) -> (Self, usize) {
        let mut values = [0i32; FIELD_COUNT];
        let mut matched = 0;
        let mut scanner = Scanner::new(input);

        for (i, slot) in values.iter_mut().enumerate() {
            if i > 0 && !scanner.literal(SEPARATORS[i - 1]) {
                break;
            }
            match scanner.int().and_then(|v| i32::try_from(v).ok()) {
                Some(v) => *slot = v,
                None => break,
            }
            matched += 1;
        }

        let [year, month, day, hour, minute, second] = values;
        let fields = Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        (fields, matched)
    }

    /// Place the fields on the proleptic Gregorian calendar, carrying
    /// overflow from each field into the next larger unit.
    pub fn normalize(&self) -> Option<NaiveDateTime> {
        let total_months = i64::from(self.year) * 12 + i64::from(self.month) - 1;
        let year = i32::try_from(total_months.div_euclid(12)).ok()?;
        let month = u32::try_from(total_months.rem_euclid(12)).ok()? + 1;

        let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
        let offset_secs = (i64::from(self.day) - 1) * 86_400
            + i64::from(self.hour) * 3_600
            + i64::from(self.minute) * 60
            + i64::from(self.second);
        first_of_month.checked_add_signed(Duration::seconds(offset_secs))
    }
}

// ── Codec ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("timestamp {input:?}: matched {matched} of {} fields", FIELD_COUNT)]
    MissingFields { input: String, matched: usize },

    #[error("timestamp {input:?} has no u32 epoch in this time zone")]
    Unrepresentable { input: String },
}

/// Encodes timestamps as seconds since the Unix epoch, interpreting the
/// calendar fields in `Tz`.
#[derive(Debug, Clone)]
pub struct TimestampCodec<Tz: TimeZone = Local> {
    tz: Tz,
}

impl TimestampCodec<Local> {
    /// Codec for the host's local time zone.
    pub fn local() -> Self {
        Self { tz: Local }
    }
}

impl Default for TimestampCodec<Local> {
    fn default() -> Self {
        Self::local()
    }
}

impl<Tz: TimeZone> TimestampCodec<Tz> {
    pub fn with_zone(tz: Tz) -> Self {
        Self { tz }
    }

    /// Lenient encoding. Never fails; malformed input yields a well-formed
    /// but possibly wrong epoch. Epochs outside u32 wrap.
    pub fn encode(&self, timestamp: &str) -> u32 {
        let (fields, _) = CalendarFields::scan(timestamp);
        match self.epoch_of(&fields) {
            Some(epoch) => epoch as u32,
            None => UNREPRESENTABLE_EPOCH,
        }
    }

    /// Strict encoding. All six fields must scan and the result must fit u32.
    pub fn encode_strict(&self, timestamp: &str) -> Result<u32, ParseError> {
        let (fields, matched) = CalendarFields::scan(timestamp);
        if matched < FIELD_COUNT {
            return Err(ParseError::MissingFields {
                input: timestamp.to_string(),
                matched,
            });
        }
        self.epoch_of(&fields)
            .and_then(|epoch| u32::try_from(epoch).ok())
            .ok_or_else(|| ParseError::Unrepresentable {
                input: timestamp.to_string(),
            })
    }

    fn epoch_of(&self, fields: &CalendarFields) -> Option<i64> {
        let naive = fields.normalize()?;
        if let Some(dt) = self.tz.from_local_datetime(&naive).earliest() {
            return Some(dt.timestamp());
        }
        // Wall time falls in a forward transition gap: read it with the
        // offset in force a day earlier, which is the one before the gap.
        let day_before = naive.checked_sub_signed(Duration::days(1))?;
        let offset = self.tz.offset_from_utc_datetime(&day_before).fix();
        let utc = naive.checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?;
        Some(self.tz.from_utc_datetime(&utc).timestamp())
    }
}
