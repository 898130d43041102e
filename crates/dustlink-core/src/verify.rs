//! Verification of emitted hex packet files.
//!
//! Every non-blank line must parse as a valid frame. Valid frames whose AQI
//! disagrees with their pollution code are counted separately; they are
//! well-formed, just suspicious.

use std::io::BufRead;

use tracing::{debug, info};

use crate::convert::StreamError;
use crate::emit;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerifySummary {
    pub valid: usize,
    pub corrupt: usize,
    /// Subset of `valid`.
    pub inconsistent: usize,
}

impl VerifySummary {
    pub fn is_clean(&self) -> bool {
        self.corrupt == 0
    }
}

pub fn verify<R: BufRead>(mut input: R) -> Result<VerifySummary, StreamError> {
    let mut summary = VerifySummary::default();
    let mut buf = Vec::new();

    for i in 0usize.. {
        buf.clear();
        if input.read_until(b'\n', &mut buf).map_err(StreamError::Read)? == 0 {
            break;
        }
        // Non-UTF-8 bytes become U+FFFD, which no hex pair matches.
        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }
        match emit::parse_line(&line) {
            Ok(packet) => {
                summary.valid += 1;
                let decoded = packet.decode();
                if !decoded.is_consistent() {
                    summary.inconsistent += 1;
                    debug!(line = i + 1, aqi = decoded.aqi, pollution = ?decoded.pollution, "AQI does not match category");
                }
            }
            Err(e) => {
                summary.corrupt += 1;
                debug!(line = i + 1, error = %e, "corrupt packet");
            }
        }
    }

    info!(
        valid = summary.valid,
        corrupt = summary.corrupt,
        inconsistent = summary.inconsistent,
        "verification finished"
    );
    Ok(summary)
}
