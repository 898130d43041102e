//! Hex-text rendering of packets: the only persisted form.
//!
//! One packet per line: 16 uppercase hex pairs separated by single spaces,
//! terminated by `\n`. The parser accepts any whitespace between pairs.

use std::io::{self, Write};

use crate::wire::{Packet, WireError, PACKET_LEN};

/// Render a packet as one hex text line, newline included.
pub fn emit(packet: &Packet) -> String {
    let digits = hex::encode_upper(packet.as_bytes());
    let mut line = String::with_capacity(PACKET_LEN * 3);
    for (i, pair) in digits.as_bytes().chunks_exact(2).enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push(char::from(pair[0]));
        line.push(char::from(pair[1]));
    }
    line.push('\n');
    line
}

pub fn write_line<W: Write>(out: &mut W, packet: &Packet) -> io::Result<()> {
    out.write_all(emit(packet).as_bytes())
}

/// Parse one hex text line back into a validated packet.
pub fn parse_line(line: &str) -> Result<Packet, WireError> {
    let mut bytes = Vec::with_capacity(PACKET_LEN);
    for token in line.split_whitespace() {
        let mut byte = [0u8; 1];
        hex::decode_to_slice(token, &mut byte)
            .map_err(|_| WireError::InvalidHex(token.to_string()))?;
        bytes.push(byte[0]);
    }
    Packet::parse(&bytes)
}
