//! Cursor-style field scanner for the fixed text formats the converter reads.
//!
//! Each method consumes a prefix of the remaining input on success and leaves
//! the cursor untouched on failure, so callers can count how many fields
//! matched before the first mismatch. Integer and float fields skip leading
//! whitespace; literals and bounded runs do not.

#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    /// Unconsumed input.
    pub fn rest(&self) -> &'a str {
        self.rest
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Signed decimal integer. Fails on no digits or on overflow.
    pub fn int(&mut self) -> Option<i64> {
        let trimmed = self.rest.trim_start();
        let bytes = trimmed.as_bytes();
        let mut end = 0;
        if matches!(bytes.first(), Some(b'+' | b'-')) {
            end = 1;
        }
        let digits_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end == digits_start {
            return None;
        }
        let value = trimmed[..end].parse().ok()?;
        self.rest = &trimmed[end..];
        Some(value)
    }

    /// Decimal float with optional fraction and exponent, a `0x` hex float
    /// with optional binary `p` exponent, or `inf`/`nan`.
    pub fn float(&mut self) -> Option<f32> {
        let trimmed = self.rest.trim_start();
        if let Some((value, end)) = hex_float(trimmed) {
            self.rest = &trimmed[end..];
            return Some(value);
        }
        let end = float_prefix_len(trimmed)?;
        let value = trimmed[..end].parse().ok()?;
        self.rest = &trimmed[end..];
        Some(value)
    }

    /// Match one literal character. A space matches any run of whitespace,
    /// including an empty one.
    pub fn literal(&mut self, expected: char) -> bool {
        if expected == ' ' {
            self.skip_whitespace();
            return true;
        }
        match self.rest.strip_prefix(expected) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    /// At least one and at most `max` characters up to (not including) `stop`.
    pub fn until(&mut self, stop: char, max: usize) -> Option<&'a str> {
        let end = self
            .rest
            .char_indices()
            .take(max)
            .find(|&(_, c)| c == stop)
            .map(|(i, _)| i)
            .unwrap_or_else(|| byte_offset_after(self.rest, max));
        if end == 0 {
            return None;
        }
        let (field, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(field)
    }

    /// Skip whitespace, then take one to `max` non-whitespace characters.
    pub fn word(&mut self, max: usize) -> Option<&'a str> {
        let trimmed = self.rest.trim_start();
        let end = trimmed
            .char_indices()
            .take(max)
            .find(|&(_, c)| c.is_whitespace())
            .map(|(i, _)| i)
            .unwrap_or_else(|| byte_offset_after(trimmed, max));
        if end == 0 {
            return None;
        }
        let (field, rest) = trimmed.split_at(end);
        self.rest = rest;
        Some(field)
    }
}

/// Byte offset just past the first `chars` characters of `s`.
fn byte_offset_after(s: &str, chars: usize) -> usize {
    s.char_indices().nth(chars).map(|(i, _)| i).unwrap_or(s.len())
}

/// Hex float such as `0x1Ap0` or `-0x1.8`. `None` unless at least one hex
/// digit follows the `0x`, in which case the input is decimal `0`.
fn hex_float(s: &str) -> Option<(f32, usize)> {
    let bytes = s.as_bytes();
    let negative = bytes.first() == Some(&b'-');
    let mut i = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    if !matches!(bytes.get(i..i + 2), Some([b'0', b'x' | b'X'])) {
        return None;
    }
    i += 2;

    // Mantissa bits beyond 60 only shift the exponent.
    let mut mantissa: u64 = 0;
    let mut exp: i64 = 0;
    let mut digits = 0;
    let mut seen_point = false;
    while let Some(&b) = bytes.get(i) {
        if b == b'.' && !seen_point {
            seen_point = true;
        } else if let Some(d) = char::from(b).to_digit(16) {
            digits += 1;
            if mantissa >> 60 == 0 {
                mantissa = mantissa << 4 | u64::from(d);
                if seen_point {
                    exp -= 4;
                }
            } else if !seen_point {
                exp += 4;
            }
        } else {
            break;
        }
        i += 1;
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'p' | b'P')) {
        let mut j = i + 1;
        let exp_negative = bytes.get(j) == Some(&b'-');
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        let mut binary: i64 = 0;
        while let Some(d) = bytes.get(j).filter(|b| b.is_ascii_digit()) {
            binary = (binary * 10 + i64::from(d - b'0')).min(100_000);
            j += 1;
        }
        if j > exp_start {
            exp += if exp_negative { -binary } else { binary };
            i = j;
        }
    }

    let scale = 2f64.powi(exp.clamp(-2_000, 2_000) as i32);
    let magnitude = (mantissa as f64 * scale) as f32;
    Some((if negative { -magnitude } else { magnitude }, i))
}

fn float_prefix_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i = 1;
    }

    for word in ["infinity", "inf", "nan"] {
        let tail = &bytes[i..];
        if tail.len() >= word.len() && tail[..word.len()].eq_ignore_ascii_case(word.as_bytes()) {
            return Some(i + word.len());
        }
    }

    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Some(i)
}
