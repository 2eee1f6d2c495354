//! Mobile identification number encoding (EIA-553 2.3.1)
//!
//! A ten digit MIN `NPA-NXX-XXXX` is carried as two binary fields:
//! MIN2 (10 bits) holds the area code and MIN1 (24 bits) holds the exchange
//! (10 bits), the thousands digit (4 bits) and the last three digits (10 bits).
//! Each three digit group uses the standard's base-10 zero-indexed transform:
//! every digit maps 0 to 10, then `100*d1 + 10*d2 + d3 - 111`.

use crate::{AmpsError, Result};

/// Number of decimal digits in a full MIN.
pub const MIN_DIGITS: usize = 10;

/// Binary form of a MIN as it appears in forward and reverse words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinCode {
    /// Exchange, thousands digit and last three digits (24 bits).
    pub min1: u32,
    /// Area code (10 bits).
    pub min2: u16,
}

impl MinCode {
    /// Build from raw word fields, masking to their widths.
    pub fn from_fields(min1: u64, min2: u64) -> Self {
        Self { min1: (min1 & 0x00ff_ffff) as u32, min2: (min2 & 0x3ff) as u16 }
    }

    /// Parse a MIN digit string.
    ///
    /// Accepts 1 to 10 decimal digits. Strings shorter than ten digits are
    /// zero-extended on the left, so `"5551234"` encodes as `"0005551234"`.
    pub fn parse(digits: &str) -> Result<Self> {
        if digits.is_empty() || digits.len() > MIN_DIGITS {
            return Err(AmpsError::invalid_min(digits, "expected 1 to 10 digits"));
        }
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(AmpsError::invalid_min(digits, format!("non-digit character '{}'", bad)));
        }

        let mut d = [0u8; MIN_DIGITS];
        let pad = MIN_DIGITS - digits.len();
        for (slot, byte) in d[pad..].iter_mut().zip(digits.bytes()) {
            *slot = byte - b'0';
        }

        let min2 = encode_group([d[0], d[1], d[2]]);
        let thousands = if d[6] == 0 { 10 } else { u32::from(d[6]) };
        let min1 = (u32::from(encode_group([d[3], d[4], d[5]])) << 14)
            | ((thousands & 0xf) << 10)
            | u32::from(encode_group([d[7], d[8], d[9]]));

        Ok(Self { min1, min2 })
    }

    /// Reconstruct the ten digit MIN string.
    pub fn to_digits(&self) -> String {
        let mut out = String::with_capacity(MIN_DIGITS);
        push_group(&mut out, decode_group(self.min2 & 0x3ff));
        push_group(&mut out, decode_group(((self.min1 >> 14) & 0x3ff) as u16));
        let thousands = (self.min1 >> 10) & 0xf;
        let thousands = if thousands > 9 { 0 } else { thousands };
        out.push(char::from(b'0' + thousands as u8));
        push_group(&mut out, decode_group((self.min1 & 0x3ff) as u16));
        out
    }
}

impl std::fmt::Display for MinCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_digits())
    }
}

/// Convenience wrapper: digits to `(MIN1, MIN2)`.
pub fn min_to_words(digits: &str) -> Result<(u32, u16)> {
    let code = MinCode::parse(digits)?;
    Ok((code.min1, code.min2))
}

/// Convenience wrapper: `(MIN1, MIN2)` to digits.
pub fn words_to_min(min1: u32, min2: u16) -> String {
    MinCode { min1, min2 }.to_digits()
}

fn encode_group(digits: [u8; 3]) -> u16 {
    let [d1, d2, d3] = digits.map(|d| if d == 0 { 10u16 } else { u16::from(d) });
    100 * d1 + 10 * d2 + d3 - 111
}

// Digit extraction runs on value + 111 and peels a digit at a time; a zero
// digit stands for the transformed value 10, so it borrows from the next place.
fn decode_group(value: u16) -> [u8; 3] {
    let mut m = u32::from(value) + 111;

    let units = m % 10;
    m -= if units == 0 { 10 } else { units };

    let tens = (m % 100) / 10;
    m -= if tens == 0 { 100 } else { m % 100 };

    let hundreds = m / 100;
    let hundreds = if hundreds > 9 { 0 } else { hundreds };

    [hundreds as u8, tens as u8, units as u8]
}

fn push_group(out: &mut String, group: [u8; 3]) {
    for d in group {
        out.push(char::from(b'0' + d));
    }
}
