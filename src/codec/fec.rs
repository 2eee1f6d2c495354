//! Shortened BCH(63,51) block code
//!
//! Both control channel directions use the same double-error-correcting
//! BCH(63,51) code with generator
//! `g(x) = x^12 + x^10 + x^8 + x^5 + x^4 + x^3 + 1`, shortened to
//! (40,28) on the forward channel and (48,36) on the reverse channel.
//! Codewords are systematic: the information bits come first, followed by
//! the 12 parity bits (the remainder of `info(x) * x^12` modulo `g(x)`).
//!
//! Decoding computes the syndrome and looks it up in a table of every one- and
//! two-bit error pattern for the shortened length. Anything else is reported as
//! uncorrectable, so a pattern the code can detect never comes back as a wrong
//! word flagged as good.

use std::sync::OnceLock;

use crate::{AmpsError, Result};

/// Generator polynomial, bit `i` holds the coefficient of `x^i`.
pub const GENERATOR: u64 = 0x1539;

/// Parity bits appended to every codeword.
pub const PARITY_BITS: usize = 12;

const SYNDROME_SPACE: usize = 1 << PARITY_BITS;

/// A shortened BCH code with a fixed number of information bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BchCode {
    info_bits: usize,
}

/// Outcome of a successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Corrected information bits.
    pub data: Vec<u8>,
    /// Number of bit errors corrected (0 to 2).
    pub corrected: u32,
}

impl BchCode {
    /// (40,28) code used on the forward control and voice channels.
    pub const FORWARD: BchCode = BchCode { info_bits: 28 };
    /// (48,36) code used on the reverse control channel.
    pub const REVERSE: BchCode = BchCode { info_bits: 36 };

    pub fn info_bits(&self) -> usize {
        self.info_bits
    }

    pub fn codeword_bits(&self) -> usize {
        self.info_bits + PARITY_BITS
    }

    /// Encode information bits (one bit per byte) into a codeword.
    pub fn encode(&self, info: &[u8]) -> Result<Vec<u8>> {
        if info.len() != self.info_bits {
            return Err(AmpsError::invariant(
                "BCH encode",
                format!("expected {} information bits, got {}", self.info_bits, info.len()),
            ));
        }
        let value = bits_to_u64(info)?;
        let codeword = (value << PARITY_BITS) | remainder(value << PARITY_BITS, self.codeword_bits());
        Ok(u64_to_bits(codeword, self.codeword_bits()))
    }

    /// Decode a received codeword.
    ///
    /// Returns `Ok(None)` when the error pattern is beyond the code's
    /// correction capability. A wrong-length input or a byte other than 0/1 is
    /// a caller defect and returns an error.
    pub fn decode(&self, codeword: &[u8]) -> Result<Option<Decoded>> {
        let n = self.codeword_bits();
        if codeword.len() != n {
            return Err(AmpsError::invariant(
                "BCH decode",
                format!("expected {} codeword bits, got {}", n, codeword.len()),
            ));
        }
        let received = bits_to_u64(codeword)?;
        let syndrome = remainder(received, n) as usize;

        let (fixed, corrected) = if syndrome == 0 {
            (received, 0)
        } else {
            match self.table()[syndrome] {
                Some(mask) => (received ^ mask, mask.count_ones()),
                None => return Ok(None),
            }
        };

        Ok(Some(Decoded { data: u64_to_bits(fixed >> PARITY_BITS, self.info_bits), corrected }))
    }

    fn table(&self) -> &'static [Option<u64>] {
        static FORWARD_TABLE: OnceLock<Vec<Option<u64>>> = OnceLock::new();
        static REVERSE_TABLE: OnceLock<Vec<Option<u64>>> = OnceLock::new();
        static OTHER_TABLE: OnceLock<Vec<Option<u64>>> = OnceLock::new();

        let n = self.codeword_bits();
        let cell = match self.info_bits {
            28 => &FORWARD_TABLE,
            36 => &REVERSE_TABLE,
            _ => &OTHER_TABLE,
        };
        cell.get_or_init(|| build_table(n))
    }
}

/// Convenience: encode a forward word into its 40-bit codeword.
pub fn encode_forward(word: &[u8]) -> Result<Vec<u8>> {
    BchCode::FORWARD.encode(word)
}

/// Convenience: decode a 48-bit reverse codeword.
pub fn decode_reverse(codeword: &[u8]) -> Result<Option<Decoded>> {
    BchCode::REVERSE.decode(codeword)
}

// Syndrome for every single and double error pattern within n bits.
fn build_table(n: usize) -> Vec<Option<u64>> {
    let mut table = vec![None; SYNDROME_SPACE];
    for i in 0..n {
        let single = 1u64 << i;
        table[remainder(single, n) as usize] = Some(single);
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let double = (1u64 << i) | (1u64 << j);
            let slot = &mut table[remainder(double, n) as usize];
            if slot.is_none() {
                *slot = Some(double);
            }
        }
    }
    table
}

// Remainder of an n-bit polynomial modulo the generator.
fn remainder(mut value: u64, n: usize) -> u64 {
    for degree in (PARITY_BITS..n).rev() {
        if (value >> degree) & 1 == 1 {
            value ^= GENERATOR << (degree - PARITY_BITS);
        }
    }
    value & ((1 << PARITY_BITS) - 1)
}

fn bits_to_u64(bits: &[u8]) -> Result<u64> {
    bits.iter().enumerate().try_fold(0u64, |acc, (position, &bit)| match bit {
        0 | 1 => Ok((acc << 1) | u64::from(bit)),
        value => Err(AmpsError::InvalidSymbol { value, position }),
    })
}

fn u64_to_bits(value: u64, width: usize) -> Vec<u8> {
    (0..width).rev().map(|shift| ((value >> shift) & 1) as u8).collect()
}
