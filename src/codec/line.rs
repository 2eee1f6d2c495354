//! Manchester line code
//!
//! Every bit is sent as two half-bit symbols of opposite polarity. On the
//! forward path the symbols are bipolar samples (`+1`/`-1`), each repeated
//! `oversampling` times. On the reverse path the demodulator hands over one
//! binary chip (0/1) per half bit.
//!
//! | bit | forward samples | reverse chips |
//! |-----|-----------------|---------------|
//! | 0   | `+1, -1`        | `1, 0`        |
//! | 1   | `-1, +1`        | `0, 1`        |

use crate::{AmpsError, Result};

/// Number of output samples produced for one bit.
pub fn samples_per_bit(oversampling: usize) -> usize {
    2 * oversampling
}

/// Append the sample pattern for one bit.
pub fn encode_bit(bit: u8, oversampling: usize, out: &mut Vec<i8>) {
    let (first, second) = if bit & 1 == 0 { (1i8, -1i8) } else { (-1i8, 1i8) };
    out.extend(std::iter::repeat_n(first, oversampling));
    out.extend(std::iter::repeat_n(second, oversampling));
}

/// Encode a run of bits into forward channel samples.
///
/// Each input byte must be 0 or 1; anything else is a defect in the caller's
/// word assembly.
pub fn encode_bits(bits: &[u8], oversampling: usize) -> Result<Vec<i8>> {
    let mut out = Vec::with_capacity(bits.len() * samples_per_bit(oversampling));
    for (position, &bit) in bits.iter().enumerate() {
        if bit > 1 {
            return Err(AmpsError::InvalidSymbol { value: bit, position });
        }
        encode_bit(bit, oversampling, &mut out);
    }
    Ok(out)
}

/// Encode bits into reverse channel chips (one chip per half bit).
pub fn encode_chips(bits: &[u8]) -> Vec<u8> {
    bits.iter().flat_map(|&bit| if bit & 1 == 0 { [1, 0] } else { [0, 1] }).collect()
}

/// Result of decoding one chip pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairDecision {
    /// Best-guess bit value.
    pub bit: u8,
    /// False when both chips carried the same level.
    pub valid: bool,
}

/// Decode one pair of reverse channel chips.
///
/// A pair with equal chips is a line-code violation: the bit is still
/// guessed (`11` reads as 0, `00` as 1) and flagged invalid.
pub fn decode_pair(first: u8, second: u8) -> PairDecision {
    match (first & 1, second & 1) {
        (1, 0) => PairDecision { bit: 0, valid: true },
        (0, 1) => PairDecision { bit: 1, valid: true },
        (1, 1) => PairDecision { bit: 0, valid: false },
        _ => PairDecision { bit: 1, valid: false },
    }
}

/// Decode a chip buffer into bits, returning the number of violations.
///
/// `chips` must hold an even number of 0/1 values. Bits are appended to `out`.
pub fn decode_chips(chips: &[u8], out: &mut Vec<u8>) -> Result<usize> {
    if chips.len() % 2 != 0 {
        return Err(AmpsError::invariant(
            "Manchester decode",
            format!("odd chip count {}", chips.len()),
        ));
    }
    let mut violations = 0;
    for (pair_index, pair) in chips.chunks_exact(2).enumerate() {
        for (offset, &chip) in pair.iter().enumerate() {
            if chip > 1 {
                return Err(AmpsError::InvalidSymbol { value: chip, position: pair_index * 2 + offset });
            }
        }
        let decision = decode_pair(pair[0], pair[1]);
        if !decision.valid {
            violations += 1;
        }
        out.push(decision.bit);
    }
    Ok(violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn forward_patterns() {
        let mut out = Vec::new();
        encode_bit(0, 2, &mut out);
        encode_bit(1, 2, &mut out);
        assert_eq!(out, vec![1, 1, -1, -1, -1, -1, 1, 1]);
    }

    #[test]
    fn encode_bits_rejects_non_bits() {
        let err = encode_bits(&[0, 1, 3], 1).unwrap_err();
        assert!(matches!(err, AmpsError::InvalidSymbol { value: 3, position: 2 }));
    }

    #[test]
    fn ambiguous_pairs_are_flagged() {
        assert_eq!(decode_pair(1, 1), PairDecision { bit: 0, valid: false });
        assert_eq!(decode_pair(0, 0), PairDecision { bit: 1, valid: false });
    }

    #[test]
    fn decode_counts_violations() -> anyhow::Result<()> {
        let mut bits = Vec::new();
        let violations = decode_chips(&[1, 0, 1, 1, 0, 1, 0, 0], &mut bits)?;
        assert_eq!(bits, vec![0, 0, 1, 1]);
        assert_eq!(violations, 2);
        Ok(())
    }

    #[test]
    fn decode_rejects_bad_chips() {
        let mut bits = Vec::new();
        assert!(decode_chips(&[1, 0, 1], &mut bits).is_err());
        let err = decode_chips(&[1, 0, 0, 2], &mut bits).unwrap_err();
        assert!(matches!(err, AmpsError::InvalidSymbol { value: 2, position: 3 }));
    }

    proptest! {
        #[test]
        fn chip_round_trip(bits in prop::collection::vec(0u8..=1, 0..256)) {
            let chips = encode_chips(&bits);
            let mut decoded = Vec::new();
            let violations = decode_chips(&chips, &mut decoded).unwrap();
            prop_assert_eq!(violations, 0);
            prop_assert_eq!(decoded, bits);
        }

        #[test]
        fn forward_samples_are_balanced(bit in 0u8..=1, oversampling in 1usize..8) {
            let mut out = Vec::new();
            encode_bit(bit, oversampling, &mut out);
            prop_assert_eq!(out.len(), samples_per_bit(oversampling));
            prop_assert_eq!(out.iter().map(|&s| i32::from(s)).sum::<i32>(), 0);
            // First half sign recovers the bit.
            prop_assert_eq!(out[0] < 0, bit == 1);
        }
    }
}
