//! Reverse control channel burst layout and word extraction
//!
//! A mobile's transmission starts with 30 bits of dotting, the 11-bit word
//! sync and a 7-bit coded digital color code. Each message word follows as
//! five consecutive 48-bit BCH codewords. The acquisition search matches the
//! last 26 dotting bits plus word sync; the DCC and words are what this module
//! receives as a burst.

use tracing::{debug, trace};

use crate::codec::{BchCode, Decoded, line};
use crate::focc::frame::WORD_SYNC;
use crate::{AmpsError, Result};

/// Dotting bits included in the sync pattern.
pub const SYNC_DOTTING_BITS: usize = 26;

/// Bits in the sync pattern: dotting followed by word sync.
pub const SYNC_BITS: usize = SYNC_DOTTING_BITS + WORD_SYNC.len();

/// Chips in the line-coded sync pattern.
pub const SYNC_CHIPS: usize = 2 * SYNC_BITS;

/// Bits of the coded digital color code.
pub const CODED_DCC_BITS: usize = 7;

/// Bits in one reverse channel codeword.
pub const REVERSE_WORD_BITS: usize = 48;

/// Consecutive copies of every word.
pub const WORD_COPIES: usize = 5;

/// Coded DCC values for DCC 0 to 3.
pub const CODED_DCC: [[u8; CODED_DCC_BITS]; 4] =
    [[0, 0, 0, 0, 0, 0, 0], [0, 0, 1, 1, 1, 1, 1], [1, 1, 0, 0, 0, 1, 1], [1, 1, 1, 1, 1, 0, 0]];

/// Sync pattern bits: `1010…10` then `11100010010`.
pub fn sync_bits() -> Vec<u8> {
    let mut bits: Vec<u8> = (0..SYNC_DOTTING_BITS).map(|i| if i % 2 == 0 { 1 } else { 0 }).collect();
    bits.extend_from_slice(&WORD_SYNC);
    bits
}

/// Sync pattern as line-coded chips.
pub fn sync_chips() -> Vec<u8> {
    line::encode_chips(&sync_bits())
}

/// Bits following the sync pattern for a burst of `words` words.
pub fn burst_bits(words: usize) -> usize {
    CODED_DCC_BITS + words * WORD_COPIES * REVERSE_WORD_BITS
}

/// Chips following the sync pattern for a burst of `words` words.
pub fn burst_chips(words: usize) -> usize {
    2 * burst_bits(words)
}

/// Nearest DCC for a received coded DCC, with its Hamming distance.
pub fn decode_dcc(bits: &[u8]) -> (u8, u32) {
    let mut best = (0u8, u32::MAX);
    for (dcc, code) in CODED_DCC.iter().enumerate() {
        let distance = code.iter().zip(bits).filter(|(a, b)| *a != *b).count() as u32;
        if distance < best.1 {
            best = (dcc as u8, distance);
        }
    }
    best
}

/// A captured burst with lazily decoded words.
#[derive(Debug, Clone)]
pub struct Burst {
    bits: Vec<u8>,
    words: usize,
    dcc: u8,
    dcc_distance: u32,
    violations: usize,
    decoded: Vec<Option<Decoded>>,
    corrected_bits: u64,
    unreadable_words: u64,
}

impl Burst {
    /// Line-decode the chips that follow a sync pattern.
    pub fn from_chips(chips: &[u8], words: usize) -> Result<Self> {
        let expected = burst_chips(words);
        if chips.len() != expected {
            return Err(AmpsError::invariant(
                "burst capture",
                format!("expected {} chips for {} words, got {}", expected, words, chips.len()),
            ));
        }
        let mut bits = Vec::with_capacity(burst_bits(words));
        let violations = line::decode_chips(chips, &mut bits)?;
        Self::from_bits(bits, words, violations)
    }

    /// Wrap already line-decoded bits.
    pub fn from_bits(bits: Vec<u8>, words: usize, violations: usize) -> Result<Self> {
        if bits.len() != burst_bits(words) {
            return Err(AmpsError::invariant(
                "burst capture",
                format!("expected {} bits for {} words, got {}", burst_bits(words), words, bits.len()),
            ));
        }
        let (dcc, dcc_distance) = decode_dcc(&bits[..CODED_DCC_BITS]);
        if violations > 0 {
            trace!(violations, "Manchester violations in burst");
        }
        Ok(Self {
            bits,
            words,
            dcc,
            dcc_distance,
            violations,
            decoded: vec![None; words],
            corrected_bits: 0,
            unreadable_words: 0,
        })
    }

    pub fn dcc(&self) -> u8 {
        self.dcc
    }

    /// Bit errors in the received coded DCC.
    pub fn dcc_distance(&self) -> u32 {
        self.dcc_distance
    }

    /// Manchester violations seen while line-decoding.
    pub fn violations(&self) -> usize {
        self.violations
    }

    /// Word positions captured.
    pub fn word_capacity(&self) -> usize {
        self.words
    }

    /// Word positions decoded so far.
    pub fn words_decoded(&self) -> usize {
        self.decoded.iter().filter(|w| w.is_some()).count()
    }

    pub fn corrected_bits(&self) -> u64 {
        self.corrected_bits
    }

    pub fn unreadable_words(&self) -> u64 {
        self.unreadable_words
    }

    /// Decoded 36 information bits of word `index`.
    ///
    /// The five copies are tried in order and the first that decodes is
    /// kept. A word past the captured length is malformed; a word with no
    /// decodable copy is uncorrectable.
    pub fn word(&mut self, index: usize) -> Result<&[u8]> {
        if index >= self.words {
            return Err(AmpsError::malformed(format!(
                "message needs word {} but the burst holds {}",
                index + 1,
                self.words
            )));
        }
        if self.decoded[index].is_none() {
            let decoded = self.decode_copies(index)?;
            self.corrected_bits += u64::from(decoded.corrected);
            self.decoded[index] = Some(decoded);
        }
        match &self.decoded[index] {
            Some(decoded) => Ok(decoded.data.as_slice()),
            None => Err(AmpsError::invariant("burst word cache", "decoded word missing")),
        }
    }

    fn decode_copies(&mut self, index: usize) -> Result<Decoded> {
        let start = CODED_DCC_BITS + index * WORD_COPIES * REVERSE_WORD_BITS;
        for copy in 0..WORD_COPIES {
            let at = start + copy * REVERSE_WORD_BITS;
            if let Some(decoded) = BchCode::REVERSE.decode(&self.bits[at..at + REVERSE_WORD_BITS])? {
                if copy > 0 || decoded.corrected > 0 {
                    trace!(word = index, copy, corrected = decoded.corrected, "Word recovered");
                }
                return Ok(decoded);
            }
        }
        self.unreadable_words += 1;
        debug!(word = index, "No decodable copy");
        Err(AmpsError::Uncorrectable { word_index: index, copies: WORD_COPIES })
    }
}
