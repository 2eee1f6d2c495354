//! Test utilities for synthesizing reverse bursts and inspecting forward output
//!
//! Compiled for unit tests and benches only.

#![cfg(any(test, feature = "benchmark"))]

use crate::codec::{BchCode, line};
use crate::recc::burst::{CODED_DCC, Burst, WORD_COPIES, sync_chips};
use crate::recc::words::{CalledAddress, REVERSE_INFO_BITS, SerialWord, WordA, WordB, WordHeader};
use crate::types::{MinCode, bitfield, order};
use crate::Result;

/// Codeword positions flipped to make a copy undecodable.
///
/// The syndrome of this three-bit pattern is outside the one- and two-bit
/// correction table of the (48,36) code.
pub const UNCORRECTABLE_FLIPS: [usize; 3] = [0, 1, 2];

/// Builds the line-coded chips of a reverse channel transmission.
#[derive(Debug, Clone)]
pub struct BurstBuilder {
    words: usize,
    dcc: u8,
    payload: Vec<Vec<u8>>,
    corrupt: Vec<usize>,
}

impl BurstBuilder {
    /// A burst of `words` word positions; positions without a payload word
    /// carry all-zero information bits.
    pub fn new(words: usize) -> Self {
        Self { words, dcc: 0, payload: Vec::new(), corrupt: vec![0; words] }
    }

    pub fn dcc(mut self, dcc: u8) -> Self {
        self.dcc = dcc;
        self
    }

    /// Append the next word's 36 information bits.
    pub fn word(mut self, bits: &[u8]) -> Self {
        assert_eq!(bits.len(), REVERSE_INFO_BITS);
        assert!(self.payload.len() < self.words, "more payload words than positions");
        self.payload.push(bits.to_vec());
        self
    }

    /// Make the first `copies` copies of word `index` undecodable.
    pub fn corrupt_copies(mut self, index: usize, copies: usize) -> Self {
        self.corrupt[index] = copies.min(WORD_COPIES);
        self
    }

    /// Coded DCC and word copies, one bit per byte.
    pub fn bits(&self) -> Vec<u8> {
        let zero = vec![0u8; REVERSE_INFO_BITS];
        let mut bits = CODED_DCC[usize::from(self.dcc)].to_vec();
        for index in 0..self.words {
            let info = self.payload.get(index).unwrap_or(&zero);
            let codeword = BchCode::REVERSE.encode(info).expect("payload words are 36 bits");
            for copy in 0..WORD_COPIES {
                let mut sent = codeword.clone();
                if copy < self.corrupt[index] {
                    for flip in UNCORRECTABLE_FLIPS {
                        sent[flip] ^= 1;
                    }
                }
                bits.extend_from_slice(&sent);
            }
        }
        bits
    }

    /// Chips that follow the sync pattern.
    pub fn chips_without_sync(&self) -> Vec<u8> {
        line::encode_chips(&self.bits())
    }

    /// Sync pattern followed by the burst.
    pub fn chips(&self) -> Vec<u8> {
        let mut chips = sync_chips();
        chips.extend(self.chips_without_sync());
        chips
    }
}

/// Word A of a mobile with `min`, extended address set.
pub fn word_a(min: &str, nawc: u8) -> WordA {
    let code = MinCode::parse(min).expect("test MIN is valid");
    WordA { header: WordHeader { first: true, nawc }, t: false, s: false, e: true, er: false, scm: 0, min1: code.min1 }
}

/// Plain word B of a mobile with `min`.
pub fn word_b(min: &str, nawc: u8) -> WordB {
    let code = MinCode::parse(min).expect("test MIN is valid");
    WordB {
        header: WordHeader { first: false, nawc },
        msg_type: 0,
        ordq: 0,
        order: 0,
        lt: false,
        ep: false,
        scm4: false,
        mpci: 0,
        sdcc1: 0,
        sdcc2: 0,
        min2: code.min2,
    }
}

/// Builds well-formed (or deliberately broken) reverse messages.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    words: Vec<Vec<u8>>,
    corrupt: Vec<usize>,
    dcc: u8,
}

impl MessageBuilder {
    pub fn from_words(words: Vec<Vec<u8>>) -> Self {
        Self { words, corrupt: Vec::new(), dcc: 0 }
    }

    pub fn page_response(min: &str) -> Self {
        Self::from_words(vec![word_a(min, 1).to_bits(), word_b(min, 0).to_bits()])
    }

    pub fn registration(min: &str, serial: u32) -> Self {
        let a = WordA { t: true, s: true, ..word_a(min, 2) };
        let b = WordB { order: order::REGISTRATION, ..word_b(min, 1) };
        let c = SerialWord { header: WordHeader { first: false, nawc: 0 }, serial };
        Self::from_words(vec![a.to_bits(), b.to_bits(), c.to_bits()])
    }

    /// Origination dialing `dialed`; characters without a digit code are
    /// dropped and the rest split eight per called-address word.
    pub fn origination(min: &str, serial: Option<u32>, dialed: &str) -> Self {
        let dialable: Vec<char> = dialed.chars().filter(|c| matches!(c, '1'..='9' | '*' | '#')).collect();
        let called: Vec<String> = dialable.chunks(8).map(|chunk| chunk.iter().collect()).collect();
        let nawc = (1 + usize::from(serial.is_some()) + called.len()) as u8;

        let a = WordA { t: true, s: serial.is_some(), ..word_a(min, nawc) };
        let mut remaining = nawc - 1;
        let mut words = vec![a.to_bits(), word_b(min, remaining).to_bits()];
        if let Some(serial) = serial {
            remaining -= 1;
            words.push(SerialWord { header: WordHeader { first: false, nawc: remaining }, serial }.to_bits());
        }
        for digits in &called {
            remaining = remaining.saturating_sub(1);
            words.push(CalledAddress::from_digits(WordHeader { first: false, nawc: remaining }, digits).to_bits());
        }
        Self::from_words(words)
    }

    /// Overwrite word A's NAWC field.
    pub fn nawc(mut self, nawc: u8) -> Self {
        bitfield::pack(&mut self.words[0], 1, 3, u64::from(nawc));
        self
    }

    pub fn dcc(mut self, dcc: u8) -> Self {
        self.dcc = dcc;
        self
    }

    /// Make every copy of word `index` undecodable.
    pub fn corrupt_word(mut self, index: usize) -> Self {
        self.corrupt.push(index);
        self
    }

    /// Burst builder with `positions` word positions.
    pub fn builder(&self, positions: usize) -> BurstBuilder {
        let mut builder = BurstBuilder::new(positions).dcc(self.dcc);
        for word in &self.words {
            builder = builder.word(word);
        }
        for &index in &self.corrupt {
            builder = builder.corrupt_copies(index, WORD_COPIES);
        }
        builder
    }

    /// Sync pattern and burst as chips.
    pub fn chips(&self, positions: usize) -> Vec<u8> {
        self.builder(positions).chips()
    }

    /// The burst as the acquisition stage would hand it over.
    pub fn burst(&self, positions: usize) -> Result<Burst> {
        Burst::from_chips(&self.builder(positions).chips_without_sync(), positions)
    }
}

/// Recover line bits from forward samples: a positive first half-bit is 0.
pub fn samples_to_bits(samples: &[i8], oversampling: usize) -> Vec<u8> {
    samples.chunks_exact(2 * oversampling).map(|bit| if bit[0] > 0 { 0 } else { 1 }).collect()
}
