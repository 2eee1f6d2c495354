//! Reverse control channel word layouts (EIA-553 2.7.1)
//!
//! Every word opens with the first-word flag `F` and the count of additional
//! words coming (`NAWC`). What follows depends on the word's position in the
//! message, so callers pick the layout with [`WordPosition`].

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{MinCode, bitfield};
use crate::{AmpsError, Result};

/// Information bits in a reverse control word.
pub const REVERSE_INFO_BITS: usize = 36;

/// Layout selector for a message word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordPosition {
    /// Abbreviated address word.
    A,
    /// Extended address word.
    B,
    /// Serial number word.
    Serial,
    /// Called-address (dialed digits) word.
    Called,
}

/// Fields common to all reverse words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordHeader {
    pub first: bool,
    pub nawc: u8,
}

impl WordHeader {
    fn parse(bits: &[u8]) -> Self {
        Self { first: bitfield::flag(bits, 0), nawc: bitfield::unpack(bits, 1, 3) as u8 }
    }

    fn pack(&self, bits: &mut [u8]) {
        bitfield::pack(bits, 0, 1, u64::from(self.first));
        bitfield::pack(bits, 1, 3, u64::from(self.nawc));
    }
}

/// Word A: abbreviated address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordA {
    pub header: WordHeader,
    /// Set for originations and orders, clear for responses.
    pub t: bool,
    /// Serial number word follows.
    pub s: bool,
    /// Extended address word follows.
    pub e: bool,
    /// Extended protocol reverse channel.
    pub er: bool,
    /// Station class mark, bits 3-0.
    pub scm: u8,
    pub min1: u32,
}

impl WordA {
    pub fn parse(bits: &[u8]) -> Self {
        Self {
            header: WordHeader::parse(bits),
            t: bitfield::flag(bits, 4),
            s: bitfield::flag(bits, 5),
            e: bitfield::flag(bits, 6),
            er: bitfield::flag(bits, 7),
            scm: bitfield::unpack(bits, 8, 4) as u8,
            min1: bitfield::unpack(bits, 12, 24) as u32,
        }
    }

    pub fn to_bits(&self) -> Vec<u8> {
        let mut bits = vec![0u8; REVERSE_INFO_BITS];
        self.header.pack(&mut bits);
        bitfield::pack(&mut bits, 4, 1, u64::from(self.t));
        bitfield::pack(&mut bits, 5, 1, u64::from(self.s));
        bitfield::pack(&mut bits, 6, 1, u64::from(self.e));
        bitfield::pack(&mut bits, 7, 1, u64::from(self.er));
        bitfield::pack(&mut bits, 8, 4, u64::from(self.scm));
        bitfield::pack(&mut bits, 12, 24, u64::from(self.min1));
        bits
    }
}

/// Word B: extended address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordB {
    pub header: WordHeader,
    /// Local control / message type.
    pub msg_type: u8,
    /// Order qualifier.
    pub ordq: u8,
    pub order: u8,
    /// Last-try flag.
    pub lt: bool,
    /// Extended protocol capable.
    pub ep: bool,
    /// Station class mark bit 4.
    pub scm4: bool,
    /// Dual-mode capability indicator.
    pub mpci: u8,
    pub sdcc1: u8,
    pub sdcc2: u8,
    pub min2: u16,
}

impl WordB {
    pub fn parse(bits: &[u8]) -> Self {
        Self {
            header: WordHeader::parse(bits),
            msg_type: bitfield::unpack(bits, 4, 5) as u8,
            ordq: bitfield::unpack(bits, 9, 3) as u8,
            order: bitfield::unpack(bits, 12, 5) as u8,
            lt: bitfield::flag(bits, 17),
            ep: bitfield::flag(bits, 18),
            scm4: bitfield::flag(bits, 19),
            mpci: bitfield::unpack(bits, 20, 2) as u8,
            sdcc1: bitfield::unpack(bits, 22, 2) as u8,
            sdcc2: bitfield::unpack(bits, 24, 2) as u8,
            min2: bitfield::unpack(bits, 26, 10) as u16,
        }
    }

    pub fn to_bits(&self) -> Vec<u8> {
        let mut bits = vec![0u8; REVERSE_INFO_BITS];
        self.header.pack(&mut bits);
        bitfield::pack(&mut bits, 4, 5, u64::from(self.msg_type));
        bitfield::pack(&mut bits, 9, 3, u64::from(self.ordq));
        bitfield::pack(&mut bits, 12, 5, u64::from(self.order));
        bitfield::pack(&mut bits, 17, 1, u64::from(self.lt));
        bitfield::pack(&mut bits, 18, 1, u64::from(self.ep));
        bitfield::pack(&mut bits, 19, 1, u64::from(self.scm4));
        bitfield::pack(&mut bits, 20, 2, u64::from(self.mpci));
        bitfield::pack(&mut bits, 22, 2, u64::from(self.sdcc1));
        bitfield::pack(&mut bits, 24, 2, u64::from(self.sdcc2));
        bitfield::pack(&mut bits, 26, 10, u64::from(self.min2));
        bits
    }

    /// True when message type, qualifier and order are all zero.
    pub fn is_plain(&self) -> bool {
        self.msg_type == 0 && self.ordq == 0 && self.order == 0
    }
}

/// Word C: electronic serial number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialWord {
    pub header: WordHeader,
    pub serial: u32,
}

impl SerialWord {
    pub fn parse(bits: &[u8]) -> Self {
        Self { header: WordHeader::parse(bits), serial: bitfield::unpack(bits, 4, 32) as u32 }
    }

    pub fn to_bits(&self) -> Vec<u8> {
        let mut bits = vec![0u8; REVERSE_INFO_BITS];
        self.header.pack(&mut bits);
        bitfield::pack(&mut bits, 4, 32, u64::from(self.serial));
        bits
    }
}

/// Called-address word: eight packed 4-bit dialed digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalledAddress {
    pub header: WordHeader,
    pub digits: u32,
}

impl CalledAddress {
    pub fn parse(bits: &[u8]) -> Self {
        Self { header: WordHeader::parse(bits), digits: bitfield::unpack(bits, 4, 32) as u32 }
    }

    /// Pack up to eight dialed characters (`0`-`9`, `*`, `#`).
    ///
    /// Unused nibbles are zero, which ends the digit string. Characters
    /// without a nibble of their own (including `0`) are skipped.
    pub fn from_digits(header: WordHeader, dialed: &str) -> Self {
        let mut digits = 0u32;
        let mut count = 0;
        for c in dialed.chars() {
            let nibble = match c {
                '1'..='9' => c as u32 - '0' as u32,
                '*' => 10,
                '#' => 11,
                _ => continue,
            };
            if count == 8 {
                break;
            }
            digits |= nibble << (28 - 4 * count);
            count += 1;
        }
        Self { header, digits }
    }

    pub fn to_bits(&self) -> Vec<u8> {
        let mut bits = vec![0u8; REVERSE_INFO_BITS];
        self.header.pack(&mut bits);
        bitfield::pack(&mut bits, 4, 32, u64::from(self.digits));
        bits
    }

    /// Unpack dialed characters, most significant nibble first.
    ///
    /// Nibble 0 ends the string. Nibbles 12 to 15 are not dialable; they also
    /// end the string, with a warning.
    pub fn dialed(&self) -> String {
        let mut out = String::with_capacity(8);
        for i in 0..8 {
            let nibble = (self.digits >> (28 - 4 * i)) & 0xf;
            let c = match nibble {
                0 => break,
                1..=9 => char::from(b'0' + nibble as u8),
                10 => '*',
                11 => '#',
                invalid => {
                    warn!(nibble = invalid, position = i, "Invalid dialed digit encoding, truncating");
                    break;
                }
            };
            out.push(c);
        }
        out
    }
}

/// A parsed reverse word of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReverseWord {
    A(WordA),
    B(WordB),
    Serial(SerialWord),
    Called(CalledAddress),
}

impl ReverseWord {
    /// Parse 36 information bits with the layout for `position`.
    pub fn parse(position: WordPosition, bits: &[u8]) -> Self {
        match position {
            WordPosition::A => ReverseWord::A(WordA::parse(bits)),
            WordPosition::B => ReverseWord::B(WordB::parse(bits)),
            WordPosition::Serial => ReverseWord::Serial(SerialWord::parse(bits)),
            WordPosition::Called => ReverseWord::Called(CalledAddress::parse(bits)),
        }
    }

    pub fn header(&self) -> WordHeader {
        match self {
            ReverseWord::A(w) => w.header,
            ReverseWord::B(w) => w.header,
            ReverseWord::Serial(w) => w.header,
            ReverseWord::Called(w) => w.header,
        }
    }

    pub fn position(&self) -> WordPosition {
        match self {
            ReverseWord::A(_) => WordPosition::A,
            ReverseWord::B(_) => WordPosition::B,
            ReverseWord::Serial(_) => WordPosition::Serial,
            ReverseWord::Called(_) => WordPosition::Called,
        }
    }
}

macro_rules! impl_word_layout {
    ($($variant:ident => $word:ty),* $(,)?) => {
        $(
            impl TryFrom<ReverseWord> for $word {
                type Error = AmpsError;

                fn try_from(word: ReverseWord) -> Result<Self> {
                    match word {
                        ReverseWord::$variant(inner) => Ok(inner),
                        other => Err(AmpsError::invariant(
                            "reverse word layout",
                            format!("expected {:?} word, parsed {:?}", WordPosition::$variant, other.position()),
                        )),
                    }
                }
            }
        )*
    };
}

impl_word_layout! {
    A => WordA,
    B => WordB,
    Serial => SerialWord,
    Called => CalledAddress,
}

/// MIN carried by a word A / word B pair.
pub fn min_of(word_a: &WordA, word_b: &WordB) -> MinCode {
    MinCode::from_fields(u64::from(word_a.min1), u64::from(word_b.min2))
}
