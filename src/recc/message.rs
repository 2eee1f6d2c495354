//! Reverse control channel message grammar
//!
//! Word A is always decoded first. Without the extended address flag the
//! message kind is not one this engine handles and nothing more is read. With
//! it, word B selects the kind:
//!
//! | T | MSG_TYPE | ORDQ | ORDER | kind         |
//! |---|----------|------|-------|--------------|
//! | 0 | 0        | 0    | 0     | page response|
//! | 1 | any      | 0    | 13    | registration |
//! | 1 | 0        | 0    | 0     | origination  |
//!
//! Word A's NAWC counts the words that follow it and is authoritative. The
//! NAWC of later words should count down from it; a mismatch is only logged.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{MinCode, order};
use crate::{AmpsError, Result};

use super::burst::Burst;
use super::words::{CalledAddress, ReverseWord, SerialWord, WordA, WordB, WordHeader, WordPosition, min_of};

/// Largest NAWC accepted in word A.
pub const MAX_NAWC: u8 = 4;

/// Largest number of called-address words in an origination.
pub const MAX_CALLED_WORDS: usize = 4;

/// Identity fields common to every handled message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileIdentity {
    pub word_a: WordA,
    pub word_b: WordB,
    pub serial: Option<u32>,
}

impl MobileIdentity {
    pub fn min(&self) -> MinCode {
        min_of(&self.word_a, &self.word_b)
    }

    /// Ten digit MIN string.
    pub fn min_digits(&self) -> String {
        self.min().to_digits()
    }
}

/// A reverse control channel message this engine acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReverseMessage {
    PageResponse(MobileIdentity),
    Origination { mobile: MobileIdentity, digits: String },
    Registration(MobileIdentity),
}

impl ReverseMessage {
    pub fn mobile(&self) -> &MobileIdentity {
        match self {
            ReverseMessage::PageResponse(mobile)
            | ReverseMessage::Registration(mobile)
            | ReverseMessage::Origination { mobile, .. } => mobile,
        }
    }
}

/// Outcome of interpreting a decoded burst.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    Message(ReverseMessage),
    /// Word A without the extended address flag; word B was never read.
    NotExtended(WordA),
    /// Valid words with an order this engine does not handle.
    Unrecognized { word_a: WordA, word_b: WordB },
}

/// Interpret a burst, decoding only the words the grammar asks for.
///
/// Protocol violations (NAWC out of range, unreadable words, a burst too
/// short for the declared words) come back as recoverable errors.
pub fn interpret(burst: &mut Burst) -> Result<Interpretation> {
    let word_a: WordA = read(burst, 0, WordPosition::A)?;
    if !word_a.e {
        debug!(min1 = word_a.min1, "Word A without extended address, ignoring");
        return Ok(Interpretation::NotExtended(word_a));
    }
    if !(1..=MAX_NAWC).contains(&word_a.header.nawc) {
        return Err(AmpsError::malformed(format!("word A NAWC {} outside 1..={}", word_a.header.nawc, MAX_NAWC)));
    }

    let mut remaining = word_a.header.nawc;
    let word_b: WordB = read(burst, 1, WordPosition::B)?;
    check_countdown("B", &word_b.header, &mut remaining);

    let kind = classify(&word_a, &word_b);
    let Some(kind) = kind else {
        return Ok(Interpretation::Unrecognized { word_a, word_b });
    };

    let mut next = 2;
    let serial = if word_a.s {
        let word_c: SerialWord = read(burst, next, WordPosition::Serial)?;
        check_countdown("C", &word_c.header, &mut remaining);
        next += 1;
        Some(word_c.serial)
    } else {
        None
    };

    let mobile = MobileIdentity { word_a, word_b, serial };
    let message = match kind {
        Kind::PageResponse => ReverseMessage::PageResponse(mobile),
        Kind::Registration => ReverseMessage::Registration(mobile),
        Kind::Origination => {
            let called_words = usize::from(word_a.header.nawc)
                .checked_sub(1 + usize::from(word_a.s))
                .ok_or_else(|| {
                    AmpsError::malformed(format!(
                        "origination declares NAWC {} with S={} and no room for called-address words",
                        word_a.header.nawc,
                        u8::from(word_a.s)
                    ))
                })?;
            if !(1..=MAX_CALLED_WORDS).contains(&called_words) {
                return Err(AmpsError::malformed(format!(
                    "origination declares {} called-address words",
                    called_words
                )));
            }
            let mut digits = String::new();
            for index in next..next + called_words {
                let called: CalledAddress = read(burst, index, WordPosition::Called)?;
                check_countdown("called address", &called.header, &mut remaining);
                digits.push_str(&called.dialed());
            }
            ReverseMessage::Origination { mobile, digits }
        }
    };
    Ok(Interpretation::Message(message))
}

/// Decode word `index` and parse it with the layout for `position`.
fn read<W>(burst: &mut Burst, index: usize, position: WordPosition) -> Result<W>
where
    W: TryFrom<ReverseWord, Error = AmpsError>,
{
    W::try_from(ReverseWord::parse(position, burst.word(index)?))
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    PageResponse,
    Registration,
    Origination,
}

fn classify(word_a: &WordA, word_b: &WordB) -> Option<Kind> {
    match (word_a.t, word_b.ordq, word_b.order) {
        (false, _, _) if word_b.is_plain() => Some(Kind::PageResponse),
        (true, 0, order::REGISTRATION) => Some(Kind::Registration),
        (true, _, _) if word_b.is_plain() => Some(Kind::Origination),
        _ => None,
    }
}

fn check_countdown(word: &str, header: &WordHeader, remaining: &mut u8) {
    *remaining = remaining.saturating_sub(1);
    if header.nawc != *remaining {
        warn!(word, nawc = header.nawc, expected = *remaining, "NAWC disagrees with word A");
    }
    if header.first {
        warn!(word, "First-word flag set on a continuation word");
    }
}
