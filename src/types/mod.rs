//! Core value types shared by the forward and reverse engines.
//!
//! Bits are carried one per byte (values 0 and 1 only) so that word layouts can
//! be written as field tables over plain arrays:
//! - [`bitfield`] packs and unpacks fixed-width fields MSB first
//! - [`MinCode`] converts between MIN digit strings and the MIN1/MIN2 fields
//! - [`StreamSelector`], [`OutboundWords`], [`VoiceWords`], [`ControlEvent`] and
//!   [`DecodeEvent`] are the payloads routed over the message bus
//! - [`ChannelStatus`] is the busy/idle cell shared by both engines
//!
//! ```rust
//! use amps_control::types::{bitfield, MinCode};
//!
//! let code = MinCode::parse("2125551234").unwrap();
//! let mut word = [0u8; 28];
//! bitfield::pack(&mut word, 4, 24, u64::from(code.min1));
//! assert_eq!(bitfield::unpack(&word, 4, 24), u64::from(code.min1));
//! ```

pub mod bitfield;
mod event;
mod min;
mod status;
mod stream;

pub use event::{ControlEvent, DecodeEvent, OutboundWords, VoiceWords};
pub use min::{MIN_DIGITS, MinCode, min_to_words, words_to_min};
pub use status::ChannelStatus;
pub use stream::StreamSelector;

/// Information bits in a forward control word.
pub const FORWARD_WORD_BITS: usize = 28;

/// A 28-bit forward control word, one bit per byte.
pub type ForwardWord = [u8; FORWARD_WORD_BITS];

/// Order field values used by this engine (EIA-553 table 3.7.1-1).
pub mod order {
    /// Page on the forward channel, page response on the reverse channel.
    pub const PAGE: u8 = 0;
    pub const ALERT: u8 = 1;
    pub const REGISTRATION: u8 = 13;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn pack_then_unpack_recovers_value(
            start in 0usize..28,
            width in 1usize..=28,
            value in any::<u64>(),
          ) {
            prop_assume!(start + width <= FORWARD_WORD_BITS);
            let mut word: ForwardWord = [0; FORWARD_WORD_BITS];
            bitfield::pack(&mut word, start, width, value);
            let mask = if width == 64 { u64::MAX } else { (1u64 << width) - 1 };
            prop_assert_eq!(bitfield::unpack(&word, start, width), value & mask);
          }

          #[test]
          fn pack_leaves_other_bits_alone(
            start in 0usize..28,
            width in 1usize..=28,
            value in any::<u64>(),
          ) {
            prop_assume!(start + width <= FORWARD_WORD_BITS);
            let mut word: ForwardWord = [1; FORWARD_WORD_BITS];
            bitfield::pack(&mut word, start, width, value);
            for (i, &bit) in word.iter().enumerate() {
              if i < start || i >= start + width {
                prop_assert_eq!(bit, 1);
              }
            }
          }
        }
    }
}
