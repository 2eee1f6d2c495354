//! Channel coding shared by both directions: BCH forward error correction and
//! the Manchester line code.

pub mod fec;
pub mod line;

pub use fec::{BchCode, Decoded};
pub use line::{PairDecision, decode_chips, decode_pair, encode_bit, encode_bits, encode_chips};
