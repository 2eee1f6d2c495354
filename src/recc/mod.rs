//! Reverse control channel (mobile to base)
//!
//! Inbound chips pass through three stages:
//!
//! 1. [`AcquisitionBuffer`] finds the sync pattern and collects one burst.
//! 2. [`Burst`] line-decodes it and FEC-decodes word copies on demand.
//! 3. [`interpret`] applies the message grammar.
//!
//! [`ReverseControlChannel`] ties them together behind a single `ingest` call.

pub mod buffer;
pub mod burst;
mod channel;
pub mod message;
pub mod words;

pub use buffer::AcquisitionBuffer;
pub use burst::Burst;
pub use channel::{ReverseControlChannel, ReverseStats};
pub use message::{Interpretation, MobileIdentity, ReverseMessage, interpret};
pub use words::{CalledAddress, ReverseWord, SerialWord, WordA, WordB, WordHeader, WordPosition};
