//! Forward control channel (base station to mobile).
//!
//! The channel is built bottom-up:
//! - [`words`] assembles the 28-bit control words
//! - [`frame`] BCH-codes a word pair and splits it into busy/idle interleaved
//!   segments of Manchester samples
//! - [`superframe`] lays the frames out in the cyclic overhead schedule and
//!   checks the per-cycle symbol count
//! - [`schedule`] is the burst state machine walking that schedule
//! - [`channel`] wraps it in the pull interface and the inject queue

pub mod channel;
pub mod frame;
pub mod schedule;
pub mod superframe;
pub mod words;

pub use channel::{ForwardControlChannel, FrameInjector, InjectQueue};
pub use frame::{FRAME_BITS, Frame, Segment};
pub use schedule::{BurstState, Cursor, Fill, ForwardStats, Scheduler};
pub use superframe::{Superframe, SuperframeLayout};
