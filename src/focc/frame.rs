//! Forward control channel frames and their segments
//!
//! A frame is one 463-bit repetition cycle of the FOCC: dotting and word sync,
//! then five repeats of the A and B stream words, with a busy/idle bit before
//! every ten message bits. Each word's 40-bit codeword goes out in two bursts
//! of twenty bits, and every burst is closed by an [`Segment::End`] marker.

use crate::codec::{BchCode, line};
use crate::types::ForwardWord;
use crate::Result;

use super::words::CONTROL_FILLER;

/// Bits in one forward control channel frame.
pub const FRAME_BITS: usize = 463;

/// Dotting sequence at the start of every frame.
pub const DOTTING: [u8; 10] = [1, 0, 1, 0, 1, 0, 1, 0, 1, 0];

/// Word sync sequence, shared with the reverse and voice channels.
pub const WORD_SYNC: [u8; 11] = [1, 1, 1, 0, 0, 0, 1, 0, 0, 1, 0];

/// Times each word pair is repeated in a frame.
pub const WORD_REPEATS: usize = 5;

/// Message bits between two busy/idle bits.
const BI_SPACING: usize = 10;

/// One span of a burst.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A busy/idle bit. Its samples are chosen when the segment starts.
    BusyIdle,
    /// Pre-encoded line samples for a run of message bits.
    Message(Vec<i8>),
    /// Burst boundary; carries no samples.
    End,
}

impl Segment {
    /// Line-code `bits` into a message segment.
    pub fn message(bits: &[u8], oversampling: usize) -> Result<Self> {
        Ok(Segment::Message(line::encode_bits(bits, oversampling)?))
    }

    /// Number of samples this segment emits.
    pub fn sample_len(&self, oversampling: usize) -> usize {
        match self {
            Segment::BusyIdle => line::samples_per_bit(oversampling),
            Segment::Message(samples) => samples.len(),
            Segment::End => 0,
        }
    }
}

/// Samples for a busy/idle bit: idle (1) and busy (0) follow the data bit coding.
pub fn busy_idle_samples(bit: u8, oversampling: usize) -> Vec<i8> {
    let mut out = Vec::with_capacity(line::samples_per_bit(oversampling));
    line::encode_bit(bit, oversampling, &mut out);
    out
}

/// A complete frame carrying one word per stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    segments: Vec<Segment>,
    ephemeral: bool,
    filler: bool,
}

impl Frame {
    /// Build a frame from the stream A and stream B words.
    pub fn build(
        word_a: &ForwardWord,
        word_b: &ForwardWord,
        ephemeral: bool,
        filler: bool,
        oversampling: usize,
    ) -> Result<Self> {
        let coded_a = BchCode::FORWARD.encode(word_a)?;
        let coded_b = BchCode::FORWARD.encode(word_b)?;

        let mut segments = Vec::with_capacity(5 + WORD_REPEATS * 20);
        segments.push(Segment::BusyIdle);
        segments.push(Segment::message(&DOTTING, oversampling)?);
        segments.push(Segment::BusyIdle);
        segments.push(Segment::message(&WORD_SYNC, oversampling)?);
        segments.push(Segment::End);

        for _ in 0..WORD_REPEATS {
            for coded in [&coded_a, &coded_b] {
                for half in coded.chunks(2 * BI_SPACING) {
                    for run in half.chunks(BI_SPACING) {
                        segments.push(Segment::BusyIdle);
                        segments.push(Segment::message(run, oversampling)?);
                    }
                    segments.push(Segment::End);
                }
            }
        }

        Ok(Self { segments, ephemeral, filler })
    }

    /// A permanent frame of the superframe schedule.
    pub fn scheduled(word_a: &ForwardWord, word_b: &ForwardWord, oversampling: usize) -> Result<Self> {
        Self::build(word_a, word_b, false, false, oversampling)
    }

    /// A filler frame, replaceable by injected traffic.
    pub fn filler(oversampling: usize) -> Result<Self> {
        Self::build(&CONTROL_FILLER, &CONTROL_FILLER, false, true, oversampling)
    }

    /// A one-shot frame for the inject queue.
    pub fn ephemeral(word_a: &ForwardWord, word_b: &ForwardWord, oversampling: usize) -> Result<Self> {
        Self::build(word_a, word_b, true, false, oversampling)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    pub fn is_filler(&self) -> bool {
        self.filler
    }

    /// Total samples emitted for this frame.
    pub fn sample_len(&self, oversampling: usize) -> usize {
        self.segments.iter().map(|s| s.sample_len(oversampling)).sum()
    }
}
