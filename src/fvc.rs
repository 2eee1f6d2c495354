//! Forward voice channel blank-and-burst signalling
//!
//! While a call is being set up the voice channel carries control words
//! instead of audio. Each word is sent as a long dotting run followed by
//! eleven repeats of word sync and the 40-bit BCH codeword, with short dotting
//! between repeats. The loaded batch is replayed until it is replaced.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::bus::{Bus, BusMessage};
use crate::codec::{BchCode, line};
use crate::focc::frame::WORD_SYNC;
use crate::types::{ControlEvent, ForwardWord, VoiceWords};
use crate::Result;

/// Dotting bits ahead of each word.
pub const LEADING_DOTTING_BITS: usize = 101;

/// Dotting bits between repeats of a word.
pub const REPEAT_DOTTING_BITS: usize = 37;

/// Times each word is repeated.
pub const WORD_REPEATS: usize = 11;

fn dotting(len: usize) -> impl Iterator<Item = u8> {
    (0..len).map(|i| if i % 2 == 0 { 1 } else { 0 })
}

/// Line bits for one pass over `words`.
pub fn batch_bits(words: &[ForwardWord]) -> Result<Vec<u8>> {
    let mut bits = Vec::new();
    for word in words {
        let coded = BchCode::FORWARD.encode(word)?;
        bits.extend(dotting(LEADING_DOTTING_BITS));
        for repeat in 0..WORD_REPEATS {
            bits.extend_from_slice(&WORD_SYNC);
            bits.extend_from_slice(&coded);
            if repeat + 1 < WORD_REPEATS {
                bits.extend(dotting(REPEAT_DOTTING_BITS));
            }
        }
    }
    Ok(bits)
}

/// A batch encoded into samples, ready to install.
#[derive(Debug, Clone)]
struct EncodedBatch {
    samples: Vec<i8>,
    countdown: Option<u32>,
    words: usize,
}

impl EncodedBatch {
    fn encode(batch: &VoiceWords, oversampling: usize) -> Result<Self> {
        let bits = batch_bits(&batch.words)?;
        Ok(Self {
            samples: line::encode_bits(&bits, oversampling)?,
            countdown: batch.countdown.filter(|&n| n > 0),
            words: batch.words.len(),
        })
    }
}

/// Cloneable handle for replacing the batch from another thread.
///
/// The batch is encoded by the caller; the channel picks it up at the start
/// of its next pull.
#[derive(Debug, Clone)]
pub struct VoiceLoader {
    slot: Arc<Mutex<Option<EncodedBatch>>>,
    oversampling: usize,
}

impl VoiceLoader {
    fn lock(&self) -> MutexGuard<'_, Option<EncodedBatch>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn load(&self, batch: &VoiceWords) -> Result<()> {
        let encoded = EncodedBatch::encode(batch, self.oversampling)?;
        *self.lock() = Some(encoded);
        Ok(())
    }

    fn take(&self) -> Option<EncodedBatch> {
        self.lock().take()
    }
}

/// Pull-driven sample source for the forward voice channel.
#[derive(Debug)]
pub struct ForwardVoiceChannel {
    oversampling: usize,
    batch: Vec<i8>,
    offset: usize,
    countdown: Option<u32>,
    batches_started: u64,
    switched_off: bool,
    loader: VoiceLoader,
    bus: Option<Bus>,
}

impl ForwardVoiceChannel {
    pub fn new(oversampling: usize) -> Self {
        let oversampling = oversampling.max(1);
        Self {
            oversampling,
            batch: Vec::new(),
            offset: 0,
            countdown: None,
            batches_started: 0,
            switched_off: false,
            loader: VoiceLoader { slot: Arc::new(Mutex::new(None)), oversampling },
            bus: None,
        }
    }

    /// Publish control events on `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn loader(&self) -> VoiceLoader {
        self.loader.clone()
    }

    /// Replace the current batch. Transmission restarts from the first word.
    pub fn load(&mut self, batch: &VoiceWords) -> Result<()> {
        let encoded = EncodedBatch::encode(batch, self.oversampling)?;
        self.install(encoded);
        Ok(())
    }

    fn install(&mut self, encoded: EncodedBatch) {
        info!(words = encoded.words, countdown = ?encoded.countdown, "Voice channel batch loaded");
        self.batch = encoded.samples;
        self.countdown = encoded.countdown;
        self.offset = 0;
        self.switched_off = false;
    }

    /// Stop sending; subsequent pulls return 0.
    pub fn clear(&mut self) {
        self.batch.clear();
        self.offset = 0;
        self.countdown = None;
    }

    /// Fill `out` with batch samples, wrapping around at the end of the batch.
    /// Returns 0 when no batch is loaded.
    pub fn pull(&mut self, out: &mut [i8]) -> usize {
        if let Some(encoded) = self.loader.take() {
            self.install(encoded);
        }
        if self.batch.is_empty() {
            return 0;
        }
        let mut written = 0;
        while written < out.len() {
            if self.offset == 0 {
                self.start_batch();
            }
            let n = (out.len() - written).min(self.batch.len() - self.offset);
            out[written..written + n].copy_from_slice(&self.batch[self.offset..self.offset + n]);
            written += n;
            self.offset += n;
            if self.offset == self.batch.len() {
                self.offset = 0;
            }
        }
        written
    }

    fn start_batch(&mut self) {
        self.batches_started += 1;
        let Some(remaining) = self.countdown.as_mut() else {
            return;
        };
        *remaining -= 1;
        if *remaining == 0 {
            self.countdown = None;
            self.switched_off = true;
            debug!(batches = self.batches_started, "Voice channel countdown expired");
            if let Some(bus) = &self.bus {
                bus.publish(BusMessage::Control(ControlEvent::VoiceChannelMuted(true)));
            }
        }
    }

    /// Samples in one pass over the loaded batch.
    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    pub fn batches_started(&self) -> u64 {
        self.batches_started
    }

    /// Batch repetitions left before the channel is switched off.
    pub fn countdown(&self) -> Option<u32> {
        self.countdown
    }

    /// The countdown of the current batch has expired.
    pub fn is_switched_off(&self) -> bool {
        self.switched_off
    }
}
