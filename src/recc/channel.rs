//! Push-driven reverse control channel decoder

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::ReverseConfig;
use crate::types::ChannelStatus;
use crate::{AmpsError, Result};

use super::buffer::AcquisitionBuffer;
use super::burst::{Burst, burst_chips, sync_chips};
use super::message::{Interpretation, ReverseMessage, interpret};

/// Link quality and decode counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReverseStats {
    pub bursts_detected: u64,
    pub bursts_decoded: u64,
    pub bursts_dropped: u64,
    pub line_violations: u64,
    pub fec_corrected_bits: u64,
    pub unreadable_words: u64,
}

/// Reverse control channel: finds bursts in the inbound chip stream and turns
/// them into messages.
///
/// The channel status is marked busy while a burst is being received and idle
/// again once it has been processed.
#[derive(Debug)]
pub struct ReverseControlChannel {
    buffer: AcquisitionBuffer,
    burst_words: usize,
    dcc: Option<u8>,
    status: ChannelStatus,
    stats: ReverseStats,
    diagnostics: Vec<String>,
}

impl ReverseControlChannel {
    pub fn new(config: &ReverseConfig, status: ChannelStatus) -> Result<Self> {
        let buffer =
            AcquisitionBuffer::new(config.buffer_size, config.window_size, sync_chips(), burst_chips(config.burst_words))?;
        info!(
            buffer = config.buffer_size,
            window = config.window_size,
            words = config.burst_words,
            "Reverse control channel ready"
        );
        Ok(Self {
            buffer,
            burst_words: config.burst_words,
            dcc: None,
            status,
            stats: ReverseStats::default(),
            diagnostics: Vec::new(),
        })
    }

    /// Log bursts whose coded DCC decodes to something other than `dcc`.
    pub fn expect_dcc(mut self, dcc: u8) -> Self {
        self.dcc = Some(dcc);
        self
    }

    /// Feed line-coded chips (0 or 1 each) and return the messages completed.
    ///
    /// Any other chip value is a defect and is rejected before anything is
    /// buffered. Bursts that fail to decode are dropped with a diagnostic.
    pub fn ingest(&mut self, chips: &[u8]) -> Result<Vec<ReverseMessage>> {
        if let Some(position) = chips.iter().position(|&c| c > 1) {
            return Err(AmpsError::InvalidSymbol { value: chips[position], position });
        }

        let mut messages = Vec::new();
        for chunk in chips.chunks(self.buffer.max_push()) {
            let was_synced = self.buffer.is_synced();
            self.buffer.push(chunk)?;
            if !was_synced && self.buffer.is_synced() {
                self.status.set_busy();
            }
            while let Some(raw) = self.buffer.take_burst() {
                if let Some(message) = self.process(&raw)? {
                    messages.push(message);
                }
            }
            if !self.buffer.is_synced() {
                self.status.set_idle();
            }
        }
        Ok(messages)
    }

    fn process(&mut self, raw: &[u8]) -> Result<Option<ReverseMessage>> {
        let mut burst = Burst::from_chips(raw, self.burst_words)?;
        self.stats.line_violations += burst.violations() as u64;
        if let Some(expected) = self.dcc {
            if burst.dcc() != expected {
                debug!(expected, received = burst.dcc(), distance = burst.dcc_distance(), "DCC mismatch");
            }
        }

        let outcome = interpret(&mut burst);
        self.stats.fec_corrected_bits += burst.corrected_bits();
        self.stats.unreadable_words += burst.unreadable_words();

        match outcome {
            Ok(Interpretation::Message(message)) => {
                self.stats.bursts_decoded += 1;
                trace!(words = burst.words_decoded(), corrected = burst.corrected_bits(), "Burst decoded");
                Ok(Some(message))
            }
            Ok(Interpretation::NotExtended(word_a)) => {
                self.stats.bursts_dropped += 1;
                debug!(nawc = word_a.header.nawc, "Burst without extended address dropped");
                Ok(None)
            }
            Ok(Interpretation::Unrecognized { word_a, word_b }) => {
                self.stats.bursts_dropped += 1;
                let note = format!(
                    "unrecognized message: T={} MSG_TYPE={} ORDQ={} ORDER={}",
                    u8::from(word_a.t),
                    word_b.msg_type,
                    word_b.ordq,
                    word_b.order
                );
                warn!("{}", note);
                self.diagnostics.push(note);
                Ok(None)
            }
            Err(err) if err.is_recoverable() => {
                self.stats.bursts_dropped += 1;
                warn!(error = %err, "Dropping burst");
                self.diagnostics.push(format!("dropped burst: {}", err));
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    pub fn stats(&self) -> ReverseStats {
        ReverseStats { bursts_detected: self.buffer.detections(), ..self.stats }
    }

    /// Human-readable notes about dropped or unrecognized bursts since the
    /// last call.
    pub fn drain_diagnostics(&mut self) -> Vec<String> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn status(&self) -> &ChannelStatus {
        &self.status
    }

    pub fn is_synced(&self) -> bool {
        self.buffer.is_synced()
    }
}
