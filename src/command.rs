//! Operator commands and reactions to decoded reverse channel messages

use tracing::{debug, info, warn};

use crate::bus::{Bus, BusMessage};
use crate::config::StationConfig;
use crate::focc::words::{mobile_word1, mobile_word2_general, mobile_word2_voice_channel, voice_control_order};
use crate::recc::{MobileIdentity, ReverseMessage};
use crate::types::{ControlEvent, DecodeEvent, MinCode, OutboundWords, StreamSelector, VoiceWords, order};
use crate::{AmpsError, Result};

const PAGE_PREFIX: &str = "page ";

/// Page message for `min`: word 1 plus a general word 2 with a zero order,
/// sent on both streams.
pub fn page_words(dcc: u8, min: &MinCode) -> OutboundWords {
    OutboundWords::new(
        StreamSelector::Both,
        vec![mobile_word1(true, dcc, min.min1), mobile_word2_general(min.min2, 0, 0, order::PAGE)],
    )
}

/// Initial voice channel designation for `min`.
pub fn designation_words(config: &StationConfig, min: &MinCode) -> OutboundWords {
    OutboundWords::new(
        StreamSelector::Both,
        vec![
            mobile_word1(true, config.dcc, min.min1),
            mobile_word2_voice_channel(config.scc, min.min2, config.vmac, config.voice_channel),
        ],
    )
}

/// Alert order batch for the voice channel.
pub fn alert_batch(batches: u32) -> VoiceWords {
    VoiceWords { words: vec![voice_control_order(0, 0, 0, order::ALERT)], countdown: Some(batches) }
}

/// Parses operator text commands and publishes the resulting traffic.
#[derive(Debug, Clone)]
pub struct CommandProcessor {
    dcc: u8,
    bus: Bus,
}

impl CommandProcessor {
    pub fn new(config: &StationConfig, bus: Bus) -> Self {
        Self { dcc: config.dcc, bus }
    }

    /// Handle one command.
    ///
    /// `page <digits>` (prefix case-insensitive) pages a mobile. Anything else
    /// is answered with a diagnostic and returned as
    /// [`AmpsError::UnknownCommand`].
    pub fn handle_command(&self, text: &str) -> Result<()> {
        let is_page = text.get(..PAGE_PREFIX.len()).is_some_and(|head| head.eq_ignore_ascii_case(PAGE_PREFIX));
        if is_page {
            self.handle_page(text[PAGE_PREFIX.len()..].trim())?;
            return Ok(());
        }
        warn!(command = text, "Invalid command");
        self.bus.diagnostic("invalid command");
        Err(AmpsError::UnknownCommand { command: text.to_string() })
    }

    /// Page the mobile with MIN `digits` and publish the page words.
    pub fn handle_page(&self, digits: &str) -> Result<OutboundWords> {
        if digits.is_empty() {
            self.bus.diagnostic("missing MIN in page command");
            return Err(AmpsError::invalid_min(digits, "missing MIN in page command"));
        }
        let min = match MinCode::parse(digits) {
            Ok(min) => min,
            Err(err) => {
                warn!(error = %err, "Page rejected");
                self.bus.diagnostic(format!("invalid MIN entered: {}", digits));
                return Err(err);
            }
        };
        let words = page_words(self.dcc, &min);
        info!(min = %min, "Paging");
        self.bus.diagnostic(format!("paging {}", min));
        self.bus.publish(BusMessage::ForwardWords(words.clone()));
        Ok(words)
    }
}

/// Turns decoded reverse messages into bus traffic.
#[derive(Debug, Clone)]
pub struct MessageHandler {
    config: StationConfig,
    bus: Bus,
}

impl MessageHandler {
    pub fn new(config: &StationConfig, bus: Bus) -> Self {
        Self { config: config.clone(), bus }
    }

    pub fn handle(&self, message: &ReverseMessage) -> DecodeEvent {
        match message {
            ReverseMessage::PageResponse(mobile) => self.handle_response(mobile),
            ReverseMessage::Origination { mobile, digits } => self.handle_origination(mobile, digits),
            ReverseMessage::Registration(mobile) => self.handle_registration(mobile),
        }
    }

    /// Assign the voice channel, start alerting and open the audio path.
    pub fn handle_response(&self, mobile: &MobileIdentity) -> DecodeEvent {
        let min = mobile.min();
        let event = DecodeEvent::PageResponse { min: min.to_digits(), serial: mobile.serial };
        info!(min = %min, serial = ?mobile.serial, "Page response");

        self.bus.publish(BusMessage::ForwardWords(designation_words(&self.config, &min)));
        self.bus.publish(BusMessage::VoiceWords(alert_batch(self.config.voice.alert_batches)));
        self.unmute();
        self.announce(&event);
        event
    }

    /// Assign the voice channel for a mobile-originated call.
    pub fn handle_origination(&self, mobile: &MobileIdentity, digits: &str) -> DecodeEvent {
        let min = mobile.min();
        let event =
            DecodeEvent::Origination { min: min.to_digits(), serial: mobile.serial, digits: digits.to_string() };
        info!(min = %min, dialed = digits, "Origination");

        self.bus.publish(BusMessage::ForwardWords(designation_words(&self.config, &min)));
        self.unmute();
        self.announce(&event);
        event
    }

    pub fn handle_registration(&self, mobile: &MobileIdentity) -> DecodeEvent {
        let event = DecodeEvent::Registration { min: mobile.min_digits(), serial: mobile.serial };
        debug!(min = %event.min(), serial = ?mobile.serial, "Registration");
        self.announce(&event);
        event
    }

    fn unmute(&self) {
        self.bus.publish(BusMessage::Control(ControlEvent::AudioMuted(false)));
        self.bus.publish(BusMessage::Control(ControlEvent::VoiceChannelMuted(false)));
    }

    fn announce(&self, event: &DecodeEvent) {
        self.bus.publish(BusMessage::Decoded(event.clone()));
        self.bus.diagnostic(event.to_string());
    }
}
