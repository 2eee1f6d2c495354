//! Payloads exchanged between the engines and the outside world

use serde::{Deserialize, Serialize};

use super::{ForwardWord, StreamSelector};

/// One or more 28-bit forward control words bound for the FOCC inject path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundWords {
    pub stream: StreamSelector,
    pub words: Vec<ForwardWord>,
}

impl OutboundWords {
    pub fn new(stream: StreamSelector, words: Vec<ForwardWord>) -> Self {
        Self { stream, words }
    }
}

/// A batch of words for the forward voice channel.
///
/// With `countdown` set, the batch is sent that many times before the voice
/// channel is switched off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceWords {
    pub words: Vec<ForwardWord>,
    pub countdown: Option<u32>,
}

/// Channel control signals for the audio path and the voice channel transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlEvent {
    /// `true` mutes the audio path.
    AudioMuted(bool),
    /// `true` switches the voice channel off.
    VoiceChannelMuted(bool),
}

/// A successfully interpreted reverse control channel message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeEvent {
    /// Mobile answered a page.
    PageResponse { min: String, serial: Option<u32> },
    /// Mobile placed a call.
    Origination { min: String, serial: Option<u32>, digits: String },
    /// Mobile registered with the system.
    Registration { min: String, serial: Option<u32> },
}

impl DecodeEvent {
    /// MIN digits of the originating mobile.
    pub fn min(&self) -> &str {
        match self {
            DecodeEvent::PageResponse { min, .. }
            | DecodeEvent::Origination { min, .. }
            | DecodeEvent::Registration { min, .. } => min,
        }
    }

    /// Electronic serial number, when the mobile sent one.
    pub fn serial(&self) -> Option<u32> {
        match self {
            DecodeEvent::PageResponse { serial, .. }
            | DecodeEvent::Origination { serial, .. }
            | DecodeEvent::Registration { serial, .. } => *serial,
        }
    }
}

impl std::fmt::Display for DecodeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeEvent::PageResponse { min, .. } => write!(f, "page response from {}", min),
            DecodeEvent::Origination { min, digits, .. } => {
                write!(f, "origination from {} to {}", min, digits)
            }
            DecodeEvent::Registration { min, .. } => write!(f, "registration from {}", min),
        }
    }
}
