//! Station configuration
//!
//! A station is described by a small YAML document. Every field has a default,
//! so an empty document yields a working single-oversampled station:
//!
//! ```yaml
//! symbol_rate: 40000
//! dcc: 0
//! sid: 1
//! superframe: aggressive_registration
//! reverse:
//!   burst_words: 7
//! voice:
//!   alert_batches: 30
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::focc::SuperframeLayout;
use crate::recc::burst::{SYNC_CHIPS, burst_chips};
use crate::{AmpsError, Result};

/// Bit rate of the forward and reverse control channels.
pub const BIT_RATE: u32 = 10_000;

/// Half-bit symbol rate; the outbound sample rate is a multiple of this.
pub const SYMBOL_RATE_UNIT: u32 = 2 * BIT_RATE;

/// Complete station configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Outbound samples per second.
    pub symbol_rate: u32,
    /// Digital color code (2 bits).
    pub dcc: u8,
    /// System identification (15 bits).
    pub sid: u16,
    /// Supervisory audio tone color code for voice channel designations.
    pub scc: u8,
    /// Voice mobile attenuation code (3 bits).
    pub vmac: u8,
    /// Voice channel number handed to mobiles (11 bits).
    pub voice_channel: u16,
    pub superframe: SuperframeLayout,
    /// Registration increment advertised by the aggressive schedule (12 bits).
    pub registration_increment: u16,
    pub reverse: ReverseConfig,
    pub voice: VoiceConfig,
    /// Messages buffered per bus subscriber before it lags.
    pub bus_capacity: usize,
}

/// Reverse control channel acquisition parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverseConfig {
    /// Chips held by the acquisition buffer.
    pub buffer_size: usize,
    /// Chips kept when the buffer is compacted.
    pub window_size: usize,
    /// Words captured after each sync pattern.
    pub burst_words: usize,
}

/// Forward voice channel parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Alert batch repetitions before the voice channel is switched off.
    pub alert_batches: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            symbol_rate: SYMBOL_RATE_UNIT,
            dcc: 0,
            sid: 1,
            scc: 1,
            vmac: 0,
            voice_channel: 334,
            superframe: SuperframeLayout::Standard,
            registration_increment: 100,
            reverse: ReverseConfig::default(),
            voice: VoiceConfig::default(),
            bus_capacity: 256,
        }
    }
}

impl Default for ReverseConfig {
    fn default() -> Self {
        Self { buffer_size: 65_536, window_size: 4_096, burst_words: 7 }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self { alert_batches: 30 }
    }
}

impl StationConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cleaned = clean_yaml(yaml);
        let config: StationConfig =
            if cleaned.trim().is_empty() { StationConfig::default() } else { serde_yaml_ng::from_str(&cleaned)? };
        config.validate()?;
        debug!(?config, "Loaded station configuration");
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| AmpsError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml_str(&yaml)
    }

    /// Outbound samples per half-bit symbol.
    pub fn oversampling(&self) -> Result<usize> {
        if self.symbol_rate == 0 || self.symbol_rate % SYMBOL_RATE_UNIT != 0 {
            return Err(AmpsError::config(format!(
                "symbol_rate {} is not a positive multiple of {}",
                self.symbol_rate, SYMBOL_RATE_UNIT
            )));
        }
        Ok((self.symbol_rate / SYMBOL_RATE_UNIT) as usize)
    }

    /// Check field widths and buffer relationships.
    pub fn validate(&self) -> Result<()> {
        self.oversampling()?;
        check_width("dcc", u64::from(self.dcc), 2)?;
        check_width("sid", u64::from(self.sid), 15)?;
        check_width("vmac", u64::from(self.vmac), 3)?;
        check_width("voice_channel", u64::from(self.voice_channel), 11)?;
        check_width("registration_increment", u64::from(self.registration_increment), 12)?;
        if self.scc > 2 {
            return Err(AmpsError::config(format!("scc {} out of range 0..=2", self.scc)));
        }
        if self.bus_capacity == 0 {
            return Err(AmpsError::config("bus_capacity must be at least 1"));
        }

        let reverse = &self.reverse;
        if reverse.burst_words < 2 {
            return Err(AmpsError::config("burst_words must cover at least words A and B"));
        }
        let needed = SYNC_CHIPS + burst_chips(reverse.burst_words);
        if reverse.window_size < needed {
            return Err(AmpsError::config(format!(
                "window_size {} cannot hold a {}-word burst ({} chips)",
                reverse.window_size, reverse.burst_words, needed
            )));
        }
        if reverse.buffer_size <= reverse.window_size {
            return Err(AmpsError::config(format!(
                "buffer_size {} must exceed window_size {}",
                reverse.buffer_size, reverse.window_size
            )));
        }
        Ok(())
    }
}

fn check_width(field: &str, value: u64, width: u32) -> Result<()> {
    if value >> width != 0 {
        return Err(AmpsError::config(format!("{} {} does not fit in {} bits", field, value, width)));
    }
    Ok(())
}

// Drop control characters other than tab and line breaks, and a leading BOM.
fn clean_yaml(yaml: &str) -> String {
    yaml.trim_start_matches('\u{feff}')
        .chars()
        .filter(|&c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}
