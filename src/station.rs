//! Station assembly: both engines wired to one bus and one status cell

use std::path::Path;

use tracing::info;

use crate::bus::Bus;
use crate::command::{CommandProcessor, MessageHandler};
use crate::config::StationConfig;
use crate::driver::{Driver, DriverHandle};
use crate::focc::ForwardControlChannel;
use crate::fvc::ForwardVoiceChannel;
use crate::recc::{ReverseControlChannel, ReverseStats};
use crate::types::{ChannelStatus, DecodeEvent};
use crate::Result;

/// Inbound path: reverse channel decoding followed by the message handler.
#[derive(Debug)]
pub struct ReverseReceiver {
    channel: ReverseControlChannel,
    handler: MessageHandler,
    bus: Bus,
}

impl ReverseReceiver {
    pub fn new(config: &StationConfig, status: ChannelStatus, bus: Bus) -> Result<Self> {
        let channel = ReverseControlChannel::new(&config.reverse, status)?.expect_dcc(config.dcc);
        Ok(Self { channel, handler: MessageHandler::new(config, bus.clone()), bus })
    }

    /// Feed chips, act on every completed message and return the decode
    /// events. Notes about dropped bursts go out as bus diagnostics.
    pub fn ingest(&mut self, chips: &[u8]) -> Result<Vec<DecodeEvent>> {
        let messages = self.channel.ingest(chips)?;
        for note in self.channel.drain_diagnostics() {
            self.bus.diagnostic(note);
        }
        Ok(messages.iter().map(|message| self.handler.handle(message)).collect())
    }

    pub fn stats(&self) -> ReverseStats {
        self.channel.stats()
    }

    pub fn channel(&self) -> &ReverseControlChannel {
        &self.channel
    }
}

/// The engines of a station, split for use on separate threads.
pub struct StationParts {
    pub forward: ForwardControlChannel,
    pub voice: ForwardVoiceChannel,
    pub reverse: ReverseReceiver,
    pub commands: CommandProcessor,
    pub bus: Bus,
    pub status: ChannelStatus,
}

/// A complete control channel station.
///
/// ```rust
/// use amps_control::{Station, StationConfig};
///
/// let mut station = Station::new(StationConfig::default()).unwrap();
/// let mut samples = vec![0i8; 4096];
/// let written = station.forward_mut().pull(&mut samples);
/// assert!(written > 0);
/// ```
pub struct Station {
    config: StationConfig,
    parts: StationParts,
}

impl Station {
    /// Build a station from a validated configuration.
    pub fn new(config: StationConfig) -> Result<Self> {
        config.validate()?;
        let oversampling = config.oversampling()?;
        let bus = Bus::new(config.bus_capacity);
        let status = ChannelStatus::new();

        let forward = ForwardControlChannel::new(&config, status.clone())?;
        let voice = ForwardVoiceChannel::new(oversampling).with_bus(bus.clone());
        let reverse = ReverseReceiver::new(&config, status.clone(), bus.clone())?;
        let commands = CommandProcessor::new(&config, bus.clone());

        info!(
            sid = config.sid,
            dcc = config.dcc,
            symbol_rate = config.symbol_rate,
            superframe = ?config.superframe,
            "Station ready"
        );
        Ok(Self { config, parts: StationParts { forward, voice, reverse, commands, bus, status } })
    }

    /// Build a station from a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(StationConfig::load(path)?)
    }

    /// Spawn the bus router on the current tokio runtime.
    pub fn spawn_driver(&self) -> DriverHandle {
        let parts = &self.parts;
        Driver::spawn(&parts.bus, parts.commands.clone(), parts.forward.injector(), parts.voice.loader())
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn bus(&self) -> &Bus {
        &self.parts.bus
    }

    pub fn status(&self) -> &ChannelStatus {
        &self.parts.status
    }

    pub fn commands(&self) -> &CommandProcessor {
        &self.parts.commands
    }

    pub fn forward_mut(&mut self) -> &mut ForwardControlChannel {
        &mut self.parts.forward
    }

    pub fn voice_mut(&mut self) -> &mut ForwardVoiceChannel {
        &mut self.parts.voice
    }

    pub fn reverse_mut(&mut self) -> &mut ReverseReceiver {
        &mut self.parts.reverse
    }

    pub fn into_parts(self) -> StationParts {
        self.parts
    }
}
