//! Driver task that routes bus traffic into the engines

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::bus::{Bus, BusMessage};
use crate::command::CommandProcessor;
use crate::focc::FrameInjector;
use crate::fvc::VoiceLoader;

/// Handles returned when the driver is spawned
pub struct DriverHandle {
    /// Cancel to stop routing
    pub cancel: CancellationToken,
    /// Completes once the router task has exited
    pub task: JoinHandle<RouterStats>,
}

impl DriverHandle {
    /// Cancel the router and wait for it to finish.
    pub async fn shutdown(self) -> RouterStats {
        self.cancel.cancel();
        match self.task.await {
            Ok(stats) => stats,
            Err(e) => {
                error!("Router task failed: {}", e);
                RouterStats::default()
            }
        }
    }
}

/// Counters kept by the router task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub commands: u64,
    pub forward_batches: u64,
    pub voice_batches: u64,
    pub failures: u64,
}

/// Spawns the message router
///
/// The router owns a bus subscription and forwards:
/// - `Command` text to the [`CommandProcessor`]
/// - `ForwardWords` to the forward control channel inject queue
/// - `VoiceWords` to the forward voice channel
///
/// Encoding happens on the router task; the inject and voice locks are only
/// held to swap the finished frames in.
pub struct Driver;

impl Driver {
    /// Spawn the router on the current tokio runtime.
    pub fn spawn(bus: &Bus, commands: CommandProcessor, injector: FrameInjector, voice: VoiceLoader) -> DriverHandle {
        let cancel = CancellationToken::new();
        let messages = bus.subscribe();
        let diagnostics = bus.clone();
        let cancel_router = cancel.clone();

        let task = tokio::spawn(async move {
            Self::router_task(messages, diagnostics, commands, injector, voice, cancel_router).await
        });

        DriverHandle { cancel, task }
    }

    async fn router_task<S>(
        mut messages: S,
        bus: Bus,
        commands: CommandProcessor,
        injector: FrameInjector,
        voice: VoiceLoader,
        cancel: CancellationToken,
    ) -> RouterStats
    where
        S: futures::Stream<Item = BusMessage> + Unpin,
    {
        info!("Router task started");
        let mut stats = RouterStats::default();

        loop {
            let message = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Router cancelled");
                    break;
                }
                message = messages.next() => message,
            };

            let Some(message) = message else {
                debug!("Bus closed, router exiting");
                break;
            };

            match message {
                BusMessage::Command(text) => {
                    stats.commands += 1;
                    if let Err(e) = commands.handle_command(&text) {
                        stats.failures += 1;
                        debug!("Command '{}' failed: {}", text.trim(), e);
                    }
                }
                BusMessage::ForwardWords(words) => match injector.inject_words(&words) {
                    Ok(frames) => {
                        stats.forward_batches += 1;
                        trace!("Injected {} frames on stream {}", frames, words.stream);
                    }
                    Err(e) => {
                        stats.failures += 1;
                        error!("Failed to inject forward words: {}", e);
                        bus.diagnostic(format!("inject failed: {}", e));
                    }
                },
                BusMessage::VoiceWords(batch) => match voice.load(&batch) {
                    Ok(()) => stats.voice_batches += 1,
                    Err(e) => {
                        stats.failures += 1;
                        warn!("Failed to load voice batch: {}", e);
                        bus.diagnostic(format!("voice load failed: {}", e));
                    }
                },
                BusMessage::Control(_) | BusMessage::Decoded(_) | BusMessage::Diagnostic(_) => {}
            }
        }

        info!(
            "Router task ended ({} commands, {} forward batches, {} voice batches)",
            stats.commands, stats.forward_batches, stats.voice_batches
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StationConfig;
    use crate::focc::ForwardControlChannel;
    use crate::fvc::ForwardVoiceChannel;
    use crate::types::ChannelStatus;
    use std::time::Duration;

    #[tokio::test]
    async fn page_command_reaches_inject_queue() -> anyhow::Result<()> {
        let config = StationConfig::default();
        let bus = Bus::new(64);
        let focc = ForwardControlChannel::new(&config, ChannelStatus::new())?;
        let fvc = ForwardVoiceChannel::new(1);
        let handle =
            Driver::spawn(&bus, CommandProcessor::new(&config, bus.clone()), focc.injector(), fvc.loader());

        bus.publish(BusMessage::Command("page 2125551234".into()));

        tokio::time::timeout(Duration::from_secs(1), async {
            while focc.pending() < 2 {
                tokio::task::yield_now().await;
            }
        })
        .await?;

        let stats = handle.shutdown().await;
        assert_eq!(stats.commands, 1);
        assert_eq!(stats.forward_batches, 1);
        assert_eq!(stats.failures, 0);
        Ok(())
    }

    #[tokio::test]
    async fn voice_batches_are_loaded() -> anyhow::Result<()> {
        let config = StationConfig::default();
        let bus = Bus::new(64);
        let focc = ForwardControlChannel::new(&config, ChannelStatus::new())?;
        let mut fvc = ForwardVoiceChannel::new(1);
        let handle =
            Driver::spawn(&bus, CommandProcessor::new(&config, bus.clone()), focc.injector(), fvc.loader());

        bus.publish(BusMessage::VoiceWords(crate::command::alert_batch(5)));

        let mut out = [0i8; 32];
        tokio::time::timeout(Duration::from_secs(1), async {
            while fvc.pull(&mut out) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await?;
        assert_eq!(fvc.countdown(), Some(4));

        let stats = handle.shutdown().await;
        assert_eq!(stats.voice_batches, 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_commands_are_counted() -> anyhow::Result<()> {
        let config = StationConfig::default();
        let bus = Bus::new(64);
        let mut diagnostics = bus.subscribe();
        let focc = ForwardControlChannel::new(&config, ChannelStatus::new())?;
        let handle = Driver::spawn(
            &bus,
            CommandProcessor::new(&config, bus.clone()),
            focc.injector(),
            ForwardVoiceChannel::new(1).loader(),
        );

        bus.publish(BusMessage::Command("reboot".into()));
        let reply = tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                if let Some(BusMessage::Diagnostic(text)) = diagnostics.next().await {
                    return text;
                }
            }
        })
        .await?;
        assert_eq!(reply, "invalid command");

        let stats = handle.shutdown().await;
        assert_eq!(stats.failures, 1);
        Ok(())
    }
}
