//! Message bus between the engines, the command path and external consumers

use futures::future::ready;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{trace, warn};

use crate::types::{ControlEvent, DecodeEvent, OutboundWords, VoiceWords};
use crate::{AmpsError, Result};

/// Everything that travels over the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BusMessage {
    /// Operator command text, e.g. `page 2125551234`.
    Command(String),
    /// Words for the forward control channel inject path.
    ForwardWords(OutboundWords),
    /// A batch for the forward voice channel.
    VoiceWords(VoiceWords),
    Control(ControlEvent),
    Decoded(DecodeEvent),
    /// Human-readable status and error text.
    Diagnostic(String),
}

/// Cloneable broadcast bus.
///
/// Publishing never blocks. Each subscriber buffers up to the configured
/// capacity; a subscriber that falls further behind skips the oldest messages.
#[derive(Debug, Clone)]
pub struct Bus {
    tx: broadcast::Sender<BusMessage>,
}

impl Bus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Send to all current subscribers. Returns how many received it.
    pub fn publish(&self, message: BusMessage) -> usize {
        trace!(?message, "Publishing");
        // No subscribers is not an error.
        self.tx.send(message).unwrap_or(0)
    }

    /// Submit operator command text. With no subscriber the command would be
    /// lost, so that case is reported as [`AmpsError::BusClosed`].
    pub fn command(&self, text: impl Into<String>) -> Result<usize> {
        match self.publish(BusMessage::Command(text.into())) {
            0 => Err(AmpsError::BusClosed),
            receivers => Ok(receivers),
        }
    }

    pub fn diagnostic(&self, text: impl Into<String>) -> usize {
        self.publish(BusMessage::Diagnostic(text.into()))
    }

    /// Stream of messages published after this call. Lagged gaps are logged
    /// and skipped.
    pub fn subscribe(&self) -> impl Stream<Item = BusMessage> + Send + Unpin + 'static {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|item| {
            ready(match item {
                Ok(message) => Some(message),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Bus subscriber lagged");
                    None
                }
            })
        })
    }

    /// Raw receiver, for callers that poll synchronously.
    pub fn receiver(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(256)
    }
}
