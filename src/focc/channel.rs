//! Pull-driven forward control channel
//!
//! [`ForwardControlChannel`] owns the [`Scheduler`] and is driven by the
//! streaming host from a single thread. Other threads hand it traffic through
//! a cloneable [`FrameInjector`]; the only lock is the inject queue's mutex,
//! held for a push or a pop and never while encoding.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::config::StationConfig;
use crate::types::{ChannelStatus, OutboundWords, StreamSelector};
use crate::{AmpsError, Result};

use super::frame::Frame;
use super::schedule::{BurstState, ForwardStats, Scheduler};
use super::superframe::Superframe;
use super::words::CONTROL_FILLER;

/// Unbounded FIFO of one-shot frames waiting for a filler slot.
#[derive(Debug, Clone, Default)]
pub struct InjectQueue {
    frames: Arc<Mutex<VecDeque<Frame>>>,
}

impl InjectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // push/pop never leave the deque inconsistent, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Frame>> {
        self.frames.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, frame: Frame) {
        self.lock().push_back(frame);
    }

    pub fn pop(&self) -> Option<Frame> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Cloneable handle that turns outbound words into queued frames.
#[derive(Debug, Clone)]
pub struct FrameInjector {
    queue: InjectQueue,
    oversampling: usize,
}

impl FrameInjector {
    /// Queue a prepared frame. Non-ephemeral frames are rejected since the
    /// scheduler drops every injected frame after one transmission.
    pub fn inject(&self, frame: Frame) -> Result<()> {
        if !frame.is_ephemeral() {
            return Err(AmpsError::invariant("inject", "only ephemeral frames can be injected"));
        }
        self.queue.push(frame);
        Ok(())
    }

    /// Queue one frame per word, placing each word on the selected stream and
    /// control filler on the other.
    ///
    /// Frames are encoded before the queue lock is taken. Returns the number
    /// of frames queued.
    pub fn inject_words(&self, message: &OutboundWords) -> Result<usize> {
        let frames = message
            .words
            .iter()
            .map(|word| {
                let (word_a, word_b) = match message.stream {
                    StreamSelector::A => (word, &CONTROL_FILLER),
                    StreamSelector::B => (&CONTROL_FILLER, word),
                    StreamSelector::Both => (word, word),
                };
                Frame::ephemeral(word_a, word_b, self.oversampling)
            })
            .collect::<Result<Vec<_>>>()?;

        let count = frames.len();
        for frame in frames {
            self.queue.push(frame);
        }
        debug!(stream = %message.stream, frames = count, "Queued forward words");
        Ok(count)
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// The forward control channel sample source.
#[derive(Debug)]
pub struct ForwardControlChannel {
    scheduler: Scheduler,
    queue: InjectQueue,
    status: ChannelStatus,
}

impl ForwardControlChannel {
    /// Build and validate the superframe for `config`.
    pub fn new(config: &StationConfig, status: ChannelStatus) -> Result<Self> {
        let superframe = Superframe::build(config)?;
        Ok(Self::with_superframe(superframe, status))
    }

    /// Run an already validated superframe.
    pub fn with_superframe(superframe: Superframe, status: ChannelStatus) -> Self {
        info!(frames = superframe.len(), "Forward control channel ready");
        Self { scheduler: Scheduler::new(superframe), queue: InjectQueue::new(), status }
    }

    /// Fill `out` with up to `out.len()` samples.
    ///
    /// Returns the number written. A short count, including zero, means a
    /// burst boundary was reached; call again to continue.
    pub fn pull(&mut self, out: &mut [i8]) -> usize {
        let status = &self.status;
        let queue = &self.queue;
        self.scheduler.fill(out, || status.bit(), || queue.pop()).written
    }

    /// Handle for injecting traffic from other threads.
    pub fn injector(&self) -> FrameInjector {
        FrameInjector { queue: self.queue.clone(), oversampling: self.scheduler.superframe().oversampling() }
    }

    /// Queue a prepared ephemeral frame.
    pub fn inject(&self, frame: Frame) -> Result<()> {
        self.injector().inject(frame)
    }

    pub fn state(&self) -> BurstState {
        self.scheduler.state()
    }

    pub fn stats(&self) -> ForwardStats {
        self.scheduler.stats()
    }

    pub fn superframe(&self) -> &Superframe {
        self.scheduler.superframe()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focc::frame::FRAME_BITS;
    use crate::focc::words::{mobile_word1, mobile_word2_general};

    fn channel() -> ForwardControlChannel {
        ForwardControlChannel::new(&StationConfig::default(), ChannelStatus::new()).unwrap()
    }

    #[test]
    fn pull_until_boundary() {
        let mut focc = channel();
        let mut out = vec![0i8; 10_000];
        assert_eq!(focc.pull(&mut out), 46);
        assert_eq!(focc.pull(&mut out), 44);
        assert_eq!(focc.pull(&mut out), 44);
    }

    #[test]
    fn empty_buffer_pulls_nothing() {
        let mut focc = channel();
        assert_eq!(focc.pull(&mut []), 0);
        assert_eq!(focc.state(), BurstState::BusyIdle);
    }

    #[test]
    fn busy_status_reaches_the_air() {
        let status = ChannelStatus::new();
        let mut focc = ForwardControlChannel::new(&StationConfig::default(), status.clone()).unwrap();
        status.set_busy();
        let mut out = [0i8; 2];
        focc.pull(&mut out);
        assert_eq!(out, [1, -1]);
    }

    #[test]
    fn inject_words_by_stream() -> anyhow::Result<()> {
        let focc = channel();
        let injector = focc.injector();
        let words = vec![mobile_word1(true, 0, 1), mobile_word2_general(2, 0, 0, 0)];
        assert_eq!(injector.inject_words(&OutboundWords::new(StreamSelector::Both, words))?, 2);
        assert_eq!(injector.inject_words(&OutboundWords::new(StreamSelector::A, vec![[0; 28]]))?, 1);
        assert_eq!(focc.pending(), 3);
        Ok(())
    }

    #[test]
    fn scheduled_frames_cannot_be_injected() -> anyhow::Result<()> {
        let focc = channel();
        let frame = Frame::filler(1)?;
        assert!(focc.inject(frame).is_err());
        Ok(())
    }

    #[test]
    fn injected_words_are_sent_once() -> anyhow::Result<()> {
        let mut focc = channel();
        focc.injector().inject_words(&OutboundWords::new(StreamSelector::B, vec![mobile_word1(false, 0, 7)]))?;

        let mut out = vec![0i8; 4096];
        let mut total = 0;
        while focc.stats().frames_transmitted < 36 {
            total += focc.pull(&mut out);
        }
        assert_eq!(total, 36 * FRAME_BITS * 2);
        assert_eq!(focc.stats().injected_sent, 1);
        assert_eq!(focc.pending(), 0);
        Ok(())
    }

    #[test]
    fn injector_is_send() {
        fn assert_send<T: Send + Sync + 'static>() {}
        assert_send::<FrameInjector>();
        assert_send::<ForwardControlChannel>();
    }
}
