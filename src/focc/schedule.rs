//! Forward burst state machine
//!
//! [`Scheduler`] walks the superframe one segment at a time and copies samples
//! into caller buffers. It knows nothing about threads or queues: the busy/idle
//! bit and the next injected frame are supplied by the caller on every call, so
//! the state machine can be driven directly in tests.

use tracing::trace;

use super::frame::{Frame, Segment, busy_idle_samples};
use super::superframe::Superframe;

/// What the cursor is currently emitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstState {
    BusyIdle,
    Message,
    End,
}

/// Position within the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Superframe slot being transmitted.
    pub frame: usize,
    /// Segment within the current frame.
    pub segment: usize,
    /// Samples of the current segment already emitted.
    pub offset: usize,
}

/// Result of one [`Scheduler::fill`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    /// Samples written to the output buffer.
    pub written: usize,
    /// True when the call stopped at a burst boundary rather than a full buffer.
    pub boundary: bool,
}

/// Counters kept by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ForwardStats {
    /// Frames completed, scheduled or injected.
    pub frames_transmitted: u64,
    /// Injected frames completed.
    pub injected_sent: u64,
}

/// Cyclic superframe walker.
#[derive(Debug)]
pub struct Scheduler {
    superframe: Superframe,
    cursor: Cursor,
    /// Frame substituted for the current filler slot, dropped once sent.
    injected: Option<Frame>,
    /// Indicator samples indexed by bit value, built once per oversampling.
    busy_idle: [Vec<i8>; 2],
    /// Bit latched at the start of the current indicator segment.
    latched: usize,
    stats: ForwardStats,
}

impl Scheduler {
    /// Start at the first segment of the first frame.
    pub fn new(superframe: Superframe) -> Self {
        let oversampling = superframe.oversampling();
        let busy_idle = [busy_idle_samples(0, oversampling), busy_idle_samples(1, oversampling)];
        Self {
            superframe,
            cursor: Cursor::default(),
            injected: None,
            busy_idle,
            latched: 1,
            stats: ForwardStats::default(),
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn stats(&self) -> ForwardStats {
        self.stats
    }

    pub fn superframe(&self) -> &Superframe {
        &self.superframe
    }

    /// True while an injected frame occupies the current slot.
    pub fn is_injected(&self) -> bool {
        self.injected.is_some()
    }

    /// The frame currently being transmitted.
    pub fn current_frame(&self) -> &Frame {
        match &self.injected {
            Some(frame) => frame,
            None => self.superframe.frame(self.cursor.frame),
        }
    }

    pub fn state(&self) -> BurstState {
        match self.current_frame().segments()[self.cursor.segment] {
            Segment::BusyIdle => BurstState::BusyIdle,
            Segment::Message(_) => BurstState::Message,
            Segment::End => BurstState::End,
        }
    }

    /// Copy samples into `out` until it is full or a burst ends.
    ///
    /// `busy_idle` is sampled when a busy/idle segment starts and held for the
    /// whole segment. `dequeue` is asked for a replacement frame each time the
    /// cursor enters a filler slot.
    ///
    /// Reaching an end-of-burst marker advances past it and returns at once,
    /// so a call may write nothing. Callers keep calling to continue.
    pub fn fill<F>(&mut self, out: &mut [i8], busy_idle: impl Fn() -> u8, mut dequeue: F) -> Fill
    where
        F: FnMut() -> Option<Frame>,
    {
        let mut written = 0;

        while written < out.len() {
            let remaining = out.len() - written;
            let offset = self.cursor.offset;

            let (copied, segment_len) = match &self.current_frame().segments()[self.cursor.segment] {
                Segment::BusyIdle => {
                    if offset == 0 {
                        self.latched = usize::from(busy_idle() != 0);
                    }
                    let pattern = &self.busy_idle[self.latched];
                    let len = pattern.len();
                    let n = remaining.min(len - offset);
                    out[written..written + n].copy_from_slice(&pattern[offset..offset + n]);
                    (n, len)
                }
                Segment::Message(samples) => {
                    let len = samples.len();
                    let n = remaining.min(len - offset);
                    out[written..written + n].copy_from_slice(&samples[offset..offset + n]);
                    (n, len)
                }
                Segment::End => {
                    self.advance(&mut dequeue);
                    return Fill { written, boundary: true };
                }
            };

            written += copied;
            self.cursor.offset += copied;
            if self.cursor.offset == segment_len {
                self.advance(&mut dequeue);
            }
        }

        Fill { written, boundary: false }
    }

    fn advance<F>(&mut self, dequeue: &mut F)
    where
        F: FnMut() -> Option<Frame>,
    {
        self.cursor.offset = 0;
        self.cursor.segment += 1;
        if self.cursor.segment < self.current_frame().segments().len() {
            return;
        }

        self.stats.frames_transmitted += 1;
        if self.injected.take().is_some() {
            self.stats.injected_sent += 1;
            trace!(slot = self.cursor.frame, "Injected frame sent");
        }

        self.cursor.segment = 0;
        self.cursor.frame = (self.cursor.frame + 1) % self.superframe.len();
        if self.superframe.frame(self.cursor.frame).is_filler() {
            self.injected = dequeue();
            if self.injected.is_some() {
                trace!(slot = self.cursor.frame, "Injected frame replaces filler");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StationConfig;
    use crate::focc::frame::{FRAME_BITS, busy_idle_samples};
    use crate::focc::words::{CONTROL_FILLER, mobile_word1};
    use std::collections::VecDeque;

    fn scheduler() -> Scheduler {
        Scheduler::new(Superframe::build(&StationConfig::default()).unwrap())
    }

    fn idle() -> u8 {
        1
    }

    #[test]
    fn starts_on_busy_idle() {
        let sched = scheduler();
        assert_eq!(sched.state(), BurstState::BusyIdle);
        assert_eq!(sched.cursor(), Cursor::default());
    }

    #[test]
    fn first_burst_is_dotting_and_sync() {
        let mut sched = scheduler();
        let mut out = vec![0i8; 1000];
        let fill = sched.fill(&mut out, idle, || None);
        // BI + 10 dotting + BI + 11 sync, one sample pair per bit.
        assert_eq!(fill, Fill { written: 23 * 2, boundary: true });
        assert_eq!(&out[..2], &[-1, 1]);
        assert_eq!(sched.state(), BurstState::BusyIdle);
        assert_eq!(sched.cursor().segment, 5);
    }

    #[test]
    fn end_marker_returns_zero() {
        let mut sched = scheduler();
        let mut out = vec![0i8; 46];
        assert_eq!(sched.fill(&mut out, idle, || None).written, 46);
        assert_eq!(sched.state(), BurstState::End);
        let fill = sched.fill(&mut out, idle, || None);
        assert_eq!(fill, Fill { written: 0, boundary: true });
        assert_eq!(sched.state(), BurstState::BusyIdle);
    }

    #[test]
    fn small_buffers_split_segments() {
        let mut sched = scheduler();
        let mut out = [0i8; 3];
        let mut total = 0;
        for _ in 0..10 {
            let fill = sched.fill(&mut out, idle, || None);
            total += fill.written;
            assert!(fill.written <= 3);
        }
        assert!(total > 0);
        assert!(sched.cursor().offset < 20);
    }

    #[test]
    fn busy_idle_is_latched_per_segment() {
        let mut sched = scheduler();
        let mut first = [0i8; 1];
        sched.fill(&mut first, || 0, || None);
        let mut second = [0i8; 1];
        sched.fill(&mut second, || 1, || None);
        // Both halves come from the busy pattern latched at segment start.
        assert_eq!([first[0], second[0]], [1, -1]);
    }

    #[test]
    fn busy_idle_follows_each_indicator() -> anyhow::Result<()> {
        let config = StationConfig { symbol_rate: 40_000, ..StationConfig::default() };
        let mut sched = Scheduler::new(Superframe::build(&config)?);
        let mut out = vec![0i8; 4096];
        let fill = sched.fill(&mut out, || 0, || None);
        assert!(fill.boundary);

        // Flip the status for every indicator of the first word burst.
        let bits = std::cell::Cell::new(0u8);
        let status = || {
            let bit = bits.get() ^ 1;
            bits.set(bit);
            bit
        };
        let fill = sched.fill(&mut out, status, || None);
        assert_eq!(fill.written, 22 * 4);
        for (run, expected) in out[..fill.written].chunks(11 * 4).zip([1u8, 0]) {
            assert_eq!(&run[..4], busy_idle_samples(expected, 2).as_slice());
        }
        Ok(())
    }

    #[test]
    fn full_cycle_emits_every_bit() {
        let mut sched = scheduler();
        let mut out = vec![0i8; 4096];
        let mut total = 0;
        while sched.stats().frames_transmitted < 18 {
            total += sched.fill(&mut out, idle, || None).written;
        }
        assert_eq!(total, 18 * FRAME_BITS * 2);
        assert_eq!(sched.cursor(), Cursor::default());
    }

    #[test]
    fn injected_frame_replaces_one_filler() -> anyhow::Result<()> {
        let mut sched = scheduler();
        let page = Frame::ephemeral(&mobile_word1(true, 0, 42), &CONTROL_FILLER, 1)?;
        let mut queue = VecDeque::from([page.clone()]);
        let mut out = vec![0i8; 4096];

        let mut injected_slots = Vec::new();
        while sched.stats().frames_transmitted < 36 {
            sched.fill(&mut out, idle, || queue.pop_front());
            if sched.is_injected() && injected_slots.last() != Some(&sched.cursor().frame) {
                assert_eq!(sched.current_frame(), &page);
                injected_slots.push(sched.cursor().frame);
            }
        }

        assert_eq!(injected_slots, vec![4]);
        assert!(queue.is_empty());
        assert_eq!(sched.stats().injected_sent, 1);
        Ok(())
    }
}
