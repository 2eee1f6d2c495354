//! Bounded acquisition buffer with sync pattern search

use tracing::{debug, trace};

use crate::{AmpsError, Result};

/// Chip buffer that finds a trigger pattern and hands out the fixed-length
/// payload following it.
///
/// Only the most recently appended chips (plus enough look-back to span a
/// trigger split across pushes) are searched. When a push would overflow
/// `capacity`, all but the last `window` chips are discarded and the retained
/// window is searched again.
#[derive(Debug, Clone)]
pub struct AcquisitionBuffer {
    data: Vec<u8>,
    capacity: usize,
    window: usize,
    trigger: Vec<u8>,
    payload_len: usize,
    match_at: Option<usize>,
    detections: u64,
    compactions: u64,
}

impl AcquisitionBuffer {
    pub fn new(capacity: usize, window: usize, trigger: Vec<u8>, payload_len: usize) -> Result<Self> {
        if trigger.is_empty() {
            return Err(AmpsError::invariant("acquisition buffer", "empty trigger pattern"));
        }
        if window < trigger.len() + payload_len || capacity <= window {
            return Err(AmpsError::invariant(
                "acquisition buffer",
                format!(
                    "capacity {} / window {} cannot hold a {}-chip trigger and {}-chip payload",
                    capacity,
                    window,
                    trigger.len(),
                    payload_len
                ),
            ));
        }
        Ok(Self {
            data: Vec::with_capacity(capacity),
            capacity,
            window,
            trigger,
            payload_len,
            match_at: None,
            detections: 0,
            compactions: 0,
        })
    }

    /// Largest slice accepted by a single [`push`](Self::push).
    pub fn max_push(&self) -> usize {
        self.capacity - self.window
    }

    /// Append chips and search them for the trigger.
    ///
    /// Every chip must be 0 or 1; the buffer is left untouched otherwise.
    pub fn push(&mut self, chips: &[u8]) -> Result<()> {
        if chips.len() > self.max_push() {
            return Err(AmpsError::invariant(
                "acquisition buffer",
                format!("push of {} chips exceeds the {}-chip limit", chips.len(), self.max_push()),
            ));
        }
        if let Some(position) = chips.iter().position(|&c| c > 1) {
            return Err(AmpsError::InvalidSymbol { value: chips[position], position });
        }

        let mut search_from = self.data.len().saturating_sub(self.trigger.len() - 1);
        if self.data.len() + chips.len() > self.capacity {
            self.compact();
            search_from = 0;
        }
        self.data.extend_from_slice(chips);
        if self.match_at.is_none() {
            self.search(search_from);
        }
        Ok(())
    }

    /// Remove and return the payload after the current match once it is
    /// complete. The remainder is searched for the next trigger.
    pub fn take_burst(&mut self) -> Option<Vec<u8>> {
        let start = self.match_at?;
        let end = start + self.payload_len;
        if self.data.len() < end {
            return None;
        }
        let payload = self.data[start..end].to_vec();
        self.data.drain(..end);
        self.match_at = None;
        self.search(0);
        Some(payload)
    }

    /// A trigger has been seen and its payload is still arriving.
    pub fn is_synced(&self) -> bool {
        self.match_at.is_some()
    }

    /// Chips currently held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Triggers found so far.
    pub fn detections(&self) -> u64 {
        self.detections
    }

    pub fn compactions(&self) -> u64 {
        self.compactions
    }

    fn compact(&mut self) {
        let resumed = self.match_at.take().is_some();
        let discard = self.data.len().saturating_sub(self.window);
        self.data.drain(..discard);
        self.compactions += 1;
        debug!(discarded = discard, kept = self.data.len(), "Compacted acquisition buffer");
        if resumed {
            // The pending trigger is inside the window; find it again without
            // counting a new detection.
            self.search(0);
            if self.match_at.is_some() {
                self.detections -= 1;
            }
        }
    }

    fn search(&mut self, from: usize) {
        let t = self.trigger.len();
        if self.data.len() < from + t {
            return;
        }
        if let Some(offset) = self.data[from..].windows(t).position(|w| w == self.trigger.as_slice()) {
            let at = from + offset + t;
            self.match_at = Some(at);
            self.detections += 1;
            trace!(at, "Trigger found");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIGGER: [u8; 4] = [1, 1, 0, 1];

    fn buffer() -> AcquisitionBuffer {
        AcquisitionBuffer::new(64, 16, TRIGGER.to_vec(), 6).unwrap()
    }

    #[test]
    fn finds_payload_after_trigger() -> anyhow::Result<()> {
        let mut buf = buffer();
        buf.push(&[0, 0, 1, 1, 0, 1, 1, 0, 0])?;
        assert!(buf.is_synced());
        assert_eq!(buf.take_burst(), None);
        buf.push(&[1, 1, 1, 0])?;
        assert_eq!(buf.take_burst(), Some(vec![1, 0, 0, 1, 1, 1]));
        assert!(!buf.is_synced());
        assert_eq!(buf.len(), 1);
        Ok(())
    }

    #[test]
    fn trigger_split_across_pushes() -> anyhow::Result<()> {
        let mut buf = buffer();
        buf.push(&[0, 1, 1])?;
        assert!(!buf.is_synced());
        buf.push(&[0, 1, 0, 0, 0, 0, 0, 0])?;
        assert_eq!(buf.take_burst(), Some(vec![0; 6]));
        Ok(())
    }

    #[test]
    fn leftover_is_searched_again() -> anyhow::Result<()> {
        let mut buf = buffer();
        let mut chips = TRIGGER.to_vec();
        chips.extend([0; 6]);
        chips.extend(TRIGGER);
        chips.extend([1, 0, 1, 0, 1, 0]);
        buf.push(&chips)?;
        assert_eq!(buf.take_burst(), Some(vec![0; 6]));
        assert_eq!(buf.take_burst(), Some(vec![1, 0, 1, 0, 1, 0]));
        assert_eq!(buf.detections(), 2);
        Ok(())
    }

    #[test]
    fn compaction_keeps_pending_trigger() -> anyhow::Result<()> {
        let mut buf = buffer();
        buf.push(&[0; 40])?;
        buf.push(&[0, 0, 1, 1, 0, 1, 1])?;
        assert!(buf.is_synced());
        buf.push(&[0; 20])?;
        assert_eq!(buf.compactions(), 1);
        assert_eq!(buf.detections(), 1);
        assert_eq!(buf.take_burst(), Some(vec![1, 0, 0, 0, 0, 0]));
        Ok(())
    }

    #[test]
    fn invalid_chips_are_rejected_untouched() {
        let mut buf = buffer();
        let err = buf.push(&[0, 1, 2, 1]).unwrap_err();
        assert!(matches!(err, AmpsError::InvalidSymbol { value: 2, position: 2 }));
        assert!(err.is_defect());
        assert!(buf.is_empty());
    }

    #[test]
    fn oversized_push_is_a_defect() {
        let mut buf = buffer();
        assert!(buf.push(&[0; 49]).unwrap_err().is_defect());
    }

    #[test]
    fn rejects_undersized_window() {
        assert!(AcquisitionBuffer::new(64, 8, TRIGGER.to_vec(), 6).is_err());
        assert!(AcquisitionBuffer::new(16, 16, TRIGGER.to_vec(), 6).is_err());
    }
}
