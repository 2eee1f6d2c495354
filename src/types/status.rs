//! Busy/idle status shared between the reverse and forward engines
//!
//! This cell is the one piece of state coupling the two directions. The reverse
//! channel marks the channel busy when it acquires a burst and idle again once
//! the burst is processed. The forward channel reads it each time a busy/idle
//! segment starts, so a change reaches the air within one indicator interval
//! (about eleven bits).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared busy/idle flag. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct ChannelStatus {
    idle: Arc<AtomicBool>,
}

impl ChannelStatus {
    /// Create a status cell in the idle state.
    pub fn new() -> Self {
        Self { idle: Arc::new(AtomicBool::new(true)) }
    }

    pub fn is_idle(&self) -> bool {
        self.idle.load(Ordering::Acquire)
    }

    pub fn set_idle(&self) {
        self.idle.store(true, Ordering::Release);
    }

    pub fn set_busy(&self) {
        self.idle.store(false, Ordering::Release);
    }

    /// Busy/idle bit as transmitted: 1 = idle, 0 = busy.
    pub fn bit(&self) -> u8 {
        u8::from(self.is_idle())
    }
}

impl Default for ChannelStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let status = ChannelStatus::new();
        let reader = status.clone();
        assert!(reader.is_idle());
        assert_eq!(reader.bit(), 1);

        status.set_busy();
        assert!(!reader.is_idle());
        assert_eq!(reader.bit(), 0);

        status.set_idle();
        assert!(reader.is_idle());
    }

    #[test]
    fn visible_across_threads() {
        let status = ChannelStatus::new();
        let writer = status.clone();
        std::thread::spawn(move || writer.set_busy()).join().unwrap();
        assert!(!status.is_idle());
    }
}
