//! Forward control channel stream selection

use serde::{Deserialize, Serialize};

/// Which of the two interleaved forward streams carries a word.
///
/// Mobiles with an even MIN listen on stream A, odd MINs on stream B.
/// `Both` sends the same word on the two streams at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamSelector {
    A,
    B,
    Both,
}

impl StreamSelector {
    /// Returns true when stream A carries the word.
    pub fn includes_a(self) -> bool {
        matches!(self, StreamSelector::A | StreamSelector::Both)
    }

    /// Returns true when stream B carries the word.
    pub fn includes_b(self) -> bool {
        matches!(self, StreamSelector::B | StreamSelector::Both)
    }
}

impl std::fmt::Display for StreamSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamSelector::A => write!(f, "A"),
            StreamSelector::B => write!(f, "B"),
            StreamSelector::Both => write!(f, "A+B"),
        }
    }
}
