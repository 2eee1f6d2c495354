//! Error types for the control channel engine.
//!
//! Errors fall into three groups, and callers are expected to treat them
//! differently:
//!
//! - **Defects**: invariant violations such as a superframe whose symbol count
//!   does not add up, or a sample value outside the line-code alphabet. These
//!   abort construction or the current operation and are never retried.
//! - **Protocol errors**: malformed or out-of-range fields in a received message,
//!   an unparseable MIN, or a word whose five copies all failed FEC. The offending
//!   message is dropped and stream processing continues.
//! - **Environment errors**: configuration, file and bus failures raised while
//!   setting a station up.
//!
//! Link-quality events (a single Manchester violation, a corrected bit) are not
//! errors at all; they only show up in counters and `trace!` output.
//!
//! ```rust
//! use amps_control::AmpsError;
//!
//! let error = AmpsError::malformed("NAWC 5 out of range");
//! assert!(error.is_recoverable());
//! assert!(!error.is_defect());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T, E = AmpsError> = std::result::Result<T, E>;

/// Main error type for the control channel engine.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AmpsError {
    #[error("Invariant violated in {context}: {details}")]
    Invariant { context: String, details: String },

    #[error("Invalid line-code sample {value} at position {position}")]
    InvalidSymbol { value: u8, position: usize },

    #[error("Invalid MIN '{input}': {reason}")]
    InvalidMin { input: String, reason: String },

    #[error("Malformed reverse channel message: {reason}")]
    MalformedMessage { reason: String },

    #[error("Word {word_index} unreadable after {copies} FEC attempts")]
    Uncorrectable { word_index: usize, copies: usize },

    #[error("Unrecognized command: {command}")]
    UnknownCommand { command: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("Configuration YAML could not be parsed")]
    Yaml {
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Configuration file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Message bus closed")]
    BusClosed,
}

impl AmpsError {
    /// Returns whether this error indicates a bug in the engine or its caller
    /// rather than bad data on the air.
    pub fn is_defect(&self) -> bool {
        matches!(self, AmpsError::Invariant { .. } | AmpsError::InvalidSymbol { .. })
    }

    /// Returns whether processing can continue after dropping the offending
    /// message or command.
    pub fn is_recoverable(&self) -> bool {
        match self {
            AmpsError::InvalidMin { .. } => true,
            AmpsError::MalformedMessage { .. } => true,
            AmpsError::Uncorrectable { .. } => true,
            AmpsError::UnknownCommand { .. } => true,
            AmpsError::Invariant { .. } => false,
            AmpsError::InvalidSymbol { .. } => false,
            AmpsError::Config { .. } => false,
            AmpsError::Yaml { .. } => false,
            AmpsError::File { .. } => false,
            AmpsError::BusClosed => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            AmpsError::Invariant { .. } => vec![
                "Report the failing construction parameters",
                "Check the symbol rate is a multiple of 20000",
            ],
            AmpsError::InvalidSymbol { .. } => vec![
                "Slice demodulator output to 0/1 before ingest",
                "Check the upstream sample type is one byte per chip",
            ],
            AmpsError::InvalidMin { .. } => vec![
                "Enter the MIN as 1 to 10 decimal digits",
                "Remove separators such as dashes or spaces",
            ],
            AmpsError::MalformedMessage { .. } => vec![
                "Check the mobile's protocol capability",
                "Inspect the burst with trace logging enabled",
            ],
            AmpsError::Uncorrectable { .. } => vec![
                "Check reverse channel signal level",
                "Verify demodulator timing recovery",
            ],
            AmpsError::UnknownCommand { .. } => vec!["Use 'page <digits>' to page a mobile"],
            AmpsError::Config { .. } | AmpsError::Yaml { .. } => vec![
                "Compare the configuration against the documented defaults",
                "Check field widths such as DCC, SCC and VMAC",
            ],
            AmpsError::File { .. } => {
                vec!["Check the configuration file exists and is readable"]
            }
            AmpsError::BusClosed => vec!["Restart the station driver"],
        }
    }

    /// Helper constructor for invariant violations.
    pub fn invariant(context: impl Into<String>, details: impl Into<String>) -> Self {
        AmpsError::Invariant { context: context.into(), details: details.into() }
    }

    /// Helper constructor for malformed reverse channel messages.
    pub fn malformed(reason: impl Into<String>) -> Self {
        AmpsError::MalformedMessage { reason: reason.into() }
    }

    /// Helper constructor for MIN parse failures.
    pub fn invalid_min(input: impl Into<String>, reason: impl Into<String>) -> Self {
        AmpsError::InvalidMin { input: input.into(), reason: reason.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config(reason: impl Into<String>) -> Self {
        AmpsError::Config { reason: reason.into() }
    }

    /// Helper constructor for configuration file errors.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        AmpsError::File { path, source }
    }
}

impl From<serde_yaml_ng::Error> for AmpsError {
    fn from(source: serde_yaml_ng::Error) -> Self {
        AmpsError::Yaml { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_carry_their_context(
            reason in ".*",
            input in "[0-9]{0,12}",
            word_index in 0usize..8,
            value in 2u8..=255,
            position in 0usize..65536,
          ) {
            let malformed = AmpsError::malformed(reason.clone());
            prop_assert!(malformed.to_string().contains(&reason));

            let min = AmpsError::invalid_min(input.clone(), "too long");
            prop_assert!(min.to_string().contains(&input));

            let fec = AmpsError::Uncorrectable { word_index, copies: 5 };
            prop_assert!(fec.to_string().contains(&word_index.to_string()));

            let symbol = AmpsError::InvalidSymbol { value, position };
            let msg = symbol.to_string();
            prop_assert!(msg.contains(&value.to_string()));
            prop_assert!(msg.contains(&position.to_string()));
          }

          #[test]
          fn protocol_errors_are_never_defects(reason in ".*") {
            let errors = [
              AmpsError::malformed(reason.clone()),
              AmpsError::invalid_min(reason.clone(), "bad"),
              AmpsError::UnknownCommand { command: reason.clone() },
            ];
            for error in &errors {
              prop_assert!(error.is_recoverable());
              prop_assert!(!error.is_defect());
            }
          }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<AmpsError>();

        let error = AmpsError::invariant("superframe", "symbol count mismatch");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn defects_are_not_recoverable() {
        let invariant = AmpsError::invariant("superframe", "8333 bits");
        let symbol = AmpsError::InvalidSymbol { value: 7, position: 12 };

        assert!(invariant.is_defect());
        assert!(symbol.is_defect());
        assert!(!invariant.is_recoverable());
        assert!(!symbol.is_recoverable());
    }

    #[test]
    fn recovery_suggestions_are_descriptive() {
        let errors = [
            AmpsError::config("dcc out of range"),
            AmpsError::Uncorrectable { word_index: 1, copies: 5 },
            AmpsError::BusClosed,
        ];
        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }
    }

    #[test]
    fn yaml_errors_convert() {
        let parse: std::result::Result<u32, _> = serde_yaml_ng::from_str("[not, a, number]");
        let err: AmpsError = parse.unwrap_err().into();
        assert!(matches!(err, AmpsError::Yaml { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
