//! Control channel engine for the AMPS analog cellular air interface.
//!
//! AMPS Control generates the forward control channel a base station
//! broadcasts and decodes the reverse control channel mobiles answer on.
//!
//! # Features
//!
//! - **Forward control channel**: cyclic overhead superframe, BCH(40,28)
//!   coding, busy/idle interleaving and one-shot page injection behind a
//!   pull interface
//! - **Reverse control channel**: sync search over a bounded buffer,
//!   five-copy BCH(48,36) word recovery and the page response, origination and
//!   registration grammar
//! - **Forward voice channel**: blank-and-burst alert batches with an
//!   automatic switch-off countdown
//! - **Message bus**: operator commands, decode events and control signals on
//!   a tokio broadcast bus
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use amps_control::{BusMessage, Station};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> amps_control::Result<()> {
//!     let station = Station::load("station.yaml")?;
//!     let driver = station.spawn_driver();
//!     let mut events = station.bus().subscribe();
//!     let parts = station.into_parts();
//!
//!     // Hand parts.forward, parts.voice and parts.reverse to the sample
//!     // threads, then page a mobile:
//!     parts.bus.command("page 2125551234")?;
//!
//!     while let Some(message) = events.next().await {
//!         if let BusMessage::Decoded(event) = message {
//!             println!("{}", event);
//!         }
//!     }
//!     driver.shutdown().await;
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod codec;
pub mod config;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Channel engines
pub mod focc;
pub mod fvc;
pub mod recc;

// Messaging and orchestration
pub mod bus;
pub mod command;
pub mod driver;
mod station;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use bus::{Bus, BusMessage};
pub use command::{CommandProcessor, MessageHandler};
pub use config::StationConfig;
pub use driver::{Driver, DriverHandle};
pub use focc::{ForwardControlChannel, FrameInjector};
pub use fvc::{ForwardVoiceChannel, VoiceLoader};
pub use recc::{ReverseControlChannel, ReverseMessage};
pub use station::{ReverseReceiver, Station, StationParts};
