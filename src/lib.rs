//! AM2301 Sensor Driver for Embedded Rust
//!
//! This crate decodes the single-wire, pulse-width encoded protocol of the
//! AM2301 (DHT21/DHT22 family) temperature and humidity sensor.
//!
//! # Features
//! - Blocking synchronous API, busy-polling a microsecond clock for edge timing
//! - Majority-of-three sampling to reject line glitches
//! - Checksum and sensor range validation
//! - Bounded retries with a fixed backoff
//! - Designed for `no_std` environments
//!
//! # Dependencies
//! The driver talks to the hardware through:
//! - [`Line`], implemented for any open-drain `embedded-hal` pin by [`OpenDrainLine`]
//! - [`Clock`], a free-running microsecond counter
//! - [`DelayNs`] for the fixed holds and the retry backoff
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and enables logging through `defmt`
//!
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod am2301;
pub mod error;
pub mod frame;
pub mod handshake;
pub mod line;
pub mod reader;
pub mod wait;

#[cfg(test)]
mod sim;

pub use am2301::{Am2301, Config};
pub use error::Am2301Error;
pub use frame::{Frame, Reading};
pub use handshake::Handshake;
pub use line::{Clock, Direction, Level, Line, OpenDrainLine};
pub use reader::FrameReader;
