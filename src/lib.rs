//! DHT11 Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic driver for the DHT11 temperature
//! and humidity sensor, built on top of the [`embedded-hal`] traits.
//!
//! The DHT11 must not be sampled more often than once every two seconds, so
//! the driver keeps the last checksum-valid reading and only talks to the
//! sensor again once that reading has gone stale. Protocol failures (absent
//! sensor, corrupted frame) are swallowed: callers keep receiving the last
//! good values — zeros before the first successful read — and can inspect
//! [`Dht11::has_valid_data`] and [`Dht11::has_stale_data`] to tell how much
//! to trust them. This keeps a control loop running even with a flaky or
//! unplugged sensor.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Last-known-good caching with a 2 s staleness window
//! - Designed for `no_std` environments
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`InputPin`] and [`OutputPin`] for GPIO access
//! - [`DelayNs`] for accurate timing
//!
//! `embedded-hal` has no time-keeping trait, so staleness tracking uses the
//! crate's own one-method [`Clock`] trait; implement it over whatever tick
//! source the target offers.
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` for logging support
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod dht11;
pub mod error;

pub use clock::Clock;
pub use dht11::{Dht11, SensorReading};
pub use error::DhtError;
