//! This is a platform-agnostic Rust driver for the Sensirion SEN66 environmental sensor module
//! using the [`embedded-hal`] or [`embedded-hal-async`] traits.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//! [`embedded-hal-async`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal-async
//!
//! This driver allows you to:
//! - Find the module on the bus and check its product name, firmware version and serial number.
//! - Start and stop continuous measurement.
//! - Poll the data-ready flag and read measurement samples (PM1.0, PM2.5, PM4.0, PM10, RH, T,
//!   VOC index, NOx index and CO₂).
//! - Read raw sensor signals and particle number concentrations.
//! - Read and optionally clear the device status bits.
//! - Run the fan cleaning, either forced or on a randomized schedule.
//! - Activate the SHT heater and read its RH/T result.
//! - Read the ambient pressure and altitude used for CO₂ compensation.
//! - Trigger a software reset.
//! - Feed an external watchdog during long operations.
//! - blocking API support.
//! - async API support.
//!
//! This driver does not yet support the following device features:
//! - Writing configuration (temperature offset/acceleration, ambient pressure, altitude,
//!   VOC/NOx tuning parameters).
//! - Forced CO₂ recalibration and automatic self-calibration settings.
//!
//! ## Features
//!
//! - `async`: Enables async API.
//! - `blocking`: Enables blocking API.
//! - `defmt`: Enables logging using the `defmt` framework.
//! - `log`: Enables logging using the `log` framework.
//!
//! ## Operating modes
//!
//! The module is either idle or measuring. Every command is only accepted in the mode(s) the
//! datasheet allows; the driver refuses anything else with [`Error::ModeViolation`] before
//! touching the bus. Measurement is entered with `start` and left with `stop`.
//!
//! ## Fan cleaning
//!
//! After every sample read by `get_data` the driver checks whether a fan cleaning is due. The
//! interval is drawn at random between the bounds in [`Config`] (one to two days by default)
//! and redrawn after every cleaning. A cleaning stops the measurement, runs the fan at full
//! speed for about 15 seconds and restarts the measurement. `clean(true)` forces one.
//!
//! Datasheet: [SEN6x](https://sensirion.com/resource/datasheet/SEN6x)
//!
//! To use this driver, import this crate and an `embedded_hal` or `embedded_hal_async`
//! implementation, then instantiate the device.
//!
//! ## Blocking Example:
//!
//! ```ignore
//! use sen66::{blocking::Sen66, Clock, Config};
//!
//! // Platform-specific
//! let i2c = /* embedded_hal::i2c::I2c instance */;
//! let delay = /* embedded_hal::delay::DelayNs instance */;
//! let clock = /* sen66::Clock instance */;
//! let rng = /* rand::RngCore instance */;
//!
//! let mut sen66 = Sen66::new(i2c, delay, clock, rng, Config::default());
//! let identity = sen66.initialize().unwrap();
//! println!("found {identity}");
//!
//! sen66.start().unwrap();
//! loop {
//!     if let Some(sample) = sen66.get_data().unwrap() {
//!         println!("PM2.5 {:?} µg/m³, CO₂ {:?} ppm", sample.pm2_5, sample.co2_ppm);
//!     }
//!     // Platform-specific: sleep a while
//!     sleep_secs(1);
//! }
//! ```
//!
//! ## Async Example:
//!
//! ```ignore
//! use sen66::{asynch::Sen66, Config};
//!
//! // Platform-specific
//! let i2c = /* embedded_hal_async::i2c::I2c instance */;
//! let delay = /* embedded_hal_async::delay::DelayNs instance */;
//! let wdt = /* sen66::Watchdog instance */;
//!
//! let mut sen66 = Sen66::new(i2c, delay, clock, rng, Config::default()).with_watchdog(wdt);
//! sen66.initialize().await.unwrap();
//! sen66.start().await.unwrap();
//! sen66.clean(true).await.unwrap();
//! loop {
//!     if let Some(sample) = sen66.get_data().await.unwrap() {
//!         println!("{:?}", sample);
//!     }
//!     sleep_secs(1).await;
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

#[cfg(not(any(feature = "async", feature = "blocking")))]
compile_error!("At least one of \"async\" and \"blocking\" features must be enabled");

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

#[cfg(feature = "async")]
pub mod asynch;
#[cfg(feature = "blocking")]
pub mod blocking;
mod catalog;
mod frame;
mod hw_def;
pub mod integrity;
mod schedule;
mod state;
#[cfg(test)]
mod testing;
mod types;

pub use crate::{
    catalog::*,
    frame::{MAX_STRING_LEN, RawFrame, triplets, validate},
    hw_def::*,
    schedule::*,
    types::*,
};
