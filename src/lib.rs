//! Crate for talking to a Tympan hearing-aid development board over its USB serial link
//!
//! The Tympan answers single-character commands with free-form text and never marks the end of a
//! reply; a reply is over once the device has been quiet for a while. This crate collects such
//! replies, decodes the calibration measurements and SD card listings inside them, and copies
//! files off the SD card.
//!
//! # Usage
//! ```no_run
//! use tympan::{commands::Calibration, config::{PortConfig, SweepSpeed}, Tympan};
//!
//! fn main() -> Result<(), tympan::Error> {
//!     let mut device = Tympan::open(&PortConfig::new("/dev/ttyACM0"))?;
//!     let table = device.run_calibration(SweepSpeed::Fast)?;
//!     println!("{:?}", table.freqs_hz());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub mod commands;

pub mod config;

pub mod device;

mod error;
pub use error::Error;
use error::Result;

mod interface;
pub use interface::Tympan;

pub mod parse;

mod tympan_device;
pub use tympan_device::TympanDevice;
