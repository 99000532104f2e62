//! This crate provides an interface for communicating with and controlling GW-Instek PSP-603
//! programmable power supplies.
//!
//! It supports `no-std` environments (with `alloc`) by disabling the default `std` feature.
//! You then supply your own [embedded_hal::delay::DelayNs] for the settle delays.
//!
//! The PSU speaks a line based ASCII protocol. Commands are terminated with `\r`, replies with
//! `\n`. Each setter waits a fixed settle time after sending so the following read is accurate.
//!
//! The serial port used for PSU comms should be configured like so:
//! * Default baud rate: 2400
//! * Data bits: 8
//! * Stop bits: 1
//! * Parity: None
//!
//! ```no_run
//! # fn demo<S: embedded_io::Read + embedded_io::Write>(port: S) -> psp603::error::Result<(), S::Error> {
//! use psp603::Psp603;
//!
//! let mut psu = Psp603::new(port);
//! psu.set_voltage(4.2)?;
//! psu.set_relay(true)?;
//! println!("{} A", psu.get_current()?);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod command;
#[cfg(feature = "std")]
pub mod delay;
pub mod error;
pub mod psu;
pub mod status;

#[cfg(test)]
mod mock_serial;

pub use psu::Psp603;
pub use status::{FullStatus, Status, StatusFlag};

/// Baud rate the PSP-603 ships with.
pub const DEFAULT_BAUD_RATE: u32 = 2400;
