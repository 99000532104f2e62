//! Decoding of the PSP-603 reply lines.
//!
//! The PSU answers with fixed-width lines, so every field lives at a known character offset.
//! These parsers only see the received line and never touch the transport.

use core::ops::Range;

use strum_macros::{EnumCount, EnumIter};

use crate::error::DecodeError;

/// The six flags reported by the PSU, in wire order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, EnumCount)]
#[repr(usize)]
pub enum StatusFlag {
    /// Output relay closed. (Output on.)
    Relay = 0,
    /// PSU is overheating.
    Overheated = 1,
    /// Knob is in fine adjustment mode.
    FineControl = 2,
    /// Knob is locked out.
    KnobLocked = 3,
    /// PSU is in remote mode.
    Remote = 4,
    /// Front panel is locked.
    Locked = 5,
}

/// Offset of the first flag in a `F` reply. Index 0 echoes the query.
pub const STATUS_FLAGS_START: usize = 1;

/// Field offsets in a `L` reply, e.g. `V12.34A1.500W018.5U20I2.00P200F100110`.
pub const FULL_VOLTAGE: Range<usize> = 1..6;
pub const FULL_CURRENT: Range<usize> = 7..12;
pub const FULL_POWER: Range<usize> = 13..18;
pub const FULL_VOLTAGE_LIMIT: Range<usize> = 19..21;
pub const FULL_CURRENT_LIMIT: Range<usize> = 22..26;
pub const FULL_POWER_LIMIT: Range<usize> = 27..30;
/// Offset of the first flag in a `L` reply.
pub const FULL_FLAGS_START: usize = 31;

/// Basic PSU status, as returned by the `F` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Status {
    pub relay: bool,
    pub overheated: bool,
    pub fine_control: bool,
    pub knob_locked: bool,
    pub remote: bool,
    pub locked: bool,
}

impl Status {
    /// Look up a single flag.
    pub fn flag(&self, flag: StatusFlag) -> bool {
        match flag {
            StatusFlag::Relay => self.relay,
            StatusFlag::Overheated => self.overheated,
            StatusFlag::FineControl => self.fine_control,
            StatusFlag::KnobLocked => self.knob_locked,
            StatusFlag::Remote => self.remote,
            StatusFlag::Locked => self.locked,
        }
    }

    /// Decode six consecutive flag characters starting at `start`.
    ///
    /// Only `'1'` counts as set.
    fn decode_at(response: &str, start: usize) -> Result<Self, DecodeError> {
        let flag = |flag: StatusFlag| flag_at(response, start + flag as usize);
        Ok(Self {
            relay: flag(StatusFlag::Relay)?,
            overheated: flag(StatusFlag::Overheated)?,
            fine_control: flag(StatusFlag::FineControl)?,
            knob_locked: flag(StatusFlag::KnobLocked)?,
            remote: flag(StatusFlag::Remote)?,
            locked: flag(StatusFlag::Locked)?,
        })
    }
}

/// Everything the PSU reports, as returned by the `L` query.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FullStatus {
    /// Present output voltage, in volts.
    pub voltage: f32,
    /// Present output current, in amps.
    pub current: f32,
    /// Present output power, in watts.
    pub power: f32,
    /// Voltage limit, in volts.
    pub voltage_limit: f32,
    /// Current limit, in amps.
    pub current_limit: f32,
    /// Power limit, in watts.
    pub power_limit: f32,
    /// The same six flags as a `F` query.
    pub status: Status,
}

/// Decode the reply to a single-value query such as `V` -> `V12.34`.
pub fn parse_reading(response: &str) -> Result<f32, DecodeError> {
    ascii(response)?;
    number(response, 1..response.len().max(1))
}

/// Decode the reply to the `F` query.
pub fn parse_status(response: &str) -> Result<Status, DecodeError> {
    ascii(response)?;
    Status::decode_at(response, STATUS_FLAGS_START)
}

/// Decode the reply to the `L` query.
pub fn parse_full_status(response: &str) -> Result<FullStatus, DecodeError> {
    ascii(response)?;
    Ok(FullStatus {
        voltage: number(response, FULL_VOLTAGE)?,
        current: number(response, FULL_CURRENT)?,
        power: number(response, FULL_POWER)?,
        voltage_limit: number(response, FULL_VOLTAGE_LIMIT)?,
        current_limit: number(response, FULL_CURRENT_LIMIT)?,
        power_limit: number(response, FULL_POWER_LIMIT)?,
        status: Status::decode_at(response, FULL_FLAGS_START)?,
    })
}

/// Offsets count bytes, which only line up with the PSU's characters for ASCII lines.
fn ascii(response: &str) -> Result<(), DecodeError> {
    match response.bytes().position(|b| !b.is_ascii()) {
        Some(index) => Err(DecodeError::NotAscii { index }),
        None => Ok(()),
    }
}

fn field(response: &str, range: Range<usize>) -> Result<&str, DecodeError> {
    let needed = range.end;
    response.get(range).ok_or(DecodeError::Truncated {
        needed,
        len: response.len(),
    })
}

fn number(response: &str, range: Range<usize>) -> Result<f32, DecodeError> {
    Ok(field(response, range)?.trim().parse::<f32>()?)
}

fn flag_at(response: &str, index: usize) -> Result<bool, DecodeError> {
    response
        .as_bytes()
        .get(index)
        .map(|&c| c == b'1')
        .ok_or(DecodeError::Truncated {
            needed: index + 1,
            len: response.len(),
        })
}
