//! The outbound commands understood by the PSP-603 and how they look on the wire.

use core::fmt::Write;

use fugit::MillisDurationU32;
use strum_macros::EnumIter;

/// Appended to every outbound command.
pub const COMMAND_TERMINATOR: u8 = 0x0D;

/// Longest rendered command we expect. `SV 60.00` is 8 bytes.
pub const COMMAND_CAPACITY: usize = 16;

/// Time for the output to settle after changing the voltage, voltage limit or current limit.
pub const SETPOINT_SETTLE: MillisDurationU32 = MillisDurationU32::from_ticks(600);
/// Time for the output relay to settle after switching.
pub const RELAY_SETTLE: MillisDurationU32 = MillisDurationU32::from_ticks(500);
/// Time the PSU needs to write its EEPROM.
pub const EEPROM_SETTLE: MillisDurationU32 = MillisDurationU32::from_ticks(1000);

/// A rendered command, without the terminator.
pub type CommandBuffer = heapless::String<COMMAND_CAPACITY>;

/// Commands which make the PSU reply with a single line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
pub enum Query {
    /// __R__ - Output voltage, in volts.
    ///
    /// Reply looks like `V12.34`.
    Voltage,
    /// __R__ - Voltage limit, in volts.
    VoltageLimit,
    /// __R__ - Output current, in amps. There is no matching setter.
    Current,
    /// __R__ - Current limit, in amps.
    CurrentLimit,
    /// __R__ - Output power, in watts. There is no matching setter.
    Power,
    /// __R__ - Power limit, in watts.
    PowerLimit,
    /// __R__ - The six status flags.
    ///
    /// See [`Status`](crate::status::Status).
    Status,
    /// __R__ - All readings, limits and flags in one fixed-width line.
    ///
    /// See [`FullStatus`](crate::status::FullStatus).
    FullStatus,
}

impl Query {
    /// The single letter sent for this query.
    pub const fn code(self) -> &'static str {
        match self {
            Query::Voltage => "V",
            Query::VoltageLimit => "U",
            Query::Current => "A",
            Query::CurrentLimit => "I",
            Query::Power => "W",
            Query::PowerLimit => "P",
            Query::Status => "F",
            Query::FullStatus => "L",
        }
    }
}

/// Every command this crate sends.
///
/// Setpoint commands carry their value. Each quantity has its own number format on the wire
/// matching the resolution the PSU accepts for it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Command {
    Query(Query),
    /// `SV %05.2f`
    SetVoltage(f32),
    /// `SU %02d`
    SetVoltageLimit(u8),
    /// `SI %04.2f`
    SetCurrentLimit(f32),
    /// `SW %03d`
    SetPowerLimit(u16),
    /// `KOE` - close the output relay. (Output on.)
    RelayClose,
    /// `KOD` - open the output relay. (Output off.)
    RelayOpen,
    /// `EEP` - store the present settings in EEPROM.
    SaveParams,
}

impl Command {
    /// Render the command as sent on the wire, minus the terminator.
    pub fn render(&self) -> Result<CommandBuffer, core::fmt::Error> {
        let mut buf = CommandBuffer::new();
        match *self {
            Command::Query(query) => buf.push_str(query.code()).map_err(|_| core::fmt::Error)?,
            Command::SetVoltage(volts) => write!(buf, "SV {:05.2}", volts)?,
            Command::SetVoltageLimit(volts) => write!(buf, "SU {:02}", volts)?,
            Command::SetCurrentLimit(amps) => write!(buf, "SI {:04.2}", amps)?,
            Command::SetPowerLimit(watts) => write!(buf, "SW {:03}", watts)?,
            Command::RelayClose => buf.push_str("KOE").map_err(|_| core::fmt::Error)?,
            Command::RelayOpen => buf.push_str("KOD").map_err(|_| core::fmt::Error)?,
            Command::SaveParams => buf.push_str("EEP").map_err(|_| core::fmt::Error)?,
        }
        Ok(buf)
    }

    /// How long to wait after sending this command before the PSU can be trusted again.
    ///
    /// Power limit changes apply immediately.
    pub const fn settle_time(&self) -> Option<MillisDurationU32> {
        match self {
            Command::SetVoltage(_) | Command::SetVoltageLimit(_) | Command::SetCurrentLimit(_) => {
                Some(SETPOINT_SETTLE)
            }
            Command::RelayClose | Command::RelayOpen => Some(RELAY_SETTLE),
            Command::SaveParams => Some(EEPROM_SETTLE),
            Command::Query(_) | Command::SetPowerLimit(_) => None,
        }
    }
}

impl From<Query> for Command {
    fn from(value: Query) -> Self {
        Command::Query(value)
    }
}
