use alloc::string::String;

use embedded_hal::delay::DelayNs;
use fugit::MillisDurationU32;
use log::{debug, trace};

use crate::{
    command::{COMMAND_TERMINATOR, Command, Query},
    error::{Error, Result},
    status::{self, FullStatus, Status},
};

/// Marks the end of every reply from the PSU.
pub const RESPONSE_TERMINATOR: u8 = 0x0A;

/// You can create a Psp603 using any interface which implements [embedded_io::Read] & [embedded_io::Write],
/// already opened at the right baud rate. See [crate::DEFAULT_BAUD_RATE].
///
/// Every method is a fresh round trip to the PSU, nothing is cached. Setters block for the
/// settle time of their command before returning so a following read can be trusted.
///
/// Reads block until the PSU sends a complete line. There is no timeout at this layer, pick a
/// transport which can time out if that matters.
pub struct Psp603<S: embedded_io::Read + embedded_io::Write, D: DelayNs> {
    interface: S,
    delay: D,
}

#[cfg(feature = "std")]
impl<S: embedded_io::Read + embedded_io::Write> Psp603<S, crate::delay::StdDelay> {
    /// Create a new Psp603 which sleeps the calling thread for settle delays.
    pub fn new(interface: S) -> Self {
        Self::with_delay(interface, crate::delay::StdDelay)
    }
}

impl<S: embedded_io::Read + embedded_io::Write, D: DelayNs> Psp603<S, D> {
    /// Create a new Psp603 using the given delay provider for settle delays.
    pub fn with_delay(interface: S, delay: D) -> Self {
        Self { interface, delay }
    }

    /// Hand the interface back. Closing it is up to the caller.
    pub fn release(self) -> S {
        self.interface
    }

    /// Return the measured output voltage in volts.
    pub fn get_voltage(&mut self) -> Result<f32, S::Error> {
        self.read_value(Query::Voltage)
    }

    /// Set the output target voltage in volts.
    ///
    /// Sent with two decimals, e.g. `4.2` => `SV 04.20`.
    pub fn set_voltage(&mut self, volts: f32) -> Result<(), S::Error> {
        debug!("Setting output voltage to {volts:.2} V");
        self.send(Command::SetVoltage(volts))
    }

    /// Return the voltage limit in volts.
    pub fn get_voltage_limit(&mut self) -> Result<f32, S::Error> {
        self.read_value(Query::VoltageLimit)
    }

    /// Set the voltage limit. The PSU only takes whole volts here.
    pub fn set_voltage_limit(&mut self, volts: u8) -> Result<(), S::Error> {
        debug!("Setting voltage limit to {volts} V");
        self.send(Command::SetVoltageLimit(volts))
    }

    /// Return the measured output current in amps.
    ///
    /// The output current can't be set, see [Self::set_current_limit].
    pub fn get_current(&mut self) -> Result<f32, S::Error> {
        self.read_value(Query::Current)
    }

    /// Return the current limit in amps.
    pub fn get_current_limit(&mut self) -> Result<f32, S::Error> {
        self.read_value(Query::CurrentLimit)
    }

    /// Set the current limit in amps.
    pub fn set_current_limit(&mut self, amps: f32) -> Result<(), S::Error> {
        debug!("Setting current limit to {amps:.2} A");
        self.send(Command::SetCurrentLimit(amps))
    }

    /// Return the measured output power in watts.
    pub fn get_power(&mut self) -> Result<f32, S::Error> {
        self.read_value(Query::Power)
    }

    /// Return the power limit in watts.
    pub fn get_power_limit(&mut self) -> Result<f32, S::Error> {
        self.read_value(Query::PowerLimit)
    }

    /// Set the power limit in whole watts. Applies immediately, there is no settle delay.
    pub fn set_power_limit(&mut self, watts: u16) -> Result<(), S::Error> {
        debug!("Setting power limit to {watts} W");
        self.send(Command::SetPowerLimit(watts))
    }

    /// Read the six status flags.
    pub fn get_status(&mut self) -> Result<Status, S::Error> {
        let response = self.query(Query::Status)?;
        Ok(status::parse_status(&response)?)
    }

    /// Read every measurement, limit and flag in one go.
    pub fn get_full_status(&mut self) -> Result<FullStatus, S::Error> {
        let response = self.query(Query::FullStatus)?;
        Ok(status::parse_full_status(&response)?)
    }

    /// True if the PSU is overheating.
    pub fn get_overheated(&mut self) -> Result<bool, S::Error> {
        Ok(self.get_status()?.overheated)
    }

    /// True if the knob is in fine control mode.
    pub fn get_fine_control(&mut self) -> Result<bool, S::Error> {
        Ok(self.get_status()?.fine_control)
    }

    /// True if the knob is locked.
    pub fn get_knob_locked(&mut self) -> Result<bool, S::Error> {
        Ok(self.get_status()?.knob_locked)
    }

    /// True if the PSU is in remote mode.
    pub fn get_remote(&mut self) -> Result<bool, S::Error> {
        Ok(self.get_status()?.remote)
    }

    /// True if the PSU is locked.
    pub fn get_locked(&mut self) -> Result<bool, S::Error> {
        Ok(self.get_status()?.locked)
    }

    /// True when the output relay is closed, i.e. the output is on.
    pub fn get_relay(&mut self) -> Result<bool, S::Error> {
        Ok(self.get_status()?.relay)
    }

    /// Close (`true`) or open (`false`) the output relay.
    ///
    /// The PSU has a toggle command too, it is not used. Read the state and write the inverse.
    pub fn set_relay(&mut self, closed: bool) -> Result<(), S::Error> {
        debug!("{} output relay", if closed { "Closing" } else { "Opening" });
        if closed {
            self.send(Command::RelayClose)
        } else {
            self.send(Command::RelayOpen)
        }
    }

    /// Save the present settings to the PSU's EEPROM.
    pub fn save_params(&mut self) -> Result<(), S::Error> {
        debug!("Saving settings to EEPROM");
        self.send(Command::SaveParams)
    }

    /// Send a raw command, adding the terminator, then wait `settle` if given.
    ///
    /// Nothing is read back.
    pub fn send_command(
        &mut self,
        command: &str,
        settle: Option<MillisDurationU32>,
    ) -> Result<(), S::Error> {
        trace!("-> {command:?}");
        self.interface
            .write_all(command.as_bytes())
            .map_err(Error::SerialError)?;
        self.interface
            .write_all(&[COMMAND_TERMINATOR])
            .map_err(Error::SerialError)?;
        self.interface.flush().map_err(Error::SerialError)?;

        if let Some(settle) = settle {
            self.delay.delay_ms(settle.to_millis());
        }
        Ok(())
    }

    /// Read a reply line from the PSU, one byte at a time.
    ///
    /// The returned string still ends with the `\n` terminator. Blocks until it arrives.
    ///
    /// A read returning `Ok(0)` is retried immediately, so an interface reporting end of file
    /// keeps this spinning forever. Interfaces should block in `read` (or return an error)
    /// rather than return `Ok(0)` on a read timeout.
    pub fn receive(&mut self) -> Result<String, S::Error> {
        let mut response = String::new();
        let mut byte = [0u8; 1];
        while !response.ends_with(char::from(RESPONSE_TERMINATOR)) {
            // A zero length read just means nothing has arrived yet.
            let bytes_read = self
                .interface
                .read(&mut byte)
                .map_err(Error::SerialError)?;
            if bytes_read == 1 {
                response.push(char::from(byte[0]));
            }
        }
        trace!("<- {response:?}");
        Ok(response)
    }

    /// Send a typed command, waiting out its settle time.
    pub fn send(&mut self, command: Command) -> Result<(), S::Error> {
        let rendered = command.render().map_err(|_| Error::CommandTooLong)?;
        self.send_command(&rendered, command.settle_time())
    }

    /// Send a query and return the raw reply line.
    pub fn query(&mut self, query: Query) -> Result<String, S::Error> {
        self.send(Command::Query(query))?;
        self.receive()
    }

    fn read_value(&mut self, query: Query) -> Result<f32, S::Error> {
        let response = self.query(query)?;
        Ok(status::parse_reading(&response)?)
    }
}
