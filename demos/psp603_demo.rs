//! Exercise a PSP-603 over a real serial port.
//!
//! PLEASE DISCONNECT ANYTHING FROM THE PSU THAT MIGHT BE DAMAGED BY HIGH VOLTAGE!
//!
//! Usage: `cargo run --example psp603_demo [serial port]`
//!
//! Set `RUST_LOG=trace` to see every command and reply.

use std::env;
use std::error::Error;
use std::time::Duration;

use inquire::Select;
use psp603::{DEFAULT_BAUD_RATE, Psp603};
use serialport::SerialPort;

// How often a blocked read wakes up before trying again.
const SERIAL_TIMEOUT_MS: u64 = 1000;
const VOLTAGE_LIMIT_MAX: u8 = 60;
const SWEEP_REPEATS: usize = 5;

pub struct PortWrapper(Box<dyn SerialPort>);

#[derive(Debug)]
pub struct IoError(std::io::Error);

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl embedded_io::Error for IoError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self.0.kind() {
            std::io::ErrorKind::NotFound => embedded_io::ErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => embedded_io::ErrorKind::PermissionDenied,
            std::io::ErrorKind::BrokenPipe => embedded_io::ErrorKind::BrokenPipe,
            std::io::ErrorKind::InvalidInput => embedded_io::ErrorKind::InvalidInput,
            std::io::ErrorKind::InvalidData => embedded_io::ErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut => embedded_io::ErrorKind::TimedOut,
            std::io::ErrorKind::Interrupted => embedded_io::ErrorKind::Interrupted,
            std::io::ErrorKind::Unsupported => embedded_io::ErrorKind::Unsupported,
            _ => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for PortWrapper {
    type Error = IoError;
}

impl embedded_io::Read for PortWrapper {
    /// Blocks until at least one byte arrives. Port timeouts are retried, `Ok(0)` stays EOF.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        loop {
            match std::io::Read::read(&mut self.0, buf) {
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                other => return other.map_err(IoError),
            }
        }
    }
}

impl embedded_io::Write for PortWrapper {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        std::io::Write::write(&mut self.0, buf).map_err(IoError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        std::io::Write::flush(&mut self.0).map_err(IoError)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Get serial port from command line arg or interactive selection
    let port_name = match env::args().nth(1) {
        Some(port_name) => port_name,
        None => {
            let ports = serialport::available_ports()?;
            if ports.is_empty() {
                eprintln!("No serial ports found!");
                std::process::exit(1);
            }
            let port_names: Vec<String> = ports.iter().map(|p| p.port_name.clone()).collect();
            Select::new("Select a serial port:", port_names).prompt()?
        }
    };

    println!("Using port: {}", port_name);

    let port = serialport::new(&port_name, DEFAULT_BAUD_RATE)
        .timeout(Duration::from_millis(SERIAL_TIMEOUT_MS))
        .open()?;

    let mut psu = Psp603::new(PortWrapper(port));

    println!("Output Voltage: {:.2} V", psu.get_voltage()?);
    println!("Output Current: {:.3} A", psu.get_current()?);
    println!("Output Power: {:.1} W", psu.get_power()?);
    println!("Limit Voltage: {:.0} V", psu.get_voltage_limit()?);
    println!("Limit Current: {:.2} A", psu.get_current_limit()?);
    println!("Limit Power: {:.0} W", psu.get_power_limit()?);

    println!("Relay: {}", psu.get_relay()?);
    println!("Overheating: {}", psu.get_overheated()?);
    println!("Fine Knob Mode: {}", psu.get_fine_control()?);
    println!("Remote Mode: {}", psu.get_remote()?);
    println!("Knob Locked: {}", psu.get_knob_locked()?);
    println!("Locked: {}", psu.get_locked()?);

    println!("{:#?}", psu.get_full_status()?);

    psu.set_relay(false)?;

    // Current limit 0.0 -> 0.8 -> 0.2 A, then park at 0.5 A.
    let up = (0..10).step_by(2);
    let down = (1..=10).rev().step_by(2);
    for tenths in up.chain(down) {
        let amps = tenths as f32 * 0.1;
        println!("Setting Current Limit to {:5.2}...", amps);
        psu.set_current_limit(amps)?;
    }
    println!("Setting Current Limit to {:5.2}...", 0.5);
    psu.set_current_limit(0.5)?;

    println!("Setting Output Voltage to 0...");
    psu.set_voltage(0.0)?;

    let up = (0..VOLTAGE_LIMIT_MAX).step_by(12);
    let down = (1..=VOLTAGE_LIMIT_MAX).rev().step_by(12);
    for volts in up.chain(down) {
        println!("Setting Voltage Limit to {:5.2}...", volts as f32);
        psu.set_voltage_limit(volts)?;
    }
    println!("Setting Voltage Limit to {:5.2}...", VOLTAGE_LIMIT_MAX as f32);
    psu.set_voltage_limit(VOLTAGE_LIMIT_MAX)?;

    for _ in 0..SWEEP_REPEATS {
        zero_output(&mut psu)?;
        for volts in (0..VOLTAGE_LIMIT_MAX).step_by(12) {
            println!("Setting Output Voltage to {:5.2}...", volts as f32);
            psu.set_voltage(volts as f32)?;
        }
    }
    zero_output(&mut psu)?;

    println!("Inverting relay.");
    let relay = psu.get_relay()?;
    psu.set_relay(!relay)?;
    println!("Turning relay off.");
    psu.set_relay(false)?;

    Ok(())
}

/// Set the output to 0 V and wait until the PSU reports it.
fn zero_output(psu: &mut Psp603<PortWrapper, psp603::delay::StdDelay>) -> Result<(), Box<dyn Error>> {
    println!("Setting Output Voltage to 0...");
    psu.set_voltage(0.0)?;
    while psu.get_voltage()? != 0.0 {
        println!("Output Voltage: {:.2} V", psu.get_voltage()?);
        println!("Output Wattage: {:.1} W", psu.get_power()?);
    }
    Ok(())
}
