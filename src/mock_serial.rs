//! We use this mocking module in unit tests to emulate the PSU's serial port.

use embedded_hal::delay::DelayNs;

/// Our mock type used to emulate a serial port.
pub struct MockSerial {
    /// Buffer to store data written to the mock serial port
    write_buffer: heapless::Vec<u8, 256>,
    /// Buffer containing pre-configured response data to be read
    read_buffer: heapless::Vec<u8, 256>,
    /// Current position in the read buffer
    read_position: usize,
    /// Number of zero length reads to return before any data
    empty_reads: usize,
    /// Flag to simulate write errors
    should_error_on_write: bool,
    /// Flag to simulate read errors
    should_error_on_read: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum MockSerialError {
    /// Simulated buffer overflow
    #[error("Mock buffer overflow")]
    BufferOverflow,
    /// Generic simulated error for testing
    #[error("Simulated serial error")]
    SimulatedError,
    /// Would block - no data available
    #[error("No data available")]
    WouldBlock,
}

impl embedded_io::Error for MockSerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockSerialError::BufferOverflow => embedded_io::ErrorKind::OutOfMemory,
            MockSerialError::SimulatedError => embedded_io::ErrorKind::Other,
            MockSerialError::WouldBlock => embedded_io::ErrorKind::Other,
        }
    }
}

impl embedded_io::ErrorType for MockSerial {
    type Error = MockSerialError;
}

impl embedded_io::Write for MockSerial {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }

        self.write_buffer
            .extend_from_slice(buf)
            .map_err(|_| MockSerialError::BufferOverflow)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if self.should_error_on_write {
            return Err(MockSerialError::SimulatedError);
        }
        Ok(())
    }
}

impl embedded_io::Read for MockSerial {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.should_error_on_read {
            return Err(MockSerialError::SimulatedError);
        }

        if self.empty_reads > 0 {
            self.empty_reads -= 1;
            return Ok(0);
        }

        if self.read_position >= self.read_buffer.len() {
            return Err(MockSerialError::WouldBlock);
        }

        let available = &self.read_buffer[self.read_position..];
        let bytes_to_read = core::cmp::min(buf.len(), available.len());
        buf[..bytes_to_read].copy_from_slice(&available[..bytes_to_read]);

        self.read_position += bytes_to_read;
        Ok(bytes_to_read)
    }
}

impl MockSerial {
    /// Create a new MockSerial instance with empty buffers
    pub fn new() -> Self {
        Self {
            write_buffer: heapless::Vec::new(),
            read_buffer: heapless::Vec::new(),
            read_position: 0,
            empty_reads: 0,
            should_error_on_write: false,
            should_error_on_read: false,
        }
    }

    /// Set the data that will be returned when read() is called
    pub fn set_read_data(&mut self, data: &[u8]) -> Result<(), MockSerialError> {
        self.read_buffer.clear();
        self.read_position = 0;
        self.read_buffer
            .extend_from_slice(data)
            .map_err(|_| MockSerialError::BufferOverflow)
    }

    /// Return `Ok(0)` for the next `count` reads, like a port with nothing waiting.
    pub fn set_empty_reads(&mut self, count: usize) {
        self.empty_reads = count;
    }

    /// Get a reference to the data that was written to this mock serial port
    pub fn written_data(&self) -> &[u8] {
        &self.write_buffer
    }

    /// Clear the write buffer
    pub fn clear_written_data(&mut self) {
        self.write_buffer.clear();
    }

    /// Reset the read position to the beginning of the read buffer
    pub fn reset_read_position(&mut self) {
        self.read_position = 0;
    }

    /// Configure whether write operations should fail with an error
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }

    /// Configure whether read operations should fail with an error
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }
}

/// Records requested delays instead of waiting.
pub struct MockDelay {
    calls_ms: heapless::Vec<u32, 32>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self {
            calls_ms: heapless::Vec::new(),
        }
    }

    /// Every delay requested so far, in milliseconds.
    pub fn calls_ms(&self) -> &[u32] {
        &self.calls_ms
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls_ms.push(ns.div_ceil(1_000_000)).unwrap();
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls_ms.push(ms).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};
    use embedded_io::{Error, Read, Write};

    #[test]
    fn test_write_data() {
        let mut mock = MockSerial::new();
        mock.write_all(b"SV ").unwrap();
        mock.write_all(b"04.20\r").unwrap();
        assert_eq!(mock.written_data(), b"SV 04.20\r");
    }

    #[test]
    fn test_write_buffer_overflow() {
        let mut mock = MockSerial::new();
        let large_data = [0u8; 300];

        let result = mock.write(&large_data);
        assert!(matches!(result, Err(MockSerialError::BufferOverflow)));
    }

    #[test]
    fn test_read_one_byte_at_a_time() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"F1\n").unwrap();

        let mut byte = [0u8; 1];
        for expected in b"F1\n" {
            assert_eq!(mock.read(&mut byte).unwrap(), 1);
            assert_eq!(byte[0], *expected);
        }
        assert!(matches!(
            mock.read(&mut byte),
            Err(MockSerialError::WouldBlock)
        ));
    }

    #[test]
    fn test_empty_reads_come_first() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"x").unwrap();
        mock.set_empty_reads(2);

        let mut byte = [0u8; 1];
        assert_eq!(mock.read(&mut byte).unwrap(), 0);
        assert_eq!(mock.read(&mut byte).unwrap(), 0);
        assert_eq!(mock.read(&mut byte).unwrap(), 1);
        assert_eq!(&byte, b"x");
    }

    #[test]
    fn test_error_simulation() {
        let mut mock = MockSerial::new();
        mock.set_read_data(b"data").unwrap();
        mock.set_write_error(true);
        mock.set_read_error(true);

        let mut buffer = [0u8; 4];
        assert!(mock.write(b"test").is_err());
        assert!(mock.flush().is_err());
        assert!(mock.read(&mut buffer).is_err());
        assert!(mock.written_data().is_empty());

        mock.set_write_error(false);
        mock.set_read_error(false);
        assert!(mock.write(b"test").is_ok());
        assert_eq!(mock.read(&mut buffer).unwrap(), 4);
    }

    #[test]
    fn test_errors_are_core_errors() {
        fn assert_core_error<E: core::error::Error>(err: E) -> String {
            err.to_string()
        }
        assert_eq!(assert_core_error(MockSerialError::WouldBlock), "No data available");
        assert_eq!(
            assert_core_error(crate::error::Error::SerialError(MockSerialError::SimulatedError)),
            "Serial communication error"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            MockSerialError::BufferOverflow.kind(),
            embedded_io::ErrorKind::OutOfMemory
        ));
        assert!(matches!(
            MockSerialError::SimulatedError.kind(),
            embedded_io::ErrorKind::Other
        ));
    }

    #[test]
    fn test_mock_delay_records() {
        let mut delay = MockDelay::new();
        delay.delay_ms(600);
        delay.delay_ns(1_500_000);
        assert_eq!(delay.calls_ms(), &[600, 2]);
    }
}
