//! Settle delays on a hosted target.

use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// Blocks the calling thread with [std::thread::sleep].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns.into()));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(ms.into()));
    }
}
