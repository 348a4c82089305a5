#![allow(dead_code)]

use embedded_hal::blocking::delay::DelayMs;
use imx294_i2c::registers::COMMON_REGISTERS;
use imx294_i2c::{Config, Imx294, Mode, PowerControl, RegisterTransport};

#[derive(Debug, PartialEq)]
pub struct BusFault;

#[derive(Debug, PartialEq)]
pub struct PowerFault;

/// Records every successful register write
#[derive(Debug, Default)]
pub struct MockTransport {
    pub writes: Vec<(u16, Vec<u8>)>,
    pub attempts: usize,
    /// Fail the write attempt with this 1-based index
    pub fail_at: Option<usize>,
    /// Fail every write to this address
    pub fail_address: Option<u16>,
    pub chip_id: u32,
    pub reads: usize,
}

impl RegisterTransport for MockTransport {
    type Error = BusFault;

    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), BusFault> {
        self.attempts += 1;
        if self.fail_at == Some(self.attempts) || self.fail_address == Some(address) {
            return Err(BusFault);
        }
        self.writes.push((address, data.to_vec()));
        Ok(())
    }

    fn read(&mut self, _address: u16, _len: usize) -> Result<u32, BusFault> {
        self.reads += 1;
        Ok(self.chip_id)
    }
}

impl MockTransport {
    pub fn clear(&mut self) {
        self.writes.clear();
        self.attempts = 0;
        self.fail_at = None;
        self.fail_address = None;
    }

    pub fn addresses(&self) -> Vec<u16> {
        self.writes.iter().map(|(a, _)| *a).collect()
    }
}

#[derive(Debug, Default)]
pub struct MockPower {
    pub acquires: usize,
    pub releases: usize,
    pub fail: bool,
}

impl PowerControl for MockPower {
    type Error = PowerFault;

    fn acquire(&mut self) -> Result<(), PowerFault> {
        if self.fail {
            return Err(PowerFault);
        }
        self.acquires += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}

#[derive(Debug, Default)]
pub struct MockDelay {
    pub total_ms: u32,
}

impl DelayMs<u16> for MockDelay {
    fn delay_ms(&mut self, ms: u16) {
        self.total_ms += u32::from(ms);
    }
}

pub type TestSensor = Imx294<MockTransport, MockPower, MockDelay>;

pub fn sensor() -> TestSensor {
    Imx294::new(
        MockTransport::default(),
        MockPower::default(),
        MockDelay::default(),
        Config::default().with_debug(true),
    )
    .unwrap()
}

pub fn common_writes() -> usize {
    COMMON_REGISTERS.iter().filter(|r| r.is_write()).count()
}

pub fn mode_writes(mode: &Mode) -> usize {
    mode.registers.iter().filter(|r| r.is_write()).count()
}

/// VMAX + compensation, HMAX + mirrors, SHR, gain
pub const CONTROL_WRITES: usize = 6 + 3 + 1 + 1;

/// Final mode select after control replay
pub const STREAM_ON_WRITES: usize = 1;
