/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Sensor power sequencing

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

/// Time from XCLR going high until the sensor accepts register writes
pub const XCLR_SETTLE_US: u32 = 100_000;

/// Supplies, clock and reset of the sensor, owned outside this driver
pub trait PowerControl {
    type Error;

    /// Bring the sensor up; returns once it can be programmed
    fn acquire(&mut self) -> Result<(), Self::Error>;

    /// Put the sensor back into reset. Register contents are lost.
    fn release(&mut self);
}

/// Power control for boards where the rails and INCK are always on and
/// only the XCLR reset line is wired to the host
pub struct ResetLine<PIN, DELAY> {
    xclr: PIN,
    delay: DELAY,
}

impl<PIN, DELAY> ResetLine<PIN, DELAY> {
    pub fn new(xclr: PIN, delay: DELAY) -> Self {
        Self { xclr, delay }
    }

    pub fn release_parts(self) -> (PIN, DELAY) {
        (self.xclr, self.delay)
    }
}

impl<PIN, DELAY, PinE> PowerControl for ResetLine<PIN, DELAY>
where
    PIN: OutputPin<Error = PinE>,
    DELAY: DelayUs<u32>,
{
    type Error = PinE;

    fn acquire(&mut self) -> Result<(), PinE> {
        self.xclr.set_high()?;
        self.delay.delay_us(XCLR_SETTLE_US);
        Ok(())
    }

    fn release(&mut self) {
        if self.xclr.set_low().is_err() {
            log::warn!(target: "imx294", "failed to assert XCLR");
        }
    }
}
