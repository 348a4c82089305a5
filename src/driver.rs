/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Probe, control dispatch and the streaming state machine

#[cfg(feature = "rttdebug")]
use panic_rtt_core::rprintln;

use embedded_hal::blocking::delay::DelayMs;

use crate::config::Config;
use crate::controls::{ControlId, ControlState};
use crate::modes::{self, BusFormat, Mode, Rect};
use crate::power::PowerControl;
use crate::registers::{self, RegisterRecord, RegisterWrite};
use crate::transport::RegisterTransport;
use crate::{ConfigError, Error};

/// Operating state of the sensor output
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StreamState {
    Standby,
    Streaming,
}

/// Main driver struct.
///
/// Methods take `&mut self`, so one call runs to completion before the next
/// begins; wrap the driver in `SharedImx294` to share it between threads.
pub struct Imx294<T, P, D> {
    transport: T,
    power: P,
    delay: D,
    config: Config,
    controls: ControlState,
    state: StreamState,
    /// Power is held; control changes are written through
    powered: bool,
    /// Cleared whenever power is released
    common_regs_applied: bool,
    /// Set by `suspend` when streaming was interrupted
    resume_streaming: bool,
}

type DriverError<T, P> =
    Error<<T as RegisterTransport>::Error, <P as PowerControl>::Error>;

impl<T, P, D> Imx294<T, P, D>
where
    T: RegisterTransport,
    P: PowerControl,
    D: DelayMs<u16>,
{
    /// Check the clock, confirm the chip identity and leave the sensor
    /// powered down in the default mode.
    pub fn new(
        transport: T,
        power: P,
        delay: D,
        config: Config,
    ) -> Result<Self, DriverError<T, P>> {
        #[cfg(feature = "rttdebug")]
        rprintln!("imx294-i2c probe start");

        if config.xclk_freq_hz != crate::config::XCLK_FREQ_HZ {
            log::error!(
                target: "imx294",
                "xclk frequency not supported: {} Hz",
                config.xclk_freq_hz
            );
            return Err(Error::UnsupportedClock(config.xclk_freq_hz));
        }

        let mut sensor = Self {
            transport,
            power,
            delay,
            config,
            controls: ControlState::new(modes::default_mode(), BusFormat::DEFAULT),
            state: StreamState::Standby,
            powered: false,
            common_regs_applied: false,
            resume_streaming: false,
        };

        sensor.power_on()?;
        let identity = sensor.identify();
        sensor.power_off();
        identity?;

        log::info!(target: "imx294", "device found");
        debug_trace!(
            sensor.config,
            "default mode {}, pixel rate {}",
            sensor.controls.mode().description,
            sensor.controls.pixel_rate()
        );

        #[cfg(feature = "rttdebug")]
        rprintln!("imx294-i2c probe done");
        Ok(sensor)
    }

    fn identify(&mut self) -> Result<(), DriverError<T, P>> {
        let found = self
            .transport
            .read(registers::REG_CHIP_ID, 1)
            .map_err(|e| {
                log::error!(target: "imx294", "failed to read chip id");
                Error::Comm(e)
            })?;
        let expected = self.config.chip_id;
        if found != u32::from(expected) {
            log::error!(
                target: "imx294",
                "chip id mismatch: found 0x{:02x}, expected 0x{:02x}",
                found,
                expected
            );
            return Err(Error::ChipIdentityMismatch { expected, found });
        }
        Ok(())
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn is_streaming(&self) -> bool {
        self.state == StreamState::Streaming
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn common_regs_applied(&self) -> bool {
        self.common_regs_applied
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn mode(&self) -> &'static Mode {
        self.controls.mode()
    }

    /// Analog crop of the active mode
    pub fn crop(&self) -> Rect {
        self.controls.mode().crop
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    pub fn power_mut(&mut self) -> &mut P {
        &mut self.power
    }

    /// Give back the bus, power and delay providers
    pub fn release(self) -> (T, P, D) {
        (self.transport, self.power, self.delay)
    }

    /// Read a register directly; the sensor must be powered
    pub fn read_register(&mut self, address: u16, len: usize) -> Result<u32, DriverError<T, P>> {
        self.transport.read(address, len).map_err(Error::Comm)
    }

    fn write_register(&mut self, write: RegisterWrite) -> Result<(), DriverError<T, P>> {
        debug_trace!(
            self.config,
            "write 0x{:04x} <- 0x{:x} ({} bytes)",
            write.address,
            write.value,
            write.width
        );
        let payload = write.payload();
        self.transport
            .write(write.address, &payload[..write.width])
            .map_err(|e| {
                log::error!(target: "imx294", "failed to write reg 0x{:04x}", write.address);
                Error::Comm(e)
            })
    }

    fn write_registers(&mut self, writes: &[RegisterWrite]) -> Result<(), DriverError<T, P>> {
        for write in writes {
            self.write_register(*write)?;
        }
        Ok(())
    }

    /// Program a register list in order, stopping at the first failure.
    /// Writes already issued stay applied.
    fn write_register_list(&mut self, list: &[RegisterRecord]) -> Result<(), DriverError<T, P>> {
        for record in list {
            match *record {
                RegisterRecord::Write { address, value } => {
                    self.write_register(RegisterWrite::u8(address, value))?
                }
                RegisterRecord::Delay { millis } => self.delay.delay_ms(millis),
            }
        }
        Ok(())
    }

    fn power_on(&mut self) -> Result<(), DriverError<T, P>> {
        if self.powered {
            return Ok(());
        }
        self.power.acquire().map_err(|e| {
            log::error!(target: "imx294", "failed to power up sensor");
            Error::Power(e)
        })?;
        self.powered = true;
        Ok(())
    }

    fn power_off(&mut self) {
        self.power.release();
        self.powered = false;
        // register contents are lost with power
        self.common_regs_applied = false;
    }
}

/// Controls
impl<T, P, D> Imx294<T, P, D>
where
    T: RegisterTransport,
    P: PowerControl,
    D: DelayMs<u16>,
{
    /// Current value of a control
    pub fn control(&self, id: ControlId) -> u64 {
        let c = &self.controls;
        match id {
            ControlId::PixelRate => c.pixel_rate(),
            ControlId::VerticalBlank => u64::from(c.vertical_blank().value()),
            ControlId::HorizontalBlank => u64::from(c.horizontal_blank().value()),
            ControlId::Exposure => u64::from(c.exposure().value()),
            ControlId::AnalogGain => u64::from(c.analog_gain().value()),
        }
    }

    pub fn set_control(&mut self, id: ControlId, value: u32) -> Result<(), DriverError<T, P>> {
        match id {
            ControlId::PixelRate => Err(ConfigError::ReadOnlyControl(id).into()),
            ControlId::VerticalBlank => self.set_vertical_blank(value),
            ControlId::HorizontalBlank => self.set_horizontal_blank(value),
            ControlId::Exposure => self.set_exposure(value),
            ControlId::AnalogGain => self.set_analog_gain(value),
        }
    }

    /// As `set_control`, with a raw V4L2 control id
    pub fn set_control_raw(&mut self, id: u32, value: u32) -> Result<(), DriverError<T, P>> {
        let id = ControlId::from_raw(id).ok_or_else(|| {
            log::error!(target: "imx294", "ctrl(id:0x{:x},val:0x{:x}) is not handled", id, value);
            ConfigError::UnknownControl(id)
        })?;
        self.set_control(id, value)
    }

    /// Exposure limits are re-ranged immediately; registers are only
    /// written while powered.
    pub fn set_vertical_blank(&mut self, vblank: u32) -> Result<(), DriverError<T, P>> {
        let clamped = self.controls.set_vertical_blank(vblank);
        let (min, max) = self.controls.exposure_bounds();
        debug_trace!(
            self.config,
            "vblank {}: VMAX {} HMAX {}, exposure [{}, {}] now {}",
            self.controls.vertical_blank().value(),
            self.controls.v_period(),
            self.controls.h_period(),
            min,
            max,
            self.controls.exposure().value()
        );
        if !self.powered {
            return Ok(());
        }
        let writes = self.controls.vertical_period_writes();
        self.write_registers(&writes)?;
        if clamped {
            let shutter = self.controls.shutter_write();
            self.write_register(shutter)?;
        }
        Ok(())
    }

    pub fn set_horizontal_blank(&mut self, hblank: u32) -> Result<(), DriverError<T, P>> {
        self.controls.set_horizontal_blank(hblank);
        debug_trace!(
            self.config,
            "hblank {}: HMAX {}",
            self.controls.horizontal_blank().value(),
            self.controls.h_period()
        );
        if !self.powered {
            return Ok(());
        }
        let writes = self.controls.horizontal_period_writes();
        self.write_registers(&writes)
    }

    pub fn set_exposure(&mut self, exposure: u32) -> Result<(), DriverError<T, P>> {
        self.controls.set_exposure(exposure);
        debug_trace!(
            self.config,
            "exposure {}: SHR {}",
            self.controls.exposure().value(),
            self.controls.shutter_offset()
        );
        if !self.powered {
            return Ok(());
        }
        let write = self.controls.shutter_write();
        self.write_register(write)
    }

    pub fn set_analog_gain(&mut self, gain: u32) -> Result<(), DriverError<T, P>> {
        self.controls.set_analog_gain(gain);
        if !self.powered {
            return Ok(());
        }
        let write = self.controls.analog_gain_write();
        self.write_register(write)
    }

    /// Select the mode nearest to `width` x `height` for a media bus code.
    ///
    /// Refused while the sensor is powered, since the mode register list is
    /// only programmed on the way into streaming.
    pub fn set_format(
        &mut self,
        code: u32,
        width: u32,
        height: u32,
    ) -> Result<&'static Mode, DriverError<T, P>> {
        let format = BusFormat::from_code(code).ok_or(ConfigError::UnsupportedFormat(code))?;
        let mode = modes::nearest(format.modes(), width, height)
            .ok_or(ConfigError::UnsupportedFormat(code))?;
        if self.powered && !core::ptr::eq(mode, self.controls.mode()) {
            return Err(ConfigError::Busy.into());
        }
        if self.controls.select_mode(mode, format) {
            debug_trace!(
                self.config,
                "{}: hblank {} vblank {} pixel rate {}",
                mode.description,
                self.controls.horizontal_blank().value(),
                self.controls.vertical_blank().value(),
                self.controls.pixel_rate()
            );
        }
        Ok(mode)
    }

    /// Write every cached control, in the order the timing depends on
    fn apply_controls(&mut self) -> Result<(), DriverError<T, P>> {
        self.controls.refresh_pixel_rate();
        let vblank = self.controls.vertical_blank().value();
        self.set_vertical_blank(vblank)?;
        let hblank = self.controls.horizontal_blank().value();
        self.set_horizontal_blank(hblank)?;
        let exposure = self.controls.exposure().value();
        self.set_exposure(exposure)?;
        let gain = self.controls.analog_gain().value();
        self.set_analog_gain(gain)
    }
}

/// Streaming
impl<T, P, D> Imx294<T, P, D>
where
    T: RegisterTransport,
    P: PowerControl,
    D: DelayMs<u16>,
{
    pub fn set_stream(&mut self, enable: bool) -> Result<(), DriverError<T, P>> {
        if enable {
            self.enable()
        } else {
            self.disable();
            Ok(())
        }
    }

    /// Power up, program the sensor and start streaming.
    ///
    /// On failure the sensor is powered down again and stays in standby;
    /// a partially written register list is not rolled back.
    pub fn enable(&mut self) -> Result<(), DriverError<T, P>> {
        if self.is_streaming() {
            return Ok(());
        }
        self.resume_streaming = false;
        self.power_on()?;
        if let Err(e) = self.start_streaming() {
            self.power_off();
            return Err(e);
        }
        self.state = StreamState::Streaming;
        Ok(())
    }

    /// Stop streaming and power down. The standby write is best effort.
    pub fn disable(&mut self) {
        if self.is_streaming() || self.resume_streaming {
            if self.is_streaming() {
                self.stop_streaming();
            }
            self.power_off();
            self.state = StreamState::Standby;
            self.resume_streaming = false;
        }
    }

    /// Put a streaming sensor into standby, keeping power held
    pub fn suspend(&mut self) {
        if self.is_streaming() {
            self.stop_streaming();
            self.state = StreamState::Standby;
            self.resume_streaming = true;
        }
    }

    /// Restart streaming interrupted by `suspend`.
    ///
    /// Failure leaves the sensor powered down in standby.
    pub fn resume(&mut self) -> Result<(), DriverError<T, P>> {
        if !self.resume_streaming {
            return Ok(());
        }
        self.resume_streaming = false;
        let result = self.power_on().and_then(|_| self.start_streaming());
        if let Err(e) = result {
            if self.powered {
                self.stop_streaming();
                self.power_off();
            }
            self.state = StreamState::Standby;
            return Err(e);
        }
        self.state = StreamState::Streaming;
        Ok(())
    }

    fn start_streaming(&mut self) -> Result<(), DriverError<T, P>> {
        if !self.common_regs_applied {
            self.write_register_list(registers::COMMON_REGISTERS)
                .map_err(|e| {
                    log::error!(target: "imx294", "failed to set common settings");
                    e
                })?;
            self.common_regs_applied = true;
        }

        let mode = self.controls.mode();
        self.write_register_list(mode.registers).map_err(|e| {
            log::error!(target: "imx294", "failed to set mode {}", mode.description);
            e
        })?;

        self.apply_controls()?;

        // the common block only leaves standby on its first pass after power-up
        self.write_register(RegisterWrite::u8(
            registers::REG_MODE_SELECT,
            registers::MODE_STREAMING,
        ))
    }

    fn stop_streaming(&mut self) {
        let standby = RegisterWrite::u8(registers::REG_MODE_SELECT, registers::MODE_STANDBY);
        if self.write_register(standby).is_err() {
            log::error!(target: "imx294", "failed to enter standby");
        }
    }
}
