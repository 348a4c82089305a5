/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Control values and the frame timing derived from them

use crate::modes::{BusFormat, Mode};
use crate::registers::*;
use crate::timing;

/// Internal timing reference of the sensor
pub const BASE_CLOCK_HZ: u64 = 72_000_000;

pub const EXPOSURE_MIN: u32 = 52;
pub const EXPOSURE_MAX: u32 = 49865;
pub const EXPOSURE_STEP: u32 = 1;
pub const EXPOSURE_DEFAULT: u32 = 1000;

pub const ANALOG_GAIN_MIN: u32 = 0;
pub const ANALOG_GAIN_MAX: u32 = 1957;
pub const ANALOG_GAIN_STEP: u32 = 1;
pub const ANALOG_GAIN_DEFAULT: u32 = 0;

/// Secondary frame-rate divider, unused by this driver
const SVR: u64 = 0;

/// Control identifiers, numbered as the V4L2 control ids
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlId {
    /// Read only, derived from the active mode
    PixelRate = 0x009f_0902,
    VerticalBlank = 0x009e_0901,
    HorizontalBlank = 0x009e_0902,
    Exposure = 0x0098_0911,
    AnalogGain = 0x009e_0903,
}

impl ControlId {
    pub fn from_raw(id: u32) -> Option<Self> {
        use ControlId::*;
        [PixelRate, VerticalBlank, HorizontalBlank, Exposure, AnalogGain]
            .iter()
            .copied()
            .find(|c| *c as u32 == id)
    }
}

/// An integer control: a value kept inside a range that may move
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntControl {
    min: u32,
    max: u32,
    step: u32,
    default: u32,
    value: u32,
}

impl IntControl {
    pub const fn new(min: u32, max: u32, step: u32, default: u32) -> Self {
        Self {
            min,
            max,
            step,
            default,
            value: default,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }
    pub fn min(&self) -> u32 {
        self.min
    }
    pub fn max(&self) -> u32 {
        self.max
    }
    pub fn step(&self) -> u32 {
        self.step
    }
    pub fn default_value(&self) -> u32 {
        self.default
    }

    /// Store `value` clamped into range and return what was stored
    pub fn set(&mut self, value: u32) -> u32 {
        self.value = value.clamp(self.min, self.max);
        self.value
    }

    /// Move the range, clamping the current value into it.
    ///
    /// Returns true if the current value changed.
    pub fn modify_range(&mut self, min: u32, max: u32, default: u32) -> bool {
        let max = max.max(min);
        self.min = min;
        self.max = max;
        self.default = default.clamp(min, max);
        let prev = self.value;
        self.value = prev.clamp(min, max);
        prev != self.value
    }
}

/// Active mode plus every control value and the HMAX/VMAX counters they imply.
///
/// All setters here are memory only; the register writes they imply are
/// produced by the `*_writes` methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlState {
    mode: &'static Mode,
    format: BusFormat,
    h_period: u32,
    v_period: u32,
    pixel_rate: u64,
    vblank: IntControl,
    hblank: IntControl,
    exposure: IntControl,
    analog_gain: IntControl,
}

impl ControlState {
    pub fn new(mode: &'static Mode, format: BusFormat) -> Self {
        let mut state = Self {
            mode,
            format,
            h_period: mode.default_h_period,
            v_period: mode.default_v_period,
            pixel_rate: 0,
            vblank: IntControl::new(0, VMAX_MAX, 1, 0),
            hblank: IntControl::new(0, HMAX_MAX, 1, 0),
            exposure: IntControl::new(
                EXPOSURE_MIN,
                EXPOSURE_MAX,
                EXPOSURE_STEP,
                EXPOSURE_DEFAULT,
            ),
            analog_gain: IntControl::new(
                ANALOG_GAIN_MIN,
                ANALOG_GAIN_MAX,
                ANALOG_GAIN_STEP,
                ANALOG_GAIN_DEFAULT,
            ),
        };
        state.apply_framing_limits();
        state
    }

    pub fn mode(&self) -> &'static Mode {
        self.mode
    }
    pub fn format(&self) -> BusFormat {
        self.format
    }
    pub fn h_period(&self) -> u32 {
        self.h_period
    }
    pub fn v_period(&self) -> u32 {
        self.v_period
    }
    pub fn pixel_rate(&self) -> u64 {
        self.pixel_rate
    }
    pub fn vertical_blank(&self) -> &IntControl {
        &self.vblank
    }
    pub fn horizontal_blank(&self) -> &IntControl {
        &self.hblank
    }
    pub fn exposure(&self) -> &IntControl {
        &self.exposure
    }
    pub fn analog_gain(&self) -> &IntControl {
        &self.analog_gain
    }

    /// Switch to `mode`, resetting frame timing to its defaults.
    ///
    /// Returns false, touching nothing, if `mode` is already active.
    pub fn select_mode(&mut self, mode: &'static Mode, format: BusFormat) -> bool {
        self.format = format;
        if core::ptr::eq(self.mode, mode) {
            return false;
        }
        self.mode = mode;
        self.apply_framing_limits();
        true
    }

    /// Pixel rate of the active mode at its minimum line length
    pub fn mode_pixel_rate(mode: &Mode) -> u64 {
        u64::from(mode.width) * BASE_CLOCK_HZ / u64::from(mode.min_h_period)
    }

    pub fn refresh_pixel_rate(&mut self) {
        self.pixel_rate = Self::mode_pixel_rate(self.mode);
    }

    fn apply_framing_limits(&mut self) {
        let mode = self.mode;
        self.h_period = mode.default_h_period;
        self.v_period = mode.default_v_period;
        self.refresh_pixel_rate();

        let def_hblank = (u64::from(mode.default_h_period) * self.pixel_rate / BASE_CLOCK_HZ)
            .saturating_sub(u64::from(mode.width)) as u32;
        self.hblank.modify_range(0, HMAX_MAX, def_hblank);
        self.set_horizontal_blank(def_hblank);

        let scale = mode.v_period_scale;
        let min_vblank = (mode.min_v_period * scale).saturating_sub(mode.height);
        let max_vblank = (VMAX_MAX * scale).saturating_sub(mode.height);
        let def_vblank = (mode.default_v_period * scale).saturating_sub(mode.height);
        self.vblank.modify_range(min_vblank, max_vblank, def_vblank);
        self.set_vertical_blank(def_vblank);
    }

    /// Exposure range reachable at the current HMAX/VMAX
    pub fn exposure_bounds(&self) -> (u32, u32) {
        timing::exposure_bounds(
            u64::from(self.h_period),
            u64::from(self.v_period),
            u64::from(self.mode.min_shutter_offset),
            SVR,
            u64::from(self.mode.integration_offset),
        )
    }

    /// Set vertical blanking and re-range exposure to the new frame length.
    ///
    /// Returns true if the exposure value had to be clamped.
    pub fn set_vertical_blank(&mut self, vblank: u32) -> bool {
        let vblank = self.vblank.set(vblank);
        self.v_period = (self.mode.height + vblank) / self.mode.v_period_scale;
        let (min, max) = self.exposure_bounds();
        self.exposure.modify_range(min, max, EXPOSURE_DEFAULT)
    }

    pub fn set_horizontal_blank(&mut self, hblank: u32) {
        let hblank = self.hblank.set(hblank);
        let line = u64::from(self.mode.width + hblank) * BASE_CLOCK_HZ;
        self.h_period = line.checked_div(self.pixel_rate).unwrap_or(0) as u32;
    }

    pub fn set_exposure(&mut self, exposure: u32) -> u32 {
        self.exposure.set(exposure)
    }

    pub fn set_analog_gain(&mut self, gain: u32) -> u32 {
        self.analog_gain.set(gain)
    }

    /// SHR for the current exposure
    pub fn shutter_offset(&self) -> u32 {
        timing::shutter_from_exposure(
            u64::from(self.exposure.value()),
            u64::from(self.h_period),
            u64::from(self.v_period),
            SVR,
            u64::from(self.mode.integration_offset),
        )
    }

    /// VMAX followed by the blanking compensation registers
    pub fn vertical_period_writes(&self) -> [RegisterWrite; 6] {
        let margin = self.v_period.saturating_sub(self.mode.min_v_period);
        let psslvs4 = if margin <= PSSLVS4_MARGIN {
            0
        } else {
            margin - PSSLVS4_MARGIN
        };
        [
            RegisterWrite::u24(REG_VMAX, self.v_period),
            RegisterWrite::u16(REG_PSSLVS1, margin as u16),
            RegisterWrite::u16(REG_PSSLVS2, margin as u16),
            RegisterWrite::u16(REG_PSSLVS3, margin as u16),
            RegisterWrite::u16(REG_PSSLVS4, psslvs4 as u16),
            RegisterWrite::u16(REG_PSSLVS0, margin as u16),
        ]
    }

    /// HMAX and its two mirrors
    pub fn horizontal_period_writes(&self) -> [RegisterWrite; 3] {
        let hmax = self.h_period as u16;
        [
            RegisterWrite::u16(REG_HMAX, hmax),
            RegisterWrite::u16(REG_HCOUNT1, hmax),
            RegisterWrite::u16(REG_HCOUNT2, hmax),
        ]
    }

    pub fn shutter_write(&self) -> RegisterWrite {
        let shr = self.shutter_offset().min(timing::SHR_MAX as u32);
        RegisterWrite::u16(REG_SHR, shr as u16)
    }

    pub fn analog_gain_write(&self) -> RegisterWrite {
        RegisterWrite::u16(REG_ANALOG_GAIN, self.analog_gain.value() as u16)
    }
}
