/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/
#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! Timing and streaming control driver for the Sony IMX294 image sensor
//! This imaging sensor has multiple interfaces:
//! - Two-wire i2c for configuration registers (i2c)
//! - MIPI CSI-2 pixel data out
//! - XCLR reset line and supply rails
//! This driver is concerned only with the configuration registers:
//! converting blanking, exposure and gain requests into the HMAX, VMAX
//! and SHR counters, and sequencing register lists against power state.

/// Register-level tracing, enabled per instance by `Config::debug`
macro_rules! debug_trace {
    ($config:expr, $($arg:tt)+) => {
        if $config.debug {
            log::debug!(target: "imx294", $($arg)+);
        }
    };
}

pub mod config;
pub mod controls;
pub mod driver;
pub mod modes;
pub mod power;
pub mod registers;
#[cfg(feature = "std")]
pub mod shared;
pub mod timing;
pub mod transport;

pub use config::Config;
pub use controls::{ControlId, ControlState, IntControl};
pub use driver::{Imx294, StreamState};
pub use modes::{BusFormat, Mode, Rect};
pub use power::{PowerControl, ResetLine};
pub use registers::{RegisterRecord, RegisterWrite};
#[cfg(feature = "std")]
pub use shared::SharedImx294;
pub use transport::{I2cTransport, RegisterTransport, DEFAULT_I2C_ADDRESS};

/// Errors in this crate
#[derive(Debug, thiserror::Error)]
pub enum Error<CommE, PowerE> {
    /// Sensor communication error
    #[error("register bus transaction failed: {0:?}")]
    Comm(CommE),

    /// The sensor could not be powered up
    #[error("power sequencing failed: {0:?}")]
    Power(PowerE),

    /// Request rejected before any state change or bus traffic
    #[error("rejected request: {0}")]
    Config(ConfigError),

    /// The device at the configured address is not an IMX294
    #[error("unexpected chip id 0x{found:02x}, expected 0x{expected:02x}")]
    ChipIdentityMismatch { expected: u8, found: u32 },

    /// The external clock does not match the mode tables
    #[error("unsupported external clock frequency {0} Hz")]
    UnsupportedClock(u32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown control id 0x{0:08x}")]
    UnknownControl(u32),
    #[error("control {0:?} is read only")]
    ReadOnlyControl(ControlId),
    #[error("unsupported media bus code 0x{0:04x}")]
    UnsupportedFormat(u32),
    #[error("mode cannot change while the sensor is powered")]
    Busy,
}

impl<CommE, PowerE> From<ConfigError> for Error<CommE, PowerE> {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}
