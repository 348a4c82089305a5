/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! A driver handle that can be shared between threads

use std::sync::{Mutex, MutexGuard};

use embedded_hal::blocking::delay::DelayMs;

use crate::controls::ControlId;
use crate::driver::{Imx294, StreamState};
use crate::modes::Mode;
use crate::power::PowerControl;
use crate::transport::RegisterTransport;
use crate::Error;

/// One lock around the whole driver.
///
/// Each method holds the lock for the complete operation, so a mode change
/// or control write can never land in the middle of register list
/// programming and control replay.
pub struct SharedImx294<T, P, D> {
    inner: Mutex<Imx294<T, P, D>>,
}

type SharedError<T, P> =
    Error<<T as RegisterTransport>::Error, <P as PowerControl>::Error>;

impl<T, P, D> SharedImx294<T, P, D>
where
    T: RegisterTransport,
    P: PowerControl,
    D: DelayMs<u16>,
{
    pub fn new(sensor: Imx294<T, P, D>) -> Self {
        Self {
            inner: Mutex::new(sensor),
        }
    }

    /// Exclusive access for compound sequences of calls
    pub fn lock(&self) -> MutexGuard<'_, Imx294<T, P, D>> {
        // failed transitions already leave the driver in standby
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn into_inner(self) -> Imx294<T, P, D> {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> StreamState {
        self.lock().state()
    }

    pub fn control(&self, id: ControlId) -> u64 {
        self.lock().control(id)
    }

    pub fn set_control(&self, id: ControlId, value: u32) -> Result<(), SharedError<T, P>> {
        self.lock().set_control(id, value)
    }

    pub fn set_format(
        &self,
        code: u32,
        width: u32,
        height: u32,
    ) -> Result<&'static Mode, SharedError<T, P>> {
        self.lock().set_format(code, width, height)
    }

    pub fn set_stream(&self, enable: bool) -> Result<(), SharedError<T, P>> {
        self.lock().set_stream(enable)
    }

    pub fn suspend(&self) {
        self.lock().suspend()
    }

    pub fn resume(&self) -> Result<(), SharedError<T, P>> {
        self.lock().resume()
    }
}
