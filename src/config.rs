/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

/// The only external clock frequency the mode tables are valid for
pub const XCLK_FREQ_HZ: u32 = 24_000_000;

/// Value read back from the chip identity register
pub const CHIP_ID: u8 = 0x00;

/// Setup-time configuration, fixed for the lifetime of a driver instance
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Frequency of the external clock feeding INCK
    pub xclk_freq_hz: u32,
    /// Identity expected at probe
    pub chip_id: u8,
    /// Emit register writes and timing recomputation at debug level
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            xclk_freq_hz: XCLK_FREQ_HZ,
            chip_id: CHIP_ID,
            debug: false,
        }
    }
}

impl Config {
    pub fn with_xclk_freq(mut self, hz: u32) -> Self {
        self.xclk_freq_hz = hz;
        self
    }

    pub fn with_chip_id(mut self, id: u8) -> Self {
        self.chip_id = id;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
