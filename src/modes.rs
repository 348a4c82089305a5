/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Supported readout modes and the media bus formats that select them

use crate::registers::{reg, RegisterRecord};

/// Full sensor size, including optical black
pub const NATIVE_SIZE: Rect = Rect::new(0, 0, 3792, 2840);

/// Active pixel array
pub const PIXEL_ARRAY: Rect = Rect::new(40, 26, 3840, 2160);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// A readout mode: output size and timing constants.
///
/// Periods are in units of the sensor's internal 72 MHz timing reference
/// (HMAX) and lines (VMAX).
#[derive(Debug, PartialEq, Eq)]
pub struct Mode {
    pub description: &'static str,
    pub width: u32,
    pub height: u32,
    pub min_h_period: u32,
    pub min_v_period: u32,
    pub default_h_period: u32,
    pub default_v_period: u32,
    /// Divisor from `height + vblank` to the VMAX counter
    pub v_period_scale: u32,
    pub min_shutter_offset: u32,
    /// Readout pipeline constant of the exposure/shutter conversion
    pub integration_offset: u32,
    /// Analog crop rectangle
    pub crop: Rect,
    /// Written on every transition into streaming
    pub registers: &'static [RegisterRecord],
}

/// Media bus codes of the raw Bayer formats the sensor can output.
///
/// The four orders of a bit depth share one mode table.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusFormat {
    Sbggr12 = 0x3008,
    Sgbrg12 = 0x3010,
    Sgrbg12 = 0x3011,
    Srggb12 = 0x3012,
    Sbggr14 = 0x3019,
    Sgbrg14 = 0x301a,
    Sgrbg14 = 0x301b,
    Srggb14 = 0x301c,
}

impl BusFormat {
    pub const DEFAULT: BusFormat = BusFormat::Sgbrg12;

    pub fn from_code(code: u32) -> Option<Self> {
        use BusFormat::*;
        [
            Sbggr12, Sgbrg12, Sgrbg12, Srggb12, Sbggr14, Sgbrg14, Sgrbg14,
            Srggb14,
        ]
        .iter()
        .copied()
        .find(|f| *f as u32 == code)
    }

    pub fn bit_depth(&self) -> u8 {
        use BusFormat::*;
        match self {
            Sbggr12 | Sgbrg12 | Sgrbg12 | Srggb12 => 12,
            Sbggr14 | Sgbrg14 | Sgrbg14 | Srggb14 => 14,
        }
    }

    pub fn modes(&self) -> &'static [Mode] {
        match self.bit_depth() {
            14 => &MODES_14BIT[..],
            _ => &MODES_12BIT[..],
        }
    }
}

/// Mode table for a media bus code, empty for codes the sensor cannot output
pub fn lookup(code: u32) -> &'static [Mode] {
    match BusFormat::from_code(code) {
        Some(format) => format.modes(),
        None => &[],
    }
}

/// The mode closest to the requested size.
///
/// Distance is the sum of the width and height differences; an exact size
/// always wins and ties go to the earlier table entry.
pub fn nearest(modes: &'static [Mode], width: u32, height: u32) -> Option<&'static Mode> {
    modes.iter().min_by_key(|m| {
        let dw = (i64::from(m.width) - i64::from(width)).abs();
        let dh = (i64::from(m.height) - i64::from(height)).abs();
        dw + dh
    })
}

/// The mode selected at attach time
pub fn default_mode() -> &'static Mode {
    &MODES_12BIT[0]
}

pub static MODES_14BIT: [Mode; 1] = [Mode {
    description: "3704x2778 readout mode 0, 14 bit",
    width: 3792,
    height: 2840,
    min_h_period: 1730,
    min_v_period: 1444,
    default_h_period: 1875,
    default_v_period: 1600,
    v_period_scale: 2,
    min_shutter_offset: 5,
    integration_offset: 551,
    crop: Rect::new(40, 24, 3704, 2778),
    registers: MODE_00_14BIT_REGS,
}];

pub static MODES_12BIT: [Mode; 4] = [
    Mode {
        description: "4096x2160 readout mode 1",
        width: 4144,
        height: 2184,
        min_h_period: 1122,
        min_v_period: 1111,
        default_h_period: 1200,
        default_v_period: 2500,
        v_period_scale: 2,
        min_shutter_offset: 5,
        integration_offset: 256,
        crop: Rect::new(36, 20, 4096, 2160),
        registers: MODE_01_REGS,
    },
    Mode {
        description: "4096x2160 low noise readout mode 1A",
        width: 4176,
        height: 2184,
        min_h_period: 1192,
        min_v_period: 1111,
        default_h_period: 1200,
        default_v_period: 2500,
        v_period_scale: 2,
        min_shutter_offset: 5,
        integration_offset: 361,
        crop: Rect::new(36, 20, 4096, 2160),
        registers: MODE_01A_REGS,
    },
    Mode {
        description: "3840x2160 readout mode 1B",
        width: 3872,
        height: 2180,
        min_h_period: 1055,
        min_v_period: 1111,
        default_h_period: 1200,
        default_v_period: 2500,
        v_period_scale: 2,
        min_shutter_offset: 5,
        integration_offset: 256,
        crop: Rect::new(20, 20, 3840, 2160),
        registers: MODE_01B_REGS,
    },
    Mode {
        description: "3704x2778 readout mode 0",
        width: 3792,
        height: 2840,
        min_h_period: 1024,
        min_v_period: 1444,
        default_h_period: 1875,
        default_v_period: 1600,
        v_period_scale: 2,
        min_shutter_offset: 5,
        integration_offset: 551,
        crop: Rect::new(40, 24, 3704, 2778),
        registers: MODE_00_REGS,
    },
];

const MODE_00_14BIT_REGS: &[RegisterRecord] = &[
    reg(0x3004, 0x00),
    reg(0x3005, 0x0B),
    reg(0x3006, 0x02),
    reg(0x3007, 0xA0),
    reg(0x3019, 0x00),
    reg(0x3030, 0x77),
    reg(0x3034, 0x00),
    reg(0x3035, 0x01),
    reg(0x3036, 0x30),
    reg(0x3037, 0x00),
    reg(0x3038, 0x00),
    reg(0x3039, 0x0F),
    reg(0x3068, 0x44),
    reg(0x3069, 0x00),
    reg(0x3080, 0x00),
    reg(0x3081, 0x01),
    reg(0x30A8, 0x03),
    reg(0x30E2, 0x00),
    reg(0x312F, 0x10),
    reg(0x3130, 0x18),
    reg(0x3131, 0x0B),
    reg(0x3132, 0x08),
    reg(0x3133, 0x0B),
    reg(0x357F, 0x0A),
    reg(0x3580, 0x09),
    reg(0x3581, 0x07),
    reg(0x3583, 0x51),
    reg(0x3600, 0x90),
    reg(0x3601, 0x00),
    reg(0x3846, 0x00),
    reg(0x3847, 0x00),
    reg(0x384A, 0x00),
    reg(0x384B, 0x00),
];

const MODE_00_REGS: &[RegisterRecord] = &[
    reg(0x3004, 0x00),
    reg(0x3005, 0x06),
    reg(0x3006, 0x02),
    reg(0x3007, 0xA0),
    reg(0x3019, 0x00),
    reg(0x3030, 0x77),
    reg(0x3034, 0x00),
    reg(0x3035, 0x01),
    reg(0x3036, 0x30),
    reg(0x3037, 0x00),
    reg(0x3038, 0x00),
    reg(0x3039, 0x0F),
    reg(0x3068, 0x1A),
    reg(0x3069, 0x00),
    reg(0x3080, 0x00),
    reg(0x3081, 0x01),
    reg(0x30A8, 0x02),
    reg(0x30E2, 0x00),
    reg(0x312F, 0x10),
    reg(0x3130, 0x18),
    reg(0x3131, 0x0B),
    reg(0x3132, 0x08),
    reg(0x3133, 0x0B),
    reg(0x357F, 0x0C),
    reg(0x3580, 0x0A),
    reg(0x3581, 0x08),
    reg(0x3583, 0x72),
    reg(0x3600, 0x90),
    reg(0x3601, 0x00),
    reg(0x3846, 0x00),
    reg(0x3847, 0x00),
    reg(0x384A, 0x00),
    reg(0x384B, 0x00),
];

const MODE_01_REGS: &[RegisterRecord] = &[
    reg(0x3004, 0x1A),
    reg(0x3005, 0x06),
    reg(0x3006, 0x00),
    reg(0x3007, 0xA0),
    reg(0x3019, 0x00),
    reg(0x3030, 0x77),
    reg(0x3034, 0x00),
    reg(0x3035, 0x01),
    reg(0x3036, 0x30),
    reg(0x3037, 0x00),
    reg(0x3038, 0x60),
    reg(0x3039, 0x10),
    reg(0x3068, 0x1A),
    reg(0x3069, 0x00),
    reg(0x3080, 0x00),
    reg(0x3081, 0x01),
    reg(0x30A8, 0x02),
    reg(0x30E2, 0x00),
    reg(0x312F, 0x08),
    reg(0x3130, 0x88),
    reg(0x3131, 0x08),
    reg(0x3132, 0x80),
    reg(0x3133, 0x08),
    reg(0x357F, 0x0C),
    reg(0x3580, 0x0A),
    reg(0x3581, 0x08),
    reg(0x3583, 0x72),
    reg(0x3600, 0x90),
    reg(0x3601, 0x00),
    reg(0x3846, 0x00),
    reg(0x3847, 0x00),
    reg(0x384A, 0x00),
    reg(0x384B, 0x00),
];

const MODE_01A_REGS: &[RegisterRecord] = &[
    reg(0x3004, 0x01),
    reg(0x3005, 0x06),
    reg(0x3006, 0x00),
    reg(0x3007, 0xA0),
    reg(0x3019, 0x00),
    reg(0x3030, 0x77),
    reg(0x3034, 0x00),
    reg(0x3035, 0x01),
    reg(0x3036, 0x30),
    reg(0x3037, 0x00),
    reg(0x3038, 0x80),
    reg(0x3039, 0x10),
    reg(0x3068, 0x1A),
    reg(0x3069, 0x00),
    reg(0x3080, 0x01),
    reg(0x3081, 0x01),
    reg(0x30A8, 0x02),
    reg(0x30E2, 0x00),
    reg(0x312F, 0x08),
    reg(0x3130, 0x88),
    reg(0x3131, 0x08),
    reg(0x3132, 0x80),
    reg(0x3133, 0x08),
    reg(0x357F, 0x0C),
    reg(0x3580, 0x0A),
    reg(0x3581, 0x08),
    reg(0x3583, 0x72),
    reg(0x3600, 0x7D),
    reg(0x3601, 0x00),
    reg(0x3846, 0x00),
    reg(0x3847, 0x00),
    reg(0x384A, 0x00),
    reg(0x384B, 0x00),
];

const MODE_01B_REGS: &[RegisterRecord] = &[
    reg(0x3004, 0x02),
    reg(0x3005, 0x06),
    reg(0x3006, 0x01),
    reg(0x3007, 0xA0),
    reg(0x3019, 0x00),
    reg(0x3030, 0x77),
    reg(0x3034, 0x00),
    reg(0x3035, 0x01),
    reg(0x3036, 0x30),
    reg(0x3037, 0x00),
    reg(0x3038, 0x50),
    reg(0x3039, 0x0F),
    reg(0x3068, 0x1A),
    reg(0x3069, 0x00),
    reg(0x3080, 0x00),
    reg(0x3081, 0x01),
    reg(0x30A8, 0x02),
    reg(0x30E2, 0x00),
    reg(0x312F, 0x08),
    reg(0x3130, 0x88),
    reg(0x3131, 0x08),
    reg(0x3132, 0x80),
    reg(0x3133, 0x08),
    reg(0x357F, 0x0C),
    reg(0x3580, 0x0A),
    reg(0x3581, 0x08),
    reg(0x3583, 0x72),
    reg(0x3600, 0x90),
    reg(0x3601, 0x00),
    reg(0x3846, 0x00),
    reg(0x3847, 0x00),
    reg(0x384A, 0x00),
    reg(0x384B, 0x00),
];
