/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Register map and register-list records

/// Chip identity; shares its address with the mode select register
pub const REG_CHIP_ID: u16 = 0x3000;
pub const REG_MODE_SELECT: u16 = 0x3000;
pub const MODE_STANDBY: u8 = 0x01;
pub const MODE_STREAMING: u8 = 0x00;

/// Analog gain, 2 bytes
pub const REG_ANALOG_GAIN: u16 = 0x300A;
/// Shutter offset (SHR), 2 bytes
pub const REG_SHR: u16 = 0x302C;
/// Vertical period (VMAX), 3 bytes
pub const REG_VMAX: u16 = 0x30A9;
pub const VMAX_MAX: u32 = 0xF_FFFF;
/// Horizontal period (HMAX), 2 bytes
pub const REG_HMAX: u16 = 0x30AC;
pub const HMAX_MAX: u32 = 0xFFFF;

/// Horizontal counters that must always mirror HMAX
pub const REG_HCOUNT1: u16 = 0x3084;
pub const REG_HCOUNT2: u16 = 0x3086;

/// Blanking compensation registers, programmed from `VMAX - min VMAX`
pub const REG_PSSLVS0: u16 = 0x36BC;
pub const REG_PSSLVS1: u16 = 0x332C;
pub const REG_PSSLVS2: u16 = 0x334A;
pub const REG_PSSLVS3: u16 = 0x35B6;
/// Programmed with the margin minus this offset, never below zero
pub const REG_PSSLVS4: u16 = 0x35B8;
pub const PSSLVS4_MARGIN: u32 = 5;

/// One entry of a register programming list.
///
/// Delays are pauses between register groups, they carry no data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegisterRecord {
    /// Write one byte to a 16-bit address
    Write { address: u16, value: u8 },
    /// Pause for at least this many milliseconds
    Delay { millis: u16 },
}

impl RegisterRecord {
    pub fn is_write(&self) -> bool {
        matches!(self, RegisterRecord::Write { .. })
    }
}

pub(crate) const fn reg(address: u16, value: u8) -> RegisterRecord {
    RegisterRecord::Write { address, value }
}

pub(crate) const fn delay_ms(millis: u16) -> RegisterRecord {
    RegisterRecord::Delay { millis }
}

/// A multi-byte register write, value sent least significant byte first
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegisterWrite {
    pub address: u16,
    pub value: u32,
    /// Payload width in bytes, 1 to 3
    pub width: usize,
}

impl RegisterWrite {
    pub const fn u8(address: u16, value: u8) -> Self {
        Self { address, value: value as u32, width: 1 }
    }

    pub const fn u16(address: u16, value: u16) -> Self {
        Self { address, value: value as u32, width: 2 }
    }

    /// Only the low 24 bits of `value` are kept
    pub const fn u24(address: u16, value: u32) -> Self {
        Self { address, value: value & 0xFF_FFFF, width: 3 }
    }

    /// Little-endian payload bytes; only the first `width` are meaningful
    pub fn payload(&self) -> [u8; 3] {
        let bytes = self.value.to_le_bytes();
        [bytes[0], bytes[1], bytes[2]]
    }
}

/// Mode-independent initialization block, written once per power-up.
///
/// Ends with the sensor leaving standby.
pub const COMMON_REGISTERS: &[RegisterRecord] = &[
    reg(0x3033, 0x30),
    reg(0x303C, 0x01),

    reg(0x31E8, 0x20),
    reg(0x31E9, 0x01),

    reg(0x3122, 0x02),
    reg(0x3129, 0x90),
    reg(0x312A, 0x02),

    reg(0x311F, 0x00),
    reg(0x3123, 0x00),
    reg(0x3124, 0x00),
    reg(0x3125, 0x01),
    reg(0x3127, 0x02),
    reg(0x312D, 0x02),

    reg(0x3000, 0x12),
    reg(0x310B, 0x00),

    reg(0x3047, 0x01),
    reg(0x304E, 0x0B),
    reg(0x304F, 0x24),
    reg(0x3062, 0x25),
    reg(0x3064, 0x78),
    reg(0x3065, 0x33),
    reg(0x3067, 0x71),
    reg(0x3088, 0x75),
    reg(0x308A, 0x09),
    reg(0x308B, 0x01),
    reg(0x308C, 0x61),
    reg(0x3146, 0x00),
    reg(0x3234, 0x32),
    reg(0x3235, 0x00),
    reg(0x3248, 0xBC),
    reg(0x3249, 0x00),
    reg(0x3250, 0xBC),
    reg(0x3251, 0x00),
    reg(0x3258, 0xBC),
    reg(0x3259, 0x00),
    reg(0x3260, 0xBC),
    reg(0x3261, 0x00),
    reg(0x3274, 0x13),
    reg(0x3275, 0x00),
    reg(0x3276, 0x1F),
    reg(0x3277, 0x00),
    reg(0x3278, 0x30),
    reg(0x3279, 0x00),
    reg(0x327C, 0x13),
    reg(0x327D, 0x00),
    reg(0x327E, 0x1F),
    reg(0x327F, 0x00),
    reg(0x3280, 0x30),
    reg(0x3281, 0x00),
    reg(0x3284, 0x13),
    reg(0x3285, 0x00),
    reg(0x3286, 0x1F),
    reg(0x3287, 0x00),
    reg(0x3288, 0x30),
    reg(0x3289, 0x00),
    reg(0x328C, 0x13),
    reg(0x328D, 0x00),
    reg(0x328E, 0x1F),
    reg(0x328F, 0x00),
    reg(0x3290, 0x30),
    reg(0x3291, 0x00),
    reg(0x32AE, 0x00),
    reg(0x32AF, 0x00),
    reg(0x32CA, 0x5A),
    reg(0x32CB, 0x00),
    reg(0x332F, 0x00),
    reg(0x334C, 0x01),
    reg(0x335A, 0x79),
    reg(0x335B, 0x00),
    reg(0x335E, 0x56),
    reg(0x335F, 0x00),
    reg(0x3360, 0x6A),
    reg(0x3361, 0x00),
    reg(0x336A, 0x56),
    reg(0x336B, 0x00),
    reg(0x33D6, 0x79),
    reg(0x33D7, 0x00),
    reg(0x340C, 0x6E),
    reg(0x340D, 0x00),
    reg(0x3448, 0x7E),
    reg(0x3449, 0x00),
    reg(0x348E, 0x6F),
    reg(0x348F, 0x00),
    reg(0x3492, 0x11),
    reg(0x34C4, 0x5A),
    reg(0x34C5, 0x00),
    reg(0x3506, 0x56),
    reg(0x3507, 0x00),
    reg(0x350C, 0x56),
    reg(0x350D, 0x00),
    reg(0x350E, 0x58),
    reg(0x350F, 0x00),
    reg(0x3549, 0x04),
    reg(0x355D, 0x03),
    reg(0x355E, 0x03),
    reg(0x3574, 0x56),
    reg(0x3575, 0x00),
    reg(0x3587, 0x01),
    reg(0x35D0, 0x5E),
    reg(0x35D1, 0x00),
    reg(0x35D4, 0x63),
    reg(0x35D5, 0x00),
    reg(0x366A, 0x1A),
    reg(0x366B, 0x16),
    reg(0x366C, 0x10),
    reg(0x366D, 0x09),
    reg(0x366E, 0x00),
    reg(0x366F, 0x00),
    reg(0x3670, 0x00),
    reg(0x3671, 0x00),
    reg(0x3676, 0x83),
    reg(0x3677, 0x03),
    reg(0x3678, 0x00),
    reg(0x3679, 0x04),
    reg(0x367A, 0x2C),
    reg(0x367B, 0x05),
    reg(0x367C, 0x00),
    reg(0x367D, 0x06),
    reg(0x367E, 0x00),
    reg(0x367F, 0x07),
    reg(0x3680, 0x4B),
    reg(0x3681, 0x07),
    reg(0x3690, 0x27),
    reg(0x3691, 0x00),
    reg(0x3692, 0x65),
    reg(0x3693, 0x00),
    reg(0x3694, 0x4F),
    reg(0x3695, 0x00),
    reg(0x3696, 0xA1),
    reg(0x3697, 0x00),
    reg(0x382B, 0x68),
    reg(0x3C00, 0x01),
    reg(0x3C01, 0x01),
    reg(0x3686, 0x00),
    reg(0x3687, 0x00),
    reg(0x36BE, 0x01),
    reg(0x36BF, 0x00),
    reg(0x36C0, 0x01),
    reg(0x36C1, 0x00),
    reg(0x36C2, 0x01),
    reg(0x36C3, 0x00),
    reg(0x36C4, 0x01),
    reg(0x36C5, 0x01),
    reg(0x36C6, 0x01),

    reg(0x3134, 0xAF),
    reg(0x3135, 0x00),
    reg(0x3136, 0xC7),
    reg(0x3137, 0x00),
    reg(0x3138, 0x7F),
    reg(0x3139, 0x00),
    reg(0x313A, 0x6F),
    reg(0x313B, 0x00),
    reg(0x313C, 0x6F),
    reg(0x313D, 0x00),
    reg(0x313E, 0xCF),
    reg(0x313F, 0x01),
    reg(0x3140, 0x77),
    reg(0x3141, 0x00),
    reg(0x3142, 0x5F),
    reg(0x3143, 0x00),

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

    reg(0x300E, 0x00),
    reg(0x300F, 0x00),

    reg(0x302C, 0x10),
    reg(0x302D, 0x00),

    reg(0x30A9, 0x88),
    reg(0x30AA, 0x13),
    reg(0x30AB, 0x00),

    reg(0x30AC, 0xB0),
    reg(0x30AD, 0x04),

    reg(0x3084, 0xB0),
    reg(0x3085, 0x04),

    reg(0x3086, 0xB0),
    reg(0x3087, 0x04),

    reg(0x332C, 0x00),
    reg(0x332D, 0x00),
    reg(0x334A, 0x00),
    reg(0x334B, 0x00),
    reg(0x35B6, 0x00),
    reg(0x35B7, 0x00),
    reg(0x35B8, 0x00),
    reg(0x35B9, 0x00),
    reg(0x36BC, 0x00),
    reg(0x36BD, 0x00),

    delay_ms(10),

    reg(0x3000, 0x02),
    reg(0x35E5, 0x92),
    reg(0x35E5, 0x9A),
    reg(0x3000, 0x00),

    delay_ms(10),

    reg(0x3033, 0x20),
    reg(0x3017, 0xA8),
];
