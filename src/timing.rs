/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Exposure and shutter arithmetic.
//!
//! Integration time `[s] = ({VMAX * (SVR + 1) - SHR} * HMAX + offset) / 72e6`,
//! and the exposure control counts that time in units of one line (HMAX).
//! All conversion is exact integer math. The two directions truncate
//! differently, so a round trip may move SHR by one.

/// Largest value the 2-byte SHR register can hold
pub const SHR_MAX: u64 = 0xFFFF;

/// SHR may not come closer than this to the end of the frame
pub const SHR_FRAME_MARGIN: u64 = 4;

/// Exposure in lines for a given shutter offset
pub fn exposure_from_shutter(
    h_period: u64,
    v_period: u64,
    shutter: u64,
    svr: u64,
    integration_offset: u64,
) -> u32 {
    let frame = v_period * (svr + 1);
    let numerator = frame.saturating_sub(shutter) * h_period + integration_offset;
    let lines = numerator.checked_div(h_period).unwrap_or(0);
    lines.min(u64::from(u32::MAX)) as u32
}

/// Shutter offset register value for an exposure in lines
pub fn shutter_from_exposure(
    exposure: u64,
    h_period: u64,
    v_period: u64,
    svr: u64,
    integration_offset: u64,
) -> u32 {
    let lines = (exposure * h_period)
        .saturating_sub(integration_offset)
        .checked_div(h_period)
        .unwrap_or(0);
    let shutter = (v_period * (svr + 1)).saturating_sub(lines);
    shutter.min(u64::from(u32::MAX)) as u32
}

/// `(min, max)` exposure reachable at this frame timing
pub fn exposure_bounds(
    h_period: u64,
    v_period: u64,
    min_shutter: u64,
    svr: u64,
    integration_offset: u64,
) -> (u32, u32) {
    let max_shutter = (v_period * (svr + 1))
        .saturating_sub(SHR_FRAME_MARGIN)
        .min(SHR_MAX);
    let min = exposure_from_shutter(h_period, v_period, max_shutter, svr, integration_offset);
    let max = exposure_from_shutter(h_period, v_period, min_shutter, svr, integration_offset);
    (min, max)
}
