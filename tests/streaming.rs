mod common;

use common::*;
use imx294_i2c::registers::*;
use imx294_i2c::{Config, Error, Imx294, StreamState};

#[test]
fn probe_leaves_sensor_powered_down() {
    let sensor = sensor();
    assert_eq!(sensor.state(), StreamState::Standby);
    assert!(!sensor.is_powered());
    assert!(!sensor.common_regs_applied());
    assert_eq!(sensor.power().acquires, 1);
    assert_eq!(sensor.power().releases, 1);
    assert_eq!(sensor.transport().reads, 1);
    assert!(sensor.transport().writes.is_empty());
    assert_eq!(sensor.mode().width, 4144);
}

#[test]
fn probe_rejects_wrong_clock() {
    let result = Imx294::new(
        MockTransport::default(),
        MockPower::default(),
        MockDelay::default(),
        Config::default().with_xclk_freq(27_000_000),
    );
    assert!(matches!(result, Err(Error::UnsupportedClock(27_000_000))));
}

#[test]
fn probe_rejects_foreign_chip() {
    let transport = MockTransport {
        chip_id: 0x55,
        ..MockTransport::default()
    };
    let result = Imx294::new(
        transport,
        MockPower::default(),
        MockDelay::default(),
        Config::default(),
    );
    match result {
        Err(Error::ChipIdentityMismatch { expected, found }) => {
            assert_eq!(expected, 0x00);
            assert_eq!(found, 0x55);
        }
        _ => panic!("foreign chip accepted"),
    }
}

#[test]
fn probe_fails_without_power() {
    let power = MockPower {
        fail: true,
        ..MockPower::default()
    };
    let result = Imx294::new(
        MockTransport::default(),
        power,
        MockDelay::default(),
        Config::default(),
    );
    assert!(matches!(result, Err(Error::Power(PowerFault))));
}

#[test]
fn enable_programs_common_mode_and_controls() {
    let mut sensor = sensor();
    sensor.enable().unwrap();

    assert_eq!(sensor.state(), StreamState::Streaming);
    assert!(sensor.is_powered());
    assert!(sensor.common_regs_applied());
    assert_eq!(sensor.power().acquires, 2);

    let mode = sensor.mode();
    let writes = &sensor.transport().writes;
    let programmed = common_writes() + mode_writes(mode);
    assert_eq!(writes.len(), programmed + CONTROL_WRITES + STREAM_ON_WRITES);
    assert_eq!(writes[0], (0x3033, vec![0x30]));

    let replay: Vec<u16> = writes[programmed..].iter().map(|(a, _)| *a).collect();
    assert_eq!(
        replay,
        vec![
            REG_VMAX,
            REG_PSSLVS1,
            REG_PSSLVS2,
            REG_PSSLVS3,
            REG_PSSLVS4,
            REG_PSSLVS0,
            REG_HMAX,
            REG_HCOUNT1,
            REG_HCOUNT2,
            REG_SHR,
            REG_ANALOG_GAIN,
            REG_MODE_SELECT,
        ]
    );

    // VMAX 2500, little endian over three bytes
    assert_eq!(writes[programmed].1, vec![0xC4, 0x09, 0x00]);
    // HMAX 1199 mirrored into both counters
    for (_, bytes) in &writes[programmed + 6..programmed + 9] {
        assert_eq!(bytes, &vec![0xAF, 0x04]);
    }
    // exposure 1000 at HMAX 1199: SHR 1501
    assert_eq!(writes[programmed + 9].1, vec![0xDD, 0x05]);
    assert_eq!(writes.last().unwrap().1, vec![MODE_STREAMING]);
    assert_eq!(sensor.release().2.total_ms, 20);
}

#[test]
fn repeated_enable_is_silent() {
    let mut sensor = sensor();
    sensor.enable().unwrap();
    let writes = sensor.transport().attempts;
    sensor.enable().unwrap();
    sensor.set_stream(true).unwrap();
    assert_eq!(sensor.transport().attempts, writes);
    assert_eq!(sensor.power().acquires, 2);
}

#[test]
fn repeated_disable_is_silent() {
    let mut sensor = sensor();
    sensor.disable();
    sensor.set_stream(false).unwrap();
    assert_eq!(sensor.transport().attempts, 0);
    assert_eq!(sensor.power().acquires, 1);
    assert_eq!(sensor.power().releases, 1);

    sensor.enable().unwrap();
    sensor.disable();
    let attempts = sensor.transport().attempts;
    sensor.disable();
    assert_eq!(sensor.transport().attempts, attempts);
    assert_eq!(sensor.power().releases, 2);
}

#[test]
fn disable_writes_standby_and_releases() {
    let mut sensor = sensor();
    sensor.enable().unwrap();
    sensor.transport_mut().clear();

    sensor.disable();
    assert_eq!(sensor.transport().writes, vec![(REG_MODE_SELECT, vec![MODE_STANDBY])]);
    assert_eq!(sensor.power().releases, 2);
    assert_eq!(sensor.state(), StreamState::Standby);
    assert!(!sensor.common_regs_applied());
}

#[test]
fn standby_failure_still_releases_power() {
    let mut sensor = sensor();
    sensor.enable().unwrap();
    sensor.transport_mut().fail_address = Some(REG_MODE_SELECT);

    sensor.disable();
    assert_eq!(sensor.power().releases, 2);
    assert!(!sensor.is_powered());
    assert_eq!(sensor.state(), StreamState::Standby);
}

#[test]
fn power_failure_keeps_standby_without_io() {
    let mut sensor = sensor();
    sensor.power_mut().fail = true;
    assert!(matches!(sensor.enable(), Err(Error::Power(PowerFault))));
    assert_eq!(sensor.state(), StreamState::Standby);
    assert_eq!(sensor.transport().attempts, 0);
    assert!(!sensor.is_powered());
}

#[test]
fn failure_at_record_k_stops_after_k_minus_one_writes() {
    let common = common_writes();
    let mode = mode_writes(sensor().mode());
    let points = [1, 2, 17, common, common + 1, common + mode, common + mode + 1];

    for &k in points.iter() {
        let mut sensor = sensor();
        sensor.transport_mut().fail_at = Some(k);

        let result = sensor.enable();
        assert!(matches!(result, Err(Error::Comm(BusFault))), "k={}", k);
        assert_eq!(sensor.transport().writes.len(), k - 1, "k={}", k);
        assert_eq!(sensor.state(), StreamState::Standby);
        assert!(!sensor.is_powered());
        assert!(!sensor.common_regs_applied());
        assert_eq!(sensor.power().releases, 2);
    }
}

#[test]
fn retry_after_failure_reprograms_common_block() {
    let mut sensor = sensor();
    let common = common_writes();
    // fail in the mode list, after the common block completed
    sensor.transport_mut().fail_at = Some(common + 3);
    assert!(sensor.enable().is_err());

    sensor.transport_mut().clear();
    sensor.enable().unwrap();
    assert_eq!(sensor.transport().writes[0], (0x3033, vec![0x30]));
    assert_eq!(
        sensor.transport().writes.len(),
        common + mode_writes(sensor.mode()) + CONTROL_WRITES + STREAM_ON_WRITES
    );
}

#[test]
fn power_cycle_reapplies_common_block() {
    let mut sensor = sensor();
    sensor.enable().unwrap();
    sensor.disable();
    sensor.transport_mut().clear();

    sensor.enable().unwrap();
    let expected = common_writes() + mode_writes(sensor.mode()) + CONTROL_WRITES + STREAM_ON_WRITES;
    assert_eq!(sensor.transport().writes.len(), expected);
    assert_eq!(sensor.power().acquires, 3);
}

#[test]
fn suspend_holds_power_and_resume_skips_common_block() {
    let mut sensor = sensor();
    sensor.enable().unwrap();
    sensor.transport_mut().clear();

    sensor.suspend();
    assert_eq!(sensor.transport().writes, vec![(REG_MODE_SELECT, vec![MODE_STANDBY])]);
    assert_eq!(sensor.state(), StreamState::Standby);
    assert!(sensor.is_powered());
    assert_eq!(sensor.power().releases, 1);

    sensor.transport_mut().clear();
    sensor.resume().unwrap();
    assert_eq!(sensor.state(), StreamState::Streaming);
    assert_eq!(sensor.power().acquires, 2);
    assert_eq!(
        sensor.transport().writes.len(),
        mode_writes(sensor.mode()) + CONTROL_WRITES + STREAM_ON_WRITES
    );
    assert_eq!(
        sensor.transport().writes.last().unwrap(),
        &(REG_MODE_SELECT, vec![MODE_STREAMING])
    );

    // nothing to resume a second time
    sensor.transport_mut().clear();
    sensor.resume().unwrap();
    assert!(sensor.transport().writes.is_empty());
}

#[test]
fn resume_of_standby_sensor_does_nothing() {
    let mut sensor = sensor();
    sensor.suspend();
    sensor.resume().unwrap();
    assert_eq!(sensor.transport().attempts, 0);
    assert_eq!(sensor.state(), StreamState::Standby);
}

#[test]
fn resume_failure_forces_standby() {
    let mut sensor = sensor();
    sensor.enable().unwrap();
    sensor.suspend();
    sensor.transport_mut().clear();
    sensor.transport_mut().fail_at = Some(5);

    assert!(matches!(sensor.resume(), Err(Error::Comm(BusFault))));
    assert_eq!(sensor.state(), StreamState::Standby);
    assert!(!sensor.is_powered());
    assert_eq!(sensor.power().releases, 2);
    // four mode writes, then the best effort standby write
    assert_eq!(sensor.transport().writes.len(), 5);
    assert_eq!(
        sensor.transport().writes.last().unwrap(),
        &(REG_MODE_SELECT, vec![MODE_STANDBY])
    );

    // state is clean for an ordinary restart
    sensor.transport_mut().clear();
    sensor.enable().unwrap();
    assert_eq!(sensor.transport().writes[0], (0x3033, vec![0x30]));
}

#[test]
fn disable_while_suspended_releases_power() {
    let mut sensor = sensor();
    sensor.enable().unwrap();
    sensor.suspend();
    sensor.disable();
    assert!(!sensor.is_powered());
    assert_eq!(sensor.power().releases, 2);

    sensor.transport_mut().clear();
    sensor.resume().unwrap();
    assert!(sensor.transport().writes.is_empty());
    assert_eq!(sensor.state(), StreamState::Standby);
}
