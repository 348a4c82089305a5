#![cfg(feature = "std")]

mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use imx294_i2c::{ControlId, SharedImx294, StreamState};

#[test]
fn concurrent_callers_see_whole_transitions() {
    let shared = Arc::new(SharedImx294::new(sensor()));

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for n in 0..25u32 {
                    shared.set_stream(n % 2 == 0).unwrap();
                    shared
                        .set_control(ControlId::Exposure, 500 + i * 100 + n)
                        .unwrap();
                    if n % 5 == 0 {
                        shared.suspend();
                        shared.resume().unwrap();
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    shared.set_stream(false).unwrap();
    let shared = Arc::try_unwrap(shared).ok().unwrap();
    assert_eq!(shared.state(), StreamState::Standby);

    let sensor = shared.into_inner();
    assert!(!sensor.is_powered());
    assert_eq!(sensor.power().acquires, sensor.power().releases);
}

#[test]
fn lock_spans_compound_sequences() {
    let shared = SharedImx294::new(sensor());
    {
        let mut sensor = shared.lock();
        sensor.set_format(0x3010, 3792, 2840).unwrap();
        sensor.enable().unwrap();
    }
    assert_eq!(shared.state(), StreamState::Streaming);
    assert_eq!(shared.control(ControlId::PixelRate), 3792 * 72_000_000 / 1024);
}
