//! Fuzz target: notification delivery through a bound session
//!
//! Binds and accepts a simulated peer, then pushes arbitrary values on the
//! measurement and sensor-location handles.  The session must stay bound,
//! report undecodable values as faults and never panic.
//!
//! cargo fuzz run fuzz_notification_path

#![no_main]

use std::rc::Rc;

use hrp::adapters::sim::{RecordingSink, SimAttributeDb, SimDevice, SimGattClient};
use hrp::app::ports::{DeviceAddress, DeviceId};
use hrp::app::service::ProfileService;
use hrp::config::ProfileConfig;
use hrp::fsm::SessionState;
use hrp::profile::completion::CompletionQueue;
use hrp::uuid::{BODY_SENSOR_LOCATION, HEART_RATE_MEASUREMENT, HEART_RATE_SERVICE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let queue = Rc::new(CompletionQueue::new());
    let mut db = SimAttributeDb::new();
    let svc = db.add_service(HEART_RATE_SERVICE);
    let hrm = db.add_characteristic(svc, HEART_RATE_MEASUREMENT);
    let bsl = db.add_characteristic(svc, BODY_SENSOR_LOCATION);
    let client = SimGattClient::new(Rc::clone(&queue));
    client.set_read_value(bsl, &[0x01]);
    let device = Rc::new(SimDevice::new(
        DeviceId(1),
        DeviceAddress([0; 6]),
        db,
        client,
    ));

    let mut service = ProfileService::new(ProfileConfig::default());
    let mut sink = RecordingSink::default();
    if service.bind(&device, &mut sink).is_err() || service.accept(DeviceId(1), &mut sink).is_err() {
        return;
    }
    service.drain(&queue, &mut sink);

    // First byte picks the handle, the rest is the value.
    for chunk in data.chunks(8) {
        let Some((&selector, value)) = chunk.split_first() else {
            continue;
        };
        let handle = if selector & 1 == 0 { hrm } else { bsl };
        device.client().notify(handle, value);
        service.drain(&queue, &mut sink);
    }

    let state = service.session(DeviceId(1)).map(|s| s.state());
    assert_eq!(state, Some(SessionState::Bound));
});
