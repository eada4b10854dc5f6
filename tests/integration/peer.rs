//! Simulated peers and a harness around `ProfileService`.
//!
//! The standard peer exposes one Heart Rate service laid out as:
//!
//! | handle | attribute                          |
//! |--------|------------------------------------|
//! | 1      | Heart Rate service                 |
//! | 3      | Heart Rate Measurement value       |
//! | 6      | Body Sensor Location value         |
//! | 9      | Heart Rate Control Point value     |

use std::rc::Rc;

use hrp::adapters::sim::{RecordingSink, SimAttributeDb, SimDevice, SimGattClient};
use hrp::app::ports::{DeviceAddress, DeviceId};
use hrp::app::service::ProfileService;
use hrp::config::ProfileConfig;
use hrp::profile::completion::CompletionQueue;
use hrp::profile::session::Session;
use hrp::uuid::{
    BODY_SENSOR_LOCATION, HEART_RATE_CONTROL_POINT, HEART_RATE_MEASUREMENT, HEART_RATE_SERVICE,
};

pub const MEASUREMENT: u16 = 3;
pub const LOCATION: u16 = 6;
pub const CONTROL_POINT: u16 = 9;

pub fn address(id: u32) -> DeviceAddress {
    let [a, b, c, d] = id.to_be_bytes();
    DeviceAddress([0xC0, 0xFF, a, b, c, d])
}

pub fn standard_db() -> SimAttributeDb {
    let mut db = SimAttributeDb::new();
    let svc = db.add_service(HEART_RATE_SERVICE);
    assert_eq!(db.add_characteristic(svc, HEART_RATE_MEASUREMENT), MEASUREMENT);
    assert_eq!(db.add_characteristic(svc, BODY_SENSOR_LOCATION), LOCATION);
    assert_eq!(db.add_characteristic(svc, HEART_RATE_CONTROL_POINT), CONTROL_POINT);
    db
}

/// Profile service, event recorder and the completion queue every
/// simulated client posts to.
pub struct Harness {
    pub service: ProfileService<SimDevice>,
    pub sink: RecordingSink,
    pub queue: Rc<CompletionQueue>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with_config(ProfileConfig::default())
    }

    pub fn with_config(config: ProfileConfig) -> Self {
        Self {
            service: ProfileService::new(config),
            sink: RecordingSink::default(),
            queue: Rc::new(CompletionQueue::new()),
        }
    }

    pub fn device(&self, id: u32, db: SimAttributeDb) -> Rc<SimDevice> {
        Rc::new(SimDevice::new(
            DeviceId(id),
            address(id),
            db,
            SimGattClient::new(Rc::clone(&self.queue)),
        ))
    }

    pub fn standard_device(&self, id: u32) -> Rc<SimDevice> {
        self.device(id, standard_db())
    }

    pub fn drain(&mut self) -> usize {
        self.service.drain(&self.queue, &mut self.sink)
    }

    pub fn session(&self, id: u32) -> &Session<SimDevice> {
        self.service
            .session(DeviceId(id))
            .expect("session should exist")
    }
}

/// Strong counts of the device, its database and its client.
pub fn strong_counts(device: &Rc<SimDevice>) -> (usize, usize, usize) {
    (
        Rc::strong_count(device),
        Rc::strong_count(device.db_handle()),
        Rc::strong_count(device.client()),
    )
}
