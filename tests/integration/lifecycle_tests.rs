//! Integration tests for bind → accept → disconnect → remove.

use hrp::adapters::sim::{Request, SimAttributeDb};
use hrp::app::events::ProfileEvent;
use hrp::app::ports::{DeviceId, ServiceRef};
use hrp::codec::measurement;
use hrp::error::{ProfileError, SessionFault};
use hrp::fsm::SessionState;
use hrp::uuid::{BtUuid, HEART_RATE_MEASUREMENT, HEART_RATE_SERVICE};

use crate::peer::{Harness, MEASUREMENT, strong_counts};

// ── Bind ─────────────────────────────────────────────────────

#[test]
fn second_bind_is_rejected_and_session_untouched() {
    let mut h = Harness::new();
    let dev = h.standard_device(1);

    h.service.bind(&dev, &mut h.sink).unwrap();
    h.service.accept(DeviceId(1), &mut h.sink).unwrap();
    let transitions = h.session(1).transition_count();

    assert_eq!(
        h.service.bind(&dev, &mut h.sink),
        Err(ProfileError::AlreadyProbed)
    );
    assert_eq!(h.session(1).state(), SessionState::Bound);
    assert_eq!(h.session(1).transition_count(), transitions);
    assert_eq!(h.service.session_count(), 1);
}

// ── Accept ───────────────────────────────────────────────────

#[test]
fn accept_without_bind_is_not_probed() {
    let mut h = Harness::new();
    assert_eq!(
        h.service.accept(DeviceId(5), &mut h.sink),
        Err(ProfileError::NotProbed)
    );
    assert_eq!(h.service.session_count(), 0);
}

#[test]
fn accept_without_service_stays_probed_and_holds_nothing() {
    let mut h = Harness::new();
    let mut db = SimAttributeDb::new();
    // Battery service only.
    let battery = db.add_service(BtUuid::from_u16(0x180F));
    db.add_characteristic(battery, BtUuid::from_u16(0x2A19));
    let dev = h.device(1, db);

    h.service.bind(&dev, &mut h.sink).unwrap();
    assert_eq!(
        h.service.accept(DeviceId(1), &mut h.sink),
        Err(ProfileError::ServiceNotFound)
    );

    let session = h.session(1);
    assert_eq!(session.state(), SessionState::Probed);
    assert_eq!(session.context().service(), None);
    assert_eq!(session.context().measurement_handle(), None);
    assert_eq!(session.context().location_handle(), None);
    assert!(!session.context().has_resources());
    // Only the device and the session hold anything.
    assert_eq!(strong_counts(&dev), (2, 1, 1));
    assert!(dev.client().requests().is_empty());
    assert_eq!(
        h.sink.events.last(),
        Some(&ProfileEvent::ConnectingComplete {
            device: DeviceId(1),
            result: Err(ProfileError::ServiceNotFound),
        })
    );
}

#[test]
fn accept_with_two_services_binds_only_the_first() {
    let mut h = Harness::new();
    let mut db = SimAttributeDb::new();
    let first = db.add_service(HEART_RATE_SERVICE);
    let first_hrm = db.add_characteristic(first, HEART_RATE_MEASUREMENT);
    let second = db.add_service(HEART_RATE_SERVICE);
    let second_hrm = db.add_characteristic(second, HEART_RATE_MEASUREMENT);
    let dev = h.device(1, db);

    h.service.bind(&dev, &mut h.sink).unwrap();
    h.service.accept(DeviceId(1), &mut h.sink).unwrap();

    let ctx = h.session(1).context();
    assert_eq!(ctx.service(), Some(ServiceRef(1)));
    assert_eq!(ctx.measurement_handle(), Some(first_hrm));
    assert_eq!(h.sink.faults(), [SessionFault::DuplicateServiceIgnored]);
    assert_eq!(dev.client().requests(), [Request::RegisterNotify(first_hrm)]);
    assert!(!dev.client().requests().contains(&Request::RegisterNotify(second_hrm)));
}

#[test]
fn accept_on_bound_session_releases_previous_period_first() {
    let mut h = Harness::new();
    let dev = h.standard_device(1);
    h.service.bind(&dev, &mut h.sink).unwrap();
    h.service.accept(DeviceId(1), &mut h.sink).unwrap();
    let first_generation = h.session(1).context().generation();

    h.service.accept(DeviceId(1), &mut h.sink).unwrap();

    assert_eq!(h.session(1).state(), SessionState::Bound);
    assert!(h.session(1).context().generation() > first_generation);
    assert_eq!(strong_counts(&dev), (2, 2, 2));
}

// ── Disconnect ───────────────────────────────────────────────

#[test]
fn double_disconnect_releases_handles_once() {
    let mut h = Harness::new();
    let dev = h.standard_device(1);
    h.service.bind(&dev, &mut h.sink).unwrap();
    h.service.accept(DeviceId(1), &mut h.sink).unwrap();
    assert_eq!(strong_counts(&dev), (2, 2, 2));

    assert_eq!(h.service.disconnect(DeviceId(1), &mut h.sink), Ok(()));
    assert_eq!(strong_counts(&dev), (2, 1, 1));
    let transitions = h.session(1).transition_count();

    assert_eq!(h.service.disconnect(DeviceId(1), &mut h.sink), Ok(()));
    assert_eq!(strong_counts(&dev), (2, 1, 1));
    assert_eq!(h.session(1).state(), SessionState::Disconnected);
    assert_eq!(h.session(1).transition_count(), transitions);

    let completions = h
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, ProfileEvent::DisconnectingComplete(_)))
        .count();
    assert_eq!(completions, 2);
}

#[test]
fn disconnect_clears_wiring_but_keeps_decoded_values() {
    let mut h = Harness::new();
    let dev = h.standard_device(1);
    h.service.bind(&dev, &mut h.sink).unwrap();
    h.service.accept(DeviceId(1), &mut h.sink).unwrap();
    h.drain();
    dev.client().notify(MEASUREMENT, &[0x00, 0x48]);
    h.drain();

    h.service.disconnect(DeviceId(1), &mut h.sink).unwrap();

    let session = h.session(1);
    assert_eq!(session.context().service(), None);
    assert_eq!(session.context().measurement_handle(), None);
    assert_eq!(session.decoded().heart_rate(), Some(72));
}

#[test]
fn reaccept_after_disconnect_rediscovers() {
    let mut h = Harness::new();
    let dev = h.standard_device(1);
    h.service.bind(&dev, &mut h.sink).unwrap();
    h.service.accept(DeviceId(1), &mut h.sink).unwrap();
    h.service.disconnect(DeviceId(1), &mut h.sink).unwrap();
    dev.client().clear_requests();

    h.service.accept(DeviceId(1), &mut h.sink).unwrap();

    assert_eq!(h.session(1).state(), SessionState::Bound);
    assert_eq!(h.session(1).context().measurement_handle(), Some(MEASUREMENT));
    assert!(dev.client().requests().contains(&Request::RegisterNotify(MEASUREMENT)));
    assert_eq!(strong_counts(&dev), (2, 2, 2));
}

// ── Remove ───────────────────────────────────────────────────

#[test]
fn full_cycle_frees_everything_exactly_once() {
    let mut h = Harness::new();
    let dev = h.standard_device(1);
    assert_eq!(strong_counts(&dev), (1, 1, 1));

    h.service.bind(&dev, &mut h.sink).unwrap();
    assert_eq!(strong_counts(&dev), (2, 1, 1));

    h.service.accept(DeviceId(1), &mut h.sink).unwrap();
    assert_eq!(h.session(1).state(), SessionState::Bound);
    assert_eq!(strong_counts(&dev), (2, 2, 2));
    h.drain();

    let payload = [0x00, 0x48];
    assert_eq!(dev.client().notify(MEASUREMENT, &payload), 1);
    assert_eq!(h.drain(), 1);
    assert_eq!(
        h.session(1).decoded().measurement,
        Some(measurement::decode(&payload).unwrap())
    );

    h.service.disconnect(DeviceId(1), &mut h.sink).unwrap();
    assert_eq!(strong_counts(&dev), (2, 1, 1));

    h.service.remove(DeviceId(1), &mut h.sink);
    assert_eq!(h.service.session_count(), 0);
    assert_eq!(strong_counts(&dev), (1, 1, 1));

    let lifecycle: Vec<_> = h
        .sink
        .events
        .iter()
        .filter(|e| !matches!(e, ProfileEvent::Fault { .. }))
        .cloned()
        .collect();
    assert_eq!(
        lifecycle,
        [
            ProfileEvent::Probed(DeviceId(1)),
            ProfileEvent::ConnectingComplete {
                device: DeviceId(1),
                result: Ok(()),
            },
            ProfileEvent::DisconnectingComplete(DeviceId(1)),
            ProfileEvent::Removed(DeviceId(1)),
        ]
    );
    assert!(h.sink.faults().is_empty());
}

#[test]
fn remove_while_bound_releases_everything() {
    let mut h = Harness::new();
    let dev = h.standard_device(1);
    h.service.bind(&dev, &mut h.sink).unwrap();
    h.service.accept(DeviceId(1), &mut h.sink).unwrap();

    h.service.remove(DeviceId(1), &mut h.sink);

    assert_eq!(strong_counts(&dev), (1, 1, 1));
    assert!(h.service.session(DeviceId(1)).is_none());
}

#[test]
fn remove_unknown_device_emits_nothing() {
    let mut h = Harness::new();
    h.service.remove(DeviceId(42), &mut h.sink);
    assert!(h.sink.events.is_empty());
}

#[test]
fn sessions_are_independent() {
    let mut h = Harness::new();
    let a = h.standard_device(1);
    let b = h.standard_device(2);
    h.service.bind(&a, &mut h.sink).unwrap();
    h.service.bind(&b, &mut h.sink).unwrap();
    h.service.accept(DeviceId(1), &mut h.sink).unwrap();
    h.service.accept(DeviceId(2), &mut h.sink).unwrap();
    h.drain();

    h.service.disconnect(DeviceId(1), &mut h.sink).unwrap();
    b.client().notify(MEASUREMENT, &[0x00, 90]);
    h.drain();

    assert_eq!(h.session(1).state(), SessionState::Disconnected);
    assert_eq!(h.session(2).state(), SessionState::Bound);
    assert_eq!(h.session(2).decoded().heart_rate(), Some(90));
    assert_eq!(h.session(1).decoded().heart_rate(), None);
}

#[test]
fn pump_handles_one_completion() {
    let mut h = Harness::new();
    let dev = h.standard_device(1);
    h.service.bind(&dev, &mut h.sink).unwrap();
    h.service.accept(DeviceId(1), &mut h.sink).unwrap();
    h.drain();
    dev.client().notify(MEASUREMENT, &[0x00, 61]);

    futures_lite::future::block_on(h.service.pump(&h.queue, &mut h.sink));

    assert!(h.queue.is_empty());
    assert_eq!(h.session(1).decoded().heart_rate(), Some(61));
}
