//! Simulated peer: an in-memory attribute database and a scripted GATT
//! client.
//!
//! Used by the host tests and by integrators who want to drive the
//! profile without a radio.  The client never answers from inside a
//! request; every result is posted to the shared [`CompletionQueue`], just
//! as a real client would deliver it later from the event loop.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::app::events::ProfileEvent;
use crate::app::ports::{
    AttributeDb, CharacteristicData, CharacteristicRef, DeviceAddress, DeviceId, DevicePort,
    EventSink, GattClient, NotifyId, ServiceRef,
};
use crate::codec::{AttValue, MAX_ATT_VALUE_LEN};
use crate::error::{AttError, SessionFault};
use crate::profile::completion::{Completion, CompletionQueue, RequestToken};
use crate::uuid::BtUuid;

/// Copy `bytes` into a bounded ATT value, cutting anything past the ATT
/// maximum.
pub fn att_value(bytes: &[u8]) -> AttValue {
    let len = bytes.len().min(MAX_ATT_VALUE_LEN);
    AttValue::from_slice(&bytes[..len]).unwrap_or_default()
}

// ───────────────────────────────────────────────────────────────
// Attribute database
// ───────────────────────────────────────────────────────────────

struct SimCharacteristic {
    decl: u16,
    value_handle: u16,
    uuid: BtUuid,
    /// Declaration the database cannot describe.
    broken: bool,
}

struct SimService {
    decl: u16,
    uuid: BtUuid,
    characteristics: Vec<SimCharacteristic>,
}

/// Attribute table built up front by the test.  Handles are assigned in
/// declaration order: service declaration, then per characteristic the
/// declaration, the value and its configuration descriptor.
pub struct SimAttributeDb {
    services: Vec<SimService>,
    next_handle: u16,
}

impl SimAttributeDb {
    pub fn new() -> Self {
        Self {
            services: Vec::new(),
            next_handle: 1,
        }
    }

    pub fn add_service(&mut self, uuid: BtUuid) -> ServiceRef {
        let decl = self.next_handle;
        self.next_handle += 1;
        self.services.push(SimService {
            decl,
            uuid,
            characteristics: Vec::new(),
        });
        ServiceRef(decl)
    }

    /// Declare a characteristic under `service` and return its value handle.
    pub fn add_characteristic(&mut self, service: ServiceRef, uuid: BtUuid) -> u16 {
        self.push_characteristic(service, uuid, false).value_handle
    }

    /// Declare a characteristic whose metadata cannot be read.
    pub fn add_broken_characteristic(&mut self, service: ServiceRef) -> CharacteristicRef {
        self.push_characteristic(service, BtUuid::from_u128(0), true).attr
    }

    fn push_characteristic(&mut self, service: ServiceRef, uuid: BtUuid, broken: bool) -> Declared {
        let decl = self.next_handle;
        let value_handle = decl + 1;
        self.next_handle += 3;
        if let Some(svc) = self.services.iter_mut().find(|s| s.decl == service.0) {
            svc.characteristics.push(SimCharacteristic {
                decl,
                value_handle,
                uuid,
                broken,
            });
        }
        Declared {
            attr: CharacteristicRef(decl),
            value_handle,
        }
    }
}

struct Declared {
    attr: CharacteristicRef,
    value_handle: u16,
}

impl Default for SimAttributeDb {
    fn default() -> Self {
        Self::new()
    }
}

impl AttributeDb for SimAttributeDb {
    fn foreach_service(&self, uuid: BtUuid, f: &mut dyn FnMut(ServiceRef)) {
        for svc in self.services.iter().filter(|s| s.uuid == uuid) {
            f(ServiceRef(svc.decl));
        }
    }

    fn foreach_characteristic(&self, service: ServiceRef, f: &mut dyn FnMut(CharacteristicRef)) {
        let Some(svc) = self.services.iter().find(|s| s.decl == service.0) else {
            return;
        };
        for c in &svc.characteristics {
            f(CharacteristicRef(c.decl));
        }
    }

    fn characteristic_data(&self, attr: CharacteristicRef) -> Option<CharacteristicData> {
        self.services
            .iter()
            .flat_map(|s| s.characteristics.iter())
            .find(|c| c.decl == attr.0 && !c.broken)
            .map(|c| CharacteristicData {
                value_handle: c.value_handle,
                uuid: c.uuid,
            })
    }
}

// ───────────────────────────────────────────────────────────────
// GATT client
// ───────────────────────────────────────────────────────────────

/// A request as the client saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Read(u16),
    RegisterNotify(u16),
}

#[derive(Default)]
struct ClientState {
    reads: HashMap<u16, Result<AttValue, AttError>>,
    ccc_status: HashMap<u16, u8>,
    requests: Vec<Request>,
    registrations: Vec<RequestToken>,
    reject: bool,
    next_notify_id: u32,
}

/// Scripted GATT client.  Reads answer with the configured value (empty
/// when nothing was configured) and notify registrations succeed unless a
/// status was set for the handle.  Requests are refused while rejecting or
/// while the completion queue is full.
pub struct SimGattClient {
    queue: Rc<CompletionQueue>,
    state: RefCell<ClientState>,
}

impl SimGattClient {
    pub fn new(queue: Rc<CompletionQueue>) -> Self {
        Self {
            queue,
            state: RefCell::new(ClientState::default()),
        }
    }

    pub fn queue(&self) -> &Rc<CompletionQueue> {
        &self.queue
    }

    pub fn set_read_value(&self, handle: u16, bytes: &[u8]) {
        self.state
            .borrow_mut()
            .reads
            .insert(handle, Ok(att_value(bytes)));
    }

    pub fn set_read_error(&self, handle: u16, error: AttError) {
        self.state.borrow_mut().reads.insert(handle, Err(error));
    }

    /// ATT status the configuration write on `handle` completes with.
    pub fn set_ccc_status(&self, handle: u16, status: u8) {
        self.state.borrow_mut().ccc_status.insert(handle, status);
    }

    /// Refuse every request from now on, as a client with no connection does.
    pub fn set_reject(&self, reject: bool) {
        self.state.borrow_mut().reject = reject;
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.borrow().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.borrow_mut().requests.clear();
    }

    pub fn registration_count(&self) -> usize {
        self.state.borrow().registrations.len()
    }

    /// Push `bytes` on `handle` to every registration for it.  Returns how
    /// many notifications were queued.
    pub fn notify(&self, handle: u16, bytes: &[u8]) -> usize {
        let tokens: Vec<RequestToken> = self
            .state
            .borrow()
            .registrations
            .iter()
            .filter(|t| t.handle == handle)
            .copied()
            .collect();
        tokens
            .into_iter()
            .filter(|&token| {
                self.queue.post(Completion::Notification {
                    token,
                    handle,
                    value: att_value(bytes),
                })
            })
            .count()
    }

    /// Queue an arbitrary completion, for paths a well-behaved peer never
    /// takes.
    pub fn inject(&self, completion: Completion) -> bool {
        self.queue.post(completion)
    }
}

impl GattClient for SimGattClient {
    fn read_value(&self, handle: u16, token: RequestToken) -> bool {
        let result = {
            let mut state = self.state.borrow_mut();
            state.requests.push(Request::Read(handle));
            if state.reject || self.queue.is_full() {
                return false;
            }
            state
                .reads
                .get(&handle)
                .cloned()
                .unwrap_or_else(|| Ok(AttValue::new()))
        };
        self.queue.post(Completion::Read { token, result })
    }

    fn register_notify(&self, handle: u16, token: RequestToken) -> Option<NotifyId> {
        let (status, id) = {
            let mut state = self.state.borrow_mut();
            state.requests.push(Request::RegisterNotify(handle));
            // A full queue could not carry the answer; refuse before the
            // registration is recorded.
            if state.reject || self.queue.is_full() {
                return None;
            }
            let status = state.ccc_status.get(&handle).copied().unwrap_or(0);
            if status == 0 {
                state.registrations.push(token);
            }
            state.next_notify_id += 1;
            (status, NotifyId(state.next_notify_id))
        };
        self.queue
            .post(Completion::NotifyRegistered { token, status })
            .then_some(id)
    }
}

// ───────────────────────────────────────────────────────────────
// Device
// ───────────────────────────────────────────────────────────────

/// Simulated remote device owning one database and one client.
pub struct SimDevice {
    id: DeviceId,
    address: DeviceAddress,
    db: Rc<SimAttributeDb>,
    client: Rc<SimGattClient>,
}

impl SimDevice {
    pub fn new(id: DeviceId, address: DeviceAddress, db: SimAttributeDb, client: SimGattClient) -> Self {
        Self {
            id,
            address,
            db: Rc::new(db),
            client: Rc::new(client),
        }
    }

    /// The shared database handle, for inspecting its reference count.
    pub fn db_handle(&self) -> &Rc<SimAttributeDb> {
        &self.db
    }

    /// The shared client handle, for scripting and reference counts.
    pub fn client(&self) -> &Rc<SimGattClient> {
        &self.client
    }
}

impl DevicePort for SimDevice {
    type Db = SimAttributeDb;
    type Client = SimGattClient;

    fn id(&self) -> DeviceId {
        self.id
    }

    fn address(&self) -> DeviceAddress {
        self.address
    }

    fn gatt_db(&self) -> Rc<SimAttributeDb> {
        Rc::clone(&self.db)
    }

    fn gatt_client(&self) -> Rc<SimGattClient> {
        Rc::clone(&self.client)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// Sink that keeps every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<ProfileEvent>,
}

impl RecordingSink {
    /// Faults in emission order, across all devices.
    pub fn faults(&self) -> Vec<SessionFault> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProfileEvent::Fault { fault, .. } => Some(*fault),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &ProfileEvent) {
        self.events.push(event.clone());
    }
}
