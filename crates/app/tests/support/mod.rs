//! In-memory fakes of the BLE ports.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use wearsync_app::error::GattError;
use wearsync_app::ports::{
    CharacteristicHandle, CharacteristicProperties, ConnectionEvent, ConnectionEventStream,
    ConnectionPriority, ConnectionState, DeviceTarget, GattPeripheral, Notification,
    NotificationStream, ScanGateway, WriteMode,
};
use wearsync_domain::profile::ProfileKind;

pub const ADDRESS: &str = "AA:BB:CC:DD:EE:FF";

pub const NOTIFY: CharacteristicProperties = CharacteristicProperties {
    read: true,
    write: false,
    write_without_response: false,
    notify: true,
    indicate: false,
};

pub const WRITABLE: CharacteristicProperties = CharacteristicProperties {
    read: true,
    write: true,
    write_without_response: false,
    notify: true,
    indicate: false,
};

/// A recorded characteristic write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    pub characteristic: Uuid,
    pub value: Vec<u8>,
    pub mode: WriteMode,
}

// ── Peripheral ──────────────────────────────────────────────────

#[derive(Default)]
struct PeripheralState {
    characteristics: Vec<CharacteristicHandle>,
    values: HashMap<Uuid, Vec<u8>>,
    failing_subscriptions: HashSet<Uuid>,
    subscriptions: Vec<Uuid>,
    writes: Vec<Write>,
    notify_tx: Option<mpsc::UnboundedSender<Notification>>,
}

#[derive(Clone)]
pub struct FakePeripheral {
    address: String,
    name: Option<String>,
    state: Arc<Mutex<PeripheralState>>,
}

impl FakePeripheral {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_owned(),
            name: None,
            state: Arc::default(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    pub fn with_characteristic(
        self,
        service: Uuid,
        uuid: Uuid,
        properties: CharacteristicProperties,
    ) -> Self {
        self.lock().characteristics.push(CharacteristicHandle {
            service,
            uuid,
            properties,
        });
        self
    }

    pub fn with_profile(self, kind: ProfileKind, properties: CharacteristicProperties) -> Self {
        self.with_characteristic(kind.service_uuid(), kind.characteristic_uuid(), properties)
    }

    pub fn with_value(self, characteristic: Uuid, value: &[u8]) -> Self {
        self.lock().values.insert(characteristic, value.to_vec());
        self
    }

    pub fn failing_subscribe(self, characteristic: Uuid) -> Self {
        self.lock().failing_subscriptions.insert(characteristic);
        self
    }

    /// Push a notification into the currently open stream.
    pub fn notify(&self, characteristic: Uuid, value: &[u8]) {
        if let Some(tx) = &self.lock().notify_tx {
            let _ = tx.send(Notification {
                characteristic,
                value: value.to_vec(),
            });
        }
    }

    /// End the notification stream, as a dropped link would.
    pub fn close_link(&self) {
        self.lock().notify_tx = None;
    }

    pub fn subscriptions(&self) -> Vec<Uuid> {
        self.lock().subscriptions.clone()
    }

    pub fn is_subscribed(&self, characteristic: Uuid) -> bool {
        self.lock().subscriptions.contains(&characteristic)
    }

    pub fn writes(&self) -> Vec<Write> {
        self.lock().writes.clone()
    }

    pub fn writes_to(&self, characteristic: Uuid) -> Vec<Write> {
        self.writes()
            .into_iter()
            .filter(|write| write.characteristic == characteristic)
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PeripheralState> {
        self.state.lock().unwrap()
    }
}

impl GattPeripheral for FakePeripheral {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn name(&self) -> Option<String> {
        self.name.clone()
    }

    async fn request_mtu(&self, mtu: u16) -> Result<u16, GattError> {
        Ok(mtu)
    }

    async fn request_connection_priority(
        &self,
        _priority: ConnectionPriority,
    ) -> Result<(), GattError> {
        Err(GattError::Unsupported("connection priority"))
    }

    async fn read_rssi(&self) -> Result<i16, GattError> {
        Ok(-60)
    }

    fn characteristic(&self, service: Uuid, characteristic: Uuid) -> Option<CharacteristicHandle> {
        self.lock()
            .characteristics
            .iter()
            .find(|c| c.service == service && c.uuid == characteristic)
            .copied()
    }

    async fn read(&self, handle: &CharacteristicHandle) -> Result<Vec<u8>, GattError> {
        self.lock()
            .values
            .get(&handle.uuid)
            .cloned()
            .ok_or_else(|| GattError::ReadFailed {
                characteristic: handle.uuid,
                source: "no value".into(),
            })
    }

    async fn write(
        &self,
        handle: &CharacteristicHandle,
        value: &[u8],
        mode: WriteMode,
    ) -> Result<(), GattError> {
        self.lock().writes.push(Write {
            characteristic: handle.uuid,
            value: value.to_vec(),
            mode,
        });
        Ok(())
    }

    async fn subscribe(&self, handle: &CharacteristicHandle) -> Result<(), GattError> {
        let mut state = self.lock();
        if state.failing_subscriptions.contains(&handle.uuid) {
            return Err(GattError::Transport("CCCD write rejected".into()));
        }
        state.subscriptions.push(handle.uuid);
        Ok(())
    }

    async fn notifications(&self) -> Result<NotificationStream, GattError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().notify_tx = Some(tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

// ── Gateway ─────────────────────────────────────────────────────

#[derive(Default)]
struct GatewayState {
    peripherals: Vec<FakePeripheral>,
    states: HashMap<String, ConnectionState>,
    events_tx: Option<mpsc::UnboundedSender<ConnectionEvent<FakePeripheral>>>,
    auto_connect_failures: usize,
    fail_connect: bool,
}

#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<GatewayState>,
    connect_calls: AtomicUsize,
    auto_connect_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn with_peripherals(peripherals: impl IntoIterator<Item = FakePeripheral>) -> Self {
        let gateway = Self::default();
        gateway.lock().peripherals.extend(peripherals);
        gateway
    }

    pub fn set_state(&self, peripheral: &FakePeripheral, state: ConnectionState) {
        self.lock().states.insert(peripheral.address.clone(), state);
    }

    /// Make the initial `connect` fail.
    pub fn fail_connect(&self) {
        self.lock().fail_connect = true;
    }

    /// Make the next `count` auto-connect requests fail.
    pub fn fail_auto_connects(&self, count: usize) {
        self.lock().auto_connect_failures += count;
    }

    /// Simulate a link loss: mark disconnected, end the notification
    /// stream and report the event.
    pub fn drop_link(&self, peripheral: &FakePeripheral) {
        peripheral.close_link();
        self.transition(peripheral, ConnectionState::Disconnected);
    }

    /// End the connection event stream.
    pub fn close_events(&self) {
        self.lock().events_tx = None;
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn auto_connect_calls(&self) -> usize {
        self.auto_connect_calls.load(Ordering::SeqCst)
    }

    fn transition(&self, peripheral: &FakePeripheral, state: ConnectionState) {
        let mut inner = self.lock();
        inner.states.insert(peripheral.address.clone(), state);
        if let Some(tx) = &inner.events_tx {
            let _ = tx.send(ConnectionEvent {
                peripheral: peripheral.clone(),
                state,
            });
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GatewayState> {
        self.state.lock().unwrap()
    }
}

impl ScanGateway for FakeGateway {
    type Peripheral = FakePeripheral;

    async fn scan_for(&self, target: &DeviceTarget) -> Result<FakePeripheral, GattError> {
        self.lock()
            .peripherals
            .iter()
            .find(|p| target.matches(&p.address, p.name.as_deref()))
            .cloned()
            .ok_or_else(|| GattError::NotFound(target.to_string()))
    }

    async fn stop_scan(&self) -> Result<(), GattError> {
        Ok(())
    }

    async fn connect(&self, peripheral: &FakePeripheral) -> Result<(), GattError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        let fail = self.lock().fail_connect;
        if fail {
            return Err(GattError::ConnectionFailed {
                address: peripheral.address.clone(),
                source: "out of range".into(),
            });
        }
        self.transition(peripheral, ConnectionState::Connected);
        Ok(())
    }

    async fn auto_connect(&self, peripheral: &FakePeripheral) -> Result<(), GattError> {
        self.auto_connect_calls.fetch_add(1, Ordering::SeqCst);
        let failing = {
            let mut state = self.lock();
            let failing = state.auto_connect_failures > 0;
            state.auto_connect_failures = state.auto_connect_failures.saturating_sub(1);
            failing
        };
        if failing {
            return Err(GattError::ConnectionFailed {
                address: peripheral.address.clone(),
                source: "out of range".into(),
            });
        }
        self.transition(peripheral, ConnectionState::Connected);
        Ok(())
    }

    async fn connection_state(&self, peripheral: &FakePeripheral) -> ConnectionState {
        self.lock()
            .states
            .get(&peripheral.address)
            .copied()
            .unwrap_or(ConnectionState::Disconnected)
    }

    async fn connection_events(
        &self,
    ) -> Result<ConnectionEventStream<FakePeripheral>, GattError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().events_tx = Some(tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

/// Poll `condition` until it holds, yielding to other tasks in between.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not reached");
}
