//! GATT port — characteristic I/O on a connected peripheral.

use std::future::Future;
use std::pin::Pin;

use tokio_stream::Stream;
use uuid::Uuid;

use crate::error::GattError;

/// What a characteristic allows, as advertised during service discovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct CharacteristicProperties {
    pub read: bool,
    pub write: bool,
    pub write_without_response: bool,
    pub notify: bool,
    pub indicate: bool,
}

/// A characteristic found on the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicHandle {
    pub service: Uuid,
    pub uuid: Uuid,
    pub properties: CharacteristicProperties,
}

impl CharacteristicHandle {
    /// `true` if the characteristic accepts writes of either kind.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.properties.write || self.properties.write_without_response
    }

    /// Preferred write mode: acknowledged when the characteristic allows it.
    #[must_use]
    pub fn preferred_write_mode(&self) -> WriteMode {
        if self.properties.write {
            WriteMode::WithResponse
        } else {
            WriteMode::WithoutResponse
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    WithResponse,
    WithoutResponse,
}

/// Link-layer connection interval hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionPriority {
    #[default]
    Balanced,
    High,
    LowPower,
}

/// A value pushed by the peripheral on a subscribed characteristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub characteristic: Uuid,
    pub value: Vec<u8>,
}

/// Notifications from one peripheral, in arrival order. Ends when the
/// link drops.
pub type NotificationStream = Pin<Box<dyn Stream<Item = Notification> + Send>>;

/// Characteristic-level access to one connected peripheral.
///
/// Handles are cheap to clone; clones refer to the same peripheral.
pub trait GattPeripheral: Send + Sync {
    /// Hardware address, formatted `AA:BB:CC:DD:EE:FF`.
    fn address(&self) -> String;

    /// Advertised local name, if any.
    fn name(&self) -> impl Future<Output = Option<String>> + Send;

    /// Ask for a larger ATT MTU. Returns the negotiated value.
    ///
    /// # Errors
    ///
    /// [`GattError::Unsupported`] when the stack cannot negotiate MTU.
    fn request_mtu(&self, mtu: u16) -> impl Future<Output = Result<u16, GattError>> + Send;

    /// # Errors
    ///
    /// [`GattError::Unsupported`] when the stack has no such knob.
    fn request_connection_priority(
        &self,
        priority: ConnectionPriority,
    ) -> impl Future<Output = Result<(), GattError>> + Send;

    /// Signal strength in dBm.
    ///
    /// # Errors
    ///
    /// Returns an error when no RSSI is known for the peripheral.
    fn read_rssi(&self) -> impl Future<Output = Result<i16, GattError>> + Send;

    /// Look up a discovered characteristic. `None` when absent.
    fn characteristic(&self, service: Uuid, characteristic: Uuid) -> Option<CharacteristicHandle>;

    /// # Errors
    ///
    /// [`GattError::ReadFailed`] when the read is rejected or times out.
    fn read(
        &self,
        handle: &CharacteristicHandle,
    ) -> impl Future<Output = Result<Vec<u8>, GattError>> + Send;

    /// # Errors
    ///
    /// [`GattError::WriteFailed`] when the write is rejected or times out.
    fn write(
        &self,
        handle: &CharacteristicHandle,
        value: &[u8],
        mode: WriteMode,
    ) -> impl Future<Output = Result<(), GattError>> + Send;

    /// Enable notifications (or indications) on a characteristic.
    ///
    /// # Errors
    ///
    /// Returns an error when the CCCD write fails.
    fn subscribe(
        &self,
        handle: &CharacteristicHandle,
    ) -> impl Future<Output = Result<(), GattError>> + Send;

    /// Stream of notifications for every subscribed characteristic.
    ///
    /// Open it *before* subscribing so that no early value is lost.
    ///
    /// # Errors
    ///
    /// Returns an error when the stack cannot provide the stream.
    fn notifications(&self) -> impl Future<Output = Result<NotificationStream, GattError>> + Send;
}
