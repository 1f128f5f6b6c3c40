//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the session layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod central;
pub mod gatt;
pub mod sink;

pub use central::{
    ConnectionEvent, ConnectionEventStream, ConnectionState, DeviceTarget, ScanGateway,
};
pub use gatt::{
    CharacteristicHandle, CharacteristicProperties, ConnectionPriority, GattPeripheral,
    Notification, NotificationStream, WriteMode,
};
pub use sink::MeasurementSink;
