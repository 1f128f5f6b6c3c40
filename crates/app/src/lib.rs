//! # wearsync-app
//!
//! Application layer — **port definitions** (traits) and the orchestration
//! that keeps decoders attached to live peripherals.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `ScanGateway` — scan, connect, auto-connect, link state events
//!   - `GattPeripheral` — characteristic lookup, read, write, subscribe
//!   - `MeasurementSink` — consumers of decoded observations
//! - Fan observations out to subscribers (`ObservationDispatcher`)
//! - Drive one connected peripheral through setup and notification
//!   handling (`PeripheralSession`)
//! - Re-attach after link loss (`reconnect`, `ConnectionManager`)
//!
//! ## Dependency rule
//! Depends on `wearsync-domain` only (plus `tokio` for tasks, timers and
//! channels). Never imports adapter crates. Adapters depend on *this*
//! crate, not the reverse.

pub mod clock_sync;
pub mod connection_manager;
pub mod dispatcher;
pub mod error;
pub mod ports;
pub mod reconnect;
pub mod session;
