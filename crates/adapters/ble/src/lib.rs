//! # wearsync-adapter-ble
//!
//! BLE adapter: implements the central and GATT ports from
//! `wearsync-app` with [btleplug](https://docs.rs/btleplug).
//!
//! ## What the host stack does not offer
//!
//! | Port operation | Behaviour here |
//! |----------------|----------------|
//! | `request_mtu` | `GattError::Unsupported` (the OS negotiates MTU itself) |
//! | `request_connection_priority` | `GattError::Unsupported` |
//! | `auto_connect` | a direct connect with the configured timeout |
//! | `read_rssi` | last RSSI seen in advertisements |
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `wearsync-app` and `wearsync-domain`.

mod config;
mod error;
mod gateway;
mod peripheral;

pub use config::BleConfig;
pub use error::BleError;
pub use gateway::BtleplugGateway;
pub use peripheral::BtleplugPeripheral;
