//! # wearsync-domain
//!
//! Pure domain model for wearsync, the BLE health-peripheral bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Read GATT payloads with a bounds-checked [`cursor::ByteCursor`]
//! - Interpret IEEE-11073 `SFLOAT`/`FLOAT` numbers ([`ieee11073`])
//! - Define **Measurements** and their decoders, one per characteristic
//! - Define the **Profile registry** mapping characteristics to decoders
//! - Define **Observations** (a measurement plus source and receive time)
//! - Build vendor command payloads ([`vendor`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod cursor;
pub mod device_info;
pub mod ieee11073;
pub mod measurement;
pub mod observation;
pub mod profile;
pub mod vendor;
