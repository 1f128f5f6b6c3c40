//! Peripheral session — one connected peripheral from setup to link loss.
//!
//! A session is created for every `Connected` event and dropped (or
//! aborted) when the link goes away. It owns the per-connection
//! single-shot flags, so a reconnect always starts from a clean slate.
//!
//! ## Setup sequence
//!
//! 1. Request a larger MTU and high connection priority, read RSSI and the
//!    device information strings. Failures are logged and ignored.
//! 2. Read the battery level once and dispatch it.
//! 3. Open the notification stream, then subscribe to every profile in
//!    [`ProfileKind::ALL`] that the peripheral exposes.
//! 4. Glucose meters: ask the record access control point for all stored
//!    records.
//! 5. Set the device clock (Current Time, or the Contour vendor clock).
//!
//! After setup the session decodes notifications in arrival order until
//! the stream ends.

use std::fmt::Write as _;
use std::sync::Arc;

use tokio_stream::StreamExt as _;

use wearsync_domain::device_info::{self, DEVICE_INFORMATION_SERVICE, MANUFACTURER_NAME, MODEL_NUMBER};
use wearsync_domain::measurement::{CurrentTime, Measurement};
use wearsync_domain::observation::Observation;
use wearsync_domain::profile::{
    GLUCOSE_RECORD_ACCESS_CONTROL_POINT, GLUCOSE_SERVICE, ProfileKind, REPORT_ALL_STORED_RECORDS,
};
use wearsync_domain::time::{self, DeviceTime};
use wearsync_domain::vendor::contour;

use crate::clock_sync;
use crate::dispatcher::ObservationDispatcher;
use crate::ports::{
    CharacteristicHandle, ConnectionPriority, GattPeripheral, Notification, NotificationStream,
    WriteMode,
};

/// MTU requested on connect.
pub const DEFAULT_MTU: u16 = 185;

/// Per-session tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub mtu: u16,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { mtu: DEFAULT_MTU }
    }
}

/// State of one live connection.
#[allow(clippy::struct_excessive_bools)]
pub struct PeripheralSession<P> {
    peripheral: P,
    address: String,
    name: Option<String>,
    dispatcher: Arc<ObservationDispatcher>,
    options: SessionOptions,
    observed: Vec<ProfileKind>,
    glucose_records_requested: bool,
    clock_written: bool,
    device_clock_checked: bool,
    contour_clock_written: bool,
}

impl<P: GattPeripheral> PeripheralSession<P> {
    #[must_use]
    pub fn new(peripheral: P, dispatcher: Arc<ObservationDispatcher>, options: SessionOptions) -> Self {
        let address = peripheral.address();
        Self {
            peripheral,
            address,
            name: None,
            dispatcher,
            options,
            observed: Vec::new(),
            glucose_records_requested: false,
            clock_written: false,
            device_clock_checked: false,
            contour_clock_written: false,
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Profiles successfully subscribed to, in subscription order.
    #[must_use]
    pub fn observed(&self) -> &[ProfileKind] {
        &self.observed
    }

    /// Run setup, then process notifications until the link drops.
    pub async fn run(mut self) {
        let Some(notifications) = self.start().await else {
            return;
        };
        self.process(notifications).await;
        tracing::info!(address = %self.address, "notification stream ended");
    }

    /// Perform the setup sequence and return the opened notification
    /// stream. `None` when the stream cannot be opened, in which case the
    /// session has nothing left to do.
    pub async fn start(&mut self) -> Option<NotificationStream> {
        self.name = self.peripheral.name().await;
        tracing::info!(address = %self.address, name = ?self.name, "session started");

        self.configure_link().await;
        self.read_device_information().await;
        self.read_battery().await;

        let notifications = match self.peripheral.notifications().await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(%err, address = %self.address, "cannot open notification stream");
                return None;
            }
        };

        self.subscribe_profiles().await;
        if self.observed.contains(&ProfileKind::Glucose) {
            self.request_glucose_records().await;
        }
        self.write_current_time().await;
        self.write_contour_clock().await;

        Some(notifications)
    }

    /// Handle notifications sequentially until the stream ends.
    pub async fn process(&mut self, mut notifications: NotificationStream) {
        while let Some(notification) = notifications.next().await {
            self.handle_notification(notification).await;
        }
    }

    /// Ask a glucose meter to stream all stored records.
    ///
    /// Issued at most once per session, and only when the record access
    /// control point exists. Returns `true` when the request was written.
    pub async fn request_glucose_records(&mut self) -> bool {
        if self.glucose_records_requested {
            return false;
        }
        let Some(racp) = self
            .peripheral
            .characteristic(GLUCOSE_SERVICE, GLUCOSE_RECORD_ACCESS_CONTROL_POINT)
        else {
            tracing::debug!(address = %self.address, "no record access control point");
            return false;
        };
        self.glucose_records_requested = true;

        if let Err(err) = self.peripheral.subscribe(&racp).await {
            tracing::warn!(%err, address = %self.address, "failed to subscribe to record access control point");
            return false;
        }
        match self
            .peripheral
            .write(&racp, &REPORT_ALL_STORED_RECORDS, WriteMode::WithResponse)
            .await
        {
            Ok(()) => {
                tracing::info!(address = %self.address, "requested stored glucose records");
                true
            }
            Err(err) => {
                tracing::warn!(%err, address = %self.address, "failed to request glucose records");
                false
            }
        }
    }

    /// Decode and dispatch one notification.
    pub async fn handle_notification(&mut self, notification: Notification) {
        let Notification {
            characteristic,
            value,
        } = notification;

        if characteristic == GLUCOSE_RECORD_ACCESS_CONTROL_POINT {
            tracing::debug!(address = %self.address, response = %hex(&value), "record access response");
            return;
        }
        let Some(kind) = ProfileKind::from_characteristic(characteristic) else {
            tracing::trace!(address = %self.address, %characteristic, "ignoring unknown characteristic");
            return;
        };
        tracing::trace!(address = %self.address, %kind, bytes = %hex(&value), "notification");

        let measurement = match kind.decode(&value) {
            Ok(measurement) => measurement,
            Err(err) => {
                tracing::warn!(%err, address = %self.address, bytes = %hex(&value), "dropping malformed payload");
                return;
            }
        };

        if let Measurement::CurrentTime(current) = &measurement {
            self.check_device_clock(current.time).await;
        }
        self.dispatch(measurement);
    }

    // ── Setup steps ─────────────────────────────────────────────

    async fn configure_link(&self) {
        match self.peripheral.request_mtu(self.options.mtu).await {
            Ok(mtu) => tracing::info!(address = %self.address, mtu, "MTU negotiated"),
            Err(err) => tracing::warn!(%err, address = %self.address, "MTU request failed"),
        }
        if let Err(err) = self
            .peripheral
            .request_connection_priority(ConnectionPriority::High)
            .await
        {
            tracing::warn!(%err, address = %self.address, "connection priority request failed");
        }
        match self.peripheral.read_rssi().await {
            Ok(rssi) => tracing::info!(address = %self.address, rssi, "signal strength"),
            Err(err) => tracing::warn!(%err, address = %self.address, "RSSI unavailable"),
        }
    }

    async fn read_device_information(&self) {
        for (uuid, field) in [(MANUFACTURER_NAME, "manufacturer"), (MODEL_NUMBER, "model")] {
            let Some(handle) = self.peripheral.characteristic(DEVICE_INFORMATION_SERVICE, uuid) else {
                tracing::debug!(address = %self.address, field, "device information not exposed");
                continue;
            };
            match self.peripheral.read(&handle).await {
                Ok(value) => tracing::info!(
                    address = %self.address,
                    field,
                    value = %device_info::decode_string(&value),
                    "device information"
                ),
                Err(err) => tracing::warn!(%err, address = %self.address, field, "device information read failed"),
            }
        }
    }

    async fn read_battery(&self) {
        let Some(handle) = self.lookup(ProfileKind::Battery) else {
            return;
        };
        let value = match self.peripheral.read(&handle).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, address = %self.address, "battery read failed");
                return;
            }
        };
        match ProfileKind::Battery.decode(&value) {
            Ok(measurement) => self.dispatch(measurement),
            Err(err) => tracing::warn!(%err, address = %self.address, "dropping malformed battery read"),
        }
    }

    async fn subscribe_profiles(&mut self) {
        for kind in ProfileKind::ALL {
            let Some(handle) = self.lookup(kind) else {
                tracing::debug!(address = %self.address, %kind, "characteristic not present, skipping");
                continue;
            };
            match self.peripheral.subscribe(&handle).await {
                Ok(()) => {
                    tracing::debug!(address = %self.address, %kind, "subscribed");
                    self.observed.push(kind);
                }
                Err(err) => tracing::warn!(%err, address = %self.address, %kind, "subscribe failed"),
            }
        }
        tracing::info!(address = %self.address, profiles = ?self.observed, "observing profiles");
    }

    async fn write_current_time(&mut self) {
        if self.clock_written {
            return;
        }
        if clock_sync::is_omron(self.name.as_deref()) {
            tracing::debug!(address = %self.address, "Omron device, clock checked on first notification");
            return;
        }
        let Some(handle) = self.lookup(ProfileKind::CurrentTime) else {
            return;
        };
        if !handle.is_writable() {
            tracing::debug!(address = %self.address, "current time is read-only");
            return;
        }
        self.set_device_clock(&handle).await;
    }

    async fn write_contour_clock(&mut self) {
        if self.contour_clock_written {
            return;
        }
        let Some(handle) = self
            .peripheral
            .characteristic(contour::CLOCK_SERVICE, contour::CLOCK_CHARACTERISTIC)
        else {
            return;
        };
        self.contour_clock_written = true;

        let payload = contour::clock_payload(time::now(), clock_sync::host_utc_offset_minutes());
        match self
            .peripheral
            .write(&handle, &payload, WriteMode::WithResponse)
            .await
        {
            Ok(()) => tracing::info!(address = %self.address, "Contour clock set"),
            Err(err) => tracing::warn!(%err, address = %self.address, "failed to set Contour clock"),
        }
    }

    // ── Helpers ─────────────────────────────────────────────────

    /// Omron devices only: correct the clock once, on the first Current
    /// Time notification, if it has drifted too far.
    async fn check_device_clock(&mut self, device_time: DeviceTime) {
        if self.device_clock_checked || !clock_sync::is_omron(self.name.as_deref()) {
            return;
        }
        self.device_clock_checked = true;

        let host = clock_sync::host_wall_clock();
        if !clock_sync::needs_correction(device_time, host) {
            tracing::debug!(address = %self.address, "device clock within tolerance");
            return;
        }
        let Some(handle) = self.lookup(ProfileKind::CurrentTime) else {
            return;
        };
        if !handle.is_writable() {
            tracing::debug!(address = %self.address, "current time is read-only, not correcting");
            return;
        }
        tracing::info!(
            address = %self.address,
            drift_secs = time::drift(device_time, host).num_seconds(),
            "device clock drifted, correcting"
        );
        self.set_device_clock(&handle).await;
    }

    async fn set_device_clock(&mut self, handle: &CharacteristicHandle) {
        self.clock_written = true;
        let payload = CurrentTime::encode(clock_sync::host_wall_clock());
        match self
            .peripheral
            .write(handle, &payload, handle.preferred_write_mode())
            .await
        {
            Ok(()) => tracing::info!(address = %self.address, "device clock set"),
            Err(err) => tracing::warn!(%err, address = %self.address, "failed to set device clock"),
        }
    }

    fn lookup(&self, kind: ProfileKind) -> Option<CharacteristicHandle> {
        let descriptor = kind.descriptor();
        self.peripheral
            .characteristic(descriptor.service, descriptor.characteristic)
    }

    fn dispatch(&self, measurement: Measurement) {
        let kind = measurement.kind();
        let observation = Observation::new(self.address.clone(), time::now(), measurement);
        let delivered = self.dispatcher.dispatch(&observation);
        tracing::debug!(address = %self.address, %kind, delivered, "observation dispatched");
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            let _ = write!(out, "{byte:02X}");
            out
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_bytes_as_upper_hex() {
        assert_eq!(hex(&[0x06, 0x00, 0x01, 0xAB]), "060001AB");
        assert_eq!(hex(&[]), "");
    }

    #[test]
    fn should_default_to_185_byte_mtu() {
        assert_eq!(SessionOptions::default().mtu, 185);
    }
}
