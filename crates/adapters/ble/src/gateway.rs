//! [`ScanGateway`] on top of a btleplug adapter.
//!
//! btleplug has no platform auto-connect, so `auto_connect` is a plain
//! connect with the configured timeout. Link state changes come from the
//! adapter's central event stream; a `Connected` event is only forwarded
//! once service discovery has finished.

use std::time::Duration;

use btleplug::api::{
    Central as _, CentralEvent, Manager as _, Peripheral as _, PeripheralProperties, ScanFilter,
};
use btleplug::platform::{Adapter, Manager};
use tokio::sync::mpsc;
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::UnboundedReceiverStream;

use wearsync_app::error::GattError;
use wearsync_app::ports::{
    ConnectionEvent, ConnectionEventStream, ConnectionState, DeviceTarget, GattPeripheral,
    ScanGateway,
};

use crate::config::BleConfig;
use crate::error::BleError;
use crate::peripheral::BtleplugPeripheral;

/// How often the list of seen peripherals is checked while scanning.
const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct BtleplugGateway {
    adapter: Adapter,
    config: BleConfig,
}

impl BtleplugGateway {
    /// Open the host adapter selected by `config.adapter_index`.
    ///
    /// # Errors
    ///
    /// [`BleError::NotAvailable`] when the host has no such adapter, or
    /// [`BleError::Btle`] when the BLE stack cannot be reached.
    pub async fn new(config: BleConfig) -> Result<Self, BleError> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .nth(config.adapter_index)
            .ok_or(BleError::NotAvailable)?;

        match adapter.adapter_info().await {
            Ok(info) => tracing::info!(adapter = %info, "BLE adapter ready"),
            Err(err) => tracing::debug!(%err, "adapter info unavailable"),
        }
        Ok(Self { adapter, config })
    }

    /// Poll the peripherals seen so far until one matches.
    async fn find(&self, target: &DeviceTarget) -> Result<BtleplugPeripheral, BleError> {
        loop {
            for peripheral in self.adapter.peripherals().await? {
                let properties = peripheral.properties().await;
                let candidate = BtleplugPeripheral::new(peripheral);
                if is_match(target, &candidate.address(), properties) {
                    return Ok(candidate);
                }
            }
            tokio::time::sleep(SCAN_POLL_INTERVAL).await;
        }
    }

    async fn connect_with_timeout(&self, peripheral: &BtleplugPeripheral) -> Result<(), GattError> {
        let address = peripheral.address();
        match tokio::time::timeout(self.config.connect_timeout(), peripheral.inner().connect()).await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(GattError::ConnectionFailed {
                address,
                source: Box::new(err),
            }),
            Err(_) => Err(BleError::ConnectTimeout { address }.into()),
        }
    }
}

/// Whether a seen peripheral is the target. A peripheral whose properties
/// cannot be read is skipped, the scan goes on.
fn is_match(
    target: &DeviceTarget,
    address: &str,
    properties: Result<Option<PeripheralProperties>, btleplug::Error>,
) -> bool {
    match properties {
        Ok(Some(properties)) => {
            tracing::trace!(%address, name = ?properties.local_name, rssi = ?properties.rssi, "peripheral seen");
            target.matches(address, properties.local_name.as_deref())
        }
        Ok(None) => false,
        Err(err) => {
            tracing::warn!(%err, %address, "failed to read peripheral properties, skipping");
            false
        }
    }
}

impl ScanGateway for BtleplugGateway {
    type Peripheral = BtleplugPeripheral;

    async fn scan_for(&self, target: &DeviceTarget) -> Result<BtleplugPeripheral, GattError> {
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(BleError::from)?;

        let found = match self.config.scan_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.find(target))
                .await
                .unwrap_or_else(|_| {
                    Err(BleError::ScanTimeout {
                        secs: self.config.scan_timeout_secs,
                    })
                }),
            None => self.find(target).await,
        };

        if let Err(err) = self.stop_scan().await {
            tracing::warn!(%err, "failed to stop scan");
        }
        found.map_err(Into::into)
    }

    async fn stop_scan(&self) -> Result<(), GattError> {
        self.adapter
            .stop_scan()
            .await
            .map_err(|err| BleError::from(err).into())
    }

    async fn connect(&self, peripheral: &BtleplugPeripheral) -> Result<(), GattError> {
        self.connect_with_timeout(peripheral).await
    }

    async fn auto_connect(&self, peripheral: &BtleplugPeripheral) -> Result<(), GattError> {
        self.connect_with_timeout(peripheral).await
    }

    async fn connection_state(&self, peripheral: &BtleplugPeripheral) -> ConnectionState {
        match peripheral.inner().is_connected().await {
            Ok(true) => ConnectionState::Connected,
            Ok(false) => ConnectionState::Disconnected,
            Err(err) => {
                tracing::debug!(%err, address = %peripheral.address(), "link state unknown, assuming disconnected");
                ConnectionState::Disconnected
            }
        }
    }

    async fn connection_events(
        &self,
    ) -> Result<ConnectionEventStream<BtleplugPeripheral>, GattError> {
        let mut events = self.adapter.events().await.map_err(BleError::from)?;
        let adapter = self.adapter.clone();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let Some(event) = translate(&adapter, event).await else {
                    continue;
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
            tracing::debug!("central event forwarding stopped");
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

/// Map a central event to a link state change. Connected peripherals
/// have their services discovered first; if that fails the link is
/// dropped so the disconnect path takes over.
async fn translate(
    adapter: &Adapter,
    event: CentralEvent,
) -> Option<ConnectionEvent<BtleplugPeripheral>> {
    let (id, state) = match event {
        CentralEvent::DeviceConnected(id) => (id, ConnectionState::Connected),
        CentralEvent::DeviceDisconnected(id) => (id, ConnectionState::Disconnected),
        _ => return None,
    };

    let peripheral = match adapter.peripheral(&id).await {
        Ok(peripheral) => peripheral,
        Err(err) => {
            tracing::warn!(%err, %state, "event for unknown peripheral");
            return None;
        }
    };

    if state == ConnectionState::Connected {
        if let Err(err) = peripheral.discover_services().await {
            tracing::warn!(%err, "service discovery failed, disconnecting");
            if let Err(err) = peripheral.disconnect().await {
                tracing::debug!(%err, "disconnect after failed discovery");
            }
            return None;
        }
    }

    Some(ConnectionEvent {
        peripheral: BtleplugPeripheral::new(peripheral),
        state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "C0:26:DA:01:02:03";

    fn named(name: &str) -> PeripheralProperties {
        PeripheralProperties {
            local_name: Some(name.to_owned()),
            ..PeripheralProperties::default()
        }
    }

    #[test]
    fn should_match_advertised_name() {
        let target = DeviceTarget::by_name("BLEsmart_");
        assert!(is_match(&target, ADDRESS, Ok(Some(named("BLEsmart_0000011F")))));
        assert!(!is_match(&target, ADDRESS, Ok(Some(named("Polar H10")))));
    }

    #[test]
    fn should_skip_peripheral_without_properties() {
        let target = DeviceTarget::by_address(ADDRESS);
        assert!(!is_match(&target, ADDRESS, Ok(None)));
    }

    #[test]
    fn should_skip_peripheral_whose_properties_fail() {
        let target = DeviceTarget::by_address(ADDRESS);
        assert!(!is_match(&target, ADDRESS, Err(btleplug::Error::DeviceNotFound)));
    }
}
