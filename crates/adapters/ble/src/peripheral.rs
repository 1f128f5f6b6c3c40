//! [`GattPeripheral`] on top of a btleplug peripheral.

use btleplug::api::{BDAddr, CharPropFlags, Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use tokio_stream::StreamExt as _;
use uuid::Uuid;

use wearsync_app::error::GattError;
use wearsync_app::ports::{
    CharacteristicHandle, CharacteristicProperties, ConnectionPriority, GattPeripheral,
    Notification, NotificationStream, WriteMode,
};

use crate::error::BleError;

/// A peripheral known to the btleplug central.
///
/// Clones share the underlying platform handle.
#[derive(Clone)]
pub struct BtleplugPeripheral {
    inner: Peripheral,
}

impl BtleplugPeripheral {
    pub(crate) fn new(inner: Peripheral) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &Peripheral {
        &self.inner
    }

    /// Find the btleplug characteristic behind a port handle. Only
    /// valid after service discovery.
    fn resolve(&self, handle: &CharacteristicHandle) -> Result<Characteristic, GattError> {
        self.find(handle.service, handle.uuid)
            .ok_or(GattError::CharacteristicUnavailable {
                service: handle.service,
                characteristic: handle.uuid,
            })
    }

    fn find(&self, service: Uuid, characteristic: Uuid) -> Option<Characteristic> {
        self.inner
            .characteristics()
            .into_iter()
            .find(|c| c.service_uuid == service && c.uuid == characteristic)
    }
}

impl GattPeripheral for BtleplugPeripheral {
    /// On macOS btleplug hides the hardware address and reports zeros, so
    /// the platform identifier is used instead.
    fn address(&self) -> String {
        let address = self.inner.address();
        if address == BDAddr::default() {
            self.inner.id().to_string()
        } else {
            address.to_string()
        }
    }

    async fn name(&self) -> Option<String> {
        match self.inner.properties().await {
            Ok(properties) => properties.and_then(|p| p.local_name),
            Err(err) => {
                tracing::debug!(%err, "failed to read peripheral properties");
                None
            }
        }
    }

    async fn request_mtu(&self, _mtu: u16) -> Result<u16, GattError> {
        Err(GattError::Unsupported("MTU negotiation"))
    }

    async fn request_connection_priority(
        &self,
        _priority: ConnectionPriority,
    ) -> Result<(), GattError> {
        Err(GattError::Unsupported("connection priority"))
    }

    async fn read_rssi(&self) -> Result<i16, GattError> {
        self.inner
            .properties()
            .await
            .map_err(BleError::from)?
            .and_then(|p| p.rssi)
            .ok_or(GattError::Unsupported("RSSI reporting"))
    }

    fn characteristic(&self, service: Uuid, characteristic: Uuid) -> Option<CharacteristicHandle> {
        self.find(service, characteristic).map(|c| CharacteristicHandle {
            service: c.service_uuid,
            uuid: c.uuid,
            properties: properties(c.properties),
        })
    }

    async fn read(&self, handle: &CharacteristicHandle) -> Result<Vec<u8>, GattError> {
        let characteristic = self.resolve(handle)?;
        self.inner
            .read(&characteristic)
            .await
            .map_err(|err| GattError::ReadFailed {
                characteristic: handle.uuid,
                source: Box::new(err),
            })
    }

    async fn write(
        &self,
        handle: &CharacteristicHandle,
        value: &[u8],
        mode: WriteMode,
    ) -> Result<(), GattError> {
        let characteristic = self.resolve(handle)?;
        self.inner
            .write(&characteristic, value, write_type(mode))
            .await
            .map_err(|err| GattError::WriteFailed {
                characteristic: handle.uuid,
                source: Box::new(err),
            })
    }

    async fn subscribe(&self, handle: &CharacteristicHandle) -> Result<(), GattError> {
        let characteristic = self.resolve(handle)?;
        self.inner
            .subscribe(&characteristic)
            .await
            .map_err(|err| BleError::from(err).into())
    }

    async fn notifications(&self) -> Result<NotificationStream, GattError> {
        let stream = self.inner.notifications().await.map_err(BleError::from)?;
        Ok(Box::pin(stream.map(|n| Notification {
            characteristic: n.uuid,
            value: n.value,
        })))
    }
}

pub(crate) fn properties(flags: CharPropFlags) -> CharacteristicProperties {
    CharacteristicProperties {
        read: flags.contains(CharPropFlags::READ),
        write: flags.contains(CharPropFlags::WRITE),
        write_without_response: flags.contains(CharPropFlags::WRITE_WITHOUT_RESPONSE),
        notify: flags.contains(CharPropFlags::NOTIFY),
        indicate: flags.contains(CharPropFlags::INDICATE),
    }
}

fn write_type(mode: WriteMode) -> WriteType {
    match mode {
        WriteMode::WithResponse => WriteType::WithResponse,
        WriteMode::WithoutResponse => WriteType::WithoutResponse,
    }
}
