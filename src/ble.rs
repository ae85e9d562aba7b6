//! Bluetooth Low Energy transport built on `bluest`.
//!
//! Handles everything the protocol core treats as external: scanning,
//! connecting, GATT discovery, writing commands and pumping notifications
//! into a connection's [`NotificationSink`].

use crate::advertisement::AdvertisementRecord;
use crate::connection::NotificationSink;
use crate::decoder::Decoder;
use crate::error::{BmsError, Result};
use crate::registry::DecoderRegistry;
use crate::transport::Transport;
use async_trait::async_trait;
use bluest::{Adapter, AdvertisingDevice, Characteristic, Device, DeviceId, Uuid};
use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

/// Connection attempts before giving up
const CONNECT_ATTEMPTS: usize = 3;

/// The default adapter, once it is powered on.
pub async fn default_adapter() -> Result<Adapter> {
    let adapter = Adapter::default()
        .await
        .ok_or_else(|| BmsError::transport("default adapter not found"))?;
    adapter.wait_available().await?;
    Ok(adapter)
}

/// A device seen during a scan and the decoder it maps to.
pub struct DiscoveredBms {
    pub device: Device,
    pub record: AdvertisementRecord,
    pub decoder: Option<Arc<dyn Decoder>>,
}

/// Scan for `duration` and report each device once, with its decoder.
///
/// Devices matching several decoders are logged and skipped.
pub async fn scan(
    adapter: &Adapter,
    registry: &DecoderRegistry,
    duration: Duration,
) -> Result<Vec<DiscoveredBms>> {
    let deadline = Instant::now() + duration;
    let mut adapter_events = adapter.scan(&[]).await?;
    let mut seen: HashMap<DeviceId, DiscoveredBms> = HashMap::new();

    while let Ok(Some(advertising)) = tokio::time::timeout_at(deadline, adapter_events.next()).await
    {
        let record = AdvertisementRecord::from(&advertising);
        let decoder = match registry.select(&record) {
            Ok(decoder) => decoder,
            Err(err) => {
                warn!(%err, "skipping device");
                continue;
            }
        };
        let id = advertising.device.id();
        if !seen.contains_key(&id) {
            debug!(device = %record.display_name(), rssi = ?record.rssi(), "discovered");
        }
        seen.insert(id, DiscoveredBms { device: advertising.device, record, decoder });
    }

    Ok(seen.into_values().collect())
}

/// Scan until a device advertising `name` shows up.
pub async fn find_device(
    adapter: &Adapter,
    name: &str,
    within: Duration,
) -> Result<AdvertisingDevice> {
    let mut adapter_events = adapter.scan(&[]).await?;
    let search = async {
        while let Some(device) = adapter_events.next().await {
            let record = AdvertisementRecord::from(&device);
            if record.display_name() == name {
                return Some(device);
            }
        }
        None
    };
    timeout(within, search)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| BmsError::transport(format!("device '{name}' not found")))
}

/// The first of `required` that is not among `offered`.
fn missing_service(required: &[Uuid], offered: &[Uuid]) -> Option<Uuid> {
    required.iter().copied().find(|uuid| !offered.contains(uuid))
}

pub struct BleTransport {
    adapter: Adapter,
    device: Device,
    write: Characteristic,
    notify: Characteristic,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl BleTransport {
    /// Connect to `device`, check it offers every service `decoder` requires
    /// and look up the characteristics `decoder` talks to. Those live in the
    /// first required service.
    pub async fn connect(
        adapter: &Adapter,
        device: Device,
        decoder: &dyn Decoder,
    ) -> Result<Self> {
        Self::try_connect(adapter, &device).await?;

        let offered = device.discover_services().await?;
        let offered_ids: Vec<Uuid> = offered.iter().map(|service| service.uuid()).collect();
        if let Some(missing) = missing_service(decoder.service_uuids(), &offered_ids) {
            return Err(BmsError::transport(format!("device does not offer service {missing}")));
        }
        let primary = decoder.service_uuids().first().copied().ok_or_else(|| {
            BmsError::transport(format!("decoder '{}' names no service", decoder.name()))
        })?;
        let service = offered
            .into_iter()
            .find(|service| service.uuid() == primary)
            .ok_or_else(|| {
                BmsError::transport(format!("device does not offer service {primary}"))
            })?;
        let write = Self::characteristic(&service, decoder.tx_characteristic()).await?;
        let notify = Self::characteristic(&service, decoder.rx_characteristic()).await?;

        info!(device = ?device.name(), decoder = decoder.name(), "connected");
        Ok(Self { adapter: adapter.clone(), device, write, notify, reader: Mutex::new(None) })
    }

    async fn characteristic(service: &bluest::Service, uuid: Uuid) -> Result<Characteristic> {
        service
            .discover_characteristics_with_uuid(uuid)
            .await?
            .first()
            .cloned()
            .ok_or_else(|| BmsError::transport(format!("characteristic {uuid} not found")))
    }

    async fn try_connect(adapter: &Adapter, device: &Device) -> Result<()> {
        if device.is_connected().await {
            return Ok(());
        }
        let mut attempt = 1;
        loop {
            match adapter.connect_device(device).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt < CONNECT_ATTEMPTS => {
                    warn!(%err, attempt, "failed to connect");
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[async_trait]
impl Transport for BleTransport {
    async fn write(&self, characteristic: Uuid, data: &[u8]) -> Result<()> {
        if characteristic != self.write.uuid() {
            return Err(BmsError::transport(format!(
                "characteristic {characteristic} is not writable"
            )));
        }
        self.write.write(data).await?;
        Ok(())
    }

    async fn subscribe(&self, sink: NotificationSink) -> Result<()> {
        let notify = self.notify.clone();
        let uuid = notify.uuid();
        let (ready_tx, ready_rx) = oneshot::channel();

        let reader = tokio::spawn(async move {
            let mut stream = match notify.notify().await {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(BmsError::from(err)));
                    return;
                }
            };
            while let Some(notification) = stream.next().await {
                match notification {
                    Ok(data) => sink.deliver(uuid, &data),
                    Err(err) => {
                        warn!(%err, "notification error");
                        break;
                    }
                }
            }
            debug!("end of notification stream");
            sink.disconnected();
        });

        if let Some(previous) =
            self.reader.lock().unwrap_or_else(PoisonError::into_inner).replace(reader)
        {
            previous.abort();
        }

        ready_rx.await.map_err(|_| BmsError::transport("notification task ended"))?
    }

    async fn disconnect(&self) -> Result<()> {
        if let Some(reader) = self.reader.lock().unwrap_or_else(PoisonError::into_inner).take() {
            reader.abort();
        }
        self.adapter.disconnect_device(&self.device).await?;
        Ok(())
    }
}
