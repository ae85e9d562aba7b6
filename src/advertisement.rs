//! Discovery-time metadata of a BLE device.

use bluest::{AdvertisingDevice, Uuid};
use std::collections::{BTreeMap, BTreeSet};

/// What a device told us about itself while advertising.
///
/// Built once per discovery event and not mutated afterwards; the `with_*`
/// methods consume the record while it is being assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisementRecord {
    local_name: Option<Vec<u8>>,
    service_uuids: BTreeSet<Uuid>,
    manufacturer_data: BTreeMap<u16, Vec<u8>>,
    rssi: Option<i16>,
    tx_power: Option<i16>,
    connectable: bool,
}

impl AdvertisementRecord {
    pub fn new() -> Self {
        Self {
            local_name: None,
            service_uuids: BTreeSet::new(),
            manufacturer_data: BTreeMap::new(),
            rssi: None,
            tx_power: None,
            connectable: true,
        }
    }

    /// Names are kept as raw bytes, some devices append `\r\n` or other
    /// control characters.
    pub fn with_local_name(mut self, name: impl AsRef<[u8]>) -> Self {
        self.local_name = Some(name.as_ref().to_vec());
        self
    }

    pub fn with_service(mut self, uuid: Uuid) -> Self {
        self.service_uuids.insert(uuid);
        self
    }

    pub fn with_manufacturer_data(mut self, company_id: u16, data: impl AsRef<[u8]>) -> Self {
        self.manufacturer_data.insert(company_id, data.as_ref().to_vec());
        self
    }

    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }

    pub fn with_tx_power(mut self, tx_power: i16) -> Self {
        self.tx_power = Some(tx_power);
        self
    }

    pub fn with_connectable(mut self, connectable: bool) -> Self {
        self.connectable = connectable;
        self
    }

    pub fn local_name(&self) -> Option<&[u8]> {
        self.local_name.as_deref()
    }

    /// Local name for display, with control characters removed.
    pub fn display_name(&self) -> String {
        self.local_name
            .as_deref()
            .map(|raw| String::from_utf8_lossy(raw).chars().filter(|c| !c.is_control()).collect())
            .unwrap_or_default()
    }

    pub fn service_uuids(&self) -> &BTreeSet<Uuid> {
        &self.service_uuids
    }

    pub fn manufacturer_data(&self) -> &BTreeMap<u16, Vec<u8>> {
        &self.manufacturer_data
    }

    pub fn rssi(&self) -> Option<i16> {
        self.rssi
    }

    pub fn tx_power(&self) -> Option<i16> {
        self.tx_power
    }

    pub fn is_connectable(&self) -> bool {
        self.connectable
    }
}

impl Default for AdvertisementRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&AdvertisingDevice> for AdvertisementRecord {
    fn from(device: &AdvertisingDevice) -> Self {
        let adv = &device.adv_data;
        let mut record = AdvertisementRecord::new().with_connectable(adv.is_connectable);
        if let Some(name) = &adv.local_name {
            record = record.with_local_name(name);
        }
        for uuid in adv.services.iter() {
            record = record.with_service(*uuid);
        }
        if let Some(md) = &adv.manufacturer_data {
            record = record.with_manufacturer_data(md.company_id, &md.data[..]);
        }
        if let Some(rssi) = device.rssi {
            record = record.with_rssi(rssi);
        }
        if let Some(tx_power) = adv.tx_power_level {
            record = record.with_tx_power(tx_power);
        }
        record
    }
}
