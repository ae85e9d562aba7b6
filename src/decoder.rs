//! The contract every vendor decoder implements.
//!
//! A decoder owns everything vendor specific: how to recognise the device from
//! its advertisement, which GATT characteristics to talk to, where its frames
//! start and end and how to turn a frame into measurements. The core never
//! looks inside a frame.

use crate::advertisement::AdvertisementRecord;
use crate::assembler::Frame;
use crate::error::Result;
use crate::sample::{RawSample, SampleKey};
use bluest::Uuid;
use std::collections::BTreeSet;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern {
    Exact(Vec<u8>),
    Prefix(Vec<u8>),
}

impl NamePattern {
    pub fn matches(&self, name: &[u8]) -> bool {
        match self {
            NamePattern::Exact(expected) => name == expected.as_slice(),
            NamePattern::Prefix(prefix) => name.starts_with(prefix),
        }
    }
}

/// One advertisement predicate. Every field that is set must hold.
///
/// A decoder lists several matchers; the decoder matches when any of them does.
/// A matcher with no field set never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matcher {
    pub local_name: Option<NamePattern>,
    pub service_uuid: Option<Uuid>,
    pub manufacturer_id: Option<u16>,
    pub manufacturer_data_start: Option<Vec<u8>>,
    pub connectable: Option<bool>,
}

impl Matcher {
    pub fn local_name(name: &str) -> Self {
        Self { local_name: Some(NamePattern::Exact(name.as_bytes().to_vec())), ..Self::default() }
    }

    pub fn local_name_prefix(prefix: &str) -> Self {
        Self {
            local_name: Some(NamePattern::Prefix(prefix.as_bytes().to_vec())),
            ..Self::default()
        }
    }

    pub fn service(uuid: Uuid) -> Self {
        Self { service_uuid: Some(uuid), ..Self::default() }
    }

    pub fn manufacturer_id(company_id: u16) -> Self {
        Self { manufacturer_id: Some(company_id), ..Self::default() }
    }

    pub fn and_service(mut self, uuid: Uuid) -> Self {
        self.service_uuid = Some(uuid);
        self
    }

    pub fn and_manufacturer_id(mut self, company_id: u16) -> Self {
        self.manufacturer_id = Some(company_id);
        self
    }

    pub fn and_manufacturer_data_start(mut self, start: &[u8]) -> Self {
        self.manufacturer_data_start = Some(start.to_vec());
        self
    }

    pub fn and_connectable(mut self, connectable: bool) -> Self {
        self.connectable = Some(connectable);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.local_name.is_none()
            && self.service_uuid.is_none()
            && self.manufacturer_id.is_none()
            && self.manufacturer_data_start.is_none()
            && self.connectable.is_none()
    }

    pub fn matches(&self, record: &AdvertisementRecord) -> bool {
        if self.is_empty() {
            return false;
        }
        if let Some(pattern) = &self.local_name {
            match record.local_name() {
                Some(name) if pattern.matches(name) => {}
                _ => return false,
            }
        }
        if let Some(uuid) = &self.service_uuid {
            if !record.service_uuids().contains(uuid) {
                return false;
            }
        }
        if let Some(company_id) = self.manufacturer_id {
            if !record.manufacturer_data().contains_key(&company_id) {
                return false;
            }
        }
        if let Some(start) = &self.manufacturer_data_start {
            let mut payloads = record
                .manufacturer_data()
                .iter()
                .filter(|(id, _)| self.manufacturer_id.map_or(true, |wanted| **id == wanted))
                .map(|(_, data)| data);
            if !payloads.any(|data| data.starts_with(start)) {
                return false;
            }
        }
        if let Some(connectable) = self.connectable {
            if record.is_connectable() != connectable {
                return false;
            }
        }
        true
    }
}

/// How a notification fragment relates to the frame being assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBoundary {
    /// Begins a new frame; any partial frame is dropped.
    Start,
    /// Belongs to the frame in progress.
    Continuation,
    /// Closes the frame in progress.
    End,
    /// A whole frame in a single fragment.
    Complete,
}

/// Which sign of the current means the battery is charging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentPolarity {
    ChargePositive,
    ChargeNegative,
}

impl CurrentPolarity {
    pub fn is_charging(self, current: f64) -> bool {
        match self {
            CurrentPolarity::ChargePositive => current > 0.0,
            CurrentPolarity::ChargeNegative => current < 0.0,
        }
    }
}

/// Static facts about a vendor decoder.
#[derive(Debug, Clone)]
pub struct DecoderDescriptor {
    /// Unique registry name
    pub name: &'static str,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub matchers: Vec<Matcher>,
    /// Services that must be present once connected
    pub services: Vec<Uuid>,
    /// Characteristic notifications arrive on
    pub rx_characteristic: Uuid,
    /// Characteristic commands are written to
    pub tx_characteristic: Uuid,
    pub derived_keys: BTreeSet<SampleKey>,
    pub polarity: CurrentPolarity,
    /// Overrides the configured response deadline
    pub request_timeout: Option<Duration>,
}

pub trait Decoder: Send + Sync + 'static {
    fn descriptor(&self) -> &DecoderDescriptor;

    /// Commands sent, in order, for one update cycle.
    fn poll_commands(&self) -> Vec<Vec<u8>>;

    /// Classify `fragment` given the bytes already collected for the current
    /// frame (empty when no frame is in progress).
    fn frame_boundary(&self, fragment: &[u8], in_progress: &[u8]) -> FrameBoundary;

    /// Turn a complete frame into measurements. Fails with
    /// [`BmsError::MalformedFrame`](crate::BmsError::MalformedFrame) when the
    /// length or checksum does not fit the vendor layout.
    fn decode(&self, frame: &Frame) -> Result<RawSample>;

    /// Whether notifications from `characteristic` carry frame data.
    fn accepts_characteristic(&self, _characteristic: Uuid) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        self.descriptor().name
    }

    fn matchers(&self) -> &[Matcher] {
        &self.descriptor().matchers
    }

    fn service_uuids(&self) -> &[Uuid] {
        &self.descriptor().services
    }

    fn rx_characteristic(&self) -> Uuid {
        self.descriptor().rx_characteristic
    }

    fn tx_characteristic(&self) -> Uuid {
        self.descriptor().tx_characteristic
    }

    fn derived_keys(&self) -> &BTreeSet<SampleKey> {
        &self.descriptor().derived_keys
    }

    fn matches(&self, record: &AdvertisementRecord) -> bool {
        self.matchers().iter().any(|m| m.matches(record))
    }
}

/// Build a 128-bit UUID from a 16-bit Bluetooth SIG short id.
pub const fn uuid16(short: u16) -> Uuid {
    Uuid::from_u128(((short as u128) << 96) | 0x0000_0000_0000_1000_8000_0080_5f9b_34fb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_uuid_expansion() {
        assert_eq!(uuid16(0xffe0).to_string(), "0000ffe0-0000-1000-8000-00805f9b34fb");
    }

    #[test]
    fn fields_are_anded() {
        let matcher = Matcher::local_name_prefix("DP04S").and_service(uuid16(0xff00));
        let named = AdvertisementRecord::new().with_local_name("DP04S007L4S100A");
        assert!(!matcher.matches(&named));
        assert!(matcher.matches(&named.with_service(uuid16(0xff00))));
    }

    #[test]
    fn exact_name_is_byte_exact() {
        let matcher = Matcher::local_name("BT270-2");
        assert!(matcher.matches(&AdvertisementRecord::new().with_local_name("BT270-2")));
        assert!(!matcher.matches(&AdvertisementRecord::new().with_local_name("BT270-2\r\n")));
        assert!(!matcher.matches(&AdvertisementRecord::new()));
    }

    #[test]
    fn manufacturer_payload_prefix() {
        let matcher = Matcher::manufacturer_id(770).and_manufacturer_data_start(&[0x16, 0x40]);
        let record = AdvertisementRecord::new()
            .with_manufacturer_data(770, [0x16, 0x40, 0x17, 0x12])
            .with_manufacturer_data(260, [0x01]);
        assert!(matcher.matches(&record));
        let other = AdvertisementRecord::new().with_manufacturer_data(770, [0x01, 0x50]);
        assert!(!matcher.matches(&other));
    }

    #[test]
    fn empty_matcher_never_matches() {
        assert!(!Matcher::default().matches(&AdvertisementRecord::new().with_local_name("x")));
    }

    #[test]
    fn connectable_flag() {
        let matcher = Matcher::local_name("dummy").and_connectable(true);
        let record = AdvertisementRecord::new().with_local_name("dummy");
        assert!(matcher.matches(&record));
        assert!(!matcher.matches(&record.with_connectable(false)));
    }

    #[test]
    fn polarity() {
        assert!(CurrentPolarity::ChargePositive.is_charging(2.0));
        assert!(!CurrentPolarity::ChargePositive.is_charging(-1.5));
        assert!(!CurrentPolarity::ChargePositive.is_charging(0.0));
        assert!(CurrentPolarity::ChargeNegative.is_charging(-1.5));
    }
}
