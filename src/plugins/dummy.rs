//! Reference decoder for a minimal BMS protocol.
//!
//! Frames are ten bytes: a `7E A1` start marker, little-endian voltage (V/100),
//! current (A/10, negative while discharging) and temperature (°C/10), an
//! additive checksum over those six bytes and a `55` end marker.

use crate::assembler::Frame;
use crate::decoder::{uuid16, CurrentPolarity, Decoder, DecoderDescriptor, FrameBoundary, Matcher};
use crate::error::{BmsError, Result};
use crate::sample::{RawSample, SampleKey};

const START: [u8; 2] = [0x7e, 0xa1];
const END: u8 = 0x55;
const FRAME_LEN: usize = 10;
const REQUEST: [u8; 4] = [0x7e, 0xa1, 0x01, 0x55];

pub struct DummyBms {
    descriptor: DecoderDescriptor,
}

impl DummyBms {
    pub fn new() -> Self {
        Self {
            descriptor: DecoderDescriptor {
                name: "dummy",
                manufacturer: "Dummy Manufacturer",
                model: "dummy model",
                matchers: vec![Matcher::local_name("dummy").and_connectable(true)],
                services: vec![uuid16(0xffe0)],
                rx_characteristic: uuid16(0xffe1),
                tx_characteristic: uuid16(0xffe1),
                derived_keys: [SampleKey::Power, SampleKey::BatteryCharging].into_iter().collect(),
                polarity: CurrentPolarity::ChargePositive,
                request_timeout: None,
            },
        }
    }

    fn checksum(data: &[u8]) -> u8 {
        data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
    }
}

impl Default for DummyBms {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for DummyBms {
    fn descriptor(&self) -> &DecoderDescriptor {
        &self.descriptor
    }

    fn poll_commands(&self) -> Vec<Vec<u8>> {
        vec![REQUEST.to_vec()]
    }

    fn frame_boundary(&self, fragment: &[u8], in_progress: &[u8]) -> FrameBoundary {
        let ends = fragment.last() == Some(&END);
        if fragment.starts_with(&START) {
            if ends && fragment.len() >= FRAME_LEN {
                return FrameBoundary::Complete;
            }
            return FrameBoundary::Start;
        }
        if ends && in_progress.len() + fragment.len() >= FRAME_LEN {
            FrameBoundary::End
        } else {
            FrameBoundary::Continuation
        }
    }

    fn decode(&self, frame: &Frame) -> Result<RawSample> {
        let data = frame.bytes();
        if data.len() != FRAME_LEN {
            return Err(BmsError::malformed(format!(
                "frame has {} bytes, expected {FRAME_LEN}",
                data.len()
            )));
        }
        if Self::checksum(&data[2..8]) != data[8] {
            return Err(BmsError::malformed("checksum mismatch"));
        }

        let voltage = u16::from_le_bytes([data[2], data[3]]);
        let current = i16::from_le_bytes([data[4], data[5]]);
        let temperature = i16::from_le_bytes([data[6], data[7]]);
        Ok(RawSample::new()
            .with(SampleKey::Voltage, f64::from(voltage) / 100.0)
            .with(SampleKey::Current, f64::from(current) / 10.0)
            .with(SampleKey::Temperature, f64::from(temperature) / 10.0))
    }
}
