#![allow(dead_code)]

pub mod advertisements;

use async_trait::async_trait;
use bluest::Uuid;
use bms_reader::{
    uuid16, BmsError, CurrentPolarity, Decoder, DecoderDescriptor, Frame, FrameBoundary, Matcher,
    NotificationSink, RawSample, Result, SampleKey, Transport,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    sink: Option<NotificationSink>,
    writes: Vec<(Uuid, Vec<u8>)>,
    responses: VecDeque<Vec<Vec<u8>>>,
    fail_writes: bool,
    disconnected: bool,
}

/// In-memory transport. Each write is answered with the next queued list of
/// notification fragments, if any.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, fragments: Vec<Vec<u8>>) {
        self.state.lock().unwrap().responses.push_back(fragments);
    }

    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    pub fn writes(&self) -> Vec<(Uuid, Vec<u8>)> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn sink(&self) -> NotificationSink {
        self.state.lock().unwrap().sink.clone().expect("not subscribed")
    }

    pub fn is_disconnected(&self) -> bool {
        self.state.lock().unwrap().disconnected
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn write(&self, characteristic: Uuid, data: &[u8]) -> Result<()> {
        let (sink, fragments) = {
            let mut state = self.state.lock().unwrap();
            if state.fail_writes {
                return Err(BmsError::transport("write rejected"));
            }
            state.writes.push((characteristic, data.to_vec()));
            (state.sink.clone(), state.responses.pop_front())
        };
        if let (Some(sink), Some(fragments)) = (sink, fragments) {
            for fragment in fragments {
                sink.deliver(characteristic, &fragment);
            }
        }
        Ok(())
    }

    async fn subscribe(&self, sink: NotificationSink) -> Result<()> {
        self.state.lock().unwrap().sink = Some(sink);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.state.lock().unwrap().disconnected = true;
        Ok(())
    }
}

/// Decoder for devices advertising manufacturer id 2917.
///
/// Frames: `AA`, voltage u16 BE (V/100), current i16 BE (A/100), state of
/// charge u8, XOR checksum over those five bytes, `55`.
pub struct FixtureBms {
    descriptor: DecoderDescriptor,
}

impl FixtureBms {
    pub const FRAME_LEN: usize = 8;
    pub const REQUEST: [u8; 3] = [0xaa, 0x01, 0x55];

    pub fn new() -> Self {
        Self {
            descriptor: DecoderDescriptor {
                name: "fixture",
                manufacturer: "Fixture",
                model: "manufacturer 2917",
                matchers: vec![Matcher::manufacturer_id(2917)],
                services: vec![uuid16(0xffe0)],
                rx_characteristic: uuid16(0xffe1),
                tx_characteristic: uuid16(0xffe1),
                derived_keys: [SampleKey::Power, SampleKey::BatteryCharging].into_iter().collect(),
                polarity: CurrentPolarity::ChargePositive,
                request_timeout: None,
            },
        }
    }
}

impl Decoder for FixtureBms {
    fn descriptor(&self) -> &DecoderDescriptor {
        &self.descriptor
    }

    fn poll_commands(&self) -> Vec<Vec<u8>> {
        vec![Self::REQUEST.to_vec()]
    }

    fn frame_boundary(&self, fragment: &[u8], in_progress: &[u8]) -> FrameBoundary {
        let ends = fragment.last() == Some(&0x55)
            && in_progress.len() + fragment.len() >= Self::FRAME_LEN;
        match (in_progress.is_empty() && fragment.first() == Some(&0xaa), ends) {
            (true, true) => FrameBoundary::Complete,
            (true, false) => FrameBoundary::Start,
            (false, true) => FrameBoundary::End,
            (false, false) => FrameBoundary::Continuation,
        }
    }

    fn decode(&self, frame: &Frame) -> Result<RawSample> {
        let data = frame.bytes();
        if data.len() != Self::FRAME_LEN {
            return Err(BmsError::malformed("length"));
        }
        if data[1..6].iter().fold(0, |acc, b| acc ^ b) != data[6] {
            return Err(BmsError::malformed("checksum"));
        }
        Ok(RawSample::new()
            .with(SampleKey::Voltage, f64::from(u16::from_be_bytes([data[1], data[2]])) / 100.0)
            .with(SampleKey::Current, f64::from(i16::from_be_bytes([data[3], data[4]])) / 100.0)
            .with(SampleKey::BatteryLevel, f64::from(data[5])))
    }
}
