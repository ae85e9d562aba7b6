//! Li-Gen LiFePO4 Battery Management Systems
//!
//! Tested with a 400ah 24v battery manufactured by <https://www.li-gen.net/> and sold around the year 2022.
//!
//! The BMS has a BLE interface. On top of that the NordicUART protocol is used for serial communication.
//! On top of that there is a proprietary request-response protocol that looks a lot like MODBUS
//! "read holding registers". Two requests are needed for a full sample:
//!
//! - State of charge (%), residual capacity (Ah) and cycles (count)
//! - Cell voltages (V) and battery voltage (V)

mod soc_message;
mod voltages_message;

use crate::assembler::Frame;
use crate::decoder::{CurrentPolarity, Decoder, DecoderDescriptor, FrameBoundary, Matcher};
use crate::error::{BmsError, Result};
use crate::sample::{RawSample, SampleKey};
use bluest::Uuid;
use crc16::{State, MODBUS};
use soc_message::SocMessage;
use std::time::Duration;
use voltages_message::VoltagesMessage;

const NORDIC_UART_SERVICE_ID: Uuid = Uuid::from_u128(0x6e400001_b5a3_f393_e0a9_e50e24dcca9e);
const NORDIC_UART_WRITE_CHARACTERISTIC_ID: Uuid =
    Uuid::from_u128(0x6e400002_b5a3_f393_e0a9_e50e24dcca9e);
const NORDIC_UART_NOTIFY_CHARACTERISTIC_ID: Uuid =
    Uuid::from_u128(0x6e400003_b5a3_f393_e0a9_e50e24dcca9e);
const MSG_HEADER: [u8; 2] = [0x01, 0x03];
/// Header, length byte and CRC
const MSG_OVERHEAD: usize = 5;
/// The device answers slowly; responses regularly take several seconds
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct LiGenBms {
    descriptor: DecoderDescriptor,
}

impl LiGenBms {
    /// Name prefix the BMS advertises with, e.g. `BT_HC6172`
    pub const BLE_NAME_PREFIX: &'static str = "BT_HC";

    pub fn new() -> Self {
        Self {
            descriptor: DecoderDescriptor {
                name: "ligen",
                manufacturer: "Li-Gen",
                model: "LiFePO4 BMS",
                matchers: vec![Matcher::local_name_prefix(Self::BLE_NAME_PREFIX)],
                services: vec![NORDIC_UART_SERVICE_ID],
                rx_characteristic: NORDIC_UART_NOTIFY_CHARACTERISTIC_ID,
                tx_characteristic: NORDIC_UART_WRITE_CHARACTERISTIC_ID,
                derived_keys: [SampleKey::CycleCapacity, SampleKey::DeltaVoltage]
                    .into_iter()
                    .collect(),
                polarity: CurrentPolarity::ChargePositive,
                request_timeout: Some(RESPONSE_TIMEOUT),
            },
        }
    }

    /// Total message length announced by the length byte, once it has arrived.
    fn expected_len(in_progress: &[u8], fragment: &[u8]) -> Option<usize> {
        in_progress.iter().chain(fragment).nth(2).map(|&len| len as usize + MSG_OVERHEAD)
    }

    /// Validate the given message bytes returning the payload.
    ///
    /// The message format is:
    ///
    /// Start Byte | End Byte     | Meaning
    /// 0          | 1            | A constant header with value [0x01, 0x03]
    /// 2          | 2            | The length in bytes of the payload
    /// 3          | x            | The payload
    /// x+1        | x+2          | A MODBUS CRC over the bytes 0-x
    fn parse_msg(buffer: &[u8]) -> Result<&[u8]> {
        if buffer.len() < 3 {
            return Err(BmsError::malformed("message shorter than its header"));
        }

        if buffer[0..2] != MSG_HEADER {
            return Err(BmsError::malformed("unexpected header"));
        }

        let expected_len = buffer[2] as usize + MSG_OVERHEAD;
        if buffer.len() < expected_len {
            return Err(BmsError::malformed("message incomplete"));
        }

        // duplicated notifications make messages run long
        if buffer.len() > expected_len {
            return Err(BmsError::malformed("message too long"));
        }

        let crc_actual = &buffer[buffer.len() - 2..];
        let crc_expected = Self::crc(&buffer[0..buffer.len() - 2]);
        if crc_actual != crc_expected {
            return Err(BmsError::malformed("CRC check failed"));
        }

        Ok(&buffer[3..buffer.len() - 2])
    }

    /// Compute the CRC check value for the given bytes
    fn crc(data: &[u8]) -> [u8; 2] {
        State::<MODBUS>::calculate(data).to_le_bytes()
    }
}

impl Default for LiGenBms {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LiGenBms {
    fn descriptor(&self) -> &DecoderDescriptor {
        &self.descriptor
    }

    fn poll_commands(&self) -> Vec<Vec<u8>> {
        vec![soc_message::REQUEST.to_vec(), voltages_message::REQUEST.to_vec()]
    }

    /// Messages carry their length in the third byte. A fragment starting with
    /// the header only begins a message when none is in progress, since
    /// payload bytes can look like a header too.
    fn frame_boundary(&self, fragment: &[u8], in_progress: &[u8]) -> FrameBoundary {
        if in_progress.is_empty() && !fragment.starts_with(&MSG_HEADER) {
            return FrameBoundary::Continuation;
        }
        let received = in_progress.len() + fragment.len();
        let complete = Self::expected_len(in_progress, fragment).is_some_and(|len| received >= len);
        match (in_progress.is_empty(), complete) {
            (true, true) => FrameBoundary::Complete,
            (true, false) => FrameBoundary::Start,
            (false, true) => FrameBoundary::End,
            (false, false) => FrameBoundary::Continuation,
        }
    }

    fn decode(&self, frame: &Frame) -> Result<RawSample> {
        let payload = Self::parse_msg(frame.bytes())?;
        let mut sample = RawSample::new();
        match payload.len() {
            soc_message::PAYLOAD_LEN => SocMessage::new(payload)?.write_to(&mut sample),
            voltages_message::PAYLOAD_LEN => VoltagesMessage::new(payload)?.write_to(&mut sample),
            other => {
                let reason = format!("unknown message with {other} byte payload");
                return Err(BmsError::malformed(reason));
            }
        }
        Ok(sample)
    }
}
