use crate::error::{BmsError, Result};
use crate::sample::{RawSample, SampleKey};

/// A verbatim message to send which requests state of voltages
pub(crate) const REQUEST: [u8; 8] = [0x01, 0x03, 0xd0, 0x00, 0x00, 0x26, 0xfc, 0xd0];

const REGISTER_COUNT: usize = 0x26;
pub(crate) const PAYLOAD_LEN: usize = REGISTER_COUNT * 2;

/// Reported for cell slots the pack does not use
const CELL_VOLTAGE_NA_VALUE: u16 = 61001;
const CELL_SLOTS: usize = 32;

/// A message type which contains data about battery and cell voltages.
pub(crate) struct VoltagesMessage(Vec<u16>);

impl VoltagesMessage {
    pub fn new(payload: &[u8]) -> Result<Self> {
        if payload.len() != PAYLOAD_LEN {
            return Err(BmsError::malformed(format!(
                "voltages payload has {} bytes, expected {PAYLOAD_LEN}",
                payload.len()
            )));
        }
        let nums: Vec<u16> = payload
            .chunks(2)
            .map(|bytes| u16::from_be_bytes([bytes[0], bytes[1]]))
            .collect();
        Ok(Self(nums))
    }

    /// The voltage of each populated cell in mV
    pub fn cell_voltage_mv(&self) -> Vec<u16> {
        self.0[0..CELL_SLOTS].iter().cloned().filter(|&v| v != CELL_VOLTAGE_NA_VALUE).collect()
    }

    /// The battery voltage in V/100
    pub fn battery_voltage_cv(&self) -> u16 {
        self.0[37]
    }

    pub fn write_to(&self, sample: &mut RawSample) {
        let cells: Vec<f64> =
            self.cell_voltage_mv().into_iter().map(|mv| f64::from(mv) / 1000.0).collect();
        sample
            .insert(SampleKey::CellVoltages, cells)
            .insert(SampleKey::Voltage, f64::from(self.battery_voltage_cv()) / 100.0);
    }
}
