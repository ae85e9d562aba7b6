use crate::error::{BmsError, Result};
use crate::sample::{RawSample, SampleKey};

/// A verbatim message to send which requests the state of charge and related data
pub(crate) const REQUEST: [u8; 8] = [0x01, 0x03, 0xd0, 0x26, 0x00, 0x19, 0x5d, 0x0b];

/// Number of 16 bit registers the request asks for
const REGISTER_COUNT: usize = 0x19;
pub(crate) const PAYLOAD_LEN: usize = REGISTER_COUNT * 2;

/// A message type which contains data about state of charge and battery condition
pub(crate) struct SocMessage(Vec<u16>);

impl SocMessage {
    pub fn new(payload: &[u8]) -> Result<Self> {
        if payload.len() != PAYLOAD_LEN {
            return Err(BmsError::malformed(format!(
                "state of charge payload has {} bytes, expected {PAYLOAD_LEN}",
                payload.len()
            )));
        }
        let nums: Vec<u16> = payload
            .chunks(2)
            .map(|bytes| u16::from_be_bytes([bytes[0], bytes[1]]))
            .collect();
        Ok(Self(nums))
    }

    /// The state of charge of the battery in %
    pub fn state_of_charge_pct(&self) -> u16 {
        self.0[14]
    }

    /// The residual capacity of the battery in Ah/100
    pub fn residual_capacity_cah(&self) -> u16 {
        self.0[16]
    }

    /// Lifetime number of battery cycles
    pub fn cycles_count(&self) -> u16 {
        self.0[19]
    }

    pub fn write_to(&self, sample: &mut RawSample) {
        sample
            .insert(SampleKey::BatteryLevel, self.state_of_charge_pct())
            .insert(SampleKey::CycleCharge, f64::from(self.residual_capacity_cah()) / 100.0)
            .insert(SampleKey::Cycles, self.cycles_count());
    }
}
