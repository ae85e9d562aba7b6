//! The measurement vocabulary shared with the supervising application.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Version of the [`SampleKey`] vocabulary. Bump it whenever a key is added.
pub const VOCABULARY_VERSION: u16 = 1;

/// A measurement a sample can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKey {
    /// Battery voltage in V
    Voltage,
    /// Battery current in A, sign per the decoder's [`CurrentPolarity`](crate::CurrentPolarity)
    Current,
    /// Power in W
    Power,
    /// Whether the battery is being charged
    BatteryCharging,
    /// State of charge in %
    BatteryLevel,
    /// Battery temperature in °C
    Temperature,
    /// Individual temperature sensor readings in °C
    TemperatureSensors,
    /// Individual cell voltages in V
    CellVoltages,
    /// Difference between highest and lowest cell voltage in V
    DeltaVoltage,
    /// Remaining charge in Ah
    CycleCharge,
    /// Remaining energy in Wh
    CycleCapacity,
    /// Lifetime charge cycles
    Cycles,
    /// Estimated remaining runtime in s
    Runtime,
    /// Raw vendor alarm bits
    ProblemCode,
    /// Any alarm active
    Problem,
}

impl SampleKey {
    pub const ALL: [SampleKey; 15] = [
        SampleKey::Voltage,
        SampleKey::Current,
        SampleKey::Power,
        SampleKey::BatteryCharging,
        SampleKey::BatteryLevel,
        SampleKey::Temperature,
        SampleKey::TemperatureSensors,
        SampleKey::CellVoltages,
        SampleKey::DeltaVoltage,
        SampleKey::CycleCharge,
        SampleKey::CycleCapacity,
        SampleKey::Cycles,
        SampleKey::Runtime,
        SampleKey::ProblemCode,
        SampleKey::Problem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SampleKey::Voltage => "voltage",
            SampleKey::Current => "current",
            SampleKey::Power => "power",
            SampleKey::BatteryCharging => "battery_charging",
            SampleKey::BatteryLevel => "battery_level",
            SampleKey::Temperature => "temperature",
            SampleKey::TemperatureSensors => "temperature_sensors",
            SampleKey::CellVoltages => "cell_voltages",
            SampleKey::DeltaVoltage => "delta_voltage",
            SampleKey::CycleCharge => "cycle_charge",
            SampleKey::CycleCapacity => "cycle_capacity",
            SampleKey::Cycles => "cycles",
            SampleKey::Runtime => "runtime",
            SampleKey::ProblemCode => "problem_code",
            SampleKey::Problem => "problem",
        }
    }

    /// Physical unit of the value, if it has one.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            SampleKey::Voltage | SampleKey::CellVoltages | SampleKey::DeltaVoltage => Some("V"),
            SampleKey::Current => Some("A"),
            SampleKey::Power => Some("W"),
            SampleKey::BatteryLevel => Some("%"),
            SampleKey::Temperature | SampleKey::TemperatureSensors => Some("°C"),
            SampleKey::CycleCharge => Some("Ah"),
            SampleKey::CycleCapacity => Some("Wh"),
            SampleKey::Runtime => Some("s"),
            SampleKey::BatteryCharging
            | SampleKey::Cycles
            | SampleKey::ProblemCode
            | SampleKey::Problem => None,
        }
    }
}

impl fmt::Display for SampleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SampleValue {
    Flag(bool),
    Number(f64),
    Series(Vec<f64>),
}

impl SampleValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SampleValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SampleValue::Flag(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            SampleValue::Series(v) => Some(v),
            _ => None,
        }
    }
}

impl From<f64> for SampleValue {
    fn from(v: f64) -> Self {
        SampleValue::Number(v)
    }
}

impl From<u16> for SampleValue {
    fn from(v: u16) -> Self {
        SampleValue::Number(f64::from(v))
    }
}

impl From<bool> for SampleValue {
    fn from(v: bool) -> Self {
        SampleValue::Flag(v)
    }
}

impl From<Vec<f64>> for SampleValue {
    fn from(v: Vec<f64>) -> Self {
        SampleValue::Series(v)
    }
}

/// Measurements a decoder read out of one frame, already in physical units.
///
/// Keys a vendor does not report are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawSample(BTreeMap<SampleKey, SampleValue>);

impl RawSample {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SampleKey, value: impl Into<SampleValue>) -> &mut Self {
        self.0.insert(key, value.into());
        self
    }

    pub fn with(mut self, key: SampleKey, value: impl Into<SampleValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: SampleKey) -> Option<&SampleValue> {
        self.0.get(&key)
    }

    pub fn number(&self, key: SampleKey) -> Option<f64> {
        self.get(key).and_then(SampleValue::as_f64)
    }

    pub fn series(&self, key: SampleKey) -> Option<&[f64]> {
        self.get(key).and_then(SampleValue::as_series)
    }

    pub fn contains(&self, key: SampleKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add the values of `other`; on a key clash the later value wins.
    pub fn merge(&mut self, other: RawSample) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (SampleKey, &SampleValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub(crate) fn into_inner(self) -> BTreeMap<SampleKey, SampleValue> {
        self.0
    }
}

impl FromIterator<(SampleKey, SampleValue)> for RawSample {
    fn from_iter<I: IntoIterator<Item = (SampleKey, SampleValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A [`RawSample`] plus the derived values, as handed to the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSample(BTreeMap<SampleKey, SampleValue>);

impl NormalizedSample {
    pub(crate) fn from_map(values: BTreeMap<SampleKey, SampleValue>) -> Self {
        Self(values)
    }

    pub fn get(&self, key: SampleKey) -> Option<&SampleValue> {
        self.0.get(&key)
    }

    pub fn number(&self, key: SampleKey) -> Option<f64> {
        self.get(key).and_then(SampleValue::as_f64)
    }

    pub fn flag(&self, key: SampleKey) -> Option<bool> {
        self.get(key).and_then(SampleValue::as_bool)
    }

    pub fn series(&self, key: SampleKey) -> Option<&[f64]> {
        self.get(key).and_then(SampleValue::as_series)
    }

    pub fn contains(&self, key: SampleKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = SampleKey> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
