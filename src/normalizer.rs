//! Derived measurements.
//!
//! Decoders report what the hardware measures, already converted to physical
//! units. Everything that can be computed from those values is computed here,
//! once, for all vendors. A value the decoder reported itself is never
//! replaced.

use crate::decoder::CurrentPolarity;
use crate::sample::{NormalizedSample, RawSample, SampleKey, SampleValue};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Add the requested derived values to `raw`.
///
/// A derived value is only added when every input it needs is present.
pub fn normalize(
    raw: RawSample,
    derived_keys: &BTreeSet<SampleKey>,
    polarity: CurrentPolarity,
) -> NormalizedSample {
    let mut values = raw.into_inner();

    // order matters, later values build on earlier ones
    for key in [
        SampleKey::Voltage,
        SampleKey::Temperature,
        SampleKey::DeltaVoltage,
        SampleKey::Power,
        SampleKey::BatteryCharging,
        SampleKey::CycleCapacity,
        SampleKey::Runtime,
    ] {
        if !derived_keys.contains(&key) || values.contains_key(&key) {
            continue;
        }
        if let Some(value) = derive(key, &values, polarity) {
            trace!(%key, ?value, "derived");
            values.insert(key, value);
        }
    }

    NormalizedSample::from_map(values)
}

fn derive(
    key: SampleKey,
    values: &BTreeMap<SampleKey, SampleValue>,
    polarity: CurrentPolarity,
) -> Option<SampleValue> {
    let number = |k: SampleKey| values.get(&k).and_then(SampleValue::as_f64);
    let series = |k: SampleKey| {
        values.get(&k).and_then(SampleValue::as_series).filter(|s| !s.is_empty())
    };

    let value = match key {
        SampleKey::Voltage => {
            SampleValue::Number(round3(series(SampleKey::CellVoltages)?.iter().sum()))
        }
        SampleKey::Temperature => {
            let sensors = series(SampleKey::TemperatureSensors)?;
            SampleValue::Number(round3(sensors.iter().sum::<f64>() / sensors.len() as f64))
        }
        SampleKey::DeltaVoltage => {
            let cells = series(SampleKey::CellVoltages)?;
            let max = cells.iter().copied().fold(f64::MIN, f64::max);
            let min = cells.iter().copied().fold(f64::MAX, f64::min);
            SampleValue::Number(round3(max - min))
        }
        SampleKey::Power => {
            SampleValue::Number(round3(number(SampleKey::Voltage)? * number(SampleKey::Current)?))
        }
        SampleKey::BatteryCharging => {
            SampleValue::Flag(polarity.is_charging(number(SampleKey::Current)?))
        }
        SampleKey::CycleCapacity => SampleValue::Number(round3(
            number(SampleKey::CycleCharge)? * number(SampleKey::Voltage)?,
        )),
        SampleKey::Runtime => {
            let current = number(SampleKey::Current)?;
            let charge = number(SampleKey::CycleCharge)?;
            // only meaningful while discharging
            if current == 0.0 || polarity.is_charging(current) {
                return None;
            }
            SampleValue::Number((charge / current.abs() * 3600.0).trunc())
        }
        _ => return None,
    };
    Some(value)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
