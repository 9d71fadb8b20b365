//! Sensor reading input

use serde::{Deserialize, Serialize};

/// A sensor field of [`SensorReading`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorField {
    Temperature,
    Humidity,
    GasLevel,
    HiveWeight,
    BatteryLevel,
    SignalStrength,
}

impl SensorField {
    /// Every field, in evaluation order
    pub const ALL: [SensorField; 6] = [
        SensorField::Temperature,
        SensorField::Humidity,
        SensorField::GasLevel,
        SensorField::HiveWeight,
        SensorField::BatteryLevel,
        SensorField::SignalStrength,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SensorField::Temperature => "temperature",
            SensorField::Humidity => "humidity",
            SensorField::GasLevel => "gas_level",
            SensorField::HiveWeight => "hive_weight",
            SensorField::BatteryLevel => "battery_level",
            SensorField::SignalStrength => "signal_strength",
        }
    }
}

impl std::fmt::Display for SensorField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One snapshot of hive sensor values. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorReading {
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Relative humidity (%)
    pub humidity: Option<f64>,
    /// Gas sensor output (sensor units)
    #[serde(alias = "gas_level")]
    pub gas_level: Option<f64>,
    /// Kilograms
    #[serde(alias = "hive_weight")]
    pub hive_weight: Option<f64>,
    /// Sensor battery (%)
    #[serde(alias = "battery_level")]
    pub battery_level: Option<f64>,
    /// Radio signal strength (%)
    #[serde(alias = "signal_strength")]
    pub signal_strength: Option<f64>,
}

impl SensorReading {
    /// Reading with only a temperature value
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }

    /// Value of one field
    pub fn get(&self, field: SensorField) -> Option<f64> {
        match field {
            SensorField::Temperature => self.temperature,
            SensorField::Humidity => self.humidity,
            SensorField::GasLevel => self.gas_level,
            SensorField::HiveWeight => self.hive_weight,
            SensorField::BatteryLevel => self.battery_level,
            SensorField::SignalStrength => self.signal_strength,
        }
    }

    /// Iterate present fields as `(field, value)` pairs
    pub fn fields(&self) -> impl Iterator<Item = (SensorField, f64)> + '_ {
        SensorField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|v| (field, v)))
    }

    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }
}
