//! Reading Validator for Range Checking

use crate::error::ValidationError;
use hive_health::{SensorField, SensorReading};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration. Each range is inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Temperature valid range (°C)
    pub temperature_range: (f64, f64),
    /// Humidity valid range (%)
    pub humidity_range: (f64, f64),
    /// Gas sensor valid range (sensor units)
    pub gas_range: (f64, f64),
    /// Hive weight valid range (kg)
    pub weight_range: (f64, f64),
    /// Battery valid range (%)
    pub battery_range: (f64, f64),
    /// Signal strength valid range (%)
    pub signal_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            temperature_range: (-40.0, 85.0),
            humidity_range: (0.0, 100.0),
            gas_range: (0.0, 10_000.0),
            weight_range: (0.0, 500.0),
            battery_range: (0.0, 100.0),
            signal_range: (0.0, 100.0),
        }
    }
}

impl ValidationConfig {
    /// Accepted range for a sensor field
    pub fn range_for(&self, field: SensorField) -> (f64, f64) {
        match field {
            SensorField::Temperature => self.temperature_range,
            SensorField::Humidity => self.humidity_range,
            SensorField::GasLevel => self.gas_range,
            SensorField::HiveWeight => self.weight_range,
            SensorField::BatteryLevel => self.battery_range,
            SensorField::SignalStrength => self.signal_range,
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// First error, if any
    pub fn into_error(self) -> Option<ValidationError> {
        self.errors.into_iter().next()
    }
}

/// Validator for hive sensor readings
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate every present field, collecting all errors
    pub fn validate_reading(&self, reading: &SensorReading) -> ValidationResult {
        let mut errors = Vec::new();
        let mut checked = 0;

        for (field, value) in reading.fields() {
            checked += 1;
            let range = self.config.range_for(field);
            if let Err(e) = self.validate_range(field.name(), value, range) {
                debug!("Rejected {}: {}", field, e);
                errors.push(e);
            }
        }

        if errors.is_empty() {
            ValidationResult::valid(checked)
        } else {
            ValidationResult::invalid(errors, checked)
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
