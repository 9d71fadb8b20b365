//! Threshold Alerts

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::SensorReading;

/// Which sensor an alert concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Temperature,
    Humidity,
    Gas,
    Battery,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Temperature => "temperature",
            AlertKind::Humidity => "humidity",
            AlertKind::Gas => "gas",
            AlertKind::Battery => "battery",
        }
    }

    /// Capitalized label used in notification subjects
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::Temperature => "Temperature",
            AlertKind::Humidity => "Humidity",
            AlertKind::Gas => "Gas",
            AlertKind::Battery => "Battery",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity. Threshold checks only ever produce these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A triggered threshold condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    /// Reading value that triggered the alert
    pub value: f64,
    /// Boundary that was crossed
    pub threshold: f64,
}

impl Alert {
    fn new(
        kind: AlertKind,
        severity: AlertSeverity,
        message: &str,
        value: f64,
        threshold: f64,
    ) -> Self {
        Self {
            kind,
            severity,
            message: message.to_string(),
            value,
            threshold,
        }
    }
}

fn temperature_alert(t: f64) -> Option<Alert> {
    use AlertSeverity::*;
    let kind = AlertKind::Temperature;
    if t < 10.0 {
        Some(Alert::new(kind, Critical, "Hive temperature critically low", t, 10.0))
    } else if t < 15.0 {
        Some(Alert::new(kind, High, "Hive temperature low", t, 15.0))
    } else if t > 40.0 {
        Some(Alert::new(kind, Critical, "Hive temperature critically high", t, 40.0))
    } else if t > 35.0 {
        Some(Alert::new(kind, High, "Hive temperature high", t, 35.0))
    } else {
        None
    }
}

fn humidity_alert(h: f64) -> Option<Alert> {
    use AlertSeverity::*;
    let kind = AlertKind::Humidity;
    if h < 20.0 {
        Some(Alert::new(kind, Critical, "Hive humidity critically low", h, 20.0))
    } else if h < 30.0 {
        Some(Alert::new(kind, High, "Hive humidity low", h, 30.0))
    } else if h > 90.0 {
        Some(Alert::new(kind, Critical, "Hive humidity critically high", h, 90.0))
    } else if h > 80.0 {
        Some(Alert::new(kind, High, "Hive humidity high", h, 80.0))
    } else {
        None
    }
}

fn gas_alert(g: f64) -> Option<Alert> {
    use AlertSeverity::*;
    let kind = AlertKind::Gas;
    if g > 200.0 {
        Some(Alert::new(kind, Critical, "Gas level critically high", g, 200.0))
    } else if g > 100.0 {
        Some(Alert::new(kind, High, "Gas level high", g, 100.0))
    } else {
        None
    }
}

fn battery_alert(b: f64) -> Option<Alert> {
    use AlertSeverity::*;
    let kind = AlertKind::Battery;
    if b < 10.0 {
        Some(Alert::new(kind, Critical, "Sensor battery critically low", b, 10.0))
    } else if b < 20.0 {
        Some(Alert::new(kind, High, "Sensor battery low", b, 20.0))
    } else {
        None
    }
}

/// Derive threshold alerts from a reading.
///
/// Independent of [`crate::assess_health`]. Each field yields at most one
/// alert, checked most severe first, in the order temperature, humidity,
/// gas, battery. Weight and signal strength never alert.
pub fn derive_alerts(reading: &SensorReading) -> Vec<Alert> {
    [
        reading.temperature.and_then(temperature_alert),
        reading.humidity.and_then(humidity_alert),
        reading.gas_level.and_then(gas_alert),
        reading.battery_level.and_then(battery_alert),
    ]
    .into_iter()
    .flatten()
    .collect()
}
