//! Hive Health Evaluation
//!
//! Two independent rule sets over a single sensor reading:
//! - [`assess_health`] scores the reading and explains the score
//! - [`derive_alerts`] emits threshold alerts, at most one per field
//!
//! Both are pure functions. Missing fields never fail; the rule simply
//! does not apply. The two rule sets use different boundaries and may
//! disagree about the same reading.

mod alerts;
mod assessment;
mod reading;

pub use alerts::{derive_alerts, Alert, AlertKind, AlertSeverity};
pub use assessment::{assess_health, HealthAssessment, HealthStatus};
pub use reading::{SensorField, SensorReading};
