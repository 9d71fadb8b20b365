//! Reading ingestion pipeline

use alerting::{AlertKey, AlertManager, Notification, Notifier, Recipient};
use chrono::{DateTime, Utc};
use data_validator::{normalize_phone, require, validate_email, ValidationError, Validator};
use hive_health::{assess_health, derive_alerts, Alert, HealthAssessment, SensorReading};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use storage::{AlertRecord, Contact, HiveStatus, ReadingRecord, Repository, StorageError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::IngestConfig;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid reading: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Hive {0} is not active")]
    HiveNotActive(i64),

    #[error("Malformed reading: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Parse(err.to_string())
    }
}

/// A reading as reported by a hive's sensor device
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceReading {
    #[serde(alias = "device_id")]
    pub device_id: String,
    /// Defaults to the ingestion time when absent
    #[serde(default, alias = "recorded_at")]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub reading: SensorReading,
}

fn recipient(contact: Contact) -> Recipient {
    Recipient {
        email: contact.email,
        phone: contact.phone,
    }
}

/// Result of ingesting one reading
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub hive_id: i64,
    pub reading_id: i64,
    pub assessment: HealthAssessment,
    pub alerts: Vec<Alert>,
    /// Notifications handed to the notifier
    pub notified: usize,
}

/// Validates, evaluates, stores, and notifies
pub struct Ingestor {
    repository: Arc<Repository>,
    validator: Validator,
    alerts: Mutex<AlertManager>,
    notifier: Arc<dyn Notifier>,
}

impl Ingestor {
    pub fn new(
        repository: Arc<Repository>,
        validator: Validator,
        alerts: AlertManager,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repository,
            validator,
            alerts: Mutex::new(alerts),
            notifier,
        }
    }

    /// Build the pipeline from configuration
    pub fn from_config(config: &IngestConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(
            Arc::new(Repository::with_retention(config.storage.clone())),
            Validator::new(config.validation.clone()),
            AlertManager::new(config.alerting.clone()),
            notifier,
        )
    }

    pub fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    /// Parse and ingest one JSON-encoded device reading
    pub fn ingest_json(&self, line: &str) -> Result<IngestOutcome, IngestError> {
        let reading: DeviceReading = serde_json::from_str(line).map_err(|e| {
            metrics::counter!("hive_readings_rejected_total").increment(1);
            IngestError::from(e)
        })?;
        self.ingest(&reading)
    }

    /// Ingest one device reading
    pub fn ingest(&self, input: &DeviceReading) -> Result<IngestOutcome, IngestError> {
        let result = self.process(input);
        match &result {
            Ok(outcome) => {
                metrics::counter!("hive_readings_ingested_total").increment(1);
                metrics::counter!("hive_alerts_derived_total")
                    .increment(outcome.alerts.len() as u64);
            }
            Err(e) => {
                metrics::counter!("hive_readings_rejected_total").increment(1);
                warn!("Rejected reading from {}: {}", input.device_id, e);
            }
        }
        result
    }

    fn process(&self, input: &DeviceReading) -> Result<IngestOutcome, IngestError> {
        let device_id = require("device_id", &input.device_id)?;
        let hive = self
            .repository
            .find_by_device(device_id)?
            .ok_or_else(|| IngestError::UnknownDevice(device_id.to_string()))?;

        if hive.status != HiveStatus::Active {
            return Err(IngestError::HiveNotActive(hive.id));
        }

        if let Some(err) = self.validator.validate_reading(&input.reading).into_error() {
            return Err(err.into());
        }

        let assessment = assess_health(&input.reading);
        let alerts = derive_alerts(&input.reading);
        let recorded_at = input.recorded_at.unwrap_or_else(Utc::now);

        let reading_id = self.repository.insert_reading(ReadingRecord {
            id: 0,
            hive_id: hive.id,
            recorded_at,
            reading: input.reading,
            assessment: assessment.clone(),
        })?;

        for alert in &alerts {
            self.repository
                .insert_alert(AlertRecord::from_alert(&hive, alert, recorded_at))?;
        }

        debug!(
            "Hive {} scored {} ({}) with {} alert(s)",
            hive.id,
            assessment.score,
            assessment.status.as_str(),
            alerts.len()
        );

        let contact = self.repository.contact(hive.owner_id)?;
        let notified = match contact {
            Some(contact) => self.notify(hive.id, &hive.name, &alerts, recipient(contact)),
            None => {
                if !alerts.is_empty() {
                    debug!("No contact registered for owner {}", hive.owner_id);
                }
                0
            }
        };

        Ok(IngestOutcome {
            hive_id: hive.id,
            reading_id,
            assessment,
            alerts,
            notified,
        })
    }

    /// Forward alerts that pass the gate. Delivery failures are logged only.
    fn notify(&self, hive_id: i64, hive_name: &str, alerts: &[Alert], recipient: Recipient) -> usize {
        let mut manager = match self.alerts.lock() {
            Ok(manager) => manager,
            Err(e) => {
                warn!("Alert manager unavailable: {}", e);
                return 0;
            }
        };

        let mut sent = 0;
        for alert in alerts {
            let key = AlertKey::new(hive_id, alert.kind);
            if !manager.should_notify(key, alert.severity) {
                continue;
            }

            let priority = manager.priority_for(alert.severity);
            let notification = Notification::for_alert(recipient.clone(), hive_name, alert, priority);
            match self.notifier.notify(&notification) {
                Ok(channels) => {
                    manager.record_notification(key, alert.severity);
                    metrics::counter!("hive_notifications_sent_total").increment(1);
                    debug!("Notified {} via {:?}", key, channels);
                    sent += 1;
                }
                Err(e) => warn!("Notification for {} failed: {}", key, e),
            }
        }
        sent
    }

    /// Validate and store a user's notification contact
    pub fn register_contact(
        &self,
        user_id: i64,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Contact, IngestError> {
        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(email) => {
                validate_email(email)?;
                Some(email.to_string())
            }
            None => None,
        };
        let phone = match phone.map(str::trim).filter(|p| !p.is_empty()) {
            Some(phone) => Some(normalize_phone(phone)?),
            None => None,
        };

        let contact = Contact { email, phone };
        self.repository.set_contact(user_id, contact.clone())?;
        info!("Contact updated for user {}", user_id);
        Ok(contact)
    }

    /// Acknowledge an alert stream so it stops counting as pending
    pub fn acknowledge(&self, key: AlertKey) -> bool {
        self.alerts
            .lock()
            .map(|mut manager| manager.acknowledge(key))
            .unwrap_or(false)
    }
}
