//! Notification delivery seam

use hive_health::Alert;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{info, warn};

/// Delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("No delivery channel for recipient")]
    NoChannel,
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Delivery priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
}

/// Delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

/// Addresses a notification is delivered to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A message ready for delivery
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub recipient: Recipient,
    pub subject: String,
    pub message: String,
    pub priority: Priority,
}

impl Notification {
    /// Build the notification for one alert on a named hive
    pub fn for_alert(recipient: Recipient, hive_name: &str, alert: &Alert, priority: Priority) -> Self {
        Self {
            recipient,
            subject: format!("Smart Hive Alert: {}", alert.kind.label()),
            message: format!(
                "{} on hive '{}': reading {} crossed threshold {} ({})",
                alert.message, hive_name, alert.value, alert.threshold, alert.severity
            ),
            priority,
        }
    }

    /// Email whenever an address is known; SMS only for high priority
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels = Vec::with_capacity(2);
        if self.recipient.email.as_deref().is_some_and(|e| !e.is_empty()) {
            channels.push(Channel::Email);
        }
        if self.priority == Priority::High
            && self.recipient.phone.as_deref().is_some_and(|p| !p.is_empty())
        {
            channels.push(Channel::Sms);
        }
        channels
    }
}

/// Delivery collaborator (email/SMS gateway)
pub trait Notifier: Send + Sync {
    /// Deliver over every applicable channel
    fn notify(&self, notification: &Notification) -> Result<Vec<Channel>, NotifyError>;
}

/// Notifier that only logs deliveries
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<Vec<Channel>, NotifyError> {
        let channels = notification.channels();
        if channels.is_empty() {
            warn!("No contact channel for notification: {}", notification.subject);
            return Err(NotifyError::NoChannel);
        }
        info!(
            channels = ?channels,
            priority = ?notification.priority,
            "{}: {}",
            notification.subject,
            notification.message
        );
        Ok(channels)
    }
}

/// Notifier that keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications delivered so far
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<Vec<Channel>, NotifyError> {
        let channels = notification.channels();
        if channels.is_empty() {
            return Err(NotifyError::NoChannel);
        }
        let mut sent = self
            .sent
            .lock()
            .map_err(|e| NotifyError::DeliveryFailed(format!("Lock error: {}", e)))?;
        sent.push(notification.clone());
        Ok(channels)
    }
}
