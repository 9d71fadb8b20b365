//! Alerting System
//!
//! Decides which derived alerts reach a beekeeper and hands them to a
//! delivery collaborator. Provides per-hive deduplication, hourly
//! throttling, acknowledgement, and priority mapping.

mod manager;
mod notifier;

pub use manager::{AlertConfig, AlertKey, AlertManager, AlertState};
pub use notifier::{
    Channel, LogNotifier, Notification, Notifier, NotifyError, Priority, Recipient,
    RecordingNotifier,
};
