//! Alert Manager Implementation

use hive_health::{AlertKind, AlertSeverity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::notifier::Priority;

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Cooldown period between duplicate notifications (seconds)
    pub cooldown_seconds: u64,
    /// Maximum notifications per hour before throttling
    pub max_alerts_per_hour: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 1800, // 30 minutes
            max_alerts_per_hour: 10,
        }
    }
}

/// Deduplication key: one stream of notifications per hive and sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub hive_id: i64,
    pub kind: AlertKind,
}

impl AlertKey {
    pub fn new(hive_id: i64, kind: AlertKind) -> Self {
        Self { hive_id, kind }
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hive {}/{}", self.hive_id, self.kind)
    }
}

/// State of an alert stream
#[derive(Debug, Clone)]
pub struct AlertState {
    /// Last time a notification went out
    pub last_fired: Instant,
    /// Severity of the last notification sent
    pub last_severity: AlertSeverity,
    /// Number of notifications sent
    pub fire_count: usize,
    /// Whether the beekeeper acknowledged it
    pub acknowledged: bool,
}

/// Alert manager for deduplication and throttling
pub struct AlertManager {
    /// Configuration
    config: AlertConfig,
    /// Alert states by hive and kind
    states: HashMap<AlertKey, AlertState>,
    /// Notifications sent in current hour
    hourly_count: usize,
    /// Hour start time
    hour_start: Instant,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self {
            config,
            states: HashMap::new(),
            hourly_count: 0,
            hour_start: Instant::now(),
        }
    }

    /// Check if a notification should go out for this alert
    pub fn should_notify(&mut self, key: AlertKey, severity: AlertSeverity) -> bool {
        // Reset hourly counter if needed
        if self.hour_start.elapsed() > Duration::from_secs(3600) {
            self.hourly_count = 0;
            self.hour_start = Instant::now();
        }

        // Check hourly throttle
        if self.hourly_count >= self.config.max_alerts_per_hour {
            warn!("Notification throttled for {}: max alerts per hour reached", key);
            return false;
        }

        // Check cooldown; only an escalation past the last severity sent
        // gets through early
        if let Some(state) = self.states.get(&key) {
            let cooldown = Duration::from_secs(self.config.cooldown_seconds);
            let escalated = severity > state.last_severity;
            if state.last_fired.elapsed() < cooldown && !escalated {
                debug!("Notification suppressed for {}: in cooldown period", key);
                return false;
            }
        }

        true
    }

    /// Record that a notification was sent
    pub fn record_notification(&mut self, key: AlertKey, severity: AlertSeverity) {
        self.hourly_count += 1;

        let state = self.states.entry(key).or_insert(AlertState {
            last_fired: Instant::now(),
            last_severity: severity,
            fire_count: 0,
            acknowledged: false,
        });

        state.last_fired = Instant::now();
        state.last_severity = severity;
        state.fire_count += 1;
        state.acknowledged = false;

        info!("Notification recorded: {} (count: {})", key, state.fire_count);
    }

    /// Acknowledge an alert stream
    pub fn acknowledge(&mut self, key: AlertKey) -> bool {
        if let Some(state) = self.states.get_mut(&key) {
            state.acknowledged = true;
            info!("Alert acknowledged: {}", key);
            true
        } else {
            false
        }
    }

    /// Delivery priority for a severity
    pub fn priority_for(&self, severity: AlertSeverity) -> Priority {
        match severity {
            AlertSeverity::Critical => Priority::High,
            AlertSeverity::High => Priority::Normal,
        }
    }

    /// Get pending (unacknowledged) alert streams
    pub fn pending(&self) -> Vec<(AlertKey, &AlertState)> {
        self.states
            .iter()
            .filter(|(_, state)| !state.acknowledged)
            .map(|(k, v)| (*k, v))
            .collect()
    }

    /// Get hourly notification count
    pub fn hourly_count(&self) -> usize {
        self.hourly_count
    }

    /// Clear all alert states
    pub fn clear(&mut self) {
        self.states.clear();
        self.hourly_count = 0;
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}
