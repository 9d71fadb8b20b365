//! Stored record types

use chrono::{DateTime, NaiveDate, Utc};
use hive_health::{Alert, AlertKind, AlertSeverity, HealthAssessment, SensorReading};
use serde::{Deserialize, Serialize};

/// User role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

/// Who is asking. Admins see and manage every hive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: i64,
    pub role: Role,
}

impl Requester {
    pub fn admin(user_id: i64) -> Self {
        Self { user_id, role: Role::Admin }
    }

    pub fn user(user_id: i64) -> Self {
        Self { user_id, role: Role::User }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub(crate) fn can_access(&self, hive: &Hive) -> bool {
        self.is_admin() || hive.owner_id == self.user_id
    }
}

/// User account. The password hash never leaves the store.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(skip)]
    pub(crate) password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Identity this account acts with
    pub fn requester(&self) -> Requester {
        Requester {
            user_id: self.id,
            role: self.role,
        }
    }
}

/// Account creation request with a plaintext password
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Partial account update. A new password is hashed before storing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

/// Notification contact details for a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Hive lifecycle. New hives wait for admin approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HiveStatus {
    Pending,
    Active,
    Inactive,
}

/// Registered hive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hive {
    pub id: i64,
    pub name: String,
    pub device_id: String,
    pub location: String,
    pub description: String,
    pub owner_id: i64,
    pub owner_name: String,
    pub status: HiveStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<i64>,
}

/// Registration request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewHive {
    pub name: String,
    pub device_id: String,
    pub location: String,
    pub description: String,
    pub owner_id: i64,
    pub owner_name: String,
}

/// Partial update. `status` is only honoured for admins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<HiveStatus>,
}

/// Stored reading with its assessment
#[derive(Debug, Clone, Serialize)]
pub struct ReadingRecord {
    pub id: i64,
    pub hive_id: i64,
    pub recorded_at: DateTime<Utc>,
    pub reading: SensorReading,
    pub assessment: HealthAssessment,
}

/// Alert log entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertType {
    Temperature,
    Humidity,
    Gas,
    Battery,
    HiveDeleted,
}

impl From<AlertKind> for AlertType {
    fn from(kind: AlertKind) -> Self {
        match kind {
            AlertKind::Temperature => AlertType::Temperature,
            AlertKind::Humidity => AlertType::Humidity,
            AlertKind::Gas => AlertType::Gas,
            AlertKind::Battery => AlertType::Battery,
        }
    }
}

/// Alert log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    High,
    Critical,
}

impl From<AlertSeverity> for AlertLevel {
    fn from(severity: AlertSeverity) -> Self {
        match severity {
            AlertSeverity::High => AlertLevel::High,
            AlertSeverity::Critical => AlertLevel::Critical,
        }
    }
}

/// Alert log entry
#[derive(Debug, Clone, Serialize)]
pub struct AlertRecord {
    pub id: i64,
    pub hive_id: i64,
    pub hive_name: String,
    pub alert_type: AlertType,
    pub level: AlertLevel,
    pub message: String,
    pub value: Option<f64>,
    pub threshold: Option<f64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl AlertRecord {
    /// Log entry for a derived sensor alert (id assigned on insert)
    pub fn from_alert(hive: &Hive, alert: &Alert, created_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            hive_id: hive.id,
            hive_name: hive.name.clone(),
            alert_type: alert.kind.into(),
            level: alert.severity.into(),
            message: alert.message.clone(),
            value: Some(alert.value),
            threshold: Some(alert.threshold),
            is_read: false,
            created_at,
        }
    }

    pub(crate) fn hive_deleted(hive: &Hive, deleted_by: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            hive_id: hive.id,
            hive_name: hive.name.clone(),
            alert_type: AlertType::HiveDeleted,
            level: AlertLevel::Warning,
            message: format!(
                "Hive '{}' (ID: {}) was deleted by user {}.",
                hive.name, hive.id, deleted_by
            ),
            value: None,
            threshold: None,
            is_read: false,
            created_at,
        }
    }
}

/// Dashboard summary over the hives a requester can see
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_hives: usize,
    pub active_alerts: usize,
    pub temperature_avg: f64,
    pub humidity_avg: f64,
    pub weight_avg: f64,
    pub gas_level_avg: f64,
}

/// Beekeeping tip shown to every user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewTip {
    pub title: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TipUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

/// Training session users can apply for once published
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResource {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub published: bool,
    /// Applicant count, filled in for admins only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicants: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewTraining {
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub published: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub published: Option<bool>,
}

/// Applicant details submitted for a training session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationForm {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub location: String,
    pub experience: String,
    pub note: String,
}

/// Stored training application
#[derive(Debug, Clone, Serialize)]
pub struct TrainingApplication {
    pub training_id: i64,
    pub user_id: i64,
    #[serde(flatten)]
    pub form: ApplicationForm,
    pub applied_at: DateTime<Utc>,
}

/// Result of applying for a training session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied,
    AlreadyApplied,
}
