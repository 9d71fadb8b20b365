//! Storage Layer
//!
//! In-memory persistence for hives, readings, alerts, contacts, user
//! accounts, tips, and training sessions, behind a repository interface.

mod accounts;
mod content;
mod models;
mod password;
mod repository;

pub use models::{
    AlertLevel, AlertRecord, AlertType, ApplicationForm, ApplyOutcome, Contact, DashboardStats,
    Hive, HiveStatus, HiveUpdate, NewHive, NewTip, NewTraining, NewUser, ReadingRecord,
    Requester, Role, Tip, TipUpdate, TrainingApplication, TrainingResource, TrainingUpdate, User,
    UserUpdate,
};
pub use repository::{Repository, RetentionConfig};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Record not found")]
    NotFound,
    #[error("Access denied")]
    Forbidden,
    #[error("Invalid credentials")]
    Unauthorized,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
}
