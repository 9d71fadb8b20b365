//! Data Validation
//!
//! Range and finiteness checks for incoming hive readings, the email and
//! phone checks applied to contacts, and required-field checks for forms.

mod contact;
mod error;
mod form;
mod validator;

pub use contact::{normalize_phone, validate_email, validate_rw_mobile};
pub use form::{require, validate_password_strength};
pub use error::ValidationError;
pub use validator::{ValidationConfig, ValidationResult, Validator};
