//! The module contains the error the engine can throw.
//!
//! Every operation returns [`ResultEngine`]; the HTTP layer maps each variant
//! onto a status code:
//!
//! - [`Validation`] one entry per rejected input field.
//! - [`KeyNotFound`] thrown when a referenced row does not exist.
//! - [`ExistingKey`] thrown when a unique name/title/email is already taken.
//!
//!  [`ResultEngine`]: crate::ResultEngine
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// A rejected input field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    KeyNotFound(String),
    #[error("{0}")]
    ExistingKey(String),
    #[error("Invalid image: {0}")]
    Image(String),
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Turn a unique-index violation into `ExistingKey(message)`.
    ///
    /// Pre-checks give the friendly error; this keeps concurrent writers that
    /// slip past them from surfacing as a database failure.
    pub(crate) fn on_conflict(message: &str) -> impl FnOnce(DbErr) -> EngineError + '_ {
        move |err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                EngineError::ExistingKey(message.to_string())
            }
            _ => EngineError::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Image(a), Self::Image(b)) => a == b,
            (Self::PasswordHash(a), Self::PasswordHash(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
