//! Error types for the expense engine
//!
//! One crate-wide error enum built with thiserror. Field-level validation and
//! lifecycle violations carry their structured model errors so callers can
//! list every offending field or report the refused transition.

use thiserror::Error;

use crate::models::expense::ValidationErrors;
use crate::models::order::AllocationError;
use crate::models::status::InvalidTransition;

/// The main error type for gastos operations
#[derive(Error, Debug)]
pub enum GastosError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Free-form input errors (bad CLI arguments, unparsable amounts)
    #[error("Validation error: {0}")]
    Validation(String),

    /// One or more required fields are missing or malformed
    #[error("Validation failed: {0}")]
    InvalidFields(ValidationErrors),

    /// An approval or payment action was attempted from a state that forbids it
    #[error("Invalid transition: {0}")]
    InvalidTransition(InvalidTransition),

    /// The ledger itself failed (storage or transport)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// The record is paid, closed or annulled and refuses the mutation
    #[error("Expense is locked: {0}")]
    Locked(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl GastosError {
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    pub fn order_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Order",
            identifier: identifier.into(),
        }
    }

    pub fn item_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Order item",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is any kind of validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidFields(_))
    }

    /// Check if the ledger call itself failed
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_) | Self::Json(_))
    }
}

impl From<std::io::Error> for GastosError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GastosError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for GastosError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<ValidationErrors> for GastosError {
    fn from(errors: ValidationErrors) -> Self {
        Self::InvalidFields(errors)
    }
}

impl From<AllocationError> for GastosError {
    fn from(err: AllocationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<InvalidTransition> for GastosError {
    fn from(err: InvalidTransition) -> Self {
        Self::InvalidTransition(err)
    }
}

/// Result type alias for gastos operations
pub type GastosResult<T> = Result<T, GastosError>;
