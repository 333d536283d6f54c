//! Domain error taxonomy
//!
//! Raised by the ledger, the table registry and the coordinator. Every
//! coordinator operation either fully commits or surfaces one of these
//! with the transaction rolled back.

use thiserror::Error;

/// Domain errors
#[derive(Debug, Error, PartialEq)]
pub enum FlowError {
    /// A requested catalog item is unknown or not available; order
    /// creation aborts wholesale
    #[error("Item {0} is not available")]
    ItemUnavailable(i64),

    /// State machine violation on an order or a line item
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// Release attempted while unresolved orders reference the table
    #[error("Table {0} still has active orders")]
    TableHasActiveOrders(i64),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Collaborator failure, transient from the caller's point of view
    #[error("Storage unavailable: {0}")]
    Storage(String),
}

impl FlowError {
    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

pub type FlowResult<T> = Result<T, FlowError>;
