//! Custom error types for walletbook
//!
//! Every failure the ledger core can report is a variant of [`WalletError`].
//! Domain refusals (limit, index, empty ledger) leave state untouched.

use thiserror::Error;

use crate::models::{Money, YearMonth};

/// The main error type for walletbook operations
#[derive(Error, Debug)]
pub enum WalletError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Malformed input (amount, date, name, keyword)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A card's unpaid monthly total would exceed its limit
    #[error("Spending on card '{card}' for {month} cannot exceed the remaining limit of {remaining}")]
    LimitExceeded {
        card: String,
        month: YearMonth,
        remaining: Money,
    },

    /// A 1-based display index outside the ledger
    #[error("Invalid transaction number {index}: the list has {len} entries")]
    InvalidIndex { index: usize, len: usize },

    /// An operation that needs at least one entry ran on an empty ledger
    #[error("There are no transactions in {0}")]
    EmptyLedger(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Bank balance cannot cover the requested change
    #[error("Insufficient funds in '{account}': need {needed}, have {available}")]
    InsufficientFunds {
        account: String,
        needed: Money,
        available: Money,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl WalletError {
    /// Create a "not found" error for cards
    pub fn card_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Card",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for bank accounts
    pub fn bank_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Bank account",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for goals
    pub fn goal_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Goal",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a spending-limit refusal
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, Self::LimitExceeded { .. })
    }
}

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for walletbook operations
pub type WalletResult<T> = Result<T, WalletError>;
