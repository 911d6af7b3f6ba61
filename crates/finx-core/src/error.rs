//! Error types for the Finx core types.
//!
//! This module defines the error type raised when constructing or parsing
//! the foundational domain values (dates, trades, cashflow events).

use thiserror::Error;

/// A specialized Result type for Finx core operations.
pub type FinxResult<T> = Result<T, FinxError>;

/// The main error type for Finx core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FinxError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Trade side code outside of `B`/`S`.
    #[error("Invalid side '{code}': side must be either 'B' or 'S'")]
    InvalidSide {
        /// The rejected side code.
        code: String,
    },

    /// Trade failed validation.
    #[error("Invalid trade: {reason}")]
    InvalidTrade {
        /// Description of what's invalid.
        reason: String,
    },

    /// Cashflow event failed validation.
    #[error("Invalid cash flow: {reason}")]
    InvalidCashflow {
        /// Description of the invalid cash flow.
        reason: String,
    },

    /// Unknown or unsupported currency code.
    #[error("Unknown currency code: {code}")]
    UnknownCurrency {
        /// The rejected currency code.
        code: String,
    },

    /// Unknown frequency code.
    #[error("Unknown frequency code: {code}")]
    UnknownFrequency {
        /// The rejected frequency code.
        code: String,
    },

    /// Mathematical error (division by zero, overflow, etc.).
    #[error("Mathematical error: {reason}")]
    MathError {
        /// Description of the error.
        reason: String,
    },
}

impl FinxError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid side error.
    #[must_use]
    pub fn invalid_side(code: impl Into<String>) -> Self {
        Self::InvalidSide { code: code.into() }
    }

    /// Creates an invalid trade error.
    #[must_use]
    pub fn invalid_trade(reason: impl Into<String>) -> Self {
        Self::InvalidTrade {
            reason: reason.into(),
        }
    }

    /// Creates an invalid cash flow error.
    #[must_use]
    pub fn invalid_cashflow(reason: impl Into<String>) -> Self {
        Self::InvalidCashflow {
            reason: reason.into(),
        }
    }

    /// Creates a math error.
    #[must_use]
    pub fn math_error(reason: impl Into<String>) -> Self {
        Self::MathError {
            reason: reason.into(),
        }
    }
}
