//! Error types for portfolio analytics.
//!
//! This module defines the error types used throughout the portfolio crate.
//! Input contract violations name the offending argument so a caller can tell
//! bad input data apart from a data consistency failure.

use finx_core::{Date, FinxError};
use thiserror::Error;

/// Result type for portfolio operations.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

/// Errors that can occur during portfolio operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
    /// A required collection argument was empty.
    #[error("{argument} input must not be empty")]
    EmptyInput {
        /// The name of the empty argument.
        argument: String,
    },

    /// An argument is present but violates its contract.
    #[error("Invalid {argument}: {reason}")]
    InvalidInput {
        /// The name of the offending argument.
        argument: String,
        /// What the argument was expected to satisfy.
        reason: String,
    },

    /// A referenced date is absent from an index.
    #[error("{argument} has no entry for {date}")]
    MissingDate {
        /// The index that was searched.
        argument: String,
        /// The date that was not found.
        date: Date,
    },

    /// A date range is empty or reversed.
    #[error("Invalid date range: start {start} must be before end {end}")]
    InvalidDateRange {
        /// Range start.
        start: Date,
        /// Range end.
        end: Date,
    },

    /// A price dated after the valuation date was supplied.
    #[error("Price for '{isin}' is dated {price_date}, after valuation date {valuation_date}")]
    FuturePrice {
        /// The security being valued.
        isin: String,
        /// Date of the offending price.
        price_date: Date,
        /// Date of the valuation.
        valuation_date: Date,
    },

    /// A price history record is missing a field or has the wrong shape.
    #[error("Malformed price record for '{isin}' at '{date}': {field}")]
    MalformedPriceRecord {
        /// Security of the record.
        isin: String,
        /// Date key of the record, as supplied.
        date: String,
        /// Description of the structural problem.
        field: String,
    },

    /// A security has no currency mapping.
    #[error("No currency mapping for security '{isin}'")]
    MissingCurrency {
        /// The unmapped security.
        isin: String,
    },

    /// Invalid engine configuration.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// The reason the configuration is invalid.
        reason: String,
    },

    /// Calculation failed.
    #[error("Calculation failed: {reason}")]
    CalculationFailed {
        /// The reason the calculation failed.
        reason: String,
    },

    /// An underlying core type rejected its input.
    #[error(transparent)]
    Core(#[from] FinxError),
}

impl PortfolioError {
    /// Create an empty input error.
    #[must_use]
    pub fn empty_input(argument: impl Into<String>) -> Self {
        Self::EmptyInput {
            argument: argument.into(),
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing date error.
    #[must_use]
    pub fn missing_date(argument: impl Into<String>, date: Date) -> Self {
        Self::MissingDate {
            argument: argument.into(),
            date,
        }
    }

    /// Create a malformed price record error.
    #[must_use]
    pub fn malformed_price(
        isin: impl Into<String>,
        date: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::MalformedPriceRecord {
            isin: isin.into(),
            date: date.into(),
            field: field.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create a calculation failed error.
    #[must_use]
    pub fn calculation_failed(reason: impl Into<String>) -> Self {
        Self::CalculationFailed {
            reason: reason.into(),
        }
    }
}
