//! # Finx Core
//!
//! Core types for the Finx fixed income portfolio analytics library.
//!
//! This crate provides the value types every Finx computation exchanges:
//!
//! - **Dates**: `Date` with ISO string serialization and month arithmetic
//! - **Blotter**: `Trade` and `Side`
//! - **Market data**: `PriceRecord` and `Currency`
//! - **Schedules**: `CashflowEvent` with explicit coupon/principal records
//!
//! ## Design Philosophy
//!
//! - **Immutable values**: scaling a cashflow returns a new event
//! - **Explicit records**: nested cashflow amounts are named fields, not maps
//! - **Explicit Over Implicit**: invalid codes fail at the parsing boundary
//!
//! ## Example
//!
//! ```rust
//! use finx_core::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let trade = Trade::new(
//!     Date::parse("2000-01-01").unwrap(),
//!     Date::parse("2000-01-03").unwrap(),
//!     "XS12345678901",
//!     Side::Buy,
//!     dec!(100000),
//!     dec!(101.50),
//! )
//! .unwrap();
//! assert_eq!(trade.signed_volume(), dec!(100000));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::return_self_not_must_use)]

pub mod error;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{FinxError, FinxResult};
    pub use crate::types::{
        generate_date_range, CashflowAmounts, CashflowDates, CashflowEvent, CashflowSchedule,
        CouponInterest, Currency, Date, Frequency, PriceRecord, Principal, Side, Trade,
    };
}

// Re-export commonly used types at crate root
pub use error::{FinxError, FinxResult};
pub use types::{CashflowEvent, Currency, Date, PriceRecord, Trade};
