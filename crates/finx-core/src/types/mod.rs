//! Domain types for fixed income portfolio analytics.
//!
//! - [`Date`]: Calendar date, exchanged as ISO `YYYY-MM-DD`
//! - [`Currency`]: ISO currency codes
//! - [`Frequency`]: Period frequency and date-range generation
//! - [`Trade`]: Blotter trade with its [`Side`]
//! - [`PriceRecord`]: Dated price quote
//! - [`CashflowEvent`]: Scheduled payment, per 100 face

mod cashflow;
mod currency;
mod date;
mod frequency;
mod price;
mod trade;

pub use cashflow::{
    CashflowAmounts, CashflowDates, CashflowEvent, CashflowSchedule, CouponInterest, Principal,
};
pub use currency::{optional_code, Currency, UNKNOWN_CURRENCY_CODE};
pub use date::Date;
pub use frequency::{generate_date_range, Frequency};
pub use price::PriceRecord;
pub use trade::{Side, Trade};
