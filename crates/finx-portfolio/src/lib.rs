//! # Finx Portfolio
//!
//! Portfolio performance attribution for fixed income portfolios.
//!
//! This crate turns a trade blotter, a price history and per-security
//! cashflow schedules into a chain-linked, multi-currency total-return index.
//!
//! ## Design Philosophy
//!
//! - **Pure functions**: All calculations are stateless with explicit inputs
//! - **Borrowed inputs**: Schedules and prices are never mutated; scaling returns new values
//! - **Named options**: Behaviour is selected through [`EngineConfig`]
//!
//! ## Pipeline
//!
//! ```text
//! trades ──► holdings ──► valuation ──┐
//!               │                     ├──► performance index
//!               └──► cashflows ───────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use finx_portfolio::prelude::*;
//! use rust_decimal_macros::dec;
//!
//! let d = |s: &str| Date::parse(s).unwrap();
//! let trades = vec![
//!     Trade::new(d("2000-01-01"), d("2000-01-03"), "A", Side::Buy, dec!(100000), dec!(101.50)).unwrap(),
//!     Trade::new(d("2000-03-30"), d("2000-04-01"), "A", Side::Sell, dec!(50000), dec!(102.00)).unwrap(),
//! ];
//! let config = EngineConfig::default();
//! let holdings = holdings_from_trades(&trades, &config).unwrap();
//!
//! let prices: PriceHistory = [
//!     ("A", PriceRecord::new(d("2000-01-03"), Currency::AUD, dec!(101.50))),
//!     ("A", PriceRecord::new(d("2000-04-01"), Currency::AUD, dec!(102.00))),
//! ]
//! .into_iter()
//! .collect();
//! let coupon = CashflowEvent::coupon(d("2000-03-01"), d("2000-02-22"), d("2000-02-23"), dec!(1.25), dec!(0));
//! let schedules: SecurityCashflows =
//!     [("A".to_string(), [(coupon.payment_date(), coupon)].into_iter().collect())].into_iter().collect();
//!
//! let index = portfolio_performance_index(d("2000-06-30"), &trades, &holdings, &schedules, &prices, &config).unwrap();
//! assert_eq!(index.index[&d("2000-01-03")].index_values[&Currency::AUD], dec!(100));
//! assert!(index.last().unwrap().index_values[&Currency::AUD] > dec!(100));
//! ```
//!
//! ## Module Overview
//!
//! - [`holdings`] - Holdings reconstruction, deltas and invested capital
//! - [`pricing`] - Price history and as-of resolution
//! - [`valuation`] - Position and portfolio valuation
//! - [`cashflows`] - Future and historical cashflow attribution
//! - [`performance`] - Chain-linked performance index
//! - [`accrued`] - Accrued interest and dirty price history
//! - [`config`] - Engine configuration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod accrued;
pub mod cashflows;
pub mod config;
pub mod error;
pub mod holdings;
pub mod performance;
pub mod pricing;
pub mod valuation;

#[cfg(test)]
mod test_support;

// Re-export error types at crate root
pub use error::{PortfolioError, PortfolioResult};

pub use config::EngineConfig;

pub use holdings::{
    holdings_by_currency, holdings_delta, holdings_from_trades, invested_capital_by_security,
    trades_by_trade_date, unique_securities, unique_traded_securities, Holding, HoldingsDelta,
    HoldingsIndex, HoldingsSnapshot, InvestedCapitalDelta,
};

pub use pricing::{currencies, currency_map, price_as_of, resolve_prices, CurrencyMap, PriceHistory};

pub use valuation::{
    value_portfolio, value_portfolio_index, value_position, PortfolioValuation, PositionValuation,
    Valuation, ValuationIndex,
};

pub use cashflows::{
    historical_cashflows_for_period, portfolio_future_cashflows, portfolio_historical_cashflows,
    AttributedCashflows, SecurityCashflows,
};

pub use performance::{
    period_performance, portfolio_performance_index, PerformanceIndex, PerformanceIndexPoint,
    PerformanceSinceLast, PeriodPerformance,
};

pub use accrued::{accrued_interest, dirty_price_history, negative_accrued_interest, CleanPrice, DirtyPrice};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::accrued::{accrued_interest, dirty_price_history, CleanPrice, DirtyPrice};
    pub use crate::cashflows::{
        portfolio_future_cashflows, portfolio_historical_cashflows, AttributedCashflows,
        SecurityCashflows,
    };
    pub use crate::config::EngineConfig;
    pub use crate::error::{PortfolioError, PortfolioResult};
    pub use crate::holdings::{holdings_delta, holdings_from_trades, HoldingsIndex, HoldingsSnapshot};
    pub use crate::performance::{
        period_performance, portfolio_performance_index, PerformanceIndex, PeriodPerformance,
    };
    pub use crate::pricing::{currency_map, resolve_prices, CurrencyMap, PriceHistory};
    pub use crate::valuation::{value_portfolio, value_portfolio_index, Valuation};

    pub use finx_core::prelude::*;
}
