//! Chain-linked multi-currency performance index.
//!
//! Between consecutive holdings dates the portfolio's return in each
//! currency is
//!
//! ```text
//! (valuation_change + cashflow_income − invested_capital_delta) / starting_valuation
//! ```
//!
//! and the index is carried forward multiplicatively from a seed of 100.
//! Capital injected by buys is removed from the valuation change and
//! capital withdrawn by sells is added back, so trading alone does not move
//! the index.

use std::collections::{BTreeMap, BTreeSet};

use finx_core::types::{CashflowEvent, Currency, Date, Trade};
use finx_core::FinxResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cashflows::{historical_cashflows_for_period, AttributedCashflows, SecurityCashflows};
use crate::config::EngineConfig;
use crate::error::{PortfolioError, PortfolioResult};
use crate::holdings::{invested_capital_by_security, HoldingsIndex};
use crate::pricing::{currencies, currency_map, resolve_prices, CurrencyMap, PriceHistory};
use crate::valuation::{value_portfolio, Valuation};

/// Value of every currency's index at its first point.
pub const SEED_INDEX_VALUE: Decimal = Decimal::ONE_HUNDRED;

/// Amounts per currency.
pub type CurrencyAmounts = BTreeMap<Currency, Decimal>;

/// Components of the change since the previous index point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceSinceLast {
    /// Change in total valuation.
    pub valuation_change: CurrencyAmounts,
    /// Attributed cashflows earned over the period.
    pub cashflow_income: CurrencyAmounts,
    /// Net consideration of trades settled in the period.
    pub invested_capital_delta: CurrencyAmounts,
}

/// One dated point of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceIndexPoint {
    /// Holdings date of the point.
    pub date: Date,
    /// Index level per currency.
    pub index_values: CurrencyAmounts,
    /// Components since the previous point; empty for the first point.
    pub performance_since_last: PerformanceSinceLast,
}

/// A complete performance index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceIndex {
    /// First holdings date.
    pub start_date: Date,
    /// Pricing date.
    pub end_date: Date,
    /// Points keyed by holdings date.
    pub index: BTreeMap<Date, PerformanceIndexPoint>,
}

impl PerformanceIndex {
    /// The most recent point.
    #[must_use]
    pub fn last(&self) -> Option<&PerformanceIndexPoint> {
        self.index.values().next_back()
    }

    /// Index levels of one currency in date order.
    pub fn series(&self, currency: Currency) -> impl Iterator<Item = (Date, Decimal)> + '_ {
        self.index.iter().filter_map(move |(date, point)| {
            point.index_values.get(&currency).map(|value| (*date, *value))
        })
    }
}

/// Investor-level change between two valuations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodPerformance {
    /// Date of the starting valuation.
    pub start_date: Date,
    /// Date of the ending valuation.
    pub end_date: Date,
    /// Change in total valuation.
    pub valuation_change: CurrencyAmounts,
    /// Cashflows paid in the period.
    pub cashflow_income: CurrencyAmounts,
    /// Net consideration of trades settled in the period.
    pub invested_capital_delta: CurrencyAmounts,
    /// `valuation_change + cashflow_income − invested_capital_delta`.
    pub total_change: CurrencyAmounts,
}

fn amount(amounts: &CurrencyAmounts, currency: Currency) -> Decimal {
    amounts.get(&currency).copied().unwrap_or(Decimal::ZERO)
}

/// Sums per-security amounts into their mapped currencies. Unmapped
/// securities are dropped.
fn sum_by_currency<'a, I>(amounts: I, currency_of: &CurrencyMap) -> CurrencyAmounts
where
    I: IntoIterator<Item = (&'a String, Decimal)>,
{
    let mut totals = CurrencyAmounts::new();
    for (isin, value) in amounts {
        match currency_of.get(isin) {
            Some(currency) => *totals.entry(*currency).or_default() += value,
            None => debug!(%isin, "no currency for security, amount excluded"),
        }
    }
    totals
}

fn cashflow_totals<'a>(
    cashflows: impl IntoIterator<Item = (&'a Date, &'a BTreeMap<String, CashflowEvent>)>,
) -> impl Iterator<Item = (&'a String, Decimal)> {
    cashflows
        .into_iter()
        .flat_map(|(_, by_security)| by_security.iter())
        .map(|(isin, event)| (isin, event.cashflow.total))
}

fn chain_link(
    previous: Decimal,
    total_change: Decimal,
    starting_valuation: Decimal,
) -> PortfolioResult<Decimal> {
    let period_return = total_change.checked_div(starting_valuation).ok_or_else(|| {
        PortfolioError::calculation_failed(format!(
            "period return {total_change} / {starting_valuation} is not representable"
        ))
    })?;
    previous
        .checked_mul(Decimal::ONE + period_return)
        .ok_or_else(|| PortfolioError::calculation_failed("index value overflowed"))
}

/// Builds the chain-linked performance index from the first holdings date
/// to `pricing_date`.
///
/// Every currency quoted in `history` is tracked and seeded at 100. For
/// each later holdings date on or before `pricing_date`, a currency whose
/// starting valuation is zero is carried flat with zero components;
/// otherwise its index moves by the period return. Exposure is judged by
/// valuation rather than held volume, so a currency whose positions are
/// held but unpriced at the start of a period is also carried flat.
///
/// Trades count towards a period when they settle after its starting
/// holdings date and on or before its ending one.
///
/// # Errors
///
/// - `EmptyInput` naming `trades`, `holdings`, `cashflows` or `prices`
/// - `InvalidDateRange` if `pricing_date` precedes the first holdings date
/// - `CalculationFailed` if an index value cannot be represented
/// - any valuation or attribution error for the underlying data
pub fn portfolio_performance_index(
    pricing_date: Date,
    trades: &[Trade],
    index: &HoldingsIndex,
    schedules: &SecurityCashflows,
    history: &PriceHistory,
    config: &EngineConfig,
) -> PortfolioResult<PerformanceIndex> {
    if trades.is_empty() {
        return Err(PortfolioError::empty_input("trades"));
    }
    if index.is_empty() {
        return Err(PortfolioError::empty_input("holdings"));
    }
    if schedules.is_empty() {
        return Err(PortfolioError::empty_input("cashflows"));
    }
    if history.is_empty() {
        return Err(PortfolioError::empty_input("prices"));
    }
    config.validate()?;

    let snapshots: Vec<_> = index.range(..=pricing_date).map(|(_, s)| s).collect();
    let Some(first) = snapshots.first() else {
        let start = index.keys().next().copied().unwrap_or(pricing_date);
        return Err(PortfolioError::InvalidDateRange {
            start,
            end: pricing_date,
        });
    };

    let currency_of = currency_map(history);
    let tracked: BTreeSet<Currency> = currencies(history);

    let valuations = snapshots
        .iter()
        .map(|snapshot| {
            let prices = resolve_prices(history, snapshot.date);
            value_portfolio(snapshot.date, snapshot, &prices, &currency_of)
        })
        .collect::<PortfolioResult<Vec<Valuation>>>()?;

    let mut points = BTreeMap::new();
    let mut levels: CurrencyAmounts = tracked.iter().map(|c| (*c, SEED_INDEX_VALUE)).collect();
    points.insert(
        first.date,
        PerformanceIndexPoint {
            date: first.date,
            index_values: levels.clone(),
            performance_since_last: PerformanceSinceLast::default(),
        },
    );

    for i in 1..snapshots.len() {
        let (start, end) = (snapshots[i - 1], snapshots[i]);
        let (start_totals, end_totals) = (
            &valuations[i - 1].valuation.total_valuation,
            &valuations[i].valuation.total_valuation,
        );

        let invested = invested_capital_by_security(start.date.add_days(1), end.date, trades, config)?;
        let invested = sum_by_currency(
            invested.invested_capital_delta.iter().map(|(isin, v)| (isin, *v)),
            &currency_of,
        );

        let income = if start.is_empty() {
            CurrencyAmounts::new()
        } else {
            let cashflows =
                historical_cashflows_for_period(pricing_date, start.date, end.date, start, schedules)?;
            sum_by_currency(cashflow_totals(&cashflows), &currency_of)
        };

        let mut since_last = PerformanceSinceLast::default();
        for currency in &tracked {
            let starting_valuation = amount(start_totals, *currency);
            let (valuation_change, cashflow_income, invested_capital_delta) =
                if starting_valuation.is_zero() {
                    let flows = amount(&invested, *currency) + amount(&income, *currency);
                    if !flows.is_zero() || !amount(end_totals, *currency).is_zero() {
                        warn!(
                            %currency,
                            start = %start.date,
                            end = %end.date,
                            "zero starting valuation, index carried flat"
                        );
                    }
                    (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
                } else {
                    let valuation_change = amount(end_totals, *currency) - starting_valuation;
                    let cashflow_income = amount(&income, *currency);
                    let invested_capital_delta = amount(&invested, *currency);
                    let total_change = valuation_change + cashflow_income - invested_capital_delta;

                    let level = levels.entry(*currency).or_insert(SEED_INDEX_VALUE);
                    *level = chain_link(*level, total_change, starting_valuation)?;
                    (valuation_change, cashflow_income, invested_capital_delta)
                };

            since_last.valuation_change.insert(*currency, valuation_change);
            since_last.cashflow_income.insert(*currency, cashflow_income);
            since_last
                .invested_capital_delta
                .insert(*currency, invested_capital_delta);
        }

        debug!(
            start = %start.date,
            end = %end.date,
            currencies = tracked.len(),
            "linked performance period"
        );
        points.insert(
            end.date,
            PerformanceIndexPoint {
                date: end.date,
                index_values: levels.clone(),
                performance_since_last: since_last,
            },
        );
    }

    info!(
        start = %first.date,
        end = %pricing_date,
        points = points.len(),
        currencies = tracked.len(),
        "performance index complete"
    );
    Ok(PerformanceIndex {
        start_date: first.date,
        end_date: pricing_date,
        index: points,
    })
}

/// The change between two valuations, split into its components.
///
/// Securities are assigned to currencies using the positions of the two
/// valuations (the ending valuation wins). Cashflows count when paid after
/// the starting date, on or before the ending date and before
/// `pricing_date`; trades count when settled after the starting date and on
/// or before the ending date.
///
/// # Errors
///
/// - `InvalidDateRange` if the starting valuation is not strictly earlier
///   than the ending one
/// - `Core(MathError)` if a trade consideration is not representable
pub fn period_performance(
    pricing_date: Date,
    start_valuation: &Valuation,
    end_valuation: &Valuation,
    cashflows: &AttributedCashflows,
    trades: &[Trade],
    config: &EngineConfig,
) -> PortfolioResult<PeriodPerformance> {
    let (start, end) = (start_valuation.date, end_valuation.date);
    if start >= end {
        return Err(PortfolioError::InvalidDateRange { start, end });
    }

    let currency_of: CurrencyMap = start_valuation
        .valuation
        .position_valuation
        .iter()
        .chain(&end_valuation.valuation.position_valuation)
        .filter_map(|(isin, position)| position.currency.map(|c| (isin.clone(), c)))
        .collect();

    let paid = cashflows
        .range(start.add_days(1)..=end)
        .filter(|(payment_date, _)| **payment_date < pricing_date);
    let mut cashflow_income = sum_by_currency(cashflow_totals(paid), &currency_of);

    let considerations = trades
        .iter()
        .filter(|t| start < t.settlement_date && t.settlement_date <= end)
        .map(|t| t.consideration(config.default_face_value).map(|c| (&t.isin, c)))
        .collect::<FinxResult<Vec<_>>>()?;
    let mut invested_capital_delta = sum_by_currency(considerations, &currency_of);

    let (start_totals, end_totals) = (
        &start_valuation.valuation.total_valuation,
        &end_valuation.valuation.total_valuation,
    );
    let tracked: BTreeSet<Currency> = start_totals
        .keys()
        .chain(end_totals.keys())
        .chain(cashflow_income.keys())
        .chain(invested_capital_delta.keys())
        .copied()
        .collect();

    let mut valuation_change = CurrencyAmounts::new();
    let mut total_change = CurrencyAmounts::new();
    for currency in tracked {
        cashflow_income.entry(currency).or_default();
        invested_capital_delta.entry(currency).or_default();
        let change = amount(end_totals, currency) - amount(start_totals, currency);
        valuation_change.insert(currency, change);
        total_change.insert(
            currency,
            change + amount(&cashflow_income, currency) - amount(&invested_capital_delta, currency),
        );
    }

    Ok(PeriodPerformance {
        start_date: start,
        end_date: end,
        valuation_change,
        cashflow_income,
        invested_capital_delta,
        total_change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::HoldingsSnapshot;
    use crate::test_support::{
        d, reference_holdings, reference_prices, reference_schedules, reference_trades, BOND_A,
    };
    use finx_core::types::{PriceRecord, Side};
    use crate::valuation::value_portfolio_index;
    use approx::assert_relative_eq;
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal_macros::dec;

    fn reference_index(pricing_date: Date) -> PerformanceIndex {
        portfolio_performance_index(
            pricing_date,
            &reference_trades(),
            &reference_holdings(),
            &reference_schedules(),
            &reference_prices(),
            &EngineConfig::default(),
        )
        .unwrap()
    }

    fn f(value: Decimal) -> f64 {
        value.to_f64().unwrap()
    }

    #[test]
    fn test_first_point_is_seed() {
        let index = reference_index(d("2000-12-31"));
        let first = &index.index[&d("2000-01-03")];
        assert_eq!(first.index_values[&Currency::AUD], dec!(100));
        assert_eq!(first.index_values[&Currency::USD], dec!(100));
        assert_eq!(first.performance_since_last, PerformanceSinceLast::default());
        assert_eq!(index.start_date, d("2000-01-03"));
        assert_eq!(index.end_date, d("2000-12-31"));
    }

    #[test]
    fn test_reference_index_levels() {
        let index = reference_index(d("2000-12-31"));
        assert_eq!(index.index.len(), 4);

        let feb = &index.index[&d("2000-02-03")];
        assert_relative_eq!(f(feb.index_values[&Currency::AUD]), 100.0 * 101_000.0 / 101_500.0, epsilon = 1e-9);
        // nothing held in USD at the start of the period
        assert_eq!(feb.index_values[&Currency::USD], dec!(100));
        assert_eq!(feb.performance_since_last.invested_capital_delta[&Currency::USD], dec!(0));

        let apr = &index.index[&d("2000-04-02")];
        assert_relative_eq!(f(apr.index_values[&Currency::AUD]), 100.0 * 102_500.0 / 101_500.0, epsilon = 1e-9);
        assert_relative_eq!(f(apr.index_values[&Currency::USD]), 100.0 * 103_000.0 / 100_500.0, epsilon = 1e-9);
        assert_eq!(apr.performance_since_last.cashflow_income[&Currency::AUD], dec!(1250));
        assert_eq!(apr.performance_since_last.cashflow_income[&Currency::USD], dec!(1500));
        assert_eq!(apr.performance_since_last.invested_capital_delta[&Currency::USD], dec!(-101500));
        assert_eq!(apr.performance_since_last.valuation_change[&Currency::USD], dec!(-100500));

        let jul = &index.index[&d("2000-07-02")];
        assert_eq!(jul.performance_since_last.invested_capital_delta[&Currency::AUD], dec!(-50250));
        assert_eq!(jul.performance_since_last.valuation_change[&Currency::AUD], dec!(-51000));
        assert_relative_eq!(
            f(jul.index_values[&Currency::AUD]),
            100.0 * 102_500.0 / 101_500.0 * 101_750.0 / 101_250.0,
            epsilon = 1e-9
        );
        assert_eq!(jul.index_values[&Currency::USD], apr.index_values[&Currency::USD]);
    }

    #[test]
    fn test_dates_after_pricing_date_excluded() {
        let index = reference_index(d("2000-04-02"));
        assert_eq!(index.index.len(), 3);
        assert_eq!(index.last().unwrap().date, d("2000-04-02"));
    }

    #[test]
    fn test_pricing_date_before_first_holding() {
        let err = portfolio_performance_index(
            d("1999-12-31"),
            &reference_trades(),
            &reference_holdings(),
            &reference_schedules(),
            &reference_prices(),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_empty_inputs_named() {
        let err = portfolio_performance_index(
            d("2000-12-31"),
            &reference_trades(),
            &reference_holdings(),
            &reference_schedules(),
            &PriceHistory::new(),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, PortfolioError::empty_input("prices"));

        let err = portfolio_performance_index(
            d("2000-12-31"),
            &[],
            &reference_holdings(),
            &reference_schedules(),
            &reference_prices(),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, PortfolioError::empty_input("trades"));
    }

    #[test]
    fn test_zero_exposure_is_flat() {
        let mut holdings = HoldingsIndex::new();
        for date in ["2000-01-03", "2000-04-02"] {
            holdings.insert(d(date), HoldingsSnapshot::new(d(date), [("XS1234567890", dec!(0))]));
        }
        let index = portfolio_performance_index(
            d("2000-12-31"),
            &reference_trades(),
            &holdings,
            &reference_schedules(),
            &reference_prices(),
            &EngineConfig::default(),
        )
        .unwrap();

        let last = index.last().unwrap();
        for currency in [Currency::AUD, Currency::USD] {
            assert_eq!(last.index_values[&currency], dec!(100));
            assert_eq!(last.performance_since_last.valuation_change[&currency], dec!(0));
            assert_eq!(last.performance_since_last.cashflow_income[&currency], dec!(0));
            assert_eq!(last.performance_since_last.invested_capital_delta[&currency], dec!(0));
        }
    }

    #[test]
    fn test_invested_capital_excludes_trades_on_starting_date() {
        let buy = |settle: &str, volume| {
            Trade::new(d(settle), d(settle), BOND_A, Side::Buy, volume, dec!(100)).unwrap()
        };
        let trades = vec![
            buy("2000-01-03", dec!(100000)),
            buy("2000-01-04", dec!(1000)),
            buy("2000-02-03", dec!(2000)),
        ];
        let mut holdings = HoldingsIndex::new();
        holdings.insert(d("2000-01-03"), HoldingsSnapshot::new(d("2000-01-03"), [(BOND_A, dec!(100000))]));
        holdings.insert(d("2000-02-03"), HoldingsSnapshot::new(d("2000-02-03"), [(BOND_A, dec!(103000))]));
        let prices: PriceHistory = [(BOND_A, PriceRecord::new(d("2000-01-01"), Currency::AUD, dec!(100)))]
            .into_iter()
            .collect();

        let index = portfolio_performance_index(
            d("2000-12-31"),
            &trades,
            &holdings,
            &reference_schedules(),
            &prices,
            &EngineConfig::default(),
        )
        .unwrap();

        let point = &index.index[&d("2000-02-03")];
        assert_eq!(point.performance_since_last.invested_capital_delta[&Currency::AUD], dec!(3000));
        assert_eq!(point.performance_since_last.valuation_change[&Currency::AUD], dec!(3000));
        assert_eq!(point.performance_since_last.cashflow_income[&Currency::AUD], dec!(0));
        assert_eq!(point.index_values[&Currency::AUD], dec!(100));
    }

    #[test]
    fn test_period_performance() {
        let history = reference_prices();
        let valuations =
            value_portfolio_index(&reference_holdings(), &history, &currency_map(&history)).unwrap();
        let cashflows = crate::cashflows::portfolio_historical_cashflows(
            d("2000-12-31"),
            &reference_holdings(),
            &reference_schedules(),
        )
        .unwrap();

        let period = period_performance(
            d("2000-12-31"),
            &valuations[&d("2000-04-02")],
            &valuations[&d("2000-07-02")],
            &cashflows,
            &reference_trades(),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(period.valuation_change[&Currency::AUD], dec!(-51000));
        assert_eq!(period.cashflow_income[&Currency::AUD], dec!(1250));
        assert_eq!(period.invested_capital_delta[&Currency::AUD], dec!(-50250));
        assert_eq!(period.total_change[&Currency::AUD], dec!(500));

        assert!(period_performance(
            d("2000-12-31"),
            &valuations[&d("2000-07-02")],
            &valuations[&d("2000-04-02")],
            &cashflows,
            &reference_trades(),
            &EngineConfig::default(),
        )
        .is_err());
    }
}
