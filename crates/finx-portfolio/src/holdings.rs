//! Holdings reconstruction from a trade blotter.
//!
//! Trades are folded into a running net position per security; after the
//! last trade of each settlement date the whole running map is captured as a
//! [`HoldingsSnapshot`]. Snapshots are cumulative, so a security that has
//! been sold out stays in every later snapshot with a volume of zero.

use std::collections::{BTreeMap, BTreeSet};

use finx_core::types::{Currency, Date, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{PortfolioError, PortfolioResult};
use crate::pricing::CurrencyMap;

/// Net position in one security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Holding {
    /// Signed net face volume.
    pub volume: Decimal,
}

impl Holding {
    /// Creates a holding with the given volume.
    #[must_use]
    pub fn new(volume: Decimal) -> Self {
        Self { volume }
    }
}

/// Full position state as of one settlement date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    /// Settlement date of the snapshot.
    pub date: Date,
    /// Net position per security.
    pub holdings: BTreeMap<String, Holding>,
}

impl HoldingsSnapshot {
    /// Creates a snapshot from `(isin, volume)` pairs.
    #[must_use]
    pub fn new<I, S>(date: Date, positions: I) -> Self
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: Into<String>,
    {
        Self {
            date,
            holdings: positions
                .into_iter()
                .map(|(isin, volume)| (isin.into(), Holding::new(volume)))
                .collect(),
        }
    }

    /// Volume held in `isin`, zero if the security is absent.
    #[must_use]
    pub fn volume(&self, isin: &str) -> Decimal {
        self.holdings.get(isin).map_or(Decimal::ZERO, |h| h.volume)
    }

    /// Returns true if the snapshot holds no securities at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    /// Iterates over securities with a non-zero volume.
    pub fn active(&self) -> impl Iterator<Item = (&String, &Holding)> {
        self.holdings.iter().filter(|(_, h)| !h.volume.is_zero())
    }
}

/// Holdings snapshots keyed by settlement date, in chronological order.
pub type HoldingsIndex = BTreeMap<Date, HoldingsSnapshot>;

/// Per-security volume change between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingsDelta {
    /// Earlier snapshot date.
    pub start_date: Date,
    /// Later snapshot date.
    pub end_date: Date,
    /// `end − start` volume per security.
    pub holdings_delta: BTreeMap<String, Holding>,
}

/// Net trading consideration per security over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestedCapitalDelta {
    /// First settlement date included.
    pub start_date: Date,
    /// Last settlement date included.
    pub end_date: Date,
    /// Buys minus sells at consideration, per security.
    pub invested_capital_delta: BTreeMap<String, Decimal>,
}

/// Reconstructs cumulative holdings snapshots from a list of trades.
///
/// One snapshot is produced per distinct settlement date. With
/// `config.sort_trades` on (the default) trades are stably sorted by
/// settlement date first; otherwise they must already be in that order.
///
/// # Errors
///
/// - `EmptyInput` if `trades` is empty
/// - `Core(InvalidTrade)` if a trade fails validation
/// - `InvalidInput` if sorting is disabled and trades are out of order
///
/// # Example
///
/// ```rust
/// use finx_core::types::{Date, Side, Trade};
/// use finx_portfolio::{holdings_from_trades, EngineConfig};
/// use rust_decimal_macros::dec;
///
/// let d = |s: &str| Date::parse(s).unwrap();
/// let trades = vec![
///     Trade::new(d("2000-01-01"), d("2000-01-03"), "A", Side::Buy, dec!(100000), dec!(101.5)).unwrap(),
///     Trade::new(d("2000-06-30"), d("2000-07-02"), "A", Side::Sell, dec!(50000), dec!(100.5)).unwrap(),
/// ];
/// let index = holdings_from_trades(&trades, &EngineConfig::default()).unwrap();
/// assert_eq!(index[&d("2000-07-02")].volume("A"), dec!(50000));
/// ```
pub fn holdings_from_trades(
    trades: &[Trade],
    config: &EngineConfig,
) -> PortfolioResult<HoldingsIndex> {
    if trades.is_empty() {
        return Err(PortfolioError::empty_input("trades"));
    }
    for trade in trades {
        trade.validate()?;
    }

    let mut ordered: Vec<&Trade> = trades.iter().collect();
    if config.sort_trades {
        ordered.sort_by_key(|t| t.settlement_date);
    } else if let Some(pair) = ordered
        .windows(2)
        .find(|pair| pair[1].settlement_date < pair[0].settlement_date)
    {
        return Err(PortfolioError::invalid_input(
            "trades",
            format!(
                "settlement date {} follows {}; enable sort_trades or pre-sort the blotter",
                pair[1].settlement_date, pair[0].settlement_date
            ),
        ));
    }

    let mut running: BTreeMap<String, Holding> = BTreeMap::new();
    let mut index = HoldingsIndex::new();
    let mut iter = ordered.into_iter().peekable();

    while let Some(trade) = iter.next() {
        running
            .entry(trade.isin.clone())
            .or_default()
            .volume += trade.signed_volume();

        let date_complete = iter
            .peek()
            .map_or(true, |next| next.settlement_date != trade.settlement_date);
        if date_complete {
            index.insert(
                trade.settlement_date,
                HoldingsSnapshot {
                    date: trade.settlement_date,
                    holdings: running.clone(),
                },
            );
        }
    }

    debug!(
        trades = trades.len(),
        snapshots = index.len(),
        securities = running.len(),
        "reconstructed holdings"
    );
    Ok(index)
}

/// Volume change per security between two snapshot dates.
///
/// Covers the union of securities in either snapshot; a security absent
/// from one side counts as zero there.
///
/// # Errors
///
/// - `InvalidDateRange` if `start_date >= end_date`
/// - `MissingDate` if either date is not a key of `holdings`
pub fn holdings_delta(
    start_date: Date,
    end_date: Date,
    holdings: &HoldingsIndex,
) -> PortfolioResult<HoldingsDelta> {
    if start_date >= end_date {
        return Err(PortfolioError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }
    let start = holdings
        .get(&start_date)
        .ok_or_else(|| PortfolioError::missing_date("holdings", start_date))?;
    let end = holdings
        .get(&end_date)
        .ok_or_else(|| PortfolioError::missing_date("holdings", end_date))?;

    let securities: BTreeSet<&String> = start.holdings.keys().chain(end.holdings.keys()).collect();
    let holdings_delta = securities
        .into_iter()
        .map(|isin| {
            let delta = end.volume(isin) - start.volume(isin);
            (isin.clone(), Holding::new(delta))
        })
        .collect();

    Ok(HoldingsDelta {
        start_date,
        end_date,
        holdings_delta,
    })
}

/// Securities appearing anywhere in the index, in order of first appearance.
///
/// # Errors
///
/// Returns `EmptyInput` if `holdings` is empty.
pub fn unique_securities(holdings: &HoldingsIndex) -> PortfolioResult<Vec<String>> {
    if holdings.is_empty() {
        return Err(PortfolioError::empty_input("holdings"));
    }
    let mut seen = BTreeSet::new();
    let mut securities = Vec::new();
    for snapshot in holdings.values() {
        for isin in snapshot.holdings.keys() {
            if seen.insert(isin.as_str()) {
                securities.push(isin.clone());
            }
        }
    }
    Ok(securities)
}

/// Distinct securities traded in `trades`, sorted.
///
/// # Errors
///
/// Returns `EmptyInput` if `trades` is empty.
pub fn unique_traded_securities(trades: &[Trade]) -> PortfolioResult<Vec<String>> {
    if trades.is_empty() {
        return Err(PortfolioError::empty_input("trades"));
    }
    let securities: BTreeSet<&String> = trades.iter().map(|t| &t.isin).collect();
    Ok(securities.into_iter().cloned().collect())
}

/// Groups trades by trade date, preserving blotter order within a date.
#[must_use]
pub fn trades_by_trade_date(trades: &[Trade]) -> BTreeMap<Date, Vec<Trade>> {
    let mut grouped: BTreeMap<Date, Vec<Trade>> = BTreeMap::new();
    for trade in trades {
        grouped.entry(trade.trade_date).or_default().push(trade.clone());
    }
    grouped
}

/// Net consideration per security for trades settling in `[start_date, end_date]`.
///
/// Every security traded anywhere in `trades` appears in the result, with
/// zero if none of its trades settle inside the range. Buys are positive,
/// sells negative.
///
/// # Errors
///
/// - `EmptyInput` if `trades` is empty
/// - `InvalidDateRange` if `start_date > end_date`
/// - `Core(MathError)` if a consideration is not representable
pub fn invested_capital_by_security(
    start_date: Date,
    end_date: Date,
    trades: &[Trade],
    config: &EngineConfig,
) -> PortfolioResult<InvestedCapitalDelta> {
    if start_date > end_date {
        return Err(PortfolioError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }
    let mut invested_capital_delta: BTreeMap<String, Decimal> = unique_traded_securities(trades)?
        .into_iter()
        .map(|isin| (isin, Decimal::ZERO))
        .collect();

    for trade in trades
        .iter()
        .filter(|t| (start_date..=end_date).contains(&t.settlement_date))
    {
        if let Some(delta) = invested_capital_delta.get_mut(&trade.isin) {
            *delta += trade.consideration(config.default_face_value)?;
        }
    }

    Ok(InvestedCapitalDelta {
        start_date,
        end_date,
        invested_capital_delta,
    })
}

/// Summed holding volume per currency for every snapshot date.
///
/// # Errors
///
/// - `EmptyInput` if `holdings` is empty
/// - `MissingCurrency` if a held security has no entry in `currency_map`
pub fn holdings_by_currency(
    holdings: &HoldingsIndex,
    currency_map: &CurrencyMap,
) -> PortfolioResult<BTreeMap<Date, BTreeMap<Currency, Decimal>>> {
    if holdings.is_empty() {
        return Err(PortfolioError::empty_input("holdings"));
    }

    let mut by_date = BTreeMap::new();
    for (date, snapshot) in holdings {
        let mut by_currency: BTreeMap<Currency, Decimal> = BTreeMap::new();
        for (isin, holding) in &snapshot.holdings {
            let currency = currency_map
                .get(isin)
                .ok_or_else(|| PortfolioError::MissingCurrency { isin: isin.clone() })?;
            *by_currency.entry(*currency).or_default() += holding.volume;
        }
        by_date.insert(*date, by_currency);
    }
    Ok(by_date)
}
