//! Mark-to-market valuation of holdings snapshots.

use std::collections::BTreeMap;

use finx_core::types::{optional_code, Currency, Date, PriceRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PortfolioError, PortfolioResult};
use crate::holdings::{HoldingsIndex, HoldingsSnapshot};
use crate::pricing::{resolve_prices, CurrencyMap, PriceHistory};

/// Valuation of a single position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionValuation {
    /// Currency of the valuation; `None` when no price or mapping was found.
    #[serde(with = "optional_code")]
    pub currency: Option<Currency>,
    /// Face volume held.
    pub volume: Decimal,
    /// Price used.
    pub price: Decimal,
    /// `volume × price / per_original_face_value`.
    pub valuation: Decimal,
}

/// Totals and per-position detail of a portfolio valuation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioValuation {
    /// Market value per currency.
    pub total_valuation: BTreeMap<Currency, Decimal>,
    /// Valuation per security.
    pub position_valuation: BTreeMap<String, PositionValuation>,
}

impl PortfolioValuation {
    /// Total for `currency`, zero if nothing is held in it.
    #[must_use]
    pub fn total(&self, currency: Currency) -> Decimal {
        self.total_valuation
            .get(&currency)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// A dated portfolio valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    /// Valuation date.
    pub date: Date,
    /// Totals and positions.
    pub valuation: PortfolioValuation,
}

/// Valuations keyed by holdings date.
pub type ValuationIndex = BTreeMap<Date, Valuation>;

/// Values `volume` face of `isin` at `price` as of `date`.
///
/// The unavailable-price placeholder values to exactly zero.
///
/// # Errors
///
/// - `FuturePrice` naming `isin` if the price is dated after `date`
/// - `Core(MathError)` if the valuation overflows
pub fn value_position(
    isin: &str,
    date: Date,
    volume: Decimal,
    price: &PriceRecord,
) -> PortfolioResult<PositionValuation> {
    if price.date > date {
        return Err(PortfolioError::FuturePrice {
            isin: isin.to_string(),
            price_date: price.date,
            valuation_date: date,
        });
    }
    Ok(PositionValuation {
        currency: price.currency,
        volume,
        price: price.value,
        valuation: price.value_of(volume)?,
    })
}

/// Values every security in `snapshot` at `date`.
///
/// `prices` should already be resolved as of `date` (see
/// [`resolve_prices`]). A security with no price is valued at zero using
/// [`PriceRecord::unavailable`]. The currency comes from `currency_map`
/// when mapped, otherwise from the price; a position with neither is listed
/// but contributes to no total.
///
/// # Errors
///
/// - `EmptyInput` if the snapshot holds nothing
/// - `FuturePrice` if a supplied price is dated after `date`
/// - `Core(MathError)` if a position valuation overflows
pub fn value_portfolio(
    date: Date,
    snapshot: &HoldingsSnapshot,
    prices: &BTreeMap<String, PriceRecord>,
    currency_map: &CurrencyMap,
) -> PortfolioResult<Valuation> {
    if snapshot.is_empty() {
        return Err(PortfolioError::empty_input("holdings"));
    }

    let mut valuation = PortfolioValuation::default();
    for (isin, holding) in &snapshot.holdings {
        let price = match prices.get(isin) {
            Some(price) => price.clone(),
            None => {
                if !holding.volume.is_zero() {
                    warn!(%isin, %date, volume = %holding.volume, "no price available, valuing at zero");
                }
                PriceRecord::unavailable(date)
            }
        };

        let mut position = value_position(isin, date, holding.volume, &price)?;
        if let Some(mapped) = currency_map.get(isin) {
            position.currency = Some(*mapped);
        }

        if let Some(currency) = position.currency {
            *valuation.total_valuation.entry(currency).or_default() += position.valuation;
        }
        valuation.position_valuation.insert(isin.clone(), position);
    }

    Ok(Valuation { date, valuation })
}

/// Values every snapshot of `index` against prices as of its own date.
///
/// # Errors
///
/// - `EmptyInput` if `index` is empty
/// - any error from [`value_portfolio`]
pub fn value_portfolio_index(
    index: &HoldingsIndex,
    history: &PriceHistory,
    currency_map: &CurrencyMap,
) -> PortfolioResult<ValuationIndex> {
    if index.is_empty() {
        return Err(PortfolioError::empty_input("holdings"));
    }

    let mut valuations = ValuationIndex::new();
    for (date, snapshot) in index {
        let prices = resolve_prices(history, *date);
        let valuation = value_portfolio(*date, snapshot, &prices, currency_map)?;
        debug!(
            %date,
            positions = valuation.valuation.position_valuation.len(),
            currencies = valuation.valuation.total_valuation.len(),
            "valued holdings"
        );
        valuations.insert(*date, valuation);
    }
    Ok(valuations)
}
