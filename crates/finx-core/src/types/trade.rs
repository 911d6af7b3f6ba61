//! Trade blotter records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Date;
use crate::error::{FinxError, FinxResult};

/// Direction of a trade.
///
/// Serialized as the single-letter blotter code (`"B"` / `"S"`); any other
/// code is rejected with [`FinxError::InvalidSide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Side {
    /// Buy (`B`), increases the position.
    Buy,
    /// Sell (`S`), reduces the position.
    Sell,
}

impl Side {
    /// Parses a blotter side code.
    ///
    /// # Errors
    ///
    /// Returns `FinxError::InvalidSide` for anything other than `B` or `S`.
    pub fn from_code(code: &str) -> FinxResult<Self> {
        match code {
            "B" => Ok(Side::Buy),
            "S" => Ok(Side::Sell),
            other => Err(FinxError::invalid_side(other)),
        }
    }

    /// Returns the blotter code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Side::Buy => "B",
            Side::Sell => "S",
        }
    }

    /// +1 for buys, -1 for sells.
    #[must_use]
    pub fn sign(&self) -> Decimal {
        match self {
            Side::Buy => Decimal::ONE,
            Side::Sell => Decimal::NEGATIVE_ONE,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Side {
    type Err = FinxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl TryFrom<String> for Side {
    type Error = FinxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_code(&value)
    }
}

impl From<Side> for String {
    fn from(side: Side) -> Self {
        side.code().to_string()
    }
}

/// A single executed trade from the blotter.
///
/// `volume` is the unsigned face amount traded; the direction comes from
/// `side`. Prices are quoted per 100 of face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Execution date.
    pub trade_date: Date,
    /// Date ownership transfers.
    pub settlement_date: Date,
    /// Security identifier.
    pub isin: String,
    /// Buy or sell.
    pub side: Side,
    /// Unsigned face amount traded.
    pub volume: Decimal,
    /// Execution price per 100 face.
    pub price: Decimal,
    /// Face value at issue.
    pub original_face_value: Decimal,
    /// Face value outstanding at the trade (after amortisation).
    pub current_face_value: Decimal,
}

impl Trade {
    /// Creates a trade with a face value of 100 (original and current).
    ///
    /// # Errors
    ///
    /// Returns `FinxError::InvalidTrade` if the trade fails [`Trade::validate`].
    pub fn new(
        trade_date: Date,
        settlement_date: Date,
        isin: impl Into<String>,
        side: Side,
        volume: Decimal,
        price: Decimal,
    ) -> FinxResult<Self> {
        let trade = Self {
            trade_date,
            settlement_date,
            isin: isin.into(),
            side,
            volume,
            price,
            original_face_value: Decimal::ONE_HUNDRED,
            current_face_value: Decimal::ONE_HUNDRED,
        };
        trade.validate()?;
        Ok(trade)
    }

    /// Sets the original and current face values.
    #[must_use]
    pub fn with_face_values(mut self, original: Decimal, current: Decimal) -> Self {
        self.original_face_value = original;
        self.current_face_value = current;
        self
    }

    /// Checks the trade's structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `FinxError::InvalidTrade` for an empty ISIN, a negative volume
    /// or face value, or a settlement date before the trade date.
    pub fn validate(&self) -> FinxResult<()> {
        if self.isin.trim().is_empty() {
            return Err(FinxError::invalid_trade("isin must not be empty"));
        }
        if self.volume.is_sign_negative() {
            return Err(FinxError::invalid_trade(format!(
                "volume must be unsigned, got {} for {}",
                self.volume, self.isin
            )));
        }
        if self.original_face_value.is_sign_negative() || self.current_face_value.is_sign_negative()
        {
            return Err(FinxError::invalid_trade(format!(
                "face values must not be negative for {}",
                self.isin
            )));
        }
        if self.settlement_date < self.trade_date {
            return Err(FinxError::invalid_trade(format!(
                "settlement_date {} precedes trade_date {} for {}",
                self.settlement_date, self.trade_date, self.isin
            )));
        }
        Ok(())
    }

    /// Volume signed by side: positive for buys, negative for sells.
    #[must_use]
    pub fn signed_volume(&self) -> Decimal {
        self.side.sign() * self.volume
    }

    /// Net consideration `±volume × price / face`.
    ///
    /// `face` is the current face value, or `default_face_value` when the
    /// current face value is zero.
    ///
    /// # Errors
    ///
    /// Returns `FinxError::MathError` if the face is zero or the amount
    /// overflows.
    pub fn consideration(&self, default_face_value: Decimal) -> FinxResult<Decimal> {
        let face = if self.current_face_value.is_zero() {
            default_face_value
        } else {
            self.current_face_value
        };
        self.signed_volume()
            .checked_mul(self.price)
            .and_then(|v| v.checked_div(face))
            .ok_or_else(|| {
                FinxError::math_error(format!(
                    "consideration of {} {} at {} over face {face} is not representable",
                    self.volume, self.isin, self.price
                ))
            })
    }
}
