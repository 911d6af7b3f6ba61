//! Currency type with ISO 4217 codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FinxError;

/// Placeholder code rendered for a price or position with no known currency.
pub const UNKNOWN_CURRENCY_CODE: &str = "N/A";

/// ISO 4217 currency codes.
///
/// Represents currencies commonly used in fixed income markets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[non_exhaustive]
pub enum Currency {
    /// United States Dollar
    #[default]
    USD,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// Japanese Yen
    JPY,
    /// Swiss Franc
    CHF,
    /// Canadian Dollar
    CAD,
    /// Australian Dollar
    AUD,
    /// New Zealand Dollar
    NZD,
    /// Swedish Krona
    SEK,
    /// Norwegian Krone
    NOK,
    /// Danish Krone
    DKK,
    /// Hong Kong Dollar
    HKD,
    /// Singapore Dollar
    SGD,
    /// Chinese Yuan Renminbi
    CNY,
    /// Indian Rupee
    INR,
    /// Brazilian Real
    BRL,
    /// Mexican Peso
    MXN,
    /// South African Rand
    ZAR,
}

impl Currency {
    /// Returns the ISO 4217 3-letter code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::NZD => "NZD",
            Currency::SEK => "SEK",
            Currency::NOK => "NOK",
            Currency::DKK => "DKK",
            Currency::HKD => "HKD",
            Currency::SGD => "SGD",
            Currency::CNY => "CNY",
            Currency::INR => "INR",
            Currency::BRL => "BRL",
            Currency::MXN => "MXN",
            Currency::ZAR => "ZAR",
        }
    }

    /// Parses a currency from a string code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CHF" => Some(Currency::CHF),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            "NZD" => Some(Currency::NZD),
            "SEK" => Some(Currency::SEK),
            "NOK" => Some(Currency::NOK),
            "DKK" => Some(Currency::DKK),
            "HKD" => Some(Currency::HKD),
            "SGD" => Some(Currency::SGD),
            "CNY" => Some(Currency::CNY),
            "INR" => Some(Currency::INR),
            "BRL" => Some(Currency::BRL),
            "MXN" => Some(Currency::MXN),
            "ZAR" => Some(Currency::ZAR),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = FinxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| FinxError::UnknownCurrency { code: s.to_string() })
    }
}

/// Serde adapter for `Option<Currency>` that writes a missing currency as `"N/A"`.
///
/// Use with `#[serde(with = "finx_core::types::optional_code")]`.
pub mod optional_code {
    use super::{Currency, UNKNOWN_CURRENCY_CODE};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes `None` as `"N/A"` and `Some(ccy)` as its ISO code.
    pub fn serialize<S>(value: &Option<Currency>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(currency) => serializer.serialize_str(currency.code()),
            None => serializer.serialize_str(UNKNOWN_CURRENCY_CODE),
        }
    }

    /// Deserializes `"N/A"` (or null) to `None`, any ISO code to `Some`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Currency>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some(UNKNOWN_CURRENCY_CODE) => Ok(None),
            Some(code) => Currency::from_code(code)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unknown currency code '{code}'"))),
        }
    }
}
