//! Configuration for portfolio analytics computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PortfolioError, PortfolioResult};

/// Options recognised by the holdings, valuation and performance functions.
///
/// Every entry point takes the same configuration so behaviour is selected
/// by named options rather than positional flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Sort trades by settlement date before reconstructing holdings.
    /// When off, trades must already be in settlement order.
    pub sort_trades: bool,

    /// Face value used for invested-capital calculations when a trade's
    /// current face value is zero.
    pub default_face_value: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sort_trades: true,
            default_face_value: Decimal::ONE_HUNDRED,
        }
    }
}

impl EngineConfig {
    /// Creates a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON config document; omitted options take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `PortfolioError::InvalidConfig` for malformed JSON, unknown
    /// options, or values rejected by [`EngineConfig::validate`].
    pub fn from_json(json: &str) -> PortfolioResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PortfolioError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets whether trades are sorted before reconstruction.
    #[must_use]
    pub fn with_sort_trades(mut self, enabled: bool) -> Self {
        self.sort_trades = enabled;
        self
    }

    /// Sets the fallback face value.
    #[must_use]
    pub fn with_default_face_value(mut self, face: Decimal) -> Self {
        self.default_face_value = face;
        self
    }

    /// Checks option values.
    ///
    /// # Errors
    ///
    /// Returns `PortfolioError::InvalidConfig` if `default_face_value` is not positive.
    pub fn validate(&self) -> PortfolioResult<()> {
        if self.default_face_value <= Decimal::ZERO {
            return Err(PortfolioError::invalid_config(format!(
                "default_face_value must be positive, got {}",
                self.default_face_value
            )));
        }
        Ok(())
    }
}
