//! Period frequency and calendar date-range generation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Date;
use crate::error::{FinxError, FinxResult};

/// Period frequency for schedules and date ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Frequency {
    /// Annual (code `A`)
    #[serde(rename = "A")]
    Annual,
    /// Semi-annual (code `SA`)
    #[default]
    #[serde(rename = "SA")]
    SemiAnnual,
    /// Quarterly (code `Q`)
    #[serde(rename = "Q")]
    Quarterly,
    /// Monthly (code `M`)
    #[serde(rename = "M")]
    Monthly,
}

impl Frequency {
    /// All supported frequencies, longest period first.
    pub const ALL: [Frequency; 4] = [
        Frequency::Annual,
        Frequency::SemiAnnual,
        Frequency::Quarterly,
        Frequency::Monthly,
    ];

    /// Returns the number of periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
        }
    }

    /// Returns the number of months per period.
    #[must_use]
    pub fn months_per_period(&self) -> u32 {
        12 / self.periods_per_year()
    }

    /// Returns the short code (`A`, `SA`, `Q`, `M`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Annual => "A",
            Frequency::SemiAnnual => "SA",
            Frequency::Quarterly => "Q",
            Frequency::Monthly => "M",
        }
    }

    /// Parses a frequency from its short code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.code() == code)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Annual => "annual",
            Frequency::SemiAnnual => "semi-annual",
            Frequency::Quarterly => "quarterly",
            Frequency::Monthly => "monthly",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Frequency {
    type Err = FinxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| FinxError::UnknownFrequency { code: s.to_string() })
    }
}

/// Generates the dates from `start` to `end` (inclusive) stepping by `frequency`.
///
/// Every date keeps the day-of-month of `start`, clamped to month end. When
/// `arrears` is set the first date (the period start) is dropped, otherwise
/// the last generated date is dropped.
///
/// # Errors
///
/// Returns `FinxError::InvalidDate` if `start` is after `end`.
///
/// # Example
///
/// ```rust
/// use finx_core::types::{generate_date_range, Date, Frequency};
///
/// let start = Date::parse("2000-01-31").unwrap();
/// let end = Date::parse("2000-07-31").unwrap();
/// let dates = generate_date_range(start, end, Frequency::Quarterly, true).unwrap();
/// let strings: Vec<String> = dates.iter().map(ToString::to_string).collect();
/// assert_eq!(strings, ["2000-04-30", "2000-07-31"]);
/// ```
pub fn generate_date_range(
    start: Date,
    end: Date,
    frequency: Frequency,
    arrears: bool,
) -> FinxResult<Vec<Date>> {
    if start > end {
        return Err(FinxError::invalid_date(format!(
            "start_date {start} is after end_date {end}"
        )));
    }

    let step = frequency.months_per_period() as i32;
    let mut dates = Vec::new();
    let mut period = 0;
    loop {
        let date = start.add_months(period * step)?;
        if date > end {
            break;
        }
        dates.push(date);
        period += 1;
    }

    if arrears {
        dates.remove(0);
    } else {
        dates.pop();
    }
    Ok(dates)
}
