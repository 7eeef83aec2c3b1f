//! Purchase-date selection.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::FxdcaError;

/// Which trading date inside each calendar month is the purchase date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// First available trading date of the month.
    #[default]
    PeriodStart,
    /// Last available trading date of the month.
    PeriodEnd,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::PeriodStart => "period_start",
            Cadence::PeriodEnd => "period_end",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Cadence::PeriodStart => "first trading day of each month",
            Cadence::PeriodEnd => "last trading day of each month",
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cadence {
    type Err = FxdcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "period_start" | "month_start" => Ok(Cadence::PeriodStart),
            "period_end" | "month_end" => Ok(Cadence::PeriodEnd),
            _ => Err(FxdcaError::invalid_configuration(
                "cadence",
                s,
                "expected period_start or period_end",
            )),
        }
    }
}

/// Selects one purchase date per calendar month from `available` within the
/// inclusive range `[start, end]`, in chronological order.
///
/// An empty range yields an empty vector.
pub fn select_dates(
    available: &[NaiveDate],
    start: NaiveDate,
    end: NaiveDate,
    cadence: Cadence,
) -> Vec<NaiveDate> {
    let mut months: BTreeMap<(i32, u32), NaiveDate> = BTreeMap::new();

    for &date in available.iter().filter(|d| **d >= start && **d <= end) {
        months
            .entry((date.year(), date.month()))
            .and_modify(|chosen| {
                let replace = match cadence {
                    Cadence::PeriodStart => date < *chosen,
                    Cadence::PeriodEnd => date > *chosen,
                };
                if replace {
                    *chosen = date;
                }
            })
            .or_insert(date);
    }

    months.into_values().collect()
}
