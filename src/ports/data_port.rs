//! Market data port trait.

use crate::domain::error::FxdcaError;
use crate::domain::series::TimeSeries;
use chrono::NaiveDate;

/// Source of close-of-day series: security prices and currency-pair rates
/// are fetched the same way, keyed by symbol.
pub trait MarketDataPort {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TimeSeries, FxdcaError>;
}
