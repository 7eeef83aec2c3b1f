#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use fxdca::domain::error::FxdcaError;
use fxdca::domain::series::TimeSeries;
use fxdca::domain::snapshot::HoldingsSnapshot;
use fxdca::ports::data_port::MarketDataPort;
use fxdca::ports::snapshot_port::SnapshotPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<(NaiveDate, Option<f64>)>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_values(mut self, symbol: &str, values: Vec<(NaiveDate, f64)>) -> Self {
        self.data.insert(
            symbol.to_string(),
            values.into_iter().map(|(d, v)| (d, Some(v))).collect(),
        );
        self
    }

    pub fn with_observations(mut self, symbol: &str, obs: Vec<(NaiveDate, Option<f64>)>) -> Self {
        self.data.insert(symbol.to_string(), obs);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TimeSeries, FxdcaError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(FxdcaError::DataSource {
                reason: reason.clone(),
            });
        }
        let obs = self.data.get(symbol).cloned().unwrap_or_default();
        Ok(TimeSeries::from_observations(
            symbol,
            obs.into_iter()
                .filter(|(d, _)| *d >= start_date && *d <= end_date),
        ))
    }
}

pub struct MockSnapshotPort {
    pub snapshot: Option<HoldingsSnapshot>,
    pub error: Option<String>,
}

impl MockSnapshotPort {
    pub fn missing() -> Self {
        Self {
            snapshot: None,
            error: None,
        }
    }

    pub fn with_snapshot(snapshot: HoldingsSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            snapshot: None,
            error: Some(reason.to_string()),
        }
    }
}

impl SnapshotPort for MockSnapshotPort {
    fn load(&self) -> Result<Option<HoldingsSnapshot>, FxdcaError> {
        match &self.error {
            Some(reason) => Err(FxdcaError::Snapshot {
                file: self.location(),
                reason: reason.clone(),
            }),
            None => Ok(self.snapshot.clone()),
        }
    }

    fn location(&self) -> String {
        "mock_snapshot.json".to_string()
    }
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Monday to Friday dates in `[start, end]`.
pub fn weekdays(start: &str, end: &str) -> Vec<NaiveDate> {
    let end = d(end);
    d(start)
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

/// A linearly rising price on every weekday.
pub fn rising_prices(start: &str, end: &str, base: f64, step: f64) -> Vec<(NaiveDate, f64)> {
    weekdays(start, end)
        .into_iter()
        .enumerate()
        .map(|(i, day)| (day, base + step * i as f64))
        .collect()
}

/// The same rate on every weekday.
pub fn flat_rates(start: &str, end: &str, rate: f64) -> Vec<(NaiveDate, f64)> {
    weekdays(start, end).into_iter().map(|day| (day, rate)).collect()
}

pub fn sample_snapshot(fx_rate_override: Option<f64>) -> HoldingsSnapshot {
    serde_json::from_str(&format!(
        r#"{{
            "as_of": "2024-06-28",
            "source": "Sample Broker",
            "currency": "TWD",
            "positions": [
                {{"symbol": "QQQ", "name": "Invesco QQQ", "shares": 1.5,
                  "avg_cost": 420.0, "total_cost_local": 20000, "market_value_local": 22000}}
            ]{}
        }}"#,
        fx_rate_override.map_or(String::new(), |r| format!(r#", "fx_rate_override": {r}"#))
    ))
    .unwrap()
}
