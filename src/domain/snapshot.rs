//! Manually maintained snapshot of actual holdings.
//!
//! Only `fx_rate_override` feeds the simulation; everything else is shown in
//! the report next to the simulated figures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::series::is_usable;
use crate::domain::simulator::DEFAULT_FALLBACK_RATE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPosition {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    pub shares: f64,
    /// Average cost per share in the security's currency.
    #[serde(default)]
    pub avg_cost: f64,
    #[serde(default)]
    pub total_cost_local: f64,
    #[serde(default)]
    pub market_value_local: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    pub as_of: NaiveDate,
    /// Where the figures were copied from, e.g. a broker name.
    #[serde(default)]
    pub source: String,
    /// Local currency code the `*_local` fields are expressed in.
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub positions: Vec<SnapshotPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx_rate_override: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotTotals {
    pub total_cost_local: f64,
    pub market_value_local: f64,
    pub pnl_local: f64,
    /// `pnl / cost`, 0 when cost is 0.
    pub pnl_pct: f64,
}

impl HoldingsSnapshot {
    pub fn totals(&self) -> SnapshotTotals {
        let total_cost_local: f64 = self.positions.iter().map(|p| p.total_cost_local).sum();
        let market_value_local: f64 = self.positions.iter().map(|p| p.market_value_local).sum();
        let pnl_local = market_value_local - total_cost_local;
        let pnl_pct = if total_cost_local > 0.0 {
            pnl_local / total_cost_local
        } else {
            0.0
        };
        SnapshotTotals {
            total_cost_local,
            market_value_local,
            pnl_local,
            pnl_pct,
        }
    }

    /// The override rate, ignored unless it is finite and positive.
    pub fn override_rate(&self) -> Option<f64> {
        self.fx_rate_override.filter(|r| is_usable(*r))
    }

    /// The override rate if it is also not below `min_plausible_rate`.
    pub fn plausible_override_rate(&self, min_plausible_rate: f64) -> Option<f64> {
        self.override_rate().filter(|r| *r >= min_plausible_rate)
    }

    /// An override that is present but below `min_plausible_rate`, usually an
    /// inverted quote.
    pub fn implausible_override_rate(&self, min_plausible_rate: f64) -> Option<f64> {
        self.override_rate().filter(|r| *r < min_plausible_rate)
    }
}

/// Fallback rate precedence: plausible snapshot override, then configured
/// value, then [`DEFAULT_FALLBACK_RATE`].
pub fn resolve_fallback_rate(
    snapshot: Option<&HoldingsSnapshot>,
    configured: Option<f64>,
    min_plausible_rate: f64,
) -> f64 {
    snapshot
        .and_then(|s| s.plausible_override_rate(min_plausible_rate))
        .or(configured)
        .unwrap_or(DEFAULT_FALLBACK_RATE)
}
