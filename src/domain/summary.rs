//! Headline figures for a finished simulation.

use chrono::NaiveDate;

use crate::domain::ledger::Ledger;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub months: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Local currency paid in: contribution × months.
    pub total_invested: f64,
    pub total_shares: f64,
    /// Portfolio value in local currency after the last period, 0 when empty.
    pub final_value: f64,
    pub profit: f64,
    /// `profit / total_invested`, 0 when nothing was invested.
    pub roi: f64,
    pub total_commission: f64,
}

impl Summary {
    pub fn compute(ledger: &Ledger, monthly_contribution: f64) -> Self {
        let months = ledger.len();
        let total_invested = monthly_contribution * months as f64;
        let final_value = ledger.last().map_or(0.0, |r| r.portfolio_value_local);
        let profit = final_value - total_invested;
        let roi = if total_invested > 0.0 {
            profit / total_invested
        } else {
            0.0
        };

        Summary {
            months,
            first_date: ledger.first().map(|r| r.date),
            last_date: ledger.last().map(|r| r.date),
            total_invested,
            total_shares: ledger.last().map_or(0.0, |r| r.total_shares),
            final_value,
            profit,
            roi,
            total_commission: ledger.iter().map(|r| r.commission).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::TimeSeries;
    use crate::domain::simulator::{simulate, SimulationParams};
    use approx::assert_relative_eq;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_ledger_summary_is_zero() {
        let summary = Summary::compute(&Ledger::new(), 10_000.0);
        assert_eq!(summary.months, 0);
        assert_eq!(summary.total_invested, 0.0);
        assert_eq!(summary.final_value, 0.0);
        assert_eq!(summary.profit, 0.0);
        assert_eq!(summary.roi, 0.0);
        assert!(summary.first_date.is_none());
    }

    #[test]
    fn summary_from_simulated_ledger() {
        let prices = TimeSeries::from_values(
            "QQQ",
            vec![(d("2024-01-02"), 400.0), (d("2024-02-01"), 440.0)],
        );
        let rates = TimeSeries::from_values("TWD=X", vec![(d("2024-01-02"), 32.0)]);
        let params = SimulationParams::new(d("2024-01-01"), d("2024-12-31"), 10_000.0);
        let outcome = simulate(&prices, &rates, &params).unwrap();

        let summary = Summary::compute(&outcome.ledger, params.monthly_contribution);
        let last = outcome.ledger.last().unwrap();

        assert_eq!(summary.months, 2);
        assert_eq!(summary.first_date, Some(d("2024-01-02")));
        assert_eq!(summary.last_date, Some(d("2024-02-01")));
        assert_relative_eq!(summary.total_invested, 20_000.0);
        assert_relative_eq!(summary.final_value, last.portfolio_value_local);
        assert_relative_eq!(summary.total_shares, last.total_shares);
        assert_relative_eq!(summary.profit, last.portfolio_value_local - 20_000.0);
        assert_relative_eq!(summary.roi, summary.profit / 20_000.0);
        assert_relative_eq!(summary.total_commission, 6.0);
    }
}
