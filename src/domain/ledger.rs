//! Per-period purchase records and the ledger that holds them.

use chrono::NaiveDate;

/// Fixed column set of the outbound ledger table, in output order.
pub const LEDGER_COLUMNS: [&str; 13] = [
    "date",
    "fx_rate",
    "price",
    "contribution_local",
    "gross_foreign",
    "fx_oneway_spread",
    "net_after_spread",
    "commission",
    "net_after_fees",
    "shares_bought",
    "total_shares",
    "portfolio_value_local",
    "rate_fallback",
];

/// One simulated purchase. Every intermediate quantity is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodRecord {
    pub date: NaiveDate,
    /// Local-currency units per foreign unit actually used for this period.
    pub rate: f64,
    pub price: f64,
    pub contribution_local: f64,
    pub gross_foreign: f64,
    pub spread: f64,
    pub net_after_spread: f64,
    pub commission: f64,
    pub net_after_fees: f64,
    pub shares_bought: f64,
    pub total_shares: f64,
    pub portfolio_value_local: f64,
    /// The rate came from the fallback rather than the rate feed.
    pub rate_fallback: bool,
}

impl PeriodRecord {
    /// Cells in [`LEDGER_COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.rate.to_string(),
            self.price.to_string(),
            self.contribution_local.to_string(),
            self.gross_foreign.to_string(),
            self.spread.to_string(),
            self.net_after_spread.to_string(),
            self.commission.to_string(),
            self.net_after_fees.to_string(),
            self.shares_bought.to_string(),
            self.total_shares.to_string(),
            self.portfolio_value_local.to_string(),
            self.rate_fallback.to_string(),
        ]
    }
}

/// Ordered sequence of [`PeriodRecord`]s produced by one simulation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    records: Vec<PeriodRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &LEDGER_COLUMNS
    }

    pub(crate) fn push(&mut self, record: PeriodRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[PeriodRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeriodRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&PeriodRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&PeriodRecord> {
        self.records.last()
    }

    /// The most recent `n` records, oldest first.
    pub fn tail(&self, n: usize) -> &[PeriodRecord] {
        let skip = self.records.len().saturating_sub(n);
        &self.records[skip..]
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a PeriodRecord;
    type IntoIter = std::slice::Iter<'a, PeriodRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
