//! Date-keyed observation series and forward-fill alignment.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A labelled, date-ordered series of close-of-day observations.
///
/// Used for both the security price (native currency) and the exchange rate
/// (local-currency units per one foreign unit). A date may carry `None` when
/// the provider reported the date without a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    label: String,
    observations: BTreeMap<NaiveDate, Option<f64>>,
}

/// A value is usable when present, finite and strictly positive.
pub fn is_usable(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl TimeSeries {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            observations: BTreeMap::new(),
        }
    }

    /// Builds a series from raw observations. A repeated date keeps the last value.
    pub fn from_observations<I>(label: impl Into<String>, observations: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
    {
        Self {
            label: label.into(),
            observations: observations.into_iter().collect(),
        }
    }

    pub fn from_values<I>(label: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::from_observations(label, values.into_iter().map(|(d, v)| (d, Some(v))))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn insert(&mut self, date: NaiveDate, value: Option<f64>) {
        self.observations.insert(date, value);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.keys().next_back().copied()
    }

    /// Usable observations only, in date order.
    pub fn usable(&self) -> BTreeMap<NaiveDate, f64> {
        self.observations
            .iter()
            .filter_map(|(&date, value)| value.filter(|v| is_usable(*v)).map(|v| (date, v)))
            .collect()
    }
}

/// Aligns `observations` onto `index`, carrying the most recent observation on
/// or before each index date forward. Index dates that precede the first
/// observation map to `None`.
///
/// `index` must be sorted ascending.
pub fn forward_fill(index: &[NaiveDate], observations: &BTreeMap<NaiveDate, f64>) -> Vec<Option<f64>> {
    let mut pending = observations.iter().peekable();
    let mut carried = None;

    index
        .iter()
        .map(|date| {
            while let Some(&(&obs_date, &value)) = pending.peek() {
                if obs_date > *date {
                    break;
                }
                carried = Some(value);
                pending.next();
            }
            carried
        })
        .collect()
}
