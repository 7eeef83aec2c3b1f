//! DCA simulation engine.
//!
//! Runs one simulation over a price series and an exchange-rate series:
//!
//! 1. price availability check
//! 2. rate alignment (forward fill, fallback when the feed is missing)
//! 3. restriction to `[start_date, end_date]`
//! 4. purchase date selection
//! 5. per-period conversion, fees and share accumulation
//!
//! Data gaps never fail a run. They end it early with an empty ledger or are
//! patched with the fallback rate, and are reported as [`SimulationWarning`]s.

use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, warn};

use crate::domain::cadence::{select_dates, Cadence};
use crate::domain::cost_model::CostModel;
use crate::domain::error::FxdcaError;
use crate::domain::ledger::{Ledger, PeriodRecord};
use crate::domain::series::{forward_fill, TimeSeries};

/// Rate used when the rate feed is unavailable and nothing overrides it.
pub const DEFAULT_FALLBACK_RATE: f64 = 32.0;

/// Rates below this are treated as inverted quotes.
pub const DEFAULT_MIN_PLAUSIBLE_RATE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Local-currency amount invested each period.
    pub monthly_contribution: f64,
    pub cadence: Cadence,
    pub cost_model: CostModel,
    pub fallback_rate: f64,
    pub min_plausible_rate: f64,
}

impl SimulationParams {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, monthly_contribution: f64) -> Self {
        Self {
            start_date,
            end_date,
            monthly_contribution,
            cadence: Cadence::PeriodStart,
            cost_model: CostModel::default(),
            fallback_rate: DEFAULT_FALLBACK_RATE,
            min_plausible_rate: DEFAULT_MIN_PLAUSIBLE_RATE,
        }
    }

    pub fn validate(&self) -> Result<(), FxdcaError> {
        if !(self.monthly_contribution.is_finite() && self.monthly_contribution > 0.0) {
            return Err(FxdcaError::invalid_configuration(
                "monthly_contribution",
                self.monthly_contribution.to_string(),
                "must be a positive number",
            ));
        }
        if !(self.fallback_rate.is_finite() && self.fallback_rate > 0.0) {
            return Err(FxdcaError::invalid_configuration(
                "fallback_rate",
                self.fallback_rate.to_string(),
                "must be a positive number",
            ));
        }
        if !(self.min_plausible_rate.is_finite() && self.min_plausible_rate >= 0.0) {
            return Err(FxdcaError::invalid_configuration(
                "min_plausible_rate",
                self.min_plausible_rate.to_string(),
                "must be a non-negative number",
            ));
        }
        if self.fallback_rate < self.min_plausible_rate {
            return Err(FxdcaError::invalid_configuration(
                "fallback_rate",
                self.fallback_rate.to_string(),
                format!(
                    "must not be below min_plausible_rate ({})",
                    self.min_plausible_rate
                ),
            ));
        }
        Ok(())
    }
}

/// A data-quality degradation met during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationWarning {
    /// The price series had no usable observation.
    MissingPriceFeed { label: String },
    /// The rate series had no usable observation; every date used the fallback.
    RateFeedMissing { label: String, fallback_rate: f64 },
    /// Some dates in range precede the first rate observation.
    RateGap {
        label: String,
        dates: usize,
        first_date: NaiveDate,
        fallback_rate: f64,
    },
    /// A purchase-date rate fell below the plausibility bound.
    ImplausibleRate {
        date: NaiveDate,
        observed: f64,
        bound: f64,
        fallback_rate: f64,
    },
    NoTradingDates { start: NaiveDate, end: NaiveDate },
    /// The holdings snapshot's rate override fell below the plausibility bound
    /// and was not used as the fallback.
    ImplausibleOverride {
        observed: f64,
        bound: f64,
        fallback_rate: f64,
    },
}

impl fmt::Display for SimulationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationWarning::MissingPriceFeed { label } => write!(
                f,
                "price feed {label} returned no usable data; the ledger is empty"
            ),
            SimulationWarning::RateFeedMissing {
                label,
                fallback_rate,
            } => write!(
                f,
                "rate feed {label} returned no usable data; using fallback rate {fallback_rate} for every date"
            ),
            SimulationWarning::RateGap {
                label,
                dates,
                first_date,
                fallback_rate,
            } => write!(
                f,
                "rate feed {label} has no observation for {dates} date(s) starting {first_date}; using fallback rate {fallback_rate}"
            ),
            SimulationWarning::ImplausibleRate {
                date,
                observed,
                bound,
                fallback_rate,
            } => write!(
                f,
                "rate {observed} on {date} is below {bound} and looks inverted; using fallback rate {fallback_rate} for this period"
            ),
            SimulationWarning::NoTradingDates { start, end } => {
                write!(f, "no trading dates in range {start} to {end}")
            }
            SimulationWarning::ImplausibleOverride {
                observed,
                bound,
                fallback_rate,
            } => write!(
                f,
                "snapshot fx_rate_override {observed} is below {bound} and looks inverted; ignored in favour of fallback rate {fallback_rate}"
            ),
        }
    }
}

/// Result of one run: the ledger plus warnings in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationOutcome {
    pub ledger: Ledger,
    pub warnings: Vec<SimulationWarning>,
}

impl SimulationOutcome {
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    fn degraded(warning: SimulationWarning, mut warnings: Vec<SimulationWarning>) -> Self {
        warn!("{warning}");
        warnings.push(warning);
        Self {
            ledger: Ledger::new(),
            warnings,
        }
    }
}

/// Price and rate for one date after alignment.
struct AlignedPoint {
    date: NaiveDate,
    price: f64,
    rate: Option<f64>,
}

/// Runs the simulation.
///
/// Returns `InvalidConfiguration` if `params` fail validation; this happens
/// before either series is read. Every data problem is reported through
/// [`SimulationOutcome::warnings`] instead.
pub fn simulate(
    prices: &TimeSeries,
    rates: &TimeSeries,
    params: &SimulationParams,
) -> Result<SimulationOutcome, FxdcaError> {
    params.validate()?;

    let mut warnings = Vec::new();

    let usable_prices = prices.usable();
    if usable_prices.is_empty() {
        return Ok(SimulationOutcome::degraded(
            SimulationWarning::MissingPriceFeed {
                label: prices.label().to_string(),
            },
            warnings,
        ));
    }

    let price_index: Vec<NaiveDate> = usable_prices.keys().copied().collect();
    let usable_rates = rates.usable();
    let rate_feed_missing = usable_rates.is_empty();
    if rate_feed_missing {
        let warning = SimulationWarning::RateFeedMissing {
            label: rates.label().to_string(),
            fallback_rate: params.fallback_rate,
        };
        warn!("{warning}");
        warnings.push(warning);
    }
    // With no observations every date stays `None` and takes the fallback below.
    let aligned_rates = forward_fill(&price_index, &usable_rates);

    let in_range: Vec<AlignedPoint> = usable_prices
        .iter()
        .zip(aligned_rates)
        .filter(|((date, _), _)| **date >= params.start_date && **date <= params.end_date)
        .map(|((&date, &price), rate)| AlignedPoint { date, price, rate })
        .collect();

    let gaps: Vec<NaiveDate> = in_range
        .iter()
        .filter(|p| p.rate.is_none())
        .map(|p| p.date)
        .collect();
    if let Some(&first_date) = gaps.first().filter(|_| !rate_feed_missing) {
        let warning = SimulationWarning::RateGap {
            label: rates.label().to_string(),
            dates: gaps.len(),
            first_date,
            fallback_rate: params.fallback_rate,
        };
        warn!("{warning}");
        warnings.push(warning);
    }

    let dates: Vec<NaiveDate> = in_range.iter().map(|p| p.date).collect();
    let purchase_dates = select_dates(&dates, params.start_date, params.end_date, params.cadence);
    if purchase_dates.is_empty() {
        return Ok(SimulationOutcome::degraded(
            SimulationWarning::NoTradingDates {
                start: params.start_date,
                end: params.end_date,
            },
            warnings,
        ));
    }
    debug!(
        periods = purchase_dates.len(),
        cadence = %params.cadence,
        "selected purchase dates"
    );

    let mut ledger = Ledger::new();
    let mut total_shares = 0.0;
    let mut points = in_range.iter();

    for date in purchase_dates {
        // Purchase dates are a chronological subsequence of `in_range`.
        let Some(point) = points.find(|p| p.date == date) else {
            continue;
        };

        let (rate, rate_fallback) = match point.rate {
            None => (params.fallback_rate, true),
            Some(observed) if observed < params.min_plausible_rate => {
                let warning = SimulationWarning::ImplausibleRate {
                    date,
                    observed,
                    bound: params.min_plausible_rate,
                    fallback_rate: params.fallback_rate,
                };
                warn!("{warning}");
                warnings.push(warning);
                (params.fallback_rate, true)
            }
            Some(observed) => (observed, false),
        };

        let record = purchase(
            date,
            rate,
            point.price,
            params,
            &mut total_shares,
            rate_fallback,
        );
        debug!(
            %date,
            rate,
            price = point.price,
            shares = record.shares_bought,
            total_shares,
            "period simulated"
        );
        ledger.push(record);
    }

    Ok(SimulationOutcome { ledger, warnings })
}

fn purchase(
    date: NaiveDate,
    rate: f64,
    price: f64,
    params: &SimulationParams,
    total_shares: &mut f64,
    rate_fallback: bool,
) -> PeriodRecord {
    let spread = params.cost_model.spread();
    let commission = params.cost_model.commission();

    let gross_foreign = params.monthly_contribution / rate;
    let net_after_spread = gross_foreign * (1.0 - spread);
    let net_after_fees = (net_after_spread - commission).max(0.0);
    let shares_bought = net_after_fees / price;
    *total_shares += shares_bought;

    PeriodRecord {
        date,
        rate,
        price,
        contribution_local: params.monthly_contribution,
        gross_foreign,
        spread,
        net_after_spread,
        commission,
        net_after_fees,
        shares_bought,
        total_shares: *total_shares,
        portfolio_value_local: *total_shares * price * rate,
        rate_fallback,
    }
}
