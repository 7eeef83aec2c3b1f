//! Configuration validation.
//!
//! Validates every config field before a simulation runs, reporting the first
//! problem found.

use crate::domain::cadence::Cadence;
use crate::domain::cost_model::{CommissionTier, SpreadTier};
use crate::domain::error::FxdcaError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const SIMULATION: &str = "simulation";
pub const DATA: &str = "data";
pub const REPORT: &str = "report";

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), FxdcaError> {
    validate_simulation_config(config)?;
    validate_report_config(config)?;
    Ok(())
}

pub fn validate_simulation_config(config: &dyn ConfigPort) -> Result<(), FxdcaError> {
    validate_dates(config)?;
    validate_contribution(config)?;
    validate_choices(config)?;
    validate_rates(config)?;
    Ok(())
}

pub fn validate_report_config(config: &dyn ConfigPort) -> Result<(), FxdcaError> {
    let rows = config.get_int(REPORT, "recent_rows", 24);
    if rows < 1 {
        return Err(FxdcaError::ConfigInvalid {
            section: REPORT.to_string(),
            key: "recent_rows".to_string(),
            reason: "recent_rows must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Reads an optional `YYYY-MM-DD` date.
pub fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, FxdcaError> {
    match config.get_string(section, key).filter(|s| !s.trim().is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FxdcaError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", key),
            }),
    }
}

/// Reads an optional number. A value that does not parse is an error rather
/// than a silent default.
pub fn read_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, FxdcaError> {
    match config.get_string(section, key).filter(|s| !s.trim().is_empty()) {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| FxdcaError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("{} must be a number", key),
            }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), FxdcaError> {
    let start_date = read_date(config, SIMULATION, "start_date")?.ok_or_else(|| {
        FxdcaError::ConfigMissing {
            section: SIMULATION.to_string(),
            key: "start_date".to_string(),
        }
    })?;
    let end_date = read_date(config, SIMULATION, "end_date")?;

    if let Some(end_date) = end_date {
        if start_date > end_date {
            return Err(FxdcaError::ConfigInvalid {
                section: SIMULATION.to_string(),
                key: "start_date".to_string(),
                reason: "start_date must not be after end_date".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_contribution(config: &dyn ConfigPort) -> Result<(), FxdcaError> {
    if let Some(value) = read_number(config, SIMULATION, "monthly_contribution")? {
        if !(value.is_finite() && value > 0.0) {
            return Err(FxdcaError::ConfigInvalid {
                section: SIMULATION.to_string(),
                key: "monthly_contribution".to_string(),
                reason: "monthly_contribution must be positive".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_choices(config: &dyn ConfigPort) -> Result<(), FxdcaError> {
    if let Some(s) = config.get_string(SIMULATION, "cadence") {
        s.parse::<Cadence>()?;
    }
    if let Some(s) = config.get_string(SIMULATION, "commission_tier") {
        s.parse::<CommissionTier>()?;
    }
    if let Some(s) = config.get_string(SIMULATION, "spread_tier") {
        s.parse::<SpreadTier>()?;
    }
    Ok(())
}

fn validate_rates(config: &dyn ConfigPort) -> Result<(), FxdcaError> {
    if let Some(value) = read_number(config, SIMULATION, "fallback_rate")? {
        if !(value.is_finite() && value > 0.0) {
            return Err(FxdcaError::ConfigInvalid {
                section: SIMULATION.to_string(),
                key: "fallback_rate".to_string(),
                reason: "fallback_rate must be positive".to_string(),
            });
        }
    }
    if let Some(value) = read_number(config, SIMULATION, "min_plausible_rate")? {
        if !(value.is_finite() && value >= 0.0) {
            return Err(FxdcaError::ConfigInvalid {
                section: SIMULATION.to_string(),
                key: "min_plausible_rate".to_string(),
                reason: "min_plausible_rate must be non-negative".to_string(),
            });
        }
    }
    Ok(())
}
