//! Report generation port trait.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::domain::error::FxdcaError;
use crate::domain::simulator::{SimulationOutcome, SimulationParams};
use crate::domain::snapshot::HoldingsSnapshot;
use crate::domain::summary::Summary;

/// Presentation settings read from the `[report]` and `[data]` sections.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub title: String,
    pub price_symbol: String,
    pub rate_symbol: String,
    pub local_currency: String,
    pub foreign_currency: String,
    pub recent_rows: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: "Monthly DCA backtest".to_string(),
            price_symbol: "QQQ".to_string(),
            rate_symbol: "TWD=X".to_string(),
            local_currency: "TWD".to_string(),
            foreign_currency: "USD".to_string(),
            recent_rows: 24,
        }
    }
}

/// Everything a report needs about one run.
pub struct ReportData<'a> {
    pub outcome: &'a SimulationOutcome,
    pub params: &'a SimulationParams,
    pub summary: &'a Summary,
    pub snapshot: Option<&'a HoldingsSnapshot>,
    /// Shown instead of the snapshot panel when `snapshot` is `None`.
    pub snapshot_location: String,
    pub settings: &'a ReportSettings,
    pub generated_at: NaiveDateTime,
}

/// Port for writing simulation reports into an output directory.
pub trait ReportPort {
    /// Writes the report and returns the path of the file written.
    fn write(&self, report: &ReportData, output_dir: &Path) -> Result<PathBuf, FxdcaError>;
}
