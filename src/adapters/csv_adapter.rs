//! CSV adapters: series input and ledger output.

use crate::domain::error::FxdcaError;
use crate::domain::ledger::{Ledger, LEDGER_COLUMNS};
use crate::domain::series::TimeSeries;
use crate::ports::data_port::MarketDataPort;
use crate::ports::report_port::{ReportData, ReportPort};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads `<base_path>/<symbol>.csv` files with a `date,close` header.
///
/// Extra columns are ignored. An empty or unparseable close cell is kept as a
/// missing observation.
pub struct CsvSeriesAdapter {
    base_path: PathBuf,
}

impl CsvSeriesAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, FxdcaError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| FxdcaError::DataSource {
            reason: format!("missing {} column", name),
        })
}

impl MarketDataPort for CsvSeriesAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TimeSeries, FxdcaError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| FxdcaError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.trim_start_matches('\u{feff}').as_bytes());
        let headers = rdr.headers().map_err(|e| FxdcaError::DataSource {
            reason: format!("CSV header error: {}", e),
        })?;
        let date_col = column_index(headers, "date")?;
        let close_col = column_index(headers, "close")?;

        let mut series = TimeSeries::new(symbol);

        for result in rdr.records() {
            let record = result.map_err(|e| FxdcaError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).ok_or_else(|| FxdcaError::DataSource {
                reason: "missing date value".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                FxdcaError::DataSource {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let close = match record.get(close_col).map(str::trim) {
                None | Some("") => None,
                Some(s) => match s.parse::<f64>() {
                    Ok(v) => Some(v),
                    Err(_) => {
                        warn!(symbol, %date, value = s, "unparseable close value, treating as missing");
                        None
                    }
                },
            };

            series.insert(date, close);
        }

        debug!(symbol, rows = series.len(), path = %path.display(), "loaded series");
        Ok(series)
    }
}

/// Encodes the ledger as CSV: a header row, then one row per record.
///
/// The header is written even when the ledger is empty.
pub fn ledger_to_csv(ledger: &Ledger) -> Result<Vec<u8>, FxdcaError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let csv_err = |e: csv::Error| FxdcaError::Report {
        reason: format!("CSV write error: {}", e),
    };

    wtr.write_record(LEDGER_COLUMNS).map_err(csv_err)?;
    for record in ledger {
        wtr.write_record(record.to_row()).map_err(csv_err)?;
    }

    wtr.into_inner().map_err(|e| FxdcaError::Report {
        reason: format!("CSV flush error: {}", e),
    })
}

/// Writes `data.csv`, UTF-8 with a byte-order mark so spreadsheet apps pick the encoding.
pub struct CsvLedgerWriter;

impl CsvLedgerWriter {
    pub const FILE_NAME: &'static str = "data.csv";

    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvLedgerWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvLedgerWriter {
    fn write(&self, report: &ReportData, output_dir: &Path) -> Result<PathBuf, FxdcaError> {
        let mut bytes = "\u{feff}".as_bytes().to_vec();
        bytes.extend(ledger_to_csv(&report.outcome.ledger)?);

        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(Self::FILE_NAME);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        fs::write(
            path.join("QQQ.csv"),
            "date,open,close,volume\n\
             2024-01-02,399.0,400.5,1000\n\
             2024-01-03,400.0,,1100\n\
             2024-01-04,401.0,402.25,1200\n",
        )
        .unwrap();
        fs::write(
            path.join("TWD=X.csv"),
            "\u{feff}Date,Close\n2024-01-02,31.2\n2024-01-05,31.4\n",
        )
        .unwrap();
        fs::write(path.join("BAD.csv"), "date,close\n2024-01-02,abc\n").unwrap();
        fs::write(path.join("NOCLOSE.csv"), "date,price\n2024-01-02,1\n").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_series_reads_close_column() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvSeriesAdapter::new(path);

        let series = adapter
            .fetch_series("QQQ", d("2024-01-01"), d("2024-01-31"))
            .unwrap();

        assert_eq!(series.label(), "QQQ");
        assert_eq!(series.len(), 3);
        let usable = series.usable();
        assert_eq!(usable.len(), 2);
        assert_eq!(usable[&d("2024-01-02")], 400.5);
        assert_eq!(usable[&d("2024-01-04")], 402.25);
    }

    #[test]
    fn fetch_series_handles_bom_and_header_case() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvSeriesAdapter::new(path);

        let series = adapter
            .fetch_series("TWD=X", d("2024-01-01"), d("2024-01-31"))
            .unwrap();
        assert_eq!(series.usable().len(), 2);
    }

    #[test]
    fn fetch_series_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvSeriesAdapter::new(path);

        let series = adapter
            .fetch_series("QQQ", d("2024-01-04"), d("2024-01-04"))
            .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.first_date(), Some(d("2024-01-04")));
    }

    #[test]
    fn fetch_series_errors() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvSeriesAdapter::new(path);
        let (start, end) = (d("2024-01-01"), d("2024-01-31"));

        assert!(matches!(
            adapter.fetch_series("XYZ", start, end),
            Err(FxdcaError::DataSource { .. })
        ));
        assert!(adapter.fetch_series("NOCLOSE", start, end).is_err());
    }

    #[test]
    fn unparseable_close_is_missing_observation() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvSeriesAdapter::new(path);

        let series = adapter
            .fetch_series("BAD", d("2024-01-01"), d("2024-01-31"))
            .unwrap();
        assert_eq!(series.len(), 1);
        assert!(series.usable().is_empty());
    }

    #[test]
    fn empty_ledger_csv_has_header_only() {
        let bytes = ledger_to_csv(&Ledger::new()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("date,fx_rate,price,"));
        assert!(text.trim_end().ends_with("rate_fallback"));
    }
}
