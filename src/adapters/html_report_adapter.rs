//! HTML report adapter implementing ReportPort.
//!
//! Renders `index.html` with Askama: headline figures, the holdings snapshot
//! panel, run parameters, warnings, an inline SVG chart and the most recent
//! ledger rows.

use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;

use crate::adapters::chart_svg::{fmt_thousands, generate_value_svg};
use crate::domain::error::FxdcaError;
use crate::domain::ledger::PeriodRecord;
use crate::domain::snapshot::HoldingsSnapshot;
use crate::ports::report_port::{ReportData, ReportPort};

struct ParamRow {
    label: String,
    value: String,
}

struct LedgerRow {
    date: String,
    rate: String,
    price: String,
    net_after_fees: String,
    shares_bought: String,
    total_shares: String,
    value: String,
    fallback: bool,
}

struct PositionRow {
    symbol: String,
    name: String,
    shares: String,
    avg_cost: String,
    cost: String,
    value: String,
}

struct SnapshotView {
    as_of: String,
    source: String,
    positions: Vec<PositionRow>,
    total_cost: String,
    market_value: String,
    pnl: String,
    pnl_pct: String,
    override_rate: Option<String>,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate {
    title: String,
    price_symbol: String,
    rate_symbol: String,
    local_currency: String,
    foreign_currency: String,
    months: usize,
    period: String,
    total_invested: String,
    final_value: String,
    profit: String,
    roi: String,
    total_shares: String,
    total_commission: String,
    params: Vec<ParamRow>,
    snapshot: Option<SnapshotView>,
    snapshot_location: String,
    warnings: Vec<String>,
    chart_svg: String,
    recent_rows: Vec<LedgerRow>,
    generated_at: String,
}

fn fmt_pct(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

fn ledger_row(r: &PeriodRecord) -> LedgerRow {
    LedgerRow {
        date: r.date.to_string(),
        rate: format!("{:.4}", r.rate),
        price: format!("{:.2}", r.price),
        net_after_fees: format!("{:.2}", r.net_after_fees),
        shares_bought: format!("{:.6}", r.shares_bought),
        total_shares: format!("{:.6}", r.total_shares),
        value: fmt_thousands(r.portfolio_value_local),
        fallback: r.rate_fallback,
    }
}

fn snapshot_view(snapshot: &HoldingsSnapshot, min_plausible_rate: f64) -> SnapshotView {
    let totals = snapshot.totals();
    SnapshotView {
        as_of: snapshot.as_of.to_string(),
        source: snapshot.source.clone(),
        positions: snapshot
            .positions
            .iter()
            .map(|p| PositionRow {
                symbol: p.symbol.clone(),
                name: p.name.clone(),
                shares: format!("{:.4}", p.shares),
                avg_cost: format!("{:.2}", p.avg_cost),
                cost: fmt_thousands(p.total_cost_local),
                value: fmt_thousands(p.market_value_local),
            })
            .collect(),
        total_cost: fmt_thousands(totals.total_cost_local),
        market_value: fmt_thousands(totals.market_value_local),
        pnl: fmt_thousands(totals.pnl_local),
        pnl_pct: fmt_pct(totals.pnl_pct),
        override_rate: snapshot
            .plausible_override_rate(min_plausible_rate)
            .map(|r| format!("{:.4}", r)),
    }
}

fn param_rows(report: &ReportData) -> Vec<ParamRow> {
    let p = report.params;
    let s = report.settings;
    let row = |label: &str, value: String| ParamRow {
        label: label.to_string(),
        value,
    };
    vec![
        row("Security", s.price_symbol.clone()),
        row("Exchange rate", s.rate_symbol.clone()),
        row("Range", format!("{} to {}", p.start_date, p.end_date)),
        row(
            "Monthly contribution",
            format!("{} {}", fmt_thousands(p.monthly_contribution), s.local_currency),
        ),
        row(
            "Cadence",
            format!("{} ({})", p.cadence, p.cadence.describe()),
        ),
        row(
            "Commission",
            format!(
                "{} {} per purchase ({})",
                p.cost_model.commission(),
                s.foreign_currency,
                p.cost_model.commission_tier
            ),
        ),
        row(
            "FX spread",
            format!(
                "{} one-way ({})",
                fmt_pct(p.cost_model.spread()),
                p.cost_model.spread_tier
            ),
        ),
        row("Fallback rate", format!("{:.4}", p.fallback_rate)),
        row("Minimum plausible rate", format!("{:.4}", p.min_plausible_rate)),
    ]
}

pub struct HtmlReportAdapter;

impl HtmlReportAdapter {
    pub const FILE_NAME: &'static str = "index.html";

    pub fn new() -> Self {
        Self
    }

    fn render(&self, report: &ReportData) -> Result<String, FxdcaError> {
        let summary = report.summary;
        let settings = report.settings;
        let ledger = &report.outcome.ledger;

        let period = match (summary.first_date, summary.last_date) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "no purchases".to_string(),
        };

        let template = ReportTemplate {
            title: settings.title.clone(),
            price_symbol: settings.price_symbol.clone(),
            rate_symbol: settings.rate_symbol.clone(),
            local_currency: settings.local_currency.clone(),
            foreign_currency: settings.foreign_currency.clone(),
            months: summary.months,
            period,
            total_invested: fmt_thousands(summary.total_invested),
            final_value: fmt_thousands(summary.final_value),
            profit: fmt_thousands(summary.profit),
            roi: fmt_pct(summary.roi),
            total_shares: format!("{:.6}", summary.total_shares),
            total_commission: format!("{:.2}", summary.total_commission),
            params: param_rows(report),
            snapshot: report
                .snapshot
                .map(|s| snapshot_view(s, report.params.min_plausible_rate)),
            snapshot_location: report.snapshot_location.clone(),
            warnings: report.outcome.warning_messages(),
            chart_svg: generate_value_svg(ledger.records(), &settings.local_currency),
            recent_rows: ledger
                .tail(settings.recent_rows)
                .iter()
                .rev()
                .map(ledger_row)
                .collect(),
            generated_at: report.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        };

        template.render().map_err(|e| FxdcaError::Report {
            reason: format!("template render failed: {}", e),
        })
    }
}

impl Default for HtmlReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlReportAdapter {
    fn write(&self, report: &ReportData, output_dir: &Path) -> Result<PathBuf, FxdcaError> {
        let html = self.render(report)?;

        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(Self::FILE_NAME);
        fs::write(&path, html)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::TimeSeries;
    use crate::domain::simulator::{simulate, SimulationOutcome, SimulationParams};
    use crate::domain::snapshot::SnapshotPosition;
    use crate::domain::summary::Summary;
    use crate::ports::report_port::ReportSettings;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_run() -> (SimulationOutcome, SimulationParams) {
        let prices = TimeSeries::from_values(
            "QQQ",
            [
                (d("2024-01-02"), 400.0),
                (d("2024-01-03"), 401.0),
                (d("2024-02-01"), 410.0),
                (d("2024-03-01"), 420.0),
            ],
        );
        let rates = TimeSeries::from_values("TWD=X", [(d("2024-01-02"), 32.0)]);
        let params = SimulationParams::new(d("2024-01-01"), d("2024-03-31"), 10_000.0);
        let outcome = simulate(&prices, &rates, &params).unwrap();
        (outcome, params)
    }

    fn sample_snapshot() -> HoldingsSnapshot {
        HoldingsSnapshot {
            as_of: d("2024-03-29"),
            source: "Sample Broker".to_string(),
            currency: "TWD".to_string(),
            positions: vec![SnapshotPosition {
                symbol: "QQQ".to_string(),
                name: "Invesco QQQ".to_string(),
                shares: 2.25,
                avg_cost: 410.0,
                total_cost_local: 30_000.0,
                market_value_local: 31_500.0,
            }],
            fx_rate_override: Some(31.8),
        }
    }

    fn write_report(snapshot: Option<&HoldingsSnapshot>, settings: &ReportSettings) -> String {
        let (outcome, params) = sample_run();
        let summary = Summary::compute(&outcome.ledger, params.monthly_contribution);
        let report = ReportData {
            outcome: &outcome,
            params: &params,
            summary: &summary,
            snapshot,
            snapshot_location: "actual_snapshot.json".to_string(),
            settings,
            generated_at: d("2024-04-01").and_hms_opt(9, 30, 0).unwrap(),
        };

        let dir = tempdir().unwrap();
        let path = HtmlReportAdapter::new().write(&report, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("index.html"));
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn writes_index_with_summary_and_chart() {
        let html = write_report(None, &ReportSettings::default());
        assert!(html.contains("Monthly DCA backtest"));
        assert!(html.contains("30,000"));
        assert!(html.contains("<svg"));
        assert!(html.contains("stroke=\"#2563eb\""));
        assert!(html.contains("2024-04-01 09:30:00"));
    }

    #[test]
    fn missing_snapshot_shows_location() {
        let html = write_report(None, &ReportSettings::default());
        assert!(html.contains("No holdings snapshot found"));
        assert!(html.contains("actual_snapshot.json"));
    }

    #[test]
    fn snapshot_panel_lists_positions() {
        let snapshot = sample_snapshot();
        let html = write_report(Some(&snapshot), &ReportSettings::default());
        assert!(html.contains("Sample Broker"));
        assert!(html.contains("Invesco QQQ"));
        assert!(html.contains("31,500"));
        assert!(html.contains("5.00%"));
        assert!(html.contains("31.8000"));
        assert!(!html.contains("No holdings snapshot found"));
    }

    #[test]
    fn inverted_override_is_not_shown_as_applied() {
        let snapshot = HoldingsSnapshot {
            fx_rate_override: Some(0.031),
            ..sample_snapshot()
        };
        let html = write_report(Some(&snapshot), &ReportSettings::default());
        assert!(html.contains("Sample Broker"));
        assert!(!html.contains("overridden to"));
    }

    #[test]
    fn params_are_listed() {
        let html = write_report(None, &ReportSettings::default());
        assert!(html.contains("period_start"));
        assert!(html.contains("standard-etf"));
        assert!(html.contains("digital-channel"));
        assert!(html.contains("0.10%"));
    }

    #[test]
    fn recent_rows_are_limited_and_newest_first() {
        let settings = ReportSettings {
            recent_rows: 2,
            ..ReportSettings::default()
        };
        let html = write_report(None, &settings);
        let table = html.split("Recent purchases").nth(1).unwrap();
        assert!(!table.contains("2024-01-02"));
        let march = table.find("2024-03-01").unwrap();
        let feb = table.find("2024-02-01").unwrap();
        assert!(march < feb);
    }

    #[test]
    fn warnings_panel_only_when_degraded() {
        let html = write_report(None, &ReportSettings::default());
        assert!(!html.contains("class=\"warnings\""));

        let (mut outcome, params) = sample_run();
        outcome.warnings.push(crate::domain::simulator::SimulationWarning::NoTradingDates {
            start: d("2024-01-01"),
            end: d("2024-03-31"),
        });
        let summary = Summary::compute(&outcome.ledger, params.monthly_contribution);
        let settings = ReportSettings::default();
        let report = ReportData {
            outcome: &outcome,
            params: &params,
            summary: &summary,
            snapshot: None,
            snapshot_location: String::new(),
            settings: &settings,
            generated_at: d("2024-04-01").and_hms_opt(0, 0, 0).unwrap(),
        };
        let html = HtmlReportAdapter::new().render(&report).unwrap();
        assert!(html.contains("class=\"warnings\""));
        assert!(html.contains("no trading dates in range"));
    }
}
