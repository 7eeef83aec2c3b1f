//! Inline SVG chart of portfolio value against money paid in.

use crate::domain::ledger::PeriodRecord;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 300.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

pub const VALUE_STROKE: &str = "#2563eb";
pub const INVESTED_STROKE: &str = "#9ca3af";

/// Rounds to whole units with thousands separators, e.g. `1,234,567`.
pub fn fmt_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// Renders the portfolio value line and a dashed cumulative-contribution line.
/// Returns an empty string for an empty ledger.
pub fn generate_value_svg(records: &[PeriodRecord], currency: &str) -> String {
    if records.is_empty() {
        return String::new();
    }

    let invested: Vec<f64> = records
        .iter()
        .scan(0.0, |total, r| {
            *total += r.contribution_local;
            Some(*total)
        })
        .collect();

    let max_value = records
        .iter()
        .map(|r| r.portfolio_value_local)
        .chain(invested.iter().copied())
        .fold(f64::NEG_INFINITY, f64::max);
    let min_value = 0.0;
    let range = (max_value - min_value).max(1.0);

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

    let x_scale =
        |i: usize| -> f64 { MARGIN_LEFT + (i as f64 / (records.len() - 1).max(1) as f64) * plot_width };
    let y_scale =
        |v: f64| -> f64 { MARGIN_TOP + plot_height - ((v - min_value) / range) * plot_height };

    let path = |values: &mut dyn Iterator<Item = f64>| -> String {
        let mut data = String::new();
        for (i, v) in values.enumerate() {
            let cmd = if i == 0 { "M" } else { " L" };
            data.push_str(&format!("{} {:.1} {:.1}", cmd, x_scale(i), y_scale(v)));
        }
        data
    };
    let value_path = path(&mut records.iter().map(|r| r.portfolio_value_local));
    let invested_path = path(&mut invested.iter().copied());

    let start_date = records[0].date;
    let end_date = records[records.len() - 1].date;
    let mid_date = records[records.len() / 2].date;

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"15\" text-anchor=\"end\" font-size=\"12\" fill=\"#666\">Value ({})</text>\n",
        CHART_WIDTH - MARGIN_RIGHT,
        currency
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    for (y, label) in [
        (MARGIN_TOP + 5.0, max_value),
        (MARGIN_TOP + plot_height / 2.0, (max_value + min_value) / 2.0),
        (CHART_HEIGHT - MARGIN_BOTTOM - 5.0, min_value),
    ] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            MARGIN_LEFT - 5.0,
            y,
            fmt_thousands(label)
        ));
    }
    for (x, date) in [
        (MARGIN_LEFT, start_date),
        (MARGIN_LEFT + plot_width / 2.0, mid_date),
        (CHART_WIDTH - MARGIN_RIGHT, end_date),
    ] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            x, CHART_HEIGHT, date
        ));
    }
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\" stroke-dasharray=\"4 3\"/>\n",
        invested_path, INVESTED_STROKE
    ));
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
        value_path, VALUE_STROKE
    ));
    svg.push_str("</svg>");
    svg
}
