//! Text summary builder for CLI output.
//!
//! Formats an analysis result into human-readable lines for `--text` mode; the amount
//! formatting is shared with the TUI.

use crate::model::AnalysisResult;
use crate::workflow::SelectionState;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Format a currency amount with thousands separators and at most two decimals,
/// e.g. `1234567.5` -> `1,234,567.5`.
pub(crate) fn format_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

pub(crate) fn build_text_summary(
    selection: &SelectionState,
    result: &AnalysisResult,
) -> TextSummary {
    let m = &result.metrics;
    let b = &m.benchmarking;
    let mut lines = Vec::new();

    let file = result
        .filename
        .as_deref()
        .or(selection.file_name())
        .unwrap_or("-");
    lines.push(format!(
        "File: {file} ({} / {})",
        selection.sector.label(),
        selection.language.label()
    ));
    lines.push(format!("Annual revenue:     ${}", format_amount(m.total_revenue)));
    lines.push(format!("Operating expenses: ${}", format_amount(m.total_expenses)));
    lines.push(format!("Net profit:         ${}", format_amount(m.net_profit)));
    lines.push(format!(
        "Efficiency rating: {} (margin {} vs {} benchmark {})",
        b.status, b.current, b.industry, b.industry_avg
    ));
    lines.push(String::new());
    lines.push(format!("Summary: {}", result.multilingual_summary));
    lines.push(format!("Recommendation: {}", result.recommendation));

    if m.alerts.is_empty() {
        lines.push("Alerts: none".into());
    } else {
        lines.push("Alerts:".into());
        lines.extend(m.alerts.iter().map(|a| format!("  - {a}")));
    }

    TextSummary { lines }
}
