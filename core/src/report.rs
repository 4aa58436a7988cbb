//! Scenario reports: a text layout, printed onto US-letter PDF pages.
//!
//! The renderer only formats what is already on the `Scenario`; it never
//! recomputes anything.

use crate::{
    error::{RoiError, RoiResult},
    scenario::Scenario,
    types::ScenarioId,
};
use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const REPORT_TITLE: &str = "Invoicing ROI Simulation Report";

const PAGE_WIDTH: Mm = Mm(215.9);
const PAGE_HEIGHT: Mm = Mm(279.4);
const MARGIN_MM: f32 = 20.0;
const TITLE_PT: f32 = 16.0;
const BODY_PT: f32 = 10.0;
const LINE_MM: f32 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub scenario_id: ScenarioId,
    pub email: String,
}

impl ReportRequest {
    pub fn validate(&self) -> RoiResult<()> {
        if is_plausible_email(&self.email) {
            Ok(())
        } else {
            Err(RoiError::validation(
                "email",
                format!("'{}' is not a valid email address", self.email),
            ))
        }
    }
}

/// One `@`, a non-empty local part, and a dotted domain with no empty labels.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

pub fn render_report(scenario: &Scenario, email: &str, generated_at: DateTime<Utc>) -> String {
    let input = scenario.input();
    let output = scenario.output();
    let roi = percent_or_na(output.roi_percentage);
    let payback = output
        .payback_months
        .map(|m| format!("{m:.2} months"))
        .unwrap_or_else(|| "N/A".to_string());

    let mut lines = Vec::new();
    lines.push(REPORT_TITLE.to_string());
    lines.push("=".repeat(REPORT_TITLE.len()));
    lines.push(String::new());
    lines.push(format!("Scenario: {}", scenario.name()));
    lines.push(format!("Report generated for: {email}"));
    lines.push(format!("Generated at: {}", generated_at.format("%Y-%m-%d %H:%M UTC")));
    lines.push(String::new());

    lines.push("Key Results Summary".to_string());
    lines.push(row("Metric", "Value"));
    lines.push(row(
        "Total Net Savings",
        &format!(
            "{} (over {} months)",
            format_money(output.net_savings),
            input.time_horizon_months
        ),
    ));
    lines.push(row("Return on Investment (ROI)", &roi));
    lines.push(row("Monthly Savings", &format_money(output.monthly_savings)));
    lines.push(row("Payback Period", &payback));
    lines.push(String::new());

    lines.push("Detailed Breakdown".to_string());
    lines.push("Inputs".to_string());
    lines.push(row(
        "  Monthly Invoice Volume",
        &group_thousands(&input.monthly_invoice_volume.to_string()),
    ));
    lines.push(row("  AP Staff Count", &input.num_ap_staff.to_string()));
    lines.push(row(
        "  Avg. Hours per Invoice (Manual)",
        &input.avg_hours_per_invoice.to_string(),
    ));
    lines.push(row("  AP Staff Hourly Wage", &format_money(input.hourly_wage)));
    lines.push(row("  Manual Error Rate", &format!("{}%", input.error_rate_manual)));
    lines.push(row("  Avg. Cost per Error", &format_money(input.error_cost)));
    lines.push(row(
        "  Implementation Cost",
        &format_money(input.one_time_implementation_cost),
    ));
    lines.push(row(
        "  Time Horizon",
        &format!("{} months", input.time_horizon_months),
    ));
    lines.push("Outputs".to_string());
    lines.push(row("  Cumulative Savings", &format_money(output.cumulative_savings)));
    lines.push(row("  Net Savings", &format_money(output.net_savings)));
    lines.push(row("  Monthly Savings", &format_money(output.monthly_savings)));
    lines.push(row(
        "  Payback Period (Months)",
        &output
            .payback_months
            .map(|m| format!("{m:.2}"))
            .unwrap_or_else(|| "N/A".to_string()),
    ));
    lines.push(row("  ROI", &roi));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Lay the text report out in Courier, starting a new page when the
/// current one is full. The title line is set larger.
pub fn render_pdf(
    scenario: &Scenario,
    email: &str,
    generated_at: DateTime<Utc>,
) -> RoiResult<Vec<u8>> {
    let text = render_report(scenario, email, generated_at);
    let (doc, page, layer) = PdfDocument::new(REPORT_TITLE, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Courier).map_err(pdf_error)?;
    let title_font = doc
        .add_builtin_font(BuiltinFont::CourierBold)
        .map_err(pdf_error)?;

    let top = PAGE_HEIGHT.0 - MARGIN_MM;
    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = top;
    for (i, line) in text.lines().enumerate() {
        if y < MARGIN_MM {
            let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
            current = doc.get_page(page).get_layer(layer);
            y = top;
        }
        if i == 0 {
            current.use_text(line, TITLE_PT, Mm(MARGIN_MM), Mm(y), &title_font);
            y -= LINE_MM * 2.0;
        } else {
            if !line.is_empty() {
                current.use_text(line, BODY_PT, Mm(MARGIN_MM), Mm(y), &font);
            }
            y -= LINE_MM;
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn pdf_error(e: impl std::fmt::Debug) -> RoiError {
    RoiError::Other(anyhow::anyhow!("PDF rendering failed: {e:?}"))
}

/// Write the report to `{reports_dir}/{safe_name}_{id}.pdf` and return the path.
pub fn write_report(
    scenario: &Scenario,
    email: &str,
    reports_dir: impl AsRef<Path>,
) -> RoiResult<PathBuf> {
    let dir = reports_dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(report_file_name(scenario));
    std::fs::write(&path, render_pdf(scenario, email, Utc::now())?)?;
    Ok(path)
}

pub fn report_file_name(scenario: &Scenario) -> String {
    format!("{}_{}.pdf", safe_file_stem(scenario.name()), scenario.id())
}

/// Keep alphanumerics, spaces and underscores; drop trailing whitespace.
fn safe_file_stem(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    kept.trim_end().to_string()
}

fn row(label: &str, value: &str) -> String {
    format!("{label:<34}{value}")
}

fn percent_or_na(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}%"))
        .unwrap_or_else(|| "N/A".to_string())
}

/// `$1,234.56`, with a leading minus for negative amounts.
pub fn format_money(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${}.{cents}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_is_grouped_and_signed() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(999.5), "$999.50");
        assert_eq!(format_money(23375.0), "$23,375.00");
        assert_eq!(format_money(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_money(-5000.0), "-$5,000.00");
        assert_eq!(format_money(-0.001), "$0.00");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("100"), "100");
        assert_eq!(group_thousands("-1234567"), "-1,234,567");
    }

    #[test]
    fn file_stem_strips_punctuation_and_trailing_space() {
        assert_eq!(safe_file_stem("Q3 pilot: v2!"), "Q3 pilot v2");
        assert_eq!(safe_file_stem("north_region  "), "north_region");
        assert_eq!(safe_file_stem("../../etc/passwd"), "etcpasswd");
    }

    #[test]
    fn email_shape() {
        assert!(is_plausible_email("ap.lead@example.com"));
        assert!(!is_plausible_email("ap.lead@example"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("a@b@example.com"));
        assert!(!is_plausible_email("a b@example.com"));
        assert!(!is_plausible_email("a@example..com"));
    }
}
