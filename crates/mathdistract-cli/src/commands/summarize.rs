//! The `mathdistract summarize` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use mathdistract_core::report::SessionReport;

pub fn execute(report_path: PathBuf) -> Result<()> {
    let report = SessionReport::load_json(&report_path)?;
    println!(
        "Session {} ({})",
        report.id,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    print_summary(&report);
    Ok(())
}

/// Print per-set statistics and session totals.
pub fn print_summary(report: &SessionReport) {
    let mut table = Table::new();
    table.set_header(vec![
        "Set",
        "Presented",
        "Correct",
        "No response",
        "Accuracy",
        "Mean RT",
        "Rest",
    ]);

    for set in &report.summary.per_set {
        let rest = match (set.rest_shown, set.battery_exhausted) {
            (_, true) => "exhausted",
            (true, false) => "yes",
            (false, false) => "no",
        };
        table.add_row(vec![
            Cell::new(set.trial),
            Cell::new(set.presented),
            Cell::new(set.correct),
            Cell::new(set.no_response),
            Cell::new(format!("{:.1}%", set.accuracy * 100.0)),
            Cell::new(format_rt(set.mean_rt_ms)),
            Cell::new(rest),
        ]);
    }

    let total = &report.summary;
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(total.presented),
        Cell::new(total.correct),
        Cell::new(total.no_response),
        Cell::new(format!("{:.1}%", total.accuracy * 100.0)),
        Cell::new(format_rt(total.mean_rt_ms)),
        Cell::new(""),
    ]);

    println!("{table}");
}

fn format_rt(ms: Option<f64>) -> String {
    ms.map(|ms| format!("{ms:.0}ms"))
        .unwrap_or_else(|| "-".to_string())
}
