//! Upload, merge and validate presentation.

use crate::config::ValidationError;
use crate::ledger::MergeOutcome;
use crate::upload::BatchReport;
use owo_colors::OwoColorize;

pub fn format_batch_report(report: &BatchReport) -> String {
    let mut output = String::new();
    for file in &report.stored {
        let renamed = if file.stored_name != file.original_name {
            format!(" (stored as {})", file.stored_name)
        } else {
            String::new()
        };
        output.push_str(&format!(
            "  {} {}{}\n",
            "stored".green(),
            file.original_name,
            renamed
        ));
    }
    for file in &report.failed {
        output.push_str(&format!("  {} {}: {}\n", "failed".red(), file.name, file.error));
    }
    match (&report.publish, &report.publish_error) {
        (_, Some(error)) => output.push_str(&format!(
            "\n{} {} stored file(s) are not in the ledger: {}",
            "Ledger update failed, please retry.".red(),
            report.stored.len(),
            error
        )),
        (Some(publish), None) => {
            output.push_str(&format!(
                "\nLedger {} updated: {} added, {} rows total",
                publish.path, publish.added, publish.total_rows
            ));
            if publish.attempts > 1 {
                output.push_str(&format!(" ({} attempts)", publish.attempts));
            }
        }
        (None, None) => output.push_str("\nNo file was stored; ledger unchanged"),
    }
    output
}

pub fn format_merge_summary(path: &str, outcome: &MergeOutcome) -> String {
    let mut output = format!(
        "Merged into {}: {} rows ({} existing)",
        path, outcome.total_rows, outcome.existing_rows
    );
    for reason in &outcome.degraded {
        output.push_str(&format!("\n  {} {}", "note:".yellow(), reason));
    }
    output
}

pub fn format_validation_errors(errors: &[ValidationError]) -> String {
    let mut output = format!("Configuration has {} problem(s):", errors.len());
    for error in errors {
        output.push_str(&format!("\n  - {}", error));
    }
    output
}
