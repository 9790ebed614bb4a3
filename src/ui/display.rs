//! Tables and messages for the terminal front end.

use std::time::{Duration, SystemTime};

use anyhow::{Result, anyhow};
use bytesize::ByteSize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use console::{Term, style};
use figlet_rs::FIGfont;

use aegis::batch::BatchReport;
use aegis::config::APP_NAME;
use aegis::file::{AddResult, DuplicateEntry, ManagedFile};
use aegis::types::Direction;

pub fn clear_screen() -> Result<()> {
    Term::stdout().clear_screen().map_err(|e| anyhow!("failed to clear screen: {e}"))
}

pub fn print_banner() -> Result<()> {
    let font = FIGfont::standard().map_err(|e| anyhow!("failed to load banner font: {e}"))?;
    let figure = font.convert(APP_NAME).ok_or_else(|| anyhow!("failed to render banner"))?;
    println!("{}", style(figure).green().bold());
    Ok(())
}

/// Prints duplicates and rejected candidates from an import.
pub fn show_add_result(result: &AddResult) {
    for duplicate in &result.duplicates {
        println!("{} {}", style("!").yellow(), duplicate_line(duplicate));
    }
    for rejected in &result.rejected {
        println!("{} {}: {}", style("-").dim(), rejected.path.display(), rejected.reason);
    }
}

pub fn show_working_set(files: &[ManagedFile]) {
    if files.is_empty() {
        println!("{}", style("No files in the working set").yellow());
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic).set_header(vec!["No", "Name", "Size", "Modified", "Read-only", "Status"]);

    let now = SystemTime::now();
    for (i, file) in files.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            file.name(),
            ByteSize::b(file.size()).to_string(),
            file.modified().map_or_else(|| "unknown".to_owned(), |t| format_age(now.duration_since(t).unwrap_or_default())),
            if file.is_read_only() { "yes".to_owned() } else { String::new() },
            file.status().to_string(),
        ]);
    }

    println!();
    println!("{} {}", style("✓").green(), style(format!("{} file(s) in the working set:", files.len())).bold());
    println!("{table}");
}

pub fn show_report(direction: Direction, report: &BatchReport) {
    println!();
    println!(
        "{} {}",
        if report.is_clean() { style("✓").green() } else { style("✗").red() },
        style(format!("{} file(s) {}, {} failed, {} skipped", report.succeeded(), direction.past_tense(), report.failed(), report.skipped())).bold()
    );

    if report.was_cancelled() {
        println!("{}", style("Cancelled; remaining files were left untouched").yellow());
    }

    if !report.failures().is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic).set_header(vec!["Failed files"]);
        for failure in report.failures() {
            table.add_row(vec![failure.as_str()]);
        }
        println!("{table}");
    }

    for warning in report.warnings() {
        println!("{} {warning}", style("warning:").yellow());
    }
}

fn duplicate_line(duplicate: &DuplicateEntry) -> String {
    format!("{} already exists as {}", duplicate.existing.name(), duplicate.existing.path().display())
}

/// Coarse "time ago" for the working set table.
fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..60 => "just now".to_owned(),
        60..3_600 => format!("{}m ago", secs / 60),
        3_600..86_400 => format!("{}h ago", secs / 3_600),
        _ => format!("{}d ago", secs / 86_400),
    }
}
