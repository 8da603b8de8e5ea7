use std::time::Duration;

use glean_core::{ExtractedArticle, ExtractionReport, Provenance, StrategyReport};
use owo_colors::OwoColorize;

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Glean".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Extract clean article records from web pages\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a dimmed label with a highlighted value
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.to_string().bright_white());
}

/// Print timing information with color coding
fn print_timing(label: &str, duration: Duration, note: &str) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);

    if ms < 50.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, note.dimmed());
    } else if ms < 100.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, note.bright_yellow());
    } else {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, note.bright_red());
    }
}

fn print_strategy(label: &str, report: &StrategyReport) {
    let note = if report.contributed { "contributed" } else { "no contribution" };
    print_timing(label, report.elapsed, note);
}

fn print_provenance(provenance: &Provenance) {
    for (field, strategy) in [
        ("title", provenance.title),
        ("content", provenance.content),
        ("author", provenance.author),
        ("date", provenance.date),
        ("source", provenance.source),
    ] {
        print_field(field, strategy);
    }
}

/// Print the field provenance and per-strategy timing summary
pub fn print_report(article: &ExtractedArticle, report: &ExtractionReport, total: Duration) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Field Sources".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_provenance(&report.provenance);
    print_field("images", article.images.len());
    print_field("words", article.word_count());

    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Timing Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_strategy("Structural", &report.structural);
    print_strategy("Selector", &report.selector);
    eprintln!("  {} {:>8.2}ms\n", format!("{}:", "Total").bold().dimmed(), total.as_secs_f64() * 1000.0);
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
