//! Console output formatting
//!
//! Provides formatted console output for probe results.

use crate::config::{ProbeRun, RunStatus};

/// Print probe results to console in a human-readable format
pub fn print_results(run: &ProbeRun) {
    let report = &run.outcome.report;

    println!();
    println!("╔═══════════════════════════════════════════════════════════════════════════════╗");
    println!("║                              PROBE RESULTS                                    ║");
    println!("╚═══════════════════════════════════════════════════════════════════════════════╝");
    println!();

    let (status_icon, status_color) = match run.status() {
        RunStatus::Passed => ("✓", "\x1b[32m"),
        RunStatus::Violation => ("✗", "\x1b[31m"),
        RunStatus::Error => ("!", "\x1b[33m"),
    };
    let reset = "\x1b[0m";

    println!("┌───────────────────────────────────────────────────────────────────────────────┐");
    println!("│ Linker namespace accessibility");
    println!("├───────────────────────────────────────────────────────────────────────────────┤");
    println!(
        "│ Status:      {}{} {}{}",
        status_color,
        status_icon,
        run.status().as_str().to_uppercase(),
        reset
    );
    let roots: Vec<String> = run
        .policy
        .root_paths()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    println!("│ Roots:       {}", roots.join(", "));
    println!(
        "│ Allow-list:  {} public, {} vendor",
        run.policy.public_libraries().len(),
        run.policy.public_vendor_libraries().len()
    );

    if let Some(reason) = run.reason() {
        println!(
            "├───────────────────────────────────────────────────────────────────────────────┤"
        );
        println!("│ Failure:");
        for line in wrap(&reason, 70) {
            println!("│   {}", line);
        }
    }

    println!("└───────────────────────────────────────────────────────────────────────────────┘");
    println!();

    println!("╔═══════════════════════════════════════════════════════════════════════════════╗");
    println!("║                                 SUMMARY                                       ║");
    println!("╠═══════════════════════════════════════════════════════════════════════════════╣");
    println!("║                                                                               ║");
    println!(
        "║   Directories:       {:5}                                                    ║",
        report.directories.len()
    );
    println!(
        "║   Libraries checked: {:5}                                                    ║",
        report.libraries_checked()
    );
    println!("║   \x1b[32mAccessible:\x1b[0m        {:5}                                                    ║", report.accessible.len());
    println!("║   \x1b[32mInaccessible:\x1b[0m      {:5}                                                    ║", report.inaccessible);
    println!(
        "║   Skipped:           {:5}                                                    ║",
        report.skipped.len()
    );
    println!("║                                                                               ║");
    println!("╚═══════════════════════════════════════════════════════════════════════════════╝");
    println!();
}

/// Split text into lines of at most `width` characters
fn wrap(text: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(width.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_splits_long_reasons() {
        let lines = wrap(&"x".repeat(150), 70);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 70);
        assert_eq!(lines[2].len(), 10);
    }

    #[test]
    fn wrap_keeps_short_text() {
        assert_eq!(wrap("ok", 70), vec!["ok"]);
        assert_eq!(wrap("", 70), vec![""]);
    }
}
