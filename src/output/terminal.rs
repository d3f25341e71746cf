// Colored terminal output for verdicts, feature dumps, and training reports.
//
// This module handles all terminal-specific formatting: colors, alignment.
// The main.rs command functions delegate here.

use colored::Colorize;

use crate::features::{FEATURE_COUNT, FEATURE_NAMES};
use crate::model::{TrainReport, Verdict};

/// Display a classification verdict for one URL.
pub fn display_verdict(url: &str, verdict: &Verdict) {
    println!("\n{}", format!("=== {url} ===").bold());

    let label_str = if verdict.phishing {
        "Phishing".red().bold()
    } else {
        "Legitimate".green().bold()
    };
    println!("  Verdict: {label_str}");
    println!("  Confidence: {:.2}%", verdict.confidence * 100.0);
    println!(
        "  P(legitimate) = {:.4}   P(phishing) = {:.4}",
        verdict.probabilities[0], verdict.probabilities[1]
    );
    println!("\n  {}", verdict.sentence().dimmed());
}

/// Display the full feature vector for a URL, one named row per feature.
pub fn display_features(url: &str, vector: &[f64; FEATURE_COUNT]) {
    println!("\n{}", format!("=== Features for {url} ===").bold());
    println!();

    let width = FEATURE_NAMES
        .iter()
        .map(|name| name.len())
        .max()
        .unwrap_or(0);

    for (name, value) in FEATURE_NAMES.iter().zip(vector.iter()) {
        println!("  {:<width$}  {}", name.dimmed(), value);
    }
    println!();
}

/// Display a training report after a fit.
pub fn display_train_report(report: &TrainReport) {
    println!("\n{}", "=== Training Report ===".bold());
    println!("  Rows: {} train / {} test", report.train_rows, report.test_rows);
    println!("  Seed: {}", report.seed);

    let accuracy_pct = report.accuracy * 100.0;
    let accuracy_str = if report.accuracy >= 0.9 {
        format!("{accuracy_pct:.2}%").green().bold()
    } else if report.accuracy >= 0.7 {
        format!("{accuracy_pct:.2}%").yellow()
    } else {
        format!("{accuracy_pct:.2}%").red()
    };
    println!("  Held-out accuracy: {accuracy_str}");
    println!("  Trained at: {}", report.trained_at.to_rfc3339().dimmed());
    println!();
}
