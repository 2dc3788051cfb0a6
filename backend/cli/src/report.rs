//! Human-readable rendering of a submission result.

use std::fmt::Write;

use trackscan_core::SubmissionResult;

use crate::terminal_output::{paint, render_table, score_color, Column, BOLD, DIM, GREEN, RED};

/// Detections listed before collapsing the rest into a count.
pub const MAX_LISTED_DETECTIONS: usize = 10;

const SCORE_BAR_WIDTH: usize = 20;

/// Render `result` as terminal text.
pub fn render_result(result: &SubmissionResult, color: bool) -> String {
    let mut out = String::new();

    if result.success {
        let _ = writeln!(out, "{}", paint("✓ Pattern Found", GREEN, color));
    } else {
        let _ = writeln!(out, "{}", paint("✗ No Match Found", RED, color));
    }

    if let Some(m) = &result.target_match {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", paint("Extracted Pattern", BOLD, color));
        let _ = writeln!(out, "  {}", m.pattern_found);
        let _ = writeln!(out, "{}", paint("Full Matched Line", BOLD, color));
        let _ = writeln!(out, "  {}", m.matched_text);
        let _ = writeln!(out, "{}", paint("Confidence Score", BOLD, color));
        let _ = writeln!(
            out,
            "  {} {}",
            score_bar(m.score),
            paint(&format!("{:.1}%", m.score), score_color(m.score), color)
        );
    }

    if !result.preprocessing_steps.is_empty() {
        let steps: Vec<String> = result
            .preprocessing_steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {step}", i + 1))
            .collect();
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", paint("Preprocessing Pipeline", BOLD, color));
        let _ = writeln!(out, "  {}", steps.join("  "));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", paint("Full OCR Output", BOLD, color));
    if result.full_text.is_empty() {
        let _ = writeln!(out, "  {}", paint("No text extracted", DIM, color));
    } else {
        for line in result.full_text.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }

    if !result.detections.is_empty() {
        let rows: Vec<Vec<String>> = result
            .detections
            .iter()
            .take(MAX_LISTED_DETECTIONS)
            .map(|d| {
                let pct = d.confidence_percent();
                vec![
                    d.engine.clone(),
                    d.text.clone(),
                    paint(&format!("{pct:.0}%"), score_color(pct), color),
                ]
            })
            .collect();
        let columns = [
            Column::left("Engine"),
            Column::left("Text"),
            Column::right("Confidence"),
        ];
        let _ = writeln!(out);
        out.push_str(&render_table(&columns, &rows));
        let hidden = result.detections.len().saturating_sub(MAX_LISTED_DETECTIONS);
        if hidden > 0 {
            let _ = writeln!(out, "  +{hidden} more results");
        }
    }

    if let Some(error) = result.backend_error() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", paint(&format!("Backend error: {error}"), RED, color));
    }

    out
}

fn score_bar(score: f64) -> String {
    let filled = ((score.clamp(0.0, 100.0) / 100.0) * SCORE_BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(SCORE_BAR_WIDTH - filled))
}
