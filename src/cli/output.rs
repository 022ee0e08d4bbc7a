//! Output formatting for CLI results

use crate::core::stats::Significance;
use crate::core::{PairwiseTestRecord, RankingTable, SummaryRecord};
use crate::pipeline::RunSummary;
use crate::report::{fmt3, fmt_p};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const GRAY: &str = "\x1b[90m";

/// Summary table, one line per group
pub fn format_summary_table(records: &[SummaryRecord], confidence_label: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{}{:<8} {:<18} {:>6} {:>8} {:>18}{}\n",
        BOLD,
        "f0",
        "model",
        "n",
        "mean",
        format!("CI{}", confidence_label),
        RESET
    ));

    for record in records {
        let color = if record.key.is_unknown() {
            YELLOW
        } else if record.count == 0 {
            GRAY
        } else {
            ""
        };
        let interval = if record.has_interval() {
            format!("[{}, {}]", fmt3(record.ci.lower), fmt3(record.ci.upper))
        } else {
            "NaN".to_string()
        };
        let mean = if record.has_interval() {
            fmt3(record.ci.mean)
        } else {
            "NaN".to_string()
        };
        output.push_str(&format!(
            "{}{:<8} {:<18} {:>6} {:>8} {:>18}{}\n",
            color,
            record.key.pitch_factor,
            record.key.model,
            record.count,
            mean,
            interval,
            RESET
        ));
    }
    output
}

/// One line per pairwise test with its verdict
pub fn format_pairwise(records: &[PairwiseTestRecord]) -> String {
    let mut output = String::new();
    for record in records {
        let color = match record.verdict.significance {
            Significance::Significant => GREEN,
            Significance::NotSignificant => "",
            Significance::Undefined => GRAY,
        };
        output.push_str(&format!(
            "  {}{} vs {} @ {}{}: {}{}{}\n",
            BOLD,
            record.model_a,
            record.model_b,
            record.pitch_factor,
            RESET,
            color,
            record.verdict,
            RESET
        ));
        if record.is_defined() {
            output.push_str(&format!(
                "    {}t={} p={} d={} g={}{}\n",
                DIM,
                fmt3(record.welch.map(|w| w.t)),
                fmt_p(record.welch.map(|w| w.p)),
                fmt3(record.effect.map(|e| e.cohens_d)),
                fmt3(record.effect.map(|e| e.hedges_g)),
                RESET
            ));
        }
    }
    output
}

/// Leading rows of each ranking
pub fn format_rankings(tables: &[RankingTable], rows: usize) -> String {
    let mut output = String::new();
    for table in tables {
        output.push_str(&format!(
            "  {}{} @ {}{} {}({} segments, {} raters){}\n",
            BOLD,
            table.pair.label(),
            table.pitch_factor,
            RESET,
            DIM,
            table.total_segments(),
            table.total_raters,
            RESET
        ));
        for record in table.top_k(rows) {
            output.push_str(&format!(
                "    {:>3}. {:<28} {} vs {} (Δ {})\n",
                record.rank,
                record.segment_id,
                fmt3(Some(record.mean_a)),
                fmt3(Some(record.mean_b)),
                fmt3(Some(record.difference))
            ));
        }
    }
    output
}

/// Everything printed after a run
pub fn format_run(run: &RunSummary, confidence_label: &str, verbose: bool) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{}Input:{} {} file(s), {} rating(s), {} row(s) skipped\n",
        BOLD,
        RESET,
        run.input.files.len(),
        run.input.rows_read,
        run.input.rows_skipped
    ));
    if run.input.rows_out_of_scale > 0 {
        output.push_str(&format!(
            "  {}{} rating(s) outside the rating scale{}\n",
            YELLOW, run.input.rows_out_of_scale, RESET
        ));
    }
    if !run.input.unreadable.is_empty() {
        output.push_str(&format!(
            "  {}{} file(s) could not be read{}\n",
            YELLOW,
            run.input.unreadable.len(),
            RESET
        ));
    }
    if run.unknown_model_ratings > 0 {
        output.push_str(&format!(
            "  {}{} rating(s) in the unknown_model bucket{}\n",
            YELLOW, run.unknown_model_ratings, RESET
        ));
    }

    output.push('\n');
    output.push_str(&format_summary_table(&run.summary, confidence_label));

    if !run.pairwise.is_empty() {
        output.push_str(&format!("\n{}Pairwise tests:{}\n", BOLD, RESET));
        output.push_str(&format_pairwise(&run.pairwise));
    }

    if !run.rankings.is_empty() {
        output.push_str(&format!("\n{}Largest segment differences:{}\n", BOLD, RESET));
        output.push_str(&format_rankings(&run.rankings, if verbose { 10 } else { 3 }));
    }

    if !run.copies.missing.is_empty() {
        output.push_str(&format!(
            "\n  {}{} artifact source(s) not found{}\n",
            YELLOW,
            run.copies.missing.len(),
            RESET
        ));
    }
    output
}
