// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::Args;
pub use output::{format_pairwise, format_rankings, format_run, format_summary_table};
