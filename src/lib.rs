//! mosstat - Aggregate MOS listening-test ratings
//!
//! Collects per-rater CSV files of `file_path,score` rows from a subjective
//! listening test, groups the ratings by synthesis model and pitch-shift
//! factor, and reports:
//!
//! - **Mean opinion scores** with Student-t confidence intervals
//! - **Pairwise comparisons**: Welch's t-test, Cohen's d and Hedges' g,
//!   with significance and direction reported side by side
//! - **Distribution checks**: medians and the Shapiro-Wilk test
//! - **Segment rankings**: matched segments ordered by the gap between two
//!   models' mean scores, with the top entries' audio copied for review
//!
//! ## Module Structure
//!
//! - `config` - Model/pitch tables, path layouts and run settings
//! - `core` - Classification, score store, statistics and ranking
//! - `input` - Rater CSV discovery and parsing
//! - `report` - CSV tables, PNG plots, JSON summary and artifacts
//! - `pipeline` - One batch run from input directory to reports
//! - `cli` - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mosstat::config::{ConfigBuilder, LayoutPreset};
//! use mosstat::pipeline::{self, RunOptions, RunPaths};
//!
//! let config = ConfigBuilder::from_preset(LayoutPreset::Survey)
//!     .confidence(0.95)
//!     .build()?;
//! let run = pipeline::run(&config, &RunPaths::default(), RunOptions::default())?;
//!
//! for record in &run.summary {
//!     println!("{}: {:?}", record.key, record.ci.mean);
//! }
//! ```
//!
//! ## Layout Presets
//!
//! | Preset  | Model taken from                | Example                          |
//! |---------|---------------------------------|----------------------------------|
//! | survey  | path component #2               | `wav/set1/SiFiGAN/seg1_f2.00.wav` |
//! | listing | directory holding the file      | `any/depth/SiFiGAN/seg1_f2.00.wav` |
//!
//! The reference model (`natural` by default) is always filed under the
//! baseline pitch factor. Paths too short to carry a model land in the
//! `unknown_model` bucket, which every report lists separately.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod report;

pub use config::{ConfigBuilder, LayoutPreset, SurveyConfig};
pub use error::{MosError, Result};
pub use pipeline::{run, RunOptions, RunPaths, RunSummary};
