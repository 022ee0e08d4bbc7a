//! CLI argument parsing with preset support

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;

use crate::config::{ConfigBuilder, LayoutPreset, ModelPair, PathLayout, SurveyConfig};
use crate::pipeline::{RunOptions, RunPaths};

#[derive(Parser, Debug, Clone)]
#[command(name = "mosstat")]
#[command(version)]
#[command(about = "Aggregate MOS listening-test ratings into summaries, tests and rankings")]
#[command(long_about = "Collects rater CSV files (file_path,score per row), groups ratings by \
    model and pitch factor, and reports mean opinion scores with confidence intervals, \
    pairwise Welch tests with effect sizes, and per-segment rankings.\n\n\
    Layouts:\n  \
    survey   model is path component #2 (wav/setN/<model>/<file>)\n  \
    listing  model is the directory holding the file")]
pub struct Args {
    /// Directory containing the rater CSV files
    #[arg(short, long, default_value = "results")]
    pub input_dir: PathBuf,

    /// Summary CSV to write
    #[arg(short, long, default_value = "results.csv")]
    pub output_file: PathBuf,

    /// Directory for pairwise, distribution and ranking reports
    #[arg(short, long, default_value = "analysis")]
    pub analysis_dir: PathBuf,

    /// Base directory that the paths inside the CSV files are relative to
    #[arg(long, default_value = ".")]
    pub audio_root: PathBuf,

    /// JSON configuration file (model table, pitch factors, layout, ...)
    #[arg(long, env = "MOSSTAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Layout preset: survey or listing
    #[arg(long, value_parser = ["survey", "listing"])]
    pub layout: Option<String>,

    /// Take the model name from this path component (0-based)
    #[arg(long, value_name = "N")]
    pub model_index: Option<usize>,

    /// Confidence level of the mean intervals
    #[arg(long)]
    pub confidence: Option<f64>,

    /// Significance level of the pairwise tests
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Top-ranked segments whose audio is copied per comparison
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Ranking comparison as MODEL_A:MODEL_B (can repeat)
    #[arg(long = "pair", value_name = "A:B")]
    pub pairs: Vec<String>,

    /// Skip PNG figures
    #[arg(long)]
    pub no_plots: bool,

    /// Skip copying top-ranked audio files
    #[arg(long)]
    pub no_copy: bool,

    /// Skip segment rankings
    #[arg(long)]
    pub no_ranking: bool,

    /// Also write summary.json to the analysis directory
    #[arg(long)]
    pub json: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Config file or preset, then individual overrides
    pub fn build_config(&self) -> Result<SurveyConfig> {
        let base = match &self.config {
            Some(path) => SurveyConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => SurveyConfig::default(),
        };
        let mut builder = ConfigBuilder::from_config(base);

        if let Some(name) = &self.layout {
            let preset = LayoutPreset::from_name(name)
                .ok_or_else(|| anyhow!("Unknown layout: {}", name))?;
            builder = builder.preset(preset);
        }
        if let Some(index) = self.model_index {
            builder = builder.layout(PathLayout::FromRoot { index });
        }
        if let Some(confidence) = self.confidence {
            builder = builder.confidence(confidence);
        }
        if let Some(alpha) = self.alpha {
            builder = builder.alpha(alpha);
        }
        if let Some(top_k) = self.top_k {
            builder = builder.top_k(top_k);
        }
        for spec in &self.pairs {
            let pair = ModelPair::parse(spec)
                .ok_or_else(|| anyhow!("Invalid pair `{}`. Use --pair MODEL_A:MODEL_B", spec))?;
            builder = builder.ranking_pair(pair);
        }

        builder.build().context("Invalid configuration")
    }

    pub fn paths(&self) -> RunPaths {
        RunPaths {
            input_dir: self.input_dir.clone(),
            summary_file: self.output_file.clone(),
            analysis_dir: self.analysis_dir.clone(),
            audio_root: self.audio_root.clone(),
        }
    }

    pub fn options(&self) -> RunOptions {
        RunOptions {
            plots: !self.no_plots,
            ranking: !self.no_ranking,
            copy_artifacts: !self.no_copy,
            json: self.json,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}
