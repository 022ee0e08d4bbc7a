// src/pipeline.rs
//
// One batch run: read rater files, fill the store, compute every derived
// table and write the reports.

use log::{info, warn};
use std::path::PathBuf;

use crate::config::SurveyConfig;
use crate::core::stats::{self, mean_with_ci, DistributionRecord};
use crate::core::{
    rank_all, ClassificationKey, IngestMode, PairwiseTestRecord, RankingTable, ScoreStore,
    SummaryRecord,
};
use crate::error::Result;
use crate::input::{self, InputReport};
use crate::report::plots::{self, PlotConfig};
use crate::report::{self, tables, CopyReport, JsonReport, RunMetadata};

/// Where a run reads from and writes to
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub input_dir: PathBuf,
    pub summary_file: PathBuf,
    pub analysis_dir: PathBuf,
    /// Base that source paths inside the CSV files are relative to
    pub audio_root: PathBuf,
}

impl Default for RunPaths {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("results"),
            summary_file: PathBuf::from("results.csv"),
            analysis_dir: PathBuf::from("analysis"),
            audio_root: PathBuf::from("."),
        }
    }
}

/// Optional stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub plots: bool,
    pub ranking: bool,
    pub copy_artifacts: bool,
    pub json: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            plots: true,
            ranking: true,
            copy_artifacts: true,
            json: false,
        }
    }
}

/// Everything a run computed, plus the files it produced
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub input: InputReport,
    pub summary: Vec<SummaryRecord>,
    pub pairwise: Vec<PairwiseTestRecord>,
    pub distribution: Vec<DistributionRecord>,
    pub rankings: Vec<RankingTable>,
    pub unknown_model_ratings: usize,
    pub copies: CopyReport,
    pub written: Vec<PathBuf>,
}

impl RunSummary {
    pub fn is_empty(&self) -> bool {
        self.input.rows_read == 0
    }
}

pub fn run(config: &SurveyConfig, paths: &RunPaths, options: RunOptions) -> Result<RunSummary> {
    let files = input::collect_csv_files(&paths.input_dir)?;
    if files.is_empty() {
        warn!("no CSV files found in {}", paths.input_dir.display());
        return Ok(RunSummary::default());
    }
    info!("reading {} rater file(s)", files.len());
    let (observations, input_report) = input::read_all(&files, config);

    let mut store = ScoreStore::new(config);
    store.ingest_all(&observations, IngestMode::Segmented)?;
    info!(
        "{} rating(s) in {} group(s), {} row(s) skipped",
        store.observation_count(),
        store.groups().len(),
        input_report.rows_skipped
    );

    let unknown_model_ratings = store.unknown_count();
    if unknown_model_ratings > 0 {
        warn!(
            "{} rating(s) could not be attributed to a model ({} layout)",
            unknown_model_ratings,
            config.layout.describe()
        );
    }

    let mut run = RunSummary {
        input: input_report,
        summary: stats::summarize(&store, config),
        pairwise: stats::pairwise_tests(&store, config),
        distribution: stats::distribution_checks(&store),
        unknown_model_ratings,
        ..Default::default()
    };
    info!(
        "computed {} summary row(s) and {} pairwise test(s)",
        run.summary.len(),
        run.pairwise.len()
    );
    for check in &run.distribution {
        if let Some(sw) = check.shapiro {
            info!("Shapiro-Wilk for {}: W={:.3}, p={:.3e}", check.key, sw.w, sw.p);
        }
    }

    tables::write_summary(&paths.summary_file, &run.summary, &config.confidence_label())?;
    run.written.push(paths.summary_file.clone());

    let pairwise_path = paths.analysis_dir.join("pairwise.csv");
    tables::write_pairwise(&pairwise_path, &run.pairwise)?;
    run.written.push(pairwise_path);

    let distribution_path = paths.analysis_dir.join("distribution.csv");
    tables::write_distribution(&distribution_path, &run.distribution)?;
    run.written.push(distribution_path);

    if options.plots {
        write_plots(&store, config, paths, &run.pairwise, &mut run.written)?;
    }

    if options.ranking {
        run.rankings = rank_all(&store, config);
        info!("ranked {} model pair(s)", run.rankings.len());
        for table in &run.rankings {
            let path = report::ranking_file(&paths.analysis_dir, table);
            tables::write_ranking(&path, table)?;
            run.written.push(path);

            if options.copy_artifacts {
                let dest = report::ranking_dir(&paths.analysis_dir, table);
                let copies = report::copy_top_k(table, config.top_k, &paths.audio_root, &dest)?;
                run.copies.merge(copies);
            }
        }
        if !run.copies.missing.is_empty() {
            warn!("{} artifact source(s) were missing", run.copies.missing.len());
        }
    }

    if options.json {
        let path = paths.analysis_dir.join("summary.json");
        JsonReport {
            metadata: RunMetadata::new(&run.input, run.unknown_model_ratings),
            config,
            summary: &run.summary,
            pairwise: &run.pairwise,
            distribution: &run.distribution,
            rankings: &run.rankings,
        }
        .write(&path)?;
        run.written.push(path);
    }

    info!("wrote {} report file(s)", run.written.len());
    Ok(run)
}

fn write_plots(
    store: &ScoreStore<'_>,
    config: &SurveyConfig,
    paths: &RunPaths,
    pairwise: &[PairwiseTestRecord],
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let fig_dir = report::figure_dir(&paths.analysis_dir);
    let plot_config = PlotConfig::default();
    let scale = (config.min_score, config.max_score);

    for (key, group) in store.groups() {
        let path = fig_dir.join(format!("{}_f0_{}.png", key.model, key.pitch_factor));
        plots::histogram(group.scores(), scale, &plot_config, &path)?;
        written.push(path);
    }

    for record in pairwise {
        let bars = [&record.model_a, &record.model_b].map(|model| {
            let key = ClassificationKey::new(model.as_str(), record.pitch_factor.as_str());
            mean_with_ci(store.accumulator(&key), config.confidence)
        });
        let path = fig_dir.join(format!(
            "{}_vs_{}_{}.png",
            record.model_a, record.model_b, record.pitch_factor
        ));
        plots::mean_bars(&bars, scale, &plot_config, &path)?;
        written.push(path);
    }
    Ok(())
}
