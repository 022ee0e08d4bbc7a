// src/input/mod.rs
//
// Rater CSV discovery and parsing. Each CSV file holds one rater's
// `file_path,score` rows; anything that does not parse as a rating is
// skipped and counted.

use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::SurveyConfig;
use crate::core::RawObservation;
use crate::error::{MosError, Result};

/// Ratings read from one file
#[derive(Debug, Clone, Default)]
pub struct FileObservations {
    pub observations: Vec<RawObservation>,
    pub skipped: usize,
    /// Kept ratings that fall outside the configured scale
    pub out_of_scale: usize,
}

/// Totals over every input file of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputReport {
    pub files: Vec<PathBuf>,
    pub unreadable: Vec<PathBuf>,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub rows_out_of_scale: usize,
}

impl InputReport {
    pub fn rater_count(&self) -> usize {
        self.files.len() - self.unreadable.len()
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// `*.csv` files directly inside `dir`, sorted by path
pub fn collect_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MosError::NoInput(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_csv(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();

    debug!("found {} CSV file(s) in {}", files.len(), dir.display());
    Ok(files)
}

/// Parse a score field: a non-negative integer written in ASCII digits
fn parse_score(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Read one rater file. Header lines, short rows and non-numeric scores
/// are skipped; scores outside the rating scale are kept and counted.
///
/// An I/O failure anywhere in the file fails the whole file.
pub fn read_observations(path: &Path, rater: usize, config: &SurveyConfig) -> Result<FileObservations> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| MosError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut result = FileObservations::default();
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => {
                return Err(MosError::Csv {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                debug!("{}:{}: unreadable row: {}", path.display(), line + 1, e);
                result.skipped += 1;
                continue;
            }
        };
        let (Some(file_path), Some(score)) = (record.get(0), record.get(1)) else {
            debug!("{}:{}: fewer than two columns", path.display(), line + 1);
            result.skipped += 1;
            continue;
        };
        let file_path = file_path.trim_start_matches('\u{feff}');
        match parse_score(score) {
            Some(score) => {
                if !config.score_in_scale(score) {
                    warn!(
                        "{}:{}: score {} is outside the {}..={} scale",
                        path.display(),
                        line + 1,
                        score,
                        config.min_score,
                        config.max_score
                    );
                    result.out_of_scale += 1;
                }
                result
                    .observations
                    .push(RawObservation::new(file_path, score, rater));
            }
            None => {
                debug!("{}:{}: skipping score `{}`", path.display(), line + 1, score);
                result.skipped += 1;
            }
        }
    }

    if result.skipped > 0 {
        info!(
            "{}: {} rating(s), {} row(s) skipped",
            path.display(),
            result.observations.len(),
            result.skipped
        );
    }
    Ok(result)
}

/// Read every file in order; the file's position is its rater index.
/// Unreadable files are reported and left out.
pub fn read_all(files: &[PathBuf], config: &SurveyConfig) -> (Vec<RawObservation>, InputReport) {
    let mut observations = Vec::new();
    let mut report = InputReport {
        files: files.to_vec(),
        ..Default::default()
    };

    for (rater, path) in files.iter().enumerate() {
        match read_observations(path, rater, config) {
            Ok(file) => {
                report.rows_read += file.observations.len();
                report.rows_skipped += file.skipped;
                report.rows_out_of_scale += file.out_of_scale;
                observations.extend(file.observations);
            }
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                report.unreadable.push(path.clone());
            }
        }
    }
    (observations, report)
}
