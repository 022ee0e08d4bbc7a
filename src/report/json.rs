// src/report/json.rs
//
// Machine-readable run summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use super::write_atomic;
use crate::config::SurveyConfig;
use crate::core::stats::DistributionRecord;
use crate::core::{PairwiseTestRecord, RankingTable, SummaryRecord};
use crate::error::{MosError, Result};
use crate::input::InputReport;

#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub tool: &'static str,
    pub version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub input_files: usize,
    pub unreadable_files: usize,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub rows_out_of_scale: usize,
    pub unknown_model_ratings: usize,
}

impl RunMetadata {
    pub fn new(input: &InputReport, unknown_model_ratings: usize) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            generated_at: Utc::now(),
            input_files: input.files.len(),
            unreadable_files: input.unreadable.len(),
            rows_read: input.rows_read,
            rows_skipped: input.rows_skipped,
            rows_out_of_scale: input.rows_out_of_scale,
            unknown_model_ratings,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub metadata: RunMetadata,
    pub config: &'a SurveyConfig,
    pub summary: &'a [SummaryRecord],
    pub pairwise: &'a [PairwiseTestRecord],
    pub distribution: &'a [DistributionRecord],
    pub rankings: &'a [RankingTable],
}

impl JsonReport<'_> {
    pub fn to_json(&self, path: &Path) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| MosError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json(path)?;
        write_atomic(path, json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ClassificationKey;

    #[test]
    fn test_undefined_values_serialize_as_null() {
        let config = SurveyConfig::default();
        let summary = [SummaryRecord::from_scores(
            ClassificationKey::new("SiFiGAN", "f2.00"),
            &[3.0],
            0.95,
        )];
        let report = JsonReport {
            metadata: RunMetadata::new(&InputReport::default(), 0),
            config: &config,
            summary: &summary,
            pairwise: &[],
            distribution: &[],
            rankings: &[],
        };
        let json = report.to_json(Path::new("summary.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let row = &value["summary"][0];
        assert_eq!(row["model"], "SiFiGAN");
        assert_eq!(row["pitch_factor"], "f2.00");
        assert_eq!(row["mean"], 3.0);
        assert!(row["margin"].is_null());
        assert_eq!(value["metadata"]["tool"], "mosstat");
    }
}
