// src/core/store.rs
//
// In-memory score accumulation keyed by (model, pitch factor) and,
// optionally, by segment.

use log::debug;
use std::collections::{BTreeSet, HashMap};

use super::classify::{ClassificationKey, PathClassifier};
use crate::config::{ModelTable, PitchTable, SurveyConfig};
use crate::error::{MosError, Result};

/// One rating as read from a rater's CSV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObservation {
    pub file_path: String,
    pub score: u32,
    /// Index of the input file (one file per rater)
    pub rater: usize,
}

impl RawObservation {
    pub fn new(file_path: impl Into<String>, score: u32, rater: usize) -> Self {
        Self {
            file_path: file_path.into(),
            score,
            rater,
        }
    }
}

/// How much structure ingestion keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Group-level scores only
    Flat,
    /// Group-level scores plus per-segment collections
    Segmented,
}

/// Ratings of one segment within one group
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentScores {
    pub segment_id: String,
    pub scores: Vec<f64>,
    /// Path of the most recently ingested file for this segment
    pub source_path: String,
    raters: BTreeSet<usize>,
}

impl SegmentScores {
    fn new(segment_id: String, source_path: String) -> Self {
        Self {
            segment_id,
            scores: Vec::new(),
            source_path,
            raters: BTreeSet::new(),
        }
    }

    pub fn raters(&self) -> &BTreeSet<usize> {
        &self.raters
    }
}

/// Growing collection of scores for one group. Segments keep first-seen order.
#[derive(Debug, Clone, Default)]
pub struct GroupAccumulator {
    scores: Vec<f64>,
    raters: BTreeSet<usize>,
    segments: Vec<SegmentScores>,
    segment_index: HashMap<String, usize>,
}

impl GroupAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, score: f64, rater: usize) {
        self.scores.push(score);
        self.raters.insert(rater);
    }

    pub fn push_segment(&mut self, segment_id: &str, source_path: &str, score: f64, rater: usize) {
        self.push(score, rater);
        let idx = match self.segment_index.get(segment_id) {
            Some(&idx) => idx,
            None => {
                self.segments.push(SegmentScores::new(
                    segment_id.to_string(),
                    source_path.to_string(),
                ));
                let idx = self.segments.len() - 1;
                self.segment_index.insert(segment_id.to_string(), idx);
                idx
            }
        };
        let segment = &mut self.segments[idx];
        segment.scores.push(score);
        segment.raters.insert(rater);
        segment.source_path = source_path.to_string();
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn rater_count(&self) -> usize {
        self.raters.len()
    }

    pub fn segments(&self) -> &[SegmentScores] {
        &self.segments
    }

    pub fn segment(&self, segment_id: &str) -> Option<&SegmentScores> {
        self.segment_index
            .get(segment_id)
            .map(|&idx| &self.segments[idx])
    }
}

/// Owner of every group accumulator of a run
#[derive(Debug, Clone)]
pub struct ScoreStore<'a> {
    classifier: PathClassifier<'a>,
    models: &'a ModelTable,
    pitch_factors: &'a PitchTable,
    groups: HashMap<ClassificationKey, GroupAccumulator>,
    observations: usize,
}

impl<'a> ScoreStore<'a> {
    pub fn new(config: &'a SurveyConfig) -> Self {
        Self {
            classifier: PathClassifier::from_config(config),
            models: &config.models,
            pitch_factors: &config.pitch_factors,
            groups: HashMap::new(),
            observations: 0,
        }
    }

    pub fn classifier(&self) -> &PathClassifier<'a> {
        &self.classifier
    }

    /// Classify and store one observation.
    ///
    /// Fails when the path resolves to a model or pitch factor outside the
    /// configured tables. The `unknown_model` bucket is always accepted.
    pub fn ingest(&mut self, observation: &RawObservation, mode: IngestMode) -> Result<()> {
        let key = self.classifier.classify(&observation.file_path);

        if !self.pitch_factors.contains(&key.pitch_factor) {
            return Err(MosError::UnknownPitchFactor {
                pitch_factor: key.pitch_factor,
                path: observation.file_path.clone(),
            });
        }
        // The sentinel bucket is reserved for paths without a model directory
        let unattributed =
            key.is_unknown() && !self.classifier.has_model_token(&observation.file_path);
        if !unattributed && !self.models.contains(&key.model) {
            return Err(MosError::UnknownModel {
                model: key.model,
                path: observation.file_path.clone(),
            });
        }

        let score = f64::from(observation.score);
        let accumulator = self.groups.entry(key).or_default();
        match mode {
            IngestMode::Flat => accumulator.push(score, observation.rater),
            IngestMode::Segmented => {
                let segment_id = self.classifier.segment_id(&observation.file_path);
                accumulator.push_segment(
                    &segment_id,
                    &observation.file_path,
                    score,
                    observation.rater,
                );
            }
        }
        self.observations += 1;
        Ok(())
    }

    pub fn ingest_all<'o, I>(&mut self, observations: I, mode: IngestMode) -> Result<()>
    where
        I: IntoIterator<Item = &'o RawObservation>,
    {
        for observation in observations {
            self.ingest(observation, mode)?;
        }
        debug!(
            "store holds {} observations in {} groups",
            self.observations,
            self.groups.len()
        );
        Ok(())
    }

    /// Non-empty groups: baseline pitch factor first, models in table order,
    /// the unknown bucket last.
    pub fn groups(&self) -> Vec<(&ClassificationKey, &GroupAccumulator)> {
        let pitch_order = self.pitch_factors.report_order();
        let mut groups: Vec<_> = self.groups.iter().collect();
        groups.sort_by_key(|(key, _)| {
            (
                key.is_unknown(),
                pitch_order
                    .iter()
                    .position(|p| *p == key.pitch_factor)
                    .unwrap_or(usize::MAX),
                self.models.position(&key.model).unwrap_or(usize::MAX),
            )
        });
        groups
    }

    pub fn group(&self, key: &ClassificationKey) -> Option<&GroupAccumulator> {
        self.groups.get(key)
    }

    /// Scores of a group; empty when nothing was ingested for it
    pub fn accumulator(&self, key: &ClassificationKey) -> &[f64] {
        self.groups.get(key).map(|g| g.scores()).unwrap_or(&[])
    }

    /// Ratings that fell into the unknown-model bucket
    pub fn unknown_count(&self) -> usize {
        self.groups
            .iter()
            .filter(|(key, _)| key.is_unknown())
            .map(|(_, group)| group.len())
            .sum()
    }

    pub fn observation_count(&self) -> usize {
        self.observations
    }
}
