//! Statistics over the accumulated groups

pub mod distributions;
pub mod hypothesis;
pub mod normality;
pub mod pairwise;
pub mod summary;

use serde::Serialize;

pub use hypothesis::{
    effect_sizes, interpret, welch_t_test, EffectSizes, HigherMean, Significance, Verdict,
    WelchTest,
};
pub use normality::{shapiro_wilk, ShapiroWilk};
pub use pairwise::{compare_groups, PairwiseTestRecord};
pub use summary::{mean, mean_with_ci, median, sample_variance, MeanCi, SummaryRecord};

use super::classify::ClassificationKey;
use super::store::ScoreStore;
use crate::config::{SurveyConfig, UNKNOWN_MODEL};

/// Models reported at a pitch factor: the reference only at the baseline
fn models_at<'c>(config: &'c SurveyConfig, pitch_factor: &str) -> Vec<&'c str> {
    let baseline = config.pitch_factors.baseline();
    config
        .models
        .models()
        .iter()
        .filter(|m| !m.reference || pitch_factor == baseline)
        .map(|m| m.name.as_str())
        .collect()
}

/// Summary rows for every configured group, empty ones included, followed
/// by the unknown-model bucket when it holds anything.
pub fn summarize(store: &ScoreStore<'_>, config: &SurveyConfig) -> Vec<SummaryRecord> {
    let mut records = Vec::new();
    for pitch in config.pitch_factors.report_order() {
        for model in models_at(config, pitch) {
            let key = ClassificationKey::new(model, pitch);
            let scores = store.accumulator(&key);
            records.push(SummaryRecord::from_scores(key, scores, config.confidence));
        }
    }
    for (key, group) in store.groups() {
        if key.model == UNKNOWN_MODEL {
            records.push(SummaryRecord::from_scores(
                key.clone(),
                group.scores(),
                config.confidence,
            ));
        }
    }
    records
}

/// Welch test and effect sizes for every pair of models with ratings at
/// the same pitch factor, in table order.
pub fn pairwise_tests(store: &ScoreStore<'_>, config: &SurveyConfig) -> Vec<PairwiseTestRecord> {
    let mut records = Vec::new();
    for pitch in config.pitch_factors.report_order() {
        let present: Vec<(&str, &[f64])> = models_at(config, pitch)
            .into_iter()
            .map(|model| (model, store.accumulator(&ClassificationKey::new(model, pitch))))
            .filter(|(_, scores)| !scores.is_empty())
            .collect();
        for (i, a) in present.iter().enumerate() {
            for b in &present[i + 1..] {
                records.push(compare_groups(pitch, *a, *b, config.alpha));
            }
        }
    }
    records
}

/// Shape of one group's score distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionRecord {
    #[serde(flatten)]
    pub key: ClassificationKey,
    pub count: usize,
    pub mean: Option<f64>,
    pub sd: Option<f64>,
    pub median: Option<f64>,
    pub shapiro: Option<ShapiroWilk>,
}

/// Distribution check for every non-empty group
pub fn distribution_checks(store: &ScoreStore<'_>) -> Vec<DistributionRecord> {
    store
        .groups()
        .into_iter()
        .map(|(key, group)| {
            let scores = group.scores();
            DistributionRecord {
                key: key.clone(),
                count: scores.len(),
                mean: mean(scores),
                sd: sample_variance(scores).map(f64::sqrt),
                median: median(scores),
                shapiro: shapiro_wilk(scores),
            }
        })
        .collect()
}
