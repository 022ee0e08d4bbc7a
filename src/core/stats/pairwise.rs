// src/core/stats/pairwise.rs
//
// Pairwise model comparison at a shared pitch factor.

use serde::Serialize;

use super::hypothesis::{effect_sizes, interpret, welch_t_test, EffectSizes, Verdict, WelchTest};
use super::summary::mean;

/// Test record for one pair of groups sharing a pitch factor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseTestRecord {
    pub pitch_factor: String,
    pub model_a: String,
    pub model_b: String,
    pub n_a: usize,
    pub n_b: usize,
    pub mean_a: Option<f64>,
    pub mean_b: Option<f64>,
    pub welch: Option<WelchTest>,
    pub effect: Option<EffectSizes>,
    pub verdict: Verdict,
}

impl PairwiseTestRecord {
    /// Both groups had enough data for the test
    pub fn is_defined(&self) -> bool {
        self.welch.is_some()
    }
}

/// Compare two groups. Test and effect sizes need n >= 2 on both sides.
pub fn compare_groups(
    pitch_factor: &str,
    (model_a, a): (&str, &[f64]),
    (model_b, b): (&str, &[f64]),
    alpha: f64,
) -> PairwiseTestRecord {
    let testable = a.len() >= 2 && b.len() >= 2;
    let welch = if testable { welch_t_test(a, b) } else { None };
    let effect = if testable { effect_sizes(a, b) } else { None };
    let (mean_a, mean_b) = (mean(a), mean(b));
    let verdict = interpret(
        welch.as_ref(),
        effect.as_ref(),
        (model_a, mean_a),
        (model_b, mean_b),
        alpha,
    );

    PairwiseTestRecord {
        pitch_factor: pitch_factor.to_string(),
        model_a: model_a.to_string(),
        model_b: model_b.to_string(),
        n_a: a.len(),
        n_b: b.len(),
        mean_a,
        mean_b,
        welch,
        effect,
        verdict,
    }
}
