// src/core/stats/summary.rs
//
// Mean with a Student-t confidence interval, plus descriptive helpers.

use serde::Serialize;

use super::distributions::student_t_quantile;
use crate::core::classify::ClassificationKey;

/// Mean and two-sided confidence interval. `None` marks an undefined value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanCi {
    pub mean: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub margin: Option<f64>,
}

impl MeanCi {
    fn undefined() -> Self {
        Self {
            mean: None,
            lower: None,
            upper: None,
            margin: None,
        }
    }
}

/// Ascending copy; sums over it do not depend on input order
fn sorted(scores: &[f64]) -> Vec<f64> {
    let mut values = scores.to_vec();
    values.sort_by(f64::total_cmp);
    values
}

pub fn mean(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    Some(sorted(scores).iter().sum::<f64>() / scores.len() as f64)
}

/// Sample variance with Bessel's correction
pub fn sample_variance(scores: &[f64]) -> Option<f64> {
    let n = scores.len();
    if n < 2 {
        return None;
    }
    let values = sorted(scores);
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|x| (x - mean) * (x - mean)).sum();
    Some(ss / (n - 1) as f64)
}

pub fn median(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let values = sorted(scores);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Mean and confidence interval at the given two-sided level.
///
/// n = 0 leaves everything undefined, n = 1 gives only the mean. From
/// n = 2 on, the margin is the t quantile with n - 1 degrees of freedom
/// times the standard error.
pub fn mean_with_ci(scores: &[f64], confidence: f64) -> MeanCi {
    let n = scores.len();
    let Some(mean) = mean(scores) else {
        return MeanCi::undefined();
    };
    let Some(variance) = sample_variance(scores) else {
        return MeanCi {
            mean: Some(mean),
            ..MeanCi::undefined()
        };
    };

    let se = variance.sqrt() / (n as f64).sqrt();
    let critical = student_t_quantile(0.5 * (1.0 + confidence), (n - 1) as f64);
    let margin = critical * se;
    MeanCi {
        mean: Some(mean),
        lower: Some(mean - margin),
        upper: Some(mean + margin),
        margin: Some(margin),
    }
}

/// Per-group summary row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRecord {
    #[serde(flatten)]
    pub key: ClassificationKey,
    pub count: usize,
    #[serde(flatten)]
    pub ci: MeanCi,
}

impl SummaryRecord {
    pub fn from_scores(key: ClassificationKey, scores: &[f64], confidence: f64) -> Self {
        Self {
            key,
            count: scores.len(),
            ci: mean_with_ci(scores, confidence),
        }
    }

    /// True when the interval is defined (n >= 2)
    pub fn has_interval(&self) -> bool {
        self.ci.margin.is_some()
    }
}
