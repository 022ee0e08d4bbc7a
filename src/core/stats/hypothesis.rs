// src/core/stats/hypothesis.rs
//
// Two-sample comparison: Welch's t-test, standardized effect sizes and
// the combined verdict.

use serde::Serialize;
use std::fmt;

use super::distributions::student_t_two_sided_p;
use super::summary::{mean, sample_variance};

/// Welch's unequal-variance t-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WelchTest {
    pub t: f64,
    pub p: f64,
    /// Welch-Satterthwaite degrees of freedom
    pub df: f64,
}

/// Cohen's d and its small-sample corrected form
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectSizes {
    pub cohens_d: f64,
    pub hedges_g: f64,
    /// 1 - 3 / (4 (n1 + n2) - 9)
    pub correction: f64,
}

/// Two-sided Welch t-test of `a` against `b`.
///
/// `None` when either sample has fewer than two values, or when both are
/// constant with equal means (the statistic is 0/0).
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Option<WelchTest> {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (m1, m2) = (mean(a)?, mean(b)?);
    let (v1, v2) = (sample_variance(a)?, sample_variance(b)?);

    let se1 = v1 / n1;
    let se2 = v2 / n2;
    let se = (se1 + se2).sqrt();
    let diff = m1 - m2;

    if se == 0.0 {
        if diff == 0.0 {
            return None;
        }
        // Zero spread but different means: infinitely separated
        return Some(WelchTest {
            t: diff.signum() * f64::INFINITY,
            p: 0.0,
            df: n1 + n2 - 2.0,
        });
    }

    let t = diff / se;
    let df = (se1 + se2).powi(2) / (se1 * se1 / (n1 - 1.0) + se2 * se2 / (n2 - 1.0));
    Some(WelchTest {
        t,
        p: student_t_two_sided_p(t, df),
        df,
    })
}

/// Cohen's d over the pooled standard deviation, and Hedges' g.
///
/// `None` when n1 + n2 <= 2, when a sample is empty, or when the pooled
/// deviation is zero.
pub fn effect_sizes(a: &[f64], b: &[f64]) -> Option<EffectSizes> {
    let (n1, n2) = (a.len(), b.len());
    if n1 + n2 <= 2 {
        return None;
    }
    let (m1, m2) = (mean(a)?, mean(b)?);
    // (n - 1) * s^2 is the sum of squared deviations, defined for n = 1 too
    let ss1: f64 = a.iter().map(|x| (x - m1) * (x - m1)).sum();
    let ss2: f64 = b.iter().map(|x| (x - m2) * (x - m2)).sum();
    let pooled = ((ss1 + ss2) / (n1 + n2 - 2) as f64).sqrt();
    if pooled == 0.0 {
        return None;
    }

    let cohens_d = (m1 - m2) / pooled;
    let correction = 1.0 - 3.0 / (4.0 * (n1 + n2) as f64 - 9.0);
    Some(EffectSizes {
        cohens_d,
        hedges_g: cohens_d * correction,
        correction,
    })
}

/// Conventional magnitude label for |d|
pub fn effect_magnitude(d: f64) -> &'static str {
    match d.abs() {
        x if x < 0.2 => "negligible",
        x if x < 0.5 => "small",
        x if x < 0.8 => "medium",
        _ => "large",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Significant,
    NotSignificant,
    /// Not enough data to test
    Undefined,
}

impl Significance {
    pub fn label(&self) -> &'static str {
        match self {
            Significance::Significant => "significant",
            Significance::NotSignificant => "not significant",
            Significance::Undefined => "undefined",
        }
    }
}

/// Which side has the higher mean. Directional only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HigherMean {
    A(String),
    B(String),
    Tie,
    Undefined,
}

impl HigherMean {
    pub fn label(&self) -> &str {
        match self {
            HigherMean::A(name) | HigherMean::B(name) => name,
            HigherMean::Tie => "tie",
            HigherMean::Undefined => "undefined",
        }
    }
}

/// Significance and direction, always reported together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub significance: Significance,
    pub higher_mean: HigherMean,
    pub magnitude: Option<&'static str>,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.significance.label())?;
        match &self.higher_mean {
            HigherMean::A(name) | HigherMean::B(name) => write!(f, "; higher mean: {}", name)?,
            HigherMean::Tie => write!(f, "; equal means")?,
            HigherMean::Undefined => {}
        }
        if let Some(magnitude) = self.magnitude {
            write!(f, "; {} effect", magnitude)?;
        }
        Ok(())
    }
}

/// Combine a test result with the group means into a verdict.
///
/// Significance is `p < alpha`; the direction comes from the means alone.
pub fn interpret(
    test: Option<&WelchTest>,
    effect: Option<&EffectSizes>,
    (label_a, mean_a): (&str, Option<f64>),
    (label_b, mean_b): (&str, Option<f64>),
    alpha: f64,
) -> Verdict {
    let significance = match test {
        Some(test) if test.p.is_nan() => Significance::Undefined,
        Some(test) if test.p < alpha => Significance::Significant,
        Some(_) => Significance::NotSignificant,
        None => Significance::Undefined,
    };

    let higher_mean = match (mean_a, mean_b) {
        (Some(a), Some(b)) if a > b => HigherMean::A(label_a.to_string()),
        (Some(a), Some(b)) if b > a => HigherMean::B(label_b.to_string()),
        (Some(_), Some(_)) => HigherMean::Tie,
        _ => HigherMean::Undefined,
    };

    Verdict {
        significance,
        higher_mean,
        magnitude: effect.map(|e| effect_magnitude(e.cohens_d)),
    }
}
