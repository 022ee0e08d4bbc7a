// src/core/stats/normality.rs
//
// Shapiro-Wilk normality test, Royston's approximation (valid for
// 3 <= n <= 5000).

use serde::Serialize;

use super::distributions::{normal_quantile, normal_sf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapiroWilk {
    pub w: f64,
    pub p: f64,
}

const C1: [f64; 6] = [0.0, 0.221_157, -0.147_981, -2.071_19, 4.434_685, -2.706_056];
const C2: [f64; 6] = [0.0, 0.042_981, -0.293_762, -1.752_461, 5.682_633, -3.582_633];
const C3: [f64; 4] = [0.544, -0.399_78, 0.025_054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.778_57, 0.062_767, -0.002_032_2];
const C5: [f64; 4] = [-1.5861, -0.310_82, -0.083_751, 0.003_891_5];
const C6: [f64; 3] = [-0.4803, -0.082_676, 0.003_030_2];
const G: [f64; 2] = [-2.273, 0.459];

const MAX_N: usize = 5000;

fn poly(coef: &[f64], x: f64) -> f64 {
    coef.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Half-vector of Shapiro-Wilk coefficients for the largest order statistics
fn coefficients(n: usize) -> Vec<f64> {
    let half = n / 2;
    if n == 3 {
        return vec![std::f64::consts::FRAC_1_SQRT_2];
    }

    let an = n as f64;
    let m: Vec<f64> = (1..=half)
        .map(|i| normal_quantile((i as f64 - 0.375) / (an + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / an.sqrt();

    let a1 = poly(&C1, rsn) - m[0] / ssumm2;
    let mut a = vec![0.0; half];
    a[0] = a1;

    let (start, fac) = if n > 5 {
        let a2 = -m[1] / ssumm2 + poly(&C2, rsn);
        let fac = ((summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1])
            / (1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2))
            .sqrt();
        a[1] = a2;
        (2, fac)
    } else {
        let fac = ((summ2 - 2.0 * m[0] * m[0]) / (1.0 - 2.0 * a1 * a1)).sqrt();
        (1, fac)
    };
    for i in start..half {
        a[i] = -m[i] / fac;
    }
    a
}

/// W statistic and p-value; `None` when n < 3, n > 5000, or every score
/// is identical.
pub fn shapiro_wilk(scores: &[f64]) -> Option<ShapiroWilk> {
    let n = scores.len();
    if !(3..=MAX_N).contains(&n) {
        return None;
    }
    let mut x = scores.to_vec();
    x.sort_by(f64::total_cmp);
    if x[n - 1] - x[0] < 1e-19 {
        return None;
    }

    // Antisymmetric weight vector over the order statistics
    let half_coef = coefficients(n);
    let mut weights = vec![0.0; n];
    for (i, &c) in half_coef.iter().enumerate() {
        weights[i] = -c;
        weights[n - 1 - i] = c;
    }

    let mean = x.iter().sum::<f64>() / n as f64;
    let ssq: f64 = x.iter().map(|v| (v - mean) * (v - mean)).sum();
    let ssa: f64 = weights.iter().map(|w| w * w).sum();
    let sax: f64 = weights.iter().zip(&x).map(|(w, v)| w * (v - mean)).sum();
    let w = (sax * sax / (ssa * ssq)).min(1.0);

    let p = if n == 3 {
        // Exact distribution for three observations
        let pi6 = 6.0 / std::f64::consts::PI;
        let stqr = std::f64::consts::PI / 3.0;
        (pi6 * (w.sqrt().asin() - stqr)).max(0.0)
    } else {
        let an = n as f64;
        let mut y = (1.0 - w).ln();
        let (m, s) = if n <= 11 {
            let gamma = poly(&G, an);
            if y >= gamma {
                return Some(ShapiroWilk { w, p: 1e-99 });
            }
            y = -(gamma - y).ln();
            (poly(&C3, an), poly(&C4, an).exp())
        } else {
            let xx = an.ln();
            (poly(&C5, xx), poly(&C6, xx).exp())
        };
        normal_sf((y - m) / s)
    };

    Some(ShapiroWilk {
        w,
        p: p.clamp(0.0, 1.0),
    })
}
