// src/report/plots.rs
//
// PNG figures drawn straight onto an RGB buffer: score histograms with a
// fitted normal density, and mean-with-CI bar charts for model pairs.

use image::{ImageBuffer, ImageFormat, Rgb};
use log::info;
use std::io::Cursor;
use std::path::Path;

use super::write_atomic;
use crate::core::stats::distributions::normal_pdf;
use crate::core::stats::{mean, MeanCi};
use crate::error::{MosError, Result};

type Canvas = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Figure geometry
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
            margin: 40,
        }
    }
}

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const HISTOGRAM: Rgb<u8> = Rgb([135, 206, 235]);
const CURVE: Rgb<u8> = Rgb([0, 0, 0]);
const ERROR_BAR: Rgb<u8> = Rgb([30, 30, 30]);
const PALETTE: [Rgb<u8>; 4] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
];

/// Maps data coordinates onto the plot area of a canvas
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Frame {
    fn new(config: &PlotConfig, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        let m = config.margin as f64;
        Self {
            left: m,
            right: config.width as f64 - m,
            top: m,
            bottom: config.height as f64 - m,
            x_range,
            y_range,
        }
    }

    fn x(&self, value: f64) -> f64 {
        let (lo, hi) = self.x_range;
        self.left + (value - lo) / (hi - lo) * (self.right - self.left)
    }

    fn y(&self, value: f64) -> f64 {
        let (lo, hi) = self.y_range;
        let clamped = value.clamp(lo, hi);
        self.bottom - (clamped - lo) / (hi - lo) * (self.bottom - self.top)
    }
}

fn blank(config: &PlotConfig) -> Canvas {
    ImageBuffer::from_pixel(config.width, config.height, BACKGROUND)
}

fn put(img: &mut Canvas, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect(img: &mut Canvas, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb<u8>) {
    let (xa, xb) = (x0.min(x1).round() as i64, x0.max(x1).round() as i64);
    let (ya, yb) = (y0.min(y1).round() as i64, y0.max(y1).round() as i64);
    for y in ya..=yb {
        for x in xa..=xb {
            put(img, x, y, color);
        }
    }
}

/// Two-pixel line by uniform stepping
fn line(img: &mut Canvas, (x0, y0): (f64, f64), (x1, y1): (f64, f64), color: Rgb<u8>) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as i64;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = (x0 + t * (x1 - x0)).round() as i64;
        let y = (y0 + t * (y1 - y0)).round() as i64;
        put(img, x, y, color);
        put(img, x, y + 1, color);
    }
}

fn axes(img: &mut Canvas, frame: &Frame, gridlines: &[f64]) {
    for &g in gridlines {
        let y = frame.y(g);
        line(img, (frame.left, y), (frame.right, y), GRID);
    }
    line(img, (frame.left, frame.bottom), (frame.right, frame.bottom), AXIS);
    line(img, (frame.left, frame.top), (frame.left, frame.bottom), AXIS);
}

fn save_png(img: &Canvas, path: &Path) -> Result<()> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| MosError::Plot {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    write_atomic(path, &bytes)?;
    info!("plot saved to {}", path.display());
    Ok(())
}

/// Population standard deviation, as used for the fitted curve
fn population_sd(scores: &[f64], mean: f64) -> f64 {
    let ss: f64 = scores.iter().map(|x| (x - mean) * (x - mean)).sum();
    (ss / scores.len() as f64).sqrt()
}

/// Density per integer score of the rating scale
pub fn score_density(scores: &[f64], min_score: u32, max_score: u32) -> Vec<f64> {
    let n = scores.len().max(1) as f64;
    (min_score..=max_score)
        .map(|s| scores.iter().filter(|&&x| x == s as f64).count() as f64 / n)
        .collect()
}

/// Histogram of one group's scores (unit-width bins centred on each
/// rating) with the normal density of matching mean and spread on top.
pub fn histogram(
    scores: &[f64],
    (min_score, max_score): (u32, u32),
    config: &PlotConfig,
    output_path: &Path,
) -> Result<()> {
    let Some(mu) = mean(scores) else {
        return Err(MosError::Plot {
            path: output_path.to_path_buf(),
            message: "no scores to plot".into(),
        });
    };
    let sd = population_sd(scores, mu);
    let density = score_density(scores, min_score, max_score);
    let (lo, hi) = (min_score as f64, max_score as f64);

    let samples = 200;
    let curve: Vec<(f64, f64)> = if sd > 0.0 {
        (0..=samples)
            .map(|i| {
                let x = lo + (hi - lo) * i as f64 / samples as f64;
                (x, normal_pdf(x, mu, sd))
            })
            .collect()
    } else {
        Vec::new()
    };

    let peak = density
        .iter()
        .copied()
        .chain(curve.iter().map(|&(_, y)| y))
        .fold(0.0f64, f64::max);
    let y_top = if peak > 0.0 { peak * 1.1 } else { 1.0 };

    let mut img = blank(config);
    let frame = Frame::new(config, (lo - 0.5, hi + 0.5), (0.0, y_top));
    let grid: Vec<f64> = (1..=4).map(|i| y_top * i as f64 / 5.0).collect();
    axes(&mut img, &frame, &grid);

    for (offset, d) in density.iter().enumerate() {
        let centre = lo + offset as f64;
        fill_rect(
            &mut img,
            frame.x(centre - 0.45),
            frame.y(*d),
            frame.x(centre + 0.45),
            frame.y(0.0),
            HISTOGRAM,
        );
    }
    for pair in curve.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        line(&mut img, (frame.x(x0), frame.y(y0)), (frame.x(x1), frame.y(y1)), CURVE);
    }

    save_png(&img, output_path)
}

/// Bars of group means with confidence-interval whiskers
pub fn mean_bars(
    bars: &[MeanCi],
    (min_score, max_score): (u32, u32),
    config: &PlotConfig,
    output_path: &Path,
) -> Result<()> {
    let top = bars
        .iter()
        .filter_map(|b| b.upper)
        .fold(max_score as f64, f64::max)
        + 0.5;
    let mut img = blank(config);
    let frame = Frame::new(config, (0.0, bars.len().max(1) as f64), (0.0, top));
    let grid: Vec<f64> = (min_score..=max_score).map(f64::from).collect();
    axes(&mut img, &frame, &grid);

    for (i, bar) in bars.iter().enumerate() {
        let Some(m) = bar.mean else { continue };
        let centre = i as f64 + 0.5;
        fill_rect(
            &mut img,
            frame.x(centre - 0.3),
            frame.y(m),
            frame.x(centre + 0.3),
            frame.y(0.0),
            PALETTE[i % PALETTE.len()],
        );
        if let (Some(lower), Some(upper)) = (bar.lower, bar.upper) {
            let x = frame.x(centre);
            let cap = frame.x(centre + 0.08) - x;
            line(&mut img, (x, frame.y(lower)), (x, frame.y(upper)), ERROR_BAR);
            for v in [lower, upper] {
                line(&mut img, (x - cap, frame.y(v)), (x + cap, frame.y(v)), ERROR_BAR);
            }
        }
    }

    save_png(&img, output_path)
}
