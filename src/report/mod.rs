//! Report files: CSV tables, plots, JSON summary and listening artifacts
//!
//! Every file goes through [`write_atomic`], so a report on disk is either
//! complete or absent.

pub mod artifacts;
pub mod json;
pub mod plots;
pub mod tables;

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::RankingTable;
use crate::error::{MosError, Result};

pub use artifacts::{copy_top_k, CopyReport};
pub use json::{JsonReport, RunMetadata};

/// Sentinel written for undefined numbers
pub const UNDEFINED: &str = "NaN";

/// Three decimals, or the undefined sentinel
pub fn fmt3(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.3}", v),
        _ => UNDEFINED.to_string(),
    }
}

/// Scientific notation for p-values, which are often tiny
pub fn fmt_p(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{:.3e}", v),
        _ => UNDEFINED.to_string(),
    }
}

/// Sibling path used while a report is being written
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Create the parent directory of `path` if needed
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| MosError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Write through a temporary sibling and rename into place
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent(path)?;
    let tmp = temp_sibling(path);
    if let Err(e) = fs::write(&tmp, contents) {
        let _ = fs::remove_file(&tmp);
        return Err(MosError::io(&tmp, e));
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        MosError::io(path, e)
    })
}

/// `{analysis}/compare_voice/{A}_vs_{B}/{pitch}`
pub fn ranking_dir(analysis_dir: &Path, table: &RankingTable) -> PathBuf {
    analysis_dir
        .join("compare_voice")
        .join(table.pair.label())
        .join(&table.pitch_factor)
}

pub fn ranking_file(analysis_dir: &Path, table: &RankingTable) -> PathBuf {
    ranking_dir(analysis_dir, table).join(format!("ranking_{}.csv", table.pair.label()))
}

pub fn figure_dir(analysis_dir: &Path) -> PathBuf {
    analysis_dir.join("fig")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelPair;

    #[test]
    fn test_number_formatting() {
        assert_eq!(fmt3(Some(4.0)), "4.000");
        assert_eq!(fmt3(Some(2.34567)), "2.346");
        assert_eq!(fmt3(None), "NaN");
        assert_eq!(fmt3(Some(f64::NAN)), "NaN");
        assert_eq!(fmt_p(Some(0.000123)), "1.230e-4");
        assert_eq!(fmt_p(None), "NaN");
    }

    #[test]
    fn test_atomic_write_replaces_file() {
        let dir = std::env::temp_dir().join(format!("mosstat_report_{}", std::process::id()));
        let path = dir.join("nested").join("out.csv");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_sibling(&path).exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_ranking_location() {
        let table = RankingTable {
            pitch_factor: "f2.00".into(),
            pair: ModelPair::new("SiFiGAN", "VAE_SiFiGAN_v1"),
            records: Vec::new(),
            median_a: None,
            median_b: None,
            total_raters: 0,
        };
        assert_eq!(
            ranking_file(Path::new("analysis"), &table),
            Path::new("analysis/compare_voice/SiFiGAN_vs_VAE_SiFiGAN_v1/f2.00/ranking_SiFiGAN_vs_VAE_SiFiGAN_v1.csv")
        );
    }
}
