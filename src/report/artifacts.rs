// src/report/artifacts.rs
//
// Copies the audio behind the top-ranked segments next to their ranking,
// so the largest disagreements can be listened to side by side.

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::classify::file_name;
use crate::core::RankingTable;
use crate::error::{MosError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyReport {
    pub copied: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

impl CopyReport {
    pub fn merge(&mut self, other: CopyReport) {
        self.copied.extend(other.copied);
        self.missing.extend(other.missing);
    }
}

/// `{stem}_{model}.{ext}` for a source path
pub fn artifact_name(source: &str, model: &str) -> String {
    let name = file_name(source);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, model, ext),
        _ => format!("{}_{}", name, model),
    }
}

/// Copy both sides of the first `k` ranked segments into `dest_dir`.
/// Sources resolve against `audio_root`; missing ones are only reported.
pub fn copy_top_k(table: &RankingTable, k: usize, audio_root: &Path, dest_dir: &Path) -> Result<CopyReport> {
    fs::create_dir_all(dest_dir).map_err(|e| MosError::io(dest_dir, e))?;

    let mut report = CopyReport::default();
    for record in table.top_k(k) {
        for (source, model) in [
            (&record.source_a, &table.pair.a),
            (&record.source_b, &table.pair.b),
        ] {
            let from = audio_root.join(source);
            let to = dest_dir.join(artifact_name(source, model));
            if !from.is_file() {
                warn!("cannot copy {}: source not found", from.display());
                report.missing.push(from);
                continue;
            }
            match fs::copy(&from, &to) {
                Ok(_) => {
                    debug!("copied {} -> {}", from.display(), to.display());
                    report.copied.push(to);
                }
                Err(e) => {
                    warn!("cannot copy {}: {}", from.display(), e);
                    report.missing.push(from);
                }
            }
        }
    }
    Ok(report)
}
