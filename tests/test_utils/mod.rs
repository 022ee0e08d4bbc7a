// tests/test_utils/mod.rs
//
// Throw-away survey directories for the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use uuid::Uuid;

use mosstat::pipeline::RunPaths;

pub fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_mosstat"))
}

/// `mosstat` with its working directory set to `dir`
pub fn mosstat_in(dir: &Path) -> Command {
    let mut cmd = Command::new(binary_path());
    cmd.current_dir(dir).env_remove("RUST_LOG").env_remove("MOSSTAT_CONFIG");
    cmd
}

/// Survey layout under the system temp dir, removed on drop
pub struct SurveyFixture {
    pub root: PathBuf,
}

impl SurveyFixture {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("mosstat_test_{}", Uuid::new_v4()));
        fs::create_dir_all(root.join("results")).expect("create fixture dir");
        Self { root }
    }

    pub fn input_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    pub fn analysis_dir(&self) -> PathBuf {
        self.root.join("analysis")
    }

    pub fn summary_file(&self) -> PathBuf {
        self.root.join("results.csv")
    }

    pub fn paths(&self) -> RunPaths {
        RunPaths {
            input_dir: self.input_dir(),
            summary_file: self.summary_file(),
            analysis_dir: self.analysis_dir(),
            audio_root: self.root.clone(),
        }
    }

    /// One rater file of `path,score` rows
    pub fn write_rater(&self, name: &str, rows: &[(&str, &str)]) -> PathBuf {
        let body: String = rows
            .iter()
            .map(|(path, score)| format!("{},{}\n", path, score))
            .collect();
        self.write_raw(name, &body)
    }

    pub fn write_raw(&self, name: &str, body: &str) -> PathBuf {
        let path = self.input_dir().join(name);
        fs::write(&path, body).expect("write rater file");
        path
    }

    /// Create a dummy audio file at a survey-relative path
    pub fn touch_audio(&self, relative: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create audio dir");
        }
        fs::write(&path, relative.as_bytes()).expect("write audio file");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root.join(relative)).expect("read output")
    }
}

impl Drop for SurveyFixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Rows of a CSV report, header included
pub fn csv_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| line.split(',').map(|f| f.to_string()).collect())
        .collect()
}
