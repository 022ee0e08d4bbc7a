//! Error types shared by the library modules

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MosError>;

#[derive(Debug, Error)]
pub enum MosError {
    /// A path resolved to a model that is not in the configured model table
    #[error("unknown model `{model}` (from {path}); add it to the model table or fix the input")]
    UnknownModel { model: String, path: String },

    /// A pitch factor outside the configured pitch-factor table
    #[error("unknown pitch factor `{pitch_factor}` (from {path})")]
    UnknownPitchFactor { pitch_factor: String, path: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("input directory not found: {}", .0.display())]
    NoInput(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to render plot {}: {message}", path.display())]
    Plot { path: PathBuf, message: String },
}

impl MosError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
