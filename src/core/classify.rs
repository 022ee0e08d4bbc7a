// src/core/classify.rs
//
// Maps a rated file path to its (model, pitch factor) group and to the
// segment it was cut from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{ModelTable, PathLayout, PitchTable, SurveyConfig, UNKNOWN_MODEL};

/// Group a rating belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassificationKey {
    pub model: String,
    pub pitch_factor: String,
}

impl ClassificationKey {
    pub fn new(model: impl Into<String>, pitch_factor: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            pitch_factor: pitch_factor.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.model == UNKNOWN_MODEL
    }
}

impl fmt::Display for ClassificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.model, self.pitch_factor)
    }
}

/// Path classifier bound to one run's model and pitch tables
#[derive(Debug, Clone)]
pub struct PathClassifier<'a> {
    models: &'a ModelTable,
    pitch_factors: &'a PitchTable,
    layout: PathLayout,
}

impl<'a> PathClassifier<'a> {
    pub fn new(models: &'a ModelTable, pitch_factors: &'a PitchTable, layout: PathLayout) -> Self {
        Self {
            models,
            pitch_factors,
            layout,
        }
    }

    pub fn from_config(config: &'a SurveyConfig) -> Self {
        Self::new(&config.models, &config.pitch_factors, config.layout)
    }

    /// Classify a source path.
    ///
    /// Never fails: a path without a model directory lands in the
    /// `unknown_model` bucket, and a token missing from the model table is
    /// passed through for the store to reject.
    pub fn classify(&self, path: &str) -> ClassificationKey {
        let baseline = self.pitch_factors.baseline();
        let token = match self.layout.model_token(path) {
            Some(token) => token,
            None => return ClassificationKey::new(UNKNOWN_MODEL, baseline),
        };

        // Natural recordings are never pitch-shifted
        if self.models.is_reference(token) {
            let name = self.models.resolve(token).unwrap_or(token);
            return ClassificationKey::new(name, baseline);
        }

        let pitch = self
            .pitch_factors
            .detect(file_name(path))
            .unwrap_or(baseline);
        let model = self.models.resolve(token).unwrap_or(token);
        ClassificationKey::new(model, pitch)
    }

    /// True when the layout finds a model directory in `path`. Only paths
    /// without one belong in the `unknown_model` bucket.
    pub fn has_model_token(&self, path: &str) -> bool {
        self.layout.model_token(path).is_some()
    }

    /// File name with the pitch marker and extension removed.
    ///
    /// `BC_seg13_f2.00.wav` and `BC_seg13.wav` share the segment `BC_seg13`.
    pub fn segment_id(&self, path: &str) -> String {
        let mut name = file_name(path).to_string();
        for marker in self.pitch_factors.markers() {
            for sep in ["_", "-"] {
                name = name.replace(&format!("{}{}", sep, marker), "");
            }
            name = name.replace(marker.as_str(), "");
        }
        match name.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem.to_string(),
            _ => name,
        }
    }
}

/// Last component of a `/` or `\` separated path
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
