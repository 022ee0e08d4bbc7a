// src/config/survey.rs
//
// Run configuration: model/pitch tables, path layout and statistics settings.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::taxonomy::{ModelTable, PathLayout, PitchTable};
use crate::error::{MosError, Result};

/// Preset directory layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPreset {
    /// `wav/setN/<model>/<file>`: model is the third path component
    Survey,
    /// `.../<model>/<file>`: model is the directory holding the file
    Listing,
    /// User-adjusted settings
    Custom,
}

impl LayoutPreset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "survey" => Some(Self::Survey),
            "listing" => Some(Self::Listing),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Survey => "survey",
            Self::Listing => "listing",
            Self::Custom => "custom",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Survey => "model name is path component #2 (wav/setN/<model>/...)",
            Self::Listing => "model name is the file's parent directory",
            Self::Custom => "user-defined layout",
        }
    }

    pub fn layout(&self) -> PathLayout {
        match self {
            Self::Survey | Self::Custom => PathLayout::FromRoot { index: 2 },
            Self::Listing => PathLayout::ParentDir,
        }
    }
}

/// Two models compared segment by segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPair {
    pub a: String,
    pub b: String,
}

impl ModelPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    /// Parse `A:B`
    pub fn parse(spec: &str) -> Option<Self> {
        let (a, b) = spec.split_once(':')?;
        let (a, b) = (a.trim(), b.trim());
        if a.is_empty() || b.is_empty() {
            return None;
        }
        Some(Self::new(a, b))
    }

    pub fn label(&self) -> String {
        format!("{}_vs_{}", self.a, self.b)
    }
}

/// Complete configuration of one aggregation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurveyConfig {
    pub preset: LayoutPreset,
    pub models: ModelTable,
    pub pitch_factors: PitchTable,
    pub layout: PathLayout,
    /// Two-sided confidence level of the mean intervals
    pub confidence: f64,
    /// Significance boundary for the pairwise tests
    pub alpha: f64,
    pub min_score: u32,
    pub max_score: u32,
    /// Segments per comparison whose audio gets copied for review
    pub top_k: usize,
    /// Explicit ranking comparisons; every pair of non-reference models when absent
    pub ranking_pairs: Option<Vec<ModelPair>>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self::from_preset(LayoutPreset::Survey)
    }
}

impl SurveyConfig {
    pub fn from_preset(preset: LayoutPreset) -> Self {
        Self {
            preset,
            models: ModelTable::standard(),
            pitch_factors: PitchTable::standard(),
            layout: preset.layout(),
            confidence: 0.95,
            alpha: 0.05,
            min_score: 1,
            max_score: 5,
            top_k: 10,
            ranking_pairs: None,
        }
    }

    /// Load a JSON configuration file. Missing fields take survey defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| MosError::io(path, e))?;
        let config: Self = serde_json::from_str(&json).map_err(|source| MosError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|source| MosError::Json {
            path: "<config>".into(),
            source,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(MosError::InvalidConfig("model table is empty".into()));
        }
        if self.models.models().iter().filter(|m| m.reference).count() > 1 {
            return Err(MosError::InvalidConfig(
                "more than one reference model".into(),
            ));
        }
        let mut seen = HashSet::new();
        for name in self.models.names() {
            if !seen.insert(name) {
                return Err(MosError::InvalidConfig(format!(
                    "model `{}` listed twice",
                    name
                )));
            }
        }

        if self.pitch_factors.markers().is_empty() {
            return Err(MosError::InvalidConfig("pitch-factor table is empty".into()));
        }
        let mut seen = HashSet::new();
        for marker in self.pitch_factors.markers() {
            if marker.is_empty() {
                return Err(MosError::InvalidConfig("empty pitch-factor marker".into()));
            }
            if !seen.insert(marker.as_str()) {
                return Err(MosError::InvalidConfig(format!(
                    "pitch factor `{}` listed twice",
                    marker
                )));
            }
        }
        if !self.pitch_factors.contains(self.pitch_factors.baseline()) {
            return Err(MosError::InvalidConfig(format!(
                "baseline pitch factor `{}` is not in the pitch-factor table",
                self.pitch_factors.baseline()
            )));
        }

        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(MosError::InvalidConfig(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(MosError::InvalidConfig(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if self.min_score > self.max_score {
            return Err(MosError::InvalidConfig(format!(
                "rating scale {}..={} is empty",
                self.min_score, self.max_score
            )));
        }
        if self.top_k == 0 {
            return Err(MosError::InvalidConfig("top-k must be at least 1".into()));
        }

        if let Some(pairs) = &self.ranking_pairs {
            for pair in pairs {
                for name in [&pair.a, &pair.b] {
                    if !self.models.contains(name) {
                        return Err(MosError::InvalidConfig(format!(
                            "ranking pair {} names unknown model `{}`",
                            pair.label(),
                            name
                        )));
                    }
                }
                if pair.a == pair.b {
                    return Err(MosError::InvalidConfig(format!(
                        "ranking pair {} compares a model with itself",
                        pair.label()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Comparisons used by the ranker
    pub fn ranking_pairs(&self) -> Vec<ModelPair> {
        if let Some(pairs) = &self.ranking_pairs {
            return pairs.clone();
        }
        let candidates: Vec<&str> = self
            .models
            .models()
            .iter()
            .filter(|m| !m.reference)
            .map(|m| m.name.as_str())
            .collect();
        let mut pairs = Vec::new();
        for (i, a) in candidates.iter().enumerate() {
            for b in &candidates[i + 1..] {
                pairs.push(ModelPair::new(*a, *b));
            }
        }
        pairs
    }

    pub fn score_in_scale(&self, score: u32) -> bool {
        (self.min_score..=self.max_score).contains(&score)
    }

    /// Integer percent used in report headers (`lower95`)
    pub fn confidence_label(&self) -> String {
        let pct = self.confidence * 100.0;
        if (pct - pct.round()).abs() < 1e-9 {
            format!("{}", pct.round() as u32)
        } else {
            format!("{}", pct)
        }
    }
}

/// Builder for adjusted configurations
pub struct ConfigBuilder {
    config: SurveyConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SurveyConfig::default(),
        }
    }

    pub fn from_preset(preset: LayoutPreset) -> Self {
        Self {
            config: SurveyConfig::from_preset(preset),
        }
    }

    pub fn from_config(config: SurveyConfig) -> Self {
        Self { config }
    }

    pub fn models(mut self, models: ModelTable) -> Self {
        self.config.models = models;
        self
    }

    pub fn pitch_factors(mut self, pitch_factors: PitchTable) -> Self {
        self.config.pitch_factors = pitch_factors;
        self
    }

    /// Switch to a preset layout, keeping every other setting
    pub fn preset(mut self, preset: LayoutPreset) -> Self {
        self.config.layout = preset.layout();
        self.config.preset = preset;
        self
    }

    pub fn layout(mut self, layout: PathLayout) -> Self {
        self.config.layout = layout;
        self.config.preset = LayoutPreset::Custom;
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.config.confidence = confidence;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.config.alpha = alpha;
        self
    }

    pub fn score_range(mut self, min: u32, max: u32) -> Self {
        self.config.min_score = min;
        self.config.max_score = max;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    pub fn ranking_pair(mut self, pair: ModelPair) -> Self {
        self.config
            .ranking_pairs
            .get_or_insert_with(Vec::new)
            .push(pair);
        self
    }

    pub fn build(self) -> Result<SurveyConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
