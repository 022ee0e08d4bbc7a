// src/config/taxonomy.rs
//
// Closed tables of synthesis models and pitch factors, and the path layout
// used to find the model name inside a source path.

use serde::{Deserialize, Serialize};

/// Model token used when a path is too short to carry a model directory
pub const UNKNOWN_MODEL: &str = "unknown_model";

/// One entry of the model table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    /// The natural recordings; never pitch-shifted
    #[serde(default)]
    pub reference: bool,
}

impl ModelSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: false,
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reference: true,
        }
    }
}

/// Ordered set of models known to a run. Table order is report order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelTable {
    models: Vec<ModelSpec>,
}

impl Default for ModelTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ModelTable {
    pub fn new(models: Vec<ModelSpec>) -> Self {
        Self { models }
    }

    /// natural, SiFiGAN and the two VAE-SiFiGAN variants
    pub fn standard() -> Self {
        Self::new(vec![
            ModelSpec::reference("natural"),
            ModelSpec::new("SiFiGAN"),
            ModelSpec::new("VAE_SiFiGAN_v1"),
            ModelSpec::new("VAE_SiFiGAN_v2"),
        ])
    }

    pub fn models(&self) -> &[ModelSpec] {
        &self.models
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn reference(&self) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.reference)
    }

    /// Case-insensitive match against the reference model name
    pub fn is_reference(&self, token: &str) -> bool {
        self.reference()
            .map(|r| r.name.eq_ignore_ascii_case(token))
            .unwrap_or(false)
    }

    /// Canonical table spelling for a path token.
    ///
    /// The reference model matches case-insensitively ("Natural" and
    /// "natural" are the same bucket); every other model matches exactly.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.models
            .iter()
            .find(|m| {
                if m.reference {
                    m.name.eq_ignore_ascii_case(token)
                } else {
                    m.name == token
                }
            })
            .map(|m| m.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.iter().any(|m| m.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.models.iter().position(|m| m.name == name)
    }
}

/// Ordered pitch-factor markers plus the unshifted baseline.
///
/// Marker order is detection priority: the first marker found in a file
/// name wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchTable {
    markers: Vec<String>,
    baseline: String,
}

impl Default for PitchTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl PitchTable {
    pub fn new(markers: Vec<String>, baseline: impl Into<String>) -> Self {
        Self {
            markers,
            baseline: baseline.into(),
        }
    }

    pub fn standard() -> Self {
        Self::new(
            vec!["f0.50".to_string(), "f1.00".to_string(), "f2.00".to_string()],
            "f1.00",
        )
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| m == marker)
    }

    /// First marker (in priority order) contained in `file_name`
    pub fn detect(&self, file_name: &str) -> Option<&str> {
        self.markers
            .iter()
            .find(|m| file_name.contains(m.as_str()))
            .map(|m| m.as_str())
    }

    /// Baseline first, then the other markers in table order
    pub fn report_order(&self) -> Vec<&str> {
        let mut order = Vec::with_capacity(self.markers.len());
        if self.contains(&self.baseline) {
            order.push(self.baseline.as_str());
        }
        order.extend(
            self.markers
                .iter()
                .map(|m| m.as_str())
                .filter(|m| *m != self.baseline),
        );
        order
    }
}

/// Where the model name sits inside a source path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathLayout {
    /// Fixed component counted from the start of the path
    /// (`wav/set1/SiFiGAN/x.wav` has the model at index 2)
    FromRoot { index: usize },
    /// Directory that directly contains the file; paths need at least
    /// three components
    ParentDir,
}

impl Default for PathLayout {
    fn default() -> Self {
        Self::FromRoot { index: 2 }
    }
}

impl PathLayout {
    /// Model token of `path`, or `None` when the path does not have a
    /// directory component at the configured position.
    pub fn model_token<'a>(&self, path: &'a str) -> Option<&'a str> {
        let parts: Vec<&str> = path.split(['/', '\\']).collect();
        // Last component is the file itself
        let dirs = parts.len().saturating_sub(1);
        let token = match *self {
            PathLayout::FromRoot { index } => {
                if index < dirs {
                    parts[index]
                } else {
                    return None;
                }
            }
            // Needs at least `set/<model>/<file>`
            PathLayout::ParentDir => {
                if dirs >= 2 {
                    parts[dirs - 1]
                } else {
                    return None;
                }
            }
        };
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }

    pub fn describe(&self) -> String {
        match self {
            PathLayout::FromRoot { index } => format!("path component #{}", index),
            PathLayout::ParentDir => "parent directory".to_string(),
        }
    }
}
