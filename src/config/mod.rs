//! Configuration module for mosstat

mod survey;
mod taxonomy;

pub use survey::{ConfigBuilder, LayoutPreset, ModelPair, SurveyConfig};
pub use taxonomy::{ModelSpec, ModelTable, PathLayout, PitchTable, UNKNOWN_MODEL};
