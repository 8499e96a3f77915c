//! TOML pipeline configuration.

use std::path::{Path, PathBuf};

use invox_core::LabelTable;
use serde::Deserialize;
use thiserror::Error;

use crate::pipeline::PipelineOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Deployment-level pipeline settings. Every field has a default, so an
/// empty file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding `model.onnx`, `tokenizer.json`, `config.json`.
    pub model_dir: Option<PathBuf>,
    /// Tesseract data directory; engine default when unset.
    pub tessdata_dir: Option<PathBuf>,
    pub ocr_language: String,
    pub require_text: bool,
    pub labels: LabelTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            tessdata_dir: None,
            ocr_language: "eng".to_string(),
            require_text: false,
            labels: LabelTable::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub fn options(&self) -> PipelineOptions {
        PipelineOptions { require_text: self.require_text }
    }
}
