//! Harness Configuration
//!
//! Dataset directory layout and engine sidecar settings, stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dataset::Split;

/// Harness settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Dataset directory layout
    pub data: DataConfig,
    /// OCR engine sidecar settings
    pub engine: EngineConfig,
}

/// Dataset directory layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the preprocessed split CSVs and evaluation output
    pub clean_dir: PathBuf,
    /// Directory for auxiliary run artifacts
    pub output_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            clean_dir: PathBuf::from("data/clean"),
            output_dir: PathBuf::from("outputs"),
        }
    }
}

/// OCR engine sidecar settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interpreter used to run the bridge script
    pub python: String,
    /// Path to the bridge script
    pub script: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            script: PathBuf::from("bridge/paddle_bridge.py"),
        }
    }
}

impl DataConfig {
    /// Create the configured directories if they don't exist
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.clean_dir)?;
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Path of the input CSV for a split
    pub fn split_csv_path(&self, split: Split) -> PathBuf {
        self.clean_dir.join(format!("{split}.csv"))
    }

    /// Path of the evaluation output CSV for a split
    pub fn eval_csv_path(&self, split: Split) -> PathBuf {
        self.clean_dir.join(format!("ocr_eval_{split}.csv"))
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<EvalConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: EvalConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &EvalConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
