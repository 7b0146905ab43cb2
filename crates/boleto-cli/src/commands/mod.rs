//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod process;
pub mod validate;

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::debug;

use boleto_core::models::config::{EngineKind, ValidationMode};
use boleto_core::BoletoConfig;

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("boleto")
        .join("config.json")
}

/// Load the explicit config file, else the default one if it exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BoletoConfig> {
    if let Some(path) = config_path {
        return Ok(BoletoConfig::from_file(Path::new(path))?);
    }
    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using configuration from {}", default_path.display());
        return Ok(BoletoConfig::from_file(&default_path)?);
    }
    Ok(BoletoConfig::default())
}

/// Command-line overrides shared by `process` and `batch`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub text_only: bool,
    pub model_dir: Option<PathBuf>,
    pub strict: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut BoletoConfig) {
        if self.text_only {
            config.recognition.engines = vec![EngineKind::EmbeddedText];
        }
        if let Some(dir) = &self.model_dir {
            config.models.model_dir = dir.clone();
        }
        if self.strict {
            config.validation.payment_line_mode = ValidationMode::Strict;
        }
    }
}

/// The evaluation date, today unless given.
pub fn evaluation_date(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}
