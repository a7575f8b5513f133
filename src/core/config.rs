use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Financing structure assumed when a deal does not spell one out.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ScreeningDefaults {
    pub down_payment_pct: f64,
    pub seller_note_pct: f64,
    pub sba_rate_annual_pct: f64,
    pub sba_term_years: f64,
    pub seller_note_rate_annual_pct: f64,
    pub seller_note_term_years: f64,
}

impl Default for ScreeningDefaults {
    fn default() -> Self {
        ScreeningDefaults {
            down_payment_pct: 10.0,
            seller_note_pct: 10.0,
            sba_rate_annual_pct: 10.5,
            sba_term_years: 10.0,
            seller_note_rate_annual_pct: 6.0,
            seller_note_term_years: 5.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    pub journal_path: Option<String>,
    #[serde(default)]
    pub screening: ScreeningDefaults,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("io", "dealscope", "dealscope")
        .context("Could not determine project directories")
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_journal_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join("journal.yaml"))
    }

    /// Journal location: the configured path if any, otherwise the platform data dir.
    pub fn journal_path(&self) -> Result<PathBuf> {
        match &self.journal_path {
            Some(custom_path) => Ok(PathBuf::from(custom_path)),
            None => Self::default_journal_path(),
        }
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
