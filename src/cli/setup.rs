use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

// Embedded so `setup` works from an installed binary.
const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");
const EXAMPLE_JOURNAL: &str = include_str!("../../docs/example_journal.yaml");

/// Creates the default configuration and an example journal at the default locations
pub fn setup() -> Result<()> {
    let config_path = AppConfig::default_config_path()?;
    let journal_path = AppConfig::default_journal_path()?;
    setup_at_path(&config_path, &journal_path)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Creates the configuration file at `config_path`, and an example journal at
/// `journal_path` unless one is already there.
pub fn setup_at_path<P: AsRef<Path>, Q: AsRef<Path>>(config_path: P, journal_path: Q) -> Result<()> {
    let config_path = config_path.as_ref();
    let journal_path = journal_path.as_ref();

    if config_path.exists() {
        anyhow::bail!(
            "Configuration file already exists at {}",
            config_path.display()
        );
    }

    write_file(config_path, EXAMPLE_CONFIG)?;
    info!("Created default configuration at {}", config_path.display());

    if journal_path.exists() {
        info!("Keeping existing journal at {}", journal_path.display());
    } else {
        write_file(journal_path, EXAMPLE_JOURNAL)?;
        info!("Created example journal at {}", journal_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::journal::Journal;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_setup_creates_config_and_journal() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config").join("config.yaml");
        let journal_path = temp_dir.path().join("data").join("journal.yaml");

        setup_at_path(&config_path, &journal_path)?;

        assert!(config_path.exists());
        assert!(journal_path.exists());
        let content = fs::read_to_string(&config_path)?;
        assert!(content.contains("# Example configuration file for dealscope"));
        assert!(content.contains("screening:"));

        Ok(())
    }

    #[test]
    fn test_setup_keeps_existing_journal() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        let journal_path = temp_dir.path().join("journal.yaml");
        fs::write(&journal_path, "deals: []\n")?;

        setup_at_path(&config_path, &journal_path)?;

        assert_eq!(fs::read_to_string(&journal_path)?, "deals: []\n");
        Ok(())
    }

    #[test]
    fn test_setup_fails_if_config_exists() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        let journal_path = temp_dir.path().join("journal.yaml");

        std::fs::write(&config_path, "test")?;

        let result = setup_at_path(&config_path, &journal_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
        assert!(!journal_path.exists());

        Ok(())
    }

    #[test]
    fn test_examples_are_valid_yaml() -> Result<()> {
        let config: AppConfig = serde_yaml::from_str(EXAMPLE_CONFIG)
            .context("Failed to parse example config as YAML")?;
        assert!(config.screening.sba_term_years > 0.0);

        let journal = Journal::parse(EXAMPLE_JOURNAL).context("Failed to parse example journal")?;
        assert!(!journal.deals.is_empty());
        assert!(!journal.activities.is_empty());

        Ok(())
    }
}
