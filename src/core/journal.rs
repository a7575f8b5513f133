//! Read-only access to the YAML journal of deals and logged activities.
use crate::core::records::{ActivityRecord, DealRecord};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Journal {
    #[serde(default)]
    pub deals: Vec<DealRecord>,
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
}

impl Journal {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let journal_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read journal file: {}", path.display()))?;
        let journal = Self::parse(&journal_str)
            .with_context(|| format!("Failed to parse journal file: {}", path.display()))?;
        debug!(
            deals = journal.deals.len(),
            activities = journal.activities.len(),
            "Loaded journal"
        );
        Ok(journal)
    }

    pub fn parse(journal_str: &str) -> Result<Self> {
        // An empty file is an empty journal rather than a parse error.
        if journal_str.trim().is_empty() {
            return Ok(Journal::default());
        }
        Ok(serde_yaml::from_str(journal_str)?)
    }

    /// Finds a deal by id, falling back to a case-insensitive company name match.
    pub fn find_deal(&self, key: &str) -> Option<&DealRecord> {
        self.deals.iter().find(|d| d.id == key).or_else(|| {
            self.deals
                .iter()
                .find(|d| d.company.eq_ignore_ascii_case(key))
        })
    }
}
