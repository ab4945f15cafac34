use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use harvest_engine::{HarvestSettings, SessionSettings, SourceSettings, TransportSettings};
use serde::{Deserialize, Serialize};

/// Contents of a RON run file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub harvest: HarvestSettings,
    #[serde(default)]
    pub transport: TransportSettings,
    #[serde(default)]
    pub session: SessionSettings,
    pub source: SourceSettings,
}

/// Values from flags or the environment that win over the run file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub storage_root: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub limit: Option<usize>,
    pub collections: Vec<String>,
}

impl RunConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading run file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing run file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: RunConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(root) = &overrides.storage_root {
            self.harvest.storage_root = root.clone();
        }
        if let Some(concurrency) = overrides.concurrency {
            self.harvest.concurrency = concurrency;
        }
        if overrides.limit.is_some() {
            self.harvest.max_items = overrides.limit;
        }
        let collections = normalize_collections(&overrides.collections);
        if !collections.is_empty() {
            self.harvest.collections = collections;
        }
        if self.session.referer.is_none() {
            self.session.referer = Some(self.source.platform.referer().to_string());
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.source.url.trim().is_empty() {
            bail!("source.url must not be empty");
        }
        if self.harvest.concurrency == 0 {
            bail!("harvest.concurrency must be at least 1");
        }
        Ok(())
    }
}

/// Lowercased names with list punctuation (`[`, `]`, quotes) stripped.
fn normalize_collections(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|entry| entry.split(','))
        .map(|name| {
            name.chars()
                .filter(|c| !matches!(c, '[' | ']' | '"' | '\''))
                .collect::<String>()
                .trim()
                .to_lowercase()
        })
        .filter(|name| !name.is_empty())
        .collect()
}
