//! Import configuration loaded from TOML.
//!
//! ```toml
//! database = "world.sqlite"
//! seed_instances_path = "data/instances.json"
//! seed_items_path = "data/items.json"
//! healing_override_items = [30049]
//!
//! [tokens]
//! 29753 = [29019, 29029]
//! ```

use crate::error::{ItemSeedError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    database: Option<PathBuf>,
    seed_instances_path: Option<PathBuf>,
    seed_items_path: Option<PathBuf>,
    #[serde(default)]
    healing_override_items: Vec<u32>,
    #[serde(default)]
    tokens: BTreeMap<String, Vec<u32>>,
}

/// Paths and data tables for one import run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportConfig {
    pub database: Option<PathBuf>,
    pub seed_instances_path: Option<PathBuf>,
    pub seed_items_path: Option<PathBuf>,
    /// Items whose spell-damage aura is credited to healing power
    pub healing_override_items: Vec<u32>,
    /// Token item ID to the reward item IDs it is turned in for
    pub tokens: HashMap<u32, Vec<u32>>,
}

impl ImportConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ItemSeedError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config from {:?}: {}", path, e),
            ))
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| ItemSeedError::Config(format!("Failed to parse config TOML: {}", e)))?;

        let mut tokens = HashMap::with_capacity(raw.tokens.len());
        for (key, rewards) in raw.tokens {
            let token_id: u32 = key
                .trim()
                .parse()
                .map_err(|_| ItemSeedError::Config(format!("Invalid token item ID '{}'", key)))?;
            if rewards.is_empty() {
                tracing::warn!("Token #{} has no reward items configured", token_id);
            }
            tokens.insert(token_id, rewards);
        }

        Ok(Self {
            database: raw.database,
            seed_instances_path: raw.seed_instances_path,
            seed_items_path: raw.seed_items_path,
            healing_override_items: raw.healing_override_items,
            tokens,
        })
    }
}
