//! Application configuration management.
//!
//! Configuration is stored at `~/.config/highseas/config.json`; every field
//! has a default so the file is optional. The record API key is only ever
//! read from the environment (`AIRTABLE_API_KEY`) and never written back.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_BASE_URL;
use crate::grouping::OrphanPolicy;
use crate::service::ServiceSettings;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "highseas";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable holding the record API key
pub const API_KEY_ENV: &str = "AIRTABLE_API_KEY";

/// Environment variable overriding the record API base id
pub const BASE_ID_ENV: &str = "AIRTABLE_BASE_ID";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub airtable_base_url: String,
    pub airtable_base_id: Option<String>,
    #[serde(skip)]
    pub airtable_api_key: Option<String>,
    pub ships_ttl_secs: u64,
    pub person_ttl_secs: u64,
    pub ships_cache_capacity: usize,
    pub person_cache_capacity: usize,
    /// Orders created on or before this date (YYYY-MM-DD) are ignored
    pub orders_cutoff: String,
    pub orphan_policy: OrphanPolicy,
    pub shop_catalog_path: Option<PathBuf>,
    pub order_cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let settings = ServiceSettings::default();
        Self {
            airtable_base_url: DEFAULT_BASE_URL.to_string(),
            airtable_base_id: None,
            airtable_api_key: None,
            ships_ttl_secs: settings.ships_ttl.as_secs(),
            person_ttl_secs: settings.person_ttl.as_secs(),
            ships_cache_capacity: settings.ships_capacity,
            person_cache_capacity: settings.person_capacity,
            orders_cutoff: settings.orders_cutoff,
            orphan_policy: settings.orphan_policy,
            shop_catalog_path: None,
            order_cache_dir: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.airtable_api_key = Some(key);
        }
        if let Some(base) = lookup(BASE_ID_ENV).filter(|v| !v.is_empty()) {
            self.airtable_base_id = Some(base);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for persisted order snapshots.
    pub fn order_cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.order_cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join("orders"))
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            ships_ttl: Duration::from_secs(self.ships_ttl_secs),
            person_ttl: Duration::from_secs(self.person_ttl_secs),
            ships_capacity: self.ships_cache_capacity,
            person_capacity: self.person_cache_capacity,
            orders_cutoff: self.orders_cutoff.clone(),
            orphan_policy: self.orphan_policy,
        }
    }
}
