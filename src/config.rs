use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{Dataset, EUROSTAT_BULK_URL};
use crate::error::ReshapeError;
use crate::layout::Layout;

pub const DEFAULT_CONFIG_FILE: &str = "eurostat-reshape.json";
pub const DEFAULT_OUTPUT_DIR: &str = "dataset";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub cache_dir: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Dataset name to full URL, replacing the bulk listing link.
    #[serde(default)]
    pub urls: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub output_dir: Utf8PathBuf,
    pub cache_dir: Utf8PathBuf,
    pub timeout: Duration,
    pub base_url: String,
    pub urls: BTreeMap<Dataset, String>,
}

impl ResolvedConfig {
    pub fn url_for(&self, dataset: Dataset) -> String {
        self.urls
            .get(&dataset)
            .cloned()
            .unwrap_or_else(|| dataset.default_url(&self.base_url))
    }

    pub fn layout(&self) -> Layout {
        Layout::new(self.output_dir.clone(), self.cache_dir.clone())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `eurostat-reshape.json` when present. Without either, defaults apply.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ReshapeError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ReshapeError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| ReshapeError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, ReshapeError> {
        let cache_dir = match config.cache_dir {
            Some(dir) => Utf8PathBuf::from(dir),
            None => Layout::default_cache_root()?,
        };

        let urls = config
            .urls
            .into_iter()
            .map(|(name, url)| Ok((name.parse::<Dataset>()?, url)))
            .collect::<Result<BTreeMap<_, _>, ReshapeError>>()?;

        Ok(ResolvedConfig {
            output_dir: Utf8PathBuf::from(
                config
                    .output_dir
                    .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            ),
            cache_dir,
            timeout: Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            base_url: config
                .base_url
                .unwrap_or_else(|| EUROSTAT_BULK_URL.to_string()),
            urls,
        })
    }
}
