use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;

use crate::domain::Dataset;
use crate::error::ReshapeError;

/// Where archives are cached and where CSV outputs land.
#[derive(Debug, Clone)]
pub struct Layout {
    output_root: Utf8PathBuf,
    cache_root: Utf8PathBuf,
}

impl Layout {
    pub fn new(output_root: Utf8PathBuf, cache_root: Utf8PathBuf) -> Self {
        Self {
            output_root,
            cache_root,
        }
    }

    /// User cache directory, or the system temp dir when no home is resolvable.
    pub fn default_cache_root() -> Result<Utf8PathBuf, ReshapeError> {
        let path = BaseDirs::new()
            .map(|dirs| dirs.cache_dir().join("eurostat-reshape"))
            .unwrap_or_else(std::env::temp_dir);
        Utf8PathBuf::from_path_buf(path)
            .map_err(|_| ReshapeError::Filesystem("invalid cache path".to_string()))
    }

    pub fn output_root(&self) -> &Utf8Path {
        &self.output_root
    }

    pub fn cache_root(&self) -> &Utf8Path {
        &self.cache_root
    }

    pub fn archive_path(&self, dataset: Dataset) -> Utf8PathBuf {
        self.cache_root.join(format!("{dataset}.tsv.gz"))
    }

    pub fn working_path(&self, dataset: Dataset) -> Utf8PathBuf {
        self.cache_root.join(format!("{dataset}.tsv"))
    }

    /// Unit label to output path for every file `dataset` produces.
    pub fn output_paths(&self, dataset: Dataset) -> Vec<(String, Utf8PathBuf)> {
        dataset
            .outputs()
            .iter()
            .map(|(unit, file)| (unit.to_string(), self.output_root.join(file)))
            .collect()
    }

    pub fn ensure_cache_root(&self) -> Result<(), ReshapeError> {
        fs::create_dir_all(self.cache_root.as_std_path())
            .map_err(|err| ReshapeError::Filesystem(err.to_string()))
    }

    pub fn ensure_output_root(&self) -> Result<(), ReshapeError> {
        fs::create_dir_all(self.output_root.as_std_path())
            .map_err(|err| ReshapeError::Filesystem(err.to_string()))
    }
}
