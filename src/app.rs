use std::time::Instant;

use camino::Utf8Path;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ResolvedConfig;
use crate::domain::{Dataset, Selection};
use crate::error::ReshapeError;
use crate::fetch::{Fetcher, decompress_file};
use crate::layout::Layout;
use crate::table::RawTable;
use crate::transform::{DroppedUnit, partition, reshape};
use crate::writer::write_csv;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Reuse the cached archive instead of downloading.
    pub offline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: String,
    pub datasets: Vec<DatasetReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub dataset: Dataset,
    pub source: String,
    pub input_rows: usize,
    pub duplicate_rows: usize,
    pub year_columns: usize,
    pub long_rows: usize,
    pub outputs: Vec<OutputReport>,
    pub dropped: Vec<DroppedUnit>,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputReport {
    pub unit: String,
    pub path: String,
    pub rows: usize,
}

#[derive(Clone)]
pub struct App<F: Fetcher> {
    config: ResolvedConfig,
    layout: Layout,
    fetcher: F,
}

impl<F: Fetcher> App<F> {
    pub fn new(config: ResolvedConfig, fetcher: F) -> Self {
        let layout = config.layout();
        Self {
            config,
            layout,
            fetcher,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs every dataset of `selection` in order, stopping at the first failure.
    ///
    /// Outputs of datasets that finished before the failure stay on disk.
    pub fn run(&self, selection: Selection, options: RunOptions) -> Result<RunReport, ReshapeError> {
        let started_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut datasets = Vec::new();
        for dataset in selection.datasets() {
            datasets.push(self.run_dataset(*dataset, options)?);
        }
        Ok(RunReport {
            started_at,
            datasets,
        })
    }

    pub fn run_dataset(
        &self,
        dataset: Dataset,
        options: RunOptions,
    ) -> Result<DatasetReport, ReshapeError> {
        let start = Instant::now();
        self.layout.ensure_cache_root()?;

        let url = self.config.url_for(dataset);
        let archive = self.layout.archive_path(dataset);
        if options.offline {
            if !archive.as_std_path().exists() {
                return Err(ReshapeError::MissingCache(archive.to_string()));
            }
            info!(%dataset, archive = %archive, "using cached archive");
        } else {
            info!(%dataset, url = %url, "downloading");
            self.fetcher.download(&url, archive.as_std_path())?;
        }

        let working = self.layout.working_path(dataset);
        let size = decompress_file(archive.as_std_path(), working.as_std_path())?;
        debug!(%dataset, path = %working, bytes = size, "decompressed");

        let mut report = self.transform_file(dataset, &working)?;
        report.source = if options.offline {
            archive.to_string()
        } else {
            url
        };
        report.elapsed_ms = start.elapsed().as_millis();
        Ok(report)
    }

    /// Reshapes an already decompressed TSV and writes the unit partitions.
    pub fn transform_file(
        &self,
        dataset: Dataset,
        input: &Utf8Path,
    ) -> Result<DatasetReport, ReshapeError> {
        let start = Instant::now();
        let mut table = RawTable::read(input.as_std_path())?;
        let input_rows = table.rows.len();
        let duplicate_rows = table.dedup();
        info!(
            %dataset,
            rows = input_rows,
            duplicates = duplicate_rows,
            columns = table.headers.len(),
            "read table"
        );

        let long = reshape(&table, dataset.schema())?;
        let long_rows = long.rows.len();
        let year_columns = long.year_columns;

        self.layout.ensure_output_root()?;
        let set = partition(long.rows, &self.layout.output_paths(dataset));
        let mut outputs = Vec::with_capacity(set.partitions.len());
        for part in &set.partitions {
            write_csv(&part.path, &long.columns, &part.rows)?;
            info!(%dataset, unit = %part.unit, rows = part.rows.len(), path = %part.path, "wrote output");
            outputs.push(OutputReport {
                unit: part.unit.clone(),
                path: part.path.to_string(),
                rows: part.rows.len(),
            });
        }

        Ok(DatasetReport {
            dataset,
            source: input.to_string(),
            input_rows,
            duplicate_rows,
            year_columns,
            long_rows,
            outputs,
            dropped: set.dropped,
            elapsed_ms: start.elapsed().as_millis(),
        })
    }
}
