use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::ReshapeError;

/// A decompressed Eurostat TSV, kept as raw strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn read(path: &Path) -> Result<Self, ReshapeError> {
        let file = File::open(path).map_err(|err| ReshapeError::TableRead {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Parses tab-delimited text. `source` only labels errors.
    ///
    /// Short rows are padded with empty cells; rows wider than the header are rejected.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self, ReshapeError> {
        let table_err = |message: String| ReshapeError::TableRead {
            path: source.to_string(),
            message,
        };
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|err| table_err(err.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.is_empty() {
            return Err(table_err("empty header".to_string()));
        }

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|err| table_err(err.to_string()))?;
            if record.len() > headers.len() {
                return Err(table_err(format!(
                    "row {} has {} cells, header has {}",
                    index + 1,
                    record.len(),
                    headers.len()
                )));
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|name| name == header)
    }

    /// Drops exact duplicate rows, keeping the first occurrence. Returns the number removed.
    pub fn dedup(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }
}
