use std::fs;

use camino::Utf8Path;
use csv::WriterBuilder;

use crate::error::ReshapeError;
use crate::transform::LongRow;

/// Writes `rows` as CSV with a header line, replacing any file at `path`.
///
/// The data goes to a temp file next to `path` first, so a failed write
/// leaves the previous file untouched. Null values become empty fields.
pub fn write_csv(path: &Utf8Path, columns: &[String], rows: &[LongRow]) -> Result<(), ReshapeError> {
    let csv_err = |message: String| ReshapeError::CsvWrite {
        path: path.to_string(),
        message,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| ReshapeError::Filesystem(err.to_string()))?;

    let mut temp = tempfile::Builder::new()
        .prefix(".eurostat-reshape")
        .suffix(".csv.tmp")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| ReshapeError::Filesystem(err.to_string()))?;
    {
        let mut writer = WriterBuilder::new().from_writer(temp.as_file_mut());
        writer
            .write_record(columns)
            .map_err(|err| csv_err(err.to_string()))?;
        for row in rows {
            let record = row
                .dimensions
                .iter()
                .map(String::as_str)
                .chain([
                    row.year.as_str(),
                    row.value.as_deref().unwrap_or(""),
                    row.unit.as_str(),
                ]);
            writer
                .write_record(record)
                .map_err(|err| csv_err(err.to_string()))?;
        }
        writer.flush().map_err(|err| csv_err(err.to_string()))?;
    }

    if path.as_std_path().exists() {
        fs::remove_file(path.as_std_path())
            .map_err(|err| ReshapeError::Filesystem(err.to_string()))?;
    }
    temp.persist(path.as_std_path())
        .map_err(|err| csv_err(err.to_string()))?;
    Ok(())
}
