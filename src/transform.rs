//! Wide-to-long reshaping of Eurostat tables.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ReshapeError;
use crate::schema::KeySchema;
use crate::table::RawTable;

pub const MISSING_SENTINEL: &str = ":";

/// One observation of the long table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongRow {
    pub dimensions: Vec<String>,
    pub year: String,
    pub value: Option<String>,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongTable {
    pub columns: Vec<String>,
    pub rows: Vec<LongRow>,
    pub year_columns: usize,
}

/// Trims a cell; the missing-data sentinel and empty cells become `None`.
pub fn normalize_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == MISSING_SENTINEL {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Unpacks the composite key of every row and melts the year columns.
///
/// Rows come out year-major: every entity for the first year column, then
/// every entity for the next one.
pub fn reshape(table: &RawTable, schema: &KeySchema) -> Result<LongTable, ReshapeError> {
    let key_index =
        table
            .column_index(schema.header)
            .ok_or_else(|| ReshapeError::MissingKeyColumn {
                header: schema.header.to_string(),
            })?;

    let year_columns: Vec<(usize, String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(index, name)| {
            *index != key_index && !schema.derived_names().any(|derived| derived == name.as_str())
        })
        .map(|(index, name)| (index, name.trim().to_string()))
        .collect();

    let keys = table
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| schema.parse_key(&row[key_index], index + 1))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::with_capacity(keys.len() * year_columns.len());
    for (column, year) in &year_columns {
        for (key, row) in keys.iter().zip(&table.rows) {
            rows.push(LongRow {
                dimensions: key.dimensions.clone(),
                year: year.clone(),
                value: normalize_value(&row[*column]),
                unit: key.unit.clone(),
            });
        }
    }
    debug!(
        entities = keys.len(),
        years = year_columns.len(),
        rows = rows.len(),
        "melted table"
    );

    Ok(LongTable {
        columns: schema.output_columns(),
        rows,
        year_columns: year_columns.len(),
    })
}

/// Rows sharing one unit label, bound for one output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub unit: String,
    pub path: Utf8PathBuf,
    pub rows: Vec<LongRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedUnit {
    pub unit: String,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionSet {
    pub partitions: Vec<Partition>,
    pub dropped: Vec<DroppedUnit>,
}

/// Groups rows by unit label. Labels missing from `outputs` are dropped and logged.
///
/// A partition is produced for every output even when no row matches it.
pub fn partition(rows: Vec<LongRow>, outputs: &[(String, Utf8PathBuf)]) -> PartitionSet {
    let mut partitions: Vec<Partition> = outputs
        .iter()
        .map(|(unit, path)| Partition {
            unit: unit.clone(),
            path: path.clone(),
            rows: Vec::new(),
        })
        .collect();
    let mut dropped = BTreeMap::<String, usize>::new();

    for row in rows {
        match partitions.iter_mut().find(|part| part.unit == row.unit) {
            Some(part) => part.rows.push(row),
            None => *dropped.entry(row.unit).or_default() += 1,
        }
    }

    let dropped = dropped
        .into_iter()
        .map(|(unit, rows)| {
            warn!(unit = %unit, rows, "unit has no output file; rows dropped");
            DroppedUnit { unit, rows }
        })
        .collect();

    PartitionSet {
        partitions,
        dropped,
    }
}
