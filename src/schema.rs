//! Per-dataset declarations of how the composite key column unpacks.
//!
//! Eurostat packs every dimension of a row into the first column, e.g.
//! `THS_T,TOT,DE,FR` under the header `unit,carriage,c_unload,geo\time`.
//! Fields are addressed from the right, so position 1 is the last field.

use crate::error::ReshapeError;

pub type CodeTable = &'static [(&'static str, &'static str)];

pub const UNIT_CODES: CodeTable = &[
    ("MIO_TKM", "million_tonne_km"),
    ("THS_T", "thousand_tonnes"),
];

pub const CARRIAGE_CODES: CodeTable = &[
    ("TOT", "total"),
    ("OWN", "own_account"),
    ("HIRE", "hire_or_reward"),
    ("NOT_SPEC", "not_specified"),
];

/// Looks a code up in `table`; unknown codes come back unchanged.
pub fn relabel(table: CodeTable, code: &str) -> String {
    table
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| code.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Key field at this position counted from the right, starting at 1.
    Key(usize),
    /// Leading characters of a key field.
    KeyPrefix { position: usize, len: usize },
    Constant(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct DimensionField {
    pub name: &'static str,
    pub source: FieldSource,
    pub codes: Option<CodeTable>,
}

#[derive(Debug, Clone, Copy)]
pub struct KeySchema {
    /// Exact header of the composite column.
    pub header: &'static str,
    /// Output dimension columns, in output order.
    pub dimensions: &'static [DimensionField],
    pub unit_position: usize,
}

/// Dimension values and unit label unpacked from one composite key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFields {
    pub dimensions: Vec<String>,
    pub unit: String,
}

impl KeySchema {
    /// Fewest comma-separated fields a key must carry.
    pub fn arity(&self) -> usize {
        self.dimensions
            .iter()
            .filter_map(|field| match field.source {
                FieldSource::Key(position) | FieldSource::KeyPrefix { position, .. } => {
                    Some(position)
                }
                FieldSource::Constant(_) => None,
            })
            .chain(std::iter::once(self.unit_position))
            .max()
            .unwrap_or(self.unit_position)
    }

    /// Header of the long table: dimensions, then `year`, `value`, `unit`.
    pub fn output_columns(&self) -> Vec<String> {
        self.dimensions
            .iter()
            .map(|field| field.name.to_string())
            .chain(["year", "value", "unit"].map(String::from))
            .collect()
    }

    /// Names introduced by the split. Raw columns carrying one of these names are not years.
    pub fn derived_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.dimensions
            .iter()
            .map(|field| field.name)
            .chain(std::iter::once("unit"))
    }

    /// Splits a composite key and relabels its coded fields.
    ///
    /// `row` is only used to point at the offending input line on error.
    pub fn parse_key(&self, key: &str, row: usize) -> Result<KeyFields, ReshapeError> {
        let parts: Vec<&str> = key.split(',').collect();
        let arity = self.arity();
        if parts.len() < arity {
            return Err(ReshapeError::KeyTooShort {
                row,
                key: key.to_string(),
                expected: arity,
                found: parts.len(),
            });
        }
        let from_right = |position: usize| parts[parts.len() - position];

        let dimensions = self
            .dimensions
            .iter()
            .map(|field| {
                let raw = match field.source {
                    FieldSource::Key(position) => from_right(position).to_string(),
                    FieldSource::KeyPrefix { position, len } => {
                        from_right(position).chars().take(len).collect()
                    }
                    FieldSource::Constant(value) => value.to_string(),
                };
                match field.codes {
                    Some(table) => relabel(table, &raw),
                    None => raw,
                }
            })
            .collect();

        Ok(KeyFields {
            dimensions,
            unit: relabel(UNIT_CODES, from_right(self.unit_position)),
        })
    }
}

pub static UNLOAD: KeySchema = KeySchema {
    header: "unit,carriage,c_load,geo\\time",
    dimensions: &[
        DimensionField {
            name: "country",
            source: FieldSource::Key(1),
            codes: None,
        },
        DimensionField {
            name: "load_country",
            source: FieldSource::Key(2),
            codes: None,
        },
        DimensionField {
            name: "carriage",
            source: FieldSource::Key(3),
            codes: Some(CARRIAGE_CODES),
        },
    ],
    unit_position: 4,
};

pub static LOAD: KeySchema = KeySchema {
    header: "unit,carriage,c_unload,geo\\time",
    dimensions: &[
        DimensionField {
            name: "country",
            source: FieldSource::Key(1),
            codes: None,
        },
        DimensionField {
            name: "unload_country",
            source: FieldSource::Key(2),
            codes: None,
        },
        DimensionField {
            name: "carriage",
            source: FieldSource::Key(3),
            codes: Some(CARRIAGE_CODES),
        },
    ],
    unit_position: 4,
};

pub static MOTORWAY: KeySchema = KeySchema {
    header: "tra_infr,unit,geo\\time",
    dimensions: &[
        DimensionField {
            name: "transport_infrastructure",
            source: FieldSource::Constant("motorways"),
            codes: None,
        },
        DimensionField {
            name: "country",
            source: FieldSource::KeyPrefix {
                position: 1,
                len: 2,
            },
            codes: None,
        },
        DimensionField {
            name: "nuts_2",
            source: FieldSource::Key(1),
            codes: None,
        },
    ],
    unit_position: 2,
};
