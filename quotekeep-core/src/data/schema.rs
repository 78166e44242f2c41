//! Provider-neutral table shape and projection onto the fixed five-field schema.
//!
//! Providers hand back whatever column labelling their source uses, sometimes
//! with several levels per column (`("Close", "2449.TW")`). [`project`] flattens
//! every label to its first level and picks out exactly [`REQUIRED_FIELDS`], in
//! order. Anything else is dropped.

use crate::domain::{Field, Record, Series, REQUIRED_FIELDS};
use chrono::NaiveDate;

/// A column label with one or more levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabel {
    levels: Vec<String>,
}

impl ColumnLabel {
    /// Single-level label.
    pub fn flat(name: impl Into<String>) -> Self {
        Self {
            levels: vec![name.into()],
        }
    }

    /// Multi-level label, outermost level first.
    pub fn nested<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// The outermost level, which is the one that names the field.
    pub fn flatten(&self) -> &str {
        self.levels.first().map(String::as_str).unwrap_or("")
    }
}

/// One row as delivered by a source. `date` is `None` when the source value did not parse.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub date: Option<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

/// Labelled rows before projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<ColumnLabel>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required fields: {}", join_labels(.0))]
    MissingFields(Vec<Field>),
}

fn join_labels(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Column index for each required field, or the list of fields that have no column.
pub fn locate_fields(columns: &[ColumnLabel]) -> Result<[usize; 5], SchemaError> {
    let mut found: [Option<usize>; 5] = [None; 5];
    for (idx, label) in columns.iter().enumerate() {
        if let Some(field) = Field::from_label(label.flatten()) {
            // First matching column wins.
            if found[field.index()].is_none() {
                found[field.index()] = Some(idx);
            }
        }
    }

    let missing: Vec<Field> = REQUIRED_FIELDS
        .into_iter()
        .filter(|f| found[f.index()].is_none())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingFields(missing));
    }

    Ok(found.map(|i| i.unwrap_or_default()))
}

/// Project a raw table onto the five-field schema.
///
/// Rows without a date are dropped, absent cells become `NaN`, and the result
/// is sorted by date.
pub fn project(table: &RawTable) -> Result<Series, SchemaError> {
    let positions = locate_fields(&table.columns)?;

    let records = table
        .rows
        .iter()
        .filter_map(|row| {
            let date = row.date?;
            let values =
                positions.map(|idx| row.values.get(idx).copied().flatten().unwrap_or(f64::NAN));
            Some(Record::from_values(date, values))
        })
        .collect();

    Ok(Series::from_records(records))
}
