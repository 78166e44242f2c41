//! Record — one day's five-field observation.

use chrono::NaiveDate;

/// The five stored fields, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Close,
    High,
    Low,
    Open,
    Volume,
}

/// Fixed column order shared by the store, the providers and the merge step.
pub const REQUIRED_FIELDS: [Field; 5] = [
    Field::Close,
    Field::High,
    Field::Low,
    Field::Open,
    Field::Volume,
];

impl Field {
    /// Canonical header label.
    pub fn label(self) -> &'static str {
        match self {
            Field::Close => "Close",
            Field::High => "High",
            Field::Low => "Low",
            Field::Open => "Open",
            Field::Volume => "Volume",
        }
    }

    /// Match a (flattened) column label against the canonical names, ignoring ASCII case.
    pub fn from_label(label: &str) -> Option<Field> {
        REQUIRED_FIELDS
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(label.trim()))
    }

    /// Position of this field in [`REQUIRED_FIELDS`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A dated observation. Missing numeric cells are carried as `NaN`.
#[derive(Debug, Clone, Copy)]
pub struct Record {
    pub date: NaiveDate,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub volume: f64,
}

impl Record {
    /// Build a record from values laid out in [`REQUIRED_FIELDS`] order.
    pub fn from_values(date: NaiveDate, values: [f64; 5]) -> Self {
        let [close, high, low, open, volume] = values;
        Self {
            date,
            close,
            high,
            low,
            open,
            volume,
        }
    }

    /// Values in [`REQUIRED_FIELDS`] order.
    pub fn values(&self) -> [f64; 5] {
        [self.close, self.high, self.low, self.open, self.volume]
    }

    pub fn get(&self, field: Field) -> f64 {
        self.values()[field.index()]
    }

    /// True if every field is NaN (a holiday placeholder from the provider).
    pub fn is_void(&self) -> bool {
        self.values().iter().all(|v| v.is_nan())
    }
}

// NaN-aware so that records with empty cells still compare equal to themselves.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
            && self
                .values()
                .iter()
                .zip(other.values().iter())
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}
