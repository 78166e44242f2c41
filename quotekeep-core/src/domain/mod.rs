//! Domain types for quotekeep

pub mod record;
pub mod series;

pub use record::{Field, Record, REQUIRED_FIELDS};
pub use series::Series;
