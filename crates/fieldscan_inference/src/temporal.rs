//! Temporal extent of date-bearing columns
//!
//! Each column is parsed independently (a date-only column resolves one
//! day/month order for all of its values), then all parsed values across
//! all columns are folded into a single min/max range.

use chrono::NaiveDateTime;

use super::date_formats::{at_midnight, first_matching_format, try_parse_date, try_parse_datetime};
use super::solver::{is_null_token, ColumnSolver};
use super::DataType;

/// Inclusive temporal extent. `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
}

impl DateRange {
    pub fn single(value: NaiveDateTime) -> Self {
        Self { min: value, max: value }
    }

    pub fn extend(self, value: NaiveDateTime) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    /// Range over every value, `None` when the iterator is empty.
    pub fn from_values(values: impl IntoIterator<Item = NaiveDateTime>) -> Option<Self> {
        values.into_iter().fold(None, |range, value| match range {
            None => Some(DateRange::single(value)),
            Some(range) => Some(range.extend(value)),
        })
    }
}

/// Parse every value of a text column. Unparseable and empty values become
/// `None`; nothing here fails.
pub fn parse_date_column<S: AsRef<str>>(values: &[S]) -> Vec<Option<NaiveDateTime>> {
    let mut solver = ColumnSolver::new("temporal");
    for value in values {
        solver.add_value(value.as_ref());
    }
    let column_format = match solver.data_type() {
        DataType::Date => solver.date_format(),
        _ => None,
    };

    values
        .iter()
        .map(|value| {
            let trimmed = value.as_ref().trim();
            if is_null_token(trimmed) {
                return None;
            }
            if let Some(dt) = try_parse_datetime(trimmed) {
                return Some(dt);
            }
            let format = column_format.or_else(|| first_matching_format(trimmed))?;
            try_parse_date(trimmed, format).and_then(at_midnight)
        })
        .collect()
}

/// Temporal summary for a set of candidate columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalSummary {
    /// At least one candidate column exists in the schema.
    pub has_timestamp: bool,
    /// Absent when no value in any candidate column parsed.
    pub range: Option<DateRange>,
}

/// Aggregate already-parsed columns.
///
/// `columns` holds one entry per candidate column that exists in the schema.
pub fn summarize_columns(columns: &[Vec<Option<NaiveDateTime>>]) -> TemporalSummary {
    TemporalSummary {
        has_timestamp: !columns.is_empty(),
        range: DateRange::from_values(columns.iter().flatten().flatten().copied()),
    }
}
