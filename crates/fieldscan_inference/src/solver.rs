//! Elimination-based type solver for a single column
//!
//! Every column starts with all types possible. Each non-null value removes
//! the types it cannot be; the most specific survivor is the column type.

use super::date_formats::{check_format_elimination, try_parse_datetime, DateFormatSpec, DATE_FORMATS};
use super::DataType;

/// Per-column solver.
#[derive(Debug, Clone)]
pub struct ColumnSolver {
    column_name: String,
    possible: Vec<DataType>,
    /// Date-only formats still consistent with every value seen, in table order.
    date_candidates: Vec<&'static DateFormatSpec>,
    values_processed: usize,
    null_count: usize,
}

impl ColumnSolver {
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            possible: DataType::candidates(),
            date_candidates: DATE_FORMATS.iter().collect(),
            values_processed: 0,
            null_count: 0,
        }
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn values_processed(&self) -> usize {
        self.values_processed
    }

    pub fn null_count(&self) -> usize {
        self.null_count
    }

    /// Add a value and apply constraints
    pub fn add_value(&mut self, value: &str) {
        self.values_processed += 1;

        let trimmed = value.trim();
        if is_null_token(trimmed) {
            self.null_count += 1;
            return;
        }

        if !is_boolean_token(trimmed) {
            self.eliminate(DataType::Boolean);
        }
        if trimmed.parse::<i64>().is_err() {
            self.eliminate(DataType::Integer);
        }
        if trimmed.parse::<f64>().is_err() {
            self.eliminate(DataType::Float);
        }
        if try_parse_datetime(trimmed).is_none() {
            self.eliminate(DataType::DateTime);
        }

        if self.possible.contains(&DataType::Date) {
            self.date_candidates
                .retain(|format| check_format_elimination(trimmed, format).is_none());
            if self.date_candidates.is_empty() {
                self.eliminate(DataType::Date);
            }
        }
    }

    fn eliminate(&mut self, data_type: DataType) {
        self.possible.retain(|t| *t != data_type);
    }

    /// Resolved type: `Null` when no value was seen, otherwise the most
    /// specific surviving type, with `String` as the fallback.
    pub fn data_type(&self) -> DataType {
        if self.values_processed == self.null_count {
            return DataType::Null;
        }
        DataType::precedence()
            .into_iter()
            .find(|t| self.possible.contains(t))
            .unwrap_or(DataType::String)
    }

    /// The surviving date format when the column resolved to `Date`.
    pub fn date_format(&self) -> Option<&'static DateFormatSpec> {
        if self.data_type() == DataType::Date {
            self.date_candidates.first().copied()
        } else {
            None
        }
    }
}

/// Empty cells and the usual missing-value spellings.
pub fn is_null_token(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case("null")
        || value.eq_ignore_ascii_case("nan")
        || value == "NA"
        || value == "N/A"
}

fn is_boolean_token(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("no")
}
