//! Elimination-based column type inference
//!
//! Every value narrows what its column can be: "31/05/2024" cannot be a
//! month-first date, "abc" cannot be a number. What survives all values of a
//! column is its type. The same machinery resolves the day/month order of a
//! date column before its values are aggregated into a temporal extent.
//!
//! # Modules
//!
//! - [`date_formats`]: the date and datetime format tables
//! - [`solver`]: per-column elimination
//! - [`streaming`]: row-wise inference over a whole table sample
//! - [`temporal`]: date column parsing and min/max aggregation

pub mod date_formats;
pub mod solver;
pub mod streaming;
pub mod temporal;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use date_formats::{try_parse_datetime, DateFormatSpec, DATE_FORMATS};
pub use solver::ColumnSolver;
pub use streaming::{infer_types_streaming, InferredSchema};
pub use temporal::{parse_date_column, summarize_columns, DateRange, TemporalSummary};

/// Inferred column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Every value was empty or a null token
    Null,
    Boolean,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Float,
    /// Date (no time component)
    Date,
    /// Date with time of day
    DateTime,
    /// Fallback when nothing else survives
    String,
}

impl DataType {
    /// Types a fresh solver starts with. `Null` and `String` are outcomes,
    /// never candidates.
    pub fn candidates() -> Vec<DataType> {
        vec![
            DataType::Boolean,
            DataType::Integer,
            DataType::Float,
            DataType::Date,
            DataType::DateTime,
        ]
    }

    /// Resolution order when several candidates survive: most specific first.
    /// Integer outranks Date so that compact numbers such as 20240101 stay
    /// numeric.
    pub fn precedence() -> [DataType; 5] {
        [
            DataType::Boolean,
            DataType::Integer,
            DataType::Float,
            DataType::DateTime,
            DataType::Date,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Null => "null",
            DataType::Boolean => "boolean",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Date => "date",
            DataType::DateTime => "datetime",
            DataType::String => "string",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
