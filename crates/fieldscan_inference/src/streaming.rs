//! Streaming type inference
//!
//! Rows are fed one at a time into one solver per column, up to a row cap.

use super::solver::ColumnSolver;
use super::DataType;

/// Inferred schema, columns in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredSchema {
    pub columns: Vec<(String, DataType)>,
    pub rows_processed: usize,
}

impl InferredSchema {
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn data_types(&self) -> impl Iterator<Item = DataType> + '_ {
        self.columns.iter().map(|(_, dtype)| *dtype)
    }

    pub fn type_of(&self, column: &str) -> Option<DataType> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, dtype)| *dtype)
    }
}

/// Infer column types from an iterator of rows.
///
/// Short rows leave the trailing solvers untouched; extra values are ignored.
/// At most `max_rows` rows are consumed.
///
/// ```
/// use fieldscan_inference::{infer_types_streaming, DataType};
///
/// let rows = vec![vec!["1", "31/05/2024"], vec!["2", "15/06/2024"]];
/// let schema = infer_types_streaming(&["id", "date"], rows.iter(), 1000);
/// assert_eq!(schema.type_of("id"), Some(DataType::Integer));
/// assert_eq!(schema.type_of("date"), Some(DataType::Date));
/// ```
pub fn infer_types_streaming<I, R, S>(column_names: &[S], rows: I, max_rows: usize) -> InferredSchema
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<str>,
    S: AsRef<str>,
{
    let mut solvers: Vec<ColumnSolver> = column_names
        .iter()
        .map(|name| ColumnSolver::new(name.as_ref()))
        .collect();

    let mut rows_processed = 0;
    for row in rows.into_iter().take(max_rows) {
        for (solver, value) in solvers.iter_mut().zip(row) {
            solver.add_value(value.as_ref());
        }
        rows_processed += 1;
    }

    tracing::trace!(columns = solvers.len(), rows_processed, "type inference complete");

    InferredSchema {
        columns: solvers
            .iter()
            .map(|s| (s.column_name().to_string(), s.data_type()))
            .collect(),
        rows_processed,
    }
}
