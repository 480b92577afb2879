// Execution result carriers for the interception pipeline
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of one execution phase: the value the caller should adopt, plus a
/// flag recording whether an interceptor substituted it for the result of the
/// real operation.
///
/// Immutable once constructed. When `is_overridden()` reports true, the owner
/// of the execution path must skip the real operation and adopt the carried
/// value instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult<T> {
    value: T,
    overridden: bool,
}

impl<T> ExecutionResult<T> {
    /// Result produced by the real operation, or seeded by a caller that has
    /// already performed it
    pub fn completed(value: T) -> Self {
        Self {
            value,
            overridden: false,
        }
    }

    /// Substitute result supplied by an interceptor; the real operation must
    /// be skipped
    pub fn overridden(value: T) -> Self {
        Self {
            value,
            overridden: true,
        }
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Buffered result set for reader executions.
///
/// Holds the rows the provider produced, or a substitute set an interceptor
/// supplied in place of the real read. Rows use the JSON object currency of
/// the surrounding access layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    rows: Vec<Map<String, Value>>,
}

impl RowSet {
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Map<String, Value>> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<Map<String, Value>>> for RowSet {
    fn from(rows: Vec<Map<String, Value>>) -> Self {
        Self::from_rows(rows)
    }
}
