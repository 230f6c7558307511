use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A single row of a [`ResultSet`](super::ResultSet).
///
/// Column names and the name-to-index map are shared with every other row of the same
/// result set.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row, in column order
    pub rows: Vec<RowValues>,
    #[doc(hidden)]
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl CustomDbRow {
    /// Create a row, building a fresh column index.
    ///
    /// Rows produced by a `ResultSet` share one index instead; this constructor is for rows
    /// assembled by hand.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let cache = Arc::new(column_index(&column_names));
        Self {
            column_names,
            rows,
            column_index_cache: cache,
        }
    }

    /// Get the index of a column by name.
    ///
    /// Exact matches win; otherwise the first column whose name matches ignoring ASCII case
    /// is returned, the way SQL Server resolves identifiers under its default collation.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }

        self.column_names
            .iter()
            .position(|col| col.eq_ignore_ascii_case(column_name))
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }

    /// Render the row as a JSON object keyed by column name.
    ///
    /// A duplicated column name keeps its first value, matching [`get`](Self::get).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.column_names.len());
        for (name, value) in self.column_names.iter().zip(&self.rows) {
            if map.contains_key(name) {
                continue;
            }
            map.insert(
                name.clone(),
                serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
            );
        }
        serde_json::Value::Object(map)
    }
}

pub(crate) fn column_index(column_names: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        // first occurrence wins for duplicated names, e.g. `SELECT a.id, b.id`
        map.entry(name.clone()).or_insert(i);
    }
    map
}
