//! The emitted record shape.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::ExecuteError;

/// One checklist finding, keyed by the engine's header columns.
///
/// Columns come from the result set's header row, so the record carries
/// whatever the query projected (the catalog's contract is `section, item,
/// service, site, environment, pass, link, repo`). Values are kept as
/// engine-native text: `pass` in particular stays `"true"`/`"false"` rather
/// than a JSON boolean, since the engine can also report non-boolean text
/// for unavailable data and the dashboard parses the string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRecord(Vec<(String, String)>);

impl CheckRecord {
    /// Zip the header row with one data row, in lockstep.
    ///
    /// `row` is the 1-based data row number, used only for error reporting.
    /// A length mismatch between header and cells is an engine contract
    /// violation and fails fast rather than truncating or padding.
    pub fn from_row(
        header: &[String],
        cells: &[String],
        row: usize,
    ) -> Result<Self, ExecuteError> {
        if header.len() != cells.len() {
            return Err(ExecuteError::ColumnMismatch {
                expected: header.len(),
                found: cells.len(),
                row,
            });
        }
        Ok(Self(
            header.iter().cloned().zip(cells.iter().cloned()).collect(),
        ))
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Serialized as a flat JSON object in header order.
impl Serialize for CheckRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (column, value) in &self.0 {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
