//! Tabular data model for telemetry logs.
//!
//! Three table types mark the stages of the cleaning pipeline:
//!
//! - [`RawTable`]: named columns of raw [`Cell`] values, exactly as an
//!   external log reader tokenized them
//! - [`ExtractedTable`]: named columns of optional floats, after numeric
//!   extraction but before any column is dropped
//! - [`NumericTable`]: named columns of aligned, finite floats with no
//!   missing entries, the only form the association engine accepts
//!
//! All tables keep their columns in original insertion order; that order is
//! the tie-breaker for rankings downstream. Construction validates the schema
//! (equal column lengths, unique names) instead of trusting positional access.

use serde::{Deserialize, Serialize};

/// A raw cell value as produced by an external log reader.
///
/// Telemetry exports mix native numbers with free text ("3,000 kPa", full-width
/// digits, status words) and blank fields. Cells are consumed once during
/// extraction; the analysis never mutates them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum Cell {
    /// An empty or explicitly-missing field.
    Missing,
    /// A value the reader already parsed as numeric.
    Number(f64),
    /// Unparsed cell text.
    Text(String),
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_owned())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

/// Schema violation detected while constructing a table.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TableError {
    /// A column's row count disagrees with the first column's.
    #[display("column '{name}' has {actual} rows, expected {expected}")]
    RaggedColumn {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// Two columns share a name; lookups would be ambiguous.
    #[display("duplicate column name '{name}'")]
    DuplicateName { name: String },
    /// A numeric column contains a NaN or infinite value.
    #[display("column '{name}' has a non-finite value at row {row}")]
    NonFiniteValue { name: String, row: usize },
}

fn validate_shape<T>(columns: &[(String, Vec<T>)]) -> Result<(), TableError> {
    let expected = columns.first().map_or(0, |(_, col)| col.len());
    for (name, col) in columns {
        if col.len() != expected {
            return Err(TableError::RaggedColumn {
                name: name.clone(),
                expected,
                actual: col.len(),
            });
        }
    }
    for (i, (name, _)) in columns.iter().enumerate() {
        if columns[..i].iter().any(|(other, _)| other == name) {
            return Err(TableError::DuplicateName { name: name.clone() });
        }
    }
    Ok(())
}

/// An ordered collection of named raw columns.
///
/// The first columns of a telemetry export are non-numeric metadata (record
/// index, wall-clock time); the cleaning step skips them by count. Insertion
/// order is preserved and significant.
///
/// # Examples
///
/// ```
/// use railcor_analysis::table::{Cell, RawTable};
///
/// let table = RawTable::new(vec![
///     ("idx".into(), vec![Cell::from(1.0), Cell::from(2.0)]),
///     ("speed".into(), vec![Cell::from("12.5"), Cell::from("13.0")]),
/// ])
/// .unwrap();
///
/// assert_eq!(table.row_count(), 2);
/// assert_eq!(table.names(), ["idx", "speed"]);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawTable {
    names: Vec<String>,
    columns: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Builds a table from `(name, column)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] when column lengths disagree or a name repeats.
    pub fn new(columns: Vec<(String, Vec<Cell>)>) -> Result<Self, TableError> {
        validate_shape(&columns)?;
        let (names, columns) = columns.into_iter().unzip();
        Ok(Self { names, columns })
    }

    /// Number of rows (0 for a table with no columns).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in original order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterates `(name, cells)` pairs in original order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Cell])> {
        self.names
            .iter()
            .zip(&self.columns)
            .map(|(name, col)| (name.as_str(), col.as_slice()))
    }
}

/// Named columns of optional floats: extraction applied, nothing dropped yet.
///
/// Produced by [`extract_table`](crate::clean::extract_table). Rows where
/// extraction failed are `None`. This is the form the joint-presence pairwise
/// path operates on; strict cleaning reduces it to a [`NumericTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    pub(crate) names: Vec<String>,
    pub(crate) columns: Vec<Vec<Option<f64>>>,
}

impl ExtractedTable {
    /// Number of rows (0 for a table with no columns).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in original order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Looks a column up by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[idx])
    }

    /// Iterates `(name, values)` pairs in original order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.names
            .iter()
            .zip(&self.columns)
            .map(|(name, col)| (name.as_str(), col.as_slice()))
    }
}

/// Named columns of aligned, finite floats with no missing entries.
///
/// The invariant every association computation relies on: all columns have
/// identical length and contain only finite values. Cleaning upholds it by
/// construction; [`NumericTable::new`] enforces it for externally-built
/// tables.
///
/// # Examples
///
/// ```
/// use railcor_analysis::table::NumericTable;
///
/// let table = NumericTable::new(vec![
///     ("bc_pressure".into(), vec![310.0, 305.0, 120.0]),
///     ("speed".into(), vec![42.0, 40.5, 12.0]),
/// ])
/// .unwrap();
///
/// assert_eq!(table.column("speed"), Some(&[42.0, 40.5, 12.0][..]));
/// assert!(NumericTable::new(vec![("x".into(), vec![f64::NAN])]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NumericTable {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl NumericTable {
    /// Builds a table from `(name, column)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] when column lengths disagree, a name repeats,
    /// or any value is NaN or infinite.
    pub fn new(columns: Vec<(String, Vec<f64>)>) -> Result<Self, TableError> {
        validate_shape(&columns)?;
        for (name, col) in &columns {
            if let Some(row) = col.iter().position(|v| !v.is_finite()) {
                return Err(TableError::NonFiniteValue {
                    name: name.clone(),
                    row,
                });
            }
        }
        let (names, columns) = columns.into_iter().unzip();
        Ok(Self { names, columns })
    }

    /// Constructor for the cleaner, which upholds the invariant itself.
    pub(crate) fn from_parts(names: Vec<String>, columns: Vec<Vec<f64>>) -> Self {
        Self { names, columns }
    }

    /// Number of rows (0 for a table with no columns).
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column names in original order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Looks a column up by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let idx = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[idx])
    }

    /// Iterates `(name, values)` pairs in original order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .zip(&self.columns)
            .map(|(name, col)| (name.as_str(), col.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_table_rejects_ragged_columns() {
        let result = RawTable::new(vec![
            ("a".into(), vec![Cell::from(1.0), Cell::from(2.0)]),
            ("b".into(), vec![Cell::from(1.0)]),
        ]);
        assert!(matches!(
            result,
            Err(TableError::RaggedColumn { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_raw_table_rejects_duplicate_names() {
        let result = RawTable::new(vec![
            ("a".into(), vec![Cell::from(1.0)]),
            ("a".into(), vec![Cell::from(2.0)]),
        ]);
        assert!(matches!(result, Err(TableError::DuplicateName { .. })));
    }

    #[test]
    fn test_numeric_table_rejects_non_finite() {
        let result = NumericTable::new(vec![("a".into(), vec![1.0, f64::INFINITY])]);
        assert!(matches!(
            result,
            Err(TableError::NonFiniteValue { row: 1, .. })
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = NumericTable::new(vec![]).unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_column_lookup_preserves_order() {
        let table = NumericTable::new(vec![
            ("z".into(), vec![1.0]),
            ("a".into(), vec![2.0]),
        ])
        .unwrap();
        assert_eq!(table.names(), ["z", "a"]);
        assert_eq!(table.column("a"), Some(&[2.0][..]));
        assert_eq!(table.column("missing"), None);
    }
}
