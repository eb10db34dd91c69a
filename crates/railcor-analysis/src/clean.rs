//! Table cleaning: from raw cells to aligned numeric columns.
//!
//! Cleaning proceeds in stages, each exposed separately so callers can stop
//! at the level of strictness they need:
//!
//! 1. [`extract_table`]: skip the leading metadata columns and run numeric
//!    extraction on every remaining cell
//! 2. [`drop_incomplete_columns`]: remove columns with at least one missing
//!    value; distance correlation needs fully aligned, equal-length series,
//!    and no imputation is attempted
//! 3. [`drop_constant_columns`]: remove columns with at most one distinct
//!    value, whose distance and rank matrices are degenerate
//!
//! [`clean`] chains all three and yields a [`NumericTable`]. Dropped columns
//! are logged at debug level; a drop is expected data quality, not an error.

use std::collections::HashSet;

use tracing::debug;

use crate::{
    extract::extract_numeric,
    table::{ExtractedTable, NumericTable, RawTable},
};

/// Cleaning parameters.
///
/// # Examples
///
/// ```
/// use railcor_analysis::clean::CleanConfig;
///
/// let config = CleanConfig::default();
/// assert_eq!(config.skip_leading, 2);
/// ```
#[derive(Debug, Clone)]
pub struct CleanConfig {
    /// Leading columns treated as non-numeric metadata and excluded before
    /// extraction. Telemetry exports carry a record index and a timestamp.
    pub skip_leading: usize,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self { skip_leading: 2 }
    }
}

/// Skips metadata columns and extracts every remaining cell.
#[must_use]
pub fn extract_table(table: &RawTable, config: &CleanConfig) -> ExtractedTable {
    let (names, columns) = table
        .columns()
        .skip(config.skip_leading)
        .map(|(name, cells)| {
            let values: Vec<Option<f64>> = cells.iter().map(extract_numeric).collect();
            (name.to_owned(), values)
        })
        .unzip();
    ExtractedTable { names, columns }
}

/// Removes columns containing at least one missing value.
#[must_use]
pub fn drop_incomplete_columns(table: ExtractedTable) -> ExtractedTable {
    let (names, columns) = table
        .names
        .into_iter()
        .zip(table.columns)
        .filter(|(name, col)| {
            let complete = col.iter().all(Option::is_some);
            if !complete {
                debug!(column = %name, "dropping column with missing values");
            }
            complete
        })
        .unzip();
    ExtractedTable { names, columns }
}

/// Removes columns with at most one distinct present value.
#[must_use]
pub fn drop_constant_columns(table: ExtractedTable) -> ExtractedTable {
    let (names, columns) = table
        .names
        .into_iter()
        .zip(table.columns)
        .filter(|(name, col)| {
            let varied = distinct_count(col) > 1;
            if !varied {
                debug!(column = %name, "dropping constant column");
            }
            varied
        })
        .unzip();
    ExtractedTable { names, columns }
}

/// Number of distinct present values; 0.0 and -0.0 count as one.
fn distinct_count(values: &[Option<f64>]) -> usize {
    let mut seen = HashSet::new();
    for value in values.iter().flatten() {
        let canonical = if *value == 0.0 { 0.0 } else { *value };
        seen.insert(canonical.to_bits());
    }
    seen.len()
}

/// Full cleaning pipeline: extract, drop incomplete, drop constant.
///
/// The result upholds the [`NumericTable`] invariant by construction: every
/// surviving column has identical length, no missing entries, and only finite
/// values; original column order is preserved.
///
/// # Examples
///
/// ```
/// use railcor_analysis::clean::{clean, CleanConfig};
/// use railcor_analysis::table::{Cell, RawTable};
///
/// let table = RawTable::new(vec![
///     ("idx".into(), vec![Cell::from(1.0), Cell::from(2.0), Cell::from(3.0)]),
///     ("time".into(), vec![Cell::from("09:00"), Cell::from("09:01"), Cell::from("09:02")]),
///     ("a".into(), vec![Cell::from(1.0), Cell::from(2.0), Cell::from(3.0)]),
///     ("b".into(), vec![Cell::from(1.0), Cell::Missing, Cell::from(3.0)]),
///     ("c".into(), vec![Cell::from(5.0), Cell::from(5.0), Cell::from(5.0)]),
/// ])
/// .unwrap();
///
/// let cleaned = clean(&table, &CleanConfig::default());
/// assert_eq!(cleaned.names(), ["a"]);
/// ```
#[must_use]
pub fn clean(table: &RawTable, config: &CleanConfig) -> NumericTable {
    let extracted = drop_constant_columns(drop_incomplete_columns(extract_table(table, config)));
    let columns = extracted
        .columns
        .into_iter()
        // Incomplete columns are gone, so flattening keeps every row.
        .map(|col| col.into_iter().flatten().collect())
        .collect();
    NumericTable::from_parts(extracted.names, columns)
}
