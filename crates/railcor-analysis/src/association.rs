//! Association matrices and pairwise association scores.
//!
//! The engine wraps the kernels from `railcor-stats` with the policies the
//! pipeline needs: method selection, full-matrix computation over a cleaned
//! table, positional truncation for independently-cleaned columns of unequal
//! length, joint-presence handling for columns with missing rows, and an
//! optional deterministic row cap for the O(n²) distance-correlation path.
//!
//! # Row cap
//!
//! Distance correlation costs O(n²) time and memory per pair, O(v²·n²) for a
//! full matrix. When `max_rows` is set and a table is longer, a seeded random
//! subsample of rows is drawn once and applied to every column, so all pairs
//! stay row-aligned and repeated runs are reproducible.

use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use railcor_stats::{
    distance::{CenteredDistances, distance_correlation},
    rank::{average_ranks, pearson, spearman},
};

use crate::table::NumericTable;

/// Association measure to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum AssociationMethod {
    /// Distance correlation: nonlinear dependence in [0, 1].
    DistanceCorrelation,
    /// Spearman rank correlation: monotonic association in [-1, 1].
    SpearmanRank,
}

/// Engine parameters shared by single-file and multi-file paths.
///
/// # Examples
///
/// ```
/// use railcor_analysis::association::{AssociationConfig, AssociationMethod};
///
/// let config = AssociationConfig::default();
/// assert_eq!(config.method, AssociationMethod::DistanceCorrelation);
/// assert_eq!(config.max_rows, None);
/// ```
#[derive(Debug, Clone)]
pub struct AssociationConfig {
    /// Measure used for every pair.
    pub method: AssociationMethod,
    /// Row cap for the O(n²) path; `None` disables subsampling.
    pub max_rows: Option<usize>,
    /// Seed for the subsample, so runs are reproducible.
    pub subsample_seed: u64,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            method: AssociationMethod::DistanceCorrelation,
            max_rows: None,
            subsample_seed: 0,
        }
    }
}

/// Failure computing an association matrix.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AssociationError {
    /// The table has fewer than the two rows the measures are defined on.
    #[display("association requires at least 2 rows, table has {rows}")]
    InsufficientData { rows: usize },
}

/// Pairwise association scores between all variables of one cleaned table.
///
/// Symmetric, with variable names kept in original column order, which is
/// the order ranking uses to break ties. For distance correlation scores lie in [0, 1]
/// with diagonal 1 for non-constant variables; for rank correlation scores
/// lie in [-1, 1] with diagonal 1.
///
/// # Examples
///
/// ```
/// use railcor_analysis::association::{association_matrix, AssociationConfig};
/// use railcor_analysis::table::NumericTable;
///
/// let table = NumericTable::new(vec![
///     ("x".into(), vec![1.0, 2.0, 3.0, 4.0]),
///     ("y".into(), vec![2.0, 4.0, 6.0, 8.0]),
/// ])
/// .unwrap();
///
/// let matrix = association_matrix(&table, &AssociationConfig::default()).unwrap();
/// assert!((matrix.get("x", "y").unwrap() - 1.0).abs() < 1e-12);
/// assert_eq!(matrix.get("x", "y"), matrix.get("y", "x"));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AssociationMatrix {
    method: AssociationMethod,
    names: Vec<String>,
    /// Row-major v×v scores.
    scores: Vec<f64>,
}

impl AssociationMatrix {
    /// Measure the scores were computed with.
    #[must_use]
    pub fn method(&self) -> AssociationMethod {
        self.method
    }

    /// Variable names in original column order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the matrix covers no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of a variable in original column order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Score for a pair of variables by name.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        Some(self.scores[i * self.names.len() + j])
    }

    /// Score for a pair of variables by index.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn score_at(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.names.len() && j < self.names.len());
        self.scores[i * self.names.len() + j]
    }
}

/// Computes the full association matrix for a cleaned table.
///
/// # Errors
///
/// Returns [`AssociationError::InsufficientData`] when the table has columns
/// but fewer than two rows. A table with no columns yields an empty matrix.
pub fn association_matrix(
    table: &NumericTable,
    config: &AssociationConfig,
) -> Result<AssociationMatrix, AssociationError> {
    let names = table.names().to_vec();
    if names.is_empty() {
        return Ok(AssociationMatrix {
            method: config.method,
            names,
            scores: Vec::new(),
        });
    }

    let rows = table.row_count();
    if rows < 2 {
        return Err(AssociationError::InsufficientData { rows });
    }

    // One subsample for the whole table keeps every pair row-aligned.
    let subsampled: Option<Vec<Vec<f64>>> = config
        .max_rows
        .filter(|&cap| cap >= 2 && rows > cap)
        .map(|cap| {
            let indices = subsample_indices(rows, cap, config.subsample_seed);
            table
                .columns()
                .map(|(_, col)| indices.iter().map(|&i| col[i]).collect())
                .collect()
        });
    let columns: Vec<&[f64]> = match &subsampled {
        Some(cols) => cols.iter().map(Vec::as_slice).collect(),
        None => table.columns().map(|(_, col)| col).collect(),
    };

    let scores = match config.method {
        AssociationMethod::DistanceCorrelation => distance_scores(&columns),
        AssociationMethod::SpearmanRank => spearman_scores(&columns),
    };

    Ok(AssociationMatrix {
        method: config.method,
        names,
        scores,
    })
}

fn distance_scores(columns: &[&[f64]]) -> Vec<f64> {
    let v = columns.len();
    let mut scores = vec![0.0; v * v];
    for i in 0..v {
        let Some(centered_i) = CenteredDistances::new(columns[i]) else {
            continue;
        };
        scores[i * v + i] = if centered_i.variance() > 0.0 { 1.0 } else { 0.0 };
        for j in (i + 1)..v {
            let Some(centered_j) = CenteredDistances::new(columns[j]) else {
                continue;
            };
            let score = centered_i.correlation(&centered_j).unwrap_or(0.0);
            scores[i * v + j] = score;
            scores[j * v + i] = score;
        }
    }
    scores
}

fn spearman_scores(columns: &[&[f64]]) -> Vec<f64> {
    let v = columns.len();
    let ranks: Vec<Vec<f64>> = columns.iter().map(|col| average_ranks(col)).collect();
    let mut scores = vec![0.0; v * v];
    for i in 0..v {
        scores[i * v + i] = 1.0;
        for j in (i + 1)..v {
            let score = pearson(&ranks[i], &ranks[j]).unwrap_or(0.0);
            scores[i * v + j] = score;
            scores[j * v + i] = score;
        }
    }
    scores
}

/// Pairwise association between two aligned columns.
///
/// Columns cleaned independently can end up with different lengths; both are
/// truncated to the shorter length by position (not by any join key) before
/// the measure runs. This mirrors the upstream tooling and can misalign rows
/// when the columns' missing-value patterns differ; callers that need exact
/// alignment should go through [`pair_association_joint`] instead.
///
/// Returns `None` when fewer than two rows remain or the rank measure is
/// degenerate; distance correlation reports degenerate input as `Some(0.0)`.
///
/// # Examples
///
/// ```
/// use railcor_analysis::association::{pair_association, AssociationConfig};
///
/// let config = AssociationConfig::default();
/// let x = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y = [2.0, 4.0, 6.0]; // shorter: x is truncated to 3 rows
/// let score = pair_association(&x, &y, &config).unwrap();
/// assert!((score - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn pair_association(x: &[f64], y: &[f64], config: &AssociationConfig) -> Option<f64> {
    let len = x.len().min(y.len());
    if len < 2 {
        return None;
    }
    let (x, y) = (&x[..len], &y[..len]);

    let subsampled: Option<(Vec<f64>, Vec<f64>)> = config
        .max_rows
        .filter(|&cap| cap >= 2 && len > cap)
        .map(|cap| {
            let indices = subsample_indices(len, cap, config.subsample_seed);
            (
                indices.iter().map(|&i| x[i]).collect(),
                indices.iter().map(|&i| y[i]).collect(),
            )
        });
    let (x, y) = subsampled
        .as_ref()
        .map_or((x, y), |(a, b)| (a.as_slice(), b.as_slice()));

    match config.method {
        AssociationMethod::DistanceCorrelation => distance_correlation(x, y),
        AssociationMethod::SpearmanRank => spearman(x, y),
    }
}

/// Pairwise association over rows where both values are present.
///
/// The multi-file path works on columns whose missing-row patterns differ;
/// restricting to jointly-present rows keeps the pair aligned without
/// imputation. Returns `None` when fewer than two joint rows remain.
///
/// # Examples
///
/// ```
/// use railcor_analysis::association::{pair_association_joint, AssociationConfig};
///
/// let config = AssociationConfig::default();
/// let x = [Some(1.0), None, Some(3.0), Some(4.0)];
/// let y = [Some(2.0), Some(5.0), Some(6.0), Some(8.0)];
/// assert!(pair_association_joint(&x, &y, &config).is_some());
/// ```
#[must_use]
pub fn pair_association_joint(
    x: &[Option<f64>],
    y: &[Option<f64>],
    config: &AssociationConfig,
) -> Option<f64> {
    let (joint_x, joint_y): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();
    pair_association(&joint_x, &joint_y, config)
}

fn subsample_indices(len: usize, cap: usize, seed: u64) -> Vec<usize> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, len, cap).into_vec();
    // Restore temporal order within the subsample.
    indices.sort_unstable();
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: Vec<(&str, Vec<f64>)>) -> NumericTable {
        NumericTable::new(
            columns
                .into_iter()
                .map(|(name, col)| (name.to_owned(), col))
                .collect(),
        )
        .unwrap()
    }

    fn spearman_config() -> AssociationConfig {
        AssociationConfig {
            method: AssociationMethod::SpearmanRank,
            ..AssociationConfig::default()
        }
    }

    #[test]
    fn test_distance_matrix_diagonal_and_symmetry() {
        let t = table(vec![
            ("a", vec![1.0, 2.0, 3.0, 4.0]),
            ("b", vec![4.0, 1.0, 3.0, 2.0]),
            ("c", vec![1.0, 4.0, 2.0, 8.0]),
        ]);
        let matrix = association_matrix(&t, &AssociationConfig::default()).unwrap();
        for name in matrix.names() {
            assert!((matrix.get(name, name).unwrap() - 1.0).abs() < 1e-12);
        }
        for a in matrix.names() {
            for b in matrix.names() {
                let ab = matrix.get(a, b).unwrap();
                assert!((ab - matrix.get(b, a).unwrap()).abs() < 1e-12);
                assert!((0.0..=1.0).contains(&ab));
            }
        }
    }

    #[test]
    fn test_spearman_matrix_values() {
        let t = table(vec![
            ("up", vec![1.0, 2.0, 3.0, 4.0]),
            ("down", vec![9.0, 7.0, 4.0, 1.0]),
        ]);
        let matrix = association_matrix(&t, &spearman_config()).unwrap();
        assert!((matrix.get("up", "down").unwrap() + 1.0).abs() < 1e-12);
        assert!((matrix.get("up", "up").unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_insufficient_rows() {
        let t = table(vec![("a", vec![1.0]), ("b", vec![2.0])]);
        let result = association_matrix(&t, &AssociationConfig::default());
        assert!(matches!(
            result,
            Err(AssociationError::InsufficientData { rows: 1 })
        ));
    }

    #[test]
    fn test_empty_table_gives_empty_matrix() {
        let t = table(vec![]);
        let matrix = association_matrix(&t, &AssociationConfig::default()).unwrap();
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_pair_truncates_to_shorter() {
        let config = spearman_config();
        let x = [1.0, 2.0, 3.0, 100.0, -5.0];
        let y = [2.0, 4.0, 6.0];
        // Only the first three rows of x participate.
        let score = pair_association(&x, &y, &config).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pair_insufficient_rows() {
        let config = AssociationConfig::default();
        assert_eq!(pair_association(&[1.0], &[2.0, 3.0], &config), None);
        assert_eq!(pair_association(&[], &[], &config), None);
    }

    #[test]
    fn test_joint_pair_filters_missing() {
        let config = spearman_config();
        let x = [Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let y = [Some(10.0), Some(0.0), Some(30.0), None, Some(50.0)];
        // Joint rows: (1,10), (3,30), (5,50).
        let score = pair_association_joint(&x, &y, &config).unwrap();
        assert!((score - 1.0).abs() < 1e-12);

        let sparse = [None, Some(2.0), None, None, None];
        assert_eq!(pair_association_joint(&x, &sparse, &config), None);
    }

    #[test]
    fn test_subsample_is_deterministic() {
        let long_x: Vec<f64> = (0..200).map(f64::from).collect();
        let long_y: Vec<f64> = long_x.iter().map(|v| v * 3.0 + 1.0).collect();
        let config = AssociationConfig {
            max_rows: Some(50),
            ..AssociationConfig::default()
        };
        let first = pair_association(&long_x, &long_y, &config).unwrap();
        let second = pair_association(&long_x, &long_y, &config).unwrap();
        assert!((first - second).abs() < 1e-15);
        // A linear pair stays perfectly associated under any row subset.
        assert!((first - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_subsample_indices_sorted_unique() {
        let indices = subsample_indices(100, 10, 7);
        assert_eq!(indices.len(), 10);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert!(indices.iter().all(|&i| i < 100));
    }

    #[test]
    fn test_matrix_subsample_keeps_columns_aligned() {
        let n = 120;
        let base: Vec<f64> = (0..n).map(f64::from).collect();
        let double: Vec<f64> = base.iter().map(|v| v * 2.0).collect();
        let t = table(vec![("base", base), ("double", double)]);
        let config = AssociationConfig {
            max_rows: Some(40),
            ..AssociationConfig::default()
        };
        let matrix = association_matrix(&t, &config).unwrap();
        // Same subsample on both columns keeps the linear pair at 1.
        assert!((matrix.get("base", "double").unwrap() - 1.0).abs() < 1e-12);
    }
}
