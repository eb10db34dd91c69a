//! Per-target ranking of association scores.
//!
//! Two views over one [`AssociationMatrix`] row:
//!
//! - [`top_k`]: the strongest K associations with a target across the whole
//!   population, with the target itself and every other declared target
//!   excluded; a target ranking among targets says nothing about causes
//! - [`restricted_ranking`]: the same ordering over exactly the declared
//!   control-basis channels, with no exclusion filter
//!
//! Both sort by descending absolute score. The sort is stable and candidates
//! are visited in original column order, so equal scores keep that order.

use serde::{Deserialize, Serialize};

use crate::association::AssociationMatrix;

/// Default number of entries a ranking is truncated to.
pub const DEFAULT_TOP_K: usize = 10;

/// One ranked variable with its association score.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RankedEntry {
    /// Variable name.
    pub name: String,
    /// Signed association score (sign is meaningful for rank correlation).
    pub score: f64,
}

/// Strongest `k` associations with `target`, excluding `target` itself and
/// every name in `excluded`.
///
/// Callers pass the full declared target set as `excluded`, so targets never
/// appear in each other's rankings even when they score highest. Returns an
/// empty list when `target` is not in the matrix.
///
/// # Examples
///
/// ```
/// use railcor_analysis::association::{association_matrix, AssociationConfig};
/// use railcor_analysis::ranking::top_k;
/// use railcor_analysis::table::NumericTable;
///
/// let table = NumericTable::new(vec![
///     ("t".into(), vec![1.0, 2.0, 3.0, 4.0]),
///     ("mirror".into(), vec![2.0, 4.0, 6.0, 8.0]),
///     ("noise".into(), vec![4.0, 1.0, 5.0, 2.0]),
/// ])
/// .unwrap();
/// let matrix = association_matrix(&table, &AssociationConfig::default()).unwrap();
///
/// let ranked = top_k(&matrix, "t", &["t".into()], 2);
/// assert_eq!(ranked[0].name, "mirror");
/// ```
#[must_use]
pub fn top_k(
    matrix: &AssociationMatrix,
    target: &str,
    excluded: &[String],
    k: usize,
) -> Vec<RankedEntry> {
    rank_candidates(
        matrix,
        target,
        matrix
            .names()
            .iter()
            .filter(|name| *name != target && !excluded.contains(name)),
        k,
    )
}

/// Ordering of `target`'s associations over exactly the `whitelist` channels.
///
/// No exclusion filter is applied; whitelist names absent from the matrix are
/// skipped. The list is truncated to `k` only when the whitelist is larger.
///
/// # Examples
///
/// ```
/// use railcor_analysis::association::{association_matrix, AssociationConfig};
/// use railcor_analysis::ranking::restricted_ranking;
/// use railcor_analysis::table::NumericTable;
///
/// let table = NumericTable::new(vec![
///     ("t".into(), vec![1.0, 2.0, 3.0, 4.0]),
///     ("basis_a".into(), vec![2.0, 4.0, 6.0, 8.0]),
///     ("other".into(), vec![4.0, 1.0, 5.0, 2.0]),
/// ])
/// .unwrap();
/// let matrix = association_matrix(&table, &AssociationConfig::default()).unwrap();
///
/// let whitelist = vec!["basis_a".into(), "not_recorded".into()];
/// let ranked = restricted_ranking(&matrix, "t", &whitelist, 10);
/// assert_eq!(ranked.len(), 1);
/// assert_eq!(ranked[0].name, "basis_a");
/// ```
#[must_use]
pub fn restricted_ranking(
    matrix: &AssociationMatrix,
    target: &str,
    whitelist: &[String],
    k: usize,
) -> Vec<RankedEntry> {
    rank_candidates(
        matrix,
        target,
        // Column order, not whitelist order, so ties break consistently.
        matrix.names().iter().filter(|name| whitelist.contains(name)),
        k,
    )
}

fn rank_candidates<'a>(
    matrix: &AssociationMatrix,
    target: &str,
    candidates: impl Iterator<Item = &'a String>,
    k: usize,
) -> Vec<RankedEntry> {
    let Some(target_idx) = matrix.position(target) else {
        return Vec::new();
    };

    let mut entries: Vec<RankedEntry> = candidates
        .filter_map(|name| {
            let idx = matrix.position(name)?;
            Some(RankedEntry {
                name: name.clone(),
                score: matrix.score_at(target_idx, idx),
            })
        })
        .collect();

    // Stable sort: candidates arrive in column order, ties keep it.
    entries.sort_by(|a, b| b.score.abs().total_cmp(&a.score.abs()));
    entries.truncate(k);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::association::{AssociationConfig, AssociationMethod, association_matrix};
    use crate::table::NumericTable;

    fn spearman_matrix(columns: Vec<(&str, Vec<f64>)>) -> AssociationMatrix {
        let table = NumericTable::new(
            columns
                .into_iter()
                .map(|(name, col)| (name.to_owned(), col))
                .collect(),
        )
        .unwrap();
        let config = AssociationConfig {
            method: AssociationMethod::SpearmanRank,
            ..AssociationConfig::default()
        };
        association_matrix(&table, &config).unwrap()
    }

    /// t1 and t2 are exact copies so they out-score every other candidate.
    fn two_target_matrix() -> AssociationMatrix {
        spearman_matrix(vec![
            ("t1", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("t2", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("strong", vec![1.5, 2.1, 3.4, 3.9, 5.2]),
            ("weak", vec![3.0, 1.0, 4.0, 1.0, 5.0]),
        ])
    }

    #[test]
    fn test_excludes_self_and_declared_targets() {
        let matrix = two_target_matrix();
        let targets = vec!["t1".to_owned(), "t2".to_owned()];

        let ranked = top_k(&matrix, "t1", &targets, 10);
        // t2 scores a perfect 1.0 against t1 but must not appear.
        assert!(ranked.iter().all(|e| e.name != "t1" && e.name != "t2"));
        assert_eq!(ranked[0].name, "strong");
    }

    #[test]
    fn test_sorted_by_absolute_score() {
        let matrix = spearman_matrix(vec![
            ("t", vec![1.0, 2.0, 3.0, 4.0]),
            ("anti", vec![8.0, 6.0, 4.0, 2.0]),
            ("mild", vec![1.0, 3.0, 2.0, 4.0]),
        ]);
        let ranked = top_k(&matrix, "t", &["t".to_owned()], 10);
        // Perfect inverse correlation ranks first on magnitude.
        assert_eq!(ranked[0].name, "anti");
        assert!(ranked[0].score < 0.0);
        assert!(ranked[0].score.abs() >= ranked[1].score.abs());
    }

    #[test]
    fn test_ties_keep_column_order() {
        // Both candidates are exact copies of the target: identical scores.
        let matrix = spearman_matrix(vec![
            ("t", vec![1.0, 2.0, 3.0]),
            ("later", vec![1.0, 2.0, 3.0]),
            ("earlier_by_score", vec![1.0, 2.0, 3.0]),
        ]);
        let ranked = top_k(&matrix, "t", &["t".to_owned()], 10);
        assert_eq!(ranked[0].name, "later");
        assert_eq!(ranked[1].name, "earlier_by_score");
    }

    #[test]
    fn test_truncates_to_k() {
        let matrix = two_target_matrix();
        let ranked = top_k(&matrix, "t1", &["t1".to_owned()], 1);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_unknown_target_is_empty() {
        let matrix = two_target_matrix();
        assert!(top_k(&matrix, "nope", &[], 10).is_empty());
        assert!(restricted_ranking(&matrix, "nope", &[], 10).is_empty());
    }

    #[test]
    fn test_restricted_keeps_only_whitelist() {
        let matrix = two_target_matrix();
        let whitelist = vec!["weak".to_owned(), "ghost".to_owned(), "t2".to_owned()];
        let ranked = restricted_ranking(&matrix, "t1", &whitelist, 10);
        // No exclusion filter: t2 is eligible here; ghost is not recorded.
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "t2");
        assert_eq!(ranked[1].name, "weak");
    }
}
