//! Spearman rank correlation with average-rank tie handling.
//!
//! Spearman's rho is the Pearson product-moment correlation computed on
//! rank-transformed values; tied values receive the mean of the ranks they
//! span. It measures monotonic association in [-1, 1] and is insensitive to
//! monotone rescaling of either input.
//!
//! Two pairwise forms are provided: [`spearman`] for equal-length sequences
//! with no gaps, and [`spearman_joint`] for optional-valued sequences, which
//! restricts the computation to rows where both values are present. The joint
//! form is what multi-file aggregation uses, since independently recorded
//! channels can have different missing-row patterns.

/// Assigns 1-based average ranks to `values`.
///
/// Tied values receive the arithmetic mean of the rank positions they occupy,
/// matching the conventional treatment for Spearman's rho.
///
/// # Examples
///
/// ```
/// use railcor_stats::rank::average_ranks;
///
/// assert_eq!(average_ranks(&[10.0, 30.0, 20.0]), vec![1.0, 3.0, 2.0]);
/// // The two tied values share ranks 2 and 3, averaging to 2.5.
/// assert_eq!(average_ranks(&[1.0, 2.0, 2.0, 3.0]), vec![1.0, 2.5, 2.5, 4.0]);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; n];
    let mut start = 0;
    while start < n {
        let mut end = start;
        while end + 1 < n && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        // Positions start..=end are tied; their 1-based ranks average to this.
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = rank;
        }
        start = end + 1;
    }
    ranks
}

/// Pearson product-moment correlation between two equal-length sequences.
///
/// Returns `None` when the sequences differ in length, have fewer than two
/// elements, or either has zero variance.
///
/// # Examples
///
/// ```
/// use railcor_stats::rank::pearson;
///
/// let x = [1.0, 2.0, 3.0];
/// let y = [2.0, 4.0, 6.0];
/// assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
/// assert_eq!(pearson(&x, &[5.0, 5.0, 5.0]), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n != y.len() || n < 2 {
        return None;
    }

    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x > 0.0 && var_y > 0.0 {
        Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Spearman rank correlation between two equal-length sequences.
///
/// Returns `None` when the sequences differ in length, have fewer than two
/// elements, or either side has zero rank variance (all values tied).
///
/// # Examples
///
/// ```
/// use railcor_stats::rank::spearman;
///
/// // Any monotone relationship scores 1 regardless of shape.
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [1.0, 8.0, 27.0, 64.0];
/// assert!((spearman(&x, &y).unwrap() - 1.0).abs() < 1e-12);
///
/// let reversed = [4.0, 3.0, 2.0, 1.0];
/// assert!((spearman(&x, &reversed).unwrap() + 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    pearson(&average_ranks(x), &average_ranks(y))
}

/// Spearman rank correlation over rows where both values are present.
///
/// Rows where either side is missing are dropped before ranking; ranks are
/// computed within the joint subset. Returns `None` when fewer than two joint
/// rows remain or the joint subset is degenerate.
///
/// # Examples
///
/// ```
/// use railcor_stats::rank::spearman_joint;
///
/// let x = [Some(1.0), None, Some(3.0), Some(4.0)];
/// let y = [Some(2.0), Some(9.0), None, Some(8.0)];
/// // Only rows 0 and 3 are jointly present.
/// assert!((spearman_joint(&x, &y).unwrap() - 1.0).abs() < 1e-12);
///
/// let sparse = [Some(1.0), None, None, None];
/// assert_eq!(spearman_joint(&sparse, &y), None);
/// ```
#[must_use]
pub fn spearman_joint(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let (joint_x, joint_y): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();
    spearman(&joint_x, &joint_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_ranks_no_ties() {
        assert_eq!(
            average_ranks(&[3.0, 1.0, 4.0, 2.0]),
            vec![3.0, 1.0, 4.0, 2.0]
        );
    }

    #[test]
    fn test_average_ranks_all_tied() {
        assert_eq!(average_ranks(&[7.0, 7.0, 7.0]), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_average_ranks_mixed_ties() {
        // Sorted: 1, 2, 2, 2, 5 → ranks 1, 3, 3, 3, 5
        assert_eq!(
            average_ranks(&[2.0, 1.0, 2.0, 5.0, 2.0]),
            vec![3.0, 1.0, 3.0, 5.0, 3.0]
        );
    }

    #[test]
    fn test_spearman_perfect_monotone() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [0.1, 0.2, 0.4, 0.8, 1.6];
        let rho = spearman(&x, &y).unwrap();
        assert!((rho - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spearman_perfect_inverse() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 8.0, 5.0, 1.0];
        let rho = spearman(&x, &y).unwrap();
        assert!((rho + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spearman_with_ties() {
        // Known value: x ranks [1, 2.5, 2.5, 4], y ranks [1, 2, 3, 4].
        // Pearson on those rank vectors is 4.5 / sqrt(22.5) = 0.9486832...
        let x = [1.0, 2.0, 2.0, 3.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        let rho = spearman(&x, &y).unwrap();
        assert!((rho - 0.948_683_298_050_513_8).abs() < 1e-12, "rho = {rho}");
    }

    #[test]
    fn test_spearman_degenerate() {
        assert_eq!(spearman(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), None);
        assert_eq!(spearman(&[1.0], &[2.0]), None);
        assert_eq!(spearman(&[1.0, 2.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn test_spearman_joint_filters_rows() {
        let x = [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)];
        let y = [Some(5.0), Some(4.0), Some(3.0), None, Some(1.0)];
        // Joint rows: (1,5), (2,4), (5,1), strictly decreasing.
        let rho = spearman_joint(&x, &y).unwrap();
        assert!((rho + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_spearman_joint_insufficient_rows() {
        let x = [Some(1.0), None, Some(3.0)];
        let y = [None, Some(2.0), Some(4.0)];
        // Only one joint row.
        assert_eq!(spearman_joint(&x, &y), None);
    }

    #[test]
    fn test_pearson_range_clamped() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0];
        let r = pearson(&x, &y).unwrap();
        assert!(r <= 1.0);
        assert!((r - 1.0).abs() < 1e-12);
    }
}
