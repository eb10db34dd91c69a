//! Single-file analysis driver.
//!
//! Chains the pipeline for one table: clean → association matrix → per-target
//! rankings. The report carries everything an external reporting layer
//! renders: the full matrix, the top-K ranking per target, and the
//! control-basis comparison view.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    association::{AssociationConfig, AssociationError, AssociationMatrix, association_matrix},
    clean::{CleanConfig, clean},
    ranking::{DEFAULT_TOP_K, RankedEntry, restricted_ranking, top_k},
    table::RawTable,
};

/// Parameters for a single-file analysis.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Outcome channels whose associations are of interest.
    pub targets: Vec<String>,
    /// Channels believed to drive the targets; shown as a restricted view.
    pub control_basis: Vec<String>,
    /// Ranking length per target.
    pub top_k: usize,
    /// Cleaning parameters.
    pub clean: CleanConfig,
    /// Association measure and row cap.
    pub association: AssociationConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            control_basis: Vec::new(),
            top_k: DEFAULT_TOP_K,
            clean: CleanConfig::default(),
            association: AssociationConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Config with the given targets and defaults everywhere else.
    #[must_use]
    pub fn for_targets(targets: Vec<String>) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }
}

/// Rankings for one target.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TargetRanking {
    /// The target channel.
    pub target: String,
    /// Top-K associations across the whole population, targets excluded.
    pub top: Vec<RankedEntry>,
    /// Ordered associations over the declared control-basis channels.
    pub control_basis: Vec<RankedEntry>,
}

/// Full single-file result: the matrix plus per-target rankings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisReport {
    /// Pairwise scores between all surviving variables.
    pub matrix: AssociationMatrix,
    /// One entry per declared target present after cleaning, in declaration
    /// order.
    pub rankings: Vec<TargetRanking>,
}

/// Analyzes one raw table.
///
/// Declared targets absent from the cleaned table are skipped with a warning;
/// the remaining targets are still analyzed.
///
/// # Errors
///
/// Returns [`AssociationError::InsufficientData`] when the cleaned table has
/// fewer than two rows.
///
/// # Examples
///
/// ```
/// use railcor_analysis::pipeline::{analyze, AnalysisConfig};
/// use railcor_analysis::clean::CleanConfig;
/// use railcor_analysis::table::{Cell, RawTable};
///
/// let table = RawTable::new(vec![
///     ("bc_pressure".into(), vec![Cell::from(310.0), Cell::from(150.0), Cell::from(40.0)]),
///     ("speed".into(), vec![Cell::from("42.0"), Cell::from("20.5"), Cell::from("3.0")]),
/// ])
/// .unwrap();
///
/// let config = AnalysisConfig {
///     targets: vec!["bc_pressure".into()],
///     top_k: 10,
///     clean: CleanConfig { skip_leading: 0 },
///     ..AnalysisConfig::default()
/// };
/// let report = analyze(&table, &config).unwrap();
/// assert_eq!(report.rankings[0].top[0].name, "speed");
/// ```
pub fn analyze(table: &RawTable, config: &AnalysisConfig) -> Result<AnalysisReport, AssociationError> {
    let cleaned = clean(table, &config.clean);
    let matrix = association_matrix(&cleaned, &config.association)?;

    let rankings = config
        .targets
        .iter()
        .filter_map(|target| {
            if matrix.position(target).is_none() {
                warn!(target = %target, "target channel not present after cleaning");
                return None;
            }
            Some(TargetRanking {
                target: target.clone(),
                top: top_k(&matrix, target, &config.targets, config.top_k),
                control_basis: restricted_ranking(
                    &matrix,
                    target,
                    &config.control_basis,
                    config.top_k,
                ),
            })
        })
        .collect();

    Ok(AnalysisReport { matrix, rankings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn telemetry_table() -> RawTable {
        // Two identical targets plus six distinct channels, no metadata.
        let t: Vec<f64> = vec![1.0, 3.0, 2.0, 5.0, 4.0, 7.0, 6.0, 9.0];
        let columns: Vec<(String, Vec<f64>)> = vec![
            ("T1".into(), t.clone()),
            ("T2".into(), t.clone()),
            ("linear".into(), t.iter().map(|v| 2.0 * v + 1.0).collect()),
            ("quadratic".into(), t.iter().map(|v| v * v).collect()),
            ("inverse".into(), t.iter().map(|v| 10.0 - v).collect()),
            ("offset".into(), t.iter().map(|v| v + 0.5).collect()),
            (
                "jitter".into(),
                vec![2.0, 1.0, 8.0, 3.0, 9.0, 4.0, 1.5, 6.0],
            ),
            (
                "steps".into(),
                vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0],
            ),
        ];
        RawTable::new(
            columns
                .into_iter()
                .map(|(name, col)| {
                    let cells = col.into_iter().map(Cell::from).collect();
                    (name, cells)
                })
                .collect(),
        )
        .unwrap()
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            targets: vec!["T1".into(), "T2".into()],
            control_basis: vec!["steps".into(), "linear".into()],
            top_k: 3,
            clean: CleanConfig { skip_leading: 0 },
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_end_to_end_deterministic_top_3() {
        let table = telemetry_table();
        let first = analyze(&table, &config()).unwrap();
        let second = analyze(&table, &config()).unwrap();
        assert_eq!(first, second);

        assert_eq!(first.rankings.len(), 2);
        for ranking in &first.rankings {
            assert_eq!(ranking.top.len(), 3);
            // Neither target appears in any ranking.
            assert!(ranking.top.iter().all(|e| e.name != "T1" && e.name != "T2"));
            // Descending by absolute score.
            assert!(
                ranking
                    .top
                    .windows(2)
                    .all(|w| w[0].score.abs() >= w[1].score.abs())
            );
        }
        // Perfect linear relations dominate the distance-correlation ranking.
        assert_eq!(first.rankings[0].top[0].name, "linear");
    }

    #[test]
    fn test_missing_target_skipped() {
        let table = telemetry_table();
        let mut cfg = config();
        cfg.targets = vec!["T1".into(), "ghost".into()];
        let report = analyze(&table, &cfg).unwrap();
        assert_eq!(report.rankings.len(), 1);
        assert_eq!(report.rankings[0].target, "T1");
    }

    #[test]
    fn test_control_basis_view() {
        let table = telemetry_table();
        let report = analyze(&table, &config()).unwrap();
        let basis = &report.rankings[0].control_basis;
        assert_eq!(basis.len(), 2);
        assert!(basis.iter().any(|e| e.name == "steps"));
        assert!(basis.iter().any(|e| e.name == "linear"));
    }

    #[test]
    fn test_report_serializes() {
        let table = telemetry_table();
        let report = analyze(&table, &config()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"rankings\""));
        assert!(json.contains("\"T1\""));
    }
}
