//! Multi-file aggregation of per-pair association scores.
//!
//! A recording session produces many log files with overlapping but not
//! identical channel sets. The aggregator drives the cleaning and association
//! stages across all of them, collects one [`AssociationRecord`] per
//! (file, target, variable) pair, and folds the records into a cross-file
//! mean score with a top-N ranking per target.
//!
//! Per-file work is limited to target-vs-all pairs: only target
//! relationships are of interest, and the full all-vs-all matrix would waste
//! the O(n²) distance-correlation budget on pairs nobody reads.
//!
//! Everything short of a globally empty result degrades gracefully: files
//! that fail to load, targets missing from a file, and pairs with fewer than
//! two jointly-present rows are skipped with a warning at most. Only
//! [`AggregateError::EmptyResult`] aborts a run.
//!
//! File loading stays behind the [`TableProvider`] seam; enumeration and
//! parsing policy belong to the caller.

use std::{collections::HashMap, fmt, thread};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    association::{AssociationConfig, pair_association, pair_association_joint},
    clean::{CleanConfig, clean, drop_constant_columns, extract_table},
    ranking::DEFAULT_TOP_K,
    table::{ExtractedTable, NumericTable, RawTable},
};

/// Source of per-file tables.
///
/// Implementations wrap whatever storage and format the logs live in; the
/// aggregator only sees file identifiers and in-memory tables.
pub trait TableProvider {
    /// Load failure; surfaced as a warning, not an abort.
    type Error: fmt::Display;

    /// Loads the table for one file identifier.
    fn load(&self, file: &str) -> Result<RawTable, Self::Error>;
}

/// How columns with missing rows are treated in multi-file mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Drop any column with a missing value, as single-file cleaning does.
    /// The jointly-present-rows guard is then trivially satisfied.
    #[default]
    DropColumns,
    /// Keep incomplete columns and correlate each pair over the rows where
    /// both values are present.
    JointRows,
}

/// Parameters for a multi-file run.
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Outcome channels whose associations are collected.
    pub targets: Vec<String>,
    /// Summary length per target.
    pub top_k: usize,
    /// Cleaning parameters applied to every file.
    pub clean: CleanConfig,
    /// Association measure and row cap.
    pub association: AssociationConfig,
    /// Missing-row treatment.
    pub missing: MissingPolicy,
    /// Process files on scoped worker threads. Output is identical either
    /// way; workers own local buffers merged in file order.
    pub parallel: bool,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            top_k: DEFAULT_TOP_K,
            clean: CleanConfig::default(),
            association: AssociationConfig::default(),
            missing: MissingPolicy::default(),
            parallel: true,
        }
    }
}

/// One per-file association observation, a row of the flat result table.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AssociationRecord {
    /// File identifier the observation came from.
    pub file: String,
    /// Target channel.
    pub target: String,
    /// Associated channel; never itself a declared target.
    pub variable: String,
    /// Association score within this file.
    pub score: f64,
}

/// Cross-file mean association for one (target, variable) pair.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MeanAssociation {
    /// Associated channel.
    pub variable: String,
    /// Arithmetic mean over the files that produced a record for this pair.
    /// Files without a record are excluded, not counted as zero.
    pub mean_score: f64,
    /// Number of files contributing to the mean.
    pub file_count: usize,
}

/// Ranked cross-file summary for one target.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TargetSummary {
    /// The target channel.
    pub target: String,
    /// Top-N pairs by descending absolute mean score.
    pub entries: Vec<MeanAssociation>,
}

/// Full multi-file result: the flat record table plus grouped summaries.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AggregateReport {
    /// Every record, in file order then target declaration order.
    pub records: Vec<AssociationRecord>,
    /// One summary per declared target, in declaration order.
    pub summaries: Vec<TargetSummary>,
}

/// Terminal failure of a multi-file run.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AggregateError {
    /// No file yielded a single record; there is nothing to rank.
    #[display("no association records were produced from any input file")]
    EmptyResult,
}

/// Drives cleaning and association across files and owns the record buffer.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
///
/// use railcor_analysis::aggregate::{AggregateConfig, Aggregator, TableProvider};
/// use railcor_analysis::association::{AssociationConfig, AssociationMethod};
/// use railcor_analysis::clean::CleanConfig;
/// use railcor_analysis::table::{Cell, RawTable};
///
/// struct InMemory(HashMap<String, RawTable>);
///
/// impl TableProvider for InMemory {
///     type Error = String;
///     fn load(&self, file: &str) -> Result<RawTable, String> {
///         self.0.get(file).cloned().ok_or_else(|| format!("no such file: {file}"))
///     }
/// }
///
/// let table = RawTable::new(vec![
///     ("bcp".into(), vec![Cell::from(1.0), Cell::from(2.0), Cell::from(3.0)]),
///     ("speed".into(), vec![Cell::from(2.0), Cell::from(4.0), Cell::from(6.0)]),
/// ])
/// .unwrap();
/// let provider = InMemory(HashMap::from([("run-01.csv".to_owned(), table)]));
///
/// let aggregator = Aggregator::new(AggregateConfig {
///     targets: vec!["bcp".into()],
///     clean: CleanConfig { skip_leading: 0 },
///     association: AssociationConfig {
///         method: AssociationMethod::SpearmanRank,
///         ..AssociationConfig::default()
///     },
///     ..AggregateConfig::default()
/// });
///
/// let report = aggregator.run(&provider, &["run-01.csv".to_owned()]).unwrap();
/// assert_eq!(report.records.len(), 1);
/// assert_eq!(report.summaries[0].entries[0].variable, "speed");
/// ```
#[derive(Debug)]
pub struct Aggregator {
    config: AggregateConfig,
}

impl Aggregator {
    /// Creates an aggregator with the given configuration.
    #[must_use]
    pub fn new(config: AggregateConfig) -> Self {
        Self { config }
    }

    /// The configuration this aggregator runs with.
    #[must_use]
    pub fn config(&self) -> &AggregateConfig {
        &self.config
    }

    /// Processes every file and folds the records into per-target summaries.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::EmptyResult`] when no file produced any
    /// record, the single fatal condition; everything else is skipped with
    /// a warning.
    pub fn run<P>(
        &self,
        provider: &P,
        files: &[String],
    ) -> Result<AggregateReport, AggregateError>
    where
        P: TableProvider + Sync,
    {
        let mut per_file: Vec<Vec<AssociationRecord>> = files.iter().map(|_| Vec::new()).collect();

        if self.config.parallel && files.len() > 1 {
            thread::scope(|scope| {
                for (slot, file) in per_file.iter_mut().zip(files) {
                    scope.spawn(move || *slot = self.process_file(provider, file));
                }
            });
        } else {
            for (slot, file) in per_file.iter_mut().zip(files) {
                *slot = self.process_file(provider, file);
            }
        }

        // Merge in file order so the report is deterministic either way.
        let records: Vec<AssociationRecord> = per_file.into_iter().flatten().collect();
        if records.is_empty() {
            return Err(AggregateError::EmptyResult);
        }

        let summaries = summarize(&records, &self.config.targets, self.config.top_k);
        Ok(AggregateReport { records, summaries })
    }

    fn process_file<P>(&self, provider: &P, file: &str) -> Vec<AssociationRecord>
    where
        P: TableProvider,
    {
        let table = match provider.load(file) {
            Ok(table) => table,
            Err(error) => {
                warn!(file = %file, error = %error, "failed to load file, skipping");
                return Vec::new();
            }
        };

        match self.config.missing {
            MissingPolicy::DropColumns => {
                self.complete_records(file, &clean(&table, &self.config.clean))
            }
            MissingPolicy::JointRows => {
                let extracted =
                    drop_constant_columns(extract_table(&table, &self.config.clean));
                self.joint_records(file, &extracted)
            }
        }
    }

    fn complete_records(&self, file: &str, table: &NumericTable) -> Vec<AssociationRecord> {
        let mut records = Vec::new();
        for target in &self.config.targets {
            let Some(target_col) = table.column(target) else {
                warn!(file = %file, target = %target, "target channel not present in file");
                continue;
            };
            for (name, col) in table.columns() {
                if self.is_target(name) {
                    continue;
                }
                if let Some(score) = pair_association(target_col, col, &self.config.association) {
                    records.push(self.record(file, target, name, score));
                }
            }
        }
        records
    }

    fn joint_records(&self, file: &str, table: &ExtractedTable) -> Vec<AssociationRecord> {
        let mut records = Vec::new();
        for target in &self.config.targets {
            let Some(target_col) = table.column(target) else {
                warn!(file = %file, target = %target, "target channel not present in file");
                continue;
            };
            for (name, col) in table.columns() {
                if self.is_target(name) {
                    continue;
                }
                if let Some(score) =
                    pair_association_joint(target_col, col, &self.config.association)
                {
                    records.push(self.record(file, target, name, score));
                }
            }
        }
        records
    }

    fn is_target(&self, name: &str) -> bool {
        self.config.targets.iter().any(|t| t == name)
    }

    fn record(&self, file: &str, target: &str, variable: &str, score: f64) -> AssociationRecord {
        AssociationRecord {
            file: file.to_owned(),
            target: target.to_owned(),
            variable: variable.to_owned(),
            score,
        }
    }
}

/// Groups records by (target, variable) and ranks each target's pairs by
/// descending absolute mean score.
///
/// The mean runs over contributing files only: a file that produced no
/// record for a pair does not pull the mean toward zero. Ties keep the
/// pair's first appearance order in the record buffer (the sort is stable).
///
/// # Examples
///
/// ```
/// use railcor_analysis::aggregate::{summarize, AssociationRecord};
///
/// let record = |file: &str, score: f64| AssociationRecord {
///     file: file.into(),
///     target: "T".into(),
///     variable: "V".into(),
///     score,
/// };
/// // Two of three files produced a record for (T, V).
/// let records = vec![record("f1", 0.2), record("f2", 0.8)];
/// let summaries = summarize(&records, &["T".into()], 10);
/// assert!((summaries[0].entries[0].mean_score - 0.5).abs() < 1e-12);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn summarize(
    records: &[AssociationRecord],
    targets: &[String],
    top_k: usize,
) -> Vec<TargetSummary> {
    targets
        .iter()
        .map(|target| {
            let mut order: Vec<&str> = Vec::new();
            let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
            for record in records.iter().filter(|r| &r.target == target) {
                let entry = totals.entry(record.variable.as_str()).or_insert_with(|| {
                    order.push(record.variable.as_str());
                    (0.0, 0)
                });
                entry.0 += record.score;
                entry.1 += 1;
            }

            let mut entries: Vec<MeanAssociation> = order
                .iter()
                .map(|variable| {
                    let (sum, count) = totals[variable];
                    MeanAssociation {
                        variable: (*variable).to_owned(),
                        mean_score: sum / count as f64,
                        file_count: count,
                    }
                })
                .collect();
            entries.sort_by(|a, b| b.mean_score.abs().total_cmp(&a.mean_score.abs()));
            entries.truncate(top_k);

            TargetSummary {
                target: target.clone(),
                entries,
            }
        })
        .collect()
}
