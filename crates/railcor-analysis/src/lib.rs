//! Channel association analysis for railway telemetry logs
//!
//! This crate turns noisy, text-formatted telemetry tables into ranked
//! association results: which recorded channels move with a designated
//! target channel (a brake-cylinder pressure, typically), measured by
//! distance correlation or Spearman rank correlation.
//!
//! # Overview
//!
//! The pipeline is a strictly linear batch run:
//!
//! ```text
//! RawTable (per file)
//!     ↓ extract + clean        (table, extract, clean)
//! NumericTable
//!     ↓ associate              (association, railcor-stats kernels)
//! AssociationMatrix
//!     ↓ rank                   (ranking)
//! RankedEntry lists per target
//! ```
//!
//! Two drivers sit on top:
//!
//! - [`pipeline::analyze`]: one file, producing the full matrix plus per-target top-K and
//!   control-basis rankings
//! - [`aggregate::Aggregator`]: many files, producing per-file target-vs-all records,
//!   cross-file mean scores, top-N per target
//!
//! File enumeration, log parsing, rendering, and persistence are external:
//! callers hand in [`table::RawTable`]s (multi-file mode goes through the
//! [`aggregate::TableProvider`] seam) and consume serde-serializable results.
//!
//! # Modules
//!
//! - [`table`]: Cell and table data model, validated at construction
//! - [`extract`]: Numeric extraction from heterogeneous cell text
//! - [`clean`]: Metadata skip, extraction, missing/constant column drops
//! - [`association`]: Association matrices and pairwise scores
//! - [`ranking`]: Per-target top-K and whitelist-restricted rankings
//! - [`pipeline`]: Single-file driver
//! - [`aggregate`]: Multi-file aggregation with cross-file means
//!
//! # Quick Start
//!
//! ```
//! use railcor_analysis::clean::CleanConfig;
//! use railcor_analysis::pipeline::{analyze, AnalysisConfig};
//! use railcor_analysis::table::{Cell, RawTable};
//!
//! // One already-tokenized log: two metadata columns, then channels.
//! let table = RawTable::new(vec![
//!     ("idx".into(), vec![Cell::from(1.0), Cell::from(2.0), Cell::from(3.0)]),
//!     ("time".into(), vec![Cell::from("09:00"), Cell::from("09:01"), Cell::from("09:02")]),
//!     ("bc_pressure".into(), vec![Cell::from("310"), Cell::from("150 kPa"), Cell::from("40")]),
//!     ("speed".into(), vec![Cell::from(42.0), Cell::from(20.5), Cell::from(3.0)]),
//!     ("door_state".into(), vec![Cell::from(0.0), Cell::from(0.0), Cell::from(0.0)]),
//! ])
//! .unwrap();
//!
//! let config = AnalysisConfig {
//!     targets: vec!["bc_pressure".into()],
//!     ..AnalysisConfig::default()
//! };
//! let report = analyze(&table, &config).unwrap();
//!
//! // The constant door_state channel was dropped during cleaning.
//! assert_eq!(report.matrix.names(), ["bc_pressure", "speed"]);
//! assert_eq!(report.rankings[0].top[0].name, "speed");
//! ```

pub mod aggregate;
pub mod association;
pub mod clean;
pub mod extract;
pub mod pipeline;
pub mod ranking;
pub mod table;
