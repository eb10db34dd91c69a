//! Statistical association kernels for the railcor project.
//!
//! This crate provides the numeric measures the analysis pipeline is built on:
//!
//! - **Distance correlation**: Nonlinear dependence measure in [0, 1] computed
//!   from double-centered pairwise-distance matrices
//! - **Rank correlation**: Spearman's rank correlation in [-1, 1] with
//!   average-rank tie handling, including a joint-presence variant for columns
//!   with missing rows
//!
//! # Modules
//!
//! - [`distance`]: Distance matrices, double-centering, and distance correlation
//! - [`rank`]: Rank transforms and Spearman rank correlation
//!
//! # Examples
//!
//! ## Computing distance correlation
//!
//! ```
//! use railcor_stats::distance::distance_correlation;
//!
//! let x = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let y = [2.0, 4.0, 6.0, 8.0, 10.0];
//! let dcor = distance_correlation(&x, &y).unwrap();
//! assert!((dcor - 1.0).abs() < 1e-12);
//! ```
//!
//! ## Computing rank correlation
//!
//! ```
//! use railcor_stats::rank::spearman;
//!
//! let x = [1.0, 2.0, 3.0, 4.0];
//! let y = [1.0, 4.0, 9.0, 16.0]; // monotone, not linear
//! let rho = spearman(&x, &y).unwrap();
//! assert!((rho - 1.0).abs() < 1e-12);
//! ```

pub mod distance;
pub mod rank;
