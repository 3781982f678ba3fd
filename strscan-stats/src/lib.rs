//! Statistics for comparing repeat evidence between cases and controls.
//!
//! - [`rank_sum`]: one-sided Wilcoxon rank-sum test, with a normal approximation and
//!   two resampling variants
//! - [`correction`]: Bonferroni adjustment
//! - [`normalization`]: rescaling raw counts to a common sequencing depth
//! - [`outlier`]: bootstrapped background z-scores for individual case samples
pub mod correction;
pub mod errors;
pub mod normalization;
pub mod outlier;
pub mod rank_sum;

// re-exports
pub use correction::{bonferroni, correct_pvalues};
pub use errors::StatsError;
pub use normalization::{normalize_count, DEFAULT_TARGET_DEPTH};
pub use outlier::{quantile, OutlierScore, OutlierScorer};
pub use rank_sum::{rank_with_ties, TestMethod};
