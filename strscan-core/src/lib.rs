//! Core models for working with short-tandem-repeat evidence across a cohort.
//!
//! The central types are [`Region`], a genomic interval that may carry a per-sample
//! [`FeatureCounts`] map, and [`RegionCollection`], which can coalesce nearby regions
//! on the same chromosome while summing their counts.
//!
//! ## Quick Start
//!
//! ```rust
//! use strscan_core::models::{FeatureCounts, Region, RegionCollection};
//!
//! let regions = RegionCollection::from(vec![
//!     Region::with_counts("chr1", 10, 20, FeatureCounts::from([("S1", 1)])),
//!     Region::with_counts("chr1", 15, 25, FeatureCounts::from([("S2", 2)])),
//! ]);
//!
//! let merged = regions.merge(500).unwrap();
//! assert_eq!(merged.len(), 1);
//! assert_eq!(merged[0].to_string(), "chr1:10-25(S1=1,S2=2)");
//! ```
pub mod errors;
pub mod models;

// re-exports
pub use errors::RegionError;
pub use models::{distance, Distance, FeatureCounts, Region, RegionCollection};
