pub mod feature_counts;
pub mod region;
pub mod region_collection;

// re-export for cleaner imports
pub use self::feature_counts::FeatureCounts;
pub use self::region::{distance, Distance, Region};
pub use self::region_collection::{RegionCollection, DEFAULT_MAX_MERGE_DISTANCE};
