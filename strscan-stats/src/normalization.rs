use crate::errors::StatsError;

/// Sequencing depth that normalized counts are expressed at.
pub const DEFAULT_TARGET_DEPTH: f64 = 40.0;

///
/// Rescale a raw count observed at `sample_depth` to what it would be at `target_depth`.
///
/// # Arguments
/// - sample_depth: the sample's sequencing depth, must be positive
/// - count: the raw count
/// - target_depth: the common depth to express counts at
///
pub fn normalize_count(sample_depth: f64, count: f64, target_depth: f64) -> Result<f64, StatsError> {
    if sample_depth <= 0.0 || sample_depth.is_nan() {
        return Err(StatsError::NonPositiveDepth(sample_depth));
    }
    Ok(target_depth * count / sample_depth)
}
