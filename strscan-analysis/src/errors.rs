use thiserror::Error;

use strscan_core::RegionError;
use strscan_stats::StatsError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid sample status '{0}', expected 'case' or 'control'")]
    InvalidSampleStatus(String),

    #[error("Sample {0} is listed more than once in the manifest")]
    DuplicateSample(String),

    #[error("Sample {0} has no depth")]
    MissingDepth(String),

    #[error("Sample {0} has no read length")]
    MissingReadLength(String),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
