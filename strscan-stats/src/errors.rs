use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum StatsError {
    #[error("Unknown test parameters: {0}")]
    UnknownTestMethod(String),

    #[error("Number of iterations must be a positive integer, got: {0}")]
    InvalidIterationCount(String),

    #[error("Rank-sum test requires at least one case and one control (got {cases} cases and {controls} controls)")]
    EmptyGroup { cases: usize, controls: usize },

    #[error("Sequencing depth must be positive, got {0}")]
    NonPositiveDepth(f64),

    #[error("Can't resample from an empty set of counts")]
    EmptyBackground,

    #[error("Manifest must contain at least one case")]
    NoCaseSamples,
}
