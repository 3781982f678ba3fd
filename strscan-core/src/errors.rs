use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegionError {
    #[error("Cannot compute distance between unset regions")]
    UnsetRegion,

    #[error("Error parsing region: {0}")]
    RegionParseError(String),
}
