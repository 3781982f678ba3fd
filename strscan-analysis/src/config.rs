use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use strscan_core::Region;
use strscan_stats::{TestMethod, DEFAULT_TARGET_DEPTH};

use crate::errors::AnalysisResult;
use crate::profile::MergeParameters;

///
/// Settings shared by the analysis workflows.
///
/// Every key is optional in the TOML file:
///
/// ```toml
/// seed = 7
/// test_method = "permute_1000"
/// min_inrepeat_reads = 3
/// target_regions = ["chr4:3074876-3074933"]
///
/// [merge]
/// max_merge_distance = 300
/// ```
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub seed: u64,
    pub target_depth: f64,
    pub test_method: TestMethod,
    /// Smallest normalized anchored read count a locus needs in some sample to be tested
    pub min_inrepeat_reads: f64,
    /// Smallest normalized irr pair count a motif needs in some sample to be tested
    pub min_inrepeat_read_pairs: f64,
    pub target_regions: Option<Vec<String>>,
    pub merge: MergeParameters,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            target_depth: DEFAULT_TARGET_DEPTH,
            test_method: TestMethod::Normal,
            min_inrepeat_reads: 5.0,
            min_inrepeat_read_pairs: 5.0,
            target_regions: None,
            merge: MergeParameters::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let content = read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    ///
    /// Decode the configured target regions, or `None` when the analysis is not restricted.
    ///
    pub fn targets(&self) -> AnalysisResult<Option<Vec<Region>>> {
        match &self.target_regions {
            Some(encodings) => {
                let targets = encodings
                    .iter()
                    .map(|encoding| encoding.parse::<Region>())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(targets))
            }
            None => Ok(None),
        }
    }
}
