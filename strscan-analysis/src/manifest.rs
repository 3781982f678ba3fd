//! Cohort manifests: which samples are cases, which are controls, and where their
//! profiles live.
//!
//! A manifest is stored as a JSON list of `{"sample_id", "status", "path"}` entries.
//! Each sample may appear only once.
use std::collections::HashSet;
use std::fmt::{self, Display};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{AnalysisError, AnalysisResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SampleStatus {
    Case,
    Control,
}

impl FromStr for SampleStatus {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "case" => Ok(SampleStatus::Case),
            "control" => Ok(SampleStatus::Control),
            _ => Err(AnalysisError::InvalidSampleStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for SampleStatus {
    type Error = AnalysisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SampleStatus> for String {
    fn from(status: SampleStatus) -> Self {
        status.to_string()
    }
}

impl Display for SampleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleStatus::Case => write!(f, "case"),
            SampleStatus::Control => write!(f, "control"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub sample_id: String,
    pub status: SampleStatus,
    pub path: PathBuf,
}

impl ManifestEntry {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(sample_id: S, status: SampleStatus, path: P) -> Self {
        ManifestEntry {
            sample_id: sample_id.into(),
            status,
            path: path.into(),
        }
    }
}

///
/// Ordered list of the samples in a cohort, one entry per sample.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ManifestEntry>", into = "Vec<ManifestEntry>")]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    ///
    /// Build a manifest, rejecting any sample listed more than once.
    ///
    pub fn new(entries: Vec<ManifestEntry>) -> AnalysisResult<Self> {
        let mut seen = HashSet::new();
        if let Some(entry) = entries
            .iter()
            .find(|entry| !seen.insert(entry.sample_id.as_str()))
        {
            return Err(AnalysisError::DuplicateSample(entry.sample_id.clone()));
        }
        Ok(Manifest { entries })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (sample, status) pairs in manifest order.
    pub fn sample_status(&self) -> impl Iterator<Item = (&str, SampleStatus)> {
        self.entries
            .iter()
            .map(|entry| (entry.sample_id.as_str(), entry.status))
    }

    pub fn samples(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.sample_id.as_str())
    }

    pub fn cases(&self) -> Vec<&str> {
        self.with_status(SampleStatus::Case)
    }

    pub fn controls(&self) -> Vec<&str> {
        self.with_status(SampleStatus::Control)
    }

    pub fn has_cases(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.status == SampleStatus::Case)
    }

    fn with_status(&self, status: SampleStatus) -> Vec<&str> {
        self.sample_status()
            .filter(|(_, s)| *s == status)
            .map(|(sample, _)| sample)
            .collect()
    }
}

impl TryFrom<Vec<ManifestEntry>> for Manifest {
    type Error = AnalysisError;

    fn try_from(entries: Vec<ManifestEntry>) -> Result<Self, Self::Error> {
        Manifest::new(entries)
    }
}

impl From<Manifest> for Vec<ManifestEntry> {
    fn from(manifest: Manifest) -> Self {
        manifest.entries
    }
}
