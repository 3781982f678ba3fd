//! Cohort-level analysis of short tandem repeat evidence.
//!
//! Sample profiles are merged into a [profile::MultisampleProfile], flattened into count
//! tables, normalized to a common depth and then either compared between cases and
//! controls or scanned for individual outlier cases.
//!
//! ```rust,no_run
//! use strscan_analysis::config::AnalysisConfig;
//! use strscan_analysis::manifest::Manifest;
//! use strscan_analysis::profile::MultisampleProfile;
//! use strscan_analysis::workflows::casecontrol_locus;
//!
//! let manifest = Manifest::from_path("manifest.json").unwrap();
//! let profile = MultisampleProfile::from_path("cohort.multisample_profile.json").unwrap();
//! let config = AnalysisConfig::from_file("analysis.toml").unwrap();
//!
//! let records = casecontrol_locus(&profile, &manifest, &config).unwrap();
//! println!("{}", serde_json::to_string_pretty(&records).unwrap());
//! ```
pub mod config;
pub mod count_table;
pub mod errors;
pub mod manifest;
pub mod profile;
pub mod workflows;

// re-exports
pub use config::AnalysisConfig;
pub use errors::{AnalysisError, AnalysisResult};
pub use manifest::{Manifest, ManifestEntry, SampleStatus};
pub use profile::{MergeParameters, MultisampleProfile, ProfileMerger, SampleProfile};
pub use workflows::{CaseControlRecord, OutlierRecord};
