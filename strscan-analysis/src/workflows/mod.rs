//! End-to-end analyses over a multisample profile.
//!
//! Each workflow seeds a single [rand::rngs::StdRng] from the configured seed and threads
//! it through every randomized call, so identical inputs always give identical output.
pub mod casecontrol;
pub mod outlier;

pub use casecontrol::{casecontrol_locus, casecontrol_motif, CaseControlRecord};
pub use outlier::{outlier_locus, outlier_motif, OutlierRecord};
