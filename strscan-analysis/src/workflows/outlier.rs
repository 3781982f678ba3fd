use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use strscan_core::FeatureCounts;
use strscan_stats::OutlierScorer;

use crate::config::AnalysisConfig;
use crate::count_table::{
    anchored_count_table, depth_normalize, filter_by_region, irr_pair_count_table, CountRow,
};
use crate::errors::AnalysisResult;
use crate::manifest::Manifest;
use crate::profile::MultisampleProfile;

///
/// A locus or motif where at least one case stands out from the cohort.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierRecord {
    pub motif: String,
    /// `chr:start-end` for locus records, `None` for motif records
    pub region: Option<String>,
    pub top_case_zscore: f64,
    pub cases_with_high_counts: Vec<(String, f64)>,
    pub counts: FeatureCounts<f64>,
}

///
/// Score every row against the whole cohort and keep rows with flagged cases.
///
fn score_table<R: Rng>(
    table: Vec<CountRow>,
    manifest: &Manifest,
    rng: &mut R,
) -> AnalysisResult<Vec<OutlierRecord>> {
    let scorer = OutlierScorer::default();
    let cases = manifest.cases();

    let mut records = Vec::new();
    for row in table {
        // samples missing from the row still take part in the background, as zeros
        let background = row.counts_for(manifest.samples());
        let case_counts: Vec<(&str, f64)> = cases
            .iter()
            .map(|&sample| (sample, row.sample_counts.get(sample).unwrap_or(0.0)))
            .collect();

        let score = scorer.score(&background, &case_counts, rng)?;
        log::debug!(
            "{} {:?}: mu={:.2} sigma={:.2}",
            row.motif,
            row.region,
            score.mu,
            score.sigma
        );
        if !score.has_outliers() {
            continue;
        }

        records.push(OutlierRecord {
            motif: row.motif,
            region: row.region,
            top_case_zscore: score.top_zscore,
            cases_with_high_counts: score.cases_with_high_counts,
            counts: row.sample_counts,
        });
    }

    Ok(records)
}

///
/// Look for cases with unusually many anchored reads at each locus.
///
pub fn outlier_locus(
    profile: &MultisampleProfile,
    manifest: &Manifest,
    config: &AnalysisConfig,
) -> AnalysisResult<Vec<OutlierRecord>> {
    let table = anchored_count_table(profile);
    log::info!("Loaded {} regions", table.len());

    log::info!("Normalizing counts");
    let mut table = depth_normalize(table, &profile.parameters.depths, config.target_depth)?;

    if let Some(targets) = config.targets()? {
        log::info!("Restricting analysis to {} regions", targets.len());
        table = filter_by_region(table, &targets);
    }
    table.retain(|row| !row.is_unaligned());

    let mut rng = StdRng::seed_from_u64(config.seed);
    let records = score_table(table, manifest, &mut rng)?;

    log::info!("Found {} regions with outlier cases", records.len());
    Ok(records)
}

///
/// Look for cases with unusually many irr pairs for each motif.
///
pub fn outlier_motif(
    profile: &MultisampleProfile,
    manifest: &Manifest,
    config: &AnalysisConfig,
) -> AnalysisResult<Vec<OutlierRecord>> {
    let table = irr_pair_count_table(profile);
    log::info!("Loaded {} motifs", table.len());

    log::info!("Normalizing counts");
    let table = depth_normalize(table, &profile.parameters.depths, config.target_depth)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let records = score_table(table, manifest, &mut rng)?;

    log::info!("Found {} motifs with outlier cases", records.len());
    Ok(records)
}
