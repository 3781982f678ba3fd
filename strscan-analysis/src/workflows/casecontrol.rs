use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use strscan_core::FeatureCounts;
use strscan_stats::{correct_pvalues, TestMethod};

use crate::config::AnalysisConfig;
use crate::count_table::{
    anchored_count_table, depth_normalize, filter_by_magnitude, filter_by_region,
    irr_pair_count_table, CountRow,
};
use crate::errors::AnalysisResult;
use crate::manifest::Manifest;
use crate::profile::{MultisampleProfile, UNALIGNED};

///
/// Outcome of testing one locus or motif for higher counts in cases than in controls.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseControlRecord {
    pub motif: String,
    /// `chr:start-end` for locus records, `None` for motif records
    pub region: Option<String>,
    pub counts: FeatureCounts<f64>,
    pub pvalue: f64,
    pub bonf_pvalue: f64,
}

///
/// Rank-sum test every row, splitting samples by the manifest. Returns the raw p-values
/// in row order.
///
fn compare_counts<R: Rng>(
    table: &[CountRow],
    manifest: &Manifest,
    method: &TestMethod,
    rng: &mut R,
) -> AnalysisResult<Vec<f64>> {
    let cases = manifest.cases();
    let controls = manifest.controls();

    table
        .iter()
        .map(|row| -> AnalysisResult<f64> {
            let case_counts = row.counts_for(cases.iter().copied());
            let control_counts = row.counts_for(controls.iter().copied());
            Ok(method.pvalue(&case_counts, &control_counts, &mut *rng)?)
        })
        .collect()
}

/// Test, correct, and pair every row with its p-values.
fn test_table(
    table: Vec<CountRow>,
    manifest: &Manifest,
    config: &AnalysisConfig,
) -> AnalysisResult<Vec<CaseControlRecord>> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    log::info!("Comparing counts using {} test", config.test_method);
    let pvalues = compare_counts(&table, manifest, &config.test_method, &mut rng)?;

    log::info!("Correcting p-values");
    let bonf_pvalues = correct_pvalues(&pvalues);

    Ok(table
        .into_iter()
        .zip(pvalues.into_iter().zip(bonf_pvalues))
        .map(|(row, (pvalue, bonf_pvalue))| CaseControlRecord {
            motif: row.motif,
            region: row.region,
            counts: row.sample_counts,
            pvalue,
            bonf_pvalue,
        })
        .collect())
}

///
/// Compare anchored read counts between cases and controls at every locus.
///
/// Unaligned evidence is tested and counts towards the Bonferroni correction, but is left
/// out of the returned records.
///
pub fn casecontrol_locus(
    profile: &MultisampleProfile,
    manifest: &Manifest,
    config: &AnalysisConfig,
) -> AnalysisResult<Vec<CaseControlRecord>> {
    let table = anchored_count_table(profile);
    log::info!("Loaded {} regions", table.len());

    log::info!("Normalizing counts");
    let table = depth_normalize(table, &profile.parameters.depths, config.target_depth)?;

    log::info!("Filtering counts");
    let mut table = filter_by_magnitude(table, config.min_inrepeat_reads);

    if let Some(targets) = config.targets()? {
        log::info!("Restricting analysis to {} regions", targets.len());
        table = filter_by_region(table, &targets);
    }
    log::info!("{} regions left after filtering", table.len());

    let records = test_table(table, manifest, config)?
        .into_iter()
        .filter(|record| record.region.as_deref() != Some(UNALIGNED))
        .collect();

    log::info!("Done");
    Ok(records)
}

///
/// Compare irr pair counts between cases and controls for every motif.
///
pub fn casecontrol_motif(
    profile: &MultisampleProfile,
    manifest: &Manifest,
    config: &AnalysisConfig,
) -> AnalysisResult<Vec<CaseControlRecord>> {
    let table = irr_pair_count_table(profile);
    log::info!("Loaded {} motifs", table.len());

    log::info!("Normalizing counts");
    let table = depth_normalize(table, &profile.parameters.depths, config.target_depth)?;

    log::info!("Filtering counts");
    let table = filter_by_magnitude(table, config.min_inrepeat_read_pairs);
    log::info!("{} motifs left after filtering", table.len());

    let records = test_table(table, manifest, config)?;

    log::info!("Done");
    Ok(records)
}
