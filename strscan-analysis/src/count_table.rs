//! Flat count tables built from a multisample profile.
//!
//! A table has one row per (motif, region) for anchored evidence, or one row per motif
//! for irr pairs. Rows come out of a [MultisampleProfile] with raw integer counts and are
//! turned into floating point counts by [depth_normalize].
use std::collections::BTreeMap;

use serde::Serialize;

use strscan_core::{distance, Distance, FeatureCounts, Region};
use strscan_stats::normalize_count;

use crate::errors::{AnalysisError, AnalysisResult};
use crate::profile::{MultisampleProfile, UNALIGNED};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRow<T = f64> {
    pub motif: String,
    /// Region encoding for anchored rows, `None` for motif-level rows
    pub region: Option<String>,
    pub sample_counts: FeatureCounts<T>,
}

impl<T> CountRow<T> {
    pub fn is_unaligned(&self) -> bool {
        self.region.as_deref() == Some(UNALIGNED)
    }

    /// The row's region, if it has one that names a reference position.
    pub fn decode_region(&self) -> Option<Region> {
        self.region.as_deref().and_then(|encoding| encoding.parse().ok())
    }
}

impl<T: Copy + Into<f64>> CountRow<T> {
    ///
    /// Counts of `samples` in the order given, with absent samples as zero.
    ///
    pub fn counts_for<'a, I>(&self, samples: I) -> Vec<f64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        samples
            .into_iter()
            .map(|sample| self.sample_counts.get(sample).map_or(0.0, Into::into))
            .collect()
    }
}

///
/// One row per (motif, region) from the anchored-evidence part of the profile.
///
pub fn anchored_count_table(profile: &MultisampleProfile) -> Vec<CountRow<u32>> {
    profile
        .counts
        .iter()
        .flat_map(|(motif, record)| {
            record
                .regions_with_irr_anchors
                .iter()
                .map(move |(region, sample_counts)| CountRow {
                    motif: motif.clone(),
                    region: Some(region.clone()),
                    sample_counts: sample_counts.clone(),
                })
        })
        .collect()
}

///
/// One row per motif from the irr-pair part of the profile.
///
/// Motifs without any irr pairs are left out.
///
pub fn irr_pair_count_table(profile: &MultisampleProfile) -> Vec<CountRow<u32>> {
    profile
        .counts
        .iter()
        .filter(|(_, record)| !record.irr_pair_counts.is_empty())
        .map(|(motif, record)| CountRow {
            motif: motif.clone(),
            region: None,
            sample_counts: record.irr_pair_counts.clone(),
        })
        .collect()
}

///
/// Rescale every count to `target_depth` using each sample's own depth.
///
/// # Arguments
/// - table: rows with raw counts
/// - depths: sequencing depth per sample
/// - target_depth: the common depth to express counts at
///
pub fn depth_normalize(
    table: Vec<CountRow<u32>>,
    depths: &BTreeMap<String, f64>,
    target_depth: f64,
) -> AnalysisResult<Vec<CountRow<f64>>> {
    table
        .into_iter()
        .map(|row| -> AnalysisResult<CountRow> {
            let sample_counts = row.sample_counts.try_map(|sample, count| {
                let depth = depths
                    .get(sample)
                    .ok_or_else(|| AnalysisError::MissingDepth(sample.to_string()))?;
                Ok::<f64, AnalysisError>(normalize_count(*depth, count as f64, target_depth)?)
            })?;

            Ok(CountRow {
                motif: row.motif,
                region: row.region,
                sample_counts,
            })
        })
        .collect()
}

///
/// Keep rows where at least one sample reaches `cutoff`.
///
pub fn filter_by_magnitude(table: Vec<CountRow>, cutoff: f64) -> Vec<CountRow> {
    table
        .into_iter()
        .filter(|row| {
            row.sample_counts
                .values()
                .max_by(|a, b| a.total_cmp(b))
                .is_some_and(|max| max >= cutoff)
        })
        .collect()
}

///
/// Keep rows whose region overlaps or touches at least one of `targets`.
///
/// Rows without a decodable region, such as motif-level and unaligned rows, are dropped.
///
pub fn filter_by_region(table: Vec<CountRow>, targets: &[Region]) -> Vec<CountRow> {
    table
        .into_iter()
        .filter(|row| match row.decode_region() {
            Some(region) => targets
                .iter()
                .any(|target| distance(&region, target) == Ok(Distance::Finite(0))),
            None => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::profile::{MotifCounts, SampleParameters};

    #[fixture]
    fn profile() -> MultisampleProfile {
        let mut counts = BTreeMap::new();
        counts.insert(
            "CAG".to_string(),
            MotifCounts {
                regions_with_irr_anchors: BTreeMap::from([
                    ("chr1:100-200".to_string(), FeatureCounts::from([("S1", 10), ("S2", 2)])),
                    ("unaligned".to_string(), FeatureCounts::from([("S1", 1)])),
                ]),
                irr_pair_counts: FeatureCounts::from([("S1", 8)]),
            },
        );
        counts.insert(
            "AAGGG".to_string(),
            MotifCounts {
                regions_with_irr_anchors: BTreeMap::from([(
                    "chr4:1000-1100".to_string(),
                    FeatureCounts::from([("S2", 3)]),
                )]),
                irr_pair_counts: FeatureCounts::new(),
            },
        );

        MultisampleProfile {
            counts,
            parameters: SampleParameters {
                depths: BTreeMap::from([("S1".to_string(), 20.0), ("S2".to_string(), 80.0)]),
                read_lengths: BTreeMap::new(),
            },
        }
    }

    fn row(motif: &str, region: Option<&str>, counts: &[(&str, f64)]) -> CountRow {
        CountRow {
            motif: motif.to_string(),
            region: region.map(str::to_string),
            sample_counts: counts.iter().copied().collect(),
        }
    }

    #[rstest]
    fn test_anchored_count_table(profile: MultisampleProfile) {
        let table = anchored_count_table(&profile);
        let keys: Vec<(&str, Option<&str>)> = table
            .iter()
            .map(|r| (r.motif.as_str(), r.region.as_deref()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("AAGGG", Some("chr4:1000-1100")),
                ("CAG", Some("chr1:100-200")),
                ("CAG", Some("unaligned")),
            ]
        );
        assert!(table[2].is_unaligned());
        assert_eq!(table[2].decode_region(), None);
    }

    #[rstest]
    fn test_irr_pair_count_table(profile: MultisampleProfile) {
        let table = irr_pair_count_table(&profile);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].motif, "CAG");
        assert_eq!(table[0].region, None);
        assert_eq!(table[0].sample_counts, FeatureCounts::from([("S1", 8)]));
    }

    #[rstest]
    fn test_depth_normalize(profile: MultisampleProfile) {
        let table = depth_normalize(
            anchored_count_table(&profile),
            &profile.parameters.depths,
            40.0,
        )
        .unwrap();

        assert_eq!(
            table[1].sample_counts,
            FeatureCounts::from([("S1", 20.0), ("S2", 1.0)])
        );
        assert_eq!(table[0].sample_counts, FeatureCounts::from([("S2", 1.5)]));
    }

    #[rstest]
    fn test_depth_normalize_missing_depth(profile: MultisampleProfile) {
        let depths = BTreeMap::from([("S1".to_string(), 20.0)]);
        let result = depth_normalize(anchored_count_table(&profile), &depths, 40.0);
        assert!(matches!(result, Err(AnalysisError::MissingDepth(s)) if s == "S2"));
    }

    #[rstest]
    fn test_depth_normalize_zero_depth(profile: MultisampleProfile) {
        let depths = BTreeMap::from([("S1".to_string(), 0.0), ("S2".to_string(), 30.0)]);
        let result = depth_normalize(anchored_count_table(&profile), &depths, 40.0);
        assert!(matches!(result, Err(AnalysisError::Stats(_))));
    }

    #[rstest]
    fn test_filter_by_magnitude() {
        let table = vec![
            row("CAG", Some("chr1:1-10"), &[("S1", 4.9), ("S2", 5.0)]),
            row("CAG", Some("chr1:50-60"), &[("S1", 4.9), ("S2", 1.0)]),
            row("CAG", Some("chr1:90-95"), &[]),
        ];
        let kept = filter_by_magnitude(table, 5.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].region.as_deref(), Some("chr1:1-10"));
    }

    #[rstest]
    fn test_filter_by_region() {
        let table = vec![
            row("CAG", Some("chr1:100-200"), &[("S1", 1.0)]),
            row("CAG", Some("chr1:300-400"), &[("S1", 1.0)]),
            row("CAG", Some("chr2:100-200"), &[("S1", 1.0)]),
            row("CAG", Some("unaligned"), &[("S1", 1.0)]),
            row("CAG", None, &[("S1", 1.0)]),
            row("AAGGG", Some("chr1:200-250"), &[("S1", 1.0)]),
        ];
        let targets = vec![Region::new("chr1", 150, 200)];

        let kept: Vec<String> = filter_by_region(table, &targets)
            .into_iter()
            .filter_map(|r| r.region)
            .collect();
        assert_eq!(kept, vec!["chr1:100-200", "chr1:200-250"]);
    }

    #[rstest]
    fn test_counts_for_fills_missing_with_zero() {
        let r = row("CAG", Some("chr1:1-10"), &[("S1", 3.0)]);
        assert_eq!(r.counts_for(["S1", "S2"]), vec![3.0, 0.0]);
    }
}
