//! Per-sample STR profiles and the cohort-wide multisample profile built from them.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use strscan_core::models::DEFAULT_MAX_MERGE_DISTANCE;
use strscan_core::{FeatureCounts, RegionCollection};

use crate::errors::{AnalysisError, AnalysisResult};
use crate::manifest::Manifest;

/// Encoding used for anchored evidence that could not be placed on the reference.
pub const UNALIGNED: &str = "unaligned";

///
/// Knobs for combining sample profiles into a multisample profile.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeParameters {
    /// Shortest motif (in bp) to keep
    pub shortest_unit: usize,
    /// Longest motif (in bp) to keep
    pub longest_unit: usize,
    pub max_merge_distance: u32,
    /// Merge accumulated regions after every this many samples
    pub normalization_stride: usize,
}

impl Default for MergeParameters {
    fn default() -> Self {
        Self {
            shortest_unit: 2,
            longest_unit: 20,
            max_merge_distance: DEFAULT_MAX_MERGE_DISTANCE,
            normalization_stride: 50,
        }
    }
}

impl MergeParameters {
    fn keeps_motif(&self, motif: &str) -> bool {
        (self.shortest_unit..=self.longest_unit).contains(&motif.len())
    }
}

/// Evidence for one motif in one sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotifRecord {
    #[serde(
        rename = "RegionsWithIrrAnchors",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub regions_with_irr_anchors: Option<BTreeMap<String, u32>>,

    #[serde(rename = "IrrPairCount", default, skip_serializing_if = "Option::is_none")]
    pub irr_pair_count: Option<u32>,
}

///
/// STR profile of a single sample.
///
/// Besides `ReadLength` and `Depth`, every top-level key is a motif.
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleProfile {
    #[serde(rename = "ReadLength", default)]
    pub read_length: Option<u32>,

    #[serde(rename = "Depth", default)]
    pub depth: Option<f64>,

    #[serde(flatten)]
    pub motifs: BTreeMap<String, MotifRecord>,
}

impl SampleProfile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Cohort-wide counts for one motif.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotifCounts {
    #[serde(
        rename = "RegionsWithIrrAnchors",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub regions_with_irr_anchors: BTreeMap<String, FeatureCounts>,

    #[serde(
        rename = "IrrPairCounts",
        default,
        skip_serializing_if = "FeatureCounts::is_empty"
    )]
    pub irr_pair_counts: FeatureCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleParameters {
    #[serde(rename = "Depths", default)]
    pub depths: BTreeMap<String, f64>,

    #[serde(rename = "ReadLengths", default)]
    pub read_lengths: BTreeMap<String, u32>,
}

///
/// Counts of every motif across a cohort, plus the per-sample depth and read length
/// needed to normalize them.
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultisampleProfile {
    #[serde(rename = "Counts", default)]
    pub counts: BTreeMap<String, MotifCounts>,

    #[serde(rename = "Parameters", default)]
    pub parameters: SampleParameters,
}

impl MultisampleProfile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> AnalysisResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    ///
    /// Combine already-loaded sample profiles, in the given order.
    ///
    pub fn from_sample_profiles<'a, I>(samples: I, params: &MergeParameters) -> AnalysisResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a SampleProfile)>,
    {
        let mut merger = ProfileMerger::new(params.clone());
        for (sample_id, profile) in samples {
            merger.add_sample(sample_id, profile)?;
        }
        merger.finish()
    }

    ///
    /// Load and combine the profile of every sample in the manifest.
    ///
    /// Profiles are read one at a time so only the merged regions are held in memory.
    ///
    pub fn from_manifest(manifest: &Manifest, params: &MergeParameters) -> AnalysisResult<Self> {
        log::info!("Loaded manifest describing {} samples", manifest.len());

        let mut merger = ProfileMerger::new(params.clone());
        for entry in manifest.entries() {
            log::info!("Loading STR profile of {}", entry.sample_id);
            let profile = SampleProfile::from_path(&entry.path)?;
            merger.add_sample(&entry.sample_id, &profile)?;
        }
        merger.finish()
    }
}

///
/// Incrementally folds sample profiles into a [MultisampleProfile].
///
/// Anchored regions pile up per motif and are merged by proximity every
/// `normalization_stride` samples, keeping the working set small for large cohorts.
/// Unaligned evidence is summed separately.
///
#[derive(Debug, Clone)]
pub struct ProfileMerger {
    params: MergeParameters,
    anchored: BTreeMap<String, RegionCollection>,
    unaligned: BTreeMap<String, FeatureCounts>,
    irr_pairs: BTreeMap<String, FeatureCounts>,
    parameters: SampleParameters,
    num_samples: usize,
}

impl ProfileMerger {
    pub fn new(params: MergeParameters) -> Self {
        ProfileMerger {
            params,
            anchored: BTreeMap::new(),
            unaligned: BTreeMap::new(),
            irr_pairs: BTreeMap::new(),
            parameters: SampleParameters::default(),
            num_samples: 0,
        }
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn add_sample(&mut self, sample_id: &str, profile: &SampleProfile) -> AnalysisResult<()> {
        let read_length = match profile.read_length {
            Some(len) if len > 0 => len,
            _ => return Err(AnalysisError::MissingReadLength(sample_id.to_string())),
        };
        let depth = profile
            .depth
            .ok_or_else(|| AnalysisError::MissingDepth(sample_id.to_string()))?;

        for (motif, record) in &profile.motifs {
            if !self.params.keeps_motif(motif) {
                continue;
            }

            if let Some(regions) = &record.regions_with_irr_anchors {
                self.add_anchored(sample_id, motif, regions)?;
            }

            if let Some(count) = record.irr_pair_count.filter(|&count| count > 0) {
                self.irr_pairs
                    .entry(motif.clone())
                    .or_default()
                    .insert(sample_id, count);
            }
        }

        self.parameters
            .read_lengths
            .insert(sample_id.to_string(), read_length);
        self.parameters.depths.insert(sample_id.to_string(), depth);
        self.num_samples += 1;

        let stride = self.params.normalization_stride;
        if stride > 0 && self.num_samples % stride == 0 {
            log::info!("Normalizing after loading sample #{}", self.num_samples);
            self.merge_regions()?;
        }

        Ok(())
    }

    fn add_anchored(
        &mut self,
        sample_id: &str,
        motif: &str,
        regions: &BTreeMap<String, u32>,
    ) -> AnalysisResult<()> {
        if let Some(&count) = regions.get(UNALIGNED) {
            self.unaligned
                .entry(motif.to_string())
                .or_default()
                .combine(&FeatureCounts::from([(sample_id, count)]));
        }

        let aligned = RegionCollection::from_sample_record(
            sample_id,
            regions.iter().filter(|(encoding, _)| encoding.as_str() != UNALIGNED),
        )?;
        if !aligned.is_empty() {
            self.anchored
                .entry(motif.to_string())
                .or_default()
                .extend(aligned);
        }

        Ok(())
    }

    fn merge_regions(&mut self) -> AnalysisResult<()> {
        for regions in self.anchored.values_mut() {
            *regions = regions.merge(self.params.max_merge_distance)?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> AnalysisResult<MultisampleProfile> {
        self.merge_regions()?;

        let mut counts: BTreeMap<String, MotifCounts> = BTreeMap::new();
        for (motif, regions) in &self.anchored {
            counts
                .entry(motif.clone())
                .or_default()
                .regions_with_irr_anchors
                .extend(regions.as_map());
        }
        for (motif, sample_counts) in self.unaligned {
            counts
                .entry(motif)
                .or_default()
                .regions_with_irr_anchors
                .insert(UNALIGNED.to_string(), sample_counts);
        }
        for (motif, sample_counts) in self.irr_pairs {
            counts.entry(motif).or_default().irr_pair_counts = sample_counts;
        }

        log::info!(
            "Merged profiles of {} samples covering {} motifs",
            self.num_samples,
            counts.len()
        );

        Ok(MultisampleProfile {
            counts,
            parameters: self.parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn sample_profile(json: &str) -> SampleProfile {
        serde_json::from_str(json).unwrap()
    }

    #[fixture]
    fn profile_a() -> SampleProfile {
        sample_profile(
            r#"{
                "ReadLength": 150,
                "Depth": 30.0,
                "CAG": {
                    "AnchoredIrrCount": 7,
                    "RegionsWithIrrAnchors": {"chr1:100-200": 4, "chr2:10-20": 1, "unaligned": 2},
                    "IrrPairCount": 3
                },
                "A": {"IrrPairCount": 10},
                "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAC": {"IrrPairCount": 1}
            }"#,
        )
    }

    #[fixture]
    fn profile_b() -> SampleProfile {
        sample_profile(
            r#"{
                "ReadLength": 150,
                "Depth": 45.5,
                "CAG": {
                    "RegionsWithIrrAnchors": {"chr1:150-260": 6, "unaligned": 1},
                    "IrrPairCount": 0
                },
                "AAGGG": {"RegionsWithIrrAnchors": {"chr4:1000-1100": 2}}
            }"#,
        )
    }

    #[rstest]
    fn test_decode_sample_profile(profile_a: SampleProfile) {
        assert_eq!(profile_a.read_length, Some(150));
        assert_eq!(profile_a.depth, Some(30.0));
        assert_eq!(profile_a.motifs.len(), 3);
        assert_eq!(profile_a.motifs["CAG"].irr_pair_count, Some(3));
        assert_eq!(profile_a.motifs["A"].regions_with_irr_anchors, None);
    }

    #[rstest]
    fn test_merge_two_samples(profile_a: SampleProfile, profile_b: SampleProfile) {
        let merged = MultisampleProfile::from_sample_profiles(
            [("S1", &profile_a), ("S2", &profile_b)],
            &MergeParameters::default(),
        )
        .unwrap();

        // motifs outside [2, 20] bp are dropped
        assert_eq!(
            merged.counts.keys().collect::<Vec<_>>(),
            vec!["AAGGG", "CAG"]
        );

        let cag = &merged.counts["CAG"];
        assert_eq!(
            cag.regions_with_irr_anchors.keys().collect::<Vec<_>>(),
            vec!["chr1:100-260", "chr2:10-20", "unaligned"]
        );
        assert_eq!(
            cag.regions_with_irr_anchors["chr1:100-260"],
            FeatureCounts::from([("S1", 4), ("S2", 6)])
        );
        assert_eq!(
            cag.regions_with_irr_anchors["unaligned"],
            FeatureCounts::from([("S1", 2), ("S2", 1)])
        );
        // zero irr pair counts are not recorded
        assert_eq!(cag.irr_pair_counts, FeatureCounts::from([("S1", 3)]));

        assert!(merged.counts["AAGGG"].irr_pair_counts.is_empty());
        assert_eq!(merged.parameters.depths["S2"], 45.5);
        assert_eq!(merged.parameters.read_lengths["S1"], 150);
    }

    #[rstest]
    fn test_stride_does_not_change_result(profile_a: SampleProfile, profile_b: SampleProfile) {
        let samples = [("S1", &profile_a), ("S2", &profile_b), ("S3", &profile_a)];
        let every_sample = MergeParameters {
            normalization_stride: 1,
            ..Default::default()
        };

        let eager = MultisampleProfile::from_sample_profiles(samples, &every_sample).unwrap();
        let lazy =
            MultisampleProfile::from_sample_profiles(samples, &MergeParameters::default()).unwrap();
        assert_eq!(eager, lazy);
        assert_eq!(
            eager.counts["CAG"].regions_with_irr_anchors["chr1:100-260"],
            FeatureCounts::from([("S1", 4), ("S2", 6), ("S3", 4)])
        );
    }

    #[rstest]
    #[case(r#"{"Depth": 30.0}"#)]
    #[case(r#"{"ReadLength": 0, "Depth": 30.0}"#)]
    fn test_missing_read_length(#[case] json: &str) {
        let result = MultisampleProfile::from_sample_profiles(
            [("S1", &sample_profile(json))],
            &MergeParameters::default(),
        );
        assert!(matches!(result, Err(AnalysisError::MissingReadLength(s)) if s == "S1"));
    }

    #[rstest]
    fn test_missing_depth() {
        let result = MultisampleProfile::from_sample_profiles(
            [("S1", &sample_profile(r#"{"ReadLength": 150}"#))],
            &MergeParameters::default(),
        );
        assert!(matches!(result, Err(AnalysisError::MissingDepth(s)) if s == "S1"));
    }

    #[rstest]
    fn test_bad_region_encoding() {
        let profile = sample_profile(
            r#"{"ReadLength": 150, "Depth": 30.0, "CAG": {"RegionsWithIrrAnchors": {"chr1:200-100": 1}}}"#,
        );
        let result =
            MultisampleProfile::from_sample_profiles([("S1", &profile)], &MergeParameters::default());
        assert!(matches!(result, Err(AnalysisError::Region(_))));
    }

    #[rstest]
    fn test_multisample_profile_json_layout(profile_a: SampleProfile) {
        let merged =
            MultisampleProfile::from_sample_profiles([("S1", &profile_a)], &MergeParameters::default())
                .unwrap();
        let json = serde_json::to_value(&merged).unwrap();

        assert_eq!(json["Counts"]["CAG"]["IrrPairCounts"]["S1"], 3);
        assert_eq!(
            json["Counts"]["CAG"]["RegionsWithIrrAnchors"]["chr1:100-200"]["S1"],
            4
        );
        assert_eq!(json["Parameters"]["Depths"]["S1"], 30.0);
        assert_eq!(json["Parameters"]["ReadLengths"]["S1"], 150);

        let decoded: MultisampleProfile = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, merged);
    }
}
