use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::ops::Index;

use crate::errors::RegionError;
use crate::models::{distance, FeatureCounts, Region};

/// Default maximum gap (in bp) across which neighbouring regions are merged.
pub const DEFAULT_MAX_MERGE_DISTANCE: u32 = 500;

///
/// RegionCollection struct, an ordered list of regions that can be merged by proximity.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionCollection {
    pub regions: Vec<Region>,
}

impl RegionCollection {
    pub fn new() -> Self {
        RegionCollection {
            regions: Vec::new(),
        }
    }

    ///
    /// Create a collection from a single sample's `{region encoding: count}` record.
    ///
    /// Every region carries a count map with just this sample in it.
    ///
    pub fn from_sample_record<'a, I>(sample_id: &str, record: I) -> Result<Self, RegionError>
    where
        I: IntoIterator<Item = (&'a String, &'a u32)>,
    {
        let regions = record
            .into_iter()
            .map(|(encoding, count)| {
                let mut region: Region = encoding.parse()?;
                region.feature_counts = Some(FeatureCounts::from([(sample_id, *count)]));
                Ok(region)
            })
            .collect::<Result<Vec<Region>, RegionError>>()?;

        Ok(RegionCollection { regions })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn push(&mut self, region: Region) {
        self.regions.push(region);
    }

    pub fn extend(&mut self, other: RegionCollection) {
        self.regions.extend(other.regions);
    }

    ///
    /// Sort regions in place by chromosome, start and end.
    ///
    pub fn sort(&mut self) {
        self.regions.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }

    ///
    /// Merge regions that lie within `max_dist` of each other on the same chromosome.
    ///
    /// Regions are sorted by (chromosome, start, end) and swept left to right. A merged
    /// region spans from the first start to the furthest end of its members, and its
    /// counts are the additive union of theirs. The input is left untouched and the
    /// returned regions are fresh copies, sorted the same way.
    ///
    /// Regions on different chromosomes are never merged. Unset regions cause
    /// [RegionError::UnsetRegion].
    ///
    pub fn merge(&self, max_dist: u32) -> Result<RegionCollection, RegionError> {
        let mut sorted: Vec<&Region> = self.regions.iter().collect();
        sorted.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut merged: Vec<Region> = Vec::new();
        let mut aggregate: Option<Region> = None;

        for region in sorted {
            match aggregate.as_mut() {
                Some(current) if distance(&*current, region)?.is_within(max_dist) => {
                    current.end = current.end.max(region.end);
                    if let Some(counts) = &region.feature_counts {
                        current
                            .feature_counts
                            .get_or_insert_with(FeatureCounts::new)
                            .combine(counts);
                    }
                }
                _ => {
                    if let Some(done) = aggregate.replace(region.clone()) {
                        merged.push(done);
                    }
                }
            }
        }

        if let Some(last) = aggregate {
            if last.is_unset() {
                return Err(RegionError::UnsetRegion);
            }
            merged.push(last);
        }

        Ok(RegionCollection { regions: merged })
    }

    ///
    /// Map each region encoding (`chr:start-end`) to the region's counts.
    ///
    pub fn as_map(&self) -> BTreeMap<String, FeatureCounts> {
        self.regions
            .iter()
            .map(|r| (r.encoding(), r.feature_counts.clone().unwrap_or_default()))
            .collect()
    }
}

impl From<Vec<Region>> for RegionCollection {
    fn from(regions: Vec<Region>) -> Self {
        RegionCollection { regions }
    }
}

impl Index<usize> for RegionCollection {
    type Output = Region;

    fn index(&self, index: usize) -> &Region {
        &self.regions[index]
    }
}

impl<'a> IntoIterator for &'a RegionCollection {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl IntoIterator for RegionCollection {
    type Item = Region;
    type IntoIter = std::vec::IntoIter<Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.into_iter()
    }
}

impl Display for RegionCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoding = self
            .regions
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        write!(f, "{}", encoding)
    }
}
