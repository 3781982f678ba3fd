use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::RegionError;
use crate::models::FeatureCounts;

///
/// Region struct, a genomic interval with optional per-sample counts attached.
///
/// A region whose chromosome is `None` is unset. Unset regions are only ever used as a
/// placeholder and can not be compared with [distance].
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Region {
    pub chr: Option<String>,
    pub start: u32,
    pub end: u32,

    pub feature_counts: Option<FeatureCounts>,
}

impl Region {
    pub fn new<S: Into<String>>(chr: S, start: u32, end: u32) -> Self {
        Region {
            chr: Some(chr.into()),
            start,
            end,
            feature_counts: None,
        }
    }

    pub fn with_counts<S: Into<String>>(
        chr: S,
        start: u32,
        end: u32,
        feature_counts: FeatureCounts,
    ) -> Self {
        Region {
            chr: Some(chr.into()),
            start,
            end,
            feature_counts: Some(feature_counts),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.chr.is_none()
    }

    ///
    /// Key used to order regions: chromosome name, then start, then end.
    ///
    pub fn sort_key(&self) -> (Option<&str>, u32, u32) {
        (self.chr.as_deref(), self.start, self.end)
    }

    ///
    /// Encode the coordinates as `chr:start-end`, without counts.
    ///
    pub fn encoding(&self) -> String {
        format!(
            "{}:{}-{}",
            self.chr.as_deref().unwrap_or("*"),
            self.start,
            self.end
        )
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encoding())?;
        match &self.feature_counts {
            Some(counts) if !counts.is_empty() => write!(f, "({})", counts),
            _ => Ok(()),
        }
    }
}

impl FromStr for Region {
    type Err = RegionError;

    ///
    /// Decode a `chr:start-end` region encoding.
    ///
    /// The contig is split off at the last colon, so contig names that contain colons
    /// (e.g. HLA alt contigs) are kept intact.
    ///
    fn from_str(encoding: &str) -> Result<Self, Self::Err> {
        let parse_error = || RegionError::RegionParseError(encoding.to_string());

        let (chr, coords) = encoding.rsplit_once(':').ok_or_else(parse_error)?;
        let (start, end) = coords.split_once('-').ok_or_else(parse_error)?;

        let start: u32 = start.trim().parse().map_err(|_| parse_error())?;
        let end: u32 = end.trim().parse().map_err(|_| parse_error())?;

        if chr.is_empty() || start > end {
            return Err(parse_error());
        }

        Ok(Region::new(chr, start, end))
    }
}

///
/// Distance between two regions.
///
/// Regions on different chromosomes are [Distance::Incomparable], which orders above
/// every finite distance so it never passes a merge threshold.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distance {
    Finite(u32),
    Incomparable,
}

impl Distance {
    pub fn is_within(self, max_dist: u32) -> bool {
        matches!(self, Distance::Finite(d) if d <= max_dist)
    }
}

///
/// Compute the gap between two regions.
///
/// Overlapping or touching intervals on the same chromosome are at distance 0. Otherwise
/// the distance is the gap between the nearest endpoints.
///
pub fn distance(region_a: &Region, region_b: &Region) -> Result<Distance, RegionError> {
    let (chr_a, chr_b) = match (&region_a.chr, &region_b.chr) {
        (Some(chr_a), Some(chr_b)) => (chr_a, chr_b),
        _ => return Err(RegionError::UnsetRegion),
    };

    if chr_a != chr_b {
        return Ok(Distance::Incomparable);
    }

    let gap = if region_a.end < region_b.start {
        region_b.start - region_a.end
    } else if region_b.end < region_a.start {
        region_a.start - region_b.end
    } else {
        0
    };

    Ok(Distance::Finite(gap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_unset_by_default() {
        assert!(Region::default().is_unset());
        assert!(!Region::new("chr1", 1, 2).is_unset());
    }

    #[rstest]
    fn test_representation() {
        assert_eq!(Region::new("chr1", 10, 20).to_string(), "chr1:10-20");

        let counts = FeatureCounts::from([("Sample1", 5), ("Sample2", 10)]);
        let region = Region::with_counts("chr1", 10, 20, counts);
        assert_eq!(region.to_string(), "chr1:10-20(Sample1=5,Sample2=10)");
    }

    #[rstest]
    fn test_ordering_key() {
        let key = |r: Region| (r.chr, r.start, r.end);
        assert!(key(Region::new("chr1", 10, 20)) < key(Region::new("chr2", 10, 20)));
        assert!(Region::new("chr1", 10, 20).sort_key() < Region::new("chr1", 15, 20).sort_key());
        assert!(Region::new("chr1", 10, 15).sort_key() < Region::new("chr1", 10, 20).sort_key());
    }

    #[rstest]
    fn test_equality() {
        assert_eq!(Region::new("chr1", 10, 20), Region::new("chr1", 10, 20));
        assert_eq!(
            Region::with_counts("chr1", 10, 20, FeatureCounts::from([("S1", 1)])),
            Region::with_counts("chr1", 10, 20, FeatureCounts::from([("S1", 1)]))
        );
        assert_ne!(
            Region::with_counts("chr1", 10, 20, FeatureCounts::from([("S1", 1)])),
            Region::with_counts("chr1", 10, 20, FeatureCounts::from([("S1", 2)]))
        );
    }

    #[rstest]
    #[case("10:100-104", Region::new("10", 100, 104))]
    #[case("chr1:0-10", Region::new("chr1", 0, 10))]
    #[case("HLA-A*01:01:01:01:5-30", Region::new("HLA-A*01:01:01:01", 5, 30))]
    fn test_parse_region(#[case] encoding: &str, #[case] expected: Region) {
        let region: Region = encoding.parse().unwrap();
        assert_eq!(region, expected);
        assert_eq!(region.encoding(), encoding);
    }

    #[rstest]
    #[case("unaligned")]
    #[case("chr1:10")]
    #[case("chr1:a-10")]
    #[case("chr1:20-10")]
    #[case(":1-2")]
    fn test_parse_invalid_region(#[case] encoding: &str) {
        assert_eq!(
            encoding.parse::<Region>(),
            Err(RegionError::RegionParseError(encoding.to_string()))
        );
    }

    #[rstest]
    fn test_overlapping_regions() {
        let region_a = Region::new("chr1", 1, 10);
        let region_b = Region::new("chr1", 5, 15);
        assert_eq!(distance(&region_a, &region_b), Ok(Distance::Finite(0)));
    }

    #[rstest]
    fn test_touching_and_contained_regions() {
        let region_a = Region::new("chr1", 1, 10);
        assert_eq!(
            distance(&region_a, &Region::new("chr1", 10, 15)),
            Ok(Distance::Finite(0))
        );
        assert_eq!(
            distance(&Region::new("chr1", 0, 100), &Region::new("chr1", 40, 50)),
            Ok(Distance::Finite(0))
        );
        assert_eq!(
            distance(&region_a, &Region::new("chr1", 11, 15)),
            Ok(Distance::Finite(1))
        );
    }

    #[rstest]
    fn test_disjoint_regions() {
        let region_a = Region::new("chr1", 50, 70);
        let region_b = Region::new("chr1", 0, 20);
        assert_eq!(distance(&region_a, &region_b), Ok(Distance::Finite(30)));
        assert_eq!(distance(&region_b, &region_a), Ok(Distance::Finite(30)));
    }

    #[rstest]
    fn test_regions_on_different_chroms() {
        let region_a = Region::new("chr1", 10, 20);
        let region_b = Region::new("chr2", 10, 20);
        assert_eq!(distance(&region_a, &region_b), Ok(Distance::Incomparable));
        assert!(!Distance::Incomparable.is_within(u32::MAX));
        assert!(Distance::Incomparable > Distance::Finite(u32::MAX));
    }

    #[rstest]
    fn test_unset_region_is_an_error() {
        let region_a = Region::new("chr1", 10, 20);
        let region_b = Region::default();
        let err = distance(&region_a, &region_b).unwrap_err();
        assert_eq!(err, RegionError::UnsetRegion);
        assert_eq!(
            err.to_string(),
            "Cannot compute distance between unset regions"
        );
        assert_eq!(distance(&region_b, &region_a), Err(RegionError::UnsetRegion));
    }

    #[rstest]
    fn test_distance_is_symmetric() {
        let regions = vec![
            Region::new("chr1", 0, 10),
            Region::new("chr1", 5, 7),
            Region::new("chr1", 10, 30),
            Region::new("chr1", 400, 900),
            Region::new("chr2", 0, 10),
            Region::new("chrX", 1000, 1000),
        ];
        for a in &regions {
            for b in &regions {
                let ab = distance(a, b).unwrap();
                assert_eq!(ab, distance(b, a).unwrap());

                let touches = a.chr == b.chr && a.start <= b.end && b.start <= a.end;
                assert_eq!(ab == Distance::Finite(0), touches);
            }
        }
    }
}
