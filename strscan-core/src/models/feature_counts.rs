use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::ops::Index;

use num_traits::Num;

///
/// Per-sample evidence counts attached to a region, motif or table row.
///
/// Counts start out as integers (`u32`) when they are read from a profile and become
/// floating point (`f64`) after depth normalization. Samples are kept sorted by
/// identifier so iteration order is stable from run to run.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct FeatureCounts<T = u32> {
    counts: BTreeMap<String, T>,
}

impl<T> FeatureCounts<T> {
    pub fn new() -> Self {
        FeatureCounts {
            counts: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn contains(&self, sample: &str) -> bool {
        self.counts.contains_key(sample)
    }

    pub fn insert<S: Into<String>>(&mut self, sample: S, count: T) -> Option<T> {
        self.counts.insert(sample.into(), count)
    }

    pub fn samples(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, T> {
        self.counts.iter()
    }
}

impl<T: Copy> FeatureCounts<T> {
    pub fn get(&self, sample: &str) -> Option<T> {
        self.counts.get(sample).copied()
    }

    pub fn values(&self) -> impl Iterator<Item = T> + '_ {
        self.counts.values().copied()
    }

    ///
    /// Build a new count map by applying a fallible conversion to every (sample, count) pair.
    ///
    /// Used to move from raw integer counts to normalized floating point counts.
    ///
    pub fn try_map<U, E, F>(&self, mut f: F) -> Result<FeatureCounts<U>, E>
    where
        F: FnMut(&str, T) -> Result<U, E>,
    {
        let counts = self
            .counts
            .iter()
            .map(|(sample, count)| Ok((sample.clone(), f(sample, *count)?)))
            .collect::<Result<BTreeMap<String, U>, E>>()?;
        Ok(FeatureCounts { counts })
    }
}

impl<T: Num + Copy> FeatureCounts<T> {
    ///
    /// Additive union-merge of `other` into `self`.
    ///
    /// Samples present on only one side keep their count; samples present on both sides
    /// end up with the sum.
    ///
    pub fn combine(&mut self, other: &FeatureCounts<T>) {
        for (sample, count) in &other.counts {
            self.counts
                .entry(sample.clone())
                .and_modify(|c| *c = *c + *count)
                .or_insert(*count);
        }
    }

    /// Count for `sample`, treating absent samples as zero.
    pub fn get_or_zero(&self, sample: &str) -> T {
        self.counts.get(sample).copied().unwrap_or_else(T::zero)
    }
}

impl<T> Index<&str> for FeatureCounts<T> {
    type Output = T;

    fn index(&self, sample: &str) -> &T {
        &self.counts[sample]
    }
}

impl<T> From<BTreeMap<String, T>> for FeatureCounts<T> {
    fn from(counts: BTreeMap<String, T>) -> Self {
        FeatureCounts { counts }
    }
}

impl<S: Into<String>, T, const N: usize> From<[(S, T); N]> for FeatureCounts<T> {
    fn from(pairs: [(S, T); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<S: Into<String>, T> FromIterator<(S, T)> for FeatureCounts<T> {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        FeatureCounts {
            counts: iter.into_iter().map(|(s, c)| (s.into(), c)).collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a FeatureCounts<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = btree_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

impl<T> IntoIterator for FeatureCounts<T> {
    type Item = (String, T);
    type IntoIter = btree_map::IntoIter<String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

impl<T: Display> Display for FeatureCounts<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoding = self
            .counts
            .iter()
            .map(|(sample, count)| format!("{}={}", sample, count))
            .collect::<Vec<String>>()
            .join(",");
        write!(f, "{}", encoding)
    }
}
