//! Wilcoxon rank-sum testing of case counts against control counts.
//!
//! All methods are one-sided: they test whether cases tend to have *higher* counts than
//! controls. Randomized methods draw from an explicitly passed [rand::Rng] so that a
//! seeded generator yields reproducible p-values.

use std::fmt::{self, Display};
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::errors::StatsError;

///
/// Method used to turn a case rank-sum into a p-value.
///
/// Decoded once from its string tag (`normal`, `permute_<n>` or `shuffle_<n>`).
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum TestMethod {
    /// Normal approximation to the rank-sum distribution.
    #[default]
    Normal,

    /// Resample case rank-sums by drawing case ranks *with replacement* from the pooled
    /// ranks.
    ///
    /// This is not a label permutation: the null distribution it builds is wider than
    /// the exact one, so p-values come out larger than [TestMethod::Shuffle] on the same
    /// data. Kept for compatibility with existing reports.
    Resample { iterations: usize },

    /// Classical permutation test: shuffle the pooled ranks (without replacement) and
    /// take the first `n_cases` as the case ranks.
    Shuffle { iterations: usize },
}

impl TestMethod {
    ///
    /// One-sided p-value that `cases` exceed `controls`.
    ///
    pub fn pvalue<R: Rng>(
        &self,
        cases: &[f64],
        controls: &[f64],
        rng: &mut R,
    ) -> Result<f64, StatsError> {
        match *self {
            TestMethod::Normal => approximate_pvalue(cases, controls),
            TestMethod::Resample { iterations } => {
                resampled_pvalue(cases, controls, iterations, rng)
            }
            TestMethod::Shuffle { iterations } => {
                permutation_pvalue(cases, controls, iterations, rng)
            }
        }
    }
}

fn parse_iterations(tag: &str, raw: &str) -> Result<usize, StatsError> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(StatsError::InvalidIterationCount(tag.to_string())),
    }
}

impl FromStr for TestMethod {
    type Err = StatsError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        if tag == "normal" {
            Ok(TestMethod::Normal)
        } else if let Some(raw) = tag.strip_prefix("permute_") {
            Ok(TestMethod::Resample {
                iterations: parse_iterations(tag, raw)?,
            })
        } else if let Some(raw) = tag.strip_prefix("shuffle_") {
            Ok(TestMethod::Shuffle {
                iterations: parse_iterations(tag, raw)?,
            })
        } else {
            Err(StatsError::UnknownTestMethod(tag.to_string()))
        }
    }
}

impl TryFrom<String> for TestMethod {
    type Error = StatsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TestMethod> for String {
    fn from(method: TestMethod) -> Self {
        method.to_string()
    }
}

impl Display for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestMethod::Normal => write!(f, "normal"),
            TestMethod::Resample { iterations } => write!(f, "permute_{}", iterations),
            TestMethod::Shuffle { iterations } => write!(f, "shuffle_{}", iterations),
        }
    }
}

///
/// Rank values in ascending order, giving tied values the mean of the ranks they span.
///
/// Ranks start at 1.
///
pub fn rank_with_ties(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }

        let mid_rank = (i + j) as f64 / 2.0 + 1.0;
        for &index in &order[i..=j] {
            ranks[index] = mid_rank;
        }
        i = j + 1;
    }

    ranks
}

///
/// Ranks of the pooled values (cases first) and the sum of the case ranks.
///
fn pooled_ranks(cases: &[f64], controls: &[f64]) -> Result<(Vec<f64>, f64), StatsError> {
    if cases.is_empty() || controls.is_empty() {
        return Err(StatsError::EmptyGroup {
            cases: cases.len(),
            controls: controls.len(),
        });
    }

    let pooled: Vec<f64> = cases.iter().chain(controls.iter()).copied().collect();
    let ranks = rank_with_ties(&pooled);
    let case_rank_sum = ranks[..cases.len()].iter().sum();

    Ok((ranks, case_rank_sum))
}

///
/// Normal-approximation p-value `1 - Φ(z)` of the case rank-sum.
///
pub fn approximate_pvalue(cases: &[f64], controls: &[f64]) -> Result<f64, StatsError> {
    let (_, case_rank_sum) = pooled_ranks(cases, controls)?;

    let n_cases = cases.len() as f64;
    let n_controls = controls.len() as f64;
    let n_total = n_cases + n_controls;

    let mu = n_cases * (n_total + 1.0) / 2.0;
    let sigma = (n_cases * n_controls * (n_total + 1.0) / 12.0).sqrt();
    let z = (case_rank_sum - mu) / sigma;

    Ok(1.0 - Normal::standard().cdf(z))
}

///
/// Resampling p-value where each iteration draws `n_cases` ranks with replacement.
///
/// Returns `(hits + 1) / (iterations + 1)`, so the p-value is never zero.
///
pub fn resampled_pvalue<R: Rng>(
    cases: &[f64],
    controls: &[f64],
    iterations: usize,
    rng: &mut R,
) -> Result<f64, StatsError> {
    let (ranks, true_rank_sum) = pooled_ranks(cases, controls)?;

    let hits = (0..iterations)
        .filter(|_| {
            let resampled_sum: f64 = (0..cases.len())
                .map(|_| ranks[rng.random_range(0..ranks.len())])
                .sum();
            resampled_sum >= true_rank_sum
        })
        .count();

    Ok((hits + 1) as f64 / (iterations + 1) as f64)
}

///
/// Label-permutation p-value: each iteration shuffles the pooled ranks and sums the
/// first `n_cases` of them.
///
pub fn permutation_pvalue<R: Rng>(
    cases: &[f64],
    controls: &[f64],
    iterations: usize,
    rng: &mut R,
) -> Result<f64, StatsError> {
    let (mut ranks, true_rank_sum) = pooled_ranks(cases, controls)?;

    let mut hits = 0;
    for _ in 0..iterations {
        ranks.shuffle(rng);
        let permuted_sum: f64 = ranks[..cases.len()].iter().sum();
        if permuted_sum >= true_rank_sum {
            hits += 1;
        }
    }

    Ok((hits + 1) as f64 / (iterations + 1) as f64)
}
