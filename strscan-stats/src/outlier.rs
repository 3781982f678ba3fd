//! Background outlier scoring.
//!
//! The cohort's counts at a locus are bootstrapped to estimate how high the upper tail
//! of the background distribution normally reaches. Case samples sitting well above that
//! tail are reported as outliers.

use rand::Rng;
use statrs::statistics::Statistics;

use crate::errors::StatsError;

///
/// Linear-interpolation quantile of `values`.
///
/// The quantile sits at position `q * (n - 1)` of the sorted values; fractional positions
/// interpolate between the two neighbouring order statistics. Returns `None` for empty input.
///
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// Result of scoring the case samples at one locus or motif.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierScore {
    /// Mean of the resampled background quantiles
    pub mu: f64,
    /// Spread of the resampled background quantiles, never below the scorer's floor
    pub sigma: f64,
    /// Highest z-score among flagged cases, or -1 when none were flagged
    pub top_zscore: f64,
    /// Flagged cases and their counts, in input order
    pub cases_with_high_counts: Vec<(String, f64)>,
}

impl OutlierScore {
    pub fn has_outliers(&self) -> bool {
        !self.cases_with_high_counts.is_empty()
    }
}

///
/// Resampling-based background z-score scorer.
///
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierScorer {
    pub num_resamples: usize,
    pub quantile: f64,
    pub min_sigma: f64,
    pub zscore_cutoff: f64,
}

impl Default for OutlierScorer {
    fn default() -> Self {
        Self {
            num_resamples: 100,
            quantile: 0.95,
            min_sigma: 1.0,
            zscore_cutoff: 1.0,
        }
    }
}

impl OutlierScorer {
    ///
    /// Draw `num_resamples` bootstrap resamples of `counts` (same size, with replacement)
    /// and return the target quantile of each one.
    ///
    pub fn resample_quantiles<R: Rng>(
        &self,
        counts: &[f64],
        rng: &mut R,
    ) -> Result<Vec<f64>, StatsError> {
        if counts.is_empty() {
            return Err(StatsError::EmptyBackground);
        }

        let mut resample = vec![0.0; counts.len()];
        let mut quantiles = Vec::with_capacity(self.num_resamples);
        for _ in 0..self.num_resamples {
            for value in resample.iter_mut() {
                *value = counts[rng.random_range(0..counts.len())];
            }
            // resample is non-empty, so a quantile always exists
            quantiles.extend(quantile(&resample, self.quantile));
        }

        Ok(quantiles)
    }

    ///
    /// Fit a normal distribution (maximum likelihood) to the resampled quantiles of the
    /// background. Returns `(mu, sigma)` with sigma clamped to `min_sigma`.
    ///
    pub fn fit_background<R: Rng>(
        &self,
        background: &[f64],
        rng: &mut R,
    ) -> Result<(f64, f64), StatsError> {
        let quantiles = self.resample_quantiles(background, rng)?;
        if quantiles.is_empty() {
            return Err(StatsError::EmptyBackground);
        }

        let mu = quantiles.iter().mean();
        let sigma = quantiles.iter().population_std_dev();

        Ok((mu, sigma.max(self.min_sigma)))
    }

    ///
    /// Score case samples against the whole cohort.
    ///
    /// # Arguments
    /// - background: counts of every sample in the cohort, cases included
    /// - cases: (sample, count) pairs to report on
    /// - rng: random source for the bootstrap
    ///
    pub fn score<S, R>(
        &self,
        background: &[f64],
        cases: &[(S, f64)],
        rng: &mut R,
    ) -> Result<OutlierScore, StatsError>
    where
        S: AsRef<str>,
        R: Rng,
    {
        if cases.is_empty() {
            return Err(StatsError::NoCaseSamples);
        }

        let (mu, sigma) = self.fit_background(background, rng)?;

        let mut top_zscore = -1.0f64;
        let mut cases_with_high_counts = Vec::new();
        for (sample, count) in cases {
            let zscore = (count - mu) / sigma;
            if zscore > self.zscore_cutoff {
                cases_with_high_counts.push((sample.as_ref().to_string(), *count));
                top_zscore = top_zscore.max(zscore);
            }
        }

        Ok(OutlierScore {
            mu,
            sigma,
            top_zscore,
            cases_with_high_counts,
        })
    }
}
