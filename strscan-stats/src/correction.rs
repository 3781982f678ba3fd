///
/// Bonferroni-adjust a single p-value for `num_tests` tests, capped at 1.
///
pub fn bonferroni(pvalue: f64, num_tests: usize) -> f64 {
    (pvalue * num_tests as f64).min(1.0)
}

///
/// Bonferroni-adjust every p-value in `pvalues`, using their count as the number of tests.
///
/// Must be called on the final set of tested rows, after all filtering.
///
pub fn correct_pvalues(pvalues: &[f64]) -> Vec<f64> {
    let num_tests = pvalues.len();
    pvalues.iter().map(|&p| bonferroni(p, num_tests)).collect()
}
