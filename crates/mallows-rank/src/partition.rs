//! Partition functions for the Mallows likelihood.
//!
//! The footrule and Spearman normalizing constants have no closed form and
//! are evaluated by log-sum-exp over a caller-owned cardinality table: one
//! count per achievable distance value, aligned with the grid returned by
//! [`summation_distances`]. Kendall, Cayley and Hamming use their closed
//! forms and never touch the table.

use mallows_core::errors::{ErrorInfo, MallowsError};

use crate::distance::Metric;

/// Numerically stable `ln Σ exp(v)` with max subtraction.
///
/// An empty slice yields negative infinity, and `-inf` entries drop out of
/// the sum, so zero-count grid cells can be fed through as `ln 0`.
pub fn logsumexp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = values.iter().map(|value| (value - max).exp()).sum();
    max + sum.ln()
}

/// Natural logarithm of `n!`.
pub fn ln_factorial(n: usize) -> f64 {
    (2..=n).map(|i| (i as f64).ln()).sum()
}

/// The grid of achievable distance values for the metric.
pub(crate) fn distance_grid(n_items: usize, metric: Metric) -> Vec<f64> {
    let n = n_items as u64;
    match metric {
        // Footrule and Spearman distances between permutations are always
        // even, so the grids step by two up to the reversal distance.
        Metric::Footrule => (0..=n * n / 2).step_by(2).map(|d| d as f64).collect(),
        Metric::Spearman => (0..=(n * n * n - n) / 3)
            .step_by(2)
            .map(|d| d as f64)
            .collect(),
        Metric::Kendall => (0..=n * (n - 1) / 2).map(|d| d as f64).collect(),
        Metric::Cayley => (0..n).map(|d| d as f64).collect(),
        Metric::Hamming => (0..=n).map(|d| d as f64).collect(),
    }
}

/// Returns the achievable-distance grid the cardinality table pairs with.
///
/// Fails when the supplied table does not have one entry per grid value,
/// which catches tables computed for a different item count or metric.
pub fn summation_distances(
    n_items: usize,
    cardinalities: &[f64],
    metric: Metric,
) -> Result<Vec<f64>, MallowsError> {
    let grid = distance_grid(n_items, metric);
    if cardinalities.len() != grid.len() {
        return Err(MallowsError::Config(
            ErrorInfo::new(
                "cardinality-grid-mismatch",
                "cardinality table does not match the distance grid",
            )
            .with_context("metric", metric.name())
            .with_context("n_items", n_items.to_string())
            .with_context("expected", grid.len().to_string())
            .with_context("found", cardinalities.len().to_string()),
        ));
    }
    Ok(grid)
}

/// Exact `ln Z(alpha)` by cardinality-weighted log-sum-exp over the grid.
///
/// At `alpha = 0` this reduces to `ln n!` for every metric.
pub fn log_partition_exact(
    n_items: usize,
    alpha: f64,
    cardinalities: &[f64],
    metric: Metric,
) -> Result<f64, MallowsError> {
    let grid = summation_distances(n_items, cardinalities, metric)?;
    for (index, &count) in cardinalities.iter().enumerate() {
        if !count.is_finite() || count < 0.0 {
            return Err(MallowsError::Config(
                ErrorInfo::new("invalid-cardinality", "cardinality counts must be finite and non-negative")
                    .with_context("index", index.to_string())
                    .with_context("count", count.to_string()),
            ));
        }
    }
    let scale = alpha / n_items as f64;
    let terms: Vec<f64> = grid
        .iter()
        .zip(cardinalities)
        .map(|(&distance, &count)| count.ln() - scale * distance)
        .collect();
    Ok(logsumexp(&terms))
}

/// Closed-form `ln Z(alpha)` for the Kendall distance.
pub fn log_partition_kendall(n_items: usize, alpha: f64) -> f64 {
    // The ratio form degenerates to 0/0 at alpha = 0, where Z(0) = n!.
    if alpha.abs() < 1e-12 {
        return ln_factorial(n_items);
    }
    let theta = alpha / n_items as f64;
    let numerator: f64 = (1..=n_items)
        .map(|i| (1.0 - (-(i as f64) * theta).exp()).ln())
        .sum();
    numerator - n_items as f64 * (1.0 - (-theta).exp()).ln()
}

/// Closed-form `ln Z(alpha)` for the Cayley distance.
pub fn log_partition_cayley(n_items: usize, alpha: f64) -> f64 {
    let theta = alpha / n_items as f64;
    (1..n_items)
        .map(|i| (1.0 + i as f64 * (-theta).exp()).ln())
        .sum()
}

/// Closed-form `ln Z(alpha)` for the Hamming distance.
pub fn log_partition_hamming(n_items: usize, alpha: f64) -> f64 {
    let ln_kernel = (alpha / n_items as f64).exp_m1().ln();
    let terms: Vec<f64> = (0..=n_items)
        .map(|i| {
            // i = 0 keeps the 0^0 = 1 convention out of the log arithmetic
            let spread = if i == 0 { 0.0 } else { i as f64 * ln_kernel };
            ln_factorial(n_items) - alpha + spread - ln_factorial(i)
        })
        .collect();
    logsumexp(&terms)
}

/// `ln Z(alpha)` dispatcher: cardinality summation where no closed form
/// exists, closed forms otherwise (the table is ignored there).
pub fn log_partition_function(
    n_items: usize,
    alpha: f64,
    cardinalities: &[f64],
    metric: Metric,
) -> Result<f64, MallowsError> {
    match metric {
        Metric::Footrule | Metric::Spearman => {
            log_partition_exact(n_items, alpha, cardinalities, metric)
        }
        Metric::Kendall => Ok(log_partition_kendall(n_items, alpha)),
        Metric::Cayley => Ok(log_partition_cayley(n_items, alpha)),
        Metric::Hamming => Ok(log_partition_hamming(n_items, alpha)),
    }
}
