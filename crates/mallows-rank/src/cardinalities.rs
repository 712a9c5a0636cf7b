//! Brute-force distance cardinalities for small item counts.

use mallows_core::errors::{ErrorInfo, MallowsError};

use crate::distance::Metric;
use crate::partition::distance_grid;

/// Largest item count the exhaustive enumeration accepts. `10!` rank
/// vectors is the point where the table is still built in seconds.
pub const MAX_EXACT_ITEMS: usize = 10;

/// Counts permutations of `1..=n` at each achievable distance from the
/// identity, aligned with the grid from
/// [`summation_distances`](crate::partition::summation_distances).
///
/// The table depends only on `(n_items, metric)` thanks to right
/// invariance, so callers compute it once and reuse it across the run. For
/// larger item counts a precomputed table or the importance sampling
/// estimator must be used instead.
pub fn distance_cardinalities(n_items: usize, metric: Metric) -> Result<Vec<f64>, MallowsError> {
    if n_items == 0 {
        return Err(MallowsError::Config(ErrorInfo::new(
            "empty-item-set",
            "cardinalities require at least one item",
        )));
    }
    if n_items > MAX_EXACT_ITEMS {
        return Err(MallowsError::Config(
            ErrorInfo::new(
                "enumeration-too-large",
                "exhaustive cardinality enumeration is limited to small item counts",
            )
            .with_context("n_items", n_items.to_string())
            .with_context("limit", MAX_EXACT_ITEMS.to_string())
            .with_hint("supply a precomputed cardinality table or estimate the partition function"),
        ));
    }

    let identity: Vec<usize> = (1..=n_items).collect();
    let step: u64 = match metric {
        Metric::Footrule | Metric::Spearman => 2,
        _ => 1,
    };
    let mut counts = vec![0.0f64; distance_grid(n_items, metric).len()];
    let mut tally = |perm: &[usize]| {
        counts[(metric.distance(perm, &identity) / step) as usize] += 1.0;
    };

    // Heap's algorithm walks all n! rank vectors with one swap per step.
    let mut perm = identity.clone();
    tally(&perm);
    let mut stack = vec![0usize; n_items];
    let mut level = 0;
    while level < n_items {
        if stack[level] < level {
            if level % 2 == 0 {
                perm.swap(0, level);
            } else {
                perm.swap(stack[level], level);
            }
            tally(&perm);
            stack[level] += 1;
            level = 0;
        } else {
            stack[level] = 0;
            level += 1;
        }
    }
    Ok(counts)
}
