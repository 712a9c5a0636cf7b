//! Collapsed cluster reassignment.

use rand::Rng;

use mallows_core::{MallowsError, Ranking, RankingMatrix, RngHandle};
use mallows_rank::{log_partition_function, logsumexp, Metric};

/// Resamples every assessor's cluster label in place.
///
/// Each label is drawn from the collapsed categorical with
/// `log w_k = ln(n_{-i,k} + lambda) - alpha_k/n * d(R_i, rho_k) - ln Z(alpha_k)`,
/// where `n_{-i,k}` counts the other assessors currently in cluster `k`
/// and `lambda` acts as the concentration. Weights are normalized by
/// log-sum-exp before the draw.
pub fn update_cluster_assignments(
    assignments: &mut [usize],
    rankings: &RankingMatrix,
    rho: &[Ranking],
    alpha: &[f64],
    lambda: f64,
    cardinalities: &[f64],
    metric: Metric,
    rng: &mut RngHandle,
) -> Result<(), MallowsError> {
    let n_items = rankings.n_items();
    let n_clusters = rho.len();

    let mut log_z = Vec::with_capacity(n_clusters);
    for &alpha_k in alpha {
        log_z.push(log_partition_function(
            n_items,
            alpha_k,
            cardinalities,
            metric,
        )?);
    }

    let mut counts = vec![0usize; n_clusters];
    for &label in assignments.iter() {
        counts[label] += 1;
    }

    let mut weights = vec![0.0f64; n_clusters];
    for assessor in 0..rankings.n_assessors() {
        counts[assignments[assessor]] -= 1;
        let ranking = rankings.assessor(assessor);
        for cluster in 0..n_clusters {
            let distance = metric.ranking_distance(ranking, &rho[cluster]) as f64;
            weights[cluster] = (counts[cluster] as f64 + lambda).ln()
                - alpha[cluster] / n_items as f64 * distance
                - log_z[cluster];
        }

        let normalizer = logsumexp(&weights);
        let draw: f64 = rng.gen();
        let mut cumulative = 0.0;
        let mut chosen = n_clusters - 1;
        for (cluster, &weight) in weights.iter().enumerate() {
            cumulative += (weight - normalizer).exp();
            if draw < cumulative {
                chosen = cluster;
                break;
            }
        }

        assignments[assessor] = chosen;
        counts[chosen] += 1;
    }
    Ok(())
}
