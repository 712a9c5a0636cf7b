//! Latent-ranking augmentation for pairwise preference data.

use rand::Rng;
use rand_distr::{Beta, Distribution};

use mallows_core::errors::{ErrorInfo, MallowsError};
use mallows_core::{ConstraintSet, Ranking, RankingMatrix, RngHandle};
use mallows_rank::Metric;

use crate::config::ErrorModel;
use crate::moves;

/// Upper truncation point of the error-rate posterior.
pub const THETA_TRUNCATION: f64 = 0.5;

/// Rejection attempts before the truncated Beta draw falls back to a clamp.
const MAX_THETA_DRAWS: usize = 1000;

/// Log MH ratio for replacing `current` with `proposal` in cluster `k`.
///
/// The distance term scores both rankings against the cluster consensus;
/// the error-model term charges `violation_diff` net violations at log
/// odds `ln(theta/(1-theta))` and only engages when an error rate is
/// actually in play. Swapping the two rankings and negating the diff
/// negates the ratio.
pub fn augmentation_log_ratio(
    proposal: &Ranking,
    current: &Ranking,
    consensus: &Ranking,
    alpha: f64,
    metric: Metric,
    theta: f64,
    violation_diff: i64,
) -> f64 {
    let n_items = consensus.n_items() as f64;
    let distance_gap = metric.ranking_distance(proposal, consensus) as f64
        - metric.ranking_distance(current, consensus) as f64;
    let mut ratio = -alpha / n_items * distance_gap;
    if theta > 0.0 && violation_diff != 0 {
        ratio += violation_diff as f64 * (theta / (1.0 - theta)).ln();
    }
    ratio
}

/// Model state the augmentation pass scores proposals against.
#[derive(Debug)]
pub struct AugmentationContext<'a> {
    /// Cluster assignment per assessor.
    pub assignments: &'a [usize],
    /// Dispersion per cluster.
    pub alpha: &'a [f64],
    /// Consensus ranking per cluster.
    pub rho: &'a [Ranking],
    /// Current Bernoulli error rate (0 outside that model).
    pub theta: f64,
    /// Distance driving the likelihood.
    pub metric: Metric,
    /// Active error model, which selects the proposal move.
    pub error_model: ErrorModel,
    /// Rank gap used by swap proposals.
    pub swap_leap: usize,
}

/// One augmentation pass: a single proposal per assessor.
///
/// Accepted proposals replace the assessor's latent ranking in place and
/// bump the matching acceptance counter.
pub fn augment_pairwise(
    rankings: &mut RankingMatrix,
    constraints: &[ConstraintSet],
    context: &AugmentationContext<'_>,
    acceptances: &mut [u64],
    rng: &mut RngHandle,
) -> Result<(), MallowsError> {
    for assessor in 0..rankings.n_assessors() {
        let current = rankings.assessor(assessor);
        let (proposal, violation_diff) = match context.error_model {
            ErrorModel::None => {
                let proposal =
                    moves::propose_pairwise_augmentation(current, &constraints[assessor], rng)?;
                (proposal, 0)
            }
            ErrorModel::Bernoulli => {
                let swap = moves::propose_swap(
                    current,
                    &constraints[assessor],
                    context.swap_leap,
                    rng,
                )?;
                (swap.proposal, swap.violation_diff)
            }
        };

        let cluster = context.assignments[assessor];
        let ratio = augmentation_log_ratio(
            &proposal,
            current,
            &context.rho[cluster],
            context.alpha[cluster],
            context.metric,
            context.theta,
            violation_diff,
        );
        if ratio > rng.gen::<f64>().ln() {
            rankings.set_assessor(assessor, proposal)?;
            acceptances[assessor] += 1;
        }
    }
    Ok(())
}

/// Beta posterior shapes for the error rate given the current rankings.
///
/// Recounts every stored comparison from both endpoints, so a single pair
/// contributes twice, exactly as the counters accumulate during ingestion.
pub fn update_shape_bernoulli(
    rankings: &RankingMatrix,
    constraints: &[ConstraintSet],
    kappa_1: f64,
    kappa_2: f64,
) -> (f64, f64) {
    let mut discordant = 0u64;
    let mut concordant = 0u64;
    for (assessor, ranking) in rankings.assessors().iter().enumerate() {
        let (broke, held) = constraints[assessor].comparison_tally(ranking);
        discordant += broke as u64;
        concordant += held as u64;
    }
    (kappa_1 + discordant as f64, kappa_2 + concordant as f64)
}

/// Draws the error rate from Beta(shape_1, shape_2) truncated to
/// `(0, 0.5)`.
///
/// Rejection sampling with a bounded number of attempts; when the mass
/// sits almost entirely above the truncation point the draw clamps just
/// below it instead of exceeding it.
pub fn sample_truncated_theta(
    shape_1: f64,
    shape_2: f64,
    rng: &mut RngHandle,
) -> Result<f64, MallowsError> {
    let beta = Beta::new(shape_1, shape_2).map_err(|err| {
        MallowsError::Rng(
            ErrorInfo::new("beta-construction", err.to_string())
                .with_context("shape_1", shape_1.to_string())
                .with_context("shape_2", shape_2.to_string()),
        )
    })?;
    for _ in 0..MAX_THETA_DRAWS {
        let draw = beta.sample(rng);
        if draw < THETA_TRUNCATION {
            return Ok(draw);
        }
    }
    Ok(THETA_TRUNCATION - f64::EPSILON)
}
