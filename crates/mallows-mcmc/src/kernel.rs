//! The Metropolis-within-Gibbs sweep loop.
//!
//! One sweep updates, in order: the dispersion of every cluster (at the
//! `alpha_jump` cadence), the consensus of every cluster, the cluster
//! labels, and finally the latent rankings of constrained assessors.
//! Samples are recorded at their respective cadences and nothing but the
//! returned [`Trace`] survives the run.

use chrono::Utc;
use rand::Rng;
use rand_distr::StandardNormal;

use mallows_core::errors::{ErrorInfo, MallowsError};
use mallows_core::{ConstraintSet, Ranking, RankingMatrix, RngHandle};
use mallows_rank::{log_partition_function, summation_distances, Metric};

use crate::augment::{self, AugmentationContext};
use crate::clusters;
use crate::config::{ErrorModel, RunConfig};
use crate::determinism;
use crate::moves;
use crate::trace::{RunInfo, Trace, TraceRecorder};

/// Mutable chain state carried across sweeps.
#[derive(Debug)]
struct ChainState {
    alpha: Vec<f64>,
    rho: Vec<Ranking>,
    assignments: Vec<usize>,
    theta: f64,
    rankings: RankingMatrix,
    alpha_accepted: Vec<u64>,
    alpha_proposed: Vec<u64>,
    rho_accepted: Vec<u64>,
    augmentation_accepted: Vec<u64>,
}

impl ChainState {
    fn new(data: &RankingMatrix, config: &RunConfig) -> Self {
        let n_items = data.n_items();
        let n_assessors = data.n_assessors();
        let n_clusters = config.n_clusters;
        Self {
            alpha: vec![config.alpha_init; n_clusters],
            rho: vec![Ranking::identity(n_items); n_clusters],
            assignments: (0..n_assessors).map(|index| index % n_clusters).collect(),
            theta: 0.0,
            rankings: data.clone(),
            alpha_accepted: vec![0; n_clusters],
            alpha_proposed: vec![0; n_clusters],
            rho_accepted: vec![0; n_clusters],
            augmentation_accepted: vec![0; n_assessors],
        }
    }
}

/// Runs one chain and returns its posterior trace.
///
/// `data` supplies the initial latent rankings; with pairwise data the
/// caller seeds it with consistent completions of the constraints. The
/// cardinality table is only consulted for metrics without a closed-form
/// partition function.
pub fn run_mcmc(
    data: &RankingMatrix,
    constraints: &[ConstraintSet],
    cardinalities: &[f64],
    config: &RunConfig,
    seed: u64,
) -> Result<Trace, MallowsError> {
    validate_inputs(data, constraints, cardinalities, config)?;

    let mut rng = RngHandle::from_seed(seed);
    let mut state = ChainState::new(data, config);
    let mut recorder = TraceRecorder::new();

    for sweep in 1..=config.nmc {
        if sweep % config.alpha_jump == 0 {
            perform_alpha_update(&mut state, config, cardinalities, &mut rng)?;
            for cluster in 0..config.n_clusters {
                recorder.push_alpha(sweep, cluster, state.alpha[cluster]);
            }
        }

        perform_rho_update(&mut state, config, &mut rng)?;

        if config.n_clusters > 1 {
            clusters::update_cluster_assignments(
                &mut state.assignments,
                &state.rankings,
                &state.rho,
                &state.alpha,
                config.lambda,
                cardinalities,
                config.metric,
                &mut rng,
            )?;
        }

        if !constraints.is_empty() {
            perform_augmentation(&mut state, constraints, config, &mut rng)?;
        }

        if sweep % config.thinning == 0 {
            for cluster in 0..config.n_clusters {
                let distance = cluster_distance_sum(
                    &state.rankings,
                    &state.assignments,
                    cluster,
                    &state.rho[cluster],
                    config.metric,
                );
                recorder.push_rho(sweep, cluster, state.alpha[cluster], distance, &state.rho[cluster]);
            }
            recorder.push_assignments(sweep, &state.assignments);
            if config.error_model == ErrorModel::Bernoulli {
                recorder.push_theta(sweep, state.theta);
            }
            if config.save_augmented && !constraints.is_empty() {
                recorder.push_augmented(sweep, state.rankings.assessors());
            }
        }
    }

    let sweeps = config.nmc as f64;
    let alpha_acceptance = acceptance_rates(&state.alpha_accepted, &state.alpha_proposed);
    let rho_acceptance: Vec<f64> = state
        .rho_accepted
        .iter()
        .map(|&hits| hits as f64 / sweeps)
        .collect();
    let augmentation_acceptance: Vec<f64> = if constraints.is_empty() {
        Vec::new()
    } else {
        state
            .augmentation_accepted
            .iter()
            .map(|&hits| hits as f64 / sweeps)
            .collect()
    };

    let info = RunInfo {
        seed,
        n_items: data.n_items(),
        n_assessors: data.n_assessors(),
        n_clusters: config.n_clusters,
        metric: config.metric,
        error_model: config.error_model,
        nmc: config.nmc,
        created_at: Utc::now().to_rfc3339(),
    };
    Ok(recorder.finalize(info, alpha_acceptance, rho_acceptance, augmentation_acceptance))
}

/// Runs several chains sequentially, one derived seed per chain.
///
/// Chain `c` is seeded with [`determinism::chain_seed`]`(master_seed, c)`,
/// so partial reruns reproduce individual chains without replaying the
/// whole batch.
pub fn run_chains(
    data: &RankingMatrix,
    constraints: &[ConstraintSet],
    cardinalities: &[f64],
    config: &RunConfig,
    master_seed: u64,
    n_chains: usize,
) -> Result<Vec<Trace>, MallowsError> {
    if n_chains == 0 {
        return Err(MallowsError::Config(ErrorInfo::new(
            "no-chains",
            "at least one chain is required",
        )));
    }
    let mut traces = Vec::with_capacity(n_chains);
    for chain_index in 0..n_chains {
        let seed = determinism::chain_seed(master_seed, chain_index);
        traces.push(run_mcmc(data, constraints, cardinalities, config, seed)?);
    }
    Ok(traces)
}

fn validate_inputs(
    data: &RankingMatrix,
    constraints: &[ConstraintSet],
    cardinalities: &[f64],
    config: &RunConfig,
) -> Result<(), MallowsError> {
    config.validate()?;
    let n_items = data.n_items();
    if n_items < 2 {
        return Err(MallowsError::Config(
            ErrorInfo::new("too-few-items", "sampling needs at least two items")
                .with_context("n_items", n_items.to_string()),
        ));
    }
    if !constraints.is_empty() {
        if constraints.len() != data.n_assessors() {
            return Err(MallowsError::Constraint(
                ErrorInfo::new(
                    "constraint-shape",
                    "expected one constraint set per assessor",
                )
                .with_context("constraint_sets", constraints.len().to_string())
                .with_context("n_assessors", data.n_assessors().to_string()),
            ));
        }
        for (assessor, set) in constraints.iter().enumerate() {
            if set.n_items() != n_items {
                return Err(MallowsError::Constraint(
                    ErrorInfo::new(
                        "constraint-shape",
                        "constraint set covers a different item count than the data",
                    )
                    .with_context("assessor", assessor.to_string())
                    .with_context("set_items", set.n_items().to_string())
                    .with_context("n_items", n_items.to_string()),
                ));
            }
        }
    }
    if config.error_model == ErrorModel::Bernoulli && config.swap_leap > n_items - 1 {
        return Err(MallowsError::Config(
            ErrorInfo::new(
                "invalid-swap-leap",
                "swap leap must leave room for a partner rank",
            )
            .with_context("swap_leap", config.swap_leap.to_string())
            .with_context("n_items", n_items.to_string())
            .with_hint("use a swap leap of at most n_items - 1"),
        ));
    }
    if matches!(config.metric, Metric::Footrule | Metric::Spearman) {
        summation_distances(n_items, cardinalities, config.metric)?;
    }
    Ok(())
}

/// Log-normal random-walk update of every cluster's dispersion.
///
/// The Jacobian of the log-scale walk contributes the trailing
/// `ln alpha' - ln alpha` term.
fn perform_alpha_update(
    state: &mut ChainState,
    config: &RunConfig,
    cardinalities: &[f64],
    rng: &mut RngHandle,
) -> Result<(), MallowsError> {
    let n_items = state.rankings.n_items() as f64;
    for cluster in 0..config.n_clusters {
        let current = state.alpha[cluster];
        let step: f64 = rng.sample(StandardNormal);
        let proposal = (current.ln() + config.sd_alpha * step).exp();

        let members = state
            .assignments
            .iter()
            .filter(|&&label| label == cluster)
            .count() as f64;
        let distance_sum = cluster_distance_sum(
            &state.rankings,
            &state.assignments,
            cluster,
            &state.rho[cluster],
            config.metric,
        ) as f64;
        let log_z_current =
            log_partition_function(state.rankings.n_items(), current, cardinalities, config.metric)?;
        let log_z_proposal =
            log_partition_function(state.rankings.n_items(), proposal, cardinalities, config.metric)?;

        let log_ratio = (current - proposal) / n_items * distance_sum
            + config.lambda * (current - proposal)
            + members * (log_z_current - log_z_proposal)
            + proposal.ln()
            - current.ln();

        state.alpha_proposed[cluster] += 1;
        if log_ratio > rng.gen::<f64>().ln() {
            state.alpha[cluster] = proposal;
            state.alpha_accepted[cluster] += 1;
        }
    }
    Ok(())
}

/// Leap-and-shift update of every cluster's consensus ranking.
fn perform_rho_update(
    state: &mut ChainState,
    config: &RunConfig,
    rng: &mut RngHandle,
) -> Result<(), MallowsError> {
    let n_items = state.rankings.n_items() as f64;
    for cluster in 0..config.n_clusters {
        let leap = moves::leap_and_shift(&state.rho[cluster], config.leap_size, rng)?;
        let distance_new = cluster_distance_sum(
            &state.rankings,
            &state.assignments,
            cluster,
            &leap.proposal,
            config.metric,
        ) as f64;
        let distance_old = cluster_distance_sum(
            &state.rankings,
            &state.assignments,
            cluster,
            &state.rho[cluster],
            config.metric,
        ) as f64;

        let log_ratio = -state.alpha[cluster] / n_items * (distance_new - distance_old)
            + leap.backward_prob.ln()
            - leap.forward_prob.ln();

        if log_ratio > rng.gen::<f64>().ln() {
            state.rho[cluster] = leap.proposal;
            state.rho_accepted[cluster] += 1;
        }
    }
    Ok(())
}

/// One augmentation pass, followed by the error-rate Gibbs draw under
/// the Bernoulli model.
fn perform_augmentation(
    state: &mut ChainState,
    constraints: &[ConstraintSet],
    config: &RunConfig,
    rng: &mut RngHandle,
) -> Result<(), MallowsError> {
    let context = AugmentationContext {
        assignments: &state.assignments,
        alpha: &state.alpha,
        rho: &state.rho,
        theta: state.theta,
        metric: config.metric,
        error_model: config.error_model,
        swap_leap: config.swap_leap,
    };
    augment::augment_pairwise(
        &mut state.rankings,
        constraints,
        &context,
        &mut state.augmentation_accepted,
        rng,
    )?;
    if config.error_model == ErrorModel::Bernoulli {
        let (shape_1, shape_2) = augment::update_shape_bernoulli(
            &state.rankings,
            constraints,
            config.kappa_1,
            config.kappa_2,
        );
        state.theta = augment::sample_truncated_theta(shape_1, shape_2, rng)?;
    }
    Ok(())
}

fn cluster_distance_sum(
    rankings: &RankingMatrix,
    assignments: &[usize],
    cluster: usize,
    consensus: &Ranking,
    metric: Metric,
) -> u64 {
    let members = rankings
        .assessors()
        .iter()
        .zip(assignments)
        .filter(|(_, &label)| label == cluster)
        .map(|(ranking, _)| ranking);
    metric.total_distance(members, consensus)
}

fn acceptance_rates(accepted: &[u64], proposed: &[u64]) -> Vec<f64> {
    accepted
        .iter()
        .zip(proposed)
        .map(|(&hits, &tries)| {
            if tries == 0 {
                0.0
            } else {
                hits as f64 / tries as f64
            }
        })
        .collect()
}
