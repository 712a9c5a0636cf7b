//! Posterior trace recording and export.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use mallows_core::Ranking;
use mallows_rank::Metric;

use crate::config::ErrorModel;

/// Dispersion sample recorded at the `alpha_jump` cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlphaSample {
    /// Sweep at which the sample was recorded.
    pub sweep: usize,
    /// Cluster the dispersion belongs to.
    pub cluster: usize,
    /// Dispersion value after the sweep's update.
    pub alpha: f64,
}

/// Consensus sample recorded at the thinning cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RhoSample {
    /// Sweep at which the sample was recorded.
    pub sweep: usize,
    /// Cluster the consensus belongs to.
    pub cluster: usize,
    /// Dispersion of the cluster at recording time.
    pub alpha: f64,
    /// Total distance from the cluster's members to its consensus.
    pub distance: u64,
    /// The consensus ranking itself.
    pub rho: Ranking,
}

/// Cluster labels recorded at the thinning cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentSample {
    /// Sweep at which the sample was recorded.
    pub sweep: usize,
    /// Cluster label per assessor.
    pub assignments: Vec<usize>,
}

/// Error-rate sample recorded at the thinning cadence under the
/// Bernoulli model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThetaSample {
    /// Sweep at which the sample was recorded.
    pub sweep: usize,
    /// Error rate after the sweep's Gibbs draw.
    pub theta: f64,
}

/// Snapshot of the augmented latent rankings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AugmentedSample {
    /// Sweep at which the snapshot was taken.
    pub sweep: usize,
    /// One latent ranking per assessor.
    pub rankings: Vec<Ranking>,
}

/// Provenance stamp attached to every trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunInfo {
    /// Seed the chain's random stream was created from.
    pub seed: u64,
    /// Number of ranked items.
    pub n_items: usize,
    /// Number of assessors.
    pub n_assessors: usize,
    /// Number of latent clusters.
    pub n_clusters: usize,
    /// Distance metric driving the likelihood.
    pub metric: Metric,
    /// Error model used by the augmentation pass.
    pub error_model: ErrorModel,
    /// Number of sweeps executed.
    pub nmc: usize,
    /// RFC 3339 timestamp recording when the trace was produced.
    pub created_at: String,
}

/// Aggregate exploration diagnostics computed from the recorded samples.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverageDiagnostics {
    /// Number of distinct consensus rankings visited across all clusters.
    pub unique_consensus_states: usize,
    /// Mean of the recorded dispersion chain, per cluster.
    pub mean_alpha: Vec<f64>,
    /// Variance of the recorded dispersion chain, per cluster.
    pub alpha_variance: Vec<f64>,
}

impl CoverageDiagnostics {
    /// Returns an empty coverage descriptor.
    pub fn empty(n_clusters: usize) -> Self {
        Self {
            unique_consensus_states: 0,
            mean_alpha: vec![0.0; n_clusters],
            alpha_variance: vec![0.0; n_clusters],
        }
    }
}

/// Full posterior trace returned by a run.
///
/// The sole output of the sampler: once the run returns, nothing else
/// survives the invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trace {
    /// Provenance stamp for the run.
    pub info: RunInfo,
    /// Dispersion samples at the `alpha_jump` cadence.
    pub alpha: Vec<AlphaSample>,
    /// Consensus samples at the thinning cadence.
    pub rho: Vec<RhoSample>,
    /// Cluster assignments at the thinning cadence.
    pub assignments: Vec<AssignmentSample>,
    /// Error-rate samples at the thinning cadence (Bernoulli model only).
    pub theta: Vec<ThetaSample>,
    /// Augmented-ranking snapshots, when requested.
    pub augmented: Vec<AugmentedSample>,
    /// Dispersion acceptance rate per cluster.
    pub alpha_acceptance: Vec<f64>,
    /// Consensus acceptance rate per cluster.
    pub rho_acceptance: Vec<f64>,
    /// Augmentation acceptance rate per assessor.
    pub augmentation_acceptance: Vec<f64>,
    /// Exploration diagnostics over the recorded samples.
    pub coverage: CoverageDiagnostics,
}

impl Trace {
    /// Writes the thinning-cadence consensus rows to a CSV file.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "sweep,cluster,alpha,distance,rho")?;
        for sample in &self.rho {
            let joined: Vec<String> = sample
                .rho
                .as_slice()
                .iter()
                .map(|rank| rank.to_string())
                .collect();
            writeln!(
                file,
                "{},{},{:.6},{},{}",
                sample.sweep,
                sample.cluster,
                sample.alpha,
                sample.distance,
                joined.join("-")
            )?;
        }
        Ok(())
    }
}

/// Accumulates samples during a run and finalizes them into a [`Trace`].
#[derive(Debug, Default)]
pub struct TraceRecorder {
    alpha: Vec<AlphaSample>,
    rho: Vec<RhoSample>,
    assignments: Vec<AssignmentSample>,
    theta: Vec<ThetaSample>,
    augmented: Vec<AugmentedSample>,
    unique_consensus: IndexSet<Vec<usize>>,
}

impl TraceRecorder {
    /// Creates a new recorder instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one dispersion sample.
    pub fn push_alpha(&mut self, sweep: usize, cluster: usize, alpha: f64) {
        self.alpha.push(AlphaSample {
            sweep,
            cluster,
            alpha,
        });
    }

    /// Records one consensus sample and tracks it for coverage.
    pub fn push_rho(&mut self, sweep: usize, cluster: usize, alpha: f64, distance: u64, rho: &Ranking) {
        self.unique_consensus.insert(rho.as_slice().to_vec());
        self.rho.push(RhoSample {
            sweep,
            cluster,
            alpha,
            distance,
            rho: rho.clone(),
        });
    }

    /// Records the cluster labels for one sweep.
    pub fn push_assignments(&mut self, sweep: usize, assignments: &[usize]) {
        self.assignments.push(AssignmentSample {
            sweep,
            assignments: assignments.to_vec(),
        });
    }

    /// Records one error-rate sample.
    pub fn push_theta(&mut self, sweep: usize, theta: f64) {
        self.theta.push(ThetaSample { sweep, theta });
    }

    /// Records a snapshot of the augmented rankings.
    pub fn push_augmented(&mut self, sweep: usize, rankings: &[Ranking]) {
        self.augmented.push(AugmentedSample {
            sweep,
            rankings: rankings.to_vec(),
        });
    }

    /// Number of consensus samples recorded so far.
    pub fn rho_samples(&self) -> usize {
        self.rho.len()
    }

    /// Computes coverage diagnostics from the recorded samples.
    fn coverage(&self, n_clusters: usize) -> CoverageDiagnostics {
        if self.alpha.is_empty() {
            return CoverageDiagnostics {
                unique_consensus_states: self.unique_consensus.len(),
                ..CoverageDiagnostics::empty(n_clusters)
            };
        }
        let mut mean_alpha = vec![0.0f64; n_clusters];
        let mut mean_square = vec![0.0f64; n_clusters];
        let mut counts = vec![0usize; n_clusters];
        for sample in &self.alpha {
            mean_alpha[sample.cluster] += sample.alpha;
            mean_square[sample.cluster] += sample.alpha * sample.alpha;
            counts[sample.cluster] += 1;
        }
        let mut alpha_variance = vec![0.0f64; n_clusters];
        for cluster in 0..n_clusters {
            if counts[cluster] > 0 {
                mean_alpha[cluster] /= counts[cluster] as f64;
                mean_square[cluster] /= counts[cluster] as f64;
                alpha_variance[cluster] =
                    (mean_square[cluster] - mean_alpha[cluster] * mean_alpha[cluster]).max(0.0);
            }
        }
        CoverageDiagnostics {
            unique_consensus_states: self.unique_consensus.len(),
            mean_alpha,
            alpha_variance,
        }
    }

    /// Finalizes the recording into a trace.
    pub fn finalize(
        self,
        info: RunInfo,
        alpha_acceptance: Vec<f64>,
        rho_acceptance: Vec<f64>,
        augmentation_acceptance: Vec<f64>,
    ) -> Trace {
        let coverage = self.coverage(info.n_clusters);
        Trace {
            info,
            alpha: self.alpha,
            rho: self.rho,
            assignments: self.assignments,
            theta: self.theta,
            augmented: self.augmented,
            alpha_acceptance,
            rho_acceptance,
            augmentation_acceptance,
            coverage,
        }
    }
}
