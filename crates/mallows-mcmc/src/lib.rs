#![deny(missing_docs)]
#![doc = "Metropolis-within-Gibbs sampler for the Bayesian Mallows rank model."]

//! Posterior inference over consensus rankings, dispersions, cluster
//! labels and latent rankings, driven by a single deterministic random
//! stream per chain.

/// Latent-ranking augmentation and the Bernoulli error model.
pub mod augment;
/// Collapsed categorical updates of the cluster labels.
pub mod clusters;
/// Run configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation for chains.
pub mod determinism;
/// Core sweep loop and the public `run_mcmc`/`run_chains` entry points.
pub mod kernel;
/// Proposal moves over rankings.
pub mod moves;
/// Posterior trace recording and export.
pub mod trace;

pub use config::{ErrorModel, RunConfig};
pub use kernel::{run_chains, run_mcmc};
pub use trace::{CoverageDiagnostics, RunInfo, Trace, TraceRecorder};
