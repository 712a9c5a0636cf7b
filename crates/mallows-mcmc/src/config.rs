use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use mallows_core::errors::{ErrorInfo, MallowsError};
use mallows_rank::Metric;

/// Augmentation error model for pairwise preference data.
///
/// `None` keeps the latent rankings consistent with every stated
/// preference; `Bernoulli` lets each comparison be mistaken with a shared
/// probability `theta` learned during the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorModel {
    /// Constraints hold exactly; proposals never violate them.
    #[default]
    None,
    /// Comparisons may be wrong with a latent Bernoulli rate.
    Bernoulli,
}

impl ErrorModel {
    /// Canonical lowercase name, matching the configuration format.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorModel::None => "none",
            ErrorModel::Bernoulli => "bernoulli",
        }
    }
}

impl fmt::Display for ErrorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErrorModel {
    type Err = MallowsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "none" => Ok(ErrorModel::None),
            "bernoulli" => Ok(ErrorModel::Bernoulli),
            _ => Err(MallowsError::ErrorModel(
                ErrorInfo::new("unknown-error-model", "unrecognized augmentation error model")
                    .with_context("name", name.to_string())
                    .with_hint("expected none or bernoulli"),
            )),
        }
    }
}

/// Parameters governing a single MCMC run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of full sweeps to execute.
    pub nmc: usize,
    /// Interval at which consensus and assignment samples are recorded.
    #[serde(default = "default_thinning")]
    pub thinning: usize,
    /// Interval at which the dispersion is updated and recorded.
    #[serde(default = "default_alpha_jump")]
    pub alpha_jump: usize,
    /// Maximum rank displacement of a leap-and-shift proposal.
    #[serde(default = "default_leap_size")]
    pub leap_size: usize,
    /// Rank gap bridged by a swap proposal under the Bernoulli model.
    #[serde(default = "default_swap_leap")]
    pub swap_leap: usize,
    /// Standard deviation of the log-normal dispersion random walk.
    #[serde(default = "default_sd_alpha")]
    pub sd_alpha: f64,
    /// Initial dispersion value for every cluster.
    #[serde(default = "default_alpha_init")]
    pub alpha_init: f64,
    /// Rate of the exponential prior on the dispersion, reused as the
    /// concentration of the cluster-assignment weights.
    #[serde(default = "default_lambda")]
    pub lambda: f64,
    /// First shape hyperparameter of the Beta prior on the error rate.
    #[serde(default = "default_kappa_1")]
    pub kappa_1: f64,
    /// Second shape hyperparameter of the Beta prior on the error rate.
    #[serde(default = "default_kappa_2")]
    pub kappa_2: f64,
    /// Number of latent clusters (1 disables reassignment).
    #[serde(default = "default_n_clusters")]
    pub n_clusters: usize,
    /// Rank distance driving the likelihood.
    #[serde(default = "default_metric")]
    pub metric: Metric,
    /// Error model used by the augmentation pass.
    #[serde(default)]
    pub error_model: ErrorModel,
    /// Whether to snapshot the augmented rankings at the thinning cadence.
    #[serde(default)]
    pub save_augmented: bool,
}

fn default_thinning() -> usize {
    1
}

fn default_alpha_jump() -> usize {
    1
}

fn default_leap_size() -> usize {
    1
}

fn default_swap_leap() -> usize {
    1
}

fn default_sd_alpha() -> f64 {
    0.1
}

fn default_alpha_init() -> f64 {
    1.0
}

fn default_lambda() -> f64 {
    0.1
}

fn default_kappa_1() -> f64 {
    1.0
}

fn default_kappa_2() -> f64 {
    3.0
}

fn default_n_clusters() -> usize {
    1
}

fn default_metric() -> Metric {
    Metric::Footrule
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            nmc: 2000,
            thinning: default_thinning(),
            alpha_jump: default_alpha_jump(),
            leap_size: default_leap_size(),
            swap_leap: default_swap_leap(),
            sd_alpha: default_sd_alpha(),
            alpha_init: default_alpha_init(),
            lambda: default_lambda(),
            kappa_1: default_kappa_1(),
            kappa_2: default_kappa_2(),
            n_clusters: default_n_clusters(),
            metric: default_metric(),
            error_model: ErrorModel::default(),
            save_augmented: false,
        }
    }
}

impl RunConfig {
    /// Checks every data-independent parameter bound.
    ///
    /// Bounds that involve the data shape (`swap_leap` against the item
    /// count, constraint arity) are checked by `run_mcmc` once the data is
    /// in hand.
    pub fn validate(&self) -> Result<(), MallowsError> {
        if self.nmc == 0 {
            return Err(invalid_field("nmc", "at least one sweep is required"));
        }
        if self.thinning == 0 {
            return Err(invalid_field("thinning", "the recording interval must be positive"));
        }
        if self.alpha_jump == 0 {
            return Err(invalid_field("alpha_jump", "the dispersion cadence must be positive"));
        }
        if self.leap_size == 0 {
            return Err(invalid_field("leap_size", "the leap size must be positive"));
        }
        if self.swap_leap == 0 {
            return Err(invalid_field("swap_leap", "the swap leap must be positive"));
        }
        if !self.sd_alpha.is_finite() || self.sd_alpha <= 0.0 {
            return Err(invalid_field("sd_alpha", "the random-walk deviation must be positive"));
        }
        if !self.alpha_init.is_finite() || self.alpha_init <= 0.0 {
            return Err(invalid_field("alpha_init", "the initial dispersion must be positive"));
        }
        if !self.lambda.is_finite() || self.lambda <= 0.0 {
            return Err(invalid_field("lambda", "the prior rate must be positive"));
        }
        if !self.kappa_1.is_finite() || self.kappa_1 <= 0.0 {
            return Err(invalid_field("kappa_1", "the Beta shape must be positive"));
        }
        if !self.kappa_2.is_finite() || self.kappa_2 <= 0.0 {
            return Err(invalid_field("kappa_2", "the Beta shape must be positive"));
        }
        if self.n_clusters == 0 {
            return Err(invalid_field("n_clusters", "at least one cluster is required"));
        }
        Ok(())
    }
}

fn invalid_field(field: &str, message: &str) -> MallowsError {
    MallowsError::Config(
        ErrorInfo::new("invalid-config-field", message).with_context("field", field.to_string()),
    )
}
