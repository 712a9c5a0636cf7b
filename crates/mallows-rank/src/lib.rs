#![deny(missing_docs)]
#![doc = "Rank distances, partition functions and Monte Carlo estimators for the Mallows model."]

pub mod cardinalities;
pub mod distance;
pub mod partition;
pub mod sampling;

pub use cardinalities::{distance_cardinalities, MAX_EXACT_ITEMS};
pub use distance::{distance, Metric};
pub use partition::{
    ln_factorial, log_partition_cayley, log_partition_exact, log_partition_function,
    log_partition_hamming, log_partition_kendall, logsumexp, summation_distances,
};
pub use sampling::importance_sampling_estimate;
