#![deny(missing_docs)]
#![doc = "Core data types and deterministic randomness for the Mallows rank-inference engine."]

pub mod constraints;
pub mod errors;
pub mod rng;
mod rankings;

pub use constraints::ConstraintSet;
pub use errors::{ErrorInfo, MallowsError};
pub use rankings::{Ranking, RankingMatrix};
pub use rng::{derive_substream_seed, RngHandle};
