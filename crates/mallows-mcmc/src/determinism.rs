use mallows_core::derive_substream_seed;

/// Derives the deterministic seed used for a specific chain.
///
/// Chains are the only unit of parallelism the engine acknowledges: every
/// draw within a chain comes from the single handle seeded here, so two
/// runs with the same chain seed replay the same trace.
pub fn chain_seed(master_seed: u64, chain_index: usize) -> u64 {
    derive_substream_seed(master_seed, chain_index as u64)
}
