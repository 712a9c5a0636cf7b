//! Metropolis-Hastings proposal moves over rankings.

use rand::Rng;

use mallows_core::errors::{ErrorInfo, MallowsError};
use mallows_core::{ConstraintSet, Ranking, RngHandle};

/// Result of a leap-and-shift proposal.
#[derive(Debug, Clone)]
pub struct LeapShift {
    /// Candidate ranking produced by the move.
    pub proposal: Ranking,
    /// Forward proposal probability used for MH acceptance.
    pub forward_prob: f64,
    /// Reverse proposal probability used for MH acceptance.
    pub backward_prob: f64,
}

/// Result of a bounded swap proposal under the Bernoulli error model.
#[derive(Debug, Clone)]
pub struct SwapProposal {
    /// Candidate ranking produced by the move.
    pub proposal: Ranking,
    /// Net change in constraint violations, counted per swapped item at
    /// its own position, from both endpoints of every constrained pair.
    pub violation_diff: i64,
}

/// Moves `item` to `new_rank` and closes the vacated gap.
///
/// Every other item whose rank lies between the old and the new rank
/// (new side inclusive) shifts by exactly one toward the vacated rank, so
/// the slice remains a permutation of `1..=n` by construction.
pub fn shift_ranks(ranks: &mut [usize], item: usize, new_rank: usize) {
    let old_rank = ranks[item];
    if new_rank > old_rank {
        for (other, rank) in ranks.iter_mut().enumerate() {
            if other != item && *rank > old_rank && *rank <= new_rank {
                *rank -= 1;
            }
        }
    } else if new_rank < old_rank {
        for (other, rank) in ranks.iter_mut().enumerate() {
            if other != item && *rank >= new_rank && *rank < old_rank {
                *rank += 1;
            }
        }
    }
    ranks[item] = new_rank;
}

/// Leap-and-shift proposal for the consensus update.
///
/// Draws a uniform item, leaps it to a uniform rank at most `leap_size`
/// away and shifts the intermediate items back into place. The forward
/// and backward probabilities differ only through the support sizes at
/// the old and new rank, `1/(n|S|)` each way.
pub fn leap_and_shift(
    consensus: &Ranking,
    leap_size: usize,
    rng: &mut RngHandle,
) -> Result<LeapShift, MallowsError> {
    let n_items = consensus.n_items();
    if n_items < 2 {
        return Err(MallowsError::Config(ErrorInfo::new(
            "too-few-items",
            "leap-and-shift requires at least two items",
        )));
    }

    let item = rng.gen_range(0..n_items);
    let old_rank = consensus.rank_of(item);
    let low = old_rank.saturating_sub(leap_size).max(1);
    let high = (old_rank + leap_size).min(n_items);
    let below = old_rank - low;
    let above = high - old_rank;
    let support = below + above;

    let draw = rng.gen_range(0..support);
    let new_rank = if draw < below {
        low + draw
    } else {
        old_rank + 1 + (draw - below)
    };

    let mut ranks = consensus.as_slice().to_vec();
    shift_ranks(&mut ranks, item, new_rank);

    let reverse_below = (new_rank - 1).min(leap_size);
    let reverse_above = (n_items - new_rank).min(leap_size);
    let scale = n_items as f64;
    Ok(LeapShift {
        proposal: Ranking::new(ranks)?,
        forward_prob: 1.0 / (scale * support as f64),
        backward_prob: 1.0 / (scale * (reverse_below + reverse_above) as f64),
    })
}

/// Constrained leap proposal for pairwise-augmented rankings.
///
/// Draws a uniform item and leaps it within the open interval pinned by
/// its constraint neighbours: strictly below the worst-ranked item that
/// must precede it and strictly above the best-ranked item that must
/// follow it. The interval always contains the item's current rank when
/// the ranking satisfies the constraints; an empty interval means the
/// current state is infeasible and the move fails instead of looping.
pub fn propose_pairwise_augmentation(
    current: &Ranking,
    constraints: &ConstraintSet,
    rng: &mut RngHandle,
) -> Result<Ranking, MallowsError> {
    let n_items = current.n_items();
    let item = rng.gen_range(0..n_items);

    let mut left_limit = 0usize;
    let mut right_limit = n_items + 1;
    for &better in constraints.items_above(item) {
        left_limit = left_limit.max(current.rank_of(better));
    }
    for &worse in constraints.items_below(item) {
        right_limit = right_limit.min(current.rank_of(worse));
    }
    if left_limit + 1 >= right_limit {
        return Err(MallowsError::Constraint(
            ErrorInfo::new(
                "infeasible-interval",
                "no rank satisfies the item's constraints under the current ranking",
            )
            .with_context("item", item.to_string())
            .with_context("left_limit", left_limit.to_string())
            .with_context("right_limit", right_limit.to_string())
            .with_hint("the latent ranking violates the stated preferences"),
        ));
    }

    let proposed_rank = rng.gen_range(left_limit + 1..right_limit);
    let mut ranks = current.as_slice().to_vec();
    shift_ranks(&mut ranks, item, proposed_rank);
    Ranking::new(ranks)
}

/// Bounded swap proposal for the Bernoulli error model.
///
/// Draws a uniform rank value `u` and swaps the items holding ranks `u`
/// and `u + swap_leap`. The violation diff tallies, for each swapped item
/// against its own constraint neighbours, how many stated preferences the
/// proposal breaks minus how many the current ranking breaks. A pair
/// constraining both swapped items is counted from both sides.
pub fn propose_swap(
    current: &Ranking,
    constraints: &ConstraintSet,
    swap_leap: usize,
    rng: &mut RngHandle,
) -> Result<SwapProposal, MallowsError> {
    let n_items = current.n_items();
    if swap_leap == 0 || swap_leap >= n_items {
        return Err(MallowsError::Config(
            ErrorInfo::new("invalid-swap-leap", "the swap leap must lie in 1..n_items")
                .with_context("swap_leap", swap_leap.to_string())
                .with_context("n_items", n_items.to_string()),
        ));
    }

    let low_rank = rng.gen_range(1..=n_items - swap_leap);
    let items_at = current.items_by_rank();
    let first = items_at[low_rank - 1];
    let second = items_at[low_rank + swap_leap - 1];

    let mut ranks = current.as_slice().to_vec();
    ranks.swap(first, second);

    let mut violation_diff = 0i64;
    for item in [first, second] {
        violation_diff += violations_at(&ranks, constraints, item)
            - violations_at(current.as_slice(), constraints, item);
    }

    Ok(SwapProposal {
        proposal: Ranking::new(ranks)?,
        violation_diff,
    })
}

/// Stated preferences of `item` that `ranks` breaks.
fn violations_at(ranks: &[usize], constraints: &ConstraintSet, item: usize) -> i64 {
    let rank = ranks[item];
    let mut violations = 0i64;
    for &better in constraints.items_above(item) {
        if ranks[better] > rank {
            violations += 1;
        }
    }
    for &worse in constraints.items_below(item) {
        if ranks[worse] < rank {
            violations += 1;
        }
    }
    violations
}
