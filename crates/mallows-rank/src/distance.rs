//! Rank distances between complete rankings.
//!
//! All five metrics operate on rank vectors indexed by item: `ranks[i]` is
//! the rank held by item `i`. Distances are exact integers; callers working
//! in log space convert at the call site.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use mallows_core::errors::{ErrorInfo, MallowsError};
use mallows_core::Ranking;

/// Distance metric used by the Mallows likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Sum of absolute rank differences.
    Footrule,
    /// Sum of squared rank differences.
    Spearman,
    /// Minimum number of transpositions, `n` minus the cycle count.
    Cayley,
    /// Number of items placed at different ranks.
    Hamming,
    /// Number of discordant pairs, counted by merge sort.
    Kendall,
}

impl Metric {
    /// Every supported metric, in declaration order.
    pub const ALL: [Metric; 5] = [
        Metric::Footrule,
        Metric::Spearman,
        Metric::Cayley,
        Metric::Hamming,
        Metric::Kendall,
    ];

    /// Canonical lowercase name, matching the configuration format.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Footrule => "footrule",
            Metric::Spearman => "spearman",
            Metric::Cayley => "cayley",
            Metric::Hamming => "hamming",
            Metric::Kendall => "kendall",
        }
    }

    /// Distance between two rank vectors over the same items.
    ///
    /// Both slices must be permutations of `1..=n` of equal length; the
    /// engine guarantees this for every internal call.
    pub fn distance(&self, a: &[usize], b: &[usize]) -> u64 {
        assert_eq!(a.len(), b.len(), "rank vectors must cover the same items");
        match self {
            Metric::Footrule => a
                .iter()
                .zip(b)
                .map(|(&x, &y)| x.abs_diff(y) as u64)
                .sum(),
            Metric::Spearman => a
                .iter()
                .zip(b)
                .map(|(&x, &y)| {
                    let gap = x.abs_diff(y) as u64;
                    gap * gap
                })
                .sum(),
            Metric::Cayley => cayley_distance(a, b),
            Metric::Hamming => a.iter().zip(b).filter(|(x, y)| x != y).count() as u64,
            Metric::Kendall => kendall_distance(a, b),
        }
    }

    /// Distance between two validated rankings.
    pub fn ranking_distance(&self, a: &Ranking, b: &Ranking) -> u64 {
        self.distance(a.as_slice(), b.as_slice())
    }

    /// Sum of distances from each ranking to a shared consensus.
    pub fn total_distance<'a, I>(&self, rankings: I, consensus: &Ranking) -> u64
    where
        I: IntoIterator<Item = &'a Ranking>,
    {
        rankings
            .into_iter()
            .map(|ranking| self.ranking_distance(ranking, consensus))
            .sum()
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Checked distance between two rankings, for callers outside the sweep
/// loop. Rankings over different item counts are rejected.
pub fn distance(a: &Ranking, b: &Ranking, metric: Metric) -> Result<f64, MallowsError> {
    if a.n_items() != b.n_items() {
        return Err(MallowsError::Config(
            ErrorInfo::new("length-mismatch", "rankings cover different item counts")
                .with_context("left", a.n_items().to_string())
                .with_context("right", b.n_items().to_string()),
        ));
    }
    Ok(metric.ranking_distance(a, b) as f64)
}

impl FromStr for Metric {
    type Err = MallowsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.name() == name)
            .ok_or_else(|| {
                MallowsError::Metric(
                    ErrorInfo::new("unknown-metric", "unrecognized distance metric")
                        .with_context("name", name.to_string())
                        .with_hint("expected footrule, spearman, cayley, hamming or kendall"),
                )
            })
    }
}

/// Item occupying each rank position, the inverse of a rank vector.
fn positions_to_items(ranks: &[usize]) -> Vec<usize> {
    let mut items = vec![0usize; ranks.len()];
    for (item, &rank) in ranks.iter().enumerate() {
        items[rank - 1] = item;
    }
    items
}

/// Cayley distance as `n` minus the number of cycles of the relative
/// permutation mapping positions in `a` to positions in `b`.
fn cayley_distance(a: &[usize], b: &[usize]) -> u64 {
    let n = a.len();
    let items_at = positions_to_items(a);
    let mut visited = vec![false; n];
    let mut cycles = 0u64;
    for start in 0..n {
        if visited[start] {
            continue;
        }
        cycles += 1;
        let mut position = start;
        while !visited[position] {
            visited[position] = true;
            position = b[items_at[position]] - 1;
        }
    }
    n as u64 - cycles
}

/// Kendall distance as the inversion count of `b`'s ranks visited in `a`'s
/// rank order, counted during a merge sort.
fn kendall_distance(a: &[usize], b: &[usize]) -> u64 {
    let mut sequence: Vec<usize> = positions_to_items(a)
        .into_iter()
        .map(|item| b[item])
        .collect();
    let mut scratch = vec![0usize; sequence.len()];
    sort_counting_inversions(&mut sequence, &mut scratch)
}

fn sort_counting_inversions(sequence: &mut [usize], scratch: &mut [usize]) -> u64 {
    let n = sequence.len();
    if n <= 1 {
        return 0;
    }
    let mid = n / 2;
    let mut inversions = {
        let (left, right) = sequence.split_at_mut(mid);
        let (scratch_left, scratch_right) = scratch.split_at_mut(mid);
        sort_counting_inversions(left, scratch_left)
            + sort_counting_inversions(right, scratch_right)
    };
    let (mut i, mut j) = (0, mid);
    for slot in scratch.iter_mut() {
        if j == n || (i < mid && sequence[i] <= sequence[j]) {
            *slot = sequence[i];
            i += 1;
        } else {
            // every element still pending on the left is inverted with it
            inversions += (mid - i) as u64;
            *slot = sequence[j];
            j += 1;
        }
    }
    sequence.copy_from_slice(scratch);
    inversions
}
