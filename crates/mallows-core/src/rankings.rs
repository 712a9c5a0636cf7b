use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, MallowsError};

/// A complete ranking of `n` items.
///
/// Stored as a vector of rank values `1..=n` indexed by 0-based item id:
/// item `i` holds rank `ranks[i]`, with rank 1 the most preferred.
/// The permutation invariant (each value `1..=n` appears exactly once) is
/// enforced at construction and re-checked when deserializing, so holding a
/// `Ranking` guarantees a valid permutation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Ranking {
    ranks: Vec<usize>,
}

impl Ranking {
    /// Constructs a ranking from raw rank values, validating the
    /// permutation invariant.
    pub fn new(ranks: Vec<usize>) -> Result<Self, MallowsError> {
        let n = ranks.len();
        if n == 0 {
            return Err(MallowsError::Permutation(ErrorInfo::new(
                "empty-ranking",
                "a ranking must cover at least one item",
            )));
        }
        let mut seen = vec![false; n];
        for (item, &rank) in ranks.iter().enumerate() {
            if rank < 1 || rank > n {
                return Err(MallowsError::Permutation(
                    ErrorInfo::new("rank-out-of-range", "rank value outside 1..=n")
                        .with_context("item", item.to_string())
                        .with_context("rank", rank.to_string())
                        .with_context("n_items", n.to_string()),
                ));
            }
            if seen[rank - 1] {
                return Err(MallowsError::Permutation(
                    ErrorInfo::new("duplicate-rank", "rank value assigned to two items")
                        .with_context("rank", rank.to_string()),
                ));
            }
            seen[rank - 1] = true;
        }
        Ok(Self { ranks })
    }

    /// Returns the identity ranking `1, 2, ..., n`.
    pub fn identity(n_items: usize) -> Self {
        Self {
            ranks: (1..=n_items).collect(),
        }
    }

    /// Number of ranked items.
    pub fn n_items(&self) -> usize {
        self.ranks.len()
    }

    /// Rank value held by the given item (0-based item id).
    pub fn rank_of(&self, item: usize) -> usize {
        self.ranks[item]
    }

    /// Raw rank values indexed by item id.
    pub fn as_slice(&self) -> &[usize] {
        &self.ranks
    }

    /// Items ordered from best (rank 1) to worst (rank n).
    pub fn items_by_rank(&self) -> Vec<usize> {
        let mut items = vec![0usize; self.ranks.len()];
        for (item, &rank) in self.ranks.iter().enumerate() {
            items[rank - 1] = item;
        }
        items
    }
}

impl TryFrom<Vec<usize>> for Ranking {
    type Error = MallowsError;

    fn try_from(ranks: Vec<usize>) -> Result<Self, Self::Error> {
        Ranking::new(ranks)
    }
}

impl From<Ranking> for Vec<usize> {
    fn from(ranking: Ranking) -> Self {
        ranking.ranks
    }
}

/// Latent complete rankings for a panel of assessors, one column each.
///
/// Mirrors the `n_items x n_assessors` matrix of the model: column `i` is
/// assessor `i`'s current (possibly latent) full ranking. All columns share
/// the same item count, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingMatrix {
    columns: Vec<Ranking>,
    n_items: usize,
}

impl RankingMatrix {
    /// Builds a matrix from per-assessor rankings of equal length.
    pub fn new(columns: Vec<Ranking>) -> Result<Self, MallowsError> {
        let Some(first) = columns.first() else {
            return Err(MallowsError::Config(ErrorInfo::new(
                "empty-ranking-matrix",
                "at least one assessor ranking is required",
            )));
        };
        let n_items = first.n_items();
        for (assessor, column) in columns.iter().enumerate() {
            if column.n_items() != n_items {
                return Err(MallowsError::Config(
                    ErrorInfo::new("ragged-ranking-matrix", "columns rank different item counts")
                        .with_context("assessor", assessor.to_string())
                        .with_context("expected", n_items.to_string())
                        .with_context("found", column.n_items().to_string()),
                ));
            }
        }
        Ok(Self { columns, n_items })
    }

    /// Number of ranked items (rows).
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of assessors (columns).
    pub fn n_assessors(&self) -> usize {
        self.columns.len()
    }

    /// The ranking held by the given assessor.
    pub fn assessor(&self, index: usize) -> &Ranking {
        &self.columns[index]
    }

    /// All assessor rankings in column order.
    pub fn assessors(&self) -> &[Ranking] {
        &self.columns
    }

    /// Replaces one assessor's ranking, keeping the shape invariant.
    pub fn set_assessor(&mut self, index: usize, ranking: Ranking) -> Result<(), MallowsError> {
        if ranking.n_items() != self.n_items {
            return Err(MallowsError::Config(
                ErrorInfo::new("ragged-ranking-matrix", "replacement column has wrong length")
                    .with_context("assessor", index.to_string())
                    .with_context("expected", self.n_items.to_string())
                    .with_context("found", ranking.n_items().to_string()),
            ));
        }
        self.columns[index] = ranking;
        Ok(())
    }
}
