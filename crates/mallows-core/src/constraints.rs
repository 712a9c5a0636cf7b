//! Partial-order constraints induced by pairwise comparisons.
//!
//! Each assessor's stated preferences are held as a [`ConstraintSet`]: for
//! every item, the set of items that must precede it and the set that must
//! follow it. Construction from raw comparison pairs takes the transitive
//! closure and rejects cycles, so a held `ConstraintSet` is always a valid
//! partial order over `0..n_items`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, MallowsError};
use crate::rankings::Ranking;
use crate::rng::RngHandle;

/// One assessor's preference constraints over `n_items` items.
///
/// `above[i]` lists the items that must take a better (smaller) rank than
/// item `i`; `below[i]` lists those that must take a worse (larger) rank.
/// The two views are kept mutually consistent and acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConstraintSet")]
pub struct ConstraintSet {
    n_items: usize,
    above: Vec<Vec<usize>>,
    below: Vec<Vec<usize>>,
}

#[derive(Deserialize)]
struct RawConstraintSet {
    above: Vec<Vec<usize>>,
    below: Vec<Vec<usize>>,
}

impl TryFrom<RawConstraintSet> for ConstraintSet {
    type Error = MallowsError;

    fn try_from(raw: RawConstraintSet) -> Result<Self, Self::Error> {
        ConstraintSet::from_sets(raw.above, raw.below)
    }
}

impl ConstraintSet {
    /// A constraint set with no stated preferences.
    pub fn unconstrained(n_items: usize) -> Self {
        Self {
            n_items,
            above: vec![Vec::new(); n_items],
            below: vec![Vec::new(); n_items],
        }
    }

    /// Builds a constraint set from `(preferred, dispreferred)` item pairs.
    ///
    /// The transitive closure of the pairs is taken, so stating `a < b` and
    /// `b < c` also constrains `a < c`. A pair set whose closure contains a
    /// cycle is rejected.
    pub fn from_pairs(n_items: usize, pairs: &[(usize, usize)]) -> Result<Self, MallowsError> {
        if n_items == 0 {
            return Err(MallowsError::Constraint(ErrorInfo::new(
                "empty-item-set",
                "constraints require at least one item",
            )));
        }
        let mut direct_below = vec![Vec::new(); n_items];
        for &(preferred, dispreferred) in pairs {
            for item in [preferred, dispreferred] {
                if item >= n_items {
                    return Err(MallowsError::Constraint(
                        ErrorInfo::new("item-out-of-range", "comparison names an unknown item")
                            .with_context("item", item.to_string())
                            .with_context("n_items", n_items.to_string()),
                    ));
                }
            }
            if preferred == dispreferred {
                return Err(MallowsError::Constraint(
                    ErrorInfo::new("self-comparison", "an item cannot be preferred to itself")
                        .with_context("item", preferred.to_string()),
                ));
            }
            direct_below[preferred].push(dispreferred);
        }

        // Transitive closure by reachability from each item.
        let mut below = vec![Vec::new(); n_items];
        for start in 0..n_items {
            let mut reached = vec![false; n_items];
            let mut frontier = vec![start];
            while let Some(item) = frontier.pop() {
                for &next in &direct_below[item] {
                    if next == start {
                        return Err(MallowsError::Constraint(
                            ErrorInfo::new("cyclic-preferences", "comparisons form a cycle")
                                .with_context("item", start.to_string())
                                .with_hint("check the assessor's pairwise data for contradictions"),
                        ));
                    }
                    if !reached[next] {
                        reached[next] = true;
                        frontier.push(next);
                    }
                }
            }
            below[start] = reached
                .iter()
                .enumerate()
                .filter_map(|(item, &hit)| hit.then_some(item))
                .collect();
        }

        let mut above = vec![Vec::new(); n_items];
        for (item, descendants) in below.iter().enumerate() {
            for &worse in descendants {
                above[worse].push(item);
            }
        }
        for list in &mut above {
            list.sort_unstable();
        }

        Ok(Self {
            n_items,
            above,
            below,
        })
    }

    /// Builds a constraint set from precomputed above/below adjacency.
    ///
    /// The sets are taken as given (no closure is applied) but must be
    /// mutually consistent, free of self-reference, and acyclic.
    pub fn from_sets(
        above: Vec<Vec<usize>>,
        below: Vec<Vec<usize>>,
    ) -> Result<Self, MallowsError> {
        let n_items = above.len();
        if n_items == 0 {
            return Err(MallowsError::Constraint(ErrorInfo::new(
                "empty-item-set",
                "constraints require at least one item",
            )));
        }
        if below.len() != n_items {
            return Err(MallowsError::Constraint(
                ErrorInfo::new("mismatched-views", "above and below cover different item counts")
                    .with_context("above", n_items.to_string())
                    .with_context("below", below.len().to_string()),
            ));
        }
        for view in [&above, &below] {
            for (item, list) in view.iter().enumerate() {
                for &other in list {
                    if other >= n_items {
                        return Err(MallowsError::Constraint(
                            ErrorInfo::new("item-out-of-range", "constraint names an unknown item")
                                .with_context("item", other.to_string())
                                .with_context("n_items", n_items.to_string()),
                        ));
                    }
                    if other == item {
                        return Err(MallowsError::Constraint(
                            ErrorInfo::new("self-comparison", "an item cannot constrain itself")
                                .with_context("item", item.to_string()),
                        ));
                    }
                }
            }
        }
        for (item, preceding) in above.iter().enumerate() {
            for &better in preceding {
                if !below[better].contains(&item) {
                    return Err(MallowsError::Constraint(
                        ErrorInfo::new("mismatched-views", "above and below views disagree")
                            .with_context("item", item.to_string())
                            .with_context("claimed_above", better.to_string()),
                    ));
                }
            }
        }
        for (item, following) in below.iter().enumerate() {
            for &worse in following {
                if !above[worse].contains(&item) {
                    return Err(MallowsError::Constraint(
                        ErrorInfo::new("mismatched-views", "above and below views disagree")
                            .with_context("item", item.to_string())
                            .with_context("claimed_below", worse.to_string()),
                    ));
                }
            }
        }

        let set = Self {
            n_items,
            above,
            below,
        };
        // Kahn's algorithm doubles as the acyclicity check.
        if set.topological_order(None).is_none() {
            return Err(MallowsError::Constraint(
                ErrorInfo::new("cyclic-preferences", "constraint sets form a cycle")
                    .with_hint("check the assessor's pairwise data for contradictions"),
            ));
        }
        Ok(set)
    }

    /// Number of items the constraints range over.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Items that must be ranked better than `item`.
    pub fn items_above(&self, item: usize) -> &[usize] {
        &self.above[item]
    }

    /// Items that must be ranked worse than `item`.
    pub fn items_below(&self, item: usize) -> &[usize] {
        &self.below[item]
    }

    /// Whether any constraint mentions `item`.
    pub fn is_constrained(&self, item: usize) -> bool {
        !self.above[item].is_empty() || !self.below[item].is_empty()
    }

    /// Whether the set carries any constraint at all.
    pub fn has_constraints(&self) -> bool {
        (0..self.n_items).any(|item| self.is_constrained(item))
    }

    /// Counts stated preferences the ranking violates and satisfies.
    ///
    /// Every constrained pair is inspected from both endpoints, so a single
    /// comparison contributes two counts. Returns `(discordant, concordant)`.
    pub fn comparison_tally(&self, ranking: &Ranking) -> (usize, usize) {
        let mut discordant = 0usize;
        let mut concordant = 0usize;
        for item in 0..self.n_items {
            let rank = ranking.rank_of(item);
            for &better in &self.above[item] {
                if ranking.rank_of(better) > rank {
                    discordant += 1;
                } else {
                    concordant += 1;
                }
            }
            for &worse in &self.below[item] {
                if ranking.rank_of(worse) < rank {
                    discordant += 1;
                } else {
                    concordant += 1;
                }
            }
        }
        (discordant, concordant)
    }

    /// Draws a uniformly random linear extension of the constraints.
    ///
    /// Used to initialise an assessor's latent ranking: every stated
    /// preference holds in the returned ranking, with ties broken by the
    /// supplied randomness.
    pub fn consistent_completion(&self, rng: &mut RngHandle) -> Result<Ranking, MallowsError> {
        let order = self.topological_order(Some(rng)).ok_or_else(|| {
            MallowsError::Constraint(ErrorInfo::new(
                "cyclic-preferences",
                "constraint sets form a cycle",
            ))
        })?;
        let mut ranks = vec![0usize; self.n_items];
        for (position, item) in order.into_iter().enumerate() {
            ranks[item] = position + 1;
        }
        Ranking::new(ranks)
    }

    /// Kahn's algorithm over the precedence edges. Returns `None` on a
    /// cycle. With an rng, the next item is drawn uniformly from the ready
    /// set instead of deterministically.
    fn topological_order(&self, mut rng: Option<&mut RngHandle>) -> Option<Vec<usize>> {
        let mut remaining: Vec<usize> = self.above.iter().map(Vec::len).collect();
        let mut ready: Vec<usize> = (0..self.n_items)
            .filter(|&item| remaining[item] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.n_items);
        while !ready.is_empty() {
            let pick = match rng.as_deref_mut() {
                Some(rng) => rng.gen_range(0..ready.len()),
                None => ready.len() - 1,
            };
            let item = ready.swap_remove(pick);
            order.push(item);
            for &worse in &self.below[item] {
                remaining[worse] -= 1;
                if remaining[worse] == 0 {
                    ready.push(worse);
                }
            }
        }
        (order.len() == self.n_items).then_some(order)
    }
}
