use proptest::prelude::*;
use rand::seq::SliceRandom;

use mallows_core::{ConstraintSet, Ranking, RankingMatrix, RngHandle};
use mallows_mcmc::augment::{
    augment_pairwise, augmentation_log_ratio, sample_truncated_theta, update_shape_bernoulli,
    AugmentationContext, THETA_TRUNCATION,
};
use mallows_mcmc::ErrorModel;
use mallows_rank::Metric;

fn random_ranking(n_items: usize, rng: &mut RngHandle) -> Ranking {
    let mut ranks: Vec<usize> = (1..=n_items).collect();
    ranks.shuffle(rng);
    Ranking::new(ranks).unwrap()
}

proptest! {
    #[test]
    fn log_ratio_is_antisymmetric(
        seed in any::<u64>(),
        n_items in 3usize..9,
        metric_index in 0usize..5,
        alpha in 0.1f64..5.0,
        theta in 0.05f64..0.45,
        violation_diff in -3i64..4,
    ) {
        let mut rng = RngHandle::from_seed(seed);
        let proposal = random_ranking(n_items, &mut rng);
        let current = random_ranking(n_items, &mut rng);
        let consensus = random_ranking(n_items, &mut rng);
        let metric = Metric::ALL[metric_index];

        let forward = augmentation_log_ratio(
            &proposal, &current, &consensus, alpha, metric, theta, violation_diff,
        );
        let reverse = augmentation_log_ratio(
            &current, &proposal, &consensus, alpha, metric, theta, -violation_diff,
        );
        prop_assert!((forward + reverse).abs() < 1e-12);
    }

    #[test]
    fn zero_theta_ignores_violation_diff(
        seed in any::<u64>(),
        n_items in 3usize..9,
        violation_diff in -3i64..4,
    ) {
        let mut rng = RngHandle::from_seed(seed);
        let proposal = random_ranking(n_items, &mut rng);
        let current = random_ranking(n_items, &mut rng);
        let consensus = random_ranking(n_items, &mut rng);

        let with_diff = augmentation_log_ratio(
            &proposal, &current, &consensus, 1.0, Metric::Footrule, 0.0, violation_diff,
        );
        let without = augmentation_log_ratio(
            &proposal, &current, &consensus, 1.0, Metric::Footrule, 0.0, 0,
        );
        prop_assert_eq!(with_diff, without);
    }
}

#[test]
fn log_ratio_favours_the_closer_ranking() {
    let consensus = Ranking::identity(4);
    let near = Ranking::new(vec![1, 2, 4, 3]).unwrap();
    let far = Ranking::new(vec![4, 3, 2, 1]).unwrap();

    let ratio = augmentation_log_ratio(&near, &far, &consensus, 2.0, Metric::Footrule, 0.0, 0);
    assert!(ratio > 0.0);
}

#[test]
fn violation_term_scales_with_the_odds() {
    let ranking = Ranking::identity(3);
    let theta = 0.2f64;
    let base = augmentation_log_ratio(&ranking, &ranking, &ranking, 1.0, Metric::Kendall, theta, 0);
    let shifted =
        augmentation_log_ratio(&ranking, &ranking, &ranking, 1.0, Metric::Kendall, theta, 2);

    let odds = (theta / (1.0 - theta)).ln();
    assert!((shifted - base - 2.0 * odds).abs() < 1e-12);
}

#[test]
fn accepted_proposals_pull_rankings_toward_the_consensus() {
    let n_items = 5;
    let mut rng = RngHandle::from_seed(42);
    let start = Ranking::new(vec![5, 4, 3, 2, 1]).unwrap();
    let mut rankings = RankingMatrix::new(vec![start]).unwrap();
    let constraints = vec![ConstraintSet::unconstrained(n_items)];

    let assignments = vec![0usize];
    let alpha = vec![10.0f64];
    let rho = vec![Ranking::identity(n_items)];
    let context = AugmentationContext {
        assignments: &assignments,
        alpha: &alpha,
        rho: &rho,
        theta: 0.0,
        metric: Metric::Footrule,
        error_model: ErrorModel::None,
        swap_leap: 1,
    };

    let initial = Metric::Footrule.ranking_distance(rankings.assessor(0), &rho[0]);
    let mut acceptances = vec![0u64];
    for _ in 0..200 {
        augment_pairwise(&mut rankings, &constraints, &context, &mut acceptances, &mut rng)
            .unwrap();
    }
    let finishing = Metric::Footrule.ranking_distance(rankings.assessor(0), &rho[0]);

    assert!(acceptances[0] > 0);
    assert!(finishing < initial);
}

#[test]
fn shape_update_counts_breaks_from_both_endpoints() {
    let constraints = vec![
        ConstraintSet::from_pairs(3, &[(0, 1), (1, 2)]).unwrap(),
        ConstraintSet::from_pairs(3, &[(2, 0)]).unwrap(),
    ];
    let rankings = RankingMatrix::new(vec![
        Ranking::new(vec![1, 2, 3]).unwrap(),
        Ranking::new(vec![1, 3, 2]).unwrap(),
    ])
    .unwrap();

    // Assessor 0 honours both stated pairs plus the implied (0, 2) from
    // the closure: six concordant endpoint counts. Assessor 1 breaks its
    // single pair: two discordant endpoint counts.
    let (shape_1, shape_2) = update_shape_bernoulli(&rankings, &constraints, 1.0, 3.0);
    assert_eq!(shape_1, 1.0 + 2.0);
    assert_eq!(shape_2, 3.0 + 6.0);
}

#[test]
fn shape_update_counts_only_stored_pairs() {
    // The same chain built closure-free via from_sets stores two pairs,
    // so the honouring ranking yields four concordant endpoint counts.
    let constraints = vec![ConstraintSet::from_sets(
        vec![vec![], vec![0], vec![1]],
        vec![vec![1], vec![2], vec![]],
    )
    .unwrap()];
    let rankings = RankingMatrix::new(vec![Ranking::new(vec![1, 2, 3]).unwrap()]).unwrap();

    let (shape_1, shape_2) = update_shape_bernoulli(&rankings, &constraints, 1.0, 3.0);
    assert_eq!(shape_1, 1.0);
    assert_eq!(shape_2, 3.0 + 4.0);
}

#[test]
fn truncated_theta_stays_below_the_cap() {
    let mut rng = RngHandle::from_seed(9);
    for _ in 0..100 {
        let draw = sample_truncated_theta(1.0, 3.0, &mut rng).unwrap();
        assert!(draw > 0.0);
        assert!(draw < THETA_TRUNCATION);
    }
}

#[test]
fn saturated_shapes_clamp_below_the_cap() {
    // Beta(80, 1) mass sits almost entirely above one half.
    let mut rng = RngHandle::from_seed(9);
    let draw = sample_truncated_theta(80.0, 1.0, &mut rng).unwrap();
    assert!(draw < THETA_TRUNCATION);
    assert!(draw > 0.4);
}

#[test]
fn invalid_shapes_surface_an_error() {
    let mut rng = RngHandle::from_seed(9);
    let error = sample_truncated_theta(-1.0, 1.0, &mut rng).unwrap_err();
    assert_eq!(error.info().code, "beta-construction");
}
