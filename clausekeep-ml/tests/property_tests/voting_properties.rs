//! Property-based tests for ensemble voting
//!
//! Tests:
//! - A clause is discarded exactly when five or more trees score below 1.0
//! - Tree order does not change the decision
//! - Per-tree scores come back in ensemble order

use super::{arb_features, arb_shape};
use clausekeep_ml::models::{DecisionTree, EnsembleVote, TreeEnsemble, Vote};
use clausekeep_ml::{DISCARD_VOTE_THRESHOLD, ENSEMBLE_SIZE, FeatureVector, NUM_FEATURES};
use proptest::prelude::*;

fn arb_leaf_scores() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        prop_oneof![0.0f64..1.0, 1.0f64..6.0, Just(1.0)],
        ENSEMBLE_SIZE,
    )
}

fn constant_ensemble(scores: &[f64]) -> TreeEnsemble {
    let trees = scores
        .iter()
        .map(|&s| DecisionTree::constant(s).unwrap())
        .collect();
    TreeEnsemble::new(trees).unwrap()
}

proptest! {
    /// k discard votes out of ten: keep iff k < 5
    #[test]
    fn majority_rule(scores in arb_leaf_scores()) {
        let k = scores.iter().filter(|&&s| s < 1.0).count();
        let zero = FeatureVector::from_values([0.0; NUM_FEATURES]);
        let vote = constant_ensemble(&scores).evaluate(&zero);

        prop_assert_eq!(vote.discard_votes, k);
        prop_assert_eq!(vote.should_keep(), k < DISCARD_VOTE_THRESHOLD);
        prop_assert_eq!(vote.scores.to_vec(), scores);
    }

    /// Shuffling the trees changes score order but never the decision
    #[test]
    fn order_independent(scores in arb_leaf_scores(), rotate in 0..ENSEMBLE_SIZE) {
        let zero = FeatureVector::from_values([0.0; NUM_FEATURES]);
        let mut rotated = scores.clone();
        rotated.rotate_left(rotate);

        let a = constant_ensemble(&scores).evaluate(&zero);
        let b = constant_ensemble(&rotated).evaluate(&zero);
        prop_assert_eq!(a.discard_votes, b.discard_votes);
        prop_assert_eq!(a.should_keep(), b.should_keep());
    }

    /// Random trees: the tally matches the individual votes
    #[test]
    fn tally_matches_votes(
        shapes in prop::collection::vec(arb_shape(), ENSEMBLE_SIZE),
        features in arb_features(),
    ) {
        let trees: Vec<DecisionTree> = shapes.iter().map(|s| s.build()).collect();
        let ensemble = TreeEnsemble::new(trees.clone()).unwrap();
        let vote = ensemble.evaluate(&features);

        for (tree, &score) in trees.iter().zip(vote.scores.iter()) {
            prop_assert_eq!(tree.score(&features), score);
        }
        let discards = vote.votes().filter(|&v| v == Vote::Discard).count();
        prop_assert_eq!(discards, vote.discard_votes);
        prop_assert_eq!(EnsembleVote::from_scores(vote.scores), vote);
    }
}
