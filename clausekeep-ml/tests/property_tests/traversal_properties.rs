//! Property-based tests for tree traversal
//!
//! Tests:
//! - Traversal agrees with a recursive reference evaluation
//! - Every traversal ends at a leaf within `max_depth + 1` visited nodes
//! - Repeated evaluation is deterministic
//! - Values exactly on a threshold take the `<=` branch

use super::{Shape, arb_features, arb_shape, arb_value};
use clausekeep_ml::models::DecisionNode;
use clausekeep_ml::{Feature, FeatureVector, Model, NUM_FEATURES};
use proptest::prelude::*;

proptest! {
    /// Arena traversal matches the recursive reference
    #[test]
    fn score_matches_reference(shape in arb_shape(), features in arb_features()) {
        let tree = shape.build();
        prop_assert_eq!(tree.score(&features), shape.eval(&features));
    }

    /// Every path ends at exactly one leaf within the depth bound
    #[test]
    fn path_ends_at_leaf(shape in arb_shape(), features in arb_features()) {
        let tree = shape.build();
        let path = tree.decision_path(&features);

        prop_assert!(!path.is_empty());
        prop_assert!(path.len() <= tree.info().max_depth + 1);
        prop_assert_eq!(path[0], tree.root());

        let (last, inner) = path.split_last().unwrap();
        prop_assert!(tree.nodes()[*last].is_leaf());
        prop_assert!(inner.iter().all(|&id| !tree.nodes()[id].is_leaf()));

        match tree.nodes()[*last] {
            DecisionNode::Leaf { value } => prop_assert_eq!(value, tree.score(&features)),
            DecisionNode::Split { .. } => prop_assert!(false),
        }
    }

    /// Same tree, same vector, same score, every time
    #[test]
    fn evaluation_is_deterministic(shape in arb_shape(), features in arb_features()) {
        let tree = shape.build();
        let first = tree.score(&features);
        for _ in 0..8 {
            prop_assert_eq!(tree.score(&features), first);
        }
        prop_assert!(first.is_finite());
        prop_assert!(first >= 0.0);
    }

    /// Trees survive a JSON round trip without changing any score
    #[test]
    fn serialized_tree_scores_identically(shape in arb_shape(), features in arb_features()) {
        let tree = shape.build();
        let bytes = tree.save().unwrap();
        let loaded = clausekeep_ml::DecisionTree::load(&bytes).unwrap();
        prop_assert_eq!(loaded.score(&features), tree.score(&features));
    }

    /// `value == threshold` takes the `<=` child; anything above takes `>`
    #[test]
    fn threshold_boundary(
        feature in 0..NUM_FEATURES,
        threshold in -1e6f64..1e6,
        base in prop::collection::vec(arb_value(), NUM_FEATURES),
    ) {
        let shape = Shape::Split(
            feature,
            threshold,
            Box::new(Shape::Leaf(0.25)),
            Box::new(Shape::Leaf(3.0)),
        );
        let tree = shape.build();
        let mut values = [0.0; NUM_FEATURES];
        values.copy_from_slice(&base);
        let f = Feature::ALL[feature];

        let on = FeatureVector::from_values(values).with(f, threshold);
        prop_assert_eq!(tree.score(&on), 0.25);

        let above = FeatureVector::from_values(values).with(f, threshold + 1e-3);
        prop_assert_eq!(tree.score(&above), 3.0);

        let nan = FeatureVector::from_values(values).with(f, f64::NAN);
        prop_assert_eq!(tree.score(&nan), 3.0);
    }
}
