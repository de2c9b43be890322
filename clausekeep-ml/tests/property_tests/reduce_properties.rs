//! Property-based tests for reduction passes
//!
//! Tests:
//! - Protected clauses are never removed
//! - Removed ids keep input order and agree with the classifier
//! - Pass counters add up to the number of candidates

use super::{arb_shape, arb_stats};
use clausekeep_ml::models::{DecisionTree, TreeEnsemble};
use clausekeep_ml::{
    ENSEMBLE_SIZE, ReduceCandidate, ReduceConfig, ReduceContext, ReducePass, RetentionClassifier,
    SolverAverages,
};
use proptest::prelude::*;

fn arb_candidates() -> impl Strategy<Value = Vec<ReduceCandidate>> {
    prop::collection::vec(
        (arb_stats(), 0u64..40_000, 0u32..5_000, 0u32..10, any::<bool>(), any::<bool>()),
        0..64,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(id, (stats, touched, rank, top10, locked, ttl))| ReduceCandidate {
                id,
                stats,
                last_touched_diff: touched,
                act_ranking: rank,
                act_ranking_top_10: top10,
                locked,
                ttl,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn pass_respects_protection_and_order(
        shapes in prop::collection::vec(arb_shape(), ENSEMBLE_SIZE),
        candidates in arb_candidates(),
        sum_conflicts in 0u64..200_000,
        parallel in any::<bool>(),
    ) {
        let trees: Vec<DecisionTree> = shapes.iter().map(|s| s.build()).collect();
        let classifier = RetentionClassifier::from_ensemble(TreeEnsemble::new(trees).unwrap());
        let config = ReduceConfig {
            parallel,
            min_parallel_batch: 8,
            ..Default::default()
        };
        let glue_must_keep = config.glue_must_keep;
        let pass = ReducePass::new(classifier.clone(), config);
        let averages = SolverAverages::default();

        let outcome = pass.run(&candidates, sum_conflicts, &averages);

        let expected: Vec<usize> = candidates
            .iter()
            .filter(|c| !c.locked && !c.ttl && c.stats.glue > glue_must_keep)
            .filter(|c| {
                let ctx = ReduceContext::new(sum_conflicts)
                    .with_rankings(c.last_touched_diff, c.act_ranking, c.act_ranking_top_10);
                !classifier.should_keep(&c.stats, &ctx)
            })
            .map(|c| c.id)
            .collect();
        prop_assert_eq!(&outcome.to_remove, &expected);

        let s = &outcome.stats;
        prop_assert_eq!(s.candidates, candidates.len());
        prop_assert_eq!(
            s.evaluated + s.protected_locked + s.protected_ttl + s.protected_glue,
            candidates.len()
        );
        prop_assert_eq!(s.kept + s.discarded, s.evaluated);
        prop_assert_eq!(s.discarded, outcome.to_remove.len());
    }
}
