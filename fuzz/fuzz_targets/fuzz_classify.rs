//! Fuzz target for clause classification
//!
//! Builds random clause statistics and solver context and checks that the
//! derived features stay finite and the verdict agrees with its own tally.

#![no_main]

use arbitrary::Arbitrary;
use clausekeep_ml::models::{DecisionNode, DecisionTree, TreeEnsemble};
use clausekeep_ml::{
    ClauseStatistics, DISCARD_VOTE_THRESHOLD, ENSEMBLE_SIZE, Feature, FeatureVector,
    ReduceContext, RetentionClassifier, SolverAverages,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    size: u32,
    glue: u32,
    used: u64,
    rdb1_used: u64,
    sum_uip1_used: u64,
    sum_delta: u64,
    introduced: u64,
    sum_conflicts: u64,
    last_touched_diff: u64,
    act_ranking: u32,
    act_ranking_top_10: u32,
    overlap: u32,
    antecedents: u32,
    antec_lits: u32,
    averages: [u16; 6],
    leaves: [u8; ENSEMBLE_SIZE],
    split_feature: u8,
}

fuzz_target!(|input: Input| {
    let stats = ClauseStatistics {
        size: input.size,
        glue: input.glue,
        used_for_uip_creation: input.used,
        rdb1_used_for_uip_creation: input.rdb1_used,
        sum_uip1_used: input.sum_uip1_used,
        sum_delta_confl_uip1_used: input.sum_delta,
        introduced_at_conflict: input.introduced,
        num_overlap_literals: input.overlap,
        num_antecedents: input.antecedents,
        num_total_lits_antecedents: input.antec_lits,
        ..Default::default()
    };
    let [gq, gl, sz, ov, na, an] = input.averages.map(f64::from);
    let ctx = ReduceContext::new(input.sum_conflicts)
        .with_rankings(
            input.last_touched_diff,
            input.act_ranking,
            input.act_ranking_top_10,
        )
        .with_averages(SolverAverages {
            glue_hist_queue: gq,
            glue_hist_long: gl,
            size_hist: sz,
            overlap_hist: ov,
            num_antecedents_hist: na,
            antec_sum_size_hist: an,
        });

    let features = FeatureVector::build(&stats, &ctx);
    assert!(features.as_slice().iter().all(|v| v.is_finite()));

    let feature = Feature::ALL[usize::from(input.split_feature) % Feature::ALL.len()];
    let trees = input
        .leaves
        .iter()
        .map(|&leaf| {
            let value = f64::from(leaf) / 64.0;
            let nodes = vec![
                DecisionNode::Split {
                    feature,
                    threshold: f64::from(leaf),
                    le: 1,
                    gt: 2,
                },
                DecisionNode::Leaf { value },
                DecisionNode::Leaf { value: value * 2.0 },
            ];
            DecisionTree::new(nodes, 0).unwrap()
        })
        .collect();
    let classifier = RetentionClassifier::from_ensemble(TreeEnsemble::new(trees).unwrap());

    let verdict = classifier.classify(&stats, &ctx);
    let discards = verdict.scores.iter().filter(|&&s| s < 1.0).count();
    assert_eq!(verdict.discard_votes, discards);
    assert_eq!(verdict.keep, discards < DISCARD_VOTE_THRESHOLD);
});
