//! Property-based tests for feature derivation
//!
//! Tests:
//! - Derived features are always finite, even with zero denominators
//! - Ratios over a zero denominator are exactly 0
//! - Time inside the solver never underflows

use super::arb_stats;
use clausekeep_ml::{ClauseStatistics, Feature, FeatureVector, ReduceContext, SolverAverages};
use proptest::prelude::*;

fn arb_averages() -> impl Strategy<Value = SolverAverages> {
    let avg = || prop_oneof![Just(0.0), 0.5f64..500.0];
    (avg(), avg(), avg(), avg(), avg(), avg()).prop_map(|(gq, gl, sz, ov, na, an)| SolverAverages {
        glue_hist_queue: gq,
        glue_hist_long: gl,
        size_hist: sz,
        overlap_hist: ov,
        num_antecedents_hist: na,
        antec_sum_size_hist: an,
    })
}

proptest! {
    /// No NaN or infinity ever reaches the trees
    #[test]
    fn features_are_finite(
        stats in arb_stats(),
        averages in arb_averages(),
        sum_conflicts in 0u64..300_000,
    ) {
        let ctx = ReduceContext::new(sum_conflicts).with_averages(averages);
        let v = FeatureVector::build(&stats, &ctx);
        for (i, x) in v.as_slice().iter().enumerate() {
            prop_assert!(x.is_finite(), "{} = {}", Feature::ALL[i], x);
        }
    }

    /// Zero solver averages zero out every relative feature
    #[test]
    fn zero_denominators_give_zero(stats in arb_stats(), sum_conflicts in 0u64..300_000) {
        let v = FeatureVector::build(&stats, &ReduceContext::new(sum_conflicts));
        for f in [
            Feature::GlueRelQueue,
            Feature::GlueRelLong,
            Feature::SizeRel,
            Feature::NumOverlapLiteralsRel,
            Feature::NumAntecedentsRel,
            Feature::AntecNumTotalLitsRel,
        ] {
            prop_assert_eq!(v[f], 0.0);
        }

        let no_delta = ClauseStatistics { sum_delta_confl_uip1_used: 0, ..stats };
        let v = FeatureVector::build(&no_delta, &ReduceContext::new(sum_conflicts));
        prop_assert_eq!(v[Feature::Rdb0AvgConfl], 0.0);
    }

    /// Conflict age saturates at zero and the per-conflict rate follows it
    #[test]
    fn time_inside_solver_saturates(stats in arb_stats(), sum_conflicts in 0u64..300_000) {
        let v = FeatureVector::build(&stats, &ReduceContext::new(sum_conflicts));
        let expected = sum_conflicts.saturating_sub(stats.introduced_at_conflict) as f64;
        prop_assert_eq!(v[Feature::TimeInsideSolver], expected);
        if expected == 0.0 {
            prop_assert_eq!(v[Feature::Rdb0UsedPerConfl], 0.0);
        } else {
            prop_assert_eq!(v[Feature::Rdb0UsedPerConfl], stats.sum_uip1_used as f64 / expected);
        }
    }

    /// The usage-trend flag is 1 exactly when usage grew since the last pass
    #[test]
    fn usage_trend_is_binary(stats in arb_stats()) {
        let v = FeatureVector::build(&stats, &ReduceContext::new(1));
        let grew = stats.used_for_uip_creation > stats.rdb1_used_for_uip_creation;
        prop_assert_eq!(v[Feature::RdbRelUsedForUipCreation], if grew { 1.0 } else { 0.0 });
    }

    /// Building twice from the same inputs gives identical vectors
    #[test]
    fn build_is_deterministic(stats in arb_stats(), averages in arb_averages()) {
        let ctx = ReduceContext::new(10_000)
            .with_rankings(17, 3, 1)
            .with_averages(averages);
        prop_assert_eq!(FeatureVector::build(&stats, &ctx), FeatureVector::build(&stats, &ctx));
    }
}
