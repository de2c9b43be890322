//! Clause Feature Derivation
//!
//! Turn one clause's raw usage counters plus solver-wide context into the
//! fixed feature layout the trained trees were built against.

use crate::NUM_FEATURES;
use crate::models::ModelError;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// Feature slots, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    /// Clause length
    Size,
    /// Literal block distance
    Glue,
    /// Glue over the recent-queue glue average
    GlueRelQueue,
    /// Glue over the long-term glue average
    GlueRelLong,
    /// Size over the average learned-clause size
    SizeRel,
    /// Times used to derive a 1st-UIP clause
    UsedForUipCreation,
    /// Same counter at the previous reduction pass
    Rdb1UsedForUipCreation,
    /// 1 if the clause was used more than at the previous pass
    RdbRelUsedForUipCreation,
    /// Cumulative 1st-UIP uses
    SumUip1Used,
    /// Conflicts elapsed while accumulating `SumUip1Used`
    SumDeltaConflUip1Used,
    /// `sum_uip1_used / sum_delta_confl_uip1_used`
    Rdb0AvgConfl,
    /// Conflicts since the clause was learned
    TimeInsideSolver,
    /// `sum_uip1_used / time_inside_solver`
    Rdb0UsedPerConfl,
    /// Reduction passes survived
    DumpNumber,
    /// Conflicts since last touched
    LastTouchedDiff,
    /// `LastTouchedDiff` at the previous pass
    Rdb1LastTouchedDiff,
    /// Activity rank among learned clauses
    ActRanking,
    /// `ActRanking` at the previous pass
    Rdb1ActRanking,
    /// 1-based decile of the activity rank
    ActRankingTop10,
    /// `ActRankingTop10` at the previous pass
    Rdb1ActRankingTop10,
    /// Glue variance of the long redundant antecedents
    AntecedentsGlueLongRedsVar,
    /// Literals shared with the antecedents
    NumOverlapLiterals,
    /// Overlap over its running average
    NumOverlapLiteralsRel,
    /// Antecedent count over its running average
    NumAntecedentsRel,
    /// Total literals across all antecedents
    NumTotalLitsAntecedents,
    /// Antecedent literal total over its running average
    AntecNumTotalLitsRel,
}

impl Feature {
    /// Every feature, in vector order
    pub const ALL: [Feature; NUM_FEATURES] = [
        Feature::Size,
        Feature::Glue,
        Feature::GlueRelQueue,
        Feature::GlueRelLong,
        Feature::SizeRel,
        Feature::UsedForUipCreation,
        Feature::Rdb1UsedForUipCreation,
        Feature::RdbRelUsedForUipCreation,
        Feature::SumUip1Used,
        Feature::SumDeltaConflUip1Used,
        Feature::Rdb0AvgConfl,
        Feature::TimeInsideSolver,
        Feature::Rdb0UsedPerConfl,
        Feature::DumpNumber,
        Feature::LastTouchedDiff,
        Feature::Rdb1LastTouchedDiff,
        Feature::ActRanking,
        Feature::Rdb1ActRanking,
        Feature::ActRankingTop10,
        Feature::Rdb1ActRankingTop10,
        Feature::AntecedentsGlueLongRedsVar,
        Feature::NumOverlapLiterals,
        Feature::NumOverlapLiteralsRel,
        Feature::NumAntecedentsRel,
        Feature::NumTotalLitsAntecedents,
        Feature::AntecNumTotalLitsRel,
    ];

    /// Position of this feature in a [`FeatureVector`]
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Feature at position `index`
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Name used by the training data and in serialized trees
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Size => "size",
            Feature::Glue => "glue",
            Feature::GlueRelQueue => "glue_rel_queue",
            Feature::GlueRelLong => "glue_rel_long",
            Feature::SizeRel => "size_rel",
            Feature::UsedForUipCreation => "used_for_uip_creation",
            Feature::Rdb1UsedForUipCreation => "rdb1_used_for_uip_creation",
            Feature::RdbRelUsedForUipCreation => "rdb_rel_used_for_uip_creation",
            Feature::SumUip1Used => "sum_uip1_used",
            Feature::SumDeltaConflUip1Used => "sum_delta_confl_uip1_used",
            Feature::Rdb0AvgConfl => "rdb0_avg_confl",
            Feature::TimeInsideSolver => "time_inside_solver",
            Feature::Rdb0UsedPerConfl => "rdb0_used_per_confl",
            Feature::DumpNumber => "dump_number",
            Feature::LastTouchedDiff => "last_touched_diff",
            Feature::Rdb1LastTouchedDiff => "rdb1_last_touched_diff",
            Feature::ActRanking => "act_ranking",
            Feature::Rdb1ActRanking => "rdb1_act_ranking",
            Feature::ActRankingTop10 => "act_ranking_top_10",
            Feature::Rdb1ActRankingTop10 => "rdb1_act_ranking_top_10",
            Feature::AntecedentsGlueLongRedsVar => "antecedents_glue_long_reds_var",
            Feature::NumOverlapLiterals => "num_overlap_literals",
            Feature::NumOverlapLiteralsRel => "num_overlap_literals_rel",
            Feature::NumAntecedentsRel => "num_antecedents_rel",
            Feature::NumTotalLitsAntecedents => "num_total_lits_antecedents",
            Feature::AntecNumTotalLitsRel => "antec_num_total_lits_rel",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| ModelError::UnknownFeature(s.to_string()))
    }
}

impl Serialize for Feature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Feature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// Raw per-clause counters, as tracked by the solver
///
/// Read-only input; the engine never keeps a reference past one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClauseStatistics {
    /// Number of literals
    pub size: u32,
    /// Current glue (LBD)
    pub glue: u32,
    /// 1st-UIP derivations this clause took part in
    pub used_for_uip_creation: u64,
    /// `used_for_uip_creation` snapshot from the previous pass
    pub rdb1_used_for_uip_creation: u64,
    /// Cumulative 1st-UIP uses
    pub sum_uip1_used: u64,
    /// Conflicts elapsed while accumulating `sum_uip1_used`
    pub sum_delta_confl_uip1_used: u64,
    /// Conflict count when the clause was learned
    pub introduced_at_conflict: u64,
    /// Reduction passes survived
    pub dump_number: u32,
    /// `last_touched_diff` at the previous pass
    pub rdb1_last_touched_diff: u64,
    /// `act_ranking` at the previous pass
    pub rdb1_act_ranking: u32,
    /// `act_ranking_top_10` at the previous pass
    pub rdb1_act_ranking_top_10: u32,
    /// Glue variance over the long redundant antecedents
    pub antecedents_glue_long_reds_var: f64,
    /// Literals shared with the antecedents
    pub num_overlap_literals: u32,
    /// Number of antecedents in the derivation
    pub num_antecedents: u32,
    /// Total literal count across antecedents
    pub num_total_lits_antecedents: u32,
}

/// Solver-wide running averages used as denominators for "rel" features
///
/// These drift between reduction passes, so they are passed in on every
/// call instead of being stored next to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverAverages {
    /// Recent-queue glue average
    pub glue_hist_queue: f64,
    /// Long-term glue average
    pub glue_hist_long: f64,
    /// Learned-clause size average
    pub size_hist: f64,
    /// Antecedent overlap average
    pub overlap_hist: f64,
    /// Antecedent count average
    pub num_antecedents_hist: f64,
    /// Antecedent literal-total average
    pub antec_sum_size_hist: f64,
}

/// Per-call solver context
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceContext {
    /// Total conflicts so far
    pub sum_conflicts: u64,
    /// Conflicts since the clause was last touched
    pub last_touched_diff: u64,
    /// Activity rank of the clause
    pub act_ranking: u32,
    /// Activity decile of the clause
    pub act_ranking_top_10: u32,
    /// Solver-wide denominators
    pub averages: SolverAverages,
}

impl ReduceContext {
    /// Context with the given conflict count and everything else zero
    pub fn new(sum_conflicts: u64) -> Self {
        Self {
            sum_conflicts,
            ..Self::default()
        }
    }

    /// Set the three ranking/recency scalars
    pub fn with_rankings(
        mut self,
        last_touched_diff: u64,
        act_ranking: u32,
        act_ranking_top_10: u32,
    ) -> Self {
        self.last_touched_diff = last_touched_diff;
        self.act_ranking = act_ranking;
        self.act_ranking_top_10 = act_ranking_top_10;
        self
    }

    /// Set the solver-wide averages
    pub fn with_averages(mut self, averages: SolverAverages) -> Self {
        self.averages = averages;
        self
    }
}

/// `num / den`, or 0 when the denominator is exactly 0 (training convention)
#[inline]
fn guarded_ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

/// Complete feature vector for one clause
///
/// Built fresh for every classification and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; NUM_FEATURES],
}

impl FeatureVector {
    /// Derive all features from clause counters and solver context
    pub fn build(stats: &ClauseStatistics, ctx: &ReduceContext) -> Self {
        let avg = &ctx.averages;
        let time_inside_solver =
            ctx.sum_conflicts.saturating_sub(stats.introduced_at_conflict) as f64;
        let sum_uip1_used = stats.sum_uip1_used as f64;

        let mut values = [0.0; NUM_FEATURES];
        let mut set = |f: Feature, v: f64| values[f.index()] = v;

        set(Feature::Size, f64::from(stats.size));
        set(Feature::Glue, f64::from(stats.glue));
        set(
            Feature::GlueRelQueue,
            guarded_ratio(f64::from(stats.glue), avg.glue_hist_queue),
        );
        set(
            Feature::GlueRelLong,
            guarded_ratio(f64::from(stats.glue), avg.glue_hist_long),
        );
        set(
            Feature::SizeRel,
            guarded_ratio(f64::from(stats.size), avg.size_hist),
        );
        set(Feature::UsedForUipCreation, stats.used_for_uip_creation as f64);
        set(
            Feature::Rdb1UsedForUipCreation,
            stats.rdb1_used_for_uip_creation as f64,
        );
        set(
            Feature::RdbRelUsedForUipCreation,
            if stats.used_for_uip_creation > stats.rdb1_used_for_uip_creation {
                1.0
            } else {
                0.0
            },
        );
        set(Feature::SumUip1Used, sum_uip1_used);
        set(
            Feature::SumDeltaConflUip1Used,
            stats.sum_delta_confl_uip1_used as f64,
        );
        set(
            Feature::Rdb0AvgConfl,
            guarded_ratio(sum_uip1_used, stats.sum_delta_confl_uip1_used as f64),
        );
        set(Feature::TimeInsideSolver, time_inside_solver);
        set(
            Feature::Rdb0UsedPerConfl,
            guarded_ratio(sum_uip1_used, time_inside_solver),
        );
        set(Feature::DumpNumber, f64::from(stats.dump_number));
        set(Feature::LastTouchedDiff, ctx.last_touched_diff as f64);
        set(
            Feature::Rdb1LastTouchedDiff,
            stats.rdb1_last_touched_diff as f64,
        );
        set(Feature::ActRanking, f64::from(ctx.act_ranking));
        set(Feature::Rdb1ActRanking, f64::from(stats.rdb1_act_ranking));
        set(Feature::ActRankingTop10, f64::from(ctx.act_ranking_top_10));
        set(
            Feature::Rdb1ActRankingTop10,
            f64::from(stats.rdb1_act_ranking_top_10),
        );
        set(
            Feature::AntecedentsGlueLongRedsVar,
            stats.antecedents_glue_long_reds_var,
        );
        set(
            Feature::NumOverlapLiterals,
            f64::from(stats.num_overlap_literals),
        );
        set(
            Feature::NumOverlapLiteralsRel,
            guarded_ratio(f64::from(stats.num_overlap_literals), avg.overlap_hist),
        );
        set(
            Feature::NumAntecedentsRel,
            guarded_ratio(f64::from(stats.num_antecedents), avg.num_antecedents_hist),
        );
        set(
            Feature::NumTotalLitsAntecedents,
            f64::from(stats.num_total_lits_antecedents),
        );
        set(
            Feature::AntecNumTotalLitsRel,
            guarded_ratio(
                f64::from(stats.num_total_lits_antecedents),
                avg.antec_sum_size_hist,
            ),
        );

        Self { values }
    }

    /// Wrap precomputed values (replaying recorded vectors)
    pub fn from_values(values: [f64; NUM_FEATURES]) -> Self {
        Self { values }
    }

    /// Copy of this vector with one feature replaced
    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.values[feature.index()] = value;
        self
    }

    /// Value of one feature
    #[inline]
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// All values, in [`Feature::ALL`] order
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f64;

    #[inline]
    fn index(&self, feature: Feature) -> &f64 {
        &self.values[feature.index()]
    }
}
