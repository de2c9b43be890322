//! Clause Retention Classifier
//!
//! Public entry point the solver calls once per learned clause during a
//! reduction pass.

use super::{ClauseStatistics, FeatureVector, ReduceContext};
use crate::ENSEMBLE_SIZE;
use crate::models::TreeEnsemble;
use std::sync::Arc;
use tracing::trace;

/// Outcome of classifying one clause
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// Keep the clause?
    pub keep: bool,
    /// Trees that voted to discard
    pub discard_votes: usize,
    /// Individual tree scores, in ensemble order
    pub scores: [f64; ENSEMBLE_SIZE],
}

/// Predicts whether a learned clause survives a reduction pass
///
/// Holds only a shared reference to an immutable ensemble, so clones are
/// cheap and concurrent calls from several threads need no locking.
#[derive(Debug, Clone)]
pub struct RetentionClassifier {
    ensemble: Arc<TreeEnsemble>,
}

impl RetentionClassifier {
    /// Create a classifier over a loaded ensemble
    pub fn new(ensemble: Arc<TreeEnsemble>) -> Self {
        Self { ensemble }
    }

    /// Create a classifier that owns its ensemble
    pub fn from_ensemble(ensemble: TreeEnsemble) -> Self {
        Self::new(Arc::new(ensemble))
    }

    /// The underlying ensemble
    pub fn ensemble(&self) -> &TreeEnsemble {
        &self.ensemble
    }

    /// Classify an already-built feature vector
    pub fn classify_features(&self, features: &FeatureVector) -> Verdict {
        let vote = self.ensemble.evaluate(features);
        Verdict {
            keep: vote.should_keep(),
            discard_votes: vote.discard_votes,
            scores: vote.scores,
        }
    }

    /// Build the feature vector for a clause and classify it
    pub fn classify(&self, stats: &ClauseStatistics, ctx: &ReduceContext) -> Verdict {
        let features = FeatureVector::build(stats, ctx);
        let verdict = self.classify_features(&features);
        trace!(
            keep = verdict.keep,
            discard_votes = verdict.discard_votes,
            size = stats.size,
            glue = stats.glue,
            "clause classified"
        );
        verdict
    }

    /// `true` to keep the clause, `false` to discard it
    pub fn should_keep(&self, stats: &ClauseStatistics, ctx: &ReduceContext) -> bool {
        self.classify(stats, ctx).keep
    }

    /// Keep/discard from the conflict count and the three ranking scalars,
    /// with all solver averages taken as zero
    pub fn should_keep_with(
        &self,
        stats: &ClauseStatistics,
        sum_conflicts: u64,
        last_touched_diff: u64,
        act_ranking: u32,
        act_ranking_top_10: u32,
    ) -> bool {
        let ctx = ReduceContext::new(sum_conflicts).with_rankings(
            last_touched_diff,
            act_ranking,
            act_ranking_top_10,
        );
        self.should_keep(stats, &ctx)
    }
}
