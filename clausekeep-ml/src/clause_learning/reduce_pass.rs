//! Reduction Pass Driver
//!
//! Runs the retention classifier over one sweep of the learned-clause
//! database. Clauses the solver must keep regardless (locked as a reason,
//! protected by time-to-live, or low glue) never reach the model.

use super::{
    ClauseId, ClauseStatistics, ReduceContext, RetentionClassifier, SolverAverages, Verdict,
};
use crate::RetentionStats;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Why a clause was kept without consulting the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protection {
    /// Clause is the reason for a current assignment
    Locked,
    /// Clause still has its time-to-live flag set
    Ttl,
    /// Glue at or below the must-keep bound
    LowGlue,
}

/// Reduction pass configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceConfig {
    /// Clauses with glue at or below this are always kept
    pub glue_must_keep: u32,
    /// Never remove clauses that are currently reasons
    pub keep_locked: bool,
    /// Keep clauses whose time-to-live flag is set
    pub respect_ttl: bool,
    /// Classify on the rayon pool
    pub parallel: bool,
    /// Smallest candidate count worth going parallel for
    pub min_parallel_batch: usize,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            glue_must_keep: 2,
            keep_locked: true,
            respect_ttl: true,
            parallel: true,
            min_parallel_batch: 1024,
        }
    }
}

/// One learned clause offered to a reduction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceCandidate {
    /// Solver-side handle, returned untouched in [`ReduceOutcome::to_remove`]
    pub id: ClauseId,
    /// Usage counters
    pub stats: ClauseStatistics,
    /// Conflicts since last touched
    pub last_touched_diff: u64,
    /// Activity rank
    pub act_ranking: u32,
    /// Activity decile
    pub act_ranking_top_10: u32,
    /// Clause is a reason for a current assignment
    pub locked: bool,
    /// Time-to-live flag
    pub ttl: bool,
}

/// Per-clause result inside a pass
#[derive(Debug, Clone, Copy)]
enum Decision {
    Protected(Protection),
    Classified(Verdict),
}

/// Result of one reduction pass
#[derive(Debug, Clone, Default)]
pub struct ReduceOutcome {
    /// Clauses to remove, in input order
    pub to_remove: Vec<ClauseId>,
    /// Tally for this pass
    pub stats: RetentionStats,
}

/// ML-guided reduction pass
#[derive(Debug, Clone)]
pub struct ReducePass {
    /// Retention classifier
    classifier: RetentionClassifier,
    /// Configuration
    config: ReduceConfig,
}

impl ReducePass {
    /// Create a new pass driver
    pub fn new(classifier: RetentionClassifier, config: ReduceConfig) -> Self {
        Self { classifier, config }
    }

    /// Create with default configuration
    pub fn default_config(classifier: RetentionClassifier) -> Self {
        Self::new(classifier, ReduceConfig::default())
    }

    /// Get configuration
    pub fn config(&self) -> &ReduceConfig {
        &self.config
    }

    /// Get the classifier
    pub fn classifier(&self) -> &RetentionClassifier {
        &self.classifier
    }

    fn protection(&self, candidate: &ReduceCandidate) -> Option<Protection> {
        if self.config.keep_locked && candidate.locked {
            Some(Protection::Locked)
        } else if self.config.respect_ttl && candidate.ttl {
            Some(Protection::Ttl)
        } else if candidate.stats.glue <= self.config.glue_must_keep {
            Some(Protection::LowGlue)
        } else {
            None
        }
    }

    fn decide(
        &self,
        candidate: &ReduceCandidate,
        sum_conflicts: u64,
        averages: &SolverAverages,
    ) -> Decision {
        if let Some(reason) = self.protection(candidate) {
            return Decision::Protected(reason);
        }
        let ctx = ReduceContext::new(sum_conflicts)
            .with_rankings(
                candidate.last_touched_diff,
                candidate.act_ranking,
                candidate.act_ranking_top_10,
            )
            .with_averages(*averages);
        Decision::Classified(self.classifier.classify(&candidate.stats, &ctx))
    }

    /// Decide which candidates to remove.
    ///
    /// Candidates are not modified; the caller removes the returned ids.
    pub fn run(
        &self,
        candidates: &[ReduceCandidate],
        sum_conflicts: u64,
        averages: &SolverAverages,
    ) -> ReduceOutcome {
        let start = Instant::now();

        let decisions: Vec<Decision> =
            if self.config.parallel && candidates.len() >= self.config.min_parallel_batch {
                candidates
                    .par_iter()
                    .map(|c| self.decide(c, sum_conflicts, averages))
                    .collect()
            } else {
                candidates
                    .iter()
                    .map(|c| self.decide(c, sum_conflicts, averages))
                    .collect()
            };

        let mut outcome = ReduceOutcome::default();
        outcome.stats.candidates = candidates.len();
        for (candidate, decision) in candidates.iter().zip(&decisions) {
            match decision {
                Decision::Protected(reason) => outcome.stats.record_protected(*reason),
                Decision::Classified(verdict) => {
                    outcome.stats.record_verdict(verdict);
                    if !verdict.keep {
                        outcome.to_remove.push(candidate.id);
                    }
                }
            }
        }
        outcome
            .stats
            .record_pass_time(start.elapsed().as_micros() as u64);

        debug!(
            candidates = outcome.stats.candidates,
            evaluated = outcome.stats.evaluated,
            removed = outcome.stats.discarded,
            locked = outcome.stats.protected_locked,
            ttl = outcome.stats.protected_ttl,
            low_glue = outcome.stats.protected_glue,
            time_us = outcome.stats.total_time_us,
            "reduce pass finished"
        );

        outcome
    }
}
