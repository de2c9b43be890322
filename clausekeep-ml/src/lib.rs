//! ClauseKeep-ML: Learned-Clause Retention for CDCL Solvers
//!
//! During a reduction pass a CDCL solver must decide, for every learned
//! clause, whether to keep it or throw it away. This crate answers that
//! question with a fixed ensemble of ten pre-trained regression trees.
//!
//! # Pipeline
//!
//! - **Features**: [`FeatureVector::build`] turns a clause's usage counters
//!   plus solver-wide context into 26 numeric features
//! - **Trees**: each [`DecisionTree`] walks from its root, comparing one
//!   feature against a threshold per node, until it reaches a leaf score
//! - **Voting**: a score below [`KEEP_SCORE_THRESHOLD`] is a discard vote;
//!   [`DISCARD_VOTE_THRESHOLD`] or more discard votes remove the clause
//! - **Reduction**: [`ReducePass`] applies the verdict to a whole batch,
//!   skipping locked, time-to-live and low-glue clauses
//!
//! Loaded ensembles are immutable and shared behind an `Arc`, so any
//! number of solver threads can classify concurrently.
//!
//! # Examples
//!
//! ```rust
//! use clausekeep_ml::models::{DecisionTree, TreeEnsemble};
//! use clausekeep_ml::{ClauseStatistics, ReduceContext, RetentionClassifier, ENSEMBLE_SIZE};
//!
//! let trees = vec![DecisionTree::constant(1.5).unwrap(); ENSEMBLE_SIZE];
//! let classifier = RetentionClassifier::from_ensemble(TreeEnsemble::new(trees).unwrap());
//!
//! let stats = ClauseStatistics { size: 12, glue: 4, ..Default::default() };
//! assert!(classifier.should_keep(&stats, &ReduceContext::new(20_000)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

/// Trained model implementations
pub mod models;

/// Clause features, retention verdicts and reduction passes
pub mod clause_learning;

// Re-export commonly used types
pub use clause_learning::{
    ClauseId, ClauseStatistics, Feature, FeatureVector, Protection, ReduceCandidate, ReduceConfig,
    ReduceContext, ReduceOutcome, ReducePass, RetentionClassifier, SolverAverages, Verdict,
};
pub use models::{DecisionTree, EnsembleVote, Model, ModelError, ModelResult, TreeEnsemble, Vote};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of trees in a retention parameter set
pub const ENSEMBLE_SIZE: usize = 10;

/// Discard votes needed to remove a clause
pub const DISCARD_VOTE_THRESHOLD: usize = 5;

/// Tree scores below this vote to discard
pub const KEEP_SCORE_THRESHOLD: f64 = 1.0;

/// Length of a clause feature vector
pub const NUM_FEATURES: usize = 26;

/// Counters for retention decisions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetentionStats {
    /// Clauses offered to a pass
    pub candidates: usize,
    /// Clauses that went through the ensemble
    pub evaluated: usize,
    /// Evaluated clauses kept
    pub kept: usize,
    /// Evaluated clauses discarded
    pub discarded: usize,
    /// Kept because locked as a reason
    pub protected_locked: usize,
    /// Kept because of the time-to-live flag
    pub protected_ttl: usize,
    /// Kept because of low glue
    pub protected_glue: usize,
    /// Sum of discard votes over evaluated clauses
    pub discard_votes_total: usize,
    /// Passes recorded
    pub passes: usize,
    /// Total pass time (microseconds)
    pub total_time_us: u64,
}

impl RetentionStats {
    /// Record one ensemble verdict
    pub fn record_verdict(&mut self, verdict: &Verdict) {
        self.evaluated += 1;
        self.discard_votes_total += verdict.discard_votes;
        if verdict.keep {
            self.kept += 1;
        } else {
            self.discarded += 1;
        }
    }

    /// Record a clause kept without evaluation
    pub fn record_protected(&mut self, reason: Protection) {
        match reason {
            Protection::Locked => self.protected_locked += 1,
            Protection::Ttl => self.protected_ttl += 1,
            Protection::LowGlue => self.protected_glue += 1,
        }
    }

    /// Record the wall time of one pass
    pub fn record_pass_time(&mut self, time_us: u64) {
        self.passes += 1;
        self.total_time_us += time_us;
    }

    /// Fraction of evaluated clauses that were discarded
    pub fn discard_ratio(&self) -> f64 {
        if self.evaluated == 0 {
            0.0
        } else {
            self.discarded as f64 / self.evaluated as f64
        }
    }

    /// Mean discard votes per evaluated clause
    pub fn avg_discard_votes(&self) -> f64 {
        if self.evaluated == 0 {
            0.0
        } else {
            self.discard_votes_total as f64 / self.evaluated as f64
        }
    }

    /// Accumulate another tally into this one
    pub fn merge(&mut self, other: &RetentionStats) {
        self.candidates += other.candidates;
        self.evaluated += other.evaluated;
        self.kept += other.kept;
        self.discarded += other.discarded;
        self.protected_locked += other.protected_locked;
        self.protected_ttl += other.protected_ttl;
        self.protected_glue += other.protected_glue;
        self.discard_votes_total += other.discard_votes_total;
        self.passes += other.passes;
        self.total_time_us += other.total_time_us;
    }

    /// Reset all statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
