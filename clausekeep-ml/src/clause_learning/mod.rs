//! Learned-Clause Retention
//!
//! Feature derivation, the per-clause keep/discard verdict, and the
//! reduction pass that applies it to a batch of learned clauses.

mod features;
mod reduce_pass;
mod retention;

pub use features::{ClauseStatistics, Feature, FeatureVector, ReduceContext, SolverAverages};
pub use reduce_pass::{Protection, ReduceCandidate, ReduceConfig, ReduceOutcome, ReducePass};
pub use retention::{RetentionClassifier, Verdict};

/// Clause ID type
pub type ClauseId = usize;
