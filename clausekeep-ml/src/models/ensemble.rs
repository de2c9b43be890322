//! Tree Ensemble
//!
//! Ten independently trained trees evaluated on the same feature vector.
//! Each tree casts one unweighted vote; the clause is discarded once
//! [`DISCARD_VOTE_THRESHOLD`] trees vote to discard it.

use super::{DecisionTree, Model, ModelError, ModelResult};
use crate::clause_learning::FeatureVector;
use crate::{DISCARD_VOTE_THRESHOLD, ENSEMBLE_SIZE, KEEP_SCORE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// One tree's opinion about a clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vote {
    /// Score at or above [`KEEP_SCORE_THRESHOLD`]
    Keep,
    /// Score below [`KEEP_SCORE_THRESHOLD`]
    Discard,
}

impl Vote {
    /// Convert a tree score into a vote.
    ///
    /// Leaf values are usage ratios, not probabilities, so the cut is at 1.0.
    #[inline]
    pub fn from_score(score: f64) -> Self {
        if score < KEEP_SCORE_THRESHOLD {
            Vote::Discard
        } else {
            Vote::Keep
        }
    }
}

/// Result of running every tree of the ensemble on one feature vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleVote {
    /// Raw score of each tree, in ensemble order
    pub scores: [f64; ENSEMBLE_SIZE],
    /// Number of trees voting to discard
    pub discard_votes: usize,
}

impl EnsembleVote {
    /// Tally votes from per-tree scores
    pub fn from_scores(scores: [f64; ENSEMBLE_SIZE]) -> Self {
        let discard_votes = scores
            .iter()
            .filter(|&&s| Vote::from_score(s) == Vote::Discard)
            .count();
        Self {
            scores,
            discard_votes,
        }
    }

    /// Per-tree votes, in ensemble order
    pub fn votes(&self) -> impl Iterator<Item = Vote> + '_ {
        self.scores.iter().map(|&s| Vote::from_score(s))
    }

    /// Majority decision; a 5/5 tie discards
    #[inline]
    pub fn should_keep(&self) -> bool {
        self.discard_votes < DISCARD_VOTE_THRESHOLD
    }
}

#[derive(Deserialize)]
struct EnsembleRepr {
    trees: Vec<DecisionTree>,
}

impl TryFrom<EnsembleRepr> for TreeEnsemble {
    type Error = ModelError;

    fn try_from(repr: EnsembleRepr) -> ModelResult<Self> {
        TreeEnsemble::new(repr.trees)
    }
}

/// Fixed-size collection of trained trees sharing one feature schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EnsembleRepr")]
pub struct TreeEnsemble {
    trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    /// Create an ensemble; exactly [`ENSEMBLE_SIZE`] trees are required
    pub fn new(trees: Vec<DecisionTree>) -> ModelResult<Self> {
        if trees.len() != ENSEMBLE_SIZE {
            return Err(ModelError::EnsembleSize {
                expected: ENSEMBLE_SIZE,
                got: trees.len(),
            });
        }
        Ok(Self { trees })
    }

    /// The trees, in voting order
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Total node count across all trees
    pub fn num_nodes(&self) -> usize {
        self.trees.iter().map(|t| t.num_parameters()).sum()
    }

    /// Deepest tree in the ensemble
    pub fn max_depth(&self) -> usize {
        self.trees
            .iter()
            .map(|t| t.info().max_depth)
            .max()
            .unwrap_or(0)
    }

    /// Evaluate every tree and tally the votes.
    ///
    /// All trees run on every call; there is no early exit once the
    /// majority is settled.
    pub fn evaluate(&self, features: &FeatureVector) -> EnsembleVote {
        let mut scores = [0.0; ENSEMBLE_SIZE];
        for (slot, tree) in scores.iter_mut().zip(&self.trees) {
            *slot = Model::score(tree, features);
        }
        EnsembleVote::from_scores(scores)
    }

    /// Parse a parameter set from JSON bytes
    pub fn from_json_slice(data: &[u8]) -> ModelResult<Self> {
        serde_json::from_slice(data).map_err(|e| ModelError::SerializationError(e.to_string()))
    }

    /// Load a parameter set from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let data =
            fs::read(path).map_err(|e| ModelError::Io(format!("{}: {}", path.display(), e)))?;
        let ensemble = Self::from_json_slice(&data)?;
        info!(
            path = %path.display(),
            trees = ensemble.trees.len(),
            nodes = ensemble.num_nodes(),
            max_depth = ensemble.max_depth(),
            "loaded retention parameter set"
        );
        Ok(ensemble)
    }

    /// Serialize the parameter set as pretty-printed JSON
    pub fn to_json(&self) -> ModelResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ModelError::SerializationError(e.to_string()))
    }
}
