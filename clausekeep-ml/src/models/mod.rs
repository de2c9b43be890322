//! Core Model Implementations
//!
//! This module provides the trained-model side of clause retention:
//! - Regression trees stored as flat node arenas
//! - A fixed-size ensemble that turns per-tree scores into keep/discard votes
//!
//! All models are designed for:
//! - Allocation-free inference on the reduction hot path
//! - Immutability after loading (safe to share across threads)
//! - Validated serialization/deserialization
//! - Pure Rust implementation

pub mod decision_tree;
pub mod ensemble;

pub use decision_tree::{DecisionNode, DecisionTree, NodeId, TreeBuilder, TreeInfo};
pub use ensemble::{EnsembleVote, TreeEnsemble, Vote};

use crate::clause_learning::FeatureVector;

/// Common trait for all trained models
pub trait Model {
    /// Input feature dimension
    fn input_dim(&self) -> usize;

    /// Evaluate the model on one feature vector
    fn score(&self, features: &FeatureVector) -> f64;

    /// Number of stored parameters (nodes for trees)
    fn num_parameters(&self) -> usize;

    /// Save model to bytes
    fn save(&self) -> ModelResult<Vec<u8>>;

    /// Load model from bytes, validating its structure
    fn load(data: &[u8]) -> ModelResult<Self>
    where
        Self: Sized;
}

/// Model construction and loading errors
///
/// Evaluation never fails; every variant here comes from building or
/// loading a parameter set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Invalid tree structure
    #[error("Invalid tree structure: {0}")]
    InvalidTree(String),

    /// Wrong number of trees in an ensemble
    #[error("Ensemble size mismatch: expected {expected} trees, got {got}")]
    EnsembleSize {
        /// Required number of trees
        expected: usize,
        /// Number of trees supplied
        got: usize,
    },

    /// Feature name not known to this engine
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Reading a parameter set from disk failed
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
