//! Decision Tree Implementation
//!
//! Immutable regression trees produced by offline training.
//! Nodes live in a flat arena and are addressed by index, so evaluation is a
//! plain loop whose length is bounded by the tree depth, however skewed the
//! trained tree is.

use super::{Model, ModelError, ModelResult};
use crate::NUM_FEATURES;
use crate::clause_learning::{Feature, FeatureVector};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Index of a node inside a tree's arena
pub type NodeId = usize;

/// A node in the decision tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionNode {
    /// Internal node with split condition
    Split {
        /// Feature to compare
        feature: Feature,
        /// Threshold value, used exactly as trained
        threshold: f64,
        /// Child taken when `value <= threshold`
        le: NodeId,
        /// Child taken when `value > threshold` (or the value is NaN)
        gt: NodeId,
    },
    /// Leaf node holding the trained usage ratio
    Leaf {
        /// Unnormalized utility score, may exceed 1.0
        value: f64,
    },
}

impl DecisionNode {
    /// Check if this node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, DecisionNode::Leaf { .. })
    }
}

/// Tree information
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeInfo {
    /// Total number of nodes
    pub num_nodes: usize,
    /// Number of leaf nodes
    pub num_leaves: usize,
    /// Maximum depth (a single leaf has depth 0)
    pub max_depth: usize,
}

/// Serialized shape of a tree; converted through validation on load.
#[derive(Deserialize)]
struct TreeRepr {
    root: NodeId,
    nodes: Vec<DecisionNode>,
}

impl TryFrom<TreeRepr> for DecisionTree {
    type Error = ModelError;

    fn try_from(repr: TreeRepr) -> ModelResult<Self> {
        DecisionTree::new(repr.nodes, repr.root)
    }
}

/// Trained regression tree
///
/// Every internal node owns exactly two children and every node is reachable
/// from the root exactly once; both are checked when the tree is built, so
/// traversal always ends at a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TreeRepr")]
pub struct DecisionTree {
    /// Root node index
    root: NodeId,
    /// Node arena
    nodes: Vec<DecisionNode>,
    /// Cached structure summary
    #[serde(skip)]
    info: TreeInfo,
}

impl DecisionTree {
    /// Build a tree from a node arena and its root, validating the structure
    pub fn new(nodes: Vec<DecisionNode>, root: NodeId) -> ModelResult<Self> {
        let info = validate(&nodes, root)?;
        Ok(Self { root, nodes, info })
    }

    /// Create a tree consisting of a single leaf
    pub fn constant(value: f64) -> ModelResult<Self> {
        Self::new(vec![DecisionNode::Leaf { value }], 0)
    }

    /// Root node index
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// All nodes in arena order
    pub fn nodes(&self) -> &[DecisionNode] {
        &self.nodes
    }

    /// Get tree structure information
    pub fn info(&self) -> TreeInfo {
        self.info
    }

    /// Walk from the root to a leaf and return the leaf's value
    #[inline]
    pub fn score(&self, features: &FeatureVector) -> f64 {
        let mut id = self.root;
        loop {
            match self.nodes[id] {
                DecisionNode::Leaf { value } => return value,
                DecisionNode::Split {
                    feature,
                    threshold,
                    le,
                    gt,
                } => {
                    id = if features[feature] <= threshold { le } else { gt };
                }
            }
        }
    }

    /// Node ids visited while scoring `features`, root first, leaf last
    pub fn decision_path(&self, features: &FeatureVector) -> SmallVec<[NodeId; 32]> {
        let mut path = SmallVec::new();
        let mut id = self.root;
        loop {
            path.push(id);
            match self.nodes[id] {
                DecisionNode::Leaf { .. } => return path,
                DecisionNode::Split {
                    feature,
                    threshold,
                    le,
                    gt,
                } => {
                    id = if features[feature] <= threshold { le } else { gt };
                }
            }
        }
    }

    /// Render the tree in Graphviz DOT format
    pub fn to_dot(&self, name: &str) -> String {
        let mut out = format!("digraph \"{}\" {{\n    node [fontname=\"monospace\"];\n", name);
        for (id, node) in self.nodes.iter().enumerate() {
            match *node {
                DecisionNode::Split {
                    feature,
                    threshold,
                    le,
                    gt,
                } => {
                    out.push_str(&format!(
                        "    n{id} [label=\"{} <= {threshold}\"];\n",
                        feature.name()
                    ));
                    out.push_str(&format!("    n{id} -> n{le} [label=\"yes\"];\n"));
                    out.push_str(&format!("    n{id} -> n{gt} [label=\"no\"];\n"));
                }
                DecisionNode::Leaf { value } => {
                    let fill = if value < crate::KEEP_SCORE_THRESHOLD {
                        "lightcoral"
                    } else {
                        "palegreen"
                    };
                    out.push_str(&format!(
                        "    n{id} [label=\"{value}\", shape=box, style=filled, fillcolor={fill}];\n"
                    ));
                }
            }
        }
        out.push_str("}\n");
        out
    }
}

/// Check arena shape and compute the tree summary.
///
/// Uses an explicit stack; trained trees can be deeper than is comfortable
/// for recursion.
fn validate(nodes: &[DecisionNode], root: NodeId) -> ModelResult<TreeInfo> {
    if nodes.is_empty() {
        return Err(ModelError::InvalidTree("tree has no nodes".to_string()));
    }
    if root >= nodes.len() {
        return Err(ModelError::InvalidTree(format!(
            "root {} out of bounds ({} nodes)",
            root,
            nodes.len()
        )));
    }

    let mut seen = vec![false; nodes.len()];
    let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
    seen[root] = true;
    let mut num_leaves = 0;
    let mut max_depth = 0;

    while let Some((id, depth)) = stack.pop() {
        match nodes[id] {
            DecisionNode::Leaf { value } => {
                if !value.is_finite() || value < 0.0 {
                    return Err(ModelError::InvalidTree(format!(
                        "leaf {} has invalid value {}",
                        id, value
                    )));
                }
                num_leaves += 1;
                max_depth = max_depth.max(depth);
            }
            DecisionNode::Split {
                feature,
                threshold,
                le,
                gt,
            } => {
                if !threshold.is_finite() {
                    return Err(ModelError::InvalidTree(format!(
                        "node {} splits on {} with non-finite threshold {}",
                        id,
                        feature.name(),
                        threshold
                    )));
                }
                for child in [le, gt] {
                    if child >= nodes.len() {
                        return Err(ModelError::InvalidTree(format!(
                            "node {} points to missing child {}",
                            id, child
                        )));
                    }
                    if seen[child] {
                        return Err(ModelError::InvalidTree(format!(
                            "node {} is reached twice (shared subtree or cycle)",
                            child
                        )));
                    }
                    seen[child] = true;
                    stack.push((child, depth + 1));
                }
            }
        }
    }

    if let Some(orphan) = seen.iter().position(|&s| !s) {
        return Err(ModelError::InvalidTree(format!(
            "node {} is unreachable from root {}",
            orphan, root
        )));
    }

    Ok(TreeInfo {
        num_nodes: nodes.len(),
        num_leaves,
        max_depth,
    })
}

impl Model for DecisionTree {
    fn input_dim(&self) -> usize {
        NUM_FEATURES
    }

    fn score(&self, features: &FeatureVector) -> f64 {
        DecisionTree::score(self, features)
    }

    fn num_parameters(&self) -> usize {
        self.nodes.len()
    }

    fn save(&self) -> ModelResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ModelError::SerializationError(e.to_string()))
    }

    fn load(data: &[u8]) -> ModelResult<Self> {
        serde_json::from_slice(data).map_err(|e| ModelError::SerializationError(e.to_string()))
    }
}

/// Bottom-up tree construction
///
/// Children must be added before the split that owns them.
///
/// ```
/// use clausekeep_ml::clause_learning::Feature;
/// use clausekeep_ml::models::TreeBuilder;
///
/// let mut b = TreeBuilder::new();
/// let discard = b.leaf(0.2);
/// let keep = b.leaf(3.5);
/// let root = b.split(Feature::SizeRel, 0.75, keep, discard);
/// let tree = b.build(root).unwrap();
/// assert_eq!(tree.info().num_leaves, 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct TreeBuilder {
    nodes: Vec<DecisionNode>,
}

impl TreeBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf
    pub fn leaf(&mut self, value: f64) -> NodeId {
        self.nodes.push(DecisionNode::Leaf { value });
        self.nodes.len() - 1
    }

    /// Add a split over two existing nodes
    pub fn split(&mut self, feature: Feature, threshold: f64, le: NodeId, gt: NodeId) -> NodeId {
        self.nodes.push(DecisionNode::Split {
            feature,
            threshold,
            le,
            gt,
        });
        self.nodes.len() - 1
    }

    /// Finish the tree rooted at `root`
    pub fn build(self, root: NodeId) -> ModelResult<DecisionTree> {
        DecisionTree::new(self.nodes, root)
    }
}
