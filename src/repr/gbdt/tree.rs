//! Canonical tree representation (SoA) and its builder.
//!
//! - [`Tree`]: immutable SoA storage used for inference
//! - [`MutableTree`]: node-by-node construction, frozen into a [`Tree`]
//! - [`TreeValidationError`]: structural errors caught when freezing

use ndarray::ArrayView1;

use super::categories::{float_to_category, CategoriesStorage};
use super::node::SplitType;
use super::NodeId;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    #[error("tree has no nodes")]
    EmptyTree,
    /// A child pointer references an out-of-bounds node.
    #[error("node {node} has {side} child {child} but the tree has {n_nodes} nodes")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    /// A child does not come after its parent, which could loop.
    #[error("node {node} points back to node {child}")]
    BackwardEdge { node: NodeId, child: NodeId },
    /// A node was never assigned a leaf value or a split.
    #[error("node {node} was never initialised")]
    UninitialisedNode { node: NodeId },
}

// ============================================================================
// Tree
// ============================================================================

/// Immutable decision tree in structure-of-arrays layout.
///
/// Node 0 is the root. Children always have a larger index than their parent,
/// so traversal terminates.
#[derive(Debug, Clone)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[NodeId]>,
    right_children: Box<[NodeId]>,
    default_left: Box<[bool]>,
    split_types: Box<[SplitType]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
    categories: CategoriesStorage,
}

impl Tree {
    /// Number of nodes in the tree.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Number of leaves in the tree.
    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&leaf| leaf).count()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    /// Largest feature index referenced by any split, if the tree has splits.
    pub fn max_split_index(&self) -> Option<u32> {
        self.split_indices
            .iter()
            .zip(self.is_leaf.iter())
            .filter_map(|(&idx, &leaf)| (!leaf).then_some(idx))
            .max()
    }

    /// True when any node uses a categorical split.
    pub fn has_categorical(&self) -> bool {
        !self.categories.is_empty()
    }

    /// Traverse the tree to the leaf reached by `sample`.
    ///
    /// NaN values (and feature indices beyond the sample) follow the node's
    /// default direction.
    pub fn traverse_to_leaf(&self, sample: ArrayView1<'_, f32>) -> NodeId {
        let mut node: NodeId = 0;

        while !self.is_leaf(node) {
            let idx = node as usize;
            let fvalue = sample
                .get(self.split_indices[idx] as usize)
                .copied()
                .unwrap_or(f32::NAN);

            let go_left = if fvalue.is_nan() {
                self.default_left[idx]
            } else {
                match self.split_types[idx] {
                    SplitType::Numeric => fvalue < self.split_thresholds[idx],
                    SplitType::Categorical => match float_to_category(fvalue) {
                        Some(cat) => !self.categories.category_goes_right(node, cat),
                        None => true,
                    },
                }
            };

            node = if go_left {
                self.left_children[idx]
            } else {
                self.right_children[idx]
            };
        }

        node
    }

    /// Leaf value reached by `sample`.
    #[inline]
    pub fn predict_row(&self, sample: ArrayView1<'_, f32>) -> f32 {
        self.leaf_value(self.traverse_to_leaf(sample))
    }
}

// ============================================================================
// MutableTree
// ============================================================================

/// Builder for a [`Tree`] with a known node count.
///
/// Every node must be made a leaf or a split before [`freeze`](Self::freeze).
#[derive(Debug, Clone)]
pub struct MutableTree {
    split_indices: Vec<u32>,
    split_thresholds: Vec<f32>,
    left_children: Vec<NodeId>,
    right_children: Vec<NodeId>,
    default_left: Vec<bool>,
    split_types: Vec<SplitType>,
    is_leaf: Vec<bool>,
    leaf_values: Vec<f32>,
    initialised: Vec<bool>,
    category_sets: Vec<(NodeId, Vec<u32>)>,
}

impl MutableTree {
    /// Allocate a tree with `n_nodes` uninitialised nodes.
    pub fn with_n_nodes(n_nodes: usize) -> Self {
        Self {
            split_indices: vec![0; n_nodes],
            split_thresholds: vec![0.0; n_nodes],
            left_children: vec![0; n_nodes],
            right_children: vec![0; n_nodes],
            default_left: vec![false; n_nodes],
            split_types: vec![SplitType::Numeric; n_nodes],
            is_leaf: vec![false; n_nodes],
            leaf_values: vec![0.0; n_nodes],
            initialised: vec![false; n_nodes],
            category_sets: Vec::new(),
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    /// Turn `node` into a leaf with the given value.
    pub fn make_leaf(&mut self, node: NodeId, value: f32) {
        let idx = node as usize;
        self.is_leaf[idx] = true;
        self.leaf_values[idx] = value;
        self.initialised[idx] = true;
    }

    /// Turn `node` into a numeric split: `value < threshold` goes left.
    pub fn set_numeric_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        default_left: bool,
        left: NodeId,
        right: NodeId,
    ) {
        self.set_split(node, feature, default_left, left, right, SplitType::Numeric);
        self.split_thresholds[node as usize] = threshold;
    }

    /// Turn `node` into a categorical split: categories in `bitset` go right.
    pub fn set_categorical_split(
        &mut self,
        node: NodeId,
        feature: u32,
        bitset: Vec<u32>,
        default_left: bool,
        left: NodeId,
        right: NodeId,
    ) {
        self.set_split(node, feature, default_left, left, right, SplitType::Categorical);
        self.category_sets.push((node, bitset));
    }

    fn set_split(
        &mut self,
        node: NodeId,
        feature: u32,
        default_left: bool,
        left: NodeId,
        right: NodeId,
        split_type: SplitType,
    ) {
        let idx = node as usize;
        self.is_leaf[idx] = false;
        self.split_indices[idx] = feature;
        self.default_left[idx] = default_left;
        self.left_children[idx] = left;
        self.right_children[idx] = right;
        self.split_types[idx] = split_type;
        self.initialised[idx] = true;
    }

    /// Validate the structure and produce an immutable [`Tree`].
    pub fn freeze(self) -> Result<Tree, TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        for node in 0..n_nodes {
            let id = node as NodeId;
            if !self.initialised[node] {
                return Err(TreeValidationError::UninitialisedNode { node: id });
            }
            if self.is_leaf[node] {
                continue;
            }
            for (side, child) in [
                ("left", self.left_children[node]),
                ("right", self.right_children[node]),
            ] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node: id,
                        side,
                        child,
                        n_nodes,
                    });
                }
                if child <= id {
                    return Err(TreeValidationError::BackwardEdge { node: id, child });
                }
            }
        }

        let categories = CategoriesStorage::from_node_bitsets(n_nodes, &self.category_sets);

        Ok(Tree {
            split_indices: self.split_indices.into_boxed_slice(),
            split_thresholds: self.split_thresholds.into_boxed_slice(),
            left_children: self.left_children.into_boxed_slice(),
            right_children: self.right_children.into_boxed_slice(),
            default_left: self.default_left.into_boxed_slice(),
            split_types: self.split_types.into_boxed_slice(),
            is_leaf: self.is_leaf.into_boxed_slice(),
            leaf_values: self.leaf_values.into_boxed_slice(),
            categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::gbdt::categories_to_bitset;
    use ndarray::array;

    /// `f0 < 0.5` (missing goes left) -> leaves -1.0 / 1.0
    fn stump(default_left: bool) -> Tree {
        let mut tree = MutableTree::with_n_nodes(3);
        tree.set_numeric_split(0, 0, 0.5, default_left, 1, 2);
        tree.make_leaf(1, -1.0);
        tree.make_leaf(2, 1.0);
        tree.freeze().unwrap()
    }

    #[test]
    fn numeric_split_routes_by_threshold() {
        let tree = stump(true);
        assert_eq!(tree.predict_row(array![0.2f32].view()), -1.0);
        assert_eq!(tree.predict_row(array![0.5f32].view()), 1.0);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.max_split_index(), Some(0));
    }

    #[test]
    fn missing_value_follows_default_direction() {
        assert_eq!(stump(true).predict_row(array![f32::NAN].view()), -1.0);
        assert_eq!(stump(false).predict_row(array![f32::NAN].view()), 1.0);
        // Feature index beyond the sample is treated as missing
        let empty: [f32; 0] = [];
        assert_eq!(stump(false).predict_row(ArrayView1::from(&empty[..])), 1.0);
    }

    #[test]
    fn categorical_split_sends_members_right() {
        let mut tree = MutableTree::with_n_nodes(3);
        tree.set_categorical_split(0, 0, categories_to_bitset(&[2, 5]), true, 1, 2);
        tree.make_leaf(1, 10.0);
        tree.make_leaf(2, 20.0);
        let tree = tree.freeze().unwrap();

        assert!(tree.has_categorical());
        assert_eq!(tree.predict_row(array![2.0f32].view()), 20.0);
        assert_eq!(tree.predict_row(array![5.0f32].view()), 20.0);
        assert_eq!(tree.predict_row(array![3.0f32].view()), 10.0);
        assert_eq!(tree.predict_row(array![-1.0f32].view()), 10.0);
    }

    #[test]
    fn freeze_rejects_malformed_trees() {
        assert_eq!(
            MutableTree::with_n_nodes(0).freeze().unwrap_err(),
            TreeValidationError::EmptyTree
        );

        let mut out_of_bounds = MutableTree::with_n_nodes(2);
        out_of_bounds.set_numeric_split(0, 0, 1.0, true, 1, 7);
        out_of_bounds.make_leaf(1, 0.0);
        assert!(matches!(
            out_of_bounds.freeze(),
            Err(TreeValidationError::ChildOutOfBounds { child: 7, .. })
        ));

        let mut cycle = MutableTree::with_n_nodes(3);
        cycle.set_numeric_split(0, 0, 1.0, true, 1, 2);
        cycle.set_numeric_split(1, 0, 1.0, true, 0, 2);
        cycle.make_leaf(2, 0.0);
        assert!(matches!(
            cycle.freeze(),
            Err(TreeValidationError::BackwardEdge { node: 1, child: 0 })
        ));

        let mut partial = MutableTree::with_n_nodes(3);
        partial.set_numeric_split(0, 0, 1.0, true, 1, 2);
        partial.make_leaf(1, 0.0);
        assert_eq!(
            partial.freeze().unwrap_err(),
            TreeValidationError::UninitialisedNode { node: 2 }
        );
    }
}
