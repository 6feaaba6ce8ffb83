//! Canonical forest representation (collection of trees).

use ndarray::ArrayView1;

use super::Tree;

/// Single-output forest of decision trees.
///
/// The margin of a sample is `base_score + Σ weight_t · leaf_t(sample)`.
/// Plain boosted ensembles use weight `1.0` for every tree; DART ensembles
/// carry one weight per tree.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_weights: Vec<f32>,
    base_score: f32,
}

impl Forest {
    /// Create an empty forest with the given base score (margin space).
    pub fn new(base_score: f32) -> Self {
        Self {
            trees: Vec::new(),
            tree_weights: Vec::new(),
            base_score,
        }
    }

    /// Add a tree with weight `1.0`.
    pub fn push_tree(&mut self, tree: Tree) {
        self.push_weighted_tree(tree, 1.0);
    }

    /// Add a tree whose leaf values are scaled by `weight`.
    pub fn push_weighted_tree(&mut self, tree: Tree, weight: f32) {
        self.trees.push(tree);
        self.tree_weights.push(weight);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Base score in margin space.
    #[inline]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    pub fn tree_weights(&self) -> &[f32] {
        &self.tree_weights
    }

    /// Iterate over trees.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Largest feature index referenced by any split in the forest.
    pub fn max_split_index(&self) -> Option<u32> {
        self.trees.iter().filter_map(Tree::max_split_index).max()
    }

    /// Raw margin for a single sample.
    pub fn predict_margin(&self, sample: ArrayView1<'_, f32>) -> f32 {
        self.trees
            .iter()
            .zip(self.tree_weights.iter())
            .fold(self.base_score, |acc, (tree, &weight)| {
                acc + weight * tree.predict_row(sample)
            })
    }
}
