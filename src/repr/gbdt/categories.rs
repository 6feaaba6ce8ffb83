//! Category sets for categorical splits.
//!
//! Each categorical node owns a packed `u32` bitset: bit `c` is set when
//! category `c` goes to the right child. Numeric nodes own an empty segment.

use super::NodeId;

/// Packed category bitsets for all nodes of one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoriesStorage {
    /// Flat bitset words for every categorical node.
    words: Vec<u32>,
    /// Per-node `(start, n_words)` into `words`. Empty when the tree has no
    /// categorical splits.
    segments: Vec<(u32, u32)>,
}

impl CategoriesStorage {
    /// Create storage from flat words and per-node segments.
    pub fn new(words: Vec<u32>, segments: Vec<(u32, u32)>) -> Self {
        Self { words, segments }
    }

    /// Build storage for `n_nodes` nodes from per-node bitsets.
    pub fn from_node_bitsets(n_nodes: usize, bitsets: &[(NodeId, Vec<u32>)]) -> Self {
        if bitsets.is_empty() {
            return Self::default();
        }

        let mut words = Vec::new();
        let mut segments = vec![(0u32, 0u32); n_nodes];
        for (node, bitset) in bitsets {
            let start = words.len() as u32;
            words.extend_from_slice(bitset);
            if let Some(slot) = segments.get_mut(*node as usize) {
                *slot = (start, bitset.len() as u32);
            }
        }

        Self { words, segments }
    }

    /// True when no node carries a category set.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Check whether `category` is in the set of `node`, i.e. goes right.
    #[inline]
    pub fn category_goes_right(&self, node: NodeId, category: u32) -> bool {
        let Some(&(start, size)) = self.segments.get(node as usize) else {
            return false;
        };

        let word_idx = category >> 5;
        let bit_idx = category & 31;
        if word_idx >= size {
            return false;
        }

        let word = self.words[(start + word_idx) as usize];
        (word >> bit_idx) & 1 != 0
    }
}

/// Convert a feature value to a category index.
///
/// Returns `None` for negative, fractional or non-finite values; such values
/// are not valid categories and follow the left branch.
#[inline]
pub fn float_to_category(value: f32) -> Option<u32> {
    if !value.is_finite() || value < 0.0 || value != value.trunc() || value > u32::MAX as f32 {
        return None;
    }
    Some(value as u32)
}

/// Build a packed u32 bitset from a list of category values.
///
/// Categories 0-31 land in word 0, 32-63 in word 1, and so on.
pub fn categories_to_bitset(categories: &[u32]) -> Vec<u32> {
    let Some(&max_cat) = categories.iter().max() else {
        return Vec::new();
    };

    let mut bitset = vec![0u32; ((max_cat >> 5) + 1) as usize];
    for &cat in categories {
        bitset[(cat >> 5) as usize] |= 1u32 << (cat & 31);
    }
    bitset
}
