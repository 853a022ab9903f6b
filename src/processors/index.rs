//! Nearest-neighbor index over the canonical point set.
//!
//! The canonical point set is the concatenation of every dataset's points in
//! processing order. Indices returned by [`CanonicalIndex::nearest`] address
//! that concatenation, so the build order fixes the vote map's index space.

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use rayon::prelude::*;

use super::voting::VoteError;

/// Build-once, query-many k-d tree over canonical points.
///
/// Exact ties between equidistant canonical points are resolved by the
/// tree's traversal order. The result is deterministic for a given build but
/// not specified.
pub struct CanonicalIndex {
    tree: ImmutableKdTree<f64, 3>,
    len: usize,
}

impl CanonicalIndex {
    /// Build the index over `points`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `VoteError::EmptyInput` if `points` is empty.
    pub fn build(points: &[[f64; 3]]) -> Result<Self, VoteError> {
        if points.is_empty() {
            return Err(VoteError::EmptyInput);
        }

        let tree: ImmutableKdTree<f64, 3> = ImmutableKdTree::new_from_slice(points);
        log::debug!("built canonical index over {} points", points.len());

        Ok(Self {
            tree,
            len: points.len(),
        })
    }

    /// Number of indexed canonical points.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the canonical point closest to `query`.
    #[inline]
    pub fn nearest(&self, query: &[f64; 3]) -> usize {
        self.tree.nearest_one::<SquaredEuclidean>(query).item as usize
    }

    /// Nearest canonical index for each query, in query order.
    ///
    /// Queries run in parallel; the result equals calling [`nearest`] on each.
    ///
    /// [`nearest`]: CanonicalIndex::nearest
    pub fn nearest_batch(&self, queries: &[[f64; 3]]) -> Vec<usize> {
        queries.par_iter().map(|q| self.nearest(q)).collect()
    }
}
