//! Vote aggregation across independent survey datasets.
//!
//! Every dataset's points are concatenated into one canonical point set and
//! indexed once. Each dataset then matches its own points to their nearest
//! canonical point and casts one vote there for every value strictly above
//! the threshold.
//!
//! Because each dataset's points are themselves part of the canonical set,
//! a point normally matches its own canonical entry, or a coincident entry
//! from another dataset. When two points of one dataset resolve to the same
//! canonical point (coincident points within the dataset), that canonical
//! point receives one vote per matching point. This is left as is.

use thiserror::Error;

use super::index::CanonicalIndex;
use crate::core::loaders::Dataset;

/// Default vote threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.2;

/// Errors that can occur during vote aggregation.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("no input points to aggregate")]
    EmptyInput,

    #[error("dataset '{name}' has {points} points but {values} values")]
    ShapeMismatch {
        name: String,
        points: usize,
        values: usize,
    },
}

/// Canonical points with one vote count each.
#[derive(Debug, Clone)]
pub struct VoteMap {
    /// Concatenation of every dataset's points, in processing order.
    pub points: Vec<[f64; 3]>,
    /// Votes per canonical point, parallel to `points`.
    pub votes: Vec<u32>,
    /// Number of datasets that were aggregated.
    pub num_datasets: usize,
}

impl VoteMap {
    #[inline]
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// Sum of all votes cast.
    pub fn total_votes(&self) -> u64 {
        self.votes.iter().map(|&v| v as u64).sum()
    }

    /// Largest vote count on any canonical point (0 for an empty map).
    pub fn max_votes(&self) -> u32 {
        self.votes.iter().copied().max().unwrap_or(0)
    }

    /// Number of canonical points per vote count, indexed by vote count.
    pub fn histogram(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.max_votes() as usize + 1];
        for &v in &self.votes {
            counts[v as usize] += 1;
        }
        counts
    }
}

/// Aggregate votes from `datasets` into a vote map.
///
/// # Algorithm
///
/// 1. Check every dataset has as many values as points
/// 2. Concatenate all points in dataset order and build the canonical index
/// 3. For each dataset, find the nearest canonical index of each point
///    (queried in parallel)
/// 4. Add one vote at that index for every value strictly greater than
///    `threshold`; accumulation is sequential
///
/// Permuting the datasets permutes the canonical index space but leaves the
/// vote total at each location unchanged.
///
/// # Errors
///
/// Returns `ShapeMismatch` for a dataset whose point and value counts differ
/// and `EmptyInput` when there are no datasets or no points.
pub fn aggregate_votes(datasets: &[Dataset], threshold: f64) -> Result<VoteMap, VoteError> {
    if datasets.is_empty() {
        return Err(VoteError::EmptyInput);
    }

    for dataset in datasets {
        if dataset.points.len() != dataset.values.len() {
            return Err(VoteError::ShapeMismatch {
                name: dataset.name(),
                points: dataset.points.len(),
                values: dataset.values.len(),
            });
        }
    }

    let total: usize = datasets.iter().map(Dataset::len).sum();
    let mut points = Vec::with_capacity(total);
    for dataset in datasets {
        points.extend_from_slice(&dataset.points);
    }

    let index = CanonicalIndex::build(&points)?;
    let mut votes = vec![0u32; index.len()];

    for dataset in datasets {
        let matches = index.nearest_batch(&dataset.points);

        let mut cast = 0usize;
        for (&canonical, &value) in matches.iter().zip(dataset.values.iter()) {
            if value > threshold {
                votes[canonical] += 1;
                cast += 1;
            }
        }

        log::debug!(
            "{}: {} points, {} votes cast (threshold {})",
            dataset.name(),
            dataset.len(),
            cast,
            threshold
        );
    }

    Ok(VoteMap {
        points,
        votes,
        num_datasets: datasets.len(),
    })
}
