//! Data processing modules.

pub mod filtering;
pub mod index;
pub mod pipeline;
pub mod voting;

// Re-export key types for convenience
pub use filtering::{filter_by_longitude, RegionView};
pub use index::CanonicalIndex;
pub use pipeline::{run_pipeline, PipelineSummary};
pub use voting::{aggregate_votes, VoteError, VoteMap, DEFAULT_THRESHOLD};
