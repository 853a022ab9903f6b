//! Multi-dataset point cloud vote aggregation.
//!
//! This crate provides tools for:
//! - Loading flat numeric survey tables (`X Y Z Value` per row)
//! - Matching every dataset onto one canonical point set with a k-d tree
//!   and counting, per canonical point, the datasets whose value exceeds a
//!   threshold
//! - Projecting the result to latitude, longitude and depth
//! - Rendering a longitude-windowed depth section as a PNG
//!
//! # Example
//!
//! ```no_run
//! use votemap::core::loaders::{find_table_files, load_datasets};
//! use votemap::processors::voting::aggregate_votes;
//! use std::path::Path;
//!
//! let files = find_table_files(Path::new("data"), &["txt".to_string()]).unwrap();
//! let datasets = load_datasets(&files).unwrap();
//! let map = aggregate_votes(&datasets, 0.2).unwrap();
//! println!("{} votes over {} points", map.total_votes(), map.len());
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use crate::config::{InputConfig, OutputConfig, PipelineConfig, RegionConfig, RenderConfig, VotingConfig};
pub use crate::core::loaders::Dataset;
pub use crate::processors::voting::VoteMap;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
