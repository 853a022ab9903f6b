//! Core data types and I/O operations.

pub mod loaders;
pub mod transforms;
pub mod writers;

pub use loaders::{find_table_files, load_dataset, load_datasets, Dataset, LoaderError};
pub use transforms::{geo_to_xyz, lon_to_km, project_points, xyz_to_geo, GeoColumns, GeoPoint};
pub use writers::{write_vote_table, WriteError};
