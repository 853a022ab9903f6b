//! Flat table export of vote map results.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

use super::transforms::GeoColumns;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Mismatched array lengths.
    #[error("array length mismatch: {points_len} points, {geo_len} projected, {votes_len} votes")]
    LengthMismatch {
        points_len: usize,
        geo_len: usize,
        votes_len: usize,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
pub(crate) fn ensure_parent_dirs(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write the vote map to CSV.
///
/// Creates a CSV file with headers `x,y,z,lat,lon,depth,votes`, one row per
/// canonical point in canonical order.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `points` - Canonical Cartesian points
/// * `geo` - Geographic projection of `points`
/// * `votes` - Vote count per canonical point
///
/// # Errors
///
/// Returns an error if:
/// - the three inputs have different lengths
/// - parent directories cannot be created
/// - the file cannot be created or written to
///
/// # Example
///
/// ```no_run
/// use votemap::core::transforms::project_points;
/// use votemap::core::writers::write_vote_table;
/// use std::path::Path;
///
/// let points = vec![[6000.0, 0.0, 0.0]];
/// let geo = project_points(&points);
/// write_vote_table(Path::new("votes.csv"), &points, &geo, &[1]).unwrap();
/// ```
pub fn write_vote_table(
    path: &Path,
    points: &[[f64; 3]],
    geo: &GeoColumns,
    votes: &[u32],
) -> Result<()> {
    if points.len() != geo.len() || points.len() != votes.len() {
        return Err(WriteError::LengthMismatch {
            points_len: points.len(),
            geo_len: geo.len(),
            votes_len: votes.len(),
        });
    }

    let path_str = path.display().to_string();

    ensure_parent_dirs(path).map_err(|e| WriteError::CreateDirectory {
        path: path_str.clone(),
        source: e,
    })?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path_str.clone(),
        source: e,
    })?;
    let mut csv_writer = csv::Writer::from_writer(BufWriter::new(file));

    csv_writer
        .write_record(["x", "y", "z", "lat", "lon", "depth", "votes"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for (i, (point, vote)) in points.iter().zip(votes.iter()).enumerate() {
        csv_writer
            .write_record(&[
                format!("{:.6}", point[0]),
                format!("{:.6}", point[1]),
                format!("{:.6}", point[2]),
                format!("{:.6}", geo.lat[i]),
                format!("{:.6}", geo.lon[i]),
                format!("{:.6}", geo.depth[i]),
                vote.to_string(),
            ])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str,
        source: e,
    })?;

    Ok(())
}
