//! Data loaders for survey dataset tables.
//!
//! A dataset table is a flat numeric text file with one point per row:
//! `X Y Z Value`, whitespace or comma delimited. Blank lines and anything
//! after a `#` are ignored. Columns past the fourth are ignored.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Minimum number of columns in a dataset table (X, Y, Z, value).
pub const MIN_COLUMNS: usize = 4;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: '{token}' is not a number")]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("{path}:{line}: expected at least 4 columns, found {found}")]
    TooFewColumns {
        path: PathBuf,
        line: usize,
        found: usize,
    },

    #[error("{path}:{line}: expected {expected} columns, found {found}")]
    InconsistentColumns {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("No files with extension {extensions:?} found in {dir}")]
    NoTableFiles {
        dir: PathBuf,
        extensions: Vec<String>,
    },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// One survey dataset: sampled points with a scalar value each.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Cartesian coordinates in kilometers, Earth-centered.
    pub points: Vec<[f64; 3]>,
    /// Value for each point, parallel to `points`.
    pub values: Vec<f64>,
    /// Source file path.
    pub source_path: Option<PathBuf>,
}

impl Dataset {
    /// Creates a dataset from parallel point and value vectors.
    pub fn new(points: Vec<[f64; 3]>, values: Vec<f64>) -> Self {
        Self {
            points,
            values,
            source_path: None,
        }
    }

    /// Creates an empty dataset with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            source_path: None,
        }
    }

    /// Returns the number of points in the dataset.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the dataset has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Adds a point and its value.
    #[inline]
    pub fn push(&mut self, point: [f64; 3], value: f64) {
        self.points.push(point);
        self.values.push(value);
    }

    /// Short display name for logs: the file name if known.
    pub fn name(&self) -> String {
        self.source_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "<memory>".to_string())
    }
}

/// Split a table line into numeric tokens, dropping comments.
fn tokenize(line: &str) -> impl Iterator<Item = &str> {
    let data = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    data.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
}

/// Load a dataset table from a file.
///
/// # Arguments
///
/// * `path` - Path to the table file
///
/// # Returns
///
/// A `Dataset` with the first three columns as points and the fourth as values.
///
/// # Errors
///
/// Returns an error if the file cannot be read, contains a non-numeric
/// field, has fewer than four columns, has rows of differing width, or
/// contains no data rows.
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let io_err = |source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let reader = BufReader::with_capacity(64 * 1024, file);

    let mut dataset = Dataset::with_capacity(10_000);
    let mut width: Option<usize> = None;
    let mut row = Vec::with_capacity(MIN_COLUMNS);

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        let line_no = line_idx + 1;

        row.clear();
        for token in tokenize(&line) {
            let value: f64 = token.parse().map_err(|_| LoaderError::Parse {
                path: path.to_path_buf(),
                line: line_no,
                token: token.to_string(),
            })?;
            row.push(value);
        }

        if row.is_empty() {
            continue;
        }

        if row.len() < MIN_COLUMNS {
            return Err(LoaderError::TooFewColumns {
                path: path.to_path_buf(),
                line: line_no,
                found: row.len(),
            });
        }

        match width {
            None => width = Some(row.len()),
            Some(expected) if expected != row.len() => {
                return Err(LoaderError::InconsistentColumns {
                    path: path.to_path_buf(),
                    line: line_no,
                    expected,
                    found: row.len(),
                });
            }
            Some(_) => {}
        }

        dataset.push([row[0], row[1], row[2]], row[3]);
    }

    if dataset.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    dataset.source_path = Some(path.to_path_buf());
    Ok(dataset)
}

/// Load several dataset tables, in the given order.
///
/// Stops at the first file that fails to load.
pub fn load_datasets(paths: &[PathBuf]) -> Result<Vec<Dataset>> {
    let mut datasets = Vec::with_capacity(paths.len());
    for path in paths {
        let dataset = load_dataset(path)?;
        log::debug!("{}: loaded {} points", dataset.name(), dataset.len());
        datasets.push(dataset);
    }
    Ok(datasets)
}

/// Find dataset tables in a directory (non-recursive).
///
/// Matches file extensions case-insensitively against `extensions` and
/// returns the paths sorted, so that processing order is stable across runs.
///
/// # Errors
///
/// Returns `DirectoryNotFound` if `dir` is not a directory and
/// `NoTableFiles` if nothing matches.
pub fn find_table_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LoaderError::DirectoryNotFound(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|source| LoaderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e.as_str())))
                .unwrap_or(false)
        })
        .collect();

    if files.is_empty() {
        return Err(LoaderError::NoTableFiles {
            dir: dir.to_path_buf(),
            extensions: extensions.to_vec(),
        });
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn txt() -> Vec<String> {
        vec!["txt".to_string()]
    }

    #[test]
    fn test_dataset_operations() {
        let mut dataset = Dataset::with_capacity(2);
        assert!(dataset.is_empty());

        dataset.push([1.0, 2.0, 3.0], 0.5);
        dataset.push([4.0, 5.0, 6.0], 0.1);

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.points[1], [4.0, 5.0, 6.0]);
        assert_eq!(dataset.values, vec![0.5, 0.1]);
        assert_eq!(dataset.name(), "<memory>");
    }

    #[test]
    fn test_load_dataset() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# x y z value").unwrap();
        writeln!(file, "1.0 2.0 3.0 0.5").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "4.0\t5.0   6.0 0.1  # trailing comment").unwrap();
        file.flush().unwrap();

        let dataset = load_dataset(file.path())?;
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.points[0], [1.0, 2.0, 3.0]);
        assert_eq!(dataset.points[1], [4.0, 5.0, 6.0]);
        assert_eq!(dataset.values, vec![0.5, 0.1]);
        assert_eq!(dataset.source_path.as_deref(), Some(file.path()));

        Ok(())
    }

    #[test]
    fn test_load_dataset_ignores_extra_columns() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1,2,3,0.7,99").unwrap();
        writeln!(file, "4,5,6,0.8,98").unwrap();
        file.flush().unwrap();

        let dataset = load_dataset(file.path())?;
        assert_eq!(dataset.values, vec![0.7, 0.8]);

        Ok(())
    }

    #[test]
    fn test_load_dataset_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_dataset(dir.path().join("missing.txt"));
        assert!(matches!(result, Err(LoaderError::Io { .. })));
    }

    #[test]
    fn test_load_dataset_too_few_columns() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0 2.0 3.0").unwrap();
        file.flush().unwrap();

        match load_dataset(file.path()) {
            Err(LoaderError::TooFewColumns { line, found, .. }) => {
                assert_eq!(line, 1);
                assert_eq!(found, 3);
            }
            other => panic!("Expected TooFewColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_load_dataset_non_numeric() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0 2.0 3.0 0.5").unwrap();
        writeln!(file, "1.0 abc 3.0 0.5").unwrap();
        file.flush().unwrap();

        match load_dataset(file.path()) {
            Err(LoaderError::Parse { line, token, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(token, "abc");
            }
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_dataset_inconsistent_columns() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1.0 2.0 3.0 0.5").unwrap();
        writeln!(file, "1.0 2.0 3.0 0.5 7.0").unwrap();
        file.flush().unwrap();

        let result = load_dataset(file.path());
        assert!(matches!(
            result,
            Err(LoaderError::InconsistentColumns { expected: 4, found: 5, .. })
        ));
    }

    #[test]
    fn test_load_dataset_empty() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# only a comment").unwrap();
        file.flush().unwrap();

        let result = load_dataset(file.path());
        assert!(matches!(result, Err(LoaderError::EmptyFile(_))));
    }

    #[test]
    fn test_find_table_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "1 2 3 0.5\n").unwrap();
        fs::write(dir.path().join("a.TXT"), "1 2 3 0.5\n").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "1 2 3 0.5\n").unwrap();

        let files = find_table_files(dir.path(), &txt()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.TXT", "b.txt"]);
    }

    #[test]
    fn test_find_table_files_none_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("data.csv"), "1,2,3,0.5\n").unwrap();

        let result = find_table_files(dir.path(), &txt());
        assert!(matches!(result, Err(LoaderError::NoTableFiles { .. })));
    }

    #[test]
    fn test_find_table_files_missing_dir() {
        let dir = TempDir::new().unwrap();
        let result = find_table_files(&dir.path().join("nope"), &txt());
        assert!(matches!(result, Err(LoaderError::DirectoryNotFound(_))));
    }

    #[test]
    fn test_load_datasets_stops_on_error() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.txt");
        fs::write(&good, "1 2 3 0.5\n").unwrap();
        fs::write(&bad, "1 2 x 0.5\n").unwrap();

        let loaded = load_datasets(&[good.clone()]).unwrap();
        assert_eq!(loaded.len(), 1);

        let result = load_datasets(&[good, bad]);
        assert!(matches!(result, Err(LoaderError::Parse { .. })));
    }
}
