//! End-to-end vote map run: discover, load, aggregate, project, filter, render.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::PipelineConfig;
use crate::core::loaders::{find_table_files, load_datasets};
use crate::core::transforms::project_points;
use crate::core::writers::write_vote_table;
use crate::processors::filtering::filter_by_longitude;
use crate::processors::voting::aggregate_votes;
use crate::visualization::render_depth_section;

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub num_datasets: usize,
    pub canonical_points: usize,
    pub total_votes: u64,
    pub max_votes: u32,
    pub points_in_window: usize,
    pub image_path: PathBuf,
    pub table_path: Option<PathBuf>,
}

/// Run the whole vote map pipeline.
///
/// Every dataset table in `input_dir` is loaded in sorted path order and
/// aggregated. The canonical points are projected to geographic coordinates,
/// restricted to the configured longitude window and rendered to
/// `output_dir/<config.output.filename>`. With `config.output.write_table`
/// set, the full vote table is also written next to the image as CSV. The
/// table is written first and removed again if rendering fails, so a failed
/// run leaves no output behind.
///
/// # Errors
///
/// Any failure aborts the run: no tables found, a table that fails to load,
/// a dataset shape mismatch, or an output that cannot be written.
pub fn run_pipeline(
    input_dir: &Path,
    output_dir: &Path,
    config: &PipelineConfig,
) -> Result<PipelineSummary> {
    let files = find_table_files(input_dir, &config.input.extensions)
        .with_context(|| format!("Failed to list dataset tables in {}", input_dir.display()))?;
    log::info!("Found {} dataset tables in {}", files.len(), input_dir.display());

    let datasets = load_datasets(&files).context("Failed to load datasets")?;

    let vote_map = aggregate_votes(&datasets, config.voting.threshold)
        .context("Vote aggregation failed")?;
    log::info!(
        "Aggregated {} datasets into {} canonical points ({} votes, max {})",
        vote_map.num_datasets,
        vote_map.len(),
        vote_map.total_votes(),
        vote_map.max_votes()
    );
    log::debug!("vote histogram: {:?}", vote_map.histogram());

    let geo = project_points(&vote_map.points);

    let view = filter_by_longitude(
        &geo.lon,
        &geo.depth,
        &vote_map.votes,
        config.region.lon_min,
        config.region.lon_max,
    );
    log::info!(
        "{} of {} points within longitude [{}, {}]",
        view.len(),
        vote_map.len(),
        config.region.lon_min,
        config.region.lon_max
    );

    let image_path = output_dir.join(&config.output.filename);

    let table_path = if config.output.write_table {
        let path = image_path.with_extension("csv");
        write_vote_table(&path, &vote_map.points, &geo, &vote_map.votes)
            .with_context(|| format!("Failed to write vote table {}", path.display()))?;
        log::info!("Vote table saved as {}", path.display());
        Some(path)
    } else {
        None
    };

    if let Err(e) = render_depth_section(&image_path, &view, vote_map.num_datasets, &config.render) {
        if let Some(path) = &table_path {
            if let Err(rm) = std::fs::remove_file(path) {
                log::warn!("Could not remove {}: {}", path.display(), rm);
            }
        }
        return Err(e).with_context(|| format!("Failed to render {}", image_path.display()));
    }

    Ok(PipelineSummary {
        num_datasets: vote_map.num_datasets,
        canonical_points: vote_map.len(),
        total_votes: vote_map.total_votes(),
        max_votes: vote_map.max_votes(),
        points_in_window: view.len(),
        image_path,
        table_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loaders::LoaderError;
    use std::fs;
    use tempfile::TempDir;

    /// Table row for a point at latitude -37° with the given longitude and depth.
    fn row(lon_deg: f64, depth: f64, value: f64) -> String {
        let r = 6371.0 - depth;
        let lat = (-37.0f64).to_radians();
        let lon = lon_deg.to_radians();
        format!(
            "{:.6} {:.6} {:.6} {}\n",
            r * lat.cos() * lon.cos(),
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
            value
        )
    }

    fn write_scenario(dir: &Path) {
        fs::write(
            dir.join("a.txt"),
            row(-60.0, 400.0, 0.5) + &row(-55.0, 400.0, 0.5),
        )
        .unwrap();
        fs::write(
            dir.join("b.txt"),
            row(-60.0, 800.0, 0.1) + &row(-55.0, 800.0, 0.3),
        )
        .unwrap();
        fs::write(
            dir.join("c.txt"),
            row(-60.0, 1200.0, 0.05) + &row(-30.0, 1200.0, 0.05),
        )
        .unwrap();
    }

    fn small_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.render.width = 600;
        config
    }

    #[test]
    fn test_end_to_end_scenario() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_scenario(input.path());

        let summary = run_pipeline(input.path(), output.path(), &small_config()).unwrap();

        assert_eq!(summary.num_datasets, 3);
        assert_eq!(summary.canonical_points, 6);
        assert_eq!(summary.total_votes, 3);
        assert!(summary.max_votes <= 3);
        // c.txt's second point sits at -30°, outside the window
        assert_eq!(summary.points_in_window, 5);
        assert_eq!(summary.image_path, output.path().join("votemap_-37.png"));
        assert!(summary.image_path.exists());
        assert!(summary.table_path.is_none());
    }

    #[test]
    fn test_idempotent_runs() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_scenario(input.path());

        let mut config = small_config();
        config.output.write_table = true;

        let first = run_pipeline(input.path(), output.path(), &config).unwrap();
        let first_table = fs::read_to_string(first.table_path.as_ref().unwrap()).unwrap();
        let second = run_pipeline(input.path(), output.path(), &config).unwrap();
        let second_table = fs::read_to_string(second.table_path.as_ref().unwrap()).unwrap();

        assert_eq!(first_table, second_table);
        assert_eq!(first_table.lines().count(), 7);
        assert_eq!(
            second.table_path,
            Some(output.path().join("votemap_-37.csv"))
        );
    }

    #[test]
    fn test_no_input_files() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let err = run_pipeline(input.path(), output.path(), &small_config()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoaderError>(),
            Some(LoaderError::NoTableFiles { .. })
        ));
        assert!(fs::read_dir(output.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_bad_file_aborts_without_output() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_scenario(input.path());
        fs::write(input.path().join("d.txt"), "1.0 2.0 3.0\n").unwrap();

        let err = run_pipeline(input.path(), output.path(), &small_config()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoaderError>(),
            Some(LoaderError::TooFewColumns { .. })
        ));
        assert!(!output.path().join("votemap_-37.png").exists());
    }

    #[test]
    fn test_unwritable_table_leaves_no_image() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_scenario(input.path());
        fs::create_dir(output.path().join("votemap_-37.csv")).unwrap();

        let mut config = small_config();
        config.output.write_table = true;

        let err = run_pipeline(input.path(), output.path(), &config).unwrap_err();
        assert!(format!("{:#}", err).contains("vote table"));
        assert!(!output.path().join("votemap_-37.png").exists());
    }

    #[test]
    fn test_failed_render_removes_table() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_scenario(input.path());
        fs::create_dir(output.path().join("votemap_-37.png")).unwrap();

        let mut config = small_config();
        config.output.write_table = true;

        let err = run_pipeline(input.path(), output.path(), &config).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to render"));
        assert!(!output.path().join("votemap_-37.csv").exists());
    }

    #[test]
    fn test_custom_extensions() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("a.dat"), row(-60.0, 500.0, 0.9)).unwrap();
        fs::write(input.path().join("b.txt"), row(-60.0, 500.0, 0.9)).unwrap();

        let mut config = small_config();
        config.input.extensions = vec!["dat".to_string()];
        config.output.filename = "dat.png".to_string();

        let summary = run_pipeline(input.path(), output.path(), &config).unwrap();
        assert_eq!(summary.num_datasets, 1);
        assert_eq!(summary.total_votes, 1);
        assert!(output.path().join("dat.png").exists());
    }
}
