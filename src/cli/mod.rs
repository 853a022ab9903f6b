//! Command-line interface for the vote map pipeline.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

use crate::processors::pipeline::run_pipeline;
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "votemap")]
#[command(about = "Aggregate point cloud survey datasets into a depth-section vote map", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory containing the dataset tables
    input_dir: PathBuf,

    /// Directory the vote map image is written to
    output_dir: PathBuf,

    /// Output image file name (overrides the config file)
    #[arg(short, long)]
    filename: Option<String>,
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 38 {
            let head: String = value.chars().take(35).collect();
            format!("{}...", head)
        } else {
            value.clone()
        };
        println!("║ {:<19}: {:<38} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

/// Load the config file given on the command line, or the defaults when none
/// was given.
fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let cfg = PipelineConfig::from_yaml(path)
                .map_err(|e| format!("Failed to load config from {}: {}", path.display(), e))?;
            info!("Loaded config from: {}", path.display());
            Ok(cfg)
        }
        None => Ok(PipelineConfig::default()),
    }
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    let mut config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(filename) = cli.filename {
        config.output.filename = filename;
    }

    let start = Instant::now();

    println!("Building vote map...");
    println!("Input directory: {}", cli.input_dir.display());
    println!("Output directory: {}", cli.output_dir.display());
    println!("Threshold: {}", config.voting.threshold);

    let spinner = create_spinner("Aggregating votes...");

    match run_pipeline(&cli.input_dir, &cli.output_dir, &config) {
        Ok(summary) => {
            spinner.finish_and_clear();

            let mut items = vec![
                ("Datasets", summary.num_datasets.to_string()),
                ("Canonical points", summary.canonical_points.to_string()),
                ("Total votes", summary.total_votes.to_string()),
                ("Max votes", summary.max_votes.to_string()),
                (
                    "Longitude window",
                    format!("[{}, {}]", config.region.lon_min, config.region.lon_max),
                ),
                ("Points in window", summary.points_in_window.to_string()),
                ("Output PNG", summary.image_path.display().to_string()),
            ];
            if let Some(table) = &summary.table_path {
                items.push(("Output CSV", table.display().to_string()));
            }
            items.push(("Duration", format!("{:.2?}", start.elapsed())));

            print_summary("Vote Map Complete", &items);
        }
        Err(e) => {
            spinner.finish_and_clear();
            error!("Vote map failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
