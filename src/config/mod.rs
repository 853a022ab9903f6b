//! Configuration types for the vote map pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for input discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// File extensions recognised as dataset tables (without the dot)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string()]
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// Configuration for vote aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingConfig {
    /// A dataset value must be strictly greater than this to cast a vote
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.2
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

/// Longitude window applied before rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Western bound in degrees (inclusive)
    #[serde(default = "default_lon_min")]
    pub lon_min: f64,

    /// Eastern bound in degrees (inclusive)
    #[serde(default = "default_lon_max")]
    pub lon_max: f64,
}

fn default_lon_min() -> f64 {
    -80.0
}

fn default_lon_max() -> f64 {
    -40.0
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            lon_min: default_lon_min(),
            lon_max: default_lon_max(),
        }
    }
}

/// Configuration for the depth-section plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Latitude used to convert longitude into horizontal distance
    #[serde(default = "default_display_latitude")]
    pub display_latitude: f64,

    /// Points at or below this depth are not drawn
    #[serde(default = "default_max_depth")]
    pub max_depth_km: f64,

    /// Depths of the dashed reference lines
    #[serde(default = "default_reference_depths")]
    pub reference_depths_km: Vec<f64>,

    /// Image width in pixels; height follows from the data aspect ratio
    #[serde(default = "default_width")]
    pub width: u32,

    /// Marker radius in pixels
    #[serde(default = "default_point_size")]
    pub point_size: u32,

    /// Background fill as RGB; the bitmap encoder writes opaque pixels
    #[serde(default = "default_background")]
    pub background: [u8; 3],
}

fn default_display_latitude() -> f64 {
    -37.0
}

fn default_max_depth() -> f64 {
    1500.0
}

fn default_reference_depths() -> Vec<f64> {
    vec![660.0, 1000.0]
}

fn default_width() -> u32 {
    2000
}

fn default_point_size() -> u32 {
    2
}

fn default_background() -> [u8; 3] {
    [255, 255, 255]
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            display_latitude: default_display_latitude(),
            max_depth_km: default_max_depth(),
            reference_depths_km: default_reference_depths(),
            width: default_width(),
            point_size: default_point_size(),
            background: default_background(),
        }
    }
}

/// Configuration for output artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Name of the PNG written into the output folder
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Also write the full vote table as CSV next to the image
    #[serde(default)]
    pub write_table: bool,
}

fn default_filename() -> String {
    "votemap_-37.png".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            write_table: false,
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub voting: VotingConfig,

    #[serde(default)]
    pub region: RegionConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
