//! FusionBlueprint - Config Loader output
//!
//! Describes the complete pipeline configuration: camera calibration, target
//! class, stream topics, projection mode, ingestion backpressure, output routes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::{IntrinsicsTable, TargetClass};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete pipeline blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FusionBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Color / depth camera intrinsics
    #[serde(default)]
    #[validate(nested)]
    pub cameras: IntrinsicsTable,

    /// Class of interest
    #[serde(default)]
    #[validate(nested)]
    pub target: TargetClass,

    /// Stream endpoints
    #[serde(default)]
    #[validate(nested)]
    pub topics: TopicConfig,

    /// Projection behaviour
    #[serde(default)]
    pub projection: ProjectionConfig,

    /// Ingestion backpressure
    #[serde(default)]
    #[validate(nested)]
    pub ingestion: IngestionConfig,

    /// Output routes
    #[serde(default)]
    #[validate(nested)]
    pub sinks: Vec<SinkConfig>,
}

/// Topic / endpoint names of the three streams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TopicConfig {
    /// Color image input
    #[serde(default = "default_color_topic")]
    #[validate(length(min = 1))]
    pub color: String,

    /// Depth image input
    #[serde(default = "default_depth_topic")]
    #[validate(length(min = 1))]
    pub depth: String,

    /// Annotated image output
    #[serde(default = "default_annotated_topic")]
    #[validate(length(min = 1))]
    pub annotated: String,
}

fn default_color_topic() -> String {
    "/camera/color/image_raw".to_string()
}

fn default_depth_topic() -> String {
    "/camera/depth/image_raw".to_string()
}

fn default_annotated_topic() -> String {
    "/yolo/detected_image".to_string()
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            color: default_color_topic(),
            depth: default_depth_topic(),
            annotated: default_annotated_topic(),
        }
    }
}

/// Which pixel is used to look up the depth sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthLookup {
    /// Sample the depth image at the reprojected depth-camera pixel
    #[default]
    DepthPixel,
    /// Sample the depth image at the raw color-camera pixel (legacy behaviour)
    ColorPixel,
}

/// Projection configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProjectionConfig {
    #[serde(default)]
    pub lookup: DepthLookup,
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IngestionConfig {
    /// Pending color frames allowed before the drop policy applies
    #[serde(default = "default_color_queue_capacity")]
    #[validate(range(min = 1))]
    pub color_queue_capacity: usize,

    /// What to drop when the color queue is full
    #[serde(default)]
    pub drop_policy: DropPolicy,
}

fn default_color_queue_capacity() -> usize {
    4
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            color_queue_capacity: default_color_queue_capacity(),
            drop_policy: DropPolicy::default(),
        }
    }
}

/// Drop policy (when backpressure is full)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Drop the oldest queued frame
    #[default]
    DropOldest,
    /// Drop the incoming frame
    DropNewest,
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkConfig {
    /// Sink name
    #[validate(length(min = 1))]
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1))]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log output
    Log,
    /// File output (rendered PNG + JSON metadata)
    File,
    /// Network output (UDP)
    Network,
}

impl FusionBlueprint {
    /// Topics in declaration order, labelled
    pub fn topic_entries(&self) -> [(&'static str, &str); 3] {
        [
            ("topics.color", self.topics.color.as_str()),
            ("topics.depth", self.topics.depth.as_str()),
            ("topics.annotated", self.topics.annotated.as_str()),
        ]
    }
}
