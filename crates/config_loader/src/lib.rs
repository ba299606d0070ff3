//! # Config Loader
//!
//! Reads a [`FusionBlueprint`] from TOML or JSON and checks it before any
//! stage is built. Every section is optional; omitted sections fall back to
//! the Kinova reference calibration, class 41 ("cup"), and the default topics.
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("config.toml")).unwrap();
//! println!("Target class: {}", blueprint.target.class_id);
//! ```

mod parser;
mod validator;

pub use contracts::FusionBlueprint;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;

/// Entry points for reading and writing blueprints
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse, and validate a config file. The format follows the
    /// extension (`.toml` / `.json`).
    ///
    /// # Errors
    /// `ConfigParse` for unreadable or malformed files, `ConfigValidation`
    /// for rule violations, `Io` when the file cannot be read.
    pub fn load_from_path(path: &Path) -> Result<FusionBlueprint, ContractError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content, format)
    }

    /// Parse and validate config text.
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<FusionBlueprint, ContractError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }

    /// Re-check a blueprint assembled or edited in code
    pub fn validate(blueprint: &FusionBlueprint) -> Result<(), ContractError> {
        validator::validate(blueprint)
    }

    pub fn to_toml(blueprint: &FusionBlueprint) -> Result<String, ContractError> {
        parser::render(blueprint, ConfigFormat::Toml)
    }

    pub fn to_json(blueprint: &FusionBlueprint) -> Result<String, ContractError> {
        parser::render(blueprint, ConfigFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DepthLookup, DropPolicy, SinkType};

    const FULL_TOML: &str = r#"
[cameras.color]
fx = 1297.67
fy = 1298.63
cx = 620.91
cy = 238.28

[cameras.depth]
fx = 360.01
fy = 360.01
cx = 243.87
cy = 137.92

[target]
class_id = 41
label = "cup"

[topics]
color = "/camera/color/image_raw"
depth = "/camera/depth/image_raw"
annotated = "/yolo/detected_image"

[projection]
lookup = "color_pixel"

[ingestion]
color_queue_capacity = 2
drop_policy = "drop_newest"

[[sinks]]
name = "log_sink"
sink_type = "log"

[[sinks]]
name = "files"
sink_type = "file"
queue_capacity = 8
[sinks.params]
base_path = "./output"
depth_overlay = "true"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.cameras.depth.fx, 360.01);
        assert_eq!(bp.projection.lookup, DepthLookup::ColorPixel);
        assert_eq!(bp.ingestion.drop_policy, DropPolicy::DropNewest);
        assert_eq!(bp.sinks[1].sink_type, SinkType::File);
        assert_eq!(
            bp.sinks[1].params.get("depth_overlay").map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let bp = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(bp.target.class_id, 41);
        assert_eq!(bp.topics.depth, "/camera/depth/image_raw");
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.cameras, bp2.cameras);
        assert_eq!(bp.target, bp2.target);
        assert_eq!(bp.sinks.len(), bp2.sinks.len());
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.topics, bp2.topics);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let content = r#"
[topics]
color = "/same"
depth = "/same"
annotated = "/out"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = ConfigLoader::load_from_path(Path::new("config.yaml")).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
