//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{DepthLookup, FusionBlueprint, SinkType};
use serde::Serialize;
use tracing::info;

use super::load_blueprint;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    target_class: i64,
    target_label: String,
    lookup: DepthLookup,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match load_blueprint(&args.config) {
        Ok(blueprint) => ValidationResult {
            valid: true,
            config_path,
            error: None,
            warnings: collect_warnings(&blueprint),
            summary: Some(ConfigSummary {
                version: format!("{:?}", blueprint.version),
                target_class: blueprint.target.class_id,
                target_label: blueprint.target.display_name(),
                lookup: blueprint.projection.lookup,
                sink_count: blueprint.sinks.len(),
            }),
        },
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: Vec::new(),
            summary: None,
        },
    }
}

/// Non-fatal issues worth pointing out
fn collect_warnings(blueprint: &FusionBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - annotated frames will be discarded".to_string());
    }

    if blueprint.projection.lookup == DepthLookup::ColorPixel {
        warnings.push(
            "projection.lookup = \"color_pixel\" samples depth at the color pixel; \
             only correct when both images share geometry"
                .to_string(),
        );
    }

    for sink in &blueprint.sinks {
        match sink.sink_type {
            SinkType::Network if !sink.params.contains_key("addr") => warnings.push(format!(
                "Sink '{}' is a network sink without 'addr' - it will fail to start",
                sink.name
            )),
            SinkType::File if !sink.params.contains_key("base_path") => warnings.push(format!(
                "Sink '{}' has no 'base_path' - writing to ./output",
                sink.name
            )),
            _ => {}
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if !result.valid {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
        return;
    }

    println!("✓ Configuration is valid: {}", result.config_path);
    if let Some(ref summary) = result.summary {
        println!("\n  Version: {}", summary.version);
        println!(
            "  Target: {} (class {})",
            summary.target_label, summary.target_class
        );
        println!("  Depth lookup: {:?}", summary.lookup);
        println!("  Sinks: {}", summary.sink_count);
    }

    if !result.warnings.is_empty() {
        println!("\n⚠ Warnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }
}
