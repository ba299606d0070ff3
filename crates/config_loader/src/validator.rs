//! Config validation
//!
//! Rules:
//! - field rules declared on the blueprint types (`validator` derive)
//! - camera intrinsics are finite
//! - topic names start with '/' and are pairwise distinct
//! - sink names unique

use std::collections::HashSet;

use contracts::{CameraIntrinsics, ContractError, FusionBlueprint, Validate};
use validator::{ValidationErrors, ValidationErrorsKind};

/// Validate a FusionBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &FusionBlueprint) -> Result<(), ContractError> {
    validate_cameras(blueprint)?;
    validate_field_rules(blueprint)?;
    validate_topics(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// Run the declarative field rules
fn validate_field_rules(blueprint: &FusionBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(|errors| {
        let mut flat = Vec::new();
        flatten_errors("", &errors, &mut flat);
        flat.sort();
        let (field, message) = flat
            .into_iter()
            .next()
            .unwrap_or_else(|| ("<root>".to_string(), "invalid value".to_string()));
        ContractError::config_validation(field, message)
    })
}

fn flatten_errors(prefix: &str, errors: &ValidationErrors, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("failed '{}' rule", error.code));
                    out.push((path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_errors(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    flatten_errors(&format!("{path}[{idx}]"), inner, out);
                }
            }
        }
    }
}

/// Range rules accept NaN, so finiteness is checked separately
fn validate_cameras(blueprint: &FusionBlueprint) -> Result<(), ContractError> {
    check_finite("cameras.color", &blueprint.cameras.color)?;
    check_finite("cameras.depth", &blueprint.cameras.depth)?;
    Ok(())
}

fn check_finite(field: &str, intrinsics: &CameraIntrinsics) -> Result<(), ContractError> {
    if intrinsics.is_finite() {
        Ok(())
    } else {
        Err(ContractError::config_validation(
            field,
            format!("intrinsics must be finite, got {intrinsics:?}"),
        ))
    }
}

/// Validate stream topics
fn validate_topics(blueprint: &FusionBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (field, topic) in blueprint.topic_entries() {
        if !topic.starts_with('/') {
            return Err(ContractError::config_validation(
                field,
                format!("topic '{topic}' must start with '/'"),
            ));
        }
        if !seen.insert(topic) {
            return Err(ContractError::config_validation(
                field,
                format!("duplicate topic '{topic}'"),
            ));
        }
    }
    Ok(())
}

/// Validate sink configuration
fn validate_sinks(blueprint: &FusionBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                format!("duplicate sink name '{}'", sink.name),
            ));
        }
    }
    Ok(())
}
