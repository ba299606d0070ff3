//! Blueprint text formats
//!
//! TOML is the primary format, JSON is accepted for generated configs. Parse
//! errors carry the line and column of the offending token.

use std::path::Path;

use contracts::{ContractError, FusionBlueprint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Case-insensitive extension match
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("toml") {
            Some(Self::Toml)
        } else if ext.eq_ignore_ascii_case("json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// Format implied by a config file name
    pub fn from_path(path: &Path) -> Result<Self, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse(format!(
                "{}: cannot determine file format from extension",
                path.display()
            ))
        })?;
        Self::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// 1-based (line, column) of a byte offset
fn line_col(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
    (line, column)
}

fn parse_error(
    format: ConfigFormat,
    location: Option<(usize, usize)>,
    message: &str,
    source: Box<dyn std::error::Error + Send + Sync>,
) -> ContractError {
    let message = match location {
        Some((line, column)) => {
            format!("{} parse error at line {line}, column {column}: {message}", format.name())
        }
        None => format!("{} parse error: {message}", format.name()),
    };
    ContractError::ConfigParse {
        message,
        source: Some(source),
    }
}

pub fn parse_toml(content: &str) -> Result<FusionBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| {
        let location = e.span().map(|span| line_col(content, span.start));
        let message = e.message().trim().to_string();
        parse_error(ConfigFormat::Toml, location, &message, Box::new(e))
    })
}

pub fn parse_json(content: &str) -> Result<FusionBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| {
        let location = (e.line() > 0).then(|| (e.line(), e.column()));
        // serde_json appends the location to its Display output
        let message = e.to_string();
        let message = message.split(" at line ").next().unwrap_or_default().to_string();
        parse_error(ConfigFormat::Json, location, &message, Box::new(e))
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<FusionBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

/// Render a blueprint back to text in `format`
pub fn render(blueprint: &FusionBlueprint, format: ConfigFormat) -> Result<String, ContractError> {
    let rendered = match format {
        ConfigFormat::Toml => toml::to_string_pretty(blueprint).map_err(|e| e.to_string()),
        ConfigFormat::Json => serde_json::to_string_pretty(blueprint).map_err(|e| e.to_string()),
    };
    rendered.map_err(|e| {
        ContractError::config_parse(format!("{} serialize error: {e}", format.name()))
    })
}
