//! Colour palettes for symbolic style values
//!
//! A style entry such as `fill = "accent"` names a palette token rather than a
//! colour. When a drawing is serialized, values that exactly match a token of
//! the active stylesheet are replaced by the token's colour; anything else is
//! passed through untouched. Swapping the stylesheet recolours a diagram
//! without touching its shapes.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing stylesheets
#[derive(Error, Debug)]
pub enum StylesheetError {
    #[error("Failed to read stylesheet file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse stylesheet TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A stylesheet mapping symbolic colour tokens to concrete values
#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    /// Optional name for the stylesheet
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Colour mappings: token name -> colour
    pub colors: HashMap<String, String>,
}

/// TOML structure for deserializing stylesheets
#[derive(Deserialize)]
struct TomlStylesheet {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

/// Built-in palette: neutral inks on paper with a blue accent
const DEFAULT_PALETTE: &[(&str, &str)] = &[
    ("ink", "#1a1a1a"),
    ("ink-muted", "#666666"),
    ("paper", "#ffffff"),
    ("paper-shade", "#f5f5f5"),
    ("accent", "#2196f3"),
    ("accent-light", "#e3f2fd"),
    ("accent-dark", "#1565c0"),
    ("highlight", "#ff9800"),
    ("highlight-light", "#fff3e0"),
    ("success", "#4caf50"),
    ("warning", "#ff9800"),
    ("error", "#f44336"),
];

impl Stylesheet {
    /// A stylesheet without any tokens; every style value passes through
    pub fn empty() -> Self {
        Self {
            name: None,
            description: None,
            colors: HashMap::new(),
        }
    }

    /// Load stylesheet from TOML file
    pub fn from_file(path: &Path) -> Result<Self, StylesheetError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Define or override a token, builder style
    pub fn with_color(mut self, token: impl Into<String>, color: impl Into<String>) -> Self {
        self.colors.insert(token.into(), color.into());
        self
    }

    /// Resolve a symbolic colour token to a concrete value
    ///
    /// Returns None if the token is not defined in this stylesheet.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.colors.get(token).map(|s| s.as_str())
    }

    /// The colour for `value` if it is a token, otherwise `value` itself
    pub fn resolve_value<'a>(&'a self, value: &'a str) -> &'a str {
        self.resolve(value).unwrap_or(value)
    }

    /// This stylesheet's tokens layered over the built-in palette
    pub fn over_default(mut self) -> Self {
        for (token, color) in DEFAULT_PALETTE {
            self.colors
                .entry((*token).to_string())
                .or_insert_with(|| (*color).to_string());
        }
        self
    }
}

impl FromStr for Stylesheet {
    type Err = StylesheetError;

    /// Load stylesheet from TOML string
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let parsed: TomlStylesheet = toml::from_str(content)?;

        Ok(Stylesheet {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            colors: parsed.colors,
        })
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self {
            name: Some("default".to_string()),
            description: None,
            colors: DEFAULT_PALETTE
                .iter()
                .map(|(token, color)| ((*token).to_string(), (*color).to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stylesheet() {
        let stylesheet = Stylesheet::default();
        assert!(stylesheet.colors.contains_key("ink"));
        assert!(stylesheet.colors.contains_key("paper"));
        assert!(stylesheet.colors.contains_key("accent"));
    }

    #[test]
    fn test_resolve_existing_token() {
        let stylesheet = Stylesheet::default();
        assert_eq!(stylesheet.resolve("ink"), Some("#1a1a1a"));
        assert_eq!(stylesheet.resolve("accent"), Some("#2196f3"));
    }

    #[test]
    fn test_resolve_missing_token() {
        let stylesheet = Stylesheet::default();
        assert_eq!(stylesheet.resolve("nonexistent"), None);
    }

    #[test]
    fn test_resolve_value_passes_through_unknown() {
        let stylesheet = Stylesheet::default();
        assert_eq!(stylesheet.resolve_value("accent"), "#2196f3");
        assert_eq!(stylesheet.resolve_value("red"), "red");
        assert_eq!(Stylesheet::empty().resolve_value("accent"), "accent");
    }

    #[test]
    fn test_with_color_overrides() {
        let stylesheet = Stylesheet::default().with_color("accent", "#000000");
        assert_eq!(stylesheet.resolve("accent"), Some("#000000"));
    }

    #[test]
    fn test_over_default_keeps_own_tokens() {
        let stylesheet = Stylesheet::empty().with_color("ink", "#222222").over_default();
        assert_eq!(stylesheet.resolve("ink"), Some("#222222"));
        assert_eq!(stylesheet.resolve("paper"), Some("#ffffff"));
    }

    #[test]
    fn test_parse_toml_with_metadata() {
        let toml_str = r##"
[metadata]
name = "Test Theme"
description = "A test theme"

[colors]
ink = "#000000"
"##;
        let stylesheet: Stylesheet = toml_str.parse().expect("Should parse");
        assert_eq!(stylesheet.name, Some("Test Theme".to_string()));
        assert_eq!(stylesheet.description, Some("A test theme".to_string()));
        assert_eq!(stylesheet.resolve("ink"), Some("#000000"));
    }

    #[test]
    fn test_parse_toml_without_metadata() {
        let toml_str = r##"
[colors]
ink = "#111111"
"##;
        let stylesheet: Stylesheet = toml_str.parse().expect("Should parse");
        assert_eq!(stylesheet.name, None);
        assert_eq!(stylesheet.resolve("ink"), Some("#111111"));
    }

    #[test]
    fn test_invalid_toml_error() {
        let invalid = "this is not valid toml {{{{";
        let result = invalid.parse::<Stylesheet>();
        assert!(matches!(result, Err(StylesheetError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_error() {
        let result = Stylesheet::from_file(Path::new("/nonexistent/palette.toml"));
        assert!(matches!(result, Err(StylesheetError::IoError(_))));
    }
}
