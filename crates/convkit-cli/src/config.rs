//! Configuration file and presets support.

use convkit_core::{Options, OptionsExt};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default CLI options.
    pub defaults: Defaults,
    /// User-defined presets, in file order.
    pub presets: IndexMap<String, Preset>,
}

/// Default CLI options.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Enable verbose output by default.
    pub verbose: bool,
    /// Enable quiet output by default.
    pub quiet: bool,
    /// Pretty-print JSON output by default.
    pub pretty: bool,
}

// ============================================================================
// Preset
// ============================================================================

/// A preset is a named bundle of operation options.
///
/// ```toml
/// [presets.wide-json]
/// operation = "json-format"
/// description = "Four-space JSON"
/// options = { indent = 4 }
/// ```
///
/// Without `operation` the preset applies to any operation that accepts its
/// options.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub operation: Option<String>,
    pub description: Option<String>,
    pub options: Options,
}

impl Preset {
    fn builtin(operation: &str, description: &str, options: Options) -> Self {
        Self {
            operation: Some(operation.to_string()),
            description: Some(description.to_string()),
            options,
        }
    }

    /// Whether this preset may be used with `operation_id`.
    pub fn applies_to(&self, operation_id: &str) -> bool {
        self.operation.as_deref().is_none_or(|op| op == operation_id)
    }

    /// One-line summary for listings.
    pub fn summary(&self) -> String {
        let options = self
            .options
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        let target = self.operation.as_deref().unwrap_or("any operation");
        match &self.description {
            Some(desc) => format!("{desc} [{target}] {options}"),
            None => format!("[{target}] {options}"),
        }
        .trim_end()
        .to_string()
    }
}

impl Config {
    /// Load config from the default location (~/.config/convkit/config.toml).
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Load config from a specific path.
    ///
    /// A missing file yields defaults; an unreadable or malformed one warns
    /// and yields defaults.
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "failed to parse config file: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read config file: {e}");
                Self::default()
            }
        }
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("convkit").join("config.toml"))
    }

    /// Get a preset by name (user-defined or built-in).
    pub fn get_preset(&self, name: &str) -> Option<Preset> {
        // User-defined presets shadow built-ins
        if let Some(preset) = self.presets.get(name) {
            return Some(preset.clone());
        }

        builtin_preset(name)
    }

    /// Every preset name, built-ins first.
    pub fn preset_names(&self) -> Vec<&str> {
        BUILTIN_PRESETS
            .iter()
            .map(|(name, _)| *name)
            .chain(self.presets.keys().map(String::as_str))
            .collect()
    }
}

const BUILTIN_PRESETS: &[(&str, &str)] = &[
    ("pretty-json", "Sorted keys, 2-space indent"),
    ("wide-json", "4-space indent"),
    ("strong-password", "32 characters, all classes"),
    ("pin", "6 digits"),
    ("tsv", "Tab-separated CSV to JSON"),
    ("sql-lower", "Format SQL without changing keyword case"),
];

/// Built-in preset by name, ignoring user presets.
pub fn builtin_preset(name: &str) -> Option<Preset> {
    let (_, description) = BUILTIN_PRESETS.iter().find(|(n, _)| *n == name)?;
    let preset = match name {
        "pretty-json" => Preset::builtin(
            "json-format",
            description,
            Options::new().with("indent", 2).with("sortKeys", true),
        ),
        "wide-json" => Preset::builtin("json-format", description, Options::new().with("indent", 4)),
        "strong-password" => Preset::builtin(
            "password-generate",
            description,
            Options::new().with("length", 32),
        ),
        "pin" => Preset::builtin(
            "password-generate",
            description,
            Options::new()
                .with("length", 6)
                .with("includeUppercase", false)
                .with("includeLowercase", false)
                .with("includeSymbols", false),
        ),
        "tsv" => Preset::builtin("csv-to-json", description, Options::new().with("delimiter", "\t")),
        "sql-lower" => Preset::builtin(
            "sql-format",
            description,
            Options::new().with("uppercase", false),
        ),
        _ => return None,
    };
    Some(preset)
}

/// List all built-in presets with descriptions.
pub fn list_presets() -> &'static [(&'static str, &'static str)] {
    BUILTIN_PRESETS
}
