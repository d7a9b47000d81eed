//! Parameter documents.
//!
//! A parameter document is an ordered mapping with one required key,
//! `main`, holding the loop structure. An optional `plugins` list names the
//! plugins a run needs. Every other top-level mapping is a template that
//! setup and teardown lists can refer to by name.
//!
//! Documents can be written as YAML, JSON, or TOML; key order is kept in
//! all three formats because it determines the iteration order.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};

/// Key of the main loop.
pub const MAIN_KEY: &str = "main";
/// Key of the plugin list.
pub const PLUGINS_KEY: &str = "plugins";

/// Serialization format of a parameter document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// YAML (`.yaml`, `.yml`)
    Yaml,
    /// JSON (`.json`)
    Json,
    /// TOML (`.toml`)
    Toml,
}

impl Format {
    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        extension.parse()
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Yaml => write!(f, "yaml"),
            Format::Json => write!(f, "json"),
            Format::Toml => write!(f, "toml"),
        }
    }
}

/// A loaded parameter document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterDocument(Map<String, Value>);

impl ParameterDocument {
    /// Wraps a JSON value; the root must be a mapping.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self(root)),
            other => Err(Error::validation(format!(
                "Document root must be a mapping, found {}",
                kind_of(&other)
            ))),
        }
    }

    /// Parses a document from text in the given format.
    pub fn parse(text: &str, format: Format) -> Result<Self> {
        let value: Value = match format {
            Format::Yaml => serde_yaml::from_str(text)?,
            Format::Json => serde_json::from_str(text)?,
            Format::Toml => toml::from_str(text)?,
        };
        Self::from_value(value)
    }

    /// Reads a document from a file, detecting the format by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), %format, "Loading parameter document");
        Self::parse(&text, format)
    }

    /// Returns the document exactly as it was loaded.
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns the main loop mapping.
    pub fn main_loop(&self) -> Result<&Map<String, Value>> {
        match self.0.get(MAIN_KEY) {
            Some(Value::Object(main)) => Ok(main),
            Some(other) => Err(Error::validation_field(
                MAIN_KEY,
                format!("main loop must be a mapping, found {}", kind_of(other)),
            )),
            None => Err(Error::MissingMainLoop),
        }
    }

    /// Looks up a top-level template by name.
    ///
    /// Only mappings other than the main loop are templates.
    pub fn template(&self, name: &str) -> Option<&Map<String, Value>> {
        if name == MAIN_KEY {
            return None;
        }
        self.0.get(name).and_then(Value::as_object)
    }

    /// Returns the plugin names listed under `plugins`.
    pub fn plugins(&self) -> Result<Vec<String>> {
        let Some(plugins) = self.0.get(PLUGINS_KEY) else {
            return Ok(Vec::new());
        };
        let entries = match plugins {
            Value::Array(entries) => entries.as_slice(),
            Value::String(_) => std::slice::from_ref(plugins),
            other => {
                return Err(Error::validation_field(
                    PLUGINS_KEY,
                    format!("expected a list of names, found {}", kind_of(other)),
                ));
            }
        };
        entries
            .iter()
            .map(|entry| {
                entry.as_str().map(str::to_string).ok_or_else(|| {
                    Error::validation_field(PLUGINS_KEY, format!("plugin name {entry} is not a string"))
                })
            })
            .collect()
    }

    /// Converts the document back into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl FromStr for ParameterDocument {
    type Err = Error;

    /// Parses YAML, which also accepts JSON documents.
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, Format::Yaml)
    }
}

/// Describes the JSON kind of a value for error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
