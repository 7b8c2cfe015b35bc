//! JSON control-surface descriptions
//!
//! A description is a JSON object. Its top level is the root component handed
//! to the layout template; two keys have special meaning:
//!
//! - `data`: shared read-only values referenced with `{{data.…}}`
//! - `reusable_components`: named component trees templates may insert

use std::path::{Path, PathBuf};

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Errors that can occur while loading a description
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("description file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read description file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid description JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("description must be a JSON object, found {kind}")]
    NotAnObject { kind: &'static str },
}

/// A parsed description, immutable once loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    root: Map<String, JsonValue>,
}

impl Description {
    /// Load a description from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, DescriptionError> {
        if !path.is_file() {
            return Err(DescriptionError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|source| DescriptionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse a description from JSON text
    pub fn from_str(content: &str) -> Result<Self, DescriptionError> {
        let value: JsonValue = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Wrap an already-parsed JSON value
    pub fn from_value(value: JsonValue) -> Result<Self, DescriptionError> {
        match value {
            JsonValue::Object(root) => Ok(Self { root }),
            other => Err(DescriptionError::NotAnObject {
                kind: crate::placeholder::json_kind(&other),
            }),
        }
    }

    /// The whole description, bound as the root component
    pub fn root(&self) -> &Map<String, JsonValue> {
        &self.root
    }

    /// The shared `data` tree, if present
    pub fn data(&self) -> Option<&JsonValue> {
        self.root.get("data")
    }

    /// The `reusable_components` tree, if present
    pub fn reusable_components(&self) -> Option<&JsonValue> {
        self.root.get("reusable_components")
    }
}
