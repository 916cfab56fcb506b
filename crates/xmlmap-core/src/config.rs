//! Serializer configuration.
//!
//! Provides [`SerializerConfig`] for the string, byte, and stream entry points of the
//! serializer. Values can be overridden from environment variables via
//! [`SerializerConfig::from_env`].

use std::env;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Output and input options for a serializer instance.
///
/// # Examples
///
/// ```
/// use xmlmap_core::SerializerConfig;
///
/// let config = SerializerConfig::builder().indent(Some(2)).build();
/// assert!(!config.write_declaration);
/// assert_eq!(config.indent, Some(2));
/// assert!(config.trim_text);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct SerializerConfig {
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` before the root element.
    #[builder(default = false)]
    pub write_declaration: bool,

    /// Pretty-print output with this many spaces per level.
    #[builder(default)]
    pub indent: Option<usize>,

    /// Treat whitespace-only text nodes as insignificant when reading.
    #[builder(default = true)]
    pub trim_text: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            write_declaration: false,
            indent: None,
            trim_text: true,
        }
    }
}

impl SerializerConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `XMLMAP_WRITE_DECLARATION`, `XMLMAP_INDENT`, and `XMLMAP_TRIM_TEXT`;
    /// unset or unparsable variables keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            write_declaration: env_bool("XMLMAP_WRITE_DECLARATION", defaults.write_declaration),
            indent: env::var("XMLMAP_INDENT")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .or(defaults.indent),
            trim_text: env_bool("XMLMAP_TRIM_TEXT", defaults.trim_text),
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| {
        matches!(v.as_str(), "1" | "true" | "yes" | "TRUE" | "YES")
    })
}
