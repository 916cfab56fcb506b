//! Shared vocabulary for the xmlmap crates.
//!
//! This crate provides the pieces every other xmlmap crate speaks in terms of:
//!
//! - [`XName`] and [`XNamespace`] for namespace-qualified names
//! - [`XmlRead`] / [`XmlWrite`], the pull and push cursor capabilities the mapping engine
//!   drives, with [`XmlNode`], [`StartTag`], and [`Position`]
//! - [`XAttribute`] / [`XElement`], raw captures of unmodeled content
//! - [`MapError`] and its parts, and [`SerializerConfig`]

mod config;
mod cursor;
mod error;
mod name;
mod node;

pub use config::SerializerConfig;
pub use cursor::{Position, StartTag, XmlNode, XmlRead, XmlWrite};
pub use error::{ConversionError, FormatErrorKind, MapError, MapResult, SchemaError};
pub use name::{XML_NAMESPACE, XName, XNamespace};
pub use node::{XAttribute, XElement, XNode};
