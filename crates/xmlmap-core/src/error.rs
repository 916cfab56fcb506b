//! Error types for schema construction, reading, and writing.
//!
//! Every failure is fail-fast: the first error aborts the enclosing top-level
//! `deserialize`/`serialize`/`build` call and propagates to the caller unchanged.

use std::fmt;
use std::io;

use crate::cursor::Position;

/// A schema could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two attribute mappings on one element share a qualified name.
    #[error("'{element}' contains multiple attribute mappings with name '{name}'")]
    DuplicateAttribute {
        /// The element declaring the duplicates.
        element: String,
        /// The duplicated qualified name.
        name: String,
    },

    /// Two child element mappings on one element share a qualified name.
    #[error("'{element}' contains multiple child element mappings with name '{name}'")]
    DuplicateElement {
        /// The element declaring the duplicates.
        element: String,
        /// The duplicated qualified name.
        name: String,
    },

    /// More than one any-attribute fallback was declared.
    #[error("only one any-attribute mapping is allowed on '{element}'")]
    DuplicateAnyAttribute {
        /// The offending element.
        element: String,
    },

    /// More than one any-element fallback was declared.
    #[error("only one any-element mapping is allowed on '{element}'")]
    DuplicateAnyElement {
        /// The offending element.
        element: String,
    },

    /// More than one text content mapping was declared.
    #[error("only one text content mapping is allowed on '{element}'")]
    DuplicateTextContent {
        /// The offending element.
        element: String,
    },

    /// A declared type has no way to be instantiated.
    #[error("no constructor available for type {type_name}")]
    MissingConstructor {
        /// The Rust type name.
        type_name: &'static str,
    },

    /// The same type was declared twice as a root element.
    #[error("type {type_name} is declared more than once")]
    DuplicateType {
        /// The Rust type name.
        type_name: &'static str,
    },
}

/// The structural problem behind a [`MapError::Format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// The element's local name differs from the expected mapping.
    UnexpectedName,
    /// The element's local name matches but its namespace differs.
    UnexpectedNamespace,
    /// The document ended inside an open element.
    UnexpectedEof,
    /// The document contains no root element.
    MissingRoot,
    /// A prefix is used without a namespace declaration in scope.
    UnboundPrefix,
    /// The markup itself is not well formed.
    Malformed,
    /// Write calls were not balanced (e.g. an attribute after content).
    UnbalancedWrite,
}

impl fmt::Display for FormatErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnexpectedName => "unexpected element name",
            Self::UnexpectedNamespace => "unexpected element namespace",
            Self::UnexpectedEof => "unexpected end of document",
            Self::MissingRoot => "missing root element",
            Self::UnboundPrefix => "unbound namespace prefix",
            Self::Malformed => "malformed markup",
            Self::UnbalancedWrite => "unbalanced write",
        })
    }
}

/// A wire value could not be converted to or from its typed form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert '{value}' to {target}: {reason}")]
pub struct ConversionError {
    /// The offending wire value.
    pub value: String,
    /// The target type name.
    pub target: &'static str,
    /// Why the conversion failed.
    pub reason: String,
}

impl ConversionError {
    /// Create a conversion error for a wire value and target type.
    #[must_use]
    pub fn new(value: &str, target: &'static str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_owned(),
            target,
            reason: reason.into(),
        }
    }
}

/// Errors raised while building schemas or mapping documents.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The schema is invalid.
    #[error("schema build error: {0}")]
    Schema(#[from] SchemaError),

    /// The document does not have the expected shape at this position.
    #[error("{kind}: {message} at {position}")]
    Format {
        /// What went wrong.
        kind: FormatErrorKind,
        /// Human readable detail.
        message: String,
        /// Where in the document.
        position: Position,
    },

    /// A scalar value could not be converted.
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// No mapping is registered for the requested type.
    #[error("unable to determine how to map objects of type {type_name}")]
    UnsupportedType {
        /// The Rust type name.
        type_name: String,
    },

    /// The external validator rejected the document.
    #[error("document validation failed: {0}")]
    Validation(String),

    /// An I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// An error from quick-xml attribute handling.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
}

impl MapError {
    /// Create a format error at the given position.
    #[must_use]
    pub fn format(kind: FormatErrorKind, message: impl Into<String>, position: Position) -> Self {
        Self::Format {
            kind,
            message: message.into(),
            position,
        }
    }

    /// Create an unsupported-type error.
    #[must_use]
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// The format error kind, if this is a format error.
    #[must_use]
    pub fn format_kind(&self) -> Option<FormatErrorKind> {
        match self {
            Self::Format { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Convenience result type for mapping operations.
pub type MapResult<T> = Result<T, MapError>;
