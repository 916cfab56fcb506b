//! The serializer facade: a schema description plus configuration.
//!
//! A [`Serializer`] is immutable once constructed and can be shared across threads
//! (`Arc<Serializer>` or plain clones); every call drives its own cursor.

use std::any::type_name;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use tracing::trace;
use xmlmap_core::{
    FormatErrorKind, MapError, MapResult, Position, SerializerConfig, XmlNode, XmlRead, XmlWrite,
};
use xmlmap_schema::{ElementMapping, SchemaDescription};

use crate::read::read_element;
use crate::reader::QuickXmlReader;
use crate::write::write_element;
use crate::writer::QuickXmlWriter;

/// An external structural check run over the raw document before it is mapped.
pub trait DocumentValidator: Send + Sync {
    /// Accept the document, or reject it with a human-readable reason.
    fn validate(&self, document: &str) -> Result<(), String>;
}

impl<F> DocumentValidator for F
where
    F: Fn(&str) -> Result<(), String> + Send + Sync,
{
    fn validate(&self, document: &str) -> Result<(), String> {
        self(document)
    }
}

/// Reads and writes object graphs described by a [`SchemaDescription`].
#[derive(Clone)]
pub struct Serializer {
    schema: Arc<SchemaDescription>,
    config: SerializerConfig,
    validator: Option<Arc<dyn DocumentValidator>>,
}

impl Serializer {
    /// Create a serializer with default configuration.
    pub fn new(schema: impl Into<Arc<SchemaDescription>>) -> Self {
        Self {
            schema: schema.into(),
            config: SerializerConfig::default(),
            validator: None,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: SerializerConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a validator used by [`Serializer::from_str_validated`].
    #[must_use]
    pub fn with_validator(mut self, validator: impl DocumentValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// The schema this serializer maps with.
    #[must_use]
    pub fn schema(&self) -> &SchemaDescription {
        &self.schema
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    fn mapping_of<T: 'static>(&self) -> MapResult<&ElementMapping> {
        self.schema
            .mapping_for::<T>()
            .map(Arc::as_ref)
            .ok_or_else(|| MapError::unsupported(type_name::<T>()))
    }

    /// Read the document's root element as a `T`.
    ///
    /// A fresh cursor is first moved to the root element; a cursor already positioned
    /// on an element start reads that element.
    pub fn deserialize<T: 'static>(&self, reader: &mut dyn XmlRead) -> MapResult<T> {
        let mapping = self.mapping_of::<T>()?;
        if matches!(reader.current(), XmlNode::Initial) {
            reader.advance()?;
        }
        reader.move_to_content()?;
        trace!(root = %mapping.name(), "reading document");

        let value = read_element(mapping, reader)?;
        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| MapError::unsupported(type_name::<T>()))
    }

    /// Write `value` as an element through `writer`.
    ///
    /// The writer is not flushed.
    pub fn serialize<T: 'static>(&self, writer: &mut dyn XmlWrite, value: &T) -> MapResult<()> {
        let mapping = self.mapping_of::<T>()?;
        trace!(root = %mapping.name(), "writing document");
        write_element(mapping, value, writer)
    }

    /// Parse `xml` into a `T`.
    pub fn from_str<T: 'static>(&self, xml: &str) -> MapResult<T> {
        let mut reader = QuickXmlReader::with_config(xml, &self.config);
        self.deserialize(&mut reader)
    }

    /// Parse UTF-8 encoded `bytes` into a `T`.
    pub fn from_slice<T: 'static>(&self, bytes: &[u8]) -> MapResult<T> {
        let xml = std::str::from_utf8(bytes).map_err(|e| {
            MapError::format(
                FormatErrorKind::Malformed,
                format!("document is not valid UTF-8: {e}"),
                Position::locate(&String::from_utf8_lossy(bytes), e.valid_up_to()),
            )
        })?;
        self.from_str(xml)
    }

    /// Read a whole document from `source` and parse it into a `T`.
    pub fn from_reader<T: 'static>(&self, mut source: impl Read) -> MapResult<T> {
        let mut xml = String::new();
        source.read_to_string(&mut xml)?;
        self.from_str(&xml)
    }

    /// Run the configured validator over `xml`, then parse it into a `T`.
    ///
    /// # Errors
    ///
    /// Returns `MapError::Validation` if no validator is configured or it rejects the
    /// document.
    pub fn from_str_validated<T: 'static>(&self, xml: &str) -> MapResult<T> {
        let validator = self.validator.as_ref().ok_or_else(|| {
            MapError::Validation("validation requested but no validator is configured".to_owned())
        })?;
        validator.validate(xml).map_err(MapError::Validation)?;
        self.from_str(xml)
    }

    /// Write `value` as a document into `sink`.
    pub fn to_writer<T: 'static>(&self, sink: impl Write, value: &T) -> MapResult<()> {
        self.write_document(sink, value).map(drop)
    }

    /// Write `value` as a document into a byte vector.
    pub fn to_vec<T: 'static>(&self, value: &T) -> MapResult<Vec<u8>> {
        self.write_document(Vec::new(), value)
    }

    /// Write `value` as a document into a string.
    pub fn to_string<T: 'static>(&self, value: &T) -> MapResult<String> {
        let bytes = self.to_vec(value)?;
        String::from_utf8(bytes).map_err(|e| {
            MapError::format(
                FormatErrorKind::Malformed,
                format!("writer produced invalid UTF-8: {e}"),
                Position::default(),
            )
        })
    }

    fn write_document<T: 'static, W: Write>(&self, sink: W, value: &T) -> MapResult<W> {
        let mut writer = match self.config.indent {
            Some(indent) => QuickXmlWriter::with_indent(sink, indent),
            None => QuickXmlWriter::new(sink),
        };
        if self.config.write_declaration {
            writer.write_declaration()?;
        }
        self.serialize(&mut writer, value)?;
        writer.flush()?;
        Ok(writer.into_inner())
    }
}

impl fmt::Debug for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("types", &self.schema.len())
            .field("config", &self.config)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
