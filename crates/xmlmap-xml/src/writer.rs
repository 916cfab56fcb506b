//! quick-xml backed push cursor.
//!
//! The start tag of the element opened last stays pending until its first child, its
//! first text, or its end, so attributes can still be added. An element closed while
//! pending is written as `<name />`.
//!
//! Namespaces are declared where needed: an element whose namespace differs from the
//! in-scope default gets an `xmlns` declaration, and a namespaced attribute reuses an
//! in-scope prefix or declares a generated `nsN` one. Declarations follow the regular
//! attributes.

use std::fmt;
use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use xmlmap_core::{FormatErrorKind, MapError, MapResult, Position, XML_NAMESPACE, XName, XmlWrite};

#[derive(Debug)]
struct PendingStart {
    name: XName,
    attributes: Vec<(XName, String)>,
}

#[derive(Debug)]
struct OpenElement {
    tag: String,
    default_namespace: Option<String>,
    prefixes: Vec<(String, String)>,
}

/// A push cursor writing to any `io::Write` sink.
pub struct QuickXmlWriter<W: Write> {
    writer: Writer<W>,
    pending: Option<PendingStart>,
    open: Vec<OpenElement>,
    generated: usize,
}

impl<W: Write> QuickXmlWriter<W> {
    /// Create a compact writer.
    pub fn new(inner: W) -> Self {
        Self::from_writer(Writer::new(inner))
    }

    /// Create a writer indenting nested elements by `indent` spaces.
    pub fn with_indent(inner: W, indent: usize) -> Self {
        Self::from_writer(Writer::new_with_indent(inner, b' ', indent))
    }

    fn from_writer(writer: Writer<W>) -> Self {
        Self {
            writer,
            pending: None,
            open: Vec::new(),
            generated: 0,
        }
    }

    /// Write `<?xml version="1.0" encoding="UTF-8"?>`. Call before the root element.
    ///
    /// # Errors
    ///
    /// Returns `MapError` if the sink fails or an element was already started.
    pub fn write_declaration(&mut self) -> MapResult<()> {
        if self.pending.is_some() || !self.open.is_empty() {
            return Err(unbalanced("declaration after the root element"));
        }
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    /// Return the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn in_scope_default(&self) -> Option<&str> {
        self.open
            .last()
            .and_then(|element| element.default_namespace.as_deref())
    }

    fn in_scope_prefix(&self, namespace: &str) -> Option<&str> {
        self.open
            .iter()
            .rev()
            .flat_map(|element| element.prefixes.iter())
            .find(|(_, uri)| uri == namespace)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Write the pending start tag as `<name ...>` or, if `empty`, `<name ... />`.
    fn flush_pending(&mut self, empty: bool) -> MapResult<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };

        let inherited = self.in_scope_default().map(str::to_owned);
        let element_namespace = pending.name.namespace().map(str::to_owned);
        let mut declarations: Vec<(String, String)> = Vec::new();
        if element_namespace != inherited {
            declarations.push((
                "xmlns".to_owned(),
                element_namespace.clone().unwrap_or_default(),
            ));
        }

        let mut prefixes: Vec<(String, String)> = Vec::new();
        let mut attributes: Vec<(String, String)> = Vec::with_capacity(pending.attributes.len());
        for (name, value) in pending.attributes {
            let key = match name.namespace() {
                None => name.local_name().to_owned(),
                Some(XML_NAMESPACE) => format!("xml:{}", name.local_name()),
                Some(namespace) => {
                    let known = prefixes
                        .iter()
                        .find(|(_, uri)| uri == namespace)
                        .map(|(prefix, _)| prefix.clone())
                        .or_else(|| self.in_scope_prefix(namespace).map(str::to_owned));
                    let prefix = match known {
                        Some(prefix) => prefix,
                        None => {
                            let prefix = format!("ns{}", self.generated);
                            self.generated += 1;
                            declarations.push((format!("xmlns:{prefix}"), namespace.to_owned()));
                            prefixes.push((prefix.clone(), namespace.to_owned()));
                            prefix
                        }
                    };
                    format!("{prefix}:{}", name.local_name())
                }
            };
            attributes.push((key, value));
        }

        let tag = pending.name.local_name().to_owned();
        let mut start = BytesStart::new(tag.as_str());
        for (key, value) in attributes.iter().chain(declarations.iter()) {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if empty {
            self.writer.write_event(Event::Empty(spaced(&start, tag.len())?))?;
        } else {
            self.writer.write_event(Event::Start(start))?;
            self.open.push(OpenElement {
                tag,
                default_namespace: element_namespace,
                prefixes,
            });
        }
        Ok(())
    }
}

impl<W: Write> fmt::Debug for QuickXmlWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickXmlWriter")
            .field("pending", &self.pending)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

/// `start` with a trailing space, so an empty element ends in ` />`.
fn spaced(start: &BytesStart<'_>, name_len: usize) -> MapResult<BytesStart<'static>> {
    let content = std::str::from_utf8(start).map_err(|e| {
        MapError::format(FormatErrorKind::Malformed, e.to_string(), Position::default())
    })?;
    Ok(BytesStart::from_content(format!("{content} "), name_len))
}

fn unbalanced(message: &str) -> MapError {
    MapError::format(
        FormatErrorKind::UnbalancedWrite,
        message,
        Position::default(),
    )
}

impl<W: Write> XmlWrite for QuickXmlWriter<W> {
    fn start_element(&mut self, name: &XName) -> MapResult<()> {
        self.flush_pending(false)?;
        self.pending = Some(PendingStart {
            name: name.clone(),
            attributes: Vec::new(),
        });
        Ok(())
    }

    fn attribute(&mut self, name: &XName, value: &str) -> MapResult<()> {
        let pending = self
            .pending
            .as_mut()
            .ok_or_else(|| unbalanced("attribute written outside a start tag"))?;
        pending.attributes.push((name.clone(), value.to_owned()));
        Ok(())
    }

    fn text(&mut self, text: &str) -> MapResult<()> {
        self.flush_pending(false)?;
        if self.open.is_empty() {
            return Err(unbalanced("text written outside the root element"));
        }
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    fn end_element(&mut self) -> MapResult<()> {
        if self.pending.is_some() {
            return self.flush_pending(true);
        }
        let element = self
            .open
            .pop()
            .ok_or_else(|| unbalanced("end_element without an open element"))?;
        self.writer
            .write_event(Event::End(BytesEnd::new(element.tag)))?;
        Ok(())
    }

    fn flush(&mut self) -> MapResult<()> {
        if self.pending.is_some() || !self.open.is_empty() {
            return Err(unbalanced("document has unclosed elements"));
        }
        self.writer.get_mut().flush()?;
        Ok(())
    }
}
