//! quick-xml backed pull cursor.
//!
//! Wraps a `quick_xml::Reader` and turns its event stream into [`XmlNode`]s:
//! namespace prefixes are resolved against an in-scope declaration stack, adjacent
//! text, CDATA and entity references are merged into one text node, and comments,
//! processing instructions and the prolog are skipped.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use xmlmap_core::{
    FormatErrorKind, MapError, MapResult, Position, SerializerConfig, StartTag, XAttribute,
    XML_NAMESPACE, XName, XmlNode, XmlRead,
};

/// One namespace declaration; a `None` prefix is the default namespace.
#[derive(Debug)]
struct Binding {
    prefix: Option<String>,
    uri: String,
}

/// A pull cursor over an in-memory UTF-8 document.
#[derive(Debug)]
pub struct QuickXmlReader<'a> {
    reader: Reader<&'a [u8]>,
    source: &'a str,
    current: XmlNode,
    located: Position,
    peeked: Option<(Event<'a>, usize)>,
    scopes: Vec<Vec<Binding>>,
    open: Vec<XName>,
    close_empty: bool,
    trim_text: bool,
}

impl<'a> QuickXmlReader<'a> {
    /// Create a reader with default configuration.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self::with_config(source, &SerializerConfig::default())
    }

    /// Create a reader honouring `config.trim_text`.
    #[must_use]
    pub fn with_config(source: &'a str, config: &SerializerConfig) -> Self {
        let mut reader = Reader::from_str(source);
        // Whitespace is judged after text, CDATA and entity references are merged.
        reader.config_mut().trim_text(false);
        Self {
            reader,
            source,
            current: XmlNode::Initial,
            located: Position::new(1, 1, 0),
            peeked: None,
            scopes: Vec::new(),
            open: Vec::new(),
            close_empty: false,
            trim_text: config.trim_text,
        }
    }

    /// Track the current node's position; offsets only grow while reading.
    fn move_to(&mut self, offset: usize) {
        self.located = self.located.advance_to(self.source, offset);
    }

    fn buffer_offset(&self) -> usize {
        usize::try_from(self.reader.buffer_position()).unwrap_or(usize::MAX)
    }

    fn malformed(&self, message: impl Into<String>) -> MapError {
        MapError::format(
            FormatErrorKind::Malformed,
            message,
            Position::locate(self.source, self.buffer_offset()),
        )
    }

    fn next_event(&mut self) -> MapResult<(Event<'a>, usize)> {
        if let Some(peeked) = self.peeked.take() {
            return Ok(peeked);
        }
        let offset = self.buffer_offset();
        match self.reader.read_event() {
            Ok(event) => Ok((event, offset)),
            Err(err) => Err(MapError::format(
                FormatErrorKind::Malformed,
                err.to_string(),
                Position::locate(self.source, offset),
            )),
        }
    }

    fn open_element(&mut self, start: &BytesStart<'_>, is_empty: bool) -> MapResult<StartTag> {
        let mut bindings = Vec::new();
        let mut raw = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = self.utf8(attr.key.as_ref())?.to_owned();
            let value = self.unescape(self.utf8(&attr.value)?)?.into_owned();
            if key == "xmlns" {
                bindings.push(Binding { prefix: None, uri: value });
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                bindings.push(Binding {
                    prefix: Some(prefix.to_owned()),
                    uri: value,
                });
            } else {
                raw.push((key, value));
            }
        }
        self.scopes.push(bindings);

        let name = self.resolve(self.utf8(start.name().as_ref())?, true)?;
        let attributes = raw
            .into_iter()
            .map(|(key, value)| -> MapResult<XAttribute> {
                Ok(XAttribute {
                    name: self.resolve(&key, false)?,
                    value,
                })
            })
            .collect::<MapResult<Vec<_>>>()?;

        if !is_empty {
            self.open.push(name.clone());
        }
        Ok(StartTag {
            name,
            attributes,
            is_empty,
        })
    }

    /// Resolve a raw `prefix:local` name. Unprefixed attributes have no namespace.
    fn resolve(&self, raw: &str, use_default: bool) -> MapResult<XName> {
        match raw.split_once(':') {
            Some((prefix, local)) => {
                let namespace = self.lookup(Some(prefix)).ok_or_else(|| {
                    MapError::format(
                        FormatErrorKind::UnboundPrefix,
                        format!("prefix '{prefix}' is not bound in <{raw}>"),
                        self.located,
                    )
                })?;
                Ok(XName::new(Some(namespace), local))
            }
            None if use_default => Ok(XName::new(self.lookup(None), raw)),
            None => Ok(XName::local(raw)),
        }
    }

    fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE);
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|binding| binding.prefix.as_deref() == prefix)
            .map(|binding| binding.uri.as_str())
    }

    fn utf8<'b>(&self, bytes: &'b [u8]) -> MapResult<&'b str> {
        std::str::from_utf8(bytes).map_err(|e| self.malformed(e.to_string()))
    }

    fn unescape<'b>(&self, text: &'b str) -> MapResult<Cow<'b, str>> {
        quick_xml::escape::unescape(text).map_err(|e| self.malformed(e.to_string()))
    }
}

/// The replacement of a predefined entity or character reference.
fn resolve_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => {
            let hex = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"));
            let code = if let Some(hex) = hex {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(decimal) = name.strip_prefix('#') {
                decimal.parse::<u32>().ok()
            } else {
                None
            };
            code.and_then(char::from_u32)
        }
    }
}

impl XmlRead for QuickXmlReader<'_> {
    fn current(&self) -> &XmlNode {
        &self.current
    }

    fn advance(&mut self) -> MapResult<()> {
        if self.close_empty {
            self.close_empty = false;
            self.scopes.pop();
        }

        let mut text: Option<(String, usize)> = None;
        loop {
            let (event, offset) = self.next_event()?;
            let structural = match event {
                Event::Text(e) => {
                    let decoded = e.decode().map_err(|err| self.malformed(err.to_string()))?;
                    let unescaped = self.unescape(&decoded)?;
                    text.get_or_insert_with(|| (String::new(), offset))
                        .0
                        .push_str(&unescaped);
                    continue;
                }
                Event::CData(e) => {
                    let content = self.utf8(&e)?;
                    text.get_or_insert_with(|| (String::new(), offset))
                        .0
                        .push_str(content);
                    continue;
                }
                Event::GeneralRef(e) => {
                    let name = self.utf8(&e)?;
                    let resolved = resolve_reference(name)
                        .ok_or_else(|| self.malformed(format!("unknown entity '&{name};'")))?;
                    text.get_or_insert_with(|| (String::new(), offset))
                        .0
                        .push(resolved);
                    continue;
                }
                Event::Start(_) | Event::Empty(_) | Event::End(_) | Event::Eof => event,
                _ => continue,
            };

            if let Some((content, text_offset)) = text.take() {
                if !(self.trim_text && content.trim().is_empty()) {
                    self.peeked = Some((structural, offset));
                    self.current = XmlNode::Text(content);
                    self.move_to(text_offset);
                    return Ok(());
                }
            }

            self.move_to(offset);
            self.current = match structural {
                Event::Start(e) => XmlNode::Start(self.open_element(&e, false)?),
                Event::Empty(e) => {
                    let tag = self.open_element(&e, true)?;
                    self.close_empty = true;
                    XmlNode::Start(tag)
                }
                Event::End(_) => {
                    self.scopes.pop();
                    let name = self
                        .open
                        .pop()
                        .ok_or_else(|| self.malformed("end tag without matching start tag"))?;
                    XmlNode::End(name)
                }
                _ => XmlNode::Eof,
            };
            return Ok(());
        }
    }

    fn position(&self) -> Position {
        self.located
    }
}
