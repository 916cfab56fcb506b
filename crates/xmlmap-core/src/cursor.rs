//! Pull and push cursor capabilities.
//!
//! The mapping engine never talks to a parser or writer directly. It drives an
//! [`XmlRead`] cursor positioned on element-start, element-end, and text nodes, and an
//! [`XmlWrite`] cursor that emits the same constructs. Namespace prefixes are resolved
//! by the cursor; the engine only ever sees qualified [`XName`]s.

use std::fmt;

use crate::error::{FormatErrorKind, MapError, MapResult};
use crate::name::XName;
use crate::node::XAttribute;

/// A location in the source document, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// 0-based byte offset.
    pub offset: usize,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    /// Compute the line and column of a byte offset within `source`.
    #[must_use]
    pub fn locate(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self {
            line,
            column,
            offset,
        }
    }

    /// Move this position forward to `offset` within `source`, scanning only the bytes
    /// in between. Falls back to [`Position::locate`] when `offset` lies behind.
    #[must_use]
    pub fn advance_to(self, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        if offset < self.offset {
            return Self::locate(source, offset);
        }
        let Some(between) = source.get(self.offset..offset) else {
            return Self::locate(source, offset);
        };
        let (mut line, mut column) = (self.line.max(1), self.column.max(1));
        for ch in between.chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// An element-start event with its resolved attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// The element's qualified name.
    pub name: XName,
    /// Attributes in document order, namespace declarations excluded.
    pub attributes: Vec<XAttribute>,
    /// Whether the element was written as `<name/>`. No end event follows an empty element.
    pub is_empty: bool,
}

impl StartTag {
    /// The attribute at `index`, in document order.
    #[must_use]
    pub fn attribute(&self, index: usize) -> Option<&XAttribute> {
        self.attributes.get(index)
    }
}

/// The node a read cursor is positioned on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Before the first node of the document.
    Initial,
    /// An element start.
    Start(StartTag),
    /// An element end.
    End(XName),
    /// Significant character data (entities resolved, CDATA merged).
    Text(String),
    /// The end of the document.
    Eof,
}

/// A pull cursor over an XML document.
///
/// Element readers follow one convention: they are entered with the cursor on the
/// element's [`XmlNode::Start`] and return with the cursor on that element's last
/// node (its [`XmlNode::End`], or the start itself for an empty element).
pub trait XmlRead {
    /// The current node.
    fn current(&self) -> &XmlNode;

    /// Move to the next node.
    ///
    /// # Errors
    ///
    /// Returns `MapError` if the underlying stream fails or the markup is malformed.
    fn advance(&mut self) -> MapResult<()>;

    /// The position of the current node.
    fn position(&self) -> Position;

    /// Skip prolog, comments, and whitespace until the root element start.
    fn move_to_content(&mut self) -> MapResult<()> {
        loop {
            match self.current() {
                XmlNode::Start(_) => return Ok(()),
                XmlNode::Eof => {
                    return Err(MapError::format(
                        FormatErrorKind::MissingRoot,
                        "document has no root element",
                        self.position(),
                    ));
                }
                _ => self.advance()?,
            }
        }
    }

    /// The attribute at `index` on the current element start.
    fn attribute(&self, index: usize) -> Option<&XAttribute> {
        match self.current() {
            XmlNode::Start(tag) => tag.attribute(index),
            _ => None,
        }
    }

    /// Skip the current element and all its children.
    fn skip_element(&mut self) -> MapResult<()> {
        if !current_has_content(self.current()) {
            return Ok(());
        }
        let mut depth: u32 = 1;
        loop {
            self.advance()?;
            match self.current() {
                XmlNode::Start(tag) if !tag.is_empty => depth += 1,
                XmlNode::End(_) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                XmlNode::Eof => return Err(unexpected_eof(self.position(), "skipping element")),
                _ => {}
            }
        }
    }

    /// Read the concatenated text content of the current element.
    ///
    /// Nested elements are skipped; only direct character data is collected.
    fn read_element_text(&mut self) -> MapResult<String> {
        let mut text = String::new();
        if !current_has_content(self.current()) {
            return Ok(text);
        }
        loop {
            self.advance()?;
            match self.current() {
                XmlNode::Text(t) => text.push_str(t),
                XmlNode::Start(_) => self.skip_element()?,
                XmlNode::End(_) => return Ok(text),
                XmlNode::Eof => {
                    return Err(unexpected_eof(self.position(), "reading text content"));
                }
                XmlNode::Initial => {}
            }
        }
    }
}

fn current_has_content(node: &XmlNode) -> bool {
    matches!(node, XmlNode::Start(tag) if !tag.is_empty)
}

fn unexpected_eof(position: Position, context: &str) -> MapError {
    MapError::format(
        FormatErrorKind::UnexpectedEof,
        format!("unexpected EOF while {context}"),
        position,
    )
}

/// A push cursor emitting an XML document.
///
/// Attributes may only be written between [`XmlWrite::start_element`] and the first
/// text or child element of that element.
pub trait XmlWrite {
    /// Open an element.
    fn start_element(&mut self, name: &XName) -> MapResult<()>;

    /// Add an attribute to the element opened last.
    fn attribute(&mut self, name: &XName, value: &str) -> MapResult<()>;

    /// Write character data.
    fn text(&mut self, text: &str) -> MapResult<()>;

    /// Close the element opened last.
    fn end_element(&mut self) -> MapResult<()>;

    /// Flush buffered output to the underlying sink.
    fn flush(&mut self) -> MapResult<()>;

    /// Write `<name>text</name>`.
    fn text_element(&mut self, name: &XName, text: &str) -> MapResult<()> {
        self.start_element(name)?;
        self.text(text)?;
        self.end_element()
    }
}
