//! Raw captured markup.
//!
//! These types hold wire content that no mapping models: overflow attributes and
//! elements are captured into them on read and replayed verbatim on write.

use crate::cursor::{XmlNode, XmlRead, XmlWrite};
use crate::error::{FormatErrorKind, MapError, MapResult};
use crate::name::XName;

/// A captured attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XAttribute {
    /// The attribute's qualified name.
    pub name: XName,
    /// The unescaped attribute value.
    pub value: String,
}

impl XAttribute {
    /// Create an attribute.
    #[must_use]
    pub fn new(name: impl Into<XName>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Emit this attribute on the element currently being written.
    ///
    /// # Errors
    ///
    /// Returns `MapError` if the writer rejects the attribute.
    pub fn write_to(&self, writer: &mut dyn XmlWrite) -> MapResult<()> {
        writer.attribute(&self.name, &self.value)
    }
}

/// A captured child node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XNode {
    /// A nested element.
    Element(XElement),
    /// Character data.
    Text(String),
}

/// A captured element subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XElement {
    /// The element's qualified name.
    pub name: XName,
    /// Attributes in document order.
    pub attributes: Vec<XAttribute>,
    /// Child nodes in document order.
    pub children: Vec<XNode>,
}

impl XElement {
    /// Create an empty element.
    #[must_use]
    pub fn new(name: impl Into<XName>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<XName>, value: impl Into<String>) -> Self {
        self.attributes.push(XAttribute::new(name, value));
        self
    }

    /// Add a child element.
    #[must_use]
    pub fn with_child(mut self, child: XElement) -> Self {
        self.children.push(XNode::Element(child));
        self
    }

    /// Add character data.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XNode::Text(text.into()));
        self
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &XElement> {
        self.children.iter().filter_map(|node| match node {
            XNode::Element(e) => Some(e),
            XNode::Text(_) => None,
        })
    }

    /// The concatenated direct text of this element.
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XNode::Text(t) => Some(t.as_str()),
                XNode::Element(_) => None,
            })
            .collect()
    }

    /// The value of the attribute with the given name.
    #[must_use]
    pub fn attribute(&self, name: &XName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Capture the element the cursor is positioned on, including its subtree.
    ///
    /// The cursor is left on the element's last node.
    ///
    /// # Errors
    ///
    /// Returns `MapError` if the cursor is not on an element start or the subtree is
    /// truncated.
    pub fn read_from(reader: &mut dyn XmlRead) -> MapResult<Self> {
        let (mut element, is_empty) = match reader.current() {
            XmlNode::Start(tag) => (
                Self {
                    name: tag.name.clone(),
                    attributes: tag.attributes.clone(),
                    children: Vec::new(),
                },
                tag.is_empty,
            ),
            _ => {
                return Err(MapError::format(
                    FormatErrorKind::Malformed,
                    "expected an element start",
                    reader.position(),
                ));
            }
        };
        if is_empty {
            return Ok(element);
        }
        loop {
            reader.advance()?;
            match reader.current() {
                XmlNode::Start(_) => {
                    let child = Self::read_from(reader)?;
                    element.children.push(XNode::Element(child));
                }
                XmlNode::Text(t) => element.children.push(XNode::Text(t.clone())),
                XmlNode::End(_) => return Ok(element),
                XmlNode::Eof => {
                    return Err(MapError::format(
                        FormatErrorKind::UnexpectedEof,
                        format!("unexpected EOF inside <{}>", element.name),
                        reader.position(),
                    ));
                }
                XmlNode::Initial => {}
            }
        }
    }

    /// Replay this element and its subtree.
    ///
    /// # Errors
    ///
    /// Returns `MapError` if the writer fails.
    pub fn write_to(&self, writer: &mut dyn XmlWrite) -> MapResult<()> {
        writer.start_element(&self.name)?;
        for attr in &self.attributes {
            attr.write_to(writer)?;
        }
        for child in &self.children {
            match child {
                XNode::Element(e) => e.write_to(writer)?,
                XNode::Text(t) => writer.text(t)?,
            }
        }
        writer.end_element()
    }
}
