//! Read side of the serializer engine: XML nodes to an object graph.

use std::any::Any;

use tracing::trace;
use xmlmap_core::{
    FormatErrorKind, MapError, MapResult, Position, XAttribute, XName, XmlNode, XmlRead,
};
use xmlmap_schema::{ElementMapping, Mapping};

/// Verify that the element under the cursor is the one `mapping` describes.
///
/// A mapping without a namespace accepts its local name in any namespace. `position` is
/// only evaluated on a mismatch.
pub(crate) fn check_name(
    mapping: &ElementMapping,
    actual: &XName,
    position: impl Fn() -> Position,
) -> MapResult<()> {
    let expected = mapping.name();
    if expected.local_name() != actual.local_name() {
        return Err(MapError::format(
            FormatErrorKind::UnexpectedName,
            format!("expected element <{expected}> but found <{actual}>"),
            position(),
        ));
    }
    if let Some(namespace) = expected.namespace() {
        if actual.namespace() != Some(namespace) {
            return Err(MapError::format(
                FormatErrorKind::UnexpectedNamespace,
                format!("expected element <{expected}> but found <{actual}>"),
                position(),
            ));
        }
    }
    Ok(())
}

/// Read the element under the cursor into a new instance of the mapped type.
///
/// Entered on the element's start; returns with the cursor on its last node.
pub(crate) fn read_element(
    mapping: &ElementMapping,
    reader: &mut dyn XmlRead,
) -> MapResult<Box<dyn Any>> {
    let (attributes, is_empty) = match reader.current() {
        XmlNode::Start(tag) => {
            check_name(mapping, &tag.name, || reader.position())?;
            (tag.attributes.clone(), tag.is_empty)
        }
        _ => {
            return Err(MapError::format(
                FormatErrorKind::Malformed,
                format!("expected element <{}>", mapping.name()),
                reader.position(),
            ));
        }
    };

    let mut target = mapping.create_instance();
    for attribute in &attributes {
        read_attribute(mapping, target.as_mut(), attribute)?;
    }
    if is_empty {
        return Ok(target);
    }

    let mut text: Option<String> = None;
    let mut has_nodes = false;
    loop {
        reader.advance()?;
        if !matches!(reader.current(), XmlNode::End(_)) {
            has_nodes = true;
        }
        let child = match reader.current() {
            XmlNode::Start(tag) => Some(tag.name.clone()),
            XmlNode::Text(content) => {
                if mapping.text_content().is_some() {
                    text.get_or_insert_with(String::new).push_str(content);
                } else {
                    trace!(element = %mapping.name(), "dropping unmapped text");
                }
                None
            }
            XmlNode::End(_) => break,
            XmlNode::Eof => {
                return Err(MapError::format(
                    FormatErrorKind::UnexpectedEof,
                    format!("unexpected end of document inside <{}>", mapping.name()),
                    reader.position(),
                ));
            }
            XmlNode::Initial => None,
        };
        if let Some(name) = child {
            read_child(mapping, target.as_mut(), &name, reader)?;
        }
    }

    // `<name></name>` carries empty text; `<name/>` carries none.
    if !has_nodes {
        text = Some(String::new());
    }
    if let (Some(content_mapping), Some(content)) = (mapping.text_content(), text) {
        content_mapping.set_from_xml_form(target.as_mut(), &content)?;
    }
    Ok(target)
}

fn read_attribute(
    mapping: &ElementMapping,
    target: &mut dyn Any,
    attribute: &XAttribute,
) -> MapResult<()> {
    let name = &attribute.name;
    if let Some(attribute_mapping) = mapping.find_attribute(name.namespace(), name.local_name()) {
        return attribute_mapping.set_from_xml_form(target, &attribute.value);
    }
    match mapping.any_attribute() {
        Some(overflow) => {
            trace!(element = %mapping.name(), attribute = %name, "capturing overflow attribute");
            overflow.capture(target, attribute)
        }
        None => {
            trace!(element = %mapping.name(), attribute = %name, "dropping unmapped attribute");
            Ok(())
        }
    }
}

fn read_child(
    mapping: &ElementMapping,
    target: &mut dyn Any,
    name: &XName,
    reader: &mut dyn XmlRead,
) -> MapResult<()> {
    match mapping.find_element(name.namespace(), name.local_name()) {
        Some(Mapping::TextElement(text_mapping)) => {
            let text = reader.read_element_text()?;
            text_mapping.set_from_xml_form(target, &text)
        }
        Some(Mapping::ChildSingular(child_mapping)) => {
            let child = read_element(child_mapping.element(), reader)?;
            child_mapping.set_child(target, child)
        }
        Some(Mapping::ChildCollection(collection_mapping)) => {
            let member = read_element(collection_mapping.element(), reader)?;
            collection_mapping.append(target, member)
        }
        _ => match mapping.any_element() {
            Some(overflow) => {
                trace!(element = %mapping.name(), child = %name, "capturing overflow element");
                overflow.capture(target, reader)
            }
            None => {
                trace!(element = %mapping.name(), child = %name, "skipping unmapped element");
                reader.skip_element()
            }
        },
    }
}
