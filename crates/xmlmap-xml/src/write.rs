//! Write side of the serializer engine: an object graph to XML.

use std::any::Any;
use std::collections::HashSet;

use xmlmap_core::{MapError, MapResult, XmlWrite};
use xmlmap_schema::{CollectionMapping, ElementMapping, Mapping};

/// Write `value` as the element `mapping` describes.
///
/// Attributes (and any-attribute overflow) come first in declaration order, then text
/// content, then child content in declaration order.
pub(crate) fn write_element(
    mapping: &ElementMapping,
    value: &dyn Any,
    writer: &mut dyn XmlWrite,
) -> MapResult<()> {
    writer.start_element(mapping.name())?;

    for entry in mapping.mappings() {
        match entry {
            Mapping::Attribute(attribute) => {
                if let Some(wire) = attribute.value_in_xml_form(value)? {
                    writer.attribute(attribute.name(), &wire)?;
                }
            }
            Mapping::AnyAttribute(overflow) => overflow.replay(value, writer)?,
            _ => {}
        }
    }

    if let Some(text) = mapping.text_content() {
        if let Some(wire) = text.value_in_xml_form(value)? {
            writer.text(&wire)?;
        }
    }

    // Collections already written through another mapping bound to the same property.
    let mut written: HashSet<*const ()> = HashSet::new();
    for entry in mapping.mappings() {
        match entry {
            Mapping::TextElement(text_element) => {
                if let Some(wire) = text_element.value_in_xml_form(value)? {
                    writer.text_element(text_element.name(), &wire)?;
                }
            }
            Mapping::ChildSingular(child) => {
                if let Some(child_value) = child.child(value)? {
                    write_element(child.element(), child_value, writer)?;
                }
            }
            Mapping::ChildCollection(collection) => {
                write_collection(mapping, collection, value, writer, &mut written)?;
            }
            Mapping::AnyElement(overflow) => overflow.replay(value, writer)?,
            Mapping::Attribute(_) | Mapping::AnyAttribute(_) | Mapping::TextContent(_) => {}
        }
    }

    writer.end_element()
}

/// Write every member of the collection behind `collection`, once per property.
///
/// Each member is written with the first collection mapping on the same property whose
/// variant accepts it.
fn write_collection(
    owner: &ElementMapping,
    collection: &CollectionMapping,
    value: &dyn Any,
    writer: &mut dyn XmlWrite,
    written: &mut HashSet<*const ()>,
) -> MapResult<()> {
    let Some(identity) = collection.identity(value)? else {
        return Ok(());
    };
    if !written.insert(identity) {
        return Ok(());
    }

    let mut siblings = Vec::new();
    for entry in owner.mappings() {
        if let Mapping::ChildCollection(candidate) = entry {
            if candidate.identity(value)? == Some(identity) {
                siblings.push(candidate);
            }
        }
    }

    for index in 0..collection.member_count(value)? {
        let mut claimed = false;
        for sibling in &siblings {
            if let Some(member) = sibling.member(value, index)? {
                write_element(sibling.element(), member, writer)?;
                claimed = true;
                break;
            }
        }
        if !claimed {
            return Err(MapError::unsupported(format!(
                "member {index} of the collection written as <{}>",
                collection.name()
            )));
        }
    }
    Ok(())
}
