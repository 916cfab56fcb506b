//! Per-type element mappings.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use xmlmap_core::{SchemaError, XName};

use crate::binding::Constructor;
use crate::index::NameIndex;
use crate::mapping::{AttributeMapping, Mapping, TextContentMapping};
use crate::overflow::{AnyAttributeMapping, AnyElementMapping};

pub(crate) type Factory = Arc<dyn Fn() -> Box<dyn Any> + Send + Sync>;

/// Everything needed to read and write one mapped type.
///
/// Mappings are kept in declaration order, which is also the write order. Named
/// mappings are indexed by qualified name: attributes in one index, child elements
/// (text elements, singular children and collection members) in another.
pub struct ElementMapping {
    name: XName,
    type_id: TypeId,
    type_name: &'static str,
    factory: Factory,
    mappings: Vec<Mapping>,
    attributes: NameIndex,
    elements: NameIndex,
    text_content: Option<usize>,
    any_attribute: Option<usize>,
    any_element: Option<usize>,
}

impl ElementMapping {
    /// Compile an element mapping for `T`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if the constructor is unavailable, two attributes or two
    /// child elements share a name, or more than one text content, any-attribute or
    /// any-element mapping is declared.
    pub fn new<T: 'static>(
        name: impl Into<XName>,
        constructor: Constructor<T>,
        mappings: Vec<Mapping>,
    ) -> Result<Self, SchemaError> {
        let type_name = type_name::<T>();
        let make = constructor
            .into_factory()
            .ok_or(SchemaError::MissingConstructor { type_name })?;
        let factory: Factory = Arc::new(move || Box::new(make()) as Box<dyn Any>);
        Self::from_parts(name.into(), TypeId::of::<T>(), type_name, factory, mappings)
    }

    pub(crate) fn from_parts(
        name: XName,
        type_id: TypeId,
        type_name: &'static str,
        factory: Factory,
        mappings: Vec<Mapping>,
    ) -> Result<Self, SchemaError> {
        let element = name.to_string();

        let attributes = NameIndex::build(mappings.iter().enumerate().filter_map(
            |(position, mapping)| match mapping {
                Mapping::Attribute(m) => Some((m.name(), position)),
                _ => None,
            },
        ))
        .map_err(|duplicate| SchemaError::DuplicateAttribute {
            element: element.clone(),
            name: duplicate.to_string(),
        })?;

        let elements = NameIndex::build(mappings.iter().enumerate().filter_map(
            |(position, mapping)| match mapping.name() {
                Some(name) if mapping.is_named_element() => Some((name, position)),
                _ => None,
            },
        ))
        .map_err(|duplicate| SchemaError::DuplicateElement {
            element: element.clone(),
            name: duplicate.to_string(),
        })?;

        let text_content = single(&mappings, |m| matches!(m, Mapping::TextContent(_)))
            .map_err(|()| SchemaError::DuplicateTextContent {
                element: element.clone(),
            })?;
        let any_attribute = single(&mappings, |m| matches!(m, Mapping::AnyAttribute(_)))
            .map_err(|()| SchemaError::DuplicateAnyAttribute {
                element: element.clone(),
            })?;
        let any_element = single(&mappings, |m| matches!(m, Mapping::AnyElement(_)))
            .map_err(|()| SchemaError::DuplicateAnyElement { element })?;

        Ok(Self {
            name,
            type_id,
            type_name,
            factory,
            mappings,
            attributes,
            elements,
            text_content,
            any_attribute,
            any_element,
        })
    }

    /// The element's qualified name.
    #[must_use]
    pub fn name(&self) -> &XName {
        &self.name
    }

    /// The mapped Rust type.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The mapped Rust type name, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All mappings in declaration order.
    #[must_use]
    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    /// Create a fresh instance of the mapped type.
    #[must_use]
    pub fn create_instance(&self) -> Box<dyn Any> {
        (self.factory)()
    }

    /// Attribute mappings in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeMapping> {
        self.mappings.iter().filter_map(|mapping| match mapping {
            Mapping::Attribute(m) => Some(m),
            _ => None,
        })
    }

    /// The attribute mapping for a wire-level attribute name.
    #[must_use]
    pub fn find_attribute(
        &self,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<&AttributeMapping> {
        match self.mappings.get(self.attributes.find(namespace, local_name)?) {
            Some(Mapping::Attribute(m)) => Some(m),
            _ => None,
        }
    }

    /// The text element, singular child or collection mapping for a wire-level
    /// element name.
    #[must_use]
    pub fn find_element(&self, namespace: Option<&str>, local_name: &str) -> Option<&Mapping> {
        self.mappings.get(self.elements.find(namespace, local_name)?)
    }

    /// The text content mapping, if declared.
    #[must_use]
    pub fn text_content(&self) -> Option<&TextContentMapping> {
        match self.mappings.get(self.text_content?) {
            Some(Mapping::TextContent(m)) => Some(m),
            _ => None,
        }
    }

    /// The any-attribute fallback, if declared.
    #[must_use]
    pub fn any_attribute(&self) -> Option<&AnyAttributeMapping> {
        match self.mappings.get(self.any_attribute?) {
            Some(Mapping::AnyAttribute(m)) => Some(m),
            _ => None,
        }
    }

    /// The any-element fallback, if declared.
    #[must_use]
    pub fn any_element(&self) -> Option<&AnyElementMapping> {
        match self.mappings.get(self.any_element?) {
            Some(Mapping::AnyElement(m)) => Some(m),
            _ => None,
        }
    }
}

/// The position of the only mapping matching `predicate`; `Err` if there are several.
fn single(mappings: &[Mapping], predicate: impl Fn(&Mapping) -> bool) -> Result<Option<usize>, ()> {
    let mut positions = mappings
        .iter()
        .enumerate()
        .filter(|(_, m)| predicate(*m))
        .map(|(position, _)| position);
    let first = positions.next();
    match positions.next() {
        Some(_) => Err(()),
        None => Ok(first),
    }
}

impl fmt::Debug for ElementMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementMapping")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("mappings", &self.mappings)
            .finish_non_exhaustive()
    }
}
