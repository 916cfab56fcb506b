//! The mapping model: one entry per declared correspondence between XML and a property.
//!
//! Every entry binds typed accessors at declaration time and exposes them through an
//! object-safe, type-erased surface that the read/write engine drives with `&dyn Any`
//! owners. A type mismatch between owner and mapping is reported as
//! [`MapError::UnsupportedType`].

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use xmlmap_core::{MapError, MapResult, XName};

use crate::binding::{CollectionProperty, Lens, Variant};
use crate::convert::{Converter, XmlValue};
use crate::element::ElementMapping;
use crate::overflow::{AnyAttributeMapping, AnyElementMapping};

pub(crate) fn downcast_ref<T: 'static>(owner: &dyn Any) -> MapResult<&T> {
    owner
        .downcast_ref::<T>()
        .ok_or_else(|| MapError::unsupported(type_name::<T>()))
}

pub(crate) fn downcast_mut<T: 'static>(owner: &mut dyn Any) -> MapResult<&mut T> {
    owner
        .downcast_mut::<T>()
        .ok_or_else(|| MapError::unsupported(type_name::<T>()))
}

/// One declared correspondence on an element.
#[derive(Debug)]
pub enum Mapping {
    /// An attribute bound to a scalar property.
    Attribute(AttributeMapping),
    /// The element's own character data bound to a scalar property.
    TextContent(TextContentMapping),
    /// A child element whose text is bound to a scalar property.
    TextElement(TextElementMapping),
    /// A child element bound to an optional object property.
    ChildSingular(ChildMapping),
    /// Repeated child elements bound to members of a collection property.
    ChildCollection(CollectionMapping),
    /// Fallback for attributes no other mapping claims.
    AnyAttribute(AnyAttributeMapping),
    /// Fallback for child elements no other mapping claims.
    AnyElement(AnyElementMapping),
}

impl Mapping {
    /// The qualified name this mapping matches, if it is a named mapping.
    #[must_use]
    pub fn name(&self) -> Option<&XName> {
        match self {
            Self::Attribute(m) => Some(m.name()),
            Self::TextElement(m) => Some(m.name()),
            Self::ChildSingular(m) => Some(m.name()),
            Self::ChildCollection(m) => Some(m.name()),
            Self::TextContent(_) | Self::AnyAttribute(_) | Self::AnyElement(_) => None,
        }
    }

    /// Whether this mapping is matched against child elements by name.
    #[must_use]
    pub fn is_named_element(&self) -> bool {
        matches!(
            self,
            Self::TextElement(_) | Self::ChildSingular(_) | Self::ChildCollection(_)
        )
    }
}

trait ScalarAccess: Send + Sync {
    fn get_wire(&self, owner: &dyn Any) -> MapResult<Option<String>>;
    fn set_wire(&self, owner: &mut dyn Any, wire: &str) -> MapResult<()>;
}

struct ScalarBinding<T, P> {
    lens: Lens<T, P>,
    converter: Converter<P>,
}

impl<T: 'static, P: 'static> ScalarAccess for ScalarBinding<T, P> {
    fn get_wire(&self, owner: &dyn Any) -> MapResult<Option<String>> {
        let owner = downcast_ref::<T>(owner)?;
        Ok(self.converter.serialize(self.lens.get(owner)))
    }

    fn set_wire(&self, owner: &mut dyn Any, wire: &str) -> MapResult<()> {
        let value = self.converter.deserialize(wire)?;
        self.lens.set(downcast_mut::<T>(owner)?, value);
        Ok(())
    }
}

/// A scalar property exchanged as a single string.
struct Scalar {
    access: Box<dyn ScalarAccess>,
    property: &'static str,
}

impl Scalar {
    fn new<T: 'static, P: 'static>(lens: Lens<T, P>, converter: Converter<P>) -> Self {
        Self {
            access: Box::new(ScalarBinding { lens, converter }),
            property: type_name::<P>(),
        }
    }
}

macro_rules! scalar_mapping_api {
    () => {
        /// The property value of `owner` in wire form, or `None` if it is absent.
        ///
        /// # Errors
        ///
        /// Returns `MapError::UnsupportedType` if `owner` is not the mapped type.
        pub fn value_in_xml_form(&self, owner: &dyn Any) -> MapResult<Option<String>> {
            self.scalar.access.get_wire(owner)
        }

        /// Convert `wire` and store it in the property of `owner`.
        ///
        /// # Errors
        ///
        /// Returns `MapError::Conversion` if the wire value does not convert, or
        /// `MapError::UnsupportedType` if `owner` is not the mapped type.
        pub fn set_from_xml_form(&self, owner: &mut dyn Any, wire: &str) -> MapResult<()> {
            self.scalar.access.set_wire(owner, wire)
        }
    };
}

/// An attribute bound to a scalar property.
pub struct AttributeMapping {
    name: XName,
    scalar: Scalar,
}

impl AttributeMapping {
    /// Bind attribute `name` to a property with the standard converter.
    #[must_use]
    pub fn new<T: 'static, P: XmlValue>(name: impl Into<XName>, lens: Lens<T, P>) -> Self {
        Self::with_converter(name, lens, Converter::standard())
    }

    /// Bind attribute `name` to a property with a custom converter.
    #[must_use]
    pub fn with_converter<T: 'static, P: 'static>(
        name: impl Into<XName>,
        lens: Lens<T, P>,
        converter: Converter<P>,
    ) -> Self {
        Self {
            name: name.into(),
            scalar: Scalar::new(lens, converter),
        }
    }

    /// The attribute name.
    #[must_use]
    pub fn name(&self) -> &XName {
        &self.name
    }

    scalar_mapping_api!();
}

impl fmt::Debug for AttributeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeMapping")
            .field("name", &self.name)
            .field("property", &self.scalar.property)
            .finish()
    }
}

/// The element's own character data bound to a scalar property.
pub struct TextContentMapping {
    scalar: Scalar,
}

impl TextContentMapping {
    /// Bind text content to a property with the standard converter.
    #[must_use]
    pub fn new<T: 'static, P: XmlValue>(lens: Lens<T, P>) -> Self {
        Self::with_converter(lens, Converter::standard())
    }

    /// Bind text content to a property with a custom converter.
    #[must_use]
    pub fn with_converter<T: 'static, P: 'static>(
        lens: Lens<T, P>,
        converter: Converter<P>,
    ) -> Self {
        Self {
            scalar: Scalar::new(lens, converter),
        }
    }

    scalar_mapping_api!();
}

impl fmt::Debug for TextContentMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextContentMapping")
            .field("property", &self.scalar.property)
            .finish()
    }
}

/// A child element whose text is bound to a scalar property.
pub struct TextElementMapping {
    name: XName,
    scalar: Scalar,
}

impl TextElementMapping {
    /// Bind the text of child element `name` to a property with the standard converter.
    #[must_use]
    pub fn new<T: 'static, P: XmlValue>(name: impl Into<XName>, lens: Lens<T, P>) -> Self {
        Self::with_converter(name, lens, Converter::standard())
    }

    /// Bind the text of child element `name` to a property with a custom converter.
    #[must_use]
    pub fn with_converter<T: 'static, P: 'static>(
        name: impl Into<XName>,
        lens: Lens<T, P>,
        converter: Converter<P>,
    ) -> Self {
        Self {
            name: name.into(),
            scalar: Scalar::new(lens, converter),
        }
    }

    /// The child element name.
    #[must_use]
    pub fn name(&self) -> &XName {
        &self.name
    }

    scalar_mapping_api!();
}

impl fmt::Debug for TextElementMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextElementMapping")
            .field("name", &self.name)
            .field("property", &self.scalar.property)
            .finish()
    }
}

pub(crate) trait ChildAccess: Send + Sync {
    fn get<'a>(&self, owner: &'a dyn Any) -> MapResult<Option<&'a dyn Any>>;
    fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> MapResult<()>;
}

struct ChildBinding<T, C> {
    lens: Lens<T, Option<C>>,
}

impl<T: 'static, C: 'static> ChildAccess for ChildBinding<T, C> {
    fn get<'a>(&self, owner: &'a dyn Any) -> MapResult<Option<&'a dyn Any>> {
        let owner = downcast_ref::<T>(owner)?;
        Ok(self.lens.get(owner).as_ref().map(|child| child as &dyn Any))
    }

    fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> MapResult<()> {
        let value = value
            .downcast::<C>()
            .map_err(|_| MapError::unsupported(type_name::<C>()))?;
        self.lens.set(downcast_mut::<T>(owner)?, Some(*value));
        Ok(())
    }
}

pub(crate) fn child_access<T: 'static, C: 'static>(
    lens: Lens<T, Option<C>>,
) -> Box<dyn ChildAccess> {
    Box::new(ChildBinding { lens })
}

/// A child element bound to an optional object property.
pub struct ChildMapping {
    element: Arc<ElementMapping>,
    access: Box<dyn ChildAccess>,
}

impl ChildMapping {
    /// Bind a child element, described by `element`, to an optional property.
    ///
    /// The child's name is the name of `element`.
    #[must_use]
    pub fn new<T: 'static, C: 'static>(
        element: Arc<ElementMapping>,
        lens: Lens<T, Option<C>>,
    ) -> Self {
        Self::from_parts(element, child_access(lens))
    }

    pub(crate) fn from_parts(element: Arc<ElementMapping>, access: Box<dyn ChildAccess>) -> Self {
        Self { element, access }
    }

    /// The child element name.
    #[must_use]
    pub fn name(&self) -> &XName {
        self.element.name()
    }

    /// The mapping of the child element.
    #[must_use]
    pub fn element(&self) -> &Arc<ElementMapping> {
        &self.element
    }

    /// The current child object of `owner`, if set.
    ///
    /// # Errors
    ///
    /// Returns `MapError::UnsupportedType` if `owner` is not the mapped type.
    pub fn child<'a>(&self, owner: &'a dyn Any) -> MapResult<Option<&'a dyn Any>> {
        self.access.get(owner)
    }

    /// Store a freshly read child object in `owner`.
    ///
    /// # Errors
    ///
    /// Returns `MapError::UnsupportedType` if either object has the wrong type.
    pub fn set_child(&self, owner: &mut dyn Any, child: Box<dyn Any>) -> MapResult<()> {
        self.access.set(owner, child)
    }
}

impl fmt::Debug for ChildMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildMapping")
            .field("name", self.name())
            .field("type", &self.element.type_name())
            .finish()
    }
}

pub(crate) trait CollectionAccess: Send + Sync {
    fn identity(&self, owner: &dyn Any) -> MapResult<Option<*const ()>>;
    fn member_count(&self, owner: &dyn Any) -> MapResult<usize>;
    fn member<'a>(&self, owner: &'a dyn Any, index: usize) -> MapResult<Option<&'a dyn Any>>;
    fn append(&self, owner: &mut dyn Any, member: Box<dyn Any>) -> MapResult<()>;
}

struct CollectionBinding<T, L: CollectionProperty, C> {
    lens: Lens<T, L>,
    variant: Variant<L::Item, C>,
}

impl<T: 'static, L: CollectionProperty, C: 'static> CollectionAccess
    for CollectionBinding<T, L, C>
{
    fn identity(&self, owner: &dyn Any) -> MapResult<Option<*const ()>> {
        Ok(self.lens.get(downcast_ref::<T>(owner)?).identity())
    }

    fn member_count(&self, owner: &dyn Any) -> MapResult<usize> {
        Ok(self.lens.get(downcast_ref::<T>(owner)?).member_count())
    }

    fn member<'a>(&self, owner: &'a dyn Any, index: usize) -> MapResult<Option<&'a dyn Any>> {
        let collection = self.lens.get(downcast_ref::<T>(owner)?);
        Ok(collection
            .member(index)
            .and_then(|item| self.variant.unwrap(item))
            .map(|concrete| concrete as &dyn Any))
    }

    fn append(&self, owner: &mut dyn Any, member: Box<dyn Any>) -> MapResult<()> {
        let member = member
            .downcast::<C>()
            .map_err(|_| MapError::unsupported(type_name::<C>()))?;
        self.lens
            .get_mut(downcast_mut::<T>(owner)?)
            .append(self.variant.wrap(*member));
        Ok(())
    }
}

pub(crate) fn collection_access<T: 'static, L: CollectionProperty, C: 'static>(
    lens: Lens<T, L>,
    variant: Variant<L::Item, C>,
) -> Box<dyn CollectionAccess> {
    Box::new(CollectionBinding { lens, variant })
}

/// Repeated child elements bound to members of a collection property.
///
/// Several collection mappings may share one property (e.g. one per variant of a
/// polymorphic member type). They observe the same collection identity; each member
/// is claimed by the first mapping whose variant accepts it.
pub struct CollectionMapping {
    element: Arc<ElementMapping>,
    access: Box<dyn CollectionAccess>,
}

impl CollectionMapping {
    /// Bind a homogeneous collection of child elements described by `element`.
    #[must_use]
    pub fn new<T: 'static, L>(element: Arc<ElementMapping>, lens: Lens<T, L>) -> Self
    where
        L: CollectionProperty,
    {
        Self::with_variant(element, lens, Variant::<L::Item, L::Item>::identity())
    }

    /// Bind one variant of a heterogeneous collection.
    #[must_use]
    pub fn with_variant<T: 'static, L: CollectionProperty, C: 'static>(
        element: Arc<ElementMapping>,
        lens: Lens<T, L>,
        variant: Variant<L::Item, C>,
    ) -> Self {
        Self::from_parts(element, collection_access(lens, variant))
    }

    pub(crate) fn from_parts(
        element: Arc<ElementMapping>,
        access: Box<dyn CollectionAccess>,
    ) -> Self {
        Self { element, access }
    }

    /// The member element name.
    #[must_use]
    pub fn name(&self) -> &XName {
        self.element.name()
    }

    /// The mapping of member elements.
    #[must_use]
    pub fn element(&self) -> &Arc<ElementMapping> {
        &self.element
    }

    /// The identity of the backing collection of `owner`; `None` if not constructed.
    ///
    /// # Errors
    ///
    /// Returns `MapError::UnsupportedType` if `owner` is not the mapped type.
    pub fn identity(&self, owner: &dyn Any) -> MapResult<Option<*const ()>> {
        self.access.identity(owner)
    }

    /// The number of members in the backing collection, of any variant.
    ///
    /// # Errors
    ///
    /// Returns `MapError::UnsupportedType` if `owner` is not the mapped type.
    pub fn member_count(&self, owner: &dyn Any) -> MapResult<usize> {
        self.access.member_count(owner)
    }

    /// The member at `index` if it belongs to this mapping's variant.
    ///
    /// # Errors
    ///
    /// Returns `MapError::UnsupportedType` if `owner` is not the mapped type.
    pub fn member<'a>(&self, owner: &'a dyn Any, index: usize) -> MapResult<Option<&'a dyn Any>> {
        self.access.member(owner, index)
    }

    /// Append a freshly read member, constructing the collection if it is absent.
    ///
    /// # Errors
    ///
    /// Returns `MapError::UnsupportedType` if either object has the wrong type.
    pub fn append(&self, owner: &mut dyn Any, member: Box<dyn Any>) -> MapResult<()> {
        self.access.append(owner, member)
    }
}

impl fmt::Debug for CollectionMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionMapping")
            .field("name", self.name())
            .field("type", &self.element.type_name())
            .finish()
    }
}
