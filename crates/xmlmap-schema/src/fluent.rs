//! Fluent schema declaration.
//!
//! Declarations nest: opening a child element returns a builder whose parent is the
//! current builder, and [`ElementBuilder::end`] returns to it. Nothing is compiled until
//! [`SchemaBuilder::build`], which compiles every element bottom-up and registers it in
//! the resulting [`SchemaDescription`].
//!
//! ```
//! use xmlmap_schema::{SchemaBuilder, lens};
//!
//! #[derive(Default)]
//! struct Address { city: String }
//! #[derive(Default)]
//! struct Person { id: i64, address: Option<Address> }
//!
//! let schema = SchemaBuilder::new()
//!     .element::<Person>("Person")
//!         .attribute("Id", lens!(Person, id))
//!         .element("Address", lens!(Person, address))
//!             .attribute("City", lens!(Address, city))
//!         .end()
//!     .build()
//!     .expect("valid schema");
//!
//! assert_eq!(schema.len(), 2);
//! ```

use std::any::{TypeId, type_name};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;
use xmlmap_core::{MapResult, SchemaError, XAttribute, XElement, XName};

use crate::binding::{CollectionProperty, Constructor, Lens, Variant};
use crate::convert::{Converter, XmlValue};
use crate::element::{ElementMapping, Factory};
use crate::mapping::{
    AttributeMapping, ChildAccess, ChildMapping, CollectionAccess, CollectionMapping, Mapping,
    TextContentMapping, TextElementMapping, child_access, collection_access,
};
use crate::overflow::{AnyAttributeMapping, AnyElementMapping, AttributeCodec, ElementCodec};
use crate::schema::SchemaDescription;

/// A declaration scope that child element declarations return to.
pub trait Scope {
    /// How a finished child attaches to this scope.
    type Link;

    /// Take ownership of a finished element declaration.
    fn adopt(&mut self, node: ElementNode, link: Self::Link);
}

/// A finished but not yet compiled element declaration.
pub struct ElementNode {
    name: XName,
    type_id: TypeId,
    type_name: &'static str,
    factory: Option<Factory>,
    steps: Vec<Step>,
}

enum Step {
    Mapping(Mapping),
    Nested(ElementNode, ChildLink),
}

/// How a nested element attaches to the property of its parent.
pub struct ChildLink(LinkKind);

enum LinkKind {
    Singular(Box<dyn ChildAccess>),
    Collection(Box<dyn CollectionAccess>),
}

impl ElementNode {
    fn new<T: 'static>(name: XName, constructor: Constructor<T>) -> Self {
        let factory = constructor.into_factory().map(|make| -> Factory {
            Arc::new(move || Box::new(make()) as Box<dyn std::any::Any>)
        });
        Self {
            name,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            factory,
            steps: Vec::new(),
        }
    }

    fn compile(
        self,
        schema: &mut SchemaDescription,
        roots: &HashSet<TypeId>,
    ) -> Result<Arc<ElementMapping>, SchemaError> {
        let mut mappings = Vec::with_capacity(self.steps.len());
        for step in self.steps {
            let mapping = match step {
                Step::Mapping(mapping) => mapping,
                Step::Nested(node, ChildLink(kind)) => {
                    let element = node.compile(schema, roots)?;
                    schema.register_nested(&element, roots);
                    match kind {
                        LinkKind::Singular(access) => {
                            Mapping::ChildSingular(ChildMapping::from_parts(element, access))
                        }
                        LinkKind::Collection(access) => {
                            Mapping::ChildCollection(CollectionMapping::from_parts(element, access))
                        }
                    }
                }
            };
            mappings.push(mapping);
        }
        let factory = self.factory.ok_or(SchemaError::MissingConstructor {
            type_name: self.type_name,
        })?;
        let element =
            ElementMapping::from_parts(self.name, self.type_id, self.type_name, factory, mappings)?;
        debug!(
            element = %element.name(),
            type_name = element.type_name(),
            mappings = element.mappings().len(),
            "compiled element mapping"
        );
        Ok(Arc::new(element))
    }
}

impl fmt::Debug for ElementNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementNode")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl fmt::Debug for ChildLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.0 {
            LinkKind::Singular(_) => "ChildLink::Singular",
            LinkKind::Collection(_) => "ChildLink::Collection",
        })
    }
}

/// Entry point for declaring a schema.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    roots: Vec<ElementNode>,
}

impl SchemaBuilder {
    /// Create an empty schema builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a root element for `T`, constructed through `T::default()`.
    #[must_use]
    pub fn element<T: Default + 'static>(self, name: impl Into<XName>) -> ElementBuilder<T, Self> {
        self.element_with(name, Constructor::from_default())
    }

    /// Declare a root element for `T` with an explicit constructor.
    #[must_use]
    pub fn element_with<T: 'static>(
        self,
        name: impl Into<XName>,
        constructor: Constructor<T>,
    ) -> ElementBuilder<T, Self> {
        ElementBuilder::new(self, (), name.into(), constructor)
    }

    /// Compile every declared element into a schema description.
    ///
    /// Root declarations own their type. A type that only appears nested is registered
    /// with its first declaration.
    ///
    /// # Errors
    ///
    /// Returns `MapError::Schema` if any element is invalid or a root type is declared
    /// twice.
    pub fn build(self) -> MapResult<SchemaDescription> {
        let mut roots = HashSet::with_capacity(self.roots.len());
        for node in &self.roots {
            if !roots.insert(node.type_id) {
                return Err(SchemaError::DuplicateType {
                    type_name: node.type_name,
                }
                .into());
            }
        }

        let mut schema = SchemaDescription::default();
        for node in self.roots {
            let element = node.compile(&mut schema, &roots)?;
            schema.register_root(element);
        }
        debug!(types = schema.len(), "built schema description");
        Ok(schema)
    }
}

impl Scope for SchemaBuilder {
    type Link = ();

    fn adopt(&mut self, node: ElementNode, (): ()) {
        self.roots.push(node);
    }
}

/// Declares the mappings of one element of type `T` inside scope `P`.
pub struct ElementBuilder<T, P: Scope> {
    parent: P,
    link: P::Link,
    node: ElementNode,
    _target: PhantomData<fn() -> T>,
}

impl<T: 'static, P: Scope> ElementBuilder<T, P> {
    fn new(parent: P, link: P::Link, name: XName, constructor: Constructor<T>) -> Self {
        Self {
            parent,
            link,
            node: ElementNode::new(name, constructor),
            _target: PhantomData,
        }
    }

    fn push(mut self, mapping: Mapping) -> Self {
        self.node.steps.push(Step::Mapping(mapping));
        self
    }

    /// Map attribute `name` to a scalar property.
    #[must_use]
    pub fn attribute<Q: XmlValue>(self, name: impl Into<XName>, lens: Lens<T, Q>) -> Self {
        self.push(Mapping::Attribute(AttributeMapping::new(name, lens)))
    }

    /// Map attribute `name` to a scalar property with a custom converter.
    #[must_use]
    pub fn attribute_with<Q: 'static>(
        self,
        name: impl Into<XName>,
        lens: Lens<T, Q>,
        converter: Converter<Q>,
    ) -> Self {
        self.push(Mapping::Attribute(AttributeMapping::with_converter(
            name, lens, converter,
        )))
    }

    /// Map the element's character data to a scalar property.
    #[must_use]
    pub fn text_content<Q: XmlValue>(self, lens: Lens<T, Q>) -> Self {
        self.push(Mapping::TextContent(TextContentMapping::new(lens)))
    }

    /// Map the element's character data with a custom converter.
    #[must_use]
    pub fn text_content_with<Q: 'static>(self, lens: Lens<T, Q>, converter: Converter<Q>) -> Self {
        self.push(Mapping::TextContent(TextContentMapping::with_converter(
            lens, converter,
        )))
    }

    /// Map the text of child element `name` to a scalar property.
    #[must_use]
    pub fn text_element<Q: XmlValue>(self, name: impl Into<XName>, lens: Lens<T, Q>) -> Self {
        self.push(Mapping::TextElement(TextElementMapping::new(name, lens)))
    }

    /// Map the text of child element `name` with a custom converter.
    #[must_use]
    pub fn text_element_with<Q: 'static>(
        self,
        name: impl Into<XName>,
        lens: Lens<T, Q>,
        converter: Converter<Q>,
    ) -> Self {
        self.push(Mapping::TextElement(TextElementMapping::with_converter(
            name, lens, converter,
        )))
    }

    /// Capture unclaimed attributes verbatim.
    #[must_use]
    pub fn any_attribute<L>(self, lens: Lens<T, L>) -> Self
    where
        L: CollectionProperty<Item = XAttribute>,
    {
        self.push(Mapping::AnyAttribute(AnyAttributeMapping::new(lens)))
    }

    /// Capture unclaimed attributes through a custom codec.
    #[must_use]
    pub fn any_attribute_with<L: CollectionProperty>(
        self,
        lens: Lens<T, L>,
        codec: AttributeCodec<L::Item>,
    ) -> Self {
        self.push(Mapping::AnyAttribute(AnyAttributeMapping::with_codec(
            lens, codec,
        )))
    }

    /// Capture unclaimed child elements verbatim.
    #[must_use]
    pub fn any_element<L>(self, lens: Lens<T, L>) -> Self
    where
        L: CollectionProperty<Item = XElement>,
    {
        self.push(Mapping::AnyElement(AnyElementMapping::new(lens)))
    }

    /// Capture unclaimed child elements through a custom codec.
    #[must_use]
    pub fn any_element_with<L: CollectionProperty>(
        self,
        lens: Lens<T, L>,
        codec: ElementCodec<L::Item>,
    ) -> Self {
        self.push(Mapping::AnyElement(AnyElementMapping::with_codec(lens, codec)))
    }

    /// Open child element `name`, bound to an optional property.
    #[must_use]
    pub fn element<C: Default + 'static>(
        self,
        name: impl Into<XName>,
        lens: Lens<T, Option<C>>,
    ) -> ElementBuilder<C, Self> {
        self.element_with(name, lens, Constructor::from_default())
    }

    /// Open child element `name` with an explicit constructor.
    #[must_use]
    pub fn element_with<C: 'static>(
        self,
        name: impl Into<XName>,
        lens: Lens<T, Option<C>>,
        constructor: Constructor<C>,
    ) -> ElementBuilder<C, Self> {
        let link = ChildLink(LinkKind::Singular(child_access(lens)));
        ElementBuilder::new(self, link, name.into(), constructor)
    }

    /// Open repeated child element `name`, each occurrence a member of a collection.
    #[must_use]
    pub fn collection_element<L>(
        self,
        name: impl Into<XName>,
        lens: Lens<T, L>,
    ) -> ElementBuilder<L::Item, Self>
    where
        L: CollectionProperty,
        L::Item: Default,
    {
        self.collection_variant(name, lens, Variant::identity())
    }

    /// Open repeated child element `name` for one variant of a heterogeneous collection.
    ///
    /// Declare one such element per variant on the same property; on write each member
    /// is emitted under the first declaration whose variant accepts it.
    #[must_use]
    pub fn collection_variant<L, C>(
        self,
        name: impl Into<XName>,
        lens: Lens<T, L>,
        variant: Variant<L::Item, C>,
    ) -> ElementBuilder<C, Self>
    where
        L: CollectionProperty,
        C: Default + 'static,
    {
        self.collection_variant_with(name, lens, variant, Constructor::from_default())
    }

    /// Open one collection variant with an explicit constructor.
    #[must_use]
    pub fn collection_variant_with<L, C>(
        self,
        name: impl Into<XName>,
        lens: Lens<T, L>,
        variant: Variant<L::Item, C>,
        constructor: Constructor<C>,
    ) -> ElementBuilder<C, Self>
    where
        L: CollectionProperty,
        C: 'static,
    {
        let link = ChildLink(LinkKind::Collection(collection_access(lens, variant)));
        ElementBuilder::new(self, link, name.into(), constructor)
    }

    /// Finish this element and return to the enclosing scope.
    #[must_use]
    pub fn end(self) -> P {
        let Self {
            mut parent,
            link,
            node,
            ..
        } = self;
        parent.adopt(node, link);
        parent
    }
}

impl<T: 'static> ElementBuilder<T, SchemaBuilder> {
    /// Finish this root element and build the schema.
    ///
    /// # Errors
    ///
    /// See [`SchemaBuilder::build`].
    pub fn build(self) -> MapResult<SchemaDescription> {
        self.end().build()
    }
}

impl<T: 'static, P: Scope> Scope for ElementBuilder<T, P> {
    type Link = ChildLink;

    fn adopt(&mut self, node: ElementNode, link: ChildLink) {
        self.node.steps.push(Step::Nested(node, link));
    }
}

impl<T, P: Scope> fmt::Debug for ElementBuilder<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBuilder")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}
