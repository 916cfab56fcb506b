//! Schema side of the xmlmap mapping engine.
//!
//! A schema is declared once, typically with [`SchemaBuilder`], and compiled into an
//! immutable [`SchemaDescription`]: one [`ElementMapping`] per mapped type, each holding
//! its [`Mapping`]s in declaration order plus a namespace+name index for dispatch.
//!
//! Property access is resolved at declaration time through [`Lens`]es, so reading and
//! writing documents never inspects types at run time beyond a `TypeId` check.

mod binding;
mod convert;
mod element;
mod fluent;
mod index;
mod mapping;
mod overflow;
mod schema;

pub use binding::{CollectionProperty, Constructor, Lens, Variant};
pub use convert::{Converter, XmlValue};
pub use element::ElementMapping;
pub use fluent::{ChildLink, ElementBuilder, ElementNode, SchemaBuilder, Scope};
pub use index::NameIndex;
pub use mapping::{
    AttributeMapping, ChildMapping, CollectionMapping, Mapping, TextContentMapping,
    TextElementMapping,
};
pub use overflow::{AnyAttributeMapping, AnyElementMapping, AttributeCodec, ElementCodec};
pub use schema::SchemaDescription;
pub use xmlmap_core::ConversionError;
