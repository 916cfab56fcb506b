//! XML side of the xmlmap mapping engine.
//!
//! # Key components
//!
//! - [`Serializer`], which reads documents into object graphs and writes them back
//!   according to a [`xmlmap_schema::SchemaDescription`]
//! - [`QuickXmlReader`] / [`QuickXmlWriter`], namespace-aware cursors over `quick-xml`
//! - [`DocumentValidator`], an optional check run before a document is mapped
//!
//! # Wire conventions
//!
//! - Attributes are written in declaration order, followed by namespace declarations
//! - An element's namespace is declared as the default namespace where it changes
//! - Namespaced attributes get generated `ns0`, `ns1`, ... prefixes
//! - Unknown attributes, elements, and text are dropped unless an overflow mapping
//!   captures them

mod read;
mod reader;
mod serializer;
mod write;
mod writer;

pub use reader::QuickXmlReader;
pub use serializer::{DocumentValidator, Serializer};
pub use writer::QuickXmlWriter;
