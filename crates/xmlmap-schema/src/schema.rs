//! The compiled, immutable set of element mappings.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::trace;
use xmlmap_core::SchemaError;

use crate::element::ElementMapping;
use crate::fluent::SchemaBuilder;

/// Element mappings keyed by the Rust type they map.
///
/// A schema is never mutated after it is built; share it between threads behind an
/// [`Arc`].
#[derive(Debug, Default)]
pub struct SchemaDescription {
    mappings: HashMap<TypeId, Arc<ElementMapping>>,
    order: Vec<TypeId>,
}

impl SchemaDescription {
    /// Start declaring a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Assemble a schema from element mappings compiled by hand.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::DuplicateType` if two mappings target the same type.
    pub fn from_mappings(
        mappings: impl IntoIterator<Item = Arc<ElementMapping>>,
    ) -> Result<Self, SchemaError> {
        let mut schema = Self::default();
        for element in mappings {
            if schema.mappings.contains_key(&element.type_id()) {
                return Err(SchemaError::DuplicateType {
                    type_name: element.type_name(),
                });
            }
            schema.insert(element);
        }
        Ok(schema)
    }

    /// The mapping registered for `T`.
    #[must_use]
    pub fn mapping_for<T: 'static>(&self) -> Option<&Arc<ElementMapping>> {
        self.mapping_for_type(TypeId::of::<T>())
    }

    /// The mapping registered for a type id.
    #[must_use]
    pub fn mapping_for_type(&self, type_id: TypeId) -> Option<&Arc<ElementMapping>> {
        self.mappings.get(&type_id)
    }

    /// Registered mappings in registration order.
    pub fn mappings(&self) -> impl Iterator<Item = &Arc<ElementMapping>> {
        self.order.iter().filter_map(|id| self.mappings.get(id))
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn register_root(&mut self, element: Arc<ElementMapping>) {
        self.insert(element);
    }

    /// Register a nested element unless a root or an earlier registration owns its type.
    pub(crate) fn register_nested(
        &mut self,
        element: &Arc<ElementMapping>,
        roots: &HashSet<TypeId>,
    ) {
        let type_id = element.type_id();
        if roots.contains(&type_id) || self.mappings.contains_key(&type_id) {
            trace!(
                type_name = element.type_name(),
                "nested mapping shadowed by earlier registration"
            );
            return;
        }
        self.insert(Arc::clone(element));
    }

    fn insert(&mut self, element: Arc<ElementMapping>) {
        let type_id = element.type_id();
        if self.mappings.insert(type_id, element).is_none() {
            self.order.push(type_id);
        }
    }
}
