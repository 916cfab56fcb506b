//! Two-level lookup from (namespace, local name) to a mapping position.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use xmlmap_core::XName;

/// Maps `(namespace, local name)` to an index into an element's mapping list.
///
/// The outer key is the namespace URI, with the empty string standing for "no
/// namespace"; the inner key is the local name. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    by_namespace: HashMap<String, HashMap<String, usize>>,
    len: usize,
}

impl NameIndex {
    /// Build an index from `(name, position)` pairs.
    ///
    /// Returns the first name seen twice as the error.
    pub fn build<'a>(entries: impl IntoIterator<Item = (&'a XName, usize)>) -> Result<Self, XName> {
        let mut index = Self::default();
        for (name, position) in entries {
            let locals = index
                .by_namespace
                .entry(name.namespace().unwrap_or_default().to_owned())
                .or_default();
            match locals.entry(name.local_name().to_owned()) {
                Entry::Occupied(_) => return Err(name.clone()),
                Entry::Vacant(slot) => {
                    slot.insert(position);
                    index.len += 1;
                }
            }
        }
        Ok(index)
    }

    /// The position registered for a wire-level name.
    #[must_use]
    pub fn find(&self, namespace: Option<&str>, local_name: &str) -> Option<usize> {
        self.by_namespace
            .get(namespace.unwrap_or_default())
            .and_then(|locals| locals.get(local_name))
            .copied()
    }

    /// Number of indexed names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no names are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
