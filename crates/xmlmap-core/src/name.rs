//! Qualified XML names.
//!
//! An [`XName`] is a `(namespace, local name)` pair. The absence of a namespace is
//! represented as `None` and is distinct from every declared namespace, including the
//! empty string, which is normalized to `None` on construction.

use std::fmt;

/// The namespace bound to the reserved `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A namespace-qualified XML name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct XName {
    namespace: Option<String>,
    local_name: String,
}

impl XName {
    /// Create a name in the given namespace. An empty namespace means "no namespace".
    #[must_use]
    pub fn new(namespace: Option<&str>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_owned),
            local_name: local_name.into(),
        }
    }

    /// Create a name without a namespace.
    #[must_use]
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a name in the given namespace.
    #[must_use]
    pub fn qualified(namespace: &str, local_name: impl Into<String>) -> Self {
        Self::new(Some(namespace), local_name)
    }

    /// The namespace URI, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The local part of the name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Whether this name matches the given wire-level namespace and local name exactly.
    #[must_use]
    pub fn matches(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == namespace
    }
}

impl fmt::Display for XName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

impl From<&str> for XName {
    fn from(local_name: &str) -> Self {
        Self::local(local_name)
    }
}

impl From<String> for XName {
    fn from(local_name: String) -> Self {
        Self::local(local_name)
    }
}

/// A namespace URI used to mint [`XName`]s.
///
/// # Examples
///
/// ```
/// use xmlmap_core::XNamespace;
///
/// let ns = XNamespace::new("http://test.com");
/// let name = ns.name("Person");
/// assert_eq!(name.namespace(), Some("http://test.com"));
/// assert_eq!(name.local_name(), "Person");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XNamespace(String);

impl XNamespace {
    /// Create a namespace from its URI.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The namespace URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// Create a name in this namespace.
    #[must_use]
    pub fn name(&self, local_name: impl Into<String>) -> XName {
        XName::new(Some(&self.0), local_name)
    }
}

impl fmt::Display for XNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
