//! Fallback mappings for content no named mapping claims.
//!
//! By default overflow attributes and elements are captured as raw [`XAttribute`] and
//! [`XElement`] values and replayed verbatim. A custom codec can capture them into
//! any member type instead, e.g. integers keyed by element name.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use xmlmap_core::{MapResult, XAttribute, XElement, XmlRead, XmlWrite};

use crate::binding::{CollectionProperty, Lens};
use crate::mapping::{downcast_mut, downcast_ref};

type ReadAttribute<A> = dyn Fn(&XAttribute) -> MapResult<A> + Send + Sync;
type WriteAttribute<A> = dyn Fn(&mut dyn XmlWrite, &A) -> MapResult<()> + Send + Sync;
type ReadElement<E> = dyn Fn(&mut dyn XmlRead) -> MapResult<E> + Send + Sync;
type WriteElement<E> = dyn Fn(&mut dyn XmlWrite, &E) -> MapResult<()> + Send + Sync;

/// Converts an overflow attribute to a member value and back.
pub struct AttributeCodec<A> {
    read: Arc<ReadAttribute<A>>,
    write: Arc<WriteAttribute<A>>,
}

impl AttributeCodec<XAttribute> {
    /// Capture and replay the attribute verbatim.
    #[must_use]
    pub fn raw() -> Self {
        Self::new(|attr| Ok(attr.clone()), |writer, attr| attr.write_to(writer))
    }
}

impl<A> AttributeCodec<A> {
    /// Create a codec from a capture function and a replay function.
    ///
    /// The replay function is called while the owning element's start tag is open and
    /// should emit attributes only.
    #[must_use]
    pub fn new(
        read: impl Fn(&XAttribute) -> MapResult<A> + Send + Sync + 'static,
        write: impl Fn(&mut dyn XmlWrite, &A) -> MapResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            read: Arc::new(read),
            write: Arc::new(write),
        }
    }
}

impl<A> Clone for AttributeCodec<A> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
            write: Arc::clone(&self.write),
        }
    }
}

impl<A> fmt::Debug for AttributeCodec<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeCodec")
            .field("member", &type_name::<A>())
            .finish_non_exhaustive()
    }
}

/// Converts an overflow element to a member value and back.
pub struct ElementCodec<E> {
    read: Arc<ReadElement<E>>,
    write: Arc<WriteElement<E>>,
}

impl ElementCodec<XElement> {
    /// Capture and replay the element subtree verbatim.
    #[must_use]
    pub fn raw() -> Self {
        Self::new(XElement::read_from, |writer, element| element.write_to(writer))
    }
}

impl<E> ElementCodec<E> {
    /// Create a codec from a capture function and a replay function.
    ///
    /// The capture function is entered with the cursor on the element start and must
    /// leave it on the element's last node (see [`XmlRead`]).
    #[must_use]
    pub fn new(
        read: impl Fn(&mut dyn XmlRead) -> MapResult<E> + Send + Sync + 'static,
        write: impl Fn(&mut dyn XmlWrite, &E) -> MapResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            read: Arc::new(read),
            write: Arc::new(write),
        }
    }
}

impl<E> Clone for ElementCodec<E> {
    fn clone(&self) -> Self {
        Self {
            read: Arc::clone(&self.read),
            write: Arc::clone(&self.write),
        }
    }
}

impl<E> fmt::Debug for ElementCodec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementCodec")
            .field("member", &type_name::<E>())
            .finish_non_exhaustive()
    }
}

trait OverflowAttributes: Send + Sync {
    fn capture(&self, owner: &mut dyn Any, attribute: &XAttribute) -> MapResult<()>;
    fn replay(&self, owner: &dyn Any, writer: &mut dyn XmlWrite) -> MapResult<()>;
}

struct AttributeOverflow<T, L: CollectionProperty> {
    lens: Lens<T, L>,
    codec: AttributeCodec<L::Item>,
}

impl<T: 'static, L: CollectionProperty> OverflowAttributes for AttributeOverflow<T, L> {
    fn capture(&self, owner: &mut dyn Any, attribute: &XAttribute) -> MapResult<()> {
        let member = (self.codec.read)(attribute)?;
        self.lens.get_mut(downcast_mut::<T>(owner)?).append(member);
        Ok(())
    }

    fn replay(&self, owner: &dyn Any, writer: &mut dyn XmlWrite) -> MapResult<()> {
        let collection = self.lens.get(downcast_ref::<T>(owner)?);
        for index in 0..collection.member_count() {
            if let Some(member) = collection.member(index) {
                (self.codec.write)(writer, member)?;
            }
        }
        Ok(())
    }
}

/// Captures attributes no attribute mapping claims into a collection property.
pub struct AnyAttributeMapping {
    overflow: Box<dyn OverflowAttributes>,
    member: &'static str,
}

impl AnyAttributeMapping {
    /// Capture raw attributes into a collection of [`XAttribute`].
    #[must_use]
    pub fn new<T: 'static, L>(lens: Lens<T, L>) -> Self
    where
        L: CollectionProperty<Item = XAttribute>,
    {
        Self::with_codec(lens, AttributeCodec::raw())
    }

    /// Capture attributes through a custom codec.
    #[must_use]
    pub fn with_codec<T: 'static, L: CollectionProperty>(
        lens: Lens<T, L>,
        codec: AttributeCodec<L::Item>,
    ) -> Self {
        Self {
            overflow: Box::new(AttributeOverflow { lens, codec }),
            member: type_name::<L::Item>(),
        }
    }

    /// Convert `attribute` and append it to the collection of `owner`.
    ///
    /// # Errors
    ///
    /// Returns `MapError` if the codec fails or `owner` is not the mapped type.
    pub fn capture(&self, owner: &mut dyn Any, attribute: &XAttribute) -> MapResult<()> {
        self.overflow.capture(owner, attribute)
    }

    /// Write every captured member of `owner` as attributes.
    ///
    /// # Errors
    ///
    /// Returns `MapError` if the codec or writer fails, or `owner` is not the mapped type.
    pub fn replay(&self, owner: &dyn Any, writer: &mut dyn XmlWrite) -> MapResult<()> {
        self.overflow.replay(owner, writer)
    }
}

impl fmt::Debug for AnyAttributeMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyAttributeMapping")
            .field("member", &self.member)
            .finish()
    }
}

trait OverflowElements: Send + Sync {
    fn capture(&self, owner: &mut dyn Any, reader: &mut dyn XmlRead) -> MapResult<()>;
    fn replay(&self, owner: &dyn Any, writer: &mut dyn XmlWrite) -> MapResult<()>;
}

struct ElementOverflow<T, L: CollectionProperty> {
    lens: Lens<T, L>,
    codec: ElementCodec<L::Item>,
}

impl<T: 'static, L: CollectionProperty> OverflowElements for ElementOverflow<T, L> {
    fn capture(&self, owner: &mut dyn Any, reader: &mut dyn XmlRead) -> MapResult<()> {
        let member = (self.codec.read)(reader)?;
        self.lens.get_mut(downcast_mut::<T>(owner)?).append(member);
        Ok(())
    }

    fn replay(&self, owner: &dyn Any, writer: &mut dyn XmlWrite) -> MapResult<()> {
        let collection = self.lens.get(downcast_ref::<T>(owner)?);
        for index in 0..collection.member_count() {
            if let Some(member) = collection.member(index) {
                (self.codec.write)(writer, member)?;
            }
        }
        Ok(())
    }
}

/// Captures child elements no element mapping claims into a collection property.
pub struct AnyElementMapping {
    overflow: Box<dyn OverflowElements>,
    member: &'static str,
}

impl AnyElementMapping {
    /// Capture raw subtrees into a collection of [`XElement`].
    #[must_use]
    pub fn new<T: 'static, L>(lens: Lens<T, L>) -> Self
    where
        L: CollectionProperty<Item = XElement>,
    {
        Self::with_codec(lens, ElementCodec::raw())
    }

    /// Capture elements through a custom codec.
    #[must_use]
    pub fn with_codec<T: 'static, L: CollectionProperty>(
        lens: Lens<T, L>,
        codec: ElementCodec<L::Item>,
    ) -> Self {
        Self {
            overflow: Box::new(ElementOverflow { lens, codec }),
            member: type_name::<L::Item>(),
        }
    }

    /// Read the element under the cursor and append it to the collection of `owner`.
    ///
    /// # Errors
    ///
    /// Returns `MapError` if the codec fails or `owner` is not the mapped type.
    pub fn capture(&self, owner: &mut dyn Any, reader: &mut dyn XmlRead) -> MapResult<()> {
        self.overflow.capture(owner, reader)
    }

    /// Write every captured member of `owner` as child elements.
    ///
    /// # Errors
    ///
    /// Returns `MapError` if the codec or writer fails, or `owner` is not the mapped type.
    pub fn replay(&self, owner: &dyn Any, writer: &mut dyn XmlWrite) -> MapResult<()> {
        self.overflow.replay(owner, writer)
    }
}

impl fmt::Debug for AnyElementMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyElementMapping")
            .field("member", &self.member)
            .finish()
    }
}
