//! Type-binding layer.
//!
//! Resolves a declared property on a type into accessor functions once, at schema
//! declaration time. Nothing here inspects a type per document:
//!
//! - [`Lens`] is a getter/setter pair over one property path (see [`lens!`](crate::lens)).
//! - [`Constructor`] is the construction strategy for a mapped type.
//! - [`CollectionProperty`] describes collection-shaped properties, including lazily
//!   constructed `Option<Vec<_>>` backings.
//! - [`Variant`] maps a concrete element type into a collection's item type and back,
//!   which is how heterogeneous (polymorphic) collections are expressed.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// A getter/setter pair for one property of `T` with type `P`.
pub struct Lens<T, P> {
    get: fn(&T) -> &P,
    get_mut: fn(&mut T) -> &mut P,
}

impl<T, P> Lens<T, P> {
    /// Create a lens from accessor functions.
    #[must_use]
    pub const fn new(get: fn(&T) -> &P, get_mut: fn(&mut T) -> &mut P) -> Self {
        Self { get, get_mut }
    }

    /// Borrow the property.
    pub fn get<'a>(&self, target: &'a T) -> &'a P {
        (self.get)(target)
    }

    /// Mutably borrow the property.
    pub fn get_mut<'a>(&self, target: &'a mut T) -> &'a mut P {
        (self.get_mut)(target)
    }

    /// Overwrite the property.
    pub fn set(&self, target: &mut T, value: P) {
        *(self.get_mut)(target) = value;
    }
}

impl<T> Lens<T, T> {
    /// A lens on the target itself, for elements whose object is the collection.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(same_ref, same_mut)
    }
}

fn same_ref<T>(target: &T) -> &T {
    target
}

fn same_mut<T>(target: &mut T) -> &mut T {
    target
}

impl<T, P> Clone for Lens<T, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, P> Copy for Lens<T, P> {}

impl<T, P> fmt::Debug for Lens<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens")
            .field("target", &std::any::type_name::<T>())
            .field("property", &std::any::type_name::<P>())
            .finish()
    }
}

/// Build a [`Lens`] over a (possibly nested) field path.
///
/// # Examples
///
/// ```
/// use xmlmap_schema::lens;
///
/// #[derive(Default)]
/// struct Address { city: String }
/// #[derive(Default)]
/// struct Person { address: Address }
///
/// let city = lens!(Person, address.city);
/// let mut person = Person::default();
/// city.set(&mut person, "Auckland".to_owned());
/// assert_eq!(city.get(&person), "Auckland");
/// ```
#[macro_export]
macro_rules! lens {
    ($ty:ty, $($field:ident).+) => {
        $crate::Lens::<$ty, _>::new(
            |target: &$ty| &target.$($field).+,
            |target: &mut $ty| &mut target.$($field).+,
        )
    };
}

/// How instances of a mapped type are created when reading.
pub struct Constructor<T> {
    make: Option<Arc<dyn Fn() -> T + Send + Sync>>,
}

impl<T: Default + 'static> Constructor<T> {
    /// Construct through `T::default()`.
    #[must_use]
    pub fn from_default() -> Self {
        Self {
            make: Some(Arc::new(T::default)),
        }
    }
}

impl<T> Constructor<T> {
    /// Construct through a factory function.
    #[must_use]
    pub fn from_fn(make: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            make: Some(Arc::new(make)),
        }
    }

    /// No construction strategy; a schema declaring this type fails to build.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { make: None }
    }

    /// Whether a construction strategy exists.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.make.is_some()
    }

    /// Create an instance, if a construction strategy exists.
    #[must_use]
    pub fn construct(&self) -> Option<T> {
        self.make.as_ref().map(|make| make())
    }

    pub(crate) fn into_factory(self) -> Option<Arc<dyn Fn() -> T + Send + Sync>> {
        self.make
    }
}

impl<T> Clone for Constructor<T> {
    fn clone(&self) -> Self {
        Self {
            make: self.make.clone(),
        }
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("type", &std::any::type_name::<T>())
            .field("available", &self.make.is_some())
            .finish()
    }
}

/// A collection-valued property: ordered, appendable, and identifiable.
///
/// `identity` returns the address of the backing collection, or `None` when an
/// optional backing has not been constructed. Several mappings bound to the same
/// property observe the same identity.
pub trait CollectionProperty: 'static {
    /// The member type.
    type Item: 'static;

    /// The identity of the backing collection, if one exists.
    fn identity(&self) -> Option<*const ()>;

    /// Number of members.
    fn member_count(&self) -> usize;

    /// The member at `index`.
    fn member(&self, index: usize) -> Option<&Self::Item>;

    /// Append a member, constructing the backing collection first if absent.
    fn append(&mut self, item: Self::Item);
}

impl<I: 'static> CollectionProperty for Vec<I> {
    type Item = I;

    fn identity(&self) -> Option<*const ()> {
        Some(std::ptr::from_ref(self).cast())
    }

    fn member_count(&self) -> usize {
        self.len()
    }

    fn member(&self, index: usize) -> Option<&I> {
        self.get(index)
    }

    fn append(&mut self, item: I) {
        self.push(item);
    }
}

impl<I: 'static> CollectionProperty for VecDeque<I> {
    type Item = I;

    fn identity(&self) -> Option<*const ()> {
        Some(std::ptr::from_ref(self).cast())
    }

    fn member_count(&self) -> usize {
        self.len()
    }

    fn member(&self, index: usize) -> Option<&I> {
        self.get(index)
    }

    fn append(&mut self, item: I) {
        self.push_back(item);
    }
}

impl<C: CollectionProperty + Default> CollectionProperty for Option<C> {
    type Item = C::Item;

    fn identity(&self) -> Option<*const ()> {
        self.as_ref().and_then(CollectionProperty::identity)
    }

    fn member_count(&self) -> usize {
        self.as_ref().map_or(0, CollectionProperty::member_count)
    }

    fn member(&self, index: usize) -> Option<&C::Item> {
        self.as_ref().and_then(|c| c.member(index))
    }

    fn append(&mut self, item: C::Item) {
        self.get_or_insert_with(C::default).append(item);
    }
}

/// Maps a concrete element type `C` into a collection item type `I` and back.
///
/// For a homogeneous collection `I` and `C` are the same type ([`Variant::identity`]).
/// For a heterogeneous one `I` is usually an enum and `C` one of its payloads.
pub struct Variant<I, C> {
    wrap: fn(C) -> I,
    unwrap: fn(&I) -> Option<&C>,
}

impl<I, C> Variant<I, C> {
    /// Create a variant from its injection and projection.
    #[must_use]
    pub const fn new(wrap: fn(C) -> I, unwrap: fn(&I) -> Option<&C>) -> Self {
        Self { wrap, unwrap }
    }

    /// Inject a concrete value into the item type.
    pub fn wrap(&self, value: C) -> I {
        (self.wrap)(value)
    }

    /// Project an item onto this variant, if it is one.
    pub fn unwrap<'a>(&self, item: &'a I) -> Option<&'a C> {
        (self.unwrap)(item)
    }
}

impl<T> Variant<T, T> {
    /// The variant of a homogeneous collection.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(same_value, some_ref)
    }
}

fn same_value<T>(value: T) -> T {
    value
}

fn some_ref<T>(value: &T) -> Option<&T> {
    Some(value)
}

impl<I, C> Clone for Variant<I, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, C> Copy for Variant<I, C> {}

impl<I, C> fmt::Debug for Variant<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("item", &std::any::type_name::<I>())
            .field("concrete", &std::any::type_name::<C>())
            .finish()
    }
}
