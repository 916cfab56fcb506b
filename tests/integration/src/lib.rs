//! End-to-end tests for the xmlmap crates.
//!
//! The sample model mirrors a small document store: a [`Document`] holds persons and
//! arbitrary foreign elements, a [`Person`] carries scalar attributes, an address, a
//! heterogeneous list of contact methods, and any unmodeled attributes.
//!
//! Run them with:
//! ```text
//! cargo test -p xmlmap-integration
//! ```
//!
//! Set `RUST_LOG=xmlmap_schema=debug,xmlmap_xml=trace` to see what the engine does.

use std::sync::Once;

use chrono::{DateTime, TimeDelta, Utc};
use xmlmap_core::{ConversionError, MapResult, XAttribute, XElement, XNamespace};
use xmlmap_schema::{Converter, Lens, SchemaDescription, Variant, lens, xml_enum};
use xmlmap_xml::Serializer;

/// Namespace of the sample model.
pub const TEST_NS: &str = "http://test.com";

/// Namespace used for foreign content.
pub const DMS_NS: &str = "http://dms.com";

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

xml_enum! {
    /// How a person can be reached.
    #[derive(Default)]
    pub(crate) enum ContactMethodType {
        #[default]
        HomePhone,
        MobilePhone,
        Email,
        Address,
    }
}

/// A postal address; the element text holds free-form comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Address {
    pub street_name: String,
    pub city: String,
    pub comments: Option<String>,
}

/// A phone number or e-mail address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ContactMethod {
    pub kind: ContactMethodType,
    pub optional_kind: Option<ContactMethodType>,
    pub value: String,
}

/// A contact method that also carries a street.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AddressContactMethod {
    pub kind: ContactMethodType,
    pub optional_kind: Option<ContactMethodType>,
    pub value: String,
    pub street_name: String,
}

/// One member of a person's contact list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ContactEntry {
    Plain(ContactMethod),
    Address(AddressContactMethod),
}

impl ContactEntry {
    fn as_plain(&self) -> Option<&ContactMethod> {
        match self {
            Self::Plain(method) => Some(method),
            Self::Address(_) => None,
        }
    }

    fn as_address(&self) -> Option<&AddressContactMethod> {
        match self {
            Self::Address(method) => Some(method),
            Self::Plain(_) => None,
        }
    }
}

/// A person with scalar attributes, nested content and captured extras.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Person {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub is_enabled: bool,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub time_since_last_login: Option<TimeDelta>,
    pub address: Option<Address>,
    pub contact_methods: Option<Vec<ContactEntry>>,
    pub custom_attributes: Vec<XAttribute>,
}

/// The root: persons plus any foreign elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Document {
    pub persons: Vec<Person>,
    pub custom_elements: Vec<XElement>,
}

/// `hh:mm:ss` without a day component; blank means absent.
fn login_converter() -> Converter<Option<TimeDelta>> {
    Converter::new(
        |wire| {
            let wire = wire.trim();
            if wire.is_empty() {
                return Ok(None);
            }
            let parts = wire
                .split(':')
                .map(str::parse::<i64>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| ConversionError::new(wire, "TimeDelta", e.to_string()))?;
            match parts.as_slice() {
                [hours, minutes, seconds] => Ok(Some(TimeDelta::seconds(
                    hours * 3600 + minutes * 60 + seconds,
                ))),
                _ => Err(ConversionError::new(wire, "TimeDelta", "expected hh:mm:ss")),
            }
        },
        |value| {
            value.map(|delta| {
                let total = delta.num_seconds();
                format!("{:02}:{:02}:{:02}", total / 3600, total % 3600 / 60, total % 60)
            })
        },
    )
}

/// The schema of the sample model.
pub fn full_schema() -> MapResult<SchemaDescription> {
    let ns = XNamespace::new(TEST_NS);
    SchemaDescription::builder()
        .element::<Document>(ns.name("Document"))
        .collection_element(ns.name("Person"), lens!(Document, persons))
        .attribute("Id", lens!(Person, id))
        .attribute("FirstName", lens!(Person, first_name))
        .attribute("LastName", lens!(Person, last_name))
        .attribute("DateOfBirth", lens!(Person, date_of_birth))
        .attribute_with(
            "TimeSinceLastLogin",
            lens!(Person, time_since_last_login),
            login_converter(),
        )
        .any_attribute(lens!(Person, custom_attributes))
        .text_element(ns.name("IsEnabled"), lens!(Person, is_enabled))
        .element(ns.name("Address"), lens!(Person, address))
        .attribute("StreetName", lens!(Address, street_name))
        .attribute("City", lens!(Address, city))
        .text_content(lens!(Address, comments))
        .end()
        .element(ns.name("ContactMethods"), lens!(Person, contact_methods))
        .collection_variant(
            ns.name("ContactMethod"),
            Lens::identity(),
            Variant::new(ContactEntry::Plain, ContactEntry::as_plain),
        )
        .attribute("Type", lens!(ContactMethod, kind))
        .attribute("OptionalType", lens!(ContactMethod, optional_kind))
        .attribute("Value", lens!(ContactMethod, value))
        .end()
        .collection_variant(
            ns.name("AddressContactMethod"),
            Lens::identity(),
            Variant::new(ContactEntry::Address, ContactEntry::as_address),
        )
        .attribute("Type", lens!(AddressContactMethod, kind))
        .attribute("OptionalType", lens!(AddressContactMethod, optional_kind))
        .attribute("Value", lens!(AddressContactMethod, value))
        .attribute("StreetName", lens!(AddressContactMethod, street_name))
        .end()
        .end()
        .end()
        .any_element(lens!(Document, custom_elements))
        .build()
}

/// A serializer over [`full_schema`].
#[must_use]
pub fn serializer() -> Serializer {
    init_tracing();
    let schema = full_schema().unwrap_or_else(|e| panic!("sample schema must build: {e}"));
    Serializer::new(schema)
}

mod test_concurrency;
mod test_document;
mod test_fragment;
mod test_schema;
mod test_values;
