//! Whole documents: nested children, polymorphic collections and overflow content.

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone, Utc};
    use xmlmap_core::{SerializerConfig, XAttribute, XElement, XName, XNamespace};

    use crate::{
        Address, AddressContactMethod, ContactEntry, ContactMethod, ContactMethodType, DMS_NS,
        Document, Person, TEST_NS, serializer,
    };

    const DOCUMENT: &str = r#"<Document xmlns="http://test.com" xmlns:dms="http://dms.com">
        <dms:CustomElement1>
            <dms:Child1 />
            <dms:Child2 Attr1="Value1" />
        </dms:CustomElement1>
        <Person Id="123" FirstName="James" LastName="Jefferson" DateOfBirth="2010-02-12T23:59:59Z" TimeSinceLastLogin="00:20:00" Custom1="CustomValue1" dms:Custom2="CustomValue2">
            <IsEnabled>true</IsEnabled>
            <Address StreetName="231 Queen Street" City="Auckland">Some comments</Address>
            <ContactMethods>
                <ContactMethod Type="Email" Value="james@jefferson.com" />
                <AddressContactMethod Type="Address" Value="Auckland City" StreetName="232 Queen Street" />
                <ContactMethod Type="HomePhone" OptionalType="HomePhone" Value="555-1234" />
            </ContactMethods>
        </Person>
        <CustomElement2 Name="Value2" />
        <Person Id="124" FirstName="Paul" LastName="Jefferson" IsEnabled="false">
            <Address StreetName="500 Dominion Road" City="Auckland" />
        </Person>
        <CustomElement3 Name="Value3" />
    </Document>"#;

    fn sample_document() -> Document {
        let dms = XNamespace::new(DMS_NS);
        let test = XNamespace::new(TEST_NS);
        Document {
            custom_elements: vec![
                XElement::new(dms.name("CustomElement1"))
                    .with_child(XElement::new(dms.name("Child1")))
                    .with_child(
                        XElement::new(dms.name("Child2")).with_attribute("Attr1", "Value1"),
                    ),
                XElement::new(test.name("CustomElement2")).with_attribute("Name", "Value2"),
                XElement::new(test.name("CustomElement3")).with_attribute("Name", "Value3"),
            ],
            persons: vec![
                Person {
                    id: Some(123),
                    first_name: "James".to_owned(),
                    last_name: "Jefferson".to_owned(),
                    is_enabled: true,
                    date_of_birth: Utc.with_ymd_and_hms(2010, 2, 12, 23, 59, 59).single(),
                    time_since_last_login: Some(TimeDelta::minutes(20)),
                    address: Some(Address {
                        street_name: "231 Queen Street".to_owned(),
                        city: "Auckland".to_owned(),
                        comments: Some("Some comments".to_owned()),
                    }),
                    contact_methods: Some(vec![
                        ContactEntry::Plain(ContactMethod {
                            kind: ContactMethodType::Email,
                            optional_kind: None,
                            value: "james@jefferson.com".to_owned(),
                        }),
                        ContactEntry::Address(AddressContactMethod {
                            kind: ContactMethodType::Address,
                            optional_kind: Some(ContactMethodType::Email),
                            value: "Auckland City".to_owned(),
                            street_name: "232 Queen Street".to_owned(),
                        }),
                        ContactEntry::Plain(ContactMethod {
                            kind: ContactMethodType::HomePhone,
                            optional_kind: None,
                            value: "555-1234".to_owned(),
                        }),
                    ]),
                    custom_attributes: vec![
                        XAttribute::new("Custom1", "CustomValue1"),
                        XAttribute::new(dms.name("Custom2"), "CustomValue2"),
                    ],
                },
                Person {
                    id: Some(124),
                    first_name: "Paul".to_owned(),
                    last_name: "Jefferson".to_owned(),
                    address: Some(Address {
                        street_name: "500 Dominion Road".to_owned(),
                        city: "Auckland".to_owned(),
                        comments: None,
                    }),
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_should_deserialize_document() {
        let document: Document = serializer().from_str(DOCUMENT).expect("valid document");

        assert_eq!(document.persons.len(), 2);
        assert_eq!(document.custom_elements.len(), 3);

        let first = &document.custom_elements[0];
        assert_eq!(first.name, XName::qualified(DMS_NS, "CustomElement1"));
        let children: Vec<_> = first.elements().collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name.local_name(), "Child1");
        assert_eq!(children[1].name.local_name(), "Child2");
        assert_eq!(children[1].attribute(&XName::local("Attr1")), Some("Value1"));
        assert_eq!(document.custom_elements[1].name, XName::qualified(TEST_NS, "CustomElement2"));
        assert_eq!(document.custom_elements[2].name, XName::qualified(TEST_NS, "CustomElement3"));

        let james = &document.persons[0];
        assert_eq!(james.id, Some(123));
        assert_eq!(james.date_of_birth, Utc.with_ymd_and_hms(2010, 2, 12, 23, 59, 59).single());
        assert_eq!(james.time_since_last_login, Some(TimeDelta::minutes(20)));
        assert!(james.is_enabled);
        let address = james.address.as_ref().expect("address");
        assert_eq!(address.street_name, "231 Queen Street");
        assert_eq!(address.comments.as_deref(), Some("Some comments"));

        let contacts = james.contact_methods.as_ref().expect("contact methods");
        assert_eq!(contacts.len(), 3);
        assert!(matches!(
            &contacts[0],
            ContactEntry::Plain(ContactMethod {
                kind: ContactMethodType::Email,
                optional_kind: None,
                ..
            })
        ));
        match &contacts[1] {
            ContactEntry::Address(method) => {
                assert_eq!(method.kind, ContactMethodType::Address);
                assert_eq!(method.value, "Auckland City");
                assert_eq!(method.street_name, "232 Queen Street");
            }
            other => panic!("expected an address contact method, got {other:?}"),
        }
        assert!(matches!(
            &contacts[2],
            ContactEntry::Plain(ContactMethod {
                kind: ContactMethodType::HomePhone,
                optional_kind: Some(ContactMethodType::HomePhone),
                ..
            })
        ));

        assert_eq!(
            james.custom_attributes,
            vec![
                XAttribute::new("Custom1", "CustomValue1"),
                XAttribute::new(XName::qualified(DMS_NS, "Custom2"), "CustomValue2"),
            ]
        );

        let paul = &document.persons[1];
        assert_eq!(paul.id, Some(124));
        assert_eq!(paul.first_name, "Paul");
        assert!(!paul.is_enabled);
        assert!(paul.contact_methods.is_none());
        assert_eq!(paul.custom_attributes, vec![XAttribute::new("IsEnabled", "false")]);
        assert_eq!(
            paul.address.as_ref().map(|a| a.street_name.as_str()),
            Some("500 Dominion Road")
        );
    }

    #[test]
    fn test_should_serialize_document() {
        let xml = serializer().to_string(&sample_document()).expect("serializable");

        let expected = concat!(
            r#"<Document xmlns="http://test.com">"#,
            r#"<Person Id="123" FirstName="James" LastName="Jefferson" DateOfBirth="2010-02-12T23:59:59Z" TimeSinceLastLogin="00:20:00" Custom1="CustomValue1" ns0:Custom2="CustomValue2" xmlns:ns0="http://dms.com">"#,
            r"<IsEnabled>true</IsEnabled>",
            r#"<Address StreetName="231 Queen Street" City="Auckland">Some comments</Address>"#,
            r"<ContactMethods>",
            r#"<ContactMethod Type="Email" Value="james@jefferson.com" />"#,
            r#"<AddressContactMethod Type="Address" OptionalType="Email" Value="Auckland City" StreetName="232 Queen Street" />"#,
            r#"<ContactMethod Type="HomePhone" Value="555-1234" />"#,
            r"</ContactMethods>",
            r"</Person>",
            r#"<Person Id="124" FirstName="Paul" LastName="Jefferson">"#,
            r"<IsEnabled>false</IsEnabled>",
            r#"<Address StreetName="500 Dominion Road" City="Auckland" />"#,
            r"</Person>",
            r#"<CustomElement1 xmlns="http://dms.com"><Child1 /><Child2 Attr1="Value1" /></CustomElement1>"#,
            r#"<CustomElement2 Name="Value2" />"#,
            r#"<CustomElement3 Name="Value3" />"#,
            r"</Document>",
        );
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_should_round_trip_document() {
        let serializer = serializer();
        let document = sample_document();

        let xml = serializer.to_string(&document).expect("serializable");
        let back: Document = serializer.from_str(&xml).expect("readable");

        assert_eq!(back, document);
    }

    #[test]
    fn test_should_round_trip_pretty_printed_document() {
        let serializer = serializer().with_config(
            SerializerConfig::builder()
                .write_declaration(true)
                .indent(Some(2))
                .build(),
        );
        let document = sample_document();

        let bytes = serializer.to_vec(&document).expect("serializable");
        let back: Document = serializer.from_slice(&bytes).expect("readable");

        assert_eq!(back, document);
    }

    #[test]
    fn test_should_read_contact_methods_in_document_order() {
        let xml = r#"<Document xmlns="http://test.com"><Person>
            <ContactMethods>
                <AddressContactMethod Type="Address" StreetName="1 High St" />
                <ContactMethod Type="MobilePhone" Value="021" />
                <AddressContactMethod Type="Address" StreetName="2 High St" />
            </ContactMethods>
        </Person></Document>"#;
        let document: Document = serializer().from_str(xml).expect("readable");

        let contacts = document.persons[0].contact_methods.as_ref().expect("contacts");
        let streets: Vec<_> = contacts
            .iter()
            .map(|entry| match entry {
                ContactEntry::Address(method) => method.street_name.as_str(),
                ContactEntry::Plain(method) => method.value.as_str(),
            })
            .collect();
        assert_eq!(streets, ["1 High St", "021", "2 High St"]);
    }

    #[test]
    fn test_should_leave_absent_optionals_unset() {
        let document: Document = serializer()
            .from_str(r#"<Document xmlns="http://test.com"><Person FirstName="Ann"/></Document>"#)
            .expect("readable");

        let ann = &document.persons[0];
        assert_eq!(ann.first_name, "Ann");
        assert!(ann.id.is_none());
        assert!(ann.date_of_birth.is_none());
        assert!(ann.time_since_last_login.is_none());
        assert!(ann.address.is_none());
        assert!(ann.contact_methods.is_none());
        assert!(document.custom_elements.is_empty());
    }

    #[test]
    fn test_should_report_conversion_errors() {
        let err = serializer()
            .from_str::<Document>(
                r#"<Document xmlns="http://test.com"><Person><ContactMethods><ContactMethod Type="Pager"/></ContactMethods></Person></Document>"#,
            )
            .expect_err("unknown enum symbol");

        assert!(err.to_string().contains("Pager"), "{err}");
    }
}
