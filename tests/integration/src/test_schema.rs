//! Schema construction failures and introspection of the sample schema.

#[cfg(test)]
mod tests {
    use xmlmap_core::{MapError, SchemaError, XName};
    use xmlmap_schema::{Mapping, SchemaDescription, lens};

    use crate::{
        Address, ContactEntry, ContactMethod, Document, Person, TEST_NS, full_schema, serializer,
    };

    #[test]
    fn test_should_register_every_mapped_type() {
        let schema = full_schema().expect("valid schema");

        // Document, Person, Address, the contact list wrapper and both contact variants.
        assert_eq!(schema.len(), 6);
        let person = schema.mapping_for::<Person>().expect("person");
        assert_eq!(person.name(), &XName::qualified(TEST_NS, "Person"));
        assert!(person.find_attribute(None, "DateOfBirth").is_some());
        assert!(person.find_attribute(Some(TEST_NS), "DateOfBirth").is_none());
        assert!(matches!(
            person.find_element(Some(TEST_NS), "IsEnabled"),
            Some(Mapping::TextElement(_))
        ));
        assert!(person.any_attribute().is_some());
        assert!(person.any_element().is_none());

        let address = schema.mapping_for::<Address>().expect("address");
        assert!(address.text_content().is_some());
        assert_eq!(address.attributes().count(), 2);
        assert!(schema.mapping_for::<ContactMethod>().is_some());
        assert!(schema.mapping_for::<Vec<ContactEntry>>().is_some());
        assert!(schema.mapping_for::<String>().is_none());
    }

    #[test]
    fn test_should_reject_duplicate_child_element_names() {
        let err = SchemaDescription::builder()
            .element::<Person>("Person")
            .text_element("Name", lens!(Person, first_name))
            .text_element("Name", lens!(Person, last_name))
            .build()
            .expect_err("duplicate element");

        assert!(matches!(
            err,
            MapError::Schema(SchemaError::DuplicateElement { ref name, .. }) if name == "Name"
        ));
    }

    #[test]
    fn test_should_reject_duplicate_attribute_in_nested_element() {
        let err = SchemaDescription::builder()
            .element::<Document>("Document")
            .collection_element("Person", lens!(Document, persons))
            .attribute("Id", lens!(Person, id))
            .attribute("Id", lens!(Person, first_name))
            .end()
            .build()
            .expect_err("duplicate attribute");

        assert!(matches!(
            err,
            MapError::Schema(SchemaError::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn test_should_reject_type_declared_twice_at_root() {
        let err = SchemaDescription::builder()
            .element::<Address>("Address")
            .end()
            .element::<Address>("PostalAddress")
            .build()
            .expect_err("duplicate root type");

        assert!(matches!(err, MapError::Schema(SchemaError::DuplicateType { .. })));
    }

    #[test]
    fn test_should_refuse_unregistered_types() {
        let err = serializer()
            .to_string(&"just a string".to_owned())
            .expect_err("unregistered");

        assert!(matches!(err, MapError::UnsupportedType { .. }));
        assert!(err.to_string().contains("String"), "{err}");
    }

    #[derive(Debug, Default, PartialEq)]
    struct Category {
        name: String,
        parent: Option<Box<Category>>,
    }

    #[test]
    fn test_should_map_boxed_child() {
        let schema = SchemaDescription::builder()
            .element::<Category>("Category")
            .attribute("Name", lens!(Category, name))
            .element("Parent", lens!(Category, parent))
            .attribute("Name", lens!(Box<Category>, name))
            .end()
            .build()
            .expect("valid schema");
        let serializer = xmlmap_xml::Serializer::new(schema);

        let category = Category {
            name: "Shoes".to_owned(),
            parent: Some(Box::new(Category {
                name: "Clothing".to_owned(),
                parent: None,
            })),
        };
        let xml = serializer.to_string(&category).expect("serializable");
        assert_eq!(xml, r#"<Category Name="Shoes"><Parent Name="Clothing" /></Category>"#);

        let back: Category = serializer.from_str(&xml).expect("readable");
        assert_eq!(back, category);
    }
}
