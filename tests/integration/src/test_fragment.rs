//! Single-element documents read and written through a nested type's mapping.

#[cfg(test)]
mod tests {
    use xmlmap_core::{FormatErrorKind, MapError};

    use crate::{Address, serializer};

    #[test]
    fn test_should_deserialize_fragment() {
        let fragment = r#"<Address xmlns="http://test.com" StreetName="231 Queen Street" City="Auckland" />"#;
        let address: Address = serializer().from_str(fragment).expect("valid fragment");

        assert_eq!(address.street_name, "231 Queen Street");
        assert_eq!(address.city, "Auckland");
        assert!(address.comments.is_none());
    }

    #[test]
    fn test_should_fail_on_invalid_local_name() {
        let fragment = r#"<Invalid StreetName="231 Queen Street" City="Auckland" />"#;
        let err = serializer()
            .from_str::<Address>(fragment)
            .expect_err("wrong element name");

        assert_eq!(err.format_kind(), Some(FormatErrorKind::UnexpectedName));
        assert!(err.to_string().contains("Invalid"), "{err}");
    }

    #[test]
    fn test_should_fail_on_missing_namespace() {
        let fragment = r#"<Address StreetName="231 Queen Street" City="Auckland" />"#;
        let err = serializer()
            .from_str::<Address>(fragment)
            .expect_err("wrong namespace");

        assert_eq!(err.format_kind(), Some(FormatErrorKind::UnexpectedNamespace));
        match err {
            MapError::Format { position, .. } => assert_eq!(position.line, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_should_serialize_fragment() {
        let address = Address {
            street_name: "231 Queen Street".to_owned(),
            city: "Auckland".to_owned(),
            comments: None,
        };
        let xml = serializer().to_string(&address).expect("serializable");

        assert_eq!(
            xml,
            r#"<Address StreetName="231 Queen Street" City="Auckland" xmlns="http://test.com" />"#
        );
    }

    #[test]
    fn test_should_round_trip_text_content() {
        let serializer = serializer();
        let address = Address {
            street_name: "1 Fish & Chip Lane".to_owned(),
            city: "Wellington".to_owned(),
            comments: Some("Ring <twice>".to_owned()),
        };
        let xml = serializer.to_string(&address).expect("serializable");
        assert!(xml.contains("Fish &amp; Chip"), "{xml}");
        assert!(xml.contains(">Ring &lt;twice&gt;</Address>"), "{xml}");

        let back: Address = serializer.from_str(&xml).expect("readable");
        assert_eq!(back, address);
    }
}
