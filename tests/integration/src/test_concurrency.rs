//! One schema and serializer shared by many threads.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use xmlmap_core::XAttribute;

    use crate::{Address, Document, Person, serializer};

    fn person(index: usize) -> Person {
        Person {
            id: i64::try_from(index).ok(),
            first_name: format!("Person{index}"),
            is_enabled: index % 2 == 0,
            address: Some(Address {
                street_name: format!("{index} Queen Street"),
                city: "Auckland".to_owned(),
                comments: None,
            }),
            custom_attributes: vec![XAttribute::new("Thread", index.to_string())],
            ..Default::default()
        }
    }

    #[test]
    fn test_should_share_serializer_across_threads() {
        let serializer = Arc::new(serializer());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let serializer = Arc::clone(&serializer);
                thread::spawn(move || {
                    for round in 0..25 {
                        let document = Document {
                            persons: (0..3).map(|i| person(worker * 100 + round * 3 + i)).collect(),
                            custom_elements: Vec::new(),
                        };
                        let xml = serializer.to_string(&document).expect("serializable");
                        let back: Document = serializer.from_str(&xml).expect("readable");
                        assert_eq!(back, document);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("worker panicked");
        }
    }

    #[test]
    fn test_should_clone_serializer_with_shared_schema() {
        let original = serializer();
        let copy = original.clone();

        let document = Document {
            persons: vec![person(1)],
            custom_elements: Vec::new(),
        };
        let xml = original.to_string(&document).expect("serializable");

        assert_eq!(copy.to_string(&document).expect("serializable"), xml);
        assert!(std::ptr::eq(original.schema(), copy.schema()));
    }
}
