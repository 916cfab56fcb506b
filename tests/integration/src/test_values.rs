//! Edge-valued scalars carried through a full write-then-read cycle.

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use xmlmap_core::SerializerConfig;
    use xmlmap_schema::{SchemaDescription, lens};
    use xmlmap_xml::Serializer;

    use crate::init_tracing;

    #[derive(Debug, Clone, Default)]
    struct Sample {
        label: Option<String>,
        ratio: f64,
        elapsed: TimeDelta,
        offset: Option<TimeDelta>,
        memo: Option<String>,
        lines: Vec<Line>,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Line {
        number: u32,
        text: Option<String>,
    }

    fn sample_serializer(config: SerializerConfig) -> Serializer {
        let schema = SchemaDescription::builder()
            .element::<Sample>("Sample")
            .attribute("Label", lens!(Sample, label))
            .attribute("Ratio", lens!(Sample, ratio))
            .attribute("Elapsed", lens!(Sample, elapsed))
            .attribute("Offset", lens!(Sample, offset))
            .text_element("Memo", lens!(Sample, memo))
            .collection_element("Line", lens!(Sample, lines))
            .attribute("Number", lens!(Line, number))
            .text_content(lens!(Line, text))
            .end()
            .build()
            .expect("valid schema");
        Serializer::new(schema).with_config(config)
    }

    fn same_ratio(left: f64, right: f64) -> bool {
        (left.is_nan() && right.is_nan()) || left.to_bits() == right.to_bits()
    }

    fn assert_round_trip(serializer: &Serializer, sample: &Sample) {
        let xml = serializer.to_string(sample).expect("serializable");
        let back: Sample = serializer.from_str(&xml).expect("readable");
        assert_eq!(back.label, sample.label, "{xml}");
        assert!(same_ratio(back.ratio, sample.ratio), "{xml}");
        assert_eq!(back.elapsed, sample.elapsed, "{xml}");
        assert_eq!(back.offset, sample.offset, "{xml}");
        assert_eq!(back.memo, sample.memo, "{xml}");
        assert_eq!(back.lines, sample.lines, "{xml}");
    }

    fn line(number: u32, text: Option<&str>) -> Line {
        Line {
            number,
            text: text.map(str::to_owned),
        }
    }

    #[test]
    fn test_should_round_trip_edge_values() {
        init_tracing();
        let serializer = sample_serializer(SerializerConfig::builder().trim_text(false).build());
        let cases = [
            Sample::default(),
            Sample {
                label: Some(String::new()),
                memo: Some(String::new()),
                lines: vec![line(1, Some(""))],
                ..Sample::default()
            },
            Sample {
                label: Some("   ".to_owned()),
                memo: Some(" \t ".to_owned()),
                lines: vec![line(1, Some("  ")), line(2, None), line(3, Some(" padded "))],
                ..Sample::default()
            },
            Sample {
                label: Some("a < b & \"c\"".to_owned()),
                ratio: f64::INFINITY,
                elapsed: -(TimeDelta::hours(1) + TimeDelta::milliseconds(250)),
                offset: Some(TimeDelta::days(3) + TimeDelta::minutes(7)),
                ..Sample::default()
            },
            Sample {
                ratio: f64::NEG_INFINITY,
                elapsed: TimeDelta::days(12) + TimeDelta::nanoseconds(1),
                offset: Some(-TimeDelta::days(1)),
                ..Sample::default()
            },
            Sample {
                ratio: f64::NAN,
                offset: Some(TimeDelta::zero()),
                ..Sample::default()
            },
            Sample {
                ratio: -0.0,
                elapsed: TimeDelta::seconds(59),
                ..Sample::default()
            },
            Sample {
                ratio: f64::MIN_POSITIVE,
                ..Sample::default()
            },
        ];
        for sample in &cases {
            assert_round_trip(&serializer, sample);
        }
    }

    #[test]
    fn test_should_round_trip_empty_optional_strings_with_default_config() {
        let serializer = sample_serializer(SerializerConfig::default());
        let sample = Sample {
            label: Some(String::new()),
            memo: Some(String::new()),
            lines: vec![line(1, Some("")), line(2, None)],
            ..Sample::default()
        };
        let xml = serializer.to_string(&sample).expect("serializable");
        assert_eq!(
            xml,
            r#"<Sample Label="" Ratio="0" Elapsed="00:00:00"><Memo></Memo><Line Number="1"></Line><Line Number="2" /></Sample>"#
        );
        assert_round_trip(&serializer, &sample);
    }

    #[test]
    fn test_should_read_absent_optionals_as_none() {
        let serializer = sample_serializer(SerializerConfig::default());
        let sample: Sample = serializer
            .from_str(r#"<Sample Ratio="1.5" Elapsed="00:01:00"><Line Number="4"/></Sample>"#)
            .expect("readable");
        assert_eq!(sample.label, None);
        assert_eq!(sample.offset, None);
        assert_eq!(sample.memo, None);
        assert_eq!(sample.lines, vec![line(4, None)]);
    }

    #[test]
    fn test_should_reject_empty_value_for_numeric_optional() {
        let serializer = sample_serializer(SerializerConfig::default());
        let err = serializer
            .from_str::<Sample>(r#"<Sample Offset=""/>"#)
            .expect_err("empty duration");
        assert!(matches!(err, xmlmap_core::MapError::Conversion(_)));
    }
}
