use calc_tree::row;
use serialization::*;

#[test]
fn test_json_round_trip() {
    let document = parse_document("a = x/2\nv = [1; 2]");
    let json = serialize_document_as(&document, SerializedDataType::JsonDocument).unwrap();
    assert!(json.starts_with("{\"version\":1,"));
    let restored = deserialize_document_as(&json, Some(SerializedDataType::JsonDocument)).unwrap();
    assert_eq!(restored, document);
    assert!(restored.is_well_formed());
}

#[test]
fn test_auto_detection() {
    let document = parse_document("a = x/2");
    let json = serialize_document_as(&document, SerializedDataType::JsonDocument).unwrap();
    assert_eq!(deserialize_document_as(&json, None).unwrap(), document);

    let calcpad = serialize_document_as(&document, SerializedDataType::Calcpad).unwrap();
    assert_eq!(calcpad, "a = x/2");
    assert_eq!(deserialize_document_as(&calcpad, None).unwrap(), document);

    // Braces that are not JSON are read as Calcpad
    let lines = deserialize_lines("{a}", None).unwrap();
    assert_eq!(lines, vec![row!("{a}")]);
}

#[test]
fn test_newer_versions_are_rejected() {
    let data = r#"{"version":99,"data":[]}"#;
    assert!(matches!(
        deserialize_lines(data, Some(SerializedDataType::JsonDocument)),
        Err(SerializationError::UnsupportedVersion(99))
    ));
    assert!(matches!(
        deserialize_lines("nope", Some(SerializedDataType::JsonDocument)),
        Err(SerializationError::Json(_))
    ));
}

#[test]
fn test_empty_json_becomes_an_empty_line() {
    let data = r#"{"version":1,"data":[]}"#;
    let lines = deserialize_lines(data, None).unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].is_blank());
}
