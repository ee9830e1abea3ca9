use pretty_assertions::assert_eq;
use serialization::{parse_document, serialize_document};

/// Parsing the serialized text must give back the same structure
fn assert_round_trip(input: &str) {
    let document = parse_document(input);
    let serialized = serialize_document(&document);
    let reparsed = parse_document(&serialized);
    assert_eq!(reparsed, document, "serialized as {:?}", serialized);
    // And the text reaches a fixed point
    assert_eq!(serialize_document(&reparsed), serialized);
}

#[test]
fn test_round_trip_expressions() {
    for input in [
        "",
        "x = a/b + c",
        "y = (a+b)/(c-d)",
        "f(x)/2",
        "2a/b",
        "z = x^2 + y^(n+1)",
        "e^(a/b)",
        "(a/b)^2",
        "F_x = m*a_x",
        "r = sqrt(x^2 + y^2)",
        "root(27;3)",
        "$Integral{x^2 @ x = 0 : 1}",
        "$Derivative{sin(x) @ x : 2}",
        "a/b/c",
        "x^-1",
    ] {
        assert_round_trip(input);
    }
}

#[test]
fn test_round_trip_text_constructs() {
    for input in [
        "\"Beam design",
        "\"Title\"a = 1",
        "'just a comment",
        "a = 1 'unit: m",
        "'&nbsp;'b = 2",
        "L = 5'm'",
    ] {
        assert_round_trip(input);
    }
}

#[test]
fn test_round_trip_vectors() {
    for input in [
        "v = [1; 2; 3]",
        "w = [1|2|3]",
        "M = [1; 2|3; 4]",
        "N = [a/b; 1|x^2; [1; 2]]",
        "[; ]",
    ] {
        assert_round_trip(input);
    }
}

#[test]
fn test_round_trip_blocks() {
    assert_round_trip("a = 1\n@{python}\nprint(a)\n\n@{end python}\nb = 2");
    assert_round_trip("#columns 3\na\n#column\nb = x/2\n@{js}\nlet x;\n@{end js}\n#column\n#end columns");
    assert_round_trip("@{columns 2}\nx\n@{end columns}");
}
