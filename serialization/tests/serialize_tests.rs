use calc_tree::document::Document;
use calc_tree::node::*;
use calc_tree::row::Row;
use calc_tree::{node, row};
use serialization::{serialize_document, ToDsl};

#[test]
fn test_bare_slots() {
    assert_eq!(node!((frac "a", "b")).to_dsl(), "a/b");
    assert_eq!(node!((frac "a+1", "b")).to_dsl(), "(a+1)/b");
    assert_eq!(node!((pow "x", "")).to_dsl(), "x^()");
    assert_eq!(node!((sub "x", "1.5")).to_dsl(), "x_(1.5)");
}

#[test]
fn test_neighbouring_tokens_get_parentheses() {
    let row = row!((row "2", (frac "a", "b"), "c"));
    assert_eq!(row.to_dsl(), "2(a)/(b)c");
    let row = row!((row "2*", (frac "a", "b"), "+c"));
    assert_eq!(row.to_dsl(), "2*a/b+c");
}

#[test]
fn test_structures() {
    assert_eq!(node!((sqrt "x")).to_dsl(), "sqrt(x)");
    assert_eq!(node!((root "x", "3")).to_dsl(), "root(x;3)");
    assert_eq!(
        node!((integral "f", "x", "0", "1")).to_dsl(),
        "$Integral{f @ x = 0 : 1}"
    );
    assert_eq!(node!((derivative "f", "x", 3)).to_dsl(), "$Derivative{f @ x : 3}");
    assert_eq!(node!((vector "1", "2")).to_dsl(), "[1; 2]");
    assert_eq!(node!((column_vector "1", "2")).to_dsl(), "[1|2]");
    assert_eq!(
        node!((matrix 2 x 2 "1", "2", "3", "4")).to_dsl(),
        "[1; 2|3; 4]"
    );
}

#[test]
fn test_comments_and_titles_close_when_followed() {
    assert_eq!(
        row!((row (comment "a"), "x")).to_dsl(),
        "'a'x"
    );
    assert_eq!(row!((row "x", (comment "a"))).to_dsl(), "x'a");
    assert_eq!(row!((row (closed_comment "a"))).to_dsl(), "'a'");
    assert_eq!(row!((row (title "T"), "x")).to_dsl(), "\"T\"x");
    assert_eq!(row!((row (title "T"))).to_dsl(), "\"T");
}

#[test]
fn test_blocks() {
    let code = Node::code_block("python", vec!["a".to_string(), "b".to_string()], true);
    assert_eq!(code.to_dsl(), "@{python}\na\nb\n@{end python}");

    let group = Node::column_group(vec![vec![row!("a")], vec![row!("b"), row!("c")]]);
    assert_eq!(
        group.to_dsl(),
        "#columns 2\na\n#column\nb\nc\n#end columns"
    );
}

#[test]
fn test_document() {
    let document = Document::from_lines(vec![row!("a"), Row::empty(), row!((row (pow "x", "2")))]);
    assert_eq!(serialize_document(&document), "a\n\nx^2");
}
