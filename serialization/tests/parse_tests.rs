use calc_tree::node::*;
use calc_tree::row::Row;
use calc_tree::{node, row};
use pretty_assertions::assert_eq;
use serialization::{parse_document, parse_line};

fn parse(line: &str) -> Row {
    Row::new(parse_line(line))
}

#[test]
fn test_empty_line() {
    let nodes = parse_line("");
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0], node!(""));
}

#[test]
fn test_fraction() {
    assert_eq!(parse("x = a/b"), row!((row "x = ", (frac "a", "b"))));
    assert_eq!(parse("1.5/(x+1)"), row!((row (frac "1.5", "x+1"))));
    assert_eq!(
        parse("(a+b)/c - 1"),
        row!((row (frac "a+b", "c"), " - 1"))
    );
}

#[test]
fn test_incomplete_operators_stay_text() {
    assert_eq!(parse("a/"), row!("a/"));
    assert_eq!(parse("/a"), row!("/a"));
    assert_eq!(parse("x^-1"), row!("x^-1"));
    assert_eq!(parse("a/(b"), row!("a/(b"));
}

#[test]
fn test_power_and_subscript() {
    assert_eq!(parse("x^2 + y"), row!((row (pow "x", "2"), " + y")));
    assert_eq!(parse("e^(i*pi)"), row!((row (pow "e", "i*pi"))));
    assert_eq!(parse("2*n_a"), row!((row "2*", (sub "n", "a"))));
    assert_eq!(parse("x.5_1"), row!((row "x.", (sub "5", "1"))));
}

#[test]
fn test_nested_group() {
    assert_eq!(
        parse("(a/b)^2"),
        row!((row (pow (row (frac "a", "b")), "2")))
    );
}

#[test]
fn test_roots() {
    assert_eq!(parse("sqrt(x+1)"), row!((row (sqrt "x+1"))));
    assert_eq!(parse("2*root(8;3)"), row!((row "2*", (root "8", "3"))));
    assert_eq!(parse("isqrt(x)"), row!("isqrt(x)"));
    assert_eq!(parse("sqrt(x"), row!("sqrt(x"));
}

#[test]
fn test_calculus() {
    assert_eq!(
        parse("$Integral{x^2 @ x = 0 : 1}"),
        row!((row (integral (row (pow "x", "2")), "x", "0", "1")))
    );
    assert_eq!(
        parse("$Derivative{sin(x) @ x : 2}"),
        row!((row (derivative "sin(x)", "x", 2)))
    );
    assert_eq!(
        parse("$Derivative{f @ x}"),
        row!((row (derivative "f", "x")))
    );
    assert_eq!(parse("$Integral{f}"), row!("$Integral{f}"));
}

#[test]
fn test_comments_and_titles() {
    assert_eq!(
        parse("\"Title\"a = 1 'note"),
        row!((row (title "Title"), "a = 1 ", (comment "note")))
    );
    assert_eq!(
        parse("'closed'x"),
        row!((row (closed_comment "closed"), "x"))
    );
}

#[test]
fn test_vectors_and_matrices() {
    assert_eq!(
        parse("v = [1; 2; 3]"),
        row!((row (vec_name "v = "), (vector "1", "2", "3")))
    );
    assert_eq!(parse("[1|2]"), row!((row (column_vector "1", "2"))));
    assert_eq!(
        parse("M = [1; 2|3]"),
        row!((row (vec_name "M = "), (matrix 2 x 2 "1", "2", "3", "")))
    );
    assert_eq!(parse("a[1]"), row!("a[1]"));
    assert_eq!(
        parse("[a/b; [1; 2]]"),
        row!((row (vector (row (frac "a", "b")), (row (vector "1", "2")))))
    );
}

#[test]
fn test_code_blocks() {
    let document = parse_document("a\n@{python}\nx = 1\n\nprint(x)\n@{end python}\nb");
    assert_eq!(document.line_count(), 3);
    assert_eq!(
        document.lines()[1].nodes()[0].kind,
        NodeKind::CodeBlock {
            language: "python".to_string(),
            lines: vec!["x = 1".to_string(), "".to_string(), "print(x)".to_string()],
            collapsed: true,
        }
    );
    assert_eq!(document.lines()[2], row!("b"));

    let nested = parse_document("@{js}\n@{js}\n@{end js}\n@{endjs}");
    assert_eq!(nested.line_count(), 1);
    let NodeKind::CodeBlock { lines, .. } = &nested.lines()[0].nodes()[0].kind else {
        panic!("Expected code block");
    };
    assert_eq!(lines, &vec!["@{js}".to_string(), "@{end js}".to_string()]);
}

#[test]
fn test_unterminated_blocks_are_text() {
    let document = parse_document("@{python}\nx = 1");
    assert_eq!(document.line_count(), 2);
    assert_eq!(document.lines()[0], row!("@{python}"));

    let document = parse_document("#columns 2\na");
    assert_eq!(document.lines()[0], row!("#columns 2"));
}

#[test]
fn test_directives_never_open_code_blocks() {
    let document = parse_document("@{end python}\n@{calcpad}\n@{end}");
    assert_eq!(document.line_count(), 3);
    assert!(document.lines().iter().all(|line| line.nodes()[0].kind.is_text_run()));
}

#[test]
fn test_columns() {
    let document = parse_document("#columns 3\na\nb\n#column\n@{r}\nx\n@{end}\n#end columns\nc");
    assert_eq!(document.line_count(), 2);
    let NodeKind::ColumnGroup { columns } = &document.lines()[0].nodes()[0].kind else {
        panic!("Expected column group");
    };
    assert_eq!(columns.len(), 3);
    assert_eq!(columns[0], vec![row!("a"), row!("b")]);
    assert!(matches!(
        columns[1][0].nodes()[0].kind,
        NodeKind::CodeBlock { .. }
    ));
    assert!(columns[2][0].is_blank());

    let document = parse_document("@{columns 9}\n@{column}\n@{end columns}");
    let NodeKind::ColumnGroup { columns } = &document.lines()[0].nodes()[0].kind else {
        panic!("Expected column group");
    };
    assert_eq!(columns.len(), MAX_COLUMNS);
}

#[test]
fn test_windows_line_endings() {
    let document = parse_document("a\r\nb");
    assert_eq!(document.lines(), &[row!("a"), row!("b")]);
}
