use calc_tree::document::Document;
use calc_tree::node::NodeKind;
use calc_tree::row;
use caret::caret::Caret;
use caret::primitive::CaretRemoveMode;
use caret::settings::EditorSettings;
use caret::EditorState;
use pretty_assertions::assert_eq;

fn type_text(editor: &mut EditorState, value: &str) {
    for c in value.chars() {
        editor.insert_char(c);
    }
}

fn editor_with(lines: Vec<calc_tree::row::Row>) -> EditorState {
    EditorState::from_document(Document::from_lines(lines), EditorSettings::default())
}

fn first_line_kinds(editor: &EditorState) -> Vec<&'static str> {
    editor.document().lines()[0]
        .nodes()
        .iter()
        .map(|node| node.kind.name())
        .collect()
}

#[test]
fn test_typing_plain_text() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "x+1");
    assert_eq!(editor.save(), "x+1");
    assert_eq!(editor.get_offset(), 3);
    assert!(editor.document().is_well_formed());
}

#[test]
fn test_slash_creates_fraction() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "ab/c");

    let line = &editor.document().lines()[0];
    assert_eq!(line.len(), 1);
    let NodeKind::Fraction {
        numerator,
        denominator,
    } = &line.nodes()[0].kind
    else {
        panic!("Expected fraction");
    };
    assert_eq!(numerator.nodes()[0].text(), Some("ab"));
    assert_eq!(denominator.nodes()[0].text(), Some("c"));
    assert_eq!(
        editor.caret(),
        Caret::text(denominator.nodes()[0].id, 1)
    );
    assert_eq!(editor.save(), "ab/c");
}

#[test]
fn test_slash_takes_trailing_token_only() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "y=ab/c");
    assert_eq!(first_line_kinds(&editor), vec!["text", "frac"]);
    assert_eq!(editor.document().lines()[0].nodes()[0].text(), Some("y="));
    assert_eq!(editor.save(), "y=ab/c");
}

#[test]
fn test_slash_takes_parenthesized_group() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "(a+b)/c");
    let NodeKind::Fraction { numerator, .. } = &editor.document().lines()[0].nodes()[0].kind
    else {
        panic!("Expected fraction");
    };
    assert_eq!(numerator.nodes()[0].text(), Some("a+b"));
    assert_eq!(editor.save(), "(a+b)/c");
}

#[test]
fn test_slash_without_token_puts_caret_into_numerator() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "/");
    let NodeKind::Fraction { numerator, .. } = &editor.document().lines()[0].nodes()[0].kind
    else {
        panic!("Expected fraction");
    };
    assert_eq!(editor.caret(), Caret::text(numerator.nodes()[0].id, 0));
}

#[test]
fn test_operator_leaves_power() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "x^2+y");
    assert_eq!(first_line_kinds(&editor), vec!["pow", "text"]);
    assert_eq!(editor.get_text(), "+y");
    assert_eq!(editor.save(), "x^2+y");
}

#[test]
fn test_subscript() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "x_1");
    let NodeKind::Subscript { base, sub } = &editor.document().lines()[0].nodes()[0].kind
    else {
        panic!("Expected subscript");
    };
    assert_eq!(base.nodes()[0].text(), Some("x"));
    assert_eq!(sub.nodes()[0].text(), Some("1"));
    assert_eq!(editor.save(), "x_1");
}

#[test]
fn test_comment_toggle() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "'x");
    assert_eq!(first_line_kinds(&editor), vec!["text", "comment"]);
    assert_eq!(editor.get_text(), "x");

    editor.insert_char('\'');
    assert_eq!(first_line_kinds(&editor), vec!["text", "comment", "text"]);
    assert_eq!(editor.save(), "'x'");

    editor.remove_at_caret(CaretRemoveMode::Left);
    let line = &editor.document().lines()[0];
    assert_eq!(first_line_kinds(&editor), vec!["text", "comment"]);
    assert_eq!(
        line.nodes()[1].kind,
        NodeKind::Comment {
            text: "x".to_string(),
            closed: false
        }
    );
    assert_eq!(editor.caret(), Caret::text(line.nodes()[1].id, 1));
    assert_eq!(editor.save(), "'x");
}

#[test]
fn test_title_keeps_operators_literal() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "\"a/b");
    assert_eq!(first_line_kinds(&editor), vec!["text", "title"]);
    assert_eq!(editor.get_text(), "a/b");
    assert_eq!(editor.save(), "\"a/b");
}

#[test]
fn test_backspace_at_comment_start_unwraps_it() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "a'b");
    editor.move_caret(
        calc_tree::direction::Direction::Left,
        caret::primitive::MoveMode::Char,
    );
    assert_eq!(editor.get_offset(), 0);
    editor.remove_at_caret(CaretRemoveMode::Left);
    assert_eq!(first_line_kinds(&editor), vec!["text"]);
    assert_eq!(editor.save(), "ab");
    assert_eq!(editor.get_offset(), 1);
}

#[test]
fn test_space_becomes_marker() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "a b");
    assert_eq!(first_line_kinds(&editor), vec!["text", "comment", "text"]);
    assert_eq!(editor.save(), "a'&nbsp;'b");
}

#[test]
fn test_second_space_extends_marker() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "a  b");
    assert_eq!(first_line_kinds(&editor), vec!["text", "comment", "text"]);
    assert_eq!(
        editor.document().lines()[0].nodes()[1].text(),
        Some("&nbsp;&nbsp;")
    );
    assert_eq!(editor.save(), "a'&nbsp;&nbsp;'b");
}

#[test]
fn test_space_in_directive_is_literal() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "#hide all");
    assert_eq!(first_line_kinds(&editor), vec!["text"]);
    assert_eq!(editor.save(), "#hide all");
}

#[test]
fn test_vector_growth() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "[1;2");
    let line = &editor.document().lines()[0];
    let NodeKind::Vector { cells, is_column } = &line.nodes()[0].kind else {
        panic!("Expected vector");
    };
    assert!(!is_column);
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[1].nodes()[0].text(), Some("2"));
    assert_eq!(editor.caret(), Caret::text(cells[1].nodes()[0].id, 1));
    assert_eq!(editor.save(), "[1; 2]");
}

#[test]
fn test_bar_turns_row_vector_into_matrix() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "[1;2|");
    let line = &editor.document().lines()[0];
    let NodeKind::Matrix { cells } = &line.nodes()[0].kind else {
        panic!("Expected matrix");
    };
    assert_eq!((cells.width(), cells.height()), (2, 2));
    let target = cells.get_by_index(2).unwrap().nodes()[0].id;
    assert_eq!(editor.caret(), Caret::text(target, 0));
}

#[test]
fn test_closing_bracket_leaves_vector() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "[1]+2");
    assert_eq!(first_line_kinds(&editor), vec!["vector", "text"]);
    assert_eq!(editor.save(), "[1]+2");
}

#[test]
fn test_backspace_in_empty_exponent_collapses_power() {
    let mut editor = editor_with(vec![row!((row (pow "x", "")))]);
    let NodeKind::Power { exponent, .. } = &editor.document().lines()[0].nodes()[0].kind else {
        panic!("Expected power");
    };
    let exponent = exponent.nodes()[0].id;
    editor.set_caret(Caret::text(exponent, 0));

    editor.remove_at_caret(CaretRemoveMode::Left);
    let line = &editor.document().lines()[0];
    assert_eq!(line.len(), 1);
    assert_eq!(line.nodes()[0].text(), Some("x"));
    assert_eq!(editor.caret(), Caret::text(line.nodes()[0].id, 1));
}

#[test]
fn test_backspace_at_denominator_start_flattens_fraction() {
    let mut editor = editor_with(vec![row!((row (frac "a", "b")))]);
    let NodeKind::Fraction { denominator, .. } = &editor.document().lines()[0].nodes()[0].kind
    else {
        panic!("Expected fraction");
    };
    let denominator = denominator.nodes()[0].id;
    editor.set_caret(Caret::text(denominator, 0));

    editor.remove_at_caret(CaretRemoveMode::Left);
    assert_eq!(editor.save(), "ab");
    assert_eq!(editor.get_offset(), 1);
}

#[test]
fn test_backspace_in_empty_row_removes_matrix_row() {
    let mut editor = EditorState::new();
    editor.insert_matrix(2, 2);
    type_text(&mut editor, "1");
    editor.tab();
    type_text(&mut editor, "2");
    editor.tab();
    assert_eq!(editor.get_text(), "");

    editor.remove_at_caret(CaretRemoveMode::Left);
    let NodeKind::Vector { cells, is_column } = &editor.document().lines()[0].nodes()[0].kind
    else {
        panic!("Expected the matrix to turn into a vector");
    };
    assert!(!is_column);
    assert_eq!(cells.len(), 2);
    assert_eq!(editor.caret(), Caret::text(cells[0].nodes()[0].id, 1));
    assert_eq!(editor.save(), "[1; 2]");
}

#[test]
fn test_enter_splits_and_backspace_merges_lines() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "ab");
    editor.move_caret(
        calc_tree::direction::Direction::Left,
        caret::primitive::MoveMode::Char,
    );
    editor.new_line();
    assert_eq!(editor.save(), "a\nb");
    assert_eq!(editor.get_text(), "b");
    assert_eq!(editor.get_offset(), 0);

    editor.remove_at_caret(CaretRemoveMode::Left);
    assert_eq!(editor.save(), "ab");
    assert_eq!(editor.get_offset(), 1);
    assert_eq!(editor.document().line_count(), 1);
}

#[test]
fn test_delete_at_line_end_merges_lines() {
    let mut editor = editor_with(vec![row!("a"), row!("b")]);
    editor.set_offset(1);
    editor.remove_at_caret(CaretRemoveMode::Right);
    assert_eq!(editor.save(), "ab");
}

#[test]
fn test_code_block_editing() {
    let mut editor = EditorState::new();
    editor.insert_code_block("python");
    type_text(&mut editor, "x\ny");
    assert_eq!(editor.save(), "@{python}\nx\ny\n@{end python}");
    assert!(matches!(editor.caret(), Caret::Code { line: 1, offset: 1, .. }));

    editor.remove_at_caret(CaretRemoveMode::Left);
    editor.remove_at_caret(CaretRemoveMode::Left);
    assert_eq!(editor.save(), "@{python}\nx\n@{end python}");
    assert!(matches!(editor.caret(), Caret::Code { line: 0, offset: 1, .. }));
}

#[test]
fn test_collapsed_code_block_is_one_caret_position() {
    let mut editor = EditorState::new();
    editor.insert_code_block("js");
    type_text(&mut editor, "abc");
    editor.toggle_code_block();
    assert!(matches!(editor.caret(), Caret::Code { line: 0, offset: 0, .. }));
    let NodeKind::CodeBlock { collapsed, .. } = &editor.document().lines()[0].nodes()[0].kind
    else {
        panic!("Expected code block");
    };
    assert!(*collapsed);

    editor.toggle_code_block();
    let NodeKind::CodeBlock { collapsed, .. } = &editor.document().lines()[0].nodes()[0].kind
    else {
        panic!("Expected code block");
    };
    assert!(!*collapsed);
}

#[test]
fn test_structure_commands() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "y=");
    editor.insert_root(false);
    type_text(&mut editor, "x");
    assert_eq!(first_line_kinds(&editor), vec!["text", "root"]);
    assert_eq!(editor.save(), "y=sqrt(x)");

    let mut editor = EditorState::new();
    editor.insert_root(true);
    type_text(&mut editor, "8");
    editor.tab();
    type_text(&mut editor, "3");
    assert_eq!(editor.save(), "root(8;3)");

    let mut editor = EditorState::new();
    editor.insert_vector(2, true);
    type_text(&mut editor, "1");
    editor.tab();
    type_text(&mut editor, "2");
    assert_eq!(editor.save(), "[1|2]");

    let mut editor = EditorState::new();
    editor.insert_matrix(1, 3);
    assert_eq!(first_line_kinds(&editor), vec!["vector"]);
}

#[test]
fn test_column_group_command() {
    let mut editor = EditorState::new();
    editor.insert_column_group(9);
    // Clamped
    let NodeKind::ColumnGroup { columns } = &editor.document().lines()[0].nodes()[0].kind else {
        panic!("Expected column group");
    };
    assert_eq!(columns.len(), calc_tree::node::MAX_COLUMNS);
    assert_eq!(editor.active_column(), Some((0, 0)));
    editor.tab();
    assert_eq!(editor.active_column(), Some((1, 0)));
}

#[test]
fn test_nbsp_command_inside_comment() {
    let mut editor = editor_with(vec![row!((row (comment "ab")))]);
    let id = editor.document().lines()[0].nodes()[0].id;
    editor.set_caret(Caret::text(id, 1));
    editor.insert_nbsp();
    assert_eq!(editor.get_text(), "a&nbsp;b");
    assert_eq!(editor.get_offset(), 7);
}

#[test]
fn test_node_ids_stay_unique() {
    let mut editor = EditorState::new();
    type_text(&mut editor, "a/b+[1;2|3]'c'");
    editor.new_line();
    type_text(&mut editor, "x^2");
    assert!(editor.document().is_well_formed());
    assert_eq!(editor.cursor_holders().len(), 1);
    assert!(editor.has_cursor(editor.caret().node()));
}

#[test]
fn test_typing_over_selection_replaces_it() {
    let mut editor = editor_with(vec![row!("abc")]);
    editor.select_with_caret(
        calc_tree::direction::Direction::Right,
        caret::primitive::MoveMode::Char,
    );
    editor.select_with_caret(
        calc_tree::direction::Direction::Right,
        caret::primitive::MoveMode::Char,
    );
    editor.insert_char('x');
    assert_eq!(editor.save(), "xc");
    assert_eq!(editor.get_offset(), 1);
    assert!(editor.selection().is_none());
    assert!(editor.document().selected_nodes().is_empty());
}

#[test]
fn test_tab_leaves_fraction_at_line_end() {
    let mut editor = editor_with(vec![row!((row "x=", (frac "1", "2")))]);
    editor.move_caret(
        calc_tree::direction::Direction::Right,
        caret::primitive::MoveMode::Line,
    );
    assert_eq!(editor.get_text(), "2");
    editor.tab();
    type_text(&mut editor, "+1");
    assert_eq!(editor.save(), "x=1/2+1");
}

#[test]
fn test_operator_leaves_only_innermost_script() {
    let mut editor = editor_with(vec![row!((row (pow "x", (row (frac "a", "b")))))]);
    let NodeKind::Power { exponent, .. } = &editor.document().lines()[0].nodes()[0].kind else {
        panic!("Expected power");
    };
    let NodeKind::Fraction { denominator, .. } = &exponent.nodes()[0].kind else {
        panic!("Expected fraction");
    };
    let b = denominator.nodes()[0].id;
    editor.set_caret(Caret::text(b, 1));

    editor.insert_char('+');
    let line = &editor.document().lines()[0];
    assert_eq!(line.len(), 1);
    let NodeKind::Power { exponent, .. } = &line.nodes()[0].kind else {
        panic!("Expected power");
    };
    let kinds: Vec<&str> = exponent.nodes().iter().map(|node| node.kind.name()).collect();
    assert_eq!(kinds, vec!["frac", "text"]);
    assert_eq!(exponent.nodes()[1].text(), Some("+"));
    assert_eq!(editor.caret(), Caret::text(exponent.nodes()[1].id, 1));
}
