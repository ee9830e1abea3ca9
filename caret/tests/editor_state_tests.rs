use calc_tree::direction::Direction;
use calc_tree::document::Document;
use calc_tree::layout::DrawCommand;
use calc_tree::node::NodeKind;
use calc_tree::node_id::NodeId;
use calc_tree::row;
use caret::caret::{Caret, Selection};
use caret::editor_state::SerializedDataType;
use caret::input::EditorInput;
use caret::primitive::MoveMode;
use caret::settings::EditorSettings;
use caret::EditorState;
use pretty_assertions::assert_eq;

#[test]
fn test_load_and_save() {
    let mut editor = EditorState::new();
    editor.load("'Heading\nx=a/b");
    assert_eq!(editor.document().line_count(), 2);
    assert_eq!(editor.save(), "'Heading\nx=a/b");
    let first = editor.document().lines()[0].nodes()[0].id;
    assert_eq!(editor.caret(), Caret::text(first, 0));
}

#[test]
fn test_handle_inputs() {
    let mut editor = EditorState::new();
    let inputs = vec![
        EditorInput::InsertChar('a'),
        EditorInput::InsertChar('b'),
        EditorInput::DeleteBack,
        EditorInput::NewLine,
        EditorInput::Paste("x^2".to_string()),
        EditorInput::MoveCursor {
            direction: Direction::Up,
            mode: MoveMode::Char,
        },
    ];
    for input in inputs {
        editor.handle(input);
    }
    assert_eq!(editor.save(), "a\nx^2");
    // Up from the exponent goes to the base
    assert_eq!(editor.get_text(), "x");

    editor.handle(EditorInput::SelectAll);
    editor.handle(EditorInput::DeleteForward);
    assert_eq!(editor.save(), "");
}

#[test]
fn test_copy_text_selection() {
    let mut editor = EditorState::new();
    editor.load("abc");
    editor.select_with_caret(Direction::Right, MoveMode::Char);
    editor.select_with_caret(Direction::Right, MoveMode::Char);
    assert_eq!(editor.copy(SerializedDataType::Calcpad).unwrap(), "ab");
}

#[test]
fn test_copy_and_paste_json() {
    let mut source = EditorState::new();
    source.load("a/b");
    source.select_all();
    let copied = source.copy(SerializedDataType::JsonDocument).unwrap();

    let mut target = EditorState::new();
    target.paste(&copied, None).unwrap();
    assert_eq!(target.save(), "a/b");
    assert!(target.document().is_well_formed());
}

#[test]
fn test_paste_single_line_into_text() {
    let mut editor = EditorState::new();
    editor.load("ad");
    editor.set_offset(1);
    editor.paste("bc", Some(SerializedDataType::Calcpad)).unwrap();
    assert_eq!(editor.save(), "abcd");
    assert_eq!(editor.get_offset(), 3);
}

#[test]
fn test_paste_several_lines() {
    let mut editor = EditorState::new();
    editor
        .paste("a\nb", Some(SerializedDataType::Calcpad))
        .unwrap();
    assert_eq!(editor.save(), "a\nb");
    assert_eq!(editor.get_text(), "b");
    assert_eq!(editor.get_offset(), 1);
}

#[test]
fn test_paste_newer_version_fails() {
    let mut editor = EditorState::new();
    let result = editor.paste(r#"{"version": 99, "data": []}"#, None);
    assert!(result.is_err());
    assert_eq!(editor.save(), "");
}

#[test]
fn test_text_facade() {
    let mut editor = EditorState::new();
    editor.set_text("hello");
    assert_eq!(editor.get_text(), "hello");
    assert_eq!(editor.get_length(), 5);

    editor.set_offset(10);
    assert_eq!(editor.get_offset(), 5);

    editor.set_text("hi");
    assert_eq!(editor.get_offset(), 2);
    assert_eq!(editor.active_node().and_then(|node| node.text()), Some("hi"));
}

#[test]
fn test_missing_caret_node_recovers() {
    let mut editor = EditorState::new();
    editor.load("abc");
    editor.set_caret(Caret::text(NodeId(u64::MAX), 3));
    let first = editor.document().lines()[0].nodes()[0].id;
    assert_eq!(editor.caret(), Caret::text(first, 0));
}

#[test]
fn test_click_places_caret() {
    let mut editor = EditorState::new();
    editor.load("abc\nde");
    let first = editor.document().lines()[0].nodes()[0].id;
    let second = editor.document().lines()[1].nodes()[0].id;

    // 14px monospace, every character is 8.4px wide
    assert_eq!(editor.click(9.0, 5.0), Some(()));
    assert_eq!(editor.caret(), Caret::text(first, 1));

    assert_eq!(editor.click(500.0, 5.0), Some(()));
    assert_eq!(editor.caret(), Caret::text(first, 3));

    editor.click(1.0, 25.0);
    assert_eq!(editor.caret(), Caret::text(second, 0));
}

#[test]
fn test_click_on_matrix_selects_it() {
    let mut editor = EditorState::from_document(
        Document::from_lines(vec![row!((row (matrix 2 x 1 "1", "2")))]),
        EditorSettings::default(),
    );
    editor.layout();
    let matrix = &editor.document().lines()[0].nodes()[0];
    let id = matrix.id;
    let layout = matrix.layout.unwrap();
    let NodeKind::Matrix { cells } = &matrix.kind else {
        panic!("Expected matrix");
    };
    let first_cell = cells.get_by_index(0).unwrap().bounds().unwrap();

    // The left bracket is not part of any cell
    editor.click(layout.x + 0.5, first_cell.y + 1.0);
    assert_eq!(editor.selection(), &Selection::Structure(id));
}

#[test]
fn test_render_draws_caret_when_visible() {
    let mut editor = EditorState::new();
    editor.load("abc");
    let mut commands: Vec<DrawCommand> = Vec::new();
    editor.render(&mut commands);
    assert!(commands
        .iter()
        .any(|command| matches!(command, DrawCommand::Text { text, .. } if text == "abc")));
    let caret_lines = |commands: &[DrawCommand]| {
        commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Line { .. }))
            .count()
    };
    assert_eq!(caret_lines(commands.as_slice()), 1);

    editor.toggle_caret_blink();
    assert!(!editor.caret_visible());
    let mut commands: Vec<DrawCommand> = Vec::new();
    editor.render(&mut commands);
    assert_eq!(caret_lines(commands.as_slice()), 0);

    // Any edit makes the caret visible again
    editor.insert_char('d');
    assert!(editor.caret_visible());
}

#[test]
fn test_caret_rect_follows_offset() {
    let mut editor = EditorState::new();
    editor.load("abc");
    editor.layout();
    let (start, _, height) = editor.caret_rect().unwrap();
    editor.set_offset(2);
    let (x, _, _) = editor.caret_rect().unwrap();
    assert!((x - start - 16.8).abs() < 1e-9);
    assert!(height > 0.0);
}

#[test]
fn test_caret_rect_after_edit_is_current() {
    let mut editor = EditorState::new();
    editor.load("abc");
    editor.layout();
    let (start, _, _) = editor.caret_rect().unwrap();

    editor.set_offset(3);
    editor.insert_char('d');
    assert!(!editor.document().is_layout_valid());
    let (x, _, _) = editor.caret_rect().unwrap();
    assert!((x - start - 4.0 * 8.4).abs() < 1e-9);
    assert!(editor.document().is_layout_valid());
}
