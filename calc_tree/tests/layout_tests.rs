use calc_tree::document::Document;
use calc_tree::layout::*;
use calc_tree::node::*;
use calc_tree::row::Row;
use calc_tree::{node, row};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn measurer() -> MonospaceMeasurer {
    MonospaceMeasurer::default()
}

#[test]
fn test_measure_text_run() {
    let mut node = node!("abc");
    let metrics = node.measure(&measurer(), 10.0);
    assert_close(metrics.width, 18.0);
    assert_close(metrics.height, 10.0);
    assert_close(metrics.baseline, 8.0);
    assert_eq!(node.layout.unwrap().font_size, 10.0);
}

#[test]
fn test_empty_text_stays_clickable() {
    let mut node = node!("");
    let metrics = node.measure(&measurer(), 10.0);
    assert_close(metrics.width, 5.0);
}

#[test]
fn test_fraction_stacks_numerator_over_denominator() {
    let mut row = row!((row "x", (frac "a", "b")));
    let measurer = measurer();
    row.measure(&measurer, 10.0);
    row.place(&measurer, 0.0, 0.0);

    let x = row.nodes()[0].layout.unwrap();
    let fraction = &row.nodes()[1];
    let fraction_box = fraction.layout.unwrap();
    let NodeKind::Fraction {
        numerator,
        denominator,
    } = &fraction.kind
    else {
        panic!("Expected fraction");
    };
    let top = numerator.bounds().unwrap();
    let bottom = denominator.bounds().unwrap();

    assert!(top.bottom() <= bottom.y);
    assert!(top.y >= fraction_box.y && bottom.bottom() <= fraction_box.bottom() + 1e-9);
    assert_close(top.font_size, 8.5);
    // Baselines line up
    assert_close(x.y + x.baseline, fraction_box.y + fraction_box.baseline);
    assert_close(fraction_box.x, x.right());
}

#[test]
fn test_script_sizes() {
    let measurer = measurer();
    let mut power = node!((pow "x", "2"));
    power.measure(&measurer, 20.0);
    let NodeKind::Power { base, exponent } = &power.kind else {
        panic!("Expected power");
    };
    assert_close(base.nodes()[0].layout.unwrap().font_size, 20.0);
    assert_close(exponent.nodes()[0].layout.unwrap().font_size, 15.0);

    let mut subscript = node!((sub "x", "i"));
    subscript.measure(&measurer, 20.0);
    let NodeKind::Subscript { sub, .. } = &subscript.kind else {
        panic!("Expected subscript");
    };
    assert_close(sub.nodes()[0].layout.unwrap().font_size, 16.0);

    let mut root = node!((root "x", "3"));
    root.measure(&measurer, 20.0);
    let NodeKind::Root {
        index: Some(index), ..
    } = &root.kind
    else {
        panic!("Expected root with index");
    };
    assert_close(index.nodes()[0].layout.unwrap().font_size, 12.0);
}

#[test]
fn test_exponent_is_raised() {
    let measurer = measurer();
    let mut row = row!((row (pow "x", "2")));
    row.measure(&measurer, 10.0);
    row.place(&measurer, 0.0, 0.0);
    let NodeKind::Power { base, exponent } = &row.nodes()[0].kind else {
        panic!("Expected power");
    };
    let base = base.bounds().unwrap();
    let exponent = exponent.bounds().unwrap();
    assert!(exponent.y < base.y);
    assert!(exponent.x >= base.right());
}

#[test]
fn test_document_layout_stacks_lines() {
    let mut document = Document::from_lines(vec![row!("a"), row!((row (frac "1", "2"))), row!("c")]);
    assert!(!document.is_layout_valid());
    document.layout(&measurer(), 10.0, 4.0);
    assert!(document.is_layout_valid());

    let first = document.line_box(0).unwrap();
    let second = document.line_box(1).unwrap();
    let third = document.line_box(2).unwrap();
    assert_close(second.y, first.height + 4.0);
    assert_close(third.y, second.y + second.height + 4.0);

    document.line_mut(0);
    assert!(!document.is_layout_valid());
}

#[test]
fn test_render_emits_primitives() {
    let mut document = Document::from_lines(vec![row!((row "x = ", (frac "a", "b"), (vector "1", "2")))]);
    let mut commands: Vec<DrawCommand> = Vec::new();
    document.render(&mut commands, &measurer(), 10.0, 4.0);

    let texts: Vec<_> = commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["x = ", "a", "b", "1", "2"]);
    assert_eq!(
        commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Line { .. }))
            .count(),
        1
    );
    assert_eq!(
        commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Bracket { .. }))
            .count(),
        2
    );
}

#[test]
fn test_hit_test() {
    let mut document = Document::from_lines(vec![
        row!((row "x", (frac "a", "b"), (vector "1", "2"))),
        row!("second"),
    ]);
    let measurer = measurer();
    document.layout(&measurer, 10.0, 4.0);
    let line = &document.lines()[0];

    let NodeKind::Fraction { denominator, .. } = &line.nodes()[1].kind else {
        panic!("Expected fraction");
    };
    let b = &denominator.nodes()[0];
    let b_box = b.layout.unwrap();
    let hit = document
        .hit_test(b_box.x + b_box.width / 2.0, b_box.y + b_box.height / 2.0)
        .unwrap();
    assert_eq!(hit.line, 0);
    assert_eq!(hit.node, Some(b.id));
    assert!(!hit.past_end);

    // The left bracket belongs to the vector itself
    let vector = &line.nodes()[2];
    let vector_box = vector.layout.unwrap();
    let hit = document
        .hit_test(vector_box.x + 0.5, vector_box.y + vector_box.height / 2.0)
        .unwrap();
    assert_eq!(hit.node, Some(vector.id));

    let second = document.line_box(1).unwrap();
    let hit = document.hit_test(second.right() + 50.0, second.y + 1.0).unwrap();
    assert_eq!(hit.line, 1);
    assert!(hit.past_end);
    assert_eq!(hit.node, None);

    // Below the document snaps to the last line
    let hit = document.hit_test(1.0, 10_000.0).unwrap();
    assert_eq!(hit.line, 1);
}

#[test]
fn test_offset_at_and_caret_x() {
    let mut node = node!("abcd");
    let measurer = measurer();
    node.measure(&measurer, 10.0);
    node.place(&measurer, 100.0, 0.0);
    assert_eq!(node.offset_at(100.0 + 6.0 * 1.4, &measurer), 1);
    assert_eq!(node.offset_at(100.0 + 6.0 * 1.6, &measurer), 2);
    assert_eq!(node.offset_at(0.0, &measurer), 0);
    assert_eq!(node.offset_at(1000.0, &measurer), 4);
    assert_close(node.caret_x(3, &measurer), 118.0);
}

#[test]
fn test_code_block_positions() {
    let mut document = Document::from_lines(vec![Row::new(vec![Node::code_block(
        "python",
        vec!["x = 1".to_string(), "print(x)".to_string()],
        false,
    )])]);
    let measurer = measurer();
    document.layout(&measurer, 10.0, 4.0);
    let code = &document.lines()[0].nodes()[0];
    let layout = code.layout.unwrap();
    // Header, two lines, footer
    assert_close(layout.height, 40.0);
    assert_eq!(code.code_position_at(6.0 * 2.0, 25.0, &measurer), (1, 2));
    assert_eq!(code.code_position_at(0.0, 1.0, &measurer), (0, 0));
}

#[test]
fn test_render_at_lays_out_first() {
    let mut node = node!("abc");
    let mut commands: Vec<DrawCommand> = Vec::new();
    node.render(&mut commands, &measurer());
    assert!(commands.is_empty());

    node.render_at(&mut commands, &measurer(), 5.0, 20.0, 10.0);
    let [DrawCommand::Text {
        text, x, y, font_size, ..
    }] = commands.as_slice()
    else {
        panic!("Expected one text command, got {commands:?}");
    };
    assert_eq!(text, "abc");
    assert_close(*x, 5.0);
    assert_close(*y, 28.0);
    assert_close(*font_size, 10.0);
}

#[test]
fn test_render_at_places_fraction_slots() {
    let mut node = node!((frac "a", "b"));
    let mut commands: Vec<DrawCommand> = Vec::new();
    node.render_at(&mut commands, &measurer(), 0.0, 0.0, 14.0);
    let texts: Vec<&str> = commands
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["a", "b"]);
    assert!(commands
        .iter()
        .any(|command| matches!(command, DrawCommand::Line { .. })));
}
