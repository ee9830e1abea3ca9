use calc_tree::node::*;
use calc_tree::row::*;
use calc_tree::{node, row};

#[test]
fn test_row_is_never_empty() {
    let mut row = Row::new(vec![]);
    assert_eq!(row.len(), 1);
    assert!(row.is_blank());

    row.push(Node::text_run("a"));
    assert_eq!(row.len(), 1);
    assert_eq!(row.nodes()[0].text(), Some("a"));

    row.remove(0);
    assert!(row.is_blank());
}

#[test]
fn test_split_and_append() {
    let mut row = row!((row "a", (frac "b", "c"), "d"));
    let tail = row.split_off(1);
    assert_eq!(row, row!((row "a")));
    assert_eq!(tail, row!((row (frac "b", "c"), "d")));

    let mut empty = Row::empty();
    let tail_of_everything = empty.split_off(0);
    assert!(empty.is_blank());
    assert!(tail_of_everything.is_blank());

    row.append(tail);
    assert_eq!(row, row!((row "a", (frac "b", "c"), "d")));
    row.append(Row::empty());
    assert_eq!(row.len(), 3);
}

#[test]
fn test_merge_text_runs_reports_shifts() {
    let a = Node::text_run("ab");
    let b = Node::text_run("cd");
    let c = Node::text_run("e");
    let (a_id, b_id, c_id) = (a.id, b.id, c.id);
    let mut row = Row::new(vec![a, b, c, node!((frac "x", "y")), Node::text_run("z")]);

    let merges = row.merge_text_runs();
    assert_eq!(row, row!((row "abcde", (frac "x", "y"), "z")));
    assert_eq!(
        merges,
        vec![
            TextMerge {
                from: b_id,
                into: a_id,
                shift: 2
            },
            TextMerge {
                from: c_id,
                into: a_id,
                shift: 4
            },
        ]
    );
}

#[test]
fn test_splice() {
    let mut row = row!((row "a", "b", "c"));
    let removed = row.splice(1..2, vec![node!((pow "x", "2"))]);
    assert_eq!(removed.len(), 1);
    assert_eq!(row, row!((row "a", (pow "x", "2"), "c")));

    let removed = row.splice(0..10, vec![]);
    assert_eq!(removed.len(), 3);
    assert!(row.is_blank());
}

#[test]
fn test_slots_in_reading_order() {
    let integral = node!((integral "f", "x", "a", "b"));
    let texts: Vec<_> = integral
        .kind
        .slots()
        .iter()
        .map(|slot| slot.nodes()[0].text().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec!["f", "x", "a", "b"]);

    let root = node!((root "x", "3"));
    assert_eq!(root.kind.slot_count(), 2);
    assert_eq!(root.kind.slot(1), Some(&row!("3")));
}

#[test]
fn test_column_positions() {
    let group = Node::column_group(vec![vec![row!("a"), row!("b")], vec![row!("c")]]);
    assert_eq!(group.kind.slot_count(), 3);
    assert_eq!(group.kind.column_position(1), Some((0, 1)));
    assert_eq!(group.kind.column_position(2), Some((1, 0)));
    assert_eq!(group.kind.column_slot(1, 0), Some(2));
    assert_eq!(group.kind.column_slot(1, 1), None);
}

#[test]
fn test_column_group_is_clamped() {
    let group = Node::column_group(vec![]);
    let NodeKind::ColumnGroup { columns } = &group.kind else {
        panic!("Expected column group");
    };
    assert_eq!(columns.len(), MIN_COLUMNS);
    assert!(columns.iter().all(|column| column.len() == 1));

    let group = Node::column_group((0..7).map(|_| vec![Row::empty()]).collect());
    let NodeKind::ColumnGroup { columns } = &group.kind else {
        panic!("Expected column group");
    };
    assert_eq!(columns.len(), MAX_COLUMNS);
}

#[test]
fn test_matrix_index() {
    let matrix = Node::empty_matrix(2, 3);
    assert_eq!(matrix.kind.slot_count(), 6);
    let xy = matrix.kind.matrix_index(4).unwrap();
    assert_eq!((xy.x, xy.y), (1, 1));
}
