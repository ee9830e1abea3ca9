use calc_tree::grid::*;

fn numbers() -> Grid<u32> {
    // 1 2 3
    // 4 5 6
    Grid::from_one_dimensional(vec![1, 2, 3, 4, 5, 6], 3)
}

#[test]
fn test_from_rows_pads() {
    let grid = Grid::from_rows(vec![vec![1, 2, 3], vec![4]], || 0);
    assert_eq!(grid.width(), 3);
    assert_eq!(grid.height(), 2);
    assert_eq!(grid.values(), &[1, 2, 3, 4, 0, 0]);
}

#[test]
fn test_get() {
    let grid = numbers();
    assert_eq!(grid.get(Index2D::new(2, 1)), Some(&6));
    assert_eq!(grid.get(Index2D::new(3, 0)), None);
    assert_eq!(grid.index_to_xy(4), Index2D::new(1, 1));
    assert_eq!(grid.xy_to_index(Index2D::new(0, 1)), 3);
    assert_eq!(grid.column(1).copied().collect::<Vec<_>>(), vec![2, 5]);
    assert_eq!(grid.row(1), Some(&[4, 5, 6][..]));
}

#[test]
fn test_insert_row_and_column() {
    let mut grid = numbers();
    grid.insert_row(1, vec![7, 8, 9]);
    assert_eq!(grid.values(), &[1, 2, 3, 7, 8, 9, 4, 5, 6]);

    let mut grid = numbers();
    grid.insert_column(1, vec![7, 8]);
    assert_eq!(grid.width(), 4);
    assert_eq!(grid.values(), &[1, 7, 2, 3, 4, 8, 5, 6]);

    let mut grid = numbers();
    grid.insert_column(3, vec![7, 8]);
    assert_eq!(grid.values(), &[1, 2, 3, 7, 4, 5, 6, 8]);
}

#[test]
fn test_remove_keeps_at_least_one() {
    let mut grid = numbers();
    assert_eq!(grid.remove_column(1), Some(vec![2, 5]));
    assert_eq!(grid.values(), &[1, 3, 4, 6]);
    assert_eq!(grid.remove_row(0), Some(vec![1, 3]));
    assert_eq!(grid.remove_row(0), None);
    assert_eq!(grid.remove_column(0), Some(vec![4]));
    assert_eq!(grid.remove_column(0), None);
    assert_eq!(grid.values(), &[6]);
}
