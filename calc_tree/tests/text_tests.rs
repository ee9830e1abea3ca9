use calc_tree::text;

#[test]
fn test_grapheme_offsets() {
    let value = "e\u{301}x";
    assert_eq!(text::len(value), 2);
    assert_eq!(text::split_at(value, 1), ("e\u{301}", "x"));

    let mut owned = value.to_string();
    text::insert(&mut owned, 1, "+");
    assert_eq!(owned, "e\u{301}+x");
    assert_eq!(text::remove(&mut owned, 0..1), "e\u{301}");
    assert_eq!(owned, "+x");
}

#[test]
fn test_token_start() {
    assert_eq!(text::token_start("x = 2.5", 7), 4);
    assert_eq!(text::token_start("a+", 2), 2);
    assert_eq!(text::token_start("abc", 2), 0);
}

#[test]
fn test_word_boundaries() {
    let value = "alpha beta+gamma";
    assert_eq!(text::next_word_boundary(value, 0), 5);
    assert_eq!(text::next_word_boundary(value, 5), 10);
    assert_eq!(text::previous_word_boundary(value, 10), 6);
    assert_eq!(text::previous_word_boundary(value, 6), 0);
    assert_eq!(text::next_word_boundary(value, 16), 16);
}

#[test]
fn test_vector_assignment() {
    assert!(text::is_vector_assignment("v = "));
    assert!(text::is_vector_assignment("v="));
    assert!(!text::is_vector_assignment("a <= "));
    assert!(!text::is_vector_assignment("= "));
    assert!(!text::is_vector_assignment("v"));
}
