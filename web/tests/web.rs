//! Test suite for the Web and headless browsers.

#![cfg(target_arch = "wasm32")]

use calcpad_editor::CalcpadEditorBindings;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn typing_through_the_bindings() {
    let mut editor = CalcpadEditorBindings::new();
    for c in "x^2".chars() {
        assert!(editor.insert_char(c));
    }
    assert_eq!(editor.save(), "x^2");
    assert_eq!(editor.get_text(), "2");
}

#[wasm_bindgen_test]
fn load_and_render() {
    let mut editor = CalcpadEditorBindings::new();
    editor.load("a/b\n'note");
    assert_eq!(editor.save(), "a/b\n'note");
    assert!(editor.render().is_ok());
    assert!(editor.caret_visible());
}
