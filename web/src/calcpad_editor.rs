use calc_tree::{direction::Direction, layout::DrawCommand};
use caret::{
    caret::Caret,
    editor_state::SerializedDataType,
    input::EditorInput,
    primitive::{CaretRemoveMode, MoveMode},
    settings::EditorSettings,
    EditorState,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct CalcpadEditorBindings {
    editor: EditorState,
    serializer: serde_wasm_bindgen::Serializer,
}

impl Default for CalcpadEditorBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl CalcpadEditorBindings {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            editor: EditorState::new(),
            // Do note that large numbers won't be serialized correctly, because JS doesn't have 64 bit integers.
            serializer: serde_wasm_bindgen::Serializer::new(),
        }
    }

    pub fn load(&mut self, value: &str) {
        self.editor.load(value);
    }

    pub fn save(&self) -> String {
        self.editor.save()
    }

    /// Returns whether the input changed anything
    pub fn handle(&mut self, input: EditorInput) -> bool {
        self.editor.handle(input).is_some()
    }

    pub fn get_settings(&self) -> EditorSettings {
        self.editor.settings().clone()
    }

    /// Accepts a partial settings object, missing fields get their defaults
    pub fn set_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        let settings: EditorSettings = serde_wasm_bindgen::from_value(settings)?;
        self.editor.set_settings(settings);
        Ok(())
    }

    pub fn insert_char(&mut self, value: char) -> bool {
        self.editor.insert_char(value).is_some()
    }

    pub fn remove_at_caret(&mut self, forward: bool) -> bool {
        let mode = if forward {
            CaretRemoveMode::Right
        } else {
            CaretRemoveMode::Left
        };
        self.editor.remove_at_caret(mode).is_some()
    }

    pub fn move_caret(&mut self, direction: Direction, mode: MoveMode) -> bool {
        self.editor.move_caret(direction, mode).is_some()
    }

    pub fn select_with_caret(&mut self, direction: Direction, mode: MoveMode) -> bool {
        self.editor.select_with_caret(direction, mode).is_some()
    }

    pub fn select_all(&mut self) {
        self.editor.select_all();
    }

    pub fn click(&mut self, x: f64, y: f64) -> bool {
        self.editor.click(x, y).is_some()
    }

    pub fn copy(&self, data_type: SerializedDataType) -> Result<String, JsValue> {
        self.editor
            .copy(data_type)
            .map_err(|error| JsValue::from_str(&error.to_string()))
    }

    /// `data_type` may be undefined, then the format is detected
    pub fn paste(&mut self, data: &str, data_type: JsValue) -> Result<(), JsValue> {
        let data_type: Option<SerializedDataType> = serde_wasm_bindgen::from_value(data_type)?;
        self.editor
            .paste(data, data_type)
            .map_err(|error| JsValue::from_str(&error.to_string()))
    }

    pub fn get_caret(&self) -> Caret {
        self.editor.caret()
    }

    pub fn get_selection(&self) -> Result<JsValue, JsValue> {
        Ok(self.editor.selection().serialize(&self.serializer)?)
    }

    pub fn get_document(&self) -> Result<JsValue, JsValue> {
        Ok(self.editor.document().serialize(&self.serializer)?)
    }

    /// The display list of the whole document, with the caret
    pub fn render(&mut self) -> Result<JsValue, JsValue> {
        let mut commands: Vec<DrawCommand> = Vec::new();
        self.editor.render(&mut commands);
        Ok(commands.serialize(&self.serializer)?)
    }

    pub fn toggle_caret_blink(&mut self) {
        self.editor.toggle_caret_blink();
    }

    pub fn caret_visible(&self) -> bool {
        self.editor.caret_visible()
    }

    pub fn get_text(&self) -> String {
        self.editor.get_text()
    }

    pub fn set_text(&mut self, value: &str) -> bool {
        self.editor.set_text(value).is_some()
    }

    pub fn get_offset(&self) -> usize {
        self.editor.get_offset()
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.editor.set_offset(offset);
    }

    pub fn get_length(&self) -> usize {
        self.editor.get_length()
    }

    pub fn insert_root(&mut self, with_index: bool) -> bool {
        self.editor.insert_root(with_index).is_some()
    }

    pub fn insert_integral(&mut self, with_limits: bool) -> bool {
        self.editor.insert_integral(with_limits).is_some()
    }

    pub fn insert_derivative(&mut self, order: u8) -> bool {
        self.editor.insert_derivative(order).is_some()
    }

    pub fn insert_matrix(&mut self, rows: usize, columns: usize) -> bool {
        self.editor.insert_matrix(rows, columns).is_some()
    }

    pub fn insert_vector(&mut self, len: usize, is_column: bool) -> bool {
        self.editor.insert_vector(len, is_column).is_some()
    }

    pub fn insert_code_block(&mut self, language: &str) -> bool {
        self.editor.insert_code_block(language).is_some()
    }

    pub fn insert_column_group(&mut self, count: usize) -> bool {
        self.editor.insert_column_group(count).is_some()
    }

    pub fn insert_nbsp(&mut self) -> bool {
        self.editor.insert_nbsp().is_some()
    }

    pub fn toggle_code_block(&mut self) -> bool {
        self.editor.toggle_code_block().is_some()
    }
}
