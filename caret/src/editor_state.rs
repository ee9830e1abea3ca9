use calc_tree::{
    direction::{Direction, HorizontalDirection},
    document::Document,
    layout::{MonospaceMeasurer, RenderSink, TextMeasurer},
    node::{Node, NodeKind},
    node_id::NodeId,
    text,
};
use serialization::{
    deserialize_lines, parse_document, serialize_document, serialize_lines, SerializationError,
};

pub use serialization::SerializedDataType;

use crate::{
    caret::{Caret, Selection},
    editing,
    editor_action_builder::EditorActionBuilder,
    input::EditorInput,
    primitive::{
        primitive_edit::{column_line_of, edge_caret, line_edge_caret, start_caret},
        CaretRemoveMode, MoveMode, NavigationSettings,
    },
    selection::{
        copied_rows, delete_selection, extend_selection, paste_rows, select_all,
        sync_selected_flags,
    },
    settings::EditorSettings,
};

/// One editing session. Owns the document, the caret and the selection.
#[cfg_attr(feature = "wasm", wasm_bindgen::prelude::wasm_bindgen)]
pub struct EditorState {
    pub(crate) document: Document,
    /// Main caret
    pub(crate) caret: Caret,
    pub(crate) selection: Selection,
    pub(crate) settings: EditorSettings,
    pub(crate) navigation: NavigationSettings,
    /// Blink phase, only affects drawing
    pub(crate) caret_visible: bool,
    measurer: Box<dyn TextMeasurer>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self::with_settings(EditorSettings::default())
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        Self::from_document(Document::new(), settings)
    }

    pub fn from_document(document: Document, settings: EditorSettings) -> Self {
        let caret = start_caret(&document);
        Self {
            document,
            caret,
            selection: Selection::None,
            navigation: navigation_settings(&settings),
            settings,
            caret_visible: true,
            measurer: Box::new(MonospaceMeasurer::default()),
        }
    }

    /// Replaces the document with parsed Calcpad text, and puts the caret at the start
    pub fn load(&mut self, value: &str) {
        self.document = parse_document(value);
        self.selection = Selection::None;
        self.caret = start_caret(&self.document);
        self.caret_visible = true;
    }

    pub fn save(&self) -> String {
        serialize_document(&self.document)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.navigation = navigation_settings(&settings);
        self.settings = settings;
        self.document.invalidate_layout();
    }

    pub fn set_caret(&mut self, caret: Caret) {
        EditorActionBuilder::new(self).finish(caret);
    }

    /// The platform's font metrics. Defaults to a monospace approximation.
    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.measurer = measurer;
        self.document.invalidate_layout();
    }

    /// Processes one input event to completion
    pub fn handle(&mut self, input: EditorInput) -> Option<()> {
        match input {
            EditorInput::InsertChar(c) => self.insert_char(c),
            EditorInput::DeleteBack => self.remove_at_caret(CaretRemoveMode::Left),
            EditorInput::DeleteForward => self.remove_at_caret(CaretRemoveMode::Right),
            EditorInput::MoveCursor { direction, mode } => self.move_caret(direction, mode),
            EditorInput::ExtendSelection { direction, mode } => {
                self.select_with_caret(direction, mode)
            }
            EditorInput::Click { x, y } => self.click(x, y),
            EditorInput::Paste(value) => {
                self.paste_text(&value);
                Some(())
            }
            EditorInput::NewLine => self.new_line(),
            EditorInput::Tab => self.tab(),
            EditorInput::SelectAll => {
                self.select_all();
                Some(())
            }
        }
    }

    /// Runs an edit at the caret. A selection is deleted first, so typing over a selection replaces it.
    fn edit(
        &mut self,
        edit: impl FnOnce(&mut Document, &Caret, &EditorSettings) -> Option<Caret>,
    ) -> Option<()> {
        let mut builder = EditorActionBuilder::new(self);
        let replaced = builder.delete_selected();
        let caret = replaced.unwrap_or(builder.caret);
        let settings = builder.settings.clone();
        match edit(&mut builder.document, &caret, &settings) {
            Some(caret_after) => {
                builder.finish(caret_after);
                Some(())
            }
            None if replaced.is_some() => {
                builder.finish(caret);
                Some(())
            }
            None => {
                builder.discard();
                None
            }
        }
    }

    fn delete_selected(&mut self) -> Option<Caret> {
        if self.selection.is_collapsed() {
            return None;
        }
        let selection = std::mem::take(&mut self.selection);
        self.document.clear_selected();
        delete_selection(&mut self.document, &selection)
    }

    /// Types a character. `\n` starts a new line.
    pub fn insert_char(&mut self, c: char) -> Option<()> {
        match c {
            '\n' => self.new_line(),
            '\r' => None,
            c => self.edit(|document, caret, settings| {
                editing::insert_char(document, caret, c, settings)
            }),
        }
    }

    /// Backspace and Delete. A selection is deleted instead.
    pub fn remove_at_caret(&mut self, mode: CaretRemoveMode) -> Option<()> {
        let mut builder = EditorActionBuilder::new(self);
        if let Some(caret) = builder.delete_selected() {
            builder.finish(caret);
            return Some(());
        }
        let caret = builder.caret;
        let navigation = builder.navigation;
        match editing::remove_at_caret(&mut builder.document, &caret, mode, &navigation) {
            Some(caret) => {
                builder.finish(caret);
                Some(())
            }
            None => {
                builder.discard();
                None
            }
        }
    }

    pub fn move_caret(&mut self, direction: Direction, mode: MoveMode) -> Option<()> {
        let mut builder = EditorActionBuilder::new(self);
        // Left and right collapse a text selection to its edge
        if let (
            Some(side),
            MoveMode::Char,
            Selection::Text {
                node,
                anchor,
                focus,
            },
        ) = (direction.horizontal(), mode, builder.selection.clone())
        {
            if anchor != focus {
                let offset = match side {
                    HorizontalDirection::Left => anchor.min(focus),
                    HorizontalDirection::Right => anchor.max(focus),
                };
                builder.finish(Caret::text(node, offset));
                return Some(());
            }
        }
        let caret = builder.caret;
        let navigation = builder.navigation;
        match navigation.move_caret(&mut builder.document, &caret, direction, mode) {
            Some(caret) => {
                builder.finish(caret);
                Some(())
            }
            None => {
                builder.discard();
                None
            }
        }
    }

    /// Shift + arrow keys
    pub fn select_with_caret(&mut self, direction: Direction, mode: MoveMode) -> Option<()> {
        let (selection, caret) =
            extend_selection(&self.document, &self.caret, &self.selection, direction, mode)?;
        self.selection = selection;
        self.caret = caret;
        sync_selected_flags(&mut self.document, &self.selection);
        Some(())
    }

    pub fn select_all(&mut self) {
        self.selection = select_all(&self.document);
        sync_selected_flags(&mut self.document, &self.selection);
    }

    pub fn clear_all_selections(&mut self) {
        self.selection = Selection::None;
        self.document.clear_selected();
    }

    pub fn new_line(&mut self) -> Option<()> {
        self.edit(|document, caret, _| editing::new_line(document, caret))
    }

    /// Moves to the next slot of the structure around the caret
    pub fn tab(&mut self) -> Option<()> {
        let mut builder = EditorActionBuilder::new(self);
        let caret = builder.caret;
        let navigation = builder.navigation;
        match navigation.move_to_next_slot(&mut builder.document, &caret) {
            Some(caret) => {
                builder.finish(caret);
                Some(())
            }
            None => {
                builder.discard();
                None
            }
        }
    }

    /// Places the caret under a point, in the coordinates of the last layout
    pub fn click(&mut self, x: f64, y: f64) -> Option<()> {
        if !self.document.is_layout_valid() {
            self.layout();
        }
        let hit = self.document.hit_test(x, y)?;
        let caret = match hit.node.filter(|_| !hit.past_end) {
            None => line_edge_caret(&self.document, hit.line, HorizontalDirection::Right)?,
            Some(id) => {
                let node = self.document.find(id)?;
                if node.kind.is_cell_container() {
                    self.selection = Selection::Structure(id);
                    sync_selected_flags(&mut self.document, &self.selection);
                    return Some(());
                }
                match &node.kind {
                    kind if kind.is_text_bearing() => {
                        Caret::text(id, node.offset_at(x, self.measurer.as_ref()))
                    }
                    NodeKind::CodeBlock { .. } => {
                        let (line, offset) = node.code_position_at(x, y, self.measurer.as_ref());
                        Caret::Code {
                            node: id,
                            line,
                            offset,
                        }
                    }
                    _ => edge_caret(node, HorizontalDirection::Left),
                }
            }
        };
        if let Caret::Code { node, .. } = caret {
            if let Some(NodeKind::CodeBlock { collapsed, .. }) =
                self.document.find_mut(node).map(|node| &mut node.kind)
            {
                *collapsed = false;
            }
        }
        EditorActionBuilder::new(self).finish(caret);
        Some(())
    }

    /// Plain text from the platform clipboard, typed character by character
    pub fn paste_text(&mut self, value: &str) {
        for c in value.chars() {
            self.insert_char(c);
        }
    }

    pub fn copy(&self, data_type: SerializedDataType) -> Result<String, SerializationError> {
        serialize_lines(&copied_rows(&self.document, &self.selection), data_type)
    }

    /// Inserts clipboard data. Without a data type, the format is detected.
    pub fn paste(
        &mut self,
        data: &str,
        data_type: Option<SerializedDataType>,
    ) -> Result<(), SerializationError> {
        let rows = deserialize_lines(data, data_type)?;
        self.edit(|document, caret, _| paste_rows(document, caret, rows));
        Ok(())
    }

    pub fn insert_root(&mut self, with_index: bool) -> Option<()> {
        self.edit(|document, caret, _| editing::insert_root(document, caret, with_index))
    }

    pub fn insert_integral(&mut self, with_limits: bool) -> Option<()> {
        self.edit(|document, caret, _| editing::insert_integral(document, caret, with_limits))
    }

    pub fn insert_derivative(&mut self, order: u8) -> Option<()> {
        self.edit(|document, caret, _| editing::insert_derivative(document, caret, order))
    }

    pub fn insert_matrix(&mut self, rows: usize, columns: usize) -> Option<()> {
        self.edit(|document, caret, _| editing::insert_matrix(document, caret, rows, columns))
    }

    pub fn insert_vector(&mut self, len: usize, is_column: bool) -> Option<()> {
        self.edit(|document, caret, _| editing::insert_vector(document, caret, len, is_column))
    }

    pub fn insert_code_block(&mut self, language: &str) -> Option<()> {
        self.edit(|document, caret, _| editing::insert_code_block(document, caret, language))
    }

    pub fn insert_column_group(&mut self, count: usize) -> Option<()> {
        self.edit(|document, caret, _| editing::insert_column_group(document, caret, count))
    }

    pub fn insert_nbsp(&mut self) -> Option<()> {
        self.edit(|document, caret, settings| {
            editing::insert_nbsp(document, caret, &settings.nbsp_marker)
        })
    }

    pub fn toggle_code_block(&mut self) -> Option<()> {
        self.edit(|document, caret, _| editing::toggle_code_block(document, caret))
    }

    /// The node that holds the caret
    pub fn active_node(&self) -> Option<&Node> {
        self.document.find(self.caret.node())
    }

    /// Text of the active node. Inside of a code block, the current code line.
    pub fn get_text(&self) -> String {
        match (self.caret, self.active_node().map(|node| &node.kind)) {
            (Caret::Code { line, .. }, Some(NodeKind::CodeBlock { lines, .. })) => {
                lines.get(line).cloned().unwrap_or_default()
            }
            (_, Some(kind)) => kind.text().unwrap_or_default().to_string(),
            (_, None) => String::new(),
        }
    }

    /// Replaces the text of the active node and keeps the caret inside of it
    pub fn set_text(&mut self, value: &str) -> Option<()> {
        let caret = self.caret;
        let node = self.document.find_mut(caret.node())?;
        match (caret, &mut node.kind) {
            (Caret::Code { line, .. }, NodeKind::CodeBlock { lines, .. }) => {
                *lines.get_mut(line)? = value.to_string();
            }
            (_, kind) => *kind.text_mut()? = value.to_string(),
        }
        self.recover_caret();
        Some(())
    }

    pub fn get_offset(&self) -> usize {
        self.caret.offset()
    }

    /// Moves the caret inside of the active node. Offsets past the end are clamped.
    pub fn set_offset(&mut self, offset: usize) {
        let caret = match self.caret {
            Caret::Text { node, .. } => Caret::text(node, offset),
            Caret::Code { node, line, .. } => Caret::Code { node, line, offset },
        };
        self.set_caret(caret);
    }

    pub fn get_length(&self) -> usize {
        text::len(&self.get_text())
    }

    pub fn has_cursor(&self, node: NodeId) -> bool {
        self.caret.node() == node
    }

    /// Every node that reports holding the caret. There is never more than one.
    pub fn cursor_holders(&self) -> Vec<NodeId> {
        self.document
            .leaves()
            .into_iter()
            .filter(|node| self.has_cursor(*node))
            .collect()
    }

    /// (column, line) of the caret inside of a column group
    pub fn active_column(&self) -> Option<(usize, usize)> {
        let path = self.document.path_to(self.caret.node())?;
        let (group, slot) = column_line_of(&self.document, &path.row)?;
        self.document.node(&group)?.kind.column_position(slot)
    }

    pub fn caret_visible(&self) -> bool {
        self.caret_visible
    }

    /// Called by the blink timer
    pub fn toggle_caret_blink(&mut self) {
        self.caret_visible = !self.caret_visible;
    }

    pub fn layout(&mut self) {
        self.document.layout(
            self.measurer.as_ref(),
            self.settings.font_size,
            self.settings.line_spacing,
        );
    }

    /// Caret position and height. Lays the document out first when an edit made the layout stale.
    pub fn caret_rect(&mut self) -> Option<(f64, f64, f64)> {
        if !self.document.is_layout_valid() {
            self.layout();
        }
        let node = self.active_node()?;
        let layout = node.layout?;
        match self.caret {
            Caret::Text { offset, .. } => Some((
                node.caret_x(offset, self.measurer.as_ref()),
                layout.y,
                layout.height,
            )),
            Caret::Code { line, offset, .. } => {
                Some(node.code_caret(line, offset, self.measurer.as_ref()))
            }
        }
    }

    /// Draws the document, and the caret when it is in its visible blink phase
    pub fn render(&mut self, sink: &mut dyn RenderSink) {
        self.document.render(
            sink,
            self.measurer.as_ref(),
            self.settings.font_size,
            self.settings.line_spacing,
        );
        if !self.caret_visible {
            return;
        }
        if let Some((x, y, height)) = self.caret_rect() {
            sink.draw_line((x, y), (x, y + height), 1.0);
        }
    }

    /// Moves a caret that no longer points at a valid position to the closest valid one
    pub(crate) fn recover_caret(&mut self) {
        let Some(node) = self.document.find(self.caret.node()) else {
            log::warn!(
                "Caret pointed at the missing node {}, moved it to the start",
                self.caret.node()
            );
            self.caret = start_caret(&self.document);
            return;
        };
        let recovered = match (self.caret, &node.kind) {
            (Caret::Text { node, offset }, kind) if kind.is_text_bearing() => {
                Caret::text(node, offset.min(kind.text_len()))
            }
            (Caret::Code { node, .. }, NodeKind::CodeBlock {
                collapsed: true, ..
            }) => Caret::Code {
                node,
                line: 0,
                offset: 0,
            },
            (Caret::Code { node, line, offset }, NodeKind::CodeBlock { lines, .. }) => {
                let line = line.min(lines.len().saturating_sub(1));
                let len = lines.get(line).map_or(0, |value| text::len(value));
                Caret::Code {
                    node,
                    line,
                    offset: offset.min(len),
                }
            }
            _ => edge_caret(node, HorizontalDirection::Left),
        };
        if recovered != self.caret {
            log::warn!("Clamped the caret from {:?} to {:?}", self.caret, recovered);
            self.caret = recovered;
        }
    }
}

fn navigation_settings(settings: &EditorSettings) -> NavigationSettings {
    NavigationSettings {
        wrap_matrix_rows: settings.wrap_matrix_rows,
    }
}
