use std::ops::{Deref, DerefMut};

use crate::{
    caret::{Caret, Selection},
    editor_state::EditorState,
};

/// Every edit goes through a builder. The edit functions change the document,
/// and finishing the builder installs the caret that they returned.
/// Finishing also drops the selection, makes the caret visible, and repairs a caret that does not resolve any more.
#[must_use]
pub struct EditorActionBuilder<'editor> {
    editor: &'editor mut EditorState,
    caret_before: Caret,
}

impl<'editor> EditorActionBuilder<'editor> {
    pub fn new(editor: &'editor mut EditorState) -> Self {
        let caret_before = editor.caret;
        Self {
            editor,
            caret_before,
        }
    }

    pub fn discard(self) {
        // no-op
    }

    pub fn finish(self, caret_after: Caret) -> Caret {
        let editor = self.editor;
        editor.selection = Selection::None;
        editor.document.clear_selected();
        editor.caret = caret_after;
        editor.recover_caret();
        editor.caret_visible = true;
        if editor.caret != self.caret_before {
            log::trace!("Caret moved to {:?}", editor.caret);
        }
        editor.caret
    }
}

impl<'editor> Deref for EditorActionBuilder<'editor> {
    type Target = EditorState;

    fn deref(&self) -> &Self::Target {
        self.editor
    }
}

impl<'editor> DerefMut for EditorActionBuilder<'editor> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.editor
    }
}
