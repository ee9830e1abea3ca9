//! The editing session. Owns one document, one caret and one selection,
//! and turns input events into navigation and edits.

pub mod caret;
mod editing;
mod editor_action_builder;
pub mod editor_state;
pub mod input;
pub mod primitive;
mod selection;
pub mod settings;

pub use editor_state::EditorState;
