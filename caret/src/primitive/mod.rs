pub mod movement;
pub mod primitive_edit;

pub use movement::{MoveMode, NavigationSettings};
pub use primitive_edit::CaretRemoveMode;
