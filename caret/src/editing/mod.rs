//! The edit engine. Every function takes the caret, changes the document,
//! and returns the caret after the edit, or `None` when nothing happened.

pub mod commands;
pub mod insert;
pub mod lines;
pub mod remove;

pub use commands::{
    insert_code_block, insert_column_group, insert_derivative, insert_integral, insert_matrix,
    insert_nbsp, insert_root, insert_vector, toggle_code_block,
};
pub use insert::insert_char;
pub use lines::new_line;
pub use remove::remove_at_caret;
