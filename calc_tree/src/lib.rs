//! The Calcpad document model.
//!
//! A [`document::Document`] is a list of lines, every line is a [`row::Row`] of [`node::Node`]s,
//! and every structured node owns further rows for its slots (numerator, exponent, matrix cells...).
//! So the hierarchy is always Row -> Node -> Row -> Node -> ...
//!
//! Nodes never point at their parents. A node is addressed by its [`node_id::NodeId`],
//! and [`document::Document::path_to`] resolves that id by walking down from the lines.

pub mod direction;
pub mod display;
pub mod document;
pub mod grid;
pub mod layout;
pub mod node;
pub mod node_id;
pub mod row;
pub mod row_macros;
pub mod text;
