//! Converting documents to and from text.
//!
//! The Calcpad notation is the persistent format, see [`calcpad`].
//! The clipboard additionally understands a versioned JSON envelope around the tree.

pub mod calcpad;
mod scanner;
mod to_dsl;

pub use calcpad::{parse_document, parse_line, serialize_document};
pub use to_dsl::ToDsl;

use calc_tree::{document::Document, row::Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(
    feature = "wasm",
    derive(tsify::Tsify),
    tsify(into_wasm_abi, from_wasm_abi)
)]
pub enum SerializedDataType {
    /// Calcpad notation, one line per document line
    Calcpad,
    JsonDocument,
}

#[derive(Deserialize, Serialize)]
struct SerializedData<T> {
    version: u32,
    data: T,
}

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("Could not serialize as JSON")]
    Json(#[from] serde_json::Error),
    #[error("Data version {0} is newer than this editor")]
    UnsupportedVersion(u32),
}

pub fn serialize_lines(lines: &[Row], data_type: SerializedDataType) -> Result<String, SerializationError> {
    match data_type {
        SerializedDataType::Calcpad => Ok(lines
            .iter()
            .map(ToDsl::to_dsl)
            .collect::<Vec<_>>()
            .join("\n")),
        SerializedDataType::JsonDocument => {
            let data = &SerializedData {
                version: CURRENT_VERSION,
                data: lines,
            };
            Ok(serde_json::to_string(data)?)
        }
    }
}

/// Reads lines back. Without a data type, JSON envelopes are detected and everything else is read as Calcpad.
pub fn deserialize_lines(
    data: &str,
    data_type: Option<SerializedDataType>,
) -> Result<Vec<Row>, SerializationError> {
    let lines = match data_type {
        Some(SerializedDataType::Calcpad) => parse_document(data).into_lines(),
        Some(SerializedDataType::JsonDocument) => from_json(data)?,
        None => {
            if data.trim_start().starts_with('{') {
                match from_json(data) {
                    Ok(lines) => lines,
                    Err(SerializationError::Json(error)) => {
                        log::debug!("Not a JSON document, reading as Calcpad: {}", error);
                        parse_document(data).into_lines()
                    }
                    Err(error) => return Err(error),
                }
            } else {
                parse_document(data).into_lines()
            }
        }
    };
    // Restores the invariants that JSON does not enforce
    Ok(Document::from_lines(lines).into_lines())
}

fn from_json(data: &str) -> Result<Vec<Row>, SerializationError> {
    let data: SerializedData<Vec<Row>> = serde_json::from_str(data)?;
    if data.version > CURRENT_VERSION {
        return Err(SerializationError::UnsupportedVersion(data.version));
    }
    Ok(data.data)
}

pub fn serialize_document_as(
    document: &Document,
    data_type: SerializedDataType,
) -> Result<String, SerializationError> {
    serialize_lines(document.lines(), data_type)
}

pub fn deserialize_document_as(
    data: &str,
    data_type: Option<SerializedDataType>,
) -> Result<Document, SerializationError> {
    Ok(Document::from_lines(deserialize_lines(data, data_type)?))
}
