//! Offsets inside text-bearing nodes count extended grapheme clusters,
//! so a caret never lands in the middle of a user-perceived character.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

pub fn len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Byte index of the grapheme offset, clamped to the end of the text.
pub fn byte_index(text: &str, offset: usize) -> usize {
    text.grapheme_indices(true)
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

pub fn split_at(text: &str, offset: usize) -> (&str, &str) {
    text.split_at(byte_index(text, offset))
}

pub fn slice(text: &str, range: Range<usize>) -> &str {
    let start = byte_index(text, range.start);
    let end = byte_index(text, range.end.max(range.start));
    &text[start..end]
}

pub fn insert(text: &mut String, offset: usize, value: &str) {
    let index = byte_index(text, offset);
    text.insert_str(index, value);
}

/// Removes the graphemes in the range and returns them.
pub fn remove(text: &mut String, range: Range<usize>) -> String {
    let start = byte_index(text, range.start);
    let end = byte_index(text, range.end.max(range.start));
    text.drain(start..end).collect()
}

/// The grapheme at the offset, if any.
pub fn grapheme_at(text: &str, offset: usize) -> Option<&str> {
    text.graphemes(true).nth(offset)
}

/// Identifier-ish characters. These form the tokens that `/`, `^` and `_` pull into structures.
pub fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '.'
}

pub fn is_token_grapheme(grapheme: &str) -> bool {
    grapheme.chars().next().is_some_and(is_token_char)
}

/// Start offset of the token that ends at `offset`.
pub fn token_start(text: &str, offset: usize) -> usize {
    let graphemes: Vec<&str> = text.graphemes(true).take(offset).collect();
    let token_len = graphemes
        .iter()
        .rev()
        .take_while(|grapheme| is_token_grapheme(grapheme))
        .count();
    graphemes.len() - token_len
}

fn offset_of_byte(text: &str, byte: usize) -> usize {
    text.get(..byte).map(len).unwrap_or_else(|| len(text))
}

/// Previous word boundary, skipping whitespace-only segments.
pub fn previous_word_boundary(text: &str, offset: usize) -> usize {
    let byte_pos = byte_index(text, offset);
    let mut previous = 0;
    for (byte, word) in text.split_word_bound_indices() {
        if byte >= byte_pos {
            break;
        }
        if !word.trim().is_empty() {
            previous = byte;
        }
    }
    offset_of_byte(text, previous)
}

/// Next word boundary, skipping whitespace-only segments.
pub fn next_word_boundary(text: &str, offset: usize) -> usize {
    let byte_pos = byte_index(text, offset);
    for (byte, word) in text.split_word_bound_indices() {
        let end = byte + word.len();
        if end > byte_pos && !word.trim().is_empty() {
            return offset_of_byte(text, end);
        }
    }
    len(text)
}

/// `name =` or `name = ` right before a vector, which makes `name` hold a vector.
pub fn is_vector_assignment(text: &str) -> bool {
    let Some(before) = text.trim_end().strip_suffix('=') else {
        return false;
    };
    before.trim_end().chars().last().is_some_and(is_token_char)
}
