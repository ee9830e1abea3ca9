//! Bracket matching over characters.

fn closing_of(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

fn is_open(c: char) -> bool {
    matches!(c, '(' | '[' | '{')
}

fn is_close(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

/// Index of the bracket that closes the one at `open`.
/// Returns `None` for unbalanced or crossed brackets.
pub(crate) fn find_closing(chars: &[char], open: usize) -> Option<usize> {
    let expected = closing_of(*chars.get(open)?)?;
    let mut stack = Vec::new();
    for (index, &c) in chars.iter().enumerate().skip(open) {
        if is_open(c) {
            stack.push(closing_of(c)?);
        } else if is_close(c) {
            if stack.pop()? != c {
                return None;
            }
            if stack.is_empty() {
                return (c == expected).then_some(index);
            }
        }
    }
    None
}

/// Splits on a separator that is not nested inside of any brackets.
pub(crate) fn split_top_level(chars: &[char], separator: char) -> Vec<String> {
    let mut parts = vec![String::new()];
    let mut depth = 0usize;
    for &c in chars {
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            depth = depth.saturating_sub(1);
        }
        if c == separator && depth == 0 {
            parts.push(String::new());
        } else if let Some(part) = parts.last_mut() {
            part.push(c);
        }
    }
    parts
}

pub(crate) fn contains_top_level(chars: &[char], separators: &[char]) -> bool {
    let mut depth = 0usize;
    for &c in chars {
        if is_open(c) {
            depth += 1;
        } else if is_close(c) {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && separators.contains(&c) {
            return true;
        }
    }
    false
}

pub(crate) fn starts_with_at(chars: &[char], position: usize, prefix: &str) -> bool {
    let mut index = position;
    for expected in prefix.chars() {
        if chars.get(index) != Some(&expected) {
            return false;
        }
        index += 1;
    }
    true
}
