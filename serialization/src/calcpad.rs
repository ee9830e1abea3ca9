//! The Calcpad notation.
//!
//! A line is scanned once from left to right. Plain text accumulates until a construct is recognized:
//! `"title`, `'comment'`, `a/b`, `x^2`, `n_i`, `sqrt(x)`, `root(x;3)`, `[1;2|3;4]`,
//! `$Integral{f @ x = a : b}` and `$Derivative{f @ x : 2}`.
//! Anything that does not form a valid construct stays plain text, so parsing never fails.
//!
//! Some constructs span several lines: `@{lang}` ... `@{end lang}` code blocks and
//! `#columns N` ... `#column` ... `#end columns` column groups.

use calc_tree::{
    document::Document,
    grid::Grid,
    node::{Node, NodeKind, MAX_COLUMNS, MIN_COLUMNS},
    row::Row,
    text,
};

use crate::{
    scanner::{contains_top_level, find_closing, split_top_level, starts_with_at},
    to_dsl::ToDsl,
};

pub fn parse_document(value: &str) -> Document {
    let lines: Vec<&str> = value
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let mut rows = Vec::with_capacity(lines.len());
    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim();
        if let Some(count) = columns_header(trimmed) {
            if let Some((group, next)) = capture_columns(&lines, index, count) {
                rows.push(Row::new(vec![group]));
                index = next;
                continue;
            }
            log::debug!("Unterminated column block in line {}", index);
        } else if let Some(language) = code_block_language(trimmed) {
            if let Some((block, next)) = capture_code_block(&lines, index, &language) {
                rows.push(Row::new(vec![block]));
                index = next;
                continue;
            }
            log::debug!("Unterminated code block in line {}", index);
        }
        rows.push(parse_row(line));
        index += 1;
    }
    Document::from_lines(rows)
}

pub fn serialize_document(document: &Document) -> String {
    document.to_dsl()
}

/// Parses one line of expressions. Always returns at least one node.
pub fn parse_line(line: &str) -> Vec<Node> {
    LineParser::new(line).parse()
}

pub fn parse_row(line: &str) -> Row {
    Row::new(parse_line(line))
}

/// `#columns N`, `@{columns N}` or `@{columns}`, with N clamped to the allowed range
fn columns_header(trimmed: &str) -> Option<usize> {
    let count = if let Some(rest) = trimmed.strip_prefix("#columns ") {
        rest.trim()
    } else if trimmed.starts_with("@{columns") && trimmed.ends_with('}') {
        trimmed["@{columns".len()..trimmed.len() - 1].trim()
    } else {
        return None;
    };
    let count = count.parse::<usize>().unwrap_or(MIN_COLUMNS);
    Some(count.clamp(MIN_COLUMNS, MAX_COLUMNS))
}

fn is_column_separator(trimmed: &str) -> bool {
    trimmed == "#column" || trimmed == "@{column}"
}

fn is_columns_end(trimmed: &str) -> bool {
    trimmed == "#end columns" || trimmed == "@{end columns}"
}

/// The language of a `@{lang}` line. Directives like `@{end ...}` never open a block.
fn code_block_language(trimmed: &str) -> Option<String> {
    let rest = trimmed.strip_prefix("@{")?;
    if rest.starts_with("end") || rest.starts_with("calcpad") || rest.starts_with("column") {
        return None;
    }
    let end = rest.find('}')?;
    let language = rest[..end].trim();
    (!language.is_empty()).then(|| language.to_string())
}

fn is_code_block_end(trimmed: &str, language: &str) -> bool {
    trimmed == "@{end}"
        || trimmed.starts_with(&format!("@{{end {}}}", language))
        || trimmed.starts_with(&format!("@{{end{}}}", language))
}

/// Collects the lines up to the matching end marker. Blocks of the same language may nest.
fn capture_code_block(lines: &[&str], start: usize, language: &str) -> Option<(Node, usize)> {
    let mut depth = 0usize;
    for (index, line) in lines.iter().enumerate().skip(start + 1) {
        let trimmed = line.trim();
        if is_code_block_end(trimmed, language) {
            if depth == 0 {
                let content = lines[start + 1..index]
                    .iter()
                    .map(|line| line.to_string())
                    .collect();
                return Some((Node::code_block(language, content, true), index + 1));
            }
            depth -= 1;
        } else if code_block_language(trimmed).as_deref() == Some(language) {
            depth += 1;
        }
    }
    None
}

fn capture_columns(lines: &[&str], start: usize, count: usize) -> Option<(Node, usize)> {
    let mut columns: Vec<Vec<Row>> = vec![Vec::new(); count];
    let mut current = 0;
    let mut index = start + 1;
    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim();
        if is_columns_end(trimmed) {
            return Some((Node::column_group(columns), index + 1));
        }
        if is_column_separator(trimmed) {
            current = (current + 1).min(count - 1);
            index += 1;
            continue;
        }
        let block = code_block_language(trimmed)
            .and_then(|language| capture_code_block(lines, index, &language));
        let (row, next) = match block {
            Some((block, next)) => (Row::new(vec![block]), next),
            None => (parse_row(line), index + 1),
        };
        if let Some(column) = columns.get_mut(current) {
            column.push(row);
        }
        index = next;
    }
    None
}

/// Which operator created a script structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Fraction,
    Power,
    Subscript,
}

impl Script {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '/' => Some(Script::Fraction),
            '^' => Some(Script::Power),
            '_' => Some(Script::Subscript),
            _ => None,
        }
    }

    /// Subscripts only take letters and digits, the others also take decimal points
    fn is_token_char(self, c: char) -> bool {
        match self {
            Script::Subscript => c.is_alphanumeric(),
            Script::Fraction | Script::Power => text::is_token_char(c),
        }
    }

    fn build(self, leading: Row, trailing: Row) -> Node {
        match self {
            Script::Fraction => Node::fraction(leading, trailing),
            Script::Power => Node::power(leading, trailing),
            Script::Subscript => Node::subscript(leading, trailing),
        }
    }
}

struct LineParser {
    chars: Vec<char>,
    position: usize,
    /// Plain text that has not been turned into a node yet
    pending: String,
    nodes: Vec<Node>,
}

impl LineParser {
    fn new(line: &str) -> Self {
        LineParser {
            chars: line.chars().collect(),
            position: 0,
            pending: String::new(),
            nodes: Vec::new(),
        }
    }

    fn parse(mut self) -> Vec<Node> {
        while let Some(&c) = self.chars.get(self.position) {
            let handled = match c {
                '"' => self.title(),
                '\'' => self.comment(),
                '(' => self.group_script(),
                '/' | '^' | '_' => Script::from_char(c).is_some_and(|script| self.script(script)),
                '[' => self.vector(),
                '$' => self.calculus(),
                's' | 'r' => self.root(),
                _ => false,
            };
            if !handled {
                self.pending.push(c);
                self.position += 1;
            }
        }
        self.flush();
        if self.nodes.is_empty() {
            self.nodes.push(Node::empty_text());
        }
        self.nodes
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.nodes
                .push(Node::text_run(std::mem::take(&mut self.pending)));
        }
    }

    fn collect(&self, range: std::ops::Range<usize>) -> String {
        self.chars[range].iter().collect()
    }

    /// Reads up to the closing quote. Returns the text and whether the quote was found.
    fn quoted(&mut self, quote: char) -> (String, bool) {
        let start = self.position + 1;
        let end = self.chars[start..]
            .iter()
            .position(|&c| c == quote)
            .map(|offset| start + offset);
        match end {
            Some(end) => {
                self.position = end + 1;
                (self.collect(start..end), true)
            }
            None => {
                self.position = self.chars.len();
                (self.collect(start..self.chars.len()), false)
            }
        }
    }

    fn title(&mut self) -> bool {
        self.flush();
        let (value, _) = self.quoted('"');
        self.nodes.push(Node::title(value));
        true
    }

    fn comment(&mut self) -> bool {
        self.flush();
        let (value, closed) = self.quoted('\'');
        self.nodes.push(Node::comment(value, closed));
        true
    }

    /// The slot after an operator, either a parenthesized group or a token
    fn trailing_slot(&self, start: usize, script: Script) -> Option<(Row, usize)> {
        if self.chars.get(start) == Some(&'(') {
            let end = find_closing(&self.chars, start)?;
            return Some((parse_row(&self.collect(start + 1..end)), end + 1));
        }
        let length = self.chars[start.min(self.chars.len())..]
            .iter()
            .take_while(|&&c| script.is_token_char(c))
            .count();
        if length == 0 {
            return None;
        }
        Some((
            Row::from_text(self.collect(start..start + length)),
            start + length,
        ))
    }

    /// `token/token`, with the leading token taken from the pending text
    fn script(&mut self, script: Script) -> bool {
        let token_length = self
            .pending
            .chars()
            .rev()
            .take_while(|&c| script.is_token_char(c))
            .count();
        if token_length == 0 {
            return false;
        }
        let Some((trailing, end)) = self.trailing_slot(self.position + 1, script) else {
            return false;
        };
        let split = self.pending.chars().count() - token_length;
        let token: String = self.pending.chars().skip(split).collect();
        self.pending = self.pending.chars().take(split).collect();
        self.flush();
        self.nodes
            .push(script.build(Row::from_text(token), trailing));
        self.position = end;
        true
    }

    /// `(group)/token`, the group is parsed as the leading slot
    fn group_script(&mut self) -> bool {
        let Some(close) = find_closing(&self.chars, self.position) else {
            return false;
        };
        let Some(script) = self.chars.get(close + 1).copied().and_then(Script::from_char) else {
            return false;
        };
        let Some((trailing, end)) = self.trailing_slot(close + 2, script) else {
            return false;
        };
        let leading = parse_row(&self.collect(self.position + 1..close));
        self.flush();
        self.nodes.push(script.build(leading, trailing));
        self.position = end;
        true
    }

    fn follows_identifier(&self) -> bool {
        self.pending
            .chars()
            .last()
            .is_some_and(|c| text::is_token_char(c) || c == '_')
    }

    /// `sqrt(x)` and `root(x;n)`, unless they are the end of a longer name
    fn root(&mut self) -> bool {
        if self.follows_identifier() {
            return false;
        }
        let with_index = if starts_with_at(&self.chars, self.position, "sqrt(") {
            false
        } else if starts_with_at(&self.chars, self.position, "root(") {
            true
        } else {
            return false;
        };
        let open = self.position + 4;
        let Some(close) = find_closing(&self.chars, open) else {
            log::debug!("Unbalanced root at {}", self.position);
            return false;
        };
        let content = &self.chars[open + 1..close];
        let node = if with_index {
            let parts = split_top_level(content, ';');
            let [radicand, index] = parts.as_slice() else {
                return false;
            };
            Node::root(parse_row(radicand), Some(parse_row(index.trim())))
        } else {
            Node::root(parse_row(&content.iter().collect::<String>()), None)
        };
        self.flush();
        self.nodes.push(node);
        self.position = close + 1;
        true
    }

    /// `$Integral{f @ x}`, `$Integral{f @ x = a : b}`, `$Derivative{f @ x}` and `$Derivative{f @ x : n}`
    fn calculus(&mut self) -> bool {
        let (is_integral, open) = if starts_with_at(&self.chars, self.position, "$Integral{") {
            (true, self.position + "$Integral".len())
        } else if starts_with_at(&self.chars, self.position, "$Derivative{") {
            (false, self.position + "$Derivative".len())
        } else {
            return false;
        };
        let Some(close) = find_closing(&self.chars, open) else {
            log::debug!("Unbalanced calculus block at {}", self.position);
            return false;
        };
        let content = &self.chars[open + 1..close];
        let parts = split_top_level(content, '@');
        let [function, rest] = parts.as_slice() else {
            return false;
        };
        let function = parse_row(function.trim());
        let rest: Vec<char> = rest.chars().collect();

        let node = if is_integral {
            let parts = split_top_level(&rest, '=');
            match parts.as_slice() {
                [variable] => Node::integral(function, parse_row(variable.trim()), None),
                [variable, limits] => {
                    let limits: Vec<char> = limits.chars().collect();
                    let limits = split_top_level(&limits, ':');
                    let [lower, upper] = limits.as_slice() else {
                        return false;
                    };
                    Node::integral(
                        function,
                        parse_row(variable.trim()),
                        Some((parse_row(lower.trim()), parse_row(upper.trim()))),
                    )
                }
                _ => return false,
            }
        } else {
            let parts = split_top_level(&rest, ':');
            match parts.as_slice() {
                [variable] => Node::derivative(function, parse_row(variable.trim()), 1),
                [variable, order] => match order.trim().parse::<u8>() {
                    Ok(order) if order >= 1 => {
                        Node::derivative(function, parse_row(variable.trim()), order)
                    }
                    _ => return false,
                },
                _ => return false,
            }
        };
        self.flush();
        self.nodes.push(node);
        self.position = close + 1;
        true
    }

    /// `[a; b]`, `[a|b]` and `[a; b|c; d]`. Brackets without `;` or `|` stay text.
    fn vector(&mut self) -> bool {
        let Some(close) = find_closing(&self.chars, self.position) else {
            log::debug!("Unbalanced bracket at {}", self.position);
            return false;
        };
        let content = &self.chars[self.position + 1..close];
        if !contains_top_level(content, &[';', '|']) {
            return false;
        }
        let rows: Vec<Vec<Row>> = split_top_level(content, '|')
            .into_iter()
            .map(|row| {
                let row: Vec<char> = row.chars().collect();
                split_top_level(&row, ';')
                    .iter()
                    .map(|cell| parse_row(cell.trim()))
                    .collect()
            })
            .collect();

        let node = if rows.len() == 1 {
            Node::vector(rows.into_iter().flatten().collect(), false)
        } else if rows.iter().all(|row| row.len() == 1) {
            Node::vector(rows.into_iter().flatten().collect(), true)
        } else {
            Node::matrix(Grid::from_rows(rows, Row::empty))
        };

        let marks_vector = text::is_vector_assignment(&self.pending);
        self.flush();
        if marks_vector {
            if let Some(NodeKind::TextRun {
                is_vector_marker, ..
            }) = self.nodes.last_mut().map(|node| &mut node.kind)
            {
                *is_vector_marker = true;
            }
        }
        self.nodes.push(node);
        self.position = close + 1;
        true
    }
}
