//! S-expression printing, mostly for tests and debug logs.
//! `a/b` prints as `(frac (row "a") (row "b"))`.

use std::fmt;

use crate::{
    document::Document,
    node::{Node, NodeKind},
    row::Row,
};

pub fn write_with_escaped_double_quotes(value: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for c in value.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            _ => write!(f, "{}", c)?,
        }
    }
    Ok(())
}

pub fn write_with_separator(
    values: impl IntoIterator<Item = impl fmt::Display>,
    separator: &str,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    let mut values = values.into_iter();
    if let Some(first) = values.next() {
        write!(f, "{}", first)?;
        for value in values {
            write!(f, "{}{}", separator, value)?;
        }
    }
    Ok(())
}

fn write_quoted(value: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "\"")?;
    write_with_escaped_double_quotes(value, f)?;
    write!(f, "\"")
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(row ")?;
        write_with_separator(self.iter(), " ", f)?;
        write!(f, ")")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::TextRun {
                text,
                is_vector_marker,
            } => {
                if *is_vector_marker {
                    write!(f, "(vec-name ")?;
                    write_quoted(text, f)?;
                    write!(f, ")")
                } else {
                    write_quoted(text, f)
                }
            }
            NodeKind::Comment { text, closed } => {
                write!(f, "(comment ")?;
                write_quoted(text, f)?;
                if *closed {
                    write!(f, " closed")?;
                }
                write!(f, ")")
            }
            NodeKind::Title { text } => {
                write!(f, "(title ")?;
                write_quoted(text, f)?;
                write!(f, ")")
            }
            NodeKind::Derivative { order, .. } if *order > 1 => {
                write!(f, "(derivative {} ", order)?;
                write_with_separator(self.kind.slots(), " ", f)?;
                write!(f, ")")
            }
            NodeKind::Vector { is_column: true, .. } => {
                write!(f, "(column-vector ")?;
                write_with_separator(self.kind.slots(), " ", f)?;
                write!(f, ")")
            }
            NodeKind::Matrix { cells } => write!(f, "(matrix {})", cells),
            NodeKind::CodeBlock {
                language, lines, ..
            } => {
                write!(f, "(code ")?;
                write_quoted(language, f)?;
                for line in lines {
                    write!(f, " ")?;
                    write_quoted(line, f)?;
                }
                write!(f, ")")
            }
            NodeKind::ColumnGroup { columns } => {
                write!(f, "(columns")?;
                for column in columns {
                    write!(f, " (column ")?;
                    write_with_separator(column, " ", f)?;
                    write!(f, ")")?;
                }
                write!(f, ")")
            }
            kind => {
                write!(f, "({} ", kind.name())?;
                write_with_separator(kind.slots(), " ", f)?;
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_with_separator(self.lines(), "\n", f)
    }
}
