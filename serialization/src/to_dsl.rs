use calc_tree::{document::Document, node::Node, node::NodeKind, row::Row, text};

/// Writes Calcpad notation. Parsing the output again gives back the same structure.
pub trait ToDsl {
    fn to_dsl(&self) -> String;
}

/// What surrounds a node in its row. Script slots get parentheses when a neighbouring token would merge into them.
#[derive(Debug, Clone, Copy, Default)]
struct Neighbours {
    after_token: bool,
    before_token: bool,
    has_next: bool,
}

impl ToDsl for Document {
    fn to_dsl(&self) -> String {
        self.lines()
            .iter()
            .map(ToDsl::to_dsl)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ToDsl for Row {
    fn to_dsl(&self) -> String {
        let nodes = self.nodes();
        let mut output = String::new();
        for (index, node) in nodes.iter().enumerate() {
            let next = nodes.get(index + 1);
            let neighbours = Neighbours {
                after_token: output.chars().last().is_some_and(text::is_token_char),
                before_token: next
                    .and_then(|next| write_node(next, Neighbours::default()).chars().next())
                    .is_some_and(text::is_token_char),
                has_next: next.is_some(),
            };
            output.push_str(&write_node(node, neighbours));
        }
        output
    }
}

impl ToDsl for Node {
    fn to_dsl(&self) -> String {
        write_node(self, Neighbours::default())
    }
}

fn is_bare(value: &str, is_token_char: fn(char) -> bool) -> bool {
    !value.is_empty() && value.chars().all(is_token_char)
}

fn is_alphanumeric(c: char) -> bool {
    c.is_alphanumeric()
}

fn slot(row: &Row, is_token_char: fn(char) -> bool, touches_token: bool) -> String {
    let value = row.to_dsl();
    if is_bare(&value, is_token_char) && !touches_token {
        value
    } else {
        format!("({})", value)
    }
}

fn write_script(
    leading: &Row,
    operator: char,
    trailing: &Row,
    is_token_char: fn(char) -> bool,
    neighbours: Neighbours,
) -> String {
    format!(
        "{}{}{}",
        slot(leading, is_token_char, neighbours.after_token),
        operator,
        slot(trailing, is_token_char, neighbours.before_token)
    )
}

fn write_node(node: &Node, neighbours: Neighbours) -> String {
    match &node.kind {
        NodeKind::TextRun { text, .. } => text.clone(),
        NodeKind::Comment { text, closed } => {
            if *closed || neighbours.has_next {
                format!("'{}'", text)
            } else {
                format!("'{}", text)
            }
        }
        NodeKind::Title { text } => {
            if neighbours.has_next {
                format!("\"{}\"", text)
            } else {
                format!("\"{}", text)
            }
        }
        NodeKind::Fraction {
            numerator,
            denominator,
        } => write_script(numerator, '/', denominator, text::is_token_char, neighbours),
        NodeKind::Power { base, exponent } => {
            write_script(base, '^', exponent, text::is_token_char, neighbours)
        }
        NodeKind::Subscript { base, sub } => {
            write_script(base, '_', sub, is_alphanumeric, neighbours)
        }
        NodeKind::Root {
            radicand,
            index: None,
        } => format!("sqrt({})", radicand.to_dsl()),
        NodeKind::Root {
            radicand,
            index: Some(index),
        } => format!("root({};{})", radicand.to_dsl(), index.to_dsl()),
        NodeKind::Integral {
            integrand,
            variable,
            limits: None,
        } => format!("$Integral{{{} @ {}}}", integrand.to_dsl(), variable.to_dsl()),
        NodeKind::Integral {
            integrand,
            variable,
            limits: Some((lower, upper)),
        } => format!(
            "$Integral{{{} @ {} = {} : {}}}",
            integrand.to_dsl(),
            variable.to_dsl(),
            lower.to_dsl(),
            upper.to_dsl()
        ),
        NodeKind::Derivative {
            function,
            variable,
            order,
        } => {
            if *order > 1 {
                format!(
                    "$Derivative{{{} @ {} : {}}}",
                    function.to_dsl(),
                    variable.to_dsl(),
                    order
                )
            } else {
                format!("$Derivative{{{} @ {}}}", function.to_dsl(), variable.to_dsl())
            }
        }
        NodeKind::Vector { cells, is_column } => {
            let separator = if *is_column { "|" } else { "; " };
            format!("[{}]", join_rows(cells, separator))
        }
        NodeKind::Matrix { cells } => {
            let rows: Vec<String> = cells.rows().map(|row| join_rows(row, "; ")).collect();
            format!("[{}]", rows.join("|"))
        }
        NodeKind::CodeBlock {
            language, lines, ..
        } => format!(
            "@{{{}}}\n{}\n@{{end {}}}",
            language,
            lines.join("\n"),
            language
        ),
        NodeKind::ColumnGroup { columns } => {
            let columns: Vec<String> = columns
                .iter()
                .map(|lines| join_rows(lines, "\n"))
                .collect();
            format!(
                "#columns {}\n{}\n#end columns",
                columns.len(),
                columns.join("\n#column\n")
            )
        }
    }
}

fn join_rows(rows: &[Row], separator: &str) -> String {
    rows.iter()
        .map(ToDsl::to_dsl)
        .collect::<Vec<_>>()
        .join(separator)
}
