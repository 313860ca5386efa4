//! Markdown-subset renderer for model replies
//!
//! Supports the subset the analysis prompt asks for: `#`..`###` headings,
//! `**bold**` spans, `-`/`*` and numbered list items, and pipe tables.
//! Parsing is line based with a single cursor. Only tables consume more than
//! one line.
//!
//! List items are emitted one per list node; consecutive items are not
//! merged into a single list.

use regex::Regex;
use std::sync::OnceLock;

/// Inline run inside a paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
}

/// Block-level node, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(Vec<Span>),
    List { ordered: bool, items: Vec<String> },
    Table { header: Vec<String>, rows: Vec<Vec<String>> },
    Spacer,
}

fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\|?(\s*:?-+:?\s*\|)+\s*:?-+:?\s*\|?$").unwrap())
}

fn ordered_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+\. ").unwrap())
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*.*?\*\*").unwrap())
}

/// Parses text into block nodes
pub fn parse(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if starts_table_row(line)
            && lines
                .get(i + 1)
                .is_some_and(|next| separator_re().is_match(next.trim()))
        {
            let start = i;
            while i < lines.len() && starts_table_row(lines[i]) {
                i += 1;
            }
            let table = &lines[start..i];
            blocks.push(Block::Table {
                header: split_cells(table[0]),
                rows: table.iter().skip(2).map(|row| split_cells(row)).collect(),
            });
            continue;
        }

        blocks.push(parse_line(line));
        i += 1;
    }

    blocks
}

fn parse_line(line: &str) -> Block {
    if let Some(text) = line.strip_prefix("# ") {
        Block::Heading { level: 1, text: text.to_string() }
    } else if let Some(text) = line.strip_prefix("## ") {
        Block::Heading { level: 2, text: text.to_string() }
    } else if let Some(text) = line.strip_prefix("### ") {
        Block::Heading { level: 3, text: text.to_string() }
    } else if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        Block::List {
            ordered: false,
            items: vec![item.to_string()],
        }
    } else if let Some(m) = ordered_item_re().find(line) {
        Block::List {
            ordered: true,
            items: vec![line[m.end()..].to_string()],
        }
    } else if line.trim().is_empty() {
        Block::Spacer
    } else {
        Block::Paragraph(split_bold(line))
    }
}

fn starts_table_row(line: &str) -> bool {
    line.trim().starts_with('|')
}

/// Splits a table row on `|`, dropping the empty cells outside the edge pipes
fn split_cells(line: &str) -> Vec<String> {
    let mut cells: Vec<&str> = line.trim().split('|').map(str::trim).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells.into_iter().map(String::from).collect()
}

/// Alternating text/bold spans; empty text runs are kept
fn split_bold(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for m in bold_re().find_iter(line) {
        spans.push(Span::Text(line[last..m.start()].to_string()));
        spans.push(Span::Bold(line[m.start() + 2..m.end() - 2].to_string()));
        last = m.end();
    }
    spans.push(Span::Text(line[last..].to_string()));

    spans
}

const BOLD_ON: &str = "\x1b[1m";
const BOLD_OFF: &str = "\x1b[0m";

/// Renders blocks as plain terminal text
///
/// With `ansi` set, headings and bold spans use ANSI bold.
pub fn render_terminal(blocks: &[Block], ansi: bool) -> String {
    let bold = |s: &str| {
        if ansi {
            format!("{}{}{}", BOLD_ON, s, BOLD_OFF)
        } else {
            s.to_string()
        }
    };

    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                out.push(bold(text));
                match level {
                    1 => out.push("=".repeat(text.chars().count())),
                    2 => out.push("-".repeat(text.chars().count())),
                    _ => {}
                }
            }
            Block::Paragraph(spans) => {
                let line: String = spans
                    .iter()
                    .map(|span| match span {
                        Span::Text(t) => t.clone(),
                        Span::Bold(t) => bold(t),
                    })
                    .collect();
                out.push(line);
            }
            // Each list node restarts its own numbering
            Block::List { ordered, items } => {
                for (n, item) in items.iter().enumerate() {
                    if *ordered {
                        out.push(format!("  {}. {}", n + 1, item));
                    } else {
                        out.push(format!("  • {}", item));
                    }
                }
            }
            Block::Table { header, rows } => out.extend(render_table(header, rows)),
            Block::Spacer => out.push(String::new()),
        }
    }

    out.join("\n")
}

fn render_table(header: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let columns = rows.iter().map(Vec::len).chain([header.len()]).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows.iter().map(Vec::as_slice).chain([header]) {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let format_row = |row: &[String]| {
        row.iter()
            .enumerate()
            .map(|(idx, cell)| {
                let pad = widths[idx] - cell.chars().count();
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(header)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(rows.iter().map(|row| format_row(row)));
    lines
}
