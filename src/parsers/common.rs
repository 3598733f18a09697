use anyhow::Result;
use std::borrow::Cow;
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

use crate::core::error::{ScanError, ScanResult};

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(language)?;
        Ok(Self { parser })
    }

    /// Parse `source`, rejecting trees that contain error or missing nodes.
    pub fn parse_strict(&mut self, file_path: &Path, source: &str) -> ScanResult<Tree> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ScanError::parse(file_path, "parser produced no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(&root).unwrap_or(1);
            return Err(ScanError::parse(
                file_path,
                format!("invalid syntax near line {line}"),
            ));
        }

        Ok(tree)
    }
}

fn first_error_line(root: &TSNode) -> Option<usize> {
    let mut stack = vec![*root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row + 1);
        }
        let mut cursor = node.walk();
        let flagged: Vec<TSNode> = node
            .children(&mut cursor)
            .filter(|child| child.has_error())
            .collect();
        stack.extend(flagged.into_iter().rev());
    }
    None
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

/// 1-based inclusive line span of a node.
pub fn line_span(node: &TSNode) -> (usize, usize) {
    let start = node.start_position().row + 1;
    let end = node.end_position().row + 1;
    (start, end.max(start))
}

pub fn find_child_by_kind<'a>(node: &TSNode<'a>, kind: &str) -> Option<TSNode<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// Strip the prefix and quotes from a string literal, returning `None` for
/// byte and formatted strings. Escapes are decoded unless the literal is raw.
pub fn string_literal_value(literal: &str) -> Option<Cow<'_, str>> {
    let quote_at = literal.find(|c| c == '"' || c == '\'')?;
    let prefix = &literal[..quote_at];
    if prefix.chars().any(|c| matches!(c, 'b' | 'B' | 'f' | 'F')) {
        return None;
    }
    let raw = prefix.chars().any(|c| matches!(c, 'r' | 'R'));

    let body = &literal[quote_at..];
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if body.len() >= 2 * quote.len() && body.starts_with(quote) && body.ends_with(quote) {
            let inner = &body[quote.len()..body.len() - quote.len()];
            return Some(if raw {
                Cow::Borrowed(inner)
            } else {
                unescape(inner)
            });
        }
    }
    None
}

/// Decode the common backslash escapes; unknown ones are kept verbatim.
fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            // Line continuation.
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

/// Normalize docstring indentation: trim the first line, remove the common
/// leading whitespace of the remaining lines, drop blank leading/trailing lines.
pub fn clean_docstring(raw: &str) -> String {
    let expanded = raw.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = Vec::with_capacity(lines.len());
    cleaned.push(lines[0].trim());
    for line in &lines[1..] {
        match line.get(margin..) {
            Some(rest) => cleaned.push(rest.trim_end()),
            None => cleaned.push(line.trim()),
        }
    }

    while cleaned.first().is_some_and(|line| line.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }

    cleaned.join("\n")
}
