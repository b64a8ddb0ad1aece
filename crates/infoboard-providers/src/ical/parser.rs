//! Recursive-descent parser for iCalendar-style text.
//!
//! The grammar is line oriented:
//!
//! ```text
//! BEGIN:VCALENDAR
//! VERSION:2.0
//! BEGIN:VEVENT
//! SUMMARY:Lecture\, part 2
//! END:VEVENT
//! END:VCALENDAR
//! ```
//!
//! `BEGIN:<name>` opens a child node, `END:<name>` closes the current one and
//! every other non-blank line is a `key:value` property. Keys keep their
//! parameters (`DTSTART;TZID=Europe/Helsinki`), so lookups use the full
//! key as written in the feed.

use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

/// Nesting deeper than this is rejected rather than recursed into.
const MAX_DEPTH: usize = 32;

/// Errors raised while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("failed to find a root node")]
    MissingRoot,

    #[error("root node is {0:?}, expected VCALENDAR")]
    WrongRoot(String),

    #[error("line {line}: content before the root node")]
    ContentBeforeRoot { line: usize },

    #[error("line {line}: failed to parse property {content:?}")]
    MissingColon { line: usize, content: String },

    #[error("line {line}: nodes nested deeper than {MAX_DEPTH}")]
    TooDeep { line: usize },
}

/// A parsed node with its properties and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    name: String,
    properties: Vec<(String, String)>,
    children: HashMap<String, Vec<Node>>,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First value stored under `key`, or `""` when there is none.
    pub fn get(&self, key: &str) -> &str {
        self.find(key).unwrap_or("")
    }

    /// First value stored under `key`.
    pub fn find(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All properties in feed order, duplicates included.
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Children called `name`, in feed order.
    pub fn children(&self, name: &str) -> &[Node] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Parses `text` into a tree rooted at `VCALENDAR`.
pub fn parse(text: &str) -> Result<Node, ParseError> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

    while let Some((number, line)) = lines.next() {
        let line = trim(line);
        if line.is_empty() {
            continue;
        }

        let Some(root) = line.strip_prefix("BEGIN:") else {
            return Err(ParseError::ContentBeforeRoot { line: number });
        };

        let root = trim(root);
        if root != "VCALENDAR" {
            return Err(ParseError::WrongRoot(root.to_string()));
        }

        return parse_node(&mut lines, root, 0);
    }

    Err(ParseError::MissingRoot)
}

fn parse_node<'a, I>(lines: &mut I, name: &str, depth: usize) -> Result<Node, ParseError>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut node = Node {
        name: name.to_string(),
        ..Node::default()
    };

    while let Some((number, line)) = lines.next() {
        let line = trim(line);
        if line.is_empty() {
            continue;
        }

        if let Some(end) = line.strip_prefix("END:") {
            let end = trim(end);
            if end != name {
                warn!(line = number, expected = name, found = end, "mismatched END tag");
            }
            return Ok(node);
        }

        if let Some(child) = line.strip_prefix("BEGIN:") {
            if depth + 1 >= MAX_DEPTH {
                return Err(ParseError::TooDeep { line: number });
            }
            let child = trim(child);
            let parsed = parse_node(lines, child, depth + 1)?;
            node.children
                .entry(child.to_string())
                .or_default()
                .push(parsed);
            continue;
        }

        node.properties.push(parse_property(number, line)?);
    }

    // EOF closes whatever is still open
    Ok(node)
}

fn parse_property(number: usize, line: &str) -> Result<(String, String), ParseError> {
    let (key, value) = line.split_once(':').ok_or_else(|| ParseError::MissingColon {
        line: number,
        content: line.to_string(),
    })?;

    Ok((trim(key).to_string(), trim(value).replace("\\,", ",")))
}

fn trim(s: &str) -> &str {
    s.trim_matches([' ', '\r'])
}
