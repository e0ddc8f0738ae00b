//! Flowchart mini-language: parsing and terminal rendering.
//!
//! The summary service emits diagrams in a small Mermaid-style dialect:
//!
//! ```text
//! flowchart TD
//!   A[Cats] --> B[Mammals]
//!   C[Dogs] --> B
//! ```
//!
//! [`parse_flowchart`] turns that text into a [`Flowchart`] value and
//! reports the first syntax problem with a 1-based line number.
//! [`render_unicode`] lays the parsed graph out as ranked rows of
//! box-drawn nodes with one connector line per edge, which is how the
//! diagram pane displays it.
//!
//! Supported subset: a `flowchart`/`graph` header with `TD`/`TB`/`LR`,
//! node shapes `[box]`, `(round)`, `{diamond}`, `((circle))`, edge
//! operators `-->`, `---`, `-.->` and `==>` with optional `|label|`,
//! `%%` comment lines, and chained statements (`A --> B --> C`).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ViewError;

/// Reading order declared in the diagram header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// `TD` / `TB`: edges flow downward.
    #[default]
    TopDown,
    /// `LR`: edges flow rightward.
    LeftRight,
}

/// Visual shape of a node, chosen by its bracket style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeShape {
    #[default]
    Box,
    Round,
    Diamond,
    Circle,
}

/// A declared or referenced node. Bare references (`A` with no brackets)
/// get their identifier as label and the default shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
}

/// Connector style between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// `-->`
    Arrow,
    /// `---`
    Open,
    /// `-.->`
    DottedArrow,
    /// `==>`
    ThickArrow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub label: Option<String>,
}

/// A parsed diagram. Nodes are kept in first-appearance order, edges in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Flowchart {
    pub direction: Direction,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*").expect("ident pattern"));

fn syntax(line: usize, detail: impl Into<String>) -> ViewError {
    ViewError::DiagramSyntax {
        line,
        detail: detail.into(),
    }
}

/// Parse diagram source into a [`Flowchart`].
///
/// The first non-blank, non-comment line must be the header. Errors carry
/// the 1-based line number of the offending line.
pub fn parse_flowchart(source: &str) -> Result<Flowchart, ViewError> {
    let mut parser = Parser::default();
    let mut saw_header = false;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let mut line = raw.trim();
        if let Some(stripped) = line.strip_suffix(';') {
            line = stripped.trim_end();
        }
        if line.is_empty() || line.starts_with("%%") {
            continue;
        }
        if !saw_header {
            parser.parse_header(line, line_no)?;
            saw_header = true;
            continue;
        }
        parser.parse_statement(line, line_no)?;
    }

    if !saw_header {
        return Err(syntax(1, "missing `flowchart` or `graph` header"));
    }
    Ok(parser.chart)
}

/// Parse and render in one step.
pub fn render_flowchart(source: &str) -> Result<String, ViewError> {
    let chart = parse_flowchart(source)?;
    Ok(render_unicode(&chart))
}

#[derive(Default)]
struct Parser {
    chart: Flowchart,
    /// Ids whose label and shape came from an explicit declaration.
    /// First explicit declaration wins; bare references may be upgraded.
    explicit: Vec<String>,
    index: HashMap<String, usize>,
}

impl Parser {
    fn parse_header(&mut self, line: &str, line_no: usize) -> Result<(), ViewError> {
        let mut words = line.split_whitespace();
        let keyword = words.next().unwrap_or_default();
        if keyword != "flowchart" && keyword != "graph" {
            return Err(syntax(line_no, "missing `flowchart` or `graph` header"));
        }
        let direction = words
            .next()
            .ok_or_else(|| syntax(line_no, format!("missing direction after `{keyword}`")))?;
        if let Some(extra) = words.next() {
            return Err(syntax(
                line_no,
                format!("unexpected `{extra}` after direction"),
            ));
        }
        self.chart.direction = match direction {
            "TD" | "TB" => Direction::TopDown,
            "LR" => Direction::LeftRight,
            other => {
                return Err(syntax(line_no, format!("unknown direction `{other}`")));
            }
        };
        Ok(())
    }

    /// One statement: a node, optionally chained onward by edges.
    fn parse_statement(&mut self, line: &str, line_no: usize) -> Result<(), ViewError> {
        let (mut from, mut rest) = self.parse_node(line, line_no)?;
        rest = rest.trim_start();
        while !rest.is_empty() {
            let (kind, label, after_edge) = parse_edge(rest, line_no)?;
            rest = after_edge.trim_start();
            if rest.is_empty() {
                return Err(syntax(line_no, "edge is missing a target node"));
            }
            let (to, after_node) = self.parse_node(rest, line_no)?;
            rest = after_node.trim_start();
            self.chart.edges.push(Edge {
                from: from.clone(),
                to: to.clone(),
                kind,
                label,
            });
            from = to;
        }
        Ok(())
    }

    /// An identifier plus optional shape brackets. Returns the id and the
    /// unconsumed remainder of the line.
    fn parse_node<'a>(
        &mut self,
        input: &'a str,
        line_no: usize,
    ) -> Result<(String, &'a str), ViewError> {
        let m = IDENT.find(input).ok_or_else(|| {
            let snippet: String = input.chars().take(12).collect();
            syntax(line_no, format!("expected a node identifier near `{snippet}`"))
        })?;
        let id = m.as_str().to_string();
        let rest = &input[m.end()..];

        let (opener, closer, shape) = if rest.starts_with("((") {
            ("((", "))", NodeShape::Circle)
        } else if rest.starts_with('(') {
            ("(", ")", NodeShape::Round)
        } else if rest.starts_with('[') {
            ("[", "]", NodeShape::Box)
        } else if rest.starts_with('{') {
            ("{", "}", NodeShape::Diamond)
        } else {
            self.register(&id, None);
            return Ok((id, rest));
        };

        let body = &rest[opener.len()..];
        let (label, after) = take_label(body, closer, &id, line_no)?;
        if label.is_empty() {
            return Err(syntax(line_no, format!("empty label on node `{id}`")));
        }
        self.register(&id, Some((label, shape)));
        Ok((id, after))
    }

    fn register(&mut self, id: &str, declared: Option<(String, NodeShape)>) {
        match self.index.get(id) {
            Some(&i) => {
                if let Some((label, shape)) = declared {
                    if !self.explicit.iter().any(|e| e == id) {
                        let node = &mut self.chart.nodes[i];
                        node.label = label;
                        node.shape = shape;
                        self.explicit.push(id.to_string());
                    }
                }
            }
            None => {
                let (label, shape, is_explicit) = match declared {
                    Some((label, shape)) => (label, shape, true),
                    None => (id.to_string(), NodeShape::default(), false),
                };
                self.index.insert(id.to_string(), self.chart.nodes.len());
                self.chart.nodes.push(Node {
                    id: id.to_string(),
                    label,
                    shape,
                });
                if is_explicit {
                    self.explicit.push(id.to_string());
                }
            }
        }
    }
}

/// Label text between an opener and its closer. Double quotes around the
/// whole label are stripped and protect closer characters inside.
fn take_label<'a>(
    body: &'a str,
    closer: &str,
    id: &str,
    line_no: usize,
) -> Result<(String, &'a str), ViewError> {
    if let Some(quoted) = body.strip_prefix('"') {
        let end = quoted
            .find('"')
            .ok_or_else(|| syntax(line_no, format!("unterminated quote in node `{id}`")))?;
        let label = quoted[..end].to_string();
        let after = quoted[end + 1..].strip_prefix(closer).ok_or_else(|| {
            syntax(line_no, format!("expected `{closer}` after label of `{id}`"))
        })?;
        return Ok((label, after));
    }
    let end = body
        .find(closer)
        .ok_or_else(|| syntax(line_no, format!("unclosed bracket on node `{id}`")))?;
    Ok((body[..end].trim().to_string(), &body[end + closer.len()..]))
}

/// One edge operator plus its optional `|label|`.
fn parse_edge<'a>(
    input: &'a str,
    line_no: usize,
) -> Result<(EdgeKind, Option<String>, &'a str), ViewError> {
    let (kind, rest) = if let Some(rest) = input.strip_prefix("-.->") {
        (EdgeKind::DottedArrow, rest)
    } else if let Some(rest) = input.strip_prefix("==>") {
        (EdgeKind::ThickArrow, rest)
    } else if input.starts_with("--") {
        let dashes = input.chars().take_while(|c| *c == '-').count();
        let after = &input[dashes..];
        if let Some(rest) = after.strip_prefix('>') {
            (EdgeKind::Arrow, rest)
        } else if dashes >= 3 {
            (EdgeKind::Open, after)
        } else {
            return Err(syntax(line_no, "expected `-->` or `---` between nodes"));
        }
    } else {
        let snippet: String = input.chars().take(12).collect();
        return Err(syntax(
            line_no,
            format!("expected arrow or end of line, found `{snippet}`"),
        ));
    };

    let rest = rest.trim_start();
    if let Some(body) = rest.strip_prefix('|') {
        let end = body
            .find('|')
            .ok_or_else(|| syntax(line_no, "unterminated edge label"))?;
        let label = body[..end].trim().to_string();
        let label = if label.is_empty() { None } else { Some(label) };
        return Ok((kind, label, &body[end + 1..]));
    }
    Ok((kind, None, rest))
}

/// Lay the graph out as ranked rows of framed nodes.
///
/// A node's rank is the longest edge path leading to it, so sources sit in
/// the first row and each edge points at a later row. After each row the
/// edges leaving it are listed one per line. Cycles are tolerated; rank
/// relaxation simply stops after `nodes.len()` passes.
pub fn render_unicode(chart: &Flowchart) -> String {
    if chart.nodes.is_empty() {
        return String::new();
    }
    let index: HashMap<&str, usize> = chart
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let ranks = assign_ranks(chart, &index);
    let max_rank = ranks.iter().copied().max().unwrap_or(0);

    let mut out = String::new();
    for rank in 0..=max_rank {
        let row: Vec<&Node> = chart
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| ranks[*i] == rank)
            .map(|(_, n)| n)
            .collect();
        if row.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        let cells: Vec<[String; 3]> = row.iter().map(|n| framed_cell(n)).collect();
        for line_idx in 0..3 {
            let line = cells
                .iter()
                .map(|cell| cell[line_idx].as_str())
                .collect::<Vec<_>>()
                .join("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        }
        for edge in &chart.edges {
            let Some(&from_idx) = index.get(edge.from.as_str()) else {
                continue;
            };
            if ranks[from_idx] != rank {
                continue;
            }
            let Some(&to_idx) = index.get(edge.to.as_str()) else {
                continue;
            };
            let glyph = match edge.kind {
                EdgeKind::Arrow => "─▶",
                EdgeKind::Open => "──",
                EdgeKind::DottedArrow => "┄▶",
                EdgeKind::ThickArrow => "═▶",
            };
            out.push_str("  ");
            out.push_str(&chart.nodes[from_idx].label);
            out.push(' ');
            out.push_str(glyph);
            out.push(' ');
            out.push_str(&chart.nodes[to_idx].label);
            if let Some(label) = &edge.label {
                out.push_str(" [");
                out.push_str(label);
                out.push(']');
            }
            out.push('\n');
        }
    }
    out
}

fn assign_ranks(chart: &Flowchart, index: &HashMap<&str, usize>) -> Vec<usize> {
    let mut ranks = vec![0usize; chart.nodes.len()];
    for _ in 0..chart.nodes.len() {
        let mut changed = false;
        for edge in &chart.edges {
            let (Some(&from), Some(&to)) =
                (index.get(edge.from.as_str()), index.get(edge.to.as_str()))
            else {
                continue;
            };
            if ranks[to] < ranks[from] + 1 {
                ranks[to] = ranks[from] + 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    ranks
}

fn framed_cell(node: &Node) -> [String; 3] {
    let text = match node.shape {
        NodeShape::Box => node.label.clone(),
        NodeShape::Round => format!("( {} )", node.label),
        NodeShape::Diamond => format!("< {} >", node.label),
        NodeShape::Circle => format!("(( {} ))", node.label),
    };
    let bar = "─".repeat(text.chars().count() + 2);
    let (tl, tr, bl, br) = match node.shape {
        NodeShape::Round | NodeShape::Circle => ('╭', '╮', '╰', '╯'),
        NodeShape::Box | NodeShape::Diamond => ('┌', '┐', '└', '┘'),
    };
    [
        format!("{tl}{bar}{tr}"),
        format!("│ {text} │"),
        format!("{bl}{bar}{br}"),
    ]
}
