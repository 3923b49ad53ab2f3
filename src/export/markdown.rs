//! HTML to Markdown conversion for editor output.
//!
//! Handles the markup the editor produces: headings, paragraphs, marks, links,
//! images, lists, blockquotes, code blocks, rules and GFM tables. Unknown
//! elements are unwrapped to their children.

use regex::Regex;

use super::FormatConverter;

const VOID_TAGS: &[&str] = &[
    "br", "hr", "img", "input", "col", "meta", "link", "source", "wbr",
];

const BLOCK_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre", "hr",
    "table", "div", "section", "article", "header", "footer", "figure", "main", "aside",
];

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
}

impl Node {
    fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            Node::Text(_) => None,
        }
    }

    fn is_block(&self) -> bool {
        matches!(self, Node::Element { tag, .. } if BLOCK_TAGS.contains(&tag.as_str()))
    }
}

struct OpenElement {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl OpenElement {
    fn close(self) -> Node {
        Node::Element {
            tag: self.tag,
            attrs: self.attrs,
            children: self.children,
        }
    }
}

/// Converts editor HTML to GitHub-flavored Markdown
#[derive(Debug, Clone)]
pub struct MarkdownConverter {
    tag_re: Regex,
    attr_re: Regex,
    ws_re: Regex,
}

impl MarkdownConverter {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            tag_re: Regex::new(r"(?s)<!--.*?-->|<![^>]*>|<(/?)([A-Za-z][A-Za-z0-9]*)([^>]*)>")?,
            attr_re: Regex::new(
                r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+)))?"#,
            )?,
            ws_re: Regex::new(r"\s+")?,
        })
    }

    pub fn to_markdown(&self, html: &str) -> String {
        let nodes = self.parse(html);
        self.render_blocks(&nodes).join("\n\n").trim().to_string()
    }

    // ==================== Parsing ====================

    fn parse(&self, html: &str) -> Vec<Node> {
        let mut root: Vec<Node> = Vec::new();
        let mut stack: Vec<OpenElement> = Vec::new();
        let mut last = 0;

        for caps in self.tag_re.captures_iter(html) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            push_text(current(&mut stack, &mut root), &html[last..whole.start()]);
            last = whole.end();

            // Comments and doctype
            let Some(name) = caps.get(2) else {
                continue;
            };
            let tag = name.as_str().to_ascii_lowercase();
            let closing = caps.get(1).is_some_and(|c| !c.as_str().is_empty());
            let raw_attrs = caps.get(3).map_or("", |a| a.as_str());

            if closing {
                if let Some(pos) = stack.iter().rposition(|open| open.tag == tag) {
                    while stack.len() > pos {
                        if let Some(open) = stack.pop() {
                            current(&mut stack, &mut root).push(open.close());
                        }
                    }
                }
                continue;
            }

            let attrs = self.parse_attrs(raw_attrs);
            let self_closing = raw_attrs.trim_end().ends_with('/');
            if self_closing || VOID_TAGS.contains(&tag.as_str()) {
                current(&mut stack, &mut root).push(Node::Element {
                    tag,
                    attrs,
                    children: Vec::new(),
                });
            } else {
                stack.push(OpenElement {
                    tag,
                    attrs,
                    children: Vec::new(),
                });
            }
        }

        push_text(current(&mut stack, &mut root), &html[last..]);

        // Unclosed elements
        while let Some(open) = stack.pop() {
            current(&mut stack, &mut root).push(open.close());
        }

        root
    }

    fn parse_attrs(&self, raw: &str) -> Vec<(String, String)> {
        self.attr_re
            .captures_iter(raw)
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str().to_ascii_lowercase();
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .or_else(|| caps.get(4))
                    .map_or(String::new(), |v| decode_entities(v.as_str()));
                Some((name, value))
            })
            .collect()
    }

    // ==================== Rendering ====================

    fn render_blocks(&self, nodes: &[Node]) -> Vec<String> {
        let mut out = Vec::new();
        let mut run: Vec<Node> = Vec::new();

        for node in nodes {
            if node.is_block() {
                self.flush_inline(&mut run, &mut out);
                self.render_block(node, &mut out);
            } else {
                run.push(node.clone());
            }
        }
        self.flush_inline(&mut run, &mut out);

        out
    }

    fn flush_inline(&self, run: &mut Vec<Node>, out: &mut Vec<String>) {
        if run.is_empty() {
            return;
        }
        let text = self.render_inline(run);
        let text = text.trim();
        if !text.is_empty() {
            out.push(escape_line_starts(text));
        }
        run.clear();
    }

    fn render_block(&self, node: &Node, out: &mut Vec<String>) {
        let Node::Element { tag, children, .. } = node else {
            return;
        };

        match tag.as_str() {
            "p" => {
                let text = self.render_inline(children);
                let text = text.trim();
                if !text.is_empty() {
                    out.push(escape_line_starts(text));
                }
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                let text = self.ws_re.replace_all(&self.render_inline(children), " ").trim().to_string();
                if !text.is_empty() {
                    out.push(format!("{} {}", "#".repeat(level), text));
                }
            }
            "ul" => out.push(self.render_list(node, false)),
            "ol" => out.push(self.render_list(node, true)),
            "blockquote" => {
                let inner = self.render_blocks(children).join("\n\n");
                if !inner.is_empty() {
                    let quoted: Vec<String> = inner
                        .lines()
                        .map(|line| {
                            if line.is_empty() {
                                ">".to_string()
                            } else {
                                format!("> {line}")
                            }
                        })
                        .collect();
                    out.push(quoted.join("\n"));
                }
            }
            "pre" => out.push(self.render_code_block(node)),
            "hr" => out.push("---".to_string()),
            "table" => {
                if let Some(table) = self.render_table(node) {
                    out.push(table);
                }
            }
            _ => out.extend(self.render_blocks(children)),
        }
    }

    fn render_list(&self, node: &Node, ordered: bool) -> String {
        let Node::Element { children, .. } = node else {
            return String::new();
        };

        let mut number = node
            .attr("start")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1);
        let mut items = Vec::new();

        for child in children {
            let Node::Element { tag, children: body_nodes, .. } = child else {
                continue;
            };
            if tag != "li" {
                continue;
            }

            let marker = if ordered {
                let m = format!("{number}.");
                number += 1;
                m
            } else {
                "-".to_string()
            };
            let indent = " ".repeat(marker.len() + 1);
            let body = self.render_blocks(body_nodes).join("\n");

            let mut item = marker.clone();
            for (i, line) in body.lines().enumerate() {
                if i == 0 {
                    item.push(' ');
                    item.push_str(line);
                } else if line.is_empty() {
                    item.push('\n');
                } else {
                    item.push('\n');
                    item.push_str(&indent);
                    item.push_str(line);
                }
            }
            items.push(item);
        }

        items.join("\n")
    }

    fn render_code_block(&self, node: &Node) -> String {
        let language = find_child(node, "code")
            .and_then(|code| code.attr("class"))
            .and_then(|class| {
                class
                    .split_whitespace()
                    .find_map(|c| c.strip_prefix("language-"))
            })
            .unwrap_or("");

        let code = text_content(node);
        let code = code.trim_end_matches('\n');
        format!("```{language}\n{code}\n```")
    }

    fn render_table(&self, node: &Node) -> Option<String> {
        let mut rows = Vec::new();
        collect_rows(node, &mut rows);

        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                let Node::Element { children, .. } = row else {
                    return Vec::new();
                };
                children
                    .iter()
                    .filter(|c| matches!(c, Node::Element { tag, .. } if tag == "th" || tag == "td"))
                    .map(|cell| self.render_cell(cell))
                    .collect()
            })
            .filter(|cells: &Vec<String>| !cells.is_empty())
            .collect();

        let width = rows.iter().map(Vec::len).max()?;
        let format_row = |cells: &[String]| {
            let mut padded: Vec<&str> = cells.iter().map(String::as_str).collect();
            padded.resize(width, "");
            format!("| {} |", padded.join(" | "))
        };

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(format_row(&rows[0]));
        lines.push(format!("|{}", " --- |".repeat(width)));
        for row in &rows[1..] {
            lines.push(format_row(row));
        }
        Some(lines.join("\n"))
    }

    fn render_cell(&self, cell: &Node) -> String {
        let Node::Element { children, .. } = cell else {
            return String::new();
        };
        let parts: Vec<String> = children
            .iter()
            .map(|child| self.render_inline(std::slice::from_ref(child)))
            .collect();
        let text = parts.join(" ").replace('|', "\\|");
        self.ws_re.replace_all(&text, " ").trim().to_string()
    }

    fn render_inline(&self, nodes: &[Node]) -> String {
        let mut out = String::new();

        for node in nodes {
            match node {
                Node::Text(text) => {
                    let collapsed = self.ws_re.replace_all(text, " ");
                    out.push_str(&escape_markdown(&collapsed));
                }
                Node::Element { tag, children, .. } => match tag.as_str() {
                    "strong" | "b" => out.push_str(&wrap(&self.render_inline(children), "**")),
                    "em" | "i" => out.push_str(&wrap(&self.render_inline(children), "_")),
                    "s" | "del" | "strike" => {
                        out.push_str(&wrap(&self.render_inline(children), "~~"))
                    }
                    "code" => {
                        let code = text_content(node);
                        if !code.is_empty() {
                            out.push_str(&inline_code(&code));
                        }
                    }
                    "a" => {
                        let text = self.render_inline(children);
                        match node.attr("href") {
                            Some(href) if !href.is_empty() => {
                                out.push_str(&format!("[{}]({})", text.trim(), href))
                            }
                            _ => out.push_str(&text),
                        }
                    }
                    "img" => {
                        if let Some(src) = node.attr("src") {
                            let alt = node.attr("alt").unwrap_or("");
                            out.push_str(&format!("![{alt}]({src})"));
                        }
                    }
                    "br" => out.push_str("  \n"),
                    _ => out.push_str(&self.render_inline(children)),
                },
            }
        }

        out
    }
}

impl FormatConverter for MarkdownConverter {
    fn convert(&self, markup: &str) -> String {
        self.to_markdown(markup)
    }
}

fn current<'a>(stack: &'a mut [OpenElement], root: &'a mut Vec<Node>) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(open) => &mut open.children,
        None => root,
    }
}

fn push_text(children: &mut Vec<Node>, raw: &str) {
    if !raw.is_empty() {
        children.push(Node::Text(decode_entities(raw)));
    }
}

fn find_child<'a>(node: &'a Node, name: &str) -> Option<&'a Node> {
    match node {
        Node::Element { children, .. } => children
            .iter()
            .find(|c| matches!(c, Node::Element { tag, .. } if tag == name)),
        Node::Text(_) => None,
    }
}

fn collect_rows<'a>(node: &'a Node, rows: &mut Vec<&'a Node>) {
    if let Node::Element { children, .. } = node {
        for child in children {
            if let Node::Element { tag, .. } = child {
                match tag.as_str() {
                    "tr" => rows.push(child),
                    "thead" | "tbody" | "tfoot" => collect_rows(child, rows),
                    _ => {}
                }
            }
        }
    }
}

/// Raw text of a subtree, line breaks preserved
fn text_content(node: &Node) -> String {
    match node {
        Node::Text(text) => text.clone(),
        Node::Element { tag, children, .. } => {
            if tag == "br" {
                return "\n".to_string();
            }
            children.iter().map(text_content).collect()
        }
    }
}

/// Wrap inline content in a delimiter, keeping surrounding spaces outside
fn wrap(inner: &str, delimiter: &str) -> String {
    let core = inner.trim();
    if core.is_empty() {
        return inner.to_string();
    }
    let leading = &inner[..inner.len() - inner.trim_start().len()];
    let trailing = &inner[inner.trim_end().len()..];
    format!("{leading}{delimiter}{core}{delimiter}{trailing}")
}

fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape text that would otherwise open a list, heading, quote or setext
/// underline at the start of a line
fn escape_line_starts(text: &str) -> String {
    text.split('\n')
        .map(escape_line_start)
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_line_start(line: &str) -> String {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];

    if body.starts_with(['-', '>', '=']) || body.starts_with("+ ") {
        return format!("{indent}\\{body}");
    }

    let hashes = body.len() - body.trim_start_matches('#').len();
    if (1..=6).contains(&hashes) && body[hashes..].starts_with(' ') {
        return format!("{indent}\\{body}");
    }

    let digits = body.len() - body.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 && body[digits..].starts_with(". ") {
        return format!("{indent}{}\\{}", &body[..digits], &body[digits..]);
    }

    line.to_string()
}

/// Inline code span with a fence longer than any backtick run inside it
fn inline_code(code: &str) -> String {
    let longest_run = code
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run + 1);
    if longest_run > 0 {
        format!("{fence} {code} {fence}")
    } else {
        format!("{fence}{code}{fence}")
    }
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    }
}
