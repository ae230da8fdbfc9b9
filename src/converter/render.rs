use std::sync::LazyLock;

use html_escape::{encode_double_quoted_attribute_to_string, encode_text_to_string};
use regex::{Captures, Regex};
use scraper::node::Node;
use scraper::{ElementRef, Selector};

use super::blocks::{is_dropped, ContentBlock};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Raw-text elements whose body is never documentation.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(.*?)JDOC2MDBLOCK(\d+)END").unwrap());

/// Serializes kept blocks back to HTML for htmd.
///
/// `<pre>` and `<table>` are rendered to Markdown here and left in the HTML
/// as placeholder paragraphs, so htmd cannot unfence code or flatten rows.
/// [`Renderer::restore`] swaps the Markdown back in after conversion.
#[derive(Debug, Default)]
pub struct Renderer {
    protected: Vec<String>,
}

impl Renderer {
    /// Drops dropped descendants and replaces every `<a>` with its visible text.
    pub fn render_block(&mut self, block: &ContentBlock) -> String {
        let mut out = String::new();
        self.write_element(&block.element, &mut out);
        out
    }

    /// Put protected Markdown back, indented to match the line the
    /// placeholder ended up on (list items indent their content).
    pub fn restore(&self, markdown: &str) -> String {
        PLACEHOLDER_RE
            .replace_all(markdown, |caps: &Captures| {
                let prefix = &caps[1];
                let Some(block) = caps[2].parse::<usize>().ok().and_then(|i| self.protected.get(i))
                else {
                    return caps[0].to_string();
                };
                let indent = " ".repeat(prefix.chars().count());
                let mut lines = block.lines();
                let mut restored = format!("{prefix}{}", lines.next().unwrap_or_default());
                for line in lines {
                    restored.push('\n');
                    if !line.is_empty() {
                        restored.push_str(&indent);
                        restored.push_str(line);
                    }
                }
                restored
            })
            .into_owned()
    }

    fn protect(&mut self, markdown: String, out: &mut String) {
        out.push_str(&format!("<p>JDOC2MDBLOCK{}END</p>", self.protected.len()));
        self.protected.push(markdown);
    }

    fn write_element(&mut self, element: &ElementRef, out: &mut String) {
        let name = element.value().name();
        out.push('<');
        out.push_str(name);
        for (attr, value) in element.value().attrs() {
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            encode_double_quoted_attribute_to_string(value, out);
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }

        self.write_children(element, out);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }

    fn write_children(&mut self, element: &ElementRef, out: &mut String) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    encode_text_to_string(&**text, out);
                }
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if is_dropped(&child) {
                        continue;
                    }
                    match child.value().name() {
                        "a" => {
                            encode_text_to_string(visible_text(&child), out);
                        }
                        "pre" => self.protect(fenced_code(&child), out),
                        "table" => self.protect(pipe_table(&child), out),
                        name if SKIPPED_ELEMENTS.contains(&name) => {}
                        _ => self.write_element(&child, out),
                    }
                }
                // comments, doctypes, processing instructions
                _ => {}
            }
        }
    }
}

fn visible_text(element: &ElementRef) -> String {
    let mut text = String::new();
    collect_text(element, &mut text);
    text
}

fn collect_text(element: &ElementRef, text: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    let skipped = SKIPPED_ELEMENTS.contains(&child.value().name());
                    if !skipped && !is_dropped(&child) {
                        collect_text(&child, text);
                    }
                }
            }
            _ => {}
        }
    }
}

/// ```` ``` ```` fence around the `<pre>` text, longer if the code holds backticks.
fn fenced_code(pre: &ElementRef) -> String {
    let code = visible_text(pre);
    let code = code.trim_end_matches(['\n', '\r']);

    let longest_run = code
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest_run.max(2) + 1);
    format!("{fence}\n{code}\n{fence}")
}

/// GitHub-style pipe table; the first row becomes the header.
fn pipe_table(table: &ElementRef) -> String {
    let rows: Vec<Vec<String>> = table
        .select(&ROW_SELECTOR)
        .filter(|row| row_of(row, table) && !is_dropped(row))
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th") && !is_dropped(cell))
                .map(|cell| table_cell(&cell))
                .collect::<Vec<_>>()
        })
        .filter(|cells| !cells.is_empty())
        .collect();

    let caption = table
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "caption")
        .map(|c| table_cell(&c))
        .filter(|c| !c.is_empty());

    let mut out = String::new();
    if let Some(caption) = caption {
        out.push_str(&caption);
        out.push_str("\n\n");
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return out.trim_end().to_string();
    }

    for (idx, row) in rows.iter().enumerate() {
        out.push('|');
        for col in 0..columns {
            out.push(' ');
            out.push_str(row.get(col).map(String::as_str).unwrap_or(""));
            out.push_str(" |");
        }
        out.push('\n');
        if idx == 0 {
            out.push('|');
            out.push_str(&" --- |".repeat(columns));
            out.push('\n');
        }
    }
    out.trim_end().to_string()
}

/// Rows of nested tables belong to their own table, not this one.
fn row_of(row: &ElementRef, table: &ElementRef) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
        .is_some_and(|owner| owner.id() == table.id())
}

/// One-line cell text, safe inside a pipe table.
fn table_cell(cell: &ElementRef) -> String {
    let text = visible_text(cell);
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '|' | '*' | '_' | '`' | '[' | ']' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            c => escaped.push(c),
        }
    }
    escaped
}

// ── Tests ──
