pub mod blocks;
pub mod render;

use std::sync::LazyLock;

use anyhow::{Context, Result};
use htmd::options::{HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use regex::Regex;
use scraper::Html;
use tracing::debug;

use render::Renderer;

static BLANK_RUNS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Turns one javadoc class page into Markdown: keep the documentation
/// blocks of `<main>`, flatten links, render with ATX headings.
pub struct MarkdownConverter {
    htmd: HtmlToMarkdown,
}

impl MarkdownConverter {
    pub fn new() -> Self {
        let htmd = HtmlToMarkdown::builder()
            .options(Options {
                heading_style: HeadingStyle::Atx,
                ..Default::default()
            })
            .build();
        Self { htmd }
    }

    /// Empty output (not an error) when the page has no `<main>` or nothing
    /// in it survives the filter.
    pub fn convert_page(&self, html: &str) -> Result<String> {
        let sections = extract_class_sections(html);
        if sections.html.is_empty() {
            return Ok(String::new());
        }

        let markdown = self
            .htmd
            .convert(&sections.html.join("\n\n"))
            .context("Failed to convert HTML to Markdown")?;
        // collapse before restoring so blank lines inside code survive
        let markdown = BLANK_RUNS_RE.replace_all(markdown.trim(), "\n\n");
        let markdown = sections.renderer.restore(&markdown);
        if markdown.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{markdown}\n"))
    }
}

/// Kept blocks rendered for htmd, plus the code and tables held back from it.
pub struct ClassSections {
    pub html: Vec<String>,
    pub renderer: Renderer,
}

/// Filtered HTML of each kept block, in document order.
pub fn extract_class_sections(html: &str) -> ClassSections {
    let mut renderer = Renderer::default();
    let document = Html::parse_document(html);
    let Some(blocks) = blocks::main_blocks(&document) else {
        debug!("Page has no <main> element");
        return ClassSections {
            html: Vec::new(),
            renderer,
        };
    };

    let html = blocks
        .iter()
        .filter(|b| b.is_kept())
        .map(|b| renderer.render_block(b))
        .collect();
    ClassSections { html, renderer }
}

// ── Tests ──
