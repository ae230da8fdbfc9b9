use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::converter::MarkdownConverter;
use crate::discovery::ClassPage;
use crate::interrupt::Interrupt;

pub struct ConvertStats {
    pub converted: usize,
    pub empty: usize,
}

/// Convert every page into `out_dir`, one at a time. The first failing page
/// aborts the batch.
pub fn convert_pages(
    pages: &[ClassPage],
    out_dir: &Path,
    interrupt: &Interrupt,
) -> Result<ConvertStats> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let converter = MarkdownConverter::new();
    let pb = ProgressBar::new(pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
                 {pos}/{len} ({per_sec}) {msg}",
            )?
            .progress_chars("#>-"),
    );
    pb.set_message("Converting class HTML to Markdown");

    let mut stats = ConvertStats {
        converted: 0,
        empty: 0,
    };

    for page in pages {
        interrupt.check()?;

        let written = convert_one(&converter, page, out_dir)
            .with_context(|| format!("Failed to convert {}", page.relative.display()))?;
        if !written {
            stats.empty += 1;
        }
        stats.converted += 1;
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "Converted {} pages ({} without documentation content)",
        stats.converted, stats.empty
    );
    Ok(stats)
}

/// Returns whether any Markdown content was produced.
fn convert_one(converter: &MarkdownConverter, page: &ClassPage, out_dir: &Path) -> Result<bool> {
    let html = std::fs::read_to_string(&page.source)
        .with_context(|| format!("Failed to read {}", page.source.display()))?;
    let markdown = converter.convert_page(&html)?;

    let dest = page.output_path(out_dir);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&dest, &markdown)
        .with_context(|| format!("Failed to write {}", dest.display()))?;

    debug!("{} -> {}", page.relative.display(), dest.display());
    Ok(!markdown.is_empty())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::discover_class_pages;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><body><main><section class="summary"><p>Docs for <a href="x.html">it</a></p></section></main></body></html>"#;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn mirrors_directory_structure() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(src.path(), "com/example/Foo.html", PAGE);
        write(src.path(), "com/example/Bar.html", PAGE);
        write(src.path(), "org/other/Baz.html", "<html><body>no main</body></html>");

        let pages = discover_class_pages(src.path()).unwrap();
        let dest = out.path().join("demo-1.0");
        let stats = convert_pages(&pages, &dest, &Interrupt::default()).unwrap();

        assert_eq!(stats.converted, 3);
        assert_eq!(stats.empty, 1);
        let foo = std::fs::read_to_string(dest.join("com/example/Foo.md")).unwrap();
        assert!(foo.contains("Docs for it"));
        assert!(dest.join("com/example/Bar.md").is_file());
        assert_eq!(std::fs::read_to_string(dest.join("org/other/Baz.md")).unwrap(), "");
        assert!(!dest.join("com/example/Foo.html").exists());
    }

    #[test]
    fn overwrites_existing_output() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(src.path(), "Foo.html", PAGE);
        write(out.path(), "Foo.md", "stale");

        let pages = discover_class_pages(src.path()).unwrap();
        convert_pages(&pages, out.path(), &Interrupt::default()).unwrap();
        let foo = std::fs::read_to_string(out.path().join("Foo.md")).unwrap();
        assert!(!foo.contains("stale"));
    }

    #[test]
    fn unreadable_page_aborts_batch() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(src.path(), "a/Good.html", PAGE);
        std::fs::write(src.path().join("Bad.html"), [0xff, 0xfe, 0x00]).unwrap();

        let pages = discover_class_pages(src.path()).unwrap();
        let err = convert_pages(&pages, out.path(), &Interrupt::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("Bad.html"));
        // Bad.html sorts first, so nothing after it was written
        assert!(!out.path().join("a/Good.md").exists());
    }

    #[test]
    fn interrupt_stops_before_next_page() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        write(src.path(), "Foo.html", PAGE);

        let interrupt = Interrupt::default();
        interrupt.trigger();
        let pages = discover_class_pages(src.path()).unwrap();
        assert!(convert_pages(&pages, out.path(), &interrupt).is_err());
        assert!(!out.path().join("Foo.md").exists());
    }
}
