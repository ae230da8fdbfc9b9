use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use jwalk::{Parallelism, WalkDir};
use tracing::debug;

/// Javadoc pages that document no single class.
const NON_CLASS_PREFIXES: &[&str] = &[
    "index",
    "overview",
    "allclasses",
    "allpackages",
    "constant-values",
    "deprecated-list",
    "help",
    "search",
    "serialized-form",
];

/// One class page inside the unpacked archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPage {
    pub source: PathBuf,
    pub relative: PathBuf,
}

impl ClassPage {
    /// Mirrored Markdown destination under `out_dir`.
    pub fn output_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(self.relative.with_extension("md"))
    }
}

pub fn is_class_page(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".html")
        && !NON_CLASS_PREFIXES
            .iter()
            .any(|prefix| file_name.starts_with(prefix))
}

/// Walk `root` serially and collect every class page, sorted by relative path.
pub fn discover_class_pages(root: &Path) -> Result<Vec<ClassPage>> {
    let mut pages = Vec::new();

    for entry in WalkDir::new(root)
        .parallelism(Parallelism::Serial)
        .skip_hidden(false)
        .follow_links(false)
    {
        let entry = entry.map_err(|e| anyhow!("Failed to walk {}: {}", root.display(), e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            debug!("Skipping non UTF-8 file name: {:?}", entry.file_name());
            continue;
        };
        if !is_class_page(name) {
            continue;
        }

        let source = entry.path();
        let relative = source.strip_prefix(root)?.to_path_buf();
        pages.push(ClassPage { source, relative });
    }

    pages.sort_by(|a, b| a.relative.cmp(&b.relative));
    debug!("Discovered {} class pages under {}", pages.len(), root.display());
    Ok(pages)
}

// ── Tests ──
