use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info};

use crate::interrupt::Interrupt;

/// The jar being converted. A downloaded jar is deleted when this drops; a
/// local one is left alone.
pub enum JarSource {
    Local(PathBuf),
    Downloaded(NamedTempFile),
}

impl JarSource {
    pub fn path(&self) -> &Path {
        match self {
            Self::Local(path) => path,
            Self::Downloaded(file) => file.path(),
        }
    }
}

/// Unpack `jar` into a fresh directory under `scratch_root`, removed on drop.
pub fn extract_jar(jar: &Path, scratch_root: &Path, interrupt: &Interrupt) -> Result<TempDir> {
    let scratch = tempfile::Builder::new()
        .prefix("jdoc2md_extract_")
        .tempdir_in(scratch_root)
        .with_context(|| {
            format!("Failed to create extraction directory in {}", scratch_root.display())
        })?;
    interrupt.register_scratch(scratch.path());

    let file = File::open(jar).with_context(|| format!("Failed to open {}", jar.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid jar archive", jar.display()))?;

    info!("Extracting {} entries from {}", archive.len(), jar.display());
    archive
        .extract(scratch.path())
        .with_context(|| format!("Failed to extract {}", jar.display()))?;

    debug!("Extracted to {}", scratch.path().display());
    Ok(scratch)
}

/// In-memory jar with the given `(path, contents)` entries.
#[cfg(test)]
pub fn jar_bytes<B: AsRef<[u8]>>(entries: &[(&str, B)]) -> Vec<u8> {
    use std::io::Write;

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents.as_ref()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

// ── Tests ──
