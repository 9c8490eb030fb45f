//! Turning files on disk into [`Document`]s.
//!
//! Text and Markdown files become one document each. PDF files are
//! extracted with `pdf-extract` (feature `pdf`) and split into one
//! document per page so answers can cite page numbers.

use std::path::Path;

use anyhow::{Context, Result, bail};
use studymate_rag::Document;
use tracing::{debug, info, warn};

/// Form feed; `pdf-extract` ends every page with one.
const PAGE_BREAK: char = '\u{c}';

/// Split extracted PDF text into one document per non-blank page.
///
/// Page numbers are one-based and count blank pages, so they match the
/// page numbers of the file.
pub fn split_pages(name: &str, text: &str) -> Vec<Document> {
    text.split(PAGE_BREAK)
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(i, page)| Document::from_page(name, i as u32 + 1, page.trim()))
        .collect()
}

/// Load a single file.
///
/// # Errors
///
/// Fails on I/O errors, on unsupported extensions, and on PDFs when the
/// `pdf` feature is disabled.
pub fn load_path(path: &Path) -> Result<Vec<Document>> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let extension =
        path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase()).unwrap_or_default();

    let documents = match extension.as_str() {
        "txt" | "md" | "markdown" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            if text.trim().is_empty() {
                warn!(file = %path.display(), "file contains no text");
            }
            vec![Document::new(name, text).with_metadata("path", path.display().to_string())]
        }
        "pdf" => load_pdf(path, &name)?,
        other => bail!("unsupported file type '.{other}' for {}", path.display()),
    };

    debug!(file = %path.display(), documents = documents.len(), "loaded file");
    Ok(documents)
}

#[cfg(feature = "pdf")]
fn load_pdf(path: &Path, name: &str) -> Result<Vec<Document>> {
    let text = pdf_extract::extract_text(path)
        .with_context(|| format!("failed to extract text from {}", path.display()))?;
    let pages = split_pages(name, &text);
    if pages.is_empty() {
        warn!(file = %path.display(), "no extractable text; the PDF may be scanned images");
    }
    Ok(pages
        .into_iter()
        .map(|page| page.with_metadata("path", path.display().to_string()))
        .collect())
}

#[cfg(not(feature = "pdf"))]
fn load_pdf(path: &Path, _name: &str) -> Result<Vec<Document>> {
    bail!("{} is a PDF; rebuild with `--features pdf` to read PDFs", path.display())
}

/// Load several files, in order.
///
/// # Errors
///
/// Fails on the first file that cannot be loaded; nothing is returned
/// for the others.
pub fn load_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    for path in paths {
        documents.extend(load_path(path.as_ref())?);
    }
    info!(files = paths.len(), documents = documents.len(), "loaded documents");
    Ok(documents)
}
