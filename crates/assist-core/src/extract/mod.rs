//! Best-effort content extraction for the summarize flow.
//!
//! A file is routed to exactly one [`ExtractorKind`] by its (lowercased)
//! extension via [`EXTENSIONS`]. Every failure, including a panic inside a
//! third-party parser, comes back as [`Extraction::Failure`]; nothing here
//! propagates an error to the caller.

mod archive;
#[cfg(test)]
mod fixtures;
mod office;
mod pdf;
mod text;
mod thumbnail;

pub use thumbnail::{downscale, EncodedImage, MAX_DIMENSION};

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// ExtractorKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    PlainText,
    Pdf,
    Docx,
    Xlsx,
    Pptx,
    Zip,
    Tar,
    Image,
}

/// Extension (without the leading dot) to extractor. Multi-part extensions
/// such as `tar.gz` win over their last component.
pub const EXTENSIONS: &[(&str, ExtractorKind)] = &[
    ("txt", ExtractorKind::PlainText),
    ("md", ExtractorKind::PlainText),
    ("log", ExtractorKind::PlainText),
    ("py", ExtractorKind::PlainText),
    ("js", ExtractorKind::PlainText),
    ("json", ExtractorKind::PlainText),
    ("yaml", ExtractorKind::PlainText),
    ("yml", ExtractorKind::PlainText),
    ("csv", ExtractorKind::PlainText),
    ("pdf", ExtractorKind::Pdf),
    ("docx", ExtractorKind::Docx),
    ("xlsx", ExtractorKind::Xlsx),
    ("pptx", ExtractorKind::Pptx),
    ("zip", ExtractorKind::Zip),
    ("tar", ExtractorKind::Tar),
    ("tar.gz", ExtractorKind::Tar),
    ("tgz", ExtractorKind::Tar),
    ("gz", ExtractorKind::Tar),
    ("bz2", ExtractorKind::Tar),
    ("jpg", ExtractorKind::Image),
    ("jpeg", ExtractorKind::Image),
    ("png", ExtractorKind::Image),
    ("webp", ExtractorKind::Image),
];

impl ExtractorKind {
    pub fn for_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        EXTENSIONS
            .iter()
            .filter(|(ext, _)| {
                name.len() > ext.len() + 1
                    && name.ends_with(ext)
                    && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
            })
            .max_by_key(|(ext, _)| ext.len())
            .map(|(_, kind)| *kind)
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractorKind::PlainText => "text",
            ExtractorKind::Pdf => "pdf",
            ExtractorKind::Docx => "docx",
            ExtractorKind::Xlsx => "xlsx",
            ExtractorKind::Pptx => "pptx",
            ExtractorKind::Zip => "zip",
            ExtractorKind::Tar => "tar",
            ExtractorKind::Image => "image",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ExtractError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Extraction failures. The `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Error: File not found at path: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Error: Unsupported file type for direct analysis: {0}")]
    Unsupported(String),

    #[error("Error: Could not read file: {0}")]
    Read(String),

    #[error("Warning: PDF file read, but no readable text extracted.")]
    EmptyPdf,

    #[error("Error processing PDF: {0}")]
    Pdf(String),

    #[error("Error: Failed to process proprietary file ({ext}): {detail}")]
    Office { ext: &'static str, detail: String },

    #[error("Error processing archive file: {0}")]
    Archive(String),

    #[error("Error converting image to Base64: {0}")]
    Image(String),

    #[error("Error: {kind} extractor crashed while reading the file")]
    Crashed { kind: ExtractorKind },
}

impl ExtractError {
    pub fn severity(&self) -> Severity {
        match self {
            ExtractError::EmptyPdf => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum Extraction {
    Text(String),
    Image(EncodedImage),
    /// Warnings and errors alike; both abort the summarize flow.
    Failure(ExtractError),
}

impl Extraction {
    pub fn is_failure(&self) -> bool {
        matches!(self, Extraction::Failure(_))
    }
}

/// Extract text (or a downsized JPEG) from `path`.
pub fn extract(path: &Path) -> Extraction {
    if !path.is_file() {
        return Extraction::Failure(ExtractError::NotFound(path.to_path_buf()));
    }
    let Some(kind) = ExtractorKind::for_path(path) else {
        return Extraction::Failure(ExtractError::Unsupported(display_extension(path)));
    };

    debug!(path = %path.display(), %kind, "extracting");
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run(kind, path)));
    match outcome {
        Ok(Ok(extraction)) => extraction,
        Ok(Err(e)) => {
            debug!(path = %path.display(), error = %e, "extraction failed");
            Extraction::Failure(e)
        }
        Err(_) => Extraction::Failure(ExtractError::Crashed { kind }),
    }
}

fn run(kind: ExtractorKind, path: &Path) -> Result<Extraction, ExtractError> {
    let text = match kind {
        ExtractorKind::PlainText => text::read_text(path)?,
        ExtractorKind::Pdf => pdf::read_pdf(path)?,
        ExtractorKind::Docx => office::read_docx(path)?,
        ExtractorKind::Xlsx => office::read_xlsx(path)?,
        ExtractorKind::Pptx => office::read_pptx(path)?,
        ExtractorKind::Zip => archive::list_zip(path)?,
        ExtractorKind::Tar => archive::list_tar(path)?,
        ExtractorKind::Image => return Ok(Extraction::Image(thumbnail::encode_image(path)?)),
    };
    Ok(Extraction::Text(text))
}

fn display_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
