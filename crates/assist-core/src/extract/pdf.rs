use super::ExtractError;
use std::path::Path;

/// Concatenated text of every page in document order.
pub(super) fn read_pdf(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    let text =
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(ExtractError::EmptyPdf);
    }
    Ok(text)
}
