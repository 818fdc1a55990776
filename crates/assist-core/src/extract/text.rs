use super::ExtractError;
use std::path::Path;
use tracing::debug;

/// Read a text file as UTF-8, falling back to Latin-1 when it does not decode.
pub(super) fn read_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::Read(e.to_string()))?;
    Ok(decode_text(bytes))
}

fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!(valid_up_to = e.utf8_error().valid_up_to(), "not UTF-8, decoding as Latin-1");
            // Latin-1 maps each byte to the code point of the same value.
            e.into_bytes().into_iter().map(char::from).collect()
        }
    }
}
