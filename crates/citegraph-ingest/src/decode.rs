use std::path::Path;

use crate::IngestError;

/// Read a bibliography file as text.
///
/// UTF-8 is tried first. Bytes that are not valid UTF-8 are decoded as
/// Latin-1, where every byte maps to the code point of the same value, so
/// only an I/O failure can make a file unreadable.
pub fn read_bibliography_text(path: &Path) -> Result<String, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::debug!(
                path = %path.display(),
                valid_up_to = e.utf8_error().valid_up_to(),
                "not UTF-8, decoding as Latin-1"
            );
            Ok(decode_latin1(e.as_bytes()))
        }
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
