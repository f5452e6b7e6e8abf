//! Base64 data URIs (`data:<mime>;base64,<payload>`), the form in which
//! document bytes are stored in the document row.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

/// MIME type used when none is known or detectable.
pub const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DataUriError {
    #[error("not a data URI")]
    MissingScheme,
    #[error("data URI is not base64-encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Payload(String),
}

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    let mime_type = if mime_type.trim().is_empty() {
        FALLBACK_MIME
    } else {
        mime_type
    };
    format!("data:{mime_type};base64,{}", BASE64_STANDARD.encode(bytes))
}

pub fn decode(uri: &str) -> Result<DataUri, DataUriError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or(DataUriError::MissingScheme)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUriError::MissingScheme)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(DataUriError::NotBase64)?;
    let bytes = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| DataUriError::Payload(e.to_string()))?;
    Ok(DataUri {
        mime_type: if mime_type.is_empty() {
            FALLBACK_MIME.to_string()
        } else {
            mime_type.to_string()
        },
        bytes,
    })
}

/// MIME type for `file_name` from its extension, or [`FALLBACK_MIME`].
pub fn guess_mime(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_with_header() {
        assert_eq!(encode("application/pdf", b"hi"), "data:application/pdf;base64,aGk=");
        assert!(encode("", b"x").starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn decodes_payload_and_mime() {
        let decoded = decode("data:image/png;base64,AAEC").unwrap();
        assert_eq!(decoded.mime_type, "image/png");
        assert_eq!(decoded.bytes, vec![0, 1, 2]);
    }

    #[test]
    fn rejects_non_data_uris() {
        assert_eq!(decode("https://x/y"), Err(DataUriError::MissingScheme));
        assert_eq!(decode("data:text/plain,hello"), Err(DataUriError::NotBase64));
        assert!(matches!(
            decode("data:text/plain;base64,@@@"),
            Err(DataUriError::Payload(_))
        ));
    }

    #[test]
    fn guesses_from_extension() {
        assert_eq!(guess_mime("escritura.pdf"), "application/pdf");
        assert_eq!(guess_mime("foto.JPG"), "image/jpeg");
        assert_eq!(guess_mime("sem_extensao"), FALLBACK_MIME);
    }
}
