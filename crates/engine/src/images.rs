//! Conversion between `data:` URIs carried by the API and raw image bytes.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{EngineError, ResultEngine};

/// Largest accepted decoded image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_MIME_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/webp", "image/gif"];

/// A decoded image ready to be stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageData {
    /// Parse `data:<mime>;base64,<payload>`.
    pub fn from_data_uri(uri: &str) -> ResultEngine<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| EngineError::Image("expected a data: URI".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| EngineError::Image("missing payload".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| EngineError::Image("payload must be base64".to_string()))?
            .to_ascii_lowercase();
        if !ALLOWED_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(EngineError::Image(format!(
                "unsupported image type: {mime_type}"
            )));
        }

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|err| EngineError::Image(err.to_string()))?;
        if bytes.is_empty() {
            return Err(EngineError::Image("image is empty".to_string()));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(EngineError::Image("image exceeds 5 MiB".to_string()));
        }

        Ok(Self { mime_type, bytes })
    }

    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}

pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn parses_png_data_uri() {
        let image = ImageData::from_data_uri(PIXEL).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes[1..4], *b"PNG");
        assert_eq!(image.extension(), "png");
        assert_eq!(to_data_uri(&image.mime_type, &image.bytes), PIXEL);
    }

    #[test]
    fn rejects_non_image_types() {
        let err = ImageData::from_data_uri("data:text/plain;base64,aGVsbG8=").unwrap_err();
        assert_eq!(
            err,
            EngineError::Image("unsupported image type: text/plain".to_string())
        );
    }

    #[test]
    fn rejects_plain_urls_and_bad_base64() {
        assert!(ImageData::from_data_uri("https://example.com/cake.png").is_err());
        assert!(ImageData::from_data_uri("data:image/png;base64,@@@").is_err());
        assert!(ImageData::from_data_uri("data:image/png,raw").is_err());
    }
}
