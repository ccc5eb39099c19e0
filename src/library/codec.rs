//! Conversion between raw file bytes and the transportable `data:` URL form.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("not a data URL")]
    NotDataUrl,
    #[error("data URL is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Bytes recovered from a `data:` URL together with their declared media type.
#[derive(Debug)]
pub struct DecodedMedia {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Encode `bytes` as `data:<media_type>;base64,<payload>`.
pub fn encode(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

/// Decode a `data:` URL produced by [`encode`].
pub fn decode(url: &str) -> Result<DecodedMedia, CodecError> {
    let rest = url.strip_prefix("data:").ok_or(CodecError::NotDataUrl)?;
    let (header, body) = rest.split_once(',').ok_or(CodecError::NotDataUrl)?;
    let media_type = header.strip_suffix(";base64").ok_or(CodecError::NotBase64)?;
    let bytes = STANDARD.decode(body.trim())?;

    Ok(DecodedMedia {
        media_type: media_type.to_string(),
        bytes,
    })
}
