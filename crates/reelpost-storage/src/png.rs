//! Base64 PNG payload handling.
//!
//! Image generators return base64 that is not always standard: URL-safe
//! alphabets, stray whitespace and missing padding all show up in practice.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{StorageError, StorageResult};

/// First eight bytes of every PNG file.
pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub fn is_png(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_MAGIC)
}

/// Rewrite a loosely formatted base64 string into the standard alphabet.
///
/// Spaces become `+` (a form-decoded `+`), other whitespace is dropped,
/// URL-safe characters are mapped back, and padding is restored.
pub fn normalize_base64(input: &str) -> String {
    let mut out: String = input
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('+'),
            c if c.is_whitespace() => None,
            '-' => Some('+'),
            '_' => Some('/'),
            c => Some(c),
        })
        .collect();

    let trimmed_len = out.trim_end_matches('=').len();
    out.truncate(trimmed_len);
    while out.len() % 4 != 0 {
        out.push('=');
    }
    out
}

/// Decode a base64 PNG, rejecting anything without the PNG signature.
pub fn decode_png_base64(input: &str) -> StorageResult<Vec<u8>> {
    let normalized = normalize_base64(input);
    let bytes = STANDARD
        .decode(normalized.as_bytes())
        .map_err(|e| StorageError::invalid_image(format!("undecodable base64: {}", e)))?;

    if !is_png(&bytes) {
        return Err(StorageError::invalid_image("payload is not a PNG"));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let mut bytes = PNG_MAGIC.to_vec();
        // Aligned so the tail encodes to "++++//8" (or "----__8" URL-safe)
        bytes.extend_from_slice(b"\x00\x00\x00\x0dIHDR\x00\x00\xfb\xef\xbe\xff\xff");
        bytes
    }

    #[test]
    fn test_decode_standard() {
        let encoded = STANDARD.encode(png_bytes());
        assert_eq!(decode_png_base64(&encoded).unwrap(), png_bytes());
    }

    #[test]
    fn test_decode_url_safe_unpadded_with_newlines() {
        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(png_bytes());
        assert!(encoded.contains('-') || encoded.contains('_'));
        let (head, tail) = encoded.split_at(8);
        let messy = format!("{}\n\t{}\r\n", head, tail);

        assert_eq!(decode_png_base64(&messy).unwrap(), png_bytes());
    }

    #[test]
    fn test_space_means_plus() {
        let encoded = STANDARD.encode(png_bytes());
        assert!(encoded.contains('+'));
        let spaced = encoded.replace('+', " ");
        assert_eq!(decode_png_base64(&spaced).unwrap(), png_bytes());
    }

    #[test]
    fn test_rejects_non_png() {
        let encoded = STANDARD.encode(b"GIF89a-not-a-png");
        assert!(matches!(
            decode_png_base64(&encoded),
            Err(StorageError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            decode_png_base64("!!!!"),
            Err(StorageError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_normalize_padding() {
        assert_eq!(normalize_base64("abc"), "abc=");
        assert_eq!(normalize_base64("ab"), "ab==");
        assert_eq!(normalize_base64("abcd"), "abcd");
        assert_eq!(normalize_base64("ab=="), "ab==");
    }
}
