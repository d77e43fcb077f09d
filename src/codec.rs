//! Base64 and UTF-8 conversion helpers shared by every mechanism.
//!
//! SASL exchanges opaque tokens as base64 text (RFC 4648 §4, standard
//! alphabet, `=` padding). This module centralizes the encoding so the
//! mechanisms never touch the engine directly, and maps decode failures
//! into the library's error taxonomy.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::{Result, SaslError};

/// Encode raw bytes as standard base64.
#[inline]
pub fn b64_encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode standard base64 into bytes.
///
/// Fails with [`SaslError::MalformedInput`] on invalid characters or
/// bad padding.
#[inline]
pub fn b64_decode(encoded: &str) -> Result<Vec<u8>> {
    BASE64.decode(encoded).map_err(SaslError::MalformedInput)
}

/// Encode the UTF-8 bytes of a string as base64.
///
/// # Example
///
/// ```
/// use sasl_client::codec::b64_encode_str;
///
/// assert_eq!(b64_encode_str("tim"), "dGlt");
/// ```
#[inline]
pub fn b64_encode_str(s: &str) -> String {
    BASE64.encode(s.as_bytes())
}

/// Decode base64 and validate the payload as UTF-8.
///
/// Server challenges that carry textual attribute lists (SCRAM) go
/// through this; binary challenges (CRAM-MD5) use [`b64_decode`].
#[inline]
pub fn b64_decode_utf8(encoded: &str) -> Result<String> {
    let bytes = b64_decode(encoded)?;
    String::from_utf8(bytes).map_err(SaslError::Decode)
}
