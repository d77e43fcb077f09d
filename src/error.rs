//! Error types for the SASL client library.
//!
//! This module defines the error taxonomy surfaced by [`crate::Authenticator`]
//! and the mechanism step machines, plus the failures a
//! [`crate::CryptoProvider`] implementation can report.

use thiserror::Error;

use crate::crypto::HashAlgorithm;

/// Convenience type alias for Results using [`SaslError`].
pub type Result<T, E = SaslError> = std::result::Result<T, E>;

/// Top-level SASL errors.
///
/// Every failure is surfaced through [`crate::Authenticator::auth_step`]
/// (or the constructor, for [`SaslError::InvalidArgument`]). The
/// authenticator never falls back on its own; after an error the caller
/// decides whether to abort the session or try the next mechanism with
/// [`crate::Authenticator::try_next_auth`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SaslError {
    /// Constructor was handed an unusable configuration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The server sent bytes that are not valid base64.
    #[error("malformed base64: {0}")]
    MalformedInput(#[from] base64::DecodeError),

    /// UTF-8 decoding error in a decoded server token.
    #[error("decode error: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    /// A mechanism could not parse a (well-encoded) server message.
    #[error("malformed server response: {0}")]
    MalformedServerResponse(String),

    /// SCRAM mutual authentication failed: the server's signature did
    /// not match the one derived from the shared secret.
    #[error("server signature verification failed")]
    ServerVerificationFailed,

    /// The server kept the exchange going past the mechanism's final step.
    #[error("mechanism has already produced all of its responses")]
    TooManySteps,

    /// `auth_step` was called with no mechanism selected.
    #[error("no mechanism selected; call try_next_auth first")]
    NoMechanism,

    /// Failure reported by the crypto provider.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Failures reported by a [`crate::CryptoProvider`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CryptoError {
    /// The provider rejected the HMAC key.
    #[error("invalid key length for {0}")]
    InvalidKeyLength(HashAlgorithm),

    /// The secure random source failed.
    #[error("random source failure: {0}")]
    Rng(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SaslError::InvalidArgument("hostname must not be empty".into());
        assert_eq!(
            format!("{}", err),
            "invalid argument: hostname must not be empty"
        );

        let err = SaslError::MalformedServerResponse("expected s= attribute".into());
        assert_eq!(
            format!("{}", err),
            "malformed server response: expected s= attribute"
        );

        let err = CryptoError::InvalidKeyLength(HashAlgorithm::Sha256);
        assert_eq!(format!("{}", err), "invalid key length for SHA-256");
    }

    #[test]
    fn test_error_conversion() {
        // Automatic conversion from base64 decode failures.
        let b64_err = crate::codec::b64_decode("not!base64").unwrap_err();
        assert!(matches!(b64_err, SaslError::MalformedInput(_)));

        // Conversion from FromUtf8Error.
        let utf8_err = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        let err: SaslError = utf8_err.into();
        assert!(matches!(err, SaslError::Decode(_)));

        // Crypto errors nest transparently.
        let err: SaslError = CryptoError::Rng("entropy pool unavailable".into()).into();
        assert_eq!(
            format!("{}", err),
            "random source failure: entropy pool unavailable"
        );
    }
}
