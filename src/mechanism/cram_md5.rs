//! CRAM-MD5 mechanism (RFC 2195).
//!
//! One step: HMAC-MD5 of the decoded server challenge keyed with the
//! prepped password, answered as `username SP lowercase-hex-digest`.
//!
//! # Reference
//! - RFC 2195: <https://tools.ietf.org/html/rfc2195>

use std::sync::Arc;

use crate::codec;
use crate::crypto::{CryptoProvider, HashAlgorithm};
use crate::error::{Result, SaslError};
use crate::mechanism::{Credentials, Mechanism};
use crate::prep::saslprep;

/// CRAM-MD5 step machine.
pub struct CramMd5 {
    provider: Arc<dyn CryptoProvider>,
    step: usize,
}

impl CramMd5 {
    /// New machine at step zero.
    pub fn new(provider: Arc<dyn CryptoProvider>) -> Self {
        Self { provider, step: 0 }
    }
}

impl Mechanism for CramMd5 {
    fn is_valid(&self, credentials: &Credentials) -> bool {
        credentials.user.is_some() && credentials.pass.is_some()
    }

    fn respond(&mut self, challenge: &str, credentials: &Credentials) -> Result<String> {
        if self.step > 0 {
            return Err(SaslError::TooManySteps);
        }
        self.step += 1;

        let user = credentials
            .user
            .as_deref()
            .ok_or_else(|| SaslError::InvalidArgument("CRAM-MD5 requires a username".into()))?;
        let pass = credentials
            .pass
            .as_deref()
            .ok_or_else(|| SaslError::InvalidArgument("CRAM-MD5 requires a password".into()))?;

        let nonce = codec::b64_decode(challenge)?;
        let mac = self
            .provider
            .hmac(HashAlgorithm::Md5, saslprep(pass).as_bytes(), &nonce)?;

        let payload = format!("{} {}", saslprep(user), hex::encode(mac));
        Ok(codec::b64_encode_str(&payload))
    }
}
