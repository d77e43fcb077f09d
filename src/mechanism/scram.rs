//! SCRAM mechanism family (RFC 5802, RFC 7677).
//!
//! Salted challenge-response with mutual authentication. The password
//! never crosses the wire; instead both sides derive keys from a
//! PBKDF2-salted password and exchange HMAC proofs over the
//! concatenated exchange transcript.
//!
//! # SCRAM Protocol Flow
//!
//! 1. Client sends `client-first-message`: `n,,n=user,r=nonce`
//! 2. Server sends `server-first-message`: `r=nonce+server,s=salt,i=iterations`
//! 3. Client sends `client-final-message`: `c=biws,r=nonce+server,p=proof`
//! 4. Server sends `server-final-message`: `v=verifier`; the client
//!    checks it against its own `ServerSignature` and answers with an
//!    empty response.
//!
//! Channel-binding variants (`SCRAM-*-PLUS`) are not implemented; the
//! gs2 header is always `n,,`.
//!
//! # Reference
//! - RFC 5802: <https://tools.ietf.org/html/rfc5802>
//! - RFC 7677 (SHA-256): <https://tools.ietf.org/html/rfc7677>

use std::sync::Arc;

use crate::codec;
use crate::crypto::{CryptoProvider, HashAlgorithm};
use crate::error::{Result, SaslError};
use crate::mechanism::{Credentials, Mechanism};
use crate::prep::saslprep;

/// gs2 binding header: no channel binding, no authzid.
const GS2_HEADER: &str = "n,,";

/// Hash parameterization of the SCRAM family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScramVariant {
    /// SCRAM-SHA-1 (RFC 5802).
    Sha1,
    /// SCRAM-SHA-256 (RFC 7677).
    Sha256,
    /// SCRAM-SHA-384.
    Sha384,
    /// SCRAM-SHA-512.
    Sha512,
}

impl ScramVariant {
    /// The underlying hash.
    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Self::Sha1 => HashAlgorithm::Sha1,
            Self::Sha256 => HashAlgorithm::Sha256,
            Self::Sha384 => HashAlgorithm::Sha384,
            Self::Sha512 => HashAlgorithm::Sha512,
        }
    }

    /// Hash output length; also the nonce entropy and PBKDF2 key length.
    pub fn key_len(&self) -> usize {
        self.algorithm().output_len()
    }

    /// Canonical SASL mechanism name.
    pub fn mechanism_name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SCRAM-SHA-1",
            Self::Sha256 => "SCRAM-SHA-256",
            Self::Sha384 => "SCRAM-SHA-384",
            Self::Sha512 => "SCRAM-SHA-512",
        }
    }
}

impl std::fmt::Display for ScramVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mechanism_name())
    }
}

/// Exchange state, advanced one server message at a time.
#[derive(Debug)]
enum ScramState {
    Initial,
    ClientFirstSent {
        client_nonce: String,
        client_first_bare: String,
    },
    ClientFinalSent {
        server_signature: Vec<u8>,
    },
    Complete,
}

/// SCRAM step machine.
pub struct Scram {
    variant: ScramVariant,
    provider: Arc<dyn CryptoProvider>,
    client_nonce: Option<String>,
    state: ScramState,
}

impl Scram {
    /// New machine at step zero for the given variant.
    pub fn new(variant: ScramVariant, provider: Arc<dyn CryptoProvider>) -> Self {
        Self {
            variant,
            provider,
            client_nonce: None,
            state: ScramState::Initial,
        }
    }

    /// Pin the client nonce instead of drawing it from the provider.
    #[cfg(test)]
    fn force_nonce(&mut self, nonce: &str) {
        self.client_nonce = Some(nonce.to_owned());
    }
}

impl Mechanism for Scram {
    fn is_valid(&self, credentials: &Credentials) -> bool {
        credentials.user.is_some() && credentials.pass.is_some()
    }

    fn respond(&mut self, challenge: &str, credentials: &Credentials) -> Result<String> {
        // An error mid-exchange leaves the machine in Complete, so a
        // retry on a dead attempt reads as TooManySteps.
        let state = std::mem::replace(&mut self.state, ScramState::Complete);
        match state {
            ScramState::Initial => {
                let user = credentials.user.as_deref().ok_or_else(|| {
                    SaslError::InvalidArgument("SCRAM requires a username".into())
                })?;

                let client_nonce = match self.client_nonce.take() {
                    Some(nonce) => nonce,
                    None => {
                        let bytes = self.provider.random_bytes(self.variant.key_len())?;
                        codec::b64_encode(&bytes)
                    }
                };

                let client_first_bare = format!(
                    "n={},r={}",
                    escape_username(&saslprep(user)),
                    client_nonce
                );
                let client_first = format!("{GS2_HEADER}{client_first_bare}");

                self.state = ScramState::ClientFirstSent {
                    client_nonce,
                    client_first_bare,
                };
                Ok(codec::b64_encode_str(&client_first))
            }

            ScramState::ClientFirstSent {
                client_nonce,
                client_first_bare,
            } => {
                let pass = credentials.pass.as_deref().ok_or_else(|| {
                    SaslError::InvalidArgument("SCRAM requires a password".into())
                })?;

                let server_first = codec::b64_decode_utf8(challenge)?;
                let (server_nonce, salt, iterations) =
                    parse_server_first(&server_first, &client_nonce)?;

                let client_final_no_proof = format!(
                    "c={},r={}",
                    codec::b64_encode_str(GS2_HEADER),
                    server_nonce
                );
                let auth_message =
                    format!("{client_first_bare},{server_first},{client_final_no_proof}");

                let alg = self.variant.algorithm();
                let salted_password = self.provider.pbkdf2(
                    alg,
                    saslprep(pass).as_bytes(),
                    &salt,
                    iterations,
                    self.variant.key_len(),
                )?;
                let client_key = self.provider.hmac(alg, &salted_password, b"Client Key")?;
                let stored_key = self.provider.digest(alg, &client_key)?;
                let client_signature =
                    self.provider.hmac(alg, &stored_key, auth_message.as_bytes())?;
                let client_proof = xor(&client_key, &client_signature);

                let server_key = self.provider.hmac(alg, &salted_password, b"Server Key")?;
                let server_signature =
                    self.provider.hmac(alg, &server_key, auth_message.as_bytes())?;

                let client_final = format!(
                    "{client_final_no_proof},p={}",
                    codec::b64_encode(&client_proof)
                );

                self.state = ScramState::ClientFinalSent { server_signature };
                Ok(codec::b64_encode_str(&client_final))
            }

            ScramState::ClientFinalSent { server_signature } => {
                let expected = codec::b64_encode_str(&format!(
                    "v={}",
                    codec::b64_encode(&server_signature)
                ));
                if challenge != expected {
                    return Err(SaslError::ServerVerificationFailed);
                }
                self.state = ScramState::Complete;
                Ok(String::new())
            }

            ScramState::Complete => Err(SaslError::TooManySteps),
        }
    }
}

/// Escape `,` and `=` in a prepared username (RFC 5802 `saslname`).
fn escape_username(user: &str) -> String {
    let mut escaped = String::with_capacity(user.len());
    for c in user.chars() {
        match c {
            ',' => escaped.push_str("=2C"),
            '=' => escaped.push_str("=3D"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Parse a server-first-message into (nonce, salt, iteration count).
///
/// Attributes must appear in RFC 5802 order: an optional `m=` extension
/// (discarded), then `r=`, `s=`, `i=`. The combined nonce must extend
/// the client nonce.
fn parse_server_first(message: &str, client_nonce: &str) -> Result<(String, Vec<u8>, u32)> {
    let mut attrs = message.split(',');

    let mut first = attrs.next();
    if matches!(first, Some(attr) if attr.starts_with("m=")) {
        first = attrs.next();
    }

    let server_nonce = first
        .and_then(|attr| attr.strip_prefix("r="))
        .ok_or_else(|| malformed("expected r= attribute in server-first-message"))?;
    if !server_nonce.starts_with(client_nonce) {
        return Err(malformed("server nonce does not extend the client nonce"));
    }

    let salt_b64 = attrs
        .next()
        .and_then(|attr| attr.strip_prefix("s="))
        .ok_or_else(|| malformed("expected s= attribute in server-first-message"))?;
    let salt = codec::b64_decode(salt_b64)?;

    let iterations = attrs
        .next()
        .and_then(|attr| attr.strip_prefix("i="))
        .ok_or_else(|| malformed("expected i= attribute in server-first-message"))?
        .parse::<u32>()
        .ok()
        .filter(|i| *i > 0)
        .ok_or_else(|| malformed("iteration count must be a positive integer"))?;

    Ok((server_nonce.to_owned(), salt, iterations))
}

fn malformed(reason: &str) -> SaslError {
    SaslError::MalformedServerResponse(reason.to_owned())
}

fn xor(lhs: &[u8], rhs: &[u8]) -> Vec<u8> {
    debug_assert_eq!(lhs.len(), rhs.len());
    lhs.iter().zip(rhs.iter()).map(|(l, r)| l ^ r).collect()
}
