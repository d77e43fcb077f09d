//! Cryptographic primitives behind an injectable provider.
//!
//! The mechanisms consume HMAC, hashing, PBKDF2 and a CSPRNG through the
//! [`CryptoProvider`] trait rather than calling crate functions directly.
//! That keeps the step machines deterministic under test (a provider can
//! hand out fixed bytes) and leaves room for platform-backed
//! implementations. [`DefaultCryptoProvider`] covers the common case.

use hmac::{Hmac, Mac};
use md5::Md5;
use rand::RngCore;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::CryptoError;

/// Hash algorithms the mechanisms can ask a provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HashAlgorithm {
    /// MD5 (CRAM-MD5 only).
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl HashAlgorithm {
    /// Digest output length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Canonical name as it appears in mechanism names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider of the ambient crypto the mechanisms need.
///
/// Implementations must be callable from the single thread driving the
/// [`crate::Authenticator`]; no interior synchronization is required.
pub trait CryptoProvider: Send + Sync {
    /// Draw `n` bytes from a cryptographically secure random source.
    fn random_bytes(&self, n: usize) -> Result<Vec<u8>, CryptoError>;

    /// One-shot hash of `data`.
    fn digest(&self, alg: HashAlgorithm, data: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// HMAC over `data` keyed with `key`.
    fn hmac(&self, alg: HashAlgorithm, key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// PBKDF2 with HMAC as the PRF, producing `key_len` bytes.
    fn pbkdf2(
        &self,
        alg: HashAlgorithm,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        key_len: usize,
    ) -> Result<Vec<u8>, CryptoError>;
}

/// Default [`CryptoProvider`] backed by the RustCrypto crates and the
/// thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCryptoProvider;

fn mac<M: Mac + hmac::digest::KeyInit>(
    alg: HashAlgorithm,
    key: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let mut mac =
        <M as Mac>::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength(alg))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

impl CryptoProvider for DefaultCryptoProvider {
    fn random_bytes(&self, n: usize) -> Result<Vec<u8>, CryptoError> {
        let mut buf = vec![0u8; n];
        rand::thread_rng()
            .try_fill_bytes(&mut buf)
            .map_err(|e| CryptoError::Rng(e.to_string()))?;
        Ok(buf)
    }

    fn digest(&self, alg: HashAlgorithm, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Ok(match alg {
            HashAlgorithm::Md5 => Md5::digest(data).to_vec(),
            HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        })
    }

    fn hmac(&self, alg: HashAlgorithm, key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match alg {
            HashAlgorithm::Md5 => mac::<Hmac<Md5>>(alg, key, data),
            HashAlgorithm::Sha1 => mac::<Hmac<Sha1>>(alg, key, data),
            HashAlgorithm::Sha256 => mac::<Hmac<Sha256>>(alg, key, data),
            HashAlgorithm::Sha384 => mac::<Hmac<Sha384>>(alg, key, data),
            HashAlgorithm::Sha512 => mac::<Hmac<Sha512>>(alg, key, data),
        }
    }

    fn pbkdf2(
        &self,
        alg: HashAlgorithm,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        key_len: usize,
    ) -> Result<Vec<u8>, CryptoError> {
        let mut buf = vec![0u8; key_len];
        match alg {
            HashAlgorithm::Md5 => {
                pbkdf2::pbkdf2_hmac::<Md5>(password, salt, iterations, &mut buf)
            }
            HashAlgorithm::Sha1 => {
                pbkdf2::pbkdf2_hmac::<Sha1>(password, salt, iterations, &mut buf)
            }
            HashAlgorithm::Sha256 => {
                pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut buf)
            }
            HashAlgorithm::Sha384 => {
                pbkdf2::pbkdf2_hmac::<Sha384>(password, salt, iterations, &mut buf)
            }
            HashAlgorithm::Sha512 => {
                pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut buf)
            }
        }
        Ok(buf)
    }
}
