//! SASL mechanism contract and registry.
//!
//! Every mechanism is a short step machine behind the [`Mechanism`]
//! trait: the n-th [`Mechanism::respond`] call consumes the n-th base64
//! server challenge and yields the n-th base64 client response. The
//! [`MechanismRegistry`] maps canonical uppercase mechanism names to
//! [`MechanismDescriptor`] factories, with the standard set registered
//! out of the box and room for host-protocol extensions.
//!
//! # Supported Mechanisms
//!
//! - **PLAIN** (RFC 4616), **LOGIN**: username/password in the clear
//! - **ANONYMOUS** (RFC 4505): trace-token access, opt-in only
//! - **XOAUTH2**: OAuth 2.0 bearer tokens (Google/Microsoft dialect)
//! - **CRAM-MD5** (RFC 2195): HMAC-MD5 challenge digest
//! - **SCRAM-SHA-1/-256/-384/-512** (RFC 5802/7677): salted
//!   challenge-response with mutual authentication
//!
//! # Reference
//! - RFC 4422 (SASL): <https://tools.ietf.org/html/rfc4422>

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::crypto::CryptoProvider;
use crate::error::Result;

pub mod anonymous;
pub mod cram_md5;
pub mod login;
pub mod plain;
pub mod scram;
pub mod xoauth2;

pub use self::anonymous::Anonymous;
pub use self::cram_md5::CramMd5;
pub use self::login::Login;
pub use self::plain::Plain;
pub use self::scram::{Scram, ScramVariant};
pub use self::xoauth2::XOAuth2;

/// How the caller wants mechanisms chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum MechanismSelection {
    /// Built-in preference order: XOAUTH2, then the challenge-response
    /// mechanisms strongest-first, then PLAIN and LOGIN.
    #[default]
    Default,
    /// Only mechanisms that never expose the password on the wire.
    Encrypted,
    /// Exactly these mechanisms, in this order.
    Explicit(Vec<String>),
}

/// Credentials handed to the [`crate::Authenticator`].
///
/// All fields are optional; each mechanism checks for the subset it
/// needs via [`Mechanism::is_valid`].
///
/// # Example
///
/// ```
/// use sasl_client::{Credentials, MechanismSelection};
///
/// let plain = Credentials::basic("tim", "tanstaaftanstaaf");
/// let oauth = Credentials::xoauth2("someuser@example.com", "ya29.vF9d");
/// let picky = Credentials::basic("tim", "tanstaaftanstaaf")
///     .with_selection(MechanismSelection::Encrypted);
/// # let _ = (plain, oauth, picky);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Authentication identity.
    pub user: Option<String>,
    /// Password.
    pub pass: Option<String>,
    /// OAuth 2.0 bearer token (XOAUTH2).
    pub oauth_bearer: Option<String>,
    /// Mechanism selection policy.
    pub selection: MechanismSelection,
}

impl Credentials {
    /// Empty credentials; fill the fields directly or use the builders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Username/password credentials.
    pub fn basic(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            pass: Some(pass.into()),
            ..Self::default()
        }
    }

    /// Username plus OAuth 2.0 bearer token.
    pub fn xoauth2(user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            oauth_bearer: Some(token.into()),
            ..Self::default()
        }
    }

    /// Replace the mechanism selection policy.
    #[must_use]
    pub fn with_selection(mut self, selection: MechanismSelection) -> Self {
        self.selection = selection;
        self
    }
}

/// A SASL mechanism step machine.
///
/// Instances are single-use: created for one authentication attempt,
/// advanced one server challenge at a time, then discarded. Challenges
/// and responses are base64 text; the empty string stands both for "no
/// initial challenge" (client-first mechanisms) and "no client response
/// required" (e.g. the final SCRAM turn).
pub trait Mechanism: Send {
    /// Whether `credentials` carry everything this mechanism needs.
    fn is_valid(&self, credentials: &Credentials) -> bool;

    /// Consume the next server challenge and produce the next client
    /// response. Calls past the mechanism's final step fail with
    /// [`crate::SaslError::TooManySteps`].
    fn respond(&mut self, challenge: &str, credentials: &Credentials) -> Result<String>;
}

type MechanismFactory = Arc<dyn Fn(Arc<dyn CryptoProvider>) -> Box<dyn Mechanism> + Send + Sync>;

/// Registration record for one mechanism: canonical name, whether it
/// speaks first, and a factory producing fresh instances.
#[derive(Clone)]
pub struct MechanismDescriptor {
    name: String,
    is_client_first: bool,
    factory: MechanismFactory,
}

impl MechanismDescriptor {
    /// Create a descriptor. The name is canonicalized to uppercase.
    pub fn new<F>(name: &str, is_client_first: bool, factory: F) -> Self
    where
        F: Fn(Arc<dyn CryptoProvider>) -> Box<dyn Mechanism> + Send + Sync + 'static,
    {
        Self {
            name: name.to_ascii_uppercase(),
            is_client_first,
            factory: Arc::new(factory),
        }
    }

    /// Canonical (uppercase) mechanism name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the mechanism emits its first message before any server
    /// challenge.
    pub fn is_client_first(&self) -> bool {
        self.is_client_first
    }

    /// Build a fresh instance for one authentication attempt.
    pub fn instantiate(&self, provider: Arc<dyn CryptoProvider>) -> Box<dyn Mechanism> {
        (self.factory)(provider)
    }
}

impl fmt::Debug for MechanismDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MechanismDescriptor")
            .field("name", &self.name)
            .field("is_client_first", &self.is_client_first)
            .finish_non_exhaustive()
    }
}

/// Mechanism registry keyed by canonical uppercase name.
#[derive(Debug, Clone)]
pub struct MechanismRegistry {
    entries: HashMap<String, MechanismDescriptor>,
}

impl Default for MechanismRegistry {
    /// Registry with the standard mechanisms pre-registered.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(MechanismDescriptor::new("PLAIN", true, |_| {
            Box::new(Plain::new())
        }));
        registry.register(MechanismDescriptor::new("LOGIN", false, |_| {
            Box::new(Login::new())
        }));
        registry.register(MechanismDescriptor::new("ANONYMOUS", true, |_| {
            Box::new(Anonymous::new())
        }));
        registry.register(MechanismDescriptor::new("XOAUTH2", true, |_| {
            Box::new(XOAuth2::new())
        }));
        registry.register(MechanismDescriptor::new("CRAM-MD5", false, |provider| {
            Box::new(CramMd5::new(provider))
        }));
        for variant in [
            ScramVariant::Sha1,
            ScramVariant::Sha256,
            ScramVariant::Sha384,
            ScramVariant::Sha512,
        ] {
            registry.register(MechanismDescriptor::new(
                variant.mechanism_name(),
                true,
                move |provider| Box::new(Scram::new(variant, provider)),
            ));
        }
        registry
    }
}

impl MechanismRegistry {
    /// Registry with no mechanisms at all.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a mechanism, replacing any existing registration with
    /// the same canonical name. Returns the descriptor it displaced.
    pub fn register(&mut self, descriptor: MechanismDescriptor) -> Option<MechanismDescriptor> {
        self.entries
            .insert(descriptor.name().to_owned(), descriptor)
    }

    /// Look up a mechanism by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&MechanismDescriptor> {
        self.entries.get(&name.to_ascii_uppercase())
    }

    /// Registered canonical names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DefaultCryptoProvider;

    fn provider() -> Arc<dyn CryptoProvider> {
        Arc::new(DefaultCryptoProvider)
    }

    #[test]
    fn test_default_registry_has_builtins() {
        let registry = MechanismRegistry::default();
        for name in [
            "PLAIN",
            "LOGIN",
            "ANONYMOUS",
            "XOAUTH2",
            "CRAM-MD5",
            "SCRAM-SHA-1",
            "SCRAM-SHA-256",
            "SCRAM-SHA-384",
            "SCRAM-SHA-512",
        ] {
            assert!(registry.get(name).is_some(), "{name} missing");
        }
        assert!(registry.get("GSSAPI").is_none());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = MechanismRegistry::default();
        assert_eq!(registry.get("plain").unwrap().name(), "PLAIN");
        assert_eq!(registry.get("scram-sha-256").unwrap().name(), "SCRAM-SHA-256");
    }

    #[test]
    fn test_register_overrides_by_canonical_name() {
        let mut registry = MechanismRegistry::default();
        assert!(registry.get("PLAIN").unwrap().is_client_first());

        // A host protocol can shadow a built-in under the same name.
        let displaced = registry.register(MechanismDescriptor::new("plain", false, |_| {
            Box::new(Login::new())
        }));
        assert_eq!(displaced.unwrap().name(), "PLAIN");
        assert!(!registry.get("PLAIN").unwrap().is_client_first());
    }

    #[test]
    fn test_descriptor_instantiates_fresh_machines() {
        let registry = MechanismRegistry::default();
        let descriptor = registry.get("PLAIN").unwrap();
        let credentials = Credentials::basic("tim", "tanstaaftanstaaf");

        let mut first = descriptor.instantiate(provider());
        let mut second = descriptor.instantiate(provider());
        assert!(first.respond("", &credentials).is_ok());
        // A fresh instance starts from step zero again.
        assert!(second.respond("", &credentials).is_ok());
    }

    #[test]
    fn test_selection_default() {
        assert_eq!(MechanismSelection::default(), MechanismSelection::Default);
        assert_eq!(
            Credentials::basic("u", "p").selection,
            MechanismSelection::Default
        );
    }
}
