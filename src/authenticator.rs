//! Mechanism negotiation and step pumping.
//!
//! The [`Authenticator`] is the piece the host protocol talks to: it
//! intersects the caller's preference order with the server-advertised
//! mechanism list, walks the candidates most-preferred-first with
//! [`Authenticator::try_next_auth`], and relays base64 tokens through
//! [`Authenticator::auth_step`] until the server reports success or
//! failure. It never inspects protocol framing; IMAP/SMTP/XMPP line
//! handling stays with the caller.
//!
//! # Example
//!
//! ```
//! use sasl_client::{Authenticator, Credentials};
//!
//! let credentials = Credentials::basic("tim", "tanstaaftanstaaf");
//! let mut auth = Authenticator::new(
//!     "imap",
//!     "mail.example.org",
//!     &["LOGIN", "PLAIN"],
//!     credentials,
//! )?;
//!
//! let (name, is_client_first) = auth.try_next_auth().expect("a usable mechanism");
//! assert_eq!(name, "PLAIN");
//! assert!(is_client_first);
//!
//! // Client-first mechanisms take an empty initial challenge.
//! let response = auth.auth_step("")?;
//! assert_eq!(response, "AHRpbQB0YW5zdGFhZnRhbnN0YWFm");
//! # Ok::<(), sasl_client::SaslError>(())
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::crypto::{CryptoProvider, DefaultCryptoProvider};
use crate::error::{Result, SaslError};
use crate::mechanism::{
    Credentials, Mechanism, MechanismDescriptor, MechanismRegistry, MechanismSelection,
};

/// Challenge-response mechanisms that never put the password on the
/// wire, strongest hash first.
const ENCRYPTED_PRIORITY: &[&str] = &[
    "SCRAM-SHA-512",
    "SCRAM-SHA-384",
    "SCRAM-SHA-256",
    "SCRAM-SHA-1",
    "CRAM-MD5",
];

/// Default preference order: bearer tokens, then challenge-response,
/// then the cleartext mechanisms as a last resort.
const DEFAULT_PRIORITY: &[&str] = &[
    "XOAUTH2",
    "SCRAM-SHA-512",
    "SCRAM-SHA-384",
    "SCRAM-SHA-256",
    "SCRAM-SHA-1",
    "CRAM-MD5",
    "PLAIN",
    "LOGIN",
];

struct ActiveMechanism {
    name: String,
    mechanism: Box<dyn Mechanism>,
}

/// Drives one SASL negotiation against one server.
///
/// Single-threaded and single-use: create it per connection attempt,
/// call [`Authenticator::try_next_auth`] to pick a mechanism, pump
/// challenges through [`Authenticator::auth_step`], and on mechanism
/// failure call [`Authenticator::try_next_auth`] again to fall back.
pub struct Authenticator {
    service: String,
    hostname: String,
    credentials: Credentials,
    provider: Arc<dyn CryptoProvider>,
    registry: MechanismRegistry,
    /// Candidate names in reverse priority; the top of the stack is
    /// tried next.
    candidates: Vec<String>,
    current: Option<ActiveMechanism>,
}

impl Authenticator {
    /// Create an authenticator with the default crypto provider.
    ///
    /// `service` is the SASL service name (`"imap"`, `"smtp"`, ...),
    /// `hostname` the fully qualified server name, and `supported` the
    /// mechanism list the server advertised. All three must be
    /// non-empty or construction fails with
    /// [`SaslError::InvalidArgument`].
    pub fn new<S: AsRef<str>>(
        service: impl Into<String>,
        hostname: impl Into<String>,
        supported: &[S],
        credentials: Credentials,
    ) -> Result<Self> {
        Self::with_provider(
            service,
            hostname,
            supported,
            credentials,
            Arc::new(DefaultCryptoProvider),
        )
    }

    /// Create an authenticator with an injected crypto provider.
    pub fn with_provider<S: AsRef<str>>(
        service: impl Into<String>,
        hostname: impl Into<String>,
        supported: &[S],
        credentials: Credentials,
        provider: Arc<dyn CryptoProvider>,
    ) -> Result<Self> {
        let service = service.into();
        let hostname = hostname.into();
        if service.is_empty() {
            return Err(SaslError::InvalidArgument(
                "service name must not be empty".into(),
            ));
        }
        if hostname.is_empty() {
            return Err(SaslError::InvalidArgument(
                "hostname must not be empty".into(),
            ));
        }
        if supported.is_empty() {
            return Err(SaslError::InvalidArgument(
                "server mechanism list must not be empty".into(),
            ));
        }

        let server: HashSet<String> = supported
            .iter()
            .map(|name| name.as_ref().to_ascii_uppercase())
            .collect();

        let priority: Vec<String> = match &credentials.selection {
            MechanismSelection::Default => {
                DEFAULT_PRIORITY.iter().map(|&s| s.to_owned()).collect()
            }
            MechanismSelection::Encrypted => {
                ENCRYPTED_PRIORITY.iter().map(|&s| s.to_owned()).collect()
            }
            MechanismSelection::Explicit(list) => {
                list.iter().map(|s| s.to_ascii_uppercase()).collect()
            }
        };

        // Stack in reverse so the most-preferred candidate pops first.
        let mut candidates: Vec<String> = priority
            .into_iter()
            .filter(|name| server.contains(name))
            .collect();
        candidates.reverse();

        trace!("negotiable mechanisms: {candidates:?}");

        Ok(Self {
            service,
            hostname,
            credentials,
            provider,
            registry: MechanismRegistry::default(),
            candidates,
            current: None,
        })
    }

    /// SASL service name this authenticator was built for.
    pub fn service_name(&self) -> &str {
        &self.service
    }

    /// Server hostname this authenticator was built for.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Name of the mechanism currently being driven, if any.
    pub fn current_mechanism(&self) -> Option<&str> {
        self.current.as_ref().map(|active| active.name.as_str())
    }

    /// Register an additional mechanism, shadowing any existing
    /// registration with the same canonical name.
    ///
    /// Candidates are resolved against the registry when they are
    /// popped, so a registration made before the name comes up in
    /// [`Authenticator::try_next_auth`] takes effect for this
    /// negotiation.
    pub fn register_mechanism(&mut self, descriptor: MechanismDescriptor) {
        self.registry.register(descriptor);
    }

    /// Select the next candidate mechanism.
    ///
    /// Pops candidates in priority order, skipping names with no
    /// registered module and mechanisms whose credential requirements
    /// are not met. Returns the selected mechanism's canonical name and
    /// whether it is client-first, or `None` when every candidate is
    /// exhausted.
    pub fn try_next_auth(&mut self) -> Option<(String, bool)> {
        self.current = None;
        while let Some(name) = self.candidates.pop() {
            let Some(descriptor) = self.registry.get(&name) else {
                trace!("no registered module for {name}, skipping");
                continue;
            };
            let is_client_first = descriptor.is_client_first();
            let mechanism = descriptor.instantiate(self.provider.clone());
            if !mechanism.is_valid(&self.credentials) {
                debug!("credentials insufficient for {name}, skipping");
                continue;
            }
            debug!("selected mechanism {name}");
            self.current = Some(ActiveMechanism {
                name: name.clone(),
                mechanism,
            });
            return Some((name, is_client_first));
        }
        debug!("mechanism candidates exhausted");
        None
    }

    /// Feed the next base64 server challenge to the current mechanism
    /// and get the next base64 client response.
    ///
    /// For client-first mechanisms the first call must pass `""`. An
    /// empty return value means the mechanism has nothing left to say
    /// (the host protocol typically still sends an empty line). On any
    /// error the current mechanism is abandoned and a fresh
    /// [`Authenticator::try_next_auth`] is required.
    pub fn auth_step(&mut self, server_challenge: &str) -> Result<String> {
        let Some(active) = self.current.as_mut() else {
            return Err(SaslError::NoMechanism);
        };
        match active.mechanism.respond(server_challenge, &self.credentials) {
            Ok(response) => {
                trace!("mechanism {} produced a response", active.name);
                Ok(response)
            }
            Err(err) => {
                debug!("mechanism {} failed: {err}", active.name);
                self.current = None;
                Err(err)
            }
        }
    }
}
