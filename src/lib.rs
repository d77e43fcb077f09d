//! # sasl-client
//!
//! A client-side SASL (RFC 4422) library for driving authentication
//! exchanges over IMAP, SMTP, XMPP and similar line-oriented protocols.
//!
//! ## Features
//!
//! - Mechanism negotiation against the server-advertised list, with
//!   fallback across failed mechanisms
//! - PLAIN, LOGIN, ANONYMOUS, XOAUTH2, CRAM-MD5 and the SCRAM family
//!   (SHA-1/256/384/512) with mutual authentication
//! - SASLprep (RFC 4013) preparation of usernames and passwords
//! - Pluggable crypto via [`CryptoProvider`]; a RustCrypto-backed
//!   default is included
//! - Pluggable mechanisms via [`MechanismDescriptor`] registration

#![deny(clippy::all)]

//! ## Quick Start
//!
//! The host protocol owns the connection; the [`Authenticator`] owns
//! the exchange. Feed it base64 challenges, send back its responses:
//!
//! ```rust
//! use sasl_client::{Authenticator, Credentials};
//!
//! # fn main() -> Result<(), sasl_client::SaslError> {
//! let credentials = Credentials::basic("tim", "tanstaaftanstaaf");
//! let mut auth = Authenticator::new(
//!     "imap",
//!     "mail.example.org",
//!     &["PLAIN", "LOGIN", "CRAM-MD5"],
//!     credentials,
//! )?;
//!
//! while let Some((mechanism, is_client_first)) = auth.try_next_auth() {
//!     // e.g. send "AUTHENTICATE <mechanism>" here.
//!     let initial = if is_client_first { "" } else {
//!         "PDE4OTYuNjk3MTcwOTUyQHBvc3RvZmZpY2UucmVzdG9uLm1jaS5uZXQ+" // first server challenge
//!     };
//!     match auth.auth_step(initial) {
//!         Ok(_response) => {
//!             // Relay `response` to the server, keep pumping
//!             // auth_step with each further challenge until the
//!             // server reports success or failure.
//!             break;
//!         }
//!         Err(_) => continue, // abort this mechanism, try the next
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The library never touches the wire: base64 tokens go in and out of
//! [`Authenticator::auth_step`], framing (line endings, continuation
//! prompts, abort tokens) stays with the caller.

pub mod authenticator;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod mechanism;
pub mod prep;

pub use self::authenticator::Authenticator;
pub use self::crypto::{CryptoProvider, DefaultCryptoProvider, HashAlgorithm};
pub use self::error::{CryptoError, Result, SaslError};
pub use self::mechanism::{
    Credentials, Mechanism, MechanismDescriptor, MechanismRegistry, MechanismSelection,
};
pub use self::mechanism::{Anonymous, CramMd5, Login, Plain, Scram, ScramVariant, XOAuth2};
pub use self::prep::saslprep;
