//! PLAIN mechanism (RFC 4616).
//!
//! Single client-first message: `authzid NUL authcid NUL password`,
//! with an empty authzid. Both identity and password go through
//! SASLprep before encoding.
//!
//! # Reference
//! - RFC 4616: <https://tools.ietf.org/html/rfc4616>

use crate::codec;
use crate::error::{Result, SaslError};
use crate::mechanism::{Credentials, Mechanism};
use crate::prep::saslprep;

/// PLAIN step machine.
#[derive(Debug, Default)]
pub struct Plain {
    step: usize,
}

impl Plain {
    /// New machine at step zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mechanism for Plain {
    fn is_valid(&self, credentials: &Credentials) -> bool {
        credentials.user.is_some() && credentials.pass.is_some()
    }

    fn respond(&mut self, _challenge: &str, credentials: &Credentials) -> Result<String> {
        if self.step > 0 {
            return Err(SaslError::TooManySteps);
        }
        self.step += 1;

        let user = credentials
            .user
            .as_deref()
            .ok_or_else(|| SaslError::InvalidArgument("PLAIN requires a username".into()))?;
        let pass = credentials
            .pass
            .as_deref()
            .ok_or_else(|| SaslError::InvalidArgument("PLAIN requires a password".into()))?;

        let payload = format!("\0{}\0{}", saslprep(user), saslprep(pass));
        Ok(codec::b64_encode_str(&payload))
    }
}
