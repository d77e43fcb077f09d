//! ANONYMOUS mechanism (RFC 4505).
//!
//! Sends an optional trace token and nothing else. Never chosen by the
//! default priority list: it only validates when the caller asked for
//! it by name through [`crate::MechanismSelection::Explicit`].
//!
//! # Reference
//! - RFC 4505: <https://tools.ietf.org/html/rfc4505>

use crate::codec;
use crate::error::{Result, SaslError};
use crate::mechanism::{Credentials, Mechanism, MechanismSelection};

/// ANONYMOUS step machine.
#[derive(Debug, Default)]
pub struct Anonymous {
    step: usize,
}

impl Anonymous {
    /// New machine at step zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mechanism for Anonymous {
    fn is_valid(&self, credentials: &Credentials) -> bool {
        // Anonymous access must be an explicit caller decision.
        matches!(credentials.selection, MechanismSelection::Explicit(_))
    }

    fn respond(&mut self, _challenge: &str, credentials: &Credentials) -> Result<String> {
        if self.step > 0 {
            return Err(SaslError::TooManySteps);
        }
        self.step += 1;

        // The trace token is opaque to the server; no SASLprep.
        let trace = credentials.user.as_deref().unwrap_or("");
        Ok(codec::b64_encode_str(trace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit() -> Credentials {
        Credentials::new().with_selection(MechanismSelection::Explicit(vec!["ANONYMOUS".into()]))
    }

    #[test]
    fn test_emits_trace_token() {
        let mut credentials = explicit();
        credentials.user = Some("sirhc".into());
        let mut anonymous = Anonymous::new();
        assert_eq!(anonymous.respond("", &credentials).unwrap(), "c2lyaGM=");
    }

    #[test]
    fn test_empty_trace_token() {
        let mut anonymous = Anonymous::new();
        assert_eq!(anonymous.respond("", &explicit()).unwrap(), "");
    }

    #[test]
    fn test_only_valid_when_explicitly_selected() {
        let anonymous = Anonymous::new();
        assert!(anonymous.is_valid(&explicit()));
        assert!(!anonymous.is_valid(&Credentials::new()));
        assert!(!anonymous.is_valid(&Credentials::basic("u", "p")));
        assert!(!anonymous.is_valid(
            &Credentials::new().with_selection(MechanismSelection::Encrypted)
        ));
    }

    #[test]
    fn test_single_step() {
        let mut anonymous = Anonymous::new();
        anonymous.respond("", &explicit()).unwrap();
        assert!(matches!(
            anonymous.respond("", &explicit()),
            Err(SaslError::TooManySteps)
        ));
    }
}
