//! XOAUTH2 mechanism.
//!
//! OAuth 2.0 bearer-token dialect used by Gmail and Outlook. The first
//! message carries `user=` and `auth=Bearer` fields separated by ^A.
//! On failure the server sends a JSON error blob as a continuation; the
//! client acknowledges it with an empty response so the server can
//! finish the failure turn. The blob itself is not parsed.

use tracing::debug;

use crate::codec;
use crate::error::{Result, SaslError};
use crate::mechanism::{Credentials, Mechanism};
use crate::prep::saslprep;

/// XOAUTH2 step machine.
#[derive(Debug, Default)]
pub struct XOAuth2 {
    step: usize,
}

impl XOAuth2 {
    /// New machine at step zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mechanism for XOAuth2 {
    fn is_valid(&self, credentials: &Credentials) -> bool {
        credentials.user.is_some() && credentials.oauth_bearer.is_some()
    }

    fn respond(&mut self, challenge: &str, credentials: &Credentials) -> Result<String> {
        let step = self.step;
        self.step += 1;
        match step {
            0 => {
                let user = credentials.user.as_deref().ok_or_else(|| {
                    SaslError::InvalidArgument("XOAUTH2 requires a username".into())
                })?;
                let token = credentials.oauth_bearer.as_deref().ok_or_else(|| {
                    SaslError::InvalidArgument("XOAUTH2 requires a bearer token".into())
                })?;
                let payload = format!("user={}\x01auth=Bearer {}\x01\x01", saslprep(user), token);
                Ok(codec::b64_encode_str(&payload))
            }
            1 => {
                // Error continuation: acknowledge with an empty response
                // and let the server complete the failure turn.
                if let Ok(blob) = codec::b64_decode_utf8(challenge) {
                    debug!("server rejected bearer token: {blob}");
                }
                Ok(String::new())
            }
            _ => Err(SaslError::TooManySteps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::xoauth2(
            "someuser@example.com",
            "ya29.vF9dft4qmTc2Nvb3RlckBhdHRhdmlzdGEuY29tCg",
        )
    }

    #[test]
    fn test_initial_response() {
        let mut xoauth2 = XOAuth2::new();
        assert_eq!(
            xoauth2.respond("", &credentials()).unwrap(),
            "dXNlcj1zb21ldXNlckBleGFtcGxlLmNvbQFhdXRoPUJlYXJlciB5YTI5Ln\
             ZGOWRmdDRxbVRjMk52YjNSbGNrQmhkSFJoZG1semRHRXVZMjl0Q2cBAQ=="
        );
    }

    #[test]
    fn test_error_continuation_yields_empty_response() {
        let mut xoauth2 = XOAuth2::new();
        xoauth2.respond("", &credentials()).unwrap();

        // {"status":"401"} as sent by the server on a bad token.
        let blob = codec::b64_encode_str("{\"status\":\"401\"}");
        assert_eq!(xoauth2.respond(&blob, &credentials()).unwrap(), "");
        assert!(matches!(
            xoauth2.respond("", &credentials()),
            Err(SaslError::TooManySteps)
        ));
    }

    #[test]
    fn test_is_valid() {
        assert!(XOAuth2::new().is_valid(&credentials()));
        assert!(!XOAuth2::new().is_valid(&Credentials::basic("u", "p")));
        assert!(!XOAuth2::new().is_valid(&Credentials::new()));
    }
}
