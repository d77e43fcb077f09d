//! LOGIN mechanism.
//!
//! Obsolete two-step exchange still advertised by many mail servers:
//! the server prompts twice and the client replies with the username
//! and then the password. The prompt text is ignored; some servers
//! send `User Name`/`Password`, Google sends `Username:`.

use crate::codec;
use crate::error::{Result, SaslError};
use crate::mechanism::{Credentials, Mechanism};
use crate::prep::saslprep;

/// LOGIN step machine.
#[derive(Debug, Default)]
pub struct Login {
    step: usize,
}

impl Login {
    /// New machine at step zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mechanism for Login {
    fn is_valid(&self, credentials: &Credentials) -> bool {
        credentials.user.is_some() && credentials.pass.is_some()
    }

    fn respond(&mut self, _challenge: &str, credentials: &Credentials) -> Result<String> {
        let step = self.step;
        self.step += 1;
        match step {
            0 => {
                let user = credentials.user.as_deref().ok_or_else(|| {
                    SaslError::InvalidArgument("LOGIN requires a username".into())
                })?;
                Ok(codec::b64_encode_str(&saslprep(user)))
            }
            1 => {
                let pass = credentials.pass.as_deref().ok_or_else(|| {
                    SaslError::InvalidArgument("LOGIN requires a password".into())
                })?;
                Ok(codec::b64_encode_str(&saslprep(pass)))
            }
            _ => Err(SaslError::TooManySteps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_step_exchange() {
        let credentials = Credentials::basic("tim", "tanstaaftanstaaf");
        let mut login = Login::new();

        // "User Name" prompt, then "Password" prompt.
        assert_eq!(
            login.respond("VXNlciBOYW1lAA==", &credentials).unwrap(),
            "dGlt"
        );
        assert_eq!(
            login.respond("UGFzc3dvcmQA", &credentials).unwrap(),
            "dGFuc3RhYWZ0YW5zdGFhZg=="
        );
        assert!(matches!(
            login.respond("", &credentials),
            Err(SaslError::TooManySteps)
        ));
    }

    #[test]
    fn test_prompt_text_is_ignored() {
        let credentials = Credentials::basic("tim", "tanstaaftanstaaf");
        let mut login = Login::new();
        assert_eq!(login.respond("VXNlcm5hbWU6", &credentials).unwrap(), "dGlt");
    }

    #[test]
    fn test_is_valid() {
        assert!(Login::new().is_valid(&Credentials::basic("u", "p")));
        assert!(!Login::new().is_valid(&Credentials::new()));
    }
}
