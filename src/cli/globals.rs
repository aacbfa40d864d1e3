use secrecy::SecretString;

/// Process-wide configuration, built once at startup from CLI/env arguments
/// and injected into the token issuer and notification sender.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub jwt_secret: SecretString,
    pub otp_issuer: String,
    pub smtp: Option<SmtpArgs>,
}

#[derive(Debug, Clone)]
pub struct SmtpArgs {
    pub relay: String,
    pub username: String,
    pub password: SecretString,
    pub from: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(jwt_secret: SecretString, otp_issuer: String) -> Self {
        Self {
            jwt_secret,
            otp_issuer,
            smtp: None,
        }
    }

    pub fn set_smtp(&mut self, smtp: SmtpArgs) {
        self.smtp = Some(smtp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            SecretString::from("signing-secret".to_string()),
            "Parere".to_string(),
        );
        assert_eq!(args.jwt_secret.expose_secret(), "signing-secret");
        assert_eq!(args.otp_issuer, "Parere");
        assert!(args.smtp.is_none());
    }

    #[test]
    fn test_set_smtp() {
        let mut args = GlobalArgs::new(
            SecretString::from("signing-secret".to_string()),
            "Parere".to_string(),
        );
        args.set_smtp(SmtpArgs {
            relay: "smtp.example.com".to_string(),
            username: "mailer".to_string(),
            password: SecretString::from("hunter2".to_string()),
            from: "Parere <no-reply@parere.dev>".to_string(),
        });
        assert!(args.smtp.is_some());
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let args = GlobalArgs::new(
            SecretString::from("signing-secret".to_string()),
            "Parere".to_string(),
        );
        assert!(!format!("{args:?}").contains("signing-secret"));
    }
}
