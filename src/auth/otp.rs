use anyhow::{anyhow, Result};
use totp_rs::{Algorithm, Secret, TOTP};

const DIGITS: usize = 6;
// ±2 steps of 30 seconds, so codes survive up to a minute of clock drift
const SKEW: u8 = 2;
const STEP: u64 = 30;

/// Time-based one-time-password engine: 6-digit SHA-1 codes over 30-second
/// windows, secrets stored base32-encoded.
#[derive(Debug, Clone)]
pub struct OtpEngine {
    issuer: String,
}

impl OtpEngine {
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }

    /// Generate a fresh 20-byte secret, base32-encoded.
    #[must_use]
    pub fn generate_secret(&self) -> String {
        Secret::generate_secret().to_encoded().to_string()
    }

    /// Compute the code for the current window.
    ///
    /// # Errors
    /// Returns an error if the secret is malformed or the system clock is
    /// unreadable.
    pub fn current_code(&self, secret: &str) -> Result<String> {
        let code = self
            .totp(secret, "user")?
            .generate_current()
            .map_err(|e| anyhow!("OTP generation error: {e}"))?;

        Ok(code)
    }

    /// Check a submitted code against the secret, tolerating `SKEW` windows
    /// on either side of now. An absent or malformed secret never verifies.
    #[must_use]
    pub fn verify(&self, code: &str, secret: Option<&str>) -> bool {
        let Some(secret) = secret else {
            return false;
        };

        let Ok(totp) = self.totp(secret, "user") else {
            return false;
        };

        totp.check_current(code).unwrap_or(false)
    }

    /// Build the otpauth provisioning URL and a PNG QR code (data URL) for
    /// enrolling the secret in an authenticator app.
    ///
    /// # Errors
    /// Returns an error if the secret is malformed or QR rendering fails.
    pub fn provisioning(&self, secret: &str, account: &str) -> Result<(String, String)> {
        let totp = self.totp(secret, account)?;

        let url = totp.get_url();
        let qr = totp
            .get_qr_base64()
            .map_err(|e| anyhow!("QR generation error: {e}"))?;

        Ok((url, format!("data:image/png;base64,{qr}")))
    }

    fn totp(&self, secret: &str, account: &str) -> Result<TOTP> {
        let secret_bytes = Secret::Encoded(secret.to_string())
            .to_bytes()
            .map_err(|e| anyhow!("Invalid OTP secret: {e:?}"))?;

        TOTP::new(
            Algorithm::SHA1,
            DIGITS,
            SKEW,
            STEP,
            secret_bytes,
            Some(self.issuer.clone()),
            account.to_string(),
        )
        .map_err(|e| anyhow!("TOTP init error: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> OtpEngine {
        OtpEngine::new("Parere")
    }

    #[test]
    fn test_generated_secret_is_base32() {
        let secret = engine().generate_secret();
        // 20 raw bytes encode to 32 base32 characters
        assert_eq!(secret.len(), 32);
        assert!(secret
            .chars()
            .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
    }

    #[test]
    fn test_secrets_are_unique() {
        let engine = engine();
        assert_ne!(engine.generate_secret(), engine.generate_secret());
    }

    #[test]
    fn test_current_code_is_six_digits() {
        let engine = engine();
        let secret = engine.generate_secret();
        let code = engine.current_code(&secret).unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_verify_accepts_current_code() {
        let engine = engine();
        let secret = engine.generate_secret();
        let code = engine.current_code(&secret).unwrap();
        assert!(engine.verify(&code, Some(&secret)));
    }

    #[test]
    fn test_verify_tolerates_two_steps_of_drift() {
        use std::time::{SystemTime, UNIX_EPOCH};

        let engine = engine();
        let secret = engine.generate_secret();

        let bytes = Secret::Encoded(secret.clone()).to_bytes().unwrap();
        let totp = TOTP::new(
            Algorithm::SHA1,
            DIGITS,
            SKEW,
            STEP,
            bytes,
            Some("Parere".to_string()),
            "user".to_string(),
        )
        .unwrap();

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // codes from 60 s either side of now fall inside the ±2-step window
        assert!(engine.verify(&totp.generate(now - 60), Some(&secret)));
        assert!(engine.verify(&totp.generate(now + 60), Some(&secret)));

        // 120 s back is 4 steps away and must not verify
        assert!(!engine.verify(&totp.generate(now - 120), Some(&secret)));
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let engine = engine();
        let secret = engine.generate_secret();
        let other = engine.generate_secret();
        let code = engine.current_code(&secret).unwrap();
        assert!(!engine.verify(&code, Some(&other)));
    }

    #[test]
    fn test_verify_rejects_absent_or_malformed_secret() {
        let engine = engine();
        assert!(!engine.verify("123456", None));
        assert!(!engine.verify("123456", Some("not base32 at all!")));
    }

    #[test]
    fn test_provisioning_url_names_issuer_and_account() {
        let engine = engine();
        let secret = engine.generate_secret();
        let (url, qr) = engine.provisioning(&secret, "a@b.com").unwrap();
        assert!(url.starts_with("otpauth://totp/"));
        assert!(url.contains("Parere"));
        assert!(url.contains("a%40b.com") || url.contains("a@b.com"));
        assert!(qr.starts_with("data:image/png;base64,"));
    }
}
