use crate::auth::{
    email::Notifier,
    error::AuthError,
    models::NewUser,
    otp::OtpEngine,
    store::UserStore,
    token::{IssuedToken, TokenIssuer},
};
use anyhow::anyhow;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// Cost factor for newly stored passwords.
const BCRYPT_COST: u32 = 10;

/// Tokens minted on successful signup or login.
#[derive(Debug, Clone)]
pub struct Session {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Orchestrates signup, login and the 2FA lifecycle over the credential
/// store, token issuer, OTP engine and notification sender.
///
/// Every operation is request-scoped; nothing here runs in the background.
#[derive(Clone)]
pub struct AuthService<S> {
    store: S,
    tokens: TokenIssuer,
    otp: OtpEngine,
    notifier: Arc<dyn Notifier>,
}

impl<S: UserStore> AuthService<S> {
    pub fn new(store: S, tokens: TokenIssuer, otp: OtpEngine, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            tokens,
            otp,
            notifier,
        }
    }

    /// Register a new user and hand back a fresh session.
    ///
    /// Input validation (email shape, password length) happens at the HTTP
    /// boundary; this only enforces email uniqueness.
    ///
    /// # Errors
    /// `Conflict` when the email is taken, `Store`/`Internal` on
    /// infrastructure failure.
    pub async fn signup(
        &self,
        first_name: String,
        last_name: String,
        email: String,
        password: String,
    ) -> Result<Session, AuthError> {
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::Conflict);
        }

        let password_hash = hash_password(password).await?;

        // A concurrent signup with the same email loses on the unique index,
        // which surfaces here as Conflict as well.
        let user = self
            .store
            .create(NewUser {
                first_name,
                last_name,
                email,
                password_hash,
            })
            .await?;

        debug!("user {} registered", user.id);

        self.session(user.id)
    }

    /// Authenticate with password, plus an OTP when 2FA is enabled.
    ///
    /// # Errors
    /// `Authentication` for unknown email, wrong password, and missing or
    /// invalid OTP alike; the error is identical across all three so the API
    /// cannot be used to enumerate accounts.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        otp: Option<&str>,
    ) -> Result<Session, AuthError> {
        let Some(user) = self.store.find_by_email(email).await? else {
            return Err(AuthError::Authentication);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            return Err(AuthError::Authentication);
        }

        if user.two_factor_enabled {
            let submitted = otp.ok_or(AuthError::Authentication)?;
            if !self.otp.verify(submitted, user.otp_secret.as_deref()) {
                return Err(AuthError::Authentication);
            }
        }

        self.session(user.id)
    }

    /// Enroll the user in 2FA: install a fresh secret (overwriting any
    /// previous one, which invalidates codes derived from it), mark the user
    /// enabled, and return the current code. The code is also emailed to
    /// `email` on a best-effort basis.
    ///
    /// # Errors
    /// `NotFound` when the user does not exist.
    pub async fn enable_two_factor(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<String, AuthError> {
        let Some(mut user) = self.store.find_by_id(user_id).await? else {
            return Err(AuthError::NotFound("User not found".to_string()));
        };

        let secret = self.otp.generate_secret();
        user.otp_secret = Some(secret.clone());
        user.two_factor_enabled = true;
        self.store.save(&user).await?;

        let initial_otp = self.otp.current_code(&secret)?;

        // Best effort: enrollment must not fail because of a mail outage
        let body = format!("Your initial OTP for 2FA setup is: {initial_otp}");
        if let Err(err) = self
            .notifier
            .send(email, "2FA Setup - Initial OTP", &body)
            .await
        {
            error!("Error sending email: {err:?}");
        }

        Ok(initial_otp)
    }

    /// Turn 2FA off and clear the stored secret.
    ///
    /// # Errors
    /// `NotFound` when the user does not exist.
    pub async fn disable_two_factor(&self, user_id: Uuid) -> Result<(), AuthError> {
        let Some(mut user) = self.store.find_by_id(user_id).await? else {
            return Err(AuthError::NotFound("User not found".to_string()));
        };

        user.otp_secret = None;
        user.two_factor_enabled = false;
        self.store.save(&user).await?;

        Ok(())
    }

    /// QR code (PNG data URL) for enrolling the stored secret in an
    /// authenticator app.
    ///
    /// # Errors
    /// `NotFound` when the user does not exist or has no secret installed.
    pub async fn qr_code(&self, user_id: Uuid) -> Result<String, AuthError> {
        let not_found = || AuthError::NotFound("User not found or 2FA not enabled".to_string());

        let user = self.store.find_by_id(user_id).await?.ok_or_else(not_found)?;
        let secret = user.otp_secret.as_deref().ok_or_else(not_found)?;

        let (_url, qr) = self.otp.provisioning(secret, &user.email)?;

        Ok(qr)
    }

    fn session(&self, user_id: Uuid) -> Result<Session, AuthError> {
        let access = self.tokens.access_token(user_id)?;
        let refresh = self.tokens.refresh_token()?;

        Ok(Session { access, refresh })
    }
}

// bcrypt is CPU-bound; keep it off the async executor
async fn hash_password(password: String) -> Result<String, AuthError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
        .await
        .map_err(|err| anyhow!("Password hashing task failed: {err}"))?
        .map_err(|err| anyhow!("Password hashing failed: {err}"))?;

    Ok(hash)
}

async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|err| anyhow!("Password verification task failed: {err}"))?
        .map_err(|err| anyhow!("Password verification failed: {err}"))?;

    Ok(matches)
}
