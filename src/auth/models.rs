use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One registrant of the feedback platform.
///
/// `otp_secret` is a base32 TOTP seed; it is present only while two-factor
/// authentication is enabled and cleared again on disable.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub otp_secret: Option<String>,
    pub two_factor_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields persisted when a new user signs up. The password arrives here
/// already hashed; plaintext never reaches the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}
