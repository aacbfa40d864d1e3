use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ACCESS_TOKEN_DAYS: i64 = 30;
const REFRESH_TOKEN_DAYS: i64 = 60;

/// A freshly minted token together with its validity window in milliseconds,
/// the unit the API has always reported expirations in.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Refresh tokens carry no identifying claim, matching the historical wire
/// format. A redeemed refresh token cannot be tied back to a user; see
/// DESIGN.md for why this is documented rather than fixed.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub iat: i64,
    pub exp: i64,
}

/// Stateless signer for access and refresh tokens. Both use the same
/// process-wide HS256 secret, supplied once at startup.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Mint a 30-day access token embedding the user identifier.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn access_token(&self, user_id: Uuid) -> Result<IssuedToken> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::days(ACCESS_TOKEN_DAYS)).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .context("Failed to sign access token")?;

        Ok(IssuedToken {
            token,
            expires_in_ms: days_to_ms(ACCESS_TOKEN_DAYS),
        })
    }

    /// Mint a 60-day refresh token.
    ///
    /// # Errors
    /// Returns an error if signing fails.
    pub fn refresh_token(&self) -> Result<IssuedToken> {
        let now = Utc::now();
        let claims = RefreshClaims {
            iat: now.timestamp(),
            exp: (now + Duration::days(REFRESH_TOKEN_DAYS)).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)
            .context("Failed to sign refresh token")?;

        Ok(IssuedToken {
            token,
            expires_in_ms: days_to_ms(REFRESH_TOKEN_DAYS),
        })
    }

    /// Validate an access token and return its claims.
    ///
    /// # Errors
    /// Returns an error if the token is malformed, expired, or signed with a
    /// different secret.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.decoding, &Validation::default())
            .context("Invalid or expired access token")?;

        Ok(data.claims)
    }
}

#[allow(clippy::cast_sign_loss)]
const fn days_to_ms(days: i64) -> u64 {
    (days * 24 * 60 * 60 * 1000) as u64
}
