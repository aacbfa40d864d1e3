pub mod health;
pub use self::health::health;

pub mod user_signup;
pub use self::user_signup::signup;

pub mod user_login;
pub use self::user_login::login;

pub mod two_factor;
pub use self::two_factor::{disable_two_factor, enable_two_factor, qr_code};

// common functions and response shapes for the handlers
use crate::auth::service::Session;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

pub fn valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

/// Body returned by signup and login: both tokens plus their validity
/// windows in milliseconds.
#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    message: String,
    access_token: String,
    refresh_token: String,
    access_token_expiration: u64,
    refresh_token_expiration: u64,
}

impl SessionResponse {
    pub(crate) fn new(message: &str, session: Session) -> Self {
        Self {
            message: message.to_string(),
            access_token: session.access.token,
            refresh_token: session.refresh.token,
            access_token_expiration: session.access.expires_in_ms,
            refresh_token_expiration: session.refresh.expires_in_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(valid_email("a@b.com"));
        assert!(valid_email("first.last@sub.example.org"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing@tld"));
        assert!(!valid_email("spaces in@b.com"));
        assert!(!valid_email("two@@b.com"));
    }

    #[test]
    fn test_valid_password() {
        assert!(valid_password("longpass1"));
        assert!(valid_password("12345678"));
        assert!(!valid_password("short"));
        assert!(!valid_password("1234567"));
    }

    #[test]
    fn test_session_response_field_names() {
        use crate::auth::token::IssuedToken;

        let session = Session {
            access: IssuedToken {
                token: "a".to_string(),
                expires_in_ms: 2_592_000_000,
            },
            refresh: IssuedToken {
                token: "r".to_string(),
                expires_in_ms: 5_184_000_000,
            },
        };

        let body = serde_json::to_value(SessionResponse::new("Login successful", session)).unwrap();
        assert_eq!(body["message"], "Login successful");
        assert_eq!(body["accessToken"], "a");
        assert_eq!(body["refreshToken"], "r");
        assert_eq!(body["accessTokenExpiration"], 2_592_000_000_u64);
        assert_eq!(body["refreshTokenExpiration"], 5_184_000_000_u64);
    }
}
