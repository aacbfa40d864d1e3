pub mod email;
pub mod error;
pub mod models;
pub mod otp;
pub mod service;
pub mod store;
pub mod token;

pub use self::error::AuthError;
pub use self::service::AuthService;
