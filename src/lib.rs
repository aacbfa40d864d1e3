//! # Parere (accounts & two-factor authentication)
//!
//! `parere` is the account service of the Parere feedback platform. It owns
//! password authentication, JWT session tokens, and optional TOTP two-factor
//! authentication with best-effort email delivery of the enrollment code.
//!
//! Feedback collection itself (text + rating + profile image) lives in a
//! sibling service; this crate only touches the `users` table.

pub mod auth;
pub mod cli;
pub mod parere;
