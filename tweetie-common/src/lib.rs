//! Common types and utilities shared across Tweetie crates.
//!
//! This crate defines the normalized records that flow from the Twitter session to the
//! HTML views, the credential tuple, observability helpers, and the shared error type.
//! It stays dependency-light so every crate in the workspace can pull it in.
//!
//! # Overview
//!
//! - [`Credentials`]: the four OAuth 1.0a secrets
//! - [`Post`] and [`FollowedAccount`]: normalized records handed to the views
//! - [`Rgb`]: a gradient color attached to a post
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`TweetieError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use tweetie_common::Rgb;
//!
//! let red = Rgb::new(255, 0, 0);
//! assert_eq!(red.to_string(), "#ff0000");
//! ```
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};

pub mod observability;

/// OAuth 1.0a user-context secrets, in the order they appear in the credential file.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl Credentials {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: access_token.into(),
            access_token_secret: access_token_secret.into(),
        }
    }

    /// The four fields in file order.
    pub fn fields(&self) -> [&str; 4] {
        [
            &self.consumer_key,
            &self.consumer_secret,
            &self.access_token,
            &self.access_token_secret,
        ]
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// An 8-bit sRGB color, rendered as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single status update, normalized and annotated with sentiment.
///
/// `color` is `None` until the color mapper has run over the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: u64,
    pub created: DateTime<Utc>,
    /// Number of times the post was reposted.
    pub retweeted: u64,
    pub text: String,
    pub hashtags: Vec<String>,
    pub urls: Vec<String>,
    pub mentions: Vec<String>,
    /// Compound polarity in `[-1.0, 1.0]`.
    pub score: f64,
    pub color: Option<Rgb>,
}

/// An account followed by the requested user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowedAccount {
    pub name: String,
    pub screen_name: String,
    pub followers: u64,
    pub created: NaiveDate,
    pub image: String,
}

/// Error types used across the Tweetie system.
#[derive(thiserror::Error, Debug)]
pub enum TweetieError {
    /// Credential file or configuration was missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credentials were structurally invalid or rejected by the platform.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The platform rate limiter engaged and waiting was not possible.
    #[error("Rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The requested screen name does not exist.
    #[error("User not found: {0}")]
    NotFound(String),

    /// Any other failure talking to the remote API.
    #[error("Remote API error: {0}")]
    Remote(String),

    /// The remote API answered with a payload we could not decode.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Convenient alias for results that use [`TweetieError`].
pub type Result<T> = std::result::Result<T, TweetieError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_renders_as_lowercase_hex() {
        assert_eq!(Rgb::new(0, 128, 0).to_string(), "#008000");
        assert_eq!(
            serde_json::to_string(&Rgb::new(255, 10, 171)).unwrap(),
            "\"#ff0aab\""
        );
    }

    #[test]
    fn credentials_debug_hides_secrets() {
        let creds = Credentials::new("key", "shh", "token", "also-shh");
        let dbg = format!("{creds:?}");
        assert!(dbg.contains("key"));
        assert!(!dbg.contains("shh"));
        assert!(!dbg.contains("token\""));
        assert_eq!(creds.fields(), ["key", "shh", "token", "also-shh"]);
    }
}
