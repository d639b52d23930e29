//! Twitter v1.1 integration surface exposed to the web layer.
//!
//! [`SocialApi`] is the capability the handlers depend on; [`TwitterSession`] is the
//! OAuth 1.0a backed implementation. Raw payloads live in [`types`], are normalized by
//! [`extract`], and [`feed`] strings the two together per request.
//!
//! Rate limits are enforced by the platform, not here: 900 timeline fetches and only 15
//! following fetches per 15-minute window.
use async_trait::async_trait;
use tweetie_common::Result;

pub mod client;
pub mod extract;
pub mod feed;
pub mod oauth;
pub mod types;

pub use client::{PAGE_SIZE, SessionOptions, TwitterSession};
pub use feed::{Timeline, following, recent_posts};
pub use types::{RawAccount, RawPost};

/// Remote operations needed to build both views.
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Up to 100 most recent posts by `screen_name`, reposts excluded.
    async fn fetch_recent_posts(&self, screen_name: &str) -> Result<Vec<RawPost>>;

    /// Up to 100 accounts followed by `screen_name`.
    async fn fetch_following(&self, screen_name: &str) -> Result<Vec<RawAccount>>;
}
