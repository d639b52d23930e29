//! OAuth 1.0a user-context session over the Twitter v1.1 REST API.
//!
//! Builds the shared HTTP client with Tweetie defaults, shapes request parameters, and
//! translates transport failures into [`TweetieError`] kinds the views understand.
use crate::twitter::SocialApi;
use crate::twitter::oauth::OAuth1Signer;
use crate::twitter::types::{FriendsPage, RawAccount, RawPost, VerifiedUser};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;
use tweetie_common::{Credentials, Result, TweetieError};
use tweetie_http::{Auth, HttpClient, HttpError, RequestOpts};

/// Records requested per call; one page, no cursor following.
pub const PAGE_SIZE: usize = 100;

const USER_TIMELINE: &str = "1.1/statuses/user_timeline.json";
const FRIENDS_LIST: &str = "1.1/friends/list.json";
const VERIFY_CREDENTIALS: &str = "1.1/account/verify_credentials.json";

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub api_url: String,
    pub timeout: Duration,
    pub max_retries: usize,
    /// Sleep through 429 responses instead of failing the request.
    pub wait_on_rate_limit: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            api_url: "https://api.twitter.com".to_string(),
            timeout: Duration::from_secs(15),
            max_retries: 2,
            wait_on_rate_limit: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TwitterSession {
    http: HttpClient,
    signer: std::sync::Arc<OAuth1Signer>,
}

impl TwitterSession {
    /// Prepare a signed session. No network traffic happens here.
    ///
    /// Fails with [`TweetieError::Auth`] when any credential field is empty or holds
    /// anything but printable ASCII, and with [`TweetieError::Config`] when `api_url` is
    /// not a URL.
    pub fn authenticate(creds: &Credentials, opts: SessionOptions) -> Result<Self> {
        const NAMES: [&str; 4] = [
            "consumer_key",
            "consumer_secret",
            "access_token",
            "access_token_secret",
        ];
        for (name, value) in NAMES.iter().zip(creds.fields()) {
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_graphic()) {
                return Err(TweetieError::Auth(format!("{name} is empty or malformed")));
            }
        }

        let http = HttpClient::new(&opts.api_url)
            .map_err(|e| TweetieError::Config(format!("api_url {:?}: {e}", opts.api_url)))?
            .with_timeout(opts.timeout)
            .with_retries(opts.max_retries)
            .with_rate_limit_wait(opts.wait_on_rate_limit);

        tracing::info!(
            api_url = %opts.api_url,
            wait_on_rate_limit = opts.wait_on_rate_limit,
            "twitter.session.ready"
        );

        Ok(Self {
            http,
            signer: std::sync::Arc::new(OAuth1Signer::new(creds)),
        })
    }

    /// Ask the platform who these credentials belong to.
    ///
    /// Unlike the per-user fetches, a 401 or 404 here means the credentials themselves
    /// were rejected.
    pub async fn verify_credentials(&self) -> Result<String> {
        let user: VerifiedUser = self
            .get(VERIFY_CREDENTIALS, vec![("skip_status", "true".into())])
            .await
            .map_err(|e| match e {
                HttpError::Api {
                    status: StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND,
                    message,
                    ..
                } => TweetieError::Auth(format!("credentials were not recognised: {message}")),
                other => map_http_error(other, ""),
            })?;
        tracing::info!(screen_name = %user.screen_name, "twitter.credentials.verified");
        Ok(user.screen_name)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(&str, Cow<'_, str>)>,
    ) -> std::result::Result<T, HttpError> {
        self.http
            .get_json(
                path,
                RequestOpts {
                    auth: Some(Auth::Signed(self.signer.as_ref())),
                    query: Some(query),
                    ..Default::default()
                },
            )
            .await
    }
}

#[async_trait]
impl SocialApi for TwitterSession {
    async fn fetch_recent_posts(&self, screen_name: &str) -> Result<Vec<RawPost>> {
        validate_screen_name(screen_name)?;

        let mut posts: Vec<RawPost> = self
            .get(
                USER_TIMELINE,
                vec![
                    ("screen_name", screen_name.into()),
                    ("count", PAGE_SIZE.to_string().into()),
                    ("include_rts", "false".into()),
                    ("tweet_mode", "extended".into()),
                ],
            )
            .await
            .map_err(|e| map_http_error(e, screen_name))?;
        posts.truncate(PAGE_SIZE);

        tracing::debug!(screen_name, count = posts.len(), "twitter.timeline.fetched");
        Ok(posts)
    }

    async fn fetch_following(&self, screen_name: &str) -> Result<Vec<RawAccount>> {
        validate_screen_name(screen_name)?;

        let page: FriendsPage = self
            .get(
                FRIENDS_LIST,
                vec![
                    ("screen_name", screen_name.into()),
                    ("count", PAGE_SIZE.to_string().into()),
                    ("skip_status", "true".into()),
                    ("include_user_entities", "false".into()),
                ],
            )
            .await
            .map_err(|e| map_http_error(e, screen_name))?;

        let mut users = page.users;
        users.truncate(PAGE_SIZE);
        tracing::debug!(
            screen_name,
            count = users.len(),
            has_more = page.next_cursor != 0,
            "twitter.following.fetched"
        );
        Ok(users)
    }
}

/// Screen names are 1 to 15 ASCII letters, digits or underscores.
pub fn validate_screen_name(screen_name: &str) -> Result<()> {
    let ok = (1..=15).contains(&screen_name.len())
        && screen_name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(TweetieError::NotFound(screen_name.to_string()))
    }
}

/// Per-user fetches: a 401 (typically a protected account) is `Remote`, never `Auth`.
fn map_http_error(err: HttpError, screen_name: &str) -> TweetieError {
    match err {
        HttpError::Api {
            status, message, ..
        } => match status {
            StatusCode::NOT_FOUND => TweetieError::NotFound(screen_name.to_string()),
            StatusCode::TOO_MANY_REQUESTS => TweetieError::RateLimited {
                retry_after_secs: None,
            },
            _ => TweetieError::Remote(format!("{status}: {message}")),
        },
        HttpError::RateLimited { retry_after_secs } => {
            TweetieError::RateLimited { retry_after_secs }
        }
        HttpError::Decode(msg, snippet) => {
            TweetieError::Decode(format!("{msg} (body starts: {snippet})"))
        }
        HttpError::Url(msg) | HttpError::Build(msg) | HttpError::Network(msg) => {
            TweetieError::Remote(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("ck", "cs", "at", "ats")
    }

    #[test]
    fn authenticate_is_offline() {
        let session = TwitterSession::authenticate(&creds(), SessionOptions::default());
        assert!(session.is_ok());
    }

    #[test]
    fn authenticate_rejects_blank_fields() {
        let bad = Credentials::new("ck", "", "at", "ats");
        let err = TwitterSession::authenticate(&bad, SessionOptions::default()).unwrap_err();
        assert!(matches!(err, TweetieError::Auth(ref m) if m.contains("consumer_secret")));

        for token in ["a t", "at\u{7}", "\u{e9}t"] {
            let bad = Credentials::new("ck", "cs", token, "ats");
            let err = TwitterSession::authenticate(&bad, SessionOptions::default()).unwrap_err();
            assert!(matches!(err, TweetieError::Auth(ref m) if m.contains("access_token")));
        }
    }

    #[test]
    fn authenticate_rejects_bad_api_url() {
        let opts = SessionOptions {
            api_url: "not a url".into(),
            ..Default::default()
        };
        let err = TwitterSession::authenticate(&creds(), opts).unwrap_err();
        assert!(matches!(err, TweetieError::Config(_)));
    }

    #[test]
    fn screen_name_rules() {
        assert!(validate_screen_name("jack").is_ok());
        assert!(validate_screen_name("A_1").is_ok());
        assert!(validate_screen_name("abcdefghijklmno").is_ok());
        assert!(validate_screen_name("").is_err());
        assert!(validate_screen_name("abcdefghijklmnop").is_err());
        assert!(validate_screen_name("no-dash").is_err());
        assert!(validate_screen_name("caf\u{e9}").is_err());
    }

    #[test]
    fn http_errors_map_to_user_facing_kinds() {
        let api = |status| HttpError::Api {
            status,
            message: "m".into(),
            request_id: "-".into(),
        };
        assert!(matches!(
            map_http_error(api(StatusCode::NOT_FOUND), "ghost"),
            TweetieError::NotFound(ref n) if n == "ghost"
        ));
        assert!(matches!(
            map_http_error(api(StatusCode::UNAUTHORIZED), "x"),
            TweetieError::Remote(ref m) if m.starts_with("401")
        ));
        assert!(matches!(
            map_http_error(api(StatusCode::BAD_GATEWAY), "x"),
            TweetieError::Remote(_)
        ));
        assert!(matches!(
            map_http_error(
                HttpError::RateLimited {
                    retry_after_secs: Some(9)
                },
                "x"
            ),
            TweetieError::RateLimited {
                retry_after_secs: Some(9)
            }
        ));
        assert!(matches!(
            map_http_error(HttpError::Decode("bad".into(), "<html>".into()), "x"),
            TweetieError::Decode(_)
        ));
        assert!(matches!(
            map_http_error(HttpError::Network("reset".into()), "x"),
            TweetieError::Remote(_)
        ));
    }
}
