use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use tokio::net::TcpListener;
use tweetie_common::{Result, TweetieError};
use tweetie_social::twitter::types::{RawAccount, RawEntities, RawText};
use tweetie_social::twitter::{RawPost, SocialApi};
use tweetie_web::{AppState, serve};

/// Serves canned data for `alice`, nothing for `quiet`, and fails for everyone else.
struct FakeTwitter;

#[async_trait]
impl SocialApi for FakeTwitter {
    async fn fetch_recent_posts(&self, screen_name: &str) -> Result<Vec<RawPost>> {
        match screen_name {
            "alice" => Ok(vec![
                post(2, "I love this! Best day ever."),
                post(1, "This is awful &amp; I hate it."),
            ]),
            "quiet" => Ok(vec![]),
            "busy" => Err(TweetieError::RateLimited {
                retry_after_secs: Some(60),
            }),
            "broken" => Err(TweetieError::Decode("unexpected payload".into())),
            other => Err(TweetieError::NotFound(other.into())),
        }
    }

    async fn fetch_following(&self, screen_name: &str) -> Result<Vec<RawAccount>> {
        match screen_name {
            "alice" => Ok(vec![account("bob", 10), account("carol", 2000)]),
            other => Err(TweetieError::NotFound(other.into())),
        }
    }
}

fn post(id: u64, text: &str) -> RawPost {
    RawPost {
        id,
        created_at: Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap(),
        retweet_count: 0,
        text: RawText::from(text),
        entities: RawEntities::default(),
    }
}

fn account(screen_name: &str, followers: u64) -> RawAccount {
    RawAccount {
        name: screen_name.to_uppercase(),
        screen_name: screen_name.into(),
        followers_count: followers,
        created_at: Utc.with_ymd_and_hms(2011, 6, 1, 12, 0, 0).unwrap(),
        profile_image_url_https: Some(format!("https://img/{screen_name}.png")),
        profile_image_url: None,
    }
}

async fn spawn() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(
        listener,
        AppState::new(Arc::new(FakeTwitter)),
        std::future::pending(),
    ));
    addr
}

async fn get(addr: SocketAddr, path: &str) -> (StatusCode, reqwest::header::HeaderMap, String) {
    let resp = reqwest::get(format!("http://{addr}{path}")).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    (status, headers, resp.text().await.unwrap())
}

#[tokio::test]
async fn tweets_page_colors_and_links_posts() {
    let addr = spawn().await;
    let (status, headers, body) = get(addr, "/alice").await;

    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[reqwest::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert_eq!(body.matches("<li ").count(), 2);
    assert!(body.contains("https://twitter.com/alice/status/2"));
    assert!(body.contains("color:#"));
    assert!(body.contains("awful &amp; I hate"));
    // Newest first, as delivered.
    assert!(body.find("status/2").unwrap() < body.find("status/1").unwrap());
}

#[tokio::test]
async fn empty_timeline_renders_full_page() {
    let addr = spawn().await;
    let (status, _, body) = get(addr, "/quiet").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("</html>"));
    assert!(body.contains("median sentiment score 0.0000"));
}

#[tokio::test]
async fn following_page_is_sorted() {
    let addr = spawn().await;
    let (status, _, body) = get(addr, "/following/alice").await;

    assert_eq!(status, StatusCode::OK);
    let carol = body.find("twitter.com/carol").unwrap();
    let bob = body.find("twitter.com/bob").unwrap();
    assert!(carol < bob);
    assert!(body.contains("2000 followers"));
    assert!(body.contains("Since 2011-06-01"));
}

#[tokio::test]
async fn unknown_user_is_404() {
    let addr = spawn().await;
    let (status, _, body) = get(addr, "/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("nobody"));

    let (status, _, _) = get(addr, "/following/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rate_limit_is_503_with_retry_after() {
    let addr = spawn().await;
    let (status, headers, _) = get(addr, "/busy").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(headers[reqwest::header::RETRY_AFTER], "60");
}

#[tokio::test]
async fn other_failures_are_500() {
    let addr = spawn().await;
    let (status, _, body) = get(addr, "/broken").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("unexpected payload"));
}
