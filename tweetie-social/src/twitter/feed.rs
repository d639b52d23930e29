//! Per-request pipelines: fetch, normalize, score.
use crate::twitter::SocialApi;
use crate::twitter::extract::{normalize_account, normalize_post, sort_by_followers};
use crate::twitter::types::RawPost;
use serde::Serialize;
use tweetie_common::{FollowedAccount, Post, Result};
use tweetie_sentiment::{SentimentAnnotator, VaderAnnotator};

/// A user's recent posts, normalized and scored, in platform order (newest first).
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub user: String,
    pub count: usize,
    pub posts: Vec<Post>,
}

impl Timeline {
    pub fn from_raw<A>(screen_name: &str, raw: Vec<RawPost>, annotator: &A) -> Self
    where
        A: SentimentAnnotator + ?Sized,
    {
        let posts: Vec<Post> = raw
            .into_iter()
            .map(|p| normalize_post(p, annotator))
            .collect();
        Self {
            user: screen_name.to_string(),
            count: posts.len(),
            posts,
        }
    }

    pub fn scores(&self) -> Vec<f64> {
        self.posts.iter().map(|p| p.score).collect()
    }
}

/// Fetch and score up to 100 recent posts. One annotator serves the whole batch.
pub async fn recent_posts(api: &dyn SocialApi, screen_name: &str) -> Result<Timeline> {
    let raw = api.fetch_recent_posts(screen_name).await?;
    let annotator = VaderAnnotator::new();
    let timeline = Timeline::from_raw(screen_name, raw, &annotator);
    tracing::info!(screen_name, count = timeline.count, "feed.timeline.scored");
    Ok(timeline)
}

/// Fetch followed accounts, most followed first.
pub async fn following(api: &dyn SocialApi, screen_name: &str) -> Result<Vec<FollowedAccount>> {
    let raw = api.fetch_following(screen_name).await?;
    let mut accounts: Vec<FollowedAccount> = raw.into_iter().map(normalize_account).collect();
    sort_by_followers(&mut accounts);
    tracing::info!(screen_name, count = accounts.len(), "feed.following.sorted");
    Ok(accounts)
}
