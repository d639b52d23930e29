//! Convert raw v1.1 payloads into the records rendered by the views.
use crate::twitter::types::{RawAccount, RawPost, RawText};
use tweetie_common::{FollowedAccount, Post};
use tweetie_sentiment::SentimentAnnotator;

/// Normalize one post and score its text.
///
/// `color` is left unset; the gradient is applied to the whole batch later.
pub fn normalize_post<A>(raw: RawPost, annotator: &A) -> Post
where
    A: SentimentAnnotator + ?Sized,
{
    let text = decode_text(&raw.text);
    let score = annotator.score(&text);

    Post {
        id: raw.id,
        created: raw.created_at,
        retweeted: raw.retweet_count,
        hashtags: raw.entities.hashtags.into_iter().map(|h| h.text).collect(),
        urls: raw.entities.urls.into_iter().map(|u| u.url).collect(),
        mentions: raw
            .entities
            .user_mentions
            .into_iter()
            .map(|m| m.screen_name)
            .collect(),
        text,
        score,
        color: None,
    }
}

/// Text as UTF-8, or only its ASCII bytes when it is not valid UTF-8.
///
/// The platform entity-escapes `&`, `<` and `>`; those are decoded here so the views can
/// escape exactly once.
pub fn decode_text(raw: &RawText) -> String {
    let text = match std::str::from_utf8(raw.as_bytes()) {
        Ok(s) => s.to_owned(),
        Err(_) => {
            tracing::debug!(len = raw.as_bytes().len(), "post.text.ascii_fallback");
            raw.as_bytes()
                .iter()
                .filter(|b| b.is_ascii())
                .map(|&b| b as char)
                .collect()
        }
    };
    html_escape::decode_html_entities(&text).into_owned()
}

pub fn normalize_account(raw: RawAccount) -> FollowedAccount {
    let image = raw
        .profile_image_url_https
        .filter(|s| !s.is_empty())
        .or(raw.profile_image_url)
        .unwrap_or_default();

    FollowedAccount {
        name: raw.name,
        screen_name: raw.screen_name,
        followers: raw.followers_count,
        created: raw.created_at.date_naive(),
        image,
    }
}

/// Most followed first; ties keep their original relative order.
pub fn sort_by_followers(accounts: &mut [FollowedAccount]) {
    accounts.sort_by(|a, b| b.followers.cmp(&a.followers));
}
