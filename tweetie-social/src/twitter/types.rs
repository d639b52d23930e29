use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::fmt;

/// `created_at` layout used by every v1.1 payload, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const TWITTER_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// One timeline entry. `text` holds `full_text` when the payload has it.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "WirePost")]
pub struct RawPost {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub retweet_count: u64,
    pub text: RawText,
    pub entities: RawEntities,
}

/// Extended mode sends `full_text`, compat mode sends `text`; some payloads carry both.
#[derive(Deserialize)]
struct WirePost {
    id: u64,
    #[serde(with = "twitter_date")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    full_text: Option<RawText>,
    #[serde(default)]
    text: Option<RawText>,
    #[serde(default)]
    entities: RawEntities,
}

impl TryFrom<WirePost> for RawPost {
    type Error = String;

    fn try_from(wire: WirePost) -> Result<Self, Self::Error> {
        let text = wire
            .full_text
            .or(wire.text)
            .ok_or_else(|| format!("post {} has neither `full_text` nor `text`", wire.id))?;
        Ok(Self {
            id: wire.id,
            created_at: wire.created_at,
            retweet_count: wire.retweet_count,
            text,
            entities: wire.entities,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntities {
    #[serde(default)]
    pub hashtags: Vec<HashtagEntity>,
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
    #[serde(default)]
    pub user_mentions: Vec<MentionEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HashtagEntity {
    pub text: String,
}

/// `url` is the shortened `t.co` link as it appears in the text.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlEntity {
    pub url: String,
    #[serde(default)]
    pub expanded_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MentionEntity {
    pub screen_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAccount {
    pub name: String,
    pub screen_name: String,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(with = "twitter_date")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub profile_image_url_https: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

/// One page of `friends/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct FriendsPage {
    #[serde(default)]
    pub users: Vec<RawAccount>,
    #[serde(default)]
    pub next_cursor: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedUser {
    pub screen_name: String,
}

/// Post text exactly as received.
///
/// Kept as bytes because the platform occasionally emits lone UTF-16 surrogates, which
/// survive JSON decoding only as non-UTF-8 byte sequences.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawText(Vec<u8>);

impl RawText {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for RawText {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl fmt::Debug for RawText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawText({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl<'de> Deserialize<'de> for RawText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawTextVisitor;

        impl<'de> Visitor<'de> for RawTextVisitor {
            type Value = RawText;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RawText, E> {
                Ok(RawText::from(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<RawText, E> {
                Ok(RawText(v.into_bytes()))
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<RawText, E> {
                Ok(RawText(v.to_vec()))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<RawText, E> {
                Ok(RawText(v))
            }
        }

        deserializer.deserialize_byte_buf(RawTextVisitor)
    }
}

mod twitter_date {
    use super::TWITTER_DATE_FORMAT;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(d)?;
        DateTime::parse_from_str(&s, TWITTER_DATE_FORMAT)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
