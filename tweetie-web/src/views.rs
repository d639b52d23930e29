//! HTML rendering for both views.
//!
//! Templates are embedded at compile time and filled by placeholder substitution
//! (`{{key}}`). Every interpolated value is escaped for the context it lands in.
use html_escape::{encode_double_quoted_attribute, encode_text};
use tweetie_common::{FollowedAccount, Post};

const TWEETS_TEMPLATE: &str = include_str!("templates/tweets.html");
const FOLLOWING_TEMPLATE: &str = include_str!("templates/following.html");
const MESSAGE_TEMPLATE: &str = include_str!("templates/message.html");

pub fn render_posts(screen_name: &str, median: f64, posts: &[Post]) -> String {
    let name_attr = encode_double_quoted_attribute(screen_name);
    let mut content = String::new();
    for post in posts {
        let color = post
            .color
            .map(|c| c.to_string())
            .unwrap_or_else(|| "inherit".to_string());
        content.push_str(&format!(
            r#"    <li style="list-style:square; font-size:70%; font-family:Verdana, sans-serif; color:{color}">
        {score}: <a style="color:{color}" href="https://twitter.com/{name}/status/{id}">{text}</a>
    </li>
"#,
            score = post.score,
            name = name_attr,
            id = post.id,
            text = encode_text(&post.text),
        ));
    }

    fill(
        TWEETS_TEMPLATE,
        &[
            ("user", &*encode_text(screen_name)),
            ("count", posts.len().to_string().as_str()),
            ("median", format!("{median:.4}").as_str()),
            ("content", content.as_str()),
        ],
    )
}

pub fn render_following(screen_name: &str, accounts: &[FollowedAccount]) -> String {
    let mut content = String::new();
    for account in accounts {
        content.push_str(&format!(
            r#"    <tr>
        <td align=center width="80"><img src="{image}"></td>
        <td style="font-size:70%; font-family:Verdana, sans-serif">
            <a href="https://twitter.com/{screen_name}">{name}</a><br>
            {followers} followers<br>
            Since {created}
        </td>
    </tr>
"#,
            image = encode_double_quoted_attribute(&account.image),
            screen_name = encode_double_quoted_attribute(&account.screen_name),
            name = encode_text(&account.name),
            followers = account.followers,
            created = account.created,
        ));
    }

    fill(
        FOLLOWING_TEMPLATE,
        &[("name", &*encode_text(screen_name)), ("content", content.as_str())],
    )
}

pub fn render_not_found(screen_name: &str) -> String {
    let message = format!("No Twitter user named \"{screen_name}\" could be found.");
    render_message("User not found", &message)
}

/// Generic page for failures whose detail stays in the logs.
pub fn render_message(title: &str, message: &str) -> String {
    fill(
        MESSAGE_TEMPLATE,
        &[("title", &*encode_text(title)), ("message", &*encode_text(message))],
    )
}

/// Single pass over `template`; substituted values are never rescanned.
/// Unknown placeholders are kept verbatim.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
