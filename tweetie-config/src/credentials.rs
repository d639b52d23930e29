//! Reader for the single-line credential file.
//!
//! The file holds `consumer_key, consumer_secret, access_token, access_token_secret` on its
//! first line, separated by a comma and a space. There is no quoting or escaping, so a
//! field containing `", "` cannot be represented.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tweetie_common::{Credentials, Result, TweetieError};

const FIELD_DELIMITER: &str = ", ";
const FIELD_COUNT: usize = 4;

/// Read the first line of `path` and split it into [`Credentials`].
///
/// `~/` and `${VAR}` in the path are expanded before opening.
pub fn load_credentials<P: AsRef<Path>>(path: P) -> Result<Credentials> {
    let raw = path.as_ref().to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .map_err(|e| TweetieError::Config(format!("cannot expand credential path {raw}: {e}")))?;
    let path = Path::new(expanded.as_ref());

    let file = File::open(path).map_err(|e| {
        TweetieError::Config(format!(
            "cannot open credential file {}: {e}",
            path.display()
        ))
    })?;

    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(|e| {
            TweetieError::Config(format!(
                "cannot read credential file {}: {e}",
                path.display()
            ))
        })?;

    let creds = parse_credentials_line(&first_line)?;
    tracing::debug!(path = %path.display(), "credentials.loaded");
    Ok(creds)
}

/// Split one credential line into its four fields.
///
/// ```
/// use tweetie_config::parse_credentials_line;
///
/// let creds = parse_credentials_line("k1, s1, t1, ts1\n").unwrap();
/// assert_eq!(creds.fields(), ["k1", "s1", "t1", "ts1"]);
/// ```
pub fn parse_credentials_line(line: &str) -> Result<Credentials> {
    let line = line.trim();
    if line.is_empty() {
        return Err(TweetieError::Config("credential file is empty".into()));
    }

    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() < FIELD_COUNT {
        return Err(TweetieError::Config(format!(
            "credential line has {} field(s), expected {FIELD_COUNT} separated by {FIELD_DELIMITER:?}",
            fields.len()
        )));
    }
    if fields.len() > FIELD_COUNT {
        tracing::warn!(
            extra = fields.len() - FIELD_COUNT,
            "credentials.extra_fields_ignored"
        );
    }

    Ok(Credentials::new(fields[0], fields[1], fields[2], fields[3]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_comma_space() {
        let creds = parse_credentials_line("k1, s1, t1, ts1").unwrap();
        assert_eq!(creds.consumer_key, "k1");
        assert_eq!(creds.consumer_secret, "s1");
        assert_eq!(creds.access_token, "t1");
        assert_eq!(creds.access_token_secret, "ts1");
    }

    #[test]
    fn bare_commas_do_not_split() {
        let err = parse_credentials_line("k1,s1,t1,ts1").unwrap_err();
        assert!(matches!(err, TweetieError::Config(_)));
    }

    #[test]
    fn too_few_fields_is_config_error() {
        let err = parse_credentials_line("k1, s1, t1").unwrap_err();
        assert!(matches!(err, TweetieError::Config(msg) if msg.contains("3 field")));
    }

    #[test]
    fn blank_line_is_config_error() {
        assert!(matches!(
            parse_credentials_line("   \r\n"),
            Err(TweetieError::Config(_))
        ));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let creds = parse_credentials_line("a, b, c, d, e").unwrap();
        assert_eq!(creds.fields(), ["a", "b", "c", "d"]);
    }
}
