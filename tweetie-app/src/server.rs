use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tweetie_config::{TweetieConfig, TwitterConfig, load_credentials};
use tweetie_social::twitter::{SessionOptions, TwitterSession};
use tweetie_web::AppState;

pub fn session_options(cfg: &TwitterConfig) -> SessionOptions {
    SessionOptions {
        api_url: cfg.api_url.clone(),
        timeout: Duration::from_secs(cfg.timeout_secs),
        max_retries: cfg.max_retries,
        wait_on_rate_limit: cfg.wait_on_rate_limit,
    }
}

/// Credentials → session → shared state. Talks to the network only when
/// `twitter.verify_credentials` is set.
pub async fn build_state(cfg: &TweetieConfig) -> Result<AppState> {
    let path = cfg.twitter.credentials_file.as_deref().context(
        "no credential file: pass CREDENTIALS on the command line or set twitter.credentials_file",
    )?;
    let creds = load_credentials(path)?;
    let session = TwitterSession::authenticate(&creds, session_options(&cfg.twitter))?;

    if cfg.twitter.verify_credentials {
        let owner = session.verify_credentials().await?;
        tracing::info!(screen_name = %owner, "tweetie.credentials.ok");
    }

    Ok(AppState::new(Arc::new(session)))
}

pub async fn run(cfg: TweetieConfig) -> Result<()> {
    let state = build_state(&cfg).await?;
    let listener = TcpListener::bind(cfg.server.listen.as_str())
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.listen))?;

    tweetie_web::serve(listener, state, shutdown_signal()).await?;
    tracing::info!("tweetie.stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "tweetie.signal_handler_failed");
        std::future::pending::<()>().await;
    }
    tracing::info!("tweetie.shutdown_requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn session_options_follow_config() {
        let cfg = TwitterConfig {
            api_url: "http://localhost:9999".into(),
            timeout_secs: 3,
            max_retries: 0,
            wait_on_rate_limit: false,
            ..TwitterConfig::default()
        };
        let opts = session_options(&cfg);
        assert_eq!(opts.api_url, "http://localhost:9999");
        assert_eq!(opts.timeout, Duration::from_secs(3));
        assert_eq!(opts.max_retries, 0);
        assert!(!opts.wait_on_rate_limit);
    }

    #[tokio::test]
    async fn missing_credentials_path_is_an_error() {
        let err = build_state(&TweetieConfig::default()).await.err().unwrap();
        assert!(err.to_string().contains("no credential file"));
    }

    #[tokio::test]
    async fn builds_offline_from_credential_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ck, cs, at, ats").unwrap();

        let mut cfg = TweetieConfig::default();
        cfg.twitter.credentials_file = Some(file.path().to_string_lossy().into_owned());
        assert!(build_state(&cfg).await.is_ok());
    }

    #[tokio::test]
    async fn short_credential_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ck, cs").unwrap();

        let mut cfg = TweetieConfig::default();
        cfg.twitter.credentials_file = Some(file.path().to_string_lossy().into_owned());
        let err = build_state(&cfg).await.err().unwrap();
        assert!(err.to_string().contains("2 field"));
    }
}
