use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tweetie_common::observability::init_logging;
use tweetie_config::{TweetieConfig, TweetieConfigLoader};

mod server;

const DEFAULT_CONFIG_FILE: &str = "tweetie.yaml";

/// Serve a user's recent tweets colored by sentiment, and the accounts they follow.
#[derive(Debug, Parser)]
#[command(name = "tweetie", version, about)]
struct Cli {
    /// Credential file holding `consumer_key, consumer_secret, access_token, access_token_secret`.
    #[arg(env = "TWEETIE_CREDENTIALS_FILE")]
    credentials: Option<PathBuf>,

    /// YAML config file. Without it an optional `tweetie.yaml` in the working directory is read.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overriding `server.listen`.
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins over file, CLI wins over both)
    let mut cfg = load_config(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        cfg.server.listen = listen;
    }
    if let Some(path) = cli.credentials {
        cfg.twitter.credentials_file = Some(path.to_string_lossy().into_owned());
    }

    // 2) Logging from the `logging` section
    let log_file = init_logging(cfg.logging.log_config())?;
    tracing::info!(log_file = %log_file.display(), "tweetie.starting");

    server::run(cfg).await
}

fn load_config(explicit: Option<&Path>) -> Result<TweetieConfig> {
    let loader = match explicit {
        Some(path) => TweetieConfigLoader::new().with_file(path),
        None => TweetieConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    Ok(loader.load()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_credentials_and_flags() {
        let cli = Cli::try_parse_from([
            "tweetie",
            "/tmp/twitter.csv",
            "--listen",
            "0.0.0.0:8080",
            "-c",
            "custom.yaml",
        ])
        .unwrap();
        assert_eq!(cli.credentials, Some(PathBuf::from("/tmp/twitter.csv")));
        assert_eq!(cli.listen.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    }

    #[test]
    fn explicit_config_must_exist() {
        assert!(load_config(Some(Path::new("/definitely/not/here.yaml"))).is_err());
    }
}
