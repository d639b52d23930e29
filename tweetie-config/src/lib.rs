//! Loader for Tweetie configuration with YAML + environment overlays.
//!
//! Sources are merged in order: optional YAML file(s), inline snippets, then
//! `TWEETIE__`-prefixed environment variables (`__` separates nesting levels, e.g.
//! `TWEETIE__SERVER__LISTEN`). String values may reference `${VAR}` placeholders, which
//! are expanded after the merge. Every field has a default, so an empty config is valid.
//!
//! The credential file itself is not part of this schema; see [`credentials`].
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tweetie_common::observability::{LogConfig, LogFormat};

pub mod credentials;

pub use credentials::{load_credentials, parse_credentials_line};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TweetieConfig {
    pub server: ServerConfig,
    pub twitter: TwitterConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:5000".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    /// Path to the `key, secret, token, token_secret` file. `~/` is expanded.
    pub credentials_file: Option<String>,
    pub api_url: String,
    /// Sleep through 429 responses instead of failing the request.
    pub wait_on_rate_limit: bool,
    pub timeout_secs: u64,
    pub max_retries: usize,
    /// Call `account/verify_credentials` once at startup.
    pub verify_credentials: bool,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            credentials_file: None,
            api_url: "https://api.twitter.com".into(),
            wait_on_rate_limit: true,
            timeout_secs: 15,
            max_retries: 2,
            verify_credentials: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `text` or `json`.
    pub format: String,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub filter: String,
    pub emit_stderr: bool,
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "text".into(),
            filter: "info".into(),
            emit_stderr: true,
            dir: None,
        }
    }
}

impl LoggingConfig {
    /// Translate into the observability settings used by `init_logging`.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self
                .dir
                .as_deref()
                .map(|d| PathBuf::from(shellexpand::tilde(d).into_owned())),
            emit_stderr: self.emit_stderr,
            format: LogFormat::from_name(&self.format),
            default_filter: self.filter.clone(),
            ..LogConfig::default()
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct TweetieConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TweetieConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TweetieConfigLoader {
    /// Start with defaults plus `TWEETIE__` env overrides.
    ///
    /// ```
    /// use tweetie_config::TweetieConfigLoader;
    ///
    /// let config = TweetieConfigLoader::new()
    ///     .with_yaml_str("server:\n  listen: '0.0.0.0:8080'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.server.listen, "0.0.0.0:8080");
    /// assert!(config.twitter.wait_on_rate_limit);
    /// ```
    pub fn new() -> Self {
        let builder = Config::builder();
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file that must exist; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when absent.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use tweetie_config::TweetieConfigLoader;
    ///
    /// let cfg = TweetieConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// twitter:
    ///   credentials_file: "/etc/tweetie/twitter.csv"
    ///   wait_on_rate_limit: false
    /// logging:
    ///   format: json
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.twitter.credentials_file.as_deref(), Some("/etc/tweetie/twitter.csv"));
    /// assert!(!cfg.twitter.wait_on_rate_limit);
    /// assert_eq!(cfg.logging.format, "json");
    /// assert_eq!(cfg.server.listen, "127.0.0.1:5000");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment overrides are applied last, then `${VAR}` placeholders are expanded.
    ///
    /// ```
    /// use tweetie_config::TweetieConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_CREDS_PATH", "/run/secrets/twitter.csv"); }
    ///
    /// let config = TweetieConfigLoader::new()
    ///     .with_yaml_str("twitter:\n  credentials_file: \"${DOC_CREDS_PATH}\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(
    ///     config.twitter.credentials_file.as_deref(),
    ///     Some("/run/secrets/twitter.csv")
    /// );
    ///
    /// unsafe { std::env::remove_var("DOC_CREDS_PATH"); }
    /// ```
    pub fn load(self) -> Result<TweetieConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("TWEETIE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: TweetieConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
