//! Run configuration.
//!
//! Everything is read from the process environment. A `.env` file in the
//! working directory is loaded by the binary before [`Config::from_env`] runs,
//! so local credentials never need to be exported by hand.
//!
//! - `DB_CLIENT_ID` / `DB_CLIENT_SECRET` - OAuth client credentials (required)
//! - `GCLICK_API_URL` - API base URL
//! - `GCLICK_EXCLUDED_USERS` - comma-separated user ids to skip
//! - `GCLICK_REPORT_FORMAT` - `xlsx` or `csv`
//! - `GCLICK_REPORT_LANG` - `en` or `pt-BR`
//! - `GCLICK_OUTPUT_DIR` - where report files are written
//! - `GCLICK_DUMP_RAW` - also write the raw task dump
//! - `GCLICK_TOKEN_POLICY` - `per-run`, `per-request` or a max age in seconds
//! - `GCLICK_HTTP_TIMEOUT_SECS` - per-request timeout

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::api::TokenPolicy;
use crate::report::{ReportFormat, ReportLanguage};

pub const DEFAULT_API_URL: &str = "https://api.gclick.com.br";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Errors raised while reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// OAuth client-credentials pair.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Configuration for a single report run.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub credentials: Credentials,
    /// Users whose tasks never enter the report (departed staff).
    pub excluded_user_ids: BTreeSet<i64>,
    pub format: ReportFormat,
    pub language: ReportLanguage,
    pub output_dir: PathBuf,
    /// Write `tarefas_usuario.json` next to the report.
    pub dump_raw: bool,
    pub token_policy: TokenPolicy,
    pub http_timeout: Duration,
}

impl Config {
    /// Build a configuration with defaults for everything except the endpoint
    /// and the credentials.
    pub fn new(api_url: Url, credentials: Credentials) -> Self {
        Self {
            api_url,
            credentials,
            excluded_user_ids: BTreeSet::new(),
            format: ReportFormat::default(),
            language: ReportLanguage::default(),
            output_dir: PathBuf::from("."),
            dump_raw: false,
            token_policy: TokenPolicy::default(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let credentials = Credentials {
            client_id: get("DB_CLIENT_ID").ok_or(ConfigError::Missing("DB_CLIENT_ID"))?,
            client_secret: get("DB_CLIENT_SECRET")
                .ok_or(ConfigError::Missing("DB_CLIENT_SECRET"))?,
        };

        let api_url =
            parse_api_url(&get("GCLICK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()))?;
        let mut config = Self::new(api_url, credentials);

        if let Some(raw) = get("GCLICK_EXCLUDED_USERS") {
            config.excluded_user_ids = parse_id_list(&raw)?;
        }

        if let Some(raw) = get("GCLICK_REPORT_FORMAT") {
            config.format = raw.parse().map_err(|reason| ConfigError::Invalid {
                var: "GCLICK_REPORT_FORMAT",
                reason,
            })?;
        }

        if let Some(raw) = get("GCLICK_REPORT_LANG") {
            config.language = raw.parse().map_err(|reason| ConfigError::Invalid {
                var: "GCLICK_REPORT_LANG",
                reason,
            })?;
        }

        if let Some(raw) = get("GCLICK_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(raw);
        }

        if let Some(raw) = get("GCLICK_DUMP_RAW") {
            config.dump_raw = parse_bool("GCLICK_DUMP_RAW", &raw)?;
        }

        if let Some(raw) = get("GCLICK_TOKEN_POLICY") {
            config.token_policy = raw.parse().map_err(|reason| ConfigError::Invalid {
                var: "GCLICK_TOKEN_POLICY",
                reason,
            })?;
        }

        if let Some(raw) = get("GCLICK_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                var: "GCLICK_HTTP_TIMEOUT_SECS",
                reason: format!("expected a number of seconds, got '{}'", raw),
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }

        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        var: "GCLICK_API_URL",
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            var: "GCLICK_API_URL",
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn parse_id_list(raw: &str) -> Result<BTreeSet<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| ConfigError::Invalid {
                var: "GCLICK_EXCLUDED_USERS",
                reason: format!("'{}' is not a user id", s),
            })
        })
        .collect()
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            reason: format!("expected true/false, got '{}'", raw),
        }),
    }
}
