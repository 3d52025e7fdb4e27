//! Configuration types for wcp-report.
//!
//! [`Config::load`] layers, lowest precedence first:
//!
//! 1. the embedded defaults below,
//! 2. a TOML file (`--config`, else `$XDG_CONFIG_HOME/wcp-report/config.toml`
//!    if it exists),
//! 3. the deployment's environment variables (`API_KEY`, `EMAIL_SENDER`, …),
//!    after loading a local `.env` unless running on ECS.
//!
//! [`Config::defaults`] returns the embedded defaults without touching the
//! filesystem or the environment (useful in tests).

use crate::error::ConfigError;
use crate::export::ExportFormat;
use crate::normalizer::{RunAliases, RunNormalizer};
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[detrack]
base_url    = "https://app.detrack.com/api/v2"
api_key     = ""
fetch_limit = 1000

[smtp]
host      = "smtp.gmail.com"
port      = 587
sender    = ""
password  = ""
receivers = ""

[report]
status     = "completed"
timezone   = "Australia/Brisbane"
format     = "csv"
output_dir = "."
snapshot   = "jobs.json"

[aliases.routes]

[aliases.times]
"#;

/// Environment variables the scheduled task is deployed with, and the config
/// keys they override.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("BASE_URL", "detrack.base_url"),
    ("API_KEY", "detrack.api_key"),
    ("FETCH_LIMIT", "detrack.fetch_limit"),
    ("SMTP_HOST", "smtp.host"),
    ("SMTP_PORT", "smtp.port"),
    ("EMAIL_SENDER", "smtp.sender"),
    ("EMAIL_PASSWORD", "smtp.password"),
    ("EMAIL_RECEIVERS", "smtp.receivers"),
];

/// Set on AWS ECS tasks; `.env` files are only read when it is absent.
const ECS_MARKER_ENV: &str = "AWS_EXECUTION_ENV";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detrack: DetrackConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub aliases: AliasConfig,
}

/// `[detrack]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetrackConfig {
    pub base_url: String,
    pub api_key: String,
    /// Page size requested from `dn/jobs`.
    pub fetch_limit: u32,
}

/// `[smtp]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
    /// Comma-separated addresses.
    pub receivers: String,
}

/// `[report]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Only jobs with exactly this status are reported.
    pub status: String,
    /// IANA zone the reporting window is computed in.
    pub timezone: String,
    pub format: ExportFormat,
    pub output_dir: PathBuf,
    /// Where each live fetch is saved for later reruns.
    pub snapshot: PathBuf,
}

/// `[aliases.routes]` / `[aliases.times]`: extra spelling variants merged
/// over the built-in tables, `variant = "CANONICAL"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AliasConfig {
    #[serde(default)]
    pub routes: BTreeMap<String, String>,
    #[serde(default)]
    pub times: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load the full layered configuration. `path` is required to exist when
    /// given; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if std::env::var_os(ECS_MARKER_ENV).is_none() {
            match dotenvy::dotenv() {
                Ok(env_file) => tracing::debug!(path = %env_file.display(), "loaded .env"),
                Err(err) if err.not_found() => {}
                Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env"),
            }
        }

        Self::from_sources(path, |key| std::env::var(key).ok())
    }

    /// Build from the defaults, an optional file and an environment lookup.
    /// Empty environment values count as unset.
    pub fn from_sources(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(default_config_path().as_path()).required(false),
        };

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(file);

        for (var, key) in ENV_OVERRIDES {
            let value = env(var).filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Settings needed to fetch from Detrack.
    pub fn validate_fetch(&self) -> Result<(), ConfigError> {
        require(&self.detrack.api_key, "detrack.api_key", "API_KEY")
    }

    /// Settings needed to mail the report.
    pub fn validate_mail(&self) -> Result<(), ConfigError> {
        require(&self.smtp.password, "smtp.password", "EMAIL_PASSWORD")?;
        require(&self.smtp.sender, "smtp.sender", "EMAIL_SENDER")?;
        require(&self.smtp.receivers, "smtp.receivers", "EMAIL_RECEIVERS")
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.report
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.report.timezone.clone()))
    }

    /// Built-in alias tables with the configured variants merged on top.
    pub fn aliases(&self) -> RunAliases {
        RunAliases::builtin()
            .extend_routes(self.aliases.routes.iter().map(|(v, c)| (v.as_str(), c.as_str())))
            .extend_times(self.aliases.times.iter().map(|(v, c)| (v.as_str(), c.as_str())))
    }

    pub fn normalizer(&self) -> Result<RunNormalizer, ConfigError> {
        Ok(RunNormalizer::new(self.aliases())?)
    }
}

fn require(value: &str, key: &'static str, env: &'static str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing { key, env });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn default_config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("wcp-report")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
