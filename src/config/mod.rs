use std::str::FromStr;

use serde::Deserialize;

static CONFIG: OnceCell<Config> = OnceCell::const_new();

mod config_dir;
pub use config_dir::{CONFIG_PATH_VAR, find_config_file, read_config};

mod error;
pub use error::{ConfigError, ConfigResult};
use tokio::sync::OnceCell;

pub const DEFAULT_SECRET_KEY: &str = "your-secret-key-here";
/// Ten years; anything longer is a misconfiguration.
pub const MAX_TOKEN_LIFETIME_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    host: Host,
    app: App,
    log: Log,
    ai: Ai,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Host {
    host: String,
    port: u16,
    debug: bool,
    reload: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    database_file: String,
    secret_key: String,
    token_length: usize,
    token_lifetime_hours: i64,
    session_cleanup_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Log {
    level: String,
    file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ai {
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout_secs: u64,
    max_tokens: u32,
}

impl Default for Host {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8000,
            debug: false,
            reload: false,
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self {
            database_file: String::from("codecamp.db"),
            secret_key: String::from(DEFAULT_SECRET_KEY),
            token_length: 32,
            token_lifetime_hours: 24,
            session_cleanup_interval_secs: 3600,
        }
    }
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            file: None,
        }
    }
}

impl Default for Ai {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: String::from("https://api.openai.com/v1"),
            model: String::from("gpt-4o-mini"),
            timeout_secs: 30,
            max_tokens: 1024,
        }
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: String) -> ConfigResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

fn parse_flag(key: &'static str, value: String) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Config {
    #[tracing::instrument]
    pub async fn get_or_init(use_local: bool) -> &'static Config {
        CONFIG
            .get_or_init(|| async {
                match Self::load(use_local) {
                    Ok(c) => c,
                    Err(e) => {
                        // tracing is not set up yet, the level comes from this config
                        eprintln!("Unable to load configuration: {e}");
                        std::process::exit(1);
                    }
                }
            })
            .await
    }

    /// Reads the optional config file, then applies `.env` and process environment overrides.
    pub fn load(use_local: bool) -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();

        let config = match read_config(use_local) {
            Ok(raw) => Self::from_toml(&raw)?,
            Err(ConfigError::ConfigNotFound) => {
                tracing::debug!("no config file found, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };

        config.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_toml(raw: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HOST") {
            self.host.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.host.port = parse_value("PORT", v)?;
        }
        if let Some(v) = lookup("DEBUG") {
            self.host.debug = parse_flag("DEBUG", v)?;
        }
        if let Some(v) = lookup("RELOAD") {
            self.host.reload = parse_flag("RELOAD", v)?;
        }
        if let Some(v) = lookup("DATABASE_FILE") {
            self.app.database_file = v;
        }
        if let Some(v) = lookup("USER_TOKEN_LENGTH") {
            self.app.token_length = parse_value("USER_TOKEN_LENGTH", v)?;
        }
        if let Some(v) = lookup("USER_TOKEN_LIFETIME_HOURS") {
            self.app.token_lifetime_hours = parse_value("USER_TOKEN_LIFETIME_HOURS", v)?;
        }
        if let Some(v) = lookup("SECRET_KEY") {
            self.app.secret_key = v;
        }
        if let Some(v) = lookup("SESSION_CLEANUP_INTERVAL_SECS") {
            self.app.session_cleanup_interval_secs =
                parse_value("SESSION_CLEANUP_INTERVAL_SECS", v)?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.log.level = v;
        }
        if let Some(v) = lookup("LOG_FILE") {
            self.log.file = non_empty(v);
        }
        if let Some(v) = lookup("AI_API_KEY") {
            self.ai.api_key = non_empty(v);
        }
        if let Some(v) = lookup("AI_BASE_URL") {
            self.ai.base_url = v;
        }
        if let Some(v) = lookup("AI_MODEL") {
            self.ai.model = v;
        }
        if let Some(v) = lookup("AI_TIMEOUT_SECS") {
            self.ai.timeout_secs = parse_value("AI_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = lookup("AI_MAX_TOKENS") {
            self.ai.max_tokens = parse_value("AI_MAX_TOKENS", v)?;
        }

        self.validate()
    }

    fn validate(self) -> ConfigResult<Self> {
        if !(16..=256).contains(&self.app.token_length) {
            return Err(ConfigError::InvalidValue {
                key: "USER_TOKEN_LENGTH",
                value: self.app.token_length.to_string(),
            });
        }
        if !(0..=MAX_TOKEN_LIFETIME_HOURS).contains(&self.app.token_lifetime_hours) {
            return Err(ConfigError::InvalidValue {
                key: "USER_TOKEN_LIFETIME_HOURS",
                value: self.app.token_lifetime_hours.to_string(),
            });
        }
        if self.app.secret_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "SECRET_KEY",
                value: String::new(),
            });
        }
        Ok(self)
    }

    #[inline]
    pub fn host(&self) -> &Host {
        &self.host
    }

    #[inline]
    pub fn app(&self) -> &App {
        &self.app
    }

    #[inline]
    pub fn log(&self) -> &Log {
        &self.log
    }

    #[inline]
    pub fn ai(&self) -> &Ai {
        &self.ai
    }
}

impl Host {
    pub fn bindto(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[inline]
    pub fn debug(&self) -> bool {
        self.debug
    }

    #[inline]
    pub fn reload(&self) -> bool {
        self.reload
    }
}

impl App {
    #[inline]
    pub fn database_file(&self) -> &str {
        &self.database_file
    }

    #[inline]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    #[inline]
    pub fn token_length(&self) -> usize {
        self.token_length
    }

    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_lifetime_hours)
    }

    pub fn session_cleanup_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_cleanup_interval_secs.max(1))
    }
}

impl Log {
    #[inline]
    pub fn level(&self) -> &str {
        &self.level
    }

    #[inline]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }
}

impl Ai {
    #[inline]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    #[inline]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
