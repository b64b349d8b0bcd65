//! Client configuration.
//!
//! Values are layered: built-in defaults, then `config.json` in the user
//! config directory, then `REVOLT_*` environment variables. The binary
//! applies its command-line flags last.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono_tz::Tz;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumProperty, EnumString};
use tempfile::NamedTempFile;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.revolt.chat";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONFIG_DIR_NAME: &str = "revolt-client";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not locate a config directory")]
    NoConfigDir,

    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown time zone {0:?}")]
    InvalidTimezone(String),

    #[error("api url must start with http:// or https://, got {0:?}")]
    InvalidUrl(String),

    #[error("unknown token kind {0:?}, expected bot or user")]
    InvalidTokenKind(String),
}

/// Which header the token is sent in.
#[derive(
    Display,
    EnumIter,
    EnumProperty,
    EnumString,
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum TokenKind {
    #[default]
    #[strum(serialize = "bot", props(Friendly = "Bot token"))]
    Bot,

    #[strum(serialize = "user", props(Friendly = "Session token"))]
    User,
}

impl TokenKind {
    pub const fn header(self) -> &'static str {
        match self {
            Self::Bot => "x-bot-token",
            Self::User => "x-session-token",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api_url: String,

    /// Never written to disk unless explicitly saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    pub token_kind: TokenKind,

    /// IANA zone used when printing timestamps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            token_kind: TokenKind::default(),
            timezone: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Loads defaults, the file at the default path if present, then the
    /// process environment. The result is not validated, so later layers
    /// can still replace a bad value.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match Self::default_path() {
            Ok(path) => Some(path),
            Err(ConfigError::NoConfigDir) => None,
            Err(e) => return Err(e),
        };
        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    pub fn load_from<F>(path: Option<&Path>, var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(var)?;
        Ok(config)
    }

    /// Reads `path`, falling back to defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overrides fields from `REVOLT_API_URL`, `REVOLT_TOKEN`,
    /// `REVOLT_TOKEN_KIND` and `REVOLT_TZ`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_url) = var("REVOLT_API_URL") {
            self.api_url = api_url;
        }
        if let Some(token) = var("REVOLT_TOKEN") {
            self.token = Some(token);
        }
        if let Some(kind) = var("REVOLT_TOKEN_KIND") {
            self.token_kind = kind
                .parse()
                .map_err(|_| ConfigError::InvalidTokenKind(kind))?;
        }
        if let Some(timezone) = var("REVOLT_TZ") {
            self.timezone = Some(timezone);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(self.api_url.clone()));
        }
        self.tz()?;
        Ok(())
    }

    /// Display time zone, UTC when unset.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone.as_deref().map_or(Ok(Tz::UTC), |name| {
            name.parse::<Tz>()
                .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))
        })
    }

    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Writes the config through a temp file in the same directory so a
    /// crash never leaves a truncated file behind.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        fs::create_dir_all(dir).map_err(io_err)?;

        let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
        let contents = serde_json::to_vec_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        file.write_all(&contents).map_err(io_err)?;
        file.persist(path).map_err(|e| io_err(e.error))?;

        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn file_overrides_defaults_and_env_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"api_url":"https://chat.example.org/api/","token_kind":"user","timezone":"Europe/Berlin"}"#,
        )
        .unwrap();

        let mut config = Config::from_file(&path).unwrap();
        assert_eq!(config.api_url(), "https://chat.example.org/api");
        assert_eq!(config.token_kind, TokenKind::User);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        config
            .apply_env(env(&[("REVOLT_TOKEN", "secret"), ("REVOLT_TOKEN_KIND", "Bot")]))
            .unwrap();
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.token_kind, TokenKind::Bot);
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.apply_env(env(&[("REVOLT_TOKEN_KIND", "robot")])),
            Err(ConfigError::InvalidTokenKind(_))
        ));

        config.timezone = Some("Mars/Olympus_Mons".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimezone(_))
        ));

        config.timezone = None;
        config.api_url = "ftp://example.org".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn invalid_env_value_can_be_replaced_before_validation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_url":"not a url"}"#).unwrap();

        let mut config = Config::load_from(
            Some(&path),
            env(&[("REVOLT_TZ", "Mars/Olympus_Mons")]),
        )
        .unwrap();
        assert!(config.validate().is_err());

        config.timezone = Some("Asia/Tokyo".to_string());
        config.api_url = "https://chat.example.org".to_string();
        config.validate().unwrap();
        assert_eq!(config.tz().unwrap(), chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            token: Some("abc".to_string()),
            timezone: Some("America/Los_Angeles".to_string()),
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn token_kinds_map_to_headers() {
        assert_eq!(TokenKind::Bot.header(), "x-bot-token");
        assert_eq!(TokenKind::User.header(), "x-session-token");
    }
}
