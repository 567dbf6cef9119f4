use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use chrono_tz::Tz;

use crate::chatbot::quotes::{default_quotes, QuoteCatalog};
use crate::chatbot::responder::Persona;

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the config file.
    ReadFile { path: PathBuf, source: std::io::Error },
    /// Failed to parse JSON.
    ParseJson { path: PathBuf, source: serde_json::Error },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, source } => {
                write!(f, "failed to read config file '{}': {}", path.display(), source)
            }
            Self::ParseJson { path, source } => {
                write!(f, "failed to parse config file '{}': {}", path.display(), source)
            }
            Self::Validation(msg) => write!(f, "config validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFile { source, .. } => Some(source),
            Self::ParseJson { source, .. } => Some(source),
            Self::Validation(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// Facts the bot tells about itself. Missing fields use built-in defaults.
    #[serde(default)]
    persona: Persona,
    /// Daily quote pool. Empty or missing uses the built-in catalog.
    #[serde(default)]
    quotes: Vec<String>,
    /// Wall-clock fire time for daily quotes, "HH:MM" or "HH:MM:SS".
    daily_quote_time: Option<String>,
    /// IANA timezone name the fire time is interpreted in.
    timezone: Option<String>,
    /// Directory for state files (logs). Defaults to current directory.
    data_dir: Option<String>,
}

pub struct Config {
    pub telegram_bot_token: String,
    pub persona: Persona,
    pub quotes: QuoteCatalog,
    pub daily_quote_time: NaiveTime,
    pub timezone: Tz,
    /// Directory for state files (logs).
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        // Validate required fields
        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        let quotes = if file.quotes.is_empty() {
            default_quotes()
        } else {
            file.quotes
        };
        let quotes = QuoteCatalog::new(quotes)
            .ok_or_else(|| ConfigError::Validation("quotes must contain at least one entry".into()))?;

        let daily_quote_time = match file.daily_quote_time {
            Some(ref raw) => parse_fire_time(raw)?,
            None => default_fire_time(),
        };

        let timezone = match file.timezone {
            Some(ref raw) => raw.parse::<Tz>().map_err(|_| {
                ConfigError::Validation(format!("unknown timezone '{raw}' (expected IANA name)"))
            })?,
            None => chrono_tz::UTC,
        };

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            persona: file.persona,
            quotes,
            daily_quote_time,
            timezone,
            data_dir,
        })
    }
}

fn default_fire_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).expect("09:00:00 is a valid time")
}

fn parse_fire_time(raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| {
            ConfigError::Validation(format!(
                "invalid daily_quote_time '{raw}' (expected HH:MM or HH:MM:SS)"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn assert_err<T>(result: Result<T, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    #[test]
    fn test_valid_config() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdefGHIjklMNOpqrsTUVwxyz"
        }"#);
        let config = Config::load(file.path()).expect("should load valid config");
        assert_eq!(config.persona.name, "Quip");
        assert!(!config.quotes.is_empty());
        assert_eq!(config.daily_quote_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(config.timezone, chrono_tz::UTC);
    }

    #[test]
    fn test_missing_token() {
        let file = write_config(r#"{}"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }

    #[test]
    fn test_empty_token() {
        let file = write_config(r#"{
            "telegram_bot_token": ""
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("telegram_bot_token"));
    }

    #[test]
    fn test_invalid_token_format_no_colon() {
        let file = write_config(r#"{
            "telegram_bot_token": "invalid_token_no_colon"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid"));
    }

    #[test]
    fn test_invalid_token_format_non_numeric_id() {
        let file = write_config(r#"{
            "telegram_bot_token": "notanumber:ABCdef"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_invalid_token_format_empty_secret() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_file_not_found() {
        let err = assert_err(Config::load("/nonexistent/path/config.json"));
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let file = write_config("{ invalid json }");
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::ParseJson { .. }));
    }

    #[test]
    fn test_partial_persona_override() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "persona": { "name": "Ada" }
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.persona.name, "Ada");
        // Unset fields keep their defaults
        assert_eq!(config.persona.university, "TSUE");
    }

    #[test]
    fn test_custom_quotes() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "quotes": ["Ship it.", "Onwards."]
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.quotes.len(), 2);
        assert!(config.quotes.contains("Ship it."));
    }

    #[test]
    fn test_fire_time_minutes_only() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "daily_quote_time": "18:30"
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.daily_quote_time, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
    }

    #[test]
    fn test_fire_time_with_seconds() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "daily_quote_time": "07:15:30"
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.daily_quote_time, NaiveTime::from_hms_opt(7, 15, 30).unwrap());
    }

    #[test]
    fn test_invalid_fire_time() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "daily_quote_time": "25:99"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("daily_quote_time"));
    }

    #[test]
    fn test_timezone() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "timezone": "Asia/Tashkent"
        }"#);
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.timezone, "Asia/Tashkent".parse::<Tz>().unwrap());
    }

    #[test]
    fn test_invalid_timezone() {
        let file = write_config(r#"{
            "telegram_bot_token": "123456789:ABCdef",
            "timezone": "Mars/Olympus"
        }"#);
        let err = assert_err(Config::load(file.path()));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("timezone"));
    }
}
