use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_PATH_VAR: &str = "NOGHIBLI_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    #[default]
    Detailed,
    Legacy,
}

impl FromStr for ResponseStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detailed" => Ok(ResponseStyle::Detailed),
            "legacy" => Ok(ResponseStyle::Legacy),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub fetch_timeout_secs: u64,
    pub max_image_bytes: usize,
    pub normalize: bool,
    pub response_style: ResponseStyle,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            model_path: PathBuf::from("model.pt"),
            fetch_timeout_secs: 10,
            max_image_bytes: 20 * 1024 * 1024,
            normalize: true,
            response_style: ResponseStyle::Detailed,
            log_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Reads `.env`, the optional YAML file named by `NOGHIBLI_CONFIG`, then
    /// applies environment overrides on top.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let base = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };

        base.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path)
            .map_err(|source| ConfigError::Read { path, source })?;
        let config: ServiceConfig = serde_yaml::from_str(&config_str)?;
        config.validate()
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_value("PORT", &port)?;
        }
        if let Some(path) = lookup("MODEL_PATH") {
            self.model_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = parse_value("FETCH_TIMEOUT_SECS", &secs)?;
        }
        if let Some(bytes) = lookup("MAX_IMAGE_BYTES") {
            self.max_image_bytes = parse_value("MAX_IMAGE_BYTES", &bytes)?;
        }
        if let Some(normalize) = lookup("NORMALIZE") {
            self.normalize = parse_flag("NORMALIZE", &normalize)?;
        }
        if let Some(style) = lookup("RESPONSE_STYLE") {
            self.response_style = style
                .parse::<ResponseStyle>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "RESPONSE_STYLE",
                    value: style.clone(),
                })?;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.log_dir = (!dir.trim().is_empty()).then(|| PathBuf::from(dir));
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }

        self.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "port",
                value: "0".to_string(),
            });
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "fetch_timeout_secs",
                value: "0".to_string(),
            });
        }
        Ok(self)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
