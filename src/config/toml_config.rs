use crate::utils::error::{PricingError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub max_batch_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            workers: None,
            max_batch_size: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    #[default]
    Startup,
    PerRequest,
}

impl LoadPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::PerRequest => "per_request",
        }
    }
}

impl std::str::FromStr for LoadPolicy {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "startup" => Ok(Self::Startup),
            "per_request" | "per-request" => Ok(Self::PerRequest),
            other => Err(PricingError::InvalidConfigValueError {
                field: "model.load_policy".to_string(),
                value: other.to_string(),
                reason: "Expected 'startup' or 'per_request'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: String,
    pub load_policy: LoadPolicy,
    pub strict_categories: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "final_model.json".to_string(),
            load_policy: LoadPolicy::Startup,
            strict_categories: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PricingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PricingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MODEL_PATH})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PricingError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;

        if self.server.port == 0 {
            return Err(PricingError::InvalidConfigValueError {
                field: "server.port".to_string(),
                value: "0".to_string(),
                reason: "Port must be between 1 and 65535".to_string(),
            });
        }

        if let Some(workers) = self.server.workers {
            validation::validate_positive_number("server.workers", workers, 1)?;
        }

        validation::validate_positive_number("server.max_batch_size", self.server.max_batch_size, 1)?;
        validation::validate_path("model.path", &self.model.path)?;
        validation::validate_file_extension("model.path", &self.model.path, &["json"])?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(PricingError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
                reason: format!("Valid levels: {}", valid_levels.join(", ")),
            });
        }

        Ok(())
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8080
workers = 2
max_batch_size = 10

[model]
path = "./models/pricing_model.json"
load_policy = "per_request"
strict_categories = true

[logging]
level = "debug"
format = "json"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.bind_address(), ("127.0.0.1".to_string(), 8080));
        assert_eq!(config.server.workers, Some(2));
        assert_eq!(config.model.load_policy, LoadPolicy::PerRequest);
        assert!(config.model.strict_categories);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.max_batch_size, 100);
        assert_eq!(config.model.path, "final_model.json");
        assert_eq!(config.model.load_policy, LoadPolicy::Startup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GETAROUND_TEST_MODEL_PATH", "/srv/models/pricing.json");

        let toml_content = r#"
[model]
path = "${GETAROUND_TEST_MODEL_PATH}"
"#;

        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.model.path, "/srv/models/pricing.json");

        std::env::remove_var("GETAROUND_TEST_MODEL_PATH");
    }

    #[test]
    fn test_config_validation() {
        let config = ServiceConfig::from_toml_str("[server]\nmax_batch_size = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = ServiceConfig::from_toml_str("[model]\npath = \"model.joblib\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = ServiceConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_log_directive_is_a_config_error() {
        let config = ServiceConfig::from_toml_str("[logging]\nlevel = \"info,[\"\n").unwrap();
        match config.validate() {
            Err(PricingError::InvalidConfigValueError { field, .. }) => {
                assert_eq!(field, "logging.level")
            }
            other => panic!("expected invalid logging.level, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_load_policy_fails_to_parse() {
        assert!(ServiceConfig::from_toml_str("[model]\nload_policy = \"lazy\"\n").is_err());
        assert_eq!("per-request".parse::<LoadPolicy>().unwrap(), LoadPolicy::PerRequest);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 4100\n")
            .unwrap();

        let config = ServiceConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 4100);
    }
}
