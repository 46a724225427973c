use crate::config::{
    validate_settings, DEFAULT_FILENAME_PREFIX, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECONDS,
};
use crate::core::gate::DEFAULT_CONCURRENT_REQUESTS;
use crate::core::retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
use crate::core::ConfigProvider;
use crate::utils::error::{ExtractError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub upstream: UpstreamConfig,
    pub retry: Option<RetryConfig>,
    pub extract: Option<ExtractConfig>,
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    pub concurrent_requests: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub output_path: String,
    pub filename_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `compact` (default) or `json`.
    pub format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExtractError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ExtractError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RESULT_API_BASE})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_settings(
            "upstream.",
            &self.upstream.endpoint,
            &self.output.output_path,
            self.concurrent_requests(),
            &self.retry_policy(),
        )?;

        match self.log_format() {
            "compact" | "json" => Ok(()),
            other => Err(ExtractError::InvalidConfigValueError {
                field: "logging.format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: compact, json".to_string(),
            }),
        }
    }

    pub fn concurrent_requests(&self) -> usize {
        self.extract
            .as_ref()
            .and_then(|e| e.concurrent_requests)
            .unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
    }

    pub fn log_format(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .unwrap_or("compact")
    }

    pub fn json_logging(&self) -> bool {
        self.log_format() == "json"
    }

    /// Command line flags win over file values.
    #[cfg(feature = "cli")]
    pub fn apply_cli_overrides(&mut self, cli: &crate::config::CliConfig) {
        if let Some(endpoint) = &cli.api_endpoint {
            self.upstream.endpoint = endpoint.clone();
        }
        if let Some(timeout) = cli.timeout_seconds {
            self.upstream.timeout_seconds = Some(timeout);
        }
        if let Some(path) = &cli.output_path {
            self.output.output_path = path.clone();
        }
        if let Some(prefix) = &cli.filename_prefix {
            self.output.filename_prefix = Some(prefix.clone());
        }
        if let Some(k) = cli.concurrent_requests {
            self.extract.get_or_insert_with(Default::default).concurrent_requests = Some(k);
        }
        if cli.max_retries.is_some() || cli.retry_delay_ms.is_some() {
            let retry = self.retry.get_or_insert_with(Default::default);
            if let Some(max_retries) = cli.max_retries {
                retry.max_retries = Some(max_retries);
            }
            if let Some(delay) = cli.retry_delay_ms {
                retry.base_delay_ms = Some(delay);
            }
        }
        if cli.json_logs {
            self.logging.get_or_insert_with(Default::default).format = Some("json".to_string());
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.upstream.endpoint
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests()
    }

    fn retry_policy(&self) -> RetryPolicy {
        let retry = self.retry.clone().unwrap_or_default();
        RetryPolicy {
            max_retries: retry.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            base_delay: Duration::from_millis(retry.base_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS)),
            call_timeout: Duration::from_secs(
                self.upstream.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            ),
        }
    }

    fn filename_prefix(&self) -> &str {
        self.output
            .filename_prefix
            .as_deref()
            .unwrap_or(DEFAULT_FILENAME_PREFIX)
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .upstream
            .headers
            .as_ref()
            .map(|h| h.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        headers.sort();
        headers
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
