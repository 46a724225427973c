use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Upstream returned HTTP {status} for {operation}: {body}")]
    HttpStatusError {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{operation} timed out after {timeout_ms}ms")]
    TimeoutError { operation: String, timeout_ms: u64 },

    #[error("Invalid session format: {value} (expected Odd-(YYYY-YY) or Even-(YYYY-YY))")]
    SessionFormatError { value: String },

    #[error("{subject} exceeds the limit of {limit}")]
    RangeTooLargeError { subject: String, limit: u64 },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Input,
    Configuration,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ExtractError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExtractError::ApiError(_)
            | ExtractError::HttpStatusError { .. }
            | ExtractError::TimeoutError { .. } => ErrorCategory::Network,
            ExtractError::SessionFormatError { .. }
            | ExtractError::RangeTooLargeError { .. }
            | ExtractError::ValidationError { .. } => ErrorCategory::Input,
            ExtractError::ConfigError { .. }
            | ExtractError::InvalidConfigValueError { .. }
            | ExtractError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ExtractError::CsvError(_)
            | ExtractError::SerializationError(_)
            | ExtractError::ProcessingError { .. } => ErrorCategory::Processing,
            ExtractError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Whether a remote call that failed with this error is worth another attempt.
    ///
    /// Everything the upstream can cause (transport faults, non-2xx statuses,
    /// undecodable bodies, timeouts) is retryable; local mistakes are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractError::ApiError(e) => !e.is_builder(),
            ExtractError::HttpStatusError { .. }
            | ExtractError::TimeoutError { .. }
            | ExtractError::SerializationError(_) => true,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ExtractError::SessionFormatError { .. } => {
                "Use session labels like Odd-(2022-23) or Even-(2022-23)"
            }
            ExtractError::RangeTooLargeError { .. } => {
                "Split the request into smaller registration or session ranges"
            }
            ExtractError::ValidationError { .. } => "Check the request fields and try again",
            ExtractError::ConfigError { .. }
            | ExtractError::InvalidConfigValueError { .. }
            | ExtractError::MissingConfigError { .. } => {
                "Check the configuration file and command line flags"
            }
            ExtractError::ApiError(_)
            | ExtractError::HttpStatusError { .. }
            | ExtractError::TimeoutError { .. } => {
                "Check network connectivity and the upstream endpoint, then retry"
            }
            ExtractError::IoError(_) => "Check that the output directory exists and is writable",
            ExtractError::CsvError(_)
            | ExtractError::SerializationError(_)
            | ExtractError::ProcessingError { .. } => "Re-run with --verbose and inspect the logs",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the result service: {}", self),
            ErrorCategory::Input => format!("Invalid request: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Processing => format!("Failed to process results: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}
